//! Full-table validation runs
//!
//! Pipeline: fetch snapshot → validate each record (pure) → persist scores
//! (best effort) → aggregate → append one audit log entry (best effort).
//! Only the initial fetch can abort a run; score persistence and the audit
//! append degrade to warnings so a flaky store cannot lose the run's results.

use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::BTreeSet;
use tracing::warn;
use uuid::Uuid;
use vendio_common::Result;

use crate::db;
use crate::models::{EntityKind, ValidationLog, ValidationResult, ValidationSummary};
use crate::services::aggregator::summarize;
use crate::validators::{validate_customer, validate_deal, validate_transaction, RuleContext};

/// One record's outcome within a run
#[derive(Debug, Clone, Serialize)]
pub struct RecordOutcome {
    pub id: Uuid,
    #[serde(flatten)]
    pub result: ValidationResult,
}

/// Result of one full-table validation run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub kind: EntityKind,
    pub summary: ValidationSummary,
    pub records: Vec<RecordOutcome>,
}

/// Build the rule context from the settings table
pub async fn rule_context(pool: &SqlitePool) -> Result<RuleContext> {
    let mut ctx = RuleContext::current();
    ctx.stale_contact_days =
        vendio_common::db::settings::get_setting_i64(pool, "dq_stale_contact_days", 90).await?;
    ctx.amount_warning_threshold =
        vendio_common::db::settings::get_setting_i64(pool, "dq_amount_warning_threshold", 500_000)
            .await? as f64;
    Ok(ctx)
}

/// Run a full validation pass over one entity table
pub async fn run(pool: &SqlitePool, kind: EntityKind) -> Result<RunReport> {
    let ctx = rule_context(pool).await?;

    let records: Vec<RecordOutcome> = match kind {
        EntityKind::Customers => db::customers::fetch_all(pool)
            .await?
            .iter()
            .map(|c| RecordOutcome {
                id: c.id,
                result: validate_customer(c, &ctx),
            })
            .collect(),
        EntityKind::Transactions => db::transactions::fetch_all(pool)
            .await?
            .iter()
            .map(|t| RecordOutcome {
                id: t.id,
                result: validate_transaction(t, &ctx),
            })
            .collect(),
        EntityKind::Deals => db::deals::fetch_all(pool)
            .await?
            .iter()
            .map(|d| RecordOutcome {
                id: d.id,
                result: validate_deal(d, &ctx),
            })
            .collect(),
    };

    // Write scores back; a single failed row must not sink the run
    for outcome in &records {
        let messages = outcome.result.messages();
        let persisted = match kind {
            EntityKind::Customers => {
                db::customers::update_quality(pool, outcome.id, outcome.result.score, &messages)
                    .await
            }
            EntityKind::Transactions => {
                db::transactions::update_quality(pool, outcome.id, outcome.result.score, &messages)
                    .await
            }
            EntityKind::Deals => {
                db::deals::update_quality(pool, outcome.id, outcome.result.score, &messages).await
            }
        };
        if let Err(e) = persisted {
            warn!(id = %outcome.id, error = %e, "Failed to persist quality score");
        }
    }

    let results: Vec<ValidationResult> = records.iter().map(|o| o.result.clone()).collect();
    let summary = summarize(&results);

    let errors: Vec<String> = records
        .iter()
        .flat_map(|o| {
            o.result
                .errors
                .iter()
                .map(move |f| format!("{} {}: {}", o.id, f.field, f.message))
        })
        .collect();
    let suggestions: Vec<String> = records
        .iter()
        .flat_map(|o| o.result.suggestions.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let log = ValidationLog::for_run(kind, &summary, errors, suggestions);
    if let Err(e) = db::validation_logs::append(pool, &log).await {
        warn!(table = %kind, error = %e, "Failed to append validation log");
    }

    Ok(RunReport {
        kind,
        summary,
        records,
    })
}

/// Validate a single record by id
///
/// A missing record yields the degenerate zero-score result rather than an
/// error.
pub async fn validate_record(
    pool: &SqlitePool,
    kind: EntityKind,
    id: Uuid,
) -> Result<ValidationResult> {
    let ctx = rule_context(pool).await?;

    let result = match kind {
        EntityKind::Customers => db::customers::fetch_one(pool, id)
            .await?
            .map(|c| validate_customer(&c, &ctx)),
        EntityKind::Transactions => db::transactions::fetch_one(pool, id)
            .await?
            .map(|t| validate_transaction(&t, &ctx)),
        EntityKind::Deals => db::deals::fetch_one(pool, id)
            .await?
            .map(|d| validate_deal(&d, &ctx)),
    };

    Ok(result.unwrap_or_else(|| ValidationResult::not_found(kind, id)))
}
