//! Bulk mutation runner
//!
//! Applies one patch, or a delete, to every id in an operator-supplied
//! selection. Two strategies, chosen by the `dq_bulk_mode` setting:
//!
//! - sequential: one write per id, awaited in selection order, session
//!   progress saved after every id. First failure abandons the remaining
//!   queue; earlier writes are NOT rolled back.
//! - transactional: every write inside one transaction, all-or-nothing.
//!
//! The runner never writes validation logs; audit entries belong to full
//! validation runs.

use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;
use vendio_common::Result;

use crate::db;
use crate::models::{
    BulkMode, BulkOutcome, BulkSession, CustomerPatch, DealPatch, EntityKind, TransactionPatch,
};

/// Patch payload, typed per entity kind
#[derive(Debug, Clone)]
pub enum BulkPatch {
    Customer(CustomerPatch),
    Transaction(TransactionPatch),
    Deal(DealPatch),
}

impl BulkPatch {
    /// Parse a JSON payload as the patch type matching `kind`
    pub fn from_json(kind: EntityKind, value: serde_json::Value) -> std::result::Result<Self, String> {
        let parsed = match kind {
            EntityKind::Customers => serde_json::from_value(value).map(BulkPatch::Customer),
            EntityKind::Transactions => serde_json::from_value(value).map(BulkPatch::Transaction),
            EntityKind::Deals => serde_json::from_value(value).map(BulkPatch::Deal),
        };
        parsed.map_err(|e| format!("Invalid patch for {}: {}", kind, e))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            BulkPatch::Customer(p) => p.is_empty(),
            BulkPatch::Transaction(p) => p.is_empty(),
            BulkPatch::Deal(p) => p.is_empty(),
        }
    }
}

/// Read the configured execution strategy
pub async fn bulk_mode(pool: &SqlitePool) -> BulkMode {
    match vendio_common::db::settings::get_setting(pool, "dq_bulk_mode").await {
        Ok(Some(value)) => BulkMode::from_setting(&value),
        _ => BulkMode::Sequential,
    }
}

/// Reason to refuse an update before the first write, if any
pub fn update_rejection(ids: &[Uuid], patch: &BulkPatch) -> Option<String> {
    if ids.is_empty() {
        return Some("Selection is empty".to_string());
    }
    if patch.is_empty() {
        return Some("Update payload has no fields".to_string());
    }
    None
}

/// Reason to refuse a delete before the first write, if any
pub fn delete_rejection(ids: &[Uuid]) -> Option<String> {
    if ids.is_empty() {
        return Some("Selection is empty".to_string());
    }
    None
}

async fn apply_update<'e, E>(executor: E, id: Uuid, patch: &BulkPatch) -> Result<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    match patch {
        BulkPatch::Customer(p) => db::customers::update(executor, id, p).await,
        BulkPatch::Transaction(p) => db::transactions::update(executor, id, p).await,
        BulkPatch::Deal(p) => db::deals::update(executor, id, p).await,
    }
}

async fn apply_delete<'e, E>(executor: E, kind: EntityKind, id: Uuid) -> Result<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    match kind {
        EntityKind::Customers => db::customers::delete(executor, id).await,
        EntityKind::Transactions => db::transactions::delete(executor, id).await,
        EntityKind::Deals => db::deals::delete(executor, id).await,
    }
}

/// Execute a bulk update run to its terminal state
pub async fn run_update(
    pool: SqlitePool,
    mut session: BulkSession,
    ids: Vec<Uuid>,
    patch: BulkPatch,
) -> Result<()> {
    match bulk_mode(&pool).await {
        BulkMode::Sequential => {
            for (applied, id) in ids.iter().enumerate() {
                match apply_update(&pool, *id, &patch).await {
                    Ok(()) => {
                        session.advance();
                        db::bulk_sessions::save(&pool, &session).await?;
                    }
                    Err(e) => {
                        warn!(
                            session_id = %session.session_id,
                            id = %id,
                            error = %e,
                            "Bulk update aborted; applied updates stay in place"
                        );
                        session.fail(BulkOutcome::PartiallyApplied {
                            applied,
                            failed_id: *id,
                        });
                        db::bulk_sessions::save(&pool, &session).await?;
                        return Ok(());
                    }
                }
            }
            session.complete(BulkOutcome::FullyApplied { applied: ids.len() });
        }
        BulkMode::Transactional => {
            let mut tx = pool.begin().await?;
            let mut failure = None;
            for id in &ids {
                if let Err(e) = apply_update(&mut *tx, *id, &patch).await {
                    failure = Some((*id, e));
                    break;
                }
            }
            match failure {
                None => {
                    tx.commit().await?;
                    for _ in &ids {
                        session.advance();
                    }
                    session.complete(BulkOutcome::FullyApplied { applied: ids.len() });
                }
                Some((id, e)) => {
                    tx.rollback().await?;
                    warn!(
                        session_id = %session.session_id,
                        id = %id,
                        error = %e,
                        "Bulk update rolled back"
                    );
                    session.fail(BulkOutcome::Rejected {
                        reason: format!("Update of {} failed: {}", id, e),
                    });
                }
            }
        }
    }

    db::bulk_sessions::save(&pool, &session).await?;
    Ok(())
}

/// Execute a bulk delete run to its terminal state
pub async fn run_delete(pool: SqlitePool, mut session: BulkSession, ids: Vec<Uuid>) -> Result<()> {
    let kind = session.kind;

    match bulk_mode(&pool).await {
        BulkMode::Sequential => {
            for (applied, id) in ids.iter().enumerate() {
                match apply_delete(&pool, kind, *id).await {
                    Ok(()) => {
                        session.advance();
                        db::bulk_sessions::save(&pool, &session).await?;
                    }
                    Err(e) => {
                        warn!(
                            session_id = %session.session_id,
                            id = %id,
                            error = %e,
                            "Bulk delete aborted; earlier deletes stay in place"
                        );
                        session.fail(BulkOutcome::PartiallyApplied {
                            applied,
                            failed_id: *id,
                        });
                        db::bulk_sessions::save(&pool, &session).await?;
                        return Ok(());
                    }
                }
            }
            session.complete(BulkOutcome::FullyApplied { applied: ids.len() });
        }
        BulkMode::Transactional => {
            let mut tx = pool.begin().await?;
            let mut failure = None;
            for id in &ids {
                if let Err(e) = apply_delete(&mut *tx, kind, *id).await {
                    failure = Some((*id, e));
                    break;
                }
            }
            match failure {
                None => {
                    tx.commit().await?;
                    for _ in &ids {
                        session.advance();
                    }
                    session.complete(BulkOutcome::FullyApplied { applied: ids.len() });
                }
                Some((id, e)) => {
                    tx.rollback().await?;
                    warn!(
                        session_id = %session.session_id,
                        id = %id,
                        error = %e,
                        "Bulk delete rolled back"
                    );
                    session.fail(BulkOutcome::Rejected {
                        reason: format!("Delete of {} failed: {}", id, e),
                    });
                }
            }
        }
    }

    db::bulk_sessions::save(&pool, &session).await?;

    // Clients re-fetch the table after a delete; the remaining count makes
    // the run's effect visible in the log
    let remaining = match kind {
        EntityKind::Customers => db::customers::count(&pool).await,
        EntityKind::Transactions => db::transactions::count(&pool).await,
        EntityKind::Deals => db::deals::count(&pool).await,
    };
    if let Ok(remaining) = remaining {
        info!(
            session_id = %session.session_id,
            table = %kind,
            remaining,
            "Bulk delete finished"
        );
    }

    Ok(())
}
