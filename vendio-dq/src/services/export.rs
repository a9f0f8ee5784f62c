//! CSV export
//!
//! Serialization goes through the csv crate's writer so embedded commas,
//! quotes, and newlines are quoted correctly.

use sqlx::SqlitePool;
use vendio_common::{Error, Result};

use crate::db;
use crate::models::{Customer, Deal, EntityKind, Transaction};

/// Export one entity table as CSV text
pub async fn export_csv(pool: &SqlitePool, kind: EntityKind) -> Result<String> {
    match kind {
        EntityKind::Customers => customers_csv(&db::customers::fetch_all(pool).await?),
        EntityKind::Transactions => transactions_csv(&db::transactions::fetch_all(pool).await?),
        EntityKind::Deals => deals_csv(&db::deals::fetch_all(pool).await?),
    }
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Internal(format!("CSV write failed: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| Error::Internal(format!("CSV is not UTF-8: {}", e)))
}

fn write_record(writer: &mut csv::Writer<Vec<u8>>, fields: &[String]) -> Result<()> {
    writer
        .write_record(fields)
        .map_err(|e| Error::Internal(format!("CSV write failed: {}", e)))
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn customers_csv(rows: &[Customer]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    write_record(
        &mut writer,
        &[
            "id", "name", "email", "phone", "address", "city", "state", "status",
            "last_contact_at", "data_quality_score", "created_at",
        ]
        .map(String::from),
    )?;

    for c in rows {
        write_record(
            &mut writer,
            &[
                c.id.to_string(),
                c.name.clone(),
                opt(&c.email),
                opt(&c.phone),
                opt(&c.address),
                opt(&c.city),
                opt(&c.state),
                opt(&c.status),
                c.last_contact_at.map(|dt| dt.to_rfc3339()).unwrap_or_default(),
                c.data_quality_score.map(|s| s.to_string()).unwrap_or_default(),
                c.created_at.to_rfc3339(),
            ],
        )?;
    }

    finish(writer)
}

fn transactions_csv(rows: &[Transaction]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    write_record(
        &mut writer,
        &[
            "id", "title", "description", "category", "tipo", "amount", "date", "status",
            "payment_method", "source", "customer", "data_quality_score", "created_at",
        ]
        .map(String::from),
    )?;

    for t in rows {
        write_record(
            &mut writer,
            &[
                t.id.to_string(),
                t.title.clone(),
                opt(&t.description),
                t.category.clone(),
                t.tx_type.as_str().to_string(),
                format!("{:.2}", t.amount),
                t.occurred_on.to_string(),
                opt(&t.status),
                opt(&t.payment_method),
                opt(&t.source),
                opt(&t.customer_name),
                t.data_quality_score.map(|s| s.to_string()).unwrap_or_default(),
                t.created_at.to_rfc3339(),
            ],
        )?;
    }

    finish(writer)
}

fn deals_csv(rows: &[Deal]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    write_record(
        &mut writer,
        &[
            "id", "title", "customer_id", "value", "status", "expected_close_on", "assignee",
            "data_quality_score", "created_at",
        ]
        .map(String::from),
    )?;

    for d in rows {
        write_record(
            &mut writer,
            &[
                d.id.to_string(),
                d.title.clone(),
                d.customer_id.map(|id| id.to_string()).unwrap_or_default(),
                d.value.map(|v| format!("{:.2}", v)).unwrap_or_default(),
                opt(&d.status),
                d.expected_close_on.map(|c| c.to_string()).unwrap_or_default(),
                opt(&d.assignee),
                d.data_quality_score.map(|s| s.to_string()).unwrap_or_default(),
                d.created_at.to_rfc3339(),
            ],
        )?;
    }

    finish(writer)
}
