//! Bulk session persistence
//!
//! Sessions are saved after every state change so the status endpoint always
//! reflects the run's latest persisted progress.

use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;
use vendio_common::{Error, Result};

use super::{parse_timestamp, parse_uuid};
use crate::models::BulkSession;

/// Save bulk session to database (insert or update)
pub async fn save(pool: &SqlitePool, session: &BulkSession) -> Result<()> {
    let state = serde_json::to_string(&session.state)
        .map_err(|e| Error::Internal(format!("Failed to serialize state: {}", e)))?;
    let operation = serde_json::to_string(&session.operation)
        .map_err(|e| Error::Internal(format!("Failed to serialize operation: {}", e)))?;
    let kind = serde_json::to_string(&session.kind)
        .map_err(|e| Error::Internal(format!("Failed to serialize kind: {}", e)))?;
    let outcome = session
        .outcome
        .as_ref()
        .map(|o| {
            serde_json::to_string(o)
                .map_err(|e| Error::Internal(format!("Failed to serialize outcome: {}", e)))
        })
        .transpose()?;

    sqlx::query(
        r#"
        INSERT INTO bulk_sessions (
            session_id, state, operation, entity_kind,
            processed, total, fraction, outcome, started_at, ended_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(session_id) DO UPDATE SET
            state = excluded.state,
            processed = excluded.processed,
            total = excluded.total,
            fraction = excluded.fraction,
            outcome = excluded.outcome,
            ended_at = excluded.ended_at
        "#,
    )
    .bind(session.session_id.to_string())
    .bind(&state)
    .bind(&operation)
    .bind(&kind)
    .bind(session.processed as i64)
    .bind(session.total as i64)
    .bind(session.fraction)
    .bind(&outcome)
    .bind(session.started_at.to_rfc3339())
    .bind(session.ended_at.map(|dt| dt.to_rfc3339()))
    .execute(pool)
    .await?;

    Ok(())
}

/// Load bulk session from database
pub async fn load(pool: &SqlitePool, session_id: Uuid) -> Result<Option<BulkSession>> {
    let row = sqlx::query(
        r#"
        SELECT session_id, state, operation, entity_kind,
               processed, total, fraction, outcome, started_at, ended_at
        FROM bulk_sessions
        WHERE session_id = ?
        "#,
    )
    .bind(session_id.to_string())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(from_row).transpose()
}

fn from_row(row: &SqliteRow) -> Result<BulkSession> {
    let state = serde_json::from_str(row.try_get("state")?)
        .map_err(|e| Error::Internal(format!("Invalid state in database: {}", e)))?;
    let operation = serde_json::from_str(row.try_get("operation")?)
        .map_err(|e| Error::Internal(format!("Invalid operation in database: {}", e)))?;
    let kind = serde_json::from_str(row.try_get("entity_kind")?)
        .map_err(|e| Error::Internal(format!("Invalid entity kind in database: {}", e)))?;
    let outcome = row
        .try_get::<Option<String>, _>("outcome")?
        .map(|raw| {
            serde_json::from_str(&raw)
                .map_err(|e| Error::Internal(format!("Invalid outcome in database: {}", e)))
        })
        .transpose()?;
    let ended_at = row
        .try_get::<Option<String>, _>("ended_at")?
        .map(|raw| parse_timestamp(&raw))
        .transpose()?;

    Ok(BulkSession {
        session_id: parse_uuid(row.try_get("session_id")?)?,
        state,
        operation,
        kind,
        processed: row.try_get::<i64, _>("processed")? as usize,
        total: row.try_get::<i64, _>("total")? as usize,
        fraction: row.try_get("fraction")?,
        outcome,
        started_at: parse_timestamp(row.try_get("started_at")?)?,
        ended_at,
    })
}
