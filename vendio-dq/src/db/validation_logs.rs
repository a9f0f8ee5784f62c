//! Validation audit log operations
//!
//! Rows are inserted once per full validation run and never updated or
//! deleted.

use sqlx::SqlitePool;
use vendio_common::Result;

use super::encode_string_list;
use crate::models::ValidationLog;

/// Append one audit entry
pub async fn append(pool: &SqlitePool, entry: &ValidationLog) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO data_validation_logs (
            id, module_name, table_name, validation_type, validation_status,
            errors, suggestions, validated_by, validated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(entry.id.to_string())
    .bind(&entry.module_name)
    .bind(&entry.table_name)
    .bind(&entry.validation_type)
    .bind(&entry.validation_status)
    .bind(encode_string_list(&entry.errors)?)
    .bind(encode_string_list(&entry.suggestions)?)
    .bind(&entry.validated_by)
    .bind(entry.validated_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn count(pool: &SqlitePool) -> Result<i64> {
    Ok(sqlx::query_scalar("SELECT COUNT(*) FROM data_validation_logs")
        .fetch_one(pool)
        .await?)
}
