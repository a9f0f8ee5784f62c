//! Deal table operations

use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;
use vendio_common::{Error, Result};

use super::{decode_string_list, encode_string_list, parse_day, parse_timestamp, parse_uuid};
use crate::models::{Deal, DealPatch};

const COLUMNS: &str = "id, title, customer_id, value, status, expected_close_on, assignee, \
                       data_quality_score, validation_errors, created_at";

fn from_row(row: &SqliteRow) -> Result<Deal> {
    let customer_id = row
        .try_get::<Option<String>, _>("customer_id")?
        .map(|raw| parse_uuid(&raw))
        .transpose()?;
    let expected_close_on = row
        .try_get::<Option<String>, _>("expected_close_on")?
        .map(|raw| parse_day(&raw))
        .transpose()?;

    Ok(Deal {
        id: parse_uuid(row.try_get("id")?)?,
        title: row.try_get("title")?,
        customer_id,
        value: row.try_get("value")?,
        status: row.try_get("status")?,
        expected_close_on,
        assignee: row.try_get("assignee")?,
        data_quality_score: row.try_get("data_quality_score")?,
        validation_errors: decode_string_list(row.try_get("validation_errors")?),
        created_at: parse_timestamp(row.try_get("created_at")?)?,
    })
}

/// Full table snapshot, newest first
pub async fn fetch_all(pool: &SqlitePool) -> Result<Vec<Deal>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM deals ORDER BY created_at DESC",
        COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    rows.iter().map(from_row).collect()
}

pub async fn fetch_one(pool: &SqlitePool, id: Uuid) -> Result<Option<Deal>> {
    let row = sqlx::query(&format!("SELECT {} FROM deals WHERE id = ?", COLUMNS))
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(from_row).transpose()
}

pub async fn insert(pool: &SqlitePool, deal: &Deal) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO deals (
            id, title, customer_id, value, status, expected_close_on, assignee,
            data_quality_score, validation_errors, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(deal.id.to_string())
    .bind(&deal.title)
    .bind(deal.customer_id.map(|id| id.to_string()))
    .bind(deal.value)
    .bind(&deal.status)
    .bind(deal.expected_close_on.map(|d| d.to_string()))
    .bind(&deal.assignee)
    .bind(deal.data_quality_score)
    .bind(encode_string_list(&deal.validation_errors)?)
    .bind(deal.created_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Apply a partial update; errors with NotFound when the id does not exist
pub async fn update<'e, E>(executor: E, id: Uuid, patch: &DealPatch) -> Result<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let mut sets = Vec::new();
    if patch.title.is_some() {
        sets.push("title = ?");
    }
    if patch.customer_id.is_some() {
        sets.push("customer_id = ?");
    }
    if patch.value.is_some() {
        sets.push("value = ?");
    }
    if patch.status.is_some() {
        sets.push("status = ?");
    }
    if patch.expected_close_on.is_some() {
        sets.push("expected_close_on = ?");
    }
    if patch.assignee.is_some() {
        sets.push("assignee = ?");
    }
    if sets.is_empty() {
        return Err(Error::InvalidInput("Empty deal update".to_string()));
    }

    let sql = format!("UPDATE deals SET {} WHERE id = ?", sets.join(", "));
    let mut query = sqlx::query(&sql);
    if let Some(v) = &patch.title {
        query = query.bind(v);
    }
    if let Some(v) = patch.customer_id {
        query = query.bind(v.to_string());
    }
    if let Some(v) = patch.value {
        query = query.bind(v);
    }
    if let Some(v) = &patch.status {
        query = query.bind(v);
    }
    if let Some(v) = patch.expected_close_on {
        query = query.bind(v.to_string());
    }
    if let Some(v) = &patch.assignee {
        query = query.bind(v);
    }

    let result = query.bind(id.to_string()).execute(executor).await?;
    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Deal not found: {}", id)));
    }

    Ok(())
}

pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let result = sqlx::query("DELETE FROM deals WHERE id = ?")
        .bind(id.to_string())
        .execute(executor)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Deal not found: {}", id)));
    }

    Ok(())
}

/// Overwrite the quality score and message list from the latest run
pub async fn update_quality(
    pool: &SqlitePool,
    id: Uuid,
    score: u8,
    messages: &[String],
) -> Result<()> {
    let result = sqlx::query(
        "UPDATE deals SET data_quality_score = ?, validation_errors = ? WHERE id = ?",
    )
    .bind(score as i64)
    .bind(encode_string_list(messages)?)
    .bind(id.to_string())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Deal not found: {}", id)));
    }

    Ok(())
}

pub async fn count(pool: &SqlitePool) -> Result<i64> {
    Ok(sqlx::query_scalar("SELECT COUNT(*) FROM deals")
        .fetch_one(pool)
        .await?)
}
