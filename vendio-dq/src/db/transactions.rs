//! Transaction table operations

use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;
use vendio_common::{Error, Result};

use super::{decode_string_list, encode_string_list, parse_day, parse_timestamp, parse_uuid};
use crate::models::{Transaction, TransactionPatch, TxType};

const COLUMNS: &str = "id, title, description, category, tx_type, amount, occurred_on, \
                       status, payment_method, source, customer_name, \
                       data_quality_score, validation_errors, created_at";

fn from_row(row: &SqliteRow) -> Result<Transaction> {
    let tx_type: String = row.try_get("tx_type")?;
    let tx_type = tx_type
        .parse::<TxType>()
        .map_err(Error::Internal)?;

    Ok(Transaction {
        id: parse_uuid(row.try_get("id")?)?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        category: row.try_get("category")?,
        tx_type,
        amount: row.try_get("amount")?,
        occurred_on: parse_day(row.try_get("occurred_on")?)?,
        status: row.try_get("status")?,
        payment_method: row.try_get("payment_method")?,
        source: row.try_get("source")?,
        customer_name: row.try_get("customer_name")?,
        data_quality_score: row.try_get("data_quality_score")?,
        validation_errors: decode_string_list(row.try_get("validation_errors")?),
        created_at: parse_timestamp(row.try_get("created_at")?)?,
    })
}

/// Full table snapshot, newest first
pub async fn fetch_all(pool: &SqlitePool) -> Result<Vec<Transaction>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM transactions ORDER BY created_at DESC",
        COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    rows.iter().map(from_row).collect()
}

pub async fn fetch_one(pool: &SqlitePool, id: Uuid) -> Result<Option<Transaction>> {
    let row = sqlx::query(&format!("SELECT {} FROM transactions WHERE id = ?", COLUMNS))
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(from_row).transpose()
}

pub async fn insert(pool: &SqlitePool, tx: &Transaction) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO transactions (
            id, title, description, category, tx_type, amount, occurred_on,
            status, payment_method, source, customer_name,
            data_quality_score, validation_errors, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(tx.id.to_string())
    .bind(&tx.title)
    .bind(&tx.description)
    .bind(&tx.category)
    .bind(tx.tx_type.as_str())
    .bind(tx.amount)
    .bind(tx.occurred_on.to_string())
    .bind(&tx.status)
    .bind(&tx.payment_method)
    .bind(&tx.source)
    .bind(&tx.customer_name)
    .bind(tx.data_quality_score)
    .bind(encode_string_list(&tx.validation_errors)?)
    .bind(tx.created_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Apply a partial update; errors with NotFound when the id does not exist
pub async fn update<'e, E>(executor: E, id: Uuid, patch: &TransactionPatch) -> Result<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let mut sets = Vec::new();
    if patch.title.is_some() {
        sets.push("title = ?");
    }
    if patch.description.is_some() {
        sets.push("description = ?");
    }
    if patch.category.is_some() {
        sets.push("category = ?");
    }
    if patch.tx_type.is_some() {
        sets.push("tx_type = ?");
    }
    if patch.amount.is_some() {
        sets.push("amount = ?");
    }
    if patch.occurred_on.is_some() {
        sets.push("occurred_on = ?");
    }
    if patch.status.is_some() {
        sets.push("status = ?");
    }
    if patch.payment_method.is_some() {
        sets.push("payment_method = ?");
    }
    if sets.is_empty() {
        return Err(Error::InvalidInput("Empty transaction update".to_string()));
    }

    let sql = format!("UPDATE transactions SET {} WHERE id = ?", sets.join(", "));
    let mut query = sqlx::query(&sql);
    if let Some(v) = &patch.title {
        query = query.bind(v);
    }
    if let Some(v) = &patch.description {
        query = query.bind(v);
    }
    if let Some(v) = &patch.category {
        query = query.bind(v);
    }
    if let Some(v) = patch.tx_type {
        query = query.bind(v.as_str());
    }
    if let Some(v) = patch.amount {
        query = query.bind(v);
    }
    if let Some(v) = patch.occurred_on {
        query = query.bind(v.to_string());
    }
    if let Some(v) = &patch.status {
        query = query.bind(v);
    }
    if let Some(v) = &patch.payment_method {
        query = query.bind(v);
    }

    let result = query.bind(id.to_string()).execute(executor).await?;
    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Transaction not found: {}", id)));
    }

    Ok(())
}

pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let result = sqlx::query("DELETE FROM transactions WHERE id = ?")
        .bind(id.to_string())
        .execute(executor)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Transaction not found: {}", id)));
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
        "UPDATE transactions SET data_quality_score = ?, validation_errors = ? WHERE id = ?",
    )
    .bind(score as i64)
    .bind(encode_string_list(messages)?)
    .bind(id.to_string())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Transaction not found: {}", id)));
    }

    Ok(())
}

pub async fn count(pool: &SqlitePool) -> Result<i64> {
    Ok(sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
        .fetch_one(pool)
        .await?)
}
