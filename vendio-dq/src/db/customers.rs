//! Customer table operations

use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;
use vendio_common::{Error, Result};

use super::{decode_string_list, encode_string_list, parse_timestamp, parse_uuid};
use crate::models::{Customer, CustomerPatch};

const COLUMNS: &str = "id, name, email, phone, address, city, state, status, \
                       last_contact_at, data_quality_score, validation_errors, created_at";

fn from_row(row: &SqliteRow) -> Result<Customer> {
    let last_contact_at = row
        .try_get::<Option<String>, _>("last_contact_at")?
        .map(|raw| parse_timestamp(&raw))
        .transpose()?;

    Ok(Customer {
        id: parse_uuid(row.try_get("id")?)?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        address: row.try_get("address")?,
        city: row.try_get("city")?,
        state: row.try_get("state")?,
        status: row.try_get("status")?,
        last_contact_at,
        data_quality_score: row.try_get("data_quality_score")?,
        validation_errors: decode_string_list(row.try_get("validation_errors")?),
        created_at: parse_timestamp(row.try_get("created_at")?)?,
    })
}

/// Full table snapshot, newest first
pub async fn fetch_all(pool: &SqlitePool) -> Result<Vec<Customer>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM customers ORDER BY created_at DESC",
        COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    rows.iter().map(from_row).collect()
}

pub async fn fetch_one(pool: &SqlitePool, id: Uuid) -> Result<Option<Customer>> {
    let row = sqlx::query(&format!("SELECT {} FROM customers WHERE id = ?", COLUMNS))
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(from_row).transpose()
}

pub async fn insert(pool: &SqlitePool, customer: &Customer) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO customers (
            id, name, email, phone, address, city, state, status,
            last_contact_at, data_quality_score, validation_errors, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(customer.id.to_string())
    .bind(&customer.name)
    .bind(&customer.email)
    .bind(&customer.phone)
    .bind(&customer.address)
    .bind(&customer.city)
    .bind(&customer.state)
    .bind(&customer.status)
    .bind(customer.last_contact_at.map(|dt| dt.to_rfc3339()))
    .bind(customer.data_quality_score)
    .bind(encode_string_list(&customer.validation_errors)?)
    .bind(customer.created_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Apply a partial update; errors with NotFound when the id does not exist
pub async fn update<'e, E>(executor: E, id: Uuid, patch: &CustomerPatch) -> Result<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let mut sets = Vec::new();
    if patch.name.is_some() {
        sets.push("name = ?");
    }
    if patch.email.is_some() {
        sets.push("email = ?");
    }
    if patch.phone.is_some() {
        sets.push("phone = ?");
    }
    if patch.address.is_some() {
        sets.push("address = ?");
    }
    if patch.city.is_some() {
        sets.push("city = ?");
    }
    if patch.state.is_some() {
        sets.push("state = ?");
    }
    if patch.status.is_some() {
        sets.push("status = ?");
    }
    if sets.is_empty() {
        return Err(Error::InvalidInput("Empty customer update".to_string()));
    }

    let sql = format!("UPDATE customers SET {} WHERE id = ?", sets.join(", "));
    let mut query = sqlx::query(&sql);
    if let Some(v) = &patch.name {
        query = query.bind(v);
    }
    if let Some(v) = &patch.email {
        query = query.bind(v);
    }
    if let Some(v) = &patch.phone {
        query = query.bind(v);
    }
    if let Some(v) = &patch.address {
        query = query.bind(v);
    }
    if let Some(v) = &patch.city {
        query = query.bind(v);
    }
    if let Some(v) = &patch.state {
        query = query.bind(v);
    }
    if let Some(v) = &patch.status {
        query = query.bind(v);
    }

    let result = query.bind(id.to_string()).execute(executor).await?;
    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Customer not found: {}", id)));
    }

    Ok(())
}

pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let result = sqlx::query("DELETE FROM customers WHERE id = ?")
        .bind(id.to_string())
        .execute(executor)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Customer not found: {}", id)));
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
        "UPDATE customers SET data_quality_score = ?, validation_errors = ? WHERE id = ?",
    )
    .bind(score as i64)
    .bind(encode_string_list(messages)?)
    .bind(id.to_string())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Customer not found: {}", id)));
    }

    Ok(())
}

pub async fn count(pool: &SqlitePool) -> Result<i64> {
    Ok(sqlx::query_scalar("SELECT COUNT(*) FROM customers")
        .fetch_one(pool)
        .await?)
}
