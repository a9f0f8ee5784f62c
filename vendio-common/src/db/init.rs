//! Database initialization
//!
//! Creates the service database on first run and brings an existing one up to
//! the current schema. All `CREATE TABLE` statements are idempotent, so
//! initialization is safe to run on every startup.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL allows concurrent readers while a bulk run is writing
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables and seed default settings (idempotent)
///
/// Exposed separately from [`init_database`] so tests can run the schema
/// against an in-memory pool.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_schema_version_table(pool).await?;
    create_settings_table(pool).await?;

    // Entity tables
    create_customers_table(pool).await?;
    create_transactions_table(pool).await?;
    create_deals_table(pool).await?;

    // Data quality pipeline tables
    create_validation_logs_table(pool).await?;
    create_bulk_sessions_table(pool).await?;

    init_default_settings(pool).await?;

    Ok(())
}

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (1)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the settings table
///
/// Stores service configuration key-value pairs.
pub async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_customers_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS customers (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT,
            phone TEXT,
            address TEXT,
            city TEXT,
            state TEXT,
            status TEXT,
            last_contact_at TIMESTAMP,
            data_quality_score INTEGER,
            validation_errors TEXT NOT NULL DEFAULT '[]',
            created_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_transactions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS transactions (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT,
            category TEXT NOT NULL,
            tx_type TEXT NOT NULL,
            amount REAL NOT NULL,
            occurred_on TEXT NOT NULL,
            status TEXT,
            payment_method TEXT,
            source TEXT,
            customer_name TEXT,
            data_quality_score INTEGER,
            validation_errors TEXT NOT NULL DEFAULT '[]',
            created_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_deals_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS deals (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            customer_id TEXT,
            value REAL,
            status TEXT,
            expected_close_on TEXT,
            assignee TEXT,
            data_quality_score INTEGER,
            validation_errors TEXT NOT NULL DEFAULT '[]',
            created_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Append-only audit log of validation runs
async fn create_validation_logs_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS data_validation_logs (
            id TEXT PRIMARY KEY,
            module_name TEXT NOT NULL,
            table_name TEXT NOT NULL,
            validation_type TEXT NOT NULL,
            validation_status TEXT NOT NULL,
            errors TEXT NOT NULL DEFAULT '[]',
            suggestions TEXT NOT NULL DEFAULT '[]',
            validated_by TEXT NOT NULL,
            validated_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_bulk_sessions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bulk_sessions (
            session_id TEXT PRIMARY KEY,
            state TEXT NOT NULL,
            operation TEXT NOT NULL,
            entity_kind TEXT NOT NULL,
            processed INTEGER NOT NULL DEFAULT 0,
            total INTEGER NOT NULL DEFAULT 0,
            fraction REAL NOT NULL DEFAULT 0.0,
            outcome TEXT,
            started_at TIMESTAMP NOT NULL,
            ended_at TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Initialize or update default settings
///
/// Ensures all required settings exist with default values. NULL values are
/// reset to their defaults.
async fn init_default_settings(pool: &SqlitePool) -> Result<()> {
    super::settings::ensure_setting(pool, "dq_listen_port", "5750").await?;
    super::settings::ensure_setting(pool, "dq_bulk_mode", "sequential").await?;
    super::settings::ensure_setting(pool, "dq_stale_contact_days", "90").await?;
    super::settings::ensure_setting(pool, "dq_amount_warning_threshold", "500000").await?;

    Ok(())
}
