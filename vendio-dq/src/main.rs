//! vendio-dq (Data Quality) - CRM record validation and bulk operation service
//!
//! Scores customer, transaction, and deal records against fixed rule
//! checklists, persists the scores, and exposes bulk update/delete and CSV
//! import/export over HTTP.

use anyhow::Result;
use tracing::{error, info};
use vendio_common::config;
use vendio_common::db::settings::get_setting_i64;
use vendio_dq::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init, before any
    // database delays
    info!(
        "Starting Vendio Data Quality (vendio-dq) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    // Root folder: CLI arg > env var > config file > OS default
    let cli_root = std::env::args().nth(1);
    let root_folder = config::resolve_root_folder(cli_root.as_deref());
    config::ensure_root_folder(&root_folder)?;

    let db_path = config::database_path(&root_folder);
    info!("Database path: {}", db_path.display());

    let pool = match vendio_common::db::init_database(&db_path).await {
        Ok(pool) => {
            info!("✓ Connected to database");
            pool
        }
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return Err(e.into());
        }
    };

    let port = get_setting_i64(&pool, "dq_listen_port", 5750).await? as u16;

    // Create application state and router
    let state = AppState::new(pool);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    info!("vendio-dq listening on http://127.0.0.1:{}", port);
    info!("Health check: http://127.0.0.1:{}/health", port);

    axum::serve(listener, app).await?;

    Ok(())
}
