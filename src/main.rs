//! roster - professional contact service
//!
//! HTTP service over a SQLite contact table, fed record-by-record or
//! through bulk upsert batches that reconcile incoming partial records
//! against what is already stored.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use roster::config::{Args, Settings};
use roster::{build_router, db, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting roster v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let settings = Settings::resolve(args);
    settings.ensure_root_folder()?;

    let db_path = settings.database_path();
    info!("Database path: {}", db_path.display());

    let pool = db::init_database(&db_path).await?;

    let state = AppState::new(pool);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.bind).await?;
    info!("roster listening on http://{}", settings.bind);
    info!("Health check: http://{}/health", settings.bind);

    axum::serve(listener, app).await?;

    Ok(())
}
