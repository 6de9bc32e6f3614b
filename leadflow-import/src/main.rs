//! leadflow-import - Bulk Import Service
//!
//! Accepts CSV uploads and reconciles them into the workspace record store
//! (contacts, properties, relationships) with an exact per-batch tally.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use leadflow_import::AppState;

/// Command-line arguments for leadflow-import
#[derive(Parser, Debug)]
#[command(name = "leadflow-import")]
#[command(about = "Bulk import service for leadflow")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "7310", env = "LEADFLOW_IMPORT_PORT")]
    port: u16,

    /// Root folder holding the record store
    #[arg(short, long, env = "LEADFLOW_ROOT_FOLDER")]
    root_folder: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "leadflow_import=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!(
        "Starting leadflow-import v{} on port {}",
        env!("CARGO_PKG_VERSION"),
        args.port
    );

    let root_folder = leadflow_common::config::resolve_root_folder(
        args.root_folder.as_deref(),
        "LEADFLOW_ROOT_FOLDER",
    );
    let db_path = leadflow_common::config::ensure_root_folder(&root_folder)
        .context("Failed to initialize root folder")?;
    info!("Database: {}", db_path.display());

    let db_pool = leadflow_common::db::init_database(&db_path).await?;
    info!("Database connection established");

    let state = AppState::new(db_pool);
    let app = leadflow_import::build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", args.port)).await?;
    info!("Listening on http://127.0.0.1:{}", args.port);

    axum::serve(listener, app).await?;

    Ok(())
}
