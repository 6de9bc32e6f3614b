//! leadflow-msg - Messaging Service
//!
//! Gated outbound SMS with per-user send windows and daily limits, message
//! and thread persistence, and AI lead-status classification write-back.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use leadflow_msg::classifier::{HttpClassifier, DEFAULT_CLASSIFIER_URL};
use leadflow_msg::transport::{HttpSmsTransport, DEFAULT_GATEWAY_URL};
use leadflow_msg::AppState;

/// Command-line arguments for leadflow-msg
#[derive(Parser, Debug)]
#[command(name = "leadflow-msg")]
#[command(about = "Messaging service for leadflow")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "7320", env = "LEADFLOW_MSG_PORT")]
    port: u16,

    /// Root folder holding the record store
    #[arg(short, long, env = "LEADFLOW_ROOT_FOLDER")]
    root_folder: Option<String>,

    /// SMS gateway endpoint
    #[arg(long, default_value = DEFAULT_GATEWAY_URL, env = "LEADFLOW_GATEWAY_URL")]
    gateway_url: String,

    /// Lead-status classifier endpoint
    #[arg(long, default_value = DEFAULT_CLASSIFIER_URL, env = "LEADFLOW_CLASSIFIER_URL")]
    classifier_url: String,

    /// Classifier API key
    #[arg(long, env = "LEADFLOW_CLASSIFIER_API_KEY")]
    classifier_api_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "leadflow_msg=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!(
        "Starting leadflow-msg v{} on port {}",
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

    let transport = Arc::new(HttpSmsTransport::new(args.gateway_url));
    let classifier = Arc::new(HttpClassifier::new(
        args.classifier_url,
        args.classifier_api_key,
    ));

    let state = AppState::new(db_pool, transport, classifier);
    let app = leadflow_msg::build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", args.port)).await?;
    info!("Listening on http://127.0.0.1:{}", args.port);

    axum::serve(listener, app).await?;

    Ok(())
}
