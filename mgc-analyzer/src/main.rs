//! mgc-analyzer - Music genre classification microservice
//!
//! Accepts an uploaded audio clip, extracts tempo/spectral/energy features
//! from its first seconds and maps them to a genre with a fixed rule table.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info};

use mgc_analyzer::{build_router, AnalyzerConfig, AppState};
use mgc_common::config::{load_toml_config, resolve, CompiledDefaults, CONFIG_ENV_VAR};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "mgc-analyzer")]
#[command(about = "Rule-based music genre classification service")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    /// Listen address
    #[arg(short, long, env = "MGC_BIND")]
    bind: Option<String>,

    /// HTTP server port
    #[arg(short, long, env = "MGC_PORT")]
    port: Option<u16>,

    /// Directory where uploads are staged during analysis
    #[arg(short, long, env = "MGC_UPLOAD_DIR")]
    upload_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // The configured log level is only known once the file is parsed
    let loaded = load_toml_config(args.config.as_deref())?;

    mgc_common::logging::init_logging(
        &loaded.config.logging.level,
        &[env!("CARGO_PKG_NAME"), "mgc-common"],
    )?;

    info!("Starting mgc-analyzer (Music Genre Classifier)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    loaded.log_source();
    let toml_config = loaded.config;

    let bind = resolve(
        args.bind,
        toml_config.bind.clone(),
        CompiledDefaults::BIND.to_string(),
    );
    let port = resolve(args.port, toml_config.port, CompiledDefaults::PORT);

    let config = AnalyzerConfig::resolve(args.upload_dir, &toml_config);
    let upload_dir = config.ensure_upload_dir().with_context(|| {
        format!(
            "Failed to create upload directory {}",
            config.upload_dir.display()
        )
    })?;
    info!("Upload directory: {}", upload_dir.display());
    info!(
        max_duration_secs = config.max_duration.as_secs_f64(),
        timeout_secs = config.analysis_timeout.as_secs(),
        max_upload_bytes = config.max_upload_bytes,
        "Analysis limits"
    );

    let app = build_router(AppState::new(config));

    let listener = tokio::net::TcpListener::bind((bind.as_str(), port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", bind, port))?;
    let addr: SocketAddr = listener.local_addr()?;

    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("mgc-analyzer stopped");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
