//! anidex-api - species catalog ingestion service
//!
//! Accepts multipart species submissions with photos, stores the photos in a
//! flat upload directory and records the entry in SQLite.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anidex_api::db::SqliteAnimalRepository;
use anidex_api::ingest::Ingestor;
use anidex_api::media_store::MediaStore;
use anidex_api::{build_router, AppState};
use anidex_common::config::{ConfigOverrides, NamingPolicy, ServiceConfig, StageOrder, TomlConfig};
use anidex_common::db::init_database;
use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};

/// Command-line arguments for anidex-api
///
/// Every flag falls back to its environment variable, then to the TOML
/// config file, then to a compiled default.
#[derive(Parser, Debug)]
#[command(name = "anidex-api")]
#[command(about = "Species catalog ingestion service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Storage root; uploaded media goes to <root>/uploaded_images
    #[arg(long, env = "RAILWAY_VOLUME_MOUNT_PATH")]
    storage_root: Option<PathBuf>,

    /// SQLite database file (default: <storage root>/anidex.db)
    #[arg(long, env = "ANIDEX_DATABASE")]
    database: Option<PathBuf>,

    /// Token signing salt; authentication is disabled when unset
    #[arg(long, env = "SALT", hide_env_values = true)]
    salt: Option<String>,

    /// Stored file naming: "unique" or "original"
    #[arg(long = "naming", env = "ANIDEX_NAMING_POLICY")]
    naming_policy: Option<NamingPolicy>,

    /// Stage order: "validate-first" or "upload-first"
    #[arg(long, env = "ANIDEX_STAGE_ORDER")]
    stage_order: Option<StageOrder>,

    /// Largest accepted submission body in bytes
    #[arg(long, env = "ANIDEX_MAX_BODY_BYTES")]
    max_body_bytes: Option<usize>,
}

impl From<Args> for ConfigOverrides {
    fn from(args: Args) -> Self {
        Self {
            port: args.port,
            storage_root: args.storage_root,
            database: args.database,
            salt: args.salt,
            naming_policy: args.naming_policy,
            stage_order: args.stage_order,
            max_body_bytes: args.max_body_bytes,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "anidex_api=info,anidex_common=info,tower_http=info".into()),
        )
        .init();

    info!("Starting Anidex API (anidex-api) v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let config = ServiceConfig::resolve(args.into(), TomlConfig::load_or_default())
        .context("Failed to resolve configuration")?;

    info!("Storage root: {}", config.storage_root.display());
    info!("Upload directory: {}", config.upload_dir().display());
    info!(
        "Naming policy: {}, stage order: {}",
        config.naming_policy, config.stage_order
    );
    if config.salt.is_none() {
        warn!("SALT not configured - API authentication disabled");
    }

    let pool = match init_database(&config.database_path).await {
        Ok(pool) => {
            info!("✓ Connection with database established");
            pool
        }
        Err(e) => {
            error!("Failed to open database {}: {}", config.database_path.display(), e);
            return Err(e.into());
        }
    };

    let media = MediaStore::new(config.upload_dir(), config.naming_policy);
    media
        .ensure_dir()
        .await
        .context("Failed to create upload directory")?;

    let ingestor = Ingestor::new(
        media,
        Arc::new(SqliteAnimalRepository::new(pool.clone())),
        config.stage_order,
    );
    let state = AppState::new(ingestor, config.salt.clone(), config.max_body_bytes);
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("anidex-api listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    info!("anidex-api stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
