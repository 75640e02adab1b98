//! anicolle-server - AniColle microblog service
//!
//! Users post short entries tagged with anime titles, comment in threads,
//! like posts and search an external anime database by broadcast season.
//!
//! [MB-CFG]: Zero-config startup; CLI > environment > TOML > defaults

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anicolle_common::config::{self, ServerConfig};
use anicolle_common::db::init_database;
use anyhow::{Context, Result};
use clap::Parser;
use sqlx::SqlitePool;
use tracing::{error, info, warn};

use anicolle_server::db::sessions;
use anicolle_server::{build_router, AppState};

/// How often expired sessions are swept from the database
const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(3600);

#[derive(Debug, Parser)]
#[command(name = "anicolle-server", version, about = "AniColle microblog service")]
struct Args {
    /// Folder holding anicolle.db
    #[arg(long, env = "ANICOLLE_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Path to anicolle.toml (default: platform config directory)
    #[arg(long, env = "ANICOLLE_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(long, env = "ANICOLLE_PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(long, env = "ANICOLLE_BIND_ADDRESS")]
    bind_address: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load config before tracing so log_level can come from the file;
    // problems found while loading are logged once tracing is up.
    let mut server_config = ServerConfig::load(args.config.as_deref());

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&server_config.log_level)),
        )
        .init();

    // Build identification immediately after tracing init
    info!(
        "Starting AniColle (anicolle-server) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    if let Some(port) = args.port {
        server_config.port = port;
    }
    if let Some(bind_address) = args.bind_address {
        server_config.bind_address = bind_address;
    }

    let root_folder = config::resolve_root_folder(args.root_folder.as_deref(), &server_config);
    config::ensure_root_folder(&root_folder)?;

    let db_path = config::database_path(&root_folder);
    info!("Database path: {}", db_path.display());

    let pool = match init_database(&db_path).await {
        Ok(pool) => {
            info!("✓ Database ready");
            pool
        }
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e.into());
        }
    };

    spawn_session_purge(pool.clone());

    info!("Anime API: {}", server_config.anime_api_base_url);
    let state = AppState::from_config(pool, &server_config)?;
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", server_config.bind_address, server_config.port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid listen address {}:{}",
                server_config.bind_address, server_config.port
            )
        })?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("anicolle-server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("anicolle-server stopped");
    Ok(())
}

fn spawn_session_purge(pool: SqlitePool) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_PURGE_INTERVAL);
        loop {
            interval.tick().await;
            match sessions::purge_expired(&pool).await {
                Ok(0) => {}
                Ok(n) => info!("Purged {} expired sessions", n),
                Err(e) => warn!("Session purge failed: {}", e),
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
