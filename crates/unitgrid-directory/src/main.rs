//! Unit Directory Server Binary
//!
//! Runs the directory HTTP server for unit enrollment.

use std::env;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use unitgrid_core::JwtIssuer;
use unitgrid_directory::{
    create_router, AppState, DirectoryConfig, Enrollment, MemoryStore, UnitStore,
    ValidationPolicy,
};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    let log_level = env::var("UNITGRID_LOG_LEVEL")
        .unwrap_or_else(|_| "info".into())
        .parse()
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(true)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to set tracing subscriber: {}", e);
        return ExitCode::FAILURE;
    }

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Directory server stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = DirectoryConfig::from_env()?;

    let store = open_store(&config).await?;

    let ttl = chrono::Duration::try_seconds(config.token_ttl_secs)
        .ok_or("UNITGRID_TOKEN_TTL_SECS out of range")?;
    let issuer = JwtIssuer::new(config.token_secret.as_bytes()).with_ttl(ttl);

    let enrollment = Enrollment::new(
        store,
        Arc::new(issuer),
        ValidationPolicy::new(config.key_binding),
    );

    info!(
        port = config.port,
        key_binding = ?config.key_binding,
        token_ttl_secs = config.token_ttl_secs,
        "Starting unit directory"
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = Arc::new(AppState { enrollment, config });
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "Unit directory listening");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
    Ok(())
}

#[cfg(feature = "postgres")]
async fn open_store(config: &DirectoryConfig) -> Result<Arc<dyn UnitStore>, Box<dyn std::error::Error>> {
    if let Some(url) = &config.database_url {
        let store = unitgrid_directory::storage::PostgresStore::new(url).await?;
        return Ok(Arc::new(store));
    }
    info!("UNITGRID_DATABASE_URL not set, using in-memory unit store");
    Ok(Arc::new(MemoryStore::new()))
}

#[cfg(not(feature = "postgres"))]
async fn open_store(config: &DirectoryConfig) -> Result<Arc<dyn UnitStore>, Box<dyn std::error::Error>> {
    if config.database_url.is_some() {
        tracing::warn!("UNITGRID_DATABASE_URL ignored: built without the postgres feature");
    }
    Ok(Arc::new(MemoryStore::new()))
}
