use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shareable_lists_core::{
    create_audit_system, create_authenticator, load_config, validate_config, AuditErrorTracker,
    AuditEvent, AuditStore, Authenticator, DeletionPipeline, ErrorTracker, HttpQueueClient,
    ListItemStore, QueueClient, SqliteAuditStore, SqliteListItemStore,
};
use shareable_lists_server::api::create_router;
use shareable_lists_server::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Buffer size for audit event channel
const AUDIT_BUFFER_SIZE: usize = 1000;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let registry = tracing_subscriber::registry().with(
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "info,tower_http=debug".into()),
    );
    // LOG_FORMAT=json for log shippers, human-readable otherwise
    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    let config_path = std::env::var("SHAREABLE_LISTS_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    info!(
        auth = ?config.auth.method,
        database = ?config.database.path,
        queue = %config.queue.url,
        page_size = config.pipeline.page_size,
        chunk_size = config.pipeline.chunk_size,
        batch_size = config.pipeline.batch_size,
        "Configuration loaded"
    );

    // Short hash of the effective config for the audit trail
    let config_json =
        serde_json::to_string(&config).context("Failed to serialize configuration")?;
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));

    let authenticator: Arc<dyn Authenticator> = Arc::from(
        create_authenticator(&config.auth).context("Failed to create authenticator")?,
    );
    info!("Using authenticator: {}", authenticator.method_name());

    let audit_store: Arc<dyn AuditStore> = Arc::new(
        SqliteAuditStore::new(&config.database.path).context("Failed to create audit store")?,
    );
    let list_items: Arc<dyn ListItemStore> = Arc::new(
        SqliteListItemStore::new(&config.database.path)
            .context("Failed to create list item store")?,
    );
    info!("Stores initialized");

    let (audit_handle, audit_writer) =
        create_audit_system(Arc::clone(&audit_store), AUDIT_BUFFER_SIZE);
    let writer_handle = tokio::spawn(audit_writer.run());

    audit_handle
        .emit(AuditEvent::ServiceStarted {
            version: VERSION.to_string(),
            config_hash: config_hash[..16].to_string(),
        })
        .await;

    let queue: Arc<dyn QueueClient> = Arc::new(
        HttpQueueClient::new(config.queue.clone()).context("Failed to create queue client")?,
    );
    let tracker: Arc<dyn ErrorTracker> = Arc::new(AuditErrorTracker::new(audit_handle.clone()));
    info!(queue = queue.name(), tracker = tracker.name(), "Deletion pipeline ready");

    let pipeline = DeletionPipeline::new(
        config.pipeline.clone(),
        Arc::clone(&list_items),
        queue,
        tracker,
    );

    let addr = SocketAddr::new(config.server.host, config.server.port);
    let state = Arc::new(AppState::new(
        config,
        authenticator,
        audit_handle.clone(),
        audit_store,
        list_items,
        pipeline,
    ));
    let app = create_router(state);

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    audit_handle
        .emit(AuditEvent::ServiceStopped {
            reason: "graceful_shutdown".to_string(),
        })
        .await;

    // The router (and the pipeline's tracker inside it) is gone once serve
    // returns, so this is the last sender
    drop(audit_handle);
    let _ = writer_handle.await;
    info!("Audit writer stopped");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
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
            Ok(mut sig) => {
                sig.recv().await;
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
