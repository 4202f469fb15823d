//! Homeshare server: chunked uploads and OTP-protected folder sharing.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing;
use tracing_subscriber::{EnvFilter, fmt};

use homeshare_api::{AppState, build_router};
use homeshare_auth::jwt::{JwtDecoder, JwtEncoder};
use homeshare_auth::secret::load_or_create_secret;
use homeshare_core::config::AppConfig;
use homeshare_core::error::AppError;
use homeshare_database::{
    DatabasePool, MemoryShareStore, MemoryUserStore, ShareRepository, ShareStore, UserRepository,
    UserStore,
};
use homeshare_service::{AuthService, BackgroundTasks, FileService, SharingService, UploadService};
use homeshare_storage::{LockRegistry, StorageLayout};
use homeshare_worker::{CronScheduler, ExpiryCleanupJob};

#[tokio::main]
async fn main() {
    let env = std::env::var("HOMESHARE_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!("Loaded configuration (env: {})", env);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Homeshare v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Signing secret ───────────────────────────────────
    let secret = load_or_create_secret(&config.auth).await?;
    let jwt_encoder = Arc::new(JwtEncoder::new(&secret));
    let jwt_decoder = Arc::new(JwtDecoder::new(&secret));

    // ── Step 2: Stores ───────────────────────────────────────────
    let db_pool = if config.database.in_memory {
        tracing::warn!("Using in-memory stores; shares and accounts are lost on restart");
        None
    } else {
        let db = DatabasePool::connect(&config.database).await?;
        homeshare_database::migration::run_migrations(db.pool()).await?;
        Some(db)
    };
    let (share_store, user_store): (Arc<dyn ShareStore>, Arc<dyn UserStore>) = match &db_pool {
        Some(db) => (
            Arc::new(ShareRepository::new(db.pool().clone())) as Arc<dyn ShareStore>,
            Arc::new(UserRepository::new(db.pool().clone())) as Arc<dyn UserStore>,
        ),
        None => (
            Arc::new(MemoryShareStore::new()) as Arc<dyn ShareStore>,
            Arc::new(MemoryUserStore::new()) as Arc<dyn UserStore>,
        ),
    };

    // ── Step 3: Storage layout ───────────────────────────────────
    let layout = StorageLayout::new(&config.storage);
    layout.ensure_directories().await?;
    tracing::info!(
        upload_root = %layout.upload_root().display(),
        sharing_root = %layout.sharing_root().display(),
        "Storage directories ready"
    );

    // ── Step 4: Lock registry and assembly tasks ─────────────────
    let locks = Arc::new(LockRegistry::new(config.worker.lock_timeout()));
    let sweeper = locks.spawn_sweeper(config.worker.lock_sweep_interval());
    let tasks = BackgroundTasks::new();

    // ── Step 5: Services ─────────────────────────────────────────
    let auth_service = Arc::new(AuthService::new(
        user_store,
        Arc::clone(&jwt_encoder),
        Arc::clone(&jwt_decoder),
        &config.auth,
    ));
    auth_service.seed_admin(&config.auth).await?;

    let sharing_service = SharingService::new(
        share_store,
        layout.clone(),
        Arc::clone(&jwt_encoder),
        config.auth.share_access_ttl(),
    );
    let upload_service = Arc::new(UploadService::new(
        layout.clone(),
        Arc::clone(&locks),
        tasks.clone(),
        config.storage.max_chunk_size_bytes,
    ));
    let file_service = Arc::new(FileService::new(layout.clone(), Arc::clone(&locks)));

    // ── Step 6: Scheduled sweeps ─────────────────────────────────
    let mut scheduler = if config.worker.enabled {
        let cleanup = ExpiryCleanupJob::new(
            sharing_service.clone(),
            Arc::clone(&upload_service),
            config.worker.staging_max_age(),
        );
        let scheduler = CronScheduler::new(cleanup).await?;
        scheduler.register_default_tasks(&config.worker).await?;
        scheduler.start().await?;
        Some(scheduler)
    } else {
        tracing::info!("Scheduled sweeps disabled");
        None
    };

    // ── Step 7: HTTP server ──────────────────────────────────────
    let app_state = AppState {
        auth: auth_service,
        sharing: Arc::new(sharing_service),
        uploads: upload_service,
        files: file_service,
        refresh_cookie: config.auth.refresh_cookie_name.clone(),
        upload_body_limit: config.server.body_limit_bytes,
    };
    let app = build_router(app_state);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Homeshare server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    // ── Step 8: Drain background work ────────────────────────────
    if let Some(scheduler) = scheduler.as_mut() {
        if let Err(e) = scheduler.shutdown().await {
            tracing::warn!("Scheduler shutdown failed: {}", e);
        }
    }
    tasks.shutdown().await;
    locks.shutdown();
    if let Err(e) = sweeper.await {
        tracing::warn!("Lock sweeper ended abnormally: {}", e);
    }
    if let Some(db) = db_pool {
        db.close().await;
    }

    tracing::info!("Homeshare server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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
