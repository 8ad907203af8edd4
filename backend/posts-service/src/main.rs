use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use db_pool::{create_pool as create_pg_pool, DbConfig as DbPoolConfig};
use posts_service::config::{Config, StoreBackend};
use posts_service::db::{MemoryPostStore, PgPostStore, PostStore};
use posts_service::handlers;
use posts_service::middleware::{JwtValidator, RequestTiming};
use posts_service::services::PostService;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {}", e);
        }
    }
}

fn init_tracing() {
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into()),
    );

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn build_store(config: &Config) -> Result<Arc<dyn PostStore>> {
    match config.store.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory post store; data is lost on restart");
            Ok(Arc::new(MemoryPostStore::new()))
        }
        StoreBackend::Postgres => {
            let url = config
                .store
                .database_url
                .clone()
                .context("DATABASE_URL is not set")?;

            let db_config = DbPoolConfig::with_url("posts-service", url);
            db_config.log_config();

            let pool = create_pg_pool(db_config)
                .await
                .context("Database pool creation failed")?;

            let store = PgPostStore::new(pool);
            store
                .migrate()
                .await
                .context("Database migration failed")?;

            Ok(Arc::new(store))
        }
    }
}

/// Posts Service
///
/// Serves the posts resource of the social API.
///
/// # Routes
///
/// - `/api/posts/*` - Posts with likes, comments and video entries
/// - `/api/v1/health*` - Liveness and readiness probes
/// - `/metrics` - Prometheus metrics
///
/// Listens on port 5000 unless `POSTS_SERVICE_PORT` says otherwise.
#[actix_web::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {:#}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting posts-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let store = build_store(&config).await?;

    let post_service = web::Data::new(
        PostService::new(store).with_max_attempts(config.mutation_max_attempts),
    );
    let jwt_validator = web::Data::new(JwtValidator::new(&config.auth.jwt_secret));

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Binding HTTP server to {}", bind_address);

    let cors_config = config.cors.clone();

    let server = HttpServer::new(move || {
        let mut cors = Cors::default();
        if cors_config.allows_any() {
            cors = cors.allow_any_origin();
        } else {
            for origin in cors_config.origins() {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(post_service.clone())
            .app_data(jwt_validator.clone())
            .wrap(RequestTiming)
            .wrap(cors)
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(handlers::configure)
    })
    .disable_signals()
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run();

    let server_handle = server.handle();
    let mut server_task = tokio::spawn(server);

    tokio::select! {
        result = &mut server_task => {
            tracing::warn!("HTTP server stopped without a shutdown signal");
            result
                .context("HTTP server task panicked")?
                .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))?;
            return Ok(());
        }
        _ = shutdown_signal() => {
            tracing::info!("Shutdown signal received");
            server_handle.stop(true).await;
        }
    }

    server_task
        .await
        .context("HTTP server task panicked")?
        .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))?;

    tracing::info!("Posts-service shut down");
    Ok(())
}
