//! Tavola Server - restaurant reservation calendar
//!
//! REST API serving bookable dates and reservation/closure administration.

use anyhow::Context;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tavola_server::{
    api,
    config::{AppConfig, LoggingConfig, RedisConfig},
    repository::Repository,
    services::{cache::AvailabilityCache, Services},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    init_tracing(&config.logging);

    tracing::info!("Starting Tavola Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations completed");

    let cache = connect_cache(&config.redis).await;

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(repository, &config.reservations, cache)
        .context("Invalid reservations configuration")?;

    services
        .repository
        .settings
        .store_reservation_policy(
            services.availability.settings(),
            config.reservations.utc_offset_minutes,
        )
        .await
        .context("Failed to store reservation settings")?;

    tracing::info!(
        lead_days = config.reservations.lead_days,
        max_per_day = config.reservations.max_per_day,
        horizon_days = config.reservations.horizon_days,
        "Availability rules loaded"
    );

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().context("Invalid host address")?,
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("tavola_server={},tower_http=debug", logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// The cache is optional: a disabled or unreachable Redis only costs rebuilds.
async fn connect_cache(redis: &RedisConfig) -> Option<AvailabilityCache> {
    if !redis.enabled {
        tracing::info!("Redis cache disabled");
        return None;
    }

    match AvailabilityCache::new(&redis.url, redis.window_ttl_seconds).await {
        Ok(cache) => {
            tracing::info!("Connected to Redis");
            Some(cache)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Redis unavailable, availability windows will not be cached");
            None
        }
    }
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Availability (public)
        .route("/availability", get(api::availability::get_window))
        .route("/availability/:date", get(api::availability::get_date_availability))
        .route("/business-days/:date", get(api::availability::get_business_day))
        // Reservations (public)
        .route("/reservations", post(api::reservations::submit_reservation))
        .route("/reservations/counts", get(api::reservations::get_counts))
        // Reservations (admin)
        .route(
            "/admin/reservations",
            get(api::reservations::list_reservations).post(api::reservations::create_reservation),
        )
        .route(
            "/admin/reservations/:id",
            get(api::reservations::get_reservation)
                .put(api::reservations::update_reservation)
                .delete(api::reservations::delete_reservation),
        )
        .route(
            "/admin/reservations/:id/status",
            put(api::reservations::update_reservation_status),
        )
        // Closures (admin)
        .route(
            "/admin/closures/recurring",
            get(api::closures::list_recurring).post(api::closures::create_recurring),
        )
        .route(
            "/admin/closures/recurring/:id",
            put(api::closures::update_recurring).delete(api::closures::delete_recurring),
        )
        .route(
            "/admin/closures/periods",
            get(api::closures::list_periods).post(api::closures::create_period),
        )
        .route(
            "/admin/closures/periods/:id",
            put(api::closures::update_period).delete(api::closures::delete_period),
        )
        .route(
            "/admin/closures/blocked",
            get(api::closures::list_blocked).post(api::closures::create_blocked),
        )
        .route(
            "/admin/closures/blocked/:id",
            delete(api::closures::delete_blocked),
        )
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
