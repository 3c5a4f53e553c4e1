//! Rentiva Server - Equipment Rental Marketplace
//!
//! REST API server for the booking & fulfillment lifecycle engine.

use axum::{
    routing::{get, patch, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_stream::StreamExt;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rentiva_server::{
    api,
    config::AppConfig,
    repository::Repository,
    services::{locations::LocationStore, Services},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("rentiva_server={},tower_http=debug", config.logging.level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Rentiva Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Initialize Redis-backed location store
    let locations = LocationStore::new(&config.redis.url, config.redis.location_ttl_seconds)
        .await
        .expect("Failed to connect to Redis");

    tracing::info!("Connected to Redis");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(
        repository,
        config.pricing.clone(),
        config.booking.clone(),
        locations,
    );

    // Notification fan-out lives outside the core; until a notifier is
    // attached, drain the lifecycle event stream into the log
    let mut lifecycle_events = services.events.stream();
    tokio::spawn(async move {
        while let Some(event) = lifecycle_events.next().await {
            if let Ok(event) = event {
                tracing::debug!(event = event.name(), "lifecycle event awaiting notifiers");
            }
        }
    });

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
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
        // Bookings
        .route("/bookings", post(api::bookings::create_booking))
        .route("/bookings/:id", get(api::bookings::get_booking))
        .route("/bookings/:id", patch(api::bookings::update_booking))
        .route("/bookings/:id/cancel", post(api::bookings::cancel_booking))
        // Payment-settlement seam
        .route("/bookings/:id/charge", get(api::payments::get_charge_amount))
        .route("/bookings/:id/confirm", post(api::payments::payment_confirmed))
        .route("/deliveries/:id/settlement", get(api::payments::get_settlement_amount))
        // Deliveries
        .route("/deliveries", post(api::deliveries::assign_delivery))
        .route("/deliveries/:id", get(api::deliveries::get_delivery))
        .route("/deliveries/:id/status", post(api::deliveries::update_delivery_status))
        .route("/deliveries/:id/location", post(api::deliveries::report_location))
        .route("/deliveries/:id/location", get(api::deliveries::get_location))
        // Recollection
        .route("/deliveries/:id/recollect", post(api::deliveries::assign_recollect))
        .route("/deliveries/:id/recollect/status", post(api::deliveries::update_recollect_status))
        .route("/deliveries/:id/recollect/report", post(api::deliveries::submit_recollect_report))
        // Supplier requests
        .route("/supplier-requests", post(api::supplier_requests::create_request))
        .route("/supplier-requests/:id", get(api::supplier_requests::get_request))
        .route("/supplier-requests/:id/status", post(api::supplier_requests::set_request_status))
        .route("/supplier-requests/:id/fulfillment", post(api::supplier_requests::set_fulfillment_status))
        .with_state(state.clone());

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
