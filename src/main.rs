use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use rust_leads_api::analytics;
use rust_leads_api::config::Config;
use rust_leads_api::db::Database;
use rust_leads_api::handlers::{self, ApiDoc, AppState};

/// Main entry point for the application.
///
/// Initializes tracing, configuration, the database pool and the analytics
/// client, then serves the lead-capture routes behind CORS, request tracing,
/// a body-size cap and a per-IP edge throttle.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rust_leads_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize database connection pool
    let db = Database::new(&config.database_url).await?;
    tracing::info!("Database connection pool established");

    // Process-wide analytics client (idempotent init)
    let analytics = analytics::init(config.posthog_key.clone(), config.posthog_host.clone());

    // Build application state
    let app_state = Arc::new(AppState {
        db: db.pool.clone(),
        config: config.clone(),
        analytics: analytics.clone(),
    });

    // Edge throttle: 10 requests/second per IP, burst of 20. This is
    // transport-level abuse protection; the 5-per-10-minute submission cap is
    // enforced separately against the leads table.
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .unwrap(),
    );

    // Contact-form route with security layers
    let protected_routes = Router::new()
        .route("/api/contact", post(handlers::submit_contact))
        .layer(
            ServiceBuilder::new()
                // Contact submissions are small; cap the body at 64 KB
                .layer(RequestBodyLimitLayer::new(64 * 1024))
                .layer(GovernorLayer {
                    config: governor_conf,
                }),
        );

    // Health endpoints bypass the throttle so deployment probes never 429
    let app = Router::new()
        .route("/health", get(handlers::health))
        .route("/api/health/env", get(handlers::env_health))
        .merge(protected_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    analytics
        .capture("api_server_started", serde_json::json!({ "port": config.port }))
        .await;

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
