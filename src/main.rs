use anyhow::Context;
use axum::{routing::get, Router};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

mod auth;
mod config;
mod error;
mod handlers;
mod listing;
mod middleware;
mod store;

use store::ListingStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, ADMIN_USERNAME, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting Realty API in {:?} mode", config.environment);

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.connection_timeout))
        .connect(&database_url)
        .await
        .context("failed to connect to database")?;

    // The store handle is constructed once here and injected as router
    // state; nothing else holds the connection.
    let store = ListingStore::new(pool);
    store
        .init_schema()
        .await
        .context("failed to initialize database schema")?;

    let app = app(store);

    // Allow tests or deployments to override port via env
    let port = std::env::var("REALTY_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Realty API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server")?;
    Ok(())
}

fn app(store: ListingStore) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Public auth routes
        .merge(auth_routes())
        // Listing API (reads public, mutations token-gated)
        .merge(property_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}

fn auth_routes() -> Router<ListingStore> {
    use axum::routing::post;
    use handlers::auth;

    Router::new().route("/api/auth/login", post(auth::login))
}

fn property_routes() -> Router<ListingStore> {
    use axum::middleware::from_fn;
    use axum::routing::{post, put};
    use handlers::properties;

    // Reads are ungated; every mutation goes through the admin gate
    Router::new()
        .route("/api/properties/search", get(properties::search))
        .route(
            "/api/properties",
            get(properties::list)
                .merge(post(properties::create).route_layer(from_fn(middleware::admin_auth_middleware))),
        )
        .route(
            "/api/properties/:id",
            put(properties::update)
                .delete(properties::delete)
                .route_layer(from_fn(middleware::admin_auth_middleware)),
        )
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "name": "Realty API",
        "version": version,
        "description": "Real-estate listing backend built with Rust (Axum)",
        "endpoints": {
            "login": "POST /api/auth/login (public)",
            "list": "GET /api/properties (public)",
            "search": "GET /api/properties/search?price&facing&location&area (public)",
            "create": "POST /api/properties (admin, x-auth-token)",
            "update": "PUT /api/properties/:id (admin, x-auth-token)",
            "delete": "DELETE /api/properties/:id (admin, x-auth-token)",
            "health": "GET /health (public)"
        }
    }))
}

async fn health(
    axum::extract::State(store): axum::extract::State<ListingStore>,
) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match store.health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "status": "degraded",
                "timestamp": now,
                "database_error": e.to_string()
            })),
        ),
    }
}
