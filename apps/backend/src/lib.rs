pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::Database;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
}

/// Install the global tracing subscriber
pub fn init_tracing(filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        // User routes
        .route("/api/users/me", get(routes::users::me))
        // Settings routes
        .route(
            "/api/settings",
            get(routes::settings::get).put(routes::settings::update),
        )
        // Deck routes
        .route(
            "/api/decks",
            get(routes::decks::list).post(routes::decks::create),
        )
        .route("/api/decks/import", post(routes::decks::import))
        .route(
            "/api/decks/{deck_id}",
            get(routes::decks::get).delete(routes::decks::delete),
        )
        .route("/api/decks/{deck_id}/stats", get(routes::decks::stats))
        // Study routes
        .route(
            "/api/decks/{deck_id}/progress",
            get(routes::study::get_progress).put(routes::study::put_progress),
        )
        .route("/api/decks/{deck_id}/grade", post(routes::study::grade))
        .route(
            "/api/decks/{deck_id}/override",
            post(routes::study::override_verdict),
        )
        .route(
            "/api/decks/{deck_id}/cards/{card_id}/star",
            post(routes::study::toggle_star),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            routes::auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/users/register", post(routes::users::register))
        .merge(protected_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config.log_filter);

    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url, config.max_connections).await?;

    tracing::info!("Running migrations...");
    db.run_migrations().await?;

    let app = build_router(AppState { db: Arc::new(db) });

    let addr = config.bind_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
