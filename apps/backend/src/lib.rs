pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::services::sessions::SessionRegistry;
use crate::store::{MemoryStore, PostgresStore, ProgressStore, SessionStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub progress_store: Arc<dyn ProgressStore>,
    pub session_store: Arc<dyn SessionStore>,
    pub registry: Arc<SessionRegistry>,
}

/// Build the full router over the given state.
pub fn router(state: AppState) -> Router {
    // Everything under /api sits behind the identity middleware
    let protected_routes = Router::new()
        // Study routes
        .route("/api/study/queue", post(routes::study::queue))
        .route("/api/study/sessions", post(routes::study::start))
        .route("/api/study/sessions/:id", get(routes::study::view))
        .route("/api/study/sessions/:id", delete(routes::study::abandon))
        .route("/api/study/sessions/:id/answer", post(routes::study::answer))
        .route("/api/study/sessions/:id/reveal", post(routes::study::reveal))
        .route("/api/study/sessions/:id/rate", post(routes::study::rate))
        // Progress routes
        .route("/api/progress/:deck_id", get(routes::progress::list))
        .layer(middleware::from_fn(routes::auth::auth_middleware));

    Router::new()
        .route("/health", get(health_check))
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Pick the store backend
    let (progress_store, session_store): (Arc<dyn ProgressStore>, Arc<dyn SessionStore>) =
        match std::env::var("DATABASE_URL") {
            Ok(database_url) => {
                tracing::info!("Connecting to database...");
                let store = PostgresStore::connect(&database_url).await?;

                tracing::info!("Running migrations...");
                store.run_migrations().await?;

                let store = Arc::new(store);
                let progress: Arc<dyn ProgressStore> = store.clone();
                let sessions: Arc<dyn SessionStore> = store;
                (progress, sessions)
            }
            Err(_) => {
                tracing::warn!(
                    "DATABASE_URL not set; using in-memory stores (state is lost on restart)"
                );
                let store = Arc::new(MemoryStore::new());
                let progress: Arc<dyn ProgressStore> = store.clone();
                let sessions: Arc<dyn SessionStore> = store;
                (progress, sessions)
            }
        };

    let registry = Arc::new(SessionRegistry::new(
        progress_store.clone(),
        session_store.clone(),
    ));
    let state = AppState {
        progress_store,
        session_store,
        registry,
    };

    let app = router(state);

    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
