use axum::{middleware, routing::get, routing::post, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::infrastructure::config::Config;
use crate::infrastructure::db::DbPool;
use crate::{
    controllers::{health, narration::NarrationController, voice::VoiceController},
    infrastructure::auth::{auth_middleware, request_id_middleware},
};

/// Assemble the application router. Split out from server startup so tests
/// can mount the exact production middleware stack in-process.
pub fn build_router(
    pool: Arc<DbPool>,
    config: Arc<Config>,
    narration_controller: Arc<NarrationController>,
    voice_controller: Arc<VoiceController>,
) -> Router {
    // Narration routes (need auth)
    let narration_routes = Router::new()
        .route("/api/narration/generate", post(NarrationController::generate))
        .route(
            "/api/narration/generate-personal",
            post(NarrationController::generate_personal),
        )
        .with_state(narration_controller)
        .layer(middleware::from_fn_with_state(
            config.clone(),
            auth_middleware,
        ));

    // Voice routes (need auth)
    let voice_routes = Router::new()
        .route("/api/voice/create", post(VoiceController::create))
        .with_state(voice_controller)
        .layer(middleware::from_fn_with_state(
            config.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(pool)
        .merge(narration_routes)
        .merge(voice_routes)
        .layer(middleware::from_fn(request_id_middleware))
        // Browser clients call these endpoints directly
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server with all routes configured
pub async fn start_http_server(
    pool: Arc<DbPool>,
    config: Arc<Config>,
    narration_controller: Arc<NarrationController>,
    voice_controller: Arc<VoiceController>,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_router(pool, config.clone(), narration_controller, voice_controller);

    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
