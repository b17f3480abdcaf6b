// Main entry point for the translation web service

use anuvad::{
    core::{Config, types::*},
    services::{FallbackDispatcher, LocalTranslator, RemoteTranslator, TranslationService},
    utils::Metrics,
};

use anyhow::Result;
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{error, info, warn};

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    service: Arc<TranslationService>,
    metrics: Metrics,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Arc::new(Config::new().expect("Failed to load configuration"));

    // Initialize logging
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::new(format!(
        "anuvad={},ort=off",
        config.log_level().to_string().to_lowercase()
    ));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(
        "Config: model={} max_input_chars={} cache_capacity={}",
        config.model_name(),
        config.max_input_chars(),
        config.max_cache_entries()
    );

    // Initialize metrics
    let metrics = Metrics::new();

    // Wire up the provider chain and the translation service
    let local = LocalTranslator::new(&config.model.model_dir, config.model.max_output_tokens);
    if local.is_available() {
        info!("Local model found at {}", config.model.model_dir);
    } else {
        warn!(
            "Local model not found at {}; serving through the remote provider only",
            config.model.model_dir
        );
    }

    let remote = RemoteTranslator::new().expect("Failed to create remote translation client");

    let dispatcher =
        FallbackDispatcher::new(Arc::new(local), Arc::new(remote), Some(metrics.clone()));

    let cache_capacity =
        NonZeroUsize::new(config.max_cache_entries()).expect("cache capacity validated at startup");
    let service = Arc::new(TranslationService::new(
        cache_capacity,
        dispatcher,
        Some(metrics.clone()),
    ));

    let state = AppState {
        config: config.clone(),
        service,
        metrics,
    };

    // Setup CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Create router: API routes first, static frontend as fallback
    let app = Router::new()
        .route("/api/health", get(health))
        .route("/api/translate", post(translate))
        .route("/metrics", get(metrics_endpoint))
        .route("/stats", get(stats_endpoint))
        .fallback_service(ServeDir::new(&config.server.frontend_dir))
        .with_state(state)
        .layer(cors);

    let addr = format!("{}:{}", config.server_host(), config.server_port());
    info!("Server starting on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /api/health     - Health check");
    info!("  POST /api/translate  - Translate text (JSON)");
    info!("  GET  /metrics        - Prometheus metrics");
    info!("  GET  /stats          - Detailed statistics");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "model": state.config.model_name(),
        "max_input_chars": state.config.max_input_chars(),
    }))
}

/// Prometheus metrics endpoint
async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [("Content-Type", "text/plain; version=0.0.4")],
        state.metrics.to_prometheus(),
    )
}

/// Detailed statistics endpoint (JSON)
async fn stats_endpoint(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let snapshot = state.metrics.snapshot();
    serde_json::to_value(snapshot).map(Json).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to serialize metrics: {}", e),
        )
    })
}

/// Translate endpoint
///
/// # Request format
/// JSON body: `{ "text": "...", "source_lang": "auto", "target_lang": "hi" }`
/// (`source_lang` and `target_lang` are optional)
///
/// # Response
/// `TranslationResponse` JSON, or an error payload with 400/500
async fn translate(
    State(state): State<AppState>,
    Json(request): Json<TranslationRequest>,
) -> Result<Json<TranslationResponse>, (StatusCode, Json<ErrorResponse>)> {
    let start_time = std::time::Instant::now();
    state.metrics.record_endpoint_request("/api/translate");

    let text = request.text.trim();
    let source_lang = request.source_lang.to_lowercase();
    let target_lang = request.target_lang.to_lowercase();

    if text.is_empty() {
        return Err(bad_request("text is required"));
    }

    let max_chars = state.config.max_input_chars();
    if text.chars().count() > max_chars {
        return Err(bad_request(&format!("text too long (max {max_chars})")));
    }

    let was_auto = source_lang == AUTO_LANG;

    let resolved = state
        .service
        .resolve(text, &source_lang, &target_lang)
        .await
        .map_err(|e| {
            error!("translation failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "translation failed".to_string(),
                    details: Some(e.to_string()),
                }),
            )
        })?;

    state.metrics.record_request(start_time.elapsed());

    Ok(Json(TranslationResponse {
        translation: resolved.translated_text.clone(),
        translated_text: resolved.translated_text,
        source_lang: resolved.resolved_source_lang.clone(),
        target_lang,
        detected_source_lang: was_auto.then(|| resolved.resolved_source_lang),
        cached: resolved.cached,
    }))
}

fn bad_request(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
            details: None,
        }),
    )
}
