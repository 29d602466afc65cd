use crate::cli::ServerArgs;
use crate::insights;
use crate::skin::{
    EvaluationRequest, EvaluationResult, PhotoAnalysisRequest,
    ProgressAnalysis, ProgressInsightRequest,
};
use crate::AppState;
use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tower_http::compression::predicate::{
    NotForContentType, Predicate, SizeAbove,
};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{prelude::*, Registry};
use tracing_tree::HierarchicalLayer;

// Add build-time information
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub version: String,
    pub built_at: String,
    pub started_at: String,
    pub model: String,
    pub chat_available: bool,
    pub stats: StatusStats,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusStats {
    pub request_count: u64,
    pub ai_count: u64,
    pub unparseable_fallback_count: u64,
    pub service_failure_fallback_count: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProgressInsightResponse {
    pub insight: String,
}

// Health check endpoint
#[instrument]
pub async fn health_check() -> &'static str {
    debug!("Health check requested");
    "OK"
}

#[axum::debug_handler]
async fn get_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let stats = &state.stats;
    let status = StatusResponse {
        version: built_info::PKG_VERSION.to_string(),
        built_at: built_info::BUILT_TIME_UTC.to_string(),
        started_at: state.started_at.to_rfc3339(),
        model: state.insight_settings.model.clone(),
        chat_available: state
            .chat_client
            .as_ref()
            .is_some_and(|client| client.is_available()),
        stats: StatusStats {
            request_count: stats.request_count.load(Ordering::Relaxed),
            ai_count: stats.ai_count.load(Ordering::Relaxed),
            unparseable_fallback_count: stats
                .unparseable_fallback_count
                .load(Ordering::Relaxed),
            service_failure_fallback_count: stats
                .service_failure_fallback_count
                .load(Ordering::Relaxed),
        },
    };

    Json(status).into_response()
}

#[axum::debug_handler]
async fn post_evaluate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<EvaluationRequest>,
) -> Result<Json<EvaluationResult>, (StatusCode, String)> {
    if request.product_name.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "productName must not be empty".to_string(),
        ));
    }
    Ok(Json(insights::evaluate_product(&state, request).await))
}

#[axum::debug_handler]
async fn post_progress_insight(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ProgressInsightRequest>,
) -> Json<ProgressInsightResponse> {
    let insight = insights::analyze_progress(&state, request).await;
    Json(ProgressInsightResponse { insight })
}

#[axum::debug_handler]
async fn post_progress_photos(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PhotoAnalysisRequest>,
) -> Json<ProgressAnalysis> {
    Json(insights::analyze_photos(&state, request).await)
}

pub fn routes(state: Arc<AppState>) -> Router {
    let predicate = SizeAbove::new(32)
        // still don't compress gRPC
        .and(NotForContentType::GRPC)
        .and(NotForContentType::IMAGES);

    let compression_layer = CompressionLayer::new()
        .br(true)
        .deflate(true)
        .gzip(true)
        .zstd(true)
        .compress_when(predicate);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/status", get(get_status))
        .route("/api/evaluate", post(post_evaluate))
        .route("/api/progress/insight", post(post_progress_insight))
        .route("/api/progress/photos", post(post_progress_photos))
        .layer(compression_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve() -> Result<()> {
    // Initialize logging with tracing
    let subscriber = Registry::default()
        .with(
            HierarchicalLayer::new(2)
                .with_targets(true)
                .with_bracketed_fields(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        );

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    // Parse command line arguments
    let args = ServerArgs::parse();

    info!(
        "Starting skinsight {} (built {})",
        built_info::PKG_VERSION,
        built_info::BUILT_TIME_UTC
    );

    let state = crate::create_app_state(crate::AppConfig {
        openai_api_key: args.openai_api_key,
        openai_api_base: args.openai_api_base,
        chat_model: args.chat_model,
        chat_timeout_secs: args.chat_timeout_secs,
        stream_responses: args.stream_responses,
    });

    // Set up ctrl-c handler
    let shutdown_token = state.shutdown_token.clone();
    tokio::spawn(async move {
        if let Ok(()) = tokio::signal::ctrl_c().await {
            info!("Received CTRL-C, initiating shutdown");
            shutdown_token.cancel();
        }
    });

    // Start web server
    let shutdown_token = state.shutdown_token.clone();
    let app = routes(state);
    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server running on http://{}", addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown_token.cancelled().await })
        .await
    {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}
