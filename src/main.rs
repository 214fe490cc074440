use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use blog_extract::models::{BatchRequest, ExtractRequest, SectionsRequest};
use blog_extract::{BlogExtractor, ExtractionResult, ExtractorConfig};

const MAX_BATCH: usize = 50;

type AppState = Arc<BlogExtractor>;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = ExtractorConfig::from_env();
    let addr = config.listen_addr.clone();

    let extractor = match BlogExtractor::new(config) {
        Ok(extractor) => Arc::new(extractor),
        Err(e) => {
            tracing::error!(error = %e, "failed to build extractor");
            return;
        }
    };

    let app = Router::new()
        .route("/health", get(health))
        .route("/extract", post(extract_endpoint))
        .route("/analyze", post(analyze_endpoint))
        .route("/sections", post(sections_endpoint))
        .route("/batch", post(batch_endpoint))
        .with_state(extractor);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "failed to bind");
            return;
        }
    };
    tracing::info!(%addr, "listening");
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server stopped");
    }
}

async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

fn extraction_response(result: ExtractionResult) -> Response {
    let status = if result.content.is_empty() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::OK
    };
    (status, Json(result)).into_response()
}

async fn extract_endpoint(
    State(extractor): State<AppState>,
    Json(req): Json<ExtractRequest>,
) -> Response {
    let result = extractor
        .extract_with_hint(&req.url, req.post_id.as_deref())
        .await;
    extraction_response(result)
}

async fn analyze_endpoint(
    State(extractor): State<AppState>,
    Json(req): Json<ExtractRequest>,
) -> Response {
    let article = extractor
        .analyze_with_hint(&req.url, req.post_id.as_deref())
        .await;
    let status = if article.extraction.content.is_empty() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::OK
    };
    (status, Json(article)).into_response()
}

async fn sections_endpoint(
    State(extractor): State<AppState>,
    Json(req): Json<SectionsRequest>,
) -> Response {
    (StatusCode::OK, Json(extractor.sections(&req.text, req.normalize))).into_response()
}

async fn batch_endpoint(
    State(extractor): State<AppState>,
    Json(req): Json<BatchRequest>,
) -> Response {
    if req.urls.len() > MAX_BATCH {
        let detail = format!("at most {MAX_BATCH} urls per batch");
        return (StatusCode::BAD_REQUEST, Json(json!({"detail": detail}))).into_response();
    }
    let results = extractor.extract_batch(&req.urls).await;
    (StatusCode::OK, Json(json!({"results": results}))).into_response()
}
