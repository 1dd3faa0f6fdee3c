//! HTTP surface.
//!
//! | Method/Path            | Body            | Success                               |
//! |------------------------|-----------------|---------------------------------------|
//! | `GET /health`          | none            | `{status, api_key_configured}`        |
//! | `POST /convert`        | `{scholar_url}` | `.bib` attachment                     |
//! | `POST /convert/preview`| `{scholar_url}` | `{author_id, publication_count, ...}` |
//!
//! Errors are returned as `{"error": "..."}` with 400 for bad input, 404 when
//! the author has no publications and 500 for everything else.

use crate::batch::{self, RecordFailure};
use crate::config::Config;
use crate::error::{Result, ScholarBibError};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

/// MIME type of the `/convert` download
pub const BIBTEX_MIME: &str = "application/x-bibtex; charset=utf-8";

const MISSING_URL_MESSAGE: &str = "Missing scholar_url in request body";

/// Shared handler state
struct AppState {
    config: Config,
}

/// Build the router for the given configuration
pub fn create_router(config: Config) -> Router {
    let app_state = Arc::new(AppState { config });

    Router::new()
        .route("/health", get(health_handler))
        .route("/convert", post(convert_handler))
        .route("/convert/preview", post(preview_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

/// Serve until the process is stopped
pub async fn run_server(host: &str, port: u16, config: Config) -> Result<()> {
    if !config.has_api_key() {
        warn!("SERPAPI_KEY not configured; /convert will fail until it is set");
    }

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .map_err(|e| ScholarBibError::Config(format!("Invalid host:port '{}:{}': {}", host, port, e)))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "Listening");

    axum::serve(listener, create_router(config)).await?;
    Ok(())
}

/// Error response: status code plus `{"error": message}` body
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn missing_url() -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: MISSING_URL_MESSAGE.to_string(),
        }
    }
}

impl From<ScholarBibError> for ApiError {
    fn from(err: ScholarBibError) -> Self {
        let status = if err.is_user_error() {
            StatusCode::BAD_REQUEST
        } else if matches!(err, ScholarBibError::NoPublications(_)) {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let message = match &err {
            ScholarBibError::InvalidUrl(_) => "Invalid Google Scholar URL".to_string(),
            ScholarBibError::NoPublications(_) => "No publications found".to_string(),
            other => other.to_string(),
        };
        if status.is_server_error() {
            error!(error = %err, "Conversion failed");
        }
        Self { status, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

/// Conversion request body
#[derive(Debug, Deserialize)]
struct ConvertRequest {
    scholar_url: Option<String>,
}

impl ConvertRequest {
    /// The URL from a parsed body, treating any body problem as a missing URL
    fn scholar_url(payload: std::result::Result<Json<Self>, JsonRejection>) -> std::result::Result<String, ApiError> {
        payload
            .ok()
            .and_then(|Json(req)| req.scholar_url)
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(ApiError::missing_url)
    }
}

/// Health response
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    api_key_configured: bool,
}

/// Preview response
#[derive(Debug, Serialize)]
struct PreviewResponse {
    author_id: String,
    publication_count: usize,
    skipped: Vec<RecordFailure>,
    bibtex: String,
}

/// Health check endpoint
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        api_key_configured: state.config.has_api_key(),
    })
}

/// Download endpoint handler
async fn convert_handler(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<ConvertRequest>, JsonRejection>,
) -> std::result::Result<Response, ApiError> {
    let scholar_url = ConvertRequest::scholar_url(payload)?;
    info!(scholar_url = %scholar_url, "Convert request");

    let bibliography = batch::convert(&scholar_url, &state.config).await?;
    let disposition = format!("attachment; filename=\"{}\"", bibliography.file_name());

    Ok((
        [
            (header::CONTENT_TYPE, BIBTEX_MIME.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bibliography.text(),
    )
        .into_response())
}

/// Preview endpoint handler
async fn preview_handler(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<ConvertRequest>, JsonRejection>,
) -> std::result::Result<Json<PreviewResponse>, ApiError> {
    let scholar_url = ConvertRequest::scholar_url(payload)?;
    info!(scholar_url = %scholar_url, "Preview request");

    let bibliography = batch::convert(&scholar_url, &state.config).await?;
    let bibtex = bibliography.text();

    Ok(Json(PreviewResponse {
        author_id: bibliography.author_id,
        publication_count: bibliography.publication_count,
        skipped: bibliography.skipped,
        bibtex,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let bad = ApiError::from(ScholarBibError::InvalidUrl("x".into()));
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);

        let empty = ApiError::from(ScholarBibError::NoPublications("abc".into()));
        assert_eq!(empty.status, StatusCode::NOT_FOUND);
        assert_eq!(empty.message, "No publications found");

        let config = ApiError::from(ScholarBibError::MissingApiKey);
        assert_eq!(config.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(config.message.contains("SERPAPI_KEY"));

        let upstream = ApiError::from(ScholarBibError::Api {
            code: 401,
            message: "Invalid API key.".into(),
        });
        assert_eq!(upstream.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(upstream.message.contains("Invalid API key."));
    }
}
