//! HTTP API for the campaign backend.
//!
//! Four POST operations plus a health probe:
//! - `POST /generate-script`
//! - `POST /approve-campaign`
//! - `POST /call-status-webhook`
//! - `POST /generate-summary`
//! - `GET /health`
//!
//! Errors are surfaced as `{"detail": "..."}` bodies with the status code
//! mapped from [`ServiceError`].

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::service::{CampaignService, ServiceError};

pub mod campaigns;
pub mod health;

pub use campaigns::campaign_routes;
pub use health::health_routes;

/// JSON error body carried by every non-2xx API response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Human-readable failure detail.
    pub detail: String,
}

impl ServiceError {
    /// HTTP status this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Configuration(_) | Self::Upstream(_) | Self::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Build the full API router over a shared service.
pub fn api_router(service: Arc<CampaignService>) -> Router {
    Router::new()
        .merge(campaign_routes())
        .merge(health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}
