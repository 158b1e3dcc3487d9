//! Campaign operation endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::service::{CampaignBrief, CampaignService, ServiceError};

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

/// Request body for `POST /generate-script`.
#[derive(Debug, Deserialize)]
pub struct GenerateScriptRequest {
    /// Human-readable campaign name.
    pub campaign_name: String,
    /// What the campaign is trying to achieve.
    pub campaign_purpose: String,
    /// Desired tone of the generated script.
    pub tone: String,
    /// Voice the automation layer should dial with.
    pub voice: String,
    /// Raw phone-number strings; normalized server-side.
    pub numbers: Vec<String>,
}

/// Response body for `POST /generate-script`.
#[derive(Debug, Serialize)]
pub struct GenerateScriptResponse {
    /// Identifier of the newly created campaign.
    pub campaign_id: Uuid,
    /// The generated call script.
    pub script: String,
    /// The numbers that survived normalization, in input order.
    pub cleaned_numbers: Vec<String>,
}

/// Request body for `POST /approve-campaign` and `POST /generate-summary`.
#[derive(Debug, Deserialize)]
pub struct CampaignIdRequest {
    /// Campaign identifier string. A value that does not parse as an id
    /// matches no campaign, so it reports as not found.
    pub campaign_id: String,
}

/// Response body for `POST /approve-campaign`.
#[derive(Debug, Serialize)]
pub struct ApproveCampaignResponse {
    /// Human-readable result message.
    pub message: String,
    /// The approved campaign's identifier.
    pub campaign_id: Uuid,
}

/// Request body for `POST /call-status-webhook`.
#[derive(Debug, Deserialize)]
pub struct CallStatusRequest {
    /// Campaign identifier string; unparseable values report as not found.
    pub campaign_id: String,
    /// The number that was called.
    pub phone_number: String,
    /// Free-text status string from the automation layer.
    pub call_status: String,
    /// Call duration in seconds, as reported.
    pub duration: i64,
}

/// Response body for `POST /call-status-webhook`.
#[derive(Debug, Serialize)]
pub struct CallStatusResponse {
    /// Human-readable result message.
    pub message: String,
}

/// Response body for `POST /generate-summary`.
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    /// Free-text summary generated from the campaign's call logs.
    pub campaign_summary: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

// A malformed id string names no campaign, so it gets the same 404 as a
// well-formed unknown id rather than a body-deserialization failure.
fn parse_campaign_id(raw: &str) -> Result<Uuid, ServiceError> {
    Uuid::parse_str(raw).map_err(|_| ServiceError::NotFound("campaign not found".to_owned()))
}

async fn generate_script(
    State(service): State<Arc<CampaignService>>,
    Json(body): Json<GenerateScriptRequest>,
) -> Result<Json<GenerateScriptResponse>, ServiceError> {
    let generated = service
        .generate_script(CampaignBrief {
            campaign_name: body.campaign_name,
            campaign_purpose: body.campaign_purpose,
            tone: body.tone,
            voice: body.voice,
            numbers: body.numbers,
        })
        .await?;

    Ok(Json(GenerateScriptResponse {
        campaign_id: generated.campaign_id,
        script: generated.script,
        cleaned_numbers: generated.cleaned_numbers,
    }))
}

async fn approve_campaign(
    State(service): State<Arc<CampaignService>>,
    Json(body): Json<CampaignIdRequest>,
) -> Result<Json<ApproveCampaignResponse>, ServiceError> {
    let outcome = service
        .approve_campaign(parse_campaign_id(&body.campaign_id)?)
        .await?;
    Ok(Json(ApproveCampaignResponse {
        message: outcome.message,
        campaign_id: outcome.campaign_id,
    }))
}

async fn call_status_webhook(
    State(service): State<Arc<CampaignService>>,
    Json(body): Json<CallStatusRequest>,
) -> Result<Json<CallStatusResponse>, ServiceError> {
    service
        .record_call_status(
            parse_campaign_id(&body.campaign_id)?,
            body.phone_number,
            body.call_status,
            body.duration,
        )
        .await?;
    Ok(Json(CallStatusResponse {
        message: "call log updated".to_owned(),
    }))
}

async fn generate_summary(
    State(service): State<Arc<CampaignService>>,
    Json(body): Json<CampaignIdRequest>,
) -> Result<Json<SummaryResponse>, ServiceError> {
    let campaign_summary = service
        .generate_summary(parse_campaign_id(&body.campaign_id)?)
        .await?;
    Ok(Json(SummaryResponse { campaign_summary }))
}

/// Campaign operation routes.
pub fn campaign_routes() -> Router<Arc<CampaignService>> {
    Router::new()
        .route("/generate-script", post(generate_script))
        .route("/approve-campaign", post(approve_campaign))
        .route("/call-status-webhook", post(call_status_webhook))
        .route("/generate-summary", post(generate_summary))
}
