//! Campaign service: orchestrates the four campaign operations.
//!
//! Every operation acquires the store mutex, loads the full record set,
//! mutates at most one record, and writes the full set back. Holding the
//! mutex across the whole load-mutate-save cycle (including the approval
//! hand-off) keeps writers serialized, so a slow upstream blocks only the
//! requests that need the store.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::campaign::{Campaign, CallLogEntry, CampaignStatus};
use crate::notifier::{ApprovalPayload, Notifier, NotifierError};
use crate::numbers::clean_numbers;
use crate::prompt;
use crate::providers::{CompletionProvider, ProviderError};
use crate::store::{CampaignStore, StoreError};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors surfaced by campaign operations.
///
/// The API layer maps these onto HTTP statuses: `Configuration`,
/// `Upstream`, and `Store` → 500, `Validation` → 400, `NotFound` → 404.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A required document or credential is missing.
    #[error("{0}")]
    Configuration(String),
    /// The caller supplied empty or invalid input.
    #[error("{0}")]
    Validation(String),
    /// No campaign with the given id exists.
    #[error("{0}")]
    NotFound(String),
    /// The LLM endpoint or automation webhook call failed.
    #[error("{0}")]
    Upstream(String),
    /// Reading or writing the record store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ProviderError> for ServiceError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Unavailable(detail) => Self::Configuration(detail),
            other => Self::Upstream(format!("upstream generation failed: {other}")),
        }
    }
}

impl From<NotifierError> for ServiceError {
    fn from(err: NotifierError) -> Self {
        match err {
            NotifierError::Unconfigured => Self::Configuration(err.to_string()),
            other => Self::Upstream(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Operation inputs / outcomes
// ---------------------------------------------------------------------------

/// Campaign brief accepted by [`CampaignService::generate_script`].
#[derive(Debug, Clone)]
pub struct CampaignBrief {
    /// Human-readable campaign name.
    pub campaign_name: String,
    /// What the campaign is trying to achieve.
    pub campaign_purpose: String,
    /// Desired tone of the generated script.
    pub tone: String,
    /// Voice the automation layer should dial with.
    pub voice: String,
    /// Raw phone-number strings, normalized by the service.
    pub numbers: Vec<String>,
}

/// Outcome of a successful script generation.
#[derive(Debug, Clone)]
pub struct GeneratedScript {
    /// Identifier of the newly created campaign.
    pub campaign_id: Uuid,
    /// The generated call script.
    pub script: String,
    /// The numbers that survived normalization, in input order.
    pub cleaned_numbers: Vec<String>,
}

/// Outcome of an approval attempt.
#[derive(Debug, Clone)]
pub struct ApprovalOutcome {
    /// The approved campaign's identifier.
    pub campaign_id: Uuid,
    /// Human-readable result message.
    pub message: String,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Orchestrates script generation, approval, call-status recording, and
/// summary generation over the flat-file store.
pub struct CampaignService {
    store: Mutex<CampaignStore>,
    completion: Arc<dyn CompletionProvider>,
    notifier: Arc<dyn Notifier>,
    knowledge_path: PathBuf,
    template_path: PathBuf,
}

impl CampaignService {
    /// Create a service over the given store and collaborators.
    pub fn new(
        store: CampaignStore,
        completion: Arc<dyn CompletionProvider>,
        notifier: Arc<dyn Notifier>,
        knowledge_path: impl Into<PathBuf>,
        template_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store: Mutex::new(store),
            completion,
            notifier,
            knowledge_path: knowledge_path.into(),
            template_path: template_path.into(),
        }
    }

    /// Create a new draft campaign with an LLM-generated call script.
    ///
    /// Requires the knowledge base and prompt template documents to exist
    /// (both are read fresh), normalizes the target numbers, renders the
    /// prompt, and asks the completion provider for the script. The new
    /// record is appended to the store and persisted.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Configuration`] when a document or the credential is
    /// missing, [`ServiceError::Validation`] when no number survives
    /// normalization, [`ServiceError::Upstream`] when generation fails.
    pub async fn generate_script(
        &self,
        brief: CampaignBrief,
    ) -> Result<GeneratedScript, ServiceError> {
        if !self.knowledge_path.exists() {
            return Err(ServiceError::Configuration(format!(
                "knowledge base missing: {}",
                self.knowledge_path.display()
            )));
        }
        if !self.template_path.exists() {
            return Err(ServiceError::Configuration(format!(
                "prompt template missing: {}",
                self.template_path.display()
            )));
        }

        let knowledge = prompt::load_knowledge(&self.knowledge_path)
            .map_err(|e| ServiceError::Configuration(e.to_string()))?;
        let template = prompt::load_template(&self.template_path)
            .map_err(|e| ServiceError::Configuration(e.to_string()))?;

        let cleaned_numbers = clean_numbers(&brief.numbers);
        if cleaned_numbers.is_empty() {
            return Err(ServiceError::Validation(
                "no valid phone numbers provided".to_owned(),
            ));
        }

        let rendered = prompt::render_script_prompt(
            &template,
            &knowledge,
            &brief.campaign_purpose,
            &brief.tone,
        )
        .map_err(|e| ServiceError::Configuration(e.to_string()))?;

        let script = self.completion.complete(&rendered).await?;

        let campaign = Campaign {
            campaign_id: Uuid::new_v4(),
            campaign_name: brief.campaign_name,
            purpose: brief.campaign_purpose,
            tone: brief.tone,
            voice: brief.voice,
            numbers: cleaned_numbers.clone(),
            script: script.clone(),
            status: CampaignStatus::Draft,
            created_at: Utc::now(),
            approval_token: Uuid::new_v4(),
            call_logs: Vec::new(),
        };
        let campaign_id = campaign.campaign_id;

        let store = self.store.lock().await;
        let mut campaigns = store.load()?;
        campaigns.push(campaign);
        store.save(&campaigns)?;

        info!(
            campaign_id = %campaign_id,
            numbers = cleaned_numbers.len(),
            model = self.completion.model_id(),
            "campaign created"
        );

        Ok(GeneratedScript {
            campaign_id,
            script,
            cleaned_numbers,
        })
    }

    /// Transition a draft campaign to approved and hand it to the
    /// automation layer.
    ///
    /// An already-approved campaign is a no-op success: the notifier is
    /// not re-invoked. On notifier failure the campaign stays draft.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] for an unknown id,
    /// [`ServiceError::Validation`] when the campaign has no numbers,
    /// [`ServiceError::Upstream`] when the webhook rejects the hand-off.
    pub async fn approve_campaign(&self, id: Uuid) -> Result<ApprovalOutcome, ServiceError> {
        let store = self.store.lock().await;
        let mut campaigns = store.load()?;
        let campaign = campaigns
            .iter_mut()
            .find(|c| c.campaign_id == id)
            .ok_or_else(|| ServiceError::NotFound("campaign not found".to_owned()))?;

        if campaign.is_approved() {
            return Ok(ApprovalOutcome {
                campaign_id: id,
                message: "campaign already approved".to_owned(),
            });
        }

        // Unreachable when the campaign was created through
        // generate_script, which rejects empty number sets.
        if campaign.numbers.is_empty() {
            return Err(ServiceError::Validation(
                "no valid phone numbers to call".to_owned(),
            ));
        }

        let payload = ApprovalPayload {
            campaign_id: campaign.campaign_id,
            campaign_name: campaign.campaign_name.clone(),
            numbers: campaign.numbers.clone(),
            script: campaign.script.clone(),
            voice: campaign.voice.clone(),
            idempotency_key: campaign.approval_token,
        };
        if let Err(e) = self.notifier.notify(&payload).await {
            warn!(campaign_id = %id, error = %e, "automation hand-off failed; campaign stays draft");
            return Err(e.into());
        }

        campaign.status = CampaignStatus::Approved;
        store.save(&campaigns)?;

        info!(campaign_id = %id, "campaign approved and sent to automation layer");
        Ok(ApprovalOutcome {
            campaign_id: id,
            message: "campaign sent to automation layer".to_owned(),
        })
    }

    /// Append a call-status entry to a campaign's log and persist.
    ///
    /// The reported number, status string, and duration are recorded as
    /// given; campaign status is unaffected.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] for an unknown id.
    pub async fn record_call_status(
        &self,
        id: Uuid,
        phone_number: String,
        call_status: String,
        duration: i64,
    ) -> Result<(), ServiceError> {
        let store = self.store.lock().await;
        let mut campaigns = store.load()?;
        let campaign = campaigns
            .iter_mut()
            .find(|c| c.campaign_id == id)
            .ok_or_else(|| ServiceError::NotFound("campaign not found".to_owned()))?;

        campaign.call_logs.push(CallLogEntry {
            phone_number,
            status: call_status,
            duration,
            timestamp: Utc::now(),
        });
        let total = campaign.call_logs.len();
        store.save(&campaigns)?;

        info!(campaign_id = %id, call_logs = total, "call status recorded");
        Ok(())
    }

    /// Generate a free-text performance summary from a campaign's
    /// accumulated call logs.
    ///
    /// No stored state changes.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] for an unknown id,
    /// [`ServiceError::Upstream`] when generation fails.
    pub async fn generate_summary(&self, id: Uuid) -> Result<String, ServiceError> {
        let campaigns = {
            let store = self.store.lock().await;
            store.load()?
        };
        let campaign = campaigns
            .iter()
            .find(|c| c.campaign_id == id)
            .ok_or_else(|| ServiceError::NotFound("campaign not found".to_owned()))?;

        let summary_prompt = prompt::build_summary_prompt(campaign);
        let summary = self.completion.complete(&summary_prompt).await?;

        info!(
            campaign_id = %id,
            call_logs = campaign.call_logs.len(),
            "campaign summary generated"
        );
        Ok(summary)
    }
}
