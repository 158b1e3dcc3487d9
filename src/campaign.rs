//! Campaign domain types persisted in the record store.
//!
//! A [`Campaign`] is one outbound-calling effort: a generated script, a
//! target number list, a lifecycle status, and an append-only call log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a campaign.
///
/// The only transition is `Draft` → `Approved`; it never reverts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    /// Created but not yet handed to the automation layer.
    Draft,
    /// Handed to the automation layer. Terminal.
    Approved,
}

/// One real-world call attempt's outcome, reported back over the
/// call-status webhook.
///
/// `status` and `duration` are recorded as reported; there is no status
/// vocabulary and no sign constraint on the duration, because the upstream
/// automation layer owns those semantics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallLogEntry {
    /// The number that was called.
    pub phone_number: String,
    /// Free-text status string from the automation layer.
    pub status: String,
    /// Call duration in seconds, as reported.
    pub duration: i64,
    /// When the entry was appended.
    pub timestamp: DateTime<Utc>,
}

/// A named outbound-calling effort with an associated generated script and
/// target number list.
///
/// All brief fields are immutable after creation; only `status` (one
/// transition) and `call_logs` (append-only) ever change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    /// Unique identifier, assigned at creation.
    pub campaign_id: Uuid,
    /// Human-readable campaign name.
    pub campaign_name: String,
    /// What the campaign is trying to achieve.
    pub purpose: String,
    /// Desired tone of the generated script.
    pub tone: String,
    /// Voice the automation layer should dial with.
    pub voice: String,
    /// Canonicalized target numbers. Non-empty at creation.
    pub numbers: Vec<String>,
    /// LLM-generated call script, produced once at creation.
    pub script: String,
    /// Lifecycle state.
    pub status: CampaignStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Per-campaign token forwarded to the automation layer on approval so
    /// a retried hand-off can be deduplicated upstream.
    pub approval_token: Uuid,
    /// Append-only record of call outcomes.
    #[serde(default)]
    pub call_logs: Vec<CallLogEntry>,
}

impl Campaign {
    /// Whether the campaign has already been handed to the automation layer.
    pub fn is_approved(&self) -> bool {
        self.status == CampaignStatus::Approved
    }
}
