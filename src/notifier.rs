//! Automation-layer notifier.
//!
//! Approved campaigns are handed to the external workflow automation via a
//! webhook POST. That collaborator owns actual dialing; this service only
//! delivers the payload and reports success or failure.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

const NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Campaign payload delivered to the automation webhook.
#[derive(Debug, Clone, Serialize)]
pub struct ApprovalPayload {
    /// Campaign identifier.
    pub campaign_id: Uuid,
    /// Campaign name.
    pub campaign_name: String,
    /// Canonicalized targets to dial.
    pub numbers: Vec<String>,
    /// Generated call script.
    pub script: String,
    /// Voice the automation layer should dial with.
    pub voice: String,
    /// Per-campaign token the automation layer can deduplicate on when an
    /// approval is retried after a timed-out hand-off.
    pub idempotency_key: Uuid,
}

/// Errors returned by the notifier.
#[derive(Debug, Error)]
pub enum NotifierError {
    /// HTTP transport failure (connection error or timeout).
    #[error("automation trigger failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Webhook answered outside the 2xx range.
    #[error("webhook failed with status {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },
    /// No webhook endpoint is configured.
    #[error("automation webhook URL not configured")]
    Unconfigured,
}

/// Interface to the external automation layer.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver an approved campaign. Any 2xx response is success.
    ///
    /// # Errors
    ///
    /// Returns [`NotifierError`] on missing configuration, non-2xx status,
    /// or network failure. The caller treats failure as fatal to the
    /// approval attempt.
    async fn notify(&self, payload: &ApprovalPayload) -> Result<(), NotifierError>;
}

/// HTTP webhook notifier with a fixed 10-second timeout.
#[derive(Clone)]
pub struct WebhookNotifier {
    url: Option<String>,
    client: reqwest::Client,
}

impl std::fmt::Debug for WebhookNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Webhook URLs carry a secret path segment.
        f.debug_struct("WebhookNotifier")
            .field("url", &self.url.as_ref().map(|_| "__REDACTED__"))
            .finish()
    }
}

impl WebhookNotifier {
    /// Create a notifier posting to the given webhook URL.
    ///
    /// The URL is optional at construction; delivery then fails with
    /// [`NotifierError::Unconfigured`] before any network traffic.
    ///
    /// # Errors
    ///
    /// Returns [`NotifierError::Request`] when the HTTP client cannot be
    /// built; the timeout is part of the contract, so there is no
    /// timeout-less fallback.
    pub fn new(url: Option<String>) -> Result<Self, NotifierError> {
        let client = reqwest::Client::builder().timeout(NOTIFY_TIMEOUT).build()?;
        Ok(Self { url, client })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, payload: &ApprovalPayload) -> Result<(), NotifierError> {
        let url = self.url.as_ref().ok_or(NotifierError::Unconfigured)?;

        let response = self.client.post(url).json(payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifierError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}
