//! LLM completion provider abstraction.
//!
//! Defines the [`CompletionProvider`] trait and the shared error type used
//! by provider implementations. One provider is implemented:
//! [`openrouter::OpenRouterProvider`]: OpenRouter `/chat/completions` API.

use async_trait::async_trait;

pub mod openrouter;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors returned by completion providers.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP transport failure (connection error or timeout).
    #[error("provider request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Response did not match the expected schema.
    #[error("provider response parse error: {0}")]
    Parse(String),
    /// Upstream provider responded with an error status.
    #[error("provider returned non-success status {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Raw response body, collapsed and truncated.
        body: String,
    },
    /// Provider cannot satisfy the request with current configuration.
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

/// Check HTTP response status and return body text or a structured error.
///
/// Upstream error bodies are echoed into API `detail` strings and log
/// lines, so non-2xx bodies get scrubbed first: credential-shaped tokens
/// redacted, whitespace collapsed to one line, length capped.
///
/// # Errors
///
/// Returns `ProviderError::Request` on transport failure,
/// `ProviderError::HttpStatus` on non-2xx.
pub async fn check_http_response(response: reqwest::Response) -> Result<String, ProviderError> {
    let status = response.status();
    let body = response.text().await?;
    if status.is_success() {
        return Ok(body);
    }
    Err(ProviderError::HttpStatus {
        status: status.as_u16(),
        body: scrub_error_body(&body),
    })
}

const ERROR_BODY_CAP: usize = 256;

static CREDENTIAL: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();

fn credential_pattern() -> &'static regex::Regex {
    // OpenRouter/OpenAI-style key prefixes and bearer header echoes.
    CREDENTIAL.get_or_init(|| {
        regex::Regex::new(r"(?i)(sk-[A-Za-z0-9_\-]{8,}|bearer\s+\S+)")
            .expect("credential pattern is valid")
    })
}

fn scrub_error_body(raw: &str) -> String {
    let redacted = credential_pattern().replace_all(raw, "[redacted]");
    let mut flat = redacted.split_whitespace().collect::<Vec<_>>().join(" ");
    if let Some((cut, _)) = flat.char_indices().nth(ERROR_BODY_CAP) {
        flat.truncate(cut);
        flat.push_str("...[truncated]");
    }
    flat
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Core completion interface: one prompt in, generated text out.
///
/// Implementations must be `Send + Sync` so the service can share them
/// across request handlers.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Request a completion for a single user-role prompt.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on missing configuration, API, network,
    /// or parse failure.
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError>;

    /// The model identifier this provider is instantiated for.
    fn model_id(&self) -> &str;
}
