//! Prompt construction for script generation and campaign summaries.
//!
//! The script prompt is rendered from an operator-supplied template with
//! named placeholders, grounded in a knowledge-base document. Both
//! documents are read fresh on every request so operators can edit them
//! without restarting the service.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::campaign::Campaign;

/// Errors returned by prompt construction.
#[derive(Debug, Error)]
pub enum PromptError {
    /// Reading a prompt document failed.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Document path.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The knowledge base is not valid JSON.
    #[error("knowledge base {path} is not valid JSON: {source}")]
    Knowledge {
        /// Document path.
        path: String,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },
    /// The template names a placeholder with no binding.
    #[error("template placeholder {{{0}}} has no binding")]
    UnresolvedPlaceholder(String),
}

/// Business facts used to ground script generation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KnowledgeBase {
    /// Company name substituted into `{company_name}`.
    pub company_name: Option<String>,
    /// FAQ mapping substituted into `{faq}` as pretty-printed JSON.
    pub faq: Option<serde_json::Value>,
}

/// Load the knowledge-base document.
///
/// # Errors
///
/// Returns [`PromptError`] when the file cannot be read or is not JSON.
pub fn load_knowledge(path: &Path) -> Result<KnowledgeBase, PromptError> {
    let contents = std::fs::read_to_string(path).map_err(|source| PromptError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| PromptError::Knowledge {
        path: path.display().to_string(),
        source,
    })
}

/// Load the script-prompt template text.
///
/// # Errors
///
/// Returns [`PromptError::Io`] when the file cannot be read.
pub fn load_template(path: &Path) -> Result<String, PromptError> {
    std::fs::read_to_string(path).map_err(|source| PromptError::Io {
        path: path.display().to_string(),
        source,
    })
}

static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();

fn placeholder_pattern() -> &'static Regex {
    PLACEHOLDER
        .get_or_init(|| Regex::new(r"\{([A-Za-z][A-Za-z0-9_]*)\}").expect("pattern is valid"))
}

/// Render the script-generation prompt from a template.
///
/// Recognized placeholders: `{company_name}` (empty string when the
/// knowledge base has none), `{purpose}` and `{user_message}` (both bound
/// to the campaign purpose), `{tone}`, and `{faq}` (pretty-printed JSON of
/// the knowledge base's FAQ mapping, `{}` when absent).
///
/// # Errors
///
/// Returns [`PromptError::UnresolvedPlaceholder`] when the template names
/// any other placeholder.
pub fn render_script_prompt(
    template: &str,
    knowledge: &KnowledgeBase,
    purpose: &str,
    tone: &str,
) -> Result<String, PromptError> {
    let faq = knowledge
        .faq
        .as_ref()
        .map(|v| serde_json::to_string_pretty(v).unwrap_or_else(|_| "{}".to_owned()))
        .unwrap_or_else(|| "{}".to_owned());

    let mut bindings: HashMap<&str, String> = HashMap::new();
    bindings.insert(
        "company_name",
        knowledge.company_name.clone().unwrap_or_default(),
    );
    bindings.insert("purpose", purpose.to_owned());
    bindings.insert("user_message", purpose.to_owned());
    bindings.insert("tone", tone.to_owned());
    bindings.insert("faq", faq);

    // Validate against the template itself so that brace-bearing values
    // (pretty JSON, free-text purposes) cannot trip the check.
    for capture in placeholder_pattern().captures_iter(template) {
        let name = &capture[1];
        if !bindings.contains_key(name) {
            return Err(PromptError::UnresolvedPlaceholder(name.to_owned()));
        }
    }

    let rendered = placeholder_pattern().replace_all(template, |caps: &regex::Captures<'_>| {
        bindings.get(&caps[1]).cloned().unwrap_or_default()
    });
    Ok(rendered.into_owned())
}

/// Build the summary prompt for a campaign from its accumulated call logs.
///
/// Embeds the campaign name, purpose, total call count, and the full
/// JSON-serialized call-log sequence.
pub fn build_summary_prompt(campaign: &Campaign) -> String {
    let logs = serde_json::to_string_pretty(&campaign.call_logs)
        .unwrap_or_else(|_| "[]".to_owned());
    format!(
        "Campaign Name: {name}\n\
         Purpose: {purpose}\n\
         Total Calls Completed: {total}\n\n\
         Call Logs:\n{logs}\n\n\
         Generate:\n\
         - Performance summary\n\
         - Conversion insight\n\
         - Suggested next action\n",
        name = campaign.campaign_name,
        purpose = campaign.purpose,
        total = campaign.call_logs.len(),
    )
}
