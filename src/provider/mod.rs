pub mod api;
mod parse;
mod prompt_builder;
mod prompts;
pub mod subprocess;

pub use prompt_builder::{branch_prompt, commit_prompt};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;
use api::ApiProvider;
use subprocess::SubprocessProvider;

/// Failure taxonomy for a single generation attempt. None of these are
/// retried; every message is meant to be shown to the user as-is.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Unknown or disabled provider, or incomplete provider settings.
    #[error("{0}")]
    Configuration(String),

    /// Spawn/exit/network/status failures on the single attempt.
    #[error("{0}")]
    Transport(String),

    /// The backend answered, but not with anything usable.
    #[error("{0}")]
    MalformedResponse(String),
}

/// A branch name candidate as emitted by a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchSuggestion {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A commit message candidate as emitted by a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitSuggestion {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<CommitType>,
}

/// Conventional-commit type vocabulary, with a catch-all for anything a
/// model invents outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitType {
    Feat,
    Fix,
    Docs,
    Style,
    Refactor,
    Test,
    Chore,
    #[serde(other)]
    Other,
}

impl CommitType {
    /// Canonical vocabulary in classification order.
    pub const ALL: [CommitType; 7] = [
        CommitType::Feat,
        CommitType::Fix,
        CommitType::Docs,
        CommitType::Style,
        CommitType::Refactor,
        CommitType::Test,
        CommitType::Chore,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommitType::Feat => "feat",
            CommitType::Fix => "fix",
            CommitType::Docs => "docs",
            CommitType::Style => "style",
            CommitType::Refactor => "refactor",
            CommitType::Test => "test",
            CommitType::Chore => "chore",
            CommitType::Other => "other",
        }
    }
}

impl std::fmt::Display for CommitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contract every AI backend satisfies. Backends only supply the raw-text
/// round trip; prompt decoration, validation, and parsing are shared.
pub trait Provider: Send + Sync + std::fmt::Debug {
    /// One prompt in, raw unstructured text out. Single attempt, no retry.
    fn execute(&self, prompt: &str) -> Result<String, ProviderError>;

    fn generate_branch_name(&self, prompt: &str) -> Result<Vec<BranchSuggestion>, ProviderError> {
        let full_prompt = format!("{prompt}{}", prompts::BRANCH_JSON_INSTRUCTION);
        let response = self.execute(&full_prompt)?;
        validate_response(&response)?;
        Ok(parse::branch_suggestions(&response))
    }

    fn generate_commit_message(
        &self,
        prompt: &str,
    ) -> Result<Vec<CommitSuggestion>, ProviderError> {
        let full_prompt = format!("{prompt}{}", prompts::COMMIT_JSON_INSTRUCTION);
        let response = self.execute(&full_prompt)?;
        validate_response(&response)?;
        Ok(parse::commit_suggestions(&response))
    }
}

/// Raw-response sanity check, applied before any parsing. A response this
/// short cannot carry a suggestion, so it propagates instead of degrading
/// to line extraction.
fn validate_response(response: &str) -> Result<(), ProviderError> {
    if response.is_empty() {
        return Err(ProviderError::MalformedResponse(
            "Invalid response from AI provider".to_string(),
        ));
    }
    if response.len() < 10 {
        return Err(ProviderError::MalformedResponse(
            "Response too short from AI provider".to_string(),
        ));
    }
    Ok(())
}

/// Resolve a provider name against configuration. Selecting an unknown or
/// disabled provider is a configuration mistake, never a fallback trigger.
pub fn create(name: &str, config: &Config) -> Result<Box<dyn Provider>, ProviderError> {
    let Some(settings) = config.providers.get(name) else {
        return Err(ProviderError::Configuration(format!(
            "Provider '{name}' not found in configuration"
        )));
    };

    if !settings.enabled {
        return Err(ProviderError::Configuration(format!(
            "Provider '{name}' is disabled. Enable it with: committer config"
        )));
    }

    match name {
        "claude" => Ok(Box::new(SubprocessProvider::new(
            "Claude Code",
            settings.command.as_deref().unwrap_or("claude-code"),
            settings.args.clone(),
        ))),
        "gemini" => Ok(Box::new(SubprocessProvider::new(
            "Gemini CLI",
            settings.command.as_deref().unwrap_or("gemini-cli"),
            settings.args.clone(),
        ))),
        "api" => {
            let Some(endpoint) = settings.endpoint.clone() else {
                return Err(ProviderError::Configuration(
                    "API endpoint is required for API provider".to_string(),
                ));
            };
            Ok(Box::new(ApiProvider::new(
                endpoint,
                settings.api_key.clone().filter(|k| !k.is_empty()),
                settings
                    .model
                    .clone()
                    .unwrap_or_else(|| "gpt-3.5-turbo".to_string()),
            )))
        }
        other => Err(ProviderError::Configuration(format!(
            "Unsupported provider: {other}"
        ))),
    }
}
