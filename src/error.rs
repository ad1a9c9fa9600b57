use serde::{Serialize, Deserialize};
use std::fmt;

/// Unified error type for the fitcoach crate.
/// Every fallible operation returns Result<T, CoachError>; `stage` names the
/// layer that failed ("store", "ai", "config", "io", ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoachError {
    pub message: String,
    pub stage: String,
    pub retry_succeeded: bool,
    pub context: Option<String>,
    pub source: Option<String>,
}

impl CoachError {
    /// Create a new error with stage and message
    pub fn new<S: Into<String>>(message: S, stage: &'static str) -> Self {
        CoachError {
            message: message.into(),
            stage: stage.to_string(),
            retry_succeeded: false,
            context: None,
            source: None,
        }
    }

    /// Mark whether a retry succeeded
    pub fn with_retry(mut self, succeeded: bool) -> Self {
        self.retry_succeeded = succeeded;
        self
    }

    /// Add additional context information
    pub fn with_context<S: Into<String>>(mut self, context: S) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add source error information
    pub fn with_source<S: Into<String>>(mut self, source: S) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn not_found<S: Into<String>>(what: S) -> Self {
        CoachError::new(format!("{} not found", what.into()), "store")
    }
}

impl fmt::Display for CoachError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.stage, self.message)?;
        if let Some(ref context) = self.context {
            write!(f, " (context: {})", context)?;
        }
        if let Some(ref source) = self.source {
            write!(f, " (source: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for CoachError {}

impl From<anyhow::Error> for CoachError {
    fn from(err: anyhow::Error) -> Self {
        CoachError::new(err.to_string(), "unknown").with_source("anyhow")
    }
}

impl From<std::io::Error> for CoachError {
    fn from(err: std::io::Error) -> Self {
        CoachError::new(format!("I/O error: {}", err), "io").with_source("std::io")
    }
}

impl From<serde_json::Error> for CoachError {
    fn from(err: serde_json::Error) -> Self {
        CoachError::new(format!("JSON error: {}", err), "json_parse").with_source("serde_json")
    }
}

impl From<toml::de::Error> for CoachError {
    fn from(err: toml::de::Error) -> Self {
        CoachError::new(format!("TOML error: {}", err), "config").with_source("toml")
    }
}

impl From<reqwest::Error> for CoachError {
    fn from(err: reqwest::Error) -> Self {
        CoachError::new(format!("HTTP error: {}", err), "http").with_source("reqwest")
    }
}

impl From<tokio::time::error::Elapsed> for CoachError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        CoachError::new("Operation timed out", "timeout").with_source("tokio::time")
    }
}

/// Failure classes reported by a generative backend.
/// Quota errors are the only ones that trigger key rotation.
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("no API key configured")]
    MissingKey,
    #[error("API quota exceeded: {0}")]
    QuotaExceeded(String),
    #[error("API key not valid")]
    InvalidKey,
    #[error("model returned an empty response")]
    EmptyResponse,
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("could not decode model output: {0}")]
    Decode(String),
}

impl AiError {
    pub fn is_quota(&self) -> bool {
        matches!(self, AiError::QuotaExceeded(_))
    }

    /// Classify an error message the way the hosted API words it.
    pub fn classify(status: u16, message: &str) -> Self {
        if status == 429 || message.contains("429") || message.contains("RESOURCE_EXHAUSTED") {
            AiError::QuotaExceeded(message.to_string())
        } else if message.contains("API key not valid") {
            AiError::InvalidKey
        } else {
            AiError::Api { status, message: message.to_string() }
        }
    }

    /// Short, user-facing wording for a surfaced failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            AiError::MissingKey => "No AI API key configured",
            AiError::QuotaExceeded(_) => "AI API quota exceeded",
            AiError::InvalidKey => "Invalid AI API key",
            AiError::EmptyResponse | AiError::Decode(_) => "AI returned an unusable response",
            AiError::Api { .. } | AiError::Http(_) => "AI request failed",
        }
    }
}

impl From<AiError> for CoachError {
    fn from(err: AiError) -> Self {
        CoachError::new(err.user_message(), "ai").with_source(err.to_string())
    }
}
