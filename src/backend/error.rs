//! Registry error types

use reqwest::StatusCode;
use thiserror::Error;

/// Registry error with classification
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct RegistryError {
    pub kind: RegistryErrorKind,
    pub message: String,
}

impl RegistryError {
    pub fn new(kind: RegistryErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(RegistryErrorKind::Transient, message)
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(RegistryErrorKind::Rejected, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(RegistryErrorKind::Malformed, message)
    }

    /// Classify a non-success HTTP status
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = format!("HTTP {status}: {}", truncate(body, 200));
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            Self::transient(message)
        } else {
            Self::rejected(message)
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.kind == RegistryErrorKind::Rejected
    }
}

impl From<reqwest::Error> for RegistryError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::malformed(e.to_string())
        } else {
            Self::transient(e.to_string())
        }
    }
}

/// Error classification for retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryErrorKind {
    /// Network issues, timeouts, 5xx, 429 - worth retrying
    Transient,
    /// The registry refused the request (bad credentials, invalid data)
    Rejected,
    /// The registry answered with something we could not read
    Malformed,
}

impl RegistryErrorKind {
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Transient)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transient => "transient",
            Self::Rejected => "rejected",
            Self::Malformed => "malformed",
        }
    }
}

fn truncate(body: &str, max_chars: usize) -> &str {
    match body.char_indices().nth(max_chars) {
        Some((idx, _)) => body.get(..idx).unwrap_or(body),
        None => body,
    }
}
