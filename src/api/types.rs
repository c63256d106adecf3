//! API request and response types

use crate::state_machine::{DialogueState, OutboundPrompt, Session};
use serde::{Deserialize, Serialize};

/// Webhook verification query (`hub.*` parameters)
#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// Acknowledgement for a webhook delivery
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub queued: usize,
}

/// Request to process one text message synchronously
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub identity: String,
    pub text: String,
}

/// Prompts produced by one turn, and where the dialogue ended up
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub state: DialogueState,
    pub prompts: Vec<OutboundPrompt>,
}

/// Stored session, without credentials
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    #[serde(flatten)]
    pub session: Session,
    pub authenticated: bool,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            authenticated: session.is_authenticated(),
            session,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub active_inboxes: usize,
    pub sessions: usize,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
