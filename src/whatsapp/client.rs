//! Outbound Cloud API sender

use super::AudioCatalog;
use crate::config::BotConfig;
use crate::runtime::PromptSender;
use crate::state_machine::OutboundPrompt;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

pub const GRAPH_API_BASE: &str = "https://graph.facebook.com/v19.0";

#[derive(Debug, Error)]
pub enum WhatsAppError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Cloud API returned HTTP {status}: {body}")]
    Api { status: StatusCode, body: String },
}

#[derive(Debug, Serialize)]
struct OutgoingMessage<'a> {
    messaging_product: &'static str,
    to: &'a str,
    #[serde(flatten)]
    body: MessageBody<'a>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum MessageBody<'a> {
    Text { text: TextBody<'a> },
    Audio { audio: AudioLink },
}

#[derive(Debug, Serialize)]
struct TextBody<'a> {
    body: &'a str,
}

#[derive(Debug, Serialize)]
struct AudioLink {
    link: String,
}

struct Credentials {
    access_token: String,
    phone_number_id: String,
}

/// Sends prompts through the WhatsApp Cloud API. Without credentials the
/// client only logs what it would have sent.
pub struct WhatsAppClient {
    http: Client,
    credentials: Option<Credentials>,
    audio: AudioCatalog,
    api_base: String,
}

impl WhatsAppClient {
    pub fn new(
        access_token: Option<String>,
        phone_number_id: Option<String>,
        audio: AudioCatalog,
    ) -> Result<Self, WhatsAppError> {
        let http = Client::builder().timeout(Duration::from_secs(20)).build()?;
        let credentials = match (access_token, phone_number_id) {
            (Some(access_token), Some(phone_number_id)) => Some(Credentials {
                access_token,
                phone_number_id,
            }),
            _ => None,
        };
        Ok(Self {
            http,
            credentials,
            audio,
            api_base: GRAPH_API_BASE.to_string(),
        })
    }

    pub fn from_config(config: &BotConfig) -> Result<Self, WhatsAppError> {
        Self::new(
            config.access_token.clone(),
            config.phone_number_id.clone(),
            AudioCatalog::new(config.audio_base_url.clone()),
        )
    }

    pub fn is_enabled(&self) -> bool {
        self.credentials.is_some()
    }

    fn message_for<'a>(&self, to: &'a str, prompt: &'a OutboundPrompt) -> OutgoingMessage<'a> {
        let body = match prompt {
            OutboundPrompt::Text { body } => MessageBody::Text {
                text: TextBody { body },
            },
            OutboundPrompt::AudioCue { key, language } => MessageBody::Audio {
                audio: AudioLink {
                    link: self.audio.resolve(*key, *language),
                },
            },
        };
        OutgoingMessage {
            messaging_product: "whatsapp",
            to,
            body,
        }
    }

    pub async fn deliver(&self, to: &str, prompt: &OutboundPrompt) -> Result<(), WhatsAppError> {
        let message = self.message_for(to, prompt);
        let Some(credentials) = &self.credentials else {
            tracing::info!(to, message = ?message, "WhatsApp sender disabled, not sending");
            return Ok(());
        };

        let url = format!("{}/{}/messages", self.api_base, credentials.phone_number_id);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&credentials.access_token)
            .json(&message)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WhatsAppError::Api { status, body });
        }
        Ok(())
    }
}

#[async_trait]
impl PromptSender for WhatsAppClient {
    async fn send(&self, to: &str, prompt: &OutboundPrompt) -> Result<(), String> {
        self.deliver(to, prompt).await.map_err(|e| e.to_string())
    }
}
