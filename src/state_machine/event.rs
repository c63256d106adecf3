//! Events that drive the dialogue

use super::state::AuthToken;
use crate::backend::RegistryError;
use crate::price::PriceRow;

/// Inbound message, reduced to what the dialogue consumes
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub identity: String,
    pub content: InboundContent,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InboundContent {
    Text(String),
    /// Audio, image, location, ...; carries the transport's type name
    Unsupported(String),
}

impl InboundMessage {
    pub fn text(identity: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            content: InboundContent::Text(text.into()),
        }
    }

    pub fn unsupported(identity: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            content: InboundContent::Unsupported(kind.into()),
        }
    }
}

/// Events that trigger transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    UserText { text: String },
    UnsupportedMessage { kind: String },

    // Registry results
    ExistenceChecked { outcome: Result<bool, RegistryError> },
    RegistrationFinished { outcome: Result<(), RegistryError> },
    LoginFinished { outcome: Result<AuthToken, RegistryError> },
    ListingSubmitted { outcome: Result<(), RegistryError> },

    // Price lookup result; failures already collapsed to an empty report
    PricesFetched { rows: Vec<PriceRow> },
}

impl From<InboundContent> for Event {
    fn from(content: InboundContent) -> Self {
        match content {
            InboundContent::Text(text) => Event::UserText { text },
            InboundContent::Unsupported(kind) => Event::UnsupportedMessage { kind },
        }
    }
}

impl Event {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Event::UserText { .. } => "user_text",
            Event::UnsupportedMessage { .. } => "unsupported_message",
            Event::ExistenceChecked { .. } => "existence_checked",
            Event::RegistrationFinished { .. } => "registration_finished",
            Event::LoginFinished { .. } => "login_finished",
            Event::ListingSubmitted { .. } => "listing_submitted",
            Event::PricesFetched { .. } => "prices_fetched",
        }
    }
}
