//! Effects produced by state transitions

use super::state::{AuthToken, ListingRequest, Registration};
use crate::locale::{AudioClip, Language};
use serde::Serialize;

/// A prompt for the transport to deliver
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutboundPrompt {
    Text {
        body: String,
    },
    /// Resolved to a clip URL by the transport
    AudioCue {
        key: AudioClip,
        language: Language,
    },
}

impl OutboundPrompt {
    pub fn text(body: impl Into<String>) -> Self {
        OutboundPrompt::Text { body: body.into() }
    }

    #[allow(dead_code)] // Useful for tests
    pub fn body(&self) -> Option<&str> {
        match self {
            OutboundPrompt::Text { body } => Some(body),
            OutboundPrompt::AudioCue { .. } => None,
        }
    }
}

/// Effects to be executed after a transition. Collaborator effects feed
/// their result back into the machine as an [`super::Event`].
#[derive(Debug, Clone)]
pub enum Effect {
    /// Deliver a prompt to the user
    Reply(OutboundPrompt),

    /// Ask the registry whether this identity is a known farmer
    CheckExistence,

    /// Sign the farmer up
    Register { registration: Registration },

    /// Exchange the password for a token
    Login { password: String },

    /// Look up market prices for a commodity in a region
    FetchPrices { commodity: String, region: String },

    /// Create a produce listing
    SubmitListing {
        token: AuthToken,
        listing: ListingRequest,
    },
}

impl Effect {
    pub fn say(body: impl Into<String>) -> Self {
        Effect::Reply(OutboundPrompt::text(body))
    }

    pub fn play(key: AudioClip, language: Language) -> Self {
        Effect::Reply(OutboundPrompt::AudioCue { key, language })
    }
}
