//! Session record and dialogue state types

use crate::locale::Language;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Dialogue State
// ============================================================================

/// Position of a user in the dialogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogueState {
    /// Session exists, no greeting seen yet
    #[default]
    Entry,
    ChoosingLanguage,
    CollectingName,
    CollectingAddress,
    CollectingRegion,
    CollectingPincode,
    CollectingPasswordRegister,
    CollectingPasswordLogin,
    ChoosingCategory,
    ChoosingCrop,
    AwaitingPrice,
    AwaitingQuantity,
    AwaitingRepeat,
    /// Terminal; a new greeting re-enters the machine
    ConversationOver,
}

impl DialogueState {
    #[allow(dead_code)] // Useful for tests
    pub const ALL: [DialogueState; 14] = [
        DialogueState::Entry,
        DialogueState::ChoosingLanguage,
        DialogueState::CollectingName,
        DialogueState::CollectingAddress,
        DialogueState::CollectingRegion,
        DialogueState::CollectingPincode,
        DialogueState::CollectingPasswordRegister,
        DialogueState::CollectingPasswordLogin,
        DialogueState::ChoosingCategory,
        DialogueState::ChoosingCrop,
        DialogueState::AwaitingPrice,
        DialogueState::AwaitingQuantity,
        DialogueState::AwaitingRepeat,
        DialogueState::ConversationOver,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DialogueState::Entry => "entry",
            DialogueState::ChoosingLanguage => "choosing_language",
            DialogueState::CollectingName => "collecting_name",
            DialogueState::CollectingAddress => "collecting_address",
            DialogueState::CollectingRegion => "collecting_region",
            DialogueState::CollectingPincode => "collecting_pincode",
            DialogueState::CollectingPasswordRegister => "collecting_password_register",
            DialogueState::CollectingPasswordLogin => "collecting_password_login",
            DialogueState::ChoosingCategory => "choosing_category",
            DialogueState::ChoosingCrop => "choosing_crop",
            DialogueState::AwaitingPrice => "awaiting_price",
            DialogueState::AwaitingQuantity => "awaiting_quantity",
            DialogueState::AwaitingRepeat => "awaiting_repeat",
            DialogueState::ConversationOver => "conversation_over",
        }
    }

    /// States that carry a pending listing
    #[allow(dead_code)] // Useful for tests
    pub fn in_listing_flow(self) -> bool {
        matches!(
            self,
            DialogueState::ChoosingCrop | DialogueState::AwaitingPrice | DialogueState::AwaitingQuantity
        )
    }
}

impl fmt::Display for DialogueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Credentials
// ============================================================================

/// Opaque bearer token issued by the registry. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token, for the Authorization header only
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

// ============================================================================
// Collected data
// ============================================================================

/// Registration fields, filled in one turn at a time
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: Option<String>,
    pub address: Option<String>,
    pub region: Option<String>,
    pub pincode: Option<String>,
    #[serde(skip)]
    pub password: Option<String>,
}

impl fmt::Debug for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Profile")
            .field("name", &self.name)
            .field("address", &self.address)
            .field("region", &self.region)
            .field("pincode", &self.pincode)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Listing being assembled during the listing sub-flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingListing {
    pub category: String,
    pub crop_name: Option<String>,
    /// Agmarknet commodity name for the chosen crop
    pub commodity: Option<String>,
    pub price_per_kg: Option<f64>,
    pub quantity_kg: Option<f64>,
}

impl PendingListing {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            crop_name: None,
            commodity: None,
            price_per_kg: None,
            quantity_kg: None,
        }
    }
}

/// Payload for the registry signup call
#[derive(Clone, PartialEq)]
pub struct Registration {
    pub phone: String,
    pub name: String,
    pub address: String,
    pub region: String,
    pub pincode: String,
    pub password: String,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("phone", &self.phone)
            .field("name", &self.name)
            .field("region", &self.region)
            .field("pincode", &self.pincode)
            .finish_non_exhaustive()
    }
}

/// Payload for the produce listing call
#[derive(Debug, Clone, PartialEq)]
pub struct ListingRequest {
    pub crop_name: String,
    pub category: String,
    pub price_per_kg: f64,
    pub quantity_kg: f64,
}

// ============================================================================
// Session
// ============================================================================

/// Everything the dialogue knows about one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Phone number / messaging address
    pub identity: String,
    pub state: DialogueState,
    pub language: Language,
    pub profile: Profile,
    /// Signup accepted by the registry; never sign up again
    pub registered: bool,
    #[serde(skip)]
    pub auth_token: Option<AuthToken>,
    pub pending_listing: Option<PendingListing>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            state: DialogueState::Entry,
            language: Language::default(),
            profile: Profile::default(),
            registered: false,
            auth_token: None,
            pending_listing: None,
            updated_at: Utc::now(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth_token.is_some()
    }

    /// Restart the dialogue, keeping only language and credential
    pub fn reset(&mut self) {
        self.state = DialogueState::Entry;
        self.profile = Profile::default();
        self.registered = false;
        self.pending_listing = None;
    }

    /// Re-entry on a greeting: drop the in-flight listing and dialogue
    /// position, keep everything already collected
    pub fn restart_dialogue(&mut self, state: DialogueState) {
        self.state = state;
        self.pending_listing = None;
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Complete signup payload, if every field has been collected
    pub fn registration(&self) -> Option<Registration> {
        let p = &self.profile;
        Some(Registration {
            phone: self.identity.clone(),
            name: p.name.clone()?,
            address: p.address.clone()?,
            region: p.region.clone()?,
            pincode: p.pincode.clone()?,
            password: p.password.clone()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_session() -> Session {
        let mut session = Session::new("919876543210");
        session.profile = Profile {
            name: Some("Ramesh".to_string()),
            address: Some("Village X".to_string()),
            region: Some("Punjab".to_string()),
            pincode: Some("144001".to_string()),
            password: Some("secret".to_string()),
        };
        session
    }

    #[test]
    fn test_reset_keeps_language_and_token() {
        let mut session = complete_session();
        session.language = Language::Hi;
        session.auth_token = Some(AuthToken::new("tok"));
        session.state = DialogueState::AwaitingPrice;
        session.pending_listing = Some(PendingListing::new("Fruits"));

        session.reset();

        assert_eq!(session.state, DialogueState::Entry);
        assert_eq!(session.language, Language::Hi);
        assert!(session.is_authenticated());
        assert!(session.pending_listing.is_none());
        assert_eq!(session.profile, Profile::default());
    }

    #[test]
    fn test_restart_dialogue_keeps_profile() {
        let mut session = complete_session();
        session.pending_listing = Some(PendingListing::new("Fruits"));
        session.restart_dialogue(DialogueState::CollectingPasswordLogin);
        assert_eq!(session.profile.region.as_deref(), Some("Punjab"));
        assert!(session.pending_listing.is_none());
    }

    #[test]
    fn test_registration_requires_every_field() {
        let mut session = complete_session();
        assert!(session.registration().is_some());
        session.profile.pincode = None;
        assert!(session.registration().is_none());
    }

    #[test]
    fn test_secrets_are_not_printed() {
        let mut session = complete_session();
        session.auth_token = Some(AuthToken::new("very-secret-token"));
        let debug = format!("{session:?}");
        assert!(!debug.contains("very-secret-token"));
        assert!(!debug.contains("\"secret\""));
        let json = serde_json::to_string(&session).unwrap();
        assert!(!json.contains("secret"));
    }

    #[test]
    fn test_state_names_are_snake_case() {
        for state in DialogueState::ALL {
            let json = serde_json::to_value(state).unwrap();
            assert_eq!(json.as_str(), Some(state.as_str()));
        }
    }
}
