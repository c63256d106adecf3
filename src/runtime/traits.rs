//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the dialogue runtime with mock implementations.

use crate::backend::RegistryError;
use crate::price::PriceRow;
use crate::state_machine::{AuthToken, ListingRequest, OutboundPrompt, Registration};
use async_trait::async_trait;
use std::sync::Arc;

/// Farmer and produce registry
#[async_trait]
pub trait FarmerRegistry: Send + Sync {
    /// Whether a farmer account exists for this phone number
    async fn farmer_exists(&self, phone: &str) -> Result<bool, RegistryError>;

    /// Create a farmer account
    async fn register(&self, registration: &Registration) -> Result<(), RegistryError>;

    /// Exchange credentials for a bearer token
    async fn login(&self, phone: &str, password: &str) -> Result<AuthToken, RegistryError>;

    /// Create a produce listing on behalf of the farmer
    async fn submit_listing(
        &self,
        token: &AuthToken,
        listing: &ListingRequest,
    ) -> Result<(), RegistryError>;
}

/// Market price lookup.
///
/// Never fails: timeouts, transport errors and confirmed "no data" answers
/// all yield an empty report. Implementations log which one happened.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_price_rows(&self, commodity: &str, region: &str) -> Vec<PriceRow>;
}

/// Delivers prompts to a user over the messaging transport
#[async_trait]
pub trait PromptSender: Send + Sync {
    async fn send(&self, to: &str, prompt: &OutboundPrompt) -> Result<(), String>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: FarmerRegistry + ?Sized> FarmerRegistry for Arc<T> {
    async fn farmer_exists(&self, phone: &str) -> Result<bool, RegistryError> {
        (**self).farmer_exists(phone).await
    }

    async fn register(&self, registration: &Registration) -> Result<(), RegistryError> {
        (**self).register(registration).await
    }

    async fn login(&self, phone: &str, password: &str) -> Result<AuthToken, RegistryError> {
        (**self).login(phone, password).await
    }

    async fn submit_listing(
        &self,
        token: &AuthToken,
        listing: &ListingRequest,
    ) -> Result<(), RegistryError> {
        (**self).submit_listing(token, listing).await
    }
}

#[async_trait]
impl<T: PriceSource + ?Sized> PriceSource for Arc<T> {
    async fn fetch_price_rows(&self, commodity: &str, region: &str) -> Vec<PriceRow> {
        (**self).fetch_price_rows(commodity, region).await
    }
}

#[async_trait]
impl<T: PromptSender + ?Sized> PromptSender for Arc<T> {
    async fn send(&self, to: &str, prompt: &OutboundPrompt) -> Result<(), String> {
        (**self).send(to, prompt).await
    }
}
