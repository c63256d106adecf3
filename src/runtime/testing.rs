//! Mock implementations for testing
//!
//! These mocks enable dialogue testing without real I/O.

use super::traits::*;
use crate::backend::RegistryError;
use crate::price::PriceRow;
use crate::state_machine::{AuthToken, ListingRequest, OutboundPrompt, Registration};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

// ============================================================================
// Mock Registry
// ============================================================================

/// A registry call, as recorded by [`MockRegistry`]
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryCall {
    Exists(String),
    Register(Registration),
    Login { phone: String, password: String },
    SubmitListing(ListingRequest),
}

/// Mock registry that returns queued outcomes
#[derive(Default)]
pub struct MockRegistry {
    exists: Mutex<VecDeque<Result<bool, RegistryError>>>,
    registrations: Mutex<VecDeque<Result<(), RegistryError>>>,
    logins: Mutex<VecDeque<Result<AuthToken, RegistryError>>>,
    listings: Mutex<VecDeque<Result<(), RegistryError>>>,
    login_delay: Mutex<Option<Duration>>,
    /// Record of all calls made
    pub calls: Mutex<Vec<RegistryCall>>,
}

fn next_or_unqueued<T>(queue: &Mutex<VecDeque<Result<T, RegistryError>>>) -> Result<T, RegistryError> {
    queue
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| Err(RegistryError::transient("No mock outcome queued")))
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_exists(&self, outcome: Result<bool, RegistryError>) {
        self.exists.lock().unwrap().push_back(outcome);
    }

    pub fn queue_registration(&self, outcome: Result<(), RegistryError>) {
        self.registrations.lock().unwrap().push_back(outcome);
    }

    pub fn queue_login(&self, outcome: Result<AuthToken, RegistryError>) {
        self.logins.lock().unwrap().push_back(outcome);
    }

    pub fn queue_listing(&self, outcome: Result<(), RegistryError>) {
        self.listings.lock().unwrap().push_back(outcome);
    }

    /// Make every login wait before answering
    pub fn set_login_delay(&self, delay: Option<Duration>) {
        *self.login_delay.lock().unwrap() = delay;
    }

    /// Get recorded calls
    pub fn recorded_calls(&self) -> Vec<RegistryCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn registration_count(&self) -> usize {
        self.recorded_calls()
            .iter()
            .filter(|c| matches!(c, RegistryCall::Register(_)))
            .count()
    }

    pub fn submitted_listings(&self) -> Vec<ListingRequest> {
        self.recorded_calls()
            .into_iter()
            .filter_map(|c| match c {
                RegistryCall::SubmitListing(listing) => Some(listing),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl FarmerRegistry for MockRegistry {
    async fn farmer_exists(&self, phone: &str) -> Result<bool, RegistryError> {
        self.calls
            .lock()
            .unwrap()
            .push(RegistryCall::Exists(phone.to_string()));
        next_or_unqueued(&self.exists)
    }

    async fn register(&self, registration: &Registration) -> Result<(), RegistryError> {
        self.calls
            .lock()
            .unwrap()
            .push(RegistryCall::Register(registration.clone()));
        next_or_unqueued(&self.registrations)
    }

    async fn login(&self, phone: &str, password: &str) -> Result<AuthToken, RegistryError> {
        self.calls.lock().unwrap().push(RegistryCall::Login {
            phone: phone.to_string(),
            password: password.to_string(),
        });
        let delay = *self.login_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        next_or_unqueued(&self.logins)
    }

    async fn submit_listing(
        &self,
        _token: &AuthToken,
        listing: &ListingRequest,
    ) -> Result<(), RegistryError> {
        self.calls
            .lock()
            .unwrap()
            .push(RegistryCall::SubmitListing(listing.clone()));
        next_or_unqueued(&self.listings)
    }
}

// ============================================================================
// Mock Price Source
// ============================================================================

/// Mock price source returning a fixed report, optionally delayed or gated
pub struct MockPriceSource {
    rows: Mutex<Vec<PriceRow>>,
    delay: Option<Duration>,
    gate: Option<Arc<Notify>>,
    /// Notified when a lookup starts (for test synchronization)
    pub request_started: Arc<Notify>,
    /// Record of (commodity, region) lookups
    pub requests: Mutex<Vec<(String, String)>>,
}

impl Default for MockPriceSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPriceSource {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            delay: None,
            gate: None,
            request_started: Arc::new(Notify::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Sleep before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Block each lookup until [`Self::release`] is called
    pub fn with_gate(mut self) -> Self {
        self.gate = Some(Arc::new(Notify::new()));
        self
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn set_rows(&self, rows: Vec<PriceRow>) {
        *self.rows.lock().unwrap() = rows;
    }

    pub fn recorded_requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PriceSource for MockPriceSource {
    async fn fetch_price_rows(&self, commodity: &str, region: &str) -> Vec<PriceRow> {
        self.requests
            .lock()
            .unwrap()
            .push((commodity.to_string(), region.to_string()));
        self.request_started.notify_one();
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.rows.lock().unwrap().clone()
    }
}

// ============================================================================
// Recording Sender
// ============================================================================

/// Prompt sender that records deliveries
#[derive(Default)]
pub struct RecordingSender {
    pub sent: Mutex<Vec<(String, OutboundPrompt)>>,
    /// Notified after every delivery
    pub delivered: Arc<Notify>,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent_to(&self, identity: &str) -> Vec<OutboundPrompt> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(to, _)| to == identity)
            .map(|(_, prompt)| prompt.clone())
            .collect()
    }

    pub fn texts_to(&self, identity: &str) -> Vec<String> {
        self.sent_to(identity)
            .iter()
            .filter_map(|p| p.body().map(str::to_string))
            .collect()
    }
}

#[async_trait]
impl PromptSender for RecordingSender {
    async fn send(&self, to: &str, prompt: &OutboundPrompt) -> Result<(), String> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), prompt.clone()));
        self.delivered.notify_one();
        Ok(())
    }
}
