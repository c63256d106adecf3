//! HTTP API for the farmer bot
//!
//! Webhook endpoints for the WhatsApp Cloud API plus a small JSON surface for
//! driving and inspecting conversations directly.

mod handlers;
mod types;

pub use handlers::create_router;

use crate::runtime::RuntimeManager;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<RuntimeManager>,
    /// Token the Cloud API must echo during webhook verification
    pub verify_token: Option<String>,
}

impl AppState {
    pub fn new(manager: Arc<RuntimeManager>, verify_token: Option<String>) -> Self {
        Self {
            manager,
            verify_token,
        }
    }
}
