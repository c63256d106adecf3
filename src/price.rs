//! Market price suggestion engine
//!
//! Retrieval goes through [`PriceSource`]; every source is wrapped in
//! [`BoundedPriceSource`] so a slow portal can never stall a conversation
//! past its budget.

mod agmarknet;
mod analyzer;
mod types;

pub use agmarknet::AgmarknetClient;
pub use analyzer::summarize;
pub use types::*;

use crate::runtime::PriceSource;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Applies a wall-clock budget to a price source and logs each lookup.
/// A lookup that runs out of time yields an empty report.
pub struct BoundedPriceSource {
    inner: Arc<dyn PriceSource>,
    budget: Duration,
}

impl BoundedPriceSource {
    pub fn new(inner: Arc<dyn PriceSource>, budget: Duration) -> Self {
        Self { inner, budget }
    }
}

#[async_trait]
impl PriceSource for BoundedPriceSource {
    async fn fetch_price_rows(&self, commodity: &str, region: &str) -> Vec<PriceRow> {
        let start = Instant::now();
        let result = tokio::time::timeout(self.budget, self.inner.fetch_price_rows(commodity, region)).await;
        let duration = start.elapsed();

        match result {
            Ok(rows) => {
                tracing::info!(
                    commodity,
                    region,
                    duration_ms = %duration.as_millis(),
                    rows = rows.len(),
                    "Price lookup completed"
                );
                rows
            }
            Err(_) => {
                tracing::warn!(
                    commodity,
                    region,
                    reason = "timeout",
                    budget_ms = %self.budget.as_millis(),
                    "Price lookup exceeded its budget"
                );
                Vec::new()
            }
        }
    }
}
