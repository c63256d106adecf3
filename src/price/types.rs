//! Market price report types

use serde::{Deserialize, Serialize};

/// Unit every Agmarknet price column is reported in
pub const QUINTAL_UNIT: &str = "Rs/quintal";

/// A raw price cell, either already numeric or as scraped text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceCell {
    Number(f64),
    Text(String),
}

impl PriceCell {
    /// Build a cell from scraped text; blank cells are absent
    pub fn from_text(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => PriceCell::Number(n),
            _ => PriceCell::Text(trimmed.to_string()),
        })
    }

    /// Numeric value, if the cell holds a finite number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PriceCell::Number(n) => n.is_finite().then_some(*n),
            PriceCell::Text(t) => t.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }
}

#[cfg(test)]
impl From<f64> for PriceCell {
    fn from(value: f64) -> Self {
        PriceCell::Number(value)
    }
}

/// One market's line on a commodity price report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    pub market: String,
    pub min_price: Option<PriceCell>,
    pub max_price: Option<PriceCell>,
    pub modal_price: Option<PriceCell>,
    pub unit: String,
}

#[cfg(test)]
impl PriceRow {
    pub fn new(market: impl Into<String>) -> Self {
        Self {
            market: market.into(),
            min_price: None,
            max_price: None,
            modal_price: None,
            unit: QUINTAL_UNIT.to_string(),
        }
    }

    #[must_use]
    pub fn with_modal(mut self, modal: impl Into<PriceCell>) -> Self {
        self.modal_price = Some(modal.into());
        self
    }
}

/// Statistics over the usable modal prices of a report
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceStats {
    pub sample_count: usize,
    pub min: f64,
    pub max: f64,
    /// Mean rounded to 2 decimal places
    pub avg: f64,
}

/// Outcome of summarizing a report
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriceSummary {
    Available(PriceStats),
    Insufficient,
}

#[cfg(test)]
impl PriceSummary {
    pub fn stats(&self) -> Option<&PriceStats> {
        match self {
            PriceSummary::Available(stats) => Some(stats),
            PriceSummary::Insufficient => None,
        }
    }
}
