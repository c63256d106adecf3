//! Reduces a price report to a summary

use super::types::{PriceRow, PriceStats, PriceSummary};

/// Summarize the modal prices of a report.
///
/// Rows whose modal price is missing or not a finite number are dropped, not
/// counted as zero. The average is rounded half away from zero to 2 decimal
/// places, which is half-up for the positive prices a report carries.
pub fn summarize(rows: &[PriceRow]) -> PriceSummary {
    let prices: Vec<f64> = rows
        .iter()
        .filter_map(|row| row.modal_price.as_ref()?.as_f64())
        .collect();

    if prices.is_empty() {
        return PriceSummary::Insufficient;
    }

    let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
    let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    // Running mean stays within [min, max], so huge finite prices cannot overflow
    #[allow(clippy::cast_precision_loss)] // report sizes are far below 2^52
    let mean = prices
        .iter()
        .enumerate()
        .fold(0.0, |acc, (i, price)| acc + (price - acc) / (i + 1) as f64);

    PriceSummary::Available(PriceStats {
        sample_count: prices.len(),
        min,
        max,
        avg: round2(mean),
    })
}

fn round2(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.is_finite() {
        rounded
    } else {
        value
    }
}
