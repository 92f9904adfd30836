use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Tolerance used when checking that allocation fractions add up to 1.0.
pub const ALLOCATION_SUM_TOLERANCE: f64 = 1e-4;

/// One line item of a portfolio: an asset and its share of the whole.
///
/// `allocation_percentage` is always a fraction in `[0, 1]` inside the crate.
/// Whole-number percentages from the wire are converted by the client adapter,
/// and converted back only for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Asset class label, e.g. "stock", "bond", "cash", "real_estate"
    pub asset_class: String,

    /// Human-readable asset name (e.g. "US Total Market ETF")
    pub asset_name: String,

    /// Share of the portfolio as a fraction (0.25 = 25%)
    pub allocation_percentage: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Market value of the position, when the server reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_value: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

impl Allocation {
    pub fn new(
        asset_class: impl Into<String>,
        asset_name: impl Into<String>,
        allocation_percentage: f64,
    ) -> Self {
        Self {
            id: None,
            asset_class: asset_class.into(),
            asset_name: asset_name.into(),
            allocation_percentage,
            ticker: None,
            sector: None,
            region: None,
            current_value: None,
            metadata: None,
        }
    }

    pub fn with_ticker(mut self, ticker: impl Into<String>) -> Self {
        self.ticker = Some(ticker.into());
        self
    }

    pub fn with_current_value(mut self, value: f64) -> Self {
        self.current_value = Some(value);
        self
    }
}

/// Sum of allocation fractions. Never corrected, only reported.
pub fn total_allocation(allocations: &[Allocation]) -> f64 {
    allocations.iter().map(|a| a.allocation_percentage).sum()
}

/// Whether the fractions add up to a whole portfolio within tolerance.
pub fn sums_to_whole(allocations: &[Allocation]) -> bool {
    (total_allocation(allocations) - 1.0).abs() <= ALLOCATION_SUM_TOLERANCE
}
