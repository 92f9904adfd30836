use serde::{Deserialize, Serialize};

/// Risk statistics for one portfolio over a look-back window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    /// Annualized volatility as a fraction
    pub volatility: f64,
    pub expected_annual_return: f64,
    pub sharpe_ratio: f64,
    /// Largest peak-to-trough loss as a fraction
    pub max_drawdown: f64,
    /// One-day 95% value at risk as a fraction
    pub var_95: f64,
}

/// Qualitative volatility band shown next to the metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolatilityBand {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl std::fmt::Display for VolatilityBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VolatilityBand::Low => write!(f, "Low"),
            VolatilityBand::Moderate => write!(f, "Moderate"),
            VolatilityBand::High => write!(f, "High"),
            VolatilityBand::VeryHigh => write!(f, "Very High"),
        }
    }
}

/// Qualitative reading of the Sharpe ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharpeRating {
    Poor,
    BelowAverage,
    Good,
    Excellent,
}

impl std::fmt::Display for SharpeRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SharpeRating::Poor => write!(f, "Poor"),
            SharpeRating::BelowAverage => write!(f, "Below Average"),
            SharpeRating::Good => write!(f, "Good"),
            SharpeRating::Excellent => write!(f, "Excellent"),
        }
    }
}

impl RiskMetrics {
    pub fn volatility_band(&self) -> VolatilityBand {
        match self.volatility {
            v if v < 0.1 => VolatilityBand::Low,
            v if v < 0.2 => VolatilityBand::Moderate,
            v if v < 0.3 => VolatilityBand::High,
            _ => VolatilityBand::VeryHigh,
        }
    }

    pub fn sharpe_rating(&self) -> SharpeRating {
        match self.sharpe_ratio {
            r if r < 0.0 => SharpeRating::Poor,
            r if r < 1.0 => SharpeRating::BelowAverage,
            r if r < 2.0 => SharpeRating::Good,
            _ => SharpeRating::Excellent,
        }
    }
}

/// One row of a side-by-side portfolio comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonEntry {
    pub portfolio_id: i64,
    pub name: String,
    pub risk_profile: String,
    pub metrics: RiskMetrics,
}
