//! Boundary adapter between the API's JSON shapes and the domain model.
//!
//! The backend has two dialects for the same concepts:
//!
//! - allocations carry either `allocation_percentage` as a fraction or
//!   `percentage` as a whole number (0–100), and `asset_class` or `asset_type`;
//! - portfolios carry either `risk_profile` (enum string) or `risk_level`
//!   (1–10), and `investment_amount` or `initial_investment`.
//!
//! Everything is normalized here; the rest of the crate sees fractions and
//! [`RiskSpec`] only.

use chrono::{DateTime, NaiveDateTime, Utc};
use log::warn;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::HashMap;

use crate::errors::CoreError;
use crate::models::allocation::Allocation;
use crate::models::analysis::{ComparisonEntry, RiskMetrics};
use crate::models::portfolio::{GenerateRequest, Portfolio, PortfolioUpdate};
use crate::models::risk::{RiskLevel, RiskProfile, RiskSpec};

/// Label used when the server omits an allocation's class.
pub const UNCLASSIFIED: &str = "other";

#[derive(Debug, Deserialize)]
pub(crate) struct WireAllocation {
    #[serde(default)]
    id: Option<i64>,
    #[serde(default)]
    asset_class: Option<String>,
    #[serde(default)]
    asset_type: Option<String>,
    asset_name: String,
    #[serde(default)]
    allocation_percentage: Option<f64>,
    #[serde(default)]
    percentage: Option<f64>,
    #[serde(default)]
    ticker: Option<String>,
    #[serde(default)]
    sector: Option<String>,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    current_value: Option<f64>,
    #[serde(default)]
    metadata: Option<HashMap<String, Value>>,
}

impl WireAllocation {
    fn into_domain(self) -> Result<Allocation, CoreError> {
        let fraction = match (self.allocation_percentage, self.percentage) {
            (Some(fraction), _) => fraction,
            (None, Some(whole)) => whole / 100.0,
            (None, None) => {
                return Err(CoreError::Deserialization(format!(
                    "Allocation '{}' has no percentage",
                    self.asset_name
                )))
            }
        };
        if !fraction.is_finite() {
            return Err(CoreError::Deserialization(format!(
                "Allocation '{}' has a non-finite percentage",
                self.asset_name
            )));
        }

        Ok(Allocation {
            id: self.id,
            asset_class: self
                .asset_class
                .or(self.asset_type)
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| UNCLASSIFIED.to_string()),
            asset_name: self.asset_name,
            allocation_percentage: fraction,
            ticker: self.ticker.filter(|t| !t.is_empty()),
            sector: self.sector,
            region: self.region,
            current_value: self.current_value,
            metadata: self.metadata,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WirePortfolio {
    #[serde(default)]
    id: Option<i64>,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    risk_profile: Option<String>,
    #[serde(default)]
    risk_level: Option<i64>,
    #[serde(default)]
    investment_amount: Option<f64>,
    #[serde(default)]
    initial_investment: Option<f64>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
    #[serde(default)]
    allocations: Vec<WireAllocation>,
}

impl WirePortfolio {
    pub(crate) fn into_domain(self) -> Result<Portfolio, CoreError> {
        let risk = match (self.risk_level, self.risk_profile.as_deref()) {
            (Some(level), _) => {
                let level = u8::try_from(level)
                    .ok()
                    .and_then(|l| RiskLevel::new(l).ok())
                    .ok_or_else(|| {
                        CoreError::Deserialization(format!("Risk level {level} out of range"))
                    })?;
                RiskSpec::Level(level)
            }
            (None, Some(profile)) => RiskSpec::Profile(
                RiskProfile::parse(profile)
                    .map_err(|e| CoreError::Deserialization(e.to_string()))?,
            ),
            (None, None) => {
                return Err(CoreError::Deserialization(format!(
                    "Portfolio '{}' has neither risk_level nor risk_profile",
                    self.name
                )))
            }
        };

        let allocations = self
            .allocations
            .into_iter()
            .map(WireAllocation::into_domain)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Portfolio {
            id: self.id,
            name: self.name,
            description: self.description.filter(|d| !d.is_empty()),
            risk,
            investment_amount: self.investment_amount.or(self.initial_investment),
            created_at: self.created_at.as_deref().and_then(parse_timestamp),
            updated_at: self.updated_at.as_deref().and_then(parse_timestamp),
            allocations,
        })
    }
}

/// Accepts RFC 3339 and the naive ISO form the backend emits (treated as UTC).
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    warn!("[PortfolioApi] Ignoring unparseable timestamp {raw:?}");
    None
}

/// Risk and amount fields in the dialect matching the variant.
fn risk_fields(body: &mut Map<String, Value>, risk: &RiskSpec, amount: Option<f64>) {
    match risk {
        RiskSpec::Profile(profile) => {
            body.insert("risk_profile".into(), json!(profile.as_str()));
        }
        RiskSpec::Level(level) => {
            body.insert("risk_level".into(), json!(level.value()));
        }
    }
    if let Some(amount) = amount {
        body.insert("investment_amount".into(), json!(amount));
        if matches!(risk, RiskSpec::Level(_)) {
            body.insert("initial_investment".into(), json!(amount));
        }
    }
}

pub(crate) fn generate_body(request: &GenerateRequest) -> Value {
    let mut body = Map::new();
    if let Some(name) = request.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        body.insert("name".into(), json!(name));
    }
    risk_fields(&mut body, &request.risk, Some(request.investment_amount));
    if let Some(constraints) = &request.constraints {
        body.insert("constraints".into(), json!(constraints));
    }
    Value::Object(body)
}

pub(crate) fn update_body(update: &PortfolioUpdate) -> Value {
    let mut body = Map::new();
    body.insert("name".into(), json!(update.name));
    body.insert(
        "description".into(),
        json!(update.description.clone().unwrap_or_default()),
    );
    risk_fields(&mut body, &update.risk, update.investment_amount);
    Value::Object(body)
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireRiskResponse {
    pub metrics: RiskMetrics,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireComparison {
    name: String,
    #[serde(default)]
    risk_profile: Option<String>,
    #[serde(default)]
    risk_level: Option<i64>,
    metrics: RiskMetrics,
}

/// The comparison endpoint returns an object keyed by portfolio id; rows come
/// back in the order the ids were requested.
pub(crate) fn comparison_entries(
    ids: &[i64],
    mut response: HashMap<String, WireComparison>,
) -> Vec<ComparisonEntry> {
    ids.iter()
        .filter_map(|id| {
            let Some(row) = response.remove(&id.to_string()) else {
                warn!("[PortfolioApi] Comparison response is missing portfolio {id}");
                return None;
            };
            let risk_profile = row
                .risk_profile
                .or_else(|| row.risk_level.map(|l| format!("{l}/10")))
                .unwrap_or_default();
            Some(ComparisonEntry {
                portfolio_id: *id,
                name: row.name,
                risk_profile,
                metrics: row.metrics,
            })
        })
        .collect()
}
