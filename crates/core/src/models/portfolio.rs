use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::errors::CoreError;

use super::allocation::{self, Allocation};
use super::risk::RiskSpec;

/// A saved portfolio as returned by the API.
///
/// Allocations are server-derived; the client never edits them directly.
#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    /// Server-assigned id (absent only before the first save)
    pub id: Option<i64>,

    /// Display name, non-empty once persisted
    pub name: String,

    pub description: Option<String>,

    /// Risk setting in whichever dialect the server used
    pub risk: RiskSpec,

    /// Amount the allocation was generated for, if known
    pub investment_amount: Option<f64>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,

    /// Ordered line items, in server order
    pub allocations: Vec<Allocation>,
}

impl Portfolio {
    pub fn new(name: impl Into<String>, risk: impl Into<RiskSpec>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            risk: risk.into(),
            investment_amount: None,
            created_at: None,
            updated_at: None,
            allocations: Vec::new(),
        }
    }

    /// Sum of allocation fractions (expected ≈ 1.0, never corrected).
    #[must_use]
    pub fn total_allocation(&self) -> f64 {
        allocation::total_allocation(&self.allocations)
    }

    #[must_use]
    pub fn sums_to_whole(&self) -> bool {
        allocation::sums_to_whole(&self.allocations)
    }
}

/// Parameters for `POST /portfolios/generate`.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    /// Optional name; the server picks one (e.g. "Moderate Portfolio") if absent
    pub name: Option<String>,
    pub risk: RiskSpec,
    pub investment_amount: f64,
    /// Free-form allocation constraints passed through to the generator
    pub constraints: Option<HashMap<String, serde_json::Value>>,
}

impl GenerateRequest {
    pub fn new(risk: impl Into<RiskSpec>, investment_amount: f64) -> Self {
        Self {
            name: None,
            risk: risk.into(),
            investment_amount,
            constraints: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Rejects non-positive or non-finite amounts before anything is sent.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_investment_amount(self.investment_amount)
    }
}

/// Full-replace payload for `PUT /portfolios/{id}`.
///
/// Name, description, risk and investment amount are always sent together,
/// even when only the name changed.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioUpdate {
    pub name: String,
    pub description: Option<String>,
    pub risk: RiskSpec,
    pub investment_amount: Option<f64>,
}

impl PortfolioUpdate {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_name(&self.name)?;
        if let Some(amount) = self.investment_amount {
            validate_investment_amount(amount)?;
        }
        Ok(())
    }
}

/// What a user edits in the dashboard form. Description and risk default to
/// the current values, and `Some("")` clears the description. The investment
/// amount is always carried over from the currently shown portfolio.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioEdit {
    pub name: String,
    pub description: Option<String>,
    pub risk: Option<RiskSpec>,
}

impl PortfolioEdit {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            risk: None,
        }
    }

    /// Merge with the portfolio being edited into a complete update payload.
    pub fn into_update(self, current: &Portfolio) -> PortfolioUpdate {
        let description = match self.description {
            Some(d) => Some(d.trim().to_string()).filter(|d| !d.is_empty()),
            None => current.description.clone(),
        };
        PortfolioUpdate {
            name: self.name.trim().to_string(),
            description,
            risk: self.risk.unwrap_or(current.risk),
            investment_amount: current.investment_amount,
        }
    }
}

pub(crate) fn validate_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation(
            "Portfolio name must not be empty".into(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_investment_amount(amount: f64) -> Result<(), CoreError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(CoreError::Validation(format!(
            "Investment amount must be a positive number, got {amount}"
        )));
    }
    Ok(())
}
