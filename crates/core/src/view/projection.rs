use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::models::allocation::{self, Allocation};
use crate::models::portfolio::Portfolio;

/// Header text when nothing is selected.
pub const EMPTY_NAME: &str = "Select a portfolio";

/// Shown for absent dates, tickers and risk in the empty state.
pub const PLACEHOLDER: &str = "-";

/// Shown when a portfolio has never been updated.
pub const NOT_MODIFIED: &str = "Not modified";

/// Summary card above the chart and table.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryHeader {
    pub name: String,
    pub description: String,
    pub risk_label: String,
    pub created: String,
    pub updated: String,
    /// Sum of allocation fractions, exactly as received
    pub total_allocation: f64,
    /// Whether `total_allocation` is 1.0 within tolerance
    pub sums_to_whole: bool,
    pub total_value: f64,
}

impl SummaryHeader {
    fn empty() -> Self {
        Self {
            name: EMPTY_NAME.to_string(),
            description: String::new(),
            risk_label: PLACEHOLDER.to_string(),
            created: PLACEHOLDER.to_string(),
            updated: PLACEHOLDER.to_string(),
            total_allocation: 0.0,
            sums_to_whole: false,
            total_value: 0.0,
        }
    }
}

/// One row of the allocation table, already in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub asset_name: String,
    pub asset_class: String,
    pub ticker: String,
    pub sector: String,
    pub region: String,
    /// Fraction; use [`format_percent`] to display
    pub allocation: f64,
    pub value: f64,
}

/// Everything every render sink needs, derived from one portfolio.
///
/// Snapshots are immutable and shared (`Arc`) between sinks, so the header,
/// chart and table of one render always describe the same data.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSnapshot {
    pub portfolio_id: Option<i64>,
    pub header: SummaryHeader,
    /// Asset class → summed fraction, in order of first occurrence
    pub grouped: IndexMap<String, f64>,
    pub rows: Vec<TableRow>,
}

impl ViewSnapshot {
    /// The "no portfolio selected" state. Every field has a defined value.
    pub fn empty() -> Self {
        Self {
            portfolio_id: None,
            header: SummaryHeader::empty(),
            grouped: IndexMap::new(),
            rows: Vec::new(),
        }
    }

    pub fn from_portfolio(portfolio: &Portfolio) -> Self {
        let allocations = &portfolio.allocations;
        let investment = portfolio.investment_amount;

        let header = SummaryHeader {
            name: portfolio.name.clone(),
            description: portfolio.description.clone().unwrap_or_default(),
            risk_label: portfolio.risk.display_label(),
            created: format_date(portfolio.created_at),
            updated: portfolio
                .updated_at
                .map(|d| format_date(Some(d)))
                .unwrap_or_else(|| NOT_MODIFIED.to_string()),
            total_allocation: allocation::total_allocation(allocations),
            sums_to_whole: allocation::sums_to_whole(allocations),
            total_value: total_value(allocations, investment),
        };

        let rows = table_order(allocations)
            .into_iter()
            .map(|a| TableRow {
                asset_name: a.asset_name.clone(),
                asset_class: a.asset_class.clone(),
                ticker: a.ticker.clone().unwrap_or_else(|| PLACEHOLDER.to_string()),
                sector: a.sector.clone().unwrap_or_else(|| PLACEHOLDER.to_string()),
                region: a.region.clone().unwrap_or_else(|| PLACEHOLDER.to_string()),
                allocation: a.allocation_percentage,
                value: allocation_value(a, investment),
            })
            .collect();

        Self {
            portfolio_id: portfolio.id,
            header,
            grouped: group_by_asset_class(allocations),
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.portfolio_id.is_none() && self.rows.is_empty()
    }

    /// `(label, value)` pairs for the asset-class chart. Colors are assigned
    /// by position, so the order is the grouping's first-occurrence order.
    pub fn chart_series(&self) -> Vec<(String, f64)> {
        self.grouped
            .iter()
            .map(|(label, value)| (label.clone(), *value))
            .collect()
    }

    /// `(label, value)` pairs for the per-asset chart, in table order.
    pub fn asset_series(&self) -> Vec<(String, f64)> {
        self.rows
            .iter()
            .map(|r| (r.asset_name.clone(), r.allocation))
            .collect()
    }
}

/// Fold allocations into asset class → summed fraction. Iteration order is
/// the order in which each class first appears.
pub fn group_by_asset_class(allocations: &[Allocation]) -> IndexMap<String, f64> {
    let mut grouped: IndexMap<String, f64> = IndexMap::new();
    for a in allocations {
        *grouped.entry(a.asset_class.clone()).or_insert(0.0) += a.allocation_percentage;
    }
    grouped
}

/// Allocations by descending share; equal shares keep their original order.
pub fn table_order(allocations: &[Allocation]) -> Vec<&Allocation> {
    let mut ordered: Vec<&Allocation> = allocations.iter().collect();
    // `sort_by` is stable
    ordered.sort_by(|a, b| {
        b.allocation_percentage
            .partial_cmp(&a.allocation_percentage)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ordered
}

fn allocation_value(a: &Allocation, investment: Option<f64>) -> f64 {
    let value = match (a.current_value, investment) {
        (Some(v), _) => v,
        (None, Some(amount)) => a.allocation_percentage * amount,
        (None, None) => 0.0,
    };
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Σ `current_value`, falling back to share × investment amount per line.
/// Never negative; 0 for an empty set.
pub fn total_value(allocations: &[Allocation], investment: Option<f64>) -> f64 {
    let total: f64 = allocations
        .iter()
        .map(|a| allocation_value(a, investment))
        .sum();
    total.max(0.0)
}

/// Fraction → `"12.34%"`. The only place fractions become whole percentages.
pub fn format_percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

pub fn format_currency(value: f64) -> String {
    format!("${value:.2}")
}

pub fn format_date(date: Option<DateTime<Utc>>) -> String {
    match date {
        Some(d) => d.format("%Y-%m-%d").to_string(),
        None => PLACEHOLDER.to_string(),
    }
}
