use crate::models::portfolio::Portfolio;

/// One option in the portfolio picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorEntry {
    pub id: i64,
    pub name: String,
}

/// The separately held list of all portfolios (the dashboard's drop-down).
/// An edit refreshes both this list and the view model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortfolioSelector {
    entries: Vec<SelectorEntry>,
    selected: Option<i64>,
    last_error: Option<String>,
    loaded: bool,
}

impl PortfolioSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[SelectorEntry] {
        &self.entries
    }

    pub fn selected(&self) -> Option<i64> {
        self.selected
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn name_of(&self, id: i64) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.name.as_str())
    }

    /// Replace the list from a fresh fetch. The previous selection survives if
    /// the portfolio still exists; portfolios without an id are skipped.
    pub fn replace(&mut self, portfolios: &[Portfolio], current: Option<i64>) {
        self.entries = portfolios
            .iter()
            .filter_map(|p| {
                p.id.map(|id| SelectorEntry {
                    id,
                    name: p.name.clone(),
                })
            })
            .collect();
        self.selected = current.filter(|id| self.entries.iter().any(|e| e.id == *id));
        self.last_error = None;
        self.loaded = true;
    }

    /// Record a failed refresh; the previous entries stay.
    pub fn mark_failed(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }

    pub fn select(&mut self, id: Option<i64>) {
        self.selected = id;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Text of the first, value-less option.
    pub fn placeholder_label(&self) -> &'static str {
        if self.last_error.is_some() {
            "Error loading portfolios"
        } else if self.loaded && self.entries.is_empty() {
            "No portfolios found"
        } else {
            "Select a portfolio"
        }
    }
}
