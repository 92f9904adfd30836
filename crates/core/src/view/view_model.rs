use std::sync::Arc;

use log::debug;

use crate::client::portfolio_client::PortfolioClient;
use crate::errors::CoreError;
use crate::models::portfolio::Portfolio;

use super::projection::ViewSnapshot;
use super::sink::RenderSink;

/// Tag for one `load` request. Only the most recently issued ticket may
/// change the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    seq: u64,
    id: i64,
}

impl LoadTicket {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// What happened to a completed load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The response replaced the shown portfolio.
    Applied,
    /// A newer request (or a clear) superseded this one; response dropped.
    Stale,
}

/// "The portfolio currently shown" and its derived projections.
///
/// The portfolio is only ever replaced wholesale from a successful API
/// response, and every replacement or clear is pushed to all sinks as one
/// shared snapshot.
pub struct PortfolioViewModel {
    portfolio: Option<Portfolio>,
    snapshot: Arc<ViewSnapshot>,
    latest_seq: u64,
    in_flight: Option<LoadTicket>,
    sinks: Vec<Box<dyn RenderSink>>,
}

impl std::fmt::Debug for PortfolioViewModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioViewModel")
            .field("portfolio_id", &self.snapshot.portfolio_id)
            .field("latest_seq", &self.latest_seq)
            .field("in_flight", &self.in_flight)
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl Default for PortfolioViewModel {
    fn default() -> Self {
        Self::new()
    }
}

impl PortfolioViewModel {
    pub fn new() -> Self {
        Self {
            portfolio: None,
            snapshot: Arc::new(ViewSnapshot::empty()),
            latest_seq: 0,
            in_flight: None,
            sinks: Vec::new(),
        }
    }

    /// Register a sink and immediately render the current state into it.
    pub fn add_sink(&mut self, mut sink: Box<dyn RenderSink>) {
        sink.render(Arc::clone(&self.snapshot));
        self.sinks.push(sink);
    }

    // ── Reads ───────────────────────────────────────────────────────

    #[must_use]
    pub fn portfolio(&self) -> Option<&Portfolio> {
        self.portfolio.as_ref()
    }

    #[must_use]
    pub fn current_id(&self) -> Option<i64> {
        self.portfolio.as_ref().and_then(|p| p.id)
    }

    #[must_use]
    pub fn snapshot(&self) -> Arc<ViewSnapshot> {
        Arc::clone(&self.snapshot)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.portfolio.is_none()
    }

    /// A load has been issued and its response is still outstanding.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    #[must_use]
    pub fn total_allocation(&self) -> f64 {
        self.snapshot.header.total_allocation
    }

    #[must_use]
    pub fn total_value(&self) -> f64 {
        self.snapshot.header.total_value
    }

    // ── Loading ─────────────────────────────────────────────────────

    /// Issue a ticket for a new load of `id`. Any earlier ticket is now stale.
    pub fn begin_load(&mut self, id: i64) -> LoadTicket {
        self.latest_seq += 1;
        let ticket = LoadTicket {
            seq: self.latest_seq,
            id,
        };
        self.in_flight = Some(ticket);
        ticket
    }

    /// Apply the response for `ticket`, unless a newer ticket was issued since.
    ///
    /// On failure the shown portfolio is left untouched and the error comes
    /// back as `Load` (authentication failures pass through unchanged so the
    /// caller can end the session).
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Portfolio, CoreError>,
    ) -> Result<LoadOutcome, CoreError> {
        if ticket.seq != self.latest_seq {
            debug!(
                "[ViewModel] Dropping stale response for portfolio {} (ticket {}, latest {})",
                ticket.id, ticket.seq, self.latest_seq
            );
            return Ok(LoadOutcome::Stale);
        }
        self.in_flight = None;

        match result {
            Ok(portfolio) => {
                self.apply(portfolio);
                Ok(LoadOutcome::Applied)
            }
            Err(e) if e.is_auth() => Err(e),
            Err(e) => Err(CoreError::Load {
                id: ticket.id,
                reason: e.to_string(),
            }),
        }
    }

    /// Fetch `id` and show it. Single-owner convenience over
    /// [`begin_load`](Self::begin_load) / [`complete_load`](Self::complete_load).
    pub async fn load(
        &mut self,
        client: &PortfolioClient,
        id: i64,
    ) -> Result<LoadOutcome, CoreError> {
        let ticket = self.begin_load(id);
        let result = client.get_by_id(id).await;
        self.complete_load(ticket, result)
    }

    /// Show a portfolio obtained from another successful call (generate,
    /// update). Supersedes any in-flight load.
    pub fn replace(&mut self, portfolio: Portfolio) {
        self.latest_seq += 1;
        self.in_flight = None;
        self.apply(portfolio);
    }

    /// Back to "no portfolio selected". Also supersedes any in-flight load,
    /// so a late response cannot bring a cleared portfolio back.
    pub fn clear(&mut self) {
        self.latest_seq += 1;
        self.in_flight = None;
        self.portfolio = None;
        self.snapshot = Arc::new(ViewSnapshot::empty());
        self.publish();
    }

    fn apply(&mut self, portfolio: Portfolio) {
        self.snapshot = Arc::new(ViewSnapshot::from_portfolio(&portfolio));
        self.portfolio = Some(portfolio);
        self.publish();
    }

    fn publish(&mut self) {
        for sink in &mut self.sinks {
            debug!("[ViewModel] Rendering into {}", sink.name());
            sink.render(Arc::clone(&self.snapshot));
        }
    }
}
