use std::sync::Arc;

use super::projection::ViewSnapshot;

/// A presentation component (chart, table, summary card) that displays
/// derived data and keeps no state of its own.
///
/// Every registered sink receives the same snapshot on every change; sinks
/// must not derive anything from earlier snapshots.
pub trait RenderSink: Send {
    /// Name for logs.
    fn name(&self) -> &str;

    fn render(&mut self, snapshot: Arc<ViewSnapshot>);
}
