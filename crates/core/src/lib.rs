pub mod access;
pub mod client;
pub mod errors;
pub mod models;
pub mod session;
pub mod transport;
pub mod view;

use std::sync::{Arc, Mutex, MutexGuard};

use log::{info, warn};

use access::{AccessGate, GateDecision};
use client::portfolio_client::PortfolioClient;
use errors::CoreError;
use models::{
    analysis::{ComparisonEntry, RiskMetrics},
    portfolio::{GenerateRequest, Portfolio, PortfolioEdit},
    settings::Settings,
    user::{Credentials, Registration, User},
};
#[cfg(not(target_arch = "wasm32"))]
use session::token_store::FileTokenStore;
use session::{store::SessionStore, token_store::TokenStore};
use transport::{reqwest_transport::ReqwestTransport, traits::HttpTransport};
use view::{
    projection::ViewSnapshot,
    selector::{PortfolioSelector, SelectorEntry},
    sink::RenderSink,
    view_model::{LoadOutcome, PortfolioViewModel},
};

/// Main entry point: one signed-in dashboard.
///
/// Wires the session store, the portfolio client (with the session injected),
/// the view model and the portfolio selector, and implements the user flows on
/// top of them. Internal locks are never held across an `.await`; when
/// selections overlap, the latest `select` wins.
#[must_use]
pub struct PortfolioDashboard {
    settings: Settings,
    gate: AccessGate,
    session: SessionStore,
    client: PortfolioClient,
    view: Mutex<PortfolioViewModel>,
    selector: Mutex<PortfolioSelector>,
}

impl std::fmt::Debug for PortfolioDashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioDashboard")
            .field("base_url", &self.settings.base_url)
            .field("session", &self.session.status())
            .field("view", &*self.view())
            .finish()
    }
}

impl PortfolioDashboard {
    /// Build with an explicit transport (tests, wasm bridges, custom stacks).
    pub fn new(
        settings: Settings,
        transport: Arc<dyn HttpTransport>,
        tokens: Arc<dyn TokenStore>,
    ) -> Self {
        let session = SessionStore::new(Arc::clone(&transport), tokens);
        let client = PortfolioClient::new(transport, session.handle());
        Self {
            gate: AccessGate::new(&settings),
            settings,
            session,
            client,
            view: Mutex::new(PortfolioViewModel::new()),
            selector: Mutex::new(PortfolioSelector::new()),
        }
    }

    /// Build on the default `reqwest` transport.
    pub fn connect(settings: Settings, tokens: Arc<dyn TokenStore>) -> Result<Self, CoreError> {
        let transport = ReqwestTransport::new(&settings)?;
        Ok(Self::new(settings, Arc::new(transport), tokens))
    }

    /// Build on the default transport with the token kept in a key/value
    /// file at `path`, under `settings.token_key`.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn open(
        settings: Settings,
        path: impl Into<std::path::PathBuf>,
    ) -> Result<Self, CoreError> {
        let tokens = FileTokenStore::from_settings(path, &settings);
        Self::connect(settings, Arc::new(tokens))
    }

    fn view(&self) -> MutexGuard<'_, PortfolioViewModel> {
        self.view.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn selector(&self) -> MutexGuard<'_, PortfolioSelector> {
        self.selector.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ── Accessors ───────────────────────────────────────────────────

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn client(&self) -> &PortfolioClient {
        &self.client
    }

    #[must_use]
    pub fn snapshot(&self) -> Arc<ViewSnapshot> {
        self.view().snapshot()
    }

    #[must_use]
    pub fn current_portfolio(&self) -> Option<Portfolio> {
        self.view().portfolio().cloned()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.view().is_loading()
    }

    #[must_use]
    pub fn selector_entries(&self) -> Vec<SelectorEntry> {
        self.selector().entries().to_vec()
    }

    #[must_use]
    pub fn selector_state(&self) -> PortfolioSelector {
        self.selector().clone()
    }

    pub fn add_sink(&self, sink: Box<dyn RenderSink>) {
        self.view().add_sink(sink);
    }

    // ── Session ─────────────────────────────────────────────────────

    /// Gate decision for a protected view at `location`.
    pub fn access(&self, location: &str) -> GateDecision {
        self.gate.evaluate(&self.session.status(), location)
    }

    /// Resume a persisted session at start-up.
    pub async fn initialize(&self) -> Option<User> {
        self.session.initialize().await
    }

    /// Log in and return the user plus where to navigate next
    /// (`return_to` as captured by a gate redirect, or the default landing).
    pub async fn login(
        &self,
        credentials: &Credentials,
        return_to: Option<&str>,
    ) -> Result<(User, String), CoreError> {
        self.invalidate_view();
        let user = self.session.login(credentials).await?;
        Ok((user, self.gate.return_target(return_to)))
    }

    pub async fn register(&self, registration: &Registration) -> Result<User, CoreError> {
        self.invalidate_view();
        self.session.register(registration).await
    }

    pub fn logout(&self) {
        self.session.logout();
        self.invalidate_view();
    }

    fn invalidate_view(&self) {
        self.view().clear();
        self.selector().clear();
    }

    /// Ask the gate before any authorized call. Nothing is sent unless it
    /// allows the current session.
    fn require_session(&self) -> Result<(), CoreError> {
        match self.gate.evaluate(&self.session.status(), &self.settings.default_landing) {
            GateDecision::Allow(_) => Ok(()),
            GateDecision::Pending => Err(CoreError::Auth(
                "Session is still being restored".into(),
            )),
            GateDecision::Redirect { .. } => Err(CoreError::Auth("Not signed in".into())),
        }
    }

    /// A 401/403 anywhere ends the session and wipes what it could see.
    fn guard<T>(&self, result: Result<T, CoreError>) -> Result<T, CoreError> {
        if let Err(e) = &result {
            if e.is_auth() {
                warn!("[Dashboard] Server rejected the session: {e}");
                self.logout();
            }
        }
        result
    }

    // ── Portfolio list ──────────────────────────────────────────────

    /// Re-fetch the selector list. On failure the previous entries stay and
    /// the selector records the error.
    pub async fn refresh_list(&self) -> Result<Vec<SelectorEntry>, CoreError> {
        self.require_session()?;
        let result = self.guard(self.client.list().await);
        let current = self.view().current_id();
        let mut selector = self.selector();
        match result {
            Ok(portfolios) => {
                selector.replace(&portfolios, current);
                Ok(selector.entries().to_vec())
            }
            Err(e) => {
                selector.mark_failed(e.to_string());
                Err(e)
            }
        }
    }

    // ── Shown portfolio ─────────────────────────────────────────────

    /// Pick a portfolio from the selector; `None` clears the dashboard.
    pub async fn select(&self, id: Option<i64>) -> Result<LoadOutcome, CoreError> {
        self.selector().select(id);
        match id {
            Some(id) => self.load(id).await,
            None => {
                self.view().clear();
                Ok(LoadOutcome::Applied)
            }
        }
    }

    /// Fetch and show `id`. A response overtaken by a newer load is dropped.
    pub async fn load(&self, id: i64) -> Result<LoadOutcome, CoreError> {
        self.require_session()?;
        let ticket = self.view().begin_load(id);
        let result = self.client.get_by_id(id).await;
        let outcome = self.view().complete_load(ticket, result);
        self.guard(outcome)
    }

    /// Re-fetch the shown portfolio, or the list when nothing is shown.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        let current = self.view().current_id();
        match current {
            Some(id) => self.load(id).await.map(|_| ()),
            None => self.refresh_list().await.map(|_| ()),
        }
    }

    /// Outcome of a re-fetch that follows a saved change. Only an auth
    /// failure is returned, since the change itself already went through.
    fn settle<T>(&self, step: &str, result: Result<T, CoreError>) -> Result<(), CoreError> {
        match result {
            Ok(_) => Ok(()),
            Err(e) if e.is_auth() => Err(e),
            Err(e) => {
                warn!("[Dashboard] {step} after a saved change failed: {e}");
                Ok(())
            }
        }
    }

    /// Generate a new portfolio, show it, and refresh the list.
    ///
    /// Once the server has created the portfolio this returns it, even if the
    /// list refresh fails; that failure stays in the selector.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<Portfolio, CoreError> {
        request.validate()?;
        self.require_session()?;
        let portfolio = self.guard(self.client.generate(request).await)?;

        self.view().replace(portfolio.clone());
        self.selector().select(portfolio.id);
        let listed = self.refresh_list().await;
        self.settle("List refresh", listed)?;
        Ok(portfolio)
    }

    /// Save an edit of the shown portfolio.
    ///
    /// The name is validated locally first. On success both the view and the
    /// selector list are re-fetched so they cannot disagree on the name. A
    /// failed re-fetch does not fail the edit: the view falls back to the
    /// saved portfolio and the selector keeps the list error.
    pub async fn submit_edit(&self, edit: PortfolioEdit) -> Result<Portfolio, CoreError> {
        let current = self
            .current_portfolio()
            .ok_or_else(|| CoreError::Validation("No portfolio selected".into()))?;
        let id = current
            .id
            .ok_or_else(|| CoreError::Validation("Shown portfolio has no id".into()))?;

        let update = edit.into_update(&current);
        update.validate()?;
        self.require_session()?;

        let updated = self.guard(self.client.update(id, &update).await)?;
        info!("[Dashboard] Updated portfolio {id}");

        let reloaded = self.load(id).await;
        if matches!(&reloaded, Err(e) if !e.is_auth()) {
            self.view().replace(updated.clone());
        }
        self.settle("Reload", reloaded)?;
        let listed = self.refresh_list().await;
        self.settle("List refresh", listed)?;
        Ok(updated)
    }

    /// Delete the shown portfolio. The view is cleared before the list is
    /// refreshed, so no sink ever shows the deleted portfolio again. Only a
    /// failed delete is returned; a failed refresh stays in the selector.
    pub async fn delete_current(&self) -> Result<(), CoreError> {
        let id = self
            .view()
            .current_id()
            .ok_or_else(|| CoreError::Validation("No portfolio selected".into()))?;
        self.require_session()?;

        self.guard(self.client.delete(id).await)?;
        self.view().clear();
        self.selector().select(None);
        let listed = self.refresh_list().await;
        self.settle("List refresh", listed)
    }

    // ── Analysis ────────────────────────────────────────────────────

    pub async fn risk_metrics(&self, id: i64, days: u32) -> Result<RiskMetrics, CoreError> {
        self.require_session()?;
        self.guard(self.client.risk_metrics(id, days).await)
    }

    pub async fn compare(&self, ids: &[i64], days: u32) -> Result<Vec<ComparisonEntry>, CoreError> {
        self.require_session()?;
        self.guard(self.client.compare(ids, days).await)
    }
}
