use std::collections::HashMap;
use std::sync::Arc;

use log::info;
use serde_json::json;

use crate::errors::CoreError;
use crate::models::analysis::{ComparisonEntry, RiskMetrics};
use crate::models::portfolio::{GenerateRequest, Portfolio, PortfolioUpdate};
use crate::session::handle::SessionHandle;
use crate::transport::traits::{ApiRequest, HttpTransport};

use super::dispatch;
use super::wire::{self, WireComparison, WirePortfolio, WireRiskResponse};

/// Default look-back window for risk analysis.
pub const DEFAULT_ANALYSIS_DAYS: u32 = 365;

/// Typed binding over the portfolio endpoints.
///
/// Stateless apart from the injected [`SessionHandle`], which is read on every
/// call: whatever token the session holds at send time is the one attached.
/// No caching, no retries.
#[derive(Clone)]
pub struct PortfolioClient {
    transport: Arc<dyn HttpTransport>,
    session: SessionHandle,
}

impl PortfolioClient {
    pub fn new(transport: Arc<dyn HttpTransport>, session: SessionHandle) -> Self {
        Self { transport, session }
    }

    fn authorized(&self, request: ApiRequest) -> ApiRequest {
        request.authorization(self.session.authorization())
    }

    /// `GET /portfolios`. Entries may come without allocations.
    pub async fn list(&self) -> Result<Vec<Portfolio>, CoreError> {
        let request = self.authorized(ApiRequest::get("/portfolios"));
        let wire: Vec<WirePortfolio> = dispatch(self.transport.as_ref(), "list portfolios", request)
            .await?
            .json()?;
        let portfolios = wire
            .into_iter()
            .map(WirePortfolio::into_domain)
            .collect::<Result<Vec<_>, _>>()?;
        info!("[PortfolioApi] Fetched {} portfolios", portfolios.len());
        Ok(portfolios)
    }

    /// `GET /portfolios/{id}` with full allocations.
    pub async fn get_by_id(&self, id: i64) -> Result<Portfolio, CoreError> {
        let request = self.authorized(ApiRequest::get(format!("/portfolios/{id}")));
        let wire: WirePortfolio = dispatch(self.transport.as_ref(), "get portfolio", request)
            .await?
            .json()?;
        wire.into_domain()
    }

    /// `POST /portfolios/generate`. Invalid amounts are rejected before sending.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<Portfolio, CoreError> {
        request.validate()?;
        let api_request = self
            .authorized(ApiRequest::post("/portfolios/generate"))
            .json(wire::generate_body(request));
        let wire: WirePortfolio =
            dispatch(self.transport.as_ref(), "generate portfolio", api_request)
                .await?
                .json()?;
        let portfolio = wire.into_domain()?;
        info!(
            "[PortfolioApi] Generated portfolio {:?} '{}' ({} allocations)",
            portfolio.id,
            portfolio.name,
            portfolio.allocations.len()
        );
        Ok(portfolio)
    }

    /// `PUT /portfolios/{id}` with the full replace payload.
    pub async fn update(&self, id: i64, update: &PortfolioUpdate) -> Result<Portfolio, CoreError> {
        update.validate()?;
        let request = self
            .authorized(ApiRequest::put(format!("/portfolios/{id}")))
            .json(wire::update_body(update));
        let wire: WirePortfolio = dispatch(self.transport.as_ref(), "update portfolio", request)
            .await?
            .json()?;
        wire.into_domain()
    }

    /// `DELETE /portfolios/{id}`.
    pub async fn delete(&self, id: i64) -> Result<(), CoreError> {
        let request = self.authorized(ApiRequest::delete(format!("/portfolios/{id}")));
        dispatch(self.transport.as_ref(), "delete portfolio", request).await?;
        info!("[PortfolioApi] Deleted portfolio {id}");
        Ok(())
    }

    /// `GET /analysis/{id}/risk?days=N`.
    pub async fn risk_metrics(&self, id: i64, days: u32) -> Result<RiskMetrics, CoreError> {
        validate_days(days)?;
        let request = self
            .authorized(ApiRequest::get(format!("/analysis/{id}/risk")))
            .query("days", days);
        let body: WireRiskResponse = dispatch(self.transport.as_ref(), "risk metrics", request)
            .await?
            .json()?;
        Ok(body.metrics)
    }

    /// `POST /analysis/compare?days=N` with the ids as a JSON array.
    /// At least two distinct portfolios are required.
    pub async fn compare(&self, ids: &[i64], days: u32) -> Result<Vec<ComparisonEntry>, CoreError> {
        let mut distinct: Vec<i64> = Vec::with_capacity(ids.len());
        for id in ids {
            if !distinct.contains(id) {
                distinct.push(*id);
            }
        }
        if distinct.len() < 2 {
            return Err(CoreError::Validation(
                "Select at least two portfolios to compare".into(),
            ));
        }
        validate_days(days)?;

        let request = self
            .authorized(ApiRequest::post("/analysis/compare"))
            .query("days", days)
            .json(json!(distinct));
        let body: HashMap<String, WireComparison> =
            dispatch(self.transport.as_ref(), "compare portfolios", request)
                .await?
                .json()?;
        Ok(wire::comparison_entries(&distinct, body))
    }
}

fn validate_days(days: u32) -> Result<(), CoreError> {
    if days == 0 {
        return Err(CoreError::Validation(
            "Analysis window must be at least one day".into(),
        ));
    }
    Ok(())
}
