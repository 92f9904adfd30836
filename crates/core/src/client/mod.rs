pub mod auth_client;
pub mod portfolio_client;
pub mod wire;

use log::{debug, warn};

use crate::errors::CoreError;
use crate::transport::traits::{ApiRequest, ApiResponse, HttpTransport};

/// Send one request and sort the outcome into the error taxonomy:
/// 401/403 → `Auth`, other non-2xx → `Request{status}`, transport failure →
/// `Request{status: None}`. An `Auth` raised by the transport itself (a token
/// it cannot send) passes through unchanged. No retries happen at this layer.
pub(crate) async fn dispatch(
    transport: &dyn HttpTransport,
    operation: &str,
    request: ApiRequest,
) -> Result<ApiResponse, CoreError> {
    let response = match transport.execute(request).await {
        Ok(response) => response,
        Err(e @ CoreError::Auth(_)) => {
            warn!("[PortfolioApi] {operation} refused by {}: {e}", transport.name());
            return Err(e);
        }
        Err(e) => {
            warn!("[PortfolioApi] {operation} failed via {}: {e}", transport.name());
            return Err(CoreError::Request {
                operation: operation.to_string(),
                status: None,
                message: e.to_string(),
            });
        }
    };

    if response.is_success() {
        debug!("[PortfolioApi] {operation} succeeded ({})", response.status);
        return Ok(response);
    }

    let message = response.error_message();
    if response.is_unauthorized() {
        warn!("[PortfolioApi] {operation} rejected: HTTP {}", response.status);
        return Err(CoreError::Auth(message));
    }

    warn!("[PortfolioApi] {operation} failed: HTTP {} {message}", response.status);
    Err(CoreError::request(operation, response.status, message))
}
