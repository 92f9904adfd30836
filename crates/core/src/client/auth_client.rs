use std::sync::Arc;

use serde_json::json;

use crate::errors::CoreError;
use crate::models::user::{AuthToken, Credentials, Registration, TokenResponse, User};
use crate::transport::traits::{ApiRequest, HttpTransport};

use super::dispatch;

/// Bindings for the three authentication endpoints.
///
/// Unlike [`super::portfolio_client::PortfolioClient`] this client does not
/// read the shared session: the session store decides which token (if any)
/// each call carries.
#[derive(Clone)]
pub struct AuthClient {
    transport: Arc<dyn HttpTransport>,
}

impl AuthClient {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// `POST /auth/login` with a form-encoded body.
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthToken, CoreError> {
        let request = ApiRequest::post("/auth/login").form(vec![
            ("username".to_string(), credentials.username.trim().to_string()),
            ("password".to_string(), credentials.password.clone()),
        ]);
        let response = dispatch(self.transport.as_ref(), "login", request).await?;
        let body: TokenResponse = response.json()?;

        if let Some(kind) = body.token_type.as_deref() {
            if !kind.eq_ignore_ascii_case("bearer") {
                return Err(CoreError::Auth(format!("Unsupported token type '{kind}'")));
            }
        }
        if body.access_token.is_empty() {
            return Err(CoreError::Auth("Server returned an empty access token".into()));
        }
        Ok(AuthToken::new(body.access_token))
    }

    /// `POST /auth/register`.
    pub async fn register(&self, registration: &Registration) -> Result<User, CoreError> {
        let mut body = json!({
            "email": registration.email.trim(),
            "password": registration.password,
        });
        if let Some(full_name) = &registration.full_name {
            body["full_name"] = json!(full_name);
        }
        let request = ApiRequest::post("/auth/register").json(body);
        dispatch(self.transport.as_ref(), "register", request)
            .await?
            .json()
    }

    /// `GET /users/me` with an explicit token.
    pub async fn current_user(&self, token: &AuthToken) -> Result<User, CoreError> {
        let request = ApiRequest::get("/users/me").authorization(Some(token.bearer()));
        dispatch(self.transport.as_ref(), "current user", request)
            .await?
            .json()
    }
}
