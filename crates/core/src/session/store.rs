use std::sync::Arc;

use log::{info, warn};

use crate::client::auth_client::AuthClient;
use crate::errors::CoreError;
use crate::models::user::{Credentials, Registration, User};
use crate::transport::traits::HttpTransport;

use super::handle::{SessionHandle, SessionStatus};
use super::token_store::TokenStore;

/// Owns the authentication lifecycle: `Unknown → Authenticated | Anonymous`.
///
/// The store is the only writer of its [`SessionHandle`]. A token is published
/// to the handle (and persisted) only once `/users/me` has accepted it, so a
/// rejected login or a stale persisted token never leaves the session looking
/// logged in.
pub struct SessionStore {
    auth: AuthClient,
    tokens: Arc<dyn TokenStore>,
    handle: SessionHandle,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("status", &self.handle.status())
            .finish()
    }
}

impl SessionStore {
    pub fn new(transport: Arc<dyn HttpTransport>, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            auth: AuthClient::new(transport),
            tokens,
            handle: SessionHandle::new(),
        }
    }

    /// Handle to inject into API clients.
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.handle.status()
    }

    /// Pure check of in-memory state; never touches the network.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.handle.is_authenticated()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.handle.current_user()
    }

    /// Exchange credentials for a token, resolve the user, then persist and
    /// attach the token. Any failure leaves the session `Anonymous` with
    /// nothing persisted, even when another session was signed in before.
    pub async fn login(&self, credentials: &Credentials) -> Result<User, CoreError> {
        credentials.validate()?;

        let result = async {
            let token = self.auth.login(credentials).await?;
            let user = self.auth.current_user(&token).await?;
            Ok::<_, CoreError>((token, user))
        }
        .await;

        let (token, user) = match result {
            Ok(pair) => pair,
            Err(e) => {
                warn!("[Session] Login for {} failed: {e}", credentials.username.trim());
                self.logout();
                return Err(into_auth_error(e));
            }
        };

        if let Err(e) = self.tokens.save(&token) {
            warn!("[Session] Could not persist token: {e}");
            self.logout();
            return Err(e);
        }
        self.handle.set_authenticated(token, user.clone());
        info!("[Session] Logged in as {}", user.email);
        Ok(user)
    }

    /// Create an account, then log in with the registration email.
    pub async fn register(&self, registration: &Registration) -> Result<User, CoreError> {
        registration.validate()?;

        if let Err(e) = self.auth.register(registration).await {
            warn!("[Session] Registration for {} failed: {e}", registration.email.trim());
            return Err(into_auth_error(e));
        }
        info!("[Session] Registered {}", registration.email.trim());

        self.login(&registration.credentials()).await
    }

    /// Drop the persisted token and detach it from outbound calls.
    /// Idempotent; storage failures are logged, never returned.
    pub fn logout(&self) {
        if let Err(e) = self.tokens.clear() {
            warn!("[Session] Could not clear persisted token: {e}");
        }
        let was_authenticated = self.handle.is_authenticated();
        self.handle.set_anonymous();
        if was_authenticated {
            info!("[Session] Logged out");
        }
    }

    /// Start-up: resume from a persisted token if there is one.
    ///
    /// No token → `Anonymous` without any request. A token the server no
    /// longer accepts (or any other resolution failure) is treated as a logout,
    /// not an error.
    pub async fn initialize(&self) -> Option<User> {
        let token = match self.tokens.load() {
            Ok(Some(token)) => token,
            Ok(None) => {
                self.handle.set_anonymous();
                return None;
            }
            Err(e) => {
                warn!("[Session] Could not read persisted token: {e}");
                self.logout();
                return None;
            }
        };

        self.handle.attach_token(token.clone());
        match self.auth.current_user(&token).await {
            Ok(user) => {
                info!("[Session] Resumed session for {}", user.email);
                self.handle.set_authenticated(token, user.clone());
                Some(user)
            }
            Err(e) => {
                warn!("[Session] Persisted token rejected, clearing session: {e}");
                self.logout();
                None
            }
        }
    }
}

/// Everything that goes wrong during login/registration surfaces as `Auth`,
/// except local validation.
fn into_auth_error(e: CoreError) -> CoreError {
    match e {
        CoreError::Validation(_) | CoreError::Auth(_) => e,
        CoreError::Request {
            status: Some(_),
            message,
            ..
        } => CoreError::Auth(message),
        other => CoreError::Auth(other.to_string()),
    }
}
