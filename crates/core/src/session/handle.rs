use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::models::user::{AuthToken, User};

/// Where the session stands.
///
/// `Unknown` exists only until start-up resolution finishes; protected views
/// show a loading state while in it, never a redirect.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Unknown,
    Authenticated(User),
    Anonymous,
}

impl SessionStatus {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionStatus::Authenticated(_))
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            SessionStatus::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

/// In-memory session: the token attached to outbound calls plus the resolved
/// status. `Authenticated` implies a token; no token means no header.
#[derive(Debug, Clone, Default)]
pub struct Session {
    token: Option<AuthToken>,
    status: SessionStatus,
}

impl Session {
    pub fn token(&self) -> Option<&AuthToken> {
        self.token.as_ref()
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }
}

/// Shared handle to the current [`Session`].
///
/// The session store is the only writer; API clients receive a clone and read
/// the token on every call, so a login or logout is visible to the very next
/// request.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    inner: Arc<RwLock<Session>>,
}

impl SessionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Snapshot of the whole session.
    pub fn snapshot(&self) -> Session {
        self.read().clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.read().status.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().status.is_authenticated()
    }

    pub fn current_user(&self) -> Option<User> {
        self.read().status.user().cloned()
    }

    /// `Authorization` header value for the next request, if any.
    pub fn authorization(&self) -> Option<String> {
        self.read().token.as_ref().map(AuthToken::bearer)
    }

    pub(crate) fn attach_token(&self, token: AuthToken) {
        self.write().token = Some(token);
    }

    pub(crate) fn set_authenticated(&self, token: AuthToken, user: User) {
        let mut session = self.write();
        session.token = Some(token);
        session.status = SessionStatus::Authenticated(user);
    }

    pub(crate) fn set_anonymous(&self) {
        let mut session = self.write();
        session.token = None;
        session.status = SessionStatus::Anonymous;
    }
}
