use crate::models::settings::Settings;
use crate::models::user::User;
use crate::session::handle::SessionStatus;

/// What a protected view should do right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Session still resolving: show a loading indicator, do not redirect.
    Pending,
    /// Render the protected content for this user.
    Allow(User),
    /// Go to the login view, remembering where the user was headed.
    Redirect { to: String, from: String },
}

/// Routing guard for protected views.
///
/// Holds configuration only; every decision is a pure function of the
/// session status passed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGate {
    login_path: String,
    default_landing: String,
}

impl AccessGate {
    pub fn new(settings: &Settings) -> Self {
        Self {
            login_path: settings.login_path.clone(),
            default_landing: settings.default_landing.clone(),
        }
    }

    pub fn evaluate(&self, status: &SessionStatus, location: &str) -> GateDecision {
        match status {
            SessionStatus::Unknown => GateDecision::Pending,
            SessionStatus::Authenticated(user) => GateDecision::Allow(user.clone()),
            SessionStatus::Anonymous => GateDecision::Redirect {
                to: self.login_path.clone(),
                from: location.to_string(),
            },
        }
    }

    /// Where to go after a successful login.
    ///
    /// The captured location is used only if it is a local path other than
    /// the login view itself; anything else lands on the default page.
    pub fn return_target(&self, from: Option<&str>) -> String {
        match from.map(str::trim) {
            Some(path)
                if path.starts_with('/')
                    && !path.starts_with("//")
                    && path != self.login_path =>
            {
                path.to_string()
            }
            _ => self.default_landing.clone(),
        }
    }
}

impl Default for AccessGate {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}
