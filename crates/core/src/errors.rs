use thiserror::Error;

/// Unified error type for the entire portfolio-sync-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Local, pre-request ──────────────────────────────────────────
    #[error("Validation failed: {0}")]
    Validation(String),

    // ── Session ─────────────────────────────────────────────────────
    /// Credential rejection or a 401/403 from the API.
    /// Receiving one forces the session back to `Anonymous`.
    #[error("Authentication failed: {0}")]
    Auth(String),

    // ── API / Network ───────────────────────────────────────────────
    /// Any other non-success response, or a transport failure (`status: None`).
    #[error("{operation} request failed ({}): {message}", status_label(.status))]
    Request {
        operation: String,
        status: Option<u16>,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── View state ──────────────────────────────────────────────────
    /// A view-model load failed; the previously shown portfolio is untouched.
    #[error("Failed to load portfolio {id}: {reason}")]
    Load { id: i64, reason: String },

    // ── Token storage ───────────────────────────────────────────────
    #[error("Token storage error: {0}")]
    Storage(String),
}

fn status_label(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!("HTTP {code}"),
        None => "no response".to_string(),
    }
}

impl CoreError {
    /// Build a `Request` error for a non-success status code.
    pub fn request(operation: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        CoreError::Request {
            operation: operation.into(),
            status: Some(status),
            message: message.into(),
        }
    }

    /// `true` for errors that must drop the session to `Anonymous`.
    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(self, CoreError::Auth(_))
    }

    /// HTTP status carried by the error, when there was a response.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            CoreError::Request { status, .. } => *status,
            _ => None,
        }
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest errors carry the full URL; strip the query string so
        // credentials passed as parameters never end up in logs.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
