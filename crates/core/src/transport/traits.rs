use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::errors::CoreError;

/// HTTP verbs used by the portfolio API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
            Method::Delete => write!(f, "DELETE"),
        }
    }
}

/// Request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    /// `application/x-www-form-urlencoded` pairs (used by `/auth/login`)
    Form(Vec<(String, String)>),
}

/// One outbound API call, independent of the HTTP library.
///
/// `authorization` is the complete header value (`"Bearer …"`). It is filled
/// per call from the injected session, never from shared client defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path below the API root, starting with `/`
    pub path: String,
    pub query: Vec<(String, String)>,
    pub authorization: Option<String>,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            authorization: None,
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn form(mut self, pairs: Vec<(String, String)>) -> Self {
        self.body = RequestBody::Form(pairs);
        self
    }

    pub fn authorization(mut self, value: Option<String>) -> Self {
        self.authorization = value;
        self
    }
}

/// Raw response: status code and body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 401 and 403 both mean "this session may not do that".
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401 || self.status == 403
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, CoreError> {
        serde_json::from_str(&self.body).map_err(|e| {
            CoreError::Deserialization(format!(
                "{e} (body: {})",
                self.body.chars().take(200).collect::<String>()
            ))
        })
    }

    /// Best-effort human message from an error body (`{"detail": …}` or similar).
    pub fn error_message(&self) -> String {
        #[derive(serde::Deserialize)]
        struct ErrorBody {
            #[serde(default)]
            detail: Option<serde_json::Value>,
            #[serde(default)]
            message: Option<String>,
            #[serde(default)]
            error: Option<String>,
        }

        if let Ok(err) = serde_json::from_str::<ErrorBody>(&self.body) {
            let detail = err.detail.map(|d| match d {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            });
            if let Some(msg) = detail.or(err.message).or(err.error) {
                return msg;
            }
        }
        if self.body.trim().is_empty() {
            format!("HTTP {}", self.status)
        } else {
            self.body.chars().take(200).collect()
        }
    }
}

/// Abstraction over the HTTP stack.
///
/// The production implementation is [`super::reqwest_transport::ReqwestTransport`];
/// tests plug in an in-memory backend. Clients only ever talk to this trait.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait HttpTransport: Send + Sync {
    /// Human-readable name of this transport (for logs/errors).
    fn name(&self) -> &str;

    /// Perform one request. Only transport failures are errors here;
    /// non-2xx statuses come back as a normal [`ApiResponse`].
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, CoreError>;
}
