// ═══════════════════════════════════════════════════════════════════
// Shared Test Helpers — in-memory portfolio API
// ═══════════════════════════════════════════════════════════════════
#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use portfolio_sync_core::errors::CoreError;
use portfolio_sync_core::models::settings::Settings;
use portfolio_sync_core::models::user::Credentials;
use portfolio_sync_core::session::token_store::{MemoryTokenStore, TokenStore};
use portfolio_sync_core::transport::traits::{
    ApiRequest, ApiResponse, HttpTransport, Method, RequestBody,
};
use portfolio_sync_core::PortfolioDashboard;

pub const EMAIL: &str = "ada@example.com";
pub const PASSWORD: &str = "correct horse";

#[derive(Default)]
struct State {
    /// email → (password, user json)
    users: HashMap<String, (String, Value)>,
    /// token → email
    tokens: HashMap<String, String>,
    portfolios: BTreeMap<i64, Value>,
    next_id: i64,
    requests: Vec<ApiRequest>,
    /// "METHOD path" → one-shot (status, body)
    failures: HashMap<String, (u16, String)>,
    /// Portfolio id → artificial latency for `GET /portfolios/{id}`
    delays: HashMap<i64, Duration>,
    offline: bool,
    /// Refuse to send any `Authorization` header, as a client does when the
    /// token is not a valid header value.
    reject_authorization: bool,
}

/// Behaves like the real backend for every endpoint the client binds,
/// and records each request it receives.
#[derive(Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<State>>,
}

impl MockBackend {
    pub fn new() -> Self {
        let backend = Self::default();
        backend.add_user(EMAIL, PASSWORD);
        backend
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn add_user(&self, email: &str, password: &str) -> Value {
        let mut state = self.state();
        let id = state.users.len() as i64 + 1;
        let user = json!({"id": id, "email": email, "full_name": null, "is_active": true});
        state
            .users
            .insert(email.to_string(), (password.to_string(), user.clone()));
        user
    }

    /// Seed a token as if issued earlier.
    pub fn issue_token(&self, email: &str) -> String {
        let token = format!("token-{email}");
        self.state().tokens.insert(token.clone(), email.to_string());
        token
    }

    /// Server-side expiry of every issued token.
    pub fn revoke_tokens(&self) {
        self.state().tokens.clear();
    }

    /// Insert a portfolio body verbatim; an id is assigned if missing.
    pub fn seed(&self, mut portfolio: Value) -> i64 {
        let mut state = self.state();
        let id = match portfolio["id"].as_i64() {
            Some(id) => id,
            None => {
                state.next_id += 1;
                state.next_id
            }
        };
        state.next_id = state.next_id.max(id);
        portfolio["id"] = json!(id);
        state.portfolios.insert(id, portfolio);
        id
    }

    /// Seed a fraction-dialect portfolio with the given allocations.
    pub fn seed_simple(&self, name: &str, allocations: Value) -> i64 {
        self.seed(json!({
            "name": name,
            "description": format!("{name} description"),
            "risk_profile": "moderate",
            "investment_amount": 10000.0,
            "created_at": "2024-05-01T09:30:00",
            "updated_at": null,
            "allocations": allocations,
        }))
    }

    pub fn fail_next(&self, method: Method, path: &str, status: u16, body: &str) {
        self.state()
            .failures
            .insert(format!("{method} {path}"), (status, body.to_string()));
    }

    pub fn delay(&self, id: i64, delay: Duration) {
        self.state().delays.insert(id, delay);
    }

    pub fn set_offline(&self, offline: bool) {
        self.state().offline = offline;
    }

    pub fn reject_authorization(&self, reject: bool) {
        self.state().reject_authorization = reject;
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.state().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state().requests.len()
    }

    /// Requests after the first `skip`, as "METHOD path".
    pub fn calls_since(&self, skip: usize) -> Vec<String> {
        self.state()
            .requests
            .iter()
            .skip(skip)
            .map(|r| format!("{} {}", r.method, r.path))
            .collect()
    }

    pub fn portfolio(&self, id: i64) -> Option<Value> {
        self.state().portfolios.get(&id).cloned()
    }

    pub fn portfolio_count(&self) -> usize {
        self.state().portfolios.len()
    }

    fn handle(&self, request: &ApiRequest) -> ApiResponse {
        let mut state = self.state();
        state.requests.push(request.clone());

        if let Some((status, body)) = state
            .failures
            .remove(&format!("{} {}", request.method, request.path))
        {
            return ApiResponse::new(status, body);
        }

        let segments: Vec<&str> = request.path.trim_matches('/').split('/').collect();
        match (request.method, segments.as_slice()) {
            (Method::Post, ["auth", "login"]) => login(&mut state, request),
            (Method::Post, ["auth", "register"]) => register(&mut state, request),
            _ => {
                let Some(email) = authenticated(&state, request) else {
                    return ApiResponse::new(401, r#"{"detail":"Could not validate credentials"}"#);
                };
                route(&mut state, request, &email, &segments)
            }
        }
    }
}

#[async_trait]
impl HttpTransport for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, CoreError> {
        let (offline, reject_authorization, delay) = {
            let state = self.state();
            let delay = match (request.method, request.path.strip_prefix("/portfolios/")) {
                (Method::Get, Some(id)) => id
                    .parse::<i64>()
                    .ok()
                    .and_then(|id| state.delays.get(&id).copied()),
                _ => None,
            };
            (state.offline, state.reject_authorization, delay)
        };
        if reject_authorization && request.authorization.is_some() {
            self.state().requests.push(request);
            return Err(CoreError::Auth("Invalid access token format".into()));
        }
        if offline {
            self.state().requests.push(request);
            return Err(CoreError::Network("connection refused".into()));
        }
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.handle(&request))
    }
}

fn authenticated(state: &State, request: &ApiRequest) -> Option<String> {
    let token = request.authorization.as_deref()?.strip_prefix("Bearer ")?;
    state.tokens.get(token).cloned()
}

fn form_value(request: &ApiRequest, key: &str) -> Option<String> {
    match &request.body {
        RequestBody::Form(pairs) => pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone()),
        _ => None,
    }
}

fn json_body(request: &ApiRequest) -> Value {
    match &request.body {
        RequestBody::Json(value) => value.clone(),
        _ => Value::Null,
    }
}

fn ok(body: Value) -> ApiResponse {
    ApiResponse::new(200, body.to_string())
}

fn not_found() -> ApiResponse {
    ApiResponse::new(404, r#"{"detail":"Portfolio not found"}"#)
}

fn login(state: &mut State, request: &ApiRequest) -> ApiResponse {
    let username = form_value(request, "username").unwrap_or_default();
    let password = form_value(request, "password").unwrap_or_default();
    match state.users.get(&username) {
        Some((expected, _)) if *expected == password => {
            let token = format!("token-{username}");
            state.tokens.insert(token.clone(), username);
            ok(json!({"access_token": token, "token_type": "bearer"}))
        }
        _ => ApiResponse::new(401, r#"{"detail":"Incorrect username or password"}"#),
    }
}

fn register(state: &mut State, request: &ApiRequest) -> ApiResponse {
    let body = json_body(request);
    let email = body["email"].as_str().unwrap_or_default().to_string();
    if state.users.contains_key(&email) {
        return ApiResponse::new(400, r#"{"detail":"Email already registered"}"#);
    }
    let id = state.users.len() as i64 + 1;
    let user = json!({
        "id": id,
        "email": email,
        "full_name": body.get("full_name").cloned().unwrap_or(Value::Null),
        "is_active": true,
    });
    let password = body["password"].as_str().unwrap_or_default().to_string();
    state.users.insert(email, (password, user.clone()));
    ok(user)
}

fn route(state: &mut State, request: &ApiRequest, email: &str, segments: &[&str]) -> ApiResponse {
    match (request.method, segments) {
        (Method::Get, ["users", "me"]) => ok(state.users[email].1.clone()),

        (Method::Get, ["portfolios"]) => {
            let summaries: Vec<Value> = state
                .portfolios
                .values()
                .map(|p| {
                    let mut summary = p.clone();
                    summary["allocations"] = json!([]);
                    summary
                })
                .collect();
            ok(json!(summaries))
        }

        (Method::Post, ["portfolios", "generate"]) => {
            let body = json_body(request);
            state.next_id += 1;
            let id = state.next_id;
            let portfolio = generated(id, &body);
            state.portfolios.insert(id, portfolio.clone());
            ok(portfolio)
        }

        (Method::Get, ["portfolios", id]) => match lookup(state, id) {
            Some(p) => ok(p.clone()),
            None => not_found(),
        },

        (Method::Put, ["portfolios", id]) => {
            let body = json_body(request);
            let Some(p) = id.parse::<i64>().ok().and_then(|id| state.portfolios.get_mut(&id)) else {
                return not_found();
            };
            p["name"] = body["name"].clone();
            p["description"] = body["description"].clone();
            p["updated_at"] = json!("2024-06-02T12:00:00Z");
            ok(p.clone())
        }

        (Method::Delete, ["portfolios", id]) => {
            match id.parse::<i64>().ok().and_then(|id| state.portfolios.remove(&id)) {
                Some(_) => ApiResponse::new(204, ""),
                None => not_found(),
            }
        }

        (Method::Get, ["analysis", id, "risk"]) => match lookup(state, id) {
            Some(_) => ok(json!({"portfolio_id": id.parse::<i64>().unwrap(), "metrics": metrics(id)})),
            None => not_found(),
        },

        (Method::Post, ["analysis", "compare"]) => {
            let ids: Vec<i64> = serde_json::from_value(json_body(request)).unwrap_or_default();
            let mut out = serde_json::Map::new();
            for id in ids.iter().rev() {
                if let Some(p) = state.portfolios.get(id) {
                    out.insert(
                        id.to_string(),
                        json!({
                            "name": p["name"],
                            "risk_profile": p.get("risk_profile").cloned().unwrap_or(Value::Null),
                            "risk_level": p.get("risk_level").cloned().unwrap_or(Value::Null),
                            "metrics": metrics(&id.to_string()),
                        }),
                    );
                }
            }
            ok(Value::Object(out))
        }

        _ => ApiResponse::new(404, r#"{"detail":"Not Found"}"#),
    }
}

fn lookup<'a>(state: &'a State, id: &str) -> Option<&'a Value> {
    id.parse::<i64>().ok().and_then(|id| state.portfolios.get(&id))
}

fn metrics(id: &str) -> Value {
    let n = id.parse::<f64>().unwrap_or(1.0);
    json!({
        "volatility": 0.05 * n,
        "expected_annual_return": 0.04 + 0.01 * n,
        "sharpe_ratio": 0.5 * n,
        "max_drawdown": 0.1,
        "var_95": 0.02,
    })
}

/// A level request is answered in the whole-number dialect, a profile request
/// in the fraction dialect.
fn generated(id: i64, body: &Value) -> Value {
    let name = body["name"]
        .as_str()
        .map(String::from)
        .unwrap_or_else(|| format!("Generated {id}"));
    if let Some(level) = body["risk_level"].as_i64() {
        let stock = (level * 10) as f64;
        json!({
            "id": id,
            "name": name,
            "risk_level": level,
            "initial_investment": body["initial_investment"],
            "created_at": "2024-06-01T08:00:00.000000",
            "allocations": [
                {"asset_type": "stock", "asset_name": "Global Equity", "percentage": stock},
                {"asset_type": "bond", "asset_name": "Aggregate Bond", "percentage": 100.0 - stock},
            ],
        })
    } else {
        json!({
            "id": id,
            "name": name,
            "description": "",
            "risk_profile": body["risk_profile"],
            "investment_amount": body["investment_amount"],
            "created_at": "2024-06-01T08:00:00Z",
            "updated_at": null,
            "allocations": [
                {"asset_class": "stock", "asset_name": "US Total Market", "ticker": "VTI", "allocation_percentage": 0.5},
                {"asset_class": "bond", "asset_name": "US Treasuries", "ticker": "GOVT", "allocation_percentage": 0.3},
                {"asset_class": "stock", "asset_name": "International", "ticker": "VXUS", "allocation_percentage": 0.2},
            ],
        })
    }
}

// ── Fixtures ────────────────────────────────────────────────────────

pub fn three_assets() -> Value {
    json!([
        {"asset_class": "stock", "asset_name": "US Total Market", "ticker": "VTI", "allocation_percentage": 0.5},
        {"asset_class": "bond", "asset_name": "US Treasuries", "ticker": "GOVT", "allocation_percentage": 0.3},
        {"asset_class": "stock", "asset_name": "International", "ticker": "VXUS", "allocation_percentage": 0.2},
    ])
}

pub fn dashboard(backend: &MockBackend) -> PortfolioDashboard {
    dashboard_with(backend, Arc::new(MemoryTokenStore::new()))
}

pub fn dashboard_with(backend: &MockBackend, tokens: Arc<dyn TokenStore>) -> PortfolioDashboard {
    PortfolioDashboard::new(Settings::default(), Arc::new(backend.clone()), tokens)
}

pub async fn signed_in(backend: &MockBackend) -> PortfolioDashboard {
    let dashboard = dashboard(backend);
    dashboard
        .login(&Credentials::new(EMAIL, PASSWORD), None)
        .await
        .unwrap();
    dashboard
}
