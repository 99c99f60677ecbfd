//! JSON API endpoints.
//!
//! Success bodies carry `"success": true` (except health); failures go through
//! [`ApiError`] and render as `{"success": false, "error": "..."}`.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::handlers::AppState;
use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};

pub const SERVICE_NAME: &str = "http-server";
pub const SERVICE_VERSION: &str = "1.0.0";

const DEMO_USERNAME: &str = "admin";
const DEMO_PASSWORD: &str = "password";
const DEMO_TOKEN: &str = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9";
const TOKEN_TTL_SECS: u64 = 3600;

/// Handler-level failures.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("Invalid JSON body")]
    InvalidJson,
    #[error("{0}")]
    Missing(&'static str),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Invalid operation. Use: add, subtract, multiply, divide")]
    InvalidOperation,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<ApiError> for Response {
    fn from(err: ApiError) -> Self {
        tracing::debug!(error = %err, status = err.status().as_u16(), "API error");
        Response::json(
            err.status(),
            &json!({
                "success": false,
                "error": err.to_string(),
            }),
        )
    }
}

fn respond(result: Result<Response, ApiError>) -> Response {
    result.unwrap_or_else(Response::from)
}

/// Decodes the request body. A missing body reads as `{}` so absent fields
/// surface as missing rather than as broken JSON.
fn parse_body<T: DeserializeOwned>(request: &Request) -> Result<T, ApiError> {
    let body = match request.body_bytes() {
        [] => b"{}".as_slice(),
        bytes => bytes,
    };
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "Rejecting request body");
        ApiError::InvalidJson
    })
}

/// GET /api/health
pub fn health(state: &AppState, _request: &Request) -> Response {
    let now = unix_now();
    Response::json(
        StatusCode::OK,
        &json!({
            "status": "healthy",
            "service": SERVICE_NAME,
            "version": SERVICE_VERSION,
            "timestamp": UtcDateTime::from_unix(now).to_string(),
            "uptime_seconds": state.started.elapsed().as_secs(),
        }),
    )
}

/// GET /api/users
pub fn list_users(_request: &Request) -> Response {
    let users = json!([
        { "id": 1, "name": "Alice Johnson", "email": "alice@example.com", "role": "admin" },
        { "id": 2, "name": "Bob Smith", "email": "bob@example.com", "role": "user" },
        { "id": 3, "name": "Carol White", "email": "carol@example.com", "role": "user" },
    ]);
    let count = users.as_array().map_or(0, Vec::len);

    Response::json(
        StatusCode::OK,
        &json!({
            "success": true,
            "data": users,
            "count": count,
        }),
    )
}

#[derive(Deserialize)]
struct NewUser {
    name: Option<String>,
    email: Option<String>,
    role: Option<String>,
}

/// POST /api/users
pub fn create_user(request: &Request) -> Response {
    respond(try_create_user(request))
}

fn try_create_user(request: &Request) -> Result<Response, ApiError> {
    let input: NewUser = parse_body(request)?;
    let (Some(name), Some(email)) = (input.name, input.email) else {
        return Err(ApiError::Missing("Missing required fields: name and email"));
    };
    let role = input.role.unwrap_or_else(|| "user".to_string());
    let id = fastrand::u32(100..1100);

    tracing::info!(id, name = %name, "Created user");
    Ok(Response::json(
        StatusCode::CREATED,
        &json!({
            "success": true,
            "message": "User created successfully",
            "data": {
                "id": id,
                "name": name,
                "email": email,
                "role": role,
            },
        }),
    ))
}

/// GET /api/stats
pub fn stats(_request: &Request) -> Response {
    Response::json(
        StatusCode::OK,
        &json!({
            "success": true,
            "data": {
                "requests_total": 1523,
                "requests_per_second": 12.5,
                "active_connections": 3,
                "total_bytes_sent": 15_728_640,
                "total_bytes_received": 3_145_728,
                "uptime_hours": 48.5,
                "memory_usage_mb": 23.4,
            },
        }),
    )
}

#[derive(Deserialize)]
struct Credentials {
    username: Option<String>,
    password: Option<String>,
}

/// POST /api/login
pub fn login(request: &Request) -> Response {
    respond(try_login(request))
}

fn try_login(request: &Request) -> Result<Response, ApiError> {
    let input: Credentials = parse_body(request)?;
    let (Some(username), Some(password)) = (input.username, input.password) else {
        return Err(ApiError::Missing("Missing username or password"));
    };

    if username != DEMO_USERNAME || password != DEMO_PASSWORD {
        tracing::warn!(username = %username, "Rejected login");
        return Err(ApiError::InvalidCredentials);
    }

    Ok(Response::json(
        StatusCode::OK,
        &json!({
            "success": true,
            "message": "Login successful",
            "data": {
                "user": username,
                "token": DEMO_TOKEN,
                "expires_in": TOKEN_TTL_SECS,
            },
        }),
    ))
}

/// Operands accept any JSON number; fractions are truncated toward zero.
#[derive(Deserialize)]
struct Calculation {
    #[serde(default)]
    a: f64,
    #[serde(default)]
    b: f64,
    operation: Option<String>,
}

/// POST /api/calculate
pub fn calculate(request: &Request) -> Response {
    respond(try_calculate(request))
}

fn try_calculate(request: &Request) -> Result<Response, ApiError> {
    let input: Calculation = parse_body(request)?;
    let operation = input
        .operation
        .ok_or(ApiError::Missing("Missing operation field"))?;

    let (a, b) = (input.a as i64, input.b as i64);
    let result = match operation.as_str() {
        "add" => a as f64 + b as f64,
        "subtract" => a as f64 - b as f64,
        "multiply" => a as f64 * b as f64,
        "divide" if b == 0 => return Err(ApiError::DivisionByZero),
        "divide" => a as f64 / b as f64,
        _ => return Err(ApiError::InvalidOperation),
    };

    Ok(Response::json(
        StatusCode::OK,
        &json!({
            "success": true,
            "data": {
                "a": a,
                "b": b,
                "operation": operation,
                "result": round2(result),
            },
        }),
    ))
}

/// GET /api/time
pub fn time(_request: &Request) -> Response {
    let now = unix_now();
    let dt = UtcDateTime::from_unix(now);

    Response::json(
        StatusCode::OK,
        &json!({
            "success": true,
            "data": {
                "timestamp": now,
                "iso": dt.iso8601(),
                "date": dt.date(),
                "time": dt.time(),
                "timezone": "UTC",
            },
        }),
    )
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Broken-down UTC time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtcDateTime {
    pub year: i64,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl UtcDateTime {
    /// Converts seconds since the Unix epoch using the days-to-civil algorithm
    /// (proleptic Gregorian calendar).
    pub fn from_unix(secs: u64) -> Self {
        let days = (secs / 86_400) as i64;
        let rem = secs % 86_400;

        let z = days + 719_468;
        let era = z.div_euclid(146_097);
        let doe = z.rem_euclid(146_097);
        let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
        let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
        let mp = (5 * doy + 2) / 153;
        let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
        let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
        let year = yoe + era * 400 + i64::from(month <= 2);

        Self {
            year,
            month,
            day,
            hour: (rem / 3600) as u32,
            minute: (rem % 3600 / 60) as u32,
            second: (rem % 60) as u32,
        }
    }

    pub fn date(&self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }

    pub fn time(&self) -> String {
        format!("{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }

    pub fn iso8601(&self) -> String {
        format!("{}T{}", self.date(), self.time())
    }
}

impl std::fmt::Display for UtcDateTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.date(), self.time())
    }
}
