//! Request authentication and request logging middleware

use std::time::Instant;

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{info, warn};

use crate::error::AppError;
use crate::state::SharedState;

const KEY_PARAM: &str = "key";

/// Shared-secret authentication settings
#[derive(Debug, Clone, Default)]
pub struct AuthSettings {
    /// No authentication is enforced when unset
    key: Option<String>,
    allow_query_param: bool,
}

impl AuthSettings {
    pub fn new(key: Option<String>, allow_query_param: bool) -> Self {
        Self {
            key,
            allow_query_param,
        }
    }

    /// Whether a request with this query string and these headers may proceed
    ///
    /// The secret may arrive as the password of HTTP basic credentials (any
    /// user name) or, when enabled, as the `key` query parameter.
    pub fn is_authorized(&self, query: Option<&str>, headers: &HeaderMap) -> bool {
        let Some(expected) = self.key.as_deref() else {
            return true;
        };

        if self.allow_query_param
            && query
                .and_then(query_key)
                .is_some_and(|key| secrets_match(&key, expected))
        {
            return true;
        }

        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(basic_password)
            .is_some_and(|password| secrets_match(&password, expected))
    }
}

/// Equality whose running time depends only on the lengths
fn secrets_match(given: &str, expected: &str) -> bool {
    let (given, expected) = (given.as_bytes(), expected.as_bytes());
    if given.len() != expected.len() {
        return false;
    }
    given
        .iter()
        .zip(expected)
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}

fn query_key(query: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(name, _)| name == KEY_PARAM)
        .map(|(_, value)| value.into_owned())
}

/// Password from an `Authorization: Basic ...` header value
fn basic_password(value: &str) -> Option<String> {
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let credentials = String::from_utf8(decoded).ok()?;
    let (_, password) = credentials.split_once(':')?;
    Some(password.to_string())
}

/// Reject requests that do not carry the configured secret
pub async fn require_auth(
    State(state): State<SharedState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !state.auth.is_authorized(request.uri().query(), request.headers()) {
        warn!(path = %request.uri().path(), "Rejected unauthenticated request");
        return Err(AppError::Unauthorized);
    }
    Ok(next.run(request).await)
}

/// Log method, path and status of every request, with the secret redacted
pub async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = redact_key_param(&request.uri().to_string());
    let started = Instant::now();

    let response = next.run(request).await;

    info!(
        method = %method,
        uri = %uri,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Handled request"
    );
    response
}

/// Replace the value of any `key` query parameter with `redacted`
pub fn redact_key_param(uri: &str) -> String {
    let Some((path, query)) = uri.split_once('?') else {
        return uri.to_string();
    };

    let query = query
        .split('&')
        .map(|pair| {
            let name = pair.split_once('=').map_or(pair, |(name, _)| name);
            if name == KEY_PARAM {
                format!("{}=redacted", KEY_PARAM)
            } else {
                pair.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{}", path, query)
}
