//! Helpers shared by the protocol bridges.

use crate::agent::domain::Protocol;
use crate::gateway::domain::{GatewayError, HttpMethod, InvocationResult};
use crate::gateway::ports::{HttpTransport, TransportError, TransportRequest};
use base64::Engine as _;
use reqwest::header::{HeaderName, HeaderValue};
use base64::engine::general_purpose::STANDARD;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::time::Instant;

/// Joins an endpoint and a path with exactly one `/`.
///
/// Absolute `http(s)://` paths replace the endpoint; a missing or blank path
/// leaves it unchanged.
pub(crate) fn resolve_target(endpoint: &str, path: Option<&str>) -> String {
    let Some(raw) = path.map(str::trim).filter(|candidate| !candidate.is_empty()) else {
        return endpoint.to_owned();
    };
    if raw.starts_with("http://") || raw.starts_with("https://") {
        return raw.to_owned();
    }
    format!(
        "{}/{}",
        endpoint.trim_end_matches('/'),
        raw.trim_start_matches('/')
    )
}

/// Parses a response body as JSON, falling back to the raw text.
pub(crate) fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_owned()))
}

/// Parses binary frames as UTF-8 text when possible, else base64-encodes them.
pub(crate) fn parse_bytes(bytes: Vec<u8>) -> Value {
    match String::from_utf8(bytes) {
        Ok(text) => parse_body(&text),
        Err(err) => json!({ "body_base64": STANDARD.encode(err.into_bytes()) }),
    }
}

/// Substitutes an empty object for a null payload.
pub(crate) fn payload_or_empty(payload: &Value) -> Value {
    if payload.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        payload.clone()
    }
}

/// Adds a header unless one with the same name, in any case, is present.
pub(crate) fn insert_header_if_absent(
    headers: &mut BTreeMap<String, String>,
    name: &str,
    value: &str,
) {
    if !headers.keys().any(|existing| existing.eq_ignore_ascii_case(name)) {
        headers.insert(name.to_owned(), value.to_owned());
    }
}

/// Checks that every caller-supplied header can go on the wire.
pub(crate) fn validate_headers(headers: &BTreeMap<String, String>) -> Result<(), GatewayError> {
    for (name, value) in headers {
        HeaderName::from_bytes(name.as_bytes())
            .map_err(|err| GatewayError::InvalidRequest(format!("header name `{name}`: {err}")))?;
        HeaderValue::from_str(value)
            .map_err(|err| GatewayError::InvalidRequest(format!("header `{name}` value: {err}")))?;
    }
    Ok(())
}

pub(crate) fn require_post(protocol: Protocol, method: HttpMethod) -> Result<(), GatewayError> {
    if method == HttpMethod::Post {
        Ok(())
    } else {
        Err(GatewayError::InvalidRequest(format!(
            "{protocol} invocations only support POST, got {method}"
        )))
    }
}

pub(crate) fn map_transport(err: TransportError, target: &str, timeout: Duration) -> GatewayError {
    match err {
        TransportError::Timeout => GatewayError::Timeout {
            target: target.to_owned(),
            timeout,
        },
        TransportError::Connect(reason) | TransportError::Io(reason) => {
            GatewayError::unreachable(target, reason)
        }
        TransportError::InvalidRequest(reason) => GatewayError::InvalidRequest(reason),
        TransportError::Rejected { status, body } => GatewayError::RemoteError {
            target: target.to_owned(),
            status,
            body,
        },
    }
}

/// Sends one HTTP request and normalizes the answer.
///
/// Statuses outside `2xx` become [`GatewayError::RemoteError`] carrying the
/// body verbatim.
pub(crate) async fn exchange_http(
    transport: &dyn HttpTransport,
    protocol: Protocol,
    request: TransportRequest,
) -> Result<InvocationResult, GatewayError> {
    let target = request.url.clone();
    let timeout = request.timeout;
    let started = Instant::now();
    let response = transport
        .send(request)
        .await
        .map_err(|err| map_transport(err, &target, timeout))?;
    let latency = started.elapsed();

    if !(200..300).contains(&response.status) {
        return Err(GatewayError::RemoteError {
            target,
            status: response.status,
            body: response.body,
        });
    }
    Ok(InvocationResult {
        protocol,
        target,
        status: response.status,
        ok: true,
        latency,
        response: parse_body(&response.body),
        response_headers: response.headers,
    })
}
