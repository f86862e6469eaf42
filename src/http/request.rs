//! Request handling and transformation.
//!
//! # Responsibilities
//! - Build the gate's `InboundRequest` from an axum request
//! - Recover host, scheme and cookies from headers
//! - Decode urlencoded POST bodies within the configured size limit
//!
//! # Design Decisions
//! - `X-Forwarded-Proto` beats the URI scheme, which beats the configured default
//! - Non-urlencoded POST bodies are not forwarded as fields

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request},
};
use thiserror::Error;
use url::form_urlencoded;

use crate::gate::cookies::parse_cookie_header;
use crate::gate::InboundRequest;

/// Request ID header set by the middleware stack.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Header carrying the scheme seen by a fronting proxy.
pub const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Failures while reading the inbound request.
#[derive(Debug, Error)]
pub enum InboundError {
    #[error("request body exceeds {0} bytes or could not be read")]
    Body(usize),
}

/// Convert an axum request into the gate's view of it.
pub async fn extract_inbound(
    request: Request<Body>,
    default_scheme: Option<&str>,
    max_body_bytes: usize,
) -> Result<InboundRequest, InboundError> {
    let (parts, body) = request.into_parts();

    let uri = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());
    let host = parts
        .headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .or_else(|| parts.uri.authority().map(|a| a.to_string()))
        .unwrap_or_default();

    let mut inbound = InboundRequest::new(parts.method.clone(), uri, host);
    inbound.scheme = forwarded_scheme(&parts.headers)
        .or_else(|| parts.uri.scheme_str().map(str::to_string))
        .or_else(|| default_scheme.map(str::to_string));
    inbound.cookies = inbound_cookies(&parts.headers);

    if parts.method == Method::POST && is_form_encoded(&parts.headers) {
        let bytes = axum::body::to_bytes(body, max_body_bytes)
            .await
            .map_err(|_| InboundError::Body(max_body_bytes))?;
        inbound.form = form_urlencoded::parse(&bytes).into_owned().collect();
    }

    Ok(inbound)
}

fn forwarded_scheme(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(X_FORWARDED_PROTO)?.to_str().ok()?;
    let first = value.split(',').next()?.trim();
    if first.is_empty() {
        return None;
    }
    Some(first.to_ascii_lowercase())
}

fn inbound_cookies(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(parse_cookie_header)
        .collect()
}

fn is_form_encoded(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.trim().starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}

/// Whether the client asked for JSON.
pub fn accepts_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|accept| accept.contains("application/json"))
        .unwrap_or(false)
}
