//! Response assembly for the client.
//!
//! # Responsibilities
//! - Collect what the gate writes through `ResponseSink`
//! - Turn it into an axum `Response` (status, headers, relayed cookies, body)
//! - Map gate errors to gateway status codes
//!
//! # Design Decisions
//! - Upstream status text cannot be carried by the HTTP stack; only the code
//!   is mirrored, the text is logged
//! - Relayed cookies survive a redirect

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::gate::{GateError, ParsedCookie, ResponseSink};

/// `ResponseSink` that builds an axum response.
#[derive(Debug)]
pub struct AxumResponseSink {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
    redirect: Option<String>,
}

impl AxumResponseSink {
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Vec::new(),
            redirect: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl Default for AxumResponseSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseSink for AxumResponseSink {
    fn set_status(&mut self, code: u16, line: &str) {
        match StatusCode::from_u16(code) {
            Ok(status) => self.status = status,
            Err(_) => {
                tracing::warn!(code, status_line = %line, "Upstream reported an invalid status");
                self.status = StatusCode::BAD_GATEWAY;
            }
        }
    }

    fn set_header(&mut self, name: &str, value: &str) {
        match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => tracing::warn!(header = %name, "Dropping header that cannot be sent"),
        }
    }

    fn set_cookie(&mut self, cookie: &ParsedCookie) {
        match HeaderValue::from_str(&cookie.to_string()) {
            Ok(value) => {
                self.headers.append(header::SET_COOKIE, value);
            }
            Err(_) => tracing::warn!(cookie = %cookie.name, "Dropping cookie that cannot be sent"),
        }
    }

    fn clear_body(&mut self) {
        self.body.clear();
    }

    fn write_body(&mut self, bytes: &[u8]) {
        self.body.extend_from_slice(bytes);
    }

    fn redirect(&mut self, location: &str) {
        self.redirect = Some(location.to_string());
    }
}

impl IntoResponse for AxumResponseSink {
    fn into_response(self) -> Response {
        let mut headers = self.headers;
        let (status, body) = match self.redirect {
            Some(location) => match HeaderValue::from_str(&location) {
                Ok(value) => {
                    headers.insert(header::LOCATION, value);
                    (StatusCode::FOUND, Vec::new())
                }
                Err(_) => {
                    tracing::error!(location = %location, "Redirect target cannot be sent");
                    return (StatusCode::BAD_GATEWAY, "Invalid upstream redirect").into_response();
                }
            },
            None => (self.status, self.body),
        };

        let mut response = Response::new(Body::from(body));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}

/// Map a gate failure to the response the client sees.
pub fn error_response(error: &GateError) -> Response {
    let status = match error {
        GateError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        GateError::Transport(_) | GateError::MissingRedirectLocation | GateError::WidgetPayload(_) => {
            StatusCode::BAD_GATEWAY
        }
        GateError::InvalidUpstreamUrl { .. } => StatusCode::BAD_REQUEST,
        GateError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, status.canonical_reason().unwrap_or("Gate error")).into_response()
}
