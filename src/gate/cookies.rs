//! Cookie handling between the inbound request and the upstream.
//!
//! # Responsibilities
//! - Parse upstream `Set-Cookie` values into `ParsedCookie`
//! - Render a `ParsedCookie` back into a `Set-Cookie` value for the caller
//! - Build the outbound `Cookie` header from inbound cookies
//!
//! Attribute names are case-insensitive; the first `; `-separated token is
//! always `name=value`.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

/// A `Set-Cookie` directive received from the upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCookie {
    pub name: String,
    pub value: String,
    pub expires: Option<DateTime<Utc>>,
    pub path: Option<String>,
    pub domain: Option<String>,
    pub secure: bool,
    pub http_only: bool,
}

impl ParsedCookie {
    /// Parse a raw `Set-Cookie` header value.
    ///
    /// Returns `None` when the first token carries no cookie name.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut cookie = ParsedCookie {
            name: String::new(),
            value: String::new(),
            expires: None,
            path: None,
            domain: None,
            secure: false,
            http_only: false,
        };

        for (i, part) in raw.split("; ").enumerate() {
            let part = part.trim();
            match part.split_once('=') {
                Some((name, value)) if !name.is_empty() => {
                    if i == 0 {
                        cookie.name = name.to_string();
                        cookie.value = value.to_string();
                        continue;
                    }
                    match name.to_ascii_lowercase().as_str() {
                        "expires" => cookie.expires = parse_cookie_date(value),
                        "path" => cookie.path = Some(value.to_string()),
                        "domain" => cookie.domain = Some(value.to_string()),
                        _ => {}
                    }
                }
                _ => match part.to_ascii_lowercase().as_str() {
                    "secure" => cookie.secure = true,
                    "httponly" => cookie.http_only = true,
                    _ => {}
                },
            }
        }

        if cookie.name.is_empty() {
            return None;
        }
        Some(cookie)
    }

    /// A directive that makes the client drop cookie `name`.
    pub fn expired(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: String::new(),
            expires: Utc.timestamp_opt(1, 0).single(),
            path: Some("/".to_string()),
            domain: None,
            secure: false,
            http_only: false,
        }
    }
}

impl fmt::Display for ParsedCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)?;
        if let Some(expires) = &self.expires {
            write!(f, "; Expires={}", expires.format("%a, %d %b %Y %H:%M:%S GMT"))?;
        }
        if let Some(path) = &self.path {
            write!(f, "; Path={}", path)?;
        }
        if let Some(domain) = &self.domain {
            write!(f, "; Domain={}", domain)?;
        }
        if self.secure {
            write!(f, "; Secure")?;
        }
        if self.http_only {
            write!(f, "; HttpOnly")?;
        }
        Ok(())
    }
}

/// Parse an `Expires` attribute. Unknown formats yield `None` (session cookie).
fn parse_cookie_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(date) = DateTime::parse_from_rfc2822(value) {
        return Some(date.with_timezone(&Utc));
    }
    // Netscape format: Wed, 21-Oct-2026 07:28:00 GMT
    NaiveDateTime::parse_from_str(value, "%a, %d-%b-%Y %H:%M:%S GMT")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Join inbound cookies into a single `Cookie` header value.
///
/// Returns `None` when there is nothing to forward.
pub fn build_cookie_header(cookies: &[(String, String)]) -> Option<String> {
    if cookies.is_empty() {
        return None;
    }
    let joined = cookies
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("; ");
    Some(joined)
}

/// Split an inbound `Cookie` header into ordered name/value pairs.
pub fn parse_cookie_header(header: &str) -> Vec<(String, String)> {
    header
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}
