//! Response sink the gate writes through.
//!
//! The gate never talks to the client connection directly. Status mirroring,
//! relayed cookies, raw passthrough and redirects all go through a
//! `ResponseSink` supplied by the caller.

use crate::gate::cookies::ParsedCookie;

/// Outbound side of the request the gate is serving.
pub trait ResponseSink: Send {
    /// Set the response status. `line` is the status text reported upstream.
    fn set_status(&mut self, code: u16, line: &str);

    /// Set (replace) a response header.
    fn set_header(&mut self, name: &str, value: &str);

    /// Append a `Set-Cookie` directive.
    fn set_cookie(&mut self, cookie: &ParsedCookie);

    /// Drop any body bytes written so far.
    fn clear_body(&mut self);

    /// Append body bytes.
    fn write_body(&mut self, bytes: &[u8]);

    /// Redirect the client. Nothing else may be written afterwards.
    fn redirect(&mut self, location: &str);
}

/// In-memory sink that records everything written to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingSink {
    pub status: Option<(u16, String)>,
    pub headers: Vec<(String, String)>,
    pub cookies: Vec<ParsedCookie>,
    pub body: Vec<u8>,
    pub redirect: Option<String>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl ResponseSink for RecordingSink {
    fn set_status(&mut self, code: u16, line: &str) {
        self.status = Some((code, line.to_string()));
    }

    fn set_header(&mut self, name: &str, value: &str) {
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.to_string()));
    }

    fn set_cookie(&mut self, cookie: &ParsedCookie) {
        self.cookies.push(cookie.clone());
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
