//! Inbound request view and upstream target resolution.
//!
//! # Responsibilities
//! - Carry the parts of the inbound request the gate consumes
//! - Split the request URI on the gate prefix segment
//! - Resolve the upstream URL and the public gate URL
//!
//! The gate never reads ambient process state; callers hand in an
//! `InboundRequest` built from whatever framework accepted the request.
//!
//! # Design Decisions
//! - Without a gate-prefixed suffix (query and widget mode) the gate URL is
//!   built from the request path alone. The query string is forwarded to the
//!   upstream but never becomes part of the gate URL, so `/site/?a=1` yields
//!   `//host/site/RWD/` rather than `//host/site/?a=1/RWD/`.

use axum::http::Method;
use url::form_urlencoded;

/// Read-only view of the request the gate is serving.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    /// Full request URI: path plus optional query string.
    pub uri: String,
    /// Value of the `Host` header.
    pub host: String,
    /// Request scheme (`http`, `https`) if the caller knows it.
    pub scheme: Option<String>,
    /// Decoded query parameters, in order.
    pub query: Vec<(String, String)>,
    /// Decoded form fields of a POST body, in order.
    pub form: Vec<(String, String)>,
    /// Cookies sent by the client, in order.
    pub cookies: Vec<(String, String)>,
}

impl InboundRequest {
    /// Create a request view; query parameters are decoded from `uri`.
    pub fn new(method: Method, uri: impl Into<String>, host: impl Into<String>) -> Self {
        let uri = uri.into();
        let query = uri
            .split_once('?')
            .map(|(_, qs)| {
                form_urlencoded::parse(qs.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default();

        Self {
            method,
            uri,
            host: host.into(),
            scheme: None,
            query,
            form: Vec::new(),
            cookies: Vec::new(),
        }
    }

    pub fn get(uri: impl Into<String>, host: impl Into<String>) -> Self {
        Self::new(Method::GET, uri, host)
    }

    pub fn post(uri: impl Into<String>, host: impl Into<String>) -> Self {
        Self::new(Method::POST, uri, host)
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.push((name.into(), value.into()));
        self
    }

    pub fn with_form_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.push((name.into(), value.into()));
        self
    }

    pub fn is_post(&self) -> bool {
        self.method == Method::POST
    }

    /// URI path without the query string.
    pub fn path(&self) -> &str {
        self.uri.split_once('?').map(|(path, _)| path).unwrap_or(&self.uri)
    }

    /// Query parameters re-encoded as `application/x-www-form-urlencoded`.
    pub fn query_string(&self) -> String {
        encode_pairs(&self.query)
    }

    /// Form fields re-encoded as `application/x-www-form-urlencoded`.
    pub fn form_body(&self) -> String {
        encode_pairs(&self.form)
    }
}

fn encode_pairs(pairs: &[(String, String)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

/// How the upstream body is going to be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// URI carried a gate-prefixed suffix.
    GatePath,
    /// No suffix and no widgets: forward the query string.
    Query,
    /// No suffix, explicit widget list: JSON section payload.
    Widgets,
}

impl FetchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchMode::GatePath => "gate_path",
            FetchMode::Query => "query",
            FetchMode::Widgets => "widgets",
        }
    }

    /// Whether the body is a full HTML page carrying section markers.
    pub fn parses_markers(&self) -> bool {
        !matches!(self, FetchMode::Widgets)
    }
}

/// Resolved upstream target for one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamTarget {
    pub url: String,
    pub gate_url: String,
    pub mode: FetchMode,
}

impl UpstreamTarget {
    /// Resolve the upstream URL and gate URL for `request`.
    pub fn resolve(
        request: &InboundRequest,
        gate_prefix: &str,
        upstream_host: &str,
        widget_ids: &[String],
    ) -> Self {
        let segment = format!("/{}/", gate_prefix);

        let (before, mode, url) = match request.uri.split_once(&segment) {
            Some((before, suffix)) => (
                before,
                FetchMode::GatePath,
                format!("http://{}/{}", upstream_host, suffix),
            ),
            None if widget_ids.is_empty() => (
                request.path(),
                FetchMode::Query,
                format!("http://{}/?{}", upstream_host, request.query_string()),
            ),
            None => (
                request.path(),
                FetchMode::Widgets,
                format!("http://{}/gate/recParts/{}/", upstream_host, widget_ids.join(",")),
            ),
        };

        let scheme = match request.scheme.as_deref() {
            Some(s) if !s.is_empty() => format!("{}:", s),
            _ => String::new(),
        };
        let gate_url = format!(
            "{}//{}{}/{}/",
            scheme,
            request.host,
            before.trim_end_matches('/'),
            gate_prefix
        );

        Self { url, gate_url, mode }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_path_target() {
        let req = InboundRequest::get("/site/RWD/about", "example.com").with_scheme("https");
        let target = UpstreamTarget::resolve(&req, "RWD", "vcms.eu", &[]);

        assert_eq!(target.url, "http://vcms.eu/about");
        assert_eq!(target.gate_url, "https://example.com/site/RWD/");
        assert_eq!(target.mode, FetchMode::GatePath);
    }

    #[test]
    fn test_gate_path_keeps_query() {
        let req = InboundRequest::get("/RWD/search/?page=2&q=a+b", "example.com");
        let target = UpstreamTarget::resolve(&req, "RWD", "vcms.eu", &[]);

        assert_eq!(target.url, "http://vcms.eu/search/?page=2&q=a+b");
        assert_eq!(target.gate_url, "//example.com/RWD/");
    }

    #[test]
    fn test_query_mode_target() {
        let req = InboundRequest::get("/site/?ofr=1&dest=Crete%20Island", "example.com");
        let target = UpstreamTarget::resolve(&req, "RWD", "vcms.eu", &[]);

        assert_eq!(target.url, "http://vcms.eu/?ofr=1&dest=Crete+Island");
        assert_eq!(target.gate_url, "//example.com/site/RWD/");
        assert_eq!(target.mode, FetchMode::Query);
    }

    #[test]
    fn test_widget_mode_target() {
        let req = InboundRequest::get("/site/", "example.com").with_scheme("http");
        let widgets = vec!["1".to_string(), "2".to_string()];
        let target = UpstreamTarget::resolve(&req, "RWD", "vcms.eu", &widgets);

        assert_eq!(target.url, "http://vcms.eu/gate/recParts/1,2/");
        assert_eq!(target.gate_url, "http://example.com/site/RWD/");
        assert_eq!(target.mode, FetchMode::Widgets);
        assert!(!target.mode.parses_markers());
    }

    #[test]
    fn test_suffix_wins_over_widgets() {
        let req = InboundRequest::get("/RWD/offer/7", "example.com");
        let widgets = vec!["1".to_string()];
        let target = UpstreamTarget::resolve(&req, "RWD", "vcms.eu", &widgets);

        assert_eq!(target.mode, FetchMode::GatePath);
        assert_eq!(target.url, "http://vcms.eu/offer/7");
    }

    #[test]
    fn test_form_body_encoding() {
        let req = InboundRequest::post("/RWD/", "example.com")
            .with_form_field("name", "Jan Kowalski")
            .with_form_field("mail", "jan@example.com");
        assert_eq!(req.form_body(), "name=Jan+Kowalski&mail=jan%40example.com");
        assert!(req.is_post());
    }
}
