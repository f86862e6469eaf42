//! Gate client: one upstream exchange per inbound request.
//!
//! # Responsibilities
//! - Resolve the upstream target from the inbound URI
//! - Forward gate headers, cookies and POST fields to the upstream
//! - Capture headers and relay `Set-Cookie` directives
//! - Rewrite `302` targets and mirror non-200 statuses
//! - Expose the body as a section table or as a raw passthrough
//!
//! # Design Decisions
//! - The transport handle is created on first use and dropped with the client
//! - Redirects are never followed by the transport; `302` is handled here
//! - No retries: a transport failure is returned to the caller immediately

use std::time::{Duration, Instant};

use axum::http::header::{CONTENT_TYPE, COOKIE};
use reqwest::Method;
use serde_json::Value;
use url::Url;

use crate::gate::cookies::{build_cookie_header, ParsedCookie};
use crate::gate::error::{GateError, GateResult};
use crate::gate::redirect::{collapse_gate_url, resolve_location};
use crate::gate::request::{FetchMode, InboundRequest, UpstreamTarget};
use crate::gate::result::{canonical_header_name, HeaderTable, UpstreamResult};
use crate::gate::sections::{parse_with_nested, SectionTable};
use crate::gate::sink::ResponseSink;
use crate::observability::metrics;

/// Prefix used when none is given.
pub const DEFAULT_GATE_PREFIX: &str = "RWD";

/// Upstream Vcms host used until `set_url` says otherwise.
pub const DEFAULT_UPSTREAM_HOST: &str = "vcms.eu";

/// Content types that are always passed through untouched.
pub const RAW_CONTENT_TYPES: [&str; 3] = [
    "text/css",
    "application/javascript; charset=UTF-8",
    "application/javascript",
];

/// Upstream headers forwarded along with a raw result.
pub const PASSTHROUGH_HEADERS: [&str; 5] = [
    "Content-Type",
    "Last-Modified",
    "Cache-Control",
    "Pragma",
    "Expires",
];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Identity of this site towards the upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    affiliate_id: String,
    gate_prefix: String,
    upstream_host: String,
}

impl GateConfig {
    /// Both arguments must be non-empty.
    pub fn new(affiliate_id: impl Into<String>, gate_prefix: impl Into<String>) -> GateResult<Self> {
        let affiliate_id = affiliate_id.into();
        let gate_prefix = gate_prefix.into();
        if affiliate_id.is_empty() {
            return Err(GateError::Config { field: "affiliate_id" });
        }
        if gate_prefix.is_empty() {
            return Err(GateError::Config { field: "gate_prefix" });
        }
        Ok(Self {
            affiliate_id,
            gate_prefix,
            upstream_host: DEFAULT_UPSTREAM_HOST.to_string(),
        })
    }

    pub fn affiliate_id(&self) -> &str {
        &self.affiliate_id
    }

    pub fn gate_prefix(&self) -> &str {
        &self.gate_prefix
    }

    pub fn upstream_host(&self) -> &str {
        &self.upstream_host
    }

    pub fn set_upstream_host(&mut self, host: impl Into<String>) {
        self.upstream_host = host.into();
    }
}

/// Transport limits for upstream calls. Failed exchanges are not retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Honour `HTTP_PROXY` and friends.
    pub use_system_proxy: bool,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(30),
            use_system_proxy: true,
        }
    }
}

/// What the caller must do after `fetch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The sink received a redirect; stop processing the request.
    Redirected { location: String },
    /// Body is available as sections or as a raw result.
    Content,
}

/// Client for the upstream Vcms host.
pub struct GateClient {
    config: GateConfig,
    transport_settings: TransportSettings,
    transport: Option<reqwest::Client>,
    result: Option<UpstreamResult>,
    mode: Option<FetchMode>,
    sections: SectionTable,
    raw_fallback: bool,
}

impl GateClient {
    pub fn new(affiliate_id: impl Into<String>, gate_prefix: impl Into<String>) -> GateResult<Self> {
        Ok(Self::from_config(GateConfig::new(affiliate_id, gate_prefix)?))
    }

    /// Client using the default `RWD` prefix.
    pub fn with_affiliate(affiliate_id: impl Into<String>) -> GateResult<Self> {
        Self::new(affiliate_id, DEFAULT_GATE_PREFIX)
    }

    pub fn from_config(config: GateConfig) -> Self {
        Self {
            config,
            transport_settings: TransportSettings::default(),
            transport: None,
            result: None,
            mode: None,
            sections: SectionTable::new(),
            raw_fallback: false,
        }
    }

    pub fn with_transport_settings(mut self, settings: TransportSettings) -> Self {
        self.transport_settings = settings;
        self.transport = None;
        self
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Point the client at another upstream host.
    pub fn set_url(&mut self, host: impl Into<String>) {
        self.config.set_upstream_host(host);
    }

    /// Release the transport handle. The next fetch creates a new one.
    pub fn close(&mut self) {
        if self.transport.take().is_some() {
            tracing::debug!("Upstream transport released");
        }
    }

    fn transport(&mut self) -> GateResult<reqwest::Client> {
        if let Some(client) = &self.transport {
            return Ok(client.clone());
        }

        let mut builder = reqwest::Client::builder()
            .connect_timeout(self.transport_settings.connect_timeout)
            .timeout(self.transport_settings.request_timeout)
            .redirect(reqwest::redirect::Policy::none())
            .gzip(true);
        if !self.transport_settings.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;

        tracing::debug!(
            connect_timeout = ?self.transport_settings.connect_timeout,
            request_timeout = ?self.transport_settings.request_timeout,
            "Upstream transport created"
        );
        self.transport = Some(client.clone());
        Ok(client)
    }

    /// Fetch content for `request` from the upstream.
    ///
    /// `widget_ids` only matter when the URI has no gate-prefixed suffix.
    /// A `Redirected` outcome means the sink already holds the redirect.
    pub async fn fetch<S>(
        &mut self,
        request: &InboundRequest,
        widget_ids: &[String],
        sink: &mut S,
    ) -> GateResult<FetchOutcome>
    where
        S: ResponseSink + ?Sized,
    {
        self.result = None;
        self.mode = None;
        self.sections.clear();
        self.raw_fallback = false;

        let target = UpstreamTarget::resolve(
            request,
            self.config.gate_prefix(),
            self.config.upstream_host(),
            widget_ids,
        );
        Url::parse(&target.url).map_err(|e| GateError::InvalidUpstreamUrl {
            url: target.url.clone(),
            reason: e.to_string(),
        })?;

        tracing::info!(
            upstream = %target.url,
            gate_url = %target.gate_url,
            mode = target.mode.as_str(),
            method = %request.method,
            "Fetching from upstream"
        );

        let start = Instant::now();
        let result = match self.exchange(request, &target, sink).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(upstream = %target.url, error = %e, "Upstream request failed");
                metrics::record_transport_error(target.mode.as_str());
                return Err(e);
            }
        };
        metrics::record_fetch(target.mode.as_str(), result.status, start);

        self.absorb(result, &target, sink)
    }

    async fn exchange<S>(
        &mut self,
        request: &InboundRequest,
        target: &UpstreamTarget,
        sink: &mut S,
    ) -> GateResult<UpstreamResult>
    where
        S: ResponseSink + ?Sized,
    {
        let client = self.transport()?;
        let timeout_secs = self.transport_settings.request_timeout.as_secs();
        let to_gate_error = |e: reqwest::Error| {
            if e.is_timeout() {
                GateError::Timeout(timeout_secs)
            } else {
                GateError::Transport(e)
            }
        };

        let method = if request.is_post() { Method::POST } else { Method::GET };
        let mut upstream = client
            .request(method, &target.url)
            .header("Gate-URL", &target.gate_url)
            .header("Gate-AffiliateId", self.config.affiliate_id())
            .header("Gate-Prefix", self.config.gate_prefix());

        if request.is_post() {
            upstream = upstream
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(request.form_body());
        }
        if let Some(cookie) = build_cookie_header(&request.cookies) {
            upstream = upstream.header(COOKIE, cookie);
        }

        let response = upstream.send().await.map_err(to_gate_error)?;

        let mut result = UpstreamResult {
            status: response.status().as_u16(),
            ..UpstreamResult::default()
        };
        for (name, value) in response.headers() {
            let name = canonical_header_name(name.as_str());
            let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
            if name == "Set-Cookie" {
                match ParsedCookie::parse(&value) {
                    Some(cookie) => {
                        sink.set_cookie(&cookie);
                        result.cookies.push(cookie);
                    }
                    None => tracing::debug!(value = %value, "Ignoring nameless Set-Cookie"),
                }
            }
            result.headers.insert(name, value);
        }

        tracing::debug!(
            status = result.status,
            headers = result.headers.len(),
            cookies = result.cookies.len(),
            "Upstream responded"
        );

        if result.status != 302 {
            result.body = response.bytes().await.map_err(to_gate_error)?.to_vec();
        }
        Ok(result)
    }

    /// Interpret a captured exchange: redirect, status mirroring, body loading.
    fn absorb<S>(
        &mut self,
        result: UpstreamResult,
        target: &UpstreamTarget,
        sink: &mut S,
    ) -> GateResult<FetchOutcome>
    where
        S: ResponseSink + ?Sized,
    {
        self.mode = Some(target.mode);

        if result.status == 302 {
            let location = result
                .headers
                .get("Location")
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .ok_or(GateError::MissingRedirectLocation)?;
            let resolved = resolve_location(&target.url, location);
            let rewritten = collapse_gate_url(&resolved, &target.gate_url);

            tracing::info!(upstream_location = %resolved, location = %rewritten, "Relaying upstream redirect");
            sink.redirect(&rewritten);
            self.result = Some(result);
            return Ok(FetchOutcome::Redirected { location: rewritten });
        }

        if result.status != 200 {
            let reported = result
                .headers
                .get("Status")
                .map(str::trim)
                .filter(|s| !s.is_empty());
            let code = reported
                .and_then(|line| line.split_whitespace().next())
                .and_then(|c| c.parse::<u16>().ok())
                .unwrap_or(result.status);
            let line = reported
                .map(str::to_string)
                .unwrap_or_else(|| result.status.to_string());

            tracing::warn!(status = result.status, status_line = %line, "Mirroring upstream status");
            sink.set_status(code, &line);
        }

        self.result = Some(result);

        if target.mode.parses_markers() {
            self.load_sections();
        } else if self.is_raw_result() {
            self.print_raw_result(sink, None);
        } else {
            self.load_widget_sections()?;
        }

        Ok(FetchOutcome::Content)
    }

    fn load_sections(&mut self) {
        let Some(result) = self.result.as_mut() else {
            return;
        };
        if result.body.starts_with(UTF8_BOM) {
            result.body.drain(..UTF8_BOM.len());
        }

        let parsed = match std::str::from_utf8(&result.body) {
            Ok(text) => parse_with_nested(text),
            Err(_) => Ok(SectionTable::new()),
        };
        match parsed {
            Ok(table) if !table.is_empty() => {
                tracing::debug!(sections = ?table.names(), "Sections parsed");
                self.sections = table;
            }
            Ok(_) => {
                tracing::debug!("No sections found, treating body as raw");
                self.raw_fallback = true;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Malformed section markers, treating body as raw");
                self.raw_fallback = true;
            }
        }
    }

    /// Decode a widget payload. Only a `200` reply must carry a JSON object;
    /// an error page under a mirrored status leaves the table empty.
    fn load_widget_sections(&mut self) -> GateResult<()> {
        let (status, body) = self
            .result
            .as_ref()
            .map(|r| (r.status, r.body.as_slice()))
            .unwrap_or_default();
        let decoded = match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(object)) => Ok(object),
            Ok(_) => Err("expected a JSON object".to_string()),
            Err(e) => Err(e.to_string()),
        };
        let object = match decoded {
            Ok(object) => object,
            Err(reason) if status != 200 => {
                tracing::debug!(status, reason = %reason, "Widget error page carries no sections");
                return Ok(());
            }
            Err(reason) => return Err(GateError::WidgetPayload(reason)),
        };

        let mut table = SectionTable::new();
        for (name, value) in object {
            match value {
                Value::String(body) => table.insert(name, body),
                other => table.insert(name, other.to_string()),
            }
        }
        tracing::debug!(sections = ?table.names(), "Widget sections decoded");
        self.sections = table;
        Ok(())
    }

    /// Body of section `name`.
    pub fn get_section(&self, name: &str) -> Option<&str> {
        self.sections.get(name)
    }

    /// Section names in order, or `None` when nothing was parsed.
    pub fn get_sections_list(&self) -> Option<Vec<&str>> {
        if self.sections.is_empty() {
            return None;
        }
        Some(self.sections.names())
    }

    pub fn sections(&self) -> &SectionTable {
        &self.sections
    }

    /// Whether the body should be forwarded byte-for-byte.
    pub fn is_raw_result(&self) -> bool {
        let raw_type = self
            .result
            .as_ref()
            .and_then(|r| r.content_type())
            .map(|ct| RAW_CONTENT_TYPES.contains(&ct.trim()))
            .unwrap_or(false);
        raw_type || self.raw_fallback
    }

    /// Write a raw body to `sink` with the whitelisted upstream headers.
    ///
    /// `content` overrides the stored body.
    pub fn print_raw_result<S>(&self, sink: &mut S, content: Option<&[u8]>)
    where
        S: ResponseSink + ?Sized,
    {
        sink.clear_body();
        if let Some(result) = &self.result {
            for (name, value) in result.headers.iter() {
                if PASSTHROUGH_HEADERS.contains(&name) {
                    sink.set_header(name, value.trim());
                }
            }
        }
        sink.write_body(content.unwrap_or_else(|| self.result()));
    }

    /// True when the `STEP` section holds the integer zero.
    pub fn is_index(&self) -> bool {
        self.sections
            .get("STEP")
            .map(|step| step.trim().parse::<i64>() == Ok(0))
            .unwrap_or(false)
    }

    /// Expire every inbound cookie at the client and forget it for later fetches.
    pub fn no_cookies<S>(&self, request: &mut InboundRequest, sink: &mut S)
    where
        S: ResponseSink + ?Sized,
    {
        for (name, _) in request.cookies.drain(..) {
            sink.set_cookie(&ParsedCookie::expired(name));
        }
    }

    /// Stored body (BOM-stripped in marker mode).
    pub fn result(&self) -> &[u8] {
        self.result.as_ref().map(|r| r.body.as_slice()).unwrap_or_default()
    }

    pub fn result_headers(&self) -> Option<&HeaderTable> {
        self.result.as_ref().map(|r| &r.headers)
    }

    pub fn upstream_result(&self) -> Option<&UpstreamResult> {
        self.result.as_ref()
    }

    /// Mode of the last completed fetch.
    pub fn mode(&self) -> Option<FetchMode> {
        self.mode
    }
}

impl std::fmt::Debug for GateClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GateClient")
            .field("config", &self.config)
            .field("transport_open", &self.transport.is_some())
            .field("sections", &self.sections.len())
            .field("raw_fallback", &self.raw_fallback)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::sink::RecordingSink;

    fn client() -> GateClient {
        GateClient::with_affiliate("1234").unwrap()
    }

    fn target(mode: FetchMode) -> UpstreamTarget {
        UpstreamTarget {
            url: "http://vcms.eu/about".to_string(),
            gate_url: "http://example.com/RWD/".to_string(),
            mode,
        }
    }

    fn upstream(status: u16, headers: &[(&str, &str)], body: &[u8]) -> UpstreamResult {
        let mut table = HeaderTable::new();
        for (name, value) in headers {
            table.insert(*name, *value);
        }
        UpstreamResult {
            status,
            headers: table,
            cookies: Vec::new(),
            body: body.to_vec(),
        }
    }

    #[test]
    fn test_construction_requires_values() {
        assert!(matches!(
            GateClient::new("", "RWD"),
            Err(GateError::Config { field: "affiliate_id" })
        ));
        assert!(matches!(
            GateClient::new("1234", ""),
            Err(GateError::Config { field: "gate_prefix" })
        ));

        let mut gate = client();
        assert_eq!(gate.config().gate_prefix(), "RWD");
        assert_eq!(gate.config().upstream_host(), "vcms.eu");
        gate.set_url("test.vcms.eu");
        assert_eq!(gate.config().upstream_host(), "test.vcms.eu");
    }

    #[test]
    fn test_sections_from_html() {
        let mut gate = client();
        let mut sink = RecordingSink::new();
        let body = b"\xEF\xBB\xBF<html><!--[RWD_PART:STEP]-->0<!--[/RWD_PART:STEP]--><!--[RWD_PART:BODY]--><p>x</p><!--[/RWD_PART:BODY]--></html>";
        let outcome = gate
            .absorb(upstream(200, &[("Content-Type", "text/html")], body), &target(FetchMode::GatePath), &mut sink)
            .unwrap();

        assert_eq!(outcome, FetchOutcome::Content);
        assert_eq!(gate.get_sections_list(), Some(vec!["STEP", "BODY"]));
        assert_eq!(gate.get_section("BODY"), Some("<p>x</p>"));
        assert_eq!(gate.get_section("MISSING"), None);
        assert!(gate.result().starts_with(b"<html>"));
        assert!(gate.is_index());
        assert!(!gate.is_raw_result());
        assert_eq!(sink, RecordingSink::new());
    }

    #[test]
    fn test_no_markers_falls_back_to_raw() {
        let mut gate = client();
        let mut sink = RecordingSink::new();
        gate.absorb(upstream(200, &[("Content-Type", "image/png")], b"\x89PNG\r\n\xff"), &target(FetchMode::Query), &mut sink)
            .unwrap();

        assert!(gate.is_raw_result());
        assert_eq!(gate.get_sections_list(), None);
    }

    #[test]
    fn test_malformed_markers_fall_back_to_raw() {
        let mut gate = client();
        let mut sink = RecordingSink::new();
        gate.absorb(upstream(200, &[], b"<!--[RWD_PART:A]-->open"), &target(FetchMode::GatePath), &mut sink)
            .unwrap();

        assert!(gate.is_raw_result());
        assert!(gate.sections().is_empty());
    }

    #[test]
    fn test_raw_content_types() {
        for (ct, raw) in [
            ("text/css", true),
            (" application/javascript ", true),
            ("application/javascript; charset=UTF-8", true),
            ("application/javascript; charset=utf-8", false),
            ("text/html", false),
        ] {
            let mut gate = client();
            let body = b"<!--[RWD_PART:A]-->x<!--[/RWD_PART:A]-->";
            gate.absorb(upstream(200, &[("Content-Type", ct)], body), &target(FetchMode::GatePath), &mut RecordingSink::new())
                .unwrap();
            assert_eq!(gate.is_raw_result(), raw, "content type {:?}", ct);
        }
    }

    #[test]
    fn test_print_raw_result_forwards_whitelist() {
        let mut gate = client();
        let headers = [
            ("Content-Type", " text/css"),
            ("Set-Cookie", "a=1"),
            ("Cache-Control", "max-age=60"),
            ("X-Powered-By", "Vcms"),
        ];
        gate.absorb(upstream(200, &headers, b"body{}"), &target(FetchMode::GatePath), &mut RecordingSink::new())
            .unwrap();

        let mut sink = RecordingSink::new();
        sink.write_body(b"stray");
        gate.print_raw_result(&mut sink, None);

        assert_eq!(sink.body, b"body{}");
        assert_eq!(
            sink.headers,
            vec![
                ("Content-Type".to_string(), "text/css".to_string()),
                ("Cache-Control".to_string(), "max-age=60".to_string()),
            ]
        );

        gate.print_raw_result(&mut sink, Some(b"other"));
        assert_eq!(sink.body, b"other");
    }

    #[test]
    fn test_redirect_collapses_gate_url() {
        let mut gate = client();
        let mut sink = RecordingSink::new();
        let res = upstream(
            302,
            &[("Location", "http://example.com/RWD/http://example.com/RWD/path")],
            b"",
        );
        let outcome = gate.absorb(res, &target(FetchMode::GatePath), &mut sink).unwrap();

        assert_eq!(
            outcome,
            FetchOutcome::Redirected { location: "http://example.com/RWD/path".into() }
        );
        assert_eq!(sink.redirect.as_deref(), Some("http://example.com/RWD/path"));
        assert!(gate.sections().is_empty());
    }

    #[test]
    fn test_redirect_without_location_fails() {
        let mut gate = client();
        let mut sink = RecordingSink::new();
        let err = gate
            .absorb(upstream(302, &[("Location", "  ")], b""), &target(FetchMode::GatePath), &mut sink)
            .unwrap_err();

        assert!(matches!(err, GateError::MissingRedirectLocation));
        assert_eq!(sink.redirect, None);
    }

    #[test]
    fn test_status_mirrored_and_body_kept() {
        let mut gate = client();
        let mut sink = RecordingSink::new();
        let body = b"<!--[RWD_PART:BODY]-->not found<!--[/RWD_PART:BODY]-->";
        gate.absorb(upstream(404, &[("Status", " 404 Not Found")], body), &target(FetchMode::GatePath), &mut sink)
            .unwrap();

        assert_eq!(sink.status, Some((404, "404 Not Found".to_string())));
        assert_eq!(gate.get_section("BODY"), Some("not found"));
    }

    #[test]
    fn test_status_without_status_header() {
        let mut gate = client();
        let mut sink = RecordingSink::new();
        gate.absorb(upstream(500, &[], b"oops"), &target(FetchMode::GatePath), &mut sink)
            .unwrap();

        assert_eq!(sink.status, Some((500, "500".to_string())));
    }

    #[test]
    fn test_widget_mode_decodes_json() {
        let mut gate = client();
        let mut sink = RecordingSink::new();
        let body = br#"{"2":"<div>two</div>","1":"<!--[RWD_PART:X]-->y<!--[/RWD_PART:X]-->","n":5}"#;
        gate.absorb(upstream(200, &[("Content-Type", "application/json")], body), &target(FetchMode::Widgets), &mut sink)
            .unwrap();

        assert_eq!(gate.get_sections_list(), Some(vec!["2", "1", "n"]));
        assert_eq!(gate.get_section("2"), Some("<div>two</div>"));
        assert_eq!(gate.get_section("X"), None);
        assert_eq!(gate.get_section("n"), Some("5"));
    }

    #[test]
    fn test_widget_mode_rejects_non_object() {
        let mut gate = client();
        let err = gate
            .absorb(upstream(200, &[], b"[1,2]"), &target(FetchMode::Widgets), &mut RecordingSink::new())
            .unwrap_err();
        assert!(matches!(err, GateError::WidgetPayload(_)));
    }

    #[test]
    fn test_widget_mode_error_page_keeps_mirrored_status() {
        let mut gate = client();
        let mut sink = RecordingSink::new();
        let res = upstream(
            404,
            &[("Status", "404 Not Found"), ("Content-Type", "text/html")],
            b"<html>Not found</html>",
        );
        let outcome = gate.absorb(res, &target(FetchMode::Widgets), &mut sink).unwrap();

        assert_eq!(outcome, FetchOutcome::Content);
        assert_eq!(sink.status, Some((404, "404 Not Found".to_string())));
        assert_eq!(gate.get_sections_list(), None);
        assert_eq!(gate.result(), b"<html>Not found</html>");
    }

    #[test]
    fn test_widget_mode_raw_asset_printed() {
        let mut gate = client();
        let mut sink = RecordingSink::new();
        gate.absorb(upstream(200, &[("Content-Type", "text/css")], b"a{}"), &target(FetchMode::Widgets), &mut sink)
            .unwrap();

        assert_eq!(sink.body, b"a{}");
        assert_eq!(sink.header("Content-Type"), Some("text/css"));
        assert!(gate.sections().is_empty());
    }

    #[test]
    fn test_is_index_values() {
        for (step, expected) in [(Some("0"), true), (Some(" 0\n"), true), (Some("1"), false), (Some("-1"), false), (Some("abc"), false), (None, false)] {
            let mut gate = client();
            let body = match step {
                Some(v) => format!("<!--[RWD_PART:STEP]-->{v}<!--[/RWD_PART:STEP]-->"),
                None => "<!--[RWD_PART:BODY]-->x<!--[/RWD_PART:BODY]-->".to_string(),
            };
            gate.absorb(upstream(200, &[], body.as_bytes()), &target(FetchMode::GatePath), &mut RecordingSink::new())
                .unwrap();
            assert_eq!(gate.is_index(), expected, "STEP {:?}", step);
        }
    }

    #[test]
    fn test_no_cookies_expires_all() {
        let gate = client();
        let mut sink = RecordingSink::new();
        let mut request = InboundRequest::get("/", "example.com")
            .with_cookie("a", "1")
            .with_cookie("b", "2");
        gate.no_cookies(&mut request, &mut sink);

        assert!(request.cookies.is_empty());
        let names: Vec<_> = sink.cookies.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(sink.cookies.iter().all(|c| c.path.as_deref() == Some("/") && c.expires.is_some()));
    }

    #[test]
    fn test_close_releases_transport() {
        let mut gate = client();
        gate.transport().unwrap();
        assert!(gate.transport.is_some());
        gate.close();
        assert!(gate.transport.is_none());
    }
}
