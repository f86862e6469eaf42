//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router mounting the gate on every path
//! - Wire up middleware (tracing, timeout, request ID)
//! - Bind server to listener
//! - Run one `GateClient` per inbound request
//! - Render sections, raw results, redirects and gate errors

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GateServiceConfig;
use crate::gate::{FetchMode, FetchOutcome, GateClient, GateResult, ResponseSink, SectionTable};
use crate::http::request::{accepts_json, extract_inbound, X_REQUEST_ID};
use crate::http::response::{error_response, AxumResponseSink};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GateServiceConfig>,
}

/// HTTP server exposing the gate.
pub struct HttpServer {
    router: Router,
    config: Arc<GateServiceConfig>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GateServiceConfig) -> Self {
        let config = Arc::new(config);
        let state = AppState { config: config.clone() };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GateServiceConfig, state: AppState) -> Router {
        // Upstream timeouts fire first so the gate can answer 504 itself.
        let request_timeout =
            Duration::from_secs(config.timeouts.connect_secs + config.timeouts.request_secs + 1);

        Router::new()
            .route("/", any(gate_handler))
            .route("/{*path}", any(gate_handler))
            .with_state(state)
            .layer(TimeoutLayer::with_status_code(StatusCode::GATEWAY_TIMEOUT, request_timeout))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Router with all layers, for embedding or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` completes.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream_host = %self.config.gate.upstream_host,
            gate_prefix = %self.config.gate.gate_prefix,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GateServiceConfig {
        &self.config
    }
}

/// JSON view of a section result.
#[derive(Serialize)]
struct SectionsView<'a> {
    index: bool,
    sections: &'a SectionTable,
}

fn gate_client(config: &GateServiceConfig) -> GateResult<GateClient> {
    let mut client = GateClient::new(config.gate.affiliate_id.as_str(), config.gate.gate_prefix.as_str())?
        .with_transport_settings(config.transport_settings());
    client.set_url(config.gate.upstream_host.as_str());
    Ok(client)
}

/// Gate handler. Every inbound path lands here.
async fn gate_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let config = &state.config;
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let wants_json = accepts_json(request.headers());

    let inbound = match extract_inbound(
        request,
        config.gate.default_scheme.as_deref(),
        config.limits.max_body_bytes,
    )
    .await
    {
        Ok(inbound) => inbound,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Rejecting inbound request");
            return (StatusCode::PAYLOAD_TOO_LARGE, e.to_string()).into_response();
        }
    };

    let mut client = match gate_client(config) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Gate misconfigured");
            return error_response(&e);
        }
    };

    let mut sink = AxumResponseSink::new();
    match client.fetch(&inbound, &config.gate.widgets, &mut sink).await {
        Ok(FetchOutcome::Redirected { location }) => {
            tracing::debug!(request_id = %request_id, location = %location, "Redirecting client");
            sink.into_response()
        }
        Ok(FetchOutcome::Content) => render_content(&client, sink, wants_json),
        Err(e) if e.is_upstream() => {
            tracing::warn!(request_id = %request_id, uri = %inbound.uri, error = %e, "Upstream unavailable");
            error_response(&e)
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, uri = %inbound.uri, error = %e, "Gate fetch failed");
            error_response(&e)
        }
    }
}

fn render_content(client: &GateClient, mut sink: AxumResponseSink, wants_json: bool) -> Response {
    if client.is_raw_result() {
        client.print_raw_result(&mut sink, None);
        return sink.into_response();
    }

    let widget_mode = client.mode() == Some(FetchMode::Widgets);
    if wants_json || widget_mode {
        let view = SectionsView {
            index: client.is_index(),
            sections: client.sections(),
        };
        let body = match serde_json::to_vec(&view) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize sections");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };
        sink.clear_body();
        sink.set_header(header::CONTENT_TYPE.as_str(), "application/json");
        sink.write_body(&body);
        return sink.into_response();
    }

    let content_type = client
        .result_headers()
        .and_then(|h| h.get("Content-Type"))
        .map(str::trim)
        .unwrap_or("text/html; charset=UTF-8")
        .to_string();
    sink.clear_body();
    sink.set_header(header::CONTENT_TYPE.as_str(), &content_type);
    sink.write_body(client.result());
    sink.into_response()
}
