//! RWD gate: reverse gate to a Vcms content server.

pub mod config;
pub mod gate;
pub mod http;
pub mod observability;

pub use config::GateServiceConfig;
pub use gate::{GateClient, GateError, InboundRequest, ResponseSink};
pub use http::HttpServer;
