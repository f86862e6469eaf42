//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, gate handler)
//!     → request.rs (axum request → InboundRequest)
//!     → gate::GateClient (upstream exchange)
//!     → response.rs (AxumResponseSink → axum Response)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{extract_inbound, X_REQUEST_ID};
pub use response::AxumResponseSink;
pub use server::HttpServer;
