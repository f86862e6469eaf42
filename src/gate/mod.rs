//! RWD gate subsystem.
//!
//! # Data Flow
//! ```text
//! InboundRequest (built by the caller)
//!     → request.rs (split URI on /{prefix}/, resolve upstream + gate URL)
//!     → client.rs (upstream exchange: gate headers, cookies, POST fields)
//!     → cookies.rs (Set-Cookie relayed to the ResponseSink)
//!     → 302: redirect.rs (collapse duplicated gate URL) → sink.redirect
//!     → other: sections.rs (RWD_PART markers) or JSON widget sections
//!     → caller reads sections or prints the raw result through its sink
//! ```
//!
//! # Design Decisions
//! - One `GateClient` per inbound request; no state is shared across requests
//! - All output goes through `ResponseSink`, never the process
//! - Upstream failures surface as `GateError`; non-200 statuses do not

pub mod client;
pub mod cookies;
pub mod error;
pub mod redirect;
pub mod request;
pub mod result;
pub mod sections;
pub mod sink;

pub use client::{
    FetchOutcome, GateClient, GateConfig, TransportSettings, DEFAULT_GATE_PREFIX,
    DEFAULT_UPSTREAM_HOST,
};
pub use cookies::ParsedCookie;
pub use error::{GateError, GateResult};
pub use request::{FetchMode, InboundRequest, UpstreamTarget};
pub use result::{HeaderTable, UpstreamResult};
pub use sections::{SectionError, SectionTable};
pub use sink::{RecordingSink, ResponseSink};
