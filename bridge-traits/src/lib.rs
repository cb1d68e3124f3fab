//! # Host Bridge Traits
//!
//! Capability contracts that the core requires from its host.
//!
//! ## Overview
//!
//! The link-resolution core never talks to the network or the system clock
//! directly. It receives implementations of the traits below, which lets the
//! desktop build use `reqwest` and lets tests substitute mocks and manual
//! clocks.
//!
//! ## Traits
//!
//! - [`HttpClient`](http::HttpClient) - Single-attempt async HTTP requests
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! should convert platform-specific failures into it with an actionable
//! message.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so they can be shared across
//! concurrently awaited provider calls.

pub mod error;
pub mod http;
pub mod time;

pub use error::BridgeError;

pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use time::{Clock, ManualClock, SystemClock};
