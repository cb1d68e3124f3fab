//! Streaming-link aggregation for a "currently listening to" widget.
//!
//! A build integration depends on this crate alone and gets the
//! [`ListeningService`] façade with the desktop HTTP client wired in.
//! The individual crates (`core-metadata` for providers and the data model,
//! `core-runtime` for config, cache and logging) can also be used directly.

#[cfg(feature = "desktop-shims")]
pub use core_service::*;
