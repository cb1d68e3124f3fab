//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the listening-to core:
//! - Logging and tracing infrastructure
//! - Configuration management and validation
//! - Single-slot TTL cache
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that the metadata and service
//! crates depend on. It establishes the logging conventions, the fail-fast
//! configuration rules and the memoisation primitive used in front of the
//! resolution pipeline.

pub mod cache;
pub mod config;
pub mod error;
pub mod logging;

pub use cache::TtlCache;
pub use config::{ListeningConfig, ListeningOptions, ProviderKind};
pub use error::{Error, Result};
