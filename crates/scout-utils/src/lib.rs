//! Shared utilities for stock-scout
//!
//! Logging setup used by the binary and by examples that want the same
//! filter defaults as the CLI.

pub mod logging;

pub use logging::{LogFormat, init_tracing, init_tracing_json};
