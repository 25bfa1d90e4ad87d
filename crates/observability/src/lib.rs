//! Tracing setup shared by the marketplace binaries.

/// Subscriber installation (filters, output format).
pub mod subscriber;

pub use subscriber::{DEFAULT_DIRECTIVE, LOG_FORMAT_VAR, LogFormat, init, init_with};
