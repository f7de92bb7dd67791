//! Utility functions and types.

pub mod logging;

pub use logging::{init_logging, LogLevel};
