//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber, with JSON or
//! pretty stdout output and an optional rolling JSON file.

pub mod config;
pub mod logger;

pub use config::{LogConfig, LogFormat, RotationPolicy};
pub use logger::LoggerImpl;
