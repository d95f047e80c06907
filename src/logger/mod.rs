//! Structured logging for the scan bot
//!
//! This module provides a small, ergonomic logging API with:
//! - Standard log levels (Error/Warning/Info/Debug/Verbose)
//! - Per-module debug control via --debug-<module> flags
//! - Colored, timestamped console output
//!
//! ## Usage
//!
//! ```rust,ignore
//! use scanbot::logger::{self, LogTag};
//!
//! logger::error(LogTag::Telegram, "Failed to pin card");
//! logger::warning(LogTag::Api, "DexScreener returned 429");
//! logger::info(LogTag::Tracker, "Tracking started");
//! logger::debug(LogTag::Poller, "Cycle finished"); // Only with --debug-poller
//! logger::verbose(LogTag::Api, "Raw response: ..."); // Only with --verbose
//! ```
//!
//! Call [`init`] once at startup, before any logging occurs.

mod config;
mod core;
mod format;
mod levels;
mod tags;

pub use config::{get_logger_config, init_from_args, set_logger_config, LoggerConfig};
pub use levels::LogLevel;
pub use tags::LogTag;

/// Initialize the logger from command-line arguments
pub fn init() {
    config::init_from_args();
}

/// Log at ERROR level (always shown)
pub fn error(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Error, message);
}

/// Log at WARNING level
pub fn warning(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Warning, message);
}

/// Log at INFO level (standard operations)
pub fn info(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Info, message);
}

/// Log at DEBUG level
///
/// Only shown when the --debug-<module> flag for the tag is provided.
pub fn debug(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Debug, message);
}

/// Log at VERBOSE level (only with --verbose)
pub fn verbose(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Verbose, message);
}
