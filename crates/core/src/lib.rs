//! machsweep-core
//!
//! Core library for finding Objective-C and Swift classes and selectors that a
//! Mach-O binary declares but never references.
//!
//! This crate defines the symbol records (model), the dump extractor and class
//! chunk parser, the implementation index and reachability analysis, and the
//! adapters for external tools (otool, swift-demangle).
//!
//! The goal is to keep all substantive logic here so it is fully testable and
//! reusable from multiple frontends (CLI, build-phase scripts, etc.).

pub mod model;
pub mod extract;
pub mod analysis;
pub mod config;
pub mod report;
pub mod services;

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
