//! Core engine for the trailer generation pipeline.
//!
//! The crate splits into two halves:
//!
//! - the **allocation engine** ([`allocation`]), which assigns each
//!   narrated subplot a non-overlapping segment of the source timeline,
//!   sized by its voice-over; and
//! - the **orchestrator** ([`orchestrator`]), a resumable sequence of
//!   stages that exchange artifacts through a fixed project directory
//!   layout ([`project`]).
//!
//! Everything model-shaped lives in [`models`]; configuration, logging
//! and media probing are in [`config`], [`logging`] and [`media`].

pub mod allocation;
pub mod config;
pub mod logging;
pub mod media;
pub mod models;
pub mod orchestrator;
pub mod project;

/// Crate version string.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
