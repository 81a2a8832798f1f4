//! Configuration management for Trailer Gen.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Section-level updates (only changed section is modified)
//! - Defaults for every missing field on load
//!
//! The settings object is constructed once per run and handed to the
//! pipeline as an immutable value; no component reads configuration from
//! anywhere else.
//!
//! # Example
//!
//! ```no_run
//! use tgen_core::config::ConfigManager;
//!
//! let mut config = ConfigManager::new("trailer-gen.toml");
//! config.load_or_create().unwrap();
//! println!("Project: {}", config.settings().paths.project_name);
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    AllocationSettings, ConfigSection, LoggingSettings, NarrativeSettings, PathSettings,
    RankingSettings, Settings, StageSettings, VoiceSettings,
};
