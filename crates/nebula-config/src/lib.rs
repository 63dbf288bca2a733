//! Configuration system for the Nebula viewport.
//!
//! Provides runtime-configurable settings that persist to disk as RON files,
//! a string preference store, and CLI overrides via clap.

mod cli;
mod config;
mod error;

pub use cli::{CAMERA_FOV_KEY, CliArgs};
pub use config::{
    Config, DebugConfig, Preferences, ScenarioConfig, ViewportConfig, WindowConfig,
};
pub use error::ConfigError;
