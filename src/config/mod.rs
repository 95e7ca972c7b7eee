//! Configuration management for wallcycle
//!
//! A single JSON file, read once at startup.

pub mod settings;

pub use settings::{Config, ConfigError, DesktopBackendKind};
