//! Desktop integration through the GNOME settings tools
//!
//! - **backend**: `gsettings` / `dconf` command wrappers behind [`SettingsBackend`]
//! - **theme**: light/dark detection
//! - **applier**: sets the background for the current theme

pub mod applier;
pub mod backend;
pub mod theme;

use std::io;
use thiserror::Error;

pub use applier::{ApplyError, DesktopApplier, SettingsApplier};
pub use backend::backend_for;
pub use theme::{SettingsThemeProbe, ThemeProbe, ThemeVariant};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to run {tool}")]
    ToolUnavailable {
        tool: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("{tool} exited with an error: {stderr}")]
    CommandFailed { tool: &'static str, stderr: String },

    #[error("{schema} {key} has no value")]
    Unset { schema: String, key: String },
}

/// Read/write access to desktop settings keyed by schema and key
pub trait SettingsBackend {
    /// Current value with GVariant string quoting removed
    fn get(&self, schema: &str, key: &str) -> Result<String, SettingsError>;

    /// Store a string value
    fn set(&self, schema: &str, key: &str, value: &str) -> Result<(), SettingsError>;
}

/// Strip surrounding whitespace and GVariant single quotes
pub(crate) fn unquote(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(trimmed)
        .to_string()
}
