use std::process::Command;
use tracing::debug;

use super::{SettingsBackend, SettingsError, unquote};
use crate::config::DesktopBackendKind;
use crate::constants::gnome;
use crate::environment::Environment;

/// Run a settings tool and return its stdout
fn run(tool: &'static str, args: &[&str], env: &Environment) -> Result<String, SettingsError> {
    let mut command = Command::new(tool);
    command.args(args);
    env.configure(&mut command);

    debug!(tool = tool, args = ?args, "Running settings command");
    let output = command
        .output()
        .map_err(|source| SettingsError::ToolUnavailable { tool, source })?;

    if !output.status.success() {
        return Err(SettingsError::CommandFailed {
            tool,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// `gsettings get|set <schema> <key>`
pub struct Gsettings {
    env: Environment,
}

impl Gsettings {
    pub fn new(env: Environment) -> Self {
        Self { env }
    }
}

impl SettingsBackend for Gsettings {
    fn get(&self, schema: &str, key: &str) -> Result<String, SettingsError> {
        let stdout = run(gnome::GSETTINGS_BIN, &["get", schema, key], &self.env)?;
        Ok(unquote(&stdout))
    }

    fn set(&self, schema: &str, key: &str, value: &str) -> Result<(), SettingsError> {
        run(gnome::GSETTINGS_BIN, &["set", schema, key, value], &self.env).map(|_| ())
    }
}

/// `dconf read|write /<schema path>/<key>`
///
/// Reads of keys that were never written return nothing; those are reported
/// as [`SettingsError::Unset`].
pub struct Dconf {
    env: Environment,
}

impl Dconf {
    pub fn new(env: Environment) -> Self {
        Self { env }
    }

    /// `org.gnome.desktop.background` + `picture-uri` -> `/org/gnome/desktop/background/picture-uri`
    pub fn key_path(schema: &str, key: &str) -> String {
        format!("/{}/{}", schema.replace('.', "/"), key)
    }

    /// GVariant string literal
    fn quote(value: &str) -> String {
        format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
    }
}

impl SettingsBackend for Dconf {
    fn get(&self, schema: &str, key: &str) -> Result<String, SettingsError> {
        let stdout = run(gnome::DCONF_BIN, &["read", &Self::key_path(schema, key)], &self.env)?;
        if stdout.trim().is_empty() {
            return Err(SettingsError::Unset {
                schema: schema.to_string(),
                key: key.to_string(),
            });
        }
        Ok(unquote(&stdout))
    }

    fn set(&self, schema: &str, key: &str, value: &str) -> Result<(), SettingsError> {
        let path = Self::key_path(schema, key);
        run(gnome::DCONF_BIN, &["write", &path, &Self::quote(value)], &self.env).map(|_| ())
    }
}

pub fn backend_for(kind: DesktopBackendKind, env: Environment) -> Box<dyn SettingsBackend> {
    match kind {
        DesktopBackendKind::Gsettings => Box::new(Gsettings::new(env)),
        DesktopBackendKind::Dconf => Box::new(Dconf::new(env)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dconf_key_path() {
        assert_eq!(
            Dconf::key_path(gnome::BACKGROUND_SCHEMA, gnome::PICTURE_URI_DARK_KEY),
            "/org/gnome/desktop/background/picture-uri-dark"
        );
        assert_eq!(
            Dconf::key_path(gnome::INTERFACE_SCHEMA, gnome::COLOR_SCHEME_KEY),
            "/org/gnome/desktop/interface/color-scheme"
        );
    }

    #[test]
    fn test_dconf_quote() {
        assert_eq!(Dconf::quote("file:///a/b.jpg"), "'file:///a/b.jpg'");
        assert_eq!(Dconf::quote("it's"), "'it\\'s'");
    }

    #[test]
    fn test_missing_tool_is_unavailable() {
        let result = run("wallcycle-no-such-tool", &["get"], &Environment::default());
        assert!(matches!(result, Err(SettingsError::ToolUnavailable { .. })));
    }
}
