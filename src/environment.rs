//! Session environment handed to desktop tool subprocesses
//!
//! The desktop settings tools need a session bus. When started from cron or
//! an IDE the variable is often missing, so it is discovered once here and
//! passed explicitly to the settings backend.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

use crate::constants::session;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    /// Value for `DBUS_SESSION_BUS_ADDRESS`, if known
    pub session_bus_address: Option<String>,
}

impl Environment {
    /// Inherit the bus address from our own environment, or discover it
    pub fn discover() -> Self {
        if let Ok(address) = std::env::var(session::BUS_ADDRESS_VAR)
            && !address.is_empty()
        {
            debug!(address = %address, "Using inherited session bus address");
            return Self {
                session_bus_address: Some(address),
            };
        }

        let session_bus_address = runtime_dir_bus().or_else(session_process_bus);
        match &session_bus_address {
            Some(address) => info!(address = %address, "Linked to desktop session bus"),
            None => warn!("Could not find the desktop session bus, settings commands may fail"),
        }

        Self {
            session_bus_address,
        }
    }

    /// Apply this environment to a child process
    pub fn configure(&self, command: &mut Command) {
        if let Some(address) = &self.session_bus_address {
            command.env(session::BUS_ADDRESS_VAR, address);
        }
    }
}

/// `unix:path=/run/user/<uid>/bus` when that socket exists
fn runtime_dir_bus() -> Option<String> {
    let bus = runtime_bus_path()?;
    bus.exists().then(|| format!("unix:path={}", bus.display()))
}

#[cfg(unix)]
fn runtime_bus_path() -> Option<PathBuf> {
    let uid = nix::unistd::getuid();
    Some(Path::new(session::RUNTIME_ROOT).join(uid.to_string()).join("bus"))
}

#[cfg(not(unix))]
fn runtime_bus_path() -> Option<PathBuf> {
    None
}

/// Read the bus address out of the running desktop session process
fn session_process_bus() -> Option<String> {
    let user = current_user()?;
    let output = Command::new("pgrep")
        .args(["-u", &user, session::SESSION_PROCESS])
        .output()
        .inspect_err(|e| debug!(error = %e, "pgrep unavailable"))
        .ok()?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    let pid = stdout.split_whitespace().next()?;

    let environ = fs::read(format!("/proc/{pid}/environ"))
        .inspect_err(|e| debug!(pid = pid, error = %e, "Cannot read session environment"))
        .ok()?;
    bus_address_from_environ(&environ)
}

#[cfg(unix)]
fn current_user() -> Option<String> {
    nix::unistd::User::from_uid(nix::unistd::getuid())
        .ok()
        .flatten()
        .map(|user| user.name)
}

#[cfg(not(unix))]
fn current_user() -> Option<String> {
    None
}

/// Find the bus address in a NUL-separated `/proc/<pid>/environ` blob
fn bus_address_from_environ(environ: &[u8]) -> Option<String> {
    environ
        .split(|&b| b == 0)
        .filter_map(|entry| std::str::from_utf8(entry).ok())
        .find_map(|entry| {
            entry
                .strip_prefix(session::BUS_ADDRESS_VAR)
                .and_then(|rest| rest.strip_prefix('='))
                .map(str::to_string)
        })
        .filter(|address| !address.is_empty())
}
