//! Rotation settings loaded from the JSON config file
//!
//! Loaded once at startup and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::category::TimeOfDay;
use crate::constants::config::*;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no config file found at {}", .0.display())]
    Missing(PathBuf),

    #[error("failed to read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// How the category is chosen when no override is given
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Time,
    Weather,
}

/// Which settings tool is used to talk to the desktop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DesktopBackendKind {
    #[default]
    Gsettings,
    Dconf,
}

/// Time-of-day bucket -> category name
///
/// Entries are optional so a partial object still parses; a missing or empty
/// entry is reported when that bucket is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeCategories {
    #[serde(default)]
    pub morning: Option<String>,
    #[serde(default)]
    pub afternoon: Option<String>,
    #[serde(default)]
    pub evening: Option<String>,
    #[serde(default)]
    pub night: Option<String>,
}

impl Default for TimeCategories {
    /// Each bucket maps to a category of the same name
    fn default() -> Self {
        Self {
            morning: Some(TimeOfDay::Morning.name().to_string()),
            afternoon: Some(TimeOfDay::Afternoon.name().to_string()),
            evening: Some(TimeOfDay::Evening.name().to_string()),
            night: Some(TimeOfDay::Night.name().to_string()),
        }
    }
}

impl TimeCategories {
    /// Non-empty category name configured for `bucket`
    pub fn get(&self, bucket: TimeOfDay) -> Option<&str> {
        let entry = match bucket {
            TimeOfDay::Morning => &self.morning,
            TimeOfDay::Afternoon => &self.afternoon,
            TimeOfDay::Evening => &self.evening,
            TimeOfDay::Night => &self.night,
        };
        entry.as_deref().map(str::trim).filter(|name| !name.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_base_cycle")]
    pub base_cycle: String,

    #[serde(default)]
    pub mode: Mode,

    #[serde(default)]
    pub use_weather: bool,

    /// OpenWeatherMap API key
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(rename = "use_online_wallpapers", default)]
    pub use_online_assets: bool,

    #[serde(default)]
    pub unsplash_access_key: Option<String>,

    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,

    #[serde(default)]
    pub time_categories: TimeCategories,

    #[serde(default = "default_categories_dir")]
    pub categories_dir: PathBuf,

    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    #[serde(default)]
    pub desktop_backend: DesktopBackendKind,
}

fn default_base_cycle() -> String {
    DEFAULT_BASE_CYCLE.to_string()
}

fn default_interval_minutes() -> u64 {
    DEFAULT_INTERVAL_MINUTES
}

fn default_categories_dir() -> PathBuf {
    PathBuf::from(DEFAULT_CATEGORIES_DIR)
}

fn default_download_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DOWNLOAD_DIR)
}

impl Config {
    /// Fixed default location: `<config dir>/wallcycle/config.json`
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(APP_DIR);
        path.push(FILENAME);
        path
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::Missing(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_json(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate_and_clamp();

        info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(contents)
    }

    /// Repair out-of-range values and report unusable ones
    pub fn validate_and_clamp(&mut self) {
        if self.interval_minutes == 0 {
            warn!(
                interval_minutes = self.interval_minutes,
                using = DEFAULT_INTERVAL_MINUTES,
                "interval_minutes must be positive, using default"
            );
            self.interval_minutes = DEFAULT_INTERVAL_MINUTES;
        } else if self.interval_minutes > MAX_INTERVAL_MINUTES {
            warn!(
                interval_minutes = self.interval_minutes,
                max = MAX_INTERVAL_MINUTES,
                "interval_minutes exceeds maximum, clamping"
            );
            self.interval_minutes = MAX_INTERVAL_MINUTES;
        }

        if self.base_cycle.trim().is_empty() {
            warn!(using = DEFAULT_BASE_CYCLE, "base_cycle is empty, using default");
            self.base_cycle = default_base_cycle();
        }

        if self.mode == Mode::Time {
            for bucket in TimeOfDay::ALL {
                if self.time_categories.get(bucket).is_none() {
                    warn!(bucket = bucket.name(), "time_categories has no category for this time of day");
                }
            }
        }

        if self.mode == Mode::Weather && !self.use_weather {
            info!("mode is 'weather' but use_weather is off, categories follow the clock");
        }

        if self.weather_enabled() && !self.use_online_assets {
            info!("weather mode only applies to online wallpapers, local categories follow the clock");
        }

        if self.use_weather && self.api_key.as_deref().is_none_or(str::is_empty) {
            warn!("use_weather is on but api_key is missing, weather lookups will fail");
        }

        if self.use_online_assets
            && self.unsplash_access_key.as_deref().is_none_or(str::is_empty)
        {
            warn!("use_online_wallpapers is on but unsplash_access_key is missing");
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes.saturating_mul(60))
    }

    pub fn weather_enabled(&self) -> bool {
        self.mode == Mode::Weather && self.use_weather
    }
}
