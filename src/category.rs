//! Category resolution: explicit override > weather > time of day

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::constants::daytime;
use crate::weather::{WeatherCondition, WeatherLookup};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CategoryError {
    #[error("no category configured for the {} time slot", .0.name())]
    MissingCategoryMapping(TimeOfDay),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    pub const ALL: [TimeOfDay; 4] = [
        TimeOfDay::Morning,
        TimeOfDay::Afternoon,
        TimeOfDay::Evening,
        TimeOfDay::Night,
    ];

    /// Bucket an hour of the day (0-23); every start boundary is inclusive
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            h if (daytime::MORNING_START..daytime::AFTERNOON_START).contains(&h) => Self::Morning,
            h if (daytime::AFTERNOON_START..daytime::EVENING_START).contains(&h) => Self::Afternoon,
            h if (daytime::EVENING_START..daytime::NIGHT_START).contains(&h) => Self::Evening,
            _ => Self::Night,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
            Self::Night => "night",
        }
    }
}

/// Picks the category name for a tick
pub struct CategoryResolver<'a> {
    config: &'a Config,
    explicit: Option<String>,
    weather: Option<&'a dyn WeatherLookup>,
}

impl<'a> CategoryResolver<'a> {
    /// `weather` is only consulted when weather mode is enabled in `config`
    pub fn new(
        config: &'a Config,
        explicit: Option<String>,
        weather: Option<&'a dyn WeatherLookup>,
    ) -> Self {
        let explicit = explicit
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        Self {
            config,
            explicit,
            weather,
        }
    }

    pub fn resolve(&self, hour: u32) -> Result<String, CategoryError> {
        if let Some(name) = &self.explicit {
            debug!(category = %name, "Using explicit category");
            return Ok(name.clone());
        }

        if self.config.weather_enabled() {
            if let Some(condition) = self.weather_category() {
                return Ok(condition.category().to_string());
            }
            info!("Falling back to time-of-day category");
        }

        self.time_category(hour)
    }

    /// Explicit override or the time-of-day category; weather is never consulted
    pub fn resolve_by_time(&self, hour: u32) -> Result<String, CategoryError> {
        if let Some(name) = &self.explicit {
            debug!(category = %name, "Using explicit category");
            return Ok(name.clone());
        }
        self.time_category(hour)
    }

    /// Category for the time-of-day bucket of `hour`
    pub fn time_category(&self, hour: u32) -> Result<String, CategoryError> {
        let bucket = TimeOfDay::from_hour(hour);
        self.config
            .time_categories
            .get(bucket)
            .map(str::to_string)
            .ok_or(CategoryError::MissingCategoryMapping(bucket))
    }

    fn weather_category(&self) -> Option<WeatherCondition> {
        let Some(lookup) = self.weather else {
            warn!("Weather mode enabled without a weather lookup");
            return None;
        };

        match lookup.current_condition() {
            Ok(Some(condition)) => {
                info!(condition = condition.category(), "Weather category");
                Some(condition)
            }
            Ok(None) => {
                info!("Weather condition not recognized");
                None
            }
            Err(e) => {
                warn!(error = %format!("{e:#}"), "Weather lookup failed");
                None
            }
        }
    }
}
