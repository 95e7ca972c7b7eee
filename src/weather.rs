//! Weather lookup: IP geolocation followed by a current-weather query

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use crate::constants::http;

/// Weather-driven categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherCondition {
    Rainy,
    Cloudy,
    Sunny,
}

impl WeatherCondition {
    /// Classify a provider condition such as "Rain" or "Clouds"
    pub fn classify(main: &str) -> Option<Self> {
        let main = main.to_lowercase();
        if main.contains("rain") {
            Some(Self::Rainy)
        } else if main.contains("cloud") {
            Some(Self::Cloudy)
        } else if main.contains("clear") {
            Some(Self::Sunny)
        } else {
            None
        }
    }

    pub fn category(self) -> &'static str {
        match self {
            Self::Rainy => "rainy",
            Self::Cloudy => "cloudy",
            Self::Sunny => "sunny",
        }
    }
}

pub trait WeatherLookup {
    /// `Ok(None)` when the reported condition has no matching category
    fn current_condition(&self) -> Result<Option<WeatherCondition>>;
}

#[derive(Debug, Deserialize)]
struct GeoLocation {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct WeatherReport {
    weather: Vec<WeatherEntry>,
}

#[derive(Debug, Deserialize)]
struct WeatherEntry {
    main: String,
}

impl WeatherReport {
    fn condition(&self) -> Option<WeatherCondition> {
        self.weather
            .first()
            .and_then(|entry| WeatherCondition::classify(&entry.main))
    }
}

/// ip-api.com + OpenWeatherMap
pub struct OpenWeather {
    client: Client,
    api_key: String,
}

impl OpenWeather {
    pub fn new(api_key: Option<String>) -> Result<Self> {
        // These requests carry no timeout; a stalled lookup stalls the tick.
        let client = Client::builder()
            .timeout(None)
            .build()
            .context("Failed to build weather HTTP client")?;
        Ok(Self {
            client,
            api_key: api_key.unwrap_or_default(),
        })
    }

    fn locate(&self) -> Result<GeoLocation> {
        self.client
            .get(http::GEOLOCATION_URL)
            .send()
            .context("Geolocation request failed")?
            .json()
            .context("Failed to parse geolocation response")
    }
}

impl WeatherLookup for OpenWeather {
    fn current_condition(&self) -> Result<Option<WeatherCondition>> {
        let location = self.locate()?;
        debug!(lat = location.lat, lon = location.lon, "Resolved location");

        let report: WeatherReport = self
            .client
            .get(http::WEATHER_URL)
            .query(&[
                ("lat", location.lat.to_string()),
                ("lon", location.lon.to_string()),
                ("appid", self.api_key.clone()),
            ])
            .send()
            .context("Weather request failed")?
            .json()
            .context("Failed to parse weather response")?;

        Ok(report.condition())
    }
}
