use std::fmt;
use tracing::{debug, info, warn};

use super::SettingsBackend;
use crate::constants::gnome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeVariant {
    Dark,
    Light,
}

impl ThemeVariant {
    /// Dark when the setting value mentions "dark" in any case
    pub fn from_setting(value: &str) -> Self {
        if value.to_lowercase().contains(gnome::DARK_MARKER) {
            Self::Dark
        } else {
            Self::Light
        }
    }

    /// Background key used while this variant is active
    pub fn picture_key(self) -> &'static str {
        match self {
            Self::Dark => gnome::PICTURE_URI_DARK_KEY,
            Self::Light => gnome::PICTURE_URI_KEY,
        }
    }
}

impl fmt::Display for ThemeVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dark => write!(f, "dark"),
            Self::Light => write!(f, "light"),
        }
    }
}

pub trait ThemeProbe {
    /// Never fails; an unreadable theme counts as light
    fn current_theme(&self) -> ThemeVariant;
}

/// Reads `color-scheme`, then `gtk-theme` on desktops without that key
pub struct SettingsThemeProbe<'a> {
    settings: &'a dyn SettingsBackend,
}

impl<'a> SettingsThemeProbe<'a> {
    pub fn new(settings: &'a dyn SettingsBackend) -> Self {
        Self { settings }
    }
}

impl ThemeProbe for SettingsThemeProbe<'_> {
    fn current_theme(&self) -> ThemeVariant {
        match self.settings.get(gnome::INTERFACE_SCHEMA, gnome::COLOR_SCHEME_KEY) {
            Ok(scheme) => {
                debug!(color_scheme = %scheme, "Detected color-scheme");
                return ThemeVariant::from_setting(&scheme);
            }
            Err(e) => info!(error = %e, "color-scheme unavailable, checking gtk-theme instead"),
        }

        match self.settings.get(gnome::INTERFACE_SCHEMA, gnome::GTK_THEME_KEY) {
            Ok(theme) => {
                debug!(gtk_theme = %theme, "Detected gtk-theme");
                ThemeVariant::from_setting(&theme)
            }
            Err(e) => {
                warn!(error = %e, "Theme detection failed, assuming light");
                ThemeVariant::Light
            }
        }
    }
}
