//! Application-wide constants
//!
//! This module contains all magic numbers and string literals used throughout
//! the application, providing a single source of truth for constant values.

/// Configuration file location and defaults
pub mod config {
    /// Directory under the XDG config dir
    pub const APP_DIR: &str = "wallcycle";

    /// Config file name
    pub const FILENAME: &str = "config.json";

    pub const DEFAULT_BASE_CYCLE: &str = "cycle24hour";

    pub const DEFAULT_INTERVAL_MINUTES: u64 = 15;

    /// One week
    pub const MAX_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

    /// Root of the local category tree (relative to the working directory)
    pub const DEFAULT_CATEGORIES_DIR: &str = "categories";

    /// Where online wallpapers are downloaded (relative to the working directory)
    pub const DEFAULT_DOWNLOAD_DIR: &str = "temp";
}

/// Hour boundaries for time-of-day buckets (24h clock, start inclusive)
pub mod daytime {
    pub const MORNING_START: u32 = 5;
    pub const AFTERNOON_START: u32 = 12;
    pub const EVENING_START: u32 = 17;
    pub const NIGHT_START: u32 = 21;
}

/// GNOME settings schemas and keys
pub mod gnome {
    pub const INTERFACE_SCHEMA: &str = "org.gnome.desktop.interface";
    pub const BACKGROUND_SCHEMA: &str = "org.gnome.desktop.background";

    pub const COLOR_SCHEME_KEY: &str = "color-scheme";
    pub const GTK_THEME_KEY: &str = "gtk-theme";

    pub const PICTURE_URI_KEY: &str = "picture-uri";
    pub const PICTURE_URI_DARK_KEY: &str = "picture-uri-dark";

    /// Substring marking a dark color scheme or theme name
    pub const DARK_MARKER: &str = "dark";

    pub const GSETTINGS_BIN: &str = "gsettings";
    pub const DCONF_BIN: &str = "dconf";
}

/// Session bus discovery
pub mod session {
    pub const BUS_ADDRESS_VAR: &str = "DBUS_SESSION_BUS_ADDRESS";

    /// Per-user runtime directory root (`/run/user/<uid>/bus`)
    pub const RUNTIME_ROOT: &str = "/run/user";

    pub const SESSION_PROCESS: &str = "gnome-session";
}

/// Local wallpaper pool
pub mod assets {
    /// Accepted image extensions (compared case-insensitively)
    pub const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

    /// Prefix of downloaded online wallpapers
    pub const ONLINE_PREFIX: &str = "online";

    /// Fallback extension when the image URL path carries none
    pub const DEFAULT_EXTENSION: &str = "jpg";

    /// Range of the random filename suffix (4 digits)
    pub const SUFFIX_MIN: u16 = 1000;
    pub const SUFFIX_MAX: u16 = 9999;
}

/// Remote HTTP endpoints
pub mod http {
    pub const GEOLOCATION_URL: &str = "http://ip-api.com/json/";
    pub const WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
    pub const UNSPLASH_RANDOM_URL: &str = "https://api.unsplash.com/photos/random";

    pub const UNSPLASH_ORIENTATION: &str = "landscape";

    /// Timeout for the image search and download requests (seconds)
    pub const FETCH_TIMEOUT_SECS: u64 = 10;
}
