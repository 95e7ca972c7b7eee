use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use super::{SettingsBackend, ThemeProbe};
use crate::constants::gnome;

#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("wallpaper file not found: {}", .0.display())]
    WallpaperMissing(PathBuf),
}

pub trait DesktopApplier {
    /// Set `path` as the background.
    ///
    /// Only a missing file is an error; the desktop command itself is best-effort.
    fn apply(&self, path: &Path) -> Result<(), ApplyError>;
}

/// Writes `picture-uri` or `picture-uri-dark` depending on the active theme
pub struct SettingsApplier<'a> {
    settings: &'a dyn SettingsBackend,
    theme: &'a dyn ThemeProbe,
}

impl<'a> SettingsApplier<'a> {
    pub fn new(settings: &'a dyn SettingsBackend, theme: &'a dyn ThemeProbe) -> Self {
        Self { settings, theme }
    }
}

pub fn file_uri(path: &Path) -> String {
    let abs = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    format!("file://{}", abs.display())
}

impl DesktopApplier for SettingsApplier<'_> {
    fn apply(&self, path: &Path) -> Result<(), ApplyError> {
        if !path.exists() {
            return Err(ApplyError::WallpaperMissing(path.to_path_buf()));
        }

        let variant = self.theme.current_theme();
        let key = variant.picture_key();
        let uri = file_uri(path);

        match self.settings.set(gnome::BACKGROUND_SCHEMA, key, &uri) {
            Ok(()) => info!(theme = %variant, key = key, uri = %uri, "Wallpaper set"),
            Err(e) => warn!(theme = %variant, key = key, error = %e, "Failed to set wallpaper"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desktop::fake::FakeSettings;
    use crate::desktop::ThemeVariant;
    use std::fs;
    use tempfile::TempDir;

    struct FixedTheme(ThemeVariant);

    impl ThemeProbe for FixedTheme {
        fn current_theme(&self) -> ThemeVariant {
            self.0
        }
    }

    fn wallpaper(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("wall.jpg");
        fs::write(&path, b"jpeg").unwrap();
        path
    }

    #[test]
    fn test_missing_file_is_error() {
        let settings = FakeSettings::default();
        let theme = FixedTheme(ThemeVariant::Light);
        let applier = SettingsApplier::new(&settings, &theme);

        let result = applier.apply(Path::new("/nonexistent/wall.jpg"));
        assert!(matches!(result, Err(ApplyError::WallpaperMissing(_))));
        assert!(settings.writes.borrow().is_empty());
    }

    #[test]
    fn test_light_theme_uses_picture_uri() {
        let dir = TempDir::new().unwrap();
        let path = wallpaper(&dir);
        let settings = FakeSettings::default();
        let theme = FixedTheme(ThemeVariant::Light);

        SettingsApplier::new(&settings, &theme).apply(&path).unwrap();

        let writes = settings.writes.borrow();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].0, gnome::BACKGROUND_SCHEMA);
        assert_eq!(writes[0].1, "picture-uri");
        assert_eq!(writes[0].2, file_uri(&path));
    }

    #[test]
    fn test_dark_theme_uses_picture_uri_dark() {
        let dir = TempDir::new().unwrap();
        let path = wallpaper(&dir);
        let settings = FakeSettings::default();
        let theme = FixedTheme(ThemeVariant::Dark);

        SettingsApplier::new(&settings, &theme).apply(&path).unwrap();

        let writes = settings.writes.borrow();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].1, "picture-uri-dark");
    }

    #[test]
    fn test_command_failure_is_swallowed() {
        let dir = TempDir::new().unwrap();
        let path = wallpaper(&dir);
        let settings = FakeSettings {
            fail_writes: true,
            ..FakeSettings::default()
        };
        let theme = FixedTheme(ThemeVariant::Light);

        assert!(SettingsApplier::new(&settings, &theme).apply(&path).is_ok());
        assert_eq!(settings.writes.borrow().len(), 1);
    }

    #[test]
    fn test_file_uri_is_absolute() {
        let dir = TempDir::new().unwrap();
        let path = wallpaper(&dir);
        let uri = file_uri(&path);
        assert!(uri.starts_with("file:///"));
        assert!(uri.ends_with("wall.jpg"));
    }
}
