use anyhow::{Context, Result, bail};
use rand::seq::SliceRandom;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

use super::AssetProvider;
use crate::constants::assets::IMAGE_EXTENSIONS;

/// Local category tree rooted at `<root>/<base_cycle>`
pub struct LocalPool {
    root: PathBuf,
    base_cycle: String,
}

impl LocalPool {
    pub fn new(root: impl Into<PathBuf>, base_cycle: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_cycle: base_cycle.into(),
        }
    }

    pub fn category_dir(&self, category: &str) -> PathBuf {
        self.root.join(&self.base_cycle).join(category)
    }

    /// Random wallpaper from the category folder
    pub fn pick(&self, category: &str) -> Option<PathBuf> {
        let folder = self.category_dir(category);
        if !folder.is_dir() {
            warn!(folder = %folder.display(), "Category folder not found");
            return None;
        }

        let wallpapers = match list_wallpapers(&folder) {
            Ok(wallpapers) => wallpapers,
            Err(e) => {
                warn!(folder = %folder.display(), error = %format!("{e:#}"), "Failed to list category folder");
                return None;
            }
        };

        let choice = wallpapers.choose(&mut rand::thread_rng()).cloned();
        match &choice {
            Some(path) => debug!(
                path = %path.display(),
                candidates = wallpapers.len(),
                "Picked wallpaper"
            ),
            None => warn!(folder = %folder.display(), "No wallpapers found"),
        }
        choice
    }

    /// Create an empty category folder; existing folders are left alone
    ///
    /// `name` must stay inside the base cycle: absolute paths and `..` are rejected.
    pub fn add_category(&self, name: &str) -> Result<PathBuf> {
        if !is_category_name(name) {
            warn!(category = name, "Refusing category name outside the base cycle folder");
            bail!("invalid category name {name:?}");
        }
        let folder = self.category_dir(name);
        fs::create_dir_all(&folder)
            .with_context(|| format!("Failed to create category folder {}", folder.display()))?;
        info!(category = name, folder = %folder.display(), "Category ready, add wallpapers inside it");
        Ok(folder)
    }
}

impl AssetProvider for LocalPool {
    fn resolve(&self, category: &str) -> Option<PathBuf> {
        self.pick(category)
    }
}

/// Non-empty relative path made of plain components only
fn is_category_name(name: &str) -> bool {
    let path = Path::new(name);
    path.components().next().is_some()
        && path.components().all(|part| matches!(part, Component::Normal(_)))
}

pub fn is_wallpaper(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
}

/// Image files directly inside `folder` (no recursion)
pub fn list_wallpapers(folder: &Path) -> Result<Vec<PathBuf>> {
    let mut wallpapers = Vec::new();
    for entry in fs::read_dir(folder)
        .with_context(|| format!("Failed to read {}", folder.display()))?
    {
        let path = entry?.path();
        if path.is_file() && is_wallpaper(&path) {
            wallpapers.push(path);
        }
    }
    wallpapers.sort();
    Ok(wallpapers)
}
