//! Wallpaper sources
//!
//! - **local**: random pick from `categories/<base_cycle>/<category>/`
//! - **online**: Unsplash search, downloaded into the download folder

pub mod local;
pub mod online;

use std::path::PathBuf;

pub use local::LocalPool;
pub use online::UnsplashFetcher;

/// Resolves a wallpaper file for a category
pub trait AssetProvider {
    /// `None` when nothing usable exists (or could be fetched) for `category`
    fn resolve(&self, category: &str) -> Option<PathBuf>;
}
