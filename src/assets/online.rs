use anyhow::{Context, Result, bail};
use rand::Rng;
use reqwest::Url;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use super::AssetProvider;
use crate::constants::{assets, http};

#[derive(Debug, Deserialize)]
struct UnsplashPhoto {
    urls: UnsplashUrls,
}

#[derive(Debug, Deserialize)]
struct UnsplashUrls {
    full: String,
}

/// Downloads a random Unsplash photo for the category on every call
///
/// Files accumulate in the download folder; nothing is ever cleaned up.
pub struct UnsplashFetcher {
    client: Client,
    endpoint: String,
    access_key: String,
    dest: PathBuf,
}

impl UnsplashFetcher {
    pub fn new(access_key: Option<String>, dest: impl Into<PathBuf>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(http::FETCH_TIMEOUT_SECS))
            .build()
            .context("Failed to build Unsplash HTTP client")?;
        Ok(Self {
            client,
            endpoint: http::UNSPLASH_RANDOM_URL.to_string(),
            access_key: access_key.unwrap_or_default(),
            dest: dest.into(),
        })
    }

    /// Search, download and store one image; `None` on any failure
    pub fn fetch(&self, category: &str) -> Option<PathBuf> {
        match self.try_fetch(category) {
            Ok(path) => {
                info!(category = category, path = %path.display(), "Downloaded online wallpaper");
                Some(path)
            }
            Err(e) => {
                warn!(category = category, error = %format!("{e:#}"), "Failed to fetch online wallpaper");
                None
            }
        }
    }

    fn try_fetch(&self, category: &str) -> Result<PathBuf> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client_id", self.access_key.as_str()),
                ("query", category),
                ("orientation", http::UNSPLASH_ORIENTATION),
            ])
            .send()
            .context("Unsplash request failed")?;

        if !response.status().is_success() {
            bail!("Unsplash API returned status {}", response.status());
        }

        let photo: UnsplashPhoto = response.json().context("Failed to parse Unsplash response")?;
        let image_url = photo.urls.full;

        let image = self
            .client
            .get(&image_url)
            .send()
            .context("Image download failed")?;
        if !image.status().is_success() {
            bail!("Image download returned status {}", image.status());
        }
        let bytes = image.bytes().context("Failed to read image body")?;

        fs::create_dir_all(&self.dest)
            .with_context(|| format!("Failed to create {}", self.dest.display()))?;

        let suffix = rand::thread_rng().gen_range(assets::SUFFIX_MIN..=assets::SUFFIX_MAX);
        let path = self.dest.join(online_filename(category, &image_url, suffix));
        fs::write(&path, &bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}

impl AssetProvider for UnsplashFetcher {
    fn resolve(&self, category: &str) -> Option<PathBuf> {
        self.fetch(category)
    }
}

/// Extension of the image URL path, ignoring the query string
fn url_extension(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|url| {
            Path::new(url.path())
                .extension()
                .and_then(|ext| ext.to_str())
                .map(str::to_lowercase)
        })
        .filter(|ext| !ext.is_empty())
        .unwrap_or_else(|| assets::DEFAULT_EXTENSION.to_string())
}

/// `online_<category>_<suffix>.<ext>`
fn online_filename(category: &str, image_url: &str, suffix: u16) -> String {
    let category = category.replace(['/', '\\'], "_");
    format!(
        "{}_{}_{}.{}",
        assets::ONLINE_PREFIX,
        category,
        suffix,
        url_extension(image_url)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_extension_from_path() {
        assert_eq!(url_extension("https://images.example.com/photo.JPG?w=100"), "jpg");
        assert_eq!(url_extension("https://images.example.com/a/b.png"), "png");
    }

    #[test]
    fn test_url_extension_default() {
        assert_eq!(
            url_extension("https://images.unsplash.com/photo-1500?ixid=abc&fm=jpg&q=85"),
            "jpg"
        );
        assert_eq!(url_extension("not a url"), "jpg");
    }

    #[test]
    fn test_online_filename() {
        assert_eq!(
            online_filename("rainy", "https://cdn.example.com/x.png", 4821),
            "online_rainy_4821.png"
        );
        assert_eq!(
            online_filename("city/night", "https://images.unsplash.com/photo-1", 1000),
            "online_city_night_1000.jpg"
        );
    }

    #[test]
    fn test_photo_parsing() {
        let photo: UnsplashPhoto = serde_json::from_str(
            r#"{
                "id": "abc",
                "urls": {
                    "raw": "https://images.unsplash.com/photo-1?ixid=1",
                    "full": "https://images.unsplash.com/photo-1?ixid=1&q=85",
                    "regular": "https://images.unsplash.com/photo-1?w=1080"
                }
            }"#,
        )
        .unwrap();
        assert_eq!(photo.urls.full, "https://images.unsplash.com/photo-1?ixid=1&q=85");
    }

    #[test]
    fn test_fetch_failure_is_none() {
        let dir = tempfile::TempDir::new().unwrap();
        let dest = dir.path().join("temp");
        let mut fetcher = UnsplashFetcher::new(Some("key".to_string()), &dest).unwrap();
        fetcher.endpoint = "http://127.0.0.1:9/photos/random".to_string();

        assert_eq!(fetcher.resolve("rainy"), None);
        assert!(!dest.exists());
    }
}
