use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use crate::{
    catalog::{BundledCatalog, CatalogLoader, CatalogSource, FileCatalog, HttpCatalog},
    provider::http::{DEFAULT_TIMEOUT_SECS, DEFAULT_WIND_ENDPOINT, HttpWindFetcher},
    storage::{FileStore, KeyValueStore},
};

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_base_url = "https://wind.example.com/api"
/// catalog_path = "/usr/share/windy/cities.json"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Base URL of the wind data API.
    pub api_base_url: Option<String>,

    /// Path of the wind endpoint below `api_base_url`, "/wind" when unset.
    pub wind_endpoint: Option<String>,

    pub request_timeout_secs: Option<u64>,

    /// City list on disk. Takes precedence over `catalog_url`.
    pub catalog_path: Option<PathBuf>,

    pub catalog_url: Option<String>,

    /// Directory of the favourites store; platform data dir when unset.
    pub storage_dir: Option<PathBuf>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "windy-days", "windy")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    pub fn api_base_url(&self) -> Result<&str> {
        self.api_base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No wind API configured.\n\
                     Hint: run `windy configure` and enter the API base URL."
                )
            })
    }

    pub fn wind_endpoint(&self) -> &str {
        self.wind_endpoint.as_deref().unwrap_or(DEFAULT_WIND_ENDPOINT)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn storage_dir(&self) -> Result<PathBuf> {
        match &self.storage_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::project_dirs()?.data_dir().join("storage")),
        }
    }

    pub fn wind_fetcher(&self) -> Result<HttpWindFetcher> {
        HttpWindFetcher::new(self.api_base_url()?, self.wind_endpoint(), self.request_timeout())
    }

    pub fn catalog_source(&self) -> Result<Box<dyn CatalogSource>> {
        let source: Box<dyn CatalogSource> = match (&self.catalog_path, &self.catalog_url) {
            (Some(path), _) => Box::new(FileCatalog::new(path)),
            (None, Some(url)) => Box::new(HttpCatalog::new(url.clone(), self.request_timeout())?),
            (None, None) => Box::new(BundledCatalog),
        };
        Ok(source)
    }

    pub fn catalog_loader(&self) -> Result<CatalogLoader> {
        Ok(CatalogLoader::new(self.catalog_source()?))
    }

    pub fn key_value_store(&self) -> Result<Arc<dyn KeyValueStore>> {
        Ok(Arc::new(FileStore::new(self.storage_dir()?)))
    }
}
