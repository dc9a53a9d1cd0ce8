//! The static, population-ranked city list searched by the autocomplete.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use std::{fmt::Debug, path::PathBuf, sync::Arc, time::Duration};
use tokio::sync::OnceCell;

use crate::model::CityRecord;

const BUNDLED_CITIES: &str = include_str!("../data/cities.json");

/// Where the catalog comes from. Entries must already be sorted by population, descending.
#[async_trait]
pub trait CatalogSource: Send + Sync + Debug {
    async fn load(&self) -> Result<Vec<CityRecord>>;
}

/// The list compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledCatalog;

#[async_trait]
impl CatalogSource for BundledCatalog {
    async fn load(&self) -> Result<Vec<CityRecord>> {
        serde_json::from_str(BUNDLED_CITIES).context("Failed to parse bundled city list")
    }
}

#[derive(Debug, Clone)]
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for FileCatalog {
    async fn load(&self) -> Result<Vec<CityRecord>> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read city list: {}", self.path.display()))?;

        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse city list: {}", self.path.display()))
    }
}

#[derive(Debug, Clone)]
pub struct HttpCatalog {
    url: String,
    http: Client,
}

impl HttpCatalog {
    pub fn new(url: String, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for the city list")?;

        Ok(Self { url, http })
    }
}

#[async_trait]
impl CatalogSource for HttpCatalog {
    async fn load(&self) -> Result<Vec<CityRecord>> {
        let res = self
            .http
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("Failed to request city list from {}", self.url))?;

        let status = res.status();
        if !status.is_success() {
            return Err(anyhow!("City list request failed with status {status}"));
        }

        res.json().await.context("Failed to parse city list JSON")
    }
}

/// Loads the catalog at most once per session.
///
/// A failed load is logged and remembered as an empty catalog, so search
/// simply finds nothing.
#[derive(Debug)]
pub struct CatalogLoader {
    source: Box<dyn CatalogSource>,
    cities: OnceCell<Arc<[CityRecord]>>,
}

impl CatalogLoader {
    pub fn new(source: Box<dyn CatalogSource>) -> Self {
        Self { source, cities: OnceCell::new() }
    }

    pub fn bundled() -> Self {
        Self::new(Box::new(BundledCatalog))
    }

    pub async fn cities(&self) -> Arc<[CityRecord]> {
        self.cities
            .get_or_init(|| async {
                match self.source.load().await {
                    Ok(cities) => {
                        tracing::debug!("Loaded {} cities", cities.len());
                        Arc::from(cities)
                    }
                    Err(e) => {
                        tracing::error!("Failed to load cities: {e:#}");
                        Arc::from(Vec::new())
                    }
                }
            })
            .await
            .clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.cities.initialized()
    }
}
