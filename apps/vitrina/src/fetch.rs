//! # Catalog Source
//!
//! Resolves the configured source into a loaded catalog.
//!
//! Local files go straight to the core loader. Shared documents are
//! downloaded into a temp file first; the temp file is deleted as soon as
//! the load finishes. Every failure ends up as `LoadOutcome::SourceUnavailable`.

use crate::config::{AppConfig, SourceConfig};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::NamedTempFile;
use vitrina_core::primitives::MAX_SOURCE_FILE_SIZE;
use vitrina_core::{CatalogLoader, LoadOutcome, VitrinaError};

/// Timeout for a whole download.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Rewrite a shared-document URL into a direct download URL.
///
/// `https://docs.google.com/spreadsheets/d/{ID}/edit?usp=sharing` becomes
/// `https://drive.google.com/uc?export=download&id={ID}`.
/// URLs without a `/d/{ID}` segment are returned unchanged.
#[must_use]
pub fn direct_download_url(shared: &str) -> String {
    let file_id = shared
        .split_once("/d/")
        .map(|(_, rest)| rest.split(['/', '?', '#']).next().unwrap_or_default())
        .filter(|id| !id.is_empty());

    match file_id {
        Some(id) => format!("https://drive.google.com/uc?export=download&id={}", id),
        None => shared.to_string(),
    }
}

/// Temp file suffix for a download, so the loader picks the right reader.
fn suffix_for(url: &str) -> &'static str {
    let lower = url.to_ascii_lowercase();
    if lower.contains("format=csv") || lower.ends_with(".csv") {
        ".csv"
    } else {
        ".xlsx"
    }
}

/// Loads the catalog from wherever the configuration points.
#[derive(Debug, Clone)]
pub struct StoreSource {
    origin: SourceConfig,
    loader: CatalogLoader,
    http: reqwest::Client,
}

impl StoreSource {
    /// Source for an application config.
    #[must_use]
    pub fn new(config: &AppConfig) -> Self {
        Self::from_parts(config.source.clone(), config.loader())
    }

    /// Source from an origin and a loader.
    #[must_use]
    pub fn from_parts(origin: SourceConfig, loader: CatalogLoader) -> Self {
        let http = reqwest::Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            origin,
            loader,
            http,
        }
    }

    /// Where this source reads from.
    #[must_use]
    pub fn origin(&self) -> &SourceConfig {
        &self.origin
    }

    /// Load the catalog. Never fails; see `LoadOutcome`.
    ///
    /// Spreadsheet parsing runs on the blocking pool.
    pub async fn load(&self) -> LoadOutcome {
        let outcome = match &self.origin {
            SourceConfig::Path(path) => self.parse_blocking(path.clone(), None).await,
            SourceConfig::RemoteUrl(url) => match self.download_to_tempfile(url).await {
                Ok(file) => {
                    let path = file.path().to_path_buf();
                    self.parse_blocking(path, Some(file)).await
                }
                Err(e) => LoadOutcome::SourceUnavailable(e),
            },
        };

        match &outcome {
            LoadOutcome::Loaded { catalog, rejected } => {
                tracing::info!(
                    source = %self.origin,
                    products = catalog.len(),
                    rejected = *rejected,
                    "Catalog loaded: {} products",
                    catalog.len()
                );
            }
            LoadOutcome::SourceUnavailable(e) => {
                tracing::warn!(source = %self.origin, error = %e, "Catalog source unavailable");
            }
        }
        outcome
    }

    /// Run the loader on `path` off the async workers. `keep` is held until
    /// parsing ends so a downloaded temp file outlives the read.
    async fn parse_blocking(&self, path: PathBuf, keep: Option<NamedTempFile>) -> LoadOutcome {
        let loader = self.loader.clone();
        tokio::task::spawn_blocking(move || {
            let outcome = loader.load_path(&path);
            drop(keep);
            outcome
        })
        .await
        .unwrap_or_else(|e| {
            LoadOutcome::SourceUnavailable(VitrinaError::SourceUnavailable(format!(
                "catalog parse task failed: {}",
                e
            )))
        })
    }

    /// Download a shared document's bytes.
    pub async fn download(&self, shared_url: &str) -> Result<Vec<u8>, VitrinaError> {
        let url = direct_download_url(shared_url);
        tracing::debug!(url = %url, "Downloading catalog");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| VitrinaError::SourceUnavailable(format!("download failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(VitrinaError::SourceUnavailable(format!(
                "download returned HTTP {}",
                status.as_u16()
            )));
        }
        if response
            .content_length()
            .is_some_and(|len| len > MAX_SOURCE_FILE_SIZE)
        {
            return Err(VitrinaError::SourceUnavailable(
                "remote file exceeds maximum size".to_string(),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| VitrinaError::SourceUnavailable(format!("download failed: {}", e)))?;
        if bytes.len() as u64 > MAX_SOURCE_FILE_SIZE {
            return Err(VitrinaError::SourceUnavailable(
                "remote file exceeds maximum size".to_string(),
            ));
        }
        Ok(bytes.to_vec())
    }

    /// Download into a temp file that is removed on drop.
    pub async fn download_to_tempfile(
        &self,
        shared_url: &str,
    ) -> Result<NamedTempFile, VitrinaError> {
        let bytes = self.download(shared_url).await?;

        let mut file = tempfile::Builder::new()
            .prefix("vitrina-")
            .suffix(suffix_for(shared_url))
            .tempfile()
            .map_err(|e| VitrinaError::IoError(format!("cannot create temp file: {}", e)))?;
        file.write_all(&bytes)
            .and_then(|()| file.flush())
            .map_err(|e| VitrinaError::IoError(format!("cannot write temp file: {}", e)))?;
        Ok(file)
    }
}

// =============================================================================
// TESTS
// =============================================================================
