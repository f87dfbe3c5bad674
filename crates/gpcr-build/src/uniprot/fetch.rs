//! Locating UniProt records
//!
//! A record is read from the local cache when present and only downloaded
//! when it is not.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};

use super::models::UniProtRecord;
use super::parser::RecordParser;
use super::RecordError;
use crate::config::BuildConfig;

/// Remote UniProt text endpoint
#[derive(Debug, Clone)]
struct RemoteSource {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteSource {
    fn record_url(&self, accession: &str) -> String {
        format!("{}/{}.txt", self.base_url.trim_end_matches('/'), accession)
    }

    async fn download(&self, accession: &str) -> Result<String, RecordError> {
        let url = self.record_url(accession);
        info!(url = %url, "Reading remote file");

        let http = |source| RecordError::Http {
            accession: accession.to_string(),
            source,
        };

        let response = self.client.get(&url).send().await.map_err(http)?;
        let response = response.error_for_status().map_err(http)?;
        response.text().await.map_err(http)
    }
}

/// Where records come from: local cache first, then the remote endpoint
#[derive(Debug, Clone)]
pub struct RecordSource {
    cache_dir: PathBuf,
    remote: Option<RemoteSource>,
    cache_remote: bool,
    parser: RecordParser,
}

impl RecordSource {
    /// Local cache only
    pub fn local(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            remote: None,
            cache_remote: false,
            parser: RecordParser::new(),
        }
    }

    /// Fall back to `{base_url}/{accession}.txt` for uncached records
    pub fn with_remote(
        mut self,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RecordError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RecordError::Client)?;
        self.remote = Some(RemoteSource {
            client,
            base_url: base_url.into(),
        });
        Ok(self)
    }

    /// Write downloaded records into the cache directory
    pub fn with_cache_remote(mut self, enabled: bool) -> Self {
        self.cache_remote = enabled;
        self
    }

    pub fn from_config(config: &BuildConfig) -> Result<Self, RecordError> {
        let source = Self::local(config.uniprot_cache_dir()).with_cache_remote(config.cache_remote);
        if config.offline {
            Ok(source)
        } else {
            source.with_remote(
                config.uniprot_url.clone(),
                Duration::from_secs(config.http_timeout_secs),
            )
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Cached file for an accession, plain text preferred over gzip
    pub fn cached_path(&self, accession: &str) -> Option<PathBuf> {
        [format!("{}.txt", accession), format!("{}.txt.gz", accession)]
            .into_iter()
            .map(|name| self.cache_dir.join(name))
            .find(|path| path.is_file())
    }

    /// Locate and parse the record for an accession
    pub async fn fetch(&self, accession: &str) -> Result<UniProtRecord, RecordError> {
        validate_accession(accession)?;

        if let Some(path) = self.cached_path(accession) {
            info!(path = %path.display(), "Reading local file");
            return self.read_local(&path).await;
        }

        let remote = self
            .remote
            .as_ref()
            .ok_or_else(|| RecordError::NotCached(accession.to_string()))?;
        let text = remote.download(accession).await?;
        let record = self.parser.parse_str(&text)?;

        if self.cache_remote {
            self.store_local(accession, &text).await;
        }

        Ok(record)
    }

    async fn read_local(&self, path: &Path) -> Result<UniProtRecord, RecordError> {
        let data = tokio::fs::read(path).await.map_err(|source| RecordError::Io {
            path: path.display().to_string(),
            source,
        })?;

        if path.extension().and_then(|ext| ext.to_str()) == Some("gz") {
            self.parser.parse_gzip(&data)
        } else {
            self.parser.parse_reader(&data[..])
        }
    }

    async fn store_local(&self, accession: &str, text: &str) {
        let path = self.cache_dir.join(format!("{}.txt", accession));
        let result = async {
            tokio::fs::create_dir_all(&self.cache_dir).await?;
            tokio::fs::write(&path, text).await
        }
        .await;

        match result {
            Ok(()) => debug!(path = %path.display(), "Cached remote record"),
            Err(e) => warn!(path = %path.display(), error = %e, "Failed caching remote record"),
        }
    }
}

/// Accessions become file names and URL segments
fn validate_accession(accession: &str) -> Result<(), RecordError> {
    let valid = !accession.is_empty()
        && accession
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(RecordError::InvalidAccession(accession.to_string()))
    }
}
