//! Build configuration
//!
//! Values come from the environment (a `.env` file is honoured) and can be
//! overridden by command-line flags.

use gpcr_common::{GpcrError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ============================================================================
// Build Configuration Constants
// ============================================================================

/// Root of the source data tree.
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Remote UniProt text endpoint; records are fetched as `{url}/{accession}.txt`.
pub const DEFAULT_UNIPROT_URL: &str = "https://rest.uniprot.org/uniprotkb";

/// State given to the initial conformation of every protein.
pub const DEFAULT_PROTEIN_STATE: &str = "inactive";

/// Timeout for a single remote record fetch.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Settings for one protein build
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    pub data_dir: PathBuf,
    pub uniprot_url: String,
    /// Never fall back to the remote source
    pub offline: bool,
    /// Save remotely fetched records into the local cache
    pub cache_remote: bool,
    pub default_protein_state: String,
    pub http_timeout_secs: u64,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            uniprot_url: DEFAULT_UNIPROT_URL.to_string(),
            offline: false,
            cache_remote: false,
            default_protein_state: DEFAULT_PROTEIN_STATE.to_string(),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl BuildConfig {
    /// Load configuration from environment and defaults
    ///
    /// Not validated here; call [`BuildConfig::validate`] once any
    /// command-line overrides have been applied.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        Ok(Self {
            data_dir: std::env::var("GPCR_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            uniprot_url: std::env::var("GPCR_UNIPROT_URL").unwrap_or(defaults.uniprot_url),
            offline: std::env::var("GPCR_OFFLINE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.offline),
            cache_remote: std::env::var("GPCR_CACHE_REMOTE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.cache_remote),
            default_protein_state: std::env::var("GPCR_DEFAULT_PROTEIN_STATE")
                .unwrap_or(defaults.default_protein_state),
            http_timeout_secs: std::env::var("GPCR_HTTP_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.http_timeout_secs),
        })
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_uniprot_url(mut self, url: impl Into<String>) -> Self {
        self.uniprot_url = url.into();
        self
    }

    pub fn with_offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    pub fn with_cache_remote(mut self, cache_remote: bool) -> Self {
        self.cache_remote = cache_remote;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(GpcrError::config("Data directory cannot be empty"));
        }
        if !self.offline && !self.uniprot_url.starts_with("http") {
            return Err(GpcrError::config(format!(
                "UniProt URL must be an http(s) URL, got '{}'",
                self.uniprot_url
            )));
        }
        if self.default_protein_state.trim().is_empty() {
            return Err(GpcrError::config("Default protein state cannot be empty"));
        }
        if self.http_timeout_secs == 0 {
            return Err(GpcrError::config("HTTP timeout must be greater than 0"));
        }
        Ok(())
    }

    /// Indented family/protein taxonomy
    pub fn protein_source_file(&self) -> PathBuf {
        self.data_path(&["protein_data", "proteins_and_families.txt"])
    }

    pub fn segment_source_file(&self) -> PathBuf {
        self.data_path(&["protein_data", "segments.txt"])
    }

    pub fn residue_numbering_scheme_source_file(&self) -> PathBuf {
        self.data_path(&["residue_data", "generic_numbers", "schemes.txt"])
    }

    /// Local UniProt text cache, one `{accession}.txt` per record
    pub fn uniprot_cache_dir(&self) -> PathBuf {
        self.data_path(&["uniprot", "txt"])
    }

    fn data_path(&self, parts: &[&str]) -> PathBuf {
        parts
            .iter()
            .fold(self.data_dir.clone(), |path, part| path.join(Path::new(part)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let config = BuildConfig::default().with_data_dir("/srv/gpcr");
        assert_eq!(
            config.protein_source_file(),
            PathBuf::from("/srv/gpcr/protein_data/proteins_and_families.txt")
        );
        assert_eq!(
            config.segment_source_file(),
            PathBuf::from("/srv/gpcr/protein_data/segments.txt")
        );
        assert_eq!(
            config.residue_numbering_scheme_source_file(),
            PathBuf::from("/srv/gpcr/residue_data/generic_numbers/schemes.txt")
        );
        assert_eq!(
            config.uniprot_cache_dir(),
            PathBuf::from("/srv/gpcr/uniprot/txt")
        );
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let config = BuildConfig::default().with_uniprot_url("ftp.uniprot.org");
        assert!(config.validate().is_err());

        // URL is irrelevant when offline
        let offline = config.with_offline(true);
        assert!(offline.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = BuildConfig {
            http_timeout_secs: 0,
            ..BuildConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_env_defers_validation_to_overrides() {
        std::env::set_var("GPCR_UNIPROT_URL", "ftp.uniprot.org");
        let loaded = BuildConfig::from_env();
        std::env::remove_var("GPCR_UNIPROT_URL");

        let config = loaded.unwrap();
        assert_eq!(config.uniprot_url, "ftp.uniprot.org");
        assert!(config.validate().is_err());
        assert!(config.with_offline(true).validate().is_ok());
    }
}
