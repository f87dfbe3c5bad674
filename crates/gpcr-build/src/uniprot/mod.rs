//! UniProt records
//!
//! Parsing of the flat-text entry format and lookup of entries in the local
//! cache or the remote REST endpoint.

pub mod fetch;
pub mod models;
pub mod parser;

pub use fetch::RecordSource;
pub use models::{ReviewStatus, UniProtRecord};
pub use parser::RecordParser;

use thiserror::Error;

/// Why a record could not be produced for an accession
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Invalid accession code '{0}'")]
    InvalidAccession(String),

    #[error("Failed reading record: {0}")]
    Read(#[source] std::io::Error),

    #[error("Failed reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed building HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Failed downloading {accession}: {source}")]
    Http {
        accession: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("No cached record for {0} and remote lookup is disabled")]
    NotCached(String),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Record has no {0}")]
    Incomplete(&'static str),
}
