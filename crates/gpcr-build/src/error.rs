//! Fatal and recoverable outcomes of a protein build
//!
//! [`BuildError`] aborts the whole import. [`SkipReason`] describes a unit
//! (line, family, protein, alias, gene) that was logged and passed over.

use gpcr_common::GpcrError;
use thiserror::Error;

use crate::models::ROOT_FAMILY_SLUG;
use crate::store::StoreError;
use crate::uniprot::RecordError;

pub type BuildResult<T> = Result<T, BuildError>;

/// Errors that stop the import
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Family {} not found, aborting", ROOT_FAMILY_SLUG)]
    MissingRootFamily,

    #[error("Residue numbering scheme '{slug}' (line {line}) not found, aborting")]
    UnknownNumberingScheme { slug: String, line: usize },

    #[error("No residue numbering scheme specified in source data before line {line}, aborting")]
    NoNumberingScheme { line: usize },

    #[error(transparent)]
    Input(#[from] GpcrError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Record source setup failed: {0}")]
    RecordSource(#[from] RecordError),
}

/// Why a single unit of work was skipped
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("parent family of '{family}' not found")]
    ParentNotFound { family: String },

    #[error("failed creating protein family '{family}': {message}")]
    FamilyNotPersisted { family: String, message: String },

    #[error("protein line has {fields} fields, expected at least 32")]
    MalformedProteinLine { fields: usize },

    #[error("no accession code for protein '{protein}'")]
    MissingAccession { protein: String },

    #[error("protein with accession {accession} already exists")]
    AlreadyImported { accession: String },

    #[error("failed parsing record for {accession}: {message}")]
    RecordUnavailable { accession: String, message: String },

    #[error("failed creating {entity} for {accession}: {message}")]
    DependencyNotPersisted {
        entity: &'static str,
        accession: String,
        message: String,
    },

    #[error("failed creating protein {accession}: {message}")]
    ProteinNotPersisted { accession: String, message: String },
}
