//! GPCR protein family builder
//!
//! Loads the protein family taxonomy and the receptors it lists into the
//! GPCR database.
//!
//! # Inputs
//!
//! - `protein_data/proteins_and_families.txt`: indented family tree with
//!   quoted receptor rows
//! - `protein_data/segments.txt` and
//!   `residue_data/generic_numbers/schemes.txt`: reference rows
//! - UniProt text entries, from `uniprot/txt/` or the UniProt REST API
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use gpcr_build::{BuildConfig, BuildPipeline, MemoryStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = BuildConfig::default().with_data_dir("./data").with_offline(true);
//!     let pipeline = BuildPipeline::from_config(Arc::new(MemoryStore::new()), config)?;
//!     let report = pipeline.run().await?;
//!     println!("{} proteins created", report.proteins_created);
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod config;
pub mod error;
pub mod hierarchy;
pub mod loader;
pub mod models;
pub mod pipeline;
pub mod reference;
pub mod report;
pub mod store;
pub mod uniprot;

pub use config::BuildConfig;
pub use error::{BuildError, BuildResult, SkipReason};
pub use loader::{FamilyResolution, ImportOutcome, Loader};
pub use pipeline::BuildPipeline;
pub use report::BuildReport;
pub use store::{MemoryStore, PgStore, ProteinStore};
pub use uniprot::{RecordParser, RecordSource, UniProtRecord};
