//! Storage seam for the protein family schema
//!
//! The builder only needs four shapes of operation: get-or-create by a unique
//! key, plain create, existence checks, and lookup by primary key.
//! [`ProteinStore`] spells those out per table. Two implementations exist:
//!
//! - [`PgStore`]: PostgreSQL through sqlx, one short transaction per call
//! - [`MemoryStore`]: process-local tables for dry runs and tests

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    Gene, GetOrCreate, NewFamily, NewProtein, Protein, ProteinAlias, ProteinConformation,
    ProteinFamily, ProteinSegment, ProteinSequenceType, ProteinSource, ProteinState,
    ResidueNumberingScheme, Species,
};

pub use memory::MemoryStore;
pub use postgres::{create_pool, DbConfig, PgStore};

/// Storage operation errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database query failed: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Database configuration error: {0}. Check DATABASE_URL and connection settings.")]
    Config(String),

    #[error("{0}")]
    Duplicate(String),

    #[error("{0}")]
    Constraint(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn duplicate(table: &str, key: &str) -> Self {
        Self::Duplicate(format!("{} '{}' already exists", table, key))
    }

    pub fn too_long(column: &str, value: &str, max: usize) -> Self {
        Self::Constraint(format!(
            "{} '{}' exceeds {} characters",
            column, value, max
        ))
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence operations used by the protein builder
#[async_trait]
pub trait ProteinStore: Send + Sync {
    /// Get-or-create a family keyed by slug
    async fn get_or_create_family(&self, family: NewFamily)
        -> StoreResult<GetOrCreate<ProteinFamily>>;

    async fn create_family(&self, family: NewFamily) -> StoreResult<ProteinFamily>;

    /// The family without a parent
    async fn root_family(&self) -> StoreResult<Option<ProteinFamily>>;

    async fn family_by_id(&self, id: Uuid) -> StoreResult<Option<ProteinFamily>>;

    /// First family carrying exactly this name, anywhere in the tree
    async fn family_by_name(&self, name: &str) -> StoreResult<Option<ProteinFamily>>;

    async fn get_or_create_segment(
        &self,
        slug: &str,
        category: &str,
        name: &str,
    ) -> StoreResult<GetOrCreate<ProteinSegment>>;

    async fn get_or_create_scheme(
        &self,
        slug: &str,
        short_name: &str,
        name: &str,
    ) -> StoreResult<GetOrCreate<ResidueNumberingScheme>>;

    async fn scheme_by_slug(&self, slug: &str) -> StoreResult<Option<ResidueNumberingScheme>>;

    async fn get_or_create_source(&self, name: &str) -> StoreResult<GetOrCreate<ProteinSource>>;

    /// Keyed by latin name; the common name only applies on insert
    async fn get_or_create_species(
        &self,
        latin_name: &str,
        common_name: &str,
    ) -> StoreResult<GetOrCreate<Species>>;

    async fn get_or_create_sequence_type(
        &self,
        slug: &str,
        name: &str,
    ) -> StoreResult<GetOrCreate<ProteinSequenceType>>;

    async fn get_or_create_state(&self, slug: &str, name: &str)
        -> StoreResult<GetOrCreate<ProteinState>>;

    async fn protein_exists(&self, accession: &str) -> StoreResult<bool>;

    async fn create_protein(&self, protein: NewProtein) -> StoreResult<Protein>;

    async fn create_conformation(
        &self,
        protein_id: Uuid,
        state_id: Uuid,
    ) -> StoreResult<ProteinConformation>;

    async fn create_alias(
        &self,
        protein_id: Uuid,
        name: &str,
        position: i32,
    ) -> StoreResult<ProteinAlias>;

    async fn create_gene(&self, species_id: Uuid, name: &str, position: i32) -> StoreResult<Gene>;

    async fn link_gene(&self, gene_id: Uuid, protein_id: Uuid) -> StoreResult<()>;
}
