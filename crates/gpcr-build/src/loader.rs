//! Reconciling taxonomy lines with the database
//!
//! [`Loader::resolve_family`] places a family in the tree, reusing any family
//! that already carries the same name. [`Loader::import_protein`] turns one
//! accession into a protein with its conformation, aliases and genes.
//! Everything except a missing root family is recoverable: the unit is
//! logged and reported as a [`SkipReason`].

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::{BuildError, BuildResult, SkipReason};
use crate::hierarchy::HierarchyCursor;
use crate::models::{
    title_case, NewFamily, NewProtein, Protein, ProteinFamily, ResidueNumberingScheme,
    WILD_TYPE_NAME, WILD_TYPE_SLUG,
};
use crate::store::ProteinStore;
use crate::uniprot::RecordSource;

/// How a family line was placed in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FamilyResolution {
    Created(ProteinFamily),
    /// A family with this name already existed somewhere in the tree
    Reused(ProteinFamily),
    Skipped(SkipReason),
}

impl FamilyResolution {
    pub fn family(&self) -> Option<&ProteinFamily> {
        match self {
            Self::Created(family) | Self::Reused(family) => Some(family),
            Self::Skipped(_) => None,
        }
    }
}

/// A protein row written together with its dependents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedProtein {
    pub protein: Protein,
    pub aliases: usize,
    pub genes: usize,
    /// Conformation, alias and gene rows that could not be written
    pub failures: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    Created(ImportedProtein),
    Skipped(SkipReason),
}

pub struct Loader<'a> {
    store: &'a dyn ProteinStore,
    records: &'a RecordSource,
    default_state: String,
}

impl<'a> Loader<'a> {
    pub fn new(
        store: &'a dyn ProteinStore,
        records: &'a RecordSource,
        default_state: impl Into<String>,
    ) -> Self {
        Self {
            store,
            records,
            default_state: default_state.into(),
        }
    }

    /// Find or create the family `name` at `depth` below the cursor's branch
    ///
    /// The cursor must already be at `depth`. On success the family becomes
    /// the parent for the following deeper lines, and new children extend its
    /// slug; on a skip the frame is cleared so those lines are skipped too.
    pub async fn resolve_family(
        &self,
        name: &str,
        depth: usize,
        cursor: &mut HierarchyCursor,
    ) -> BuildResult<FamilyResolution> {
        let parent_id = match self.parent_id(name, depth, cursor).await? {
            Ok(id) => id,
            Err(reason) => return Ok(self.skip_family(depth, cursor, reason)),
        };

        match self.store.family_by_name(name).await {
            Ok(Some(family)) => {
                debug!(family = %family.name, slug = %family.slug, "Reusing protein family");
                if family.parent_id == Some(parent_id) {
                    cursor.advance_past(depth, &family.slug);
                }
                cursor.record(depth, family.id, &family.slug);
                return Ok(FamilyResolution::Reused(family));
            },
            Ok(None) => {},
            Err(e) => {
                let reason = SkipReason::FamilyNotPersisted {
                    family: name.to_string(),
                    message: e.to_string(),
                };
                return Ok(self.skip_family(depth, cursor, reason));
            },
        }

        let slug = cursor.next_slug(depth);
        let new_family = NewFamily {
            slug,
            name: name.to_string(),
            parent_id: Some(parent_id),
        };

        match self.store.create_family(new_family).await {
            Ok(family) => {
                info!(family = %family.name, slug = %family.slug, "Created protein family");
                cursor.record(depth, family.id, &family.slug);
                Ok(FamilyResolution::Created(family))
            },
            Err(e) => {
                let reason = SkipReason::FamilyNotPersisted {
                    family: name.to_string(),
                    message: e.to_string(),
                };
                Ok(self.skip_family(depth, cursor, reason))
            },
        }
    }

    /// Parent for a family at `depth`: the root at depth 0, otherwise the
    /// family recorded one level up
    async fn parent_id(
        &self,
        name: &str,
        depth: usize,
        cursor: &HierarchyCursor,
    ) -> BuildResult<Result<Uuid, SkipReason>> {
        if depth == 0 {
            let root = self
                .store
                .root_family()
                .await?
                .ok_or(BuildError::MissingRootFamily)?;
            return Ok(Ok(root.id));
        }

        let not_found = || SkipReason::ParentNotFound {
            family: name.to_string(),
        };

        let Some(parent_id) = cursor.parent(depth) else {
            return Ok(Err(not_found()));
        };

        match self.store.family_by_id(parent_id).await {
            Ok(Some(parent)) => Ok(Ok(parent.id)),
            Ok(None) => Ok(Err(not_found())),
            Err(e) => {
                error!(family = %name, error = %e, "Failed looking up parent family");
                Ok(Err(not_found()))
            },
        }
    }

    fn skip_family(
        &self,
        depth: usize,
        cursor: &mut HierarchyCursor,
        reason: SkipReason,
    ) -> FamilyResolution {
        error!(reason = %reason, "Skipping protein family");
        cursor.clear(depth);
        FamilyResolution::Skipped(reason)
    }

    /// Import one accession of a receptor row into `family`
    pub async fn import_protein(
        &self,
        accession: &str,
        name: &str,
        family: &ProteinFamily,
        scheme: &ResidueNumberingScheme,
    ) -> ImportOutcome {
        match self.try_import(accession, name, family, scheme).await {
            Ok(imported) => ImportOutcome::Created(imported),
            Err(reason) => {
                error!(reason = %reason, "Skipping protein");
                ImportOutcome::Skipped(reason)
            },
        }
    }

    async fn try_import(
        &self,
        accession: &str,
        name: &str,
        family: &ProteinFamily,
        scheme: &ResidueNumberingScheme,
    ) -> Result<ImportedProtein, SkipReason> {
        if accession.is_empty() {
            return Err(SkipReason::MissingAccession {
                protein: name.to_string(),
            });
        }

        let exists = self.store.protein_exists(accession).await.map_err(|e| {
            SkipReason::ProteinNotPersisted {
                accession: accession.to_string(),
                message: e.to_string(),
            }
        })?;
        if exists {
            return Err(SkipReason::AlreadyImported {
                accession: accession.to_string(),
            });
        }

        info!(protein = %name, accession = %accession, "Parsing uniprot file for protein");
        let record = self.records.fetch(accession).await.map_err(|e| {
            SkipReason::RecordUnavailable {
                accession: accession.to_string(),
                message: e.to_string(),
            }
        })?;

        let dependency = |entity: &'static str| {
            move |e: crate::store::StoreError| SkipReason::DependencyNotPersisted {
                entity,
                accession: accession.to_string(),
                message: e.to_string(),
            }
        };

        let source = self
            .store
            .get_or_create_source(record.source_name())
            .await
            .map_err(dependency("protein source"))?;
        if source.created {
            info!(source = %source.value.name, "Created protein source");
        }

        let species = self
            .store
            .get_or_create_species(&record.species_latin_name, &record.species_common_name)
            .await
            .map_err(dependency("species"))?;
        if species.created {
            info!(species = %species.value.latin_name, "Created species");
        }

        let sequence_type = self
            .store
            .get_or_create_sequence_type(WILD_TYPE_SLUG, WILD_TYPE_NAME)
            .await
            .map_err(dependency("protein sequence type"))?;
        if sequence_type.created {
            info!("Created protein sequence type {}", WILD_TYPE_NAME);
        }

        let new_protein = NewProtein {
            accession: accession.to_string(),
            entry_name: record.entry_name.clone(),
            name: name.to_string(),
            sequence: record.sequence.clone(),
            family_id: family.id,
            species_id: species.value.id,
            source_id: source.value.id,
            residue_numbering_scheme_id: scheme.id,
            sequence_type_id: sequence_type.value.id,
        };

        let protein = self.store.create_protein(new_protein).await.map_err(|e| {
            SkipReason::ProteinNotPersisted {
                accession: accession.to_string(),
                message: e.to_string(),
            }
        })?;
        info!(entry_name = %protein.entry_name, accession = %protein.accession, "Created protein");

        let mut imported = ImportedProtein {
            protein,
            aliases: 0,
            genes: 0,
            failures: 0,
        };

        self.add_conformation(&mut imported).await;
        self.add_aliases(&mut imported, &record.names).await;
        self.add_genes(&mut imported, species.value.id, &record.genes).await;

        Ok(imported)
    }

    async fn add_conformation(&self, imported: &mut ImportedProtein) {
        let state_name = title_case(&self.default_state);
        let state = match self
            .store
            .get_or_create_state(&self.default_state, &state_name)
            .await
        {
            Ok(state) => state.value,
            Err(e) => {
                error!(state = %self.default_state, error = %e, "Failed creating protein state");
                imported.failures += 1;
                return;
            },
        };

        if let Err(e) = self
            .store
            .create_conformation(imported.protein.id, state.id)
            .await
        {
            error!(
                accession = %imported.protein.accession,
                error = %e,
                "Failed creating protein conformation"
            );
            imported.failures += 1;
        }
    }

    async fn add_aliases(&self, imported: &mut ImportedProtein, names: &[String]) {
        for (index, alias) in names.iter().enumerate() {
            match self
                .store
                .create_alias(imported.protein.id, alias, position(index))
                .await
            {
                Ok(_) => {
                    info!(alias = %alias, protein = %imported.protein.name, "Created protein alias");
                    imported.aliases += 1;
                },
                Err(e) => {
                    error!(
                        alias = %alias,
                        protein = %imported.protein.name,
                        error = %e,
                        "Failed creating protein alias"
                    );
                    imported.failures += 1;
                },
            }
        }
    }

    async fn add_genes(&self, imported: &mut ImportedProtein, species_id: Uuid, genes: &[String]) {
        for (index, gene) in genes.iter().enumerate() {
            let result = async {
                let created = self
                    .store
                    .create_gene(species_id, gene, position(index))
                    .await?;
                self.store.link_gene(created.id, imported.protein.id).await
            }
            .await;

            match result {
                Ok(()) => {
                    info!(gene = %gene, protein = %imported.protein.name, "Created gene");
                    imported.genes += 1;
                },
                Err(e) => {
                    warn!(
                        gene = %gene,
                        protein = %imported.protein.name,
                        error = %e,
                        "Failed creating gene"
                    );
                    imported.failures += 1;
                },
            }
        }
    }
}

fn position(index: usize) -> i32 {
    i32::try_from(index).unwrap_or(i32::MAX)
}
