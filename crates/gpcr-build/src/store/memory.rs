//! In-memory protein store
//!
//! Backs `--dry-run` builds and the test suite. Unique keys and column
//! lengths follow the Postgres schema.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use super::{ProteinStore, StoreError, StoreResult};
use crate::models::*;

#[derive(Debug, Default)]
struct Tables {
    families: Vec<ProteinFamily>,
    schemes: Vec<ResidueNumberingScheme>,
    segments: Vec<ProteinSegment>,
    sources: Vec<ProteinSource>,
    species: Vec<Species>,
    sequence_types: Vec<ProteinSequenceType>,
    states: Vec<ProteinState>,
    proteins: Vec<Protein>,
    conformations: Vec<ProteinConformation>,
    aliases: Vec<ProteinAlias>,
    genes: Vec<Gene>,
    gene_proteins: Vec<(Uuid, Uuid)>,
}

/// Thread-safe in-memory implementation of [`ProteinStore`]
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

fn check_len(column: &str, value: &str, max: usize) -> StoreResult<()> {
    if value.chars().count() > max {
        return Err(StoreError::too_long(column, value, max));
    }
    Ok(())
}

fn get_or_create<T: Clone>(
    rows: &mut Vec<T>,
    matches: impl Fn(&T) -> bool,
    make: impl FnOnce() -> T,
) -> GetOrCreate<T> {
    if let Some(existing) = rows.iter().find(|row| matches(row)) {
        return GetOrCreate::found(existing.clone());
    }
    let row = make();
    rows.push(row.clone());
    GetOrCreate::created(row)
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }

    fn snapshot<T>(&self, read: impl FnOnce(&Tables) -> T) -> T {
        match self.tables.lock() {
            Ok(tables) => read(&tables),
            Err(poisoned) => read(&poisoned.into_inner()),
        }
    }

    pub fn families(&self) -> Vec<ProteinFamily> {
        self.snapshot(|t| t.families.clone())
    }

    pub fn schemes(&self) -> Vec<ResidueNumberingScheme> {
        self.snapshot(|t| t.schemes.clone())
    }

    pub fn segments(&self) -> Vec<ProteinSegment> {
        self.snapshot(|t| t.segments.clone())
    }

    pub fn sources(&self) -> Vec<ProteinSource> {
        self.snapshot(|t| t.sources.clone())
    }

    pub fn species(&self) -> Vec<Species> {
        self.snapshot(|t| t.species.clone())
    }

    pub fn proteins(&self) -> Vec<Protein> {
        self.snapshot(|t| t.proteins.clone())
    }

    pub fn conformations(&self) -> Vec<ProteinConformation> {
        self.snapshot(|t| t.conformations.clone())
    }

    /// Aliases of one protein ordered by position
    pub fn aliases_of(&self, protein_id: Uuid) -> Vec<ProteinAlias> {
        let mut aliases: Vec<ProteinAlias> = self.snapshot(|t| {
            t.aliases
                .iter()
                .filter(|a| a.protein_id == protein_id)
                .cloned()
                .collect()
        });
        aliases.sort_by_key(|a| a.position);
        aliases
    }

    /// Genes linked to one protein ordered by position
    pub fn genes_of(&self, protein_id: Uuid) -> Vec<Gene> {
        let mut genes: Vec<Gene> = self.snapshot(|t| {
            t.gene_proteins
                .iter()
                .filter(|(_, p)| *p == protein_id)
                .filter_map(|(g, _)| t.genes.iter().find(|gene| gene.id == *g))
                .cloned()
                .collect()
        });
        genes.sort_by_key(|g| g.position);
        genes
    }
}

#[async_trait]
impl ProteinStore for MemoryStore {
    async fn get_or_create_family(
        &self,
        family: NewFamily,
    ) -> StoreResult<GetOrCreate<ProteinFamily>> {
        check_len("protein_family.name", &family.name, FAMILY_NAME_MAX_LEN)?;
        let mut tables = self.tables()?;
        Ok(get_or_create(
            &mut tables.families,
            |f| f.slug == family.slug,
            || ProteinFamily {
                id: Uuid::new_v4(),
                slug: family.slug.clone(),
                name: family.name.clone(),
                parent_id: family.parent_id,
            },
        ))
    }

    async fn create_family(&self, family: NewFamily) -> StoreResult<ProteinFamily> {
        check_len("protein_family.name", &family.name, FAMILY_NAME_MAX_LEN)?;
        check_len("protein_family.slug", &family.slug, FAMILY_SLUG_MAX_LEN)?;
        let mut tables = self.tables()?;
        if tables.families.iter().any(|f| f.slug == family.slug) {
            return Err(StoreError::duplicate("protein_family", &family.slug));
        }
        if let Some(parent) = family.parent_id {
            if !tables.families.iter().any(|f| f.id == parent) {
                return Err(StoreError::Constraint(format!(
                    "protein_family parent {} does not exist",
                    parent
                )));
            }
        }
        let row = ProteinFamily {
            id: Uuid::new_v4(),
            slug: family.slug,
            name: family.name,
            parent_id: family.parent_id,
        };
        tables.families.push(row.clone());
        Ok(row)
    }

    async fn root_family(&self) -> StoreResult<Option<ProteinFamily>> {
        let tables = self.tables()?;
        Ok(tables.families.iter().find(|f| f.parent_id.is_none()).cloned())
    }

    async fn family_by_id(&self, id: Uuid) -> StoreResult<Option<ProteinFamily>> {
        let tables = self.tables()?;
        Ok(tables.families.iter().find(|f| f.id == id).cloned())
    }

    async fn family_by_name(&self, name: &str) -> StoreResult<Option<ProteinFamily>> {
        let tables = self.tables()?;
        Ok(tables
            .families
            .iter()
            .filter(|f| f.name == name)
            .min_by(|a, b| a.slug.cmp(&b.slug))
            .cloned())
    }

    async fn get_or_create_segment(
        &self,
        slug: &str,
        category: &str,
        name: &str,
    ) -> StoreResult<GetOrCreate<ProteinSegment>> {
        let mut tables = self.tables()?;
        Ok(get_or_create(
            &mut tables.segments,
            |s| s.slug == slug,
            || ProteinSegment {
                id: Uuid::new_v4(),
                slug: slug.to_string(),
                category: category.to_string(),
                name: name.to_string(),
            },
        ))
    }

    async fn get_or_create_scheme(
        &self,
        slug: &str,
        short_name: &str,
        name: &str,
    ) -> StoreResult<GetOrCreate<ResidueNumberingScheme>> {
        let mut tables = self.tables()?;
        Ok(get_or_create(
            &mut tables.schemes,
            |s| s.slug == slug,
            || ResidueNumberingScheme {
                id: Uuid::new_v4(),
                slug: slug.to_string(),
                short_name: short_name.to_string(),
                name: name.to_string(),
            },
        ))
    }

    async fn scheme_by_slug(&self, slug: &str) -> StoreResult<Option<ResidueNumberingScheme>> {
        let tables = self.tables()?;
        Ok(tables.schemes.iter().find(|s| s.slug == slug).cloned())
    }

    async fn get_or_create_source(&self, name: &str) -> StoreResult<GetOrCreate<ProteinSource>> {
        let mut tables = self.tables()?;
        Ok(get_or_create(
            &mut tables.sources,
            |s| s.name == name,
            || ProteinSource {
                id: Uuid::new_v4(),
                name: name.to_string(),
            },
        ))
    }

    async fn get_or_create_species(
        &self,
        latin_name: &str,
        common_name: &str,
    ) -> StoreResult<GetOrCreate<Species>> {
        check_len("species.latin_name", latin_name, SPECIES_NAME_MAX_LEN)?;
        let mut tables = self.tables()?;
        Ok(get_or_create(
            &mut tables.species,
            |s| s.latin_name == latin_name,
            || Species {
                id: Uuid::new_v4(),
                latin_name: latin_name.to_string(),
                common_name: common_name.to_string(),
            },
        ))
    }

    async fn get_or_create_sequence_type(
        &self,
        slug: &str,
        name: &str,
    ) -> StoreResult<GetOrCreate<ProteinSequenceType>> {
        let mut tables = self.tables()?;
        Ok(get_or_create(
            &mut tables.sequence_types,
            |s| s.slug == slug,
            || ProteinSequenceType {
                id: Uuid::new_v4(),
                slug: slug.to_string(),
                name: name.to_string(),
            },
        ))
    }

    async fn get_or_create_state(
        &self,
        slug: &str,
        name: &str,
    ) -> StoreResult<GetOrCreate<ProteinState>> {
        let mut tables = self.tables()?;
        Ok(get_or_create(
            &mut tables.states,
            |s| s.slug == slug,
            || ProteinState {
                id: Uuid::new_v4(),
                slug: slug.to_string(),
                name: name.to_string(),
            },
        ))
    }

    async fn protein_exists(&self, accession: &str) -> StoreResult<bool> {
        let tables = self.tables()?;
        Ok(tables.proteins.iter().any(|p| p.accession == accession))
    }

    async fn create_protein(&self, protein: NewProtein) -> StoreResult<Protein> {
        check_len("protein.name", &protein.name, PROTEIN_NAME_MAX_LEN)?;
        check_len("protein.entry_name", &protein.entry_name, ENTRY_NAME_MAX_LEN)?;
        let mut tables = self.tables()?;
        if tables.proteins.iter().any(|p| p.accession == protein.accession) {
            return Err(StoreError::duplicate("protein", &protein.accession));
        }
        let row = Protein {
            id: Uuid::new_v4(),
            accession: protein.accession,
            entry_name: protein.entry_name,
            name: protein.name,
            sequence: protein.sequence,
            family_id: protein.family_id,
            species_id: protein.species_id,
            source_id: protein.source_id,
            residue_numbering_scheme_id: protein.residue_numbering_scheme_id,
            sequence_type_id: protein.sequence_type_id,
        };
        tables.proteins.push(row.clone());
        Ok(row)
    }

    async fn create_conformation(
        &self,
        protein_id: Uuid,
        state_id: Uuid,
    ) -> StoreResult<ProteinConformation> {
        let mut tables = self.tables()?;
        let row = ProteinConformation {
            id: Uuid::new_v4(),
            protein_id,
            state_id,
        };
        tables.conformations.push(row.clone());
        Ok(row)
    }

    async fn create_alias(
        &self,
        protein_id: Uuid,
        name: &str,
        position: i32,
    ) -> StoreResult<ProteinAlias> {
        check_len("protein_alias.name", name, ALIAS_NAME_MAX_LEN)?;
        let mut tables = self.tables()?;
        let row = ProteinAlias {
            id: Uuid::new_v4(),
            protein_id,
            name: name.to_string(),
            position,
        };
        tables.aliases.push(row.clone());
        Ok(row)
    }

    async fn create_gene(&self, species_id: Uuid, name: &str, position: i32) -> StoreResult<Gene> {
        check_len("gene.name", name, GENE_NAME_MAX_LEN)?;
        let mut tables = self.tables()?;
        let row = Gene {
            id: Uuid::new_v4(),
            species_id,
            name: name.to_string(),
            position,
        };
        tables.genes.push(row.clone());
        Ok(row)
    }

    async fn link_gene(&self, gene_id: Uuid, protein_id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables()?;
        if !tables.gene_proteins.contains(&(gene_id, protein_id)) {
            tables.gene_proteins.push((gene_id, protein_id));
        }
        Ok(())
    }
}
