//! Database row types for the protein family schema
//!
//! Column limits mirror `migrations/0001_initial.sql`; the in-memory store
//! enforces the same limits so dry runs reject what Postgres would.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Slug of the single root family every top-level family hangs off
pub const ROOT_FAMILY_SLUG: &str = "000";
pub const ROOT_FAMILY_NAME: &str = "Parent family";

/// Sequence type used for every record read from the taxonomy file
pub const WILD_TYPE_SLUG: &str = "wt";
pub const WILD_TYPE_NAME: &str = "Wild-type";

pub const FAMILY_NAME_MAX_LEN: usize = 200;
pub const FAMILY_SLUG_MAX_LEN: usize = 100;
pub const PROTEIN_NAME_MAX_LEN: usize = 200;
pub const ENTRY_NAME_MAX_LEN: usize = 100;
pub const ALIAS_NAME_MAX_LEN: usize = 200;
pub const GENE_NAME_MAX_LEN: usize = 100;
pub const SPECIES_NAME_MAX_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProteinFamily {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFamily {
    pub slug: String,
    pub name: String,
    pub parent_id: Option<Uuid>,
}

impl NewFamily {
    pub fn root() -> Self {
        Self {
            slug: ROOT_FAMILY_SLUG.to_string(),
            name: ROOT_FAMILY_NAME.to_string(),
            parent_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ResidueNumberingScheme {
    pub id: Uuid,
    pub slug: String,
    pub short_name: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProteinSegment {
    pub id: Uuid,
    pub slug: String,
    pub category: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProteinSource {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Species {
    pub id: Uuid,
    pub latin_name: String,
    pub common_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProteinSequenceType {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProteinState {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Protein {
    pub id: Uuid,
    pub accession: String,
    pub entry_name: String,
    pub name: String,
    pub sequence: String,
    pub family_id: Uuid,
    pub species_id: Uuid,
    pub source_id: Uuid,
    pub residue_numbering_scheme_id: Uuid,
    pub sequence_type_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProtein {
    pub accession: String,
    pub entry_name: String,
    pub name: String,
    pub sequence: String,
    pub family_id: Uuid,
    pub species_id: Uuid,
    pub source_id: Uuid,
    pub residue_numbering_scheme_id: Uuid,
    pub sequence_type_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProteinConformation {
    pub id: Uuid,
    pub protein_id: Uuid,
    pub state_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProteinAlias {
    pub id: Uuid,
    pub protein_id: Uuid,
    pub name: String,
    pub position: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Gene {
    pub id: Uuid,
    pub species_id: Uuid,
    pub name: String,
    pub position: i32,
}

/// Result of a get-or-create call and whether it inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetOrCreate<T> {
    pub value: T,
    pub created: bool,
}

impl<T> GetOrCreate<T> {
    pub fn found(value: T) -> Self {
        Self {
            value,
            created: false,
        }
    }

    pub fn created(value: T) -> Self {
        Self {
            value,
            created: true,
        }
    }
}

/// Title-case a slug for display, `inactive` -> `Inactive`
///
/// A letter is uppercased when it follows a non-letter and lowercased
/// otherwise; separators are kept (`intermediate_state` -> `Intermediate_State`).
pub fn title_case(slug: &str) -> String {
    let mut title = String::with_capacity(slug.len());
    let mut after_letter = false;
    for c in slug.chars() {
        if after_letter {
            title.extend(c.to_lowercase());
        } else {
            title.extend(c.to_uppercase());
        }
        after_letter = c.is_alphabetic();
    }
    title
}
