//! Parsed UniProt flat-text record

use serde::{Deserialize, Serialize};

/// Review status from the ID line, mapped to a protein source name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewStatus {
    Reviewed,
    Unreviewed,
}

impl ReviewStatus {
    pub fn from_id_token(token: &str) -> Option<Self> {
        match token.trim_end_matches(';') {
            "Reviewed" => Some(Self::Reviewed),
            "Unreviewed" => Some(Self::Unreviewed),
            _ => None,
        }
    }

    /// Protein source row name
    pub fn source_name(self) -> &'static str {
        match self {
            Self::Reviewed => "SWISSPROT",
            Self::Unreviewed => "TREMBL",
        }
    }
}

/// Fields the builder takes from one UniProt entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniProtRecord {
    /// Lowercased entry name, e.g. "adrb2_human"
    pub entry_name: String,
    pub review_status: ReviewStatus,
    pub species_latin_name: String,
    pub species_common_name: String,
    /// DE values in encounter order
    pub names: Vec<String>,
    /// GN symbols in encounter order
    pub genes: Vec<String>,
    /// Length announced on the SQ line; not checked against `sequence`
    pub declared_length: usize,
    pub sequence: String,
}

impl UniProtRecord {
    pub fn source_name(&self) -> &'static str {
        self.review_status.source_name()
    }
}
