//! Protein segments and residue numbering schemes
//!
//! Both reference files hold one shell-quoted row per line:
//!
//! ```text
//! TM1 helix 'Transmembrane helix 1'
//! gpcrdba GPCRdb(A) 'GPCRdb generic numbering for class A'
//! ```

use std::path::Path;

use gpcr_common::GpcrError;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::error::BuildResult;
use crate::store::{ProteinStore, StoreResult};

/// Counts from loading one reference file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceSummary {
    pub created: usize,
    pub existing: usize,
    pub skipped: usize,
}

/// Get-or-create a segment for every `slug category name` row
#[instrument(skip(store))]
pub async fn load_segments(store: &dyn ProteinStore, path: &Path) -> BuildResult<ReferenceSummary> {
    info!(path = %path.display(), "Parsing file");
    info!("CREATING PROTEIN SEGMENTS");

    let summary = load_rows(path, |slug, [category, name]| async move {
        let segment = store.get_or_create_segment(&slug, &category, &name).await?;
        if segment.created {
            info!(slug = %segment.value.slug, "Created protein segment");
        }
        Ok(segment.created)
    })
    .await?;

    info!(?summary, "COMPLETED CREATING PROTEIN SEGMENTS");
    Ok(summary)
}

/// Get-or-create a numbering scheme for every `slug short_name name` row
#[instrument(skip(store))]
pub async fn load_schemes(store: &dyn ProteinStore, path: &Path) -> BuildResult<ReferenceSummary> {
    info!(path = %path.display(), "Parsing file");
    info!("CREATING RESIDUE NUMBERING SCHEMES");

    let summary = load_rows(path, |slug, [short_name, name]| async move {
        let scheme = store.get_or_create_scheme(&slug, &short_name, &name).await?;
        if scheme.created {
            info!(name = %scheme.value.name, "Created residue numbering scheme");
        }
        Ok(scheme.created)
    })
    .await?;

    info!(?summary, "COMPLETED CREATING RESIDUE NUMBERING SCHEMES");
    Ok(summary)
}

async fn load_rows<F, Fut>(path: &Path, mut create: F) -> BuildResult<ReferenceSummary>
where
    F: FnMut(String, [String; 2]) -> Fut,
    Fut: std::future::Future<Output = StoreResult<bool>>,
{
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| GpcrError::file(path, e))?;

    let mut summary = ReferenceSummary::default();
    for (index, line) in content.lines().enumerate() {
        let line_no = index + 1;
        let Some(row) = split_row(line, line_no) else {
            if !line.trim().is_empty() {
                summary.skipped += 1;
            }
            continue;
        };
        let [slug, first, second] = row;

        match create(slug.clone(), [first, second]).await {
            Ok(true) => summary.created += 1,
            Ok(false) => summary.existing += 1,
            Err(e) => {
                error!(slug = %slug, line = line_no, error = %e, "Failed creating reference row");
                summary.skipped += 1;
            },
        }
    }

    Ok(summary)
}

/// Tokenise a row into its three leading columns; extra tokens are ignored
fn split_row(line: &str, line_no: usize) -> Option<[String; 3]> {
    if line.trim().is_empty() {
        return None;
    }

    let Some(tokens) = shlex::split(line) else {
        warn!(line = line_no, "Unbalanced quotes, skipping row");
        return None;
    };

    let mut tokens = tokens.into_iter();
    match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(slug), Some(first), Some(second)) => Some([slug, first, second]),
        _ => {
            warn!(line = line_no, "Expected three columns, skipping row");
            debug!(row = %line, "Short reference row");
            None
        },
    }
}
