//! Summary of one build run

use std::path::Path;

use chrono::{DateTime, Utc};
use gpcr_common::{GpcrError, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::SkipReason;
use crate::loader::{FamilyResolution, ImportOutcome};
use crate::reference::ReferenceSummary;

/// A skipped unit and the taxonomy line it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedUnit {
    pub line: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub dry_run: bool,
    pub root_family_created: bool,
    pub segments: ReferenceSummary,
    pub schemes: ReferenceSummary,
    pub families_created: usize,
    pub families_reused: usize,
    pub families_skipped: usize,
    pub proteins_created: usize,
    pub proteins_skipped: usize,
    pub aliases_created: usize,
    pub genes_created: usize,
    /// Dependent rows of created proteins that failed to persist
    pub failures: usize,
    pub skipped: Vec<SkippedUnit>,
}

impl BuildReport {
    pub fn start(dry_run: bool) -> Self {
        Self {
            started_at: Utc::now(),
            dry_run,
            ..Self::default()
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn duration(&self) -> Option<chrono::Duration> {
        self.finished_at.map(|end| end - self.started_at)
    }

    pub fn record_family(&mut self, line: usize, resolution: &FamilyResolution) {
        match resolution {
            FamilyResolution::Created(_) => self.families_created += 1,
            FamilyResolution::Reused(_) => self.families_reused += 1,
            FamilyResolution::Skipped(reason) => {
                self.families_skipped += 1;
                self.record_skip(line, reason);
            },
        }
    }

    pub fn record_import(&mut self, line: usize, outcome: &ImportOutcome) {
        match outcome {
            ImportOutcome::Created(imported) => {
                self.proteins_created += 1;
                self.aliases_created += imported.aliases;
                self.genes_created += imported.genes;
                self.failures += imported.failures;
            },
            ImportOutcome::Skipped(reason) => {
                self.proteins_skipped += 1;
                self.record_skip(line, reason);
            },
        }
    }

    pub fn record_skip(&mut self, line: usize, reason: &SkipReason) {
        self.skipped.push(SkippedUnit {
            line,
            reason: reason.to_string(),
        });
    }

    pub fn log_summary(&self) {
        info!(
            families_created = self.families_created,
            families_reused = self.families_reused,
            families_skipped = self.families_skipped,
            proteins_created = self.proteins_created,
            proteins_skipped = self.proteins_skipped,
            aliases = self.aliases_created,
            genes = self.genes_created,
            failures = self.failures,
            duration_ms = self.duration().map(|d| d.num_milliseconds()),
            "Build summary"
        );
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?).map_err(|e| GpcrError::file(path, e))
    }
}
