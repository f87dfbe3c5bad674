//! The protein build
//!
//! Steps run in a fixed order, each depending on the previous one:
//!
//! 1. parent family (`000`)
//! 2. protein segments
//! 3. residue numbering schemes
//! 4. families and proteins from the taxonomy file
//!
//! Lines are processed strictly one after another; every store call is
//! awaited before the next line is read.

use std::sync::Arc;

use gpcr_common::GpcrError;
use tracing::{error, info, instrument, warn};

use crate::config::BuildConfig;
use crate::error::{BuildError, BuildResult, SkipReason};
use crate::hierarchy::{HierarchyCursor, LineKind, TaxonomyLine};
use crate::loader::Loader;
use crate::models::{NewFamily, ResidueNumberingScheme};
use crate::reference::{load_schemes, load_segments};
use crate::report::BuildReport;
use crate::store::ProteinStore;
use crate::uniprot::RecordSource;

pub struct BuildPipeline {
    store: Arc<dyn ProteinStore>,
    records: RecordSource,
    config: BuildConfig,
    dry_run: bool,
}

impl BuildPipeline {
    pub fn new(store: Arc<dyn ProteinStore>, records: RecordSource, config: BuildConfig) -> Self {
        Self {
            store,
            records,
            config,
            dry_run: false,
        }
    }

    /// Record source built from `config` (local cache, remote unless offline)
    pub fn from_config(store: Arc<dyn ProteinStore>, config: BuildConfig) -> BuildResult<Self> {
        let records = RecordSource::from_config(&config)?;
        Ok(Self::new(store, records, config))
    }

    /// Mark the report as a dry run
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Run every step against the configured data directory
    #[instrument(skip(self), fields(data_dir = %self.config.data_dir.display()))]
    pub async fn run(&self) -> BuildResult<BuildReport> {
        let mut report = BuildReport::start(self.dry_run);

        report.root_family_created = self.create_parent_family().await?;
        report.segments =
            load_segments(self.store.as_ref(), &self.config.segment_source_file()).await?;
        report.schemes = load_schemes(
            self.store.as_ref(),
            &self.config.residue_numbering_scheme_source_file(),
        )
        .await?;

        let path = self.config.protein_source_file();
        info!(path = %path.display(), "Parsing file");
        let taxonomy = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| GpcrError::file(&path, e))?;
        self.create_proteins_and_families(&taxonomy, &mut report)
            .await?;

        report.finish();
        report.log_summary();
        Ok(report)
    }

    /// Get-or-create the root family; returns whether it was created
    pub async fn create_parent_family(&self) -> BuildResult<bool> {
        let root = self.store.get_or_create_family(NewFamily::root()).await?;
        if root.created {
            info!(family = %root.value.name, slug = %root.value.slug, "Created protein family");
        }
        Ok(root.created)
    }

    /// Walk the taxonomy text, creating families and importing proteins
    pub async fn create_proteins_and_families(
        &self,
        taxonomy: &str,
        report: &mut BuildReport,
    ) -> BuildResult<()> {
        info!("CREATING PROTEINS");

        let loader = Loader::new(
            self.store.as_ref(),
            &self.records,
            self.config.default_protein_state.clone(),
        );
        let mut cursor = HierarchyCursor::new();
        let mut scheme: Option<ResidueNumberingScheme> = None;

        for (index, raw) in taxonomy.lines().enumerate() {
            let line_no = index + 1;
            let line = TaxonomyLine::parse(raw);
            let depth = line.depth;

            match line.kind {
                LineKind::Blank => continue,

                LineKind::MalformedProtein { fields } => {
                    cursor.move_to(depth);
                    cursor.clear(depth);
                    let reason = SkipReason::MalformedProteinLine { fields };
                    warn!(line = line_no, reason = %reason, "Skipping protein line");
                    report.record_skip(line_no, &reason);
                },

                LineKind::Family(family) => {
                    cursor.move_to(depth);
                    match family.scheme {
                        Some(slug) => {
                            scheme = Some(self.resolve_scheme(slug, line_no).await?);
                        },
                        None if scheme.is_none() => {
                            return Err(BuildError::NoNumberingScheme { line: line_no });
                        },
                        None => {},
                    }

                    let resolution = loader.resolve_family(&family.name, depth, &mut cursor).await?;
                    report.record_family(line_no, &resolution);
                },

                LineKind::Protein(protein) => {
                    cursor.move_to(depth);
                    let Some(scheme) = scheme.as_ref() else {
                        return Err(BuildError::NoNumberingScheme { line: line_no });
                    };

                    let resolution = loader.resolve_family(&protein.name, depth, &mut cursor).await?;
                    report.record_family(line_no, &resolution);
                    let Some(family) = resolution.family() else {
                        continue;
                    };

                    for accession in &protein.accessions {
                        let outcome = loader
                            .import_protein(accession, &protein.name, family, scheme)
                            .await;
                        report.record_import(line_no, &outcome);
                    }
                },
            }
        }

        info!("COMPLETED CREATING PROTEINS");
        Ok(())
    }

    async fn resolve_scheme(
        &self,
        slug: String,
        line: usize,
    ) -> BuildResult<ResidueNumberingScheme> {
        match self.store.scheme_by_slug(&slug).await? {
            Some(scheme) => Ok(scheme),
            None => {
                error!(scheme = %slug, line, "Residue numbering scheme not found");
                Err(BuildError::UnknownNumberingScheme { slug, line })
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn pipeline(store: Arc<MemoryStore>) -> BuildPipeline {
        let config = BuildConfig::default()
            .with_data_dir("/nonexistent")
            .with_offline(true);
        let records = RecordSource::local("/nonexistent");
        BuildPipeline::new(store, records, config)
    }

    #[tokio::test]
    async fn test_parent_family_created_once() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = pipeline(store.clone());
        assert!(pipeline.create_parent_family().await.unwrap());
        assert!(!pipeline.create_parent_family().await.unwrap());
        assert_eq!(store.families().len(), 1);
    }

    #[tokio::test]
    async fn test_family_without_scheme_is_fatal() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = pipeline(store.clone());
        pipeline.create_parent_family().await.unwrap();

        let mut report = BuildReport::start(true);
        let err = pipeline
            .create_proteins_and_families("\nClass A\n", &mut report)
            .await
            .unwrap_err();
        assert!(matches!(err, BuildError::NoNumberingScheme { line: 2 }));
        assert_eq!(store.families().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_scheme_is_fatal() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = pipeline(store.clone());
        pipeline.create_parent_family().await.unwrap();

        let mut report = BuildReport::start(true);
        let err = pipeline
            .create_proteins_and_families("Class A | gpcrdba\n", &mut report)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::UnknownNumberingScheme { ref slug, line: 1 } if slug == "gpcrdba"
        ));
    }

    #[tokio::test]
    async fn test_scheme_is_inherited_by_following_lines() {
        let store = Arc::new(MemoryStore::new());
        store
            .get_or_create_scheme("gpcrdba", "GPCRdb(A)", "GPCRdb class A")
            .await
            .unwrap();
        let pipeline = pipeline(store.clone());
        pipeline.create_parent_family().await.unwrap();

        let taxonomy = "Class A | gpcrdba\n    Aminergic\n        Adrenoceptors\nClass B\n";
        let mut report = BuildReport::start(true);
        pipeline
            .create_proteins_and_families(taxonomy, &mut report)
            .await
            .unwrap();

        let mut slugs: Vec<String> = store.families().into_iter().map(|f| f.slug).collect();
        slugs.sort();
        assert_eq!(slugs, vec!["000", "001", "001_001", "001_001_001", "002"]);
        assert_eq!(report.families_created, 4);
    }

    async fn slug_of(store: &MemoryStore, name: &str) -> String {
        store.family_by_name(name).await.unwrap().unwrap().slug
    }

    #[tokio::test]
    async fn test_children_of_reused_family_extend_its_slug() {
        let store = Arc::new(MemoryStore::new());
        store
            .get_or_create_scheme("gpcrdba", "GPCRdb(A)", "GPCRdb class A")
            .await
            .unwrap();
        let pipeline = pipeline(store.clone());
        pipeline.create_parent_family().await.unwrap();

        let taxonomy = "Class A | gpcrdba\n    Aminergic\n        Adrenoceptors\n\
                        Class B\n    Adrenoceptors\n        Beta\n";
        let mut report = BuildReport::start(true);
        pipeline
            .create_proteins_and_families(taxonomy, &mut report)
            .await
            .unwrap();
        assert_eq!(report.families_created, 5);
        assert_eq!(report.families_reused, 1);

        let families = store.families();
        for family in families.iter().filter(|f| f.parent_id.is_some()) {
            let parent = families
                .iter()
                .find(|p| Some(p.id) == family.parent_id)
                .unwrap();
            if parent.parent_id.is_some() {
                assert!(
                    family.slug.starts_with(&format!("{}_", parent.slug)),
                    "slug {} of {} does not extend {}",
                    family.slug,
                    family.name,
                    parent.slug
                );
            }
        }
        assert_eq!(slug_of(&store, "Beta").await, "001_001_001_001");
    }

    #[tokio::test]
    async fn test_rerun_numbers_new_family_after_existing_siblings() {
        let store = Arc::new(MemoryStore::new());
        store
            .get_or_create_scheme("gpcrdba", "GPCRdb(A)", "GPCRdb class A")
            .await
            .unwrap();
        let pipeline = pipeline(store.clone());
        pipeline.create_parent_family().await.unwrap();

        let first = "Class A | gpcrdba\n    Aminergic\n    Peptide\n";
        let mut report = BuildReport::start(true);
        pipeline
            .create_proteins_and_families(first, &mut report)
            .await
            .unwrap();

        let second = "Class A | gpcrdba\n    Aminergic\n    Peptide\n    Lipid\n";
        let mut report = BuildReport::start(true);
        pipeline
            .create_proteins_and_families(second, &mut report)
            .await
            .unwrap();

        assert_eq!(report.families_created, 1);
        assert_eq!(report.families_reused, 3);
        assert!(report.skipped.is_empty());
        assert_eq!(slug_of(&store, "Lipid").await, "001_003");
    }
}
