//! End-to-end protein builds against the fixture data directory

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use gpcr_build::models::{ProteinFamily, ROOT_FAMILY_SLUG};
use gpcr_build::{BuildConfig, BuildError, BuildPipeline, BuildReport, MemoryStore};
use uuid::Uuid;

fn fixture_data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("data")
}

fn offline_pipeline(store: Arc<MemoryStore>) -> BuildPipeline {
    let config = BuildConfig::default()
        .with_data_dir(fixture_data_dir())
        .with_offline(true);
    BuildPipeline::from_config(store, config).expect("offline record source")
}

fn family_named<'a>(families: &'a [ProteinFamily], name: &str) -> &'a ProteinFamily {
    families
        .iter()
        .find(|f| f.name == name)
        .unwrap_or_else(|| panic!("family '{}' not created", name))
}

/// Depth below the root, found by walking parent links
fn tree_depth(families: &[ProteinFamily], family: &ProteinFamily) -> usize {
    let by_id: HashMap<Uuid, &ProteinFamily> = families.iter().map(|f| (f.id, f)).collect();
    let mut depth = 0;
    let mut current = family;
    while let Some(parent) = current.parent_id.and_then(|id| by_id.get(&id)) {
        if parent.parent_id.is_none() {
            break;
        }
        depth += 1;
        current = parent;
    }
    depth
}

// ============================================================================
// Full build
// ============================================================================

#[tokio::test]
async fn test_full_build_report() {
    let store = Arc::new(MemoryStore::new());
    let report = offline_pipeline(store.clone()).run().await.unwrap();

    assert!(report.root_family_created);
    assert_eq!(report.segments.created, 5);
    assert_eq!(report.schemes.created, 3);
    assert_eq!(report.schemes.skipped, 1);

    // Class A, Aminergic, Adrenoceptors, β1, β2, Dopamine, D1, Orphan, Class B1
    assert_eq!(report.families_created, 9);
    // β2-adrenoceptor listed again under Class B1
    assert_eq!(report.families_reused, 1);
    // GPR1 sits two levels below Orphan receptors
    assert_eq!(report.families_skipped, 1);

    // P08588, P07550, P18762 (gzip), P10608
    assert_eq!(report.proteins_created, 4);
    assert_eq!(report.failures, 0);
    assert!(report.finished_at.is_some());
}

#[tokio::test]
async fn test_family_slugs_follow_tree_position() {
    let store = Arc::new(MemoryStore::new());
    offline_pipeline(store.clone()).run().await.unwrap();
    let families = store.families();

    let expected = [
        ("Parent family", "000"),
        ("Class A (Rhodopsin)", "001"),
        ("Aminergic receptors", "001_001"),
        ("Adrenoceptors", "001_001_001"),
        ("β1-adrenoceptor", "001_001_001_001"),
        ("β2-adrenoceptor", "001_001_001_002"),
        ("Dopamine receptors", "001_001_002"),
        ("D1 receptor", "001_001_002_001"),
        ("Orphan receptors", "001_002"),
        ("Class B1 (Secretin)", "002"),
    ];
    for (name, slug) in expected {
        assert_eq!(family_named(&families, name).slug, slug, "slug of {}", name);
    }

    let adrenoceptors = family_named(&families, "Adrenoceptors");
    assert_eq!(
        family_named(&families, "β2-adrenoceptor").parent_id,
        Some(adrenoceptors.id)
    );
    assert!(families.iter().all(|f| f.name != "GPR1"));
}

#[tokio::test]
async fn test_slugs_unique_and_match_depth() {
    let store = Arc::new(MemoryStore::new());
    offline_pipeline(store.clone()).run().await.unwrap();
    let families = store.families();

    let slugs: HashSet<&str> = families.iter().map(|f| f.slug.as_str()).collect();
    assert_eq!(slugs.len(), families.len());

    for family in families.iter().filter(|f| f.slug != ROOT_FAMILY_SLUG) {
        let components = family.slug.split('_').count();
        assert_eq!(
            components,
            tree_depth(&families, family) + 1,
            "slug {} of {}",
            family.slug,
            family.name
        );
    }
}

// ============================================================================
// Proteins
// ============================================================================

#[tokio::test]
async fn test_proteins_link_family_species_and_source() {
    let store = Arc::new(MemoryStore::new());
    offline_pipeline(store.clone()).run().await.unwrap();

    let families = store.families();
    let beta2 = family_named(&families, "β2-adrenoceptor");
    let proteins = store.proteins();

    let human = proteins.iter().find(|p| p.accession == "P07550").unwrap();
    assert_eq!(human.entry_name, "adrb2_human");
    assert_eq!(human.name, "β2-adrenoceptor");
    assert_eq!(human.family_id, beta2.id);
    assert!(human.sequence.starts_with("MGQPGNGSAFLLAPNRSHAP"));

    let rat = proteins.iter().find(|p| p.accession == "P10608").unwrap();
    assert_eq!(rat.family_id, beta2.id);

    let species = store.species();
    let rat_species = species.iter().find(|s| s.id == rat.species_id).unwrap();
    assert_eq!(rat_species.latin_name, "Rattus norvegicus");
    assert_eq!(rat_species.common_name, "Rat");

    let sources = store.sources();
    let rat_source = sources.iter().find(|s| s.id == rat.source_id).unwrap();
    assert_eq!(rat_source.name, "TREMBL");
    let human_source = sources.iter().find(|s| s.id == human.source_id).unwrap();
    assert_eq!(human_source.name, "SWISSPROT");

    let schemes = store.schemes();
    let scheme = schemes
        .iter()
        .find(|s| s.id == human.residue_numbering_scheme_id)
        .unwrap();
    assert_eq!(scheme.slug, "gpcrdba");

    // one conformation per protein
    assert_eq!(store.conformations().len(), proteins.len());
}

#[tokio::test]
async fn test_alias_and_gene_positions_follow_record_order() {
    let store = Arc::new(MemoryStore::new());
    offline_pipeline(store.clone()).run().await.unwrap();

    let protein = store
        .proteins()
        .into_iter()
        .find(|p| p.accession == "P07550")
        .unwrap();

    let aliases: Vec<(String, i32)> = store
        .aliases_of(protein.id)
        .into_iter()
        .map(|a| (a.name, a.position))
        .collect();
    assert_eq!(
        aliases,
        vec![
            ("Beta-2 adrenergic receptor".to_string(), 0),
            ("Beta-2 adrenoreceptor".to_string(), 1),
            ("Beta-2 adrenoceptor".to_string(), 2),
        ]
    );

    let genes: Vec<(String, i32)> = store
        .genes_of(protein.id)
        .into_iter()
        .map(|g| (g.name, g.position))
        .collect();
    assert_eq!(
        genes,
        vec![
            ("ADRB2".to_string(), 0),
            ("ADRB2R".to_string(), 1),
            ("B2AR".to_string(), 2),
        ]
    );
}

#[tokio::test]
async fn test_duplicate_accession_yields_one_protein() {
    let store = Arc::new(MemoryStore::new());
    let report = offline_pipeline(store.clone()).run().await.unwrap();

    let count = store
        .proteins()
        .iter()
        .filter(|p| p.accession == "P07550")
        .count();
    assert_eq!(count, 1);
    assert!(report
        .skipped
        .iter()
        .any(|s| s.line == 12 && s.reason.contains("P07550 already exists")));
}

#[tokio::test]
async fn test_uncached_record_is_skipped_offline() {
    let store = Arc::new(MemoryStore::new());
    let report = offline_pipeline(store.clone()).run().await.unwrap();

    assert!(store.proteins().iter().all(|p| p.accession != "P21728"));
    assert!(report
        .skipped
        .iter()
        .any(|s| s.line == 8 && s.reason.contains("P21728")));
    // the family is still created for the receptor
    assert!(store.families().iter().any(|f| f.name == "D1 receptor"));
}

// ============================================================================
// Idempotency
// ============================================================================

#[tokio::test]
async fn test_rerun_creates_nothing_new() {
    let store = Arc::new(MemoryStore::new());
    let pipeline = offline_pipeline(store.clone());

    let first = pipeline.run().await.unwrap();
    let families_after_first = store.families().len();
    let proteins_after_first = store.proteins().len();
    assert_eq!(first.proteins_created, proteins_after_first);

    let second = pipeline.run().await.unwrap();
    assert!(!second.root_family_created);
    assert_eq!(second.segments.created, 0);
    assert_eq!(second.schemes.created, 0);
    assert_eq!(second.families_created, 0);
    assert_eq!(second.proteins_created, 0);
    assert_eq!(store.families().len(), families_after_first);
    assert_eq!(store.proteins().len(), proteins_after_first);
}

// ============================================================================
// Fatal errors
// ============================================================================

#[tokio::test]
async fn test_protein_before_any_scheme_is_fatal() {
    let store = Arc::new(MemoryStore::new());
    let pipeline = offline_pipeline(store.clone());
    pipeline.create_parent_family().await.unwrap();

    let mut fields = vec![String::new(); 32];
    fields[4] = "β2-adrenoceptor".to_string();
    fields[15] = "P07550".to_string();
    let taxonomy = format!("\"{}\"\n", fields.join("\",\""));

    let mut report = BuildReport::start(true);
    let err = pipeline
        .create_proteins_and_families(&taxonomy, &mut report)
        .await
        .unwrap_err();

    assert!(matches!(err, BuildError::NoNumberingScheme { line: 1 }));
    assert!(store.proteins().is_empty());
    assert_eq!(store.families().len(), 1);
}

#[tokio::test]
async fn test_missing_taxonomy_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("protein_data")).unwrap();
    std::fs::create_dir_all(dir.path().join("residue_data/generic_numbers")).unwrap();
    std::fs::write(dir.path().join("protein_data/segments.txt"), "").unwrap();
    std::fs::write(
        dir.path().join("residue_data/generic_numbers/schemes.txt"),
        "gpcrdba GPCRdb(A) 'class A'\n",
    )
    .unwrap();

    let config = BuildConfig::default()
        .with_data_dir(dir.path())
        .with_offline(true);
    let pipeline = BuildPipeline::from_config(Arc::new(MemoryStore::new()), config).unwrap();

    let err = pipeline.run().await.unwrap_err();
    assert!(matches!(err, BuildError::Input(_)));
    assert!(err.to_string().contains("proteins_and_families.txt"));
}
