use std::path::Path;

use tempfile::TempDir;

use subdex_core::types::SubjectRow;
use subdex_core::Error;
use subdex_embed::FakeEmbedder;
use subdex_index::artifact::{index_path, meta_path};
use subdex_index::Artifact;

fn rows() -> Vec<SubjectRow> {
    vec![
        SubjectRow::new("ring of bearing", "/a"),
        SubjectRow::new("front light assembly", "/b"),
        SubjectRow::new("axle nut", "/c /d"),
    ]
}

#[test]
fn build_keeps_positional_correspondence() {
    let embedder = FakeEmbedder::new(32);
    let artifact = Artifact::build(&rows(), &embedder).expect("build");

    assert_eq!(artifact.index.len(), 3);
    assert_eq!(artifact.metadata.len(), 3);
    for (i, row) in rows().iter().enumerate() {
        assert_eq!(artifact.metadata[i].0, row.subject);
        assert_eq!(artifact.metadata[i].1, row.links);
    }
}

#[test]
fn save_load_round_trip_preserves_metadata_and_search() {
    let tmp = TempDir::new().unwrap();
    let prefix = tmp.path().join("model").join("subjects");

    let embedder = FakeEmbedder::new(32);
    let artifact = Artifact::build(&rows(), &embedder).expect("build");

    // Fixed query vector: whatever the fake embedder says for this text.
    let query = subdex_core::traits::Embedder::embed_batch(
        &embedder,
        &["ring of bearing".to_string()],
    )
    .expect("embed")
    .remove(0);

    let before = artifact.index.search(&query, 3).expect("search");
    artifact.save(&prefix).expect("save");

    let reloaded = Artifact::load(&prefix).expect("load");
    assert_eq!(reloaded.metadata, artifact.metadata);
    assert_eq!(reloaded.index.dim(), artifact.index.dim());

    let after = reloaded.index.search(&query, 3).expect("search");
    assert_eq!(before.len(), after.len());
    for ((pos_a, score_a), (pos_b, score_b)) in before.iter().zip(after.iter()) {
        assert_eq!(pos_a, pos_b);
        assert!((score_a - score_b).abs() < 1e-6);
    }
}

#[test]
fn load_requires_both_files() {
    let tmp = TempDir::new().unwrap();
    let prefix = tmp.path().join("subjects");

    let embedder = FakeEmbedder::new(8);
    let artifact = Artifact::build(&rows(), &embedder).expect("build");
    artifact.save(&prefix).expect("save");

    // Drop the metadata half; the pair is now invalid.
    std::fs::remove_file(meta_path(&prefix)).unwrap();
    let err = Artifact::load(&prefix).unwrap_err();
    assert!(matches!(err, Error::MissingFile { .. }));

    // And the vector half alone is equally invalid.
    artifact.save(&prefix).expect("save again");
    std::fs::remove_file(index_path(&prefix)).unwrap();
    let err = Artifact::load(&prefix).unwrap_err();
    assert!(matches!(err, Error::MissingFile { .. }));
}

#[test]
fn load_rejects_missing_prefix() {
    let err = Artifact::load(Path::new("/nonexistent/prefix")).unwrap_err();
    assert!(matches!(err, Error::MissingFile { .. }));
}

#[test]
fn load_rejects_corrupt_index_file() {
    let tmp = TempDir::new().unwrap();
    let prefix = tmp.path().join("subjects");

    let embedder = FakeEmbedder::new(8);
    Artifact::build(&rows(), &embedder).expect("build").save(&prefix).expect("save");

    std::fs::write(index_path(&prefix), b"not an index").unwrap();
    let err = Artifact::load(&prefix).unwrap_err();
    assert!(matches!(err, Error::Index(_)));
}

#[test]
fn rebuild_from_same_rows_is_deterministic() {
    let embedder = FakeEmbedder::new(16);
    let a = Artifact::build(&rows(), &embedder).expect("build");
    let b = Artifact::build(&rows(), &embedder).expect("build");
    assert_eq!(a.metadata, b.metadata);

    let query = vec![1.0; 16];
    let hits_a = a.index.search(&query, 3).expect("search");
    let hits_b = b.index.search(&query, 3).expect("search");
    assert_eq!(hits_a, hits_b);
}
