use std::collections::HashMap;

use tempfile::TempDir;

use subdex_core::traits::Embedder;
use subdex_core::types::SubjectRow;
use subdex_core::Error;
use subdex_index::{Artifact, SearchEngine};

/// Maps known strings to hand-chosen vectors so ranking is fully under the
/// test's control. Unknown strings embed to the zero vector.
struct StubEmbedder {
    dim: usize,
    vectors: HashMap<String, Vec<f32>>,
}

impl StubEmbedder {
    fn new(dim: usize, entries: &[(&str, &[f32])]) -> Self {
        let vectors = entries
            .iter()
            .map(|(text, v)| ((*text).to_string(), v.to_vec()))
            .collect();
        Self { dim, vectors }
    }
}

impl Embedder for StubEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|t| self.vectors.get(t).cloned().unwrap_or_else(|| vec![0.0; self.dim]))
            .collect())
    }
}

fn stub() -> StubEmbedder {
    // "bearing ring" points near "ring of bearing", far from the light.
    StubEmbedder::new(
        3,
        &[
            ("ring of bearing", &[1.0, 0.0, 0.0]),
            ("front light assembly", &[0.0, 1.0, 0.0]),
            ("bearing ring", &[0.9, 0.1, 0.0]),
        ],
    )
}

fn engine() -> SearchEngine {
    let rows = vec![
        SubjectRow::new("ring of bearing", "/a"),
        SubjectRow::new("front light assembly", "/b"),
    ];
    let artifact = Artifact::build(&rows, &stub()).expect("build");
    SearchEngine::new(artifact, Box::new(stub())).expect("engine")
}

#[test]
fn end_to_end_query_returns_expected_subject() {
    let outcome = engine().search("bearing ring", 1).expect("search");
    assert_eq!(outcome.results.len(), 1);
    let hit = &outcome.results[0];
    assert_eq!(hit.rank, 1);
    assert_eq!(hit.subject, "ring of bearing");
    assert_eq!(hit.links, "/a");
}

#[test]
fn results_are_ranked_descending() {
    let outcome = engine().search("bearing ring", 5).expect("search");
    assert_eq!(outcome.results.len(), 2, "top_k larger than the index is fine");
    assert_eq!(outcome.results[0].subject, "ring of bearing");
    assert_eq!(outcome.results[1].subject, "front light assembly");
    assert!(outcome.results[0].score > outcome.results[1].score);
    assert_eq!(outcome.results[0].rank, 1);
    assert_eq!(outcome.results[1].rank, 2);
}

#[test]
fn blank_query_returns_empty_without_searching() {
    for query in ["", "   ", "\t\n"] {
        let outcome = engine().search(query, 5).expect("search");
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.elapsed, std::time::Duration::ZERO);
    }
}

#[test]
fn top_k_zero_is_empty() {
    let outcome = engine().search("bearing ring", 0).expect("search");
    assert!(outcome.results.is_empty());
}

#[test]
fn hit_without_metadata_is_skipped_not_fatal() {
    let rows = vec![
        SubjectRow::new("ring of bearing", "/a"),
        SubjectRow::new("front light assembly", "/b"),
    ];
    let mut artifact = Artifact::build(&rows, &stub()).expect("build");
    // Simulate an artifact pair assembled from mismatched runs.
    artifact.metadata.truncate(1);

    let engine = SearchEngine::new(artifact, Box::new(stub())).expect("engine");
    let outcome = engine.search("bearing ring", 5).expect("search");
    assert_eq!(outcome.results.len(), 1, "the unmatched hit is dropped silently");
    assert_eq!(outcome.results[0].subject, "ring of bearing");
}

#[test]
fn skipped_hit_leaves_rank_gap() {
    let rows = vec![
        SubjectRow::new("ring of bearing", "/a"),
        SubjectRow::new("front light assembly", "/b"),
    ];
    // Drop metadata for the best hit: the surviving result keeps rank 2.
    let mut artifact = Artifact::build(&rows, &stub()).expect("build");
    artifact.metadata.truncate(1);

    let engine = SearchEngine::new(artifact, Box::new(stub())).expect("engine");
    let outcome = engine.search("front light assembly", 5).expect("search");
    // Best hit is position 1 (the light) whose metadata was truncated away.
    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.results[0].rank, 2);
    assert_eq!(outcome.results[0].subject, "ring of bearing");
}

#[test]
fn dimension_mismatch_is_refused_at_construction() {
    let rows = vec![SubjectRow::new("ring of bearing", "/a")];
    let artifact = Artifact::build(&rows, &stub()).expect("build");
    let wrong = StubEmbedder::new(5, &[]);
    let err = SearchEngine::new(artifact, Box::new(wrong)).unwrap_err();
    assert!(matches!(err, Error::Index(_)));
}

#[test]
fn engine_debug_output_reports_dimension() {
    let rendered = format!("{:?}", engine());
    assert!(rendered.contains("SearchEngine"));
    assert!(rendered.contains("embedder_dim: 3"));
}

#[test]
fn loaded_engine_searches_like_the_fresh_one() {
    let tmp = TempDir::new().unwrap();
    let prefix = tmp.path().join("subjects");

    let rows = vec![
        SubjectRow::new("ring of bearing", "/a"),
        SubjectRow::new("front light assembly", "/b"),
    ];
    Artifact::build(&rows, &stub()).expect("build").save(&prefix).expect("save");

    let engine = SearchEngine::load(&prefix, Box::new(stub())).expect("load");
    assert_eq!(engine.len(), 2);
    let outcome = engine.search("bearing ring", 1).expect("search");
    assert_eq!(outcome.results[0].subject, "ring of bearing");
    assert_eq!(outcome.results[0].links, "/a");
}
