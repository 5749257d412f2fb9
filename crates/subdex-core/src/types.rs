//! Domain types for the corpus, the tabular dataset and search results.

use serde::{Deserialize, Serialize};

/// Details below this type code are navigation/chrome entries and never
/// reach the index.
pub const DETAIL_TYPE_MIN: i64 = 100;

/// One record of the raw JSON corpus.
///
/// Field names follow the corpus file (`Title`, `Details`); every field
/// defaults when absent so a sparse record deserializes instead of
/// requiring permissive key lookup at use sites.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorpusRecord {
    #[serde(rename = "Title", default)]
    pub title: String,
    #[serde(rename = "Details", default)]
    pub details: Vec<Detail>,
}

/// A detail entry owned by a [`CorpusRecord`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Detail {
    #[serde(rename = "DetailType", default)]
    pub detail_type: i64,
    #[serde(rename = "Text", default)]
    pub text: String,
    #[serde(rename = "Links", default)]
    pub links: Vec<String>,
}

impl Detail {
    /// Whether this detail participates in indexing.
    pub fn is_indexable(&self) -> bool {
        self.detail_type >= DETAIL_TYPE_MIN
    }
}

/// The indexing unit: a flat normalized subject plus its space-joined links.
///
/// `links` stays a single joined string (not a list) because that is the
/// shape the table file and the artifact metadata carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRow {
    pub subject: String,
    pub links: String,
}

impl SubjectRow {
    pub fn new(subject: impl Into<String>, links: impl Into<String>) -> Self {
        Self { subject: subject.into(), links: links.into() }
    }
}

/// One ranked hit returned by the query engine.
///
/// `rank` is the 1-based position of the hit as the index returned it;
/// a hit dropped for lacking metadata leaves a gap in the numbering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub rank: usize,
    pub score: f32,
    pub subject: String,
    pub links: String,
}
