//! Batch passes over the corpus and the subject table.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::info;

use crate::endings::EndingSet;
use crate::error::{Error, Result};
use crate::normalize::normalize_subject;
use crate::types::{CorpusRecord, SubjectRow};

lazy_static! {
    // Non-greedy, so adjacent groups are removed one by one and nested
    // groups collapse from the innermost '(' outward.
    static ref PARENTHETICAL: Regex = Regex::new(r"\s*\(.*?\)").expect("valid regex");
}

/// Read a JSON corpus file and produce the ordered subject table.
///
/// Corpus iteration order and per-record detail order are preserved. Any
/// parse failure aborts the whole run; there is no per-record recovery.
pub fn transform_corpus(json_path: &Path, endings: &EndingSet) -> Result<Vec<SubjectRow>> {
    if !json_path.exists() {
        return Err(Error::missing(json_path));
    }
    let content = fs::read_to_string(json_path)?;
    let records: Vec<CorpusRecord> = serde_json::from_str(&content)
        .map_err(|e| Error::MalformedInput(format!("{}: {}", json_path.display(), e)))?;

    let mut rows = Vec::new();
    for record in &records {
        for detail in record.details.iter().filter(|d| d.is_indexable()) {
            rows.push(normalize_subject(&record.title, detail, endings));
        }
    }
    info!(records = records.len(), rows = rows.len(), "transformed corpus");
    Ok(rows)
}

/// Remove parenthetical substrings (and one leading whitespace run before
/// each) from every subject. Links are untouched. Applying the pass twice
/// yields the same table as applying it once.
pub fn clean_subjects(rows: &mut [SubjectRow]) {
    for row in rows {
        row.subject = strip_parentheticals(&row.subject);
    }
}

/// Single-row form of the cleanup pass.
pub fn strip_parentheticals(subject: &str) -> String {
    PARENTHETICAL.replace_all(subject, "").trim().to_string()
}

/// Drop every row whose links field is blank after trimming.
/// Returns `(kept, dropped)`; kept + dropped equals the input row count.
pub fn filter_linked(rows: Vec<SubjectRow>) -> (Vec<SubjectRow>, usize) {
    let total = rows.len();
    let kept: Vec<SubjectRow> = rows.into_iter().filter(|r| !r.links.trim().is_empty()).collect();
    let dropped = total - kept.len();
    (kept, dropped)
}

/// Maximum length, in characters, of a trailing word worth reporting as an
/// EndingSet candidate.
const REPORT_ENDING_MAX_CHARS: usize = 4;
const REPORT_EXAMPLES_PER_ENDING: usize = 5;

/// Diagnostic pass used to curate the endings file: group subjects by their
/// last word when that word is short, keep a few examples per group, and
/// render a sorted report. No data is mutated.
pub fn endings_report(rows: &[SubjectRow]) -> String {
    let mut groups: BTreeMap<String, Vec<&str>> = BTreeMap::new();
    for row in rows {
        let subject = row.subject.trim();
        let Some(last) = subject.split_whitespace().last() else { continue };
        if last.chars().count() > REPORT_ENDING_MAX_CHARS {
            continue;
        }
        let examples = groups.entry(last.to_string()).or_default();
        if examples.len() < REPORT_EXAMPLES_PER_ENDING {
            examples.push(subject);
        }
    }

    let mut report = String::new();
    for (ending, examples) in &groups {
        report.push_str(ending);
        report.push('\n');
        for example in examples {
            report.push_str("    ");
            report.push_str(example);
            report.push('\n');
        }
        report.push('\n');
    }
    report
}
