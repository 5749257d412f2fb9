//! The set of trailing word forms that flip subject ordering.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Immutable set of word forms that, when they end a detail's cleaned text,
/// make the text precede the title in the normalized subject.
///
/// Loaded once per transform run and passed in explicitly so tests can
/// inject their own set.
#[derive(Debug, Clone)]
pub struct EndingSet {
    words: HashSet<String>,
}

impl EndingSet {
    /// Build from an explicit list of word forms.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { words: words.into_iter().map(Into::into).collect() }
    }

    /// The fallback used when no endings file is available: `{"of"}`.
    pub fn fallback() -> Self {
        Self::from_words(["of"])
    }

    /// Load from a plain-text file, one token per line, blank lines ignored.
    /// A missing, unreadable or empty file falls back to [`Self::fallback`].
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => {
                let words: HashSet<String> = content
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(str::to_string)
                    .collect();
                if words.is_empty() {
                    warn!(path = %path.display(), "endings file is empty, using fallback");
                    Self::fallback()
                } else {
                    debug!(path = %path.display(), count = words.len(), "loaded endings");
                    Self { words }
                }
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "endings file unavailable, using fallback");
                Self::fallback()
            }
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
