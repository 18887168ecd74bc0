//! Fuzzy word index over journal entries.
//!
//! Dictated text comes back from transcription with the occasional mangled
//! word, so lookups are ranked by normalized edit-distance similarity instead
//! of exact matching. The index is rebuilt from the journal contents on every
//! search; nothing here persists.

use std::collections::HashMap;

use tracing::debug;

/// Matches below this similarity are dropped, both per word and in aggregate.
const CUTOFF_CONFIDENCE: f32 = 0.75;

/// A scored search hit. `confidence` is in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Rank {
    pub id: String,
    pub confidence: f32,
}

/// Inverted index: lowercased word to the document ids containing it.
#[derive(Debug, Default)]
pub struct SearchIndex {
    index: HashMap<String, Vec<String>>,
}

impl SearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes every word of `text` under `id`.
    pub fn add(&mut self, id: &str, text: &str) {
        for word in words_in(text) {
            self.index
                .entry(word.to_lowercase())
                .or_default()
                .push(id.to_string());
        }
    }

    /// Returns hits with aggregate confidence of at least 0.75, best first.
    ///
    /// Each distinct query word is matched fuzzily against the indexed
    /// vocabulary; a word's similarity is spread evenly across the query words
    /// so that a document must match most of the query to surface.
    pub fn search(&self, query: &str) -> Vec<Rank> {
        let mut word_results: HashMap<String, HashMap<String, f32>> = HashMap::new();
        for word in words_in(query) {
            let word = word.to_lowercase();
            let matches = self.closest_matches(&word);
            debug!(word, matches = ?matches, "closest matches");

            let hits: &mut HashMap<String, f32> = word_results.entry(word).or_default();
            for m in matches {
                for id in &self.index[&m.id] {
                    let slot = hits.entry(id.clone()).or_insert(0.0);
                    if m.confidence > *slot {
                        *slot = m.confidence;
                    }
                }
            }
        }

        let query_words = word_results.len() as f32;
        let mut totals: HashMap<String, f32> = HashMap::new();
        for hits in word_results.values() {
            for (id, confidence) in hits {
                *totals.entry(id.clone()).or_insert(0.0) += confidence / query_words;
            }
        }

        let mut ranks: Vec<Rank> = totals
            .into_iter()
            .map(|(id, confidence)| Rank { id, confidence })
            .filter(|r| r.confidence >= CUTOFF_CONFIDENCE)
            .collect();
        ranks.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        ranks
    }

    /// Indexed words whose similarity to `word` passes the per-word cutoff.
    fn closest_matches(&self, word: &str) -> Vec<Rank> {
        let word_len = word.chars().count();
        let mut ranks: Vec<Rank> = self
            .index
            .keys()
            .map(|target| Rank {
                id: target.clone(),
                confidence: 1.0
                    - levenshtein(word, target).min(word_len) as f32 / word_len as f32,
            })
            .filter(|r| r.confidence >= CUTOFF_CONFIDENCE)
            .collect();
        ranks.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        ranks
    }
}

/// Splits on anything that is neither letter nor digit.
fn words_in(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
}

/// Classic edit distance over code points, one rolling column of memory.
fn levenshtein(s: &str, t: &str) -> usize {
    let s: Vec<char> = s.chars().collect();
    let t: Vec<char> = t.chars().collect();
    let mut column: Vec<usize> = (0..=s.len()).collect();

    for (x, tc) in t.iter().enumerate() {
        column[0] = x + 1;
        let mut last_diag = x;
        for (y, sc) in s.iter().enumerate() {
            let old_diag = column[y + 1];
            let cost = if sc == tc { 0 } else { 1 };
            column[y + 1] = (column[y + 1] + 1)
                .min(column[y] + 1)
                .min(last_diag + cost);
            last_diag = old_diag;
        }
    }
    column[s.len()]
}
