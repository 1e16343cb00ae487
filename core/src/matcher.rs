//! Keyword overlap matcher.
//!
//! Maps a free-text message to the single most relevant [`KnowledgeEntry`],
//! or reports that nothing matched with enough confidence.
//!
//! # Scoring
//!
//! The message and each stored question are lowercased, trimmed and split into
//! alphanumeric tokens. Stopwords are removed from the message tokens to form
//! the query keywords (falling back to the unfiltered tokens when nothing is
//! left, so "is it" still scores). Then, per entry:
//!
//! | Rule | Points |
//! |------|--------|
//! | query keyword equals a question token | `exact` (3) |
//! | otherwise, keyword contains or is contained in a question keyword | `partial` (1) |
//! | whole question inside whole message, or the reverse | `phrase_bonus` (10) |
//!
//! The entry with the strictly highest score wins (earlier entries win ties)
//! and is returned only if its score reaches `min_score` (2).
//!
//! Everything here is pure and synchronous: `O(entries × keywords)` with no I/O.

use crate::knowledge::KnowledgeEntry;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;

/// Words dropped from a message before keyword scoring.
pub const DEFAULT_STOPWORDS: &[&str] = &[
    "a", "about", "an", "and", "any", "are", "as", "at", "be", "by", "can", "could", "did", "do",
    "does", "for", "from", "get", "has", "have", "how", "i", "if", "in", "is", "it", "its", "me",
    "my", "of", "on", "or", "our", "please", "should", "so", "some", "tell", "that", "the",
    "there", "this", "to", "us", "was", "we", "were", "what", "when", "which", "who", "will",
    "with", "would", "you", "your",
];

/// Alphanumeric runs, Unicode aware.
#[allow(clippy::expect_used)] // Literal pattern, validated by tests
static WORD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{L}\p{N}]+").expect("word pattern is a valid regex"));

/// Lowercase and trim a message.
#[must_use]
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Normalize `text` and split it into word tokens.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    tokenize_normalized(&normalize(text))
}

fn tokenize_normalized(normalized: &str) -> Vec<String> {
    WORD_PATTERN
        .find_iter(normalized)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Tunable scoring weights.
///
/// The defaults are the reference configuration; deployments may adjust them
/// without touching the algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatcherWeights {
    /// Points for a keyword that equals a question token.
    pub exact: u32,
    /// Points for a keyword that overlaps a question keyword as a substring.
    pub partial: u32,
    /// Bonus when the whole question and whole message contain one another.
    pub phrase_bonus: u32,
    /// Minimum winning score for a match to count.
    pub min_score: u32,
}

impl MatcherWeights {
    /// Reference configuration: 3 / 1 / 10, threshold 2.
    pub const DEFAULT: Self = Self {
        exact: 3,
        partial: 1,
        phrase_bonus: 10,
        min_score: 2,
    };
}

impl Default for MatcherWeights {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Set of words ignored when building keywords.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stopwords {
    words: HashSet<String>,
}

impl Stopwords {
    /// Build a stopword set. Words are lowercased.
    #[must_use]
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words.into_iter().map(|w| w.as_ref().to_lowercase()).collect(),
        }
    }

    /// An empty set: every token is a keyword.
    #[must_use]
    pub fn none() -> Self {
        Self {
            words: HashSet::new(),
        }
    }

    /// Whether `word` is a stopword.
    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    /// Drop stopwords from `tokens`.
    ///
    /// If every token is a stopword the unfiltered tokens are returned
    /// instead, so a message like "is it" still has something to score.
    #[must_use]
    pub fn keywords(&self, tokens: &[String]) -> Vec<String> {
        let filtered: Vec<String> = tokens
            .iter()
            .filter(|t| !self.contains(t.as_str()))
            .cloned()
            .collect();

        if filtered.is_empty() {
            tokens.to_vec()
        } else {
            filtered
        }
    }
}

impl Default for Stopwords {
    fn default() -> Self {
        Self::new(DEFAULT_STOPWORDS)
    }
}

/// A knowledge entry together with its score for a given message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoredEntry<'a> {
    /// The scored entry.
    pub entry: &'a KnowledgeEntry,
    /// Its score.
    pub score: u32,
}

/// Normalized message, computed once per call.
#[derive(Debug)]
struct PreparedQuery {
    normalized: String,
    keywords: Vec<String>,
}

/// Keyword overlap matcher over a knowledge snapshot.
#[derive(Clone, Debug, Default)]
pub struct QueryMatcher {
    weights: MatcherWeights,
    stopwords: Stopwords,
}

impl QueryMatcher {
    /// Create a matcher.
    #[must_use]
    pub const fn new(weights: MatcherWeights, stopwords: Stopwords) -> Self {
        Self { weights, stopwords }
    }

    /// Scoring weights in use.
    #[must_use]
    pub const fn weights(&self) -> &MatcherWeights {
        &self.weights
    }

    /// Stopwords in use.
    #[must_use]
    pub const fn stopwords(&self) -> &Stopwords {
        &self.stopwords
    }

    /// Return the answer of the best entry, or `None` when no entry reaches
    /// the minimum score.
    ///
    /// Entries whose answer is blank are skipped: they have nothing to say.
    #[must_use]
    pub fn find_answer<'a>(&self, message: &str, entries: &'a [KnowledgeEntry]) -> Option<&'a str> {
        self.best_match(message, entries)
            .map(|scored| scored.entry.answer.as_str())
    }

    /// Return the best entry with its score, or `None` when no entry reaches
    /// the minimum score.
    #[must_use]
    pub fn best_match<'a>(
        &self,
        message: &str,
        entries: &'a [KnowledgeEntry],
    ) -> Option<ScoredEntry<'a>> {
        let query = self.prepare(message);

        let mut best: Option<ScoredEntry<'a>> = None;
        for entry in entries.iter().filter(|e| !e.answer.trim().is_empty()) {
            let score = self.score_prepared(&query, entry);
            // Strictly greater: the first entry keeps a tie
            if best.is_none_or(|b| score > b.score) {
                best = Some(ScoredEntry { entry, score });
            }
        }

        let best = best.filter(|b| b.score >= self.weights.min_score);

        match &best {
            Some(b) => tracing::debug!(score = b.score, question = %b.entry.question, "Knowledge match"),
            None => tracing::debug!(keywords = ?query.keywords, "No confident knowledge match"),
        }

        best
    }

    /// Rank entries with a positive score, highest first, keeping storage order
    /// among equal scores. At most `limit` entries are returned.
    #[must_use]
    pub fn rank<'a>(
        &self,
        message: &str,
        entries: &'a [KnowledgeEntry],
        limit: usize,
    ) -> Vec<ScoredEntry<'a>> {
        let query = self.prepare(message);

        let mut scored: Vec<ScoredEntry<'a>> = entries
            .iter()
            .map(|entry| ScoredEntry {
                entry,
                score: self.score_prepared(&query, entry),
            })
            .filter(|s| s.score > 0)
            .collect();

        // Stable sort keeps storage order for equal scores
        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored.truncate(limit);
        scored
    }

    /// Score a single entry against `message`.
    #[must_use]
    pub fn score(&self, message: &str, entry: &KnowledgeEntry) -> u32 {
        self.score_prepared(&self.prepare(message), entry)
    }

    fn prepare(&self, message: &str) -> PreparedQuery {
        let normalized = normalize(message);
        let tokens = tokenize_normalized(&normalized);
        let keywords = self.stopwords.keywords(&tokens);
        PreparedQuery {
            normalized,
            keywords,
        }
    }

    fn score_prepared(&self, query: &PreparedQuery, entry: &KnowledgeEntry) -> u32 {
        let question = normalize(&entry.question);
        let question_tokens = tokenize_normalized(&question);
        let question_keywords = self.stopwords.keywords(&question_tokens);

        let mut score = 0;
        for keyword in &query.keywords {
            if question_tokens.iter().any(|t| t == keyword) {
                score += self.weights.exact;
            } else if question_keywords
                .iter()
                .any(|q| q.contains(keyword.as_str()) || keyword.contains(q.as_str()))
            {
                score += self.weights.partial;
            }
        }

        if !question.is_empty()
            && !query.normalized.is_empty()
            && (query.normalized.contains(&question) || question.contains(&query.normalized))
        {
            score += self.weights.phrase_bonus;
        }

        score
    }
}
