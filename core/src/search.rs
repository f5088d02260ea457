//! Token-overlap relevance scoring and ranking for the chat retriever.
//!
//! This is simple lexical scoring (whole-word hits plus set overlap), not a
//! retrieval engine. A ranking pass is a pure function of the query and the
//! candidate slice; it holds no state across calls.

use crate::tokenizer::{meaningful_tokens, normalize};
use crate::Memory;
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Minimum query tokens a candidate must share with the query.
pub const MIN_MATCHES: usize = 1;
/// Minimum whole-word hits for the preferred selection path.
pub const MIN_WHOLE_WORD: usize = 1;
/// Score floor for candidates with token overlap but no whole-word hit.
pub const MIN_SCORE: f64 = 0.35;
/// Ranked results are truncated to this many hits.
pub const MAX_RESULTS: usize = 10;
/// Snippets are cut at this many characters.
pub const SNIPPET_CHARS: usize = 200;

/// A parsed query: the meaningful token set plus one compiled whole-word
/// pattern per token. Patterns are compiled once per query and reused
/// across the whole candidate slice.
pub struct Query {
    tokens: HashSet<String>,
    word_patterns: Vec<Regex>,
}

impl Query {
    pub fn parse(raw: &str) -> Self {
        let tokens = meaningful_tokens(raw);
        let word_patterns = tokens.iter().map(|t| whole_word_pattern(t)).collect();
        Self { tokens, word_patterns }
    }

    /// True when the raw text had no searchable content (empty, stopwords
    /// or single-character tokens only).
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &HashSet<String> {
        &self.tokens
    }
}

fn whole_word_pattern(token: &str) -> Regex {
    RegexBuilder::new(&format!(r"\b{}\b", regex::escape(token)))
        .case_insensitive(true)
        .build()
        .expect("escaped token is a valid pattern")
}

/// Per-candidate scoring breakdown. `score` is the value reported to
/// callers; `sort_key` additionally folds in the whole-word bonus and is
/// used for ordering only.
#[derive(Debug, Clone)]
pub struct ScoredCandidate<'a> {
    pub memory: &'a Memory,
    /// Query tokens present in the candidate's token set.
    pub matches: usize,
    pub match_ratio: f64,
    pub jaccard: f64,
    /// Query tokens occurring in the search text bounded by non-word
    /// characters or string edges. Presence per token, not occurrences.
    pub whole_word_matches: usize,
}

impl ScoredCandidate<'_> {
    pub fn score(&self) -> f64 {
        self.jaccard.max(self.match_ratio)
    }

    /// Whole-word hits dominate: the additive bonus guarantees any
    /// whole-word match outranks any purely statistical one.
    pub fn sort_key(&self) -> f64 {
        let bonus = if self.whole_word_matches > 0 { 100.0 } else { 0.0 };
        bonus + self.score()
    }

    fn selected(&self) -> bool {
        self.matches >= MIN_MATCHES
            && (self.whole_word_matches >= MIN_WHOLE_WORD || self.score() >= MIN_SCORE)
    }
}

/// Score one candidate against a parsed query.
pub fn score<'a>(query: &Query, memory: &'a Memory) -> ScoredCandidate<'a> {
    let search_text = normalize(&format!("{} {}", memory.title, memory.full_text));
    let memory_tokens = meaningful_tokens(&search_text);

    let matches = query.tokens.intersection(&memory_tokens).count();
    let match_ratio = if query.tokens.is_empty() {
        0.0
    } else {
        matches as f64 / query.tokens.len() as f64
    };
    let jaccard = jaccard(&query.tokens, &memory_tokens);
    let whole_word_matches = query
        .word_patterns
        .iter()
        .filter(|re| re.is_match(&search_text))
        .count();

    ScoredCandidate { memory, matches, match_ratio, jaccard, whole_word_matches }
}

/// Intersection size over union size of two token sets; 0 when the union
/// is empty.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let inter = a.intersection(b).count();
    let union = a.union(b).count();
    if union == 0 {
        0.0
    } else {
        inter as f64 / union as f64
    }
}

/// One ranked result, shaped for the chat response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Hit {
    pub memory_id: String,
    pub title: String,
    pub snippet: String,
    pub score: f64,
    pub whole_word_matches: usize,
    pub matches: usize,
}

/// Rank `memories` against `query`: apply the selection policy, order by
/// the whole-word-bonus sort key (input order preserved for exact ties),
/// dedupe by id and keep the top [`MAX_RESULTS`].
pub fn rank(query: &Query, memories: &[Memory]) -> Vec<Hit> {
    if query.is_empty() {
        return Vec::new();
    }

    let mut candidates: Vec<ScoredCandidate<'_>> = memories
        .iter()
        .map(|m| score(query, m))
        .filter(|c| c.selected())
        .collect();
    // Vec::sort_by is stable, which keeps exact ties in input order.
    candidates.sort_by(|a, b| {
        b.sort_key().partial_cmp(&a.sort_key()).unwrap_or(Ordering::Equal)
    });

    let mut seen: HashSet<&str> = HashSet::new();
    let mut hits = Vec::new();
    for c in candidates {
        if !seen.insert(c.memory.id.as_str()) {
            continue;
        }
        hits.push(Hit {
            memory_id: c.memory.id.clone(),
            title: c.memory.title.clone(),
            snippet: snippet(&c.memory.full_text),
            score: round4(c.score()),
            whole_word_matches: c.whole_word_matches,
            matches: c.matches,
        });
        if hits.len() >= MAX_RESULTS {
            break;
        }
    }
    hits
}

/// Body truncated to [`SNIPPET_CHARS`] characters, with an ellipsis marker
/// when cut.
fn snippet(body: &str) -> String {
    if body.chars().count() <= SNIPPET_CHARS {
        body.to_string()
    } else {
        let mut s: String = body.chars().take(SNIPPET_CHARS).collect();
        s.push('…');
        s
    }
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}
