use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref NON_WORD: Regex = Regex::new(r"(?u)[^\p{L}\p{N}\s]+").expect("valid regex");
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","an","the","is","are","am","i","me","you","he","she","it","we","they",
            "and","or","but","of","in","on","for","with","to","from","by","at","as",
            "this","that","these","those","be","been","was","were","do","did","does",
            "have","has","had","my","your","their","its","so","if","not","no","will",
            "can","could","would","should","about","what","which","who","whom","when",
            "where","why","how","all","any","some","one","two","three",
        ];
        words.iter().copied().collect()
    };
}

pub fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// NFKC-normalize and lowercase. Whole-word checks in scoring run against
/// the same normalized text the tokenizer splits, so both must go through
/// here.
pub fn normalize(text: &str) -> String {
    text.nfkc().collect::<String>().to_lowercase()
}

/// Split text into lowercase word tokens. Anything that is not a letter,
/// digit or whitespace acts as a separator; empty fragments are dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = normalize(text);
    let cleaned = NON_WORD.replace_all(&normalized, " ");
    cleaned.split_whitespace().map(str::to_string).collect()
}

/// Deduplicated searchable tokens: stopwords and single-character tokens
/// are removed. An empty result means the input has no searchable content
/// and callers should short-circuit instead of scoring anything.
pub fn meaningful_tokens(text: &str) -> HashSet<String> {
    tokenize(text)
        .into_iter()
        .filter(|t| !is_stopword(t))
        .filter(|t| t.chars().count() > 1)
        .collect()
}
