use brain_core::tokenizer::{meaningful_tokens, tokenize};

#[test]
fn it_lowercases_and_strips_punctuation() {
    let toks = tokenize("Machine-Learning: the BASICS (2024)!");
    assert_eq!(toks, vec!["machine", "learning", "the", "basics", "2024"]);
}

#[test]
fn it_handles_unicode_word_characters() {
    let toks = tokenize("naïve ﬁle café");
    // NFKC folds the ligature; accented letters stay word characters.
    assert_eq!(toks, vec!["naïve", "file", "café"]);
}

#[test]
fn it_filters_stopwords_and_short_tokens() {
    let toks = meaningful_tokens("I saved a note about the cat and my dog x");
    assert!(toks.contains("saved"));
    assert!(toks.contains("note"));
    assert!(toks.contains("cat"));
    assert!(toks.contains("dog"));
    assert!(!toks.contains("the"));
    assert!(!toks.contains("and"));
    assert!(!toks.contains("about"));
    assert!(!toks.contains("i"));
    assert!(!toks.contains("x"));
}

#[test]
fn it_deduplicates_into_a_set() {
    let toks = meaningful_tokens("cat CAT cat! Cat.");
    assert_eq!(toks.len(), 1);
    assert!(toks.contains("cat"));
}

#[test]
fn degenerate_inputs_yield_empty_sets() {
    assert!(meaningful_tokens("").is_empty());
    assert!(meaningful_tokens("   \t\n").is_empty());
    assert!(meaningful_tokens("...!!!???").is_empty());
    assert!(meaningful_tokens("the and of a i").is_empty());
    assert!(meaningful_tokens("a b c d").is_empty());
}

#[test]
fn tokenization_is_deterministic() {
    let text = "Covers machine learning basics and linear models.";
    assert_eq!(meaningful_tokens(text), meaningful_tokens(text));
    assert_eq!(tokenize(text), tokenize(text));
}

#[test]
fn filtering_is_a_fixed_point() {
    // Re-tokenizing the filtered tokens removes nothing further.
    let toks = meaningful_tokens("The quick brown fox jumps over the lazy dog");
    let joined = toks.iter().cloned().collect::<Vec<_>>().join(" ");
    assert_eq!(meaningful_tokens(&joined), toks);
}

#[test]
fn token_sets_ignore_ordering_and_repetition() {
    let a = meaningful_tokens("machine learning basics");
    let b = meaningful_tokens("basics machine machine learning");
    assert_eq!(a, b);
}
