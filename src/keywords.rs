use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Words never used as tags
const STOP_WORDS: &[&str] = &["and", "or", "but", "the", "for", "this", "that", "with"];

/// Minimum keyword length
const MIN_KEYWORD_LEN: usize = 3;

fn word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Runs of ASCII word characters; their ends are exactly the ASCII word boundaries.
    PATTERN.get_or_init(|| Regex::new(r"[a-z0-9_]+").expect("static pattern is valid"))
}

/// Extract keywords from text.
///
/// Returns lowercase alphabetic words of at least three letters, minus stop
/// words, deduplicated in order of first occurrence. Callers should treat the
/// result as a set.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut seen = HashSet::new();

    word_pattern()
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|word| word.len() >= MIN_KEYWORD_LEN)
        .filter(|word| word.bytes().all(|b| b.is_ascii_lowercase()))
        .filter(|word| !STOP_WORDS.contains(word))
        .filter(|word| seen.insert(*word))
        .map(str::to_string)
        .collect()
}

/// Merge user tags with extracted keywords.
///
/// User tags are trimmed and lowercased and come first; empties and
/// duplicates are dropped.
pub fn merge_tags(tags: &[String], content: &str) -> Vec<String> {
    let mut seen = HashSet::new();

    tags.iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .chain(extract_keywords(content))
        .filter(|t| seen.insert(t.clone()))
        .collect()
}
