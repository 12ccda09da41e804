use crate::types::{KnowledgeItem, ScoredMatch};
use std::cmp::Ordering;

/// Bonus when the whole query appears in the content
const EXACT_PHRASE_BONUS: f64 = 10.0;
/// Keyword found with a space on each side
const WORD_MATCH_BONUS: f64 = 3.0;
/// Keyword found anywhere in the content
const PARTIAL_MATCH_BONUS: f64 = 2.0;
const EXACT_TAG_BONUS: f64 = 3.0;
const PARTIAL_TAG_BONUS: f64 = 1.0;
/// Coverage above which the score is boosted
const COVERAGE_THRESHOLD: f64 = 0.5;

/// Split a lowercased query into search terms.
///
/// Tokens of a single UTF-16 unit are dropped before punctuation is
/// stripped, so a token such as `"?!"` survives as an empty term and an
/// astral-plane symbol such as an emoji is kept.
pub fn query_keywords(lowercase_query: &str) -> Vec<String> {
    lowercase_query
        .split_whitespace()
        .filter(|word| word.encode_utf16().count() > 1)
        .map(|word| word.replace(['?', '.', ',', '!'], ""))
        .collect()
}

/// Score one item against a prepared query
fn score_item<'a>(
    item: &'a KnowledgeItem,
    lowercase_query: &str,
    keywords: &[String],
) -> ScoredMatch<'a> {
    let content = item.content.to_lowercase();
    let tags: Vec<String> = item.tags.iter().map(|t| t.to_lowercase()).collect();

    let mut score = 0.0;
    let exact_phrase_match = content.contains(lowercase_query);
    if exact_phrase_match {
        score += EXACT_PHRASE_BONUS;
    }

    for keyword in keywords {
        if content.contains(&format!(" {} ", keyword)) {
            score += WORD_MATCH_BONUS;
        } else if content.contains(keyword.as_str()) {
            score += PARTIAL_MATCH_BONUS;
        }

        if tags.iter().any(|tag| tag == keyword) {
            score += EXACT_TAG_BONUS;
        } else if tags.iter().any(|tag| tag.contains(keyword.as_str())) {
            score += PARTIAL_TAG_BONUS;
        }
    }

    let coverage = coverage(&content, keywords);
    if coverage > COVERAGE_THRESHOLD {
        score *= 1.0 + coverage;
    }

    ScoredMatch {
        item,
        score,
        exact_phrase_match,
    }
}

/// Fraction of keywords found in the content, 0 when there are none
fn coverage(content: &str, keywords: &[String]) -> f64 {
    if keywords.is_empty() {
        return 0.0;
    }

    let matched = keywords
        .iter()
        .filter(|keyword| content.contains(keyword.as_str()))
        .count();

    matched as f64 / keywords.len() as f64
}

/// Rank items against a query, keeping only those with a positive score.
///
/// Exact phrase matches come first, then higher scores. Ties keep collection
/// order. A blank query matches nothing.
pub fn score_items<'a>(query: &str, items: &'a [KnowledgeItem]) -> Vec<ScoredMatch<'a>> {
    if query.trim().is_empty() {
        tracing::debug!("Empty query, skipping retrieval");
        return Vec::new();
    }

    let lowercase_query = query.to_lowercase();
    let keywords = query_keywords(&lowercase_query);
    tracing::debug!(query, ?keywords, "Searching knowledge");

    let mut results: Vec<ScoredMatch<'a>> = items
        .iter()
        .map(|item| score_item(item, &lowercase_query, &keywords))
        .filter(|m| m.score > 0.0)
        .collect();

    results.sort_by(|a, b| {
        b.exact_phrase_match
            .cmp(&a.exact_phrase_match)
            .then_with(|| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal))
    });

    tracing::debug!(
        found = ?results.iter().map(|m| (m.item.id, m.score)).collect::<Vec<_>>(),
        "Documents found"
    );

    results
}

/// Return the relevant items for a query, most relevant first
pub fn search<'a>(query: &str, items: &'a [KnowledgeItem]) -> Vec<&'a KnowledgeItem> {
    score_items(query, items)
        .into_iter()
        .map(|m| m.item)
        .collect()
}
