use crate::keywords::extract_keywords;
use crate::knowledge::KnowledgeBase;
use crate::types::KnowledgeItem;

/// Longest content preview printed in listings
const PREVIEW_CHARS: usize = 200;

/// Parse comma-separated tags, dropping blanks
pub fn parse_tags(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Run the search command
pub fn run_search(query: &str, limit: usize, scores: bool) -> Result<(), String> {
    let kb = KnowledgeBase::new();
    print_search(&kb, query, limit, scores);
    Ok(())
}

/// Run the list command
pub fn run_list() -> Result<(), String> {
    let kb = KnowledgeBase::new();
    print_list(&kb);
    Ok(())
}

/// Run the keywords command
pub fn run_keywords(text: &str) -> Result<(), String> {
    let keywords = extract_keywords(text);

    if keywords.is_empty() {
        println!("No keywords.");
    } else {
        println!("{}", keywords.join(", "));
    }

    Ok(())
}

pub fn print_search(kb: &KnowledgeBase, query: &str, limit: usize, scores: bool) {
    let results = kb.search_scored(query);

    if results.is_empty() {
        println!("No matching knowledge.");
        return;
    }

    for m in results.into_iter().take(limit) {
        if scores {
            let marker = if m.exact_phrase_match { ", exact phrase" } else { "" };
            println!("[{}] score: {:.2}{}", m.item.id, m.score, marker);
            print_body(m.item);
        } else {
            print_item(m.item);
        }
    }
}

pub fn print_list(kb: &KnowledgeBase) {
    if kb.is_empty() {
        println!("No knowledge yet. Add some with: add <content> | <tags>");
        return;
    }

    let items = kb.get_all();

    println!("Knowledge base ({} items):\n", items.len());
    for item in &items {
        print_item(item);
    }
}

pub fn print_tags(kb: &KnowledgeBase) {
    let tags = kb.tags();

    if tags.is_empty() {
        println!("No tags yet.");
        return;
    }

    println!("Tags:\n");
    for (tag, count) in tags {
        println!("  {:20} ({})", tag, count);
    }
}

/// Print one item in full
pub fn print_detail(item: &KnowledgeItem) {
    println!("[{}]", item.id);
    println!("    created: {}", item.created_at);
    println!("    updated: {}", item.updated_at);
    if !item.tags.is_empty() {
        println!("    tags: {}", item.tags.join(", "));
    }
    println!("\n{}\n", item.content);
}

fn print_item(item: &KnowledgeItem) {
    println!("[{}]", item.id);
    print_body(item);
}

fn print_body(item: &KnowledgeItem) {
    if !item.tags.is_empty() {
        println!("    tags: {}", item.tags.join(", "));
    }
    println!("    {}\n", preview(&item.content, PREVIEW_CHARS));
}

/// Single-line preview, truncated on a char boundary
fn preview(content: &str, max_chars: usize) -> String {
    let mut preview: String = content.chars().take(max_chars).collect();
    if content.chars().count() > max_chars {
        preview.push_str("...");
    }
    preview.replace('\n', " ")
}
