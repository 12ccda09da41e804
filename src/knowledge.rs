use crate::error::KnowledgeError;
use crate::keywords::merge_tags;
use crate::retriever::{score_items, search};
use crate::types::{KnowledgeItem, ScoredMatch};
use std::collections::HashMap;

/// Built-in knowledge every collection starts with: (content, tags)
const SEED: &[(&str, &[&str])] = &[
    (
        "Semantic Kernel is an SDK that allows integrating AI services into applications.",
        &["semantic kernel", "sdk", "ai", "integration"],
    ),
    (
        "RAG stands for Retrieval-Augmented Generation and combines information retrieval with text generation.",
        &["rag", "retrieval", "generation", "text generation"],
    ),
    (
        "Azure OpenAI Service provides REST API accessibility to OpenAI's powerful language models.",
        &["azure", "openai", "api", "language model"],
    ),
];

/// In-memory knowledge collection.
///
/// Ids come from a counter that only moves forward, so a deleted id is never
/// handed out again while the collection lives.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    items: Vec<KnowledgeItem>,
    next_id: u64,
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::new()
    }
}

impl KnowledgeBase {
    /// Create an empty collection
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_id: 1,
        }
    }

    /// Create a collection holding the built-in items
    pub fn new() -> Self {
        let mut kb = Self::empty();
        let now = chrono::Utc::now().to_rfc3339();

        // Seed tags are stored as written, without extracted keywords.
        for (content, tags) in SEED {
            let id = kb.allocate_id();
            kb.items.push(KnowledgeItem {
                id,
                content: content.to_string(),
                tags: tags.iter().map(|t| t.to_string()).collect(),
                created_at: now.clone(),
                updated_at: now.clone(),
            });
        }

        kb
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn position(&self, id: u64) -> Result<usize, KnowledgeError> {
        self.items
            .iter()
            .position(|item| item.id == id)
            .ok_or(KnowledgeError::NotFound(id))
    }

    // =========================================================================
    // Core operations
    // =========================================================================

    /// Add an item, returns its id
    pub fn add(&mut self, content: &str, tags: &[String]) -> u64 {
        let id = self.allocate_id();
        let now = chrono::Utc::now().to_rfc3339();

        self.items.push(KnowledgeItem {
            id,
            content: content.to_string(),
            tags: merge_tags(tags, content),
            created_at: now.clone(),
            updated_at: now,
        });

        tracing::info!(id, "Knowledge added");
        id
    }

    /// Replace an item's content and tags
    pub fn update(
        &mut self,
        id: u64,
        content: &str,
        tags: &[String],
    ) -> Result<KnowledgeItem, KnowledgeError> {
        let index = self.position(id)?;
        let item = &mut self.items[index];

        item.content = content.to_string();
        item.tags = merge_tags(tags, content);
        item.updated_at = chrono::Utc::now().to_rfc3339();

        tracing::info!(id, "Knowledge updated");
        Ok(item.clone())
    }

    /// Remove an item, returning it
    pub fn delete(&mut self, id: u64) -> Result<KnowledgeItem, KnowledgeError> {
        let index = self.position(id)?;
        let removed = self.items.remove(index);

        tracing::info!(id, "Knowledge deleted");
        Ok(removed)
    }

    /// Copy of all items in insertion order
    pub fn get_all(&self) -> Vec<KnowledgeItem> {
        self.items.clone()
    }

    pub fn get_by_id(&self, id: u64) -> Option<&KnowledgeItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Relevant items for a query, most relevant first
    pub fn search(&self, query: &str) -> Vec<&KnowledgeItem> {
        search(query, &self.items)
    }

    /// Relevant items with their scores
    pub fn search_scored(&self, query: &str) -> Vec<ScoredMatch<'_>> {
        score_items(query, &self.items)
    }

    // =========================================================================
    // Stats and metadata
    // =========================================================================

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All tags with the number of items carrying them, most used first
    pub fn tags(&self) -> Vec<(String, usize)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for tag in self.items.iter().flat_map(|item| item.tags.iter()) {
            *counts.entry(tag.as_str()).or_default() += 1;
        }

        let mut tags: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(tag, count)| (tag.to_string(), count))
            .collect();
        tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        tags
    }
}
