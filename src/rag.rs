use crate::error::GenerationError;
use crate::generation::TextGenerator;
use crate::knowledge::KnowledgeBase;
use crate::types::{ChatMessage, KnowledgeItem};

/// System prompt used when no knowledge applies
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant. Answer the question to the best of your knowledge.";

/// Coarse topic of a query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Rag,
    SemanticKernel,
    AzureOpenAi,
    General,
}

/// Classify a query by keyword, first match wins
pub fn classify_query(query: &str) -> Topic {
    let q = query.to_lowercase();
    let any = |words: &[&str]| words.iter().any(|w| q.contains(w));

    if any(&["rag", "retrieval", "generation"]) {
        Topic::Rag
    } else if any(&["semantic", "kernel"]) {
        Topic::SemanticKernel
    } else if any(&["azure", "api", "openai"]) {
        Topic::AzureOpenAi
    } else {
        Topic::General
    }
}

/// Join item contents into one context block
pub fn build_context(items: &[&KnowledgeItem]) -> String {
    items
        .iter()
        .map(|item| item.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// System prompt for a context block, or the default when it is blank
pub fn build_system_prompt(context: &str) -> String {
    if context.trim().is_empty() {
        return DEFAULT_SYSTEM_PROMPT.to_string();
    }

    format!(
        "You are a helpful assistant with access to specific knowledge.\n\
         Answer the question based primarily on this information:\n\n\
         {}\n\n\
         Provide a direct and concise answer based on the provided information.\n\
         If the information doesn't fully answer the question, you may supplement \
         with general knowledge, but prioritize the provided context.",
        context
    )
}

/// Both answers to one question
#[derive(Debug)]
pub struct Comparison {
    /// Answer grounded on retrieved knowledge; failures are rendered as text
    pub rag: String,
    /// Answer without any retrieved knowledge
    pub standard: Result<String, GenerationError>,
    /// Ids of the items used as context
    pub sources: Vec<u64>,
}

/// Ask with context retrieved from the knowledge base.
///
/// Returns the answer and the ids of the items used.
pub async fn answer_with_context<G: TextGenerator + ?Sized>(
    generator: &G,
    kb: &KnowledgeBase,
    query: &str,
) -> Result<(String, Vec<u64>), GenerationError> {
    let relevant = kb.search(query);
    let sources: Vec<u64> = relevant.iter().map(|item| item.id).collect();
    let context = build_context(&relevant);

    tracing::debug!(topic = ?classify_query(query), ?sources, "Retrieved context");
    if context.trim().is_empty() {
        tracing::info!("No context found, using default prompt");
    } else {
        tracing::info!(documents = sources.len(), "Using context-aware prompt");
    }

    let messages = vec![
        ChatMessage::system(build_system_prompt(&context)),
        ChatMessage::user(query),
    ];

    let answer = generator.generate(&messages).await?;
    Ok((answer, sources))
}

/// Ask with the default prompt only
pub async fn answer_without_context<G: TextGenerator + ?Sized>(
    generator: &G,
    query: &str,
) -> Result<String, GenerationError> {
    let messages = vec![
        ChatMessage::system(DEFAULT_SYSTEM_PROMPT),
        ChatMessage::user(query),
    ];

    generator.generate(&messages).await.inspect_err(|e| {
        tracing::error!(error = %e, "Request without context failed");
    })
}

/// Ask both ways at once and wait for both answers
pub async fn compare<G: TextGenerator + ?Sized>(
    generator: &G,
    kb: &KnowledgeBase,
    query: &str,
) -> Comparison {
    let (with_context, standard) = tokio::join!(
        answer_with_context(generator, kb, query),
        answer_without_context(generator, query),
    );

    let (rag, sources) = match with_context {
        Ok(answer) => answer,
        Err(e) => {
            tracing::error!(error = %e, "Request with context failed");
            (
                format!(
                    "I couldn't process your question due to a technical issue. Details: {}",
                    e
                ),
                Vec::new(),
            )
        }
    };

    Comparison {
        rag,
        standard,
        sources,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every request; answers "plain" to the default prompt, "grounded" otherwise
    #[derive(Default)]
    struct RecordingGenerator {
        calls: Mutex<Vec<Vec<ChatMessage>>>,
        fail_with_context: bool,
    }

    #[async_trait]
    impl TextGenerator for RecordingGenerator {
        async fn generate(&self, messages: &[ChatMessage]) -> Result<String, GenerationError> {
            self.calls.lock().unwrap().push(messages.to_vec());

            let system = &messages[0].content;
            if self.fail_with_context && system != DEFAULT_SYSTEM_PROMPT {
                return Err(GenerationError::MalformedResponse("boom".to_string()));
            }
            if system == DEFAULT_SYSTEM_PROMPT {
                Ok("plain".to_string())
            } else {
                Ok("grounded".to_string())
            }
        }
    }

    #[test]
    fn test_classify_query() {
        assert_eq!(classify_query("What is RAG?"), Topic::Rag);
        assert_eq!(classify_query("Semantic Kernel plugins"), Topic::SemanticKernel);
        assert_eq!(classify_query("Azure pricing"), Topic::AzureOpenAi);
        assert_eq!(classify_query("How tall is Everest"), Topic::General);
    }

    #[test]
    fn test_build_system_prompt() {
        assert_eq!(build_system_prompt("   "), DEFAULT_SYSTEM_PROMPT);

        let prompt = build_system_prompt("Fact one.\n\nFact two.");
        assert!(prompt.contains("Fact one.\n\nFact two."));
        assert!(prompt.starts_with("You are a helpful assistant with access to specific knowledge."));
    }

    #[test]
    fn test_build_context() {
        let kb = KnowledgeBase::new();
        let items: Vec<&KnowledgeItem> = [1, 3].iter().filter_map(|id| kb.get_by_id(*id)).collect();

        let context = build_context(&items);
        assert_eq!(context.split("\n\n").count(), 2);
        assert!(context.starts_with("Semantic Kernel"));
    }

    #[tokio::test]
    async fn test_answer_with_context_uses_retrieved_items() {
        let generator = RecordingGenerator::default();
        let kb = KnowledgeBase::new();

        let (answer, sources) = answer_with_context(&generator, &kb, "What is RAG?").await.unwrap();
        assert_eq!(answer, "grounded");
        assert_eq!(sources[0], 2);

        let calls = generator.calls.lock().unwrap();
        let messages = &calls[0];
        assert_eq!(messages.len(), 2);
        assert!(messages[0].content.contains("Retrieval-Augmented Generation"));
        assert_eq!(messages[1], ChatMessage::user("What is RAG?"));
    }

    #[tokio::test]
    async fn test_answer_with_context_falls_back_to_default_prompt() {
        let generator = RecordingGenerator::default();
        let kb = KnowledgeBase::new();

        let (answer, sources) = answer_with_context(&generator, &kb, "zebras").await.unwrap();
        assert_eq!(answer, "plain");
        assert!(sources.is_empty());
    }

    #[tokio::test]
    async fn test_compare_issues_both_requests() {
        let generator = RecordingGenerator::default();
        let kb = KnowledgeBase::new();

        let comparison = compare(&generator, &kb, "Tell me about Azure OpenAI").await;
        assert_eq!(comparison.rag, "grounded");
        assert_eq!(comparison.standard.unwrap(), "plain");
        assert_eq!(comparison.sources[0], 3);
        assert_eq!(generator.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_compare_renders_rag_failure() {
        let generator = RecordingGenerator {
            fail_with_context: true,
            ..Default::default()
        };
        let kb = KnowledgeBase::new();

        let comparison = compare(&generator, &kb, "What is RAG?").await;
        assert!(comparison
            .rag
            .starts_with("I couldn't process your question due to a technical issue."));
        assert!(comparison.sources.is_empty());
        assert_eq!(comparison.standard.unwrap(), "plain");
    }
}
