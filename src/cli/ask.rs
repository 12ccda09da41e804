use crate::config::GenerationConfig;
use crate::generation::AzureOpenAiClient;
use crate::knowledge::KnowledgeBase;
use crate::rag::{compare, Comparison};
use std::path::Path;

/// Build the completion client from the config file and environment
pub fn open_client(config_path: &Path) -> Result<AzureOpenAiClient, String> {
    let config = GenerationConfig::load(config_path).map_err(|e| e.to_string())?;
    AzureOpenAiClient::new(config).map_err(|e| e.to_string())
}

/// Run the ask command against the built-in knowledge
pub async fn run_ask(question: &str, config_path: &Path) -> Result<(), String> {
    if question.trim().is_empty() {
        return Err("Question must not be empty".to_string());
    }

    let client = open_client(config_path)?;
    let kb = KnowledgeBase::new();

    let comparison = compare(&client, &kb, question).await;
    print_comparison(&comparison);

    Ok(())
}

/// Pane text shown when the comparison cannot be made
const FAILED_ANSWER: &str = "An error occurred. Please try again.";

pub fn print_comparison(comparison: &Comparison) {
    print!("{}", render_comparison(comparison));
}

/// Both answer sections. A failed standard request fails the whole
/// comparison, so both panes show the error.
fn render_comparison(comparison: &Comparison) -> String {
    let (rag, standard, sources) = match &comparison.standard {
        Ok(answer) => {
            let sources = if comparison.sources.is_empty() {
                "(no knowledge used)".to_string()
            } else {
                let ids: Vec<String> = comparison.sources.iter().map(|id| id.to_string()).collect();
                format!("(knowledge used: {})", ids.join(", "))
            };
            (comparison.rag.clone(), answer.clone(), Some(sources))
        }
        Err(e) => {
            let failed = format!("{} ({})", FAILED_ANSWER, e);
            (failed.clone(), failed, None)
        }
    };

    let mut out = String::new();
    out.push_str("RAG Answer\n==========\n\n");
    out.push_str(&format!("{}\n\n", rag));
    if let Some(sources) = sources {
        out.push_str(&format!("{}\n\n", sources));
    }
    out.push_str("Standard Answer\n===============\n\n");
    out.push_str(&format!("{}\n\n", standard));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationError;

    #[test]
    fn test_render_both_answers() {
        let comparison = Comparison {
            rag: "grounded".to_string(),
            standard: Ok("plain".to_string()),
            sources: vec![2, 3],
        };

        let out = render_comparison(&comparison);
        assert!(out.contains("grounded"));
        assert!(out.contains("plain"));
        assert!(out.contains("(knowledge used: 2, 3)"));
    }

    #[test]
    fn test_render_standard_failure_fails_both_panes() {
        let comparison = Comparison {
            rag: "grounded".to_string(),
            standard: Err(GenerationError::MissingApiKey),
            sources: vec![2],
        };

        let out = render_comparison(&comparison);
        assert!(!out.contains("grounded"));
        assert_eq!(out.matches(FAILED_ANSWER).count(), 2);
        assert!(!out.contains("knowledge used"));
    }
}
