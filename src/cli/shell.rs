//! Interactive session. The knowledge base lives as long as the shell does.

use crate::cli::ask::{open_client, print_comparison};
use crate::cli::knowledge::{parse_tags, print_detail, print_list, print_search, print_tags};
use crate::generation::AzureOpenAiClient;
use crate::knowledge::KnowledgeBase;
use crate::rag::compare;
use std::io::Write;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

const SEARCH_LIMIT: usize = 10;

const HELP: &str = "\
Commands:
  ask <question>                 compare RAG and standard answers
  search <query>                 rank knowledge for a query
  add <content> [| tags]         add knowledge (tags comma-separated)
  update <id> <content> [| tags] replace an item's content and tags
  delete <id>                    delete an item
  show <id>                      show one item
  list                           list all knowledge
  tags                           list tags
  help                           show this help
  quit                           leave the shell

Any other input is asked as a question.";

/// A parsed shell line
#[derive(Debug, PartialEq)]
enum ShellCommand {
    Ask(String),
    Search(String),
    Add { content: String, tags: Vec<String> },
    Update { id: u64, content: String, tags: Vec<String> },
    Delete(u64),
    Show(u64),
    List,
    Tags,
    Help,
    Quit,
    Empty,
}

/// Split `content | tags` into content and tags
fn parse_entry(rest: &str) -> Result<(String, Vec<String>), String> {
    let (content, tags) = match rest.split_once('|') {
        Some((content, tags)) => (content.trim(), parse_tags(tags)),
        None => (rest.trim(), Vec::new()),
    };

    if content.is_empty() {
        return Err("Content must not be empty".to_string());
    }

    Ok((content.to_string(), tags))
}

fn parse_id(text: &str) -> Result<u64, String> {
    text.trim()
        .parse()
        .map_err(|_| format!("Invalid ID: {}", text.trim()))
}

fn parse_line(line: &str) -> Result<ShellCommand, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(ShellCommand::Empty);
    }

    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map(|(w, r)| (w, r.trim()))
        .unwrap_or((line, ""));

    let command = match word.to_lowercase().as_str() {
        "ask" => ShellCommand::Ask(rest.to_string()),
        "search" => ShellCommand::Search(rest.to_string()),
        "add" => {
            let (content, tags) = parse_entry(rest)?;
            ShellCommand::Add { content, tags }
        }
        "update" => {
            let (id, entry) = rest
                .split_once(char::is_whitespace)
                .ok_or("Usage: update <id> <content> [| tags]")?;
            let (content, tags) = parse_entry(entry)?;
            ShellCommand::Update {
                id: parse_id(id)?,
                content,
                tags,
            }
        }
        "delete" => ShellCommand::Delete(parse_id(rest)?),
        "show" => ShellCommand::Show(parse_id(rest)?),
        "list" => ShellCommand::List,
        "tags" => ShellCommand::Tags,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        _ => ShellCommand::Ask(line.to_string()),
    };

    Ok(command)
}

struct Shell<'a> {
    kb: KnowledgeBase,
    client: Option<AzureOpenAiClient>,
    config_path: &'a Path,
    lines: Lines<BufReader<Stdin>>,
}

impl Shell<'_> {
    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>, String> {
        print!("{}", prompt);
        std::io::stdout().flush().map_err(|e| e.to_string())?;

        self.lines
            .next_line()
            .await
            .map_err(|e| format!("Failed to read input: {}", e))
    }

    async fn ask(&mut self, question: &str) {
        if question.trim().is_empty() {
            println!("Ask what?");
            return;
        }

        if self.client.is_none() {
            match open_client(self.config_path) {
                Ok(client) => self.client = Some(client),
                Err(e) => {
                    println!("Error: {}", e);
                    return;
                }
            }
        }

        if let Some(client) = &self.client {
            let comparison = compare(client, &self.kb, question).await;
            print_comparison(&comparison);
        }
    }

    async fn delete(&mut self, id: u64) -> Result<(), String> {
        let preview = self
            .kb
            .get_by_id(id)
            .map(|item| item.content.chars().take(100).collect::<String>())
            .ok_or_else(|| format!("Knowledge item with ID {} not found", id))?;

        println!("Delete [{}]:", id);
        println!("  {}", preview);

        let answer = self.read_line("Confirm? [y/N] ").await?.unwrap_or_default();
        if !answer.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }

        self.kb.delete(id).map_err(|e| e.to_string())?;
        println!("Deleted [{}]", id);
        Ok(())
    }

    /// Execute one command; returns false when the shell should exit
    async fn execute(&mut self, command: ShellCommand) -> Result<bool, String> {
        match command {
            ShellCommand::Ask(question) => self.ask(&question).await,
            ShellCommand::Search(query) => print_search(&self.kb, &query, SEARCH_LIMIT, true),
            ShellCommand::Add { content, tags } => {
                let id = self.kb.add(&content, &tags);
                println!("Knowledge added successfully (ID: {})", id);
            }
            ShellCommand::Update { id, content, tags } => {
                let item = self
                    .kb
                    .update(id, &content, &tags)
                    .map_err(|e| e.to_string())?;
                println!("Knowledge item updated (ID: {})", item.id);
                println!("  tags: {}", item.tags.join(", "));
            }
            ShellCommand::Delete(id) => self.delete(id).await?,
            ShellCommand::Show(id) => {
                let item = self
                    .kb
                    .get_by_id(id)
                    .ok_or_else(|| format!("Knowledge item with ID {} not found", id))?;
                print_detail(item);
            }
            ShellCommand::List => print_list(&self.kb),
            ShellCommand::Tags => print_tags(&self.kb),
            ShellCommand::Help => println!("{}", HELP),
            ShellCommand::Quit => return Ok(false),
            ShellCommand::Empty => {}
        }

        Ok(true)
    }
}

/// Run the interactive shell
pub async fn run_shell(config_path: &Path) -> Result<(), String> {
    let mut shell = Shell {
        kb: KnowledgeBase::new(),
        client: None,
        config_path,
        lines: BufReader::new(tokio::io::stdin()).lines(),
    };

    println!(
        "AutoRAG shell: {} knowledge items loaded. Type 'help' for commands.",
        shell.kb.len()
    );

    while let Some(line) = shell.read_line("> ").await? {
        let outcome = match parse_line(&line) {
            Ok(command) => shell.execute(command).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => println!("Error: {}", e),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add_with_tags() {
        let command = parse_line("add Tokio is a runtime | rust, async").unwrap();
        assert_eq!(
            command,
            ShellCommand::Add {
                content: "Tokio is a runtime".to_string(),
                tags: vec!["rust".to_string(), "async".to_string()],
            }
        );
    }

    #[test]
    fn test_parse_add_rejects_empty_content() {
        assert!(parse_line("add").is_err());
        assert!(parse_line("add   | tag").is_err());
    }

    #[test]
    fn test_parse_update() {
        let command = parse_line("update 3 New text").unwrap();
        assert_eq!(
            command,
            ShellCommand::Update {
                id: 3,
                content: "New text".to_string(),
                tags: Vec::new(),
            }
        );
        assert!(parse_line("update x New text").is_err());
        assert!(parse_line("update 3").is_err());
    }

    #[test]
    fn test_parse_ids() {
        assert_eq!(parse_line("delete 7").unwrap(), ShellCommand::Delete(7));
        assert_eq!(parse_line("SHOW 2").unwrap(), ShellCommand::Show(2));
        assert!(parse_line("delete").is_err());
    }

    #[test]
    fn test_parse_misc() {
        assert_eq!(parse_line("   ").unwrap(), ShellCommand::Empty);
        assert_eq!(parse_line("list").unwrap(), ShellCommand::List);
        assert_eq!(parse_line("exit").unwrap(), ShellCommand::Quit);
        assert_eq!(
            parse_line("What is RAG?").unwrap(),
            ShellCommand::Ask("What is RAG?".to_string())
        );
        assert_eq!(
            parse_line("search azure api").unwrap(),
            ShellCommand::Search("azure api".to_string())
        );
    }
}
