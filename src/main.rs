use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;
mod config;
mod error;
mod generation;
mod keywords;
mod knowledge;
mod logging;
mod rag;
mod retriever;
mod types;

#[derive(Parser)]
#[command(name = "autorag")]
#[command(version)]
#[command(about = "Compare answers with and without retrieved knowledge")]
struct Cli {
    /// Config file (default: ~/.config/autorag/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// More logging (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a question and compare the RAG and standard answers
    Ask {
        /// The question
        question: String,
    },

    /// Rank the built-in knowledge for a query
    Search {
        /// Search query
        query: String,

        /// Maximum results
        #[arg(short = 'n', long, default_value = "5")]
        limit: usize,

        /// Show scores
        #[arg(short, long)]
        scores: bool,
    },

    /// List the built-in knowledge
    List,

    /// Show the keywords extracted from text
    Keywords {
        /// Text to extract from
        text: String,
    },

    /// Interactive session with an editable knowledge base
    Shell,

    /// View or set configuration
    Config {
        /// Config key
        key: Option<String>,

        /// Config value
        value: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config_path = cli.config.unwrap_or_else(config::default_config_file);

    let result = match cli.command {
        Commands::Ask { question } => cli::ask::run_ask(&question, &config_path).await,
        Commands::Search {
            query,
            limit,
            scores,
        } => cli::knowledge::run_search(&query, limit, scores),
        Commands::List => cli::knowledge::run_list(),
        Commands::Keywords { text } => cli::knowledge::run_keywords(&text),
        Commands::Shell => cli::shell::run_shell(&config_path).await,
        Commands::Config { key, value } => {
            cli::config::run_config(&config_path, key.as_deref(), value.as_deref())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
