//! MarkScout Trademark Agent
//!
//! Interactive trademark availability analysis:
//! 1. Extracts brand keywords from a natural-language question
//! 2. Searches the trademark registry for each keyword
//! 3. Scores conflicts and retrieves relevant legal context
//! 4. Synthesizes a reasoned availability analysis

use markscout_agent::TrademarkAgent;
use markscout_common::{
    config::AppConfig,
    knowledge::{legal_education, InMemoryKnowledgeStore, KnowledgeStore},
    llm::create_completion_client,
    metrics::register_metrics,
    registry::create_registry_client,
    VERSION,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.observability.log_level));
    if config.observability.json_logging {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }

    info!("Starting MarkScout Trademark Agent v{}", VERSION);
    register_metrics();

    if !config.has_live_credentials() {
        warn!("Missing API credentials, external services run in mock mode");
    }

    // Initialize collaborators
    let llm = create_completion_client(&config.llm)?;
    let registry = create_registry_client(&config.registry)?;
    let store: Arc<dyn KnowledgeStore> =
        Arc::new(InMemoryKnowledgeStore::seed_default(&config.retrieval));

    let agent = TrademarkAgent::new(llm, registry, store.clone(), &config);

    // One-shot mode: question passed as arguments
    let args: Vec<String> = std::env::args().skip(1).collect();
    if !args.is_empty() {
        let question = args.join(" ");
        run_question(&agent, &question).await;
        return Ok(());
    }

    interactive_loop(&agent, store).await;
    Ok(())
}

async fn interactive_loop(agent: &TrademarkAgent, store: Arc<dyn KnowledgeStore>) {
    println!("MarkScout Trademark Agent v{}", VERSION);
    println!("Ask a trademark availability question, e.g.:");
    println!("  Is 'TechFlow' available for a software company?");
    println!("Commands: 'legal help [topic]', 'status', 'quit'");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        if stdout.write_all(b"> ").await.is_err() {
            break;
        }
        let _ = stdout.flush().await;

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "Failed to read input");
                break;
            }
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match parse_command(input) {
            Command::Quit => break,
            Command::Status => {
                let status = store.status();
                println!(
                    "Knowledge base: {} ({} chunks)",
                    if status.active { "active" } else { "inactive" },
                    status.chunk_count
                );
            }
            Command::LegalHelp(topic) => {
                println!("\n{}\n", legal_education(topic.as_deref()));
            }
            Command::Question(question) => run_question(agent, &question).await,
        }
    }

    println!("Goodbye.");
}

/// Interactive-loop commands; everything else is a question
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Quit,
    Status,
    LegalHelp(Option<String>),
    Question(String),
}

/// Parse a line of input; commands match case-insensitively
fn parse_command(input: &str) -> Command {
    let lowered = input.to_lowercase();
    match lowered.as_str() {
        "quit" | "exit" | "q" => return Command::Quit,
        "status" => return Command::Status,
        _ => {}
    }

    if let Some(rest) = lowered.strip_prefix("legal help") {
        let topic = rest.trim();
        return Command::LegalHelp((!topic.is_empty()).then(|| topic.to_string()));
    }

    Command::Question(input.to_string())
}

async fn run_question(agent: &TrademarkAgent, question: &str) {
    match agent.process_question(question).await {
        Ok(response) => {
            println!("\nKeywords: {}", response.keywords.join(", "));
            println!(
                "Searches: {} | Conflicts: {}",
                response.summary.searches_performed, response.summary.total_conflicts
            );
            println!("\n{}\n", response.analysis);
        }
        Err(e) if e.is_user_facing() => {
            println!("\n{}\n", e);
        }
        Err(e) => {
            warn!(error = %e, "Analysis failed");
            println!("\nAnalysis failed: {}\n", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_match_case_insensitively() {
        assert_eq!(parse_command("quit"), Command::Quit);
        assert_eq!(parse_command("QUIT"), Command::Quit);
        assert_eq!(parse_command("Exit"), Command::Quit);
        assert_eq!(parse_command("Status"), Command::Status);
    }

    #[test]
    fn test_legal_help_prefix_is_case_insensitive() {
        assert_eq!(
            parse_command("Legal help confusion"),
            Command::LegalHelp(Some("confusion".to_string()))
        );
        assert_eq!(parse_command("legal help"), Command::LegalHelp(None));
        assert_eq!(
            parse_command("LEGAL HELP Distinctiveness"),
            Command::LegalHelp(Some("distinctiveness".to_string()))
        );
    }

    #[test]
    fn test_other_input_is_a_question() {
        assert_eq!(
            parse_command("Is 'TechFlow' available?"),
            Command::Question("Is 'TechFlow' available?".to_string())
        );
    }
}
