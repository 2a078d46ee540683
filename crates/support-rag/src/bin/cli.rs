//! Command-line client for the support RAG service
//!
//! Run with: cargo run -p support-rag --features cli --bin support-rag-cli -- ask "..."

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use support_rag::{config::RagConfig, IngestOutcome, RagService};

#[derive(Parser, Debug)]
#[command(name = "support-rag-cli")]
#[command(about = "Ingest a document folder and ask questions about it")]
struct Args {
    /// Config file path (defaults to ./support-rag.toml or the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rebuild the index from the data folder
    Ingest {
        /// Data folder override
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Ask a question against the current index
    Ask {
        /// The question to answer
        question: String,
    },
}

fn spinner(message: &str) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]")?);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    Ok(pb)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "support_rag=warn".into()),
        )
        .init();

    let args = Args::parse();
    let config = RagConfig::load(args.config.as_deref())?;
    let service = RagService::from_config(config)?;

    match args.command {
        Command::Ingest { data_dir } => {
            let root = data_dir.unwrap_or_else(|| service.config().paths.data_dir.clone());
            let pb = spinner(&format!("Ingesting {}", root.display()))?;
            let result = service.try_ingest_from(&root).await;
            pb.finish_and_clear();

            match result? {
                IngestOutcome::Indexed {
                    files,
                    documents,
                    chunks,
                } => println!(
                    "{} Indexed {} chunks from {} documents ({} files)",
                    style("✓").green().bold(),
                    chunks,
                    documents,
                    files
                ),
                IngestOutcome::NoDocuments => println!(
                    "{} No documents found in {}",
                    style("!").yellow().bold(),
                    root.display()
                ),
            }
        }
        Command::Ask { question } => {
            let pb = spinner("Thinking")?;
            let result = service.try_chat(&question).await;
            pb.finish_and_clear();
            let answer = result?;

            println!("{}\n", answer.text);
            if !answer.sources.is_empty() {
                println!("{}", style("Sources").bold().underlined());
                for (i, source) in answer.sources.iter().enumerate() {
                    let page = source
                        .page
                        .map(|p| format!(" (page {})", p + 1))
                        .unwrap_or_default();
                    println!("{}. {}{}", i + 1, style(&source.source).cyan(), page);
                    println!("   {}", style(&source.path).dim());
                    println!("   {}", source.snippet);
                }
            }
        }
    }

    Ok(())
}
