//! Terminal front end: build an index and ask questions without the server
//!
//! Run with: cargo run -p rag-assistant --features cli --bin rag-assistant -- --help

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rag_assistant::providers::{EmbeddingProvider, GroqChat, LlmProvider, OllamaEmbedder};
use rag_assistant::{AnsweringPipeline, ChatMessage, IngestPipeline, RagConfig, Transcript};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "rag-assistant")]
#[command(about = "Chat with a PDF from the terminal")]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Index directory (overrides the config)
    #[arg(long, global = true, value_name = "DIR")]
    index: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from a PDF
    Ingest {
        #[arg(value_name = "PDF")]
        path: PathBuf,
    },
    /// Ask one question and print the answer
    Ask {
        #[arg(value_name = "QUESTION")]
        question: String,
    },
    /// Interactive question loop
    Chat,
}

fn spinner(message: &'static str) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner:.cyan} {msg}")?);
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

fn answering(config: &RagConfig) -> anyhow::Result<AnsweringPipeline> {
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(OllamaEmbedder::new(&config.embeddings)?);
    let llm: Arc<dyn LlmProvider> = Arc::new(GroqChat::new(&config.llm)?);
    Ok(AnsweringPipeline::from_config(config, embedder, llm))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rag_assistant=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = RagConfig::load(cli.config.as_deref())?;
    if let Some(index) = cli.index {
        config.storage.index_dir = index;
    }
    let index_dir = config.storage.index_dir.clone();

    match cli.command {
        Commands::Ingest { path } => {
            let embedder: Arc<dyn EmbeddingProvider> =
                Arc::new(OllamaEmbedder::new(&config.embeddings)?);
            let pipeline = IngestPipeline::from_config(&config, embedder);

            let pb = spinner("Chunking text and generating embeddings...")?;
            let result = pipeline.build_index(&path, &index_dir).await;
            pb.finish_and_clear();

            let report = result?;
            println!(
                "{} {} chunks from {} pages of {} -> {}",
                style("Database built!").green().bold(),
                report.chunks,
                report.pages,
                report.filename,
                report.index_dir
            );
        }
        Commands::Ask { question } => {
            let pipeline = answering(&config)?;

            let pb = spinner("Searching vector database and generating answer...")?;
            let result = pipeline.ask(&question, &index_dir).await;
            pb.finish_and_clear();

            let answer = result?;
            println!("{}", answer.text);
            for source in &answer.sources {
                println!(
                    "  {} {}, Page {} ({:.3})",
                    style("source:").dim(),
                    source.filename,
                    source.page_number,
                    source.similarity_score
                );
            }
        }
        Commands::Chat => {
            let pipeline = answering(&config)?;
            let mut transcript = Transcript::new();

            println!(
                "{} (empty line or Ctrl+D to quit)",
                style("Enterprise RAG Assistant").bold()
            );

            let stdin = io::stdin();
            loop {
                print!("{} ", style(">").cyan().bold());
                io::stdout().flush()?;

                let mut line = String::new();
                if stdin.lock().read_line(&mut line)? == 0 || line.trim().is_empty() {
                    break;
                }
                let question = line.trim_end_matches(&['\r', '\n'][..]).to_string();
                transcript.push(ChatMessage::user(question.clone()));

                let pb = spinner("Searching vector database and generating answer...")?;
                let result = pipeline.ask(&question, &index_dir).await;
                pb.finish_and_clear();

                match result {
                    Ok(answer) => {
                        println!("{}\n", answer.text);
                        transcript.push(ChatMessage::assistant(answer.text));
                    }
                    Err(e) => eprintln!("{} {}", style("error:").red().bold(), e),
                }
            }

            println!("{} messages this session", transcript.len());
        }
    }

    Ok(())
}
