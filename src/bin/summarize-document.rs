//! CLI tool for summarizing a document
//!
//! Extracts the text of a PDF or plain text file, prints its word and
//! character counts with a summary, and optionally answers questions about it.
//!
//! Usage:
//!   summarize-document <file> [--config <path>] [--question <text>]... [--challenge] [--no-llm]
//!
//! Options:
//!   --config      Path to configuration file (default: standard locations)
//!   --question    Ask a question about the document (repeatable)
//!   --challenge   Print generated challenge questions
//!   --no-llm      Use the extractive engines even when Ollama is configured
//!   --verbose     Enable verbose output

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use research_assistant::{
    services::{extract_text, ResearchAssistant},
    AppConfig,
};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let mut file: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut questions: Vec<String> = Vec::new();
    let mut challenge = false;
    let mut no_llm = false;
    let mut verbose = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--question" | "-q" => {
                if i + 1 < args.len() {
                    questions.push(args[i + 1].clone());
                    i += 1;
                }
            }
            "--challenge" => {
                challenge = true;
            }
            "--no-llm" => {
                no_llm = true;
            }
            "--verbose" | "-v" => {
                verbose = true;
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            arg if !arg.starts_with('-') && file.is_none() => {
                file = Some(PathBuf::from(arg));
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let Some(file) = file else {
        eprintln!("Missing document path");
        print_help();
        std::process::exit(1);
    };

    let log_level = if verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = match config_path {
        Some(ref path) => {
            let config = AppConfig::from_file(path)?;
            config.validate()?;
            config
        }
        None => AppConfig::load()?,
    };
    if no_llm {
        config.ollama = None;
    }

    let file_name = file
        .file_name()
        .and_then(|n| n.to_str())
        .context("Document path has no file name")?
        .to_string();
    let bytes =
        std::fs::read(&file).with_context(|| format!("Failed to read document: {:?}", file))?;
    let extracted = extract_text(&file_name, &bytes)?;

    let assistant = ResearchAssistant::connect(&config).await;
    info!(backend = assistant.backend(), "Assistant ready");

    let text = extracted.text;
    println!("Document:   {}", file_name);
    println!("Words:      {}", text.split_whitespace().count());
    println!("Characters: {}", text.chars().count());
    println!("Backend:    {}", assistant.backend());

    let summary = assistant.summarize(&text).await;
    println!();
    println!("Summary ({}):", summary.source);
    println!("{}", summary.text);

    for question in &questions {
        let answer = assistant.ask(&text, question).await;
        println!();
        println!("Q: {}", question);
        println!("A: {}", answer.answer);
        println!(
            "   confidence {:.1}% ({:?}, {})",
            answer.confidence,
            answer.confidence_level(),
            answer.model
        );
    }

    if challenge {
        println!();
        println!("Challenge questions:");
        for (idx, q) in assistant.generate_challenge(&text).await.iter().enumerate() {
            println!("  {}. {}", idx + 1, q.question);
        }
    }

    Ok(())
}

fn print_help() {
    println!(
        r#"summarize-document - Summarize a PDF or text document

USAGE:
    summarize-document <FILE> [OPTIONS]

OPTIONS:
    --config <PATH>       Path to configuration file
    -q, --question <TEXT> Ask a question about the document (repeatable)
    --challenge           Print generated challenge questions
    --no-llm              Use the extractive engines only
    -v, --verbose         Enable verbose output
    -h, --help            Print this help message

EXAMPLES:
    summarize-document paper.pdf
    summarize-document notes.txt -q "What is the main finding?"
"#
    );
}
