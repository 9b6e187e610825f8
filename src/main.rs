//! yoyaku CLI - summarise pasted text, web pages and PDFs
//!
//! The application logic is contained in lib.rs, and this file is responsible
//! for parsing arguments and handling top-level errors.

use clap::{Parser, Subcommand};
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use yoyaku::config::EngineKind;
use yoyaku::orchestrator::{Request, SummarizeError};
use yoyaku::{splitter, ui, Config, Length, Orchestrator, Style, SummaryOptions};

#[derive(Parser)]
#[command(name = "yoyaku")]
#[command(author, version, about = "Summarise pasted text, web pages and PDFs", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarise text, a file or a URL (reads stdin when no source is given)
    Summarise {
        /// Text to summarise
        #[arg(long)]
        text: Option<String>,
        /// PDF, HTML or plain text file to summarise
        #[arg(long)]
        file: Option<PathBuf>,
        /// URL to summarise
        #[arg(long)]
        url: Option<String>,
        /// Length preset: short, medium, long or custom
        #[arg(short, long)]
        length: Option<Length>,
        /// Character count used with `--length custom`
        #[arg(long)]
        custom: Option<String>,
        /// Output style: plain, bullet, friendly or business
        #[arg(short, long)]
        style: Option<Style>,
        /// Use the generative backend instead of sentence selection
        #[arg(long)]
        generative: bool,
        /// Show the extracted source text instead of a summary
        #[arg(long)]
        raw: bool,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
        /// Also write the summary to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the sentence segmentation of stdin, one sentence per line
    Split,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Some(Commands::Summarise {
            text,
            file,
            url,
            length,
            custom,
            style,
            generative,
            raw,
            json,
            output,
        }) => {
            let mut config = Config::load()?;
            if generative {
                config.summary.engine = EngineKind::Generative;
            }

            let custom = custom.or_else(|| config.summary.custom_length.clone());
            let options = SummaryOptions::new(
                length.unwrap_or(config.summary.length),
                custom.as_deref(),
                style.unwrap_or(config.summary.style),
            );

            // No explicit source: treat piped stdin as pasted text
            let no_source = text.is_none() && file.is_none() && url.is_none();
            let text = if no_source && !io::stdin().is_terminal() {
                Some(read_stdin()?)
            } else {
                text
            };

            let orchestrator = Orchestrator::from_config(&config)?;
            let request = Request {
                text,
                file,
                url,
                options,
            };

            if raw {
                return print_raw(&orchestrator, &request).await;
            }

            let outcome = orchestrator.summarize(&request).await;

            if json {
                let value = serde_json::json!({
                    "ok": outcome.is_ok(),
                    "output": outcome.output,
                    "status": outcome.status,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                ui::print_outcome(&outcome);
            }

            if let Some(path) = output {
                let (status, ok) = ui::save_output(&path, &outcome.output);
                ui::print_status(&status, ok);
            }

            if !outcome.is_ok() {
                std::process::exit(1);
            }
        }
        Some(Commands::Split) => {
            let text = read_stdin()?;
            for sentence in splitter::split_sentences(&text) {
                println!("{}", sentence);
            }
        }
        None => {
            // Default: interactive session
            let config = Config::load()?;
            let orchestrator = Orchestrator::from_config(&config)?;
            ui::run(&orchestrator, &config.summary).await?;
        }
    }

    Ok(())
}

fn read_stdin() -> io::Result<String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}

/// Print the normalised source text, the way `--raw` asks for
async fn print_raw(orchestrator: &Orchestrator, request: &Request) -> anyhow::Result<()> {
    let resolved = match request.source() {
        Some(source) => orchestrator.resolve_source(&source).await,
        None => Err(SummarizeError::InputMissing),
    };

    match resolved {
        Ok(text) => {
            println!("{}", text);
            eprintln!("--- Extracted {} characters ---", text.chars().count());
            Ok(())
        }
        Err(e) => {
            tracing::warn!(error = %e, "could not resolve source");
            ui::print_status(e.user_message(), false);
            std::process::exit(1);
        }
    }
}
