//! pdf-search: command-line front-end for the PDF search service
//!
//! Runs a single search when keywords are given on the command line,
//! otherwise prompts for them interactively.

use anyhow::Result;
use clap::{ArgAction, Parser};
use pdf_search::{
    config::{self, Settings},
    query::{parse_result_count, RawInput, ValidationRules},
    report, HttpClient, Orchestrator, SearchState,
};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::task::JoinHandle;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use url::Url;

#[derive(Debug, Parser)]
#[command(name = "pdf-search", version, about = "Find PDFs by keyword and page count")]
struct Cli {
    /// Search keywords. Leave out to search interactively.
    query: Vec<String>,

    /// Number of results to ask for (10 to 100, in steps of 10)
    #[arg(short = 'n', long, value_parser = parse_result_count)]
    num_results: Option<u32>,

    /// Minimum page count
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    min_pages: String,

    /// Maximum page count, empty for no limit
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    max_pages: String,

    /// Path to settings.yml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Full search endpoint URL, overriding the configured service
    #[arg(long)]
    endpoint: Option<Url>,

    /// Print the final search state as JSON
    #[arg(long)]
    json: bool,

    /// More logging (-v debug, -vv trace), applied on top of RUST_LOG
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = log_filter(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        cli.verbose,
    );
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting pdf-search v{}", pdf_search::VERSION);

    // Load configuration
    let settings = config::load(cli.config.as_deref())?;

    let client = match cli.endpoint.clone() {
        Some(endpoint) => HttpClient::with_endpoint(endpoint, &settings.outgoing)?,
        None => HttpClient::with_settings(&settings)?,
    };
    info!("Using search endpoint {}", client.endpoint());

    let orchestrator =
        Orchestrator::new(client).with_rules(ValidationRules::from(&settings.search));
    let progress = spawn_progress(&orchestrator);

    let code = if cli.query.is_empty() {
        interactive(&orchestrator, &settings, cli.json).await?
    } else {
        one_shot(&orchestrator, &settings, &cli).await?
    };

    progress.abort();
    Ok(code)
}

async fn one_shot(
    orchestrator: &Orchestrator<HttpClient>,
    settings: &Settings,
    cli: &Cli,
) -> Result<ExitCode> {
    let raw = RawInput::new(cli.query.join(" "))
        .with_result_count(
            cli.num_results
                .unwrap_or(settings.search.default_result_count),
        )
        .with_min_pages(cli.min_pages.clone())
        .with_max_pages(cli.max_pages.clone());

    if raw.is_blank() {
        eprintln!("No search keywords given");
        return Ok(ExitCode::from(2));
    }

    let state = orchestrator.search(&raw).await;
    print_state(&state, cli.json)?;

    Ok(match state {
        SearchState::Failed(_) => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    })
}

async fn interactive(
    orchestrator: &Orchestrator<HttpClient>,
    settings: &Settings,
    json: bool,
) -> Result<ExitCode> {
    let default_count = settings.search.default_result_count;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("PDF search. Leave the keywords empty to quit.");
    loop {
        let Some(text) = prompt(&mut lines, "\nKeywords: ").await? else {
            break;
        };
        if text.trim().is_empty() {
            break;
        }

        let count_label = format!("Number of results (10-100, default {}): ", default_count);
        let count = match prompt(&mut lines, &count_label).await? {
            Some(raw) if !raw.trim().is_empty() => match parse_result_count(&raw) {
                Ok(count) => count,
                Err(err) => {
                    println!("{}, using {}", err, default_count);
                    default_count
                }
            },
            _ => default_count,
        };
        let min_pages = prompt(&mut lines, "Minimum pages (0 for none): ")
            .await?
            .unwrap_or_default();
        let max_pages = prompt(&mut lines, "Maximum pages (blank for no limit): ")
            .await?
            .unwrap_or_default();

        let raw = RawInput::new(text)
            .with_result_count(count)
            .with_min_pages(min_pages)
            .with_max_pages(max_pages);

        let state = orchestrator.search(&raw).await;
        print_state(&state, json)?;
    }

    Ok(ExitCode::SUCCESS)
}

async fn prompt(lines: &mut Lines<BufReader<Stdin>>, label: &str) -> Result<Option<String>> {
    print!("{}", label);
    std::io::stdout().flush()?;
    Ok(lines.next_line().await?)
}

fn print_state(state: &SearchState, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(state)?);
    } else {
        for line in report::render(state) {
            println!("{}", line);
        }
    }
    Ok(())
}

/// Echo the in-progress status to stderr while a search runs
fn spawn_progress(orchestrator: &Orchestrator<HttpClient>) -> JoinHandle<()> {
    let mut states = orchestrator.subscribe();
    tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let state = states.borrow_and_update().clone();
            if state.is_searching() {
                eprintln!("{}", state.status_message());
            }
        }
    })
}

/// Raise the log level by the number of `-v` flags, whatever RUST_LOG said
fn log_filter(filter: EnvFilter, verbose: u8) -> EnvFilter {
    match verbose {
        0 => filter,
        1 => filter.add_directive(LevelFilter::DEBUG.into()),
        _ => filter.add_directive(LevelFilter::TRACE.into()),
    }
}
