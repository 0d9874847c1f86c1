//! SiteIntent - Website visitor-intent quiz client
//!
//! A CLI client for a local analysis service: submit a website URL, get
//! back a content summary plus one generated multiple-choice question,
//! and send the chosen answer back to the service.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (bad arguments, config failure, etc.)
//!   2 - Analysis failed (one-shot mode only)

mod cli;
mod client;
mod config;
mod models;
mod workflow;

use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use client::{AnalysisClient, ClientConfig};
use config::Config;
use indicatif::{ProgressBar, ProgressStyle};
use models::AnalysisOutcome;
use std::io::Write;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use workflow::{WorkflowController, WorkflowState};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("SiteIntent v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Session failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .siteintent.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".siteintent.toml");

    if path.exists() {
        eprintln!("⚠️  .siteintent.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .siteintent.toml")?;

    println!("✅ Created .siteintent.toml with default settings.");
    println!("   Edit it to point at your analysis service.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the workflow. Returns the process exit code.
async fn run(args: Args) -> Result<i32> {
    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let client = AnalysisClient::new(ClientConfig {
        base_url: config.service.base_url.clone(),
        timeout_seconds: config.service.timeout_seconds,
    });
    let mut controller = WorkflowController::new(client);

    // The spinner reacts to workflow phase changes through the state
    // subscription, same as any other presentation surface would.
    if !args.quiet {
        spawn_progress_task(controller.subscribe());
    }

    match args.url {
        Some(ref url) => run_once(&mut controller, url, &args, &config).await,
        None => run_session(&mut controller, &config).await,
    }
}

/// One-shot mode: analyze a single URL, present it, accept one answer.
async fn run_once(
    controller: &mut WorkflowController<AnalysisClient>,
    url: &str,
    args: &Args,
    config: &Config,
) -> Result<i32> {
    if let Err(e) = controller.submit_url(url).await {
        eprintln!("Error: {}", e);
        return Ok(1);
    }

    match controller.state() {
        WorkflowState::Ready { outcome, .. } => {
            if args.format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&outcome.result)?);
                return Ok(0);
            }

            present_outcome(&outcome, config.general.summary_chars);
            ask_and_submit_answer(controller, &outcome).await?;
            Ok(0)
        }
        state => {
            let message = state
                .failure_message()
                .unwrap_or("analysis did not complete")
                .to_string();
            eprintln!("\n❌ Analysis failed: {}", message);
            Ok(2)
        }
    }
}

/// Interactive session: prompt for URLs until the user quits.
async fn run_session(
    controller: &mut WorkflowController<AnalysisClient>,
    config: &Config,
) -> Result<i32> {
    println!("🌐 SiteIntent interactive session");
    println!("   Service: {}", config.service.base_url);
    println!("   Enter a website URL to analyze it, blank line to quit.");

    loop {
        let Some(line) = prompt_line("\nWebsite URL: ")? else {
            break;
        };
        let url = line.trim();
        if url.is_empty() {
            break;
        }

        if let Err(e) = controller.submit_url(url).await {
            println!("   {}", e);
            continue;
        }

        match controller.state() {
            WorkflowState::Ready { outcome, .. } => {
                present_outcome(&outcome, config.general.summary_chars);
                ask_and_submit_answer(controller, &outcome).await?;
            }
            state => {
                // Failure never locks the session; the next URL starts over.
                let message = state
                    .failure_message()
                    .unwrap_or("analysis did not complete");
                println!("❌ Analysis failed: {}", message);
            }
        }
    }

    println!("\n👋 Session ended.");
    Ok(0)
}

/// Print the content summary and the generated question.
fn present_outcome(outcome: &AnalysisOutcome, summary_chars: usize) {
    let content = &outcome.result.content;
    let question = &outcome.result.question;

    println!("\n📄 {}", if content.title.is_empty() { &outcome.url } else { &content.title });
    if !content.meta_description.is_empty() {
        println!("   {}", content.meta_description);
    }

    let summary = content.summary(summary_chars);
    if !summary.is_empty() {
        println!("\n   {}", summary);
    }

    if !content.headings.is_empty() {
        println!("\n   Headings:");
        for text in content.heading_texts().iter().take(8) {
            println!("   • {}", text);
        }
    }

    println!(
        "\n   Analyzed at {}",
        outcome.analyzed_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    println!("\n❓ {}", question.text);
    for (i, option) in question.options.iter().enumerate() {
        println!("   {}. {}", i + 1, option);
    }
}

/// Prompt for a choice and submit it through the controller.
///
/// Only options offered by the current result ever reach
/// `select_option`; anything else is re-prompted here.
async fn ask_and_submit_answer(
    controller: &mut WorkflowController<AnalysisClient>,
    outcome: &AnalysisOutcome,
) -> Result<()> {
    let options = &outcome.result.question.options;
    if !outcome.result.question.is_answerable() {
        println!("   (no answer options were offered)");
        return Ok(());
    }

    loop {
        let Some(line) = prompt_line("\nYour choice (number, blank to skip): ")? else {
            return Ok(());
        };
        let input = line.trim();
        if input.is_empty() {
            println!("   Skipped.");
            return Ok(());
        }

        match resolve_choice(input, options) {
            Some(option) => {
                controller.select_option(&option);
                if controller.submit_answer().await {
                    // Echo what the workflow actually holds, not the input.
                    if let WorkflowState::AnsweredPending { answer, .. } = controller.state() {
                        println!("✅ Answer recorded: {}", answer);
                    }
                }
                return Ok(());
            }
            None => {
                println!("   Please enter a number between 1 and {}.", options.len());
            }
        }
    }
}

/// Resolve the user's input to one of the offered options.
///
/// Accepts a 1-based option number or the option text itself; anything
/// else resolves to nothing, so only offered options ever reach the
/// controller.
fn resolve_choice(input: &str, options: &[String]) -> Option<String> {
    input
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| options.get(i).cloned())
        .or_else(|| {
            options
                .iter()
                .find(|o| o.eq_ignore_ascii_case(input))
                .cloned()
        })
}

/// Read one line from stdin after printing a prompt.
///
/// Returns `Ok(None)` when stdin reaches end of input.
fn prompt_line(prompt: &str) -> Result<Option<String>> {
    print!("{}", prompt);
    std::io::stdout().flush().context("Failed to flush stdout")?;

    let mut line = String::new();
    let read = std::io::stdin()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;

    if read == 0 {
        Ok(None)
    } else {
        Ok(Some(line))
    }
}

/// Show a spinner while the workflow is in the Analyzing phase.
fn spawn_progress_task(mut rx: watch::Receiver<WorkflowState>) {
    tokio::spawn(async move {
        let mut spinner: Option<ProgressBar> = None;
        loop {
            {
                let state = rx.borrow_and_update();
                match &*state {
                    WorkflowState::Analyzing { url } => {
                        if spinner.is_none() {
                            let pb = ProgressBar::new_spinner();
                            pb.set_style(
                                ProgressStyle::default_spinner()
                                    .template("{spinner:.green} {msg}")
                                    .unwrap(),
                            );
                            pb.set_message(format!("Analyzing {}...", url));
                            pb.enable_steady_tick(Duration::from_millis(120));
                            spinner = Some(pb);
                        }
                    }
                    _ => {
                        if let Some(pb) = spinner.take() {
                            pb.finish_and_clear();
                        }
                    }
                }
            }

            if rx.changed().await.is_err() {
                break;
            }
        }

        if let Some(pb) = spinner.take() {
            pb.finish_and_clear();
        }
    });
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .siteintent.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
