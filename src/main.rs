// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Command-line interface for the gh-insight binary.
//!
//! The CLI exposes subcommands for producing the full metrics report as JSON
//! and for rendering the CV text snippet. Requests can be assembled from
//! flags, loaded from a YAML document, or both, with flags taking precedence.

use std::{io, path::PathBuf, process};

use clap::{ArgAction, Args, Parser, Subcommand};
use gh_insight::{
    AnalysisRequest, Error, GithubClient, ReportMetrics, RetryConfig, analyze_user_activity,
    generate_cv_insert, load_request,
};
use rand::thread_rng;
use tracing_subscriber::EnvFilter;

/// Command line interface for the activity aggregation engine.
#[derive(Debug, Parser)]
#[command(name = "gh-insight", version, about = "Aggregate GitHub activity into engagement metrics")]
struct Cli {
    #[command(subcommand)]
    command: Command
}

#[derive(Debug, Subcommand)]
/// Supported commands exposed by the CLI.
enum Command {
    /// Analyze a user's public activity and print the metrics report as JSON.
    Analyze(AnalyzeArgs),
    /// Analyze a user's public activity and print the CV text snippet.
    Cv(AnalyzeArgs)
}

#[derive(Debug, Args)]
/// Arguments shared by the `analyze` and `cv` subcommands.
struct AnalyzeArgs {
    /// GitHub login whose public activity is analyzed.
    #[arg(long = "user", value_name = "LOGIN")]
    user: Option<String>,

    /// Bearer token used for API calls.
    #[arg(long = "token", env = "GITHUB_TOKEN", hide_env_values = true)]
    token: String,

    /// Analysis window length in months (12, 24, or 36).
    #[arg(long = "months", value_name = "MONTHS")]
    months: Option<u32>,

    /// Restrict the analysis to these owner/name repositories (repeatable).
    #[arg(long = "repo", value_name = "OWNER/NAME")]
    repos: Vec<String>,

    /// Upper bound on analyzed repositories (1-50).
    #[arg(long = "max-repos", value_name = "COUNT")]
    max_repos: Option<usize>,

    /// Include the private repository count in the report.
    #[arg(long = "include-private", action = ArgAction::SetTrue)]
    include_private: bool,

    /// Load the analysis request from a YAML document; flags override it.
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output formatted JSON for easier inspection.
    #[arg(long = "pretty", action = ArgAction::SetTrue)]
    pretty: bool
}

enum OutputMode {
    Json,
    Cv
}

/// Entry point that reports errors and sets the appropriate exit status.
#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(error) = run().await {
        eprintln!("{}", error.to_display_string());
        process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Executes the CLI using parsed arguments.
///
/// # Errors
///
/// Propagates validation, fetch, and serialization errors from the engine.
async fn run() -> Result<(), Error> {
    let cli = Cli::parse();

    match cli.command {
        Command::Analyze(args) => run_analysis(args, OutputMode::Json).await,
        Command::Cv(args) => run_analysis(args, OutputMode::Cv).await
    }
}

async fn run_analysis(args: AnalyzeArgs, mode: OutputMode) -> Result<(), Error> {
    let request = resolve_request(&args)?;
    let client = GithubClient::new(&args.token)?;
    let retry = RetryConfig::default();
    let mut rng = thread_rng();

    let metrics = analyze_user_activity(&client, &retry, &request, &mut rng).await?;

    match mode {
        OutputMode::Json => write_report(&metrics, args.pretty),
        OutputMode::Cv => {
            println!("{}", generate_cv_insert(&metrics));
            Ok(())
        }
    }
}

/// Merges the optional YAML document with CLI flags; flags win.
fn resolve_request(args: &AnalyzeArgs) -> Result<AnalysisRequest, Error> {
    let mut request = match args.config.as_deref() {
        Some(path) => load_request(path)?,
        None => {
            let user = args
                .user
                .as_deref()
                .ok_or_else(|| Error::validation("missing required --user <LOGIN> argument"))?;
            AnalysisRequest::new(user)
        }
    };

    if let Some(user) = args.user.as_deref() {
        request.username = user.to_owned();
    }
    if let Some(months) = args.months {
        request.window_months = months;
    }
    if !args.repos.is_empty() {
        request.included_repositories = Some(args.repos.clone());
    }
    if let Some(max_repos) = args.max_repos {
        request.max_repositories = Some(max_repos);
    }
    if args.include_private {
        request.include_private_repo_count = true;
    }

    request.validate()?;
    Ok(request)
}

fn write_report(metrics: &ReportMetrics, pretty: bool) -> Result<(), Error> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    if pretty {
        serde_json::to_writer_pretty(&mut handle, metrics)?;
    } else {
        serde_json::to_writer(&mut handle, metrics)?;
    }

    Ok(())
}
