use analytics::AnalyticsEngine;
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use configuration::{Config, init_tracing, load_config};
use core_types::{GroupingParam, PeriodType, RecordType, ResultSet};
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use results_store::ResultsRepository;
use std::path::PathBuf;

mod render;

/// The main entry point for the Optiscope results analyzer.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    // Keep the guard alive so buffered file logs are flushed on exit.
    let _log_guard = init_tracing(&config.logging)?;

    // Execute the appropriate command
    match cli.command {
        Commands::Analyze(args) => handle_analyze(args, &config).await,
        Commands::Summary(args) => handle_summary(args, &config).await,
        Commands::List => handle_list(&config).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// CAGR distribution analytics for saved optimization results.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./optiscope.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Histogram and reverse CDF of trial CAGRs across one or more result files.
    Analyze(AnalyzeArgs),
    /// Walk-forward summary of a single result file.
    Summary(SummaryArgs),
    /// List saved result files in the results directory.
    List,
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Result files to analyze. Several files are merged into one population.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Period to extract. Repeat to take the union of several periods.
    #[arg(long = "period", value_enum)]
    periods: Vec<PeriodType>,

    /// Trial population: the kept winners or the full history.
    #[arg(long, value_enum)]
    records: Option<RecordType>,

    /// Sub-group the histogram by this trial parameter.
    #[arg(long, value_enum)]
    group_by: Option<GroupingParam>,

    /// Histogram bin width in percentage points (e.g. 1, 2, 5, 10).
    #[arg(long)]
    bin_size: Option<f64>,

    /// Include empty bins between the lowest and highest populated bin.
    #[arg(long)]
    dense: bool,

    /// Print the report as JSON instead of tables.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct SummaryArgs {
    /// The walk-forward result file to summarize.
    file: PathBuf,

    /// Print the summary as JSON instead of tables.
    #[arg(long)]
    json: bool,
}

// ==============================================================================
// Command Logic
// ==============================================================================

/// Loads, merges and analyzes the requested result files.
async fn handle_analyze(args: AnalyzeArgs, config: &Config) -> anyhow::Result<()> {
    let mut settings = config.analysis.clone();
    if !args.periods.is_empty() {
        settings.periods = args.periods;
    }
    if let Some(records) = args.records {
        settings.record_type = records;
    }
    if let Some(group_by) = args.group_by {
        settings.group_by = group_by;
    }
    if let Some(bin_size) = args.bin_size {
        settings.bin_size_pct = bin_size;
    }
    settings.fill_empty_bins |= args.dense;
    settings.validate()?;

    let engine = AnalyticsEngine::new(&settings)?;
    let repo = ResultsRepository::from_configured(config.store.results_dir.as_deref());
    let sets = load_all(&repo, &args.files).await?;
    let report = engine.analyze_many(&sets)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        render::print_report(&report);
    }
    Ok(())
}

/// Prints the walk-forward summary of one result file.
async fn handle_summary(args: SummaryArgs, config: &Config) -> anyhow::Result<()> {
    let repo = ResultsRepository::from_configured(config.store.results_dir.as_deref());
    let set = repo
        .load(&args.file)
        .await
        .with_context(|| format!("Failed to load {}", args.file.display()))?;
    let summary = wfo::summarize_set(&set)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        render::print_summary(&summary);
    }
    Ok(())
}

async fn handle_list(config: &Config) -> anyhow::Result<()> {
    let repo = ResultsRepository::from_configured(config.store.results_dir.as_deref());
    let files = repo.list().await?;
    if files.is_empty() {
        println!("No saved results in {}", repo.root().display());
        return Ok(());
    }
    for file in files {
        if let Some(name) = file.file_name() {
            println!("{}", name.to_string_lossy());
        }
    }
    Ok(())
}

/// Reads every file concurrently, preserving the order the files were given in.
async fn load_all(repo: &ResultsRepository, files: &[PathBuf]) -> anyhow::Result<Vec<ResultSet>> {
    // Set up the progress bar
    let progress_bar = ProgressBar::new(files.len() as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    // Create concurrent tasks for each file
    let tasks: Vec<_> = files
        .iter()
        .cloned()
        .map(|file| {
            let repo = repo.clone();
            let pb = progress_bar.clone();
            tokio::spawn(async move {
                pb.set_message(format!("Loading {}...", file.display()));
                let set = repo
                    .load(&file)
                    .await
                    .with_context(|| format!("Failed to load {}", file.display()));
                pb.inc(1);
                set
            })
        })
        .collect();

    // Wait for all concurrent tasks to complete
    let results = join_all(tasks).await;
    progress_bar.finish_and_clear();

    let mut sets = Vec::with_capacity(results.len());
    for result in results {
        sets.push(result??);
    }
    tracing::info!(files = sets.len(), "Loaded result files.");
    Ok(sets)
}
