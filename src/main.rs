use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use tracing_subscriber::EnvFilter;
use usneseni::config::{get_config_path, save_config, PipelineConfig};
use usneseni::pipeline::Pipeline;
use usneseni::types::*;

/// Structures council resolutions and links the references between them.
#[derive(Parser)]
#[command(
    name = "usneseni",
    about = "Structures council resolutions and links the references between them"
)]
struct Cli {
    /// Directory holding `.usneseni/config.json` (default: current directory)
    #[arg(short, long, global = true)]
    root: Option<String>,
    /// Log every record and reference
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration
    Init,
    /// Structure raw records into one JSON file per resolution
    Parse {
        /// Directory with raw record JSON files
        #[arg(short, long)]
        input: PathBuf,
        /// Directory for structured record files
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Resolve references across a directory of structured records
    Resolve {
        /// Directory with structured record JSON files
        #[arg(short, long)]
        input: PathBuf,
        /// Directory for the resolved corpus and statistics
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Structure and resolve in one pass
    Run {
        /// Directory with raw record JSON files
        #[arg(short, long)]
        input: PathBuf,
        /// Directory for all outputs
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> usneseni::errors::Result<()> {
    let root = resolve_path(cli.root);
    match cli.command {
        Commands::Init => {
            save_config(&root, &PipelineConfig::default())?;
            println!("Wrote {}", get_config_path(&root).display());
        }
        Commands::Parse { input, output } => {
            let pipeline = Pipeline::open(&root)?;
            let summary = pipeline.parse_dir(&input, &output)?;
            print_parse_stats(&summary.stats);
            println!("Done in {}ms", summary.duration_ms);
        }
        Commands::Resolve { input, output } => {
            let pipeline = Pipeline::open(&root)?;
            let summary = pipeline.resolve_dir(&input, &output)?;
            print_resolution_stats(&summary.stats, cli.verbose);
            println!("Done in {}ms", summary.duration_ms);
        }
        Commands::Run { input, output } => {
            let pipeline = Pipeline::open(&root)?;
            let summary = pipeline.run(&input, &output)?;
            print_parse_stats(&summary.parse);
            print_resolution_stats(&summary.resolution, cli.verbose);
            println!("Done in {}ms", summary.duration_ms);
        }
    }
    Ok(())
}

fn print_parse_stats(stats: &ParseStats) {
    println!("Structured records");
    println!("  Total:           {}", stats.total);
    println!("  Missing action:  {}", stats.missing_action);
    println!("  Skipped (bad id): {}", stats.skipped_malformed);
    println!("  Skipped (dup id): {}", stats.skipped_duplicate);
    if !stats.actions.is_empty() {
        println!("\n  Actions:");
        let mut sorted: Vec<_> = stats.actions.iter().collect();
        sorted.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        for (action, count) in sorted {
            println!("    {:<28} {}", action, count);
        }
    }
}

fn print_resolution_stats(stats: &ResolutionStats, verbose: bool) {
    println!("References");
    println!("  Records:     {}", stats.total_records);
    println!("  Total:       {}", stats.refs_total);
    println!("  Resolved:    {}", stats.refs_resolved);
    println!("  Unresolved:  {}", stats.refs_unresolved);
    if verbose {
        for mention in &stats.unresolved_refs {
            println!("    {} -> {}", mention.source, mention.raw);
        }
    }
}

/// Resolves an optional path argument to a `PathBuf`.
///
/// Defaults to the current working directory if no path is provided.
fn resolve_path(path: Option<String>) -> PathBuf {
    match path {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}
