//! headergen CLI - annotation processor for C++ entity and repository headers
//!
//! This binary provides the command-line interface for processing a project,
//! a single header, or inspecting the discovered validation macros.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use headergen::{
    current_dir, discover_validation_macros, format_macros, format_summary, process_project,
    resolve_project, to_json, ProjectLayout, Processor,
};
use headergen_processor::{RunContext, RunSummary};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "headergen")]
#[command(about = "Generates serialization and repository code from annotated C++ headers")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every header in the project and its dependency libraries
    Run {
        /// Project root (defaults to the nearest directory holding the project marker)
        #[arg(long, value_name = "DIR")]
        project_dir: Option<PathBuf>,
        /// Library root receiving generated repository implementations
        #[arg(long, value_name = "DIR")]
        library_dir: Option<PathBuf>,
        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Process a single header
    File {
        path: PathBuf,
        #[arg(long, value_name = "DIR")]
        project_dir: Option<PathBuf>,
        #[arg(long, value_name = "DIR")]
        library_dir: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
        #[arg(long)]
        json: bool,
    },
    /// Print the validation macro table discovered in the project
    Macros {
        #[arg(long, value_name = "DIR")]
        project_dir: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            project_dir,
            library_dir,
            dry_run,
            json,
        } => run(
            cli.config.as_deref(),
            project_dir.as_deref(),
            library_dir.as_deref(),
            dry_run,
            json,
        ),
        Commands::File {
            path,
            project_dir,
            library_dir,
            dry_run,
            json,
        } => file(
            cli.config.as_deref(),
            &path,
            project_dir.as_deref(),
            library_dir.as_deref(),
            dry_run,
            json,
        ),
        Commands::Macros { project_dir, json } => {
            macros(cli.config.as_deref(), project_dir.as_deref(), json)
        }
    }
}

/// Initialize logging system
///
/// Logs go to stderr so `--json` output on stdout stays parseable.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "headergen={level},headergen_processor={level},headergen_codegen={level},headergen_scanner={level},headergen_core={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn report(summary: &RunSummary, dry_run: bool, json: bool) -> Result<()> {
    if json {
        println!("{}", to_json(summary)?);
    } else {
        print!("{}", format_summary(summary, dry_run));
    }
    Ok(())
}

fn run(
    config_path: Option<&Path>,
    project_dir: Option<&Path>,
    library_dir: Option<&Path>,
    dry_run: bool,
    json: bool,
) -> Result<ExitCode> {
    let (config, project_dir) = resolve_project(config_path, project_dir, &current_dir()?)?;
    let library_dir = library_dir.map_or_else(|| project_dir.clone(), Path::to_path_buf);
    info!("Processing project {}", project_dir.display());

    let summary = process_project(config, &project_dir, &library_dir, dry_run)?;
    report(&summary, dry_run, json)?;

    if summary.has_failures() {
        warn!("{} files failed", summary.failed.len());
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn file(
    config_path: Option<&Path>,
    path: &Path,
    project_dir: Option<&Path>,
    library_dir: Option<&Path>,
    dry_run: bool,
    json: bool,
) -> Result<ExitCode> {
    if !path.is_file() {
        bail!("{} is not a file", path.display());
    }
    let path = fs::canonicalize(path)
        .with_context(|| format!("Failed to resolve {}", path.display()))?;
    let start = path.parent().map_or_else(|| path.clone(), Path::to_path_buf);
    let (config, project_dir) = resolve_project(config_path, project_dir, &start)?;
    let library_dir = library_dir.map_or_else(|| project_dir.clone(), Path::to_path_buf);

    // Validation macros may be declared anywhere in the project
    let layout = ProjectLayout::discover(&project_dir, &config.discovery)?;
    let mut headers = layout.all_headers();
    headers.push(path.to_path_buf());
    let validation = discover_validation_macros(&headers);

    let ctx = RunContext::new(config, library_dir)
        .with_validation(validation)
        .with_dry_run(dry_run);
    let summary = Processor::new(ctx).process_file(&path);
    report(&summary, dry_run, json)?;

    if summary.has_failures() || !summary.did_work() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn macros(config_path: Option<&Path>, project_dir: Option<&Path>, json: bool) -> Result<ExitCode> {
    let (config, project_dir) = resolve_project(config_path, project_dir, &current_dir()?)?;

    let layout = ProjectLayout::discover(&project_dir, &config.discovery)?;
    let table = discover_validation_macros(&layout.all_headers());
    if json {
        println!("{}", to_json(&table)?);
    } else {
        print!("{}", format_macros(&table));
    }
    Ok(ExitCode::SUCCESS)
}
