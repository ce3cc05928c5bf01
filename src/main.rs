//! Lockpair CLI binary entry point.
//! Resolves configuration, runs the pipeline and prints the report.

use anyhow::Context;
use clap::Parser;
use lockpair::cli::{Cli, Commands};
use lockpair::config::{self, CliOverrides, Effective};
use lockpair::exit::ExitStatus;
use lockpair::lint::{self, Flavor, RunOptions};
use lockpair::{discover, output, utils};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::Level;

fn main() -> ExitStatus {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match run(cli) {
        Ok(status) => status,
        Err(e) => {
            eprintln!("{} {:#}", utils::error_prefix(), e);
            ExitStatus::Failure
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<ExitStatus> {
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(ExitStatus::Clean)
        }
        Commands::Rules { format } => {
            let format = config::output_format(format.unwrap_or_else(|| "human".to_string()))?;
            let table = output::render_rules(&format, utils::use_colors(&format));
            println!("{}", table.trim_end());
            Ok(ExitStatus::Clean)
        }
        Commands::Check {
            paths,
            repo_root,
            strict,
            fix_suggestions,
            output: out_path,
            format,
        } => {
            let eff = resolve(CliOverrides {
                repo_root: repo_root.as_deref(),
                strict: strict.then_some(true),
                fix_suggestions: fix_suggestions.then_some(true),
                format: format.as_deref(),
            })?;
            let files = discover_files(&eff, &paths);
            let res = lint::run(&files, &RunOptions::from_effective(&eff, Flavor::Check));
            let report = if eff.format == "json" {
                serde_json::to_string_pretty(&output::compose_check_json(
                    &res,
                    eff.fix_suggestions,
                ))?
            } else {
                let color = out_path.is_none() && utils::use_colors(&eff.format);
                output::render_check(&res, eff.fix_suggestions, color)
            };
            emit(&report, out_path.as_deref())?;
            Ok(output::exit_status(&res, eff.strict))
        }
        Commands::Analyze {
            paths,
            repo_root,
            output: out_path,
            format,
        } => {
            let eff = resolve(CliOverrides {
                repo_root: repo_root.as_deref(),
                format: format.as_deref(),
                ..Default::default()
            })?;
            let files = discover_files(&eff, &paths);
            let res = lint::run(&files, &RunOptions::from_effective(&eff, Flavor::Analyze));
            let report = if eff.format == "json" {
                serde_json::to_string_pretty(&output::compose_analyze_json(&res))?
            } else {
                let color = out_path.is_none() && utils::use_colors(&eff.format);
                output::render_classes(&res, color)
            };
            emit(&report, out_path.as_deref())?;
            Ok(output::exit_status(&res, eff.strict))
        }
    }
}

fn resolve(overrides: CliOverrides) -> anyhow::Result<Effective> {
    let eff = config::resolve_effective(&overrides).context("invalid configuration")?;
    match &eff.source {
        Some(path) => tracing::debug!("using configuration {}", path.display()),
        None => tracing::debug!("no lockpair.toml found; using defaults"),
    }
    Ok(eff)
}

fn discover_files(eff: &Effective, paths: &[PathBuf]) -> Vec<PathBuf> {
    let files = discover::discover(&eff.repo_root, paths, &eff.dirs, &eff.extensions);
    if files.is_empty() && eff.format != "json" {
        eprintln!(
            "{} No source files found (searched: {})",
            utils::note_prefix(),
            eff.dirs.join(", ")
        );
    }
    files
}

fn emit(report: &str, out_path: Option<&Path>) -> anyhow::Result<()> {
    let report = report.trim_end();
    match out_path {
        Some(path) => {
            fs::write(path, format!("{}\n", report))
                .with_context(|| format!("failed to write report to {}", path.display()))?;
            println!("Report written to {}", path.display());
        }
        None => println!("{}", report),
    }
    Ok(())
}
