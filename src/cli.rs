//! CLI argument parsing via `clap`.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "lockpair",
    version,
    about = "Check the public/_unlocked locking convention in C++ classes",
    long_about = "Lockpair scans C++ sources for public methods that acquire a lock without a private `<name>_unlocked` counterpart, plus related locking hazards. Every finding is a heuristic candidate for review.\n\nConfiguration precedence: CLI > lockpair.toml > defaults.",
    after_help = "Examples:\n  lockpair check\n  lockpair check src/audio --strict --fix-suggestions\n  lockpair check --format json --output report.json\n  lockpair analyze include\n  lockpair rules",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    /// Increase diagnostic verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Run every rule and report issues by severity
    #[command(
        about = "Check locking conventions",
        long_about = "Scan files with per-method lock windows and evaluate every rule. Exits 2 on errors, 1 on warnings with --strict, 0 otherwise.",
        after_help = "Examples:\n  lockpair check\n  lockpair check src/Player.cpp include/Player.h --fix-suggestions\n  lockpair check --strict --format json"
    )]
    Check {
        #[arg(help = "Files or directories to scan (default: configured dirs)")]
        paths: Vec<PathBuf>,
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, action = ArgAction::SetTrue, help = "Exit non-zero on warnings")]
        strict: bool,
        #[arg(long, action = ArgAction::SetTrue, help = "Include fix suggestions in the report")]
        fix_suggestions: bool,
        #[arg(long, help = "Write the report to this file instead of stdout")]
        output: Option<PathBuf>,
        #[arg(long, help = "Output format: human|json (default: human)")]
        format: Option<String>,
    },
    /// Class-grouped analysis report
    #[command(
        about = "Summarize classes with threading concerns",
        long_about = "Search whole class bodies for lock constructs and report, per class, its mutex members, lock-acquiring public methods, private unlocked methods and missing counterparts.",
        after_help = "Examples:\n  lockpair analyze\n  lockpair analyze src include --output threading_safety_analysis.md"
    )]
    Analyze {
        #[arg(help = "Files or directories to scan (default: configured dirs)")]
        paths: Vec<PathBuf>,
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Write the report to this file instead of stdout")]
        output: Option<PathBuf>,
        #[arg(long, help = "Output format: human|json (default: human)")]
        format: Option<String>,
    },
    /// List built-in rules
    #[command(about = "List rules", long_about = "Print every rule id with its default severity.")]
    Rules {
        #[arg(long, help = "Output format: human|json (default: human)")]
        format: Option<String>,
    },
    /// Show version
    #[command(about = "Show version", long_about = "Print the current lockpair version.")]
    Version,
}
