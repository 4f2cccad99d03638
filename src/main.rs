use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use ksp_version_gate::config::{load_from_path, load_optional, Settings};
use ksp_version_gate::{
    ConfigNode, GameVersion, LoggingProgress, ProgressEvent, RecordingProgress, SourceId, Tee,
    VersionChecker,
};
use similar::{ChangeTag, TextDiff};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

const DEFAULT_SETTINGS_FILE: &str = "ksp-version-gate.toml";
const VERSION_ENV: &str = "KSP_VERSION";
const DIFF_CONTEXT: usize = 2;

#[derive(Parser)]
#[command(name = "ksp-version-gate")]
#[command(about = "Evaluate :KSP_VERSION annotations and prune config trees", long_about = None)]
#[command(version)]
struct Cli {
    /// Running game version, major.minor.revision (overrides KSP_VERSION and settings)
    #[arg(short, long, global = true)]
    game_version: Option<String>,

    /// Settings file (defaults to ./ksp-version-gate.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a single version term such as ">≈1.8"
    Check {
        term: String,
    },

    /// Evaluate a version expression such as "1.8,!1.8.0"
    Eval {
        expression: String,
    },

    /// Prune JSON config trees by their :KSP_VERSION annotations
    Prune {
        /// A JSON tree file, or a directory of them
        path: PathBuf,

        /// Write pruned trees back to their files
        #[arg(short, long)]
        write: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = load_settings(cli.config.as_deref())?;
    init_logging(&settings);
    let version = resolve_version(cli.game_version.as_deref(), &settings)?;

    match cli.command {
        Commands::Check { term } => cmd_check(version, &term),
        Commands::Eval { expression } => cmd_eval(version, &expression),
        Commands::Prune { path, write, diff } => cmd_prune(version, &path, write, diff),
    }
}

/// An explicit --config must exist; the default file is optional.
fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    let settings = match explicit {
        Some(path) => load_from_path(path)?,
        None => load_optional(DEFAULT_SETTINGS_FILE)?.unwrap_or_default(),
    };
    Ok(settings)
}

/// `RUST_LOG` wins over the settings file; default is warnings only.
fn init_logging(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(settings.log_level.as_deref().unwrap_or("warn")))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Resolve the running game version
///
/// Priority order:
/// 1. Explicit --game-version flag
/// 2. KSP_VERSION environment variable
/// 3. game_version in the settings file
fn resolve_version(flag: Option<&str>, settings: &Settings) -> Result<GameVersion> {
    if let Some(value) = flag {
        return value
            .parse::<GameVersion>()
            .with_context(|| "invalid --game-version".to_string());
    }

    if let Ok(value) = env::var(VERSION_ENV) {
        if !value.trim().is_empty() {
            return value
                .parse::<GameVersion>()
                .with_context(|| format!("invalid {} environment variable", VERSION_ENV));
        }
    }

    if let Some(version) = settings.game_version {
        return Ok(version);
    }

    anyhow::bail!(
        "{}\n{}\n  {}\n  {}\n  {}",
        "No running game version configured.".red(),
        "Try one of:".bold(),
        "1. Pass it explicitly: ksp-version-gate --game-version 1.12.5 ...",
        "2. Set environment variable: export KSP_VERSION=1.12.5",
        "3. Add game_version = \"1.12.5\" to ksp-version-gate.toml"
    )
}

fn cmd_check(version: GameVersion, term: &str) -> Result<()> {
    let progress = LoggingProgress::new();
    let checker = VersionChecker::new(&progress, version)?;
    let satisfied = checker.check_version(term)?;
    report_outcome(version, term, satisfied);
    Ok(())
}

fn cmd_eval(version: GameVersion, expression: &str) -> Result<()> {
    let progress = LoggingProgress::new();
    let checker = VersionChecker::new(&progress, version)?;
    let satisfied = checker.check_expression(expression)?;
    report_outcome(version, expression, satisfied);
    Ok(())
}

fn report_outcome(version: GameVersion, input: &str, satisfied: bool) {
    if satisfied {
        println!("{} {} satisfies {}", "✓".green(), version, input);
    } else {
        println!("{} {} does not satisfy {}", "✗".red(), version, input);
        std::process::exit(1);
    }
}

/// Helper: Collect the JSON tree files to prune.
///
/// A directory is scanned one level deep; files are sorted by path.
fn discover_tree_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).max_depth(1) {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|s| s.to_str()) == Some("json")
        {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort();

    if files.is_empty() {
        anyhow::bail!("No .json config trees found in {}", path.display());
    }

    Ok(files)
}

fn cmd_prune(version: GameVersion, path: &Path, write: bool, show_diff: bool) -> Result<()> {
    let files = discover_tree_files(path)?;

    let progress = Tee::new(LoggingProgress::new(), RecordingProgress::new());
    let checker = VersionChecker::new(&progress, version)?;

    println!("Version: {}", version);
    println!();

    let mut pruned = 0;
    let mut failed = 0;

    for file in files {
        println!("Pruning {}...", file.display());

        let mut root = match read_tree(&file) {
            Ok(root) => root,
            Err(e) => {
                eprintln!("{} {}: {:#}", "✗".red(), file.display(), e);
                failed += 1;
                println!();
                continue;
            }
        };
        let before = serde_json::to_string_pretty(&root)?;

        let result = checker.prune(&mut root, &SourceId::new(file.display().to_string()));

        for event in progress.second.take() {
            print_event(&event);
        }

        if let Err(e) = result {
            eprintln!("{} {}: {}", "✗".red(), file.display(), e);
            eprintln!("  {}", "Pass aborted; file left untouched".red());
            failed += 1;
            println!();
            continue;
        }
        pruned += 1;

        let after = serde_json::to_string_pretty(&root)?;
        if show_diff && before != after {
            display_diff(&file, &before, &after);
        }
        if write {
            fs::write(&file, format!("{}\n", after))
                .with_context(|| format!("failed to write {}", file.display()))?;
        }

        println!();
    }

    let counts = progress.first.counter().snapshot();

    println!("{}", "Summary:".bold());
    println!("  {} trees pruned", format!("{}", pruned).green());
    println!(
        "  {} nodes removed",
        format!("{}", counts.unsatisfied_nodes).cyan()
    );
    println!(
        "  {} values removed",
        format!("{}", counts.unsatisfied_values).cyan()
    );
    println!("  {} errors", format!("{}", counts.errors).yellow());
    println!("  {} failed", format!("{}", failed).red());

    if failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn read_tree(file: &Path) -> Result<ConfigNode> {
    let contents = fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse config tree {}", file.display()))
}

fn print_event(event: &ProgressEvent) {
    match event {
        ProgressEvent::UnsatisfiedNode { path, .. } => {
            println!("{} removed node {}", "⊘".cyan(), path);
        }
        ProgressEvent::UnsatisfiedValue { path, .. } => {
            println!("{} removed value {}", "⊘".cyan(), path);
        }
        ProgressEvent::UnsatisfiedRoot { source } => {
            println!("{} removed root of {}", "⊘".cyan(), source);
        }
        ProgressEvent::Warning { message, .. } => {
            eprintln!("{} {}", "⚠".yellow(), message);
        }
        ProgressEvent::Error { message, .. } => {
            eprintln!("{} {}", "⚠".yellow(), message);
        }
        ProgressEvent::Exception { message, error } => {
            eprintln!("{} {}", "✗".red(), message);
            eprintln!("  {}", error.dimmed());
        }
    }
}

/// Helper: Show the removed lines of a pruned tree as unified-diff hunks
///
/// Pruning only ever deletes entries or shortens names, so each hunk shows
/// the annotated original next to what survived.
fn display_diff(file: &Path, original: &str, pruned: &str) {
    let diff = TextDiff::from_lines(original, pruned);
    let source = file.display().to_string();

    println!("{}", format!("--- {} (annotated)", source).dimmed());
    println!("{}", format!("+++ {} (pruned)", source).dimmed());

    let mut unified = diff.unified_diff();
    unified.context_radius(DIFF_CONTEXT);

    for hunk in unified.iter_hunks() {
        println!("{}", hunk.header().to_string().cyan());
        for change in hunk.iter_changes() {
            let line = change.to_string_lossy();
            let line = line.trim_end_matches('\n');
            match change.tag() {
                ChangeTag::Delete => println!("{}", format!("-{}", line).red()),
                ChangeTag::Insert => println!("{}", format!("+{}", line).green()),
                ChangeTag::Equal => println!(" {}", line),
            }
        }
    }
}
