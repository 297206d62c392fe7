//! rsniff CLI - PHP static analysis and fixing tool
//!
//! Bundled sniffs:
//! - Rsniff.WhiteSpace.SpaceAfterComma: Commas must be followed by a single space
//! - Rsniff.WhiteSpace.KeywordSpacing: Control keywords use the form `keyword (...) {`
//! - Rsniff.Strings.TrailingWhitespaceInString: No whitespace at end of line inside strings
//! - Rsniff.Files.EndOfFileNewline: Files end with exactly one newline
//! - Rsniff.Files.LineLength: Lines stay under the configured length
//! - Rsniff.Classes.OrphanedParent: No `parent` in classes without an extends clause
//! - Rsniff.Functions.ForbiddenFunctions: Calls to banned functions

mod config;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use std::process::ExitCode;

use config::Config;
use output::{OutputFormat, Reporter};
use rsniff_core::{logging, CancelToken, Runner};
use rsniff_sniffs::builtin_registry;

#[derive(Parser)]
#[command(name = "rsniff")]
#[command(version)]
#[command(about = "A token-level PHP static analysis and fixing tool")]
struct Cli {
    /// Files or directories to scan
    #[arg(required_unless_present = "list_sniffs")]
    paths: Vec<PathBuf>,

    /// Report what fixing would change without writing anything
    #[arg(long, conflicts_with = "fix")]
    check: bool,

    /// Apply fixes to files in place
    #[arg(long, conflicts_with = "check")]
    fix: bool,

    /// Show verbose output
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Sniffs to run, by code (can be specified multiple times). Overrides config file.
    #[arg(long, short = 's', value_name = "CODE")]
    sniff: Vec<String>,

    /// Output format: text, json, diff
    #[arg(long, value_name = "FORMAT")]
    format: Option<String>,

    /// Shorthand for --format json
    #[arg(long, conflicts_with = "format")]
    json: bool,

    /// Path to config file (default: auto-detect .rsniff.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Ignore config files
    #[arg(long)]
    no_config: bool,

    /// List available sniffs and exit
    #[arg(long)]
    list_sniffs: bool,

    /// Write a debug log to the given file
    #[arg(long, value_name = "FILE")]
    debug_log: Option<PathBuf>,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red(), e);
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut registry = builtin_registry();

    // Handle --list-sniffs
    if cli.list_sniffs {
        println!("{}", "Available sniffs:".bold());
        for sniff in registry.iter() {
            println!("  {} - {}", sniff.code().green(), sniff.description());
        }
        return Ok(ExitCode::SUCCESS);
    }

    // Load config file
    let loaded = if cli.no_config {
        None
    } else if let Some(config_path) = &cli.config {
        Some((Config::load_path(config_path)?, config_path.clone()))
    } else {
        Config::load()?
    };
    let (config, config_path) = match loaded {
        Some((cfg, path)) => (cfg, Some(path)),
        None => (Config::default(), None),
    };

    // Determine output format: CLI beats config, config beats default
    let output_format = if cli.json {
        OutputFormat::Json
    } else {
        match cli.format.as_deref().or(config.output.format.as_deref()) {
            Some(name) => OutputFormat::from_str(name).ok_or_else(|| {
                anyhow::anyhow!(
                    "Invalid output format '{}'. Valid options: text, json, diff",
                    name
                )
            })?,
            None => OutputFormat::Text,
        }
    };

    if cli.verbose && output_format == OutputFormat::Text {
        if let Some(path) = &config_path {
            println!("{}: {}", "Using config".bold(), path.display());
        }
    }

    if let Some(log_path) = &cli.debug_log {
        let resolved = logging::init_logger(Some(log_path))
            .with_context(|| format!("Failed to open debug log {}", log_path.display()))?;
        if cli.verbose && output_format == OutputFormat::Text {
            println!("{}: {}", "Debug log".bold(), resolved.display());
        }
        if let Some(path) = &config_path {
            logging::log_config_load(path);
        }
    }

    // Validate sniff codes from CLI
    let all_codes = registry.codes();
    for code in &cli.sniff {
        if !all_codes.contains(&code.as_str()) {
            eprintln!(
                "{}: Unknown sniff '{}'. Use --list-sniffs to see available sniffs.",
                "Error".red(),
                code
            );
            return Ok(ExitCode::from(1));
        }
    }

    // Narrow and configure the registry
    let enabled = config.effective_sniffs(&all_codes, &cli.sniff);
    registry.retain_enabled(&enabled);
    registry.configure_all(&config.sniff_params());

    if registry.is_empty() {
        eprintln!("{}: No sniffs enabled", "Error".red());
        return Ok(ExitCode::from(1));
    }

    let fix_mode = cli.fix;
    let check_mode = cli.check;
    // Diff output needs the rewritten source even outside --check.
    let simulate_fixes = fix_mode || check_mode || output_format == OutputFormat::Diff;

    if cli.verbose && output_format == OutputFormat::Text {
        let mode = if fix_mode {
            "fix"
        } else if check_mode {
            "check"
        } else {
            "analyze"
        };
        println!("{}: {}", "Mode".bold(), mode);
        println!("{}: {}", "Sniffs".bold(), registry.codes().join(", "));
        println!();
    }

    // Collect all file paths first
    let mut file_paths: Vec<PathBuf> = Vec::new();
    let mut missing_paths: Vec<PathBuf> = Vec::new();

    for path in &cli.paths {
        if path.is_file() {
            file_paths.push(path.clone());
        } else if path.is_dir() {
            for entry in walkdir::WalkDir::new(path)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .filter(|e| config.matches_extension(e.path()))
            {
                let file_path = entry.path();
                if !config.should_exclude(file_path) {
                    file_paths.push(file_path.to_path_buf());
                }
            }
        } else {
            missing_paths.push(path.clone());
        }
    }

    let runner = Runner::new(registry, config.severity_config());
    let cancel = CancelToken::new();

    if logging::is_enabled() {
        logging::log_run_start(file_paths.len(), runner.registry().len());
    }

    let result = runner.run_batch(&file_paths, simulate_fixes, &cancel);

    let mut reporter = Reporter::new(output_format, cli.verbose);

    // Report missing paths
    for path in &missing_paths {
        if output_format == OutputFormat::Text {
            eprintln!(
                "{}: Path does not exist: {}",
                "Warning".yellow(),
                path.display()
            );
        }
    }

    // Report file results
    for report in &result.files {
        if fix_mode {
            if let Some(fixed) = &report.fixed_source {
                std::fs::write(&report.path, fixed)
                    .with_context(|| format!("Failed to write {}", report.path.display()))?;
            }
            reporter.report_fixed(report);
        } else if check_mode || output_format == OutputFormat::Diff {
            let original = if output_format == OutputFormat::Json {
                None
            } else {
                std::fs::read_to_string(&report.path).ok()
            };
            reporter.report_check(report, original.as_deref());
        } else {
            reporter.report_analysis(report);
        }
    }

    for error in &result.errors {
        reporter.report_read_error(error);
    }

    if result.interrupted {
        reporter.set_interrupted();
    }

    // Determine exit code
    let summary = reporter.summary();
    let exit_code = if summary.errors > 0 || summary.read_errors > 0 {
        ExitCode::from(1)
    } else if check_mode && summary.files_with_fixes + summary.files_not_converged > 0 {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    };

    if logging::is_enabled() {
        logging::log_run_complete(summary.errors, summary.warnings, summary.read_errors);
    }

    // Print final output
    reporter.finish(check_mode);

    Ok(exit_code)
}
