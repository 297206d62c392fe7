//! Output formatting for rsniff
//!
//! Supports text (colored terminal), JSON, and unified diff output.

use colored::*;
use rsniff_core::{BatchError, Diagnostic, FileReport, FixOutcome, Severity};
use serde::Serialize;
use std::path::Path;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Diff,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<OutputFormat> {
        match s.to_lowercase().as_str() {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            "diff" => Some(OutputFormat::Diff),
            _ => None,
        }
    }
}

/// Summary statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    pub files_scanned: usize,
    pub errors: usize,
    pub warnings: usize,
    pub fixable: usize,
    pub files_with_fixes: usize,
    pub files_not_converged: usize,
    pub read_errors: usize,
    pub interrupted: bool,
}

/// Full JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput {
    pub version: String,
    pub summary: Summary,
    pub files: Vec<FileReport>,
    pub read_errors: Vec<BatchError>,
}

/// Reporter for accumulating and outputting results
pub struct Reporter {
    format: OutputFormat,
    verbose: bool,
    files: Vec<FileReport>,
    read_errors: Vec<BatchError>,
    summary: Summary,
}

impl Reporter {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self {
            format,
            verbose,
            files: Vec::new(),
            read_errors: Vec::new(),
            summary: Summary::default(),
        }
    }

    fn absorb(&mut self, report: &FileReport) {
        self.summary.files_scanned += 1;
        for diagnostic in &report.diagnostics {
            match diagnostic.severity {
                Severity::Error => self.summary.errors += 1,
                Severity::Warning => self.summary.warnings += 1,
            }
            if diagnostic.fixable {
                self.summary.fixable += 1;
            }
        }
        match report.fix_outcome {
            Some(FixOutcome::Fixed { .. }) => self.summary.files_with_fixes += 1,
            Some(FixOutcome::DidNotConverge { .. }) => self.summary.files_not_converged += 1,
            _ => {}
        }
    }

    /// Report diagnostics for one file (default mode, nothing written)
    pub fn report_analysis(&mut self, report: &FileReport) {
        self.absorb(report);
        if self.format == OutputFormat::Text {
            if report.diagnostics.is_empty() {
                if self.verbose {
                    println!("{}: OK", report.path.display());
                }
            } else {
                print_diagnostics(&report.path, &report.diagnostics);
            }
        }
        self.files.push(report.clone());
    }

    /// Report what fixing would change, without anything being written
    pub fn report_check(&mut self, report: &FileReport, original: Option<&str>) {
        self.absorb(report);

        match self.format {
            OutputFormat::Text => {
                if let (Some(old), Some(new)) = (original, report.fixed_source.as_deref()) {
                    println!("{}", report.path.display().to_string().bold());
                    print_diff(old, new);
                    println!();
                }
                if !report.diagnostics.is_empty() {
                    print_diagnostics(&report.path, &report.diagnostics);
                }
            }
            OutputFormat::Diff => {
                if let (Some(old), Some(new)) = (original, report.fixed_source.as_deref()) {
                    print_unified_diff(&report.path, old, new);
                }
            }
            OutputFormat::Json => {}
        }

        self.files.push(report.clone());
    }

    /// Report a file after fixes were applied to disk
    pub fn report_fixed(&mut self, report: &FileReport) {
        self.absorb(report);

        if self.format == OutputFormat::Text {
            match report.fix_outcome {
                Some(FixOutcome::Fixed { passes }) => {
                    println!("{}", report.path.display().to_string().bold());
                    println!(
                        "  {} Fixed in {} pass(es)",
                        "OK".green(),
                        passes
                    );
                }
                Some(FixOutcome::DidNotConverge { passes }) => {
                    println!("{}", report.path.display().to_string().bold());
                    println!(
                        "  {} Fixes did not settle after {} passes; kept the last state",
                        "!".yellow(),
                        passes
                    );
                }
                _ => {
                    if self.verbose {
                        println!("{}: No fixes needed", report.path.display());
                    }
                }
            }
            if !report.diagnostics.is_empty() {
                print_diagnostics(&report.path, &report.diagnostics);
            }
        }

        self.files.push(report.clone());
    }

    /// Report a file the batch could not read
    pub fn report_read_error(&mut self, error: &BatchError) {
        self.summary.read_errors += 1;
        if self.format == OutputFormat::Text {
            eprintln!(
                "{}: {} - {}",
                "Warning".yellow(),
                error.path.display(),
                error.message
            );
        }
        self.read_errors.push(error.clone());
    }

    pub fn set_interrupted(&mut self) {
        self.summary.interrupted = true;
    }

    /// Print final summary/output
    pub fn finish(self, check_mode: bool) {
        match self.format {
            OutputFormat::Text => {
                println!();
                println!("{}", "Summary".bold().underline());
                println!("  Files scanned: {}", self.summary.files_scanned);
                if self.summary.errors > 0 {
                    println!("  Errors: {}", self.summary.errors.to_string().red());
                } else {
                    println!("  Errors: 0");
                }
                if self.summary.warnings > 0 {
                    println!("  Warnings: {}", self.summary.warnings.to_string().yellow());
                } else {
                    println!("  Warnings: 0");
                }
                if self.summary.files_with_fixes > 0 {
                    let label = if check_mode {
                        "Files with pending fixes"
                    } else {
                        "Files fixed"
                    };
                    println!("  {}: {}", label, self.summary.files_with_fixes);
                }
                if self.summary.files_not_converged > 0 {
                    println!(
                        "  Files not converged: {}",
                        self.summary.files_not_converged.to_string().yellow()
                    );
                }
                if self.summary.read_errors > 0 {
                    println!(
                        "  Unreadable files: {}",
                        self.summary.read_errors.to_string().red()
                    );
                }
                if self.summary.interrupted {
                    println!("  {}", "Interrupted before all files ran".yellow());
                }

                if check_mode && self.summary.files_with_fixes > 0 {
                    println!();
                    println!("{}", "Run with --fix to apply these fixes".yellow());
                } else if !check_mode && self.summary.fixable > 0 {
                    println!();
                    println!(
                        "{}",
                        format!(
                            "{} problem(s) fixable with --fix",
                            self.summary.fixable
                        )
                        .yellow()
                    );
                }
            }
            OutputFormat::Json => {
                let output = JsonOutput {
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    summary: self.summary,
                    files: self.files,
                    read_errors: self.read_errors,
                };
                println!("{}", serde_json::to_string_pretty(&output).unwrap());
            }
            OutputFormat::Diff => {
                // Patch-compatible output already went out per file
            }
        }
    }

    /// Get summary for exit code determination
    pub fn summary(&self) -> &Summary {
        &self.summary
    }
}

/// Print one line per diagnostic: `path:line:column  [E|W] code  message`
fn print_diagnostics(path: &Path, diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        let marker = match diagnostic.severity {
            Severity::Error => "[E]".red().bold(),
            Severity::Warning => "[W]".yellow().bold(),
        };
        println!(
            "{}:{}:{}  {} {}  {}",
            path.display(),
            diagnostic.line,
            diagnostic.column,
            marker,
            diagnostic.code.cyan(),
            diagnostic.message
        );
    }
}

/// Print a colored diff between old and new content
fn print_diff(old: &str, new: &str) {
    for diff_result in diff::lines(old, new) {
        match diff_result {
            diff::Result::Left(l) => {
                println!("  {}", format!("- {}", l).red());
            }
            diff::Result::Right(r) => {
                println!("  {}", format!("+ {}", r).green());
            }
            diff::Result::Both(_, _) => {
                // Skip unchanged lines for cleaner output
            }
        }
    }
}

/// Print unified diff format (standard diff -u compatible)
fn print_unified_diff(path: &Path, old: &str, new: &str) {
    use similar::{ChangeTag, TextDiff};

    let diff = TextDiff::from_lines(old, new);
    let path_str = path.display().to_string();

    println!("--- a/{}", path_str);
    println!("+++ b/{}", path_str);

    for hunk in diff.unified_diff().context_radius(3).iter_hunks() {
        println!("{}", hunk.header());
        for change in hunk.iter_changes() {
            let sign = match change.tag() {
                ChangeTag::Delete => "-",
                ChangeTag::Insert => "+",
                ChangeTag::Equal => " ",
            };
            print!("{}{}", sign, change);
            if change.missing_newline() {
                println!();
            }
        }
    }
}
