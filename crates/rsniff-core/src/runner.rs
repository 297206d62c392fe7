//! Analysis and fix orchestration
//!
//! The runner owns a configured sniff registry and a severity policy and
//! turns sources or paths into file reports. Fixing is iterative: each
//! pass re-tokenizes, re-runs every sniff, and applies what it can, until
//! a pass changes nothing or the pass cap is hit.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

use crate::diagnostics::{Diagnostic, Severity, SeverityConfig};
use crate::file::FileContext;
use crate::logging;
use crate::registry::SniffRegistry;

/// Upper bound on productive fix passes per file. A file still changing
/// after this many passes has sniffs fighting each other.
pub const MAX_FIX_PASSES: usize = 50;

/// How fixing ended for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FixOutcome {
    /// No pass changed the source.
    Clean,
    /// The source stabilized after this many passes that changed it.
    Fixed { passes: usize },
    /// Still changing when the pass cap was hit. The last applied state
    /// is kept.
    DidNotConverge { passes: usize },
}

/// Everything the engine has to say about one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    /// Final diagnostics, severity-resolved and ordered by position. In
    /// fix mode these describe the source after fixing.
    pub diagnostics: Vec<Diagnostic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix_outcome: Option<FixOutcome>,
    /// The rewritten source, present only when fixing changed it.
    #[serde(skip)]
    pub fixed_source: Option<String>,
}

impl FileReport {
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Errors that abort processing of a single file
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),
}

/// A file the batch could not process. The rest of the batch is
/// unaffected.
#[derive(Debug, Clone, Serialize)]
pub struct BatchError {
    pub path: PathBuf,
    pub message: String,
}

/// Outcome of a multi-file run.
#[derive(Debug, Default)]
pub struct BatchResult {
    /// Reports ordered by path.
    pub files: Vec<FileReport>,
    /// Files that failed to read, ordered by path.
    pub errors: Vec<BatchError>,
    /// True when cancellation stopped the batch before all files ran.
    pub interrupted: bool,
}

/// Cooperative cancellation flag, checked before each file in a batch.
/// Clone it and hand one side to whatever decides to stop the run.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Drives a configured registry over sources and files.
pub struct Runner {
    registry: SniffRegistry,
    severity: SeverityConfig,
}

impl Runner {
    pub fn new(registry: SniffRegistry, severity: SeverityConfig) -> Self {
        Self { registry, severity }
    }

    pub fn registry(&self) -> &SniffRegistry {
        &self.registry
    }

    /// Analyze one source without fixing.
    pub fn analyze_source(&self, path: &Path, source: &str) -> FileReport {
        let mut ctx = FileContext::parse(path, source, false);
        self.registry.run(&mut ctx);
        let diagnostics = ctx.finalize(&self.severity);
        let report = FileReport {
            path: path.to_path_buf(),
            diagnostics,
            fix_outcome: None,
            fixed_source: None,
        };
        if logging::is_enabled() {
            logging::log_file_result(path, report.error_count(), report.warning_count());
        }
        report
    }

    /// Analyze and repair one source. Each productive pass re-parses the
    /// rewritten text so later passes see real token positions; the loop
    /// exits when a pass leaves the source untouched.
    pub fn fix_source(&self, path: &Path, source: &str) -> FileReport {
        let mut current = source.to_string();
        let mut applied_passes = 0usize;

        loop {
            let mut ctx = FileContext::parse(path, &current, true);
            self.registry.run(&mut ctx);

            let changed = match ctx.apply_fixes() {
                Some(outcome) if outcome.source != current => {
                    current = outcome.source;
                    true
                }
                _ => false,
            };

            if !changed {
                let diagnostics = ctx.finalize(&self.severity);
                let (fix_outcome, fixed_source) = if applied_passes == 0 {
                    (FixOutcome::Clean, None)
                } else {
                    (
                        FixOutcome::Fixed {
                            passes: applied_passes,
                        },
                        Some(current),
                    )
                };
                if logging::is_enabled() {
                    logging::log_fix_result(path, applied_passes, true);
                }
                return FileReport {
                    path: path.to_path_buf(),
                    diagnostics,
                    fix_outcome: Some(fix_outcome),
                    fixed_source,
                };
            }

            applied_passes += 1;
            if applied_passes >= MAX_FIX_PASSES {
                // Report against the last applied state without trying
                // to fix it further.
                let mut final_ctx = FileContext::parse(path, &current, false);
                self.registry.run(&mut final_ctx);
                let diagnostics = final_ctx.finalize(&self.severity);
                if logging::is_enabled() {
                    logging::log_fix_result(path, applied_passes, false);
                }
                return FileReport {
                    path: path.to_path_buf(),
                    diagnostics,
                    fix_outcome: Some(FixOutcome::DidNotConverge {
                        passes: applied_passes,
                    }),
                    fixed_source: Some(current),
                };
            }
        }
    }

    pub fn analyze_file(&self, path: &Path) -> Result<FileReport, RunError> {
        let source = std::fs::read_to_string(path)?;
        Ok(self.analyze_source(path, &source))
    }

    /// Fix one file in memory. Writing the result back is the caller's
    /// decision.
    pub fn fix_file(&self, path: &Path) -> Result<FileReport, RunError> {
        let source = std::fs::read_to_string(path)?;
        Ok(self.fix_source(path, &source))
    }

    /// Process many files in parallel. A file that cannot be read lands
    /// in `errors`; everything else still runs. Cancellation skips files
    /// that have not started yet.
    pub fn run_batch(&self, paths: &[PathBuf], fix: bool, cancel: &CancelToken) -> BatchResult {
        let outcomes: Vec<Option<Result<FileReport, BatchError>>> = paths
            .par_iter()
            .map(|path| {
                if cancel.is_cancelled() {
                    return None;
                }
                let result = if fix {
                    self.fix_file(path)
                } else {
                    self.analyze_file(path)
                };
                Some(result.map_err(|e| BatchError {
                    path: path.clone(),
                    message: e.to_string(),
                }))
            })
            .collect();

        let interrupted = cancel.is_cancelled();
        let mut files = Vec::new();
        let mut errors = Vec::new();
        for outcome in outcomes.into_iter().flatten() {
            match outcome {
                Ok(report) => files.push(report),
                Err(err) => errors.push(err),
            }
        }
        files.sort_by(|a, b| a.path.cmp(&b.path));
        errors.sort_by(|a, b| a.path.cmp(&b.path));

        BatchResult {
            files,
            errors,
            interrupted,
        }
    }
}
