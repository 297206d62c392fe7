//! rsniff-core: Token-level static analysis engine for PHP
//!
//! This crate provides:
//! - `tokenize()`: Lossless PHP tokenizer that never rejects input
//! - `annotate()`: Bracket pairing, scope and enclosure annotations
//! - `FileContext`: Per-file token buffer with bounds-safe queries
//! - `Sniff` / `SniffRegistry`: Detection logic and token dispatch
//! - `Fixer`: Atomic changeset-based source rewriting
//! - `Runner`: Analysis and iterative fixing over files and batches

pub mod annotator;
pub mod diagnostics;
pub mod file;
pub mod fixer;
pub mod lexer;
pub mod logging;
pub mod registry;
pub mod runner;
pub mod token;

pub use annotator::{annotate, Annotations, TokenInfo};
pub use diagnostics::{
    Diagnostic, DiagnosticCollector, Severity, SeverityConfig, SeverityOverride,
};
pub use file::FileContext;
pub use fixer::{ApplyOutcome, Changeset, Conflict, ConflictKind, Edit, EditOp, Fixer};
pub use lexer::{tokenize, LexError, LexErrorKind, LexOutput};
pub use registry::{ParamMap, ParamValue, Sniff, SniffControl, SniffRegistry};
pub use runner::{
    BatchError, BatchResult, CancelToken, FileReport, FixOutcome, RunError, Runner,
    MAX_FIX_PASSES,
};
pub use token::{keyword_kind, Token, TokenKind, EMPTY_KINDS};
