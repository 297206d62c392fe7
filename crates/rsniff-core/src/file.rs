//! Per-file analysis context and the token query API
//!
//! A [`FileContext`] owns one file's tokens and annotations for the
//! duration of a dispatch pass. Sniffs receive it mutably but can only
//! read the token buffer; the write paths are the diagnostic reporting
//! methods and the fixer changeset API. Every query is bounds-safe and
//! returns `None` past either end of the file.

use std::path::{Path, PathBuf};

use crate::annotator::{annotate, Annotations, TokenInfo};
use crate::diagnostics::{Diagnostic, DiagnosticCollector, SeverityConfig};
use crate::fixer::{ApplyOutcome, Fixer};
use crate::lexer::{tokenize, LexErrorKind};
use crate::token::{Token, TokenKind, EMPTY_KINDS};

fn lex_error_code(kind: LexErrorKind) -> &'static str {
    match kind {
        LexErrorKind::UnterminatedString => "Internal.Tokenizer.UnterminatedString",
        LexErrorKind::UnterminatedComment => "Internal.Tokenizer.UnterminatedComment",
        LexErrorKind::UnterminatedHeredoc => "Internal.Tokenizer.UnterminatedHeredoc",
    }
}

pub struct FileContext {
    path: PathBuf,
    source: String,
    tokens: Vec<Token>,
    annotations: Annotations,
    collector: DiagnosticCollector,
    fixer: Fixer,
    lex_error_count: usize,
}

impl FileContext {
    /// Tokenize and annotate `source`. Lex errors become error diagnostics
    /// up front; the rest of the file still gets analyzed.
    pub fn parse(path: impl Into<PathBuf>, source: impl Into<String>, fixing: bool) -> Self {
        let path = path.into();
        let source = source.into();
        let output = tokenize(&source);
        let annotations = annotate(&output.tokens);

        let mut collector = DiagnosticCollector::new();
        for err in &output.errors {
            collector.report(Diagnostic::error(
                lex_error_code(err.kind),
                err.kind.to_string(),
                err.line,
                err.column,
            ));
        }

        let fixer = Fixer::new(fixing, output.tokens.len());
        Self {
            path,
            source,
            tokens: output.tokens,
            annotations,
            collector,
            fixer,
            lex_error_count: output.errors.len(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn token(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn kind(&self, index: usize) -> Option<TokenKind> {
        self.tokens.get(index).map(|t| t.kind)
    }

    pub fn text(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(|t| t.text.as_str())
    }

    pub fn has_parse_errors(&self) -> bool {
        self.lex_error_count > 0
    }

    // ----- queries ---------------------------------------------------

    /// First token at or after `start` (and before `end`, when given)
    /// whose kind is in `kinds`.
    pub fn find_next(&self, kinds: &[TokenKind], start: usize, end: Option<usize>) -> Option<usize> {
        let end = end.unwrap_or(self.tokens.len()).min(self.tokens.len());
        (start..end).find(|&i| kinds.contains(&self.tokens[i].kind))
    }

    /// First token at or after `start` whose kind is NOT in `kinds` - the
    /// deny-list form used to skip trivia.
    pub fn find_next_not(
        &self,
        kinds: &[TokenKind],
        start: usize,
        end: Option<usize>,
    ) -> Option<usize> {
        let end = end.unwrap_or(self.tokens.len()).min(self.tokens.len());
        (start..end).find(|&i| !kinds.contains(&self.tokens[i].kind))
    }

    /// First token at or after `start` matching `predicate`.
    pub fn find_next_by(
        &self,
        predicate: impl Fn(&Token) -> bool,
        start: usize,
        end: Option<usize>,
    ) -> Option<usize> {
        let end = end.unwrap_or(self.tokens.len()).min(self.tokens.len());
        (start..end).find(|&i| predicate(&self.tokens[i]))
    }

    /// First token at or before `start`, searching backwards down to
    /// `end` (inclusive, default 0), whose kind is in `kinds`.
    pub fn find_previous(
        &self,
        kinds: &[TokenKind],
        start: usize,
        end: Option<usize>,
    ) -> Option<usize> {
        self.find_previous_by(|t| kinds.contains(&t.kind), start, end)
    }

    /// Backwards deny-list search; see [`find_previous`](Self::find_previous).
    pub fn find_previous_not(
        &self,
        kinds: &[TokenKind],
        start: usize,
        end: Option<usize>,
    ) -> Option<usize> {
        self.find_previous_by(|t| !kinds.contains(&t.kind), start, end)
    }

    pub fn find_previous_by(
        &self,
        predicate: impl Fn(&Token) -> bool,
        start: usize,
        end: Option<usize>,
    ) -> Option<usize> {
        if self.tokens.is_empty() {
            return None;
        }
        let start = start.min(self.tokens.len() - 1);
        let end = end.unwrap_or(0);
        if start < end {
            return None;
        }
        let mut i = start;
        loop {
            if predicate(&self.tokens[i]) {
                return Some(i);
            }
            if i == end {
                return None;
            }
            i -= 1;
        }
    }

    /// Next non-trivia token after `index`.
    pub fn next_meaningful(&self, index: usize) -> Option<usize> {
        self.find_next_not(EMPTY_KINDS, index + 1, None)
    }

    /// Previous non-trivia token before `index`.
    pub fn prev_meaningful(&self, index: usize) -> Option<usize> {
        if index == 0 {
            return None;
        }
        self.find_previous_not(EMPTY_KINDS, index - 1, None)
    }

    // ----- structural annotations ------------------------------------

    pub fn info(&self, index: usize) -> Option<&TokenInfo> {
        self.annotations.get(index)
    }

    pub fn scope_opener(&self, index: usize) -> Option<usize> {
        self.annotations.get(index)?.scope_opener
    }

    pub fn scope_closer(&self, index: usize) -> Option<usize> {
        self.annotations.get(index)?.scope_closer
    }

    pub fn scope_owner(&self, index: usize) -> Option<usize> {
        self.annotations.get(index)?.scope_owner
    }

    pub fn bracket_opener(&self, index: usize) -> Option<usize> {
        self.annotations.get(index)?.bracket_opener
    }

    pub fn bracket_closer(&self, index: usize) -> Option<usize> {
        self.annotations.get(index)?.bracket_closer
    }

    /// Parenthesis pairs strictly enclosing the token, outermost first.
    pub fn nested_parens(&self, index: usize) -> &[(usize, usize)] {
        self.annotations
            .get(index)
            .map(|info| info.nested_parens.as_slice())
            .unwrap_or(&[])
    }

    /// Scope owners enclosing the token, outermost first.
    pub fn conditions(&self, index: usize) -> &[usize] {
        self.annotations
            .get(index)
            .map(|info| info.conditions.as_slice())
            .unwrap_or(&[])
    }

    pub fn has_condition(&self, index: usize, kind: TokenKind) -> bool {
        self.conditions(index)
            .iter()
            .any(|&owner| self.kind(owner) == Some(kind))
    }

    // ----- reporting and fixing --------------------------------------

    pub fn error(&mut self, index: usize, code: impl Into<String>, message: impl Into<String>) {
        if let Some((line, column)) = self.position_of(index) {
            self.collector
                .report(Diagnostic::error(code, message, line, column));
        }
    }

    pub fn warning(&mut self, index: usize, code: impl Into<String>, message: impl Into<String>) {
        if let Some((line, column)) = self.position_of(index) {
            self.collector
                .report(Diagnostic::warning(code, message, line, column));
        }
    }

    pub fn error_on_line(
        &mut self,
        line: usize,
        column: usize,
        code: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.collector
            .report(Diagnostic::error(code, message, line, column));
    }

    pub fn warning_on_line(
        &mut self,
        line: usize,
        column: usize,
        code: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.collector
            .report(Diagnostic::warning(code, message, line, column));
    }

    /// Report a fixable error. Returns true when the fixer is active and
    /// the sniff should go on to propose its changeset.
    pub fn fixable_error(
        &mut self,
        index: usize,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> bool {
        if let Some((line, column)) = self.position_of(index) {
            self.collector
                .report(Diagnostic::error(code, message, line, column).fixable());
        }
        self.fixer.is_enabled()
    }

    /// Report a fixable warning; see [`fixable_error`](Self::fixable_error).
    pub fn fixable_warning(
        &mut self,
        index: usize,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> bool {
        if let Some((line, column)) = self.position_of(index) {
            self.collector
                .report(Diagnostic::warning(code, message, line, column).fixable());
        }
        self.fixer.is_enabled()
    }

    pub fn fixer(&mut self) -> &mut Fixer {
        &mut self.fixer
    }

    pub fn fixing(&self) -> bool {
        self.fixer.is_enabled()
    }

    /// Raw collector, for pre-finalize counts.
    pub fn collector(&self) -> &DiagnosticCollector {
        &self.collector
    }

    fn position_of(&self, index: usize) -> Option<(usize, usize)> {
        self.tokens.get(index).map(|t| (t.line, t.column))
    }

    /// Apply this pass's changesets. Discarded-changeset conflicts are
    /// surfaced as warnings first.
    pub fn apply_fixes(&mut self) -> Option<ApplyOutcome> {
        self.drain_conflicts();
        self.fixer.apply(&self.tokens)
    }

    /// Consume the context, producing the finalized diagnostic list.
    pub fn finalize(mut self, config: &SeverityConfig) -> Vec<Diagnostic> {
        self.drain_conflicts();
        self.collector.finalize(config)
    }

    fn drain_conflicts(&mut self) {
        for conflict in self.fixer.take_conflicts() {
            let (line, column) = self
                .tokens
                .get(conflict.token)
                .map(|t| (t.line, t.column))
                .unwrap_or((1, 1));
            self.collector.report(Diagnostic::warning(
                "Internal.Fixer.ConflictingEdit",
                format!("fix requested but not applied: {}", conflict.kind),
                line,
                column,
            ));
        }
    }
}
