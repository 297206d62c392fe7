//! Diagnostics - violation records and the per-file collector

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// One reported violation. `code` is a stable dotted identifier of the
/// form `Standard.Category.Sniff.Violation`, usable for suppression and
/// severity configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: String,
    pub message: String,
    pub line: usize,
    pub column: usize,
    pub fixable: bool,
}

impl Diagnostic {
    pub fn error(
        code: impl Into<String>,
        message: impl Into<String>,
        line: usize,
        column: usize,
    ) -> Self {
        Self {
            severity: Severity::Error,
            code: code.into(),
            message: message.into(),
            line,
            column,
            fixable: false,
        }
    }

    pub fn warning(
        code: impl Into<String>,
        message: impl Into<String>,
        line: usize,
        column: usize,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            code: code.into(),
            message: message.into(),
            line,
            column,
            fixable: false,
        }
    }

    pub fn fixable(mut self) -> Self {
        self.fixable = true;
        self
    }
}

/// Configured replacement for a diagnostic's reported severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeverityOverride {
    Error,
    Warning,
    /// Suppress the diagnostic entirely.
    Off,
}

impl SeverityOverride {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "error" => Some(SeverityOverride::Error),
            "warning" => Some(SeverityOverride::Warning),
            "off" => Some(SeverityOverride::Off),
            _ => None,
        }
    }
}

/// Severity policy applied when a collector is finalized. Raw severities
/// stay visible on the collector until then.
#[derive(Debug, Clone, Default)]
pub struct SeverityConfig {
    pub warnings_as_errors: bool,
    /// Keys are full codes or dotted prefixes (`Rsniff.Files` matches
    /// every sniff in that category). The longest matching key wins.
    pub overrides: Vec<(String, SeverityOverride)>,
}

impl SeverityConfig {
    pub fn override_for(&self, code: &str) -> Option<SeverityOverride> {
        let mut best: Option<(&str, SeverityOverride)> = None;
        for (key, o) in &self.overrides {
            let matches = code == key
                || (code.len() > key.len()
                    && code.starts_with(key.as_str())
                    && code.as_bytes()[key.len()] == b'.');
            if matches && best.map_or(true, |(k, _)| key.len() > k.len()) {
                best = Some((key, *o));
            }
        }
        best.map(|(_, o)| o)
    }
}

/// Accumulates diagnostics for a single file.
///
/// Report order is preserved as the tiebreaker; sorting, de-duplication
/// and severity overrides all happen in [`finalize`](Self::finalize) so
/// raw counts remain available to tooling beforehand.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    entries: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Raw error count, before any severity override.
    pub fn error_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    /// Raw warning count, before any severity override.
    pub fn warning_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    /// Apply severity overrides, sort by position and collapse duplicates.
    ///
    /// Identical (code, line, column, message) entries reported more than
    /// once survive as a single diagnostic. Sorting is by line, then
    /// column, then report order.
    pub fn finalize(self, config: &SeverityConfig) -> Vec<Diagnostic> {
        let mut kept: Vec<Diagnostic> = Vec::with_capacity(self.entries.len());
        for mut d in self.entries {
            match config.override_for(&d.code) {
                Some(SeverityOverride::Off) => continue,
                Some(SeverityOverride::Error) => d.severity = Severity::Error,
                Some(SeverityOverride::Warning) => d.severity = Severity::Warning,
                None => {}
            }
            if config.warnings_as_errors && d.severity == Severity::Warning {
                d.severity = Severity::Error;
            }
            kept.push(d);
        }

        kept.sort_by(|a, b| a.line.cmp(&b.line).then(a.column.cmp(&b.column)));

        let mut seen: HashSet<(String, usize, usize, String)> = HashSet::new();
        kept.retain(|d| seen.insert((d.code.clone(), d.line, d.column, d.message.clone())));
        kept
    }
}
