//! Sniff: line length limits
//!
//! Lines past the soft limit get a warning, lines past the hard limit an
//! error. Both limits are configurable per project. Runs once per file.

use rsniff_core::{FileContext, ParamMap, Sniff, SniffControl, TokenKind};

pub struct LineLengthSniff {
    line_limit: usize,
    absolute_line_limit: usize,
}

impl Default for LineLengthSniff {
    fn default() -> Self {
        Self {
            line_limit: 100,
            absolute_line_limit: 140,
        }
    }
}

impl Sniff for LineLengthSniff {
    fn code(&self) -> &'static str {
        "Rsniff.Files.LineLength"
    }

    fn description(&self) -> &'static str {
        "Lines should not exceed the configured length"
    }

    fn register(&self) -> &'static [TokenKind] {
        &[
            TokenKind::OpenTag,
            TokenKind::OpenTagEcho,
            TokenKind::InlineHtml,
        ]
    }

    fn configure(&mut self, params: &ParamMap) {
        if let Some(limit) = params.get("line_limit").and_then(|p| p.as_int()) {
            if limit > 0 {
                self.line_limit = limit as usize;
            }
        }
        if let Some(limit) = params.get("absolute_line_limit").and_then(|p| p.as_int()) {
            if limit > 0 {
                self.absolute_line_limit = limit as usize;
            }
        }
    }

    fn process(&self, ctx: &mut FileContext, _index: usize) -> SniffControl {
        let widths: Vec<usize> = ctx
            .source()
            .lines()
            .map(|line| line.chars().count())
            .collect();
        for (line_index, width) in widths.into_iter().enumerate() {
            if width > self.absolute_line_limit {
                ctx.error_on_line(
                    line_index + 1,
                    1,
                    "Rsniff.Files.LineLength.MaxExceeded",
                    format!(
                        "Line exceeds maximum limit of {} characters; contains {} characters",
                        self.absolute_line_limit, width
                    ),
                );
            } else if width > self.line_limit {
                ctx.warning_on_line(
                    line_index + 1,
                    1,
                    "Rsniff.Files.LineLength.TooLong",
                    format!(
                        "Line exceeds {} characters; contains {} characters",
                        self.line_limit, width
                    ),
                );
            }
        }
        SniffControl::SkipTo(usize::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsniff_core::{Diagnostic, ParamValue, Runner, Severity, SeverityConfig, SniffRegistry};
    use std::collections::HashMap;
    use std::path::Path;

    fn check(source: &str) -> Vec<Diagnostic> {
        let mut registry = SniffRegistry::new();
        registry.register(Box::new(LineLengthSniff::default()));
        let runner = Runner::new(registry, SeverityConfig::default());
        runner
            .analyze_source(Path::new("test.php"), source)
            .diagnostics
    }

    fn check_with_limits(source: &str, line_limit: i64, absolute: i64) -> Vec<Diagnostic> {
        let mut registry = SniffRegistry::new();
        registry.register(Box::new(LineLengthSniff::default()));
        let mut params = HashMap::new();
        let mut map = ParamMap::new();
        map.insert("line_limit".to_string(), ParamValue::Int(line_limit));
        map.insert("absolute_line_limit".to_string(), ParamValue::Int(absolute));
        params.insert("Rsniff.Files.LineLength".to_string(), map);
        registry.configure_all(&params);
        let runner = Runner::new(registry, SeverityConfig::default());
        runner
            .analyze_source(Path::new("test.php"), source)
            .diagnostics
    }

    fn line_of(width: usize) -> String {
        format!("<?php\n// {}\n", "x".repeat(width.saturating_sub(3)))
    }

    #[test]
    fn test_short_lines_are_clean() {
        assert!(check("<?php\n$a = 1;\n").is_empty());
    }

    #[test]
    fn test_line_at_limit_is_clean() {
        assert!(check(&line_of(100)).is_empty());
    }

    #[test]
    fn test_line_over_soft_limit_warns() {
        let diagnostics = check(&line_of(101));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Warning);
        assert_eq!(diagnostics[0].code, "Rsniff.Files.LineLength.TooLong");
        assert_eq!(diagnostics[0].line, 2);
    }

    #[test]
    fn test_line_over_hard_limit_errors() {
        let diagnostics = check(&line_of(141));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Error);
        assert_eq!(diagnostics[0].code, "Rsniff.Files.LineLength.MaxExceeded");
    }

    #[test]
    fn test_width_counts_chars_not_bytes() {
        // 101 two-byte characters: over by chars either way, but the
        // message must count characters.
        let long = format!("<?php\n// {}\n", "é".repeat(98));
        let diagnostics = check(&long);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("contains 101 characters"));
    }

    #[test]
    fn test_limits_configurable() {
        let source = line_of(50);
        assert!(check(&source).is_empty());
        let diagnostics = check_with_limits(&source, 40, 45);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Error);
    }

    #[test]
    fn test_every_long_line_reported() {
        let long = "y".repeat(120);
        let source = format!("<?php\n// {}\n$a = 1;\n// {}\n", long, long);
        let diagnostics = check(&source);
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].line, 2);
        assert_eq!(diagnostics[1].line, 4);
    }
}
