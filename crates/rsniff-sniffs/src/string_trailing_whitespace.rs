//! Sniff: trailing whitespace inside multi-line strings
//!
//! Spaces or tabs sitting right before a line break inside a string
//! literal, heredoc or nowdoc are invisible in the rendered output and
//! survive most editors' whitespace cleanup. Reported per offending
//! line. String contents are user data, so nothing is rewritten.

use regex::Regex;
use rsniff_core::{FileContext, Sniff, SniffControl, TokenKind};

pub struct StringTrailingWhitespaceSniff;

impl Sniff for StringTrailingWhitespaceSniff {
    fn code(&self) -> &'static str {
        "Rsniff.Strings.TrailingWhitespaceInString"
    }

    fn description(&self) -> &'static str {
        "Strings must not contain whitespace at the end of a line"
    }

    fn register(&self) -> &'static [TokenKind] {
        &[
            TokenKind::SingleQuotedString,
            TokenKind::DoubleQuotedString,
            TokenKind::Heredoc,
            TokenKind::Nowdoc,
        ]
    }

    fn process(&self, ctx: &mut FileContext, index: usize) -> SniffControl {
        let (text, token_line, token_column) = match ctx.token(index) {
            Some(token) => (token.text.clone(), token.line, token.column),
            None => return SniffControl::Continue,
        };
        if !text.contains('\n') {
            return SniffControl::Continue;
        }

        let blanks_before_break = Regex::new(r"[ \t]+\r?\n").unwrap();
        for found in blanks_before_break.find_iter(&text) {
            let prefix = &text[..found.start()];
            let line = token_line + prefix.matches('\n').count();
            let column = match prefix.rfind('\n') {
                Some(pos) => found.start() - pos,
                None => token_column + found.start(),
            };
            ctx.warning_on_line(
                line,
                column,
                "Rsniff.Strings.TrailingWhitespaceInString.Found",
                "Whitespace found at end of line within string",
            );
        }
        SniffControl::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsniff_core::{Diagnostic, Runner, Severity, SeverityConfig, SniffRegistry};
    use std::path::Path;

    fn check(source: &str) -> Vec<Diagnostic> {
        let mut registry = SniffRegistry::new();
        registry.register(Box::new(StringTrailingWhitespaceSniff));
        let runner = Runner::new(registry, SeverityConfig::default());
        runner
            .analyze_source(Path::new("test.php"), source)
            .diagnostics
    }

    // ==================== Clean Sources ====================

    #[test]
    fn test_single_line_string_is_clean() {
        assert!(check("<?php $a = 'trailing   spaces here';").is_empty());
    }

    #[test]
    fn test_multiline_string_without_trailing_blanks() {
        assert!(check("<?php $a = 'first\nsecond\nthird';").is_empty());
    }

    #[test]
    fn test_blank_line_inside_string_is_clean() {
        assert!(check("<?php $a = \"first\n\nthird\";").is_empty());
    }

    // ==================== Violations ====================

    #[test]
    fn test_trailing_space_in_double_quoted() {
        let diagnostics = check("<?php $a = \"first \nsecond\";");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Warning);
        assert_eq!(
            diagnostics[0].code,
            "Rsniff.Strings.TrailingWhitespaceInString.Found"
        );
    }

    #[test]
    fn test_trailing_tab_in_single_quoted() {
        let diagnostics = check("<?php $a = 'first\t\nsecond';");
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_each_offending_line_reported() {
        let diagnostics = check("<?php $a = 'one \ntwo  \nthree';");
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].line, 1);
        assert_eq!(diagnostics[1].line, 2);
    }

    #[test]
    fn test_heredoc_trailing_whitespace() {
        let source = "<?php $a = <<<EOT\nline one \nline two\nEOT;\n";
        let diagnostics = check(source);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].line, 2);
    }

    #[test]
    fn test_reported_position_is_start_of_blank_run() {
        let diagnostics = check("<?php $a = 'ab  \ncd';");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].line, 1);
        // Token starts at column 12; the blanks start two chars in.
        assert_eq!(diagnostics[0].column, 15);
    }
}
