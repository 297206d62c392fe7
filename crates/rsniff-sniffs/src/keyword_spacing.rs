//! Sniff: spacing around control structure keywords
//!
//! Control keywords are separated from their condition by one space, and
//! the closing parenthesis from the opening brace by one space:
//! `if (...) {`. Both sides of one structure are fixed together, so a
//! statement like `if(true){` is whole after a single pass.

use rsniff_core::{FileContext, Sniff, SniffControl, TokenKind};

enum PendingFix {
    InsertSpaceAfter(usize),
    ReplaceWithSpace(usize),
}

pub struct KeywordSpacingSniff;

impl KeywordSpacingSniff {
    /// One space expected at `index + 1`, before the token at `index + 2`
    /// (or directly at `index + 1` when nothing separates them). Returns
    /// the violation found, if any.
    fn check_gap(
        ctx: &FileContext,
        index: usize,
        expected: TokenKind,
    ) -> Option<(usize, PendingFix)> {
        match ctx.kind(index + 1) {
            Some(kind) if kind == expected => {
                Some((0, PendingFix::InsertSpaceAfter(index)))
            }
            Some(TokenKind::Whitespace) if ctx.kind(index + 2) == Some(expected) => {
                let text = &ctx.token(index + 1)?.text;
                if text == " " || text.contains(['\n', '\r']) {
                    None
                } else {
                    Some((text.len(), PendingFix::ReplaceWithSpace(index + 1)))
                }
            }
            _ => None,
        }
    }
}

impl Sniff for KeywordSpacingSniff {
    fn code(&self) -> &'static str {
        "Rsniff.WhiteSpace.KeywordSpacing"
    }

    fn description(&self) -> &'static str {
        "Control keywords use the form `keyword (...) {`"
    }

    fn register(&self) -> &'static [TokenKind] {
        &[
            TokenKind::If,
            TokenKind::Elseif,
            TokenKind::For,
            TokenKind::Foreach,
            TokenKind::While,
            TokenKind::Switch,
            TokenKind::Catch,
        ]
    }

    fn process(&self, ctx: &mut FileContext, index: usize) -> SniffControl {
        let mut pending = Vec::new();

        if let Some((found, fix)) = Self::check_gap(ctx, index, TokenKind::OpenParen) {
            let keyword = ctx
                .token(index)
                .map(|t| t.text.clone())
                .unwrap_or_default();
            if ctx.fixable_error(
                index,
                "Rsniff.WhiteSpace.KeywordSpacing.SpaceAfterKeyword",
                format!(
                    "Expected 1 space after \"{}\" keyword; found {}",
                    keyword, found
                ),
            ) {
                pending.push(fix);
            }
        }

        // The brace check needs the condition's closing parenthesis.
        if let Some(paren) = ctx.next_meaningful(index) {
            if ctx.kind(paren) == Some(TokenKind::OpenParen) {
                if let Some(close) = ctx.bracket_closer(paren) {
                    if let Some((found, fix)) = Self::check_gap(ctx, close, TokenKind::OpenBrace) {
                        if ctx.fixable_error(
                            close,
                            "Rsniff.WhiteSpace.KeywordSpacing.SpaceBeforeBrace",
                            format!(
                                "Expected 1 space between closing parenthesis and opening brace; found {}",
                                found
                            ),
                        ) {
                            pending.push(fix);
                        }
                    }
                }
            }
        }

        if !pending.is_empty() {
            let fixer = ctx.fixer();
            fixer.begin_changeset();
            for fix in pending {
                match fix {
                    PendingFix::InsertSpaceAfter(i) => fixer.insert_after(i, " "),
                    PendingFix::ReplaceWithSpace(i) => fixer.replace(i, " "),
                }
            }
            fixer.end_changeset();
        }
        SniffControl::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsniff_core::{Diagnostic, FixOutcome, Runner, SeverityConfig, SniffRegistry};
    use std::path::Path;

    fn registry() -> SniffRegistry {
        let mut registry = SniffRegistry::new();
        registry.register(Box::new(KeywordSpacingSniff));
        registry
    }

    fn check(source: &str) -> Vec<Diagnostic> {
        let runner = Runner::new(registry(), SeverityConfig::default());
        runner
            .analyze_source(Path::new("test.php"), source)
            .diagnostics
    }

    fn fix(source: &str) -> String {
        let runner = Runner::new(registry(), SeverityConfig::default());
        let report = runner.fix_source(Path::new("test.php"), source);
        report.fixed_source.unwrap_or_else(|| source.to_string())
    }

    // ==================== Clean Sources ====================

    #[test]
    fn test_correct_spacing_is_clean() {
        assert!(check("<?php if (true) { echo 1; }").is_empty());
    }

    #[test]
    fn test_brace_on_next_line_is_clean() {
        assert!(check("<?php if (true)\n{\n    echo 1;\n}").is_empty());
    }

    #[test]
    fn test_while_without_body_brace() {
        // do-while has no brace after the condition.
        assert!(check("<?php do { $i++; } while ($i < 3);").is_empty());
    }

    // ==================== Violations ====================

    #[test]
    fn test_missing_space_after_keyword() {
        let diagnostics = check("<?php if(true) { echo 1; }");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].code,
            "Rsniff.WhiteSpace.KeywordSpacing.SpaceAfterKeyword"
        );
        assert!(diagnostics[0].message.contains("found 0"));
    }

    #[test]
    fn test_missing_space_before_brace() {
        let diagnostics = check("<?php if (true){ echo 1; }");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].code,
            "Rsniff.WhiteSpace.KeywordSpacing.SpaceBeforeBrace"
        );
    }

    #[test]
    fn test_both_sides_reported() {
        let diagnostics = check("<?php if(true){ echo 1; }");
        assert_eq!(diagnostics.len(), 2);
    }

    #[test]
    fn test_extra_spaces_after_keyword() {
        let diagnostics = check("<?php if  (true) { echo 1; }");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("found 2"));
    }

    // ==================== Fixing ====================

    #[test]
    fn test_both_sides_fixed_in_one_pass() {
        let runner = Runner::new(registry(), SeverityConfig::default());
        let report = runner.fix_source(Path::new("test.php"), "<?php if(true){ echo 1; }");
        assert_eq!(report.fix_outcome, Some(FixOutcome::Fixed { passes: 1 }));
        assert_eq!(
            report.fixed_source.as_deref(),
            Some("<?php if (true) { echo 1; }")
        );
    }

    #[test]
    fn test_extra_spaces_collapsed() {
        assert_eq!(
            fix("<?php if  (true)  { echo 1; }"),
            "<?php if (true) { echo 1; }"
        );
    }

    #[test]
    fn test_foreach_fixed() {
        assert_eq!(
            fix("<?php foreach($items as $item){ echo $item; }"),
            "<?php foreach ($items as $item) { echo $item; }"
        );
    }

    #[test]
    fn test_nested_structures_fixed() {
        assert_eq!(
            fix("<?php if($a){ while($b){ echo 1; } }"),
            "<?php if ($a) { while ($b) { echo 1; } }"
        );
    }

    #[test]
    fn test_catch_fixed() {
        assert_eq!(
            fix("<?php try { f(); } catch(Exception $e){ log($e); }"),
            "<?php try { f(); } catch (Exception $e) { log($e); }"
        );
    }

    #[test]
    fn test_unclosed_condition_only_keyword_side() {
        // Parse error territory; the keyword side still gets reported.
        let diagnostics = check("<?php if(true");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].code,
            "Rsniff.WhiteSpace.KeywordSpacing.SpaceAfterKeyword"
        );
    }
}
