//! Sniff: `parent` reference in a class without a parent
//!
//! `parent::` (and `parent` type references) only resolve inside a class
//! that actually extends something; in a class without an `extends`
//! clause they fail at call time.

use rsniff_core::{FileContext, Sniff, SniffControl, TokenKind};

pub struct OrphanedParentSniff;

impl Sniff for OrphanedParentSniff {
    fn code(&self) -> &'static str {
        "Rsniff.Classes.OrphanedParent"
    }

    fn description(&self) -> &'static str {
        "\"parent\" must only be used in classes with an extends clause"
    }

    fn register(&self) -> &'static [TokenKind] {
        &[TokenKind::Parent]
    }

    fn process(&self, ctx: &mut FileContext, index: usize) -> SniffControl {
        // Innermost enclosing class scope; traits and interfaces resolve
        // `parent` at use time and plain functions are not our concern.
        let class_ptr = ctx
            .conditions(index)
            .iter()
            .rev()
            .copied()
            .find(|&owner| ctx.kind(owner) == Some(TokenKind::Class));
        let Some(class_ptr) = class_ptr else {
            return SniffControl::Continue;
        };

        let Some(opener) = ctx.scope_opener(class_ptr) else {
            return SniffControl::Continue;
        };

        if ctx
            .find_next(&[TokenKind::Extends], class_ptr + 1, Some(opener))
            .is_some()
        {
            return SniffControl::Continue;
        }

        ctx.error(
            index,
            "Rsniff.Classes.OrphanedParent.Found",
            "Using \"parent\" inside a class without parent",
        );
        SniffControl::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsniff_core::{Diagnostic, Runner, SeverityConfig, SniffRegistry};
    use std::path::Path;

    fn check(source: &str) -> Vec<Diagnostic> {
        let mut registry = SniffRegistry::new();
        registry.register(Box::new(OrphanedParentSniff));
        let runner = Runner::new(registry, SeverityConfig::default());
        runner
            .analyze_source(Path::new("test.php"), source)
            .diagnostics
    }

    // ==================== Violations ====================

    #[test]
    fn test_parent_call_without_extends() {
        let diagnostics =
            check("<?php class Foo { function bar() { echo parent::baz(); } } ?>");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, "Rsniff.Classes.OrphanedParent.Found");
    }

    #[test]
    fn test_diagnostic_at_parent_token() {
        let diagnostics =
            check("<?php class Foo { function bar() { echo parent::baz(); } } ?>");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].line, 1);
        // Column of the `parent` token itself.
        assert_eq!(diagnostics[0].column, 41);
    }

    #[test]
    fn test_parent_type_hint_without_extends() {
        let diagnostics = check("<?php class Foo { function bar(parent $x) {} }");
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_parent_in_closure_inside_class() {
        let diagnostics = check(
            "<?php class Foo { function bar() { $f = function () { return parent::baz(); }; } }",
        );
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_each_use_reported() {
        let diagnostics = check(
            "<?php class Foo { function a() { parent::x(); } function b() { parent::y(); } }",
        );
        assert_eq!(diagnostics.len(), 2);
    }

    // ==================== Clean Sources ====================

    #[test]
    fn test_extends_clause_is_clean() {
        assert!(check(
            "<?php class Foo extends Bar { function bar() { echo parent::baz(); } }"
        )
        .is_empty());
    }

    #[test]
    fn test_parent_outside_class_skipped() {
        // Could be bound into an inheriting class later.
        assert!(check("<?php function f() { return parent::baz(); }").is_empty());
    }

    #[test]
    fn test_parent_in_trait_skipped() {
        assert!(check("<?php trait T { function bar() { echo parent::baz(); } }").is_empty());
    }

    #[test]
    fn test_anonymous_class_with_extends() {
        assert!(check(
            "<?php $o = new class extends Base { function f() { parent::g(); } };"
        )
        .is_empty());
    }

    #[test]
    fn test_anonymous_class_without_extends() {
        let diagnostics =
            check("<?php $o = new class { function f() { parent::g(); } };");
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_unclosed_class_body_skipped() {
        // No scope opener gets recorded when the brace never arrives.
        assert!(check("<?php class Foo function bar() { parent::baz(); }").is_empty());
    }
}
