//! Sniff: calls to forbidden functions
//!
//! Flags calls to functions a project has banned. Entries may carry a
//! preferred replacement (`"sizeof=>count"`), which changes the message
//! and the violation code. Matching is case-insensitive, as PHP function
//! names are. Method calls, static calls and declarations of the same
//! name are not calls to the global function and stay unflagged.

use rsniff_core::{FileContext, ParamMap, Sniff, SniffControl, TokenKind};

pub struct ForbiddenFunctionsSniff {
    forbidden: Vec<(String, Option<String>)>,
    error: bool,
}

impl Default for ForbiddenFunctionsSniff {
    fn default() -> Self {
        Self {
            forbidden: vec![
                ("eval".to_string(), None),
                ("create_function".to_string(), None),
                ("each".to_string(), None),
            ],
            error: true,
        }
    }
}

fn parse_entry(entry: &str) -> (String, Option<String>) {
    match entry.split_once("=>") {
        Some((name, alternative)) => (
            name.trim().to_lowercase(),
            Some(alternative.trim().to_string()),
        ),
        None => (entry.trim().to_lowercase(), None),
    }
}

impl Sniff for ForbiddenFunctionsSniff {
    fn code(&self) -> &'static str {
        "Rsniff.Functions.ForbiddenFunctions"
    }

    fn description(&self) -> &'static str {
        "Forbidden functions must not be called"
    }

    fn register(&self) -> &'static [TokenKind] {
        &[TokenKind::Identifier]
    }

    fn configure(&mut self, params: &ParamMap) {
        if let Some(entries) = params.get("forbidden").and_then(|p| p.as_list()) {
            self.forbidden = entries.iter().map(|e| parse_entry(e)).collect();
        }
        if let Some(error) = params.get("error").and_then(|p| p.as_bool()) {
            self.error = error;
        }
    }

    fn process(&self, ctx: &mut FileContext, index: usize) -> SniffControl {
        let name = match ctx.token(index) {
            Some(token) => token.text.to_lowercase(),
            None => return SniffControl::Continue,
        };
        let Some((_, alternative)) = self.forbidden.iter().find(|(f, _)| *f == name) else {
            return SniffControl::Continue;
        };

        // Only plain call syntax: the next meaningful token opens the
        // argument list.
        match ctx.next_meaningful(index) {
            Some(next) if ctx.kind(next) == Some(TokenKind::OpenParen) => {}
            _ => return SniffControl::Continue,
        }

        if let Some(mut prev) = ctx.prev_meaningful(index) {
            if ctx.kind(prev) == Some(TokenKind::Backslash) {
                // `\each()` still hits the global function; `Foo\each()`
                // is somebody else's.
                match ctx.prev_meaningful(prev) {
                    Some(before) if ctx.kind(before) == Some(TokenKind::Identifier) => {
                        return SniffControl::Continue;
                    }
                    Some(before) => prev = before,
                    None => prev = index,
                }
            }
            if prev != index {
                match ctx.kind(prev) {
                    Some(
                        TokenKind::Function
                        | TokenKind::Arrow
                        | TokenKind::NullsafeArrow
                        | TokenKind::DoubleColon,
                    ) => return SniffControl::Continue,
                    _ => {}
                }
            }
        }

        let (code, message) = match alternative {
            Some(alt) => (
                "Rsniff.Functions.ForbiddenFunctions.FoundWithAlternative",
                format!(
                    "The use of function {}() is forbidden; use {}() instead",
                    name, alt
                ),
            ),
            None => (
                "Rsniff.Functions.ForbiddenFunctions.Found",
                format!("The use of function {}() is forbidden", name),
            ),
        };
        if self.error {
            ctx.error(index, code, message);
        } else {
            ctx.warning(index, code, message);
        }
        SniffControl::Continue
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
        registry.register(Box::new(ForbiddenFunctionsSniff::default()));
        let runner = Runner::new(registry, SeverityConfig::default());
        runner
            .analyze_source(Path::new("test.php"), source)
            .diagnostics
    }

    fn check_configured(source: &str, forbidden: &[&str], error: bool) -> Vec<Diagnostic> {
        let mut registry = SniffRegistry::new();
        registry.register(Box::new(ForbiddenFunctionsSniff::default()));
        let mut map = ParamMap::new();
        map.insert(
            "forbidden".to_string(),
            ParamValue::List(forbidden.iter().map(|s| s.to_string()).collect()),
        );
        map.insert("error".to_string(), ParamValue::Bool(error));
        let mut params = HashMap::new();
        params.insert("Rsniff.Functions.ForbiddenFunctions".to_string(), map);
        registry.configure_all(&params);
        let runner = Runner::new(registry, SeverityConfig::default());
        runner
            .analyze_source(Path::new("test.php"), source)
            .diagnostics
    }

    // ==================== Detection ====================

    #[test]
    fn test_each_call_flagged() {
        let diagnostics = check("<?php while ($pair = each($arr)) {}");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].code,
            "Rsniff.Functions.ForbiddenFunctions.Found"
        );
        assert_eq!(diagnostics[0].severity, Severity::Error);
    }

    #[test]
    fn test_create_function_flagged() {
        let diagnostics = check("<?php $f = create_function('$a', 'return $a;');");
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let diagnostics = check("<?php EACH($arr);");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("each()"));
    }

    #[test]
    fn test_global_namespace_reference_flagged() {
        let diagnostics = check("<?php \\each($arr);");
        assert_eq!(diagnostics.len(), 1);
    }

    // ==================== Skip Cases ====================

    #[test]
    fn test_method_call_skipped() {
        assert!(check("<?php $obj->each($arr);").is_empty());
    }

    #[test]
    fn test_nullsafe_method_call_skipped() {
        assert!(check("<?php $obj?->each($arr);").is_empty());
    }

    #[test]
    fn test_static_call_skipped() {
        assert!(check("<?php Collection::each($arr);").is_empty());
    }

    #[test]
    fn test_function_declaration_skipped() {
        assert!(check("<?php function each($arr) {}").is_empty());
    }

    #[test]
    fn test_namespaced_function_skipped() {
        assert!(check("<?php Iter\\each($arr);").is_empty());
    }

    #[test]
    fn test_bare_identifier_skipped() {
        assert!(check("<?php $x = eachimage;").is_empty());
    }

    #[test]
    fn test_unlisted_function_skipped() {
        assert!(check("<?php count($arr);").is_empty());
    }

    // ==================== Configuration ====================

    #[test]
    fn test_alternative_changes_code_and_message() {
        let diagnostics = check_configured("<?php sizeof($arr);", &["sizeof=>count"], true);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].code,
            "Rsniff.Functions.ForbiddenFunctions.FoundWithAlternative"
        );
        assert!(diagnostics[0].message.contains("use count() instead"));
    }

    #[test]
    fn test_configured_list_replaces_default() {
        let diagnostics = check_configured("<?php each($arr); print_r($x);", &["print_r"], true);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("print_r()"));
    }

    #[test]
    fn test_warning_severity_configurable() {
        let diagnostics = check_configured("<?php each($arr);", &["each"], false);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Warning);
    }
}
