//! Structural annotation - bracket pairing, scopes and condition stacks
//!
//! A second pass over the token sequence that records which tokens open and
//! close each other. It turns the flat token list into something navigable
//! without building an AST: every bracket knows its pair, every block
//! keyword knows the braces bounding its body, and every token knows the
//! constructs enclosing it.
//!
//! Malformed input degrades instead of failing: an opener whose closer is
//! never found keeps `scope_closer`/`bracket_closer` unset, and such pairs
//! are excluded from `nested_parens` and `conditions`. Consumers must treat
//! a missing closer as "cannot reason about this construct".

use crate::token::{Token, TokenKind};

/// Structural metadata for one token. All indices point into the file's
/// token sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenInfo {
    /// For a scope keyword: the `{` opening its body.
    /// For a scope brace: the opener of its own pair.
    pub scope_opener: Option<usize>,
    /// For a scope keyword: the `}` closing its body.
    /// For a scope brace: the closer of its own pair.
    pub scope_closer: Option<usize>,
    /// For a scope brace: the keyword owning the scope.
    pub scope_owner: Option<usize>,
    /// For any paired bracket: the opening token of its pair.
    pub bracket_opener: Option<usize>,
    /// For any paired bracket: the closing token of its pair.
    pub bracket_closer: Option<usize>,
    /// Parenthesis pairs strictly enclosing this token, outermost first.
    pub nested_parens: Vec<(usize, usize)>,
    /// Scope-owner token indices enclosing this token, outermost first.
    pub conditions: Vec<usize>,
}

/// Per-token structural metadata, parallel to the token sequence.
#[derive(Debug, Clone, Default)]
pub struct Annotations {
    infos: Vec<TokenInfo>,
}

impl Annotations {
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TokenInfo> {
        self.infos.get(index)
    }
}

struct OpenEntry {
    index: usize,
    kind: TokenKind,
    /// Scope keyword this brace was attached to at push time.
    owner: Option<usize>,
}

/// Compute structural metadata for a token sequence.
pub fn annotate(tokens: &[Token]) -> Annotations {
    let mut infos = vec![TokenInfo::default(); tokens.len()];

    pair_brackets(tokens, &mut infos);
    assign_enclosures(tokens, &mut infos);

    Annotations { infos }
}

/// First sweep: match bracket pairs with an explicit stack and attach
/// scope openers to the keyword heading each block.
fn pair_brackets(tokens: &[Token], infos: &mut [TokenInfo]) {
    let mut stack: Vec<OpenEntry> = Vec::new();
    // Scope keyword waiting for its opening brace. Intervening tokens
    // (parameter lists, extends/implements clauses) are skipped; a `;`
    // outside parentheses means the construct has no body.
    let mut pending_scope: Option<usize> = None;

    for (i, token) in tokens.iter().enumerate() {
        let kind = token.kind;
        if kind.is_scope_keyword() {
            pending_scope = Some(i);
            continue;
        }
        match kind {
            TokenKind::OpenParen | TokenKind::OpenBracket => {
                stack.push(OpenEntry {
                    index: i,
                    kind,
                    owner: None,
                });
            }
            TokenKind::OpenBrace => {
                let owner = pending_scope.take();
                if let Some(o) = owner {
                    infos[o].scope_opener = Some(i);
                    infos[i].scope_owner = Some(o);
                }
                stack.push(OpenEntry {
                    index: i,
                    kind,
                    owner,
                });
            }
            TokenKind::CloseParen | TokenKind::CloseBracket | TokenKind::CloseBrace => {
                let wanted = match kind.matching_opener() {
                    Some(w) => w,
                    None => continue,
                };
                // A closer of the wrong kind leaves the stack alone; the
                // stray token stays unpaired.
                if stack.last().map(|e| e.kind) != Some(wanted) {
                    continue;
                }
                let entry = match stack.pop() {
                    Some(e) => e,
                    None => continue,
                };
                infos[entry.index].bracket_opener = Some(entry.index);
                infos[entry.index].bracket_closer = Some(i);
                infos[i].bracket_opener = Some(entry.index);
                infos[i].bracket_closer = Some(i);
                if let Some(o) = entry.owner {
                    infos[o].scope_closer = Some(i);
                    infos[entry.index].scope_opener = Some(entry.index);
                    infos[entry.index].scope_closer = Some(i);
                    infos[i].scope_owner = Some(o);
                    infos[i].scope_opener = Some(entry.index);
                    infos[i].scope_closer = Some(i);
                }
            }
            TokenKind::Semicolon => {
                let inside_parens = stack.iter().any(|e| e.kind == TokenKind::OpenParen);
                if !inside_parens {
                    pending_scope = None;
                }
            }
            TokenKind::CloseTag => {
                pending_scope = None;
            }
            _ => {}
        }
    }
}

/// Second sweep: give every token the parenthesis pairs and scope owners
/// enclosing it. Only completed pairs participate; the open and close
/// tokens of a pair carry the enclosures outside it.
fn assign_enclosures(tokens: &[Token], infos: &mut [TokenInfo]) {
    let mut paren_stack: Vec<(usize, usize)> = Vec::new();
    let mut cond_stack: Vec<usize> = Vec::new();

    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::OpenParen => {
                infos[i].nested_parens = paren_stack.clone();
                infos[i].conditions = cond_stack.clone();
                if let Some(closer) = infos[i].bracket_closer {
                    paren_stack.push((i, closer));
                }
            }
            TokenKind::CloseParen => {
                if paren_stack.last().map(|p| p.1) == Some(i) {
                    paren_stack.pop();
                }
                infos[i].nested_parens = paren_stack.clone();
                infos[i].conditions = cond_stack.clone();
            }
            TokenKind::OpenBrace => {
                infos[i].nested_parens = paren_stack.clone();
                infos[i].conditions = cond_stack.clone();
                if let (Some(owner), Some(_)) = (infos[i].scope_owner, infos[i].scope_closer) {
                    cond_stack.push(owner);
                }
            }
            TokenKind::CloseBrace => {
                if let Some(owner) = infos[i].scope_owner {
                    if cond_stack.last() == Some(&owner) {
                        cond_stack.pop();
                    }
                }
                infos[i].nested_parens = paren_stack.clone();
                infos[i].conditions = cond_stack.clone();
            }
            _ => {
                infos[i].nested_parens = paren_stack.clone();
                infos[i].conditions = cond_stack.clone();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn annotated(source: &str) -> (Vec<Token>, Annotations) {
        let out = tokenize(source);
        let ann = annotate(&out.tokens);
        (out.tokens, ann)
    }

    fn find_kind(tokens: &[Token], kind: TokenKind) -> usize {
        tokens.iter().position(|t| t.kind == kind).unwrap()
    }

    #[test]
    fn test_function_scope_attachment() {
        let (tokens, ann) = annotated("<?php function foo($a, $b) { return $a; }");
        let func = find_kind(&tokens, TokenKind::Function);
        let opener = ann.get(func).unwrap().scope_opener.unwrap();
        let closer = ann.get(func).unwrap().scope_closer.unwrap();
        assert_eq!(tokens[opener].kind, TokenKind::OpenBrace);
        assert_eq!(tokens[closer].kind, TokenKind::CloseBrace);
        assert!(func < opener && opener < closer);
        assert_eq!(ann.get(opener).unwrap().scope_owner, Some(func));
        assert_eq!(ann.get(closer).unwrap().scope_owner, Some(func));
    }

    #[test]
    fn test_extends_clause_is_skipped() {
        let (tokens, ann) = annotated("<?php class Foo extends Bar implements Baz { }");
        let class = find_kind(&tokens, TokenKind::Class);
        let opener = ann.get(class).unwrap().scope_opener.unwrap();
        assert_eq!(tokens[opener].kind, TokenKind::OpenBrace);
    }

    #[test]
    fn test_bracket_pairing() {
        let (tokens, ann) = annotated("<?php foo(bar($x), $y[0]);");
        for (i, token) in tokens.iter().enumerate() {
            if token.kind.is_open_bracket() {
                let info = ann.get(i).unwrap();
                let closer = info.bracket_closer.unwrap();
                assert!(closer > i);
                assert_eq!(ann.get(closer).unwrap().bracket_opener, Some(i));
            }
        }
    }

    #[test]
    fn test_nested_parens_strictly_enclose() {
        let (tokens, ann) = annotated("<?php foo(bar(1 + 2), 3);");
        let one = tokens.iter().position(|t| t.text == "1").unwrap();
        let parens = &ann.get(one).unwrap().nested_parens;
        assert_eq!(parens.len(), 2);
        // Outermost first, and properly nested.
        assert!(parens[0].0 < parens[1].0);
        assert!(parens[1].1 < parens[0].1);
        let three = tokens.iter().position(|t| t.text == "3").unwrap();
        assert_eq!(ann.get(three).unwrap().nested_parens.len(), 1);
    }

    #[test]
    fn test_open_paren_not_inside_itself() {
        let (tokens, ann) = annotated("<?php foo(1);");
        let open = find_kind(&tokens, TokenKind::OpenParen);
        let close = find_kind(&tokens, TokenKind::CloseParen);
        assert!(ann.get(open).unwrap().nested_parens.is_empty());
        assert!(ann.get(close).unwrap().nested_parens.is_empty());
    }

    #[test]
    fn test_conditions_outermost_first() {
        let (tokens, ann) =
            annotated("<?php class Foo { function bar() { if (true) { echo 1; } } }");
        let class = find_kind(&tokens, TokenKind::Class);
        let func = find_kind(&tokens, TokenKind::Function);
        let the_if = find_kind(&tokens, TokenKind::If);
        let echo = find_kind(&tokens, TokenKind::Echo);
        assert_eq!(ann.get(echo).unwrap().conditions, vec![class, func, the_if]);
        assert_eq!(ann.get(the_if).unwrap().conditions, vec![class, func]);
    }

    #[test]
    fn test_unclosed_scope_leaves_closer_unset() {
        let (tokens, ann) = annotated("<?php if (true) { echo 1;");
        let the_if = find_kind(&tokens, TokenKind::If);
        let info = ann.get(the_if).unwrap();
        assert!(info.scope_opener.is_some());
        assert!(info.scope_closer.is_none());
        // The incomplete scope must not leak into condition stacks.
        let echo = find_kind(&tokens, TokenKind::Echo);
        assert!(ann.get(echo).unwrap().conditions.is_empty());
    }

    #[test]
    fn test_stray_closer_is_unpaired() {
        let (tokens, ann) = annotated("<?php } echo 1;");
        let brace = find_kind(&tokens, TokenKind::CloseBrace);
        let info = ann.get(brace).unwrap();
        assert!(info.bracket_opener.is_none());
        assert!(info.scope_owner.is_none());
    }

    #[test]
    fn test_for_loop_semicolons_keep_pending_scope() {
        let (tokens, ann) = annotated("<?php for ($i = 0; $i < 5; $i++) { echo $i; }");
        let the_for = find_kind(&tokens, TokenKind::For);
        assert!(ann.get(the_for).unwrap().scope_opener.is_some());
    }

    #[test]
    fn test_bodyless_declaration_cancels_pending_scope() {
        let (tokens, ann) = annotated("<?php interface I { function f(); } class C { }");
        let func = find_kind(&tokens, TokenKind::Function);
        assert!(ann.get(func).unwrap().scope_opener.is_none());
        let class = find_kind(&tokens, TokenKind::Class);
        assert!(ann.get(class).unwrap().scope_opener.is_some());
    }

    #[test]
    fn test_declare_with_and_without_body() {
        let (tokens, ann) = annotated("<?php declare(strict_types=1); declare(ticks=1) { }");
        let declares: Vec<usize> = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| t.kind == TokenKind::Declare)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(declares.len(), 2);
        assert!(ann.get(declares[0]).unwrap().scope_opener.is_none());
        assert!(ann.get(declares[1]).unwrap().scope_opener.is_some());
    }

    #[test]
    fn test_closure_use_clause() {
        let (tokens, ann) = annotated("<?php $f = function ($a) use ($b) { return $a; };");
        let func = find_kind(&tokens, TokenKind::Function);
        let opener = ann.get(func).unwrap().scope_opener.unwrap();
        assert_eq!(ann.get(opener).unwrap().scope_owner, Some(func));
    }

    #[test]
    fn test_recorded_pairs_never_partially_overlap() {
        let (tokens, ann) = annotated(
            "<?php class A { function f($x) { if (g($x, h(1))) { while (true) { $y[$x](1); } } } }",
        );
        let mut pairs: Vec<(usize, usize)> = Vec::new();
        for i in 0..tokens.len() {
            let info = ann.get(i).unwrap();
            if let (Some(open), Some(close)) = (info.bracket_opener, info.bracket_closer) {
                if open == i {
                    pairs.push((open, close));
                }
            }
        }
        for (i, &(a_open, a_close)) in pairs.iter().enumerate() {
            assert!(a_close > a_open);
            for &(b_open, b_close) in &pairs[i + 1..] {
                let disjoint = a_close < b_open || b_close < a_open;
                let a_inside_b = b_open < a_open && a_close < b_close;
                let b_inside_a = a_open < b_open && b_close < a_close;
                assert!(
                    disjoint || a_inside_b || b_inside_a,
                    "pairs ({a_open},{a_close}) and ({b_open},{b_close}) partially overlap"
                );
            }
        }
    }
}
