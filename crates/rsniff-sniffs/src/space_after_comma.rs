//! Sniff: single space after each comma
//!
//! A comma separating arguments, array items or list elements must be
//! followed by exactly one space. A comma at the end of a line is fine;
//! spaces between the comma and the line break are not.

use rsniff_core::{FileContext, Sniff, SniffControl, TokenKind};

pub struct SpaceAfterCommaSniff;

impl Sniff for SpaceAfterCommaSniff {
    fn code(&self) -> &'static str {
        "Rsniff.WhiteSpace.SpaceAfterComma"
    }

    fn description(&self) -> &'static str {
        "Commas must be followed by a single space"
    }

    fn register(&self) -> &'static [TokenKind] {
        &[TokenKind::Comma]
    }

    fn process(&self, ctx: &mut FileContext, index: usize) -> SniffControl {
        let Some(next) = ctx.kind(index + 1) else {
            return SniffControl::Continue;
        };

        if next != TokenKind::Whitespace {
            if ctx.fixable_error(
                index,
                "Rsniff.WhiteSpace.SpaceAfterComma.NoSpace",
                "Commas (,) must be followed by a single space; expected 1 space but found none",
            ) {
                ctx.fixer().insert_after(index, " ");
            }
            return SniffControl::Continue;
        }

        let text = match ctx.token(index + 1) {
            Some(token) => token.text.clone(),
            None => return SniffControl::Continue,
        };

        // A run containing a line break is judged by what precedes the
        // break: nothing means the comma simply ends the line.
        match text.find(['\r', '\n']) {
            Some(0) => {}
            Some(break_at) => {
                if ctx.fixable_error(
                    index,
                    "Rsniff.WhiteSpace.SpaceAfterComma.ExtraSpace",
                    format!(
                        "Commas (,) ending a line must not be followed by {} trailing space(s)",
                        break_at
                    ),
                ) {
                    ctx.fixer().replace(index + 1, text[break_at..].to_string());
                }
            }
            None if text.len() == 1 => {}
            None => {
                if ctx.fixable_error(
                    index,
                    "Rsniff.WhiteSpace.SpaceAfterComma.ExtraSpace",
                    format!(
                        "Commas (,) must be followed by a single space; expected 1 space but found {}",
                        text.len()
                    ),
                ) {
                    ctx.fixer().replace(index + 1, " ");
                }
            }
        }
        SniffControl::Continue
    }
}
