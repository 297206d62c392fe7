//! Sniff: every file ends with exactly one newline
//!
//! A missing final newline concatenates badly and trips POSIX tools;
//! extra blank lines at the end are noise. Runs once per file from the
//! first token and inspects the raw source tail.

use rsniff_core::{FileContext, Sniff, SniffControl, TokenKind};

pub struct EofNewlineSniff;

impl Sniff for EofNewlineSniff {
    fn code(&self) -> &'static str {
        "Rsniff.Files.EndOfFileNewline"
    }

    fn description(&self) -> &'static str {
        "Files must end with exactly one newline character"
    }

    fn register(&self) -> &'static [TokenKind] {
        &[
            TokenKind::OpenTag,
            TokenKind::OpenTagEcho,
            TokenKind::InlineHtml,
        ]
    }

    fn process(&self, ctx: &mut FileContext, _index: usize) -> SniffControl {
        let last = ctx.token_count() - 1;
        let (missing, too_many) = {
            let source = ctx.source();
            let missing = !source.ends_with('\n');
            let stripped = source
                .strip_suffix("\r\n")
                .or_else(|| source.strip_suffix('\n'))
                .unwrap_or(source);
            (missing, !missing && stripped.ends_with('\n'))
        };

        if missing {
            if ctx.fixable_error(
                last,
                "Rsniff.Files.EndOfFileNewline.Missing",
                "File must end with a newline character",
            ) {
                ctx.fixer().insert_after(last, "\n");
            }
        } else if too_many {
            if ctx.fixable_error(
                last,
                "Rsniff.Files.EndOfFileNewline.TooMany",
                "File must end with exactly one newline character",
            ) {
                // Trailing line breaks always sit inside the final token.
                let trimmed = ctx
                    .token(last)
                    .map(|t| format!("{}\n", t.text.trim_end_matches(['\n', '\r'])));
                if let Some(trimmed) = trimmed {
                    ctx.fixer().replace(last, trimmed);
                }
            }
        }
        SniffControl::SkipTo(usize::MAX)
    }
}
