//! rsniff-sniffs: Bundled sniff implementations
//!
//! Available sniffs:
//! - space_after_comma: Commas must be followed by a single space (Rsniff.WhiteSpace.SpaceAfterComma)
//! - keyword_spacing: Control keywords use the form `keyword (...) {` (Rsniff.WhiteSpace.KeywordSpacing)
//! - string_trailing_whitespace: No whitespace at end of line inside strings (Rsniff.Strings.TrailingWhitespaceInString)
//! - eof_newline: Files end with exactly one newline (Rsniff.Files.EndOfFileNewline)
//! - line_length: Lines stay under the configured length (Rsniff.Files.LineLength)
//! - orphaned_parent: No `parent` in classes without an extends clause (Rsniff.Classes.OrphanedParent)
//! - forbidden_functions: Calls to banned functions (Rsniff.Functions.ForbiddenFunctions)

pub mod eof_newline;
pub mod forbidden_functions;
pub mod keyword_spacing;
pub mod line_length;
pub mod orphaned_parent;
pub mod space_after_comma;
pub mod string_trailing_whitespace;

pub use eof_newline::EofNewlineSniff;
pub use forbidden_functions::ForbiddenFunctionsSniff;
pub use keyword_spacing::KeywordSpacingSniff;
pub use line_length::LineLengthSniff;
pub use orphaned_parent::OrphanedParentSniff;
pub use space_after_comma::SpaceAfterCommaSniff;
pub use string_trailing_whitespace::StringTrailingWhitespaceSniff;

use rsniff_core::SniffRegistry;

/// Build a registry with every bundled sniff.
pub fn builtin_registry() -> SniffRegistry {
    let mut registry = SniffRegistry::new();
    registry.register(Box::new(SpaceAfterCommaSniff));
    registry.register(Box::new(KeywordSpacingSniff));
    registry.register(Box::new(StringTrailingWhitespaceSniff));
    registry.register(Box::new(EofNewlineSniff));
    registry.register(Box::new(LineLengthSniff::default()));
    registry.register(Box::new(OrphanedParentSniff));
    registry.register(Box::new(ForbiddenFunctionsSniff::default()));
    registry
}
