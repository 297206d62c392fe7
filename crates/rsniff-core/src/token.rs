//! Token model - lexical categories and the token record

use std::fmt;

/// Lexical categories of PHP source.
///
/// The set is closed: sniffs and the annotator match on it exhaustively.
/// Operators without structural meaning share the `Operator` kind; bytes
/// the lexer cannot place become `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `<?php` opening tag
    OpenTag,
    /// `<?=` echo opening tag
    OpenTagEcho,
    /// `?>` closing tag
    CloseTag,
    /// Text outside PHP tags
    InlineHtml,
    /// Spaces, tabs and newlines
    Whitespace,
    /// `//` or `#` comment, up to end of line
    LineComment,
    /// `/* ... */` comment
    BlockComment,
    /// `/** ... */` doc comment
    DocComment,
    /// `$name`
    Variable,
    /// Unquoted name that is not a reserved word
    Identifier,
    /// Integer literal (decimal, hex, octal or binary)
    IntNumber,
    /// Floating point literal
    FloatNumber,
    /// `'...'` string, no interpolation
    SingleQuotedString,
    /// `"..."` string, interpolation permitted
    DoubleQuotedString,
    /// `<<<ID ... ID`, interpolation permitted
    Heredoc,
    /// `<<<'ID' ... ID`, no interpolation
    Nowdoc,

    // Keywords, one variant per reserved word.
    Abstract,
    Array,
    As,
    Break,
    Callable,
    Case,
    Catch,
    Class,
    Clone,
    Const,
    Continue,
    Declare,
    Default,
    Do,
    Echo,
    Else,
    Elseif,
    Enum,
    Extends,
    Final,
    Finally,
    Fn,
    For,
    Foreach,
    Function,
    Global,
    Goto,
    If,
    Implements,
    Include,
    IncludeOnce,
    Instanceof,
    Insteadof,
    Interface,
    List,
    Match,
    Namespace,
    New,
    Parent,
    Print,
    Private,
    Protected,
    Public,
    Readonly,
    Require,
    RequireOnce,
    Return,
    /// `self`
    SelfKeyword,
    Static,
    Switch,
    Throw,
    Trait,
    Try,
    Use,
    Var,
    While,
    Yield,
    True,
    False,
    Null,

    /// `(`
    OpenParen,
    /// `)`
    CloseParen,
    /// `{`
    OpenBrace,
    /// `}`
    CloseBrace,
    /// `[`
    OpenBracket,
    /// `]`
    CloseBracket,
    /// `;`
    Semicolon,
    /// `,`
    Comma,
    /// `::`
    DoubleColon,
    /// `->`
    Arrow,
    /// `?->`
    NullsafeArrow,
    /// `=>`
    DoubleArrow,
    /// `:`
    Colon,
    /// `?`
    QuestionMark,
    /// `\` namespace separator
    Backslash,
    /// Any other operator (`=`, `+`, `===`, `??`, ...)
    Operator,
    /// Byte sequence the lexer could not classify
    Unknown,
}

impl TokenKind {
    /// Whitespace and comments - the kinds sniffs skip when looking for
    /// meaningful code.
    pub fn is_empty(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace
                | TokenKind::LineComment
                | TokenKind::BlockComment
                | TokenKind::DocComment
        )
    }

    pub fn is_comment(self) -> bool {
        matches!(
            self,
            TokenKind::LineComment | TokenKind::BlockComment | TokenKind::DocComment
        )
    }

    pub fn is_string(self) -> bool {
        matches!(
            self,
            TokenKind::SingleQuotedString
                | TokenKind::DoubleQuotedString
                | TokenKind::Heredoc
                | TokenKind::Nowdoc
        )
    }

    /// Keywords that introduce a brace-delimited body. The annotator
    /// attaches the next `{` at the same depth as their scope opener.
    pub fn is_scope_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::Class
                | TokenKind::Interface
                | TokenKind::Trait
                | TokenKind::Enum
                | TokenKind::Function
                | TokenKind::If
                | TokenKind::Elseif
                | TokenKind::Else
                | TokenKind::For
                | TokenKind::Foreach
                | TokenKind::While
                | TokenKind::Do
                | TokenKind::Switch
                | TokenKind::Match
                | TokenKind::Try
                | TokenKind::Catch
                | TokenKind::Finally
                | TokenKind::Declare
        )
    }

    pub fn is_open_bracket(self) -> bool {
        matches!(
            self,
            TokenKind::OpenParen | TokenKind::OpenBrace | TokenKind::OpenBracket
        )
    }

    pub fn is_close_bracket(self) -> bool {
        matches!(
            self,
            TokenKind::CloseParen | TokenKind::CloseBrace | TokenKind::CloseBracket
        )
    }

    /// The opener a closing bracket pairs with.
    pub fn matching_opener(self) -> Option<TokenKind> {
        match self {
            TokenKind::CloseParen => Some(TokenKind::OpenParen),
            TokenKind::CloseBrace => Some(TokenKind::OpenBrace),
            TokenKind::CloseBracket => Some(TokenKind::OpenBracket),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The deny-list queries use to skip trivia when looking for meaningful
/// code. Mirrors [`TokenKind::is_empty`].
pub const EMPTY_KINDS: &[TokenKind] = &[
    TokenKind::Whitespace,
    TokenKind::LineComment,
    TokenKind::BlockComment,
    TokenKind::DocComment,
];

/// Map a lowercased word to its keyword kind.
pub fn keyword_kind(word: &str) -> Option<TokenKind> {
    let kind = match word {
        "abstract" => TokenKind::Abstract,
        "array" => TokenKind::Array,
        "as" => TokenKind::As,
        "break" => TokenKind::Break,
        "callable" => TokenKind::Callable,
        "case" => TokenKind::Case,
        "catch" => TokenKind::Catch,
        "class" => TokenKind::Class,
        "clone" => TokenKind::Clone,
        "const" => TokenKind::Const,
        "continue" => TokenKind::Continue,
        "declare" => TokenKind::Declare,
        "default" => TokenKind::Default,
        "do" => TokenKind::Do,
        "echo" => TokenKind::Echo,
        "else" => TokenKind::Else,
        "elseif" => TokenKind::Elseif,
        "enum" => TokenKind::Enum,
        "extends" => TokenKind::Extends,
        "final" => TokenKind::Final,
        "finally" => TokenKind::Finally,
        "fn" => TokenKind::Fn,
        "for" => TokenKind::For,
        "foreach" => TokenKind::Foreach,
        "function" => TokenKind::Function,
        "global" => TokenKind::Global,
        "goto" => TokenKind::Goto,
        "if" => TokenKind::If,
        "implements" => TokenKind::Implements,
        "include" => TokenKind::Include,
        "include_once" => TokenKind::IncludeOnce,
        "instanceof" => TokenKind::Instanceof,
        "insteadof" => TokenKind::Insteadof,
        "interface" => TokenKind::Interface,
        "list" => TokenKind::List,
        "match" => TokenKind::Match,
        "namespace" => TokenKind::Namespace,
        "new" => TokenKind::New,
        "parent" => TokenKind::Parent,
        "print" => TokenKind::Print,
        "private" => TokenKind::Private,
        "protected" => TokenKind::Protected,
        "public" => TokenKind::Public,
        "readonly" => TokenKind::Readonly,
        "require" => TokenKind::Require,
        "require_once" => TokenKind::RequireOnce,
        "return" => TokenKind::Return,
        "self" => TokenKind::SelfKeyword,
        "static" => TokenKind::Static,
        "switch" => TokenKind::Switch,
        "throw" => TokenKind::Throw,
        "trait" => TokenKind::Trait,
        "try" => TokenKind::Try,
        "use" => TokenKind::Use,
        "var" => TokenKind::Var,
        "while" => TokenKind::While,
        "yield" => TokenKind::Yield,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "null" => TokenKind::Null,
        _ => return None,
    };
    Some(kind)
}

/// One lexical unit. `text` is the exact source slice; concatenating the
/// texts of a file's tokens in order reproduces the file byte-for-byte.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// 1-based line of the first byte
    pub line: usize,
    /// 1-based byte column of the first byte
    pub column: usize,
    /// Offset of the first byte in the source
    pub byte_offset: usize,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        text: impl Into<String>,
        line: usize,
        column: usize,
        byte_offset: usize,
    ) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            column,
            byte_offset,
        }
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Offset one past the last byte of this token.
    pub fn end_offset(&self) -> usize {
        self.byte_offset + self.text.len()
    }
}
