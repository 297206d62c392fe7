//! PHP lexer - turns source text into a lossless token sequence
//!
//! The lexer never fails. Unterminated constructs produce a best-effort
//! token covering the remaining text plus a recorded [`LexError`], so one
//! malformed file cannot halt a multi-file run. Whitespace, comments and
//! inline HTML are first-class tokens; concatenating all token texts in
//! order reproduces the input byte-for-byte.

use thiserror::Error;

use crate::token::{keyword_kind, Token, TokenKind};

/// Reason a region of source could not be lexed cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LexErrorKind {
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated block comment")]
    UnterminatedComment,
    #[error("unterminated heredoc/nowdoc")]
    UnterminatedHeredoc,
}

/// A recoverable lexing problem, positioned at the start of the construct
/// that failed to terminate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub line: usize,
    pub column: usize,
    pub byte_offset: usize,
}

/// Result of tokenizing one file.
#[derive(Debug, Clone)]
pub struct LexOutput {
    pub tokens: Vec<Token>,
    pub errors: Vec<LexError>,
}

impl LexOutput {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Tokenize PHP source. Infallible; see [`LexOutput::errors`] for any
/// constructs that had to be recovered.
pub fn tokenize(source: &str) -> LexOutput {
    Lexer::new(source).run()
}

// Multi-byte operators, longest first. Structural ones get their own kind;
// the rest collapse to `Operator`.
const OPERATORS_3: &[(&str, TokenKind)] = &[
    ("===", TokenKind::Operator),
    ("!==", TokenKind::Operator),
    ("<=>", TokenKind::Operator),
    ("**=", TokenKind::Operator),
    ("...", TokenKind::Operator),
    ("?->", TokenKind::NullsafeArrow),
    ("<<=", TokenKind::Operator),
    (">>=", TokenKind::Operator),
    ("??=", TokenKind::Operator),
];

const OPERATORS_2: &[(&str, TokenKind)] = &[
    ("==", TokenKind::Operator),
    ("!=", TokenKind::Operator),
    ("<>", TokenKind::Operator),
    ("<=", TokenKind::Operator),
    (">=", TokenKind::Operator),
    ("&&", TokenKind::Operator),
    ("||", TokenKind::Operator),
    ("??", TokenKind::Operator),
    ("++", TokenKind::Operator),
    ("--", TokenKind::Operator),
    ("+=", TokenKind::Operator),
    ("-=", TokenKind::Operator),
    ("*=", TokenKind::Operator),
    ("/=", TokenKind::Operator),
    (".=", TokenKind::Operator),
    ("%=", TokenKind::Operator),
    ("&=", TokenKind::Operator),
    ("|=", TokenKind::Operator),
    ("^=", TokenKind::Operator),
    ("<<", TokenKind::Operator),
    (">>", TokenKind::Operator),
    ("**", TokenKind::Operator),
    ("=>", TokenKind::DoubleArrow),
    ("->", TokenKind::Arrow),
    ("::", TokenKind::DoubleColon),
];

struct Lexer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    column: usize,
    in_php: bool,
    tokens: Vec<Token>,
    errors: Vec<LexError>,
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

fn is_ident_char(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
            in_php: false,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn run(mut self) -> LexOutput {
        while self.pos < self.bytes.len() {
            if self.in_php {
                self.next_php_token();
            } else {
                self.next_html_token();
            }
        }
        LexOutput {
            tokens: self.tokens,
            errors: self.errors,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, n: usize) -> Option<u8> {
        self.bytes.get(self.pos + n).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let b = self.bytes.get(self.pos).copied()?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(b)
    }

    fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    /// Advance the cursor to an absolute byte offset, keeping line and
    /// column counts accurate.
    fn advance_to(&mut self, offset: usize) {
        while self.pos < offset {
            self.advance();
        }
    }

    fn starts_with(&self, s: &str) -> bool {
        self.bytes[self.pos..].starts_with(s.as_bytes())
    }

    fn starts_with_open_tag(&self, at: usize) -> bool {
        let rest = &self.bytes[at..];
        rest.len() >= 5 && rest[..5].eq_ignore_ascii_case(b"<?php")
    }

    fn push(&mut self, kind: TokenKind, start: usize, line: usize, column: usize) {
        self.tokens
            .push(Token::new(kind, &self.input[start..self.pos], line, column, start));
    }

    fn record_error(&mut self, kind: LexErrorKind, line: usize, column: usize, offset: usize) {
        self.errors.push(LexError {
            kind,
            line,
            column,
            byte_offset: offset,
        });
    }

    /// Outside PHP tags: emit inline HTML up to the next open tag, or the
    /// open tag itself when the cursor sits on one.
    fn next_html_token(&mut self) {
        let (start, line, column) = (self.pos, self.line, self.column);

        if self.starts_with("<?=") {
            self.advance_by(3);
            self.push(TokenKind::OpenTagEcho, start, line, column);
            self.in_php = true;
            return;
        }
        if self.starts_with_open_tag(self.pos) {
            self.advance_by(5);
            self.push(TokenKind::OpenTag, start, line, column);
            self.in_php = true;
            return;
        }

        // Scan forward to the next candidate tag.
        let mut end = self.bytes.len();
        let mut off = self.pos + 1;
        while off + 1 < self.bytes.len() {
            if self.bytes[off] == b'<' && self.bytes[off + 1] == b'?' {
                let rest = &self.bytes[off..];
                if rest.len() >= 3 && rest[2] == b'=' {
                    end = off;
                    break;
                }
                if self.starts_with_open_tag(off) {
                    end = off;
                    break;
                }
            }
            off += 1;
        }
        self.advance_to(end);
        self.push(TokenKind::InlineHtml, start, line, column);
    }

    fn next_php_token(&mut self) {
        let (start, line, column) = (self.pos, self.line, self.column);
        let b = match self.peek() {
            Some(b) => b,
            None => return,
        };

        match b {
            b'?' if self.starts_with("?>") => {
                self.advance_by(2);
                self.push(TokenKind::CloseTag, start, line, column);
                self.in_php = false;
            }
            b' ' | b'\t' | b'\r' | b'\n' => {
                while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
                    self.advance();
                }
                self.push(TokenKind::Whitespace, start, line, column);
            }
            b'/' if self.peek_at(1) == Some(b'/') => self.read_line_comment(start, line, column),
            b'#' => self.read_line_comment(start, line, column),
            b'/' if self.peek_at(1) == Some(b'*') => self.read_block_comment(start, line, column),
            b'\'' => self.read_quoted_string(b'\'', TokenKind::SingleQuotedString, start, line, column),
            b'"' => self.read_quoted_string(b'"', TokenKind::DoubleQuotedString, start, line, column),
            b'<' if self.starts_with("<<<") => self.read_heredoc(start, line, column),
            b'$' => {
                self.advance();
                if self.peek().is_some_and(is_ident_start) {
                    while self.peek().is_some_and(is_ident_char) {
                        self.advance();
                    }
                    self.push(TokenKind::Variable, start, line, column);
                } else {
                    self.push(TokenKind::Operator, start, line, column);
                }
            }
            b'0'..=b'9' => self.read_number(start, line, column),
            b'.' if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.read_number(start, line, column)
            }
            _ if is_ident_start(b) => {
                while self.peek().is_some_and(is_ident_char) {
                    self.advance();
                }
                let word = self.input[start..self.pos].to_ascii_lowercase();
                let kind = keyword_kind(&word).unwrap_or(TokenKind::Identifier);
                self.push(kind, start, line, column);
            }
            _ => self.read_operator(start, line, column),
        }
    }

    /// `//` and `#` comments run to the end of the line, but a close tag
    /// inside them still ends PHP mode, so stop short of `?>`.
    fn read_line_comment(&mut self, start: usize, line: usize, column: usize) {
        while let Some(b) = self.peek() {
            if b == b'\n' || self.starts_with("?>") {
                break;
            }
            self.advance();
        }
        self.push(TokenKind::LineComment, start, line, column);
    }

    fn read_block_comment(&mut self, start: usize, line: usize, column: usize) {
        self.advance_by(2);
        let mut terminated = false;
        while self.peek().is_some() {
            if self.starts_with("*/") {
                self.advance_by(2);
                terminated = true;
                break;
            }
            self.advance();
        }
        if !terminated {
            self.record_error(LexErrorKind::UnterminatedComment, line, column, start);
        }
        let text = &self.input[start..self.pos];
        let kind = if text.starts_with("/**") && text.len() > 4 {
            TokenKind::DocComment
        } else {
            TokenKind::BlockComment
        };
        self.push(kind, start, line, column);
    }

    fn read_quoted_string(
        &mut self,
        quote: u8,
        kind: TokenKind,
        start: usize,
        line: usize,
        column: usize,
    ) {
        self.advance();
        let mut terminated = false;
        while let Some(b) = self.peek() {
            if b == b'\\' {
                self.advance();
                self.advance();
                continue;
            }
            self.advance();
            if b == quote {
                terminated = true;
                break;
            }
        }
        if !terminated {
            self.record_error(LexErrorKind::UnterminatedString, line, column, start);
        }
        self.push(kind, start, line, column);
    }

    /// `<<<LABEL ... LABEL` spans opening marker to closing marker
    /// inclusive, across lines. A quoted label (`<<<'X'`) makes it a
    /// nowdoc; otherwise interpolation is permitted and it is a heredoc.
    fn read_heredoc(&mut self, start: usize, line: usize, column: usize) {
        let mut off = self.pos + 3;
        while matches!(self.bytes.get(off), Some(b' ' | b'\t')) {
            off += 1;
        }
        let quote = match self.bytes.get(off) {
            Some(b @ (b'\'' | b'"')) => {
                off += 1;
                Some(*b)
            }
            _ => None,
        };
        let label_start = off;
        while self.bytes.get(off).copied().is_some_and(is_ident_char) {
            off += 1;
        }
        if off == label_start {
            // Not a heredoc header after all; emit the `<<<` bytes as an
            // operator and let normal lexing resume.
            self.advance_by(3);
            self.push(TokenKind::Operator, start, line, column);
            return;
        }
        let label = self.bytes[label_start..off].to_vec();
        let kind = if quote == Some(b'\'') {
            TokenKind::Nowdoc
        } else {
            TokenKind::Heredoc
        };
        if let Some(q) = quote {
            if self.bytes.get(off) == Some(&q) {
                off += 1;
            }
        }

        // Header must end the line; then scan line by line for a closer of
        // the form `[ \t]* LABEL` followed by a non-identifier byte.
        let body_start = match self.find_newline(off) {
            Some(nl) => nl + 1,
            None => {
                self.advance_to(self.bytes.len());
                self.record_error(LexErrorKind::UnterminatedHeredoc, line, column, start);
                self.push(kind, start, line, column);
                return;
            }
        };

        let mut line_start = body_start;
        loop {
            let mut p = line_start;
            while matches!(self.bytes.get(p), Some(b' ' | b'\t')) {
                p += 1;
            }
            if self.bytes[p..].starts_with(&label)
                && !self
                    .bytes
                    .get(p + label.len())
                    .copied()
                    .is_some_and(is_ident_char)
            {
                self.advance_to(p + label.len());
                self.push(kind, start, line, column);
                return;
            }
            match self.find_newline(line_start) {
                Some(nl) => line_start = nl + 1,
                None => {
                    self.advance_to(self.bytes.len());
                    self.record_error(LexErrorKind::UnterminatedHeredoc, line, column, start);
                    self.push(kind, start, line, column);
                    return;
                }
            }
        }
    }

    fn find_newline(&self, from: usize) -> Option<usize> {
        self.bytes[from..].iter().position(|&b| b == b'\n').map(|i| from + i)
    }

    fn read_number(&mut self, start: usize, line: usize, column: usize) {
        if self.peek() == Some(b'0')
            && matches!(self.peek_at(1), Some(b'x' | b'X' | b'b' | b'B' | b'o' | b'O'))
        {
            let radix = self.peek_at(1).unwrap_or(b'x').to_ascii_lowercase();
            self.advance_by(2);
            let digit_ok: fn(u8) -> bool = match radix {
                b'x' => |b| b.is_ascii_hexdigit() || b == b'_',
                b'b' => |b| matches!(b, b'0' | b'1' | b'_'),
                _ => |b| matches!(b, b'0'..=b'7' | b'_'),
            };
            while self.peek().is_some_and(digit_ok) {
                self.advance();
            }
            self.push(TokenKind::IntNumber, start, line, column);
            return;
        }

        let mut is_float = false;
        while matches!(self.peek(), Some(b'0'..=b'9' | b'_')) {
            self.advance();
        }
        if self.peek() == Some(b'.') && self.peek_at(1).is_some_and(|b| b.is_ascii_digit()) {
            is_float = true;
            self.advance();
            while matches!(self.peek(), Some(b'0'..=b'9' | b'_')) {
                self.advance();
            }
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let mut ahead = 1;
            if matches!(self.peek_at(1), Some(b'+' | b'-')) {
                ahead = 2;
            }
            if self.peek_at(ahead).is_some_and(|b| b.is_ascii_digit()) {
                is_float = true;
                self.advance_by(ahead + 1);
                while matches!(self.peek(), Some(b'0'..=b'9' | b'_')) {
                    self.advance();
                }
            }
        }
        let kind = if is_float {
            TokenKind::FloatNumber
        } else {
            TokenKind::IntNumber
        };
        self.push(kind, start, line, column);
    }

    fn read_operator(&mut self, start: usize, line: usize, column: usize) {
        for (text, kind) in OPERATORS_3 {
            if self.starts_with(text) {
                self.advance_by(3);
                self.push(*kind, start, line, column);
                return;
            }
        }
        for (text, kind) in OPERATORS_2 {
            if self.starts_with(text) {
                self.advance_by(2);
                self.push(*kind, start, line, column);
                return;
            }
        }
        let b = self.peek().unwrap_or(0);
        self.advance();
        let kind = match b {
            b'(' => TokenKind::OpenParen,
            b')' => TokenKind::CloseParen,
            b'{' => TokenKind::OpenBrace,
            b'}' => TokenKind::CloseBrace,
            b'[' => TokenKind::OpenBracket,
            b']' => TokenKind::CloseBracket,
            b';' => TokenKind::Semicolon,
            b',' => TokenKind::Comma,
            b':' => TokenKind::Colon,
            b'?' => TokenKind::QuestionMark,
            b'\\' => TokenKind::Backslash,
            b'=' | b'+' | b'-' | b'*' | b'/' | b'%' | b'.' | b'!' | b'<' | b'>' | b'&' | b'|'
            | b'^' | b'~' | b'@' => TokenKind::Operator,
            _ => TokenKind::Unknown,
        };
        self.push(kind, start, line, column);
    }
}
