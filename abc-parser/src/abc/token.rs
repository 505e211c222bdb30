//! Tokens
//!
//!     A token is the smallest unit the scanner produces: a kind, the exact source text it
//!     covers, and where that text sits. Columns are counted in UTF-16 code units so they can
//!     be handed to editors unchanged. Byte spans are kept alongside for slicing.
//!
//!     Tokens are never edited in place. Passes that need a different kind or a combined
//!     lexeme build new values (see [`Token::retag`] and [`merge_tokens`]).

use std::fmt;
use std::ops::Range as ByteRange;

use serde::Serialize;

use super::ast::range::{Position, Range};

/// Every kind of token the scanner can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    // Line structure
    InfoKey,
    FreeText,
    Whitespace,
    Eol,
    Eof,
    AntislashEol,
    Comment,
    StylesheetDirective,

    // Bar lines and repeats
    Barline,
    BarDbl,
    BarRightBracket,
    LeftBracketBar,
    BarColon,
    ColonBar,
    ColonDbl,
    BarDigit,
    ColonBarDigit,
    NthRepeat,

    // Accidentals
    Sharp,
    SharpDbl,
    Flat,
    FlatDbl,
    Natural,

    // Letters
    NoteLetter,
    RestLetter,
    MultiMeasureRest,
    SpacerLetter,
    Letter,

    // Octave and rhythm
    Apostrophe,
    Comma,
    Number,
    Slash,
    Greater,
    Less,

    // Grouping
    Tuplet,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,

    // Everything else
    Colon,
    Minus,
    Dot,
    Tilde,
    Dollar,
    Ampersand,
    Plus,
    Backtick,
    Annotation,
    Symbol,
    EscapedChar,
    ReservedChar,
    Invalid,
}

impl TokenKind {
    /// All kinds, in declaration order.
    pub const ALL: &'static [TokenKind] = &[
        TokenKind::InfoKey,
        TokenKind::FreeText,
        TokenKind::Whitespace,
        TokenKind::Eol,
        TokenKind::Eof,
        TokenKind::AntislashEol,
        TokenKind::Comment,
        TokenKind::StylesheetDirective,
        TokenKind::Barline,
        TokenKind::BarDbl,
        TokenKind::BarRightBracket,
        TokenKind::LeftBracketBar,
        TokenKind::BarColon,
        TokenKind::ColonBar,
        TokenKind::ColonDbl,
        TokenKind::BarDigit,
        TokenKind::ColonBarDigit,
        TokenKind::NthRepeat,
        TokenKind::Sharp,
        TokenKind::SharpDbl,
        TokenKind::Flat,
        TokenKind::FlatDbl,
        TokenKind::Natural,
        TokenKind::NoteLetter,
        TokenKind::RestLetter,
        TokenKind::MultiMeasureRest,
        TokenKind::SpacerLetter,
        TokenKind::Letter,
        TokenKind::Apostrophe,
        TokenKind::Comma,
        TokenKind::Number,
        TokenKind::Slash,
        TokenKind::Greater,
        TokenKind::Less,
        TokenKind::Tuplet,
        TokenKind::LeftParen,
        TokenKind::RightParen,
        TokenKind::LeftBracket,
        TokenKind::RightBracket,
        TokenKind::LeftBrace,
        TokenKind::RightBrace,
        TokenKind::Colon,
        TokenKind::Minus,
        TokenKind::Dot,
        TokenKind::Tilde,
        TokenKind::Dollar,
        TokenKind::Ampersand,
        TokenKind::Plus,
        TokenKind::Backtick,
        TokenKind::Annotation,
        TokenKind::Symbol,
        TokenKind::EscapedChar,
        TokenKind::ReservedChar,
        TokenKind::Invalid,
    ];

    /// Spaces, tabs and line ends, including the synthetic end-of-file marker.
    pub fn is_whitespace(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::Eol | TokenKind::Eof | TokenKind::AntislashEol
        )
    }

    pub fn is_line_end(self) -> bool {
        matches!(self, TokenKind::Eol | TokenKind::Eof)
    }

    pub fn is_barline(self) -> bool {
        matches!(
            self,
            TokenKind::Barline
                | TokenKind::BarDbl
                | TokenKind::BarRightBracket
                | TokenKind::LeftBracketBar
                | TokenKind::BarColon
                | TokenKind::ColonBar
                | TokenKind::ColonDbl
                | TokenKind::BarDigit
                | TokenKind::ColonBarDigit
        )
    }

    pub fn is_accidental(self) -> bool {
        matches!(
            self,
            TokenKind::Sharp
                | TokenKind::SharpDbl
                | TokenKind::Flat
                | TokenKind::FlatDbl
                | TokenKind::Natural
        )
    }

    pub fn is_comment(self) -> bool {
        matches!(self, TokenKind::Comment | TokenKind::StylesheetDirective)
    }

    /// Kinds that can open a note: an accidental, a pitch letter or a rest letter.
    pub fn starts_note(self) -> bool {
        self.is_accidental() || matches!(self, TokenKind::NoteLetter | TokenKind::RestLetter)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A scanned token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    /// Zero-based line.
    pub line: usize,
    /// Zero-based column, in UTF-16 code units.
    pub column: usize,
    /// Byte offsets into the source text.
    pub span: ByteRange<usize>,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        lexeme: impl Into<String>,
        line: usize,
        column: usize,
        span: ByteRange<usize>,
    ) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            line,
            column,
            span,
        }
    }

    /// Same text and location, different kind.
    pub fn retag(&self, kind: TokenKind) -> Token {
        Token {
            kind,
            ..self.clone()
        }
    }

    /// Length of the lexeme in UTF-16 code units.
    pub fn len_utf16(&self) -> usize {
        self.lexeme.encode_utf16().count()
    }

    pub fn start(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// Position just past the lexeme. Lexemes ending in a line break end at column 0 of
    /// the following line.
    pub fn end(&self) -> Position {
        match self.lexeme.rfind('\n') {
            Some(idx) => {
                let lines = self.lexeme.matches('\n').count();
                let tail = &self.lexeme[idx + 1..];
                Position::new(self.line + lines, tail.encode_utf16().count())
            }
            None => Position::new(self.line, self.column + self.len_utf16()),
        }
    }

    pub fn range(&self) -> Range {
        Range::new(self.span.clone(), self.start(), self.end())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({:?}) at {}:{}",
            self.kind, self.lexeme, self.line, self.column
        )
    }
}

/// Combines adjacent tokens into one.
///
/// The result takes the first token's kind and position, the concatenated lexemes and a span
/// covering all inputs. An empty slice has nothing to merge and yields `None`.
pub fn merge_tokens(tokens: &[Token]) -> Option<Token> {
    let (first, rest) = tokens.split_first()?;
    let mut merged = first.clone();
    for token in rest {
        merged.lexeme.push_str(&token.lexeme);
        merged.span.end = token.span.end;
    }
    Some(merged)
}
