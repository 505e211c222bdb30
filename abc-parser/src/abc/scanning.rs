//! Scanner
//!
//!     Turns source text into a flat, ordered token list. Concatenating every lexeme gives back
//!     the input exactly, and the list always ends with a zero-width `Eof` token.
//!
//! How lines are scanned
//!
//!     The text is walked one line at a time. A line whose first two characters are a letter
//!     (or `+`) and a colon is an information line: the scanner emits an `InfoKey` for the
//!     two characters and splits the rest into free text, whitespace and an optional trailing
//!     comment. Field values are prose (titles, composers, lyrics) and never go through the
//!     music lexer.
//!
//!     Every other line runs through a vanilla logos lexer over the music alphabet.
//!
//! Recovery
//!
//!     A character that matches nothing becomes an `Invalid` token with a lexical error, and
//!     scanning resumes one character later. Unterminated annotations (`"...`) and decoration
//!     symbols (`!...`) are still emitted with their usual kind, plus an error.

use logos::Logos;

use super::diagnostics::Collector;
use super::token::{Token, TokenKind};

/// Raw music-line tokens, as recognised by logos.
#[derive(Logos, Debug, PartialEq, Eq, Clone, Copy)]
enum RawToken {
    #[regex(r"[ \t]+")]
    Whitespace,
    #[regex(r"\r?\n")]
    Eol,
    #[regex(r"\\\r?\n")]
    AntislashEol,
    #[regex(r"\\[^\r\n]")]
    EscapedChar,
    #[regex(r"%[^\r\n]*", priority = 2)]
    Comment,
    #[regex(r"%%[^\r\n]*", priority = 4)]
    StylesheetDirective,

    #[token("|")]
    Barline,
    #[token("||")]
    BarDbl,
    #[token("|]")]
    BarRightBracket,
    #[token("[|")]
    LeftBracketBar,
    #[regex(r"\|\|?:+")]
    BarColon,
    #[regex(r":+\|+")]
    ColonBar,
    #[regex(r":+\|*:+")]
    ColonDbl,
    #[regex(r"\|[0-9]")]
    BarDigit,
    #[regex(r":+\|+[0-9]")]
    ColonBarDigit,
    #[regex(r"\[[0-9]+([,\-][0-9]+)*")]
    NthRepeat,

    #[token("^")]
    Sharp,
    #[token("^^")]
    SharpDbl,
    #[token("_")]
    Flat,
    #[token("__")]
    FlatDbl,
    #[token("=")]
    Natural,

    #[regex(r"[A-Ga-g]")]
    NoteLetter,
    #[regex(r"[xz]")]
    RestLetter,
    #[regex(r"[XZ]")]
    MultiMeasureRest,
    #[token("y")]
    SpacerLetter,
    #[regex(r"[H-WYh-w]")]
    Letter,

    #[regex(r"'+")]
    Apostrophe,
    #[regex(r",+")]
    Comma,
    #[regex(r"[0-9]+")]
    Number,
    #[regex(r"/+")]
    Slash,
    #[regex(r">+")]
    Greater,
    #[regex(r"<+")]
    Less,

    #[regex(r"\([0-9]+(:[0-9]*)*")]
    Tuplet,
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,

    #[token(":")]
    Colon,
    #[token("-")]
    Minus,
    #[token(".")]
    Dot,
    #[token("~")]
    Tilde,
    #[token("$")]
    Dollar,
    #[token("&")]
    Ampersand,
    #[token("+")]
    Plus,
    #[token("`")]
    Backtick,
    #[regex(r#""[^"\r\n]*"?"#)]
    Annotation,
    #[regex(r"![^!\s]*!?")]
    Symbol,
    #[regex(r"[#*;?@]")]
    ReservedChar,
}

impl From<RawToken> for TokenKind {
    fn from(raw: RawToken) -> Self {
        match raw {
            RawToken::Whitespace => TokenKind::Whitespace,
            RawToken::Eol => TokenKind::Eol,
            RawToken::AntislashEol => TokenKind::AntislashEol,
            RawToken::EscapedChar => TokenKind::EscapedChar,
            RawToken::Comment => TokenKind::Comment,
            RawToken::StylesheetDirective => TokenKind::StylesheetDirective,
            RawToken::Barline => TokenKind::Barline,
            RawToken::BarDbl => TokenKind::BarDbl,
            RawToken::BarRightBracket => TokenKind::BarRightBracket,
            RawToken::LeftBracketBar => TokenKind::LeftBracketBar,
            RawToken::BarColon => TokenKind::BarColon,
            RawToken::ColonBar => TokenKind::ColonBar,
            RawToken::ColonDbl => TokenKind::ColonDbl,
            RawToken::BarDigit => TokenKind::BarDigit,
            RawToken::ColonBarDigit => TokenKind::ColonBarDigit,
            RawToken::NthRepeat => TokenKind::NthRepeat,
            RawToken::Sharp => TokenKind::Sharp,
            RawToken::SharpDbl => TokenKind::SharpDbl,
            RawToken::Flat => TokenKind::Flat,
            RawToken::FlatDbl => TokenKind::FlatDbl,
            RawToken::Natural => TokenKind::Natural,
            RawToken::NoteLetter => TokenKind::NoteLetter,
            RawToken::RestLetter => TokenKind::RestLetter,
            RawToken::MultiMeasureRest => TokenKind::MultiMeasureRest,
            RawToken::SpacerLetter => TokenKind::SpacerLetter,
            RawToken::Letter => TokenKind::Letter,
            RawToken::Apostrophe => TokenKind::Apostrophe,
            RawToken::Comma => TokenKind::Comma,
            RawToken::Number => TokenKind::Number,
            RawToken::Slash => TokenKind::Slash,
            RawToken::Greater => TokenKind::Greater,
            RawToken::Less => TokenKind::Less,
            RawToken::Tuplet => TokenKind::Tuplet,
            RawToken::LeftParen => TokenKind::LeftParen,
            RawToken::RightParen => TokenKind::RightParen,
            RawToken::LeftBracket => TokenKind::LeftBracket,
            RawToken::RightBracket => TokenKind::RightBracket,
            RawToken::LeftBrace => TokenKind::LeftBrace,
            RawToken::RightBrace => TokenKind::RightBrace,
            RawToken::Colon => TokenKind::Colon,
            RawToken::Minus => TokenKind::Minus,
            RawToken::Dot => TokenKind::Dot,
            RawToken::Tilde => TokenKind::Tilde,
            RawToken::Dollar => TokenKind::Dollar,
            RawToken::Ampersand => TokenKind::Ampersand,
            RawToken::Plus => TokenKind::Plus,
            RawToken::Backtick => TokenKind::Backtick,
            RawToken::Annotation => TokenKind::Annotation,
            RawToken::Symbol => TokenKind::Symbol,
            RawToken::ReservedChar => TokenKind::ReservedChar,
        }
    }
}

/// Scans `source` into tokens, reporting lexical problems to `collector`.
pub fn scan(source: &str, collector: &mut Collector) -> Vec<Token> {
    let mut scanner = Scanner::new(source, collector);
    scanner.run();
    scanner.tokens
}

struct Scanner<'s, 'c> {
    source: &'s str,
    collector: &'c mut Collector,
    tokens: Vec<Token>,
    line: usize,
    line_start: usize,
}

impl<'s, 'c> Scanner<'s, 'c> {
    fn new(source: &'s str, collector: &'c mut Collector) -> Self {
        Self {
            source,
            collector,
            tokens: Vec::new(),
            line: 0,
            line_start: 0,
        }
    }

    fn run(&mut self) {
        let source = self.source;
        let mut offset = 0;
        for line in source.split_inclusive('\n') {
            let end = offset + line.len();
            if is_info_line(line) {
                self.scan_info_line(offset, end);
            } else {
                self.scan_music(offset, end);
            }
            offset = end;
        }
        self.push(TokenKind::Eof, source.len()..source.len());
        log::debug!("scanned {} tokens", self.tokens.len());
    }

    /// `K:G % comment` -> InfoKey, Whitespace?, FreeText/Whitespace runs, Comment?, Eol?
    fn scan_info_line(&mut self, start: usize, end: usize) {
        let text = &self.source[start..end];
        self.push(TokenKind::InfoKey, start..start + 2);

        let content_end = start + text.trim_end_matches(['\n', '\r']).len();
        let comment_start = find_comment(&self.source[start + 2..content_end])
            .map(|idx| start + 2 + idx)
            .unwrap_or(content_end);

        let mut cursor = start + 2;
        while cursor < comment_start {
            let rest = &self.source[cursor..comment_start];
            let blank = rest.starts_with([' ', '\t']);
            let run = rest
                .find(|c: char| (c == ' ' || c == '\t') != blank)
                .unwrap_or(rest.len());
            let kind = if blank {
                TokenKind::Whitespace
            } else {
                TokenKind::FreeText
            };
            self.push(kind, cursor..cursor + run);
            cursor += run;
        }

        if comment_start < content_end {
            let kind = if self.source[comment_start..].starts_with("%%") {
                TokenKind::StylesheetDirective
            } else {
                TokenKind::Comment
            };
            self.push(kind, comment_start..content_end);
        }
        if content_end < end {
            self.scan_music(content_end, end);
        }
    }

    fn scan_music(&mut self, start: usize, end: usize) {
        let mut offset = start;
        'restart: while offset < end {
            let mut lexer = RawToken::lexer(&self.source[offset..end]);
            while let Some(result) = lexer.next() {
                let span = lexer.span();
                let (token_start, token_end) = (offset + span.start, offset + span.end);
                match result {
                    Ok(raw) => {
                        self.push(raw.into(), token_start..token_end);
                        self.check_terminated(raw);
                    }
                    Err(()) => {
                        let width = self.source[token_start..]
                            .chars()
                            .next()
                            .map(char::len_utf8)
                            .unwrap_or(1);
                        self.push(TokenKind::Invalid, token_start..token_start + width);
                        if let Some(token) = self.tokens.last() {
                            let message = format!("unexpected character {:?}", token.lexeme);
                            self.collector.error(token, "unexpected-character", message);
                        }
                        if token_end != token_start + width {
                            offset = token_start + width;
                            continue 'restart;
                        }
                    }
                }
            }
            break;
        }
    }

    fn check_terminated(&mut self, raw: RawToken) {
        let (close, code, message) = match raw {
            RawToken::Annotation => (
                '"',
                "unterminated-annotation",
                "annotation is missing its closing '\"'",
            ),
            RawToken::Symbol => (
                '!',
                "unterminated-symbol",
                "decoration is missing its closing '!'",
            ),
            _ => return,
        };
        if let Some(token) = self.tokens.last() {
            if token.lexeme.len() < 2 || !token.lexeme.ends_with(close) {
                self.collector.error(token, code, message);
            }
        }
    }

    fn push(&mut self, kind: TokenKind, span: std::ops::Range<usize>) {
        let lexeme = &self.source[span.clone()];
        let column = self.source[self.line_start..span.start]
            .encode_utf16()
            .count();
        self.tokens
            .push(Token::new(kind, lexeme, self.line, column, span.clone()));
        if lexeme.ends_with('\n') {
            self.line += 1;
            self.line_start = span.end;
        }
    }
}

fn is_info_line(line: &str) -> bool {
    let mut chars = line.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(c), Some(':')) if c.is_ascii_alphabetic() || c == '+'
    )
}

/// Byte index of the first `%` not escaped with a backslash.
fn find_comment(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    bytes
        .iter()
        .enumerate()
        .find(|&(idx, &b)| b == b'%' && (idx == 0 || bytes[idx - 1] != b'\\'))
        .map(|(idx, _)| idx)
}
