//! File, tune, header and body nodes
//!
//!     A tune starts at an `X:` line. Its header runs through the first `K:` line, and its
//!     body runs until a blank line, the next `X:` or the end of the text. Anything between
//!     the body and the next tune (blank lines, free prose) is kept on the tune as trailing
//!     tokens.
//!
//!     Text with no `X:` line at all is parsed as tune fragments: tunes with possibly empty
//!     headers, separated by blank lines.

use super::music::MusicCode;
use crate::abc::ast::traits::AstNode;
use crate::abc::token::Token;

/// Root of the tree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileStructure {
    pub file_header: Option<FileHeader>,
    pub tunes: Vec<Tune>,
}

/// Everything before the first `X:` line, kept token for token.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileHeader {
    pub tokens: Vec<Token>,
}

impl AstNode for FileHeader {
    fn first_token(&self) -> Option<&Token> {
        self.tokens.first()
    }

    fn last_token(&self) -> Option<&Token> {
        self.tokens.last()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tune {
    pub header: TuneHeader,
    pub body: Option<TuneBody>,
    pub trailing: Vec<Token>,
}

impl Tune {
    /// Reference number from the `X:` field, if there is one and it parses.
    pub fn reference_number(&self) -> Option<u32> {
        self.header.field('X')?.value_text().parse().ok()
    }

    pub fn title(&self) -> Option<String> {
        self.header.field('T').map(InfoLine::value_text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TuneHeader {
    pub lines: Vec<HeaderLine>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderLine {
    Info(InfoLine),
    Comment(Comment),
}

impl TuneHeader {
    pub fn info_lines(&self) -> impl Iterator<Item = &InfoLine> {
        self.lines.iter().filter_map(|line| match line {
            HeaderLine::Info(info) => Some(info),
            HeaderLine::Comment(_) => None,
        })
    }

    /// First info line with the given field code.
    pub fn field(&self, code: char) -> Option<&InfoLine> {
        self.info_lines().find(|info| info.field_code() == code)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// `K:G major % comment`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoLine {
    pub key: Token,
    pub value: Vec<Token>,
    pub comment: Option<Token>,
    pub eol: Option<Token>,
}

impl InfoLine {
    pub fn field_code(&self) -> char {
        self.key.lexeme.chars().next().unwrap_or_default()
    }

    /// The value with surrounding whitespace removed.
    pub fn value_text(&self) -> String {
        let text: String = self.value.iter().map(|t| t.lexeme.as_str()).collect();
        text.trim().to_string()
    }
}

impl AstNode for InfoLine {
    fn first_token(&self) -> Option<&Token> {
        Some(&self.key)
    }

    fn last_token(&self) -> Option<&Token> {
        self.eol
            .as_ref()
            .or(self.comment.as_ref())
            .or(self.value.last())
            .or(Some(&self.key))
    }
}

/// A `%` comment or `%%` directive that owns its line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub token: Token,
    pub eol: Option<Token>,
}

impl AstNode for Comment {
    fn first_token(&self) -> Option<&Token> {
        Some(&self.token)
    }

    fn last_token(&self) -> Option<&Token> {
        self.eol.as_ref().or(Some(&self.token))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TuneBody {
    pub sequence: Vec<BodyElement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyElement {
    MusicCode(MusicCode),
    InfoLine(InfoLine),
    Comment(Comment),
}

impl AstNode for BodyElement {
    fn first_token(&self) -> Option<&Token> {
        match self {
            BodyElement::MusicCode(code) => code.first_token(),
            BodyElement::InfoLine(info) => info.first_token(),
            BodyElement::Comment(comment) => comment.first_token(),
        }
    }

    fn last_token(&self) -> Option<&Token> {
        match self {
            BodyElement::MusicCode(code) => code.last_token(),
            BodyElement::InfoLine(info) => info.last_token(),
            BodyElement::Comment(comment) => comment.last_token(),
        }
    }
}

impl AstNode for TuneBody {
    fn first_token(&self) -> Option<&Token> {
        self.sequence.iter().find_map(AstNode::first_token)
    }

    fn last_token(&self) -> Option<&Token> {
        self.sequence.iter().rev().find_map(AstNode::last_token)
    }
}

impl TuneBody {
    pub fn music_lines(&self) -> impl Iterator<Item = &MusicCode> {
        self.sequence.iter().filter_map(|element| match element {
            BodyElement::MusicCode(code) => Some(code),
            _ => None,
        })
    }
}
