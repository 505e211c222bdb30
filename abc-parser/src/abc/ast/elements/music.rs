//! Music lines and their items

use super::chord::{Chord, GraceGroup};
use super::note::Note;
use crate::abc::ast::traits::AstNode;
use crate::abc::token::Token;

/// One line of music, up to and including its line break. A backslash continuation keeps the
/// next line in the same `MusicCode`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MusicCode {
    pub contents: Vec<MusicItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MusicItem {
    /// Anything kept verbatim: whitespace, line breaks, tuplet markers, stray brackets.
    Token(Token),
    BarLine(BarLine),
    Annotation(Annotation),
    Decoration(Decoration),
    Note(Note),
    GraceGroup(GraceGroup),
    SlurGroup(SlurGroup),
    Chord(Chord),
    Symbol(Symbol),
    MultiMeasureRest(MultiMeasureRest),
    NthRepeat(NthRepeat),
    InlineField(InlineField),
    Spacer(Spacer),
}

impl AstNode for MusicCode {
    fn first_token(&self) -> Option<&Token> {
        self.contents.iter().find_map(AstNode::first_token)
    }

    fn last_token(&self) -> Option<&Token> {
        self.contents.iter().rev().find_map(AstNode::last_token)
    }
}

impl MusicItem {
    pub fn is_whitespace(&self) -> bool {
        matches!(self, MusicItem::Token(token) if token.kind.is_whitespace())
    }
}

impl AstNode for MusicItem {
    fn first_token(&self) -> Option<&Token> {
        match self {
            MusicItem::Token(token) => Some(token),
            MusicItem::BarLine(bar) => Some(&bar.barline),
            MusicItem::Annotation(annotation) => Some(&annotation.text),
            MusicItem::Decoration(decoration) => Some(&decoration.decoration),
            MusicItem::Note(note) => note.first_token(),
            MusicItem::GraceGroup(group) => group.first_token(),
            MusicItem::SlurGroup(group) => Some(&group.left_paren),
            MusicItem::Chord(chord) => chord.first_token(),
            MusicItem::Symbol(symbol) => Some(&symbol.symbol),
            MusicItem::MultiMeasureRest(rest) => Some(&rest.rest),
            MusicItem::NthRepeat(repeat) => Some(&repeat.repeat),
            MusicItem::InlineField(field) => Some(&field.left_bracket),
            MusicItem::Spacer(spacer) => Some(&spacer.spacer),
        }
    }

    fn last_token(&self) -> Option<&Token> {
        match self {
            MusicItem::Token(token) => Some(token),
            MusicItem::BarLine(bar) => Some(&bar.barline),
            MusicItem::Annotation(annotation) => Some(&annotation.text),
            MusicItem::Decoration(decoration) => Some(&decoration.decoration),
            MusicItem::Note(note) => note.last_token(),
            MusicItem::GraceGroup(group) => group.last_token(),
            MusicItem::SlurGroup(group) => group
                .right_paren
                .as_ref()
                .or_else(|| group.contents.iter().rev().find_map(|item| item.last_token()))
                .or(Some(&group.left_paren)),
            MusicItem::Chord(chord) => chord.last_token(),
            MusicItem::Symbol(symbol) => Some(&symbol.symbol),
            MusicItem::MultiMeasureRest(rest) => rest.length.as_ref().or(Some(&rest.rest)),
            MusicItem::NthRepeat(repeat) => Some(&repeat.repeat),
            MusicItem::InlineField(field) => field
                .right_bracket
                .as_ref()
                .or(field.text.last())
                .or(Some(&field.colon)),
            MusicItem::Spacer(spacer) => spacer.width.as_ref().or(Some(&spacer.spacer)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarLine {
    pub barline: Token,
}

/// `"Am"` chord symbol or free annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub text: Token,
}

/// Single-character decoration: `.`, `~` or one of the letter shorthands (`T` trill, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
    pub decoration: Token,
}

/// `!name!` decoration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub symbol: Token,
}

/// `Z4`: rest lasting the given number of whole bars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiMeasureRest {
    pub rest: Token,
    pub length: Option<Token>,
}

/// `[1`, `[1,3`, `[2-4`: variant ending marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NthRepeat {
    pub repeat: Token,
}

/// `[K:D]`: a header field changed mid-line. The closing bracket is missing only when the
/// source never closed it, which is reported as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineField {
    pub left_bracket: Token,
    /// Whitespace between `[` and the field letter.
    pub padding: Vec<Token>,
    pub field: Token,
    pub colon: Token,
    pub text: Vec<Token>,
    pub right_bracket: Option<Token>,
}

impl InlineField {
    pub fn field_code(&self) -> char {
        self.field.lexeme.chars().next().unwrap_or_default()
    }

    pub fn value_text(&self) -> String {
        let text: String = self.text.iter().map(|t| t.lexeme.as_str()).collect();
        text.trim().to_string()
    }
}

/// `y` or `y20`: invisible horizontal space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spacer {
    pub spacer: Token,
    pub width: Option<Token>,
}

/// `( ... )` phrase mark. Groups nest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlurGroup {
    pub left_paren: Token,
    pub contents: Vec<MusicItem>,
    pub right_paren: Option<Token>,
}
