//! Chords and grace groups

use super::music::Annotation;
use super::note::{Note, Rhythm};
use crate::abc::ast::traits::AstNode;
use crate::abc::token::Token;

/// `[CEG]2-`: simultaneous notes sharing an optional rhythm and tie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chord {
    pub left_bracket: Token,
    pub contents: Vec<ChordContent>,
    pub right_bracket: Token,
    pub rhythm: Rhythm,
    pub tie: Option<Token>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChordContent {
    Note(Note),
    Annotation(Annotation),
    /// Whitespace and decorations written inside the brackets.
    Token(Token),
}

impl Chord {
    pub fn notes(&self) -> impl Iterator<Item = &Note> {
        self.contents.iter().filter_map(|content| match content {
            ChordContent::Note(note) => Some(note),
            _ => None,
        })
    }
}

impl AstNode for Chord {
    fn first_token(&self) -> Option<&Token> {
        Some(&self.left_bracket)
    }

    fn last_token(&self) -> Option<&Token> {
        self.tie
            .as_ref()
            .or(self.rhythm.tokens().last())
            .or(Some(&self.right_bracket))
    }
}

/// `{/gab}`: ornamental notes with no length of their own. The optional slash right after
/// the opening brace marks an acciaccatura.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraceGroup {
    pub left_brace: Token,
    pub acciaccatura: Option<Token>,
    pub contents: Vec<GraceContent>,
    pub right_brace: Token,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraceContent {
    Note(Note),
    /// Kept so nothing is lost, but flagged: grace groups take single notes.
    Chord(Chord),
    Token(Token),
}

impl GraceGroup {
    pub fn notes(&self) -> impl Iterator<Item = &Note> {
        self.contents.iter().filter_map(|content| match content {
            GraceContent::Note(note) => Some(note),
            _ => None,
        })
    }
}

impl AstNode for GraceGroup {
    fn first_token(&self) -> Option<&Token> {
        Some(&self.left_brace)
    }

    fn last_token(&self) -> Option<&Token> {
        Some(&self.right_brace)
    }
}
