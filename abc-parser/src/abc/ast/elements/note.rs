//! Notes, rests and rhythms
//!
//!     A note is a head (a pitch or a rest letter), an optional rhythm and an optional tie:
//!
//!         ^c'3/4-     alteration `^`, letter `c`, octave `'`, rhythm `3/4`, tie `-`
//!         z2          rest `z`, rhythm `2`
//!         A>          letter `A`, broken-rhythm marker `>`
//!
//!     The rhythm is whatever numerator, slash run, denominator and broken marker follow the
//!     head with nothing in between. All four parts are optional; a note with none of them has
//!     the default length.

use crate::abc::ast::traits::AstNode;
use crate::abc::token::Token;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pitch {
    pub alteration: Option<Token>,
    pub letter: Token,
    pub octave: Option<Token>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rest {
    pub rest: Token,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteHead {
    Pitch(Pitch),
    Rest(Rest),
}

impl NoteHead {
    pub fn first_token(&self) -> &Token {
        match self {
            NoteHead::Pitch(pitch) => pitch.alteration.as_ref().unwrap_or(&pitch.letter),
            NoteHead::Rest(rest) => &rest.rest,
        }
    }

    pub fn last_token(&self) -> &Token {
        match self {
            NoteHead::Pitch(pitch) => pitch.octave.as_ref().unwrap_or(&pitch.letter),
            NoteHead::Rest(rest) => &rest.rest,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Rhythm {
    pub numerator: Option<Token>,
    pub separator: Option<Token>,
    pub denominator: Option<Token>,
    pub broken: Option<Token>,
}

impl Rhythm {
    pub fn is_empty(&self) -> bool {
        self.numerator.is_none()
            && self.separator.is_none()
            && self.denominator.is_none()
            && self.broken.is_none()
    }

    /// Present parts in source order.
    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        [
            self.numerator.as_ref(),
            self.separator.as_ref(),
            self.denominator.as_ref(),
            self.broken.as_ref(),
        ]
        .into_iter()
        .flatten()
    }

    /// Numerator, slashes and denominator: the part that encodes a length.
    pub fn length_tokens(&self) -> impl Iterator<Item = &Token> {
        [
            self.numerator.as_ref(),
            self.separator.as_ref(),
            self.denominator.as_ref(),
        ]
        .into_iter()
        .flatten()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub head: NoteHead,
    pub rhythm: Rhythm,
    pub tie: Option<Token>,
}

impl AstNode for Note {
    fn first_token(&self) -> Option<&Token> {
        Some(self.head.first_token())
    }

    fn last_token(&self) -> Option<&Token> {
        self.tie
            .as_ref()
            .or(self.rhythm.tokens().last())
            .or(Some(self.head.last_token()))
    }
}
