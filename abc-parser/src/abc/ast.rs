//! Concrete syntax tree for ABC
//!
//!     The tree mirrors the layered structure of an ABC file:
//!
//!         FileStructure
//!           ├── FileHeader          text before the first tune
//!           └── Tune*
//!                 ├── TuneHeader    X: ... K: info lines and comments
//!                 ├── TuneBody      music lines, body info lines, comments
//!                 └── trailing      blank lines and free text up to the next tune
//!
//!     Music lines hold [`MusicItem`](elements::MusicItem)s: notes, chords, bar lines, grace
//!     groups, slur groups and so on. Every token the scanner produced ends up in exactly one
//!     node, whitespace and line breaks included. Nothing is synthesised, so walking the tree
//!     in order and printing lexemes gives back the source.
//!
//!     Nodes are plain owned data. Visitors borrow the tree and dispatch with exhaustive
//!     `match`es, so adding a node kind fails to compile until every visitor handles it.

pub mod elements;
pub mod range;
pub mod traits;

pub use elements::{
    Annotation, BarLine, BodyElement, Chord, ChordContent, Comment, Decoration, FileHeader,
    FileStructure, GraceContent, GraceGroup, HeaderLine, InfoLine, InlineField, MultiMeasureRest,
    MusicCode, MusicItem, Note, NoteHead, NthRepeat, Pitch, Rest, Rhythm, SlurGroup, Spacer,
    Symbol, Tune, TuneBody, TuneHeader,
};
pub use range::{Position, Range, SourceLocation};
pub use traits::AstNode;
