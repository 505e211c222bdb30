//! Tree node types
//!
//!     file    FileStructure, FileHeader, Tune and its header and body
//!     music   one music line and the items it is made of
//!     note    notes, pitches, rests and rhythms
//!     chord   chords and grace groups

pub mod chord;
pub mod file;
pub mod music;
pub mod note;

pub use chord::{Chord, ChordContent, GraceContent, GraceGroup};
pub use file::{
    BodyElement, Comment, FileHeader, FileStructure, HeaderLine, InfoLine, Tune, TuneBody,
    TuneHeader,
};
pub use music::{
    Annotation, BarLine, Decoration, InlineField, MultiMeasureRest, MusicCode, MusicItem,
    NthRepeat, SlurGroup, Spacer, Symbol,
};
pub use note::{Note, NoteHead, Pitch, Rest, Rhythm};
