//! # abc-parser
//!
//! A tolerant front end for ABC music notation.
//!
//! The pipeline is linear and every stage keeps going in the face of bad input:
//!
//!     source text
//!       -> scanning   (flat token list, lexical problems reported)
//!       -> parsing    (concrete syntax tree, syntax problems reported)
//!       -> visitors   (formatting, semantic classification, rhythm rewriting)
//!
//! All stages report into a single [`Collector`](abc::diagnostics::Collector) owned by the
//! caller, one per analysis pass. The tree keeps every token the scanner produced, so
//! formatting the tree gives back the source byte for byte.
//!
//! Most callers want [`AbcDocument`](abc::document::AbcDocument), which runs the whole
//! pipeline for one text and caches the results.

pub mod abc;

pub use abc::ast::{FileStructure, Position, Range};
pub use abc::diagnostics::{Collector, Diagnostic, DiagnosticSeverity, Problem};
pub use abc::document::{AbcDocument, AnalysisOptions};
pub use abc::token::{Token, TokenKind};
