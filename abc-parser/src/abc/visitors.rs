//! Tree visitors
//!
//!     Each visitor walks the tree depth-first with its own exhaustive `match` over node
//!     kinds. There is no catch-all arm anywhere, so a new node kind is a compile error in
//!     every visitor until it is handled.
//!
//!     formatter        tree -> text, byte for byte
//!     semantic_tokens  tree -> classified tokens for highlighting
//!     rhythm           tree + range -> rewritten rhythms for the notes in that range

pub mod formatter;
pub mod rhythm;
pub mod semantic_tokens;
