//! # abc
//!
//! Language tooling for ABC music notation.
//!
//! This crate re-exports the parser so downstream users need a single dependency. The
//! workspace also ships `abc-config` (layered settings), `abc-lsp` (the language server)
//! and `abc-cli` (the `abc` command).

pub use abc_parser::*;
