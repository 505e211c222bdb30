//! Main module for the ABC front end

pub mod ast;
pub mod beams;
pub mod diagnostics;
pub mod document;
pub mod parsing;
pub mod scanning;
pub mod testing;
pub mod token;
pub mod visitors;
