//! Rhythm multiply/divide requests
//!
//!     `abc/multiplyRhythm` and `abc/divideRhythm` take a document and a selection and answer
//!     with one edit replacing the (possibly widened) selection.

use abc_parser::abc::visitors::rhythm::RhythmEdit;
use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::{Range, TextEdit, Url};

use super::diagnostics::to_lsp_range;

pub const MULTIPLY_RHYTHM: &str = "abc/multiplyRhythm";
pub const DIVIDE_RHYTHM: &str = "abc/divideRhythm";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RhythmTransformParams {
    pub uri: Url,
    pub selection: Range,
}

pub fn to_text_edit(edit: RhythmEdit) -> TextEdit {
    TextEdit {
        range: to_lsp_range(&edit.range),
        new_text: edit.new_text,
    }
}
