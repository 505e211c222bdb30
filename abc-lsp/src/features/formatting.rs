use abc_parser::abc::ast::{Position as AstPosition, SourceLocation};
use tower_lsp::lsp_types::{Range, TextEdit};

use super::diagnostics::to_lsp_position;

/// A single edit replacing all of `original` with `formatted`.
pub fn whole_document_edit(original: &str, formatted: String) -> TextEdit {
    let end = SourceLocation::new(original).byte_to_position(original.len());
    TextEdit {
        range: Range {
            start: to_lsp_position(AstPosition::new(0, 0)),
            end: to_lsp_position(end),
        },
        new_text: formatted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_lsp::lsp_types::Position;

    #[test]
    fn edit_spans_the_whole_text() {
        let edit = whole_document_edit("X:1\nK:C\nABC|\n", "X:1\nK:C\nABC|\n".into());
        assert_eq!(edit.range.start, Position::new(0, 0));
        assert_eq!(edit.range.end, Position::new(3, 0));
    }

    #[test]
    fn end_without_trailing_newline() {
        let edit = whole_document_edit("X:1\nK:C\nAB", "X:1\nK:C\nAB".into());
        assert_eq!(edit.range.end, Position::new(2, 2));
    }

    #[test]
    fn empty_document() {
        let edit = whole_document_edit("", String::new());
        assert_eq!(edit.range.end, Position::new(0, 0));
    }
}
