//! Whole-file behaviour on realistic inputs

use abc_parser::abc::beams::beams;
use abc_parser::abc::diagnostics::DiagnosticSeverity;
use abc_parser::abc::testing::{SAMPLE_TUNE, TWO_TUNES};
use abc_parser::abc::visitors::semantic_tokens::{category, HighlightCategory};
use abc_parser::{AbcDocument, Position, TokenKind};

#[test]
fn two_tunes_and_a_paragraph() {
    let document = AbcDocument::analyze(TWO_TUNES);
    assert!(document.diagnostics().is_empty(), "{:?}", document.diagnostics());

    let tree = document.tree();
    assert!(tree.file_header.is_some());
    assert_eq!(tree.tunes.len(), 2);
    assert_eq!(tree.tunes[0].title().as_deref(), Some("First"));
    assert_eq!(tree.tunes[1].title().as_deref(), Some("Second"));

    let between: String = tree.tunes[0]
        .trailing
        .iter()
        .map(|t| t.lexeme.as_str())
        .collect();
    assert!(between.contains("Between the tunes."));
    assert_eq!(document.formatted().as_deref(), Some(TWO_TUNES));
}

#[test]
fn sample_tune_beams() {
    let document = AbcDocument::analyze(SAMPLE_TUNE);
    let body = document.tree().tunes[0].body.as_ref().unwrap();
    let line = body.music_lines().next().unwrap();
    let found = beams(&line.contents);
    // FA, AAA, BAFA, BA, Bcde, fa~a2, gfed, B2AF, ADD2, B2AF, AD!fermata!D2
    assert_eq!(found.len(), 11);
}

#[test]
fn comments_and_directives_highlight_as_comments() {
    let document = AbcDocument::analyze(TWO_TUNES);
    let comments: Vec<_> = document
        .classified_tokens()
        .iter()
        .filter(|t| category(t.kind) == HighlightCategory::Comment)
        .map(|t| t.lexeme.as_str())
        .collect();
    assert_eq!(comments, ["%abc-2.1", "% a small book"]);
}

#[test]
fn problems_are_positioned_on_the_offending_token() {
    let document = AbcDocument::analyze("X:1\nK:C\nAB ¤ [CE\n");
    let errors: Vec<_> = document
        .diagnostics()
        .iter()
        .filter(|d| d.severity == DiagnosticSeverity::Error)
        .collect();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].range.start, Position::new(2, 3));
    assert_eq!(errors[1].range.start, Position::new(2, 5));
    assert_eq!(errors[1].code.as_deref(), Some("unterminated-chord"));
}

#[test]
fn utf16_columns_after_wide_characters() {
    let document = AbcDocument::analyze("X:1\nK:C\n\"𝄞\"A\n");
    let note = document
        .classified_tokens()
        .iter()
        .find(|t| t.kind == TokenKind::NoteLetter)
        .unwrap();
    assert_eq!((note.line, note.column), (2, 4));
}
