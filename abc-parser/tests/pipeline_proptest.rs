//! Property tests over the whole scan -> parse -> visit pipeline

use abc_parser::abc::ast::Position;
use abc_parser::abc::diagnostics::Collector;
use abc_parser::abc::parsing::parse;
use abc_parser::abc::scanning::scan;
use abc_parser::abc::visitors::formatter::format;
use abc_parser::abc::visitors::rhythm::{transform, RhythmOperator};
use abc_parser::abc::visitors::semantic_tokens::classify;
use abc_parser::AbcDocument;
use proptest::prelude::*;

/// Text drawn mostly from the music alphabet, with a sprinkling of other characters.
fn abc_like() -> impl Strategy<Value = String> {
    prop::string::string_regex(
        "(X:1\n|K:G\n|T:é\n|[A-Ga-gzZxy^_=,'/0-9 |:\\[\\]{}()\"!~.>< \n%-]|¤){0,120}",
    )
    .expect("valid regex")
}

fn note() -> impl Strategy<Value = String> {
    (
        prop::sample::select(vec!["A", "c", "^F", "_B,", "z", "e'"]),
        prop::sample::select(vec!["", "2", "3", "4", "/", "/4", "3/", "/3", "2/3", "3/8"]),
    )
        .prop_map(|(head, rhythm)| format!("{head}{rhythm}"))
}

/// Applies `first` then `second` to the whole music line and returns the result.
fn twice(line: &str, first: RhythmOperator, second: RhythmOperator) -> Option<String> {
    let mut text = line.to_string();
    for operator in [first, second] {
        let source = format!("X:1\nK:C\n{text}\n");
        let document = AbcDocument::analyze(source.clone());
        if document.has_errors() {
            return None;
        }
        let (start, end) = whole_line(&source, 2);
        text = transform(document.tree(), operator, start, end).new_text;
    }
    Some(text)
}

fn whole_line(source: &str, line: usize) -> (Position, Position) {
    let text = source.lines().nth(line).unwrap_or("");
    (
        Position::new(line, 0),
        Position::new(line, text.encode_utf16().count()),
    )
}

proptest! {
    #[test]
    fn scanning_covers_every_byte(source in any::<String>()) {
        let mut collector = Collector::new();
        let tokens = scan(&source, &mut collector);
        let rebuilt: String = tokens.iter().map(|t| t.lexeme.as_str()).collect();
        prop_assert_eq!(rebuilt, source);
    }

    #[test]
    fn token_positions_only_move_forward(source in abc_like()) {
        let mut collector = Collector::new();
        let tokens = scan(&source, &mut collector);
        for pair in tokens.windows(2) {
            prop_assert_eq!(pair[0].span.end, pair[1].span.start);
            prop_assert!((pair[0].line, pair[0].column) <= (pair[1].line, pair[1].column));
        }
    }

    #[test]
    fn format_reproduces_any_input(source in abc_like()) {
        let mut collector = Collector::new();
        let tree = parse(scan(&source, &mut collector), &mut collector);
        prop_assert_eq!(format(&tree), source);
    }

    #[test]
    fn format_reproduces_arbitrary_text(source in any::<String>()) {
        let mut collector = Collector::new();
        let tree = parse(scan(&source, &mut collector), &mut collector);
        prop_assert_eq!(format(&tree), source);
    }

    #[test]
    fn classified_tokens_are_sorted(source in abc_like()) {
        let document = AbcDocument::analyze(source);
        let tokens = classify(document.tree());
        for pair in tokens.windows(2) {
            prop_assert!((pair[0].line, pair[0].column) <= (pair[1].line, pair[1].column));
        }
    }

    #[test]
    fn divide_then_multiply_restores_rhythms(notes in prop::collection::vec(note(), 1..8)) {
        let line = notes.join(" ");
        let restored = twice(&line, RhythmOperator::Divide, RhythmOperator::Multiply);
        prop_assume!(restored.is_some());
        prop_assert_eq!(restored, Some(line));
    }

    #[test]
    fn multiply_then_divide_restores_rhythms(notes in prop::collection::vec(note(), 1..8)) {
        let line = notes.join(" ");
        let restored = twice(&line, RhythmOperator::Multiply, RhythmOperator::Divide);
        prop_assume!(restored.is_some());
        prop_assert_eq!(restored, Some(line));
    }
}
