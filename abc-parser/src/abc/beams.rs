//! Beam groups
//!
//! Notes written next to each other with no space between them are beamed together in
//! ABC. A beam is any run of two or more notes or chords that is not broken by whitespace,
//! a bar line, an inline field, a variant ending, a multi-measure rest or a slur group.
//! Decorations, annotations, grace groups and tuplet markers sit inside a run without
//! breaking it.
//!
//! Beams are derived on demand from one item sequence; nested slur groups get their own
//! call.

use serde::Serialize;

use super::ast::MusicItem;
use super::token::TokenKind;

/// Item indices `first..=last` of the beamed notes within the sequence passed to [`beams`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Beam {
    pub first: usize,
    pub last: usize,
}

impl Beam {
    /// Number of items spanned, neutral items included.
    pub fn width(&self) -> usize {
        self.last - self.first + 1
    }
}

enum Role {
    Beamable,
    Neutral,
    Breaker,
}

fn role(item: &MusicItem) -> Role {
    match item {
        MusicItem::Note(_) | MusicItem::Chord(_) => Role::Beamable,
        MusicItem::Annotation(_)
        | MusicItem::Decoration(_)
        | MusicItem::Symbol(_)
        | MusicItem::GraceGroup(_)
        | MusicItem::Spacer(_) => Role::Neutral,
        MusicItem::Token(token) => match token.kind {
            kind if kind.is_whitespace() => Role::Breaker,
            TokenKind::Comment | TokenKind::StylesheetDirective => Role::Breaker,
            _ => Role::Neutral,
        },
        MusicItem::BarLine(_)
        | MusicItem::InlineField(_)
        | MusicItem::NthRepeat(_)
        | MusicItem::MultiMeasureRest(_)
        | MusicItem::SlurGroup(_) => Role::Breaker,
    }
}

/// Beams found in `items`, in order.
pub fn beams(items: &[MusicItem]) -> Vec<Beam> {
    let mut found = Vec::new();
    let mut run: Option<(usize, usize, usize)> = None; // first note, last note, note count

    let mut close = |run: &mut Option<(usize, usize, usize)>| {
        if let Some((first, last, count)) = run.take() {
            if count >= 2 {
                found.push(Beam { first, last });
            }
        }
    };

    for (index, item) in items.iter().enumerate() {
        match role(item) {
            Role::Beamable => {
                run = Some(match run {
                    Some((first, _, count)) => (first, index, count + 1),
                    None => (index, index, 1),
                });
            }
            Role::Neutral => {}
            Role::Breaker => close(&mut run),
        }
    }
    close(&mut run);
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abc::diagnostics::Collector;
    use crate::abc::parsing::parse;
    use crate::abc::scanning::scan;

    fn line_items(line: &str) -> Vec<MusicItem> {
        let source = format!("X:1\nK:C\n{line}\n");
        let mut collector = Collector::new();
        let tree = parse(scan(&source, &mut collector), &mut collector);
        let body = tree.tunes[0].body.clone().unwrap();
        let code = body.music_lines().next().cloned().unwrap();
        code.contents
    }

    #[test]
    fn adjacent_notes_beam() {
        let items = line_items("ABcd efg");
        let found = beams(&items);
        assert_eq!(found, vec![Beam { first: 0, last: 3 }, Beam { first: 5, last: 7 }]);
        assert_eq!(found[0].width(), 4);
    }

    #[test]
    fn single_notes_do_not_beam() {
        assert!(beams(&line_items("A B c|d")).is_empty());
    }

    #[test]
    fn bar_lines_break_runs() {
        let found = beams(&line_items("AB|cd"));
        assert_eq!(found, vec![Beam { first: 0, last: 1 }, Beam { first: 3, last: 4 }]);
    }

    #[test]
    fn decorations_and_graces_stay_inside() {
        // ~A {g}B "C"c
        let items = line_items("~A{g}B\"C\"c");
        let found = beams(&items);
        assert_eq!(found, vec![Beam { first: 1, last: 5 }]);
    }

    #[test]
    fn chords_beam_with_notes() {
        let found = beams(&line_items("[CE]G"));
        assert_eq!(found, vec![Beam { first: 0, last: 1 }]);
    }

    #[test]
    fn trailing_decoration_is_not_part_of_the_beam() {
        let found = beams(&line_items("AB.|"));
        assert_eq!(found, vec![Beam { first: 0, last: 1 }]);
    }
}
