//! Rhythm rewriting
//!
//!     Doubles or halves the written length of every note and chord touched by a selection,
//!     and returns the selected text with those lengths rewritten.
//!
//! Arithmetic
//!
//!     A length is numerator/denominator, both 1 when absent, reduced to lowest terms when
//!     read. A slash run without a denominator halves once per slash (`A//` is 1/4).
//!     Multiplying halves an even denominator, otherwise doubles the numerator. Dividing
//!     halves an even numerator, otherwise doubles the denominator. Both steps keep the
//!     fraction in lowest terms, so each undoes the other exactly.
//!
//!     Lengths are always written back in one canonical form: no numerator when it is 1, a
//!     bare `/` for a denominator of 2, `/n` for any other denominator. `A` / 2 is `A/`,
//!     `A/` / 2 is `A/4`, `A3` / 2 is `A3/`.
//!
//!     Results past the configured ceilings are dropped and the note is left alone.
//!
//! What is touched
//!
//!     Notes and rests, chords, and notes inside slur groups. A chord's shared length is
//!     rewritten, unless it has none and its notes carry their own, in which case its notes
//!     are. Grace notes and multi-measure rests keep their lengths. Broken-rhythm markers
//!     and ties stay where they are.

use std::fmt;
use std::str::FromStr;

use crate::abc::ast::{
    AstNode, BodyElement, Chord, ChordContent, FileStructure, MusicItem, Note, Position, Range,
    Rhythm, SourceLocation,
};
use crate::abc::visitors::formatter::format;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RhythmOperator {
    Multiply,
    Divide,
}

impl fmt::Display for RhythmOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RhythmOperator::Multiply => write!(f, "multiply"),
            RhythmOperator::Divide => write!(f, "divide"),
        }
    }
}

/// Raised when parsing an operator name that is neither `multiply` nor `divide`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOperator(pub String);

impl fmt::Display for UnknownOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown rhythm operator '{}' (expected multiply or divide)",
            self.0
        )
    }
}

impl std::error::Error for UnknownOperator {}

impl FromStr for RhythmOperator {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "multiply" | "mul" | "*" => Ok(RhythmOperator::Multiply),
            "divide" | "div" | "/" => Ok(RhythmOperator::Divide),
            other => Err(UnknownOperator(other.to_string())),
        }
    }
}

/// Ceilings past which a rewrite is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RhythmLimits {
    pub max_numerator: u32,
    pub max_denominator: u32,
}

impl Default for RhythmLimits {
    fn default() -> Self {
        Self {
            max_numerator: 64,
            max_denominator: 64,
        }
    }
}

/// Replacement text for a range of the formatted document.
///
/// The range is the selection, widened when the selection cuts through a rhythm that had to
/// be rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RhythmEdit {
    pub range: Range,
    pub new_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RhythmTransform {
    pub operator: RhythmOperator,
    pub limits: RhythmLimits,
}

/// Rewrites with default limits.
pub fn transform(
    tree: &FileStructure,
    operator: RhythmOperator,
    start: Position,
    end: Position,
) -> RhythmEdit {
    RhythmTransform::new(operator).apply(tree, start, end)
}

impl RhythmTransform {
    pub fn new(operator: RhythmOperator) -> Self {
        Self {
            operator,
            limits: RhythmLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: RhythmLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn apply(&self, tree: &FileStructure, start: Position, end: Position) -> RhythmEdit {
        let (start, end) = if end < start { (end, start) } else { (start, end) };
        let text = format(tree);
        let location = SourceLocation::new(&text);

        let mut finder = Finder {
            transform: self,
            selection: (start, end),
            touching: Vec::new(),
            containing: Vec::new(),
        };
        finder.visit_file(tree);
        let mut edits = if start == end && finder.containing.is_empty() {
            finder.touching
        } else {
            finder.containing
        };
        edits.sort_by_key(|edit| edit.span.start);

        let mut lo = location.position_to_byte(start);
        let mut hi = location.position_to_byte(end).max(lo);
        for edit in &edits {
            lo = lo.min(edit.span.start);
            hi = hi.max(edit.span.end);
        }

        let mut new_text = String::new();
        let mut cursor = lo;
        for edit in &edits {
            new_text.push_str(&text[cursor..edit.span.start]);
            new_text.push_str(&edit.text);
            cursor = edit.span.end;
        }
        new_text.push_str(&text[cursor..hi]);

        log::debug!(
            "{} rewrote {} rhythms in {}..{}",
            self.operator,
            edits.len(),
            start,
            end
        );
        RhythmEdit {
            range: location.byte_range_to_range(&(lo..hi)),
            new_text,
        }
    }

    /// New text for a rhythm, or `None` when it cannot or should not change.
    fn rewrite(&self, rhythm: &Rhythm) -> Option<String> {
        let length = Length::read(rhythm)?;
        Some(length.scale(self.operator, self.limits)?.render())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Length {
    numerator: u32,
    denominator: u32,
}

impl Length {
    fn read(rhythm: &Rhythm) -> Option<Length> {
        let numerator = match &rhythm.numerator {
            Some(token) => token.lexeme.parse().ok()?,
            None => 1,
        };
        let denominator = match (&rhythm.separator, &rhythm.denominator) {
            (None, _) => 1,
            (Some(_), Some(token)) => token.lexeme.parse().ok()?,
            (Some(slashes), None) => {
                let count = u32::try_from(slashes.lexeme.len()).ok()?;
                2u32.checked_pow(count)?
            }
        };
        if numerator == 0 || denominator == 0 {
            return None;
        }
        let divisor = gcd(numerator, denominator);
        Some(Length {
            numerator: numerator / divisor,
            denominator: denominator / divisor,
        })
    }

    fn scale(self, operator: RhythmOperator, limits: RhythmLimits) -> Option<Length> {
        let (numerator, denominator) = match operator {
            RhythmOperator::Multiply if self.denominator % 2 == 0 => {
                (self.numerator, self.denominator / 2)
            }
            RhythmOperator::Multiply => (self.numerator.checked_mul(2)?, self.denominator),
            RhythmOperator::Divide if self.numerator % 2 == 0 => {
                (self.numerator / 2, self.denominator)
            }
            RhythmOperator::Divide => (self.numerator, self.denominator.checked_mul(2)?),
        };
        if numerator > limits.max_numerator || denominator > limits.max_denominator {
            return None;
        }
        Some(Length {
            numerator,
            denominator,
        })
    }

    fn render(self) -> String {
        let mut text = if self.numerator == 1 {
            String::new()
        } else {
            self.numerator.to_string()
        };
        match self.denominator {
            1 => {}
            2 => text.push('/'),
            other => {
                text.push('/');
                text.push_str(&other.to_string());
            }
        }
        text
    }
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

struct Edit {
    span: std::ops::Range<usize>,
    text: String,
}

/// Collects edits for nodes that meet the selection. With an empty selection, nodes that
/// contain the cursor are preferred over nodes that merely end at it.
struct Finder<'t> {
    transform: &'t RhythmTransform,
    selection: (Position, Position),
    containing: Vec<Edit>,
    touching: Vec<Edit>,
}

enum Hit {
    Contains,
    Touches,
}

impl<'t> Finder<'t> {
    fn hit(&self, range: &Range) -> Option<Hit> {
        let (start, end) = self.selection;
        if start == end {
            if range.start <= start && start < range.end {
                Some(Hit::Contains)
            } else if range.end == start {
                Some(Hit::Touches)
            } else {
                None
            }
        } else {
            (range.start < end && start < range.end).then_some(Hit::Contains)
        }
    }

    fn record(&mut self, hit: Hit, edits: Vec<Edit>) {
        match hit {
            Hit::Contains => self.containing.extend(edits),
            Hit::Touches => self.touching.extend(edits),
        }
    }

    fn visit_file(&mut self, file: &FileStructure) {
        for tune in &file.tunes {
            let Some(body) = &tune.body else { continue };
            for element in &body.sequence {
                match element {
                    BodyElement::MusicCode(code) => self.visit_items(&code.contents),
                    BodyElement::InfoLine(_) | BodyElement::Comment(_) => {}
                }
            }
        }
    }

    fn visit_items(&mut self, items: &[MusicItem]) {
        for item in items {
            match item {
                MusicItem::Note(note) => self.visit_note(note),
                MusicItem::Chord(chord) => self.visit_chord(chord),
                MusicItem::SlurGroup(group) => self.visit_items(&group.contents),
                MusicItem::GraceGroup(_) | MusicItem::MultiMeasureRest(_) => {}
                MusicItem::Token(_)
                | MusicItem::BarLine(_)
                | MusicItem::Annotation(_)
                | MusicItem::Decoration(_)
                | MusicItem::Symbol(_)
                | MusicItem::NthRepeat(_)
                | MusicItem::InlineField(_)
                | MusicItem::Spacer(_) => {}
            }
        }
    }

    fn visit_note(&mut self, note: &Note) {
        let Some(hit) = note.range().and_then(|range| self.hit(&range)) else {
            return;
        };
        let edits = self.note_edit(note).into_iter().collect();
        self.record(hit, edits);
    }

    fn visit_chord(&mut self, chord: &Chord) {
        let Some(hit) = chord.range().and_then(|range| self.hit(&range)) else {
            return;
        };
        let has_shared = chord.rhythm.length_tokens().next().is_some();
        let notes_have_own = chord
            .notes()
            .any(|note| note.rhythm.length_tokens().next().is_some());

        let edits = if !has_shared && notes_have_own {
            chord
                .contents
                .iter()
                .filter_map(|content| match content {
                    ChordContent::Note(note) => self.note_edit(note),
                    ChordContent::Annotation(_) | ChordContent::Token(_) => None,
                })
                .collect()
        } else {
            self.rhythm_edit(&chord.rhythm, chord.right_bracket.span.end)
                .into_iter()
                .collect()
        };
        self.record(hit, edits);
    }

    fn note_edit(&self, note: &Note) -> Option<Edit> {
        self.rhythm_edit(&note.rhythm, note.head.last_token().span.end)
    }

    /// Replaces the length tokens, or inserts at `insert_at` when there are none.
    fn rhythm_edit(&self, rhythm: &Rhythm, insert_at: usize) -> Option<Edit> {
        let text = self.transform.rewrite(rhythm)?;
        let mut length = rhythm.length_tokens();
        let span = match length.next() {
            Some(first) => {
                let last = length.last().unwrap_or(first);
                first.span.start..last.span.end
            }
            None => insert_at..insert_at,
        };
        Some(Edit { span, text })
    }
}
