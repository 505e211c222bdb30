//! Music line productions
//!
//!     music_code   := item* Eol?
//!     item         := bar | nth_repeat | annotation | symbol | decoration | note | chord
//!                   | grace_group | slur_group | inline_field | multi_measure_rest | spacer
//!                   | bare_token
//!     note         := accidental? (letter octave? | rest) rhythm tie?
//!     rhythm       := number? slashes? number? broken?
//!     chord        := "[" (note | annotation | whitespace | decoration)* "]" rhythm tie?
//!     grace_group  := "{" "/"? (note | whitespace)* "}"
//!     slur_group   := "(" item* ")"
//!     inline_field := "[" whitespace* field_letter ":" text* "]"

use super::Parser;
use crate::abc::ast::{
    Annotation, BarLine, Chord, ChordContent, Decoration, GraceContent, GraceGroup, InlineField,
    MultiMeasureRest, MusicCode, MusicItem, Note, NoteHead, NthRepeat, Pitch, Rest, Rhythm,
    SlurGroup, Spacer, Symbol,
};
use crate::abc::token::{Token, TokenKind};

/// Letters that stand for a decoration: `H` fermata, `L` accent, `M` lowermordent,
/// `O` coda, `P` uppermordent, `S` segno, `T` trill, `u` up-bow, `v` down-bow.
const DECORATION_LETTERS: &str = "HLMOPSTuv";

const RHYTHM_KINDS: [TokenKind; 4] = [
    TokenKind::Number,
    TokenKind::Slash,
    TokenKind::Greater,
    TokenKind::Less,
];

impl<'c> Parser<'c> {
    /// One music line: items up to and including the line break. Stops short of comments,
    /// info lines and the end of the text, which belong to the body.
    pub(super) fn parse_music_code(&mut self) -> MusicCode {
        let mut code = MusicCode::default();
        loop {
            match self.peek_kind() {
                TokenKind::Eof | TokenKind::InfoKey => break,
                kind if kind.is_comment() => break,
                TokenKind::Eol => {
                    code.contents.push(MusicItem::Token(self.advance()));
                    break;
                }
                _ => code.contents.push(self.parse_music_item()),
            }
        }
        code
    }

    /// Always consumes at least one token.
    fn parse_music_item(&mut self) -> MusicItem {
        match self.peek_kind() {
            kind if kind.is_barline() => MusicItem::BarLine(BarLine {
                barline: self.advance(),
            }),
            TokenKind::NthRepeat => MusicItem::NthRepeat(NthRepeat {
                repeat: self.advance(),
            }),
            TokenKind::Annotation => MusicItem::Annotation(Annotation {
                text: self.advance(),
            }),
            TokenKind::Symbol => MusicItem::Symbol(Symbol {
                symbol: self.advance(),
            }),
            TokenKind::Dot | TokenKind::Tilde => MusicItem::Decoration(Decoration {
                decoration: self.advance(),
            }),
            TokenKind::Letter => self.parse_letter(),
            kind if kind.starts_note() => match self.parse_note() {
                Ok(note) => MusicItem::Note(note),
                Err(token) => MusicItem::Token(token),
            },
            TokenKind::MultiMeasureRest => {
                let rest = self.advance();
                let length = self.accept(TokenKind::Number);
                MusicItem::MultiMeasureRest(MultiMeasureRest { rest, length })
            }
            TokenKind::SpacerLetter => {
                let spacer = self.advance();
                let width = self.accept(TokenKind::Number);
                MusicItem::Spacer(Spacer { spacer, width })
            }
            TokenKind::LeftBracket => self.parse_bracket(),
            TokenKind::LeftBrace => self.parse_brace(),
            TokenKind::LeftParen => self.parse_paren(),
            TokenKind::Number | TokenKind::Slash | TokenKind::Greater | TokenKind::Less => {
                let token = self.advance();
                self.collector.error(
                    &token,
                    "detached-rhythm",
                    format!("{:?} must directly follow a note, rest or chord", token.lexeme),
                );
                MusicItem::Token(token)
            }
            TokenKind::Minus => {
                let token = self.advance();
                self.collector
                    .warning(&token, "detached-tie", "tie does not follow a note");
                MusicItem::Token(token)
            }
            TokenKind::RightBracket | TokenKind::RightBrace => {
                let token = self.advance();
                self.collector.error(
                    &token,
                    "unmatched-bracket",
                    format!("{:?} closes nothing", token.lexeme),
                );
                MusicItem::Token(token)
            }
            _ => MusicItem::Token(self.advance()),
        }
    }

    fn parse_letter(&mut self) -> MusicItem {
        let token = self.advance();
        if is_decoration_letter(&token) {
            MusicItem::Decoration(Decoration { decoration: token })
        } else {
            self.collector.error(
                &token,
                "unknown-letter",
                format!("'{}' is not a note, rest or decoration", token.lexeme),
            );
            MusicItem::Token(token)
        }
    }

    /// A note, or the token that could not start one (already reported).
    fn parse_note(&mut self) -> Result<Note, Token> {
        let alteration = self.peek_kind().is_accidental().then(|| self.advance());

        let head = match (alteration, self.peek_kind()) {
            (alteration, TokenKind::NoteLetter) => {
                let letter = self.advance();
                let octave = self.accept_any(&[TokenKind::Apostrophe, TokenKind::Comma]);
                NoteHead::Pitch(Pitch {
                    alteration,
                    letter,
                    octave,
                })
            }
            (None, TokenKind::RestLetter) => NoteHead::Rest(Rest {
                rest: self.advance(),
            }),
            (Some(accidental), _) => {
                self.collector.error(
                    &accidental,
                    "dangling-accidental",
                    "accidental must be followed by a note letter",
                );
                return Err(accidental);
            }
            (None, _) => return Err(self.advance()),
        };

        let rhythm = self.parse_rhythm();
        let tie = self.accept(TokenKind::Minus);
        Ok(Note { head, rhythm, tie })
    }

    fn parse_rhythm(&mut self) -> Rhythm {
        let numerator = self.accept(TokenKind::Number);
        let separator = self.accept(TokenKind::Slash);
        let denominator = separator
            .as_ref()
            .and_then(|_| self.accept(TokenKind::Number));
        let broken = self.accept_any(&[TokenKind::Greater, TokenKind::Less]);
        Rhythm {
            numerator,
            separator,
            denominator,
            broken,
        }
    }

    // ---- brackets ----------------------------------------------------------------------

    fn parse_bracket(&mut self) -> MusicItem {
        if self.at_inline_field() {
            return MusicItem::InlineField(self.parse_inline_field());
        }
        if self.closing_index(TokenKind::RightBracket, is_chord_content).is_some() {
            return MusicItem::Chord(self.parse_chord());
        }
        let bracket = self.advance();
        self.collector.error(
            &bracket,
            "unterminated-chord",
            "chord is missing its closing ']'",
        );
        MusicItem::Token(bracket)
    }

    /// `[`, optional whitespace, a single field letter, then `:`.
    fn at_inline_field(&self) -> bool {
        let mut index = self.current + 1;
        while self.kind_at(index) == TokenKind::Whitespace {
            index += 1;
        }
        let is_letter = matches!(
            self.kind_at(index),
            TokenKind::NoteLetter
                | TokenKind::RestLetter
                | TokenKind::MultiMeasureRest
                | TokenKind::SpacerLetter
                | TokenKind::Letter
        );
        is_letter && self.kind_at(index + 1) == TokenKind::Colon
    }

    /// Index of the `close` token matching the bracket at the cursor, provided everything
    /// in between is admitted by `admits`.
    fn closing_index(&self, close: TokenKind, admits: fn(TokenKind) -> bool) -> Option<usize> {
        let mut index = self.current + 1;
        loop {
            match self.kind_at(index) {
                kind if kind == close => return Some(index),
                kind if admits(kind) => index += 1,
                _ => return None,
            }
        }
    }

    fn parse_inline_field(&mut self) -> InlineField {
        let left_bracket = self.advance();
        let mut padding = Vec::new();
        while let Some(space) = self.accept(TokenKind::Whitespace) {
            padding.push(space);
        }
        let field = self.advance();
        let colon = self.advance();
        let mut text = Vec::new();
        loop {
            match self.peek_kind() {
                TokenKind::RightParen if self.slur_depth > 0 => break,
                TokenKind::RightBracket
                | TokenKind::Eol
                | TokenKind::Eof
                | TokenKind::AntislashEol
                | TokenKind::InfoKey => break,
                kind if kind.is_comment() => break,
                _ => text.push(self.advance()),
            }
        }
        let right_bracket = self.accept(TokenKind::RightBracket);
        if right_bracket.is_none() {
            self.collector.error(
                &left_bracket,
                "unterminated-inline-field",
                "inline field is missing its closing ']'",
            );
        }
        InlineField {
            left_bracket,
            padding,
            field,
            colon,
            text,
            right_bracket,
        }
    }

    /// Only called once the closing bracket is known to be on this line.
    fn parse_chord(&mut self) -> Chord {
        let left_bracket = self.advance();
        let mut contents = Vec::new();
        while !self.check(TokenKind::RightBracket) && !self.is_at_end() {
            let kind = self.peek_kind();
            let content = if kind.starts_note() {
                match self.parse_note() {
                    Ok(note) => ChordContent::Note(note),
                    Err(token) => ChordContent::Token(token),
                }
            } else if kind == TokenKind::Annotation {
                ChordContent::Annotation(Annotation {
                    text: self.advance(),
                })
            } else {
                let token = self.advance();
                if RHYTHM_KINDS.contains(&kind) || kind == TokenKind::Minus {
                    self.collector.error(
                        &token,
                        "detached-rhythm",
                        format!("{:?} inside a chord must follow a note", token.lexeme),
                    );
                } else if kind == TokenKind::Letter && !is_decoration_letter(&token) {
                    self.collector.error(
                        &token,
                        "unknown-letter",
                        format!("'{}' is not a note or rest", token.lexeme),
                    );
                }
                ChordContent::Token(token)
            };
            contents.push(content);
        }
        let right_bracket = self.advance();

        let chord = Chord {
            left_bracket,
            contents,
            right_bracket,
            rhythm: self.parse_rhythm(),
            tie: self.accept(TokenKind::Minus),
        };
        if chord.notes().next().is_none() {
            self.collector
                .warning(&chord.left_bracket, "empty-chord", "chord has no notes");
        }
        chord
    }

    fn parse_brace(&mut self) -> MusicItem {
        if self.closing_index(TokenKind::RightBrace, is_grace_content).is_some() {
            return MusicItem::GraceGroup(self.parse_grace_group());
        }
        let brace = self.advance();
        self.collector.error(
            &brace,
            "unterminated-grace-group",
            "grace group is missing its closing '}'",
        );
        MusicItem::Token(brace)
    }

    fn parse_grace_group(&mut self) -> GraceGroup {
        let left_brace = self.advance();
        let acciaccatura = self.accept(TokenKind::Slash);
        let mut contents = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            let kind = self.peek_kind();
            let content = if kind.starts_note() {
                match self.parse_note() {
                    Ok(note) => GraceContent::Note(note),
                    Err(token) => GraceContent::Token(token),
                }
            } else if kind == TokenKind::LeftBracket
                && self
                    .closing_index(TokenKind::RightBracket, is_chord_content)
                    .is_some()
            {
                let chord = self.parse_chord();
                self.collector.warning(
                    &chord.left_bracket,
                    "chord-in-grace-group",
                    "grace groups take single notes, not chords",
                );
                GraceContent::Chord(chord)
            } else {
                let token = self.advance();
                if kind != TokenKind::Whitespace {
                    self.collector.error(
                        &token,
                        "unexpected-in-grace-group",
                        format!("{:?} is not allowed in a grace group", token.lexeme),
                    );
                }
                GraceContent::Token(token)
            };
            contents.push(content);
        }
        let right_brace = self.advance();
        GraceGroup {
            left_brace,
            acciaccatura,
            contents,
            right_brace,
        }
    }

    /// A slur group when the matching `)` is on this line; a bare `(` otherwise, which is
    /// legal since slurs may cross lines.
    fn parse_paren(&mut self) -> MusicItem {
        if !self.has_matching_paren() {
            return MusicItem::Token(self.advance());
        }
        let left_paren = self.advance();
        let mut contents = Vec::new();
        self.slur_depth += 1;
        loop {
            match self.peek_kind() {
                TokenKind::RightParen => break,
                TokenKind::Eol | TokenKind::Eof | TokenKind::InfoKey => break,
                kind if kind.is_comment() => break,
                _ => contents.push(self.parse_music_item()),
            }
        }
        self.slur_depth -= 1;
        let right_paren = self.accept(TokenKind::RightParen);
        MusicItem::SlurGroup(SlurGroup {
            left_paren,
            contents,
            right_paren,
        })
    }

    fn has_matching_paren(&self) -> bool {
        let mut depth = 0usize;
        let mut index = self.current;
        loop {
            match self.kind_at(index) {
                TokenKind::LeftParen => depth += 1,
                TokenKind::RightParen => {
                    depth -= 1;
                    if depth == 0 {
                        return true;
                    }
                }
                TokenKind::Eol | TokenKind::Eof | TokenKind::InfoKey => return false,
                kind if kind.is_comment() => return false,
                _ => {}
            }
            index += 1;
        }
    }
}

fn is_decoration_letter(token: &Token) -> bool {
    token
        .lexeme
        .chars()
        .next()
        .is_some_and(|c| DECORATION_LETTERS.contains(c))
}

fn is_chord_content(kind: TokenKind) -> bool {
    kind.starts_note()
        || RHYTHM_KINDS.contains(&kind)
        || matches!(
            kind,
            TokenKind::Apostrophe
                | TokenKind::Comma
                | TokenKind::Minus
                | TokenKind::Whitespace
                | TokenKind::Annotation
                | TokenKind::Dot
                | TokenKind::Tilde
                | TokenKind::Symbol
                | TokenKind::Letter
        )
}

fn is_grace_content(kind: TokenKind) -> bool {
    (is_chord_content(kind)
        && !matches!(kind, TokenKind::Annotation | TokenKind::Symbol | TokenKind::Letter))
        || matches!(kind, TokenKind::LeftBracket | TokenKind::RightBracket)
}

#[cfg(test)]
mod tests {
    use crate::abc::ast::{ChordContent, GraceContent, MusicItem, NoteHead};
    use crate::abc::diagnostics::Collector;
    use crate::abc::parsing::parse;
    use crate::abc::scanning::scan;
    use crate::abc::visitors::formatter::format;

    /// Parses `line` as the only music line of a tune.
    fn parse_line(line: &str) -> (Vec<MusicItem>, Collector) {
        let source = format!("X:1\nK:C\n{line}\n");
        let mut collector = Collector::new();
        let tokens = scan(&source, &mut collector);
        let tree = parse(tokens, &mut collector);
        assert_eq!(format(&tree), source);
        let body = tree.tunes[0].body.clone().unwrap();
        let code = body.music_lines().next().cloned().unwrap();
        (code.contents, collector)
    }

    fn codes(collector: &Collector) -> Vec<&'static str> {
        collector.problems().iter().map(|p| p.code).collect()
    }

    #[test]
    fn full_note() {
        let (items, collector) = parse_line("^c'3/4-");
        assert!(collector.is_empty());
        let MusicItem::Note(note) = &items[0] else {
            panic!("expected a note, got {:?}", items[0]);
        };
        let NoteHead::Pitch(pitch) = &note.head else {
            panic!("expected a pitch");
        };
        assert_eq!(pitch.alteration.as_ref().unwrap().lexeme, "^");
        assert_eq!(pitch.letter.lexeme, "c");
        assert_eq!(pitch.octave.as_ref().unwrap().lexeme, "'");
        assert_eq!(note.rhythm.numerator.as_ref().unwrap().lexeme, "3");
        assert_eq!(note.rhythm.denominator.as_ref().unwrap().lexeme, "4");
        assert!(note.tie.is_some());
    }

    #[test]
    fn broken_rhythm_stays_on_first_note() {
        let (items, _) = parse_line("A>B");
        let MusicItem::Note(first) = &items[0] else {
            panic!("expected a note");
        };
        assert_eq!(first.rhythm.broken.as_ref().unwrap().lexeme, ">");
        assert!(matches!(items[1], MusicItem::Note(_)));
    }

    #[test]
    fn rhythm_needs_adjacency() {
        let (_, collector) = parse_line("A 2");
        assert_eq!(codes(&collector), ["detached-rhythm"]);
    }

    #[test]
    fn chord_with_shared_rhythm() {
        let (items, collector) = parse_line("[CEG]2");
        assert!(collector.is_empty());
        let MusicItem::Chord(chord) = &items[0] else {
            panic!("expected a chord");
        };
        assert_eq!(chord.notes().count(), 3);
        assert_eq!(chord.rhythm.numerator.as_ref().unwrap().lexeme, "2");
    }

    #[test]
    fn single_note_chord_is_fine() {
        let (_, collector) = parse_line("[C]");
        assert!(collector.is_empty());
    }

    #[test]
    fn empty_chord_warns() {
        let (_, collector) = parse_line("[]");
        assert_eq!(codes(&collector), ["empty-chord"]);
        assert!(!collector.has_errors());
    }

    #[test]
    fn unterminated_chord_recovers_notes() {
        let (items, collector) = parse_line("[CEG");
        assert_eq!(codes(&collector), ["unterminated-chord"]);
        assert!(matches!(&items[0], MusicItem::Token(t) if t.lexeme == "["));
        let notes = items.iter().filter(|i| matches!(i, MusicItem::Note(_))).count();
        assert_eq!(notes, 3);
    }

    #[test]
    fn annotation_inside_chord() {
        let (items, _) = parse_line("[\"^x\"CE]");
        let MusicItem::Chord(chord) = &items[0] else {
            panic!("expected a chord");
        };
        assert!(matches!(chord.contents[0], ChordContent::Annotation(_)));
    }

    #[test]
    fn inline_field_beats_chord() {
        let (items, collector) = parse_line("[K:G]ABc");
        assert!(collector.is_empty());
        let MusicItem::InlineField(field) = &items[0] else {
            panic!("expected an inline field");
        };
        assert_eq!(field.field_code(), 'K');
        assert_eq!(field.value_text(), "G");
        assert!(field.right_bracket.is_some());
    }

    #[test]
    fn inline_field_after_whitespace() {
        let (items, collector) = parse_line("AB[ K:D]cd|");
        assert!(collector.is_empty());
        let MusicItem::InlineField(field) = &items[2] else {
            panic!("expected an inline field, got {:?}", items[2]);
        };
        assert_eq!(field.padding.len(), 1);
        assert_eq!(field.field_code(), 'K');
        assert_eq!(field.value_text(), "D");
    }

    #[test]
    fn unterminated_inline_field_stops_at_slur_end() {
        let (items, collector) = parse_line("(A[K:G B)c");
        assert_eq!(codes(&collector), ["unterminated-inline-field"]);
        let MusicItem::SlurGroup(group) = &items[0] else {
            panic!("expected a slur group, got {:?}", items[0]);
        };
        assert!(group.right_paren.is_some());
        assert!(matches!(items[1], MusicItem::Note(_)));
    }

    #[test]
    fn unknown_letter_inside_chord() {
        let (items, collector) = parse_line("[CKE]");
        assert_eq!(codes(&collector), ["unknown-letter"]);
        let MusicItem::Chord(chord) = &items[0] else {
            panic!("expected a chord");
        };
        assert_eq!(chord.notes().count(), 2);
        let (_, collector) = parse_line("[CTE]");
        assert!(collector.is_empty());
    }

    #[test]
    fn unterminated_inline_field() {
        let (items, collector) = parse_line("[M:6/8 AB");
        assert_eq!(codes(&collector), ["unterminated-inline-field"]);
        let MusicItem::InlineField(field) = &items[0] else {
            panic!("expected an inline field");
        };
        assert!(field.right_bracket.is_none());
    }

    #[test]
    fn grace_group_with_acciaccatura() {
        let (items, collector) = parse_line("{/ga}B");
        assert!(collector.is_empty());
        let MusicItem::GraceGroup(group) = &items[0] else {
            panic!("expected a grace group");
        };
        assert!(group.acciaccatura.is_some());
        assert_eq!(group.notes().count(), 2);
    }

    #[test]
    fn chord_in_grace_group_warns() {
        let (items, collector) = parse_line("{[ce]}B");
        assert_eq!(codes(&collector), ["chord-in-grace-group"]);
        let MusicItem::GraceGroup(group) = &items[0] else {
            panic!("expected a grace group");
        };
        assert!(matches!(group.contents[0], GraceContent::Chord(_)));
    }

    #[test]
    fn unterminated_grace_group() {
        let (_, collector) = parse_line("{ga B");
        assert_eq!(codes(&collector), ["unterminated-grace-group"]);
    }

    #[test]
    fn nested_slurs() {
        let (items, collector) = parse_line("(A(Bc)d)");
        assert!(collector.is_empty());
        let MusicItem::SlurGroup(outer) = &items[0] else {
            panic!("expected a slur group");
        };
        assert!(outer
            .contents
            .iter()
            .any(|item| matches!(item, MusicItem::SlurGroup(_))));
        assert!(outer.right_paren.is_some());
    }

    #[test]
    fn slur_across_lines_is_bare() {
        let (items, collector) = parse_line("(AB|");
        assert!(collector.is_empty());
        assert!(matches!(&items[0], MusicItem::Token(t) if t.lexeme == "("));
    }

    #[test]
    fn decoration_letters() {
        let (items, collector) = parse_line("TA uB");
        assert!(collector.is_empty());
        assert!(matches!(items[0], MusicItem::Decoration(_)));
        let (_, collector) = parse_line("KA");
        assert_eq!(codes(&collector), ["unknown-letter"]);
    }

    #[test]
    fn rests_spacers_and_repeats() {
        let (items, collector) = parse_line("|:Z4|y2 x|1 A:|2 B|]");
        assert!(collector.is_empty());
        assert!(items.iter().any(|i| matches!(i, MusicItem::MultiMeasureRest(r) if r.length.is_some())));
        assert!(items.iter().any(|i| matches!(i, MusicItem::Spacer(s) if s.width.is_some())));
        let bars = items.iter().filter(|i| matches!(i, MusicItem::BarLine(_))).count();
        assert_eq!(bars, 5);
    }

    #[test]
    fn accidental_without_note() {
        let (_, collector) = parse_line("^ z");
        assert_eq!(codes(&collector), ["dangling-accidental"]);
    }
}
