//! Formatter
//!
//! Writes every token's lexeme back out in tree order. The tree keeps all tokens, so the
//! output equals the text that was parsed, whatever problems were found in it.
//!
//! Whether formatting *should* be offered for a document with errors is a caller decision;
//! see `AbcDocument::formatted`.

use crate::abc::ast::{
    BodyElement, Chord, ChordContent, Comment, FileStructure, GraceContent, GraceGroup,
    HeaderLine, InfoLine, MusicItem, Note, NoteHead, Rhythm, Tune,
};
use crate::abc::token::Token;

/// Renders the tree back to text.
pub fn format(tree: &FileStructure) -> String {
    let mut formatter = Formatter::default();
    formatter.visit_file(tree);
    formatter.output
}

#[derive(Default)]
struct Formatter {
    output: String,
}

impl Formatter {
    fn write(&mut self, token: &Token) {
        self.output.push_str(&token.lexeme);
    }

    fn write_opt(&mut self, token: &Option<Token>) {
        if let Some(token) = token {
            self.write(token);
        }
    }

    fn write_all<'a>(&mut self, tokens: impl IntoIterator<Item = &'a Token>) {
        for token in tokens {
            self.write(token);
        }
    }

    fn visit_file(&mut self, file: &FileStructure) {
        if let Some(header) = &file.file_header {
            self.write_all(&header.tokens);
        }
        for tune in &file.tunes {
            self.visit_tune(tune);
        }
    }

    fn visit_tune(&mut self, tune: &Tune) {
        for line in &tune.header.lines {
            match line {
                HeaderLine::Info(info) => self.visit_info_line(info),
                HeaderLine::Comment(comment) => self.visit_comment(comment),
            }
        }
        if let Some(body) = &tune.body {
            for element in &body.sequence {
                match element {
                    BodyElement::MusicCode(code) => self.visit_items(&code.contents),
                    BodyElement::InfoLine(info) => self.visit_info_line(info),
                    BodyElement::Comment(comment) => self.visit_comment(comment),
                }
            }
        }
        self.write_all(&tune.trailing);
    }

    fn visit_info_line(&mut self, info: &InfoLine) {
        self.write(&info.key);
        self.write_all(&info.value);
        self.write_opt(&info.comment);
        self.write_opt(&info.eol);
    }

    fn visit_comment(&mut self, comment: &Comment) {
        self.write(&comment.token);
        self.write_opt(&comment.eol);
    }

    fn visit_items(&mut self, items: &[MusicItem]) {
        for item in items {
            self.visit_item(item);
        }
    }

    fn visit_item(&mut self, item: &MusicItem) {
        match item {
            MusicItem::Token(token) => self.write(token),
            MusicItem::BarLine(bar) => self.write(&bar.barline),
            MusicItem::Annotation(annotation) => self.write(&annotation.text),
            MusicItem::Decoration(decoration) => self.write(&decoration.decoration),
            MusicItem::Note(note) => self.visit_note(note),
            MusicItem::GraceGroup(group) => self.visit_grace_group(group),
            MusicItem::SlurGroup(group) => {
                self.write(&group.left_paren);
                self.visit_items(&group.contents);
                self.write_opt(&group.right_paren);
            }
            MusicItem::Chord(chord) => self.visit_chord(chord),
            MusicItem::Symbol(symbol) => self.write(&symbol.symbol),
            MusicItem::MultiMeasureRest(rest) => {
                self.write(&rest.rest);
                self.write_opt(&rest.length);
            }
            MusicItem::NthRepeat(repeat) => self.write(&repeat.repeat),
            MusicItem::InlineField(field) => {
                self.write(&field.left_bracket);
                self.write_all(&field.padding);
                self.write(&field.field);
                self.write(&field.colon);
                self.write_all(&field.text);
                self.write_opt(&field.right_bracket);
            }
            MusicItem::Spacer(spacer) => {
                self.write(&spacer.spacer);
                self.write_opt(&spacer.width);
            }
        }
    }

    fn visit_note(&mut self, note: &Note) {
        match &note.head {
            NoteHead::Pitch(pitch) => {
                self.write_opt(&pitch.alteration);
                self.write(&pitch.letter);
                self.write_opt(&pitch.octave);
            }
            NoteHead::Rest(rest) => self.write(&rest.rest),
        }
        self.visit_rhythm(&note.rhythm);
        self.write_opt(&note.tie);
    }

    fn visit_rhythm(&mut self, rhythm: &Rhythm) {
        self.write_all(rhythm.tokens());
    }

    fn visit_chord(&mut self, chord: &Chord) {
        self.write(&chord.left_bracket);
        for content in &chord.contents {
            match content {
                ChordContent::Note(note) => self.visit_note(note),
                ChordContent::Annotation(annotation) => self.write(&annotation.text),
                ChordContent::Token(token) => self.write(token),
            }
        }
        self.write(&chord.right_bracket);
        self.visit_rhythm(&chord.rhythm);
        self.write_opt(&chord.tie);
    }

    fn visit_grace_group(&mut self, group: &GraceGroup) {
        self.write(&group.left_brace);
        self.write_opt(&group.acciaccatura);
        for content in &group.contents {
            match content {
                GraceContent::Note(note) => self.visit_note(note),
                GraceContent::Chord(chord) => self.visit_chord(chord),
                GraceContent::Token(token) => self.write(token),
            }
        }
        self.write(&group.right_brace);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abc::diagnostics::Collector;
    use crate::abc::parsing::parse;
    use crate::abc::scanning::scan;
    use rstest::rstest;

    fn round_trip(source: &str) -> String {
        let mut collector = Collector::new();
        let tokens = scan(source, &mut collector);
        format(&parse(tokens, &mut collector))
    }

    #[rstest]
    #[case("")]
    #[case("X:1\nT:Speed the Plough\nM:4/4\nL:1/8\nK:G\n|:GABG AGAB|c2ec B2dB:|\n")]
    #[case("X:1\r\nK:D\r\n\"D\"d2 {/e}f>g [DFA]2 (3abc|]\r\n")]
    #[case("%%abc-2.1\n\nX:1\nK:C\n!trill!c4 Z2 | y [1 C :|2 D |]\n\nfree text\n")]
    #[case("no tune here\nA B c\n")]
    #[case("X:1\nK:C\n[CE|{g ]A2-|(AB ^ ¤ \"open\n")]
    fn output_equals_input(#[case] source: &str) {
        assert_eq!(round_trip(source), source);
    }

    #[test]
    fn formatting_is_idempotent() {
        let once = round_trip("X:1\nK:C\nA,B,C D/E/F/|\n");
        assert_eq!(round_trip(&once), once);
    }
}
