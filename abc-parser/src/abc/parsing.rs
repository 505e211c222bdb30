//! Parser
//!
//!     A hand-written recursive-descent parser over the scanner's token list. It builds the
//!     concrete tree described in [ast](crate::abc::ast) and never gives up: a token that
//!     fits no production is reported and kept in the tree as a bare token, and parsing
//!     carries on with the next one.
//!
//!     File and tune structure lives here; the productions for a single music line
//!     (notes, chords, grace groups, slurs, inline fields) are in [music].
//!
//! Lookahead
//!
//!     Bracketed constructs are checked before they are entered. A chord or grace group is
//!     only parsed as such when its closing bracket is found on the same line with nothing
//!     but admissible content in between; otherwise the opening bracket is reported and kept
//!     bare, and what follows is parsed as ordinary items. Checking first means no
//!     production is ever parsed twice, so no problem is ever reported twice.

mod music;

use super::ast::{
    BodyElement, Comment, FileHeader, FileStructure, HeaderLine, InfoLine, Tune, TuneBody,
    TuneHeader,
};
use super::diagnostics::Collector;
use super::token::{Token, TokenKind};

/// Parses a token list (as produced by [`scan`](crate::abc::scanning::scan)) into a tree.
pub fn parse(tokens: Vec<Token>, collector: &mut Collector) -> FileStructure {
    Parser::new(tokens, collector).parse_file()
}

pub(crate) struct Parser<'c> {
    tokens: Vec<Token>,
    current: usize,
    /// Open slur groups around the cursor.
    slur_depth: usize,
    collector: &'c mut Collector,
}

impl<'c> Parser<'c> {
    fn new(mut tokens: Vec<Token>, collector: &'c mut Collector) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let (line, column, end) = tokens
                .last()
                .map(|t| {
                    let end = t.end();
                    (end.line, end.column, t.span.end)
                })
                .unwrap_or((0, 0, 0));
            tokens.push(Token::new(TokenKind::Eof, "", line, column, end..end));
        }
        Self {
            tokens,
            current: 0,
            slur_depth: 0,
            collector,
        }
    }

    // ---- cursor ----------------------------------------------------------------------

    fn kind_at(&self, index: usize) -> TokenKind {
        self.tokens
            .get(index)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    fn peek_kind(&self) -> TokenKind {
        self.kind_at(self.current)
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn is_at_end(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    /// Returns the current token and moves past it. The end marker is never consumed.
    fn advance(&mut self) -> Token {
        let index = self.current.min(self.tokens.len() - 1);
        let token = self.tokens[index].clone();
        if token.kind != TokenKind::Eof {
            self.current += 1;
        }
        token
    }

    fn accept(&mut self, kind: TokenKind) -> Option<Token> {
        self.check(kind).then(|| self.advance())
    }

    fn accept_any(&mut self, kinds: &[TokenKind]) -> Option<Token> {
        kinds.contains(&self.peek_kind()).then(|| self.advance())
    }

    fn previous_kind(&self) -> Option<TokenKind> {
        self.current
            .checked_sub(1)
            .and_then(|index| self.tokens.get(index))
            .map(|t| t.kind)
    }

    fn is_tune_start_at(&self, index: usize) -> bool {
        self.tokens
            .get(index)
            .is_some_and(|t| t.kind == TokenKind::InfoKey && t.lexeme.starts_with('X'))
    }

    fn is_tune_start(&self) -> bool {
        self.is_tune_start_at(self.current)
    }

    fn next_tune_start(&self) -> Option<usize> {
        (self.current..self.tokens.len()).find(|&index| self.is_tune_start_at(index))
    }

    /// Whitespace up to a line break or the end of the text.
    fn at_blank_line(&self) -> bool {
        let mut index = self.current;
        while self.kind_at(index) == TokenKind::Whitespace {
            index += 1;
        }
        self.kind_at(index).is_line_end()
    }

    fn take_until(&mut self, end: usize) -> Vec<Token> {
        let mut taken = Vec::new();
        while self.current < end && !self.is_at_end() {
            taken.push(self.advance());
        }
        taken
    }

    fn take_blank_lines(&mut self, into: &mut Vec<Token>) {
        while !self.is_at_end() && self.at_blank_line() {
            while self.check(TokenKind::Whitespace) {
                into.push(self.advance());
            }
            if let Some(eol) = self.accept(TokenKind::Eol) {
                into.push(eol);
            }
        }
    }

    // ---- file and tune structure -----------------------------------------------------

    fn parse_file(mut self) -> FileStructure {
        let mut file = FileStructure::default();

        let header_tokens = match self.next_tune_start() {
            Some(first) => self.take_until(first),
            None => {
                let mut blank = Vec::new();
                self.take_blank_lines(&mut blank);
                blank
            }
        };
        if !header_tokens.is_empty() {
            file.file_header = Some(FileHeader {
                tokens: header_tokens,
            });
        }

        while !self.is_at_end() {
            let before = self.current;
            let mut tune = self.parse_tune();
            if self.current == before {
                tune.trailing.push(self.advance());
            }
            file.tunes.push(tune);
        }

        log::debug!("parsed {} tunes", file.tunes.len());
        file
    }

    fn parse_tune(&mut self) -> Tune {
        let opened_by_reference = self.is_tune_start();
        let header = self.parse_tune_header();

        if opened_by_reference && header.field('K').is_none() {
            if let Some(HeaderLine::Info(first)) = header.lines.first() {
                self.collector.warning(
                    &first.key,
                    "missing-key",
                    "tune header has no K: field",
                );
            }
        }

        let body = if self.is_at_end() || self.is_tune_start() || self.at_blank_line() {
            None
        } else {
            Some(self.parse_tune_body())
        };

        let mut trailing = Vec::new();
        self.take_blank_lines(&mut trailing);
        if let Some(next) = self.next_tune_start() {
            trailing.extend(self.take_until(next));
        }

        Tune {
            header,
            body,
            trailing,
        }
    }

    /// Info lines and comment lines, up to and including the first `K:` line.
    fn parse_tune_header(&mut self) -> TuneHeader {
        let mut header = TuneHeader::default();
        loop {
            match self.peek_kind() {
                TokenKind::InfoKey => {
                    if !header.is_empty() && self.is_tune_start() {
                        break;
                    }
                    let line = self.parse_info_line();
                    let is_key = line.field_code() == 'K';
                    header.lines.push(HeaderLine::Info(line));
                    if is_key {
                        break;
                    }
                }
                kind if kind.is_comment() => {
                    header.lines.push(HeaderLine::Comment(self.parse_comment_line()));
                }
                _ => break,
            }
        }
        header
    }

    fn parse_tune_body(&mut self) -> TuneBody {
        let mut body = TuneBody::default();
        let mut at_line_start = true;
        loop {
            if self.is_at_end() || self.is_tune_start() {
                break;
            }
            if at_line_start && self.at_blank_line() {
                break;
            }
            let element = match self.peek_kind() {
                TokenKind::InfoKey => BodyElement::InfoLine(self.parse_info_line()),
                kind if kind.is_comment() => BodyElement::Comment(self.parse_comment_line()),
                _ => BodyElement::MusicCode(self.parse_music_code()),
            };
            body.sequence.push(element);
            at_line_start = self.previous_kind() == Some(TokenKind::Eol);
        }
        body
    }

    fn parse_info_line(&mut self) -> InfoLine {
        let key = self.advance();
        let mut value = Vec::new();
        while let Some(token) = self.accept_any(&[TokenKind::FreeText, TokenKind::Whitespace]) {
            value.push(token);
        }
        let comment = self.accept_any(&[TokenKind::Comment, TokenKind::StylesheetDirective]);
        let eol = self.accept(TokenKind::Eol);
        InfoLine {
            key,
            value,
            comment,
            eol,
        }
    }

    fn parse_comment_line(&mut self) -> Comment {
        let token = self.advance();
        let eol = self.accept(TokenKind::Eol);
        Comment { token, eol }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abc::ast::{MusicItem, NoteHead};
    use crate::abc::scanning::scan;
    use crate::abc::visitors::formatter::format;

    fn parse_source(source: &str) -> (FileStructure, Collector) {
        let mut collector = Collector::new();
        let tokens = scan(source, &mut collector);
        let tree = parse(tokens, &mut collector);
        (tree, collector)
    }

    fn first_line(tree: &FileStructure) -> &[MusicItem] {
        let body = tree.tunes[0].body.as_ref().unwrap();
        &body.music_lines().next().unwrap().contents
    }

    #[test]
    fn empty_text_has_no_tunes() {
        let (tree, collector) = parse_source("");
        assert!(tree.tunes.is_empty());
        assert!(tree.file_header.is_none());
        assert!(collector.is_empty());
    }

    #[test]
    fn header_then_body() {
        let (tree, collector) = parse_source("X:1\nT:Reel\nK:D\nABc|\n");
        assert!(collector.is_empty());
        let tune = &tree.tunes[0];
        assert_eq!(tune.reference_number(), Some(1));
        assert_eq!(tune.title().as_deref(), Some("Reel"));
        assert_eq!(tune.header.lines.len(), 3);
        let notes = first_line(&tree)
            .iter()
            .filter(|item| matches!(item, MusicItem::Note(_)))
            .count();
        assert_eq!(notes, 3);
    }

    #[test]
    fn text_before_first_tune_is_file_header() {
        let (tree, _) = parse_source("%abc-2.1\nA collection\n\nX:1\nK:C\nC\n");
        let header = tree.file_header.as_ref().unwrap();
        assert_eq!(header.tokens[0].kind, TokenKind::Comment);
        assert_eq!(tree.tunes.len(), 1);
    }

    #[test]
    fn blank_line_ends_the_body() {
        let (tree, _) = parse_source("X:1\nK:C\nCDE\n\nsome words\nX:2\nK:G\nGAB\n");
        assert_eq!(tree.tunes.len(), 2);
        let trailing: String = tree.tunes[0].trailing.iter().map(|t| t.lexeme.as_str()).collect();
        assert_eq!(trailing, "\nsome words\n");
        assert_eq!(tree.tunes[1].reference_number(), Some(2));
    }

    #[test]
    fn missing_key_is_a_warning() {
        let (_, collector) = parse_source("X:1\nT:No key\nABC\n");
        assert!(!collector.has_errors());
        assert_eq!(collector.warnings().count(), 1);
        assert_eq!(collector.problems()[0].code, "missing-key");
    }

    #[test]
    fn fragments_without_reference_number() {
        let (tree, collector) = parse_source("\nABC|\n\nDEF|\n");
        assert!(collector.is_empty());
        assert!(tree.file_header.is_some());
        assert_eq!(tree.tunes.len(), 2);
        assert!(tree.tunes.iter().all(|tune| tune.header.is_empty()));
    }

    #[test]
    fn body_keeps_info_lines_and_comments() {
        let (tree, _) = parse_source("X:1\nK:C\nCD % first\nw:la la\n%%MIDI program 1\nEF\n");
        let body = tree.tunes[0].body.as_ref().unwrap();
        let kinds: Vec<_> = body
            .sequence
            .iter()
            .map(|element| match element {
                BodyElement::MusicCode(_) => "music",
                BodyElement::InfoLine(_) => "info",
                BodyElement::Comment(_) => "comment",
            })
            .collect();
        assert_eq!(kinds, ["music", "comment", "info", "comment", "music"]);
    }

    #[test]
    fn continuation_keeps_one_music_line() {
        let (tree, _) = parse_source("X:1\nK:C\nAB\\\ncd\n");
        assert_eq!(tree.tunes[0].body.as_ref().unwrap().music_lines().count(), 1);
    }

    #[test]
    fn rests_are_notes_with_rest_heads() {
        let (tree, _) = parse_source("X:1\nK:C\nz2\n");
        match &first_line(&tree)[0] {
            MusicItem::Note(note) => {
                assert!(matches!(note.head, NoteHead::Rest(_)));
                assert_eq!(note.rhythm.numerator.as_ref().unwrap().lexeme, "2");
            }
            other => panic!("expected a rest, got {other:?}"),
        }
    }

    #[test]
    fn round_trips_through_the_formatter() {
        let source = "junk ¤\nX:1\nK:C\n[CE|{g ]A2-|(AB\n\nX:2\n";
        let (tree, _) = parse_source(source);
        assert_eq!(format(&tree), source);
    }
}
