//! Semantic classification for highlighting
//!
//!     [`classify`] flattens the tree into the tokens an editor should colour, and
//!     [`category`] maps each token kind onto one of a small fixed set of highlight
//!     categories. Editors only learn about the categories; token kinds stay internal.
//!
//!     Some runs of tokens read as one unit and are merged before classification:
//!
//!         rhythm parts        `3/4>`      one number
//!         multi-measure rest  `Z4`        one rest
//!         spacer and width    `y20`       one spacer
//!         inline field key    `K:`        one key
//!         info line values    `My Tune`   one text run, surrounding spaces dropped
//!
//!     Whitespace and line breaks carry no colour and are left out.

use std::fmt;

use crate::abc::ast::{
    BodyElement, Chord, ChordContent, Comment, FileStructure, GraceContent, GraceGroup,
    HeaderLine, InfoLine, MusicItem, Note, NoteHead, Rhythm, Tune,
};
use crate::abc::token::{merge_tokens, Token, TokenKind};

/// Highlight categories, as understood by editors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HighlightCategory {
    String,
    Number,
    Comment,
    Keyword,
    Decorator,
    Variable,
    Regexp,
    /// Not highlighted.
    Plain,
}

/// Categories editors are told about, in legend order. `Plain` is never sent.
pub const HIGHLIGHT_CATEGORIES: &[HighlightCategory] = &[
    HighlightCategory::String,
    HighlightCategory::Number,
    HighlightCategory::Comment,
    HighlightCategory::Keyword,
    HighlightCategory::Decorator,
    HighlightCategory::Variable,
    HighlightCategory::Regexp,
];

impl HighlightCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            HighlightCategory::String => "string",
            HighlightCategory::Number => "number",
            HighlightCategory::Comment => "comment",
            HighlightCategory::Keyword => "keyword",
            HighlightCategory::Decorator => "decorator",
            HighlightCategory::Variable => "variable",
            HighlightCategory::Regexp => "regexp",
            HighlightCategory::Plain => "none",
        }
    }

    /// Position in [`HIGHLIGHT_CATEGORIES`]; `None` for [`HighlightCategory::Plain`].
    pub fn legend_index(self) -> Option<u32> {
        HIGHLIGHT_CATEGORIES
            .iter()
            .position(|category| *category == self)
            .map(|index| index as u32)
    }
}

impl fmt::Display for HighlightCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Total mapping from token kind to highlight category.
pub fn category(kind: TokenKind) -> HighlightCategory {
    use HighlightCategory as C;
    match kind {
        TokenKind::InfoKey => C::Keyword,
        TokenKind::FreeText => C::String,
        TokenKind::Whitespace | TokenKind::Eol | TokenKind::Eof => C::Plain,
        TokenKind::AntislashEol => C::Keyword,
        TokenKind::Comment | TokenKind::StylesheetDirective => C::Comment,
        TokenKind::Barline
        | TokenKind::BarDbl
        | TokenKind::BarRightBracket
        | TokenKind::LeftBracketBar
        | TokenKind::BarColon
        | TokenKind::ColonBar
        | TokenKind::ColonDbl
        | TokenKind::BarDigit
        | TokenKind::ColonBarDigit
        | TokenKind::NthRepeat => C::String,
        TokenKind::Sharp
        | TokenKind::SharpDbl
        | TokenKind::Flat
        | TokenKind::FlatDbl
        | TokenKind::Natural => C::Decorator,
        TokenKind::NoteLetter | TokenKind::RestLetter | TokenKind::MultiMeasureRest => {
            C::Variable
        }
        TokenKind::SpacerLetter => C::Decorator,
        TokenKind::Letter => C::String,
        TokenKind::Apostrophe | TokenKind::Comma => C::String,
        TokenKind::Number
        | TokenKind::Slash
        | TokenKind::Greater
        | TokenKind::Less
        | TokenKind::Tuplet => C::Number,
        TokenKind::LeftParen
        | TokenKind::RightParen
        | TokenKind::LeftBracket
        | TokenKind::RightBracket
        | TokenKind::LeftBrace
        | TokenKind::RightBrace => C::String,
        TokenKind::Colon => C::String,
        TokenKind::Minus | TokenKind::Dot => C::Decorator,
        TokenKind::Tilde | TokenKind::Dollar | TokenKind::Plus => C::String,
        TokenKind::Ampersand | TokenKind::EscapedChar => C::Keyword,
        TokenKind::Backtick => C::Plain,
        TokenKind::Annotation => C::String,
        TokenKind::Symbol => C::Regexp,
        TokenKind::ReservedChar => C::String,
        TokenKind::Invalid => C::Plain,
    }
}

/// Flattens the tree into classified tokens, in document order.
pub fn classify(tree: &FileStructure) -> Vec<Token> {
    let mut collector = TokenCollector::default();
    collector.visit_file(tree);
    collector.finish()
}

#[derive(Default)]
struct TokenCollector {
    tokens: Vec<Token>,
}

impl TokenCollector {
    fn push(&mut self, token: &Token) {
        if !matches!(
            token.kind,
            TokenKind::Whitespace | TokenKind::Eol | TokenKind::Eof
        ) {
            self.tokens.push(token.clone());
        }
    }

    fn push_opt(&mut self, token: &Option<Token>) {
        if let Some(token) = token {
            self.push(token);
        }
    }

    fn push_merged(&mut self, parts: &[Token], kind: Option<TokenKind>) {
        if let Some(merged) = merge_tokens(parts) {
            match kind {
                Some(kind) => self.tokens.push(merged.retag(kind)),
                None => self.tokens.push(merged),
            }
        }
    }

    /// Merges `parts` after dropping whitespace at either end.
    fn push_text(&mut self, parts: &[Token]) {
        let is_blank = |token: &Token| token.kind.is_whitespace();
        let start = parts.iter().position(|t| !is_blank(t)).unwrap_or(parts.len());
        let end = parts.iter().rposition(|t| !is_blank(t)).map_or(start, |i| i + 1);
        self.push_merged(&parts[start..end], Some(TokenKind::FreeText));
    }

    fn finish(mut self) -> Vec<Token> {
        self.tokens.sort_by_key(|token| (token.line, token.column));
        self.tokens
    }

    fn visit_file(&mut self, file: &FileStructure) {
        if let Some(header) = &file.file_header {
            for token in &header.tokens {
                self.push(token);
            }
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
        for token in &tune.trailing {
            self.push(token);
        }
    }

    fn visit_info_line(&mut self, info: &InfoLine) {
        self.push(&info.key);
        self.push_text(&info.value);
        self.push_opt(&info.comment);
    }

    fn visit_comment(&mut self, comment: &Comment) {
        self.push(&comment.token);
    }

    fn visit_items(&mut self, items: &[MusicItem]) {
        for item in items {
            self.visit_item(item);
        }
    }

    fn visit_item(&mut self, item: &MusicItem) {
        match item {
            MusicItem::Token(token) => self.push(token),
            MusicItem::BarLine(bar) => self.push(&bar.barline),
            MusicItem::Annotation(annotation) => self.push(&annotation.text),
            MusicItem::Decoration(decoration) => self.push(&decoration.decoration),
            MusicItem::Note(note) => self.visit_note(note),
            MusicItem::GraceGroup(group) => self.visit_grace_group(group),
            MusicItem::SlurGroup(group) => {
                self.push(&group.left_paren);
                self.visit_items(&group.contents);
                self.push_opt(&group.right_paren);
            }
            MusicItem::Chord(chord) => self.visit_chord(chord),
            MusicItem::Symbol(symbol) => self.push(&symbol.symbol),
            MusicItem::MultiMeasureRest(rest) => {
                let parts: Vec<Token> = std::iter::once(&rest.rest)
                    .chain(rest.length.as_ref())
                    .cloned()
                    .collect();
                self.push_merged(&parts, None);
            }
            MusicItem::NthRepeat(repeat) => self.push(&repeat.repeat),
            MusicItem::InlineField(field) => {
                self.push(&field.left_bracket);
                self.push_merged(
                    &[field.field.clone(), field.colon.clone()],
                    Some(TokenKind::InfoKey),
                );
                self.push_text(&field.text);
                self.push_opt(&field.right_bracket);
            }
            MusicItem::Spacer(spacer) => {
                let parts: Vec<Token> = std::iter::once(&spacer.spacer)
                    .chain(spacer.width.as_ref())
                    .cloned()
                    .collect();
                self.push_merged(&parts, None);
            }
        }
    }

    fn visit_note(&mut self, note: &Note) {
        match &note.head {
            NoteHead::Pitch(pitch) => {
                self.push_opt(&pitch.alteration);
                self.push(&pitch.letter);
                self.push_opt(&pitch.octave);
            }
            NoteHead::Rest(rest) => self.push(&rest.rest),
        }
        self.visit_rhythm(&note.rhythm);
        self.push_opt(&note.tie);
    }

    fn visit_rhythm(&mut self, rhythm: &Rhythm) {
        let parts: Vec<Token> = rhythm.tokens().cloned().collect();
        self.push_merged(&parts, None);
    }

    fn visit_chord(&mut self, chord: &Chord) {
        self.push(&chord.left_bracket);
        for content in &chord.contents {
            match content {
                ChordContent::Note(note) => self.visit_note(note),
                ChordContent::Annotation(annotation) => self.push(&annotation.text),
                ChordContent::Token(token) => self.push(token),
            }
        }
        self.push(&chord.right_bracket);
        self.visit_rhythm(&chord.rhythm);
        self.push_opt(&chord.tie);
    }

    fn visit_grace_group(&mut self, group: &GraceGroup) {
        self.push(&group.left_brace);
        self.push_opt(&group.acciaccatura);
        for content in &group.contents {
            match content {
                GraceContent::Note(note) => self.visit_note(note),
                GraceContent::Chord(chord) => self.visit_chord(chord),
                GraceContent::Token(token) => self.push(token),
            }
        }
        self.push(&group.right_brace);
    }
}
