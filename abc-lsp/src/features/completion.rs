//! Decoration completion
//!
//!     Typing `!` inside a tune body offers the standard `!name!` decorations. The item
//!     inserts the name and the closing `!`, since the opening one is already typed.

use abc_parser::abc::ast::{AstNode, Position, SourceLocation};
use abc_parser::AbcDocument;
use once_cell::sync::Lazy;
use tower_lsp::lsp_types::{
    CompletionItem, CompletionItemKind, CompletionItemLabelDetails, Documentation,
};

pub const TRIGGER_CHARACTER: &str = "!";

/// A decoration offered for completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecorationSymbol {
    pub name: &'static str,
    pub documentation: &'static str,
}

const fn symbol(name: &'static str, documentation: &'static str) -> DecorationSymbol {
    DecorationSymbol {
        name,
        documentation,
    }
}

pub const DECORATION_SYMBOLS: &[DecorationSymbol] = &[
    symbol("trill", "\"tr\" (trill mark)"),
    symbol("trill(", "start of an extended trill"),
    symbol("trill)", "end of an extended trill"),
    symbol("lowermordent", "short /|/|/ squiggle with a vertical line through it"),
    symbol("uppermordent", "short /|/|/ squiggle"),
    symbol("mordent", "same as !lowermordent!"),
    symbol("pralltriller", "same as !uppermordent!"),
    symbol("roll", "a roll mark (arc) as used in Irish music"),
    symbol("turn", "a turn mark (also known as gruppetto)"),
    symbol("turnx", "a turn mark with a line through it"),
    symbol("invertedturn", "an inverted turn mark"),
    symbol("invertedturnx", "an inverted turn mark with a line through it"),
    symbol("arpeggio", "vertical squiggle"),
    symbol(">", "> mark"),
    symbol("accent", "same as !>!"),
    symbol("emphasis", "same as !>!"),
    symbol("fermata", "fermata or hold (arc above dot)"),
    symbol("invertedfermata", "upside down fermata"),
    symbol("tenuto", "horizontal line to indicate holding note for full duration"),
    symbol("0", "fingering"),
    symbol("1", "fingering"),
    symbol("2", "fingering"),
    symbol("3", "fingering"),
    symbol("4", "fingering"),
    symbol("5", "fingering"),
    symbol("+", "left-hand pizzicato, or rasp for French horns"),
    symbol("plus", "same as !+!"),
    symbol("snap", "snap-pizzicato mark, visually similar to !thumb!"),
    symbol("slide", "slide up to a note, visually similar to a half slur"),
    symbol("wedge", "small filled-in wedge mark"),
    symbol("upbow", "V mark"),
    symbol("downbow", "squared n mark"),
    symbol("open", "small circle above note indicating open string or harmonic"),
    symbol("thumb", "cello thumb symbol"),
    symbol("breath", "a breath mark (apostrophe-like) after note"),
    symbol("pppp", "dynamics mark"),
    symbol("ppp", "dynamics mark"),
    symbol("pp", "dynamics mark"),
    symbol("p", "dynamics mark"),
    symbol("mp", "dynamics mark"),
    symbol("mf", "dynamics mark"),
    symbol("f", "dynamics mark"),
    symbol("ff", "dynamics mark"),
    symbol("fff", "dynamics mark"),
    symbol("ffff", "dynamics mark"),
    symbol("sfz", "dynamics mark"),
    symbol("crescendo(", "start of a < crescendo mark"),
    symbol("<(", "same as !crescendo(!"),
    symbol("crescendo)", "end of a < crescendo mark, placed after the last note"),
    symbol("<)", "same as !crescendo)!"),
    symbol("diminuendo(", "start of a > diminuendo mark"),
    symbol(">(", "same as !diminuendo(!"),
    symbol("diminuendo)", "end of a > diminuendo mark, placed after the last note"),
    symbol(">)", "same as !diminuendo)!"),
    symbol("segno", "2 ornate s-like symbols separated by a diagonal line"),
    symbol("coda", "a ring with a cross in it"),
    symbol("D.S.", "the letters D.S. (=Da Segno)"),
    symbol("D.C.", "the letters D.C. (=either Da Coda or Da Capo)"),
    symbol("dacoda", "the word \"Da\" followed by a Coda sign"),
    symbol("dacapo", "the words \"Da Capo\""),
    symbol("fine", "the word \"fine\""),
    symbol("shortphrase", "vertical line on the upper part of the staff"),
    symbol("mediumphrase", "same, but extending down to the centre line"),
    symbol("longphrase", "same, but extending 3/4 of the way down"),
];

static DECORATION_ITEMS: Lazy<Vec<CompletionItem>> = Lazy::new(|| {
    DECORATION_SYMBOLS
        .iter()
        .map(|symbol| CompletionItem {
            label: format!("!{}!", symbol.name),
            label_details: Some(CompletionItemLabelDetails {
                detail: None,
                description: Some("decoration".to_string()),
            }),
            kind: Some(CompletionItemKind::TEXT),
            documentation: Some(Documentation::String(symbol.documentation.to_string())),
            insert_text: Some(format!("{}!", symbol.name)),
            filter_text: Some(symbol.name.to_string()),
            ..CompletionItem::default()
        })
        .collect()
});

/// Decorations to offer at `position`, which is just after the typed trigger.
pub fn decoration_completions(document: &AbcDocument, position: Position) -> Vec<CompletionItem> {
    let text = document.text();
    let offset = SourceLocation::new(text).position_to_byte(position);
    if !text[..offset].ends_with(TRIGGER_CHARACTER) {
        return Vec::new();
    }
    if !in_tune_body(document, position) {
        return Vec::new();
    }
    DECORATION_ITEMS.clone()
}

fn in_tune_body(document: &AbcDocument, position: Position) -> bool {
    document
        .tree()
        .tunes
        .iter()
        .filter_map(|tune| tune.body.as_ref()?.range())
        .any(|range| range.start <= position && position < range.end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completions_at(text: &str, line: usize, column: usize) -> Vec<CompletionItem> {
        let document = AbcDocument::analyze(text);
        decoration_completions(&document, Position::new(line, column))
    }

    #[test]
    fn bang_in_body_offers_every_decoration() {
        let items = completions_at("X:1\nK:C\nAB !\n", 2, 4);
        assert_eq!(items.len(), DECORATION_SYMBOLS.len());
        let trill = &items[0];
        assert_eq!(trill.label, "!trill!");
        assert_eq!(trill.insert_text.as_deref(), Some("trill!"));
        assert_eq!(trill.kind, Some(CompletionItemKind::TEXT));
    }

    #[test]
    fn no_bang_no_items() {
        assert!(completions_at("X:1\nK:C\nAB c\n", 2, 4).is_empty());
    }

    #[test]
    fn header_lines_are_not_music() {
        assert!(completions_at("X:1\nT:Wow!\nK:C\nABC\n", 1, 6).is_empty());
    }

    #[test]
    fn file_header_is_not_music() {
        assert!(completions_at("%!\n\nX:1\nK:C\nABC\n", 0, 2).is_empty());
    }

    #[test]
    fn cursor_at_line_start_has_nothing_before_it() {
        assert!(completions_at("X:1\nK:C\n!\n", 2, 0).is_empty());
    }

    #[test]
    fn decoration_names_are_unique() {
        let mut names: Vec<_> = DECORATION_SYMBOLS.iter().map(|s| s.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), DECORATION_SYMBOLS.len());
    }
}
