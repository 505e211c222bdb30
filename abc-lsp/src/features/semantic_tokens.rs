//! Semantic token encoding
//!
//!     The legend is the list of highlight categories, in the order their indices are
//!     published. Classified tokens are encoded relative to the previous token, as the
//!     protocol requires, and tokens in the "none" category are left out.

use abc_parser::abc::visitors::semantic_tokens::{category, HIGHLIGHT_CATEGORIES};
use abc_parser::Token;
use tower_lsp::lsp_types::{SemanticToken, SemanticTokenType, SemanticTokensLegend};

pub fn semantic_tokens_legend() -> SemanticTokensLegend {
    SemanticTokensLegend {
        token_types: HIGHLIGHT_CATEGORIES
            .iter()
            .map(|category| SemanticTokenType::new(category.as_str()))
            .collect(),
        token_modifiers: Vec::new(),
    }
}

pub fn encode_semantic_tokens(tokens: &[Token]) -> Vec<SemanticToken> {
    let mut data = Vec::new();
    let mut prev_line = 0u32;
    let mut prev_start = 0u32;

    for token in tokens {
        let Some(token_type) = category(token.kind).legend_index() else {
            continue;
        };
        for (line, start, length) in split_token_on_lines(token) {
            if length == 0 {
                continue;
            }
            let delta_line = line.saturating_sub(prev_line);
            let delta_start = if delta_line == 0 {
                start.saturating_sub(prev_start)
            } else {
                start
            };
            data.push(SemanticToken {
                delta_line,
                delta_start,
                length,
                token_type,
                token_modifiers_bitset: 0,
            });
            prev_line = line;
            prev_start = start;
        }
    }

    data
}

/// Break a token into `(line, column, length)` slices, one per line it touches.
///
/// Encoded tokens may not span lines. Only a backslash continuation does; its line break is
/// dropped, so it ends up as a single one-column slice.
fn split_token_on_lines(token: &Token) -> Vec<(u32, u32, u32)> {
    token
        .lexeme
        .split('\n')
        .enumerate()
        .map(|(offset, text)| {
            let text = text.strip_suffix('\r').unwrap_or(text);
            let line = (token.line + offset) as u32;
            let start = if offset == 0 { token.column as u32 } else { 0 };
            (line, start, text.encode_utf16().count() as u32)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::test_support::sample_document;
    use abc_parser::abc::visitors::semantic_tokens::HighlightCategory;
    use abc_parser::{AbcDocument, TokenKind};
    use proptest::prelude::*;

    /// Undo the delta encoding into `(line, column, length, type)`.
    fn absolute(encoded: &[SemanticToken]) -> Vec<(u32, u32, u32, u32)> {
        let mut line = 0;
        let mut column = 0;
        encoded
            .iter()
            .map(|token| {
                line += token.delta_line;
                column = if token.delta_line == 0 {
                    column + token.delta_start
                } else {
                    token.delta_start
                };
                (line, column, token.length, token.token_type)
            })
            .collect()
    }

    #[test]
    fn legend_lists_every_published_category() {
        let legend = semantic_tokens_legend();
        let names: Vec<_> = legend.token_types.iter().map(|t| t.as_str()).collect();
        assert_eq!(
            names,
            ["string", "number", "comment", "keyword", "decorator", "variable", "regexp"]
        );
        assert!(legend.token_modifiers.is_empty());
    }

    #[test]
    fn encodes_positions_relative_to_the_previous_token() {
        let document = AbcDocument::analyze("X:1\nK:C\nA2 B|\n");
        let encoded = encode_semantic_tokens(document.classified_tokens());
        let keyword = HighlightCategory::Keyword.legend_index().unwrap();
        let variable = HighlightCategory::Variable.legend_index().unwrap();
        let number = HighlightCategory::Number.legend_index().unwrap();
        let string = HighlightCategory::String.legend_index().unwrap();
        assert_eq!(
            absolute(&encoded),
            [
                (0, 0, 2, keyword),
                (0, 2, 1, string),
                (1, 0, 2, keyword),
                (1, 2, 1, string),
                (2, 0, 1, variable),
                (2, 1, 1, number),
                (2, 3, 1, variable),
                (2, 4, 1, string),
            ]
        );
    }

    #[test]
    fn continuation_is_a_single_column() {
        let token = Token::new(TokenKind::AntislashEol, "\\\r\n", 3, 7, 40..43);
        assert_eq!(split_token_on_lines(&token), [(3, 7, 1), (4, 0, 0)]);
        let encoded = encode_semantic_tokens(&[token]);
        assert_eq!(encoded.len(), 1);
        assert_eq!(encoded[0].length, 1);
    }

    #[test]
    fn lengths_count_utf16_units() {
        let document = AbcDocument::analyze("X:1\nT:𝄞 tune\nK:C\n");
        let encoded = absolute(&encode_semantic_tokens(document.classified_tokens()));
        assert!(encoded.contains(&(1, 2, 7, HighlightCategory::String.legend_index().unwrap())));
    }

    #[test]
    fn sample_tune_encodes_every_highlighted_token() {
        let document = sample_document();
        let highlighted = document
            .classified_tokens()
            .iter()
            .filter(|t| category(t.kind).legend_index().is_some())
            .count();
        assert_eq!(encode_semantic_tokens(document.classified_tokens()).len(), highlighted);
    }

    proptest! {
        #[test]
        fn encoded_tokens_never_move_backwards(source in "[A-Ga-g^_=,'/0-9 |:\\[\\]{}()\"!~%\n]{0,80}") {
            let document = AbcDocument::analyze(format!("X:1\nK:C\n{source}"));
            let decoded = absolute(&encode_semantic_tokens(document.classified_tokens()));
            for pair in decoded.windows(2) {
                prop_assert!((pair[0].0, pair[0].1) <= (pair[1].0, pair[1].1));
            }
            prop_assert!(decoded.iter().all(|token| token.2 > 0));
        }
    }
}
