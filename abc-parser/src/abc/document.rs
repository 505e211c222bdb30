//! Per-document analysis
//!
//!     [`AbcDocument`] runs the full pipeline over one text and keeps the results: the tree,
//!     the diagnostics and the classified tokens. Every analysis starts from a fresh
//!     [`Collector`], so re-analysing an edited text never carries problems over.
//!
//!     Operations that rewrite text (formatting, rhythm transforms) are only offered for
//!     documents without errors. Warnings do not block them.

use super::ast::{FileStructure, Position};
use super::diagnostics::{Collector, Diagnostic, Problem};
use super::parsing::parse;
use super::scanning::scan;
use super::token::Token;
use super::visitors::formatter::format;
use super::visitors::rhythm::{RhythmEdit, RhythmLimits, RhythmOperator, RhythmTransform};
use super::visitors::semantic_tokens::classify;

/// Knobs for an analysis pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOptions {
    /// Tag put on every diagnostic's `source`.
    pub diagnostics_source: String,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            diagnostics_source: "abc".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AbcDocument {
    text: String,
    tree: FileStructure,
    problems: Vec<Problem>,
    diagnostics: Vec<Diagnostic>,
    classified: Vec<Token>,
    has_errors: bool,
}

impl AbcDocument {
    pub fn analyze(text: impl Into<String>) -> Self {
        Self::analyze_with(text, &AnalysisOptions::default())
    }

    /// Scan, parse, collect diagnostics, classify.
    pub fn analyze_with(text: impl Into<String>, options: &AnalysisOptions) -> Self {
        let text = text.into();
        let mut collector = Collector::new();
        let tokens = scan(&text, &mut collector);
        let tree = parse(tokens, &mut collector);
        let diagnostics = collector.diagnostics(&options.diagnostics_source);
        let classified = classify(&tree);
        let has_errors = collector.has_errors();

        log::debug!(
            "analyzed {} bytes: {} tunes, {} diagnostics, {} classified tokens",
            text.len(),
            tree.tunes.len(),
            diagnostics.len(),
            classified.len()
        );

        Self {
            text,
            tree,
            problems: collector.problems().to_vec(),
            diagnostics,
            classified,
            has_errors,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tree(&self) -> &FileStructure {
        &self.tree
    }

    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn classified_tokens(&self) -> &[Token] {
        &self.classified
    }

    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    /// Formatted text, or `None` while the document has errors.
    pub fn formatted(&self) -> Option<String> {
        if self.has_errors {
            log::warn!("refusing to format a document with errors");
            return None;
        }
        Some(format(&self.tree))
    }

    /// Rhythm rewrite for the selection, or `None` while the document has errors.
    pub fn transform_rhythm(
        &self,
        operator: RhythmOperator,
        start: Position,
        end: Position,
        limits: RhythmLimits,
    ) -> Option<RhythmEdit> {
        if self.has_errors {
            log::warn!("refusing to {operator} rhythms in a document with errors");
            return None;
        }
        Some(
            RhythmTransform::new(operator)
                .with_limits(limits)
                .apply(&self.tree, start, end),
        )
    }
}
