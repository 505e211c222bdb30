//! Conversions between tree positions and protocol values

use abc_parser::abc::ast::{Position as AstPosition, Range as AstRange};
use abc_parser::{Diagnostic, DiagnosticSeverity};
use tower_lsp::lsp_types::{self, NumberOrString, Position, Range};

pub fn to_lsp_position(position: AstPosition) -> Position {
    Position::new(position.line as u32, position.column as u32)
}

pub fn to_lsp_range(range: &AstRange) -> Range {
    Range {
        start: to_lsp_position(range.start),
        end: to_lsp_position(range.end),
    }
}

pub fn from_lsp_position(position: Position) -> AstPosition {
    AstPosition::new(position.line as usize, position.character as usize)
}

pub fn to_lsp_diagnostic(diagnostic: &Diagnostic) -> lsp_types::Diagnostic {
    let severity = match diagnostic.severity {
        DiagnosticSeverity::Error => lsp_types::DiagnosticSeverity::ERROR,
        DiagnosticSeverity::Warning => lsp_types::DiagnosticSeverity::WARNING,
    };
    lsp_types::Diagnostic {
        range: to_lsp_range(&diagnostic.range),
        severity: Some(severity),
        code: diagnostic.code.clone().map(NumberOrString::String),
        source: Some(diagnostic.source.clone()),
        message: diagnostic.message.clone(),
        ..lsp_types::Diagnostic::default()
    }
}

pub fn to_lsp_diagnostics(diagnostics: &[Diagnostic]) -> Vec<lsp_types::Diagnostic> {
    diagnostics.iter().map(to_lsp_diagnostic).collect()
}
