//! Problem collection
//!
//!     The scanner and the parser never stop at the first problem. Instead they report into a
//!     [`Collector`], which keeps every record in the order it was reported. One collector
//!     lives for exactly one analysis pass; a new pass starts with a new collector so nothing
//!     leaks between edits of the same document.
//!
//!     Once analysis is done the records are turned into [`Diagnostic`] values, which carry
//!     the protocol-neutral shape editors expect: range, severity, message, code and source.

use std::fmt;

use serde::Serialize;

use super::ast::range::Range;
use super::token::Token;

/// Severity of a collected problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSeverity::Error => write!(f, "error"),
            DiagnosticSeverity::Warning => write!(f, "warning"),
        }
    }
}

/// One reported problem, anchored at the token that triggered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub token: Token,
    pub message: String,
    pub severity: DiagnosticSeverity,
    pub code: &'static str,
}

/// Accumulates problems for a single analysis pass.
#[derive(Debug, Default)]
pub struct Collector {
    problems: Vec<Problem>,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(
        &mut self,
        token: &Token,
        code: &'static str,
        message: impl Into<String>,
        severity: DiagnosticSeverity,
    ) {
        let message = message.into();
        log::trace!("{severity} {code} at {}:{}: {message}", token.line, token.column);
        self.problems.push(Problem {
            token: token.clone(),
            message,
            severity,
            code,
        });
    }

    pub fn error(&mut self, token: &Token, code: &'static str, message: impl Into<String>) {
        self.report(token, code, message, DiagnosticSeverity::Error);
    }

    pub fn warning(&mut self, token: &Token, code: &'static str, message: impl Into<String>) {
        self.report(token, code, message, DiagnosticSeverity::Warning);
    }

    pub fn errors(&self) -> impl Iterator<Item = &Problem> {
        self.with_severity(DiagnosticSeverity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Problem> {
        self.with_severity(DiagnosticSeverity::Warning)
    }

    fn with_severity(&self, severity: DiagnosticSeverity) -> impl Iterator<Item = &Problem> {
        self.problems
            .iter()
            .filter(move |problem| problem.severity == severity)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// All records, in report order.
    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    /// Converts every record into a diagnostic tagged with `source`.
    pub fn diagnostics(&self, source: &str) -> Vec<Diagnostic> {
        self.problems
            .iter()
            .map(|problem| Diagnostic::from_problem(problem).with_source(source))
            .collect()
    }
}

/// Protocol-neutral diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub range: Range,
    pub severity: DiagnosticSeverity,
    pub message: String,
    pub code: Option<String>,
    pub source: String,
}

impl Diagnostic {
    pub fn new(range: Range, severity: DiagnosticSeverity, message: impl Into<String>) -> Self {
        Self {
            range,
            severity,
            message: message.into(),
            code: None,
            source: "abc".to_string(),
        }
    }

    /// Spans the offending token's lexeme. Zero-width tokens (end of file) still get a
    /// zero-width range at their position.
    pub fn from_problem(problem: &Problem) -> Self {
        Self::new(problem.token.range(), problem.severity, problem.message.clone())
            .with_code(problem.code)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}]: {} at {}",
            self.severity, self.source, self.message, self.range.start
        )
    }
}
