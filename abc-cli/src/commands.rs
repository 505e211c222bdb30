//! Implementation of the subcommands
//!
//! Each command reads one file, analyses it and returns what to print. Nothing here
//! writes to stdout or exits, so `main` decides how outcomes and errors are surfaced.

use std::fmt;
use std::fs;
use std::path::Path;

use abc_config::{AbcConfig, Loader};
use abc_parser::abc::ast::{AstNode, Position, SourceLocation};
use abc_parser::abc::beams::beams;
use abc_parser::abc::visitors::rhythm::{RhythmOperator, UnknownOperator};
use abc_parser::abc::visitors::semantic_tokens::category;
use abc_parser::{AbcDocument, Token, TokenKind};
use config::ConfigError;
use serde::Serialize;

/// What a successful run prints, and whether it counts as success.
#[derive(Debug)]
pub struct Outcome {
    pub stdout: String,
    pub success: bool,
}

impl Outcome {
    fn ok(stdout: String) -> Self {
        Self {
            stdout,
            success: true,
        }
    }
}

#[derive(Debug)]
pub enum CliError {
    MissingCommand,
    Config(ConfigError),
    Read { path: String, source: std::io::Error },
    HasErrors { path: String, count: usize },
    InvalidRange(String),
    Operator(UnknownOperator),
    Json(serde_json::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::MissingCommand => write!(f, "no command given"),
            CliError::Config(error) => write!(f, "configuration: {error}"),
            CliError::Read { path, source } => write!(f, "cannot read {path}: {source}"),
            CliError::HasErrors { path, count } => write!(
                f,
                "{path} has {count} error(s); run `abc check {path}` and fix them first"
            ),
            CliError::InvalidRange(range) => {
                write!(f, "invalid range {range:?}, expected LINE:COL-LINE:COL")
            }
            CliError::Operator(error) => write!(f, "{error}"),
            CliError::Json(error) => write!(f, "cannot serialize output: {error}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(error) => Some(error),
            CliError::Read { source, .. } => Some(source),
            CliError::Operator(error) => Some(error),
            CliError::Json(error) => Some(error),
            _ => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(error: ConfigError) -> Self {
        CliError::Config(error)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(error: serde_json::Error) -> Self {
        CliError::Json(error)
    }
}

pub fn load_config(path: Option<&String>) -> Result<AbcConfig, CliError> {
    let loader = match path {
        Some(path) => Loader::new().with_file(path),
        None => Loader::new(),
    };
    Ok(loader.build()?)
}

fn analyze(path: &str, config: &AbcConfig) -> Result<AbcDocument, CliError> {
    let text = fs::read_to_string(Path::new(path)).map_err(|source| CliError::Read {
        path: path.to_string(),
        source,
    })?;
    Ok(AbcDocument::analyze_with(text, &config.analysis_options()))
}

fn error_count(document: &AbcDocument) -> usize {
    document
        .diagnostics()
        .iter()
        .filter(|d| d.severity == abc_parser::DiagnosticSeverity::Error)
        .count()
}

/// One line per diagnostic, `path:line:col: severity[code]: message`, one-based.
pub fn check(path: &str, config: &AbcConfig) -> Result<Outcome, CliError> {
    let document = analyze(path, config)?;
    let mut stdout = String::new();
    for diagnostic in document.diagnostics() {
        let start = diagnostic.range.start;
        let code = diagnostic.code.as_deref().unwrap_or("");
        stdout.push_str(&format!(
            "{path}:{}:{}: {}[{code}]: {}\n",
            start.line + 1,
            start.column + 1,
            diagnostic.severity,
            diagnostic.message
        ));
    }
    Ok(Outcome {
        stdout,
        success: !document.has_errors(),
    })
}

pub fn format(path: &str, config: &AbcConfig) -> Result<Outcome, CliError> {
    let document = analyze(path, config)?;
    document
        .formatted()
        .map(Outcome::ok)
        .ok_or_else(|| CliError::HasErrors {
            path: path.to_string(),
            count: error_count(&document),
        })
}

#[derive(Serialize)]
struct ClassifiedToken<'a> {
    kind: TokenKind,
    category: &'static str,
    lexeme: &'a str,
    line: usize,
    column: usize,
    length: usize,
}

impl<'a> From<&'a Token> for ClassifiedToken<'a> {
    fn from(token: &'a Token) -> Self {
        Self {
            kind: token.kind,
            category: category(token.kind).as_str(),
            lexeme: &token.lexeme,
            line: token.line,
            column: token.column,
            length: token.len_utf16(),
        }
    }
}

#[derive(Serialize)]
struct BeamGroup {
    start: Position,
    end: Position,
    text: String,
}

pub fn tokens(path: &str, config: &AbcConfig, with_beams: bool) -> Result<Outcome, CliError> {
    let document = analyze(path, config)?;
    let json = if with_beams {
        serde_json::to_string_pretty(&beam_groups(&document))?
    } else {
        let tokens: Vec<ClassifiedToken> = document
            .classified_tokens()
            .iter()
            .map(ClassifiedToken::from)
            .collect();
        serde_json::to_string_pretty(&tokens)?
    };
    Ok(Outcome::ok(json + "\n"))
}

fn beam_groups(document: &AbcDocument) -> Vec<BeamGroup> {
    let text = document.text();
    let mut groups = Vec::new();
    for tune in &document.tree().tunes {
        let Some(body) = &tune.body else { continue };
        for line in body.music_lines() {
            for beam in beams(&line.contents) {
                let first = line.contents[beam.first].range();
                let last = line.contents[beam.last].range();
                if let (Some(first), Some(last)) = (first, last) {
                    groups.push(BeamGroup {
                        start: first.start,
                        end: last.end,
                        text: text[first.span.start..last.span.end].to_string(),
                    });
                }
            }
        }
    }
    groups
}

pub fn rhythm(path: &str, config: &AbcConfig, op: &str, range: &str) -> Result<Outcome, CliError> {
    let operator: RhythmOperator = op.parse().map_err(CliError::Operator)?;
    let (start, end) = parse_range(range)?;
    let document = analyze(path, config)?;

    // Columns are typed as characters; the tree counts UTF-16 units.
    let location = SourceLocation::new(document.text());
    let start = to_utf16(document.text(), &location, start);
    let end = to_utf16(document.text(), &location, end);

    let edit = document
        .transform_rhythm(operator, start, end, config.rhythm_limits())
        .ok_or_else(|| CliError::HasErrors {
            path: path.to_string(),
            count: error_count(&document),
        })?;
    Ok(Outcome::ok(edit.new_text + "\n"))
}

/// `L:C-L:C`, one-based, into zero-based (line, character) pairs.
fn parse_range(range: &str) -> Result<((usize, usize), (usize, usize)), CliError> {
    let invalid = || CliError::InvalidRange(range.to_string());
    let point = |text: &str| -> Option<(usize, usize)> {
        let (line, column) = text.trim().split_once(':')?;
        let line: usize = line.parse().ok()?;
        let column: usize = column.parse().ok()?;
        Some((line.checked_sub(1)?, column.checked_sub(1)?))
    };
    let (start, end) = range.split_once('-').ok_or_else(invalid)?;
    let start = point(start).ok_or_else(invalid)?;
    let end = point(end).ok_or_else(invalid)?;
    if end < start {
        return Err(invalid());
    }
    Ok((start, end))
}

fn to_utf16(text: &str, location: &SourceLocation, (line, chars): (usize, usize)) -> Position {
    let line_start = location.position_to_byte(Position::new(line, 0));
    let column = text[line_start..]
        .lines()
        .next()
        .unwrap_or("")
        .chars()
        .take(chars)
        .map(char::len_utf16)
        .sum();
    Position::new(line, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_are_one_based() {
        assert_eq!(parse_range("3:1-3:5").unwrap(), ((2, 0), (2, 4)));
        assert_eq!(parse_range("1:2 - 2:1").unwrap(), ((0, 1), (1, 0)));
    }

    #[test]
    fn malformed_ranges_are_rejected() {
        for range in ["", "3:1", "0:1-1:1", "a:b-c:d", "2:1-1:1", "1:1-1"] {
            assert!(parse_range(range).is_err(), "{range}");
        }
    }

    #[test]
    fn character_columns_become_utf16_units() {
        let text = "X:1\nK:C\n\"𝄞\"A2\n";
        let location = SourceLocation::new(text);
        assert_eq!(to_utf16(text, &location, (2, 3)), Position::new(2, 4));
        assert_eq!(to_utf16(text, &location, (2, 0)), Position::new(2, 0));
    }
}
