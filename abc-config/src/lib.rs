//! Shared configuration loader for the ABC tools.
//!
//! `defaults/abc.default.toml` is embedded into every binary, so the documented defaults
//! and the runtime behaviour cannot drift apart. Callers layer a user file, editor
//! settings or single overrides on top through [`Loader`] and deserialize into
//! [`AbcConfig`].

use abc_parser::abc::visitors::rhythm::RhythmLimits;
use abc_parser::AnalysisOptions;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/abc.default.toml");

/// Top-level configuration consumed by the CLI and the language server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AbcConfig {
    pub diagnostics: DiagnosticsConfig,
    pub rhythm: RhythmConfig,
    pub completion: CompletionConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DiagnosticsConfig {
    pub source: String,
}

/// Bounds for the rhythm multiply/divide commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RhythmConfig {
    pub max_numerator: u32,
    pub max_denominator: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CompletionConfig {
    pub decorations: bool,
}

impl AbcConfig {
    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            diagnostics_source: self.diagnostics.source.clone(),
        }
    }

    pub fn rhythm_limits(&self) -> RhythmLimits {
        RhythmLimits {
            max_numerator: self.rhythm.max_numerator,
            max_denominator: self.rhythm.max_denominator,
        }
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a TOML file. A missing file is an error at [`Loader::build`].
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer a TOML file that may not exist.
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer a JSON object with the same shape as the TOML file, every key optional.
    ///
    /// Editors send their settings this way in `initializationOptions`.
    pub fn with_json_str(mut self, json: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(json, FileFormat::Json));
        self
    }

    /// Apply a single key/value override, e.g. `("rhythm.max_denominator", 128)`.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<AbcConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<AbcConfig, ConfigError> {
    Loader::new().build()
}
