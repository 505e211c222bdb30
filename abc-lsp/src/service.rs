//! Service layer
//!
//!     Routes editor requests to the [`DocumentCache`] and the visitors. Every operation is a
//!     plain synchronous function over the cache; the protocol server wraps this type and
//!     does the conversions to protocol values.

use std::error::Error;
use std::fmt;

use abc_config::AbcConfig;
use abc_parser::abc::ast::Position;
use abc_parser::abc::visitors::rhythm::{RhythmEdit, RhythmOperator};
use abc_parser::{AbcDocument, Diagnostic, Token};
use tower_lsp::lsp_types::Url;

use crate::cache::DocumentCache;

/// Why a request could not be served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The document was never opened, or has been closed.
    UnknownDocument(Url),
    /// The document has errors, so rewriting it could drop unparsed text.
    HasErrors(Url),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::UnknownDocument(uri) => write!(f, "{uri} is not open"),
            ServiceError::HasErrors(uri) => {
                write!(f, "{uri} has errors; fix them before rewriting it")
            }
        }
    }
}

impl Error for ServiceError {}

#[derive(Debug)]
pub struct AbcService {
    cache: DocumentCache,
    config: AbcConfig,
}

impl AbcService {
    pub fn new(config: AbcConfig) -> Self {
        Self {
            cache: DocumentCache::new(config.analysis_options()),
            config,
        }
    }

    pub fn config(&self) -> &AbcConfig {
        &self.config
    }

    /// Installs a new configuration. Open documents are re-analysed under it.
    pub fn set_config(&mut self, config: AbcConfig) {
        self.cache.set_options(config.analysis_options());
        self.config = config;
    }

    /// Re-analyses `text` for `uri` and returns the diagnostics to publish.
    pub fn analyze(&mut self, uri: Url, text: String) -> Vec<Diagnostic> {
        self.cache.update(uri, text).diagnostics().to_vec()
    }

    /// Classified tokens of the cached tree; empty for unknown documents.
    pub fn classify(&self, uri: &Url) -> Vec<Token> {
        self.cache
            .get(uri)
            .map(|document| document.classified_tokens().to_vec())
            .unwrap_or_default()
    }

    /// The whole formatted document.
    pub fn format(&self, uri: &Url) -> Result<String, ServiceError> {
        self.document(uri)?
            .formatted()
            .ok_or_else(|| ServiceError::HasErrors(uri.clone()))
    }

    /// Replacement text for the rhythms between `start` and `end`.
    pub fn rhythm_transform(
        &self,
        uri: &Url,
        operator: RhythmOperator,
        start: Position,
        end: Position,
    ) -> Result<RhythmEdit, ServiceError> {
        self.document(uri)?
            .transform_rhythm(operator, start, end, self.config.rhythm_limits())
            .ok_or_else(|| ServiceError::HasErrors(uri.clone()))
    }

    pub fn close(&mut self, uri: &Url) -> bool {
        self.cache.remove(uri)
    }

    pub fn document(&self, uri: &Url) -> Result<&AbcDocument, ServiceError> {
        self.cache
            .get(uri)
            .ok_or_else(|| ServiceError::UnknownDocument(uri.clone()))
    }
}
