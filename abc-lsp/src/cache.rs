//! Document cache
//!
//!     One analysed [`AbcDocument`] per open document. A change replaces the entry
//!     wholesale: the new text is scanned, parsed and classified from scratch and the old
//!     entry is dropped. Nothing is shared between versions.

use std::collections::HashMap;

use abc_parser::{AbcDocument, AnalysisOptions};
use tower_lsp::lsp_types::Url;

#[derive(Debug, Default)]
pub struct DocumentCache {
    entries: HashMap<Url, AbcDocument>,
    options: AnalysisOptions,
}

impl DocumentCache {
    pub fn new(options: AnalysisOptions) -> Self {
        Self {
            entries: HashMap::new(),
            options,
        }
    }

    /// Analyse `text` and install it as the current entry for `uri`.
    pub fn update(&mut self, uri: Url, text: String) -> &AbcDocument {
        let document = AbcDocument::analyze_with(text, &self.options);
        log::debug!(
            "{uri}: {} diagnostics, {} classified tokens",
            document.diagnostics().len(),
            document.classified_tokens().len()
        );
        self.entries.insert(uri.clone(), document);
        &self.entries[&uri]
    }

    pub fn get(&self, uri: &Url) -> Option<&AbcDocument> {
        self.entries.get(uri)
    }

    /// Drops the entry. Returns whether one existed.
    pub fn remove(&mut self, uri: &Url) -> bool {
        self.entries.remove(uri).is_some()
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Replaces the analysis options and re-analyses every open document with them.
    pub fn set_options(&mut self, options: AnalysisOptions) {
        self.options = options;
        for document in self.entries.values_mut() {
            *document = AbcDocument::analyze_with(document.text(), &self.options);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
