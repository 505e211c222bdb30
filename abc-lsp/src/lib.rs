//! Language server for ABC music notation
//!
//!     The crate is split the same way requests flow through it:
//!
//!     Server layer ([`server`]):
//!         Implements tower-lsp's `LanguageServer`, converts protocol values and publishes
//!         diagnostics. It holds no logic of its own.
//!
//!     Service layer ([`service`]):
//!         Synchronous operations over the document cache: analyze, classify, format,
//!         rhythm transform. Refusals come back as [`service::ServiceError`].
//!
//!     Document cache ([`cache`]):
//!         One analysed document per URI, rebuilt wholesale on every change.
//!
//!     Feature layer ([`features`]):
//!         Stateless conversions to protocol values (semantic token encoding, whole-document
//!         edits, diagnostics, decoration completion) with dense unit tests.
//!
//!     Besides the standard requests the server answers two custom ones,
//!     `abc/multiplyRhythm` and `abc/divideRhythm`, taking `{ uri, selection }` and
//!     returning a single text edit.
//!
//! Usage
//!
//!     $ abc-lsp
//!     Serves the protocol on stdin/stdout. Editor settings sent as `initializationOptions`
//!     use the same layout as `abc.toml`.

pub mod cache;
pub mod features;
pub mod server;
pub mod service;

use abc_config::AbcConfig;
use tower_lsp::{LspService, Server};

pub use server::AbcLanguageServer;

/// Serve the protocol over stdin/stdout until the client disconnects.
pub async fn serve_stdio(config: AbcConfig) {
    let (service, socket) = LspService::build(|client| AbcLanguageServer::new(client, config))
        .custom_method(
            features::rhythm::MULTIPLY_RHYTHM,
            AbcLanguageServer::multiply_rhythm,
        )
        .custom_method(
            features::rhythm::DIVIDE_RHYTHM,
            AbcLanguageServer::divide_rhythm,
        )
        .finish();
    Server::new(tokio::io::stdin(), tokio::io::stdout(), socket)
        .serve(service)
        .await;
}
