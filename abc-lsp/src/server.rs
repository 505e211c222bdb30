//! Main language server implementation

use abc_config::{AbcConfig, Loader};
use abc_parser::abc::visitors::rhythm::RhythmOperator;
use tokio::sync::Mutex;
use tower_lsp::async_trait;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::{
    CompletionOptions, CompletionParams, CompletionResponse, Diagnostic,
    DidChangeTextDocumentParams, DidCloseTextDocumentParams, DidOpenTextDocumentParams,
    DocumentFormattingParams, InitializeParams, InitializeResult, InitializedParams, MessageType,
    OneOf, SemanticTokens, SemanticTokensFullOptions, SemanticTokensOptions,
    SemanticTokensParams, SemanticTokensResult, SemanticTokensServerCapabilities,
    ServerCapabilities, ServerInfo, TextDocumentItem, TextDocumentSyncCapability,
    TextDocumentSyncKind, TextEdit, Url, WorkDoneProgressOptions,
};
use tower_lsp::Client;

use crate::features::completion::{decoration_completions, TRIGGER_CHARACTER};
use crate::features::diagnostics::{from_lsp_position, to_lsp_diagnostics};
use crate::features::formatting::whole_document_edit;
use crate::features::rhythm::{to_text_edit, RhythmTransformParams};
use crate::features::semantic_tokens::{encode_semantic_tokens, semantic_tokens_legend};
use crate::service::{AbcService, ServiceError};

/// What the server needs from the editor side of the connection.
#[async_trait]
pub trait LspClient: Send + Sync + Clone + 'static {
    async fn publish_diagnostics(&self, uri: Url, diagnostics: Vec<Diagnostic>, version: Option<i32>);
    async fn log_message(&self, typ: MessageType, message: String);
}

#[async_trait]
impl LspClient for Client {
    async fn publish_diagnostics(&self, uri: Url, diagnostics: Vec<Diagnostic>, version: Option<i32>) {
        Client::publish_diagnostics(self, uri, diagnostics, version).await;
    }

    async fn log_message(&self, typ: MessageType, message: String) {
        Client::log_message(self, typ, message).await;
    }
}

pub struct AbcLanguageServer<C = Client> {
    client: C,
    service: Mutex<AbcService>,
}

impl<C> AbcLanguageServer<C>
where
    C: LspClient,
{
    pub fn new(client: C, config: AbcConfig) -> Self {
        Self {
            client,
            service: Mutex::new(AbcService::new(config)),
        }
    }

    async fn analyze_and_publish(&self, uri: Url, text: String, version: Option<i32>) {
        let diagnostics = self.service.lock().await.analyze(uri.clone(), text);
        self.client
            .publish_diagnostics(uri, to_lsp_diagnostics(&diagnostics), version)
            .await;
    }

    async fn transform_rhythm(
        &self,
        params: RhythmTransformParams,
        operator: RhythmOperator,
    ) -> Result<Vec<TextEdit>> {
        let result = self.service.lock().await.rhythm_transform(
            &params.uri,
            operator,
            from_lsp_position(params.selection.start),
            from_lsp_position(params.selection.end),
        );
        match result {
            Ok(edit) => Ok(vec![to_text_edit(edit)]),
            Err(error) => {
                self.refuse(error).await;
                Ok(Vec::new())
            }
        }
    }

    async fn refuse(&self, error: ServiceError) {
        log::warn!("{error}");
        self.client
            .log_message(MessageType::WARNING, error.to_string())
            .await;
    }

    /// Handler for `abc/multiplyRhythm`.
    pub async fn multiply_rhythm(&self, params: RhythmTransformParams) -> Result<Vec<TextEdit>> {
        self.transform_rhythm(params, RhythmOperator::Multiply).await
    }

    /// Handler for `abc/divideRhythm`.
    pub async fn divide_rhythm(&self, params: RhythmTransformParams) -> Result<Vec<TextEdit>> {
        self.transform_rhythm(params, RhythmOperator::Divide).await
    }
}

#[async_trait]
impl<C> tower_lsp::LanguageServer for AbcLanguageServer<C>
where
    C: LspClient,
{
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        if let Some(options) = params.initialization_options {
            match Loader::new().with_json_str(&options.to_string()).build() {
                Ok(config) => self.service.lock().await.set_config(config),
                Err(error) => log::warn!("ignoring initializationOptions: {error}"),
            }
        }

        let capabilities = ServerCapabilities {
            text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL)),
            document_formatting_provider: Some(OneOf::Left(true)),
            completion_provider: Some(CompletionOptions {
                trigger_characters: Some(vec![TRIGGER_CHARACTER.to_string()]),
                ..CompletionOptions::default()
            }),
            semantic_tokens_provider: Some(
                SemanticTokensServerCapabilities::SemanticTokensOptions(SemanticTokensOptions {
                    work_done_progress_options: WorkDoneProgressOptions::default(),
                    legend: semantic_tokens_legend(),
                    range: None,
                    full: Some(SemanticTokensFullOptions::Bool(true)),
                }),
            ),
            ..ServerCapabilities::default()
        };

        Ok(InitializeResult {
            capabilities,
            server_info: Some(ServerInfo {
                name: "abc-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        let source = self.service.lock().await.config().diagnostics.source.clone();
        self.client
            .log_message(
                MessageType::INFO,
                format!("abc-lsp ready, diagnostics tagged \"{source}\""),
            )
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let TextDocumentItem {
            uri, text, version, ..
        } = params.text_document;
        self.analyze_and_publish(uri, text, Some(version)).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        if let Some(change) = params.content_changes.into_iter().last() {
            let document = params.text_document;
            self.analyze_and_publish(document.uri, change.text, Some(document.version))
                .await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.service.lock().await.close(&uri);
        self.client.publish_diagnostics(uri, Vec::new(), None).await;
    }

    async fn semantic_tokens_full(
        &self,
        params: SemanticTokensParams,
    ) -> Result<Option<SemanticTokensResult>> {
        let service = self.service.lock().await;
        if service.document(&params.text_document.uri).is_err() {
            return Ok(None);
        }
        let tokens = service.classify(&params.text_document.uri);
        Ok(Some(SemanticTokensResult::Tokens(SemanticTokens {
            result_id: None,
            data: encode_semantic_tokens(&tokens),
        })))
    }

    async fn formatting(&self, params: DocumentFormattingParams) -> Result<Option<Vec<TextEdit>>> {
        let uri = params.text_document.uri;
        let result = {
            let service = self.service.lock().await;
            let Ok(document) = service.document(&uri) else {
                return Ok(None);
            };
            let original = document.text().to_string();
            service
                .format(&uri)
                .map(|formatted| whole_document_edit(&original, formatted))
        };
        match result {
            Ok(edit) => Ok(Some(vec![edit])),
            Err(error) => {
                self.refuse(error).await;
                Ok(Some(Vec::new()))
            }
        }
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let position = params.text_document_position;
        let service = self.service.lock().await;
        if !service.config().completion.decorations {
            return Ok(None);
        }
        let Ok(document) = service.document(&position.text_document.uri) else {
            return Ok(None);
        };
        let items = decoration_completions(document, from_lsp_position(position.position));
        Ok(Some(CompletionResponse::Array(items)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::test_support::{sample_uri, SAMPLE_TUNE};
    use abc_config::load_defaults;
    use serde_json::json;
    use std::sync::{Arc, Mutex as StdMutex};
    use tower_lsp::lsp_types::{
        ClientCapabilities, Position, Range, TextDocumentContentChangeEvent,
        TextDocumentIdentifier, TextDocumentPositionParams, VersionedTextDocumentIdentifier,
    };
    use tower_lsp::LanguageServer;

    #[derive(Clone, Default)]
    struct NoopClient;

    #[async_trait]
    impl LspClient for NoopClient {
        async fn publish_diagnostics(&self, _: Url, _: Vec<Diagnostic>, _: Option<i32>) {}
        async fn log_message(&self, _: MessageType, _: String) {}
    }

    /// Keeps everything the server sends.
    #[derive(Clone, Default)]
    struct RecordingClient {
        published: Arc<StdMutex<Vec<(Url, Vec<Diagnostic>, Option<i32>)>>>,
        messages: Arc<StdMutex<Vec<(MessageType, String)>>>,
    }

    #[async_trait]
    impl LspClient for RecordingClient {
        async fn publish_diagnostics(&self, uri: Url, diagnostics: Vec<Diagnostic>, version: Option<i32>) {
            self.published
                .lock()
                .unwrap()
                .push((uri, diagnostics, version));
        }

        async fn log_message(&self, typ: MessageType, message: String) {
            self.messages.lock().unwrap().push((typ, message));
        }
    }

    fn server<C: LspClient>(client: C) -> AbcLanguageServer<C> {
        AbcLanguageServer::new(client, load_defaults().unwrap())
    }

    async fn open<C: LspClient>(server: &AbcLanguageServer<C>, text: &str) {
        server
            .did_open(DidOpenTextDocumentParams {
                text_document: TextDocumentItem {
                    uri: sample_uri(),
                    language_id: "abc".into(),
                    version: 1,
                    text: text.to_string(),
                },
            })
            .await;
    }

    fn formatting_params() -> DocumentFormattingParams {
        DocumentFormattingParams {
            text_document: TextDocumentIdentifier { uri: sample_uri() },
            options: Default::default(),
            work_done_progress_params: Default::default(),
        }
    }

    fn rhythm_params(start: (u32, u32), end: (u32, u32)) -> RhythmTransformParams {
        RhythmTransformParams {
            uri: sample_uri(),
            selection: Range::new(Position::new(start.0, start.1), Position::new(end.0, end.1)),
        }
    }

    #[tokio::test]
    async fn initialize_advertises_capabilities() {
        let server = server(NoopClient);
        let result = server.initialize(InitializeParams::default()).await.unwrap();
        let capabilities = result.capabilities;
        assert!(capabilities.semantic_tokens_provider.is_some());
        assert_eq!(capabilities.document_formatting_provider, Some(OneOf::Left(true)));
        let completion = capabilities.completion_provider.unwrap();
        assert_eq!(completion.trigger_characters, Some(vec!["!".to_string()]));
        assert_eq!(result.server_info.unwrap().name, "abc-lsp");
    }

    #[tokio::test]
    async fn initialization_options_override_defaults() {
        let client = RecordingClient::default();
        let server = server(client.clone());
        server
            .initialize(InitializeParams {
                initialization_options: Some(json!({ "diagnostics": { "source": "abc-lint" } })),
                capabilities: ClientCapabilities::default(),
                ..InitializeParams::default()
            })
            .await
            .unwrap();
        open(&server, "X:1\nK:C\n¤\n").await;

        let published = client.published.lock().unwrap();
        assert_eq!(published[0].1[0].source.as_deref(), Some("abc-lint"));
    }

    #[tokio::test]
    async fn bad_initialization_options_keep_defaults() {
        let client = RecordingClient::default();
        let server = server(client.clone());
        server
            .initialize(InitializeParams {
                initialization_options: Some(json!({ "rhythm": { "max_numerator": "lots" } })),
                ..InitializeParams::default()
            })
            .await
            .unwrap();
        open(&server, "X:1\nK:C\n¤\n").await;
        let published = client.published.lock().unwrap();
        assert_eq!(published[0].1[0].source.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn open_and_change_publish_diagnostics() {
        let client = RecordingClient::default();
        let server = server(client.clone());
        open(&server, "X:1\nK:C\n[CEG\n").await;
        server
            .did_change(DidChangeTextDocumentParams {
                text_document: VersionedTextDocumentIdentifier {
                    uri: sample_uri(),
                    version: 2,
                },
                content_changes: vec![TextDocumentContentChangeEvent {
                    range: None,
                    range_length: None,
                    text: "X:1\nK:C\n[CEG]\n".into(),
                }],
            })
            .await;

        let published = client.published.lock().unwrap();
        assert_eq!(published.len(), 2);
        assert_eq!(published[0].2, Some(1));
        assert!(!published[0].1.is_empty());
        assert_eq!(published[1].2, Some(2));
        assert!(published[1].1.is_empty());
    }

    #[tokio::test]
    async fn close_clears_diagnostics_and_the_entry() {
        let client = RecordingClient::default();
        let server = server(client.clone());
        open(&server, "X:1\nK:C\n[CEG\n").await;
        server
            .did_close(DidCloseTextDocumentParams {
                text_document: TextDocumentIdentifier { uri: sample_uri() },
            })
            .await;

        assert!(client.published.lock().unwrap()[1].1.is_empty());
        let result = server.formatting(formatting_params()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn semantic_tokens_for_open_document() {
        let server = server(NoopClient);
        open(&server, SAMPLE_TUNE).await;
        let result = server
            .semantic_tokens_full(SemanticTokensParams {
                text_document: TextDocumentIdentifier { uri: sample_uri() },
                work_done_progress_params: Default::default(),
                partial_result_params: Default::default(),
            })
            .await
            .unwrap()
            .unwrap();
        let data_len = match result {
            SemanticTokensResult::Tokens(tokens) => tokens.data.len(),
            SemanticTokensResult::Partial(partial) => partial.data.len(),
        };
        assert!(data_len > 0);
    }

    #[tokio::test]
    async fn semantic_tokens_returns_none_when_document_missing() {
        let server = server(NoopClient);
        let result = server
            .semantic_tokens_full(SemanticTokensParams {
                text_document: TextDocumentIdentifier { uri: sample_uri() },
                work_done_progress_params: Default::default(),
                partial_result_params: Default::default(),
            })
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn formatting_replaces_the_whole_document() {
        let server = server(NoopClient);
        open(&server, SAMPLE_TUNE).await;
        let edits = server.formatting(formatting_params()).await.unwrap().unwrap();
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].new_text, SAMPLE_TUNE);
        assert_eq!(edits[0].range.start, Position::new(0, 0));
        assert_eq!(edits[0].range.end, Position::new(7, 0));
    }

    #[tokio::test]
    async fn formatting_refusal_is_an_empty_edit_list() {
        let client = RecordingClient::default();
        let server = server(client.clone());
        open(&server, "X:1\nK:C\n[CEG\n").await;
        let edits = server.formatting(formatting_params()).await.unwrap().unwrap();
        assert!(edits.is_empty());
        let messages = client.messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0, MessageType::WARNING);
    }

    #[tokio::test]
    async fn rhythm_requests_return_one_edit() {
        let server = server(NoopClient);
        open(&server, "X:1\nK:C\nA2 B/ c|\n").await;

        let doubled = server.multiply_rhythm(rhythm_params((2, 0), (2, 8))).await.unwrap();
        assert_eq!(doubled.len(), 1);
        assert_eq!(doubled[0].new_text, "A4 B c2|");

        let halved = server.divide_rhythm(rhythm_params((2, 0), (2, 2))).await.unwrap();
        assert_eq!(halved[0].new_text, "A");
        assert_eq!(halved[0].range.end, Position::new(2, 2));
    }

    #[tokio::test]
    async fn rhythm_request_for_unknown_document_is_empty() {
        let server = server(NoopClient);
        let edits = server.multiply_rhythm(rhythm_params((0, 0), (0, 1))).await.unwrap();
        assert!(edits.is_empty());
    }

    #[tokio::test]
    async fn completion_after_bang() {
        let server = server(NoopClient);
        open(&server, "X:1\nK:C\nAB !\n").await;
        let response = server
            .completion(CompletionParams {
                text_document_position: TextDocumentPositionParams {
                    text_document: TextDocumentIdentifier { uri: sample_uri() },
                    position: Position::new(2, 4),
                },
                work_done_progress_params: Default::default(),
                partial_result_params: Default::default(),
                context: None,
            })
            .await
            .unwrap();
        match response {
            Some(CompletionResponse::Array(items)) => {
                assert!(items.iter().any(|item| item.label == "!fermata!"))
            }
            other => panic!("unexpected completion response: {other:?}"),
        }
    }
}
