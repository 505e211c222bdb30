use abc_parser::AbcDocument;
use tower_lsp::lsp_types::Url;

pub(crate) use abc_parser::abc::testing::SAMPLE_TUNE;

pub(crate) fn sample_uri() -> Url {
    Url::parse("file:///silver-spear.abc").unwrap()
}

pub(crate) fn sample_document() -> AbcDocument {
    AbcDocument::analyze(SAMPLE_TUNE)
}
