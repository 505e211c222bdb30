pub mod completion;
pub mod diagnostics;
pub mod formatting;
pub mod rhythm;
pub mod semantic_tokens;

#[cfg(test)]
pub(crate) mod test_support;
