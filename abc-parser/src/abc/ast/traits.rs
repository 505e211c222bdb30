//! Shared behaviour for tree nodes

use super::range::Range;
use crate::abc::token::Token;

/// Location queries common to every node.
///
/// Nodes only know their first and last token; ranges are derived from those. A node with
/// no tokens at all (an empty header, say) has no range.
pub trait AstNode {
    fn first_token(&self) -> Option<&Token>;
    fn last_token(&self) -> Option<&Token>;

    fn range(&self) -> Option<Range> {
        let first = self.first_token()?;
        let last = self.last_token()?;
        Some(Range::new(
            first.span.start..last.span.end,
            first.start(),
            last.end(),
        ))
    }
}
