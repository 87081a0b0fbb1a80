//! Testing utilities
//!
//! Two tools, used by the unit tests and the integration suites alike:
//!
//! 1. **[assert_tokens](fn@assert_tokens)**: fluent assertions over parsed token trees.
//!    Checking kinds, children and text of a whole tree reads as one chain instead of a
//!    ladder of nested `match` blocks:
//!
//! ```rust-example
//! assert_tokens(&tokens).count(1).token(0, |p| {
//!     p.kind(TokenKind::Paragraph)
//!         .child_count(2)
//!         .child(1, |m| {
//!             m.mention("<@123>");
//!         });
//! });
//! ```
//!
//! 2. **[factories]**: hand-written transcript fixtures (authors, messages, documents)
//!    without spelling out every field.

pub mod assertions;
pub mod factories;

pub use assertions::{assert_tokens, TokenAssertion, TokensAssertion};
