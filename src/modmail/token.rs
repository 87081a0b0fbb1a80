//! Token types shared by the parser, the renderer and the tooling.
//!
//!     A message is parsed into a small tree of tokens. The set of token kinds is closed:
//!     [TokenKind] enumerates every kind the crate knows about, and every kind has exactly
//!     one static [TokenSpec] describing how it is recognized.
//!
//! Token Layers
//!
//!     Block Tokens:
//!         Operate on whole lines (paragraphs, headings, quotes, lists, tables, footnote
//!         definitions, thematic breaks, code blocks). They are identified by line-anchored
//!         rules, before any span matching happens. See [spec](spec) for the rules.
//!
//!     Span Tokens:
//!         Operate inside a single line (escapes, inline code, autolinks, mentions, images,
//!         links, strikethrough, strong, emphasis). Spans are matched by trying the enabled
//!         span patterns in ascending precedence order. Some spans are literal (their payload is
//!         never parsed again), others carry children parsed with the same rules.
//!
//!     Structural Tokens:
//!         PlainText, LineBreak and Paragraph. They are not produced by any pattern; they are
//!         what is left once every enabled rule had its chance, and they are always enabled.
//!
//!     Which kinds are active for a given parser/renderer is decided once, at construction,
//!     by a [Dialect](crate::modmail::dialect::Dialect). Kinds are never toggled afterwards.

pub mod kind;
pub mod spec;
pub mod tree;

pub use kind::{KindClass, TokenKind};
pub use spec::{spec_for, TokenSpec, TOKEN_SPECS};
pub use tree::{Cell, Token};
