//! Parser: message text → token tree
//!
//!     Parsing runs in three stages over one message:
//!
//!         1. Normalization: line endings become `\n` and, unless disabled, the upstream
//!            entity escaping is decoded once (see [lexing](crate::modmail::lexing)).
//!         2. Blocks: each line is offered to the enabled block rules in precedence order
//!            (see [blocks]). Lines no rule claims accumulate into paragraphs; a blank line
//!            closes a paragraph.
//!         3. Spans: the text of every paragraph line, heading, quote line, list item, table
//!            cell and footnote is matched against the enabled span patterns (see [spans]).
//!
//!     The parser is total. Every input produces a token tree; syntax belonging to a disabled
//!     kind, or syntax that does not close, stays in the tree as PlainText.

mod blocks;
mod spans;

use crate::modmail::dialect::Dialect;
use crate::modmail::lexing::decode_entities;
use crate::modmail::token::Token;

pub use spans::MAX_NESTING;

/// Parser for one dialect. Cheap to share: it only reads its configuration.
#[derive(Debug, Clone)]
pub struct Parser {
    dialect: Dialect,
    decode_entities: bool,
}

impl Parser {
    /// A parser for the given dialect. Input is assumed to be entity-escaped upstream.
    pub fn new(dialect: Dialect) -> Self {
        Parser {
            dialect,
            decode_entities: true,
        }
    }

    /// Whether to decode one level of upstream entity escaping before parsing
    pub fn with_entity_decoding(mut self, enabled: bool) -> Self {
        self.decode_entities = enabled;
        self
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// Parse one message into its top-level block tokens.
    ///
    /// Empty or blank input yields no tokens.
    pub fn parse(&self, source: &str) -> Vec<Token> {
        let normalized = source.replace("\r\n", "\n").replace('\r', "\n");
        let text = if self.decode_entities {
            decode_entities(&normalized)
        } else {
            normalized.as_str().into()
        };
        let tokens = blocks::parse_blocks(&text, &self.dialect);
        tracing::trace!(
            bytes = source.len(),
            blocks = tokens.len(),
            "parsed message"
        );
        tokens
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new(Dialect::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modmail::testing::assert_tokens;
    use crate::modmail::token::TokenKind;

    #[test]
    fn empty_input_has_no_blocks() {
        let parser = Parser::default();
        assert!(parser.parse("").is_empty());
        assert!(parser.parse("\n\n  \n").is_empty());
    }

    #[test]
    fn decodes_upstream_entities_before_matching() {
        let tokens = Parser::default().parse("hi &lt;@123&gt;");
        assert_tokens(&tokens).count(1).token(0, |p| {
            p.kind(TokenKind::Paragraph)
                .child_count(2)
                .child(0, |t| {
                    t.plain("hi ");
                })
                .child(1, |t| {
                    t.mention("<@123>");
                });
        });
    }

    #[test]
    fn without_decoding_entities_stay_literal() {
        let parser = Parser::default().with_entity_decoding(false);
        let tokens = parser.parse("&lt;@123&gt;");
        assert_tokens(&tokens).count(1).token(0, |p| {
            p.child_count(1).child(0, |t| {
                t.plain("&lt;@123&gt;");
            });
        });
    }

    #[test]
    fn carriage_returns_are_line_endings() {
        let tokens = Parser::default().parse("a\r\nb\rc");
        assert_tokens(&tokens).count(1).token(0, |p| {
            p.kinds(&[
                TokenKind::PlainText,
                TokenKind::LineBreak,
                TokenKind::PlainText,
                TokenKind::LineBreak,
                TokenKind::PlainText,
            ]);
        });
    }
}
