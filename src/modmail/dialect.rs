//! Dialects: which token kinds a parser/renderer pair recognizes
//!
//!     A [Dialect] is built once and then only read. Parsers and renderers copy it at
//!     construction, so two renders never share a mutable kind registry and can run on any
//!     number of threads at once.
//!
//!     Disabling a kind removes its rule: input written in that syntax simply falls through to
//!     the next rule, ending as paragraph text. Nothing is dropped.

use crate::modmail::token::{spec_for, KindClass, TokenKind};
use enum_map::EnumMap;

/// Block kinds and the one span kind that transcripts turn off.
pub const TRANSCRIPT_DISABLED: [TokenKind; 6] = [
    TokenKind::Heading,
    TokenKind::List,
    TokenKind::Quote,
    TokenKind::Table,
    TokenKind::Footnote,
    TokenKind::AutoLink,
];

/// Span kinds transcripts add on top of the extended dialect.
pub const TRANSCRIPT_ADDED: [TokenKind; 1] = [TokenKind::Mention];

/// Immutable set of enabled token kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialect {
    enabled: EnumMap<TokenKind, bool>,
}

impl Dialect {
    /// The extended dialect: every kind whose spec is enabled by default
    pub fn extended() -> Self {
        Dialect {
            enabled: EnumMap::from_fn(|kind| spec_for(kind).default_enabled),
        }
    }

    /// Only the structural kinds; everything else renders as literal text
    pub fn plain() -> Self {
        Dialect {
            enabled: EnumMap::from_fn(TokenKind::is_structural),
        }
    }

    /// The transcript dialect: flat message streams with platform mentions
    pub fn transcript() -> Self {
        let dialect = TRANSCRIPT_DISABLED
            .into_iter()
            .fold(Self::extended(), Self::without);
        TRANSCRIPT_ADDED.into_iter().fold(dialect, Self::with)
    }

    pub fn with(mut self, kind: TokenKind) -> Self {
        self.enabled[kind] = true;
        self
    }

    /// Structural kinds cannot be disabled; asking is a no-op.
    pub fn without(mut self, kind: TokenKind) -> Self {
        if !kind.is_structural() {
            self.enabled[kind] = false;
        }
        self
    }

    pub fn enables(&self, kind: TokenKind) -> bool {
        self.enabled[kind]
    }

    /// Enabled kinds of one class, in ascending precedence order
    pub fn kinds_by_precedence(&self, class: KindClass) -> Vec<TokenKind> {
        let mut kinds: Vec<TokenKind> = TokenKind::ALL
            .into_iter()
            .filter(|kind| kind.class() == class && !kind.is_structural() && self.enables(*kind))
            .collect();
        kinds.sort_by_key(|kind| spec_for(*kind).precedence);
        kinds
    }

    /// Every enabled kind, structural ones included
    pub fn enabled_kinds(&self) -> impl Iterator<Item = TokenKind> + '_ {
        TokenKind::ALL
            .into_iter()
            .filter(move |kind| self.enables(*kind))
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Self::transcript()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extended_enables_defaults_only() {
        let dialect = Dialect::extended();
        assert!(dialect.enables(TokenKind::Heading));
        assert!(dialect.enables(TokenKind::AutoLink));
        assert!(!dialect.enables(TokenKind::Mention));
    }

    #[test]
    fn transcript_disables_document_structure_and_adds_mentions() {
        let dialect = Dialect::transcript();
        for kind in TRANSCRIPT_DISABLED {
            assert!(!dialect.enables(kind), "{kind} should be disabled");
        }
        assert!(dialect.enables(TokenKind::Mention));
        assert!(dialect.enables(TokenKind::BlockCode));
        assert!(dialect.enables(TokenKind::InlineCode));
        assert!(dialect.enables(TokenKind::Emphasis));
    }

    #[test]
    fn structural_kinds_cannot_be_removed() {
        let dialect = Dialect::extended()
            .without(TokenKind::Paragraph)
            .without(TokenKind::PlainText)
            .without(TokenKind::LineBreak);
        assert!(dialect.enables(TokenKind::Paragraph));
        assert!(dialect.enables(TokenKind::PlainText));
        assert!(dialect.enables(TokenKind::LineBreak));
    }

    #[test]
    fn span_kinds_come_back_in_precedence_order() {
        let kinds = Dialect::transcript().kinds_by_precedence(KindClass::Span);
        assert_eq!(
            kinds,
            vec![
                TokenKind::EscapeSequence,
                TokenKind::InlineCode,
                TokenKind::Mention,
                TokenKind::Image,
                TokenKind::Link,
                TokenKind::Strikethrough,
                TokenKind::Strong,
                TokenKind::Emphasis,
            ]
        );
    }

    #[test]
    fn plain_dialect_has_no_rules() {
        let dialect = Dialect::plain();
        assert!(dialect.kinds_by_precedence(KindClass::Block).is_empty());
        assert!(dialect.kinds_by_precedence(KindClass::Span).is_empty());
        assert_eq!(dialect.enabled_kinds().count(), 3);
    }

    #[test]
    fn builders_do_not_touch_the_original() {
        let base = Dialect::extended();
        let derived = base.clone().without(TokenKind::Strong);
        assert!(base.enables(TokenKind::Strong));
        assert!(!derived.enables(TokenKind::Strong));
    }
}
