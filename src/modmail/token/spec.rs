//! Static token specifications
//!
//!     Grammar is data: every kind has one entry in [TOKEN_SPECS] with its match pattern, its
//!     precedence and whether the extended dialect enables it by default. Patterns are
//!     compiled once, on first use, and shared read-only by every parser instance.
//!
//!     Precedence is "lower tries first". For block kinds it is the order in which line rules
//!     are attempted; for span kinds it decides which of two conflicting matches survives.
//!
//!     Span patterns run on canonical literal text (upstream entity escaping already
//!     decoded, see [lexing](crate::modmail::lexing)), so the mention pattern is written
//!     against `<@123>` rather than `&lt;@123&gt;`.

use super::kind::TokenKind;
use enum_map::EnumMap;
use once_cell::sync::Lazy;
use regex::Regex;

/// Per-kind static configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSpec {
    pub kind: TokenKind,
    /// Lower tries first
    pub precedence: u8,
    /// None for structural kinds, which are what remains after every rule ran
    pub pattern: Option<&'static str>,
    /// Enabled in the extended (default) dialect
    pub default_enabled: bool,
}

const STRUCTURAL: u8 = u8::MAX;

/// Order matters only for readability; lookups go through [spec_for].
pub const TOKEN_SPECS: &[TokenSpec] = &[
    // Block kinds
    TokenSpec {
        kind: TokenKind::BlockCode,
        precedence: 0,
        pattern: Some(r"^(?P<indent> {0,3})(?P<fence>`{3,}|~{3,})[ \t]*(?P<info>[^`]*?)[ \t]*$"),
        default_enabled: true,
    },
    TokenSpec {
        kind: TokenKind::Heading,
        precedence: 1,
        pattern: Some(r"^ {0,3}(?P<level>#{1,6})(?:[ \t]+(?P<text>.*?))?(?:[ \t]+#+)?[ \t]*$"),
        default_enabled: true,
    },
    TokenSpec {
        kind: TokenKind::ThematicBreak,
        precedence: 2,
        pattern: Some(r"^ {0,3}(?:(?:-[ \t]*){3,}|(?:\*[ \t]*){3,}|(?:_[ \t]*){3,})$"),
        default_enabled: true,
    },
    TokenSpec {
        kind: TokenKind::Quote,
        precedence: 3,
        pattern: Some(r"^ {0,3}>[ \t]?(?P<text>.*)$"),
        default_enabled: true,
    },
    TokenSpec {
        kind: TokenKind::List,
        precedence: 4,
        pattern: Some(r"^ {0,3}(?P<marker>[-+*]|\d{1,9}[.)])[ \t]+(?P<text>\S.*)$"),
        default_enabled: true,
    },
    TokenSpec {
        kind: TokenKind::Table,
        precedence: 5,
        // Delimiter row; the header row is the line above it
        pattern: Some(r"^ {0,3}\|?[ \t]*:?-+:?[ \t]*(?:\|[ \t]*:?-+:?[ \t]*)*\|?[ \t]*$"),
        default_enabled: true,
    },
    TokenSpec {
        kind: TokenKind::Footnote,
        precedence: 6,
        pattern: Some(r"^ {0,3}\[\^(?P<label>[^\]\s]+)\]:[ \t]*(?P<text>.*)$"),
        default_enabled: true,
    },
    TokenSpec {
        kind: TokenKind::Paragraph,
        precedence: STRUCTURAL,
        pattern: None,
        default_enabled: true,
    },
    // Span kinds
    TokenSpec {
        kind: TokenKind::EscapeSequence,
        precedence: 0,
        pattern: Some(r"\\(?P<inner>[!-/:-@\[-`{-~])"),
        default_enabled: true,
    },
    TokenSpec {
        kind: TokenKind::InlineCode,
        precedence: 1,
        // Opening run; the closing run must have the same length
        pattern: Some(r"`+"),
        default_enabled: true,
    },
    TokenSpec {
        kind: TokenKind::AutoLink,
        precedence: 2,
        pattern: Some(
            r"<(?P<inner>[A-Za-z][A-Za-z0-9+.\-]{1,31}:[^\s<>]*|[A-Za-z0-9.!#$%&'*+/=?^_`{|}~\-]+@[A-Za-z0-9](?:[A-Za-z0-9\-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9\-]{0,61}[A-Za-z0-9])?)*)>",
        ),
        default_enabled: true,
    },
    TokenSpec {
        kind: TokenKind::Mention,
        precedence: 3,
        pattern: Some(r"<(?:@!?|#)\d+>|@(?:everyone|here)"),
        default_enabled: false,
    },
    TokenSpec {
        kind: TokenKind::Image,
        precedence: 4,
        pattern: Some(r"!\[(?P<alt>[^\]]*)\]\((?P<src>[^()\s]+)\)"),
        default_enabled: true,
    },
    TokenSpec {
        kind: TokenKind::Link,
        precedence: 5,
        pattern: Some(r"\[(?P<text>[^\]]+)\]\((?P<target>[^()\s]+)\)"),
        default_enabled: true,
    },
    TokenSpec {
        kind: TokenKind::Strikethrough,
        precedence: 6,
        pattern: Some(r"~~(?P<inner>[^\s~](?:.*?[^\s~])?)~~"),
        default_enabled: true,
    },
    TokenSpec {
        kind: TokenKind::Strong,
        precedence: 7,
        pattern: Some(r"\*\*(?P<star>[^\s*](?:.*?[^\s*])?)\*\*|__(?P<under>[^\s_](?:.*?[^\s_])?)__"),
        default_enabled: true,
    },
    TokenSpec {
        kind: TokenKind::Emphasis,
        precedence: 8,
        pattern: Some(
            r"\*(?P<star>[^\s*](?:[^*]*?[^\s*])?)\*|_(?P<under>[^\s_](?:[^_]*?[^\s_])?)_",
        ),
        default_enabled: true,
    },
    TokenSpec {
        kind: TokenKind::PlainText,
        precedence: STRUCTURAL,
        pattern: None,
        default_enabled: true,
    },
    TokenSpec {
        kind: TokenKind::LineBreak,
        precedence: STRUCTURAL,
        pattern: None,
        default_enabled: true,
    },
];

static COMPILED: Lazy<EnumMap<TokenKind, Option<Regex>>> = Lazy::new(|| {
    EnumMap::from_fn(|kind| {
        spec_for(kind)
            .pattern
            .map(|pattern| Regex::new(pattern).unwrap())
    })
});

/// Look up the static spec of a kind
pub fn spec_for(kind: TokenKind) -> &'static TokenSpec {
    TOKEN_SPECS
        .iter()
        .find(|spec| spec.kind == kind)
        .unwrap_or_else(|| missing_spec(kind))
}

/// The compiled pattern of a kind, if it has one
pub fn pattern_for(kind: TokenKind) -> Option<&'static Regex> {
    COMPILED[kind].as_ref()
}

fn missing_spec(kind: TokenKind) -> ! {
    panic!("Token kind '{kind}' has no entry in TOKEN_SPECS");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modmail::token::KindClass;

    #[test]
    fn every_kind_has_exactly_one_spec() {
        for kind in TokenKind::ALL {
            let count = TOKEN_SPECS.iter().filter(|spec| spec.kind == kind).count();
            assert_eq!(count, 1, "kind {kind} has {count} specs");
        }
        assert_eq!(TOKEN_SPECS.len(), TokenKind::ALL.len());
    }

    #[test]
    fn every_pattern_compiles() {
        for spec in TOKEN_SPECS {
            assert_eq!(pattern_for(spec.kind).is_some(), spec.pattern.is_some());
        }
    }

    #[test]
    fn structural_kinds_have_no_pattern() {
        for spec in TOKEN_SPECS {
            assert_eq!(spec.kind.is_structural(), spec.pattern.is_none());
        }
    }

    #[test]
    fn span_precedences_are_distinct() {
        let mut seen: Vec<u8> = TOKEN_SPECS
            .iter()
            .filter(|spec| spec.kind.class() == KindClass::Span && !spec.kind.is_structural())
            .map(|spec| spec.precedence)
            .collect();
        let total = seen.len();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), total);
    }

    #[test]
    fn mention_sits_between_bracket_kinds_and_emphasis() {
        let mention = spec_for(TokenKind::Mention).precedence;
        assert!(spec_for(TokenKind::EscapeSequence).precedence < mention);
        assert!(spec_for(TokenKind::InlineCode).precedence < mention);
        assert!(spec_for(TokenKind::AutoLink).precedence < mention);
        assert!(mention < spec_for(TokenKind::Strong).precedence);
        assert!(mention < spec_for(TokenKind::Emphasis).precedence);
    }

    #[test]
    fn mention_pattern_matches_literal_forms() {
        let re = pattern_for(TokenKind::Mention).unwrap();
        for text in ["<@123>", "<@!123>", "<#42>", "@everyone", "@here"] {
            assert_eq!(re.find(text).map(|m| m.as_str()), Some(text));
        }
        assert!(re.find("<@abc>").is_none());
        assert!(re.find("<@&123>").is_none());
    }
}
