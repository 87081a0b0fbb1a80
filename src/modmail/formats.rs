//! Rendering token trees to output formats
//!
//!     A [Renderer] owns a dispatch table from token kind to one rendering rule per
//!     [RenderMode]. The table is filled once, from the dialect, when the renderer is built;
//!     after that the renderer is read-only and can be shared across threads.
//!
//!     Rendering is an order-preserving walk: every token is rendered by the rule of its
//!     kind, containers render their children in place. A token whose kind has no rule is an
//!     internal error: the parser built from the same dialect never produces one.
//!
//! Formats
//!
//!     html:   escaped HTML fragments. Every user payload is escaped exactly once.
//!     plain:  text with structure flattened. Nothing is escaped.

pub mod html;
pub mod plain;

use crate::modmail::dialect::Dialect;
use crate::modmail::token::{Token, TokenKind};
use enum_map::EnumMap;
use std::fmt;
use std::str::FromStr;

/// Output target of a render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderMode {
    Html,
    PlainText,
}

impl RenderMode {
    pub fn name(self) -> &'static str {
        match self {
            RenderMode::Html => "html",
            RenderMode::PlainText => "text",
        }
    }

    /// Separator placed between top-level blocks
    fn block_separator(self) -> &'static str {
        match self {
            RenderMode::Html => "\n",
            RenderMode::PlainText => "\n\n",
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RenderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(RenderMode::Html),
            "text" | "plain" | "plain_text" | "txt" => Ok(RenderMode::PlainText),
            other => Err(format!("Unknown render mode '{other}'")),
        }
    }
}

/// One rendering rule: append the output for `token` to `out`
pub type Rule = fn(&Renderer, &Token, &mut String);

#[derive(Clone, Copy)]
struct Rules {
    html: Rule,
    plain: Rule,
}

/// Token tree renderer for one dialect
#[derive(Clone)]
pub struct Renderer {
    dialect: Dialect,
    rules: EnumMap<TokenKind, Option<Rules>>,
}

impl Renderer {
    /// Register one rule pair per kind the dialect enables
    pub fn new(dialect: &Dialect) -> Self {
        let rules = EnumMap::from_fn(|kind| {
            dialect.enables(kind).then(|| Rules {
                html: html::rule_for(kind),
                plain: plain::rule_for(kind),
            })
        });
        Renderer {
            dialect: dialect.clone(),
            rules,
        }
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// Whether tokens of this kind can be rendered
    pub fn handles(&self, kind: TokenKind) -> bool {
        self.rules[kind].is_some()
    }

    /// Render top-level blocks, separated per mode
    pub fn render(&self, tokens: &[Token], mode: RenderMode) -> String {
        let mut out = String::new();
        for (i, token) in tokens.iter().enumerate() {
            if i > 0 {
                out.push_str(mode.block_separator());
            }
            self.render_token(token, mode, &mut out);
        }
        out
    }

    /// Render one token with the rule registered for its kind
    pub fn render_token(&self, token: &Token, mode: RenderMode, out: &mut String) {
        let kind = token.kind();
        let Some(rules) = self.rules[kind] else {
            fatal_unregistered_kind(kind);
        };
        let rule = match mode {
            RenderMode::Html => rules.html,
            RenderMode::PlainText => rules.plain,
        };
        rule(self, token, out);
    }

    /// Render a sequence of inline tokens back to back
    pub fn render_inline(&self, tokens: &[Token], mode: RenderMode, out: &mut String) {
        for token in tokens {
            self.render_token(token, mode, out);
        }
    }
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<TokenKind> = self
            .rules
            .iter()
            .filter(|(_, rules)| rules.is_some())
            .map(|(kind, _)| kind)
            .collect();
        f.debug_struct("Renderer").field("kinds", &kinds).finish()
    }
}

fn fatal_unregistered_kind(kind: TokenKind) -> ! {
    panic!(
        "Token kind '{kind}' reached a renderer that has no rule for it; \
         the parser and renderer were built from different dialects"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(text: &str) -> Token {
        Token::Paragraph(vec![Token::PlainText(text.into())])
    }

    #[test]
    fn blocks_are_separated_per_mode() {
        let renderer = Renderer::new(&Dialect::transcript());
        let tokens = vec![paragraph("a"), paragraph("b")];
        assert_eq!(renderer.render(&tokens, RenderMode::Html), "a\nb");
        assert_eq!(renderer.render(&tokens, RenderMode::PlainText), "a\n\nb");
    }

    #[test]
    fn empty_tree_renders_empty() {
        let renderer = Renderer::new(&Dialect::transcript());
        assert_eq!(renderer.render(&[], RenderMode::Html), "");
        assert_eq!(renderer.render(&[], RenderMode::PlainText), "");
    }

    #[test]
    fn registers_exactly_the_enabled_kinds() {
        let dialect = Dialect::transcript();
        let renderer = Renderer::new(&dialect);
        for kind in TokenKind::ALL {
            assert_eq!(renderer.handles(kind), dialect.enables(kind), "{kind}");
        }
    }

    #[test]
    #[should_panic(expected = "Token kind 'heading'")]
    fn unregistered_kind_is_fatal() {
        let renderer = Renderer::new(&Dialect::transcript());
        let heading = Token::Heading {
            level: 1,
            children: vec![Token::PlainText("x".into())],
        };
        renderer.render(&[heading], RenderMode::Html);
    }

    #[test]
    fn render_mode_parses_cli_spellings() {
        assert_eq!("HTML".parse::<RenderMode>().unwrap(), RenderMode::Html);
        assert_eq!("text".parse::<RenderMode>().unwrap(), RenderMode::PlainText);
        assert!("pdf".parse::<RenderMode>().is_err());
        assert_eq!(RenderMode::PlainText.to_string(), "text");
    }

    #[test]
    fn renderer_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Renderer>();
    }
}
