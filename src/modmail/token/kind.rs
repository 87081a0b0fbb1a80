//! The closed set of token kinds

use crate::modmail::error::Error;
use enum_map::Enum;
use std::fmt;
use std::str::FromStr;

/// Whether a kind is recognized per line or inside a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KindClass {
    Block,
    Span,
}

/// Every token kind the parser and renderer know about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Consecutive non-blank lines
    Paragraph,
    /// ATX heading: `# title`
    Heading,
    /// Block quote: `> text`
    Quote,
    /// Bullet or ordered list: `- item`, `1. item`
    List,
    /// Pipe table with a delimiter row
    Table,
    /// Footnote definition: `[^label]: text`
    Footnote,
    /// `---`, `***`, `___`
    ThematicBreak,
    /// Fenced (```` ``` ````) or indented code block
    BlockCode,
    /// Backslash escape of an ASCII punctuation character
    EscapeSequence,
    /// `` `code` `` (literal)
    InlineCode,
    /// `<https://example.com>` (literal)
    AutoLink,
    /// `<@123>`, `<@!123>`, `<#123>`, `@everyone`, `@here` (literal)
    Mention,
    /// `![alt](src)` (literal)
    Image,
    /// `[text](target)`
    Link,
    /// `~~text~~`
    Strikethrough,
    /// `**text**`, `__text__`
    Strong,
    /// `*text*`, `_text_`
    Emphasis,
    /// Literal text
    PlainText,
    /// A line break inside a paragraph
    LineBreak,
}

impl TokenKind {
    pub const ALL: [TokenKind; 19] = [
        TokenKind::Paragraph,
        TokenKind::Heading,
        TokenKind::Quote,
        TokenKind::List,
        TokenKind::Table,
        TokenKind::Footnote,
        TokenKind::ThematicBreak,
        TokenKind::BlockCode,
        TokenKind::EscapeSequence,
        TokenKind::InlineCode,
        TokenKind::AutoLink,
        TokenKind::Mention,
        TokenKind::Image,
        TokenKind::Link,
        TokenKind::Strikethrough,
        TokenKind::Strong,
        TokenKind::Emphasis,
        TokenKind::PlainText,
        TokenKind::LineBreak,
    ];

    /// Name used in configuration files and CLI output
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Paragraph => "paragraph",
            TokenKind::Heading => "heading",
            TokenKind::Quote => "quote",
            TokenKind::List => "list",
            TokenKind::Table => "table",
            TokenKind::Footnote => "footnote",
            TokenKind::ThematicBreak => "thematic_break",
            TokenKind::BlockCode => "block_code",
            TokenKind::EscapeSequence => "escape_sequence",
            TokenKind::InlineCode => "inline_code",
            TokenKind::AutoLink => "auto_link",
            TokenKind::Mention => "mention",
            TokenKind::Image => "image",
            TokenKind::Link => "link",
            TokenKind::Strikethrough => "strikethrough",
            TokenKind::Strong => "strong",
            TokenKind::Emphasis => "emphasis",
            TokenKind::PlainText => "plain_text",
            TokenKind::LineBreak => "line_break",
        }
    }

    pub fn class(self) -> KindClass {
        match self {
            TokenKind::Paragraph
            | TokenKind::Heading
            | TokenKind::Quote
            | TokenKind::List
            | TokenKind::Table
            | TokenKind::Footnote
            | TokenKind::ThematicBreak
            | TokenKind::BlockCode => KindClass::Block,
            _ => KindClass::Span,
        }
    }

    /// Structural kinds are always enabled and cannot be removed from a dialect
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            TokenKind::Paragraph | TokenKind::PlainText | TokenKind::LineBreak
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TokenKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        TokenKind::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| Error::UnknownKind(s.to_string()))
    }
}
