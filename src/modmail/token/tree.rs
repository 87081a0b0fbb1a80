//! The parsed token tree

use super::kind::TokenKind;

/// One table cell: inline tokens
pub type Cell = Vec<Token>;

/// A parsed unit of message content.
///
/// Container variants own their children in source order. Literal variants (`InlineCode`,
/// `BlockCode`, `Mention`, `AutoLink`, `Image`) carry the matched text and are never parsed
/// again. Payloads hold literal text: escaping is the renderer's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Paragraph(Vec<Token>),
    Heading {
        level: u8,
        children: Vec<Token>,
    },
    Quote(Vec<Token>),
    List {
        /// First number of an ordered list; None for bullet lists
        start: Option<u64>,
        items: Vec<Vec<Token>>,
    },
    Table {
        header: Vec<Cell>,
        rows: Vec<Vec<Cell>>,
    },
    Footnote {
        label: String,
        children: Vec<Token>,
    },
    ThematicBreak,
    BlockCode {
        language: Option<String>,
        content: String,
    },
    PlainText(String),
    LineBreak,
    InlineCode(String),
    AutoLink(String),
    Mention(String),
    Image {
        src: String,
        alt: String,
    },
    Link {
        target: String,
        children: Vec<Token>,
    },
    Strikethrough(Vec<Token>),
    Strong(Vec<Token>),
    Emphasis(Vec<Token>),
}

impl Token {
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Paragraph(_) => TokenKind::Paragraph,
            Token::Heading { .. } => TokenKind::Heading,
            Token::Quote(_) => TokenKind::Quote,
            Token::List { .. } => TokenKind::List,
            Token::Table { .. } => TokenKind::Table,
            Token::Footnote { .. } => TokenKind::Footnote,
            Token::ThematicBreak => TokenKind::ThematicBreak,
            Token::BlockCode { .. } => TokenKind::BlockCode,
            Token::PlainText(_) => TokenKind::PlainText,
            Token::LineBreak => TokenKind::LineBreak,
            Token::InlineCode(_) => TokenKind::InlineCode,
            Token::AutoLink(_) => TokenKind::AutoLink,
            Token::Mention(_) => TokenKind::Mention,
            Token::Image { .. } => TokenKind::Image,
            Token::Link { .. } => TokenKind::Link,
            Token::Strikethrough(_) => TokenKind::Strikethrough,
            Token::Strong(_) => TokenKind::Strong,
            Token::Emphasis(_) => TokenKind::Emphasis,
        }
    }

    /// Direct inline children of container tokens. Lists and tables expose nothing here;
    /// their cells and items are reached through the variant fields.
    pub fn children(&self) -> &[Token] {
        match self {
            Token::Paragraph(children)
            | Token::Quote(children)
            | Token::Strikethrough(children)
            | Token::Strong(children)
            | Token::Emphasis(children)
            | Token::Heading { children, .. }
            | Token::Footnote { children, .. }
            | Token::Link { children, .. } => children,
            _ => &[],
        }
    }

    /// Concatenated literal text, without any markup
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Token::PlainText(text)
            | Token::InlineCode(text)
            | Token::AutoLink(text)
            | Token::Mention(text) => out.push_str(text),
            Token::BlockCode { content, .. } => out.push_str(content),
            Token::Image { alt, .. } => out.push_str(alt),
            Token::LineBreak => out.push('\n'),
            Token::ThematicBreak => {}
            Token::List { items, .. } => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push('\n');
                    }
                    item.iter().for_each(|token| token.collect_text(out));
                }
            }
            Token::Table { header, rows } => {
                for (i, row) in std::iter::once(header).chain(rows).enumerate() {
                    if i > 0 {
                        out.push('\n');
                    }
                    for (j, cell) in row.iter().enumerate() {
                        if j > 0 {
                            out.push(' ');
                        }
                        cell.iter().for_each(|token| token.collect_text(out));
                    }
                }
            }
            _ => self
                .children()
                .iter()
                .for_each(|token| token.collect_text(out)),
        }
    }
}
