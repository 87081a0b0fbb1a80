//! Plain-text rules
//!
//! Structure is flattened: wrappers disappear, line breaks become newlines. Payloads are
//! emitted as their literal text since plain text has no markup to protect.

use super::{RenderMode, Renderer, Rule};
use crate::modmail::token::{Token, TokenKind};
use std::fmt::Write;

pub(super) fn rule_for(kind: TokenKind) -> Rule {
    match kind {
        TokenKind::Paragraph
        | TokenKind::Heading
        | TokenKind::Strikethrough
        | TokenKind::Strong
        | TokenKind::Emphasis => children,
        TokenKind::Quote => quote,
        TokenKind::List => list,
        TokenKind::Table => table,
        TokenKind::Footnote => footnote,
        TokenKind::ThematicBreak => thematic_break,
        TokenKind::BlockCode => block_code,
        TokenKind::EscapeSequence
        | TokenKind::PlainText
        | TokenKind::InlineCode
        | TokenKind::AutoLink
        | TokenKind::Mention => literal,
        TokenKind::Image => image,
        TokenKind::Link => link,
        TokenKind::LineBreak => line_break,
    }
}

fn inline(r: &Renderer, tokens: &[Token], out: &mut String) {
    r.render_inline(tokens, RenderMode::PlainText, out);
}

fn children(r: &Renderer, token: &Token, out: &mut String) {
    inline(r, token.children(), out);
}

fn literal(_: &Renderer, token: &Token, out: &mut String) {
    match token {
        Token::PlainText(text)
        | Token::InlineCode(text)
        | Token::AutoLink(text)
        | Token::Mention(text) => out.push_str(text),
        _ => {}
    }
}

fn line_break(_: &Renderer, _: &Token, out: &mut String) {
    out.push('\n');
}

fn block_code(_: &Renderer, token: &Token, out: &mut String) {
    if let Token::BlockCode { content, .. } = token {
        out.push_str(content);
    }
}

fn image(_: &Renderer, token: &Token, out: &mut String) {
    if let Token::Image { alt, .. } = token {
        out.push_str(alt);
    }
}

/// `text (target)`, or just the target when the text already is the target
fn link(r: &Renderer, token: &Token, out: &mut String) {
    if let Token::Link { target, children } = token {
        let mut text = String::new();
        inline(r, children, &mut text);
        if text == *target || text.is_empty() {
            out.push_str(target);
        } else {
            let _ = write!(out, "{text} ({target})");
        }
    }
}

fn quote(r: &Renderer, token: &Token, out: &mut String) {
    let mut text = String::new();
    inline(r, token.children(), &mut text);
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str("> ");
        out.push_str(line);
    }
}

fn list(r: &Renderer, token: &Token, out: &mut String) {
    if let Token::List { start, items } = token {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            match start {
                Some(n) => {
                    let _ = write!(out, "{}. ", n + i as u64);
                }
                None => out.push_str("- "),
            }
            let mut text = String::new();
            inline(r, item, &mut text);
            out.push_str(&text.replace('\n', "\n  "));
        }
    }
}

fn table(r: &Renderer, token: &Token, out: &mut String) {
    if let Token::Table { header, rows } = token {
        for (i, row) in std::iter::once(header).chain(rows).enumerate() {
            if i > 0 {
                out.push('\n');
            }
            let cells: Vec<String> = row
                .iter()
                .map(|cell| {
                    let mut text = String::new();
                    inline(r, cell, &mut text);
                    text
                })
                .collect();
            out.push_str(&cells.join(" | "));
        }
    }
}

fn footnote(r: &Renderer, token: &Token, out: &mut String) {
    if let Token::Footnote { label, children } = token {
        let _ = write!(out, "[^{label}]: ");
        inline(r, children, out);
    }
}

fn thematic_break(_: &Renderer, _: &Token, out: &mut String) {
    out.push_str("---");
}
