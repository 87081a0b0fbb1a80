//! HTML rules
//!
//! Transcripts are a flat stream of messages, so paragraphs get no wrapper element and line
//! breaks become `<br />`. Every piece of user text passes through [escape_html] exactly
//! once, attribute values included.

use super::{RenderMode, Renderer, Rule};
use crate::modmail::lexing::escape_html;
use crate::modmail::token::{Cell, Token, TokenKind};
use std::fmt::Write;

pub(super) fn rule_for(kind: TokenKind) -> Rule {
    match kind {
        TokenKind::Paragraph => paragraph,
        TokenKind::Heading => heading,
        TokenKind::Quote => quote,
        TokenKind::List => list,
        TokenKind::Table => table,
        TokenKind::Footnote => footnote,
        TokenKind::ThematicBreak => thematic_break,
        TokenKind::BlockCode => block_code,
        // Escapes resolve to PlainText during parsing
        TokenKind::EscapeSequence | TokenKind::PlainText => plain_text,
        TokenKind::InlineCode => inline_code,
        TokenKind::AutoLink => auto_link,
        TokenKind::Mention => mention,
        TokenKind::Image => image,
        TokenKind::Link => link,
        TokenKind::Strikethrough => strikethrough,
        TokenKind::Strong => strong,
        TokenKind::Emphasis => emphasis,
        TokenKind::LineBreak => line_break,
    }
}

fn inline(r: &Renderer, tokens: &[Token], out: &mut String) {
    r.render_inline(tokens, RenderMode::Html, out);
}

fn wrap(r: &Renderer, tag: &str, tokens: &[Token], out: &mut String) {
    let _ = write!(out, "<{tag}>");
    inline(r, tokens, out);
    let _ = write!(out, "</{tag}>");
}

fn paragraph(r: &Renderer, token: &Token, out: &mut String) {
    inline(r, token.children(), out);
}

fn plain_text(_: &Renderer, token: &Token, out: &mut String) {
    if let Token::PlainText(text) = token {
        out.push_str(&escape_html(text));
    }
}

fn line_break(_: &Renderer, _: &Token, out: &mut String) {
    out.push_str("<br />\n");
}

fn inline_code(_: &Renderer, token: &Token, out: &mut String) {
    if let Token::InlineCode(code) = token {
        let _ = write!(out, r#"<code class="pre--inline">{}</code>"#, escape_html(code));
    }
}

fn block_code(_: &Renderer, token: &Token, out: &mut String) {
    if let Token::BlockCode { language, content } = token {
        out.push_str(r#"<pre class="pre--multiline"><code"#);
        if let Some(language) = language {
            let _ = write!(out, r#" class="language-{}""#, escape_html(language));
        }
        let _ = write!(out, ">{}</code></pre>", escape_html(content));
    }
}

fn mention(_: &Renderer, token: &Token, out: &mut String) {
    if let Token::Mention(target) = token {
        let _ = write!(out, r#"<span class="mention">{}</span>"#, escape_html(target));
    }
}

fn strong(r: &Renderer, token: &Token, out: &mut String) {
    wrap(r, "strong", token.children(), out);
}

fn emphasis(r: &Renderer, token: &Token, out: &mut String) {
    wrap(r, "em", token.children(), out);
}

fn strikethrough(r: &Renderer, token: &Token, out: &mut String) {
    wrap(r, "del", token.children(), out);
}

fn link(r: &Renderer, token: &Token, out: &mut String) {
    if let Token::Link { target, children } = token {
        let _ = write!(out, r#"<a href="{}">"#, escape_html(target));
        inline(r, children, out);
        out.push_str("</a>");
    }
}

fn auto_link(_: &Renderer, token: &Token, out: &mut String) {
    if let Token::AutoLink(target) = token {
        let href = if target.contains('@') && !target.contains(':') {
            format!("mailto:{target}")
        } else {
            target.clone()
        };
        let _ = write!(
            out,
            r#"<a href="{}">{}</a>"#,
            escape_html(&href),
            escape_html(target)
        );
    }
}

fn image(_: &Renderer, token: &Token, out: &mut String) {
    if let Token::Image { src, alt } = token {
        let _ = write!(
            out,
            r#"<img src="{}" alt="{}" />"#,
            escape_html(src),
            escape_html(alt)
        );
    }
}

fn heading(r: &Renderer, token: &Token, out: &mut String) {
    if let Token::Heading { level, children } = token {
        let level = (*level).clamp(1, 6);
        let _ = write!(out, "<h{level}>");
        inline(r, children, out);
        let _ = write!(out, "</h{level}>");
    }
}

fn quote(r: &Renderer, token: &Token, out: &mut String) {
    wrap(r, "blockquote", token.children(), out);
}

fn list(r: &Renderer, token: &Token, out: &mut String) {
    if let Token::List { start, items } = token {
        let tag = match start {
            None => {
                out.push_str("<ul>\n");
                "ul"
            }
            Some(1) => {
                out.push_str("<ol>\n");
                "ol"
            }
            Some(n) => {
                let _ = writeln!(out, r#"<ol start="{n}">"#);
                "ol"
            }
        };
        for item in items {
            wrap(r, "li", item, out);
            out.push('\n');
        }
        let _ = write!(out, "</{tag}>");
    }
}

fn table(r: &Renderer, token: &Token, out: &mut String) {
    if let Token::Table { header, rows } = token {
        out.push_str("<table>\n<thead>\n");
        table_row(r, "th", header, out);
        out.push_str("</thead>\n");
        if !rows.is_empty() {
            out.push_str("<tbody>\n");
            for row in rows {
                table_row(r, "td", row, out);
            }
            out.push_str("</tbody>\n");
        }
        out.push_str("</table>");
    }
}

fn table_row(r: &Renderer, tag: &str, cells: &[Cell], out: &mut String) {
    out.push_str("<tr>");
    for cell in cells {
        wrap(r, tag, cell, out);
    }
    out.push_str("</tr>\n");
}

fn footnote(r: &Renderer, token: &Token, out: &mut String) {
    if let Token::Footnote { label, children } = token {
        let label = escape_html(label);
        let _ = write!(
            out,
            r#"<p class="footnote" id="fn-{label}"><sup>{label}</sup> "#
        );
        inline(r, children, out);
        out.push_str("</p>");
    }
}

fn thematic_break(_: &Renderer, _: &Token, out: &mut String) {
    out.push_str("<hr />");
}

#[cfg(test)]
mod tests {
    use crate::modmail::dialect::Dialect;
    use crate::modmail::formats::{RenderMode, Renderer};
    use crate::modmail::parsing::Parser;

    fn render_with(dialect: Dialect, source: &str) -> String {
        let tokens = Parser::new(dialect.clone()).parse(source);
        Renderer::new(&dialect).render(&tokens, RenderMode::Html)
    }

    fn render(source: &str) -> String {
        render_with(Dialect::transcript(), source)
    }

    #[test]
    fn escapes_plain_text() {
        assert_eq!(render(r#"a < b & "c""#), "a &lt; b &amp; &quot;c&quot;");
    }

    #[test]
    fn paragraphs_have_no_wrapper() {
        assert_eq!(render("line1\nline2"), "line1<br />\nline2");
        assert_eq!(render("line1\n\nline2"), "line1\nline2");
    }

    #[test]
    fn inline_code_uses_fixed_class() {
        assert_eq!(
            render("`<b>`"),
            r#"<code class="pre--inline">&lt;b&gt;</code>"#
        );
    }

    #[test]
    fn block_code_escapes_language_hint() {
        assert_eq!(
            render("```x\"onmouseover=\"y\n<i>\n```"),
            r#"<pre class="pre--multiline"><code class="language-x&quot;onmouseover=&quot;y">&lt;i&gt;</code></pre>"#
        );
        assert_eq!(
            render("```\ncode\n```"),
            r#"<pre class="pre--multiline"><code>code</code></pre>"#
        );
    }

    #[test]
    fn mentions_are_spans() {
        assert_eq!(
            render("hi @everyone"),
            r#"hi <span class="mention">@everyone</span>"#
        );
    }

    #[test]
    fn inline_containers() {
        assert_eq!(
            render("**a** *b* ~~c~~"),
            "<strong>a</strong> <em>b</em> <del>c</del>"
        );
    }

    #[test]
    fn links_and_images() {
        assert_eq!(
            render("[docs](https://example.com/?a=1&b=2)"),
            r#"<a href="https://example.com/?a=1&amp;b=2">docs</a>"#
        );
        assert_eq!(
            render("![a \"cat\"](cat.png)"),
            r#"<img src="cat.png" alt="a &quot;cat&quot;" />"#
        );
        assert_eq!(
            render("[x](javascript:alert(1))"),
            "[x](javascript:alert(1))"
        );
    }

    #[test]
    fn thematic_break() {
        assert_eq!(render("a\n\n---\n\nb"), "a\n<hr />\nb");
    }

    #[test]
    fn extended_blocks() {
        let dialect = Dialect::extended();
        assert_eq!(render_with(dialect.clone(), "## Title"), "<h2>Title</h2>");
        assert_eq!(
            render_with(dialect.clone(), "> a\n> b"),
            "<blockquote>a<br />\nb</blockquote>"
        );
        assert_eq!(
            render_with(dialect.clone(), "- a\n- b"),
            "<ul>\n<li>a</li>\n<li>b</li>\n</ul>"
        );
        assert_eq!(
            render_with(dialect.clone(), "2. a"),
            "<ol start=\"2\">\n<li>a</li>\n</ol>"
        );
        assert_eq!(
            render_with(dialect.clone(), "| a | b |\n|---|---|\n| 1 | 2 |"),
            "<table>\n<thead>\n<tr><th>a</th><th>b</th></tr>\n</thead>\n<tbody>\n<tr><td>1</td><td>2</td></tr>\n</tbody>\n</table>"
        );
        assert_eq!(
            render_with(dialect.clone(), "[^1]: note"),
            r#"<p class="footnote" id="fn-1"><sup>1</sup> note</p>"#
        );
        assert_eq!(
            render_with(dialect, "<mod@example.com> <https://example.com>"),
            r#"<a href="mailto:mod@example.com">mod@example.com</a> <a href="https://example.com">https://example.com</a>"#
        );
    }
}
