//! Message-level rendering through the transcript dialect

use modmail_logs::modmail::testing::assert_tokens;
use modmail_logs::modmail::{Dialect, Parser, RenderMode, TokenKind, TranscriptRenderer};
use rstest::rstest;

fn html(source: &str) -> String {
    TranscriptRenderer::default().render_message_content(source, RenderMode::Html)
}

fn text(source: &str) -> String {
    TranscriptRenderer::default().render_message_content(source, RenderMode::PlainText)
}

#[rstest]
#[case::heading("# Heading", "# Heading")]
#[case::bullet_list("- item", "- item")]
#[case::ordered_list("1. item", "1. item")]
#[case::raw_quote("> quote", "&gt; quote")]
#[case::escaped_quote("&gt; quote", "&gt; quote")]
#[case::table("| a | b |\n|---|---|", "| a | b |<br />\n|---|---|")]
#[case::footnote("[^1]: note", "[^1]: note")]
#[case::autolink("<https://example.com>", "&lt;https://example.com&gt;")]
fn disabled_kinds_render_as_literal_text(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(html(source), expected);
}

#[rstest]
#[case::user("&lt;@123&gt;", r#"<span class="mention">&lt;@123&gt;</span>"#)]
#[case::nickname("&lt;@!123&gt;", r#"<span class="mention">&lt;@!123&gt;</span>"#)]
#[case::channel("&lt;#456&gt;", r#"<span class="mention">&lt;#456&gt;</span>"#)]
#[case::everyone("@everyone", r#"<span class="mention">@everyone</span>"#)]
#[case::here("ping @here now", r#"ping <span class="mention">@here</span> now"#)]
#[case::in_emphasis(
    "*hey &lt;@1&gt;*",
    r#"<em>hey <span class="mention">&lt;@1&gt;</span></em>"#
)]
#[case::in_code("`&lt;@1&gt;`", r#"<code class="pre--inline">&lt;@1&gt;</code>"#)]
#[case::not_numeric("&lt;@abc&gt;", "&lt;@abc&gt;")]
fn mentions(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(html(source), expected);
}

#[rstest]
#[case::raw("<script>alert(1)</script>")]
#[case::pre_escaped("&lt;script&gt;alert(1)&lt;/script&gt;")]
fn script_tags_are_neutralized(#[case] source: &str) {
    let output = html(source);
    assert_eq!(output, "&lt;script&gt;alert(1)&lt;/script&gt;");
    assert!(!output.contains("<script"));
}

#[rstest]
#[case::emphasis(r"*a\*", "*a*")]
#[case::strong(r"**a\**", "**a**")]
#[case::strikethrough(r"~~a\~~", "~~a~~")]
#[case::link(r"[a\](https://e.com)", "[a](https://e.com)")]
fn escaped_closing_delimiters_stay_literal(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(html(source), expected);
    assert_eq!(text(source), expected);
}

#[test]
fn inline_code() {
    assert_eq!(html("`inline`"), r#"<code class="pre--inline">inline</code>"#);
}

#[test]
fn line_breaks_and_paragraphs() {
    assert_eq!(html("line1\nline2"), "line1<br />\nline2");
    assert_eq!(html("line1\n\nline2"), "line1\nline2");

    let tokens = Parser::default().parse("line1\n\nline2");
    assert_tokens(&tokens)
        .kinds(&[TokenKind::Paragraph, TokenKind::Paragraph])
        .token(0, |p| {
            p.child_count(1).child(0, |t| {
                t.plain("line1");
            });
        });
}

#[test]
fn escaping_happens_once() {
    assert_eq!(html(r#"a < b > c & "d""#), "a &lt; b &gt; c &amp; &quot;d&quot;");
    assert_eq!(html("a &lt; b &amp; c"), "a &lt; b &amp; c");
    assert_eq!(html("&amp;lt;"), "&amp;lt;");
}

#[test]
fn rendering_rendered_text_is_stable() {
    let once = html(r#"x < y && "z" > w"#);
    assert_eq!(html(&once), once);
}

#[test]
fn code_block_language_cannot_break_out() {
    let output = html("```\"><script>\nx\n```");
    assert!(!output.contains("<script"));
    assert!(output.starts_with(r#"<pre class="pre--multiline"><code class="language-&quot;&gt;&lt;script&gt;">"#));
}

#[test]
fn unsafe_links_stay_text() {
    let output = html("[click](javascript:void)");
    assert_eq!(output, "[click](javascript:void)");
    assert!(!output.contains("href"));
}

#[rstest]
#[case::markup("**bold** _em_ ~~del~~", "bold em del")]
#[case::mention("&lt;@123&gt; hi", "<@123> hi")]
#[case::code("`a < b`", "a < b")]
#[case::lines("a\nb\n\nc", "a\nb\n\nc")]
#[case::disabled("# not a heading", "# not a heading")]
#[case::block_code("```\n<b>\n```", "<b>")]
fn plain_text_mode(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(text(source), expected);
}

#[test]
fn extended_dialect_keeps_document_structure() {
    let dialect = Dialect::extended();
    let tokens = Parser::new(dialect).parse("# Title\n\n- a\n- b\n\n> quoted");
    assert_tokens(&tokens).kinds(&[TokenKind::Heading, TokenKind::List, TokenKind::Quote]);
}

#[test]
fn message_with_mixed_content_snapshot() {
    let output = html("Hi &lt;@42&gt;, see **[the docs](https://example.com/docs)**:\n```sh\nrm -rf &quot;/tmp/x&quot;\n```\nthanks!");
    insta::assert_snapshot!(output, @r#"
    Hi <span class="mention">&lt;@42&gt;</span>, see <strong><a href="https://example.com/docs">the docs</a></strong>:
    <pre class="pre--multiline"><code class="language-sh">rm -rf &quot;/tmp/x&quot;</code></pre>
    thanks!
    "#);
}
