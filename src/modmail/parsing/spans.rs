//! Span stage: one line of text → inline tokens
//!
//!     Every enabled span kind is tried in ascending precedence order. A kind scans the whole
//!     line for candidates; a candidate is accepted unless it sits inside, or crosses the
//!     boundary of, a span accepted earlier. Enclosing an earlier span is fine as long as the
//!     earlier span does not touch the candidate's own delimiters: the earlier span is found
//!     again when the enclosing span's inner text is parsed. An escaped `*` therefore never
//!     closes emphasis, and an escaped `]` never ends link text. This is what keeps
//!     a mention whole when an emphasis match would cut through it, and what keeps anything
//!     inside inline code literal.
//!
//!     Accepted spans are then emitted left to right (outermost first); the gaps become
//!     PlainText. Nested kinds (links, strikethrough, strong, emphasis) parse their inner text
//!     recursively, up to [MAX_NESTING] levels, after which inner text stays literal.

use crate::modmail::lexing::is_safe_url;
use crate::modmail::token::spec::pattern_for;
use crate::modmail::token::{KindClass, Token, TokenKind};
use crate::modmail::Dialect;
use regex::Captures;
use std::ops::Range;

/// Nesting depth after which span text is no longer parsed
pub const MAX_NESTING: usize = 16;

/// What an accepted span turns into
enum Shape {
    Done(Token),
    Nested {
        inner: Range<usize>,
        wrap: fn(Vec<Token>) -> Token,
    },
    Link {
        inner: Range<usize>,
        target_at: Range<usize>,
        target: String,
    },
}

struct Candidate {
    range: Range<usize>,
    shape: Shape,
}

impl Candidate {
    /// Byte ranges of the markup around the parsed text, e.g. `**` and `**`, or `[` and `](` and `)`
    fn delimiters(&self) -> Vec<Range<usize>> {
        let Range { start, end } = self.range;
        match &self.shape {
            Shape::Done(_) => Vec::new(),
            Shape::Nested { inner, .. } => vec![start..inner.start, inner.end..end],
            Shape::Link {
                inner, target_at, ..
            } => vec![
                start..inner.start,
                inner.end..target_at.start,
                target_at.end..end,
            ],
        }
    }
}

/// Parse one line with the dialect's span kinds
pub(super) fn parse_spans(text: &str, dialect: &Dialect) -> Vec<Token> {
    let kinds = dialect.kinds_by_precedence(KindClass::Span);
    parse_nested(text, &kinds, 0)
}

fn parse_nested(text: &str, kinds: &[TokenKind], depth: usize) -> Vec<Token> {
    let mut tokens = Vec::new();
    if depth >= MAX_NESTING || kinds.is_empty() {
        push_text(&mut tokens, text);
        return tokens;
    }

    let mut accepted: Vec<Candidate> = Vec::new();
    for &kind in kinds {
        let mut pos = 0;
        while pos < text.len() {
            let Some(candidate) = find_candidate(kind, text, pos) else {
                break;
            };
            if accepted
                .iter()
                .all(|other| !conflicts(&other.range, &candidate))
            {
                pos = candidate.range.end;
                accepted.push(candidate);
            } else {
                pos = next_boundary(text, candidate.range.start);
            }
        }
    }

    accepted.sort_by(|a, b| {
        a.range
            .start
            .cmp(&b.range.start)
            .then(b.range.end.cmp(&a.range.end))
    });

    let mut cursor = 0;
    for candidate in accepted {
        // Enclosed by a span already emitted
        if candidate.range.start < cursor {
            continue;
        }
        push_text(&mut tokens, &text[cursor..candidate.range.start]);
        cursor = candidate.range.end;
        let token = match candidate.shape {
            Shape::Done(token) => token,
            Shape::Nested { inner, wrap } => wrap(parse_nested(&text[inner], kinds, depth + 1)),
            Shape::Link { inner, target, .. } => Token::Link {
                target,
                children: parse_nested(&text[inner], kinds, depth + 1),
            },
        };
        push_token(&mut tokens, token);
    }
    push_text(&mut tokens, &text[cursor..]);
    tokens
}

/// A new candidate conflicts with an accepted span when it lies inside it, crosses it, or
/// encloses it while the accepted span overlaps one of the candidate's delimiters.
fn conflicts(accepted: &Range<usize>, candidate: &Candidate) -> bool {
    let range = &candidate.range;
    let disjoint = range.end <= accepted.start || range.start >= accepted.end;
    if disjoint {
        return false;
    }
    let encloses = range.start <= accepted.start && range.end >= accepted.end && range != accepted;
    !encloses || candidate.delimiters().iter().any(|d| overlaps(d, accepted))
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

fn find_candidate(kind: TokenKind, text: &str, pos: usize) -> Option<Candidate> {
    if kind == TokenKind::InlineCode {
        return find_code_span(text, pos);
    }

    let pattern = pattern_for(kind)?;
    let mut from = pos;
    while from <= text.len() {
        let caps = pattern.captures_at(text, from)?;
        let whole = caps.get(0)?;
        if let Some(shape) = shape_of(kind, text, &caps) {
            return Some(Candidate {
                range: whole.range(),
                shape,
            });
        }
        from = next_boundary(text, whole.start());
    }
    None
}

/// Validate a raw match and decide its shape. None rejects the match.
fn shape_of(kind: TokenKind, text: &str, caps: &Captures<'_>) -> Option<Shape> {
    let whole = caps.get(0)?;
    match kind {
        TokenKind::EscapeSequence => {
            let escaped = caps.name("inner")?.as_str();
            Some(Shape::Done(Token::PlainText(escaped.to_string())))
        }
        TokenKind::AutoLink => {
            let target = caps.name("inner")?.as_str();
            let is_email = target.contains('@') && !target.contains(':');
            (is_email || is_safe_url(target))
                .then(|| Shape::Done(Token::AutoLink(target.to_string())))
        }
        TokenKind::Mention => Some(Shape::Done(Token::Mention(whole.as_str().to_string()))),
        TokenKind::Image => {
            let src = caps.name("src")?.as_str();
            is_safe_url(src).then(|| {
                Shape::Done(Token::Image {
                    src: src.to_string(),
                    alt: caps.name("alt").map_or("", |m| m.as_str()).to_string(),
                })
            })
        }
        TokenKind::Link => {
            let target = caps.name("target")?;
            is_safe_url(target.as_str()).then(|| Shape::Link {
                inner: caps.name("text").map_or(0..0, |m| m.range()),
                target_at: target.range(),
                target: target.as_str().to_string(),
            })
        }
        TokenKind::Strikethrough => Some(Shape::Nested {
            inner: caps.name("inner")?.range(),
            wrap: Token::Strikethrough,
        }),
        TokenKind::Strong | TokenKind::Emphasis => {
            let wrap = if kind == TokenKind::Strong {
                Token::Strong
            } else {
                Token::Emphasis
            };
            if let Some(inner) = caps.name("star") {
                return Some(Shape::Nested {
                    inner: inner.range(),
                    wrap,
                });
            }
            // Underscores never open or close inside a word
            let inner = caps.name("under")?;
            let before = text[..whole.start()].chars().next_back();
            let after = text[whole.end()..].chars().next();
            (!is_word(before) && !is_word(after)).then_some(Shape::Nested {
                inner: inner.range(),
                wrap,
            })
        }
        _ => None,
    }
}

/// Inline code: an opening backtick run closed by the next run of the same length.
/// Runs without a partner stay literal.
fn find_code_span(text: &str, pos: usize) -> Option<Candidate> {
    let runs = pattern_for(TokenKind::InlineCode)?;
    let mut from = pos;
    while let Some(open) = runs.find_at(text, from) {
        let mut search = open.end();
        while let Some(close) = runs.find_at(text, search) {
            if close.len() == open.len() {
                return Some(Candidate {
                    range: open.start()..close.end(),
                    shape: Shape::Done(Token::InlineCode(code_content(
                        &text[open.end()..close.start()],
                    ))),
                });
            }
            search = close.end();
        }
        from = open.end();
    }
    None
}

/// One leading and one trailing space are stripped when both are present
fn code_content(raw: &str) -> String {
    let padded = raw.len() >= 2 && raw.starts_with(' ') && raw.ends_with(' ');
    if padded && !raw.trim().is_empty() {
        raw[1..raw.len() - 1].to_string()
    } else {
        raw.to_string()
    }
}

fn push_text(tokens: &mut Vec<Token>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Token::PlainText(existing)) = tokens.last_mut() {
        existing.push_str(text);
    } else {
        tokens.push(Token::PlainText(text.to_string()));
    }
}

fn push_token(tokens: &mut Vec<Token>, token: Token) {
    match token {
        Token::PlainText(text) => push_text(tokens, &text),
        other => tokens.push(other),
    }
}

fn next_boundary(text: &str, index: usize) -> usize {
    index + text[index..].chars().next().map_or(1, char::len_utf8)
}

fn is_word(ch: Option<char>) -> bool {
    ch.map(|c| c.is_alphanumeric()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(text: &str) -> Vec<Token> {
        parse_spans(text, &Dialect::transcript())
    }

    fn plain(text: &str) -> Token {
        Token::PlainText(text.to_string())
    }

    #[test]
    fn parses_plain_text() {
        assert_eq!(spans("hello world"), vec![plain("hello world")]);
    }

    #[test]
    fn parses_strong_and_emphasis() {
        assert_eq!(
            spans("**strong _inner_** text"),
            vec![
                Token::Strong(vec![
                    plain("strong "),
                    Token::Emphasis(vec![plain("inner")])
                ]),
                plain(" text"),
            ]
        );
    }

    #[test]
    fn inline_code_is_literal() {
        assert_eq!(
            spans("`a * literal _` text"),
            vec![Token::InlineCode("a * literal _".into()), plain(" text")]
        );
    }

    #[test]
    fn double_backticks_may_contain_single_ones() {
        assert_eq!(
            spans("`` a ` b ``"),
            vec![Token::InlineCode("a ` b".into())]
        );
    }

    #[test]
    fn unmatched_backtick_run_is_literal() {
        assert_eq!(spans("``not closed`"), vec![plain("``not closed`")]);
    }

    #[test]
    fn mentions_are_recognized() {
        assert_eq!(
            spans("ping <@!42> and @here"),
            vec![
                plain("ping "),
                Token::Mention("<@!42>".into()),
                plain(" and "),
                Token::Mention("@here".into()),
            ]
        );
    }

    #[test]
    fn emphasis_encloses_mentions_whole() {
        assert_eq!(
            spans("*see <@12>*"),
            vec![Token::Emphasis(vec![
                plain("see "),
                Token::Mention("<@12>".into())
            ])]
        );
        assert_eq!(
            spans("<@12>*"),
            vec![Token::Mention("<@12>".into()), plain("*")]
        );
    }

    #[test]
    fn mention_inside_code_stays_code() {
        assert_eq!(spans("`<@12>`"), vec![Token::InlineCode("<@12>".into())]);
    }

    #[test]
    fn escaped_delimiters_are_literal() {
        assert_eq!(spans(r"\*literal\*"), vec![plain("*literal*")]);
        assert_eq!(spans(r"\<@12>"), vec![plain("<@12>")]);
    }

    #[test]
    fn escaped_closing_delimiters_do_not_close() {
        assert_eq!(spans(r"*a\*"), vec![plain("*a*")]);
        assert_eq!(spans(r"**a\**"), vec![plain("**a**")]);
        assert_eq!(spans(r"~~a\~~"), vec![plain("~~a~~")]);
        assert_eq!(spans(r"_a\_"), vec![plain("_a_")]);
        assert_eq!(
            spans(r"[a\](https://e.com)"),
            vec![plain("[a](https://e.com)")]
        );
    }

    #[test]
    fn escapes_inside_the_text_still_nest() {
        assert_eq!(
            spans(r"**a\*b**"),
            vec![Token::Strong(vec![plain("a*b")])]
        );
        assert_eq!(
            spans(r"[a\*b](https://e.com)"),
            vec![Token::Link {
                target: "https://e.com".into(),
                children: vec![plain("a*b")],
            }]
        );
    }

    #[test]
    fn mentions_inside_link_targets_keep_the_link() {
        assert_eq!(
            spans("[ping](https://e.com/@here)"),
            vec![Token::Link {
                target: "https://e.com/@here".into(),
                children: vec![plain("ping")],
            }]
        );
    }

    #[test]
    fn underscores_inside_words_are_literal() {
        assert_eq!(spans("snake_case_name"), vec![plain("snake_case_name")]);
        assert_eq!(
            spans("an _em_ word"),
            vec![plain("an "), Token::Emphasis(vec![plain("em")]), plain(" word")]
        );
    }

    #[test]
    fn unmatched_start_is_literal() {
        assert_eq!(spans("prefix *text"), vec![plain("prefix *text")]);
        assert_eq!(spans("2 * 3 * 4"), vec![plain("2 * 3 * 4")]);
    }

    #[test]
    fn links_parse_their_text_and_keep_the_target() {
        assert_eq!(
            spans("[**docs**](https://example.com)"),
            vec![Token::Link {
                target: "https://example.com".into(),
                children: vec![Token::Strong(vec![plain("docs")])],
            }]
        );
    }

    #[test]
    fn unsafe_link_targets_degrade_to_text() {
        assert_eq!(
            spans("[click](javascript:alert(1))"),
            vec![plain("[click](javascript:alert(1))")]
        );
    }

    #[test]
    fn images_beat_links() {
        assert_eq!(
            spans("![cat](https://img.example/cat.png)"),
            vec![Token::Image {
                src: "https://img.example/cat.png".into(),
                alt: "cat".into(),
            }]
        );
    }

    #[test]
    fn strikethrough_nests() {
        assert_eq!(
            spans("~~old *bit*~~"),
            vec![Token::Strikethrough(vec![
                plain("old "),
                Token::Emphasis(vec![plain("bit")])
            ])]
        );
    }

    #[test]
    fn autolinks_only_when_enabled() {
        let extended = parse_spans("<https://example.com>", &Dialect::extended());
        assert_eq!(
            extended,
            vec![Token::AutoLink("https://example.com".into())]
        );
        assert_eq!(
            spans("<https://example.com>"),
            vec![plain("<https://example.com>")]
        );
    }

    #[test]
    fn nesting_limit_leaves_text_literal() {
        let kinds = [TokenKind::Emphasis];
        assert_eq!(parse_nested("*a*", &kinds, MAX_NESTING), vec![plain("*a*")]);
        assert_eq!(
            parse_nested("*a*", &kinds, MAX_NESTING - 1),
            vec![Token::Emphasis(vec![plain("a")])]
        );
    }

    #[test]
    fn multibyte_text_is_safe() {
        assert_eq!(
            spans("héllo *wörld* ✓"),
            vec![
                plain("héllo "),
                Token::Emphasis(vec![plain("wörld")]),
                plain(" ✓")
            ]
        );
    }
}
