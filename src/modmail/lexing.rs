//! Character-level text handling: upstream entity decoding, HTML escaping, URL policy
//!
//!     Message content arrives already HTML-escaped once by the bot that stored it (a literal
//!     `<` is stored as `&lt;`). Before any rule runs, the parser undoes exactly that one level
//!     of escaping with the logos lexer below, so every pattern works on canonical literal
//!     text. The renderer then escapes every payload exactly once on the way out.
//!
//!     Decode once, escape once: a stored `&amp;lt;` (a user who literally typed `&lt;`)
//!     decodes to `&lt;` and is rendered back as `&amp;lt;`, and feeding rendered text back in
//!     yields the same text again.

use logos::Logos;
use std::borrow::Cow;

/// Entities produced by the upstream escaping, plus everything else
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum EntityToken {
    #[token("&amp;")]
    Amp,
    #[token("&lt;")]
    Lt,
    #[token("&gt;")]
    Gt,
    #[token("&quot;")]
    Quot,
    #[token("&#x27;")]
    #[token("&#39;")]
    #[token("&apos;")]
    Apos,
    #[token("&")]
    Ampersand,
    #[regex(r"[^&]+")]
    Text,
}

/// Undo one level of upstream HTML-entity escaping.
///
/// Unknown or malformed entities are kept verbatim.
pub fn decode_entities(source: &str) -> Cow<'_, str> {
    if !source.contains('&') {
        return Cow::Borrowed(source);
    }

    let mut out = String::with_capacity(source.len());
    let mut lexer = EntityToken::lexer(source);
    while let Some(result) = lexer.next() {
        match result {
            Ok(EntityToken::Amp) => out.push('&'),
            Ok(EntityToken::Lt) => out.push('<'),
            Ok(EntityToken::Gt) => out.push('>'),
            Ok(EntityToken::Quot) => out.push('"'),
            Ok(EntityToken::Apos) => out.push('\''),
            Ok(EntityToken::Ampersand) | Ok(EntityToken::Text) | Err(()) => {
                out.push_str(lexer.slice())
            }
        }
    }
    Cow::Owned(out)
}

/// Escape HTML special characters
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Whether a user-supplied URL may become an `href`/`src`.
///
/// Absolute URLs must use http, https or mailto. Relative references are allowed.
pub fn is_safe_url(target: &str) -> bool {
    match url::Url::parse(target.trim()) {
        Ok(url) => matches!(url.scheme(), "http" | "https" | "mailto"),
        Err(url::ParseError::RelativeUrlWithoutBase) => !target.trim_start().starts_with("//"),
        Err(_) => false,
    }
}
