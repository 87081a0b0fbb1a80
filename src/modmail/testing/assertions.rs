//! Fluent assertions over parsed token trees

use crate::modmail::token::{Token, TokenKind};

/// Start asserting on a token sequence
pub fn assert_tokens(tokens: &[Token]) -> TokensAssertion<'_> {
    TokensAssertion {
        tokens,
        context: "tokens".to_string(),
    }
}

fn summarize(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|token| token.kind().name())
        .collect::<Vec<_>>()
        .join(", ")
}

fn nth<'a>(tokens: &'a [Token], index: usize, context: &str) -> &'a Token {
    tokens.get(index).unwrap_or_else(|| {
        panic!(
            "{}: Token index {} out of bounds ({} tokens: [{}])",
            context,
            index,
            tokens.len(),
            summarize(tokens)
        )
    })
}

fn assert_kinds(tokens: &[Token], expected: &[TokenKind], context: &str) {
    let actual: Vec<TokenKind> = tokens.iter().map(Token::kind).collect();
    assert_eq!(
        actual, expected,
        "{}: Expected kinds {:?}, found [{}]",
        context,
        expected,
        summarize(tokens)
    );
}

pub struct TokensAssertion<'a> {
    tokens: &'a [Token],
    context: String,
}

impl<'a> TokensAssertion<'a> {
    pub fn count(self, expected: usize) -> Self {
        assert_eq!(
            self.tokens.len(),
            expected,
            "{}: Expected {} tokens, found {}: [{}]",
            self.context,
            expected,
            self.tokens.len(),
            summarize(self.tokens)
        );
        self
    }

    pub fn kinds(self, expected: &[TokenKind]) -> Self {
        assert_kinds(self.tokens, expected, &self.context);
        self
    }

    pub fn token<F>(self, index: usize, assertion: F) -> Self
    where
        F: FnOnce(TokenAssertion<'a>),
    {
        let token = nth(self.tokens, index, &self.context);
        assertion(TokenAssertion {
            token,
            context: format!("{}[{}]", self.context, index),
        });
        self
    }
}

pub struct TokenAssertion<'a> {
    token: &'a Token,
    context: String,
}

impl<'a> TokenAssertion<'a> {
    pub fn kind(self, expected: TokenKind) -> Self {
        assert_eq!(
            self.token.kind(),
            expected,
            "{}: Expected {}, found {:?}",
            self.context,
            expected,
            self.token
        );
        self
    }

    /// Flattened literal text of the token and its children
    pub fn text(self, expected: &str) -> Self {
        assert_eq!(
            self.token.text(),
            expected,
            "{}: Text mismatch in {:?}",
            self.context,
            self.token
        );
        self
    }

    pub fn plain(self, expected: &str) -> Self {
        match self.token {
            Token::PlainText(text) => assert_eq!(text, expected, "{}", self.context),
            other => panic!("{}: Expected PlainText, found {:?}", self.context, other),
        }
        self
    }

    pub fn mention(self, expected: &str) -> Self {
        match self.token {
            Token::Mention(target) => assert_eq!(target, expected, "{}", self.context),
            other => panic!("{}: Expected Mention, found {:?}", self.context, other),
        }
        self
    }

    pub fn child_count(self, expected: usize) -> Self {
        let children = self.token.children();
        assert_eq!(
            children.len(),
            expected,
            "{}: Expected {} children, found {}: [{}]",
            self.context,
            expected,
            children.len(),
            summarize(children)
        );
        self
    }

    pub fn kinds(self, expected: &[TokenKind]) -> Self {
        assert_kinds(self.token.children(), expected, &self.context);
        self
    }

    pub fn child<F>(self, index: usize, assertion: F) -> Self
    where
        F: FnOnce(TokenAssertion<'a>),
    {
        let token = nth(self.token.children(), index, &self.context);
        assertion(TokenAssertion {
            token,
            context: format!("{}.children[{}]", self.context, index),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Token> {
        vec![Token::Paragraph(vec![
            Token::PlainText("hi ".into()),
            Token::Strong(vec![Token::Mention("@here".into())]),
        ])]
    }

    #[test]
    fn passes_on_matching_tree() {
        assert_tokens(&sample())
            .count(1)
            .kinds(&[TokenKind::Paragraph])
            .token(0, |p| {
                p.text("hi @here")
                    .kinds(&[TokenKind::PlainText, TokenKind::Strong])
                    .child(1, |strong| {
                        strong.child(0, |m| {
                            m.mention("@here");
                        });
                    });
            });
    }

    #[test]
    #[should_panic(expected = "Expected 2 tokens")]
    fn reports_count_mismatch() {
        assert_tokens(&sample()).count(2);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn reports_missing_child() {
        assert_tokens(&sample()).token(0, |p| {
            p.child(5, |_| {});
        });
    }
}
