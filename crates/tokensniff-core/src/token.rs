//! Token stream model.
//!
//! A [`TokenStream`] is the read-only, already tokenized view of one file.
//! Tokens are addressed by position (index) and never copied wholesale;
//! scanners and sniffs only read the stream, fixes are expressed separately
//! as edits (see [`crate::fixer`]).

use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Kind tag of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// `<?php` or `<?=`.
    OpenTag,
    /// `?>`.
    CloseTag,
    /// Text outside of open/close tags.
    InlineHtml,
    /// Spaces and tabs, optionally terminated by a newline.
    Whitespace,
    /// Line or block comment.
    Comment,
    /// `/** ... */` comment.
    DocComment,
    /// `$name`.
    Variable,
    /// Bare word that is not a recognized keyword.
    Identifier,
    /// Quoted string literal.
    StringLiteral,
    /// Numeric literal.
    Number,
    /// Qualifier separator (`\`).
    NsSeparator,
    /// `namespace`.
    Namespace,
    /// `use`.
    Use,
    /// `new`.
    New,
    /// `extends`.
    Extends,
    /// `implements`.
    Implements,
    /// `class`.
    Class,
    /// `interface`.
    Interface,
    /// `trait`.
    Trait,
    /// `function`.
    Function,
    /// Control structure keyword owning a block (`if`, `foreach`, ...).
    Control,
    /// `array` keyword introducing a long-form array literal.
    Array,
    /// `[` opening a short array literal.
    OpenShortArray,
    /// `]` closing a short array literal.
    CloseShortArray,
    /// `(`.
    OpenParen,
    /// `)`.
    CloseParen,
    /// `[` used for index access.
    OpenBracket,
    /// `]` used for index access.
    CloseBracket,
    /// `{`.
    OpenBrace,
    /// `}`.
    CloseBrace,
    /// `;`.
    Semicolon,
    /// `,`.
    Comma,
    /// `::`.
    DoubleColon,
    /// `->` or `?->`.
    ObjectOperator,
    /// `=>`.
    DoubleArrow,
    /// Any other operator or punctuation.
    Operator,
}

impl TokenKind {
    /// Whitespace and comments carry no code.
    #[must_use]
    pub fn is_empty(self) -> bool {
        matches!(self, Self::Whitespace | Self::Comment | Self::DocComment)
    }

    /// Returns true for opening delimiters.
    #[must_use]
    pub fn is_opener(self) -> bool {
        matches!(
            self,
            Self::OpenParen | Self::OpenBracket | Self::OpenShortArray | Self::OpenBrace
        )
    }

    /// Returns true for closing delimiters.
    #[must_use]
    pub fn is_closer(self) -> bool {
        matches!(
            self,
            Self::CloseParen | Self::CloseBracket | Self::CloseShortArray | Self::CloseBrace
        )
    }

    /// Keywords that may own a brace-delimited scope.
    #[must_use]
    pub fn is_scope_owner(self) -> bool {
        matches!(
            self,
            Self::Namespace
                | Self::Class
                | Self::Interface
                | Self::Trait
                | Self::Function
                | Self::Control
        )
    }

    fn closes(self, opener: Self) -> bool {
        matches!(
            (opener, self),
            (Self::OpenParen, Self::CloseParen)
                | (Self::OpenBrace, Self::CloseBrace)
                | (Self::OpenBracket, Self::CloseBracket)
                | (
                    Self::OpenShortArray,
                    Self::CloseBracket | Self::CloseShortArray
                )
        )
    }
}

/// An enclosing brace scope of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// Kind of the owning keyword.
    pub kind: TokenKind,
    /// Position of the owning keyword.
    pub owner: usize,
    /// Position of the opening brace.
    pub opener: usize,
    /// Position of the closing brace.
    pub closer: usize,
}

/// A single token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Kind tag.
    pub kind: TokenKind,
    /// Token text, tab-expanded when the tokenizer replaces tabs.
    pub text: String,
    /// Text before tab expansion, if it differs from `text`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
    /// Position of the matching opening delimiter (set on closers).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matching_open: Option<usize>,
    /// Position of the matching closing delimiter (set on openers).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matching_close: Option<usize>,
    /// Opening brace owned by this keyword token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_opener: Option<usize>,
    /// Closing brace owned by this keyword token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_closer: Option<usize>,
    /// Enclosing scopes, outermost first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

impl Token {
    /// Creates a token without nesting metadata.
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            original_text: None,
            line,
            column,
            matching_open: None,
            matching_close: None,
            scope_opener: None,
            scope_closer: None,
            conditions: Vec::new(),
        }
    }

    /// Records the pre-normalization text.
    #[must_use]
    pub fn with_original(mut self, original: impl Into<String>) -> Self {
        self.original_text = Some(original.into());
        self
    }

    /// The text as written in the source, preferring the unexpanded form.
    #[must_use]
    pub fn source_text(&self) -> &str {
        self.original_text.as_deref().unwrap_or(&self.text)
    }
}

/// Immutable, ordered tokens of one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    /// Builds a stream from tokens in source order.
    ///
    /// Delimiter pairs, brace scope owners and per-token conditions are
    /// (re)computed here, so a tokenizer only needs to supply kinds, texts
    /// and positions.
    #[must_use]
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        let mut stream = Self { tokens };
        stream.match_delimiters();
        stream.assign_scopes();
        stream
    }

    /// Number of tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns true if the stream holds no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Returns the token at `position`.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&Token> {
        self.tokens.get(position)
    }

    /// All tokens in order.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Finds the first token at or after `start` (and before `end`) whose
    /// kind is in `kinds`.
    #[must_use]
    pub fn find_next(&self, kinds: &[TokenKind], start: usize, end: Option<usize>) -> Option<usize> {
        let end = end.unwrap_or(self.tokens.len()).min(self.tokens.len());
        (start..end).find(|&i| kinds.contains(&self.tokens[i].kind))
    }

    /// Finds the first token at or after `start` (and before `end`) whose
    /// kind is *not* in `kinds`.
    #[must_use]
    pub fn find_next_excluding(
        &self,
        kinds: &[TokenKind],
        start: usize,
        end: Option<usize>,
    ) -> Option<usize> {
        let end = end.unwrap_or(self.tokens.len()).min(self.tokens.len());
        (start..end).find(|&i| !kinds.contains(&self.tokens[i].kind))
    }

    /// Finds the last token at or before `start` whose kind is in `kinds`.
    #[must_use]
    pub fn find_previous(&self, kinds: &[TokenKind], start: usize) -> Option<usize> {
        if self.tokens.is_empty() {
            return None;
        }
        let start = start.min(self.tokens.len() - 1);
        (0..=start)
            .rev()
            .find(|&i| kinds.contains(&self.tokens[i].kind))
    }

    /// First non-whitespace, non-comment token at or after `start`.
    #[must_use]
    pub fn next_non_empty(&self, start: usize) -> Option<usize> {
        (start..self.tokens.len()).find(|&i| !self.tokens[i].kind.is_empty())
    }

    /// Last non-whitespace, non-comment token at or before `start`.
    #[must_use]
    pub fn previous_non_empty(&self, start: usize) -> Option<usize> {
        if self.tokens.is_empty() {
            return None;
        }
        let start = start.min(self.tokens.len() - 1);
        (0..=start).rev().find(|&i| !self.tokens[i].kind.is_empty())
    }

    /// Concatenates the text of `length` tokens starting at `start`.
    #[must_use]
    pub fn tokens_as_string(&self, start: usize, length: usize) -> String {
        let end = start.saturating_add(length).min(self.tokens.len());
        self.tokens
            .get(start..end)
            .unwrap_or_default()
            .iter()
            .map(|t| t.text.as_str())
            .collect()
    }

    /// Reconstructs the source text, preferring unexpanded token text.
    #[must_use]
    pub fn content(&self) -> String {
        self.tokens.iter().map(Token::source_text).collect()
    }

    fn match_delimiters(&mut self) {
        for token in &mut self.tokens {
            token.matching_open = None;
            token.matching_close = None;
        }

        let mut stack: Vec<usize> = Vec::new();
        for i in 0..self.tokens.len() {
            let kind = self.tokens[i].kind;
            if kind.is_opener() {
                stack.push(i);
            } else if kind.is_closer() {
                let Some(&open) = stack.last() else {
                    continue;
                };
                let open_kind = self.tokens[open].kind;
                if !kind.closes(open_kind) {
                    // Unbalanced input: leave this closer unmatched.
                    continue;
                }
                stack.pop();
                if open_kind == TokenKind::OpenShortArray {
                    self.tokens[i].kind = TokenKind::CloseShortArray;
                }
                self.tokens[open].matching_close = Some(i);
                self.tokens[i].matching_open = Some(open);
            }
        }
    }

    fn assign_scopes(&mut self) {
        for token in &mut self.tokens {
            token.scope_opener = None;
            token.scope_closer = None;
            token.conditions.clear();
        }

        let mut owned: Vec<Option<usize>> = vec![None; self.tokens.len()];
        for i in 0..self.tokens.len() {
            if self.tokens[i].kind != TokenKind::OpenBrace {
                continue;
            }
            let Some(closer) = self.tokens[i].matching_close else {
                continue;
            };
            let Some(owner) = self.scope_owner_of(i) else {
                continue;
            };
            if self.tokens[owner].scope_opener.is_some() {
                continue;
            }
            self.tokens[owner].scope_opener = Some(i);
            self.tokens[owner].scope_closer = Some(closer);
            owned[i] = Some(owner);
        }

        let mut stack: Vec<Condition> = Vec::new();
        for i in 0..self.tokens.len() {
            while stack.last().is_some_and(|c| c.closer <= i) {
                stack.pop();
            }
            self.tokens[i].conditions.clone_from(&stack);
            if let (Some(owner), Some(closer)) = (owned[i], self.tokens[i].matching_close) {
                stack.push(Condition {
                    kind: self.tokens[owner].kind,
                    owner,
                    opener: i,
                    closer,
                });
            }
        }
    }

    /// Walks back from an opening brace to the keyword owning it.
    fn scope_owner_of(&self, brace: usize) -> Option<usize> {
        let mut i = brace;
        while i > 0 {
            i -= 1;
            let token = &self.tokens[i];
            match token.kind {
                TokenKind::Semicolon | TokenKind::OpenBrace | TokenKind::CloseBrace => return None,
                kind if kind.is_scope_owner() => return Some(i),
                TokenKind::CloseParen => {
                    if let Some(open) = token.matching_open {
                        i = open;
                    }
                }
                _ => {}
            }
        }
        None
    }
}

impl Index<usize> for TokenStream {
    type Output = Token;

    fn index(&self, position: usize) -> &Self::Output {
        &self.tokens[position]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(kind: TokenKind, text: &str, column: usize) -> Token {
        Token::new(kind, text, 1, column)
    }

    #[test]
    fn test_matches_nested_delimiters() {
        let stream = TokenStream::from_tokens(vec![
            tok(TokenKind::OpenParen, "(", 1),
            tok(TokenKind::OpenShortArray, "[", 2),
            tok(TokenKind::CloseBracket, "]", 3),
            tok(TokenKind::CloseParen, ")", 4),
        ]);

        assert_eq!(stream[0].matching_close, Some(3));
        assert_eq!(stream[3].matching_open, Some(0));
        assert_eq!(stream[1].matching_close, Some(2));
        assert_eq!(stream[2].kind, TokenKind::CloseShortArray);
    }

    #[test]
    fn test_unbalanced_closer_is_left_unmatched() {
        let stream = TokenStream::from_tokens(vec![
            tok(TokenKind::OpenParen, "(", 1),
            tok(TokenKind::CloseBrace, "}", 2),
        ]);

        assert_eq!(stream[0].matching_close, None);
        assert_eq!(stream[1].matching_open, None);
    }

    #[test]
    fn test_namespace_block_conditions() {
        // namespace A { x }
        let stream = TokenStream::from_tokens(vec![
            tok(TokenKind::Namespace, "namespace", 1),
            tok(TokenKind::Whitespace, " ", 10),
            tok(TokenKind::Identifier, "A", 11),
            tok(TokenKind::Whitespace, " ", 12),
            tok(TokenKind::OpenBrace, "{", 13),
            tok(TokenKind::Identifier, "x", 14),
            tok(TokenKind::CloseBrace, "}", 15),
        ]);

        assert_eq!(stream[0].scope_opener, Some(4));
        assert_eq!(stream[0].scope_closer, Some(6));
        assert!(stream[4].conditions.is_empty());
        assert_eq!(
            stream[5].conditions,
            vec![Condition {
                kind: TokenKind::Namespace,
                owner: 0,
                opener: 4,
                closer: 6,
            }]
        );
        assert!(stream[6].conditions.is_empty());
    }

    #[test]
    fn test_navigation_helpers() {
        let stream = TokenStream::from_tokens(vec![
            tok(TokenKind::Identifier, "a", 1),
            tok(TokenKind::Whitespace, " ", 2),
            tok(TokenKind::Comment, "/* c */", 3),
            tok(TokenKind::Identifier, "b", 10),
        ]);

        assert_eq!(stream.next_non_empty(1), Some(3));
        assert_eq!(stream.previous_non_empty(2), Some(0));
        assert_eq!(stream.find_next(&[TokenKind::Comment], 0, None), Some(2));
        assert_eq!(stream.find_next(&[TokenKind::Comment], 0, Some(2)), None);
        assert_eq!(stream.find_previous(&[TokenKind::Identifier], 2), Some(0));
        assert_eq!(stream.tokens_as_string(0, 2), "a ");
        assert_eq!(stream.content(), "a /* c */b");
    }

    #[test]
    fn test_content_prefers_original_text() {
        let stream = TokenStream::from_tokens(vec![
            tok(TokenKind::Whitespace, "    ", 1).with_original("\t"),
            tok(TokenKind::Identifier, "x", 5),
        ]);

        assert_eq!(stream.content(), "\tx");
        assert_eq!(stream.tokens_as_string(0, 2), "    x");
    }
}
