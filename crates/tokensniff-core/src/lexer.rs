//! Reference tokenizer for PHP-like sources.
//!
//! The analyzer only depends on the [`Tokenizer`] trait; [`PhpLexer`] is the
//! built-in implementation used by the CLI and the fixture tests. It is a
//! flat scanner, not a parser: it classifies keywords and delimiters and
//! leaves structure to [`TokenStream::from_tokens`].
//!
//! Layout conventions follow what the sniffs rely on:
//!
//! - a whitespace token never spans lines; a newline ends the token it
//!   belongs to, so indentation is always its own token at column 1
//! - multi-line comments, strings and inline HTML are split per line
//! - with a tab width configured, tabs in whitespace are expanded to tab
//!   stops in `text` and the raw form is kept in `original_text`

use crate::token::{Token, TokenKind, TokenStream};

/// Converts source text into a [`TokenStream`].
pub trait Tokenizer: Send + Sync {
    /// Tokenizes one file.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be tokenized.
    fn tokenize(&self, source: &str) -> Result<TokenStream, LexError>;
}

/// Tokenizer errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    /// A quoted string is not closed before end of input.
    #[error("unterminated string literal starting at {line}:{column}")]
    UnterminatedString {
        /// Line of the opening quote.
        line: usize,
        /// Column of the opening quote.
        column: usize,
    },

    /// A block comment is not closed before end of input.
    #[error("unterminated comment starting at {line}:{column}")]
    UnterminatedComment {
        /// Line of the comment opener.
        line: usize,
        /// Column of the comment opener.
        column: usize,
    },
}

const CONTROL_KEYWORDS: &[&str] = &[
    "if", "else", "elseif", "while", "for", "foreach", "switch", "do", "try", "catch", "finally",
    "declare",
];

/// Keywords after which `[` opens a short array rather than an index.
const EXPRESSION_KEYWORDS: &[&str] = &[
    "return", "yield", "echo", "print", "case", "throw", "and", "or", "xor", "clone", "as",
    "include", "include_once", "require", "require_once",
];

/// Tokenizer for PHP-like sources.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhpLexer {
    tab_width: Option<usize>,
}

impl PhpLexer {
    /// Creates a lexer that keeps tabs as written.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Expands tabs in whitespace to the given width (0 disables expansion).
    #[must_use]
    pub fn with_tab_width(mut self, tab_width: usize) -> Self {
        self.tab_width = (tab_width > 0).then_some(tab_width);
        self
    }
}

impl Tokenizer for PhpLexer {
    fn tokenize(&self, source: &str) -> Result<TokenStream, LexError> {
        let raw = Scanner::new(source).scan()?;
        Ok(TokenStream::from_tokens(self.position(raw)))
    }
}

impl PhpLexer {
    /// Splits multi-line pieces and assigns line/column, expanding tabs.
    fn position(&self, raw: Vec<(TokenKind, String)>) -> Vec<Token> {
        let mut tokens = Vec::with_capacity(raw.len());
        let mut line = 1;
        let mut column = 1;

        for (kind, text) in raw {
            for piece in text.split_inclusive('\n') {
                let mut token = match (kind, self.tab_width) {
                    (TokenKind::Whitespace, Some(width)) if piece.contains('\t') => {
                        let expanded = expand_tabs(piece, column, width);
                        Token::new(kind, expanded, line, column).with_original(piece)
                    }
                    _ => Token::new(kind, piece, line, column),
                };

                if token.text.ends_with('\n') {
                    line += 1;
                    column = 1;
                } else {
                    column += token.text.chars().count();
                }
                if token.original_text.as_deref() == Some(token.text.as_str()) {
                    token.original_text = None;
                }
                tokens.push(token);
            }
        }

        tokens
    }
}

fn expand_tabs(text: &str, start_column: usize, width: usize) -> String {
    let mut out = String::with_capacity(text.len() + width);
    let mut column = start_column;
    for ch in text.chars() {
        if ch == '\t' {
            let spaces = width - ((column - 1) % width);
            out.extend(std::iter::repeat(' ').take(spaces));
            column += spaces;
        } else {
            out.push(ch);
            column += 1;
        }
    }
    out
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

fn is_ident_char(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}

struct Scanner<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    out: Vec<(TokenKind, String)>,
    last_significant: Option<TokenKind>,
    after_keyword: bool,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            out: Vec::new(),
            last_significant: None,
            after_keyword: false,
        }
    }

    fn scan(mut self) -> Result<Vec<(TokenKind, String)>, LexError> {
        let mut in_code = false;
        while self.pos < self.bytes.len() {
            if in_code {
                in_code = self.scan_code_token()?;
            } else {
                in_code = self.scan_inline_html();
            }
        }
        Ok(self.out)
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        let text = self.src[start..self.pos].to_string();
        if !kind.is_empty() {
            self.last_significant = Some(kind);
            self.after_keyword = false;
        }
        self.out.push((kind, text));
    }

    fn starts_with(&self, needle: &str) -> bool {
        self.bytes[self.pos..].starts_with(needle.as_bytes())
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    /// Returns true when an open tag was consumed.
    fn scan_inline_html(&mut self) -> bool {
        let start = self.pos;
        let rest = &self.src[self.pos..];
        let Some(offset) = rest.find("<?") else {
            self.pos = self.bytes.len();
            self.push(TokenKind::InlineHtml, start);
            return false;
        };

        let tag_len = if rest[offset..].starts_with("<?php") {
            5
        } else if rest[offset..].starts_with("<?=") {
            3
        } else {
            2
        };

        if offset > 0 {
            self.pos += offset;
            self.push(TokenKind::InlineHtml, start);
        }
        let tag_start = self.pos;
        self.pos += tag_len;
        self.push(TokenKind::OpenTag, tag_start);
        true
    }

    /// Scans one token in code mode. Returns false after a close tag.
    fn scan_code_token(&mut self) -> Result<bool, LexError> {
        let start = self.pos;
        let b = self.bytes[self.pos];

        match b {
            b'?' if self.peek(1) == Some(b'>') => {
                self.pos += 2;
                self.push(TokenKind::CloseTag, start);
                return Ok(false);
            }
            b' ' | b'\t' | b'\r' | b'\n' => self.scan_whitespace(),
            b'/' if self.peek(1) == Some(b'/') => self.scan_line_comment(),
            b'#' => self.scan_line_comment(),
            b'/' if self.peek(1) == Some(b'*') => self.scan_block_comment()?,
            b'$' if self.peek(1).is_some_and(is_ident_start) => {
                self.pos += 1;
                self.consume_while(is_ident_char);
                self.push(TokenKind::Variable, start);
            }
            b'\'' | b'"' => self.scan_string(b)?,
            b'<' if self.starts_with("<<<") => self.scan_heredoc(),
            _ if is_ident_start(b) => self.scan_word(),
            _ if b.is_ascii_digit() => {
                self.consume_while(|c| c.is_ascii_alphanumeric() || c == b'_' || c == b'.');
                self.push(TokenKind::Number, start);
            }
            _ => self.scan_punctuation(),
        }
        Ok(true)
    }

    fn consume_while(&mut self, pred: impl Fn(u8) -> bool) {
        while self.pos < self.bytes.len() && pred(self.bytes[self.pos]) {
            self.pos += 1;
        }
    }

    fn scan_whitespace(&mut self) {
        let start = self.pos;
        self.consume_while(|c| c == b' ' || c == b'\t' || c == b'\r');
        if self.peek(0) == Some(b'\n') {
            self.pos += 1;
        }
        self.push(TokenKind::Whitespace, start);
    }

    fn scan_line_comment(&mut self) {
        let start = self.pos;
        while self.pos < self.bytes.len() {
            if self.starts_with("?>") {
                break;
            }
            let c = self.bytes[self.pos];
            self.pos += 1;
            if c == b'\n' {
                break;
            }
        }
        self.push(TokenKind::Comment, start);
    }

    fn scan_block_comment(&mut self) -> Result<(), LexError> {
        let start = self.pos;
        let kind = if self.starts_with("/**") && !self.starts_with("/**/") {
            TokenKind::DocComment
        } else {
            TokenKind::Comment
        };
        let Some(end) = self.src[self.pos + 2..].find("*/") else {
            let (line, column) = self.line_column(start);
            return Err(LexError::UnterminatedComment { line, column });
        };
        self.pos += 2 + end + 2;
        self.push(kind, start);
        Ok(())
    }

    fn scan_string(&mut self, quote: u8) -> Result<(), LexError> {
        let start = self.pos;
        self.pos += 1;
        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b'\\' => self.pos += 2,
                c if c == quote => {
                    self.pos += 1;
                    self.push(TokenKind::StringLiteral, start);
                    return Ok(());
                }
                _ => self.pos += 1,
            }
        }
        let (line, column) = self.line_column(start);
        Err(LexError::UnterminatedString { line, column })
    }

    /// Heredoc/nowdoc bodies are kept as one literal up to the closing marker.
    fn scan_heredoc(&mut self) {
        let start = self.pos;
        self.pos += 3;
        self.consume_while(|c| c == b' ' || c == b'\t' || c == b'\'' || c == b'"');
        let marker_start = self.pos;
        self.consume_while(is_ident_char);
        let marker = self.src[marker_start..self.pos].to_string();
        self.consume_while(|c| c == b'\'' || c == b'"');

        if marker.is_empty() {
            self.pos = start + 1;
            self.push(TokenKind::Operator, start);
            return;
        }

        let mut line_start = match self.src[self.pos..].find('\n') {
            Some(nl) => self.pos + nl + 1,
            None => self.bytes.len(),
        };
        while line_start < self.bytes.len() {
            let line = &self.src[line_start..];
            let trimmed = line.trim_start_matches([' ', '\t']);
            if trimmed.starts_with(marker.as_str())
                && !trimmed
                    .as_bytes()
                    .get(marker.len())
                    .copied()
                    .is_some_and(is_ident_char)
            {
                self.pos = line_start + (line.len() - trimmed.len()) + marker.len();
                self.push(TokenKind::StringLiteral, start);
                return;
            }
            line_start = match line.find('\n') {
                Some(nl) => line_start + nl + 1,
                None => self.bytes.len(),
            };
        }
        self.pos = self.bytes.len();
        self.push(TokenKind::StringLiteral, start);
    }

    fn scan_word(&mut self) {
        let start = self.pos;
        self.consume_while(is_ident_char);
        let word = &self.src[start..self.pos];

        let member_name = matches!(
            self.last_significant,
            Some(TokenKind::DoubleColon | TokenKind::ObjectOperator | TokenKind::NsSeparator)
        );
        let kind = if member_name {
            TokenKind::Identifier
        } else {
            match word.to_ascii_lowercase().as_str() {
                "namespace" => TokenKind::Namespace,
                "use" => TokenKind::Use,
                "new" => TokenKind::New,
                "extends" => TokenKind::Extends,
                "implements" => TokenKind::Implements,
                "class" => TokenKind::Class,
                "interface" => TokenKind::Interface,
                "trait" => TokenKind::Trait,
                "function" => TokenKind::Function,
                "array" if self.next_code_byte() == Some(b'(') => TokenKind::Array,
                w if CONTROL_KEYWORDS.contains(&w) => TokenKind::Control,
                _ => TokenKind::Identifier,
            }
        };
        self.push(kind, start);
        self.after_keyword = !member_name
            && EXPRESSION_KEYWORDS
                .iter()
                .any(|k| word.eq_ignore_ascii_case(k));
    }

    fn next_code_byte(&self) -> Option<u8> {
        self.bytes[self.pos..]
            .iter()
            .copied()
            .find(|c| !c.is_ascii_whitespace())
    }

    fn scan_punctuation(&mut self) {
        let start = self.pos;
        let b = self.bytes[self.pos];
        let (kind, len) = match b {
            b'\\' => (TokenKind::NsSeparator, 1),
            b':' if self.peek(1) == Some(b':') => (TokenKind::DoubleColon, 2),
            b'-' if self.peek(1) == Some(b'>') => (TokenKind::ObjectOperator, 2),
            b'?' if self.starts_with("?->") => (TokenKind::ObjectOperator, 3),
            b'=' if self.peek(1) == Some(b'>') => (TokenKind::DoubleArrow, 2),
            b'(' => (TokenKind::OpenParen, 1),
            b')' => (TokenKind::CloseParen, 1),
            b'{' => (TokenKind::OpenBrace, 1),
            b'}' => (TokenKind::CloseBrace, 1),
            b';' => (TokenKind::Semicolon, 1),
            b',' => (TokenKind::Comma, 1),
            b'[' => {
                let index_access = !self.after_keyword
                    && matches!(
                        self.last_significant,
                        Some(
                            TokenKind::Variable
                                | TokenKind::Identifier
                                | TokenKind::StringLiteral
                                | TokenKind::CloseParen
                                | TokenKind::CloseBracket
                                | TokenKind::CloseBrace
                        )
                    );
                if index_access {
                    (TokenKind::OpenBracket, 1)
                } else {
                    (TokenKind::OpenShortArray, 1)
                }
            }
            b']' => (TokenKind::CloseBracket, 1),
            _ => (TokenKind::Operator, 1),
        };
        self.pos += len;
        self.push(kind, start);
    }

    fn line_column(&self, offset: usize) -> (usize, usize) {
        let before = &self.src[..offset];
        let line = before.matches('\n').count() + 1;
        let column = before
            .rfind('\n')
            .map_or(before.chars().count(), |nl| before[nl + 1..].chars().count())
            + 1;
        (line, column)
    }
}
