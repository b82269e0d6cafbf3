//! Array literal boundaries and top-level element splitting.

use crate::token::{TokenKind, TokenStream};
use serde::{Deserialize, Serialize};

/// One top-level element of an array literal.
///
/// `start` and `end` are inclusive token positions; the separating comma
/// is not part of the element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayElement {
    /// First token of the element (may be whitespace).
    pub start: usize,
    /// Last token of the element.
    pub end: usize,
}

impl ArrayElement {
    /// The element's text, trimmed.
    #[must_use]
    pub fn text(&self, stream: &TokenStream) -> String {
        stream
            .tokens_as_string(self.start, self.end + 1 - self.start)
            .trim()
            .to_string()
    }

    /// First non-empty token of the element.
    #[must_use]
    pub fn first_content(&self, stream: &TokenStream) -> Option<usize> {
        stream
            .next_non_empty(self.start)
            .filter(|&pos| pos <= self.end)
    }
}

/// Delimiters and elements of an `array(...)` or `[...]` literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayLiteralSpan {
    /// The `array` keyword or the `[` token the literal was found at.
    pub start: usize,
    /// Opening delimiter.
    pub opener: usize,
    /// Closing delimiter.
    pub closer: usize,
    /// Top-level elements in source order.
    pub elements: Vec<ArrayElement>,
}

impl ArrayLiteralSpan {
    /// Returns true if opener and closer are on the same line.
    #[must_use]
    pub fn is_single_line(&self, stream: &TokenStream) -> bool {
        stream[self.opener].line == stream[self.closer].line
    }
}

/// Finds the literal starting at `position`.
///
/// `position` must be an `array` keyword or a short-array `[`. Returns
/// `None` when the delimiters cannot be determined.
#[must_use]
pub fn find_literal_span(stream: &TokenStream, position: usize) -> Option<ArrayLiteralSpan> {
    let token = stream.get(position)?;
    let opener = match token.kind {
        TokenKind::Array => {
            let next = stream.next_non_empty(position + 1)?;
            (stream[next].kind == TokenKind::OpenParen).then_some(next)?
        }
        TokenKind::OpenShortArray => position,
        _ => return None,
    };
    let closer = stream[opener].matching_close?;
    if closer <= opener {
        return None;
    }

    let mut span = ArrayLiteralSpan {
        start: position,
        opener,
        closer,
        elements: Vec::new(),
    };
    span.elements = split_top_level_elements(stream, &span);
    Some(span)
}

/// Splits the literal's content at top-level commas.
///
/// Commas inside nested parentheses, brackets or braces do not split. A
/// trailing comma does not produce an empty last element, and `array()`
/// has no elements.
#[must_use]
pub fn split_top_level_elements(stream: &TokenStream, span: &ArrayLiteralSpan) -> Vec<ArrayElement> {
    let mut elements = Vec::new();
    let mut depth = 0usize;
    let mut start = span.opener + 1;

    for pos in span.opener + 1..span.closer {
        let kind = stream[pos].kind;
        if kind.is_opener() {
            depth += 1;
        } else if kind.is_closer() {
            depth = depth.saturating_sub(1);
        } else if kind == TokenKind::Comma && depth == 0 {
            if pos > start {
                elements.push(ArrayElement {
                    start,
                    end: pos - 1,
                });
            }
            start = pos + 1;
        }
    }

    if start < span.closer && stream.next_non_empty(start).is_some_and(|p| p < span.closer) {
        elements.push(ArrayElement {
            start,
            end: span.closer - 1,
        });
    }

    elements
}
