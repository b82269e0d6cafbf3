//! Indentation of multi-line array literals.
//!
//! The closer must line up with the first content of the line holding the
//! literal, and every element must start on its own line indented by one
//! tab more than that line. Literals mixing single-line and multi-line
//! element layout are not checked; the check returns a resume position at
//! the closer instead.
//!
//! Whitespace comparisons use the unexpanded token text, so the result is
//! the same whether or not the tokenizer expanded tabs.

use crate::array::ArrayLiteralSpan;
use crate::fixer::Fix;
use crate::token::{TokenKind, TokenStream};
use serde::{Deserialize, Serialize};

/// Tab width used when none (or zero) is configured.
pub const DEFAULT_TAB_WIDTH: usize = 4;

/// One indentation unit.
pub const INDENT_UNIT: &str = "\t";

/// Leading whitespace of a line.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LineIndent {
    /// Indentation exactly as written.
    pub text: String,
    /// Column of the line's first content (1-based).
    pub column: usize,
}

/// Kind of indentation problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndentIssue {
    /// The closing delimiter does not line up with the opening line.
    CloserNotAligned,
    /// An element is not indented one level deeper than the opening line.
    ItemNotAligned,
}

impl IndentIssue {
    /// Stable message code.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::CloserNotAligned => "CloseBraceNotAligned",
            Self::ItemNotAligned => "ItemNotAligned",
        }
    }
}

/// A misaligned closer or element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndentFinding {
    /// What is misaligned.
    pub issue: IndentIssue,
    /// Token the finding is reported at.
    pub position: usize,
    /// Expected indentation in columns (0-based).
    pub expected: usize,
    /// Actual indentation in columns (0-based).
    pub found: usize,
    /// Edit restoring the expected indentation, if it is safe to apply.
    pub fix: Option<Fix>,
}

/// Outcome of checking one literal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndentReport {
    /// Findings in report order.
    pub findings: Vec<IndentFinding>,
    /// Set when the element check was abandoned for a mixed-layout literal.
    pub resume: Option<usize>,
}

/// Returns the indentation of the line containing `position`.
///
/// A line that does not start with whitespace has empty indentation at
/// column 1.
#[must_use]
pub fn line_indentation(stream: &TokenStream, position: usize) -> LineIndent {
    let Some(token) = stream.get(position) else {
        return LineIndent::default();
    };

    let mut first = position;
    while first > 0 && stream[first - 1].line == token.line {
        first -= 1;
    }

    let mut indent = LineIndent {
        text: String::new(),
        column: 1,
    };
    if stream[first].kind == TokenKind::Whitespace {
        indent.text = stream[first].source_text().to_string();
        if let Some(next) = stream.get(first + 1) {
            indent.column = next.column;
        }
    }
    indent
}

/// Checks closer and element alignment of a multi-line literal.
///
/// `indent` is the indentation of the line holding the literal and
/// `tab_width` the number of columns one unit is worth (0 means
/// [`DEFAULT_TAB_WIDTH`]). Single-line literals produce an empty report.
#[must_use]
pub fn check_indentation(
    stream: &TokenStream,
    span: &ArrayLiteralSpan,
    indent: &LineIndent,
    tab_width: usize,
) -> IndentReport {
    let mut report = IndentReport::default();
    if span.is_single_line(stream) {
        return report;
    }
    let tab_width = if tab_width == 0 {
        DEFAULT_TAB_WIDTH
    } else {
        tab_width
    };

    let closer = &stream[span.closer];
    if closer.column != indent.column {
        let found = closer.column - 1;
        // Only a closer alone on its line can be re-indented safely.
        let alone = found == 0
            || span.closer.checked_sub(1).is_some_and(|prev| {
                stream[prev].kind == TokenKind::Whitespace && stream[prev].column == 1
            });
        report.findings.push(IndentFinding {
            issue: IndentIssue::CloserNotAligned,
            position: span.closer,
            expected: indent.column - 1,
            found,
            fix: alone.then(|| indent_fix(span.closer, found, &indent.text)),
        });
    }

    if span.elements.is_empty() {
        return report;
    }

    let expected_indent = format!("{INDENT_UNIT}{}", indent.text);
    let expected_column = indent.column + tab_width;
    let mut end_of_last_item = span.opener;

    for element in &span.elements {
        let Some(first_content) = element.first_content(stream) else {
            end_of_last_item = element.end + 1;
            continue;
        };
        let content = &stream[first_content];

        let shares_line = content.line == stream[end_of_last_item].line;
        let unindented = content.column != 1
            && stream[first_content - 1].kind != TokenKind::Whitespace;
        if shares_line || unindented {
            report.resume = Some(span.closer);
            return report;
        }

        let whitespace = if content.column == 1 {
            ""
        } else {
            stream[first_content - 1].source_text()
        };

        if whitespace != expected_indent {
            let found = content.column - 1;
            report.findings.push(IndentFinding {
                issue: IndentIssue::ItemNotAligned,
                position: first_content,
                expected: expected_column - 1,
                found,
                fix: Some(indent_fix(first_content, found, &expected_indent)),
            });
        }

        end_of_last_item = element.end + 1;
    }

    report
}

/// Inserts indentation before an unindented token, or replaces the
/// whitespace token in front of it.
fn indent_fix(position: usize, found: usize, text: &str) -> Fix {
    if found == 0 {
        Fix::InsertBefore {
            position,
            text: text.to_string(),
        }
    } else {
        Fix::ReplaceToken {
            position: position - 1,
            text: text.to_string(),
        }
    }
}
