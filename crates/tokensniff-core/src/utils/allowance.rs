//! Comment-based suppression directives.
//!
//! Supports directives like:
//! ```text
//! // tokensniff:ignore restricted-functions reason="migration script"
//! # tokensniff:disable array-indentation
//! /* tokensniff:enable */
//! ```
//!
//! `ignore` covers the directive's own line and the line after it.
//! `disable` covers everything from its line up to a later `enable` (or the
//! end of the file). Without a rule list a directive covers every sniff.
//! Rules are named by sniff name, or by `sniff.Code` to target one message
//! code.

use crate::token::{TokenKind, TokenStream};
use std::collections::HashSet;

const DIRECTIVE_PREFIX: &str = "tokensniff:";

/// Result of checking for a directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowCheck {
    /// Not suppressed.
    Denied,
    /// Suppressed, with the reason if one was given.
    Allowed {
        /// The reason provided (if any).
        reason: Option<String>,
    },
}

impl AllowCheck {
    /// Returns true if suppressed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    /// Returns the reason if suppressed.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Allowed { reason } => reason.as_deref(),
            Self::Denied => None,
        }
    }
}

/// Directive keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    /// Suppress on this line and the next.
    Ignore,
    /// Start a suppressed range.
    Disable,
    /// End suppressed ranges.
    Enable,
}

/// A parsed directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Directive keyword.
    pub kind: DirectiveKind,
    /// Targeted rules; empty means all.
    pub rules: HashSet<String>,
    /// Optional reason.
    pub reason: Option<String>,
}

impl Directive {
    fn covers(&self, rule: &str, code: &str) -> bool {
        self.rules.is_empty()
            || self.rules.contains("all")
            || self.rules.contains(rule)
            || self.rules.contains(&format!("{rule}.{code}"))
    }
}

#[derive(Debug, Clone)]
struct Range {
    first_line: usize,
    last_line: usize,
    directive: Directive,
}

/// All suppressions of one file.
#[derive(Debug, Clone, Default)]
pub struct Allowances {
    ranges: Vec<Range>,
}

impl Allowances {
    /// Collects directives from the stream's comments.
    #[must_use]
    pub fn from_stream(stream: &TokenStream) -> Self {
        let mut ranges = Vec::new();
        let mut open: Vec<(usize, Directive)> = Vec::new();

        for token in stream.tokens() {
            if !matches!(token.kind, TokenKind::Comment | TokenKind::DocComment) {
                continue;
            }
            let Some(directive) = parse_directive(&token.text) else {
                continue;
            };

            match directive.kind {
                DirectiveKind::Ignore => ranges.push(Range {
                    first_line: token.line,
                    last_line: token.line + 1,
                    directive,
                }),
                DirectiveKind::Disable => open.push((token.line, directive)),
                DirectiveKind::Enable => {
                    let (closed, still_open): (Vec<_>, Vec<_>) =
                        open.into_iter().partition(|(_, d)| {
                            directive.rules.is_empty()
                                || d.rules.is_empty()
                                || d.rules.iter().any(|r| directive.rules.contains(r))
                        });
                    open = still_open;
                    ranges.extend(closed.into_iter().map(|(first_line, d)| Range {
                        first_line,
                        last_line: token.line,
                        directive: d,
                    }));
                }
            }
        }

        ranges.extend(open.into_iter().map(|(first_line, directive)| Range {
            first_line,
            last_line: usize::MAX,
            directive,
        }));

        Self { ranges }
    }

    /// Returns true if no directive was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Checks whether `rule` (with message `code`) is suppressed on `line`.
    #[must_use]
    pub fn check(&self, rule: &str, code: &str, line: usize) -> AllowCheck {
        self.ranges
            .iter()
            .find(|r| {
                (r.first_line..=r.last_line).contains(&line) && r.directive.covers(rule, code)
            })
            .map_or(AllowCheck::Denied, |r| AllowCheck::Allowed {
                reason: r.directive.reason.clone(),
            })
    }

    /// Shorthand for `check(..).is_allowed()`.
    #[must_use]
    pub fn is_allowed(&self, rule: &str, code: &str, line: usize) -> bool {
        self.check(rule, code, line).is_allowed()
    }
}

/// Parses a directive from a comment token's text.
fn parse_directive(comment: &str) -> Option<Directive> {
    let body = comment.trim();
    let body = body
        .strip_prefix("/**")
        .or_else(|| body.strip_prefix("/*"))
        .or_else(|| body.strip_prefix("//"))
        .or_else(|| body.strip_prefix('#'))
        .unwrap_or(body);
    let body = body.strip_suffix("*/").unwrap_or(body).trim();
    let body = body.strip_prefix('*').unwrap_or(body).trim();

    let rest = body.strip_prefix(DIRECTIVE_PREFIX)?;
    let (keyword, rest) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    let kind = match keyword {
        "ignore" => DirectiveKind::Ignore,
        "disable" => DirectiveKind::Disable,
        "enable" => DirectiveKind::Enable,
        _ => return None,
    };

    let (rules_str, reason) = match rest.find("reason=") {
        Some(idx) => (&rest[..idx], parse_reason(&rest[idx + "reason=".len()..])),
        None => (rest, None),
    };

    let rules = rules_str
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    Some(Directive {
        kind,
        rules,
        reason,
    })
}

fn parse_reason(value: &str) -> Option<String> {
    let value = value.trim().strip_prefix('"')?;
    let end = value.find('"')?;
    Some(value[..end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{PhpLexer, Tokenizer};

    fn allowances(source: &str) -> Allowances {
        let stream = PhpLexer::new().tokenize(source).expect("source should tokenize");
        Allowances::from_stream(&stream)
    }

    #[test]
    fn test_parse_directive() {
        let directive = parse_directive("// tokensniff:ignore restricted-functions")
            .expect("a directive");
        assert_eq!(directive.kind, DirectiveKind::Ignore);
        assert!(directive.rules.contains("restricted-functions"));
        assert!(directive.reason.is_none());
    }

    #[test]
    fn test_parse_directive_with_reason_and_rules() {
        let directive = parse_directive(
            "/* tokensniff:disable rule-a, rule-b.Code reason=\"generated file\" */",
        )
        .expect("a directive");
        assert_eq!(directive.kind, DirectiveKind::Disable);
        assert_eq!(directive.rules.len(), 2);
        assert!(directive.rules.contains("rule-b.Code"));
        assert_eq!(directive.reason.as_deref(), Some("generated file"));
    }

    #[test]
    fn test_not_a_directive() {
        assert!(parse_directive("// just a comment").is_none());
        assert!(parse_directive("// tokensniff:frobnicate").is_none());
    }

    #[test]
    fn test_ignore_covers_own_and_next_line() {
        let source = "<?php\n// tokensniff:ignore restricted-functions reason=\"legacy\"\neval('a');\neval('b');\n";
        let allow = allowances(source);

        let check = allow.check("restricted-functions", "eval", 3);
        assert!(check.is_allowed());
        assert_eq!(check.reason(), Some("legacy"));
        assert!(allow.is_allowed("restricted-functions", "eval", 2));
        assert!(!allow.is_allowed("restricted-functions", "eval", 4));
        assert!(!allow.is_allowed("array-indentation", "ItemNotAligned", 3));
    }

    #[test]
    fn test_trailing_ignore_without_rules() {
        let allow = allowances("<?php\neval('a'); # tokensniff:ignore\n");
        assert!(allow.is_allowed("anything", "Code", 2));
    }

    #[test]
    fn test_disable_enable_range() {
        let source = "<?php\n/* tokensniff:disable array-indentation.ItemNotAligned */\n$a = 1;\n$b = 2;\n// tokensniff:enable\n$c = 3;\n";
        let allow = allowances(source);

        assert!(allow.is_allowed("array-indentation", "ItemNotAligned", 3));
        assert!(allow.is_allowed("array-indentation", "ItemNotAligned", 4));
        assert!(!allow.is_allowed("array-indentation", "CloseBraceNotAligned", 4));
        assert!(!allow.is_allowed("array-indentation", "ItemNotAligned", 6));
    }

    #[test]
    fn test_unclosed_disable_runs_to_end_of_file() {
        let allow = allowances("<?php\n// tokensniff:disable\n\n\n$x = 1;\n");
        assert!(allow.is_allowed("restricted-functions", "eval", 1000));
        assert!(!allow.is_allowed("restricted-functions", "eval", 1));
    }
}
