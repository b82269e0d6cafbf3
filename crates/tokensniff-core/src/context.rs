//! Per-file state handed to sniffs.

use crate::config::RuleConfig;
use crate::fixer::Fix;
use crate::token::TokenStream;
use crate::types::{Location, Severity, Violation};

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Context provided to sniffs while one file is processed.
///
/// Holds the read-only token stream and collects the violations reported
/// against it. The analyzer points the context at the sniff being run
/// before each call, so reports are attributed to that sniff.
#[derive(Debug)]
pub struct SniffContext<'a> {
    /// Absolute path to the file.
    pub path: &'a Path,
    /// Path relative to the project root.
    pub relative_path: PathBuf,
    stream: &'a TokenStream,
    tab_width: usize,
    rule: &'static str,
    rule_config: Option<&'a RuleConfig>,
    excluded_groups: Option<&'a HashSet<String>>,
    violations: Vec<Violation>,
}

impl<'a> SniffContext<'a> {
    /// Creates a context for one file.
    #[must_use]
    pub fn new(path: &'a Path, root: &Path, stream: &'a TokenStream, tab_width: usize) -> Self {
        let relative_path = path
            .strip_prefix(root)
            .map_or_else(|_| path.to_path_buf(), Path::to_path_buf);

        Self {
            path,
            relative_path,
            stream,
            tab_width,
            rule: "",
            rule_config: None,
            excluded_groups: None,
            violations: Vec::new(),
        }
    }

    /// Attributes subsequent reports to `rule` and exposes its settings.
    pub fn enter(
        &mut self,
        rule: &'static str,
        rule_config: Option<&'a RuleConfig>,
        excluded_groups: Option<&'a HashSet<String>>,
    ) {
        self.rule = rule;
        self.rule_config = rule_config;
        self.excluded_groups = excluded_groups;
    }

    /// The token stream of the file.
    #[must_use]
    pub fn stream(&self) -> &'a TokenStream {
        self.stream
    }

    /// Columns per indentation unit.
    #[must_use]
    pub fn tab_width(&self) -> usize {
        self.tab_width
    }

    /// Name of the sniff currently running.
    #[must_use]
    pub fn rule(&self) -> &'static str {
        self.rule
    }

    /// Configuration of the sniff currently running, if any.
    #[must_use]
    pub fn rule_config(&self) -> Option<&'a RuleConfig> {
        self.rule_config
    }

    /// Groups excluded for the sniff currently running by configuration.
    #[must_use]
    pub fn excluded_groups(&self) -> Option<&'a HashSet<String>> {
        self.excluded_groups
    }

    /// Location of the token at `position`.
    #[must_use]
    pub fn location(&self, position: usize) -> Location {
        let (line, column) = self
            .stream
            .get(position)
            .map_or((0, 0), |t| (t.line, t.column));
        Location::new(self.relative_path.clone(), line, column)
    }

    /// Builds a violation at `position` for the running sniff.
    #[must_use]
    pub fn violation(
        &self,
        code: impl Into<String>,
        severity: Severity,
        position: usize,
        message: impl Into<String>,
    ) -> Violation {
        Violation::new(code, self.rule, severity, self.location(position), message)
            .at_position(position)
    }

    /// Reports a violation without a fix.
    pub fn add(
        &mut self,
        code: impl Into<String>,
        severity: Severity,
        position: usize,
        message: impl Into<String>,
    ) {
        let violation = self.violation(code, severity, position, message);
        self.violations.push(violation);
    }

    /// Reports a violation that carries an automatic fix.
    pub fn add_fixable(
        &mut self,
        code: impl Into<String>,
        severity: Severity,
        position: usize,
        message: impl Into<String>,
        fix: Fix,
    ) {
        let violation = self
            .violation(code, severity, position, message)
            .with_fix(fix);
        self.violations.push(violation);
    }

    /// Reports a prepared violation.
    pub fn report(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Violations reported so far.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Consumes the context, returning the collected violations.
    #[must_use]
    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Token, TokenKind};

    fn stream() -> TokenStream {
        TokenStream::from_tokens(vec![
            Token::new(TokenKind::Identifier, "eval", 3, 5),
            Token::new(TokenKind::OpenParen, "(", 3, 9),
        ])
    }

    #[test]
    fn test_relative_path() {
        let stream = stream();
        let ctx = SniffContext::new(
            Path::new("/project/src/a.php"),
            Path::new("/project"),
            &stream,
            4,
        );
        assert_eq!(ctx.relative_path, PathBuf::from("src/a.php"));
        assert_eq!(ctx.tab_width(), 4);
    }

    #[test]
    fn test_reports_are_attributed_to_entered_rule() {
        let stream = stream();
        let mut ctx = SniffContext::new(Path::new("a.php"), Path::new("."), &stream, 4);
        ctx.enter("restricted-functions", None, None);
        ctx.add("eval", Severity::Error, 0, "eval() is prohibited");
        ctx.add_fixable(
            "other",
            Severity::Warning,
            1,
            "msg",
            Fix::InsertBefore {
                position: 1,
                text: " ".to_string(),
            },
        );

        let violations = ctx.into_violations();
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].rule, "restricted-functions");
        assert_eq!(violations[0].location.line, 3);
        assert_eq!(violations[0].location.column, 5);
        assert!(!violations[0].fixable());
        assert_eq!(violations[1].position, 1);
        assert!(violations[1].fixable());
    }
}
