//! Sniff enforcing tab indentation of multi-line array literals.
//!
//! # Detected Patterns
//!
//! - A closer that does not line up with the start of the line holding
//!   the array keyword or short-array opener
//! - Items not indented exactly one tab deeper than that line
//!
//! Both are fixable. A closer sharing its line with other content is only
//! reported; it becomes fixable once something moves it to its own line.
//!
//! # Good Patterns
//!
//! ```php
//! $args = array(
//! 	'post_type' => 'page',
//! 	'orderby'   => 'title',
//! );
//! ```

use tokensniff_core::{
    check_indentation, find_literal_span, line_indentation, IndentFinding, IndentIssue,
    MessageTemplate, Severity, Sniff, SniffContext, TokenKind,
};

/// Sniff code for array-indentation.
pub const CODE: &str = "TS001";

/// Sniff name for array-indentation.
pub const NAME: &str = "array-indentation";

const CLOSER_MESSAGE: &str =
    "Array closer not aligned correctly; expected %s space(s) but found %s";
const ITEM_MESSAGE: &str = "Array item not aligned correctly; expected %s spaces but found %s";

/// Checks and fixes indentation of multi-line array literals.
#[derive(Debug, Clone)]
pub struct ArrayIndentation {
    /// Severity level.
    pub severity: Severity,
}

impl Default for ArrayIndentation {
    fn default() -> Self {
        Self::new()
    }
}

impl ArrayIndentation {
    /// Creates a new sniff with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Error,
        }
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    fn report(&self, ctx: &mut SniffContext<'_>, finding: IndentFinding) {
        let template = match finding.issue {
            IndentIssue::CloserNotAligned => CLOSER_MESSAGE,
            IndentIssue::ItemNotAligned => ITEM_MESSAGE,
        };
        let message = MessageTemplate::new(template).render(&[
            finding.expected.to_string(),
            finding.found.to_string(),
        ]);
        let code = finding.issue.code();

        match finding.fix {
            Some(fix) => ctx.add_fixable(code, self.severity, finding.position, message, fix),
            None => ctx.add(code, self.severity, finding.position, message),
        }
    }
}

impl Sniff for ArrayIndentation {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Multi-line arrays are indented one tab deeper than the line that opens them"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn register(&self) -> &[TokenKind] {
        &[TokenKind::Array, TokenKind::OpenShortArray]
    }

    fn process(&self, ctx: &mut SniffContext<'_>, position: usize) -> Option<usize> {
        let stream = ctx.stream();
        let span = find_literal_span(stream, position)?;
        let indent = line_indentation(stream, position);
        let report = check_indentation(stream, &span, &indent, ctx.tab_width());

        if report.resume.is_some() {
            tracing::debug!(
                "{}: deferring mixed-layout array at line {}",
                ctx.relative_path.display(),
                stream[position].line
            );
        }
        for finding in report.findings {
            self.report(ctx, finding);
        }
        report.resume
    }
}
