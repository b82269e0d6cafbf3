//! Sniff traits and the generic restriction sniff.
//!
//! A sniff registers the token kinds it wants to see and is called once per
//! matching token. Restriction sniffs are not written by hand: they compose
//! a [`TargetExtractor`] (which name does this token refer to?), a
//! [`RestrictionGroups`] table and a [`MatchHandler`] (what to report for a
//! hit) into a [`RestrictionSniff`].

use crate::context::SniffContext;
use crate::groups::{resume_position, MatchResult, RestrictionGroup, RestrictionGroups};
use crate::names::{
    resolve_class_reference, resolve_function_call, ResolvedName, CLASS_REFERENCE_TOKENS,
};
use crate::token::{TokenKind, TokenStream};
use crate::types::Severity;

use std::borrow::Cow;
use std::collections::HashSet;

/// A check run over a token stream.
///
/// # Example
///
/// ```ignore
/// use tokensniff_core::{Severity, Sniff, SniffContext, TokenKind};
///
/// pub struct NoGoto;
///
/// impl Sniff for NoGoto {
///     fn name(&self) -> &'static str { "no-goto" }
///     fn code(&self) -> &'static str { "X001" }
///     fn register(&self) -> &[TokenKind] { &[TokenKind::Identifier] }
///
///     fn process(&self, ctx: &mut SniffContext<'_>, position: usize) -> Option<usize> {
///         if ctx.stream()[position].text.eq_ignore_ascii_case("goto") {
///             ctx.add("Found", Severity::Error, position, "goto is not allowed");
///         }
///         None
///     }
/// }
/// ```
pub trait Sniff: Send + Sync {
    /// Returns the kebab-case name of this sniff (e.g. "array-indentation").
    fn name(&self) -> &'static str;

    /// Returns the sniff code (e.g. "TS001").
    fn code(&self) -> &'static str;

    /// Returns a brief description of what this sniff checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the default severity for violations from this sniff.
    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// Token kinds this sniff is called for.
    fn register(&self) -> &[TokenKind];

    /// Processes the token at `position`.
    ///
    /// Returns a position to resume at: tokens before it are not passed to
    /// this sniff again. `None` continues with the next token.
    fn process(&self, ctx: &mut SniffContext<'_>, position: usize) -> Option<usize>;
}

/// Type alias for boxed Sniff trait objects.
pub type SniffBox = Box<dyn Sniff>;

// ────────────────────────────────────────────
// Capabilities
// ────────────────────────────────────────────

/// Extracts the name a token refers to.
pub trait TargetExtractor: Send + Sync {
    /// Token kinds at which a name can be extracted.
    fn targets(&self) -> &[TokenKind];

    /// Extracts the name at `position`, or `None` if it is not a target.
    fn extract(&self, stream: &TokenStream, position: usize) -> Option<ResolvedName>;
}

/// Class references at `::`, `new`, `extends` and `implements`, qualified
/// against the enclosing namespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassReferences;

impl TargetExtractor for ClassReferences {
    fn targets(&self) -> &[TokenKind] {
        CLASS_REFERENCE_TOKENS
    }

    fn extract(&self, stream: &TokenStream, position: usize) -> Option<ResolvedName> {
        resolve_class_reference(stream, position)
    }
}

/// Calls to global functions, by their name as written.
#[derive(Debug, Clone, Copy, Default)]
pub struct FunctionCalls;

impl TargetExtractor for FunctionCalls {
    fn targets(&self) -> &[TokenKind] {
        &[TokenKind::Identifier]
    }

    fn extract(&self, stream: &TokenStream, position: usize) -> Option<ResolvedName> {
        resolve_function_call(stream, position)
    }
}

/// Turns a group hit into a report.
pub trait MatchHandler: Send + Sync {
    /// Handles `name` matching `group`. Returns a resume hint, if any.
    fn handle(
        &self,
        ctx: &mut SniffContext<'_>,
        name: &ResolvedName,
        group: &RestrictionGroup,
    ) -> Option<usize>;
}

/// Reports one violation per hit, coded with the group name and carrying
/// the group's message and severity.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportMatch;

impl MatchHandler for ReportMatch {
    fn handle(
        &self,
        ctx: &mut SniffContext<'_>,
        name: &ResolvedName,
        group: &RestrictionGroup,
    ) -> Option<usize> {
        let message = group.message().map_or_else(
            || format!("{} is restricted by group `{}`", name.qualified_text, group.name()),
            |m| m.render(&[name.qualified_text.as_str()]),
        );
        ctx.add(group.name(), group.severity(), name.source_position, message);
        None
    }
}

// ────────────────────────────────────────────
// RestrictionSniff
// ────────────────────────────────────────────

/// A sniff flagging names that match a restriction group table.
pub struct RestrictionSniff<E, H = ReportMatch> {
    name: &'static str,
    code: &'static str,
    description: &'static str,
    default_severity: Severity,
    extractor: E,
    groups: RestrictionGroups,
    excluded: HashSet<String>,
    handler: H,
}

impl<E: TargetExtractor> RestrictionSniff<E, ReportMatch> {
    /// Creates a sniff reporting every group hit.
    #[must_use]
    pub fn new(name: &'static str, code: &'static str, extractor: E, groups: RestrictionGroups) -> Self {
        Self {
            name,
            code,
            description: "",
            default_severity: Severity::Error,
            extractor,
            groups,
            excluded: HashSet::new(),
            handler: ReportMatch,
        }
    }
}

impl<E, H> RestrictionSniff<E, H> {
    /// Replaces the match handler.
    #[must_use]
    pub fn with_handler<H2>(self, handler: H2) -> RestrictionSniff<E, H2> {
        RestrictionSniff {
            name: self.name,
            code: self.code,
            description: self.description,
            default_severity: self.default_severity,
            extractor: self.extractor,
            groups: self.groups,
            excluded: self.excluded,
            handler,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Sets the severity reported by [`Sniff::default_severity`].
    #[must_use]
    pub fn with_default_severity(mut self, severity: Severity) -> Self {
        self.default_severity = severity;
        self
    }

    /// Excludes groups by name.
    #[must_use]
    pub fn exclude_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded.extend(groups.into_iter().map(Into::into));
        self
    }

    /// The group table.
    #[must_use]
    pub fn groups(&self) -> &RestrictionGroups {
        &self.groups
    }
}

impl<E, H> Sniff for RestrictionSniff<E, H>
where
    E: TargetExtractor,
    H: MatchHandler,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn code(&self) -> &'static str {
        self.code
    }

    fn description(&self) -> &'static str {
        self.description
    }

    fn default_severity(&self) -> Severity {
        self.default_severity
    }

    fn register(&self) -> &[TokenKind] {
        self.extractor.targets()
    }

    fn process(&self, ctx: &mut SniffContext<'_>, position: usize) -> Option<usize> {
        let name = self.extractor.extract(ctx.stream(), position)?;

        let excluded: Cow<'_, HashSet<String>> = match ctx.excluded_groups() {
            Some(configured) if !configured.is_empty() => {
                Cow::Owned(self.excluded.union(configured).cloned().collect())
            }
            _ => Cow::Borrowed(&self.excluded),
        };

        let results: Vec<MatchResult> = self
            .groups
            .match_all(&name.qualified_text, &excluded)
            .into_iter()
            .map(|hit| MatchResult {
                group_name: hit.group.name().to_string(),
                matched_name: hit.matched_name.to_string(),
                resume_position: self.handler.handle(ctx, &name, hit.group),
            })
            .collect();

        resume_position(&results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::GroupSpec;
    use crate::lexer::{PhpLexer, Tokenizer};
    use crate::types::Violation;
    use std::path::Path;

    fn run<S: Sniff>(sniff: &S, source: &str, excluded: Option<&HashSet<String>>) -> (Vec<Violation>, Vec<usize>) {
        let stream = PhpLexer::new().tokenize(source).expect("source should tokenize");
        let mut ctx = SniffContext::new(Path::new("a.php"), Path::new("."), &stream, 4);
        ctx.enter(sniff.name(), None, excluded);

        let mut resumes = Vec::new();
        for position in 0..stream.len() {
            if sniff.register().contains(&stream[position].kind) {
                if let Some(resume) = sniff.process(&mut ctx, position) {
                    resumes.push(resume);
                }
            }
        }
        (ctx.into_violations(), resumes)
    }

    fn class_sniff() -> RestrictionSniff<ClassReferences> {
        let groups = RestrictionGroups::compile(vec![
            GroupSpec::new("db", Severity::Error, ["PDO", "\\Vendor\\Db\\*"])
                .message("Direct database access via %s"),
            GroupSpec::new("legacy", Severity::Warning, ["PDO"]),
        ])
        .expect("groups should compile");
        RestrictionSniff::new("restrict-class", "T900", ClassReferences, groups)
    }

    #[test]
    fn test_one_violation_per_matching_group() {
        let (violations, _) = run(&class_sniff(), "<?php\n$db = new PDO('x');\n", None);

        let codes: Vec<_> = violations.iter().map(|v| v.code.as_str()).collect();
        assert_eq!(codes, vec!["db", "legacy"]);
        assert_eq!(violations[0].message, "Direct database access via \\PDO");
        assert_eq!(violations[0].severity, Severity::Error);
        assert_eq!(violations[1].severity, Severity::Warning);
        assert_eq!(violations[0].location.line, 2);
    }

    #[test]
    fn test_excluded_groups_from_sniff_and_config() {
        let sniff = class_sniff().exclude_groups(["legacy"]);
        let (violations, _) = run(&sniff, "<?php\nnew PDO();\n", None);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, "db");

        let configured: HashSet<String> = ["db".to_string()].into_iter().collect();
        let (violations, _) = run(&sniff, "<?php\nnew PDO();\n", Some(&configured));
        assert!(violations.is_empty());
    }

    #[test]
    fn test_namespace_qualified_matching() {
        let source = "<?php\nnamespace Vendor\\Db;\nConnection::open();\nnamespace App;\nConnection::open();\n";
        let (violations, _) = run(&class_sniff(), source, None);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location.line, 3);
    }

    struct SkipTo(usize);

    impl MatchHandler for SkipTo {
        fn handle(
            &self,
            ctx: &mut SniffContext<'_>,
            name: &ResolvedName,
            group: &RestrictionGroup,
        ) -> Option<usize> {
            ReportMatch.handle(ctx, name, group);
            Some(if group.name() == "db" { self.0 } else { 25 })
        }
    }

    #[test]
    fn test_resume_is_smallest_hint_of_all_matches() {
        let sniff = class_sniff().with_handler(SkipTo(10));
        let (violations, resumes) = run(&sniff, "<?php new PDO;", None);
        assert_eq!(violations.len(), 2);
        assert_eq!(resumes, vec![10]);
    }

    #[test]
    fn test_function_call_extractor() {
        let groups = RestrictionGroups::compile(vec![GroupSpec::new(
            "curl",
            Severity::Warning,
            ["curl_*"],
        )
        .message("Using cURL functions is highly discouraged: %s().")])
        .expect("groups should compile");
        let sniff = RestrictionSniff::new("restrict-function", "T901", FunctionCalls, groups);

        let (violations, _) = run(&sniff, "<?php\ncurl_init(); $c->curl_exec();\n", None);
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].message,
            "Using cURL functions is highly discouraged: curl_init()."
        );
    }
}
