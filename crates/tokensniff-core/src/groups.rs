//! Restriction groups: named sets of glob-style name patterns.
//!
//! A group table is compiled once (at rule construction) and is immutable
//! afterwards, so it can be shared between files and threads.
//!
//! Patterns are qualified names in which `*` stands for "anything",
//! e.g. `curl_*` or `\Vendor\Db\*`. Matching is anchored and
//! case-insensitive, and a single leading separator is ignored on both
//! sides.

use crate::message::MessageTemplate;
use crate::names::NS_SEPARATOR;
use crate::types::Severity;

use regex::{Regex, RegexBuilder};
use std::collections::HashSet;

/// Stand-in for wildcards while the literal text is escaped.
const WILDCARD_PLACEHOLDER: char = '\u{1}';

/// Errors building a group table.
#[derive(Debug, thiserror::Error)]
pub enum GroupError {
    /// A group without any pattern.
    #[error("group `{group}` has no patterns")]
    NoPatterns {
        /// Group name.
        group: String,
    },

    /// A pattern that is empty after trimming separators.
    #[error("group `{group}` contains an empty pattern")]
    EmptyPattern {
        /// Group name.
        group: String,
    },

    /// Two groups with the same name.
    #[error("duplicate group name `{0}`")]
    Duplicate(String),

    /// The prepared pattern did not compile.
    #[error("group `{group}`: invalid pattern `{pattern}`: {source}")]
    Pattern {
        /// Group name.
        group: String,
        /// Pattern as written.
        pattern: String,
        /// Regex compilation error.
        source: regex::Error,
    },
}

/// Declarative description of a group, as found in rule tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSpec {
    /// Group name, also used as the violation code.
    pub name: String,
    /// Severity of violations reported for this group.
    pub severity: Severity,
    /// Message with `%s` standing for the matched name.
    pub message: Option<MessageTemplate>,
    /// Name patterns.
    pub patterns: Vec<String>,
}

impl GroupSpec {
    /// Creates a group description.
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, severity: Severity, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            severity,
            message: None,
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    /// Sets the message template.
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(MessageTemplate::new(message));
        self
    }
}

/// An anchored, case-insensitive matcher for one name pattern.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    raw: String,
    regex: Regex,
}

impl CompiledPattern {
    /// Compiles a pattern for the given qualifier separator.
    ///
    /// # Errors
    ///
    /// Returns the regex error if the prepared pattern does not compile.
    pub fn new(raw: &str, separator: char) -> Result<Self, regex::Error> {
        let source = format!("^(?:{})$", prepare_pattern(raw, separator));
        let regex = RegexBuilder::new(&source).case_insensitive(true).build()?;
        Ok(Self {
            raw: raw.to_string(),
            regex,
        })
    }

    /// Tests a name that already had its leading separator removed.
    #[must_use]
    pub fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    /// Returns the pattern as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// Escapes a name pattern for use in a regex, keeping wildcards.
///
/// Wildcards are swapped for a placeholder *before* escaping and turned
/// into `.*` afterwards; escaping last would mangle the wildcard.
fn prepare_pattern(raw: &str, separator: char) -> String {
    let trimmed = trim_separator(raw, separator);
    let trimmed = trimmed.strip_suffix(separator).unwrap_or(trimmed);

    // `.*` is accepted as a wildcard spelling unless `.` is the separator.
    let placeholder = WILDCARD_PLACEHOLDER.to_string();
    let marked = if separator == '.' {
        trimmed.replace('*', &placeholder)
    } else {
        trimmed.replace(".*", &placeholder).replace('*', &placeholder)
    };

    regex::escape(&marked).replace(WILDCARD_PLACEHOLDER, ".*")
}

fn trim_separator(name: &str, separator: char) -> &str {
    name.strip_prefix(separator).unwrap_or(name)
}

/// A compiled restriction group.
#[derive(Debug, Clone)]
pub struct RestrictionGroup {
    name: String,
    severity: Severity,
    message: Option<MessageTemplate>,
    patterns: Vec<CompiledPattern>,
}

impl RestrictionGroup {
    /// Group name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Severity for violations of this group.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Message template, if the group has one.
    #[must_use]
    pub fn message(&self) -> Option<&MessageTemplate> {
        self.message.as_ref()
    }

    /// Compiled patterns.
    #[must_use]
    pub fn patterns(&self) -> &[CompiledPattern] {
        &self.patterns
    }

    /// Returns true if any pattern matches the (separator-trimmed) name.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(name))
    }
}

/// A hit of one group for one name.
#[derive(Debug, Clone, Copy)]
pub struct GroupMatch<'a> {
    /// The matching group.
    pub group: &'a RestrictionGroup,
    /// The name as it was matched.
    pub matched_name: &'a str,
}

/// Outcome of handling one group match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// Name of the matched group.
    pub group_name: String,
    /// The name as it was matched.
    pub matched_name: String,
    /// Position to resume scanning at, if the handler consumed tokens.
    pub resume_position: Option<usize>,
}

/// Combines resume hints: the smallest non-zero hint wins.
#[must_use]
pub fn resume_position(results: &[MatchResult]) -> Option<usize> {
    results
        .iter()
        .filter_map(|r| r.resume_position)
        .filter(|&p| p > 0)
        .min()
}

/// An ordered table of restriction groups.
#[derive(Debug, Clone)]
pub struct RestrictionGroups {
    groups: Vec<RestrictionGroup>,
    separator: char,
}

impl RestrictionGroups {
    /// Compiles groups using the default `\` separator.
    ///
    /// # Errors
    ///
    /// Returns an error for empty groups or patterns, duplicate names, or
    /// patterns that fail to compile.
    pub fn compile<I>(specs: I) -> Result<Self, GroupError>
    where
        I: IntoIterator<Item = GroupSpec>,
    {
        Self::compile_with_separator(specs, NS_SEPARATOR)
    }

    /// Compiles groups for names qualified with `separator`.
    ///
    /// # Errors
    ///
    /// See [`RestrictionGroups::compile`].
    pub fn compile_with_separator<I>(specs: I, separator: char) -> Result<Self, GroupError>
    where
        I: IntoIterator<Item = GroupSpec>,
    {
        let mut seen = HashSet::new();
        let mut groups = Vec::new();

        for spec in specs {
            if !seen.insert(spec.name.clone()) {
                return Err(GroupError::Duplicate(spec.name));
            }
            if spec.patterns.is_empty() {
                return Err(GroupError::NoPatterns { group: spec.name });
            }

            let mut patterns = Vec::with_capacity(spec.patterns.len());
            for raw in &spec.patterns {
                if trim_separator(raw, separator).is_empty() {
                    return Err(GroupError::EmptyPattern { group: spec.name });
                }
                let compiled =
                    CompiledPattern::new(raw, separator).map_err(|source| GroupError::Pattern {
                        group: spec.name.clone(),
                        pattern: raw.clone(),
                        source,
                    })?;
                patterns.push(compiled);
            }

            groups.push(RestrictionGroup {
                name: spec.name,
                severity: spec.severity,
                message: spec.message,
                patterns,
            });
        }

        Ok(Self { groups, separator })
    }

    /// Groups in declaration order.
    #[must_use]
    pub fn groups(&self) -> &[RestrictionGroup] {
        &self.groups
    }

    /// Looks up a group by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RestrictionGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Number of groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns true if there are no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Finds every group matching `name`, in declaration order.
    ///
    /// Groups listed in `excluded` are skipped for this call only.
    #[must_use]
    pub fn match_all<'a>(&'a self, name: &'a str, excluded: &HashSet<String>) -> Vec<GroupMatch<'a>> {
        let normalized = trim_separator(name, self.separator);
        self.groups
            .iter()
            .filter(|g| !excluded.contains(&g.name))
            .filter(|g| g.matches(normalized))
            .map(|group| GroupMatch {
                group,
                matched_name: name,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups(specs: Vec<GroupSpec>) -> RestrictionGroups {
        RestrictionGroups::compile(specs).expect("groups should compile")
    }

    fn names<'a>(matches: &[GroupMatch<'a>]) -> Vec<&'a str> {
        matches.iter().map(|m| m.group.name()).collect()
    }

    #[test]
    fn test_dotted_wildcard() {
        let table = RestrictionGroups::compile_with_separator(
            vec![GroupSpec::new("foo", Severity::Error, ["Foo.*"])],
            '.',
        )
        .expect("groups should compile");
        let none = HashSet::new();

        assert_eq!(table.match_all("Foo.Bar", &none).len(), 1);
        assert_eq!(table.match_all(".Foo.Bar.Baz", &none).len(), 1);
        assert!(table.match_all("FooBar", &none).is_empty());
        assert!(table.match_all("Fo.Bar", &none).is_empty());
    }

    #[test]
    fn test_backslash_wildcard_and_case() {
        let table = groups(vec![GroupSpec::new(
            "vendor",
            Severity::Warning,
            ["\\Vendor\\Db\\*"],
        )]);
        let none = HashSet::new();

        assert_eq!(table.match_all("\\vendor\\DB\\Conn", &none).len(), 1);
        assert!(table.match_all("\\Vendor\\DbX", &none).is_empty());
    }

    #[test]
    fn test_literal_metacharacters_are_escaped() {
        let table = groups(vec![GroupSpec::new("dot", Severity::Error, ["a.b"])]);
        let none = HashSet::new();

        assert_eq!(table.match_all("a.b", &none).len(), 1);
        assert!(table.match_all("axb", &none).is_empty());
    }

    #[test]
    fn test_regex_style_wildcard_spelling() {
        let table = groups(vec![GroupSpec::new("curl", Severity::Warning, ["curl_.*"])]);
        let none = HashSet::new();

        assert_eq!(table.match_all("curl_init", &none).len(), 1);
        assert!(table.match_all("xcurl_init", &none).is_empty());
    }

    #[test]
    fn test_all_matches_in_declaration_order() {
        let table = groups(vec![
            GroupSpec::new("b", Severity::Error, ["PDO*"]),
            GroupSpec::new("a", Severity::Warning, ["PDO"]),
            GroupSpec::new("c", Severity::Warning, ["Other"]),
        ]);

        let found = table.match_all("\\PDO", &HashSet::new());
        assert_eq!(names(&found), vec!["b", "a"]);
        assert_eq!(found[0].matched_name, "\\PDO");
    }

    #[test]
    fn test_excluded_group_is_skipped() {
        let table = groups(vec![
            GroupSpec::new("first", Severity::Error, ["eval"]),
            GroupSpec::new("second", Severity::Warning, ["ev*"]),
        ]);
        let excluded: HashSet<String> = ["first".to_string()].into_iter().collect();

        let found = table.match_all("eval", &excluded);
        assert_eq!(names(&found), vec!["second"]);
    }

    #[test]
    fn test_resume_position_takes_smallest_nonzero_hint() {
        let result = |hint| MatchResult {
            group_name: "g".to_string(),
            matched_name: "n".to_string(),
            resume_position: hint,
        };

        assert_eq!(
            resume_position(&[result(Some(25)), result(Some(10))]),
            Some(10)
        );
        assert_eq!(
            resume_position(&[result(Some(0)), result(None), result(Some(7))]),
            Some(7)
        );
        assert_eq!(resume_position(&[result(None), result(Some(0))]), None);
        assert_eq!(resume_position(&[]), None);
    }

    #[test]
    fn test_construction_errors() {
        assert!(matches!(
            RestrictionGroups::compile(vec![GroupSpec::new(
                "empty",
                Severity::Error,
                Vec::<String>::new()
            )]),
            Err(GroupError::NoPatterns { .. })
        ));
        assert!(matches!(
            RestrictionGroups::compile(vec![GroupSpec::new("blank", Severity::Error, ["\\"])]),
            Err(GroupError::EmptyPattern { .. })
        ));
        assert!(matches!(
            RestrictionGroups::compile(vec![
                GroupSpec::new("dup", Severity::Error, ["a"]),
                GroupSpec::new("dup", Severity::Error, ["b"]),
            ]),
            Err(GroupError::Duplicate(name)) if name == "dup"
        ));
    }
}
