//! Sniff flagging deprecated WordPress classes.
//!
//! A reference is an error when the class was deprecated before the
//! minimum WordPress version the project supports, and a warning
//! otherwise. The minimum comes from `minimum_supported_version` in
//! `[rules.deprecated-classes]`, falling back to the value the sniff was
//! built with.

use std::cmp::Ordering;

use tokensniff_core::{
    ClassReferences, GroupError, GroupSpec, MatchHandler, MessageTemplate, ResolvedName,
    RestrictionGroup, RestrictionGroups, RestrictionSniff, Severity, SniffContext,
};

/// Sniff code for deprecated-classes.
pub const CODE: &str = "TS004";

/// Sniff name for deprecated-classes.
pub const NAME: &str = "deprecated-classes";

/// Minimum WordPress version assumed when none is configured.
pub const DEFAULT_MINIMUM_SUPPORTED_VERSION: &str = "6.0";

const GROUP: &str = "deprecated_classes";
const MESSAGE: &str = "The %s class has been deprecated since WordPress version %s.";
const ALTERNATIVE: &str = " Use %s instead.";

/// The deprecated-classes sniff.
pub type DeprecatedClasses = RestrictionSniff<ClassReferences, DeprecatedClassHandler>;

/// A deprecated class and what replaces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeprecatedClass {
    /// Class name.
    pub name: &'static str,
    /// Replacement, if there is one.
    pub alternative: Option<&'static str>,
    /// WordPress version that deprecated the class.
    pub version: &'static str,
}

/// Known deprecated classes.
pub const DEPRECATED_CLASSES: &[DeprecatedClass] = &[
    DeprecatedClass {
        name: "WP_User_Search",
        alternative: Some("WP_User_Query"),
        version: "3.1.0",
    },
    DeprecatedClass {
        name: "Customize_New_Menu_Section",
        alternative: None,
        version: "4.9.0",
    },
    DeprecatedClass {
        name: "WP_Customize_New_Menu_Control",
        alternative: None,
        version: "4.9.0",
    },
    DeprecatedClass {
        name: "Services_JSON",
        alternative: Some("The PHP native JSON extension"),
        version: "5.3.0",
    },
];

/// Reports a deprecated class with its version and replacement.
#[derive(Debug, Clone)]
pub struct DeprecatedClassHandler {
    minimum_supported_version: String,
}

impl DeprecatedClassHandler {
    /// Creates a handler for projects supporting `minimum_supported_version`
    /// and up.
    #[must_use]
    pub fn new(minimum_supported_version: impl Into<String>) -> Self {
        Self {
            minimum_supported_version: minimum_supported_version.into(),
        }
    }
}

impl MatchHandler for DeprecatedClassHandler {
    fn handle(
        &self,
        ctx: &mut SniffContext<'_>,
        name: &ResolvedName,
        _group: &RestrictionGroup,
    ) -> Option<usize> {
        let written = name.qualified_text.trim_start_matches('\\');
        let class = name.unqualified();
        let entry = DEPRECATED_CLASSES
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(class))?;

        let minimum = ctx.rule_config().map_or(
            self.minimum_supported_version.as_str(),
            |c| c.get_str("minimum_supported_version", &self.minimum_supported_version),
        );
        let severity = if compare_versions(entry.version, minimum) == Ordering::Less {
            Severity::Error
        } else {
            Severity::Warning
        };

        let mut args = vec![written, entry.version];
        let mut template = MESSAGE.to_string();
        if let Some(alternative) = entry.alternative {
            template.push_str(ALTERNATIVE);
            args.push(alternative);
        }
        let message = MessageTemplate::new(template).render(&args);

        let mut violation = ctx.violation(
            error_code(&format!("{}Found", entry.name.to_lowercase())),
            severity,
            name.source_position,
            message,
        );
        if let Some(alternative) = entry.alternative {
            violation = violation.with_suggestion(format!("Replace with {alternative}"));
        }
        ctx.report(violation);
        None
    }
}

/// Replaces everything but ASCII letters, digits and `_` with `_`.
fn error_code(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Compares dotted version strings numerically; missing parts count as 0.
fn compare_versions(a: &str, b: &str) -> Ordering {
    let parse = |v: &str| -> Vec<u64> {
        v.trim()
            .split('.')
            .map(|part| {
                part.chars()
                    .take_while(char::is_ascii_digit)
                    .collect::<String>()
                    .parse()
                    .unwrap_or(0)
            })
            .collect()
    };
    let (a, b) = (parse(a), parse(b));
    let len = a.len().max(b.len());

    (0..len)
        .map(|i| {
            let x = a.get(i).copied().unwrap_or(0);
            let y = b.get(i).copied().unwrap_or(0);
            x.cmp(&y)
        })
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Creates the deprecated-classes sniff for projects supporting
/// `minimum_supported_version` and up.
///
/// # Errors
///
/// Returns an error if the class table fails to compile.
pub fn deprecated_classes(
    minimum_supported_version: &str,
) -> Result<DeprecatedClasses, GroupError> {
    let groups = RestrictionGroups::compile([GroupSpec::new(
        GROUP,
        Severity::Warning,
        DEPRECATED_CLASSES.iter().map(|c| c.name),
    )])?;
    Ok(RestrictionSniff::new(NAME, CODE, ClassReferences, groups)
        .with_handler(DeprecatedClassHandler::new(minimum_supported_version))
        .with_description("Flags deprecated WordPress classes and suggests replacements")
        .with_default_severity(Severity::Warning))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tokensniff_core::{Analyzer, Config, Violation};

    fn check_with(config: Config, minimum: &str, source: &str) -> Vec<Violation> {
        Analyzer::builder()
            .config(config)
            .sniff(deprecated_classes(minimum).expect("table should compile"))
            .build()
            .expect("analyzer should build")
            .check_source(Path::new("admin.php"), source)
            .expect("source should tokenize")
    }

    fn check(source: &str) -> Vec<Violation> {
        check_with(Config::default(), DEFAULT_MINIMUM_SUPPORTED_VERSION, source)
    }

    #[test]
    fn test_compare_versions() {
        assert_eq!(compare_versions("3.1.0", "6.0"), Ordering::Less);
        assert_eq!(compare_versions("5.3", "5.3.0"), Ordering::Equal);
        assert_eq!(compare_versions("5.10", "5.9"), Ordering::Greater);
        assert_eq!(compare_versions("4.9.0", "4.9.0-beta"), Ordering::Equal);
    }

    #[test]
    fn test_error_code() {
        assert_eq!(error_code("wp_user_searchFound"), "wp_user_searchFound");
        assert_eq!(error_code("a-b.cFound"), "a_b_cFound");
    }

    #[test]
    fn test_deprecated_with_alternative() {
        let violations = check("<?php\n$search = new WP_User_Search( $q );\n");

        assert_eq!(violations.len(), 1);
        let v = &violations[0];
        assert_eq!(v.code, "wp_user_searchFound");
        assert_eq!(v.severity, Severity::Error);
        assert_eq!(
            v.message,
            "The WP_User_Search class has been deprecated since WordPress version 3.1.0. Use WP_User_Query instead."
        );
        assert_eq!(v.suggestion.as_deref(), Some("Replace with WP_User_Query"));
    }

    #[test]
    fn test_deprecated_without_alternative() {
        let violations = check("<?php\nclass My_Section extends Customize_New_Menu_Section {}\n");

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, "customize_new_menu_sectionFound");
        assert_eq!(
            violations[0].message,
            "The Customize_New_Menu_Section class has been deprecated since WordPress version 4.9.0."
        );
        assert!(violations[0].suggestion.is_none());
    }

    #[test]
    fn test_warning_when_deprecated_after_minimum() {
        let violations = check_with(
            Config::default(),
            "5.0",
            "<?php\n$json = new \\Services_JSON();\n",
        );
        assert_eq!(violations[0].severity, Severity::Warning);
        assert!(violations[0].message.starts_with("The Services_JSON class"));
    }

    #[test]
    fn test_configured_minimum_overrides_builder() {
        let config = Config::parse("[rules.deprecated-classes]\nminimum_supported_version = \"4.0\"\n")
            .expect("valid config");
        let violations = check_with(config, "6.0", "<?php\nWP_User_Search::instance();\nnew Services_JSON;\n");

        let severities: Vec<_> = violations.iter().map(|v| v.severity).collect();
        assert_eq!(severities, vec![Severity::Error, Severity::Warning]);
    }

    #[test]
    fn test_namespaced_reference_is_not_the_global_class() {
        let source = "<?php\nnamespace Plugin;\nnew WP_User_Search();\nnew \\WP_User_Search();\n";
        let violations = check(source);

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location.line, 4);
    }
}
