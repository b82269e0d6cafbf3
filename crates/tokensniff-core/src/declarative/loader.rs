//! DTO → group spec conversion with validation.

use crate::groups::GroupSpec;
use crate::message::MessageTemplate;
use crate::types::Severity;

use super::config_dto::DeclarativeConfigDto;
use std::collections::HashSet;

/// Errors during DTO → spec conversion.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// A group without a name.
    #[error("{context}: group name must not be empty")]
    EmptyName {
        /// Where the error occurred (e.g., "restrict-class[0]").
        context: String,
    },

    /// A group without patterns.
    #[error("{context}: at least one pattern is required")]
    NoPatterns {
        /// Where the error occurred.
        context: String,
    },

    /// Unknown severity string.
    #[error("{context}: unknown severity `{value}`, expected: error, warning, info")]
    UnknownSeverity {
        /// Where the error occurred.
        context: String,
        /// The invalid value.
        value: String,
    },

    /// Two groups of the same section share a name.
    #[error("{section}: duplicate group name `{name}`")]
    DuplicateName {
        /// Section name.
        section: &'static str,
        /// The repeated name.
        name: String,
    },
}

/// Validated declarative groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclarativeGroups {
    /// Groups matched against class references.
    pub classes: Vec<GroupSpec>,
    /// Groups matched against function calls.
    pub functions: Vec<GroupSpec>,
}

impl DeclarativeGroups {
    /// Returns true if no group is defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.functions.is_empty()
    }
}

/// Converts a `DeclarativeConfigDto` to validated group specs.
///
/// # Errors
///
/// Returns the first error encountered during conversion.
pub fn load(dto: DeclarativeConfigDto) -> Result<DeclarativeGroups, LoadError> {
    let classes = dto
        .restrict_class
        .into_iter()
        .enumerate()
        .map(|(i, d)| {
            convert(
                format!("restrict-class[{i}]"),
                d.name,
                &d.severity,
                d.message,
                d.classes,
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    let functions = dto
        .restrict_function
        .into_iter()
        .enumerate()
        .map(|(i, d)| {
            convert(
                format!("restrict-function[{i}]"),
                d.name,
                &d.severity,
                d.message,
                d.functions,
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    check_unique("restrict-class", &classes)?;
    check_unique("restrict-function", &functions)?;

    Ok(DeclarativeGroups { classes, functions })
}

fn convert(
    context: String,
    name: String,
    severity: &str,
    message: Option<String>,
    patterns: Vec<String>,
) -> Result<GroupSpec, LoadError> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(LoadError::EmptyName { context });
    }

    let patterns: Vec<String> = patterns
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    if patterns.is_empty() {
        return Err(LoadError::NoPatterns {
            context: format!("{context}.{name}"),
        });
    }

    Ok(GroupSpec {
        severity: parse_severity(severity, &format!("{context}.type"))?,
        message: message.map(MessageTemplate::new),
        patterns,
        name,
    })
}

fn check_unique(section: &'static str, specs: &[GroupSpec]) -> Result<(), LoadError> {
    let mut seen = HashSet::new();
    for spec in specs {
        if !seen.insert(spec.name.as_str()) {
            return Err(LoadError::DuplicateName {
                section,
                name: spec.name.clone(),
            });
        }
    }
    Ok(())
}

fn parse_severity(s: &str, context: &str) -> Result<Severity, LoadError> {
    match s {
        "error" => Ok(Severity::Error),
        "warning" => Ok(Severity::Warning),
        "info" => Ok(Severity::Info),
        _ => Err(LoadError::UnknownSeverity {
            context: context.to_string(),
            value: s.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_str: &str) -> DeclarativeConfigDto {
        toml::from_str(toml_str).expect("valid toml")
    }

    #[test]
    fn load_valid_groups() {
        let dto = parse(
            r#"
[[restrict-class]]
name = "pdo"
type = "warning"
message = "Avoid %s"
classes = ["PDO", " \\Vendor\\* "]

[[restrict-function]]
name = "debug"
functions = ["var_dump"]
"#,
        );
        let groups = load(dto).expect("valid groups");

        assert_eq!(groups.classes.len(), 1);
        assert_eq!(groups.classes[0].severity, Severity::Warning);
        assert_eq!(groups.classes[0].patterns, vec!["PDO", "\\Vendor\\*"]);
        assert_eq!(
            groups.classes[0].message.as_ref().map(MessageTemplate::as_str),
            Some("Avoid %s")
        );
        assert_eq!(groups.functions[0].severity, Severity::Error);
        assert!(!groups.is_empty());
    }

    #[test]
    fn load_rejects_unknown_severity() {
        let dto = parse(
            r#"
[[restrict-function]]
name = "debug"
type = "fatal"
functions = ["var_dump"]
"#,
        );
        let err = load(dto).expect_err("should fail");
        assert!(matches!(err, LoadError::UnknownSeverity { ref value, .. } if value == "fatal"));
        assert!(err.to_string().contains("restrict-function[0].type"));
    }

    #[test]
    fn load_rejects_empty_patterns_and_names() {
        let dto = parse("[[restrict-class]]\nname = \"x\"\nclasses = [\"  \"]\n");
        assert!(matches!(load(dto), Err(LoadError::NoPatterns { .. })));

        let dto = parse("[[restrict-class]]\nname = \" \"\nclasses = [\"A\"]\n");
        assert!(matches!(load(dto), Err(LoadError::EmptyName { .. })));
    }

    #[test]
    fn load_rejects_duplicate_names() {
        let dto = parse(
            r#"
[[restrict-class]]
name = "dup"
classes = ["A"]

[[restrict-class]]
name = "dup"
classes = ["B"]
"#,
        );
        assert!(matches!(
            load(dto),
            Err(LoadError::DuplicateName { section: "restrict-class", .. })
        ));
    }
}
