//! TOML deserialization types (DTO layer).
//!
//! These types exist solely for serde deserialization.
//! They are converted to validated group specs via the loader.

use serde::Deserialize;

/// Raw TOML representation of declarative restriction groups.
///
/// Extends the base `Config` with `[[restrict-class]]` and
/// `[[restrict-function]]` sections.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeclarativeConfigDto {
    /// Class restriction groups.
    #[serde(rename = "restrict-class", default)]
    pub restrict_class: Vec<RestrictClassDto>,

    /// Function restriction groups.
    #[serde(rename = "restrict-function", default)]
    pub restrict_function: Vec<RestrictFunctionDto>,
}

/// TOML representation of a class restriction group.
#[derive(Debug, Clone, Deserialize)]
pub struct RestrictClassDto {
    /// Group name (also the violation code).
    pub name: String,
    /// Severity (default: "error").
    #[serde(rename = "type", default = "default_severity_str")]
    pub severity: String,
    /// Violation message; `%s` is replaced by the qualified class name.
    #[serde(default)]
    pub message: Option<String>,
    /// Class name patterns, `*` as wildcard.
    pub classes: Vec<String>,
}

/// TOML representation of a function restriction group.
#[derive(Debug, Clone, Deserialize)]
pub struct RestrictFunctionDto {
    /// Group name (also the violation code).
    pub name: String,
    /// Severity (default: "error").
    #[serde(rename = "type", default = "default_severity_str")]
    pub severity: String,
    /// Violation message; `%s` is replaced by the function name.
    #[serde(default)]
    pub message: Option<String>,
    /// Function name patterns, `*` as wildcard.
    pub functions: Vec<String>,
}

fn default_severity_str() -> String {
    "error".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_empty() {
        let dto: DeclarativeConfigDto = toml::from_str("").expect("valid toml");
        assert!(dto.restrict_class.is_empty());
        assert!(dto.restrict_function.is_empty());
    }

    #[test]
    fn deserialize_full_config() {
        let toml_str = r#"
[analyzer]
root = "."

[[restrict-class]]
name = "pdo"
type = "warning"
message = "Avoid direct database access (%s)."
classes = ["PDO", "\\Vendor\\Db\\*"]

[[restrict-function]]
name = "debug"
functions = ["var_dump", "print_r"]
"#;
        let dto: DeclarativeConfigDto = toml::from_str(toml_str).expect("valid toml");
        assert_eq!(dto.restrict_class.len(), 1);
        assert_eq!(dto.restrict_class[0].severity, "warning");
        assert_eq!(dto.restrict_class[0].classes[1], "\\Vendor\\Db\\*");
        assert_eq!(dto.restrict_function.len(), 1);
        assert_eq!(dto.restrict_function[0].severity, "error");
        assert!(dto.restrict_function[0].message.is_none());
    }
}
