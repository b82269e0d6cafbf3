//! Sniff presets for common configurations.

use crate::{
    array_indentation, deprecated_classes, discouraged_functions, restricted_functions,
    ArrayIndentation, DEFAULT_MINIMUM_SUPPORTED_VERSION,
};
use tokensniff_core::{GroupError, SniffBox};

/// Preset configurations for tokensniff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Recommended sniffs for any WordPress project.
    Recommended,
    /// Everything, including the VIP hosting restrictions.
    Strict,
    /// Minimal sniffs for gradual adoption.
    Minimal,
}

impl Preset {
    /// Looks up a preset by its configuration name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "recommended" => Some(Self::Recommended),
            "strict" => Some(Self::Strict),
            "minimal" => Some(Self::Minimal),
            _ => None,
        }
    }

    /// Returns the sniffs for this preset.
    ///
    /// # Errors
    ///
    /// Returns an error if a built-in group table fails to compile.
    pub fn sniffs(self) -> Result<Vec<SniffBox>, GroupError> {
        match self {
            Self::Recommended => recommended_sniffs(),
            Self::Strict => strict_sniffs(),
            Self::Minimal => minimal_sniffs(),
        }
    }
}

/// Returns the recommended set of sniffs.
///
/// Includes:
/// - `array-indentation` (TS001)
/// - `discouraged-functions` (TS003)
/// - `deprecated-classes` (TS004)
///
/// # Errors
///
/// Returns an error if a built-in group table fails to compile.
pub fn recommended_sniffs() -> Result<Vec<SniffBox>, GroupError> {
    Ok(vec![
        Box::new(ArrayIndentation::new()),
        Box::new(discouraged_functions()?),
        Box::new(deprecated_classes(DEFAULT_MINIMUM_SUPPORTED_VERSION)?),
    ])
}

/// Returns the strict set of sniffs.
///
/// Includes all recommended sniffs plus `restricted-functions` (TS002).
///
/// # Errors
///
/// Returns an error if a built-in group table fails to compile.
pub fn strict_sniffs() -> Result<Vec<SniffBox>, GroupError> {
    let mut sniffs = recommended_sniffs()?;
    sniffs.push(Box::new(restricted_functions()?));
    Ok(sniffs)
}

/// Returns the minimal set of sniffs.
///
/// For gradual adoption, only includes `deprecated-classes`.
///
/// # Errors
///
/// Returns an error if the class table fails to compile.
pub fn minimal_sniffs() -> Result<Vec<SniffBox>, GroupError> {
    Ok(vec![Box::new(deprecated_classes(
        DEFAULT_MINIMUM_SUPPORTED_VERSION,
    )?)])
}

/// Returns all available sniffs, ordered by code.
///
/// # Errors
///
/// Returns an error if a built-in group table fails to compile.
pub fn all_sniffs() -> Result<Vec<SniffBox>, GroupError> {
    Ok(vec![
        Box::new(ArrayIndentation::new()),
        Box::new(restricted_functions()?),
        Box::new(discouraged_functions()?),
        Box::new(deprecated_classes(DEFAULT_MINIMUM_SUPPORTED_VERSION)?),
    ])
}

/// Looks up a built-in sniff by name (`array-indentation`) or code
/// (`TS001`).
///
/// # Errors
///
/// Returns an error if the sniff's group table fails to compile.
pub fn sniff_by_name(name: &str) -> Result<Option<SniffBox>, GroupError> {
    let sniff: SniffBox = match name.trim() {
        array_indentation::NAME | array_indentation::CODE => Box::new(ArrayIndentation::new()),
        restricted_functions::NAME | restricted_functions::CODE => Box::new(restricted_functions()?),
        discouraged_functions::NAME | discouraged_functions::CODE => {
            Box::new(discouraged_functions()?)
        }
        deprecated_classes::NAME | deprecated_classes::CODE => {
            Box::new(deprecated_classes(DEFAULT_MINIMUM_SUPPORTED_VERSION)?)
        }
        _ => return Ok(None),
    };
    Ok(Some(sniff))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(sniffs: &[SniffBox]) -> Vec<&'static str> {
        sniffs.iter().map(|s| s.name()).collect()
    }

    #[test]
    fn test_preset_sniffs() {
        let recommended = Preset::Recommended.sniffs().expect("tables compile");
        let strict = Preset::Strict.sniffs().expect("tables compile");
        let minimal = Preset::Minimal.sniffs().expect("tables compile");

        assert_eq!(recommended.len(), 3);
        assert_eq!(strict.len(), 4);
        assert_eq!(names(&minimal), vec!["deprecated-classes"]);
        assert!(names(&strict).contains(&"restricted-functions"));
    }

    #[test]
    fn test_all_sniffs_have_unique_codes() {
        let all = all_sniffs().expect("tables compile");
        let codes: Vec<_> = all.iter().map(|s| s.code()).collect();
        assert_eq!(codes, vec!["TS001", "TS002", "TS003", "TS004"]);
    }

    #[test]
    fn test_preset_from_name() {
        assert_eq!(Preset::from_name("Strict"), Some(Preset::Strict));
        assert_eq!(Preset::from_name("minimal"), Some(Preset::Minimal));
        assert_eq!(Preset::from_name("everything"), None);
    }

    #[test]
    fn test_sniff_by_name_or_code() {
        let by_name = sniff_by_name("deprecated-classes").expect("compiles");
        let by_code = sniff_by_name("TS004").expect("compiles");
        assert_eq!(by_name.map(|s| s.code()), Some("TS004"));
        assert_eq!(by_code.map(|s| s.name()), Some("deprecated-classes"));
        assert!(sniff_by_name("no-such-sniff").expect("compiles").is_none());
    }
}
