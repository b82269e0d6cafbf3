//! Declarative restriction groups driven by TOML configuration.
//!
//! Lets a project restrict classes and functions without writing Rust
//! sniff code.
//!
//! # Architecture
//!
//! ```text
//! TOML text
//!   ↓ serde (DTO layer)
//! config_dto types
//!   ↓ validate + convert
//! DeclarativeGroups (GroupSpec lists)
//!   ↓ create_sniffs()
//! Vec<SniffBox>  (restrict-class, restrict-function)
//! ```

pub mod config_dto;
pub mod loader;

use crate::groups::{GroupError, RestrictionGroups};
use crate::rule::{ClassReferences, FunctionCalls, RestrictionSniff, SniffBox};

pub use loader::DeclarativeGroups;

/// Name of the sniff built from `[[restrict-class]]` sections.
pub const RESTRICT_CLASS: &str = "restrict-class";

/// Name of the sniff built from `[[restrict-function]]` sections.
pub const RESTRICT_FUNCTION: &str = "restrict-function";

/// Errors from parsing TOML and building declarative sniffs.
#[derive(Debug, thiserror::Error)]
pub enum LoadRulesError {
    /// TOML deserialization failed.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Validation failed.
    #[error("{0}")]
    Load(#[from] loader::LoadError),

    /// A group pattern did not compile.
    #[error("{0}")]
    Group(#[from] GroupError),
}

/// Parses TOML content and creates the declarative sniffs it defines.
///
/// Returns `Ok(vec![])` if no declarative sections are present.
///
/// # Errors
///
/// Returns an error if TOML parsing, validation or pattern compilation
/// fails.
pub fn load_sniffs_from_toml(content: &str) -> Result<Vec<SniffBox>, LoadRulesError> {
    let dto: config_dto::DeclarativeConfigDto = toml::from_str(content)?;
    let groups = loader::load(dto)?;
    create_sniffs(groups)
}

/// Creates sniffs from validated groups.
///
/// # Errors
///
/// Returns an error if a group pattern does not compile.
pub fn create_sniffs(groups: DeclarativeGroups) -> Result<Vec<SniffBox>, LoadRulesError> {
    let mut result: Vec<SniffBox> = Vec::new();

    if !groups.classes.is_empty() {
        let table = RestrictionGroups::compile(groups.classes)?;
        result.push(Box::new(
            RestrictionSniff::new(RESTRICT_CLASS, "TS100", ClassReferences, table)
                .with_description("Project-defined class restrictions"),
        ));
    }
    if !groups.functions.is_empty() {
        let table = RestrictionGroups::compile(groups.functions)?;
        result.push(Box::new(
            RestrictionSniff::new(RESTRICT_FUNCTION, "TS101", FunctionCalls, table)
                .with_description("Project-defined function restrictions"),
        ));
    }

    Ok(result)
}
