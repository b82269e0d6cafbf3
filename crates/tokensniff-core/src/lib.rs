//! # tokensniff-core
//!
//! Core framework for token-stream sniffs.
//!
//! This crate provides the building blocks every sniff depends on:
//!
//! - [`TokenStream`], the read-only token model, and a reference
//!   [`PhpLexer`] behind the [`Tokenizer`] trait
//! - qualified-name resolution for class references and function calls
//! - [`RestrictionGroups`], named glob-style pattern tables
//! - array literal scanning and the indentation verifier
//! - token-scoped [`Fix`] edits, applied as a [`FixSet`]
//! - the [`Sniff`] trait, its capability traits and [`RestrictionSniff`]
//! - the [`Analyzer`] that runs sniffs over files and fixes them
//!
//! ## Example
//!
//! ```ignore
//! use tokensniff_core::{Analyzer, ClassReferences, GroupSpec, RestrictionGroups,
//!     RestrictionSniff, Severity};
//!
//! let groups = RestrictionGroups::compile(vec![
//!     GroupSpec::new("pdo", Severity::Error, ["PDO"]).message("Use the wpdb API, not %s."),
//! ])?;
//!
//! let analyzer = Analyzer::builder()
//!     .root("./src")
//!     .sniff(RestrictionSniff::new("no-pdo", "X001", ClassReferences, groups))
//!     .build()?;
//!
//! let result = analyzer.analyze()?;
//! for violation in &result.violations {
//!     println!("{violation}");
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod config;
mod context;
mod rule;
mod types;

pub mod array;
pub mod fixer;
pub mod groups;
pub mod indent;
pub mod lexer;
pub mod message;
pub mod names;
pub mod token;

/// Declarative restriction groups from TOML.
pub mod declarative;

/// Utility modules for sniff implementations.
pub mod utils;

pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError, FixOutcome, MAX_FIX_PASSES};
pub use array::{find_literal_span, split_top_level_elements, ArrayElement, ArrayLiteralSpan};
pub use config::{AnalyzerConfig, Config, ConfigError, RuleConfig};
pub use context::SniffContext;
pub use fixer::{Fix, FixSet};
pub use groups::{
    resume_position, CompiledPattern, GroupError, GroupMatch, GroupSpec, MatchResult,
    RestrictionGroup, RestrictionGroups,
};
pub use indent::{
    check_indentation, line_indentation, IndentFinding, IndentIssue, IndentReport, LineIndent,
};
pub use lexer::{LexError, PhpLexer, Tokenizer};
pub use message::MessageTemplate;
pub use names::{resolve_class_reference, resolve_function_call, ResolvedName};
pub use rule::{
    ClassReferences, FunctionCalls, MatchHandler, ReportMatch, RestrictionSniff, Sniff, SniffBox,
    TargetExtractor,
};
pub use token::{Condition, Token, TokenKind, TokenStream};
pub use types::{LintResult, Location, Severity, Violation};
pub use utils::allowance::{AllowCheck, Allowances};
