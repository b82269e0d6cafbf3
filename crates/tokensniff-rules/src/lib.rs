//! # tokensniff-rules
//!
//! Built-in sniffs for tokensniff.
//!
//! The restriction sniffs are plain data tables handed to the generic
//! [`tokensniff_core::RestrictionSniff`]; only the way a hit is reported
//! differs between them.
//!
//! ## Available Sniffs
//!
//! | Code | Name | Description |
//! |------|------|-------------|
//! | TS001 | `array-indentation` | Tab indentation of multi-line arrays (fixable) |
//! | TS002 | `restricted-functions` | Functions restricted on VIP hosting |
//! | TS003 | `discouraged-functions` | Debug and deprecated functions, with alternatives |
//! | TS004 | `deprecated-classes` | Deprecated WordPress classes |
//!
//! ## Usage
//!
//! ```ignore
//! use tokensniff_core::Analyzer;
//! use tokensniff_rules::{deprecated_classes, ArrayIndentation};
//!
//! let analyzer = Analyzer::builder()
//!     .root("./wp-content/plugins/my-plugin")
//!     .sniff(ArrayIndentation::new())
//!     .sniff(deprecated_classes("6.2")?)
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod array_indentation;
mod deprecated_classes;
mod discouraged_functions;
mod presets;
mod restricted_functions;

pub use array_indentation::ArrayIndentation;
pub use deprecated_classes::{
    deprecated_classes, DeprecatedClass, DeprecatedClassHandler, DeprecatedClasses,
    DEFAULT_MINIMUM_SUPPORTED_VERSION, DEPRECATED_CLASSES,
};
pub use discouraged_functions::{
    discouraged_functions, discouraged_groups, DiscouragedFunctions, ReportFound,
};
pub use presets::{
    all_sniffs, minimal_sniffs, recommended_sniffs, sniff_by_name, strict_sniffs, Preset,
};
pub use restricted_functions::{restricted_functions, vip_groups, RestrictedFunctions};

/// Re-export core types for convenience.
pub use tokensniff_core::{Severity, Sniff, SniffBox, Violation};
