//! Token-scoped edits and their application.
//!
//! The stream is never mutated: fixes are collected into a [`FixSet`] and
//! rendered into new source text, which the host tokenizes again.

use crate::token::TokenStream;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single edit anchored at one token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fix {
    /// Insert `text` before the token.
    InsertBefore {
        /// Target token.
        position: usize,
        /// Text to insert.
        text: String,
    },
    /// Replace the token's text with `text`.
    ReplaceToken {
        /// Target token.
        position: usize,
        /// Replacement text.
        text: String,
    },
}

impl Fix {
    /// Target token position.
    #[must_use]
    pub fn position(&self) -> usize {
        match self {
            Self::InsertBefore { position, .. } | Self::ReplaceToken { position, .. } => *position,
        }
    }

    /// Inserted or replacement text.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::InsertBefore { text, .. } | Self::ReplaceToken { text, .. } => text,
        }
    }
}

/// Fixes collected for one stream.
///
/// At most one fix per token; a later fix targeting an already edited token
/// is rejected and left for the next pass.
#[derive(Debug, Clone, Default)]
pub struct FixSet {
    fixes: BTreeMap<usize, Fix>,
}

impl FixSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a fix. Returns false if the token already has one.
    pub fn add(&mut self, fix: Fix) -> bool {
        let position = fix.position();
        if self.fixes.contains_key(&position) {
            return false;
        }
        self.fixes.insert(position, fix);
        true
    }

    /// Number of accepted fixes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fixes.len()
    }

    /// Returns true if no fix was accepted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fixes.is_empty()
    }

    /// Accepted fixes in token order.
    pub fn iter(&self) -> impl Iterator<Item = &Fix> {
        self.fixes.values()
    }

    /// Renders the stream's source with all fixes applied.
    #[must_use]
    pub fn apply(&self, stream: &TokenStream) -> String {
        let mut out = String::new();
        for (position, token) in stream.tokens().iter().enumerate() {
            match self.fixes.get(&position) {
                Some(Fix::InsertBefore { text, .. }) => {
                    out.push_str(text);
                    out.push_str(token.source_text());
                }
                Some(Fix::ReplaceToken { text, .. }) => out.push_str(text),
                None => out.push_str(token.source_text()),
            }
        }
        out
    }
}

impl<'a> IntoIterator for &'a FixSet {
    type Item = &'a Fix;
    type IntoIter = std::collections::btree_map::Values<'a, usize, Fix>;

    fn into_iter(self) -> Self::IntoIter {
        self.fixes.values()
    }
}
