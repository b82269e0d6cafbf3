//! `printf`-style message templates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A message with `%s` placeholders filled in order.
///
/// `%d` is accepted as an alias of `%s`, `%%` renders a literal percent sign.
/// Missing arguments render as nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageTemplate(String);

impl MessageTemplate {
    /// Creates a template.
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// Returns the raw template.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Substitutes `args` into the placeholders.
    #[must_use]
    pub fn render<S: AsRef<str>>(&self, args: &[S]) -> String {
        let mut out = String::with_capacity(self.0.len());
        let mut args = args.iter();
        let mut chars = self.0.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '%' {
                out.push(c);
                continue;
            }
            match chars.peek() {
                Some('s' | 'd') => {
                    chars.next();
                    if let Some(arg) = args.next() {
                        out.push_str(arg.as_ref());
                    }
                }
                Some('%') => {
                    chars.next();
                    out.push('%');
                }
                _ => out.push('%'),
            }
        }

        out
    }
}

impl fmt::Display for MessageTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageTemplate {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_in_order() {
        let t = MessageTemplate::new("expected %s space(s) but found %s");
        assert_eq!(t.render(&["4", "8"]), "expected 4 space(s) but found 8");
    }

    #[test]
    fn test_render_escapes_and_missing_args() {
        let t = MessageTemplate::new("100%% of %s() and %s");
        assert_eq!(t.render(&["eval"]), "100% of eval() and ");
    }

    #[test]
    fn test_render_without_placeholders() {
        let t = MessageTemplate::new("Use JS instead.");
        assert_eq!(t.render(&["setcookie"]), "Use JS instead.");
    }
}
