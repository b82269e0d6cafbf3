//! Qualified-name resolution for class and function references.
//!
//! Names are resolved purely from the token stream: relative class names are
//! prefixed with the enclosing namespace, which is either the innermost
//! block-scoped namespace around the reference or the nearest preceding
//! file-level (semicolon-terminated) namespace declaration.

use crate::token::{TokenKind, TokenStream};
use serde::{Deserialize, Serialize};

/// Qualifier separator used in resolved names.
pub const NS_SEPARATOR: char = '\\';

/// Tokens that can make up a (possibly qualified) name.
const NAME_TOKENS: &[TokenKind] = &[
    TokenKind::Identifier,
    TokenKind::NsSeparator,
    TokenKind::Namespace,
];

/// Names that refer to the current class hierarchy rather than a class.
const SELF_REFERENCES: &[&str] = &["parent", "self", "static"];

/// Tokens at which a class reference can be resolved.
pub const CLASS_REFERENCE_TOKENS: &[TokenKind] = &[
    TokenKind::DoubleColon,
    TokenKind::New,
    TokenKind::Extends,
    TokenKind::Implements,
];

/// A fully qualified reference to a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedName {
    /// Qualified name, e.g. `\App\Widget` (or a bare function name).
    pub qualified_text: String,
    /// Position of the token the resolution was triggered at.
    pub source_position: usize,
}

impl ResolvedName {
    /// The name without its leading separator.
    #[must_use]
    pub fn unqualified(&self) -> &str {
        self.qualified_text
            .strip_prefix(NS_SEPARATOR)
            .unwrap_or(&self.qualified_text)
    }
}

/// Resolves the class referenced at a `::`, `new`, `extends` or
/// `implements` token.
///
/// Returns `None` when no name can be extracted or when the name is a
/// self-reference (`self`, `parent`, `static`).
#[must_use]
pub fn resolve_class_reference(stream: &TokenStream, position: usize) -> Option<ResolvedName> {
    let token = stream.get(position)?;

    let (name_start, name_end) = match token.kind {
        TokenKind::New | TokenKind::Extends | TokenKind::Implements => {
            let start = stream.find_next_excluding(&[TokenKind::Whitespace], position + 1, None)?;
            // Runs up to the first terminator: `(`, whitespace, `;`, `->`, `}` ...
            let end = stream
                .find_next_excluding(NAME_TOKENS, start, None)
                .unwrap_or(stream.len());
            (start, end)
        }
        TokenKind::DoubleColon => {
            let last = stream.previous_non_empty(position.checked_sub(1)?)?;
            if stream[last].kind != TokenKind::Identifier {
                return None;
            }
            let mut start = last;
            while start > 0 && NAME_TOKENS.contains(&stream[start - 1].kind) {
                start -= 1;
            }
            (start, last + 1)
        }
        _ => return None,
    };

    if name_end <= name_start {
        return None;
    }

    let name = stream.tokens_as_string(name_start, name_end - name_start);
    if name.is_empty()
        || SELF_REFERENCES
            .iter()
            .any(|s| s.eq_ignore_ascii_case(&name))
    {
        return None;
    }

    let qualified_text = if stream[name_start].kind == TokenKind::NsSeparator {
        name
    } else {
        qualify(stream, &name, name_start)
    };

    Some(ResolvedName {
        qualified_text,
        source_position: position,
    })
}

/// Prefixes a relative name with the namespace in effect at `position`.
fn qualify(stream: &TokenStream, name: &str, position: usize) -> String {
    let relative = strip_namespace_keyword(name);
    match enclosing_namespace(stream, position) {
        Some(ns) if !ns.is_empty() => format!("{NS_SEPARATOR}{ns}{NS_SEPARATOR}{relative}"),
        _ => format!("{NS_SEPARATOR}{relative}"),
    }
}

fn strip_namespace_keyword(name: &str) -> &str {
    const PREFIX: &str = "namespace\\";
    match name.get(..PREFIX.len()) {
        Some(head) if head.eq_ignore_ascii_case(PREFIX) => &name[PREFIX.len()..],
        _ => name,
    }
}

/// Returns the name of the namespace in effect at `position`.
///
/// The innermost enclosing block-scoped namespace wins; outer file-level
/// declarations are not merged into it. `None` means global scope.
#[must_use]
pub fn enclosing_namespace(stream: &TokenStream, position: usize) -> Option<String> {
    let token = stream.get(position)?;

    if let Some(block) = token
        .conditions
        .iter()
        .rev()
        .find(|c| c.kind == TokenKind::Namespace && c.closer > position)
    {
        return Some(namespace_name(stream, block.owner));
    }

    let mut search = position;
    while let Some(keyword) = stream.find_previous(&[TokenKind::Namespace], search) {
        if is_file_namespace_declaration(stream, keyword) {
            return Some(namespace_name(stream, keyword));
        }
        if keyword == 0 {
            break;
        }
        search = keyword - 1;
    }

    None
}

/// A `namespace` keyword starting a declaration without a brace body.
fn is_file_namespace_declaration(stream: &TokenStream, keyword: usize) -> bool {
    if stream[keyword].scope_opener.is_some() {
        return false;
    }
    // `namespace\Foo` is a relative name, not a declaration.
    stream
        .next_non_empty(keyword + 1)
        .is_some_and(|next| stream[next].kind == TokenKind::Identifier)
}

/// Extracts the declared name following a `namespace` keyword.
#[must_use]
pub fn namespace_name(stream: &TokenStream, keyword: usize) -> String {
    let Some(start) = stream.find_next_excluding(&[TokenKind::Whitespace], keyword + 1, None) else {
        return String::new();
    };
    let end = stream
        .find_next(
            &[
                TokenKind::OpenBrace,
                TokenKind::Whitespace,
                TokenKind::Semicolon,
            ],
            start,
            None,
        )
        .unwrap_or(stream.len());
    if end <= start {
        return String::new();
    }
    stream.tokens_as_string(start, end - start)
}

/// Resolves a global function call at an identifier token.
///
/// Method calls, static calls, declarations, instantiations and calls to
/// namespaced functions are not targets. The returned name is the bare
/// function name as written.
#[must_use]
pub fn resolve_function_call(stream: &TokenStream, position: usize) -> Option<ResolvedName> {
    let token = stream.get(position)?;
    if token.kind != TokenKind::Identifier {
        return None;
    }

    let next = stream.next_non_empty(position + 1)?;
    if stream[next].kind != TokenKind::OpenParen {
        return None;
    }

    let before = |p: usize| p.checked_sub(1).and_then(|p| stream.previous_non_empty(p));

    let mut prev = before(position);
    if let Some(separator) = prev.filter(|&p| stream[p].kind == TokenKind::NsSeparator) {
        // `\foo()` is global, `Bar\foo()` / `namespace\foo()` is not.
        prev = before(separator);
        if prev.is_some_and(|p| {
            matches!(stream[p].kind, TokenKind::Identifier | TokenKind::Namespace)
        }) {
            return None;
        }
    }

    // `function &name()` declares a function returning by reference.
    if let Some(amp) =
        prev.filter(|&p| stream[p].kind == TokenKind::Operator && stream[p].text == "&")
    {
        if before(amp).is_some_and(|p| stream[p].kind == TokenKind::Function) {
            return None;
        }
    }

    if prev.is_some_and(|p| {
        matches!(
            stream[p].kind,
            TokenKind::ObjectOperator
                | TokenKind::DoubleColon
                | TokenKind::Function
                | TokenKind::New
        )
    }) {
        return None;
    }

    Some(ResolvedName {
        qualified_text: token.text.clone(),
        source_position: position,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{PhpLexer, Tokenizer};

    fn lex(source: &str) -> TokenStream {
        PhpLexer::new().tokenize(source).expect("source should tokenize")
    }

    fn class_refs(source: &str) -> Vec<String> {
        let stream = lex(source);
        (0..stream.len())
            .filter(|&i| CLASS_REFERENCE_TOKENS.contains(&stream[i].kind))
            .filter_map(|i| resolve_class_reference(&stream, i))
            .map(|r| r.qualified_text)
            .collect()
    }

    fn function_calls(source: &str) -> Vec<String> {
        let stream = lex(source);
        (0..stream.len())
            .filter_map(|i| resolve_function_call(&stream, i))
            .map(|r| r.qualified_text)
            .collect()
    }

    #[test]
    fn test_global_namespace() {
        assert_eq!(class_refs("<?php $w = new Widget();"), vec!["\\Widget"]);
    }

    #[test]
    fn test_file_level_namespace() {
        assert_eq!(
            class_refs("<?php\nnamespace App;\n$w = new Widget;"),
            vec!["\\App\\Widget"]
        );
    }

    #[test]
    fn test_block_scoped_namespace() {
        let source = "<?php\nnamespace App\\UI {\n\t$w = new Widget();\n}\n";
        assert_eq!(class_refs(source), vec!["\\App\\UI\\Widget"]);
    }

    #[test]
    fn test_block_namespace_is_not_merged_with_file_namespace() {
        let source = "<?php\nnamespace Outer;\nnamespace Inner {\n\tnew Widget();\n}\n";
        assert_eq!(class_refs(source), vec!["\\Inner\\Widget"]);
    }

    #[test]
    fn test_file_namespace_applies_inside_class_bodies() {
        let source = "<?php\nnamespace App;\nclass A {\n\tfunction f() {\n\t\treturn new Widget();\n\t}\n}\n";
        assert_eq!(class_refs(source), vec!["\\App\\Widget"]);
    }

    #[test]
    fn test_nearest_preceding_file_namespace_wins() {
        let source = "<?php\nnamespace First;\nnew A();\nnamespace Second;\nnew B();\n";
        assert_eq!(class_refs(source), vec!["\\First\\A", "\\Second\\B"]);
    }

    #[test]
    fn test_fully_qualified_names_are_untouched() {
        let source = "<?php\nnamespace App;\nnew \\Vendor\\Lib\\Thing();";
        assert_eq!(class_refs(source), vec!["\\Vendor\\Lib\\Thing"]);
    }

    #[test]
    fn test_namespace_keyword_prefix_is_stripped() {
        let source = "<?php\nnamespace App;\nnew namespace\\Sub\\Thing();";
        assert_eq!(class_refs(source), vec!["\\App\\Sub\\Thing"]);
    }

    #[test]
    fn test_static_access_and_inheritance() {
        let source = "<?php\nclass A extends Base implements Iface {\n\tfunction f() {\n\t\tHelper::run();\n\t\t\\Lib\\Tool :: go();\n\t}\n}\n";
        assert_eq!(
            class_refs(source),
            vec!["\\Base", "\\Iface", "\\Helper", "\\Lib\\Tool"]
        );
    }

    #[test]
    fn test_self_references_are_not_targets() {
        let source = "<?php\nself::a(); parent::b(); static::c(); new static(); new self;";
        assert!(class_refs(source).is_empty());
    }

    #[test]
    fn test_dynamic_references_are_not_targets() {
        let source = "<?php\n$cls::make(); new $cls(); new class {};";
        assert!(class_refs(source).is_empty());
    }

    #[test]
    fn test_function_calls() {
        let source = "<?php\neval('x'); $o->eval(); A::eval(); function eval() {}\n\\curl_init(); Ns\\curl_exec(); new Foo();";
        assert_eq!(function_calls(source), vec!["eval", "curl_init"]);
    }

    #[test]
    fn test_qualified_instantiation_and_reference_declaration_are_not_calls() {
        assert!(function_calls("<?php $q = new \\WP_Query( $args );").is_empty());
        assert!(function_calls("<?php function &get_posts() {}").is_empty());
        assert!(function_calls("<?php $o->\\strlen(); function & f() {}").is_empty());
        assert_eq!(
            function_calls("<?php $a = $b & get_posts(); $r = &\\get_post( 1 );"),
            vec!["get_posts", "get_post"]
        );
    }

    #[test]
    fn test_unqualified() {
        let name = ResolvedName {
            qualified_text: "\\App\\Widget".to_string(),
            source_position: 0,
        };
        assert_eq!(name.unqualified(), "App\\Widget");
    }
}
