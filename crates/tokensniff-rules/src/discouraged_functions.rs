//! Sniff discouraging debug, deprecated and superseded functions.
//!
//! Every function is its own group, named after the function, so a single
//! entry can be dropped with `exclude = ["json_encode"]`. Violations are
//! warnings unless `error = true` is set for the sniff, which also turns
//! "discouraged" into "forbidden" in the message. Hits on a function with
//! an alternative are reported as `FoundWithAlternative`, others as `Found`.

use tokensniff_core::{
    FunctionCalls, GroupError, GroupSpec, MatchHandler, ResolvedName, RestrictionGroup,
    RestrictionGroups, RestrictionSniff, Severity, SniffContext,
};

/// Sniff code for discouraged-functions.
pub const CODE: &str = "TS003";

/// Sniff name for discouraged-functions.
pub const NAME: &str = "discouraged-functions";

/// The discouraged-functions sniff.
pub type DiscouragedFunctions = RestrictionSniff<FunctionCalls, ReportFound>;

/// `(function, alternative)`
const DISCOURAGED: &[(&str, Option<&str>)] = &[
    // Deprecated PHP.
    ("ereg_replace", Some("preg_replace")),
    ("ereg", None),
    ("eregi_replace", Some("preg_replace")),
    ("split", None),
    ("spliti", None),
    // Development.
    ("print_r", None),
    ("debug_print_backtrace", None),
    ("var_dump", None),
    ("var_export", None),
    ("json_encode", Some("wp_json_encode")),
    // Deprecated WordPress.
    ("find_base_dir", Some("WP_Filesystem::abspath")),
    ("get_base_dir", Some("WP_Filesystem::abspath")),
    ("dropdown_categories", Some("wp_link_category_checklist")),
    ("dropdown_link_categories", Some("wp_link_category_checklist")),
    ("get_link", Some("get_bookmark")),
    ("get_catname", Some("get_cat_name")),
    ("register_globals", None),
    ("wp_setcookie", Some("wp_set_auth_cookie")),
    ("wp_get_cookie_login", None),
    ("wp_login", Some("wp_signon")),
    ("get_the_attachment_link", Some("wp_get_attachment_link")),
    ("get_attachment_icon_src", Some("wp_get_attachment_image_src")),
    ("get_attachment_icon", Some("wp_get_attachment_image")),
    ("get_attachment_innerHTML", Some("wp_get_attachment_image")),
    // Discouraged WordPress.
    ("query_posts", Some("WP_Query")),
    ("wp_reset_query", Some("wp_reset_postdata")),
];

fn alternative_for(function: &str) -> Option<&'static str> {
    DISCOURAGED
        .iter()
        .find(|(f, _)| *f == function)
        .and_then(|(_, alternative)| *alternative)
}

/// Returns one group per discouraged function.
#[must_use]
pub fn discouraged_groups() -> Vec<GroupSpec> {
    DISCOURAGED
        .iter()
        .map(|(function, _)| GroupSpec::new(*function, Severity::Warning, [*function]))
        .collect()
}

/// Reports a hit, naming the alternative when there is one.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportFound;

impl MatchHandler for ReportFound {
    fn handle(
        &self,
        ctx: &mut SniffContext<'_>,
        name: &ResolvedName,
        group: &RestrictionGroup,
    ) -> Option<usize> {
        let error = ctx.rule_config().is_some_and(|c| c.get_bool("error", false));
        let (severity, verdict) = if error {
            (Severity::Error, "forbidden")
        } else {
            (group.severity(), "discouraged")
        };

        let called = &name.qualified_text;
        let violation = match alternative_for(group.name()) {
            Some(alt) => ctx
                .violation(
                    "FoundWithAlternative",
                    severity,
                    name.source_position,
                    format!("The use of function {called}() is {verdict}; use {alt}() instead"),
                )
                .with_suggestion(format!("Replace {called}() with {alt}()")),
            None => ctx.violation(
                "Found",
                severity,
                name.source_position,
                format!("The use of function {called}() is {verdict}"),
            ),
        };
        ctx.report(violation);
        None
    }
}

/// Creates the discouraged-functions sniff.
///
/// # Errors
///
/// Returns an error if a group of the table fails to compile.
pub fn discouraged_functions() -> Result<DiscouragedFunctions, GroupError> {
    let groups = RestrictionGroups::compile(discouraged_groups())?;
    Ok(RestrictionSniff::new(NAME, CODE, FunctionCalls, groups)
        .with_handler(ReportFound)
        .with_description("Discourages debug and deprecated functions, suggesting alternatives")
        .with_default_severity(Severity::Warning))
}
