//! Sniff restricting functions that misbehave on WordPress VIP hosting.
//!
//! The table below is plain data fed into a [`RestrictionSniff`]; every
//! group is reported under its own name, so projects can switch single
//! groups off with `exclude = ["curl", "cookies"]` in
//! `[rules.restricted-functions]`.

use tokensniff_core::Severity::{self, Error, Warning};
use tokensniff_core::{FunctionCalls, GroupError, GroupSpec, RestrictionGroups, RestrictionSniff};

/// Sniff code for restricted-functions.
pub const CODE: &str = "TS002";

/// Sniff name for restricted-functions.
pub const NAME: &str = "restricted-functions";

/// The restricted-functions sniff.
pub type RestrictedFunctions = RestrictionSniff<FunctionCalls>;

/// `(group, severity, message, functions)`
const VIP_GROUPS: &[(&str, Severity, &str, &[&str])] = &[
    (
        "switch_to_blog",
        Error,
        "%s is not something you should ever need to do in a VIP theme context. Instead use an API (XML-RPC, REST) to interact with other sites if needed.",
        &["switch_to_blog"],
    ),
    (
        "create_function",
        Warning,
        "%s is discouraged, please use Anonymous functions instead.",
        &["create_function"],
    ),
    (
        "eval",
        Error,
        "%s is prohibited, please use Anonymous functions instead.",
        &["eval"],
    ),
    (
        "file_get_contents",
        Warning,
        "%s is highly discouraged, please use wpcom_vip_file_get_contents() instead.",
        &["file_get_contents", "vip_wp_file_get_contents"],
    ),
    (
        "get_term_link",
        Error,
        "%s is prohibited, please use wpcom_vip_get_term_link() instead.",
        &["get_term_link", "get_tag_link", "get_category_link"],
    ),
    (
        "get_page_by_path",
        Error,
        "%s is prohibited, please use wpcom_vip_get_page_by_path() instead.",
        &["get_page_by_path"],
    ),
    (
        "get_page_by_title",
        Error,
        "%s is prohibited, please use wpcom_vip_get_page_by_title() instead.",
        &["get_page_by_title"],
    ),
    (
        "get_term_by",
        Error,
        "%s is prohibited, please use wpcom_vip_get_term_by() instead.",
        &["get_term_by", "get_cat_ID"],
    ),
    (
        "get_category_by_slug",
        Error,
        "%s is prohibited, please use wpcom_vip_get_category_by_slug() instead.",
        &["get_category_by_slug"],
    ),
    (
        "url_to_postid",
        Error,
        "%s is prohibited, please use wpcom_vip_url_to_postid() instead.",
        &["url_to_postid", "url_to_post_id"],
    ),
    (
        "attachment_url_to_postid",
        Error,
        "%s is prohibited, please use wpcom_vip_attachment_url_to_postid() instead.",
        &["attachment_url_to_postid"],
    ),
    (
        "wp_remote_get",
        Warning,
        "%s is highly discouraged, please use vip_safe_wp_remote_get() instead.",
        &["wp_remote_get"],
    ),
    (
        "curl",
        Warning,
        "Using cURL functions is highly discouraged within VIP context. Check (Fetching Remote Data) on VIP Documentation.",
        &["curl_*"],
    ),
    (
        "extract",
        Warning,
        "%s() usage is highly discouraged, due to the complexity and unintended issues it might cause.",
        &["extract"],
    ),
    (
        "custom_role",
        Error,
        "Use wpcom_vip_add_role() instead of add_role()",
        &["add_role"],
    ),
    (
        "cookies",
        Warning,
        "Due to using Batcache, server side based client related logic will not work, use JS instead.",
        &["setcookie"],
    ),
    (
        "user_meta",
        Error,
        "%s() usage is highly discouraged, check VIP documentation on \"Working with wp_users\"",
        &["get_user_meta", "update_user_meta", "delete_user_meta", "add_user_meta"],
    ),
    (
        "get_posts",
        Warning,
        "%s is discouraged in favor of creating a new WP_Query() so that Advanced Post Cache will cache the query, unless you explicitly supply suppress_filters => false.",
        &["get_posts", "wp_get_recent_posts"],
    ),
    (
        "get_pages",
        Error,
        "%s is highly discouraged in favor of creating a new WP_Query() so that Advanced Post Cache will cache the query.",
        &["get_children", "get_pages"],
    ),
    (
        "wp_get_post_terms",
        Error,
        "%s is highly discouraged due to not being cached; please use get_the_terms() along with wp_list_pluck() to extract the IDs.",
        &[
            "wp_get_post_terms",
            "wp_get_post_categories",
            "wp_get_post_tags",
            "wp_get_object_terms",
        ],
    ),
    (
        "term_exists",
        Error,
        "%s is highly discouraged due to not being cached; please use wpcom_vip_term_exists() instead.",
        &["term_exists"],
    ),
    (
        "count_user_posts",
        Error,
        "%s is highly discouraged due to not being cached; please use wpcom_vip_count_user_posts() instead.",
        &["count_user_posts"],
    ),
    (
        "wp_old_slug_redirect",
        Error,
        "%s is highly discouraged due to not being cached; please use wpcom_vip_old_slug_redirect() instead.",
        &["wp_old_slug_redirect"],
    ),
    (
        "get_adjacent_post",
        Error,
        "%s is highly discouraged due to not being cached; please use wpcom_vip_get_adjacent_post() instead.",
        &[
            "get_adjacent_post",
            "get_previous_post",
            "get_previous_post_link",
            "get_next_post",
            "get_next_post_link",
        ],
    ),
    (
        "parse_url",
        Warning,
        "%s is discouraged due to a lack for backwards-compatibility in PHP versions; please use wp_parse_url() instead.",
        &["parse_url"],
    ),
    (
        "get_intermediate_image_sizes",
        Error,
        "Intermediate images do not exist on the VIP platform, and thus get_intermediate_image_sizes() returns an empty array() on the platform. This behavior is intentional to prevent WordPress from generating multiple thumbnails when images are uploaded.",
        &["get_intermediate_image_sizes"],
    ),
    (
        "serialize",
        Warning,
        "%s Serialized data has known vulnerability problems with Object Injection. JSON is generally a better approach for serializing data.",
        &["serialize", "unserialize"],
    ),
    (
        "error_log",
        Error,
        "%s Debug code is not allowed on VIP Production",
        &["error_log", "var_dump", "print_r", "trigger_error", "set_error_handler"],
    ),
    (
        "wp_redirect",
        Warning,
        "%s Using wp_safe_redirect(), along with the allowed_redirect_hosts filter, can help avoid any chances of malicious redirects within code. It's also important to remember to call exit() after a redirect so that no other unwanted code is executed.",
        &["wp_redirect"],
    ),
    (
        "wp_is_mobile",
        Error,
        "%s When targeting mobile visitors, jetpack_is_mobile() should be used instead of wp_is_mobile. It is more robust and works better with full page caching.",
        &["wp_is_mobile"],
    ),
    (
        "urlencode",
        Warning,
        "%s urlencode should only be used when dealing with legacy applications rawurlencode should now de used instead. See http://php.net/manual/en/function.rawurlencode.php and http://www.faqs.org/rfcs/rfc3986.html",
        &["urlencode"],
    ),
    (
        "ereg",
        Error,
        "%s is prohibited, please use preg_match() instead. See http://php.net/manual/en/function.ereg.php",
        &["ereg"],
    ),
    (
        "eregi",
        Error,
        "%s is prohibited, please use preg_match() with i modifier instead. See http://php.net/manual/en/function.eregi.php",
        &["eregi"],
    ),
    (
        "ereg_replace",
        Error,
        "%s is prohibited, please use preg_replace() instead. See http://php.net/manual/en/function.ereg-replace.php",
        &["ereg_replace"],
    ),
    (
        "split",
        Error,
        "%s is prohibited, please use explode() or preg_split() instead. See http://php.net/manual/en/function.split.php",
        &["split"],
    ),
];

/// Returns the VIP restriction groups as plain specs.
#[must_use]
pub fn vip_groups() -> Vec<GroupSpec> {
    VIP_GROUPS
        .iter()
        .map(|(name, severity, message, functions)| {
            GroupSpec::new(*name, *severity, functions.iter().copied()).message(*message)
        })
        .collect()
}

/// Creates the restricted-functions sniff.
///
/// # Errors
///
/// Returns an error if a group of the table fails to compile.
pub fn restricted_functions() -> Result<RestrictedFunctions, GroupError> {
    let groups = RestrictionGroups::compile(vip_groups())?;
    Ok(RestrictionSniff::new(NAME, CODE, FunctionCalls, groups)
        .with_description("Restricts functions that are unsafe or uncached on VIP hosting"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tokensniff_core::{Analyzer, Config, Violation};

    fn check_with(config: Config, source: &str) -> Vec<Violation> {
        Analyzer::builder()
            .config(config)
            .sniff(restricted_functions().expect("table should compile"))
            .build()
            .expect("analyzer should build")
            .check_source(Path::new("theme.php"), source)
            .expect("source should tokenize")
    }

    fn check(source: &str) -> Vec<Violation> {
        check_with(Config::default(), source)
    }

    #[test]
    fn test_table_compiles() {
        let sniff = restricted_functions().expect("table should compile");
        assert_eq!(sniff.groups().len(), VIP_GROUPS.len());
    }

    #[test]
    fn test_restricted_call_reports_group() {
        let violations = check("<?php\nswitch_to_blog( 2 );\n");

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, "switch_to_blog");
        assert_eq!(violations[0].rule, NAME);
        assert_eq!(violations[0].severity, Severity::Error);
        assert!(violations[0]
            .message
            .starts_with("switch_to_blog is not something you should ever need to do"));
    }

    #[test]
    fn test_wildcard_group_and_case_insensitivity() {
        let violations = check("<?php\n$ch = CURL_INIT();\ncurl_setopt( $ch, 1, 2 );\n");

        assert_eq!(violations.len(), 2);
        assert!(violations.iter().all(|v| v.code == "curl"));
        assert!(violations.iter().all(|v| v.severity == Severity::Warning));
    }

    #[test]
    fn test_method_calls_and_definitions_are_not_calls() {
        let source = "<?php\n$o->eval( 'x' );\nFoo::extract();\nfunction get_posts() {}\n";
        assert!(check(source).is_empty());
    }

    #[test]
    fn test_function_in_multiple_groups() {
        let violations = check("<?php\nprint_r( $x );\n");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, "error_log");
        assert_eq!(
            violations[0].message,
            "print_r Debug code is not allowed on VIP Production"
        );
    }

    #[test]
    fn test_excluded_groups_from_config() {
        let config = Config::parse(
            "[rules.restricted-functions]\nexclude = [\"curl\", \"cookies\"]\n",
        )
        .expect("valid config");
        let violations = check_with(config, "<?php\ncurl_init();\nsetcookie( 'a' );\neval( $x );\n");

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, "eval");
    }
}
