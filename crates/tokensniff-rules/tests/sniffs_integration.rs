//! Integration test: built-in sniffs over a fixture plugin, check and fix.

use std::path::{Path, PathBuf};
use tokensniff_core::{Analyzer, LintResult, Severity};
use tokensniff_rules::{all_sniffs, recommended_sniffs};

fn fixture_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/plugin")
}

fn analyze(root: &Path) -> LintResult {
    Analyzer::builder()
        .root(root)
        .sniffs(all_sniffs().expect("built-in tables compile"))
        .build()
        .expect("analyzer should build")
        .analyze()
        .expect("analysis should succeed")
}

fn lines(result: &LintResult) -> String {
    result
        .violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn reports_every_sniff() {
    let result = analyze(&fixture_root());

    assert_eq!(result.files_checked, 2);
    insta::assert_snapshot!(lines(&result), @r"
    plugin.php:3:3: error [array-indentation.ItemNotAligned] Array item not aligned correctly; expected 4 spaces but found 2
    plugin.php:5:5: error [array-indentation.CloseBraceNotAligned] Array closer not aligned correctly; expected 0 space(s) but found 4
    plugin.php:6:10: warning [discouraged-functions.FoundWithAlternative] The use of function query_posts() is discouraged; use WP_Query() instead
    plugin.php:7:11: error [deprecated-classes.wp_user_searchFound] The WP_User_Search class has been deprecated since WordPress version 3.1.0. Use WP_User_Query instead.
    plugin.php:9:1: error [restricted-functions.error_log] var_dump Debug code is not allowed on VIP Production
    ");
}

#[test]
fn counts_and_fixability() {
    let result = analyze(&fixture_root());

    assert_eq!(result.count_by_severity(), (4, 1, 0));
    assert_eq!(result.fixable_count(), 2);
    assert!(result.has_errors());
}

#[test]
fn fix_rewrites_arrays_and_keeps_other_findings() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    for name in ["plugin.php", "clean.php"] {
        std::fs::copy(fixture_root().join(name), tmp.path().join(name)).expect("copy fixture");
    }

    let analyzer = Analyzer::builder()
        .root(tmp.path())
        .sniffs(recommended_sniffs().expect("built-in tables compile"))
        .build()
        .expect("analyzer should build");

    let fixed = analyzer.fix().expect("fix should succeed");
    assert_eq!(fixed.fixes_applied, 2);
    assert_eq!(fixed.violations.len(), 2, "{}", lines(&fixed));
    assert!(fixed.violations.iter().all(|v| !v.fixable()));

    let source = std::fs::read_to_string(tmp.path().join("plugin.php")).expect("read back");
    assert!(source.starts_with(
        "<?php\n$args = array(\n\t'post_type' => 'page',\n\t'orderby'   => 'title',\n);\n"
    ));

    let clean = std::fs::read_to_string(tmp.path().join("clean.php")).expect("read back");
    assert_eq!(clean, "<?php\n$clean = array(\n\t1,\n\t2,\n);\n");

    // A second run has nothing left to fix.
    let again = analyzer.fix().expect("fix should succeed");
    assert_eq!(again.fixes_applied, 0);
    assert_eq!(lines(&again), lines(&fixed));
}

#[test]
fn severity_override_from_config() {
    let config = tokensniff_core::Config::parse(
        "[rules.restricted-functions]\nseverity = \"info\"\n\n[rules.array-indentation]\nenabled = false\n",
    )
    .expect("valid config");

    let result = Analyzer::builder()
        .root(fixture_root())
        .config(config)
        .sniffs(all_sniffs().expect("built-in tables compile"))
        .build()
        .expect("analyzer should build")
        .analyze()
        .expect("analysis should succeed");

    assert_eq!(result.violations.len(), 3);
    assert_eq!(result.by_severity(Severity::Info).len(), 1);
    assert_eq!(result.by_severity(Severity::Info)[0].rule, "restricted-functions");
}
