//! Shared output formatting for lint results.

use anyhow::Result;
use serde::Serialize;
use tokensniff_core::{LintResult, Severity, Violation};

use crate::OutputFormat;

/// Print lint results in the specified format.
pub fn print(result: &LintResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(result),
        OutputFormat::Json => return print_json(result),
        OutputFormat::Compact => print_compact(result),
    }
    Ok(())
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "\x1b[31merror\x1b[0m",
        Severity::Warning => "\x1b[33mwarning\x1b[0m",
        Severity::Info => "\x1b[34minfo\x1b[0m",
    }
}

fn print_text(result: &LintResult) {
    let (errors, warnings, infos) = result.count_by_severity();

    for violation in &result.violations {
        println!(
            "{}.{} at {}:{}:{}",
            violation.rule,
            violation.code,
            violation.location.file.display(),
            violation.location.line,
            violation.location.column,
        );
        println!("  {}: {}", severity_label(violation.severity), violation.message);
        if let Some(suggestion) = &violation.suggestion {
            println!("  = help: {suggestion}");
        }
        if violation.fixable() {
            println!("  = fixable with --fix");
        }
        println!();
    }

    let summary_color = if errors > 0 {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    println!(
        "{}Found {} error(s), {} warning(s), {} info(s) in {} file(s)\x1b[0m",
        summary_color, errors, warnings, infos, result.files_checked
    );
    if result.fixes_applied > 0 {
        println!("Applied {} fix(es)", result.fixes_applied);
    } else if result.fixable_count() > 0 {
        println!(
            "{} violation(s) can be fixed with --fix",
            result.fixable_count()
        );
    }
}

/// JSON document printed by `--format json`.
#[derive(Serialize)]
struct JsonReport<'a> {
    violations: &'a [Violation],
    files_checked: usize,
    fixes_applied: usize,
    summary: Summary,
}

#[derive(Serialize)]
struct Summary {
    errors: usize,
    warnings: usize,
    infos: usize,
    fixable: usize,
}

fn json_report(result: &LintResult) -> JsonReport<'_> {
    let (errors, warnings, infos) = result.count_by_severity();
    JsonReport {
        violations: &result.violations,
        files_checked: result.files_checked,
        fixes_applied: result.fixes_applied,
        summary: Summary {
            errors,
            warnings,
            infos,
            fixable: result.fixable_count(),
        },
    }
}

fn print_json(result: &LintResult) -> Result<()> {
    let json = serde_json::to_string_pretty(&json_report(result))?;
    println!("{json}");
    Ok(())
}

fn print_compact(result: &LintResult) {
    for violation in &result.violations {
        println!("{violation}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tokensniff_core::{Fix, Location};

    #[test]
    fn json_report_carries_summary_and_fixes() {
        let mut result = LintResult::new();
        result.files_checked = 1;
        result.violations.push(
            Violation::new(
                "ItemNotAligned",
                "array-indentation",
                Severity::Error,
                Location::new(PathBuf::from("a.php"), 3, 1),
                "Array item not aligned correctly; expected 4 spaces but found 0",
            )
            .at_position(9)
            .with_fix(Fix::InsertBefore {
                position: 9,
                text: "\t".to_string(),
            }),
        );

        let value = serde_json::to_value(json_report(&result)).expect("serializes");
        assert_eq!(value["summary"]["errors"], 1);
        assert_eq!(value["summary"]["fixable"], 1);
        assert_eq!(value["violations"][0]["rule"], "array-indentation");
        assert_eq!(value["violations"][0]["fix"]["kind"], "insert_before");
        assert_eq!(value["violations"][0]["location"]["line"], 3);
    }
}
