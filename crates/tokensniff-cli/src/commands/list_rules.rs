//! List rules command implementation.

use anyhow::{Context, Result};
use tokensniff_core::declarative::{RESTRICT_CLASS, RESTRICT_FUNCTION};
use tokensniff_rules::all_sniffs;

/// Runs the list-rules command.
pub fn run() -> Result<()> {
    println!("Available sniffs:\n");
    println!("{:<8} {:<24} {:<8} Description", "Code", "Name", "Default");
    println!("{}", "-".repeat(88));

    for sniff in all_sniffs().context("Failed to build sniffs")? {
        println!(
            "{:<8} {:<24} {:<8} {}",
            sniff.code(),
            sniff.name(),
            sniff.default_severity().to_string(),
            sniff.description()
        );
    }

    println!("\nDeclarative sniffs (from [[{RESTRICT_CLASS}]] / [[{RESTRICT_FUNCTION}]] in the config):");
    println!("  TS100    {RESTRICT_CLASS:<24} Project-defined class restrictions");
    println!("  TS101    {RESTRICT_FUNCTION:<24} Project-defined function restrictions");

    println!("\nPresets:");
    println!("  recommended  - TS001, TS003, TS004 (default)");
    println!("  strict       - All built-in sniffs, including VIP restrictions");
    println!("  minimal      - TS004 only (for gradual adoption)");

    println!("\nUse --rules to filter specific sniffs, e.g.:");
    println!("  tokensniff check --rules array-indentation,deprecated-classes");
    println!("  tokensniff check --rules TS001,TS004 --fix");

    Ok(())
}
