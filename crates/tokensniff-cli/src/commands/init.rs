//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;

const CONFIG_FILE: &str = "tokensniff.toml";

const DEFAULT_CONFIG: &str = r#"# tokensniff configuration

# Sniff preset: recommended, strict or minimal
preset = "recommended"

# Lowest severity that makes `tokensniff check` exit with 1
fail_on = "error"

[analyzer]
# Root directory to analyze (default: current directory)
# root = "./wp-content/plugins/my-plugin"

# Glob patterns to exclude from analysis
exclude = [
    "**/vendor/**",
    "**/node_modules/**",
]

# File extensions to analyze
extensions = ["php", "inc"]

# Respect .gitignore files
respect_gitignore = true

# Columns per tab; leave unset to keep tabs one column wide
# tab_width = 4

# Sniff configurations
# Each sniff can be enabled/disabled and have its severity overridden

[rules.array-indentation]
enabled = true

[rules.deprecated-classes]
minimum_supported_version = "6.0"

# [rules.restricted-functions]
# exclude = ["curl", "cookies"]

# [rules.discouraged-functions]
# error = true

# Project-defined restriction groups
# [[restrict-class]]
# name = "pdo"
# type = "error"
# message = "Avoid direct database access (%s)."
# classes = ["PDO", "\\Vendor\\Db\\*"]

# [[restrict-function]]
# name = "debug"
# type = "warning"
# message = "%s() is debug code."
# functions = ["var_dump", "print_r"]
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    write_config(Path::new(CONFIG_FILE), force)?;

    println!("Created {CONFIG_FILE}");
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_FILE} to configure sniffs");
    println!("  2. Run: tokensniff check");

    Ok(())
}

fn write_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    std::fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokensniff_core::{declarative, Config};

    #[test]
    fn default_config_parses() {
        let config = Config::parse(DEFAULT_CONFIG).expect("template should parse");
        assert_eq!(config.preset.as_deref(), Some("recommended"));
        assert!(config.is_rule_enabled("array-indentation"));
        assert!(declarative::load_sniffs_from_toml(DEFAULT_CONFIG)
            .expect("template should load")
            .is_empty());
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let tmp = TempDir::new().expect("temp dir");
        let path = tmp.path().join(CONFIG_FILE);
        std::fs::write(&path, "# mine\n").expect("write");

        assert!(write_config(&path, false).is_err());
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "# mine\n");

        write_config(&path, true).expect("force overwrites");
        assert_eq!(std::fs::read_to_string(&path).expect("read"), DEFAULT_CONFIG);
    }
}
