//! Check command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;
use tokensniff_core::{declarative, Analyzer, Config, SniffBox};
use tokensniff_rules::{sniff_by_name, Preset};

use crate::config_resolver::{self, ConfigSource};
use crate::OutputFormat;

/// Options of the check command.
#[derive(Debug, Default)]
pub struct CheckOptions {
    /// Output format.
    pub format: OutputFormat,
    /// Comma-separated sniff names or codes to run instead of the preset.
    pub rules: Option<String>,
    /// Extra exclude patterns.
    pub exclude: Vec<String>,
    /// Write fixes back to disk.
    pub fix: bool,
    /// Abort on files that cannot be tokenized.
    pub fail_on_lex_error: bool,
}

/// Runs the check command.
///
/// Returns `true` if violations at or above the configured `fail_on`
/// severity remain.
pub fn run(path: &Path, options: &CheckOptions, explicit_config: Option<&Path>) -> Result<bool> {
    let source = config_resolver::resolve(config_resolver::project_dir(path), explicit_config);
    let (config, declared) = load_config(&source)?;

    let sniffs = select_sniffs(&config, options.rules.as_deref(), declared)?;

    let analyzer = Analyzer::builder()
        .root(path)
        .config(config)
        .excludes(options.exclude.iter().cloned())
        .sniffs(sniffs)
        .fail_on_lex_error(options.fail_on_lex_error)
        .build()
        .context("Failed to build analyzer")?;

    tracing::info!(
        "Analyzing {} with {} sniffs",
        path.display(),
        analyzer.sniff_count()
    );

    let result = if options.fix {
        analyzer.fix().context("Fixing failed")?
    } else {
        analyzer.analyze().context("Analysis failed")?
    };

    super::output::print(&result, options.format)?;

    Ok(result.has_violations_at(analyzer.config().fail_on_severity()))
}

/// Loads the resolved config and the declarative sniffs it defines.
fn load_config(source: &ConfigSource) -> Result<(Config, Vec<SniffBox>)> {
    let Some(path) = source.path() else {
        return Ok((Config::default(), Vec::new()));
    };
    if source.is_global() {
        tracing::info!("Using global config: {}", path.display());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let config = Config::parse(&content)
        .with_context(|| format!("Failed to load config: {}", path.display()))?;
    let declared = declarative::load_sniffs_from_toml(&content)
        .with_context(|| format!("Invalid restriction groups in {}", path.display()))?;

    if !declared.is_empty() {
        tracing::debug!("Loaded {} declarative sniff(s)", declared.len());
    }
    Ok((config, declared))
}

/// Picks the sniffs to run: the `--rules` filter if given, otherwise the
/// configured preset. Declarative sniffs always run unless a filter leaves
/// them out.
fn select_sniffs(
    config: &Config,
    filter: Option<&str>,
    declared: Vec<SniffBox>,
) -> Result<Vec<SniffBox>> {
    let Some(filter) = filter else {
        let name = config.preset.as_deref().unwrap_or("recommended");
        let Some(preset) = Preset::from_name(name) else {
            bail!("Unknown preset `{name}`, expected: recommended, strict, minimal");
        };
        let mut sniffs = preset.sniffs().context("Failed to build preset sniffs")?;
        sniffs.extend(declared);
        return Ok(sniffs);
    };

    let names: Vec<&str> = filter
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let mut sniffs = Vec::new();
    for name in &names {
        match sniff_by_name(name).context("Failed to build sniff")? {
            Some(sniff) => sniffs.push(sniff),
            None if declared.iter().any(|d| d.name() == *name) => {}
            None => tracing::warn!("Unknown sniff: {}", name),
        }
    }
    sniffs.extend(
        declared
            .into_iter()
            .filter(|d| names.contains(&d.name())),
    );

    Ok(sniffs)
}
