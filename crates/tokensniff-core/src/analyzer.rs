//! Core analyzer: runs sniffs over token streams and applies fixes.

use crate::config::{Config, RuleConfig};
use crate::context::SniffContext;
use crate::fixer::FixSet;
use crate::lexer::{LexError, PhpLexer, Tokenizer};
use crate::rule::{Sniff, SniffBox};
use crate::token::TokenStream;
use crate::types::{LintResult, Violation};
use crate::utils::allowance::Allowances;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Upper bound on re-tokenize/re-check rounds in fix mode.
pub const MAX_FIX_PASSES: usize = 50;

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// IO error reading or writing files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A source file could not be tokenized.
    #[error("Tokenize error in {path}: {source}")]
    Lex {
        /// Path to the file that failed to tokenize.
        path: PathBuf,
        /// Tokenizer error.
        source: LexError,
    },

    /// Glob pattern error.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Directory walk error.
    #[error("File discovery failed: {0}")]
    Walk(#[from] ignore::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    root: Option<PathBuf>,
    sniffs: Vec<SniffBox>,
    exclude_patterns: Vec<String>,
    config: Option<Config>,
    tokenizer: Option<Box<dyn Tokenizer>>,
    fail_on_lex_error: bool,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the directory (or single file) to analyze.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Adds a sniff.
    #[must_use]
    pub fn sniff<S: Sniff + 'static>(mut self, sniff: S) -> Self {
        self.sniffs.push(Box::new(sniff));
        self
    }

    /// Adds several boxed sniffs.
    #[must_use]
    pub fn sniffs(mut self, sniffs: impl IntoIterator<Item = SniffBox>) -> Self {
        self.sniffs.extend(sniffs);
        self
    }

    /// Adds an exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds multiple exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Replaces the built-in tokenizer.
    #[must_use]
    pub fn tokenizer<T: Tokenizer + 'static>(mut self, tokenizer: T) -> Self {
        self.tokenizer = Some(Box::new(tokenizer));
        self
    }

    /// Sets whether a file that fails to tokenize aborts the run
    /// (default: false, the file is skipped with a warning).
    #[must_use]
    pub fn fail_on_lex_error(mut self, fail: bool) -> Self {
        self.fail_on_lex_error = fail;
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be determined or an
    /// exclude pattern is not a valid glob.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let config = self.config.unwrap_or_default();

        let root = self
            .root
            .unwrap_or_else(|| config.analyzer.root.clone());
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };

        let mut exclude_patterns = self.exclude_patterns;
        exclude_patterns.extend(config.analyzer.exclude.iter().cloned());
        for pattern in &exclude_patterns {
            glob::Pattern::new(pattern)?;
        }

        let tokenizer = self.tokenizer.unwrap_or_else(|| {
            Box::new(PhpLexer::new().with_tab_width(config.analyzer.tab_width.unwrap_or(0)))
        });

        let excluded_groups = self
            .sniffs
            .iter()
            .map(|s| {
                config
                    .rules
                    .get(s.name())
                    .map(RuleConfig::excluded_groups)
                    .unwrap_or_default()
            })
            .collect();

        for sniff in &self.sniffs {
            if !config.is_rule_enabled(sniff.name()) {
                debug!("Sniff disabled by configuration: {}", sniff.name());
            }
        }

        Ok(Analyzer {
            root,
            sniffs: self.sniffs,
            excluded_groups,
            exclude_patterns,
            tab_width: config.analyzer.effective_tab_width(),
            config,
            tokenizer,
            fail_on_lex_error: self.fail_on_lex_error,
        })
    }
}

/// Result of fixing one source text.
#[derive(Debug, Clone)]
pub struct FixOutcome {
    /// Source after all passes.
    pub source: String,
    /// Number of passes that applied at least one fix.
    pub passes: usize,
    /// Total number of fixes applied.
    pub fixes_applied: usize,
    /// Violations left in the fixed source.
    pub remaining: Vec<Violation>,
}

impl FixOutcome {
    /// Returns true if the source was modified.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.fixes_applied > 0
    }
}

/// The main analyzer that runs sniffs over files.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    root: PathBuf,
    sniffs: Vec<SniffBox>,
    excluded_groups: Vec<HashSet<String>>,
    exclude_patterns: Vec<String>,
    tab_width: usize,
    config: Config,
    tokenizer: Box<dyn Tokenizer>,
    fail_on_lex_error: bool,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the root being analyzed.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the number of registered sniffs.
    #[must_use]
    pub fn sniff_count(&self) -> usize {
        self.sniffs.len()
    }

    /// Returns the configuration in effect.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Gets the configuration for a specific sniff.
    #[must_use]
    pub fn rule_config(&self, rule_name: &str) -> Option<&RuleConfig> {
        self.config.rules.get(rule_name)
    }

    /// Runs every enabled sniff over one token stream.
    ///
    /// Each token is offered to the sniffs registered for its kind, in
    /// registration order. A sniff returning a resume position is not
    /// called again for tokens before that position. Violations on lines
    /// covered by a suppression directive are dropped, configured severity
    /// overrides are applied, and the result is ordered by position.
    #[must_use]
    pub fn check_stream(&self, path: &Path, stream: &TokenStream) -> Vec<Violation> {
        let enabled: Vec<bool> = self
            .sniffs
            .iter()
            .map(|s| self.config.is_rule_enabled(s.name()))
            .collect();
        let mut resume = vec![0usize; self.sniffs.len()];
        let mut ctx = SniffContext::new(path, self.base_dir(), stream, self.tab_width);

        for (position, token) in stream.tokens().iter().enumerate() {
            for (i, sniff) in self.sniffs.iter().enumerate() {
                if !enabled[i] || position < resume[i] || !sniff.register().contains(&token.kind) {
                    continue;
                }

                ctx.enter(
                    sniff.name(),
                    self.config.rules.get(sniff.name()),
                    Some(&self.excluded_groups[i]),
                );
                if let Some(next) = sniff.process(&mut ctx, position) {
                    if next > position {
                        resume[i] = next;
                    }
                }
            }
        }

        let allowances = Allowances::from_stream(stream);
        let mut violations: Vec<Violation> = ctx
            .into_violations()
            .into_iter()
            .filter(|v| !allowances.is_allowed(&v.rule, &v.code, v.location.line))
            .collect();

        for v in &mut violations {
            if let Some(severity) = self.config.rule_severity(&v.rule) {
                v.severity = severity;
            }
        }

        violations.sort_by_key(|v| v.position);
        violations
    }

    /// Tokenizes and checks one source text.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be tokenized.
    pub fn check_source(&self, path: &Path, source: &str) -> Result<Vec<Violation>, AnalyzerError> {
        let stream = self.tokenize(path, source)?;
        Ok(self.check_stream(path, &stream))
    }

    /// Applies fixes to one source text until no fix applies.
    ///
    /// Every round tokenizes the current text, runs the sniffs and applies
    /// the first fix per token; conflicting fixes wait for the next round.
    /// Stops after [`MAX_FIX_PASSES`] rounds.
    ///
    /// # Errors
    ///
    /// Returns an error if the source (or an intermediate fixed version)
    /// cannot be tokenized.
    pub fn fix_source(&self, path: &Path, source: &str) -> Result<FixOutcome, AnalyzerError> {
        let mut current = source.to_string();
        let mut fixes_applied = 0;

        for pass in 0..MAX_FIX_PASSES {
            let stream = self.tokenize(path, &current)?;
            let violations = self.check_stream(path, &stream);

            let mut fixes = FixSet::new();
            for fix in violations.iter().filter_map(|v| v.fix.clone()) {
                fixes.add(fix);
            }
            if fixes.is_empty() {
                return Ok(FixOutcome {
                    source: current,
                    passes: pass,
                    fixes_applied,
                    remaining: violations,
                });
            }

            debug!(
                "Fix pass {} on {}: applying {} fix(es)",
                pass + 1,
                path.display(),
                fixes.len()
            );
            fixes_applied += fixes.len();
            current = fixes.apply(&stream);
        }

        warn!(
            "Fixes for {} did not settle after {} passes",
            path.display(),
            MAX_FIX_PASSES
        );
        let remaining = self.check_source(path, &current)?;
        Ok(FixOutcome {
            source: current,
            passes: MAX_FIX_PASSES,
            fixes_applied,
            remaining,
        })
    }

    /// Analyzes all files and returns the results.
    ///
    /// # Errors
    ///
    /// Returns an error if file discovery or reading fails, or a file fails
    /// to tokenize while `fail_on_lex_error` is set.
    pub fn analyze(&self) -> Result<LintResult, AnalyzerError> {
        self.run(false)
    }

    /// Analyzes all files, writing fixed sources back to disk.
    ///
    /// The returned violations are those left after fixing.
    ///
    /// # Errors
    ///
    /// See [`Analyzer::analyze`]; writing a file may also fail.
    pub fn fix(&self) -> Result<LintResult, AnalyzerError> {
        self.run(true)
    }

    fn run(&self, write_fixes: bool) -> Result<LintResult, AnalyzerError> {
        info!("Starting analysis at {:?}", self.root);

        let mut result = LintResult::new();
        let files = self.discover_files()?;

        info!(
            "Found {} files to analyze with {} sniffs",
            files.len(),
            self.sniffs.len()
        );

        for file_path in &files {
            debug!("Analyzing: {}", file_path.display());
            let content = std::fs::read_to_string(file_path)?;

            let outcome = if write_fixes {
                self.fix_source(file_path, &content).map(|outcome| {
                    if outcome.changed() {
                        Some(outcome)
                    } else {
                        result.violations.extend(outcome.remaining);
                        None
                    }
                })
            } else {
                self.check_source(file_path, &content).map(|violations| {
                    result.violations.extend(violations);
                    None
                })
            };

            match outcome {
                Ok(Some(fixed)) => {
                    std::fs::write(file_path, &fixed.source)?;
                    info!(
                        "Fixed {} issue(s) in {}",
                        fixed.fixes_applied,
                        file_path.display()
                    );
                    result.fixes_applied += fixed.fixes_applied;
                    result.violations.extend(fixed.remaining);
                    result.files_checked += 1;
                }
                Ok(None) => result.files_checked += 1,
                Err(AnalyzerError::Lex { path, source }) => {
                    warn!("Failed to tokenize {}: {}", path.display(), source);
                    if self.fail_on_lex_error {
                        return Err(AnalyzerError::Lex { path, source });
                    }
                }
                Err(e) => return Err(e),
            }
        }

        result.violations.sort_by(|a, b| {
            a.location
                .file
                .cmp(&b.location.file)
                .then(a.location.line.cmp(&b.location.line))
                .then(a.location.column.cmp(&b.location.column))
        });

        info!(
            "Analysis complete: {} violations in {} files",
            result.violations.len(),
            result.files_checked
        );

        Ok(result)
    }

    fn tokenize(&self, path: &Path, source: &str) -> Result<TokenStream, AnalyzerError> {
        self.tokenizer
            .tokenize(source)
            .map_err(|source| AnalyzerError::Lex {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Directory reported paths are made relative to.
    fn base_dir(&self) -> &Path {
        if self.root.is_file() {
            self.root.parent().unwrap_or(&self.root)
        } else {
            &self.root
        }
    }

    /// Discovers all source files to analyze.
    fn discover_files(&self) -> Result<Vec<PathBuf>, AnalyzerError> {
        if self.root.is_file() {
            return Ok(vec![self.root.clone()]);
        }

        let mut builder = ignore::WalkBuilder::new(&self.root);
        builder
            .hidden(false)
            .git_ignore(self.config.analyzer.respect_gitignore);

        let mut files = Vec::new();
        for entry in builder.build() {
            let entry = entry?;
            let path = entry.path();

            if !path.is_file() || !self.has_source_extension(path) {
                continue;
            }
            if self.should_exclude(path) {
                debug!("Excluding: {}", path.display());
                continue;
            }

            files.push(path.to_path_buf());
        }

        files.sort();
        Ok(files)
    }

    fn has_source_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                self.config
                    .analyzer
                    .extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(ext))
            })
    }

    /// Checks if a path should be excluded.
    fn should_exclude(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        for pattern in &self.exclude_patterns {
            if let Ok(glob_pattern) = glob::Pattern::new(pattern) {
                if glob_pattern.matches(&path_str) {
                    return true;
                }
            }

            // Also check as substring for patterns like "**/vendor/**"
            let normalized_pattern = pattern.replace("**", "");
            if !normalized_pattern.is_empty() && path_str.contains(&normalized_pattern) {
                return true;
            }
        }

        false
    }
}
