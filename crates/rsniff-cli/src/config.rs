//! Configuration file support for rsniff
//!
//! Loads `.rsniff.toml` from the current directory or parent directories.

use anyhow::{Context, Result};
use rsniff_core::{ParamMap, ParamValue, SeverityConfig, SeverityOverride};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Configuration file structure
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sniffs: SniffsConfig,
    pub severity: SeveritySection,
    /// Raw `[params.<sniff code>]` tables. Converted with
    /// [`sniff_params`](Config::sniff_params).
    pub params: HashMap<String, toml::Value>,
    pub paths: PathsConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SniffsConfig {
    /// If set, only these sniffs will run
    pub enabled: Option<Vec<String>>,
    /// Sniffs to exclude (applied after enabled)
    pub disabled: Vec<String>,
}

/// The `[severity]` section. Any key other than `warnings_as_errors` is
/// a diagnostic code or code prefix mapped to "error", "warning" or
/// "off".
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SeveritySection {
    pub warnings_as_errors: bool,
    #[serde(flatten)]
    pub overrides: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Glob patterns to exclude from processing
    pub exclude: Vec<String>,
    /// File extensions picked up by directory walks
    pub extensions: Vec<String>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            extensions: vec!["php".to_string()],
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "text", "json" or "diff"
    pub format: Option<String>,
}

impl Config {
    /// Load config from `.rsniff.toml` searching from current directory upward
    pub fn load() -> Result<Option<(Config, PathBuf)>> {
        Self::load_from(std::env::current_dir()?)
    }

    /// Load config searching from the given directory upward
    pub fn load_from(start_dir: PathBuf) -> Result<Option<(Config, PathBuf)>> {
        let mut current = Some(start_dir.as_path());

        while let Some(dir) = current {
            let config_path = dir.join(".rsniff.toml");
            if config_path.exists() {
                let config = Self::load_path(&config_path)?;
                return Ok(Some((config, config_path)));
            }
            current = dir.parent();
        }

        Ok(None)
    }

    /// Load config from a specific path
    pub fn load_path(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Compute the effective set of enabled sniff codes
    pub fn effective_sniffs(&self, all_codes: &[&str], cli_sniffs: &[String]) -> HashSet<String> {
        // CLI selections override config completely
        if !cli_sniffs.is_empty() {
            return cli_sniffs.iter().cloned().collect();
        }

        let mut codes: HashSet<String> = match &self.sniffs.enabled {
            Some(enabled) => enabled.iter().cloned().collect(),
            None => all_codes.iter().map(|s| s.to_string()).collect(),
        };

        for disabled in &self.sniffs.disabled {
            codes.remove(disabled);
        }

        codes
    }

    /// Severity policy for the diagnostics collector. Override values
    /// that are not "error", "warning" or "off" are dropped.
    pub fn severity_config(&self) -> SeverityConfig {
        let overrides = self
            .severity
            .overrides
            .iter()
            .filter_map(|(code, value)| SeverityOverride::parse(value).map(|o| (code.clone(), o)))
            .collect();
        SeverityConfig {
            warnings_as_errors: self.severity.warnings_as_errors,
            overrides,
        }
    }

    /// Per-sniff parameter maps keyed by sniff code.
    ///
    /// `[params.Rsniff.Files.LineLength]` parses as nested tables, so
    /// grouping levels are joined back into the dotted code. A table
    /// holding any non-table value is one sniff's parameter set.
    pub fn sniff_params(&self) -> HashMap<String, ParamMap> {
        let mut collected = HashMap::new();
        for (key, value) in &self.params {
            if let toml::Value::Table(table) = value {
                collect_params(key.clone(), table, &mut collected);
            }
        }
        collected
    }

    /// Check if a path should be excluded based on config patterns
    pub fn should_exclude(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        for pattern in &self.paths.exclude {
            if let Ok(glob_pattern) = glob::Pattern::new(pattern) {
                if glob_pattern.matches(&path_str) {
                    return true;
                }
                // Also try matching against just the file/dir name
                if let Some(file_name) = path.file_name() {
                    if glob_pattern.matches(&file_name.to_string_lossy()) {
                        return true;
                    }
                }
            }

            // Also do simple prefix/contains matching for directory patterns
            if pattern.ends_with('/') {
                let dir_pattern = pattern.trim_end_matches('/');
                if path_str.contains(&format!("/{}/", dir_pattern))
                    || path_str.starts_with(&format!("{}/", dir_pattern))
                {
                    return true;
                }
            }
        }

        false
    }

    /// Check if a file's extension is in the configured pick-up list
    pub fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.paths.extensions.iter().any(|want| want == ext))
    }
}

fn collect_params(prefix: String, table: &toml::Table, out: &mut HashMap<String, ParamMap>) {
    let grouping_only =
        !table.is_empty() && table.values().all(|v| matches!(v, toml::Value::Table(_)));
    if grouping_only {
        for (key, value) in table {
            if let toml::Value::Table(inner) = value {
                collect_params(format!("{}.{}", prefix, key), inner, out);
            }
        }
        return;
    }

    let mut params = ParamMap::new();
    for (key, value) in table {
        let converted = match value {
            toml::Value::Boolean(b) => Some(ParamValue::Bool(*b)),
            toml::Value::Integer(i) => Some(ParamValue::Int(*i)),
            toml::Value::String(s) => Some(ParamValue::Str(s.clone())),
            toml::Value::Array(items) => {
                let strings: Vec<String> = items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect();
                Some(ParamValue::List(strings))
            }
            _ => None,
        };
        if let Some(param) = converted {
            params.insert(key.clone(), param);
        }
    }
    out.insert(prefix, params);
}
