// Copyright (c) 2025 Chetan Conikee <conikee@gmail.com>
// Licensed under the MIT License

//! Analyzer and application configuration, loadable from YAML.

use crate::error::{LintError, Result};
use crate::pattern::PatternDefinition;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Default maximum number of characters analyzed per call.
pub const DEFAULT_MAX_TEXT_LENGTH: usize = 10_000;
/// Default matching time budget in milliseconds.
pub const DEFAULT_TIME_BUDGET_MS: u64 = 1_000;
/// Default number of cached analysis results.
pub const DEFAULT_CACHE_CAPACITY: usize = 100;

const APP_DIR_NAME: &str = "commit-lint";
const OVERRIDES_FILE: &str = "overrides.json";
const CONFIG_FILE: &str = "config.yaml";

/// Configuration for an [`Analyzer`](crate::analyzer::Analyzer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Register the built-in patterns.
    pub include_builtin: bool,
    /// Extra patterns registered after the built-ins (replacing on id clash).
    pub custom_patterns: Vec<PatternDefinition>,
    /// Pattern ids disabled from the start.
    pub disabled: Vec<String>,
    /// Texts longer than this many characters are truncated before analysis.
    pub max_text_length: usize,
    /// Cooperative matching time budget in milliseconds.
    pub time_budget_ms: u64,
    /// Number of analysis results kept in the cache.
    pub cache_capacity: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            include_builtin: true,
            custom_patterns: Vec::new(),
            disabled: Vec::new(),
            max_text_length: DEFAULT_MAX_TEXT_LENGTH,
            time_budget_ms: DEFAULT_TIME_BUDGET_MS,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl AnalyzerConfig {
    /// The matching time budget.
    #[must_use]
    pub fn time_budget(&self) -> Duration {
        Duration::from_millis(self.time_budget_ms)
    }
}

/// Application configuration for the command-line host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LintConfig {
    /// Analyzer settings.
    pub analyzer: AnalyzerConfig,
    /// Where overrides are persisted; defaults to the user config directory.
    pub override_file: Option<PathBuf>,
    /// YAML rule files loaded on startup.
    pub rule_files: Vec<PathBuf>,
}

impl LintConfig {
    /// Loads configuration from a YAML file, returning defaults when the file
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(path).map_err(|e| LintError::file_system(path, e))?;
        serde_yaml::from_str(&content).map_err(|e| {
            LintError::config(format!("Failed to parse {}: {e}", path.display()))
        })
    }

    /// Writes configuration as YAML, creating the parent directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| LintError::file_system(parent, e))?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content).map_err(|e| LintError::file_system(path, e))
    }

    /// The override file to use: the configured one or the default location.
    #[must_use]
    pub fn override_path(&self) -> PathBuf {
        self.override_file
            .clone()
            .unwrap_or_else(|| app_dir().join(OVERRIDES_FILE))
    }
}

/// Default location of the configuration file.
#[must_use]
pub fn default_config_path() -> PathBuf {
    app_dir().join(CONFIG_FILE)
}

fn app_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .or_else(|| dirs::home_dir().map(|home| home.join(format!(".{APP_DIR_NAME}"))))
        .unwrap_or_else(|| PathBuf::from(format!(".{APP_DIR_NAME}")))
}
