// Copyright (c) 2025 Chetan Conikee <conikee@gmail.com>
// Licensed under the MIT License

//! Rule registry holding built-in and caller-added patterns keyed by id.

use crate::builtin::builtin_patterns;
use crate::error::{LintError, Result};
use crate::pattern::{Category, Pattern, PatternDefinition};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// A YAML rule file containing extra pattern definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleFile {
    /// Version of this rule file.
    #[serde(default)]
    pub version: String,
    /// Description of this rule file.
    #[serde(default)]
    pub description: String,
    /// Pattern definitions in this file.
    pub patterns: Vec<PatternDefinition>,
}

impl RuleFile {
    /// Parses and validates rule file content.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed, an id appears twice, or a
    /// definition does not compile.
    pub fn parse(content: &str) -> Result<Vec<Pattern>> {
        let rule_file: RuleFile = serde_yaml::from_str(content).map_err(|e| {
            LintError::invalid_format("rule file", format!("Failed to parse rule file YAML: {e}"))
        })?;

        let mut ids = HashSet::new();
        for definition in &rule_file.patterns {
            if !ids.insert(definition.id.as_str()) {
                return Err(LintError::invalid_pattern(
                    definition.id.clone(),
                    "duplicate pattern id in rule file",
                ));
            }
        }

        rule_file
            .patterns
            .into_iter()
            .map(PatternDefinition::compile)
            .collect()
    }
}

/// Ordered collection of patterns with unique ids.
///
/// Replacing an existing id keeps its position so evaluation order stays
/// stable across upserts.
#[derive(Debug, Clone, Default)]
pub struct PatternRegistry {
    patterns: Vec<Pattern>,
}

impl PatternRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry pre-loaded with the built-in patterns.
    #[must_use]
    pub fn with_builtin() -> Self {
        Self {
            patterns: builtin_patterns().to_vec(),
        }
    }

    /// Inserts a pattern, replacing any pattern with the same id.
    ///
    /// Returns the replaced pattern, if any.
    pub fn add_or_replace(&mut self, pattern: Pattern) -> Option<Pattern> {
        if let Some(slot) = self.patterns.iter_mut().find(|p| p.id() == pattern.id()) {
            debug!("Replacing pattern '{}'", pattern.id());
            Some(std::mem::replace(slot, pattern))
        } else {
            debug!("Registering pattern '{}'", pattern.id());
            self.patterns.push(pattern);
            None
        }
    }

    /// Removes a pattern by id.
    pub fn remove(&mut self, id: &str) -> Option<Pattern> {
        let index = self.patterns.iter().position(|p| p.id() == id)?;
        Some(self.patterns.remove(index))
    }

    /// Gets a pattern by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Pattern> {
        self.patterns.iter().find(|p| p.id() == id)
    }

    /// Iterates over all patterns in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter()
    }

    /// Snapshot of the patterns, optionally restricted to one category.
    #[must_use]
    pub fn list(&self, category: Option<Category>) -> Vec<Pattern> {
        self.patterns
            .iter()
            .filter(|p| category.map_or(true, |c| p.category() == c))
            .cloned()
            .collect()
    }

    /// Number of registered patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Loads a YAML rule file and upserts every pattern it defines.
    ///
    /// The file is validated as a whole before anything is registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or fails validation.
    pub fn load_rule_file(&mut self, path: &Path) -> Result<usize> {
        let content =
            std::fs::read_to_string(path).map_err(|e| LintError::file_system(path, e))?;
        let patterns = RuleFile::parse(&content)?;
        let count = patterns.len();

        for pattern in patterns {
            self.add_or_replace(pattern);
        }

        info!("Loaded {} pattern(s) from {}", count, path.display());
        Ok(count)
    }
}
