// Copyright (c) 2025 Chetan Conikee <conikee@gmail.com>
// Licensed under the MIT License

//! Durable, reasoned pattern overrides.
//!
//! An override records that a pattern should no longer be reported, why, and
//! when. There is exactly one active override per pattern id: overriding an
//! already overridden pattern replaces the previous record.

use crate::analyzer::Analyzer;
use crate::error::{LintError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// A single override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideRecord {
    /// The overridden pattern id.
    pub pattern_id: String,
    /// Why the pattern is overridden.
    pub reason: String,
    /// Optional free-form grouping tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// When the override was created; records without one get the load time.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl OverrideRecord {
    /// Creates a record stamped with the current time.
    pub fn new(pattern_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            pattern_id: pattern_id.into(),
            reason: reason.into(),
            category: None,
            created_at: Utc::now(),
        }
    }

    /// Sets the category tag.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Checks that the id and reason are not blank.
    ///
    /// # Errors
    ///
    /// Returns [`LintError::InvalidOverride`] naming the blank field.
    pub fn validate(&self) -> Result<()> {
        if self.pattern_id.trim().is_empty() {
            return Err(LintError::invalid_override(
                &self.pattern_id,
                "pattern id must not be empty",
            ));
        }
        if self.reason.trim().is_empty() {
            return Err(LintError::invalid_override(
                &self.pattern_id,
                "a reason is required",
            ));
        }
        Ok(())
    }
}

/// In-memory override set, kept in creation order.
#[derive(Debug, Clone, Default)]
pub struct OverrideStore {
    records: Vec<OverrideRecord>,
}

impl OverrideStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides a pattern, replacing any existing override for it.
    ///
    /// # Errors
    ///
    /// Returns [`LintError::InvalidOverride`] for an empty id or reason.
    pub fn override_pattern(
        &mut self,
        pattern_id: &str,
        reason: &str,
        category: Option<&str>,
    ) -> Result<&OverrideRecord> {
        let mut record = OverrideRecord::new(pattern_id, reason);
        record.category = category.map(str::to_string);
        record.validate()?;

        info!("Overriding pattern '{}': {}", pattern_id, reason);
        let index = self.upsert(record);
        Ok(&self.records[index])
    }

    fn upsert(&mut self, record: OverrideRecord) -> usize {
        match self
            .records
            .iter()
            .position(|r| r.pattern_id == record.pattern_id)
        {
            Some(index) => {
                self.records[index] = record;
                index
            }
            None => {
                self.records.push(record);
                self.records.len() - 1
            }
        }
    }

    /// Whether a pattern is overridden.
    #[must_use]
    pub fn is_overridden(&self, pattern_id: &str) -> bool {
        self.get(pattern_id).is_some()
    }

    /// The override for a pattern, if any.
    #[must_use]
    pub fn get(&self, pattern_id: &str) -> Option<&OverrideRecord> {
        self.records.iter().find(|r| r.pattern_id == pattern_id)
    }

    /// Removes the override for a pattern. Returns `true` if one existed.
    pub fn remove(&mut self, pattern_id: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.pattern_id != pattern_id);
        let removed = self.records.len() != before;
        if removed {
            info!("Removed override for '{}'", pattern_id);
        }
        removed
    }

    /// All overrides.
    #[must_use]
    pub fn list(&self) -> Vec<OverrideRecord> {
        self.records.clone()
    }

    /// Overrides carrying the given category tag.
    #[must_use]
    pub fn list_by_category(&self, category: &str) -> Vec<OverrideRecord> {
        self.records
            .iter()
            .filter(|r| r.category.as_deref() == Some(category))
            .cloned()
            .collect()
    }

    /// Removes every override.
    pub fn clear_all(&mut self) {
        debug!("Clearing {} override(s)", self.records.len());
        self.records.clear();
    }

    /// Replaces the contents with `records`.
    ///
    /// A later record for the same pattern id wins. Invalid records are
    /// rejected and leave the store unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`LintError::InvalidOverride`] if any record has an empty id or
    /// reason.
    pub fn import_all(&mut self, records: Vec<OverrideRecord>) -> Result<()> {
        for record in &records {
            record.validate()?;
        }

        self.records.clear();
        for record in records {
            self.upsert(record);
        }
        debug!("Imported {} override(s)", self.records.len());
        Ok(())
    }

    /// Parses a JSON array of records and imports it.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a record is invalid.
    pub fn import_json(&mut self, json: &str) -> Result<()> {
        let records: Vec<OverrideRecord> = serde_json::from_str(json)
            .map_err(|e| LintError::invalid_format("override import", e.to_string()))?;
        self.import_all(records)
    }

    /// Copies out every record.
    #[must_use]
    pub fn export_all(&self) -> Vec<OverrideRecord> {
        self.records.clone()
    }

    /// Disables every overridden pattern on `analyzer`.
    ///
    /// Returns how many ids were newly disabled.
    pub fn apply_to(&self, analyzer: &mut Analyzer) -> usize {
        self.records
            .iter()
            .filter(|r| analyzer.disable(&r.pattern_id))
            .count()
    }

    /// Number of overrides.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether there are no overrides.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
