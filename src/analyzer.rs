// Copyright (c) 2025 Chetan Conikee <conikee@gmail.com>
// Licensed under the MIT License

//! The commit message analyzer.
//!
//! [`Analyzer`] owns the pattern registry, the disabled-id set and the result
//! cache. Every mutation clears the whole cache; pattern toggling is rare and
//! user driven, so coarse invalidation keeps the cache trivially coherent.

use crate::cache::{CacheStats, ResultCache};
use crate::config::AnalyzerConfig;
use crate::detector::{self, Match};
use crate::error::{LintError, Result};
use crate::hash::CacheKey;
use crate::optimizer::{self, OptimizedPattern};
use crate::pattern::{Category, Pattern, PatternDefinition, Severity};
use crate::registry::PatternRegistry;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, warn};

/// Number of patterns evaluated between two time-budget checks.
pub const BATCH_SIZE: usize = 5;

/// Per-call analysis options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeOptions {
    /// Only evaluate patterns in these categories.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<Category>>,
    /// Drop matches below this severity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_severity: Option<Severity>,
    /// Evaluate disabled patterns too.
    #[serde(default)]
    pub include_disabled: bool,
    /// Evaluate exactly these patterns instead of the registry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patterns: Option<Vec<Pattern>>,
}

impl AnalyzeOptions {
    /// Options that keep only matches at or above `severity`.
    #[must_use]
    pub fn min_severity(severity: Severity) -> Self {
        Self {
            min_severity: Some(severity),
            ..Self::default()
        }
    }
}

/// Outcome of analyzing one text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Matches in evaluation order.
    pub matches: Vec<Match>,
    /// Whether any match was found.
    pub has_issues: bool,
    /// Matches grouped by category; every category is present.
    pub by_category: BTreeMap<Category, Vec<Match>>,
    /// Matches grouped by severity; every severity is present.
    pub by_severity: BTreeMap<Severity, Vec<Match>>,
    /// The input was longer than the configured limit and was cut.
    pub truncated: bool,
    /// The time budget ran out; matches cover only the patterns evaluated
    /// before that point.
    pub timed_out: bool,
}

impl AnalysisResult {
    /// A result with no matches.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_matches(Vec::new(), false, false)
    }

    /// Builds a result and its groupings from a list of matches.
    #[must_use]
    pub fn from_matches(matches: Vec<Match>, truncated: bool, timed_out: bool) -> Self {
        let mut by_category: BTreeMap<Category, Vec<Match>> =
            Category::ALL.iter().map(|c| (*c, Vec::new())).collect();
        let mut by_severity: BTreeMap<Severity, Vec<Match>> =
            Severity::ALL.iter().map(|s| (*s, Vec::new())).collect();

        for m in &matches {
            by_category.entry(m.category).or_default().push(m.clone());
            by_severity.entry(m.severity).or_default().push(m.clone());
        }

        Self {
            has_issues: !matches.is_empty(),
            matches,
            by_category,
            by_severity,
            truncated,
            timed_out,
        }
    }

    /// Matches of the given severity.
    #[must_use]
    pub fn with_severity(&self, severity: Severity) -> &[Match] {
        self.by_severity.get(&severity).map_or(&[], Vec::as_slice)
    }

    /// Highest severity among the matches.
    #[must_use]
    pub fn max_severity(&self) -> Option<Severity> {
        self.matches.iter().map(|m| m.severity).max()
    }
}

/// Analyzes commit messages against a registry of patterns.
#[derive(Debug)]
pub struct Analyzer {
    config: AnalyzerConfig,
    registry: PatternRegistry,
    /// Registry patterns in evaluation order, rebuilt when the registry changes.
    optimized: Vec<OptimizedPattern>,
    disabled: BTreeSet<String>,
    cache: ResultCache,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer {
    /// Creates an analyzer with the built-in patterns and default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::from_parts(AnalyzerConfig::default(), PatternRegistry::with_builtin())
    }

    /// Creates an analyzer from a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a custom pattern definition is invalid.
    pub fn with_config(config: AnalyzerConfig) -> Result<Self> {
        let mut registry = if config.include_builtin {
            PatternRegistry::with_builtin()
        } else {
            PatternRegistry::new()
        };
        for definition in &config.custom_patterns {
            registry.add_or_replace(definition.clone().compile()?);
        }
        Ok(Self::from_parts(config, registry))
    }

    fn from_parts(config: AnalyzerConfig, registry: PatternRegistry) -> Self {
        let disabled = config.disabled.iter().cloned().collect();
        let cache = ResultCache::new(config.cache_capacity);
        let mut analyzer = Self {
            config,
            registry,
            optimized: Vec::new(),
            disabled,
            cache,
        };
        analyzer.rebuild_order();
        debug!(
            "Analyzer ready with {} pattern(s), {} disabled",
            analyzer.registry.len(),
            analyzer.disabled.len()
        );
        analyzer
    }

    /// The configuration this analyzer was built with.
    #[must_use]
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyzes `text` and returns an owned result.
    ///
    /// Matching never fails: a time-budget overrun is reported through
    /// [`AnalysisResult::timed_out`] and such results are not cached.
    pub fn analyze(&mut self, text: &str, options: &AnalyzeOptions) -> AnalysisResult {
        let budget = self.config.time_budget();
        let started = Instant::now();
        self.analyze_within(text, options, || started.elapsed() > budget)
    }

    /// Analysis with the budget test supplied by the caller. `over_budget` is
    /// consulted before each batch of [`BATCH_SIZE`] patterns.
    fn analyze_within(
        &mut self,
        text: &str,
        options: &AnalyzeOptions,
        over_budget: impl FnMut() -> bool,
    ) -> AnalysisResult {
        let (text, truncated) = truncate_chars(text, self.config.max_text_length);
        if truncated {
            debug!(
                "Truncated input to {} characters for analysis",
                self.config.max_text_length
            );
        }

        let key = match CacheKey::compute(text, options) {
            Ok(key) => Some(key),
            Err(e) => {
                debug!("Skipping result cache: {}", e);
                None
            }
        };
        if let Some(key) = &key {
            if let Some(hit) = self.cache.get(key) {
                debug!("Cache hit for {}", key.short());
                return hit;
            }
        }

        let active = self.active_patterns(options);
        let (mut matches, timed_out) = self.evaluate(text, &active, over_budget);

        if let Some(min) = options.min_severity {
            matches.retain(|m| m.severity.rank() >= min.rank());
        }

        let result = AnalysisResult::from_matches(matches, truncated, timed_out);
        if let Some(key) = key {
            if !timed_out {
                self.cache.insert(key, result.clone());
            }
        }
        result
    }

    /// Runs patterns in batches, checking the time budget before each batch.
    fn evaluate(
        &self,
        text: &str,
        active: &[OptimizedPattern],
        mut over_budget: impl FnMut() -> bool,
    ) -> (Vec<Match>, bool) {
        let mut matches = Vec::new();

        for (index, batch) in active.chunks(BATCH_SIZE).enumerate() {
            if over_budget() {
                warn!(
                    "Analysis exceeded its {}ms budget after {} of {} pattern(s); results are partial",
                    self.config.time_budget_ms,
                    index * BATCH_SIZE,
                    active.len()
                );
                return (matches, true);
            }
            for optimized in batch {
                matches.extend(detector::detect_pattern(text, &optimized.pattern));
            }
        }

        (matches, false)
    }

    fn active_patterns(&self, options: &AnalyzeOptions) -> Vec<OptimizedPattern> {
        if let Some(explicit) = &options.patterns {
            return optimizer::optimize(explicit);
        }

        self.optimized
            .iter()
            .filter(|p| options.include_disabled || !self.disabled.contains(p.pattern.id()))
            .filter(|p| {
                options
                    .categories
                    .as_ref()
                    .map_or(true, |categories| categories.contains(&p.pattern.category()))
            })
            .cloned()
            .collect()
    }

    /// Enabled registry patterns in evaluation order.
    fn enabled_patterns(&self) -> impl Iterator<Item = &OptimizedPattern> {
        self.optimized
            .iter()
            .filter(|p| !self.disabled.contains(p.pattern.id()))
    }

    /// Snapshot of the registered patterns, optionally for one category.
    #[must_use]
    pub fn list_patterns(&self, category: Option<Category>) -> Vec<Pattern> {
        self.registry.list(category)
    }

    /// Gets a registered pattern by id.
    #[must_use]
    pub fn pattern(&self, id: &str) -> Option<&Pattern> {
        self.registry.get(id)
    }

    /// Disables a pattern id. Returns `true` if it was not already disabled.
    ///
    /// Unknown ids are accepted so an override can precede the pattern it
    /// targets.
    pub fn disable(&mut self, id: &str) -> bool {
        let changed = self.disabled.insert(id.to_string());
        if changed {
            debug!("Disabled pattern '{}'", id);
        }
        self.cache.clear();
        changed
    }

    /// Re-enables a pattern id. Returns `true` if it was disabled.
    pub fn enable(&mut self, id: &str) -> bool {
        let changed = self.disabled.remove(id);
        if changed {
            debug!("Enabled pattern '{}'", id);
        }
        self.cache.clear();
        changed
    }

    /// Whether a pattern id is disabled.
    #[must_use]
    pub fn is_disabled(&self, id: &str) -> bool {
        self.disabled.contains(id)
    }

    /// Disabled ids in sorted order.
    #[must_use]
    pub fn disabled_ids(&self) -> Vec<String> {
        self.disabled.iter().cloned().collect()
    }

    /// Validates and registers a pattern, replacing any with the same id.
    ///
    /// # Errors
    ///
    /// Returns [`LintError::InvalidPattern`](crate::LintError::InvalidPattern)
    /// if the definition does not compile; the registry is left unchanged.
    pub fn add_or_replace(&mut self, definition: PatternDefinition) -> Result<()> {
        let pattern = definition.compile()?;
        self.registry.add_or_replace(pattern);
        self.rebuild_order();
        self.cache.clear();
        Ok(())
    }

    /// Removes a pattern from the registry.
    ///
    /// # Errors
    ///
    /// Returns [`LintError::PatternNotFound`](crate::LintError::PatternNotFound)
    /// if no pattern has this id.
    pub fn remove_pattern(&mut self, id: &str) -> Result<Pattern> {
        let removed = self
            .registry
            .remove(id)
            .ok_or_else(|| LintError::pattern_not_found(id))?;
        self.rebuild_order();
        self.cache.clear();
        Ok(removed)
    }

    /// Loads a YAML rule file into the registry.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or any definition is invalid.
    pub fn load_patterns_from_file(&mut self, path: &Path) -> Result<usize> {
        let count = self.registry.load_rule_file(path)?;
        self.rebuild_order();
        self.cache.clear();
        Ok(count)
    }

    /// Distinct enabled patterns with at least one match in `text`, from a
    /// full detection pass.
    #[must_use]
    pub fn patterns_matching_text(&self, text: &str) -> Vec<Pattern> {
        let (text, _) = truncate_chars(text, self.config.max_text_length);
        let mut seen = HashSet::new();
        self.enabled_patterns()
            .filter(|p| !detector::detect_pattern(text, &p.pattern).is_empty())
            .filter(|p| seen.insert(p.pattern.id().to_string()))
            .map(|p| p.pattern.clone())
            .collect()
    }

    /// Presence check over the enabled patterns.
    ///
    /// Agrees with `analyze(text).has_issues` under default options; only
    /// literals from an expression's own source are used to skip it.
    #[must_use]
    pub fn has_any_issue(&self, text: &str) -> bool {
        let (text, _) = truncate_chars(text, self.config.max_text_length);
        let enabled: Vec<OptimizedPattern> = self.enabled_patterns().cloned().collect();
        optimizer::strict_any_match(text, &enabled)
    }

    /// Cache statistics.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Number of cached results.
    #[must_use]
    pub fn cached_results(&self) -> usize {
        self.cache.len()
    }

    /// Drops all cached results.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    fn rebuild_order(&mut self) {
        let patterns: Vec<Pattern> = self.registry.iter().cloned().collect();
        self.optimized = optimizer::optimize(&patterns);
        debug!("Evaluation order rebuilt for {} pattern(s)", self.optimized.len());
    }
}

/// Cuts `text` to at most `max_chars` characters on a character boundary.
fn truncate_chars(text: &str, max_chars: usize) -> (&str, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => (&text[..byte_index], true),
        None => (text, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::ExpressionFlags;

    fn case_insensitive() -> ExpressionFlags {
        ExpressionFlags {
            case_insensitive: true,
            ..Default::default()
        }
    }

    fn bare_analyzer() -> Analyzer {
        Analyzer::with_config(AnalyzerConfig {
            include_builtin: false,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abcdef", 3), ("abc", true));
        assert_eq!(truncate_chars("abc", 3), ("abc", false));
        assert_eq!(truncate_chars("é✓x", 2), ("é✓", true));
    }

    #[test]
    fn test_result_groupings_have_all_keys() {
        let result = AnalysisResult::empty();
        assert_eq!(result.by_category.len(), 5);
        assert_eq!(result.by_severity.len(), 3);
        assert!(!result.has_issues);
        assert_eq!(result.max_severity(), None);
    }

    #[test]
    fn test_wip_scenario() {
        let mut analyzer = bare_analyzer();
        analyzer
            .add_or_replace(
                PatternDefinition::new("wip", "WIP", "WIP")
                    .with_flags(case_insensitive())
                    .with_severity(Severity::Warning),
            )
            .unwrap();

        let result = analyzer.analyze("WIP: draft", &AnalyzeOptions::default());
        assert_eq!(result.matches.len(), 1);
        assert!(result.matches[0].matched_text.eq_ignore_ascii_case("WIP"));
        assert!(result.has_issues);
        assert_eq!(result.with_severity(Severity::Warning).len(), 1);
        assert_eq!(result.by_category[&Category::BestPractices].len(), 1);
    }

    #[test]
    fn test_truncation_is_flagged() {
        let mut analyzer = Analyzer::with_config(AnalyzerConfig {
            include_builtin: false,
            max_text_length: 5,
            ..Default::default()
        })
        .unwrap();
        analyzer
            .add_or_replace(PatternDefinition::new("tail", "Tail", "TAIL"))
            .unwrap();

        let result = analyzer.analyze("short TAIL", &AnalyzeOptions::default());
        assert!(result.truncated);
        assert!(!result.has_issues);
    }

    fn seven_x_patterns() -> Analyzer {
        let mut analyzer = bare_analyzer();
        for n in 0..7 {
            analyzer
                .add_or_replace(PatternDefinition::new(format!("x{n}"), "X", "x"))
                .unwrap();
        }
        analyzer
    }

    #[test]
    fn test_timeout_keeps_first_batch_and_skips_cache() {
        let mut analyzer = seven_x_patterns();
        let mut checks = 0;
        let result = analyzer.analyze_within("x", &AnalyzeOptions::default(), || {
            checks += 1;
            checks > 1
        });

        assert!(result.timed_out);
        let ids: Vec<_> = result.matches.iter().map(|m| m.pattern_id.as_str()).collect();
        assert_eq!(ids, vec!["x0", "x1", "x2", "x3", "x4"]);
        assert!(result.has_issues);
        assert_eq!(analyzer.cached_results(), 0);
    }

    #[test]
    fn test_budget_checked_before_each_batch() {
        let mut analyzer = seven_x_patterns();
        let mut checks = 0;
        let result = analyzer.analyze_within("x", &AnalyzeOptions::default(), || {
            checks += 1;
            false
        });

        assert_eq!(checks, 2);
        assert!(!result.timed_out);
        assert_eq!(result.matches.len(), 7);
        assert_eq!(analyzer.cached_results(), 1);
    }

    #[test]
    fn test_zero_budget_reports_timeout() {
        let mut analyzer = Analyzer::with_config(AnalyzerConfig {
            time_budget_ms: 0,
            ..Default::default()
        })
        .unwrap();
        let result = analyzer.analyze_within("WIP", &AnalyzeOptions::default(), || true);
        assert!(result.timed_out);
        assert!(result.matches.is_empty());
        assert_eq!(analyzer.cached_results(), 0);
    }

    #[test]
    fn test_remove_unknown_pattern() {
        let mut analyzer = Analyzer::new();
        assert!(analyzer.remove_pattern("wip").is_ok());
        assert!(analyzer.pattern("wip").is_none());
        assert!(matches!(
            analyzer.remove_pattern("wip"),
            Err(LintError::PatternNotFound { .. })
        ));
    }

    #[test]
    fn test_invalid_pattern_rejected_without_side_effects() {
        let mut analyzer = Analyzer::new();
        let before = analyzer.list_patterns(None).len();
        let error = analyzer
            .add_or_replace(PatternDefinition::new("broken", "Broken", "(oops"))
            .unwrap_err();
        assert!(matches!(error, crate::LintError::InvalidPattern { .. }));
        assert_eq!(analyzer.list_patterns(None).len(), before);
    }

    #[test]
    fn test_cache_invalidated_on_mutation() {
        let mut analyzer = Analyzer::new();
        analyzer.analyze("WIP: draft", &AnalyzeOptions::default());
        assert_eq!(analyzer.cached_results(), 1);

        analyzer.disable("wip");
        assert_eq!(analyzer.cached_results(), 0);

        analyzer.analyze("WIP: draft", &AnalyzeOptions::default());
        analyzer
            .add_or_replace(PatternDefinition::new("draft", "Draft", "draft"))
            .unwrap();
        assert_eq!(analyzer.cached_results(), 0);
    }

    #[test]
    fn test_patterns_matching_text_distinct() {
        let analyzer = Analyzer::new();
        let matching = analyzer.patterns_matching_text("WIP TODO TODO");
        let ids: Vec<_> = matching.iter().map(Pattern::id).collect();
        assert!(ids.contains(&"wip"));
        assert_eq!(ids.iter().filter(|id| **id == "todo-marker").count(), 1);
    }

    #[test]
    fn test_has_any_issue() {
        let analyzer = Analyzer::new();
        assert!(analyzer.has_any_issue("WIP: parser"));
    }

    #[test]
    fn test_has_any_issue_agrees_with_analyze() {
        let mut analyzer = Analyzer::new();
        let samples = [
            String::new(),
            "a".repeat(80),
            "Add parser  ".to_string(),
            "Add parser".to_string(),
            "Add parser\nwith a body".to_string(),
            "ABCD-123".to_string(),
            "FIX THE BUILD".to_string(),
            "Merge branch 'main' into feature".to_string(),
            "fixup! Add parser".to_string(),
            "Refactor lexer to share token buffer.".to_string(),
            "Add parser\n\nDNM until review".to_string(),
        ];

        for text in &samples {
            let expected = analyzer.analyze(text, &AnalyzeOptions::default()).has_issues;
            assert_eq!(analyzer.has_any_issue(text), expected, "text: {text:?}");
        }
    }
}
