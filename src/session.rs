// Copyright (c) 2025 Chetan Conikee <conikee@gmail.com>
// Licensed under the MIT License

//! Session-scoped warning state.
//!
//! The session store decides which warnings from the latest analysis are
//! shown. Dismissals last until [`SessionWarningStore::reset`] and are never
//! persisted.

use crate::analyzer::{AnalysisResult, Analyzer};
use crate::detector::Match;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// How far a suppression reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuppressionMode {
    /// Hide the pattern's warnings for this session only.
    Temporary,
    /// Hide them now and stop the analyzer from reporting the pattern.
    Permanent,
}

/// Visible warnings and session dismissals.
#[derive(Debug, Clone, Default)]
pub struct SessionWarningStore {
    visible: Vec<Match>,
    dismissed: BTreeSet<String>,
}

impl SessionWarningStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the visible warnings with the matches of `result`, minus
    /// dismissed patterns.
    pub fn update(&mut self, result: &AnalysisResult) {
        self.visible = result
            .matches
            .iter()
            .filter(|m| !self.dismissed.contains(&m.pattern_id))
            .cloned()
            .collect();
    }

    /// Currently visible warnings.
    #[must_use]
    pub fn visible(&self) -> &[Match] {
        &self.visible
    }

    /// Whether a pattern is dismissed for this session.
    #[must_use]
    pub fn is_dismissed(&self, pattern_id: &str) -> bool {
        self.dismissed.contains(pattern_id)
    }

    /// Hides a pattern's warnings for the rest of the session.
    ///
    /// Returns how many visible warnings were hidden.
    pub fn dismiss(&mut self, pattern_id: &str) -> usize {
        self.dismissed.insert(pattern_id.to_string());
        let before = self.visible.len();
        self.visible.retain(|m| m.pattern_id != pattern_id);
        let hidden = before - self.visible.len();
        debug!("Dismissed '{}' ({} warning(s) hidden)", pattern_id, hidden);
        hidden
    }

    /// Session side of a permanent dismissal.
    ///
    /// This only hides the warnings, exactly like [`dismiss`](Self::dismiss).
    /// The caller must also call [`Analyzer::disable`] for the pattern to stay
    /// quiet after [`reset`](Self::reset); [`suppress`] does both.
    pub fn dismiss_permanently(&mut self, pattern_id: &str) -> usize {
        self.dismiss(pattern_id)
    }

    /// Dismissed pattern ids in sorted order.
    #[must_use]
    pub fn dismissed_ids(&self) -> Vec<String> {
        self.dismissed.iter().cloned().collect()
    }

    /// Forgets all dismissals and visible warnings.
    pub fn reset(&mut self) {
        self.visible.clear();
        self.dismissed.clear();
    }
}

/// Suppresses a pattern in the session and, for [`SuppressionMode::Permanent`],
/// on the analyzer as well.
///
/// Returns how many visible warnings were hidden.
pub fn suppress(
    analyzer: &mut Analyzer,
    store: &mut SessionWarningStore,
    pattern_id: &str,
    mode: SuppressionMode,
) -> usize {
    match mode {
        SuppressionMode::Temporary => store.dismiss(pattern_id),
        SuppressionMode::Permanent => {
            analyzer.disable(pattern_id);
            store.dismiss_permanently(pattern_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::AnalyzeOptions;

    const MESSAGE: &str = "WIP: add parser\n\nTODO: tests";

    fn analyzed(analyzer: &mut Analyzer) -> AnalysisResult {
        analyzer.analyze(MESSAGE, &AnalyzeOptions::default())
    }

    fn shows(store: &SessionWarningStore, id: &str) -> bool {
        store.visible().iter().any(|m| m.pattern_id == id)
    }

    #[test]
    fn test_dismiss_survives_update() {
        let mut analyzer = Analyzer::new();
        let mut store = SessionWarningStore::new();
        store.update(&analyzed(&mut analyzer));
        assert!(shows(&store, "wip"));

        assert_eq!(store.dismiss("wip"), 1);
        assert!(!shows(&store, "wip"));

        store.update(&analyzed(&mut analyzer));
        assert!(!shows(&store, "wip"));
        assert!(shows(&store, "todo-marker"));
    }

    #[test]
    fn test_reset_restores_warnings() {
        let mut analyzer = Analyzer::new();
        let mut store = SessionWarningStore::new();
        store.dismiss("wip");
        store.reset();
        assert!(store.dismissed_ids().is_empty());

        store.update(&analyzed(&mut analyzer));
        assert!(shows(&store, "wip"));
    }

    #[test]
    fn test_dismiss_permanently_alone_is_temporary() {
        let mut analyzer = Analyzer::new();
        let mut store = SessionWarningStore::new();
        store.update(&analyzed(&mut analyzer));

        store.dismiss_permanently("wip");
        assert!(!shows(&store, "wip"));
        assert!(!analyzer.is_disabled("wip"));

        // Without the analyzer side the warning returns after a reset.
        store.reset();
        store.update(&analyzed(&mut analyzer));
        assert!(shows(&store, "wip"));
    }

    #[test]
    fn test_permanent_suppress_disables_pattern() {
        let mut analyzer = Analyzer::new();
        let mut store = SessionWarningStore::new();
        store.update(&analyzed(&mut analyzer));

        let hidden = suppress(&mut analyzer, &mut store, "wip", SuppressionMode::Permanent);
        assert_eq!(hidden, 1);
        assert!(analyzer.is_disabled("wip"));

        store.reset();
        store.update(&analyzed(&mut analyzer));
        assert!(!shows(&store, "wip"));
    }

    #[test]
    fn test_temporary_suppress_leaves_analyzer() {
        let mut analyzer = Analyzer::new();
        let mut store = SessionWarningStore::new();
        suppress(&mut analyzer, &mut store, "wip", SuppressionMode::Temporary);
        assert!(store.is_dismissed("wip"));
        assert!(!analyzer.is_disabled("wip"));
    }
}
