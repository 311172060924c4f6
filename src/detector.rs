// Copyright (c) 2025 Chetan Conikee <conikee@gmail.com>
// Licensed under the MIT License

//! Evaluates patterns against a commit message and reports structured matches.
//!
//! The scan cursor is a local of each call: compiled expressions carry no
//! position between searches, so repeated or interleaved calls against the
//! same [`Pattern`] always produce the same output.

use crate::pattern::{Category, Pattern, Severity};
use regex::CaptureLocations;
use serde::{Deserialize, Serialize};

/// A single occurrence of a pattern in a text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    /// Id of the pattern that matched.
    pub pattern_id: String,
    /// Pattern name at match time.
    pub name: String,
    /// Pattern description at match time.
    pub description: String,
    /// Pattern severity at match time.
    pub severity: Severity,
    /// Pattern category at match time.
    pub category: Category,
    /// Byte offset of the match in the analyzed text.
    pub offset: usize,
    /// Length of the match in bytes.
    pub length: usize,
    /// The matched text.
    pub matched_text: String,
    /// Capture groups in declaration order, excluding the whole match.
    /// Groups that did not participate are `None`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub captures: Vec<Option<String>>,
    /// Suggestion copied from the pattern.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Match {
    fn from_locations(pattern: &Pattern, text: &str, locations: &CaptureLocations) -> Option<Self> {
        let (start, end) = locations.get(0)?;
        let captures = (1..locations.len())
            .map(|group| locations.get(group).map(|(s, e)| text[s..e].to_string()))
            .collect();

        Some(Self {
            pattern_id: pattern.id().to_string(),
            name: pattern.name().to_string(),
            description: pattern.description().to_string(),
            severity: pattern.severity(),
            category: pattern.category(),
            offset: start,
            length: end - start,
            matched_text: text[start..end].to_string(),
            captures,
            suggestion: pattern.suggestion().map(str::to_string),
        })
    }

    /// Byte offset one past the end of the match.
    #[must_use]
    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

/// Runs every pattern against `text`, concatenating matches in pattern order.
#[must_use]
pub fn detect(text: &str, patterns: &[Pattern]) -> Vec<Match> {
    patterns
        .iter()
        .flat_map(|pattern| detect_pattern(text, pattern))
        .collect()
}

/// Runs a single pattern against `text`.
///
/// Single-match patterns report at most the first occurrence. Multi-match
/// patterns report every non-overlapping occurrence; after an empty match the
/// cursor moves forward by one character so the scan always terminates.
#[must_use]
pub fn detect_pattern(text: &str, pattern: &Pattern) -> Vec<Match> {
    let regex = pattern.regex();
    let mut locations = regex.capture_locations();

    if !pattern.is_multiple() {
        return regex
            .captures_read(&mut locations, text)
            .and_then(|_| Match::from_locations(pattern, text, &locations))
            .into_iter()
            .collect();
    }

    let mut matches = Vec::new();
    let mut cursor = 0;
    while cursor <= text.len() {
        let Some(found) = regex.captures_read_at(&mut locations, text, cursor) else {
            break;
        };
        if let Some(m) = Match::from_locations(pattern, text, &locations) {
            matches.push(m);
        }
        cursor = if found.end() > found.start() {
            found.end()
        } else {
            next_char_boundary(text, found.end())
        };
    }
    matches
}

/// Whether `pattern` matches anywhere in `text`.
#[must_use]
pub fn is_match(text: &str, pattern: &Pattern) -> bool {
    pattern.regex().is_match(text)
}

/// Returns the byte index of the character after `index`, or a value past the
/// end of `text` when `index` is already at the end.
fn next_char_boundary(text: &str, index: usize) -> usize {
    text[index..]
        .chars()
        .next()
        .map_or(text.len() + 1, |c| index + c.len_utf8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{ExpressionFlags, PatternDefinition};

    fn pattern(id: &str, expression: &str, flags: &str) -> Pattern {
        PatternDefinition::new(id, id, expression)
            .with_flags(ExpressionFlags::parse(flags).unwrap())
            .compile()
            .unwrap()
    }

    #[test]
    fn test_single_match_reports_first_occurrence() {
        let p = pattern("todo", "TODO", "");
        let matches = detect("fix TODO and TODO", &[p]);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].offset, 4);
        assert_eq!(matches[0].length, 4);
        assert_eq!(matches[0].matched_text, "TODO");
    }

    #[test]
    fn test_multiple_matches_are_non_overlapping() {
        let p = pattern("aa", "aa", "g");
        let matches = detect_pattern("aaaaa", &p);
        let offsets: Vec<_> = matches.iter().map(|m| m.offset).collect();
        assert_eq!(offsets, vec![0, 2]);
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let p = pattern("todo", r"\b(TODO|FIXME)\b", "g");
        let text = "TODO: one\nFIXME: two\nTODO: three";
        let first = detect_pattern(text, &p);
        let second = detect_pattern(text, &p);
        assert_eq!(first.len(), 3);
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_length_matches_terminate() {
        let p = pattern("empty", "x*", "g");
        let matches = detect_pattern("abc", &p);
        // one empty match before each character and one at the end
        assert_eq!(matches.len(), 4);
        assert!(matches.iter().all(|m| m.length == 0));
    }

    #[test]
    fn test_zero_length_matches_respect_utf8() {
        let p = pattern("empty", "x?", "g");
        let matches = detect_pattern("é✓", &p);
        let offsets: Vec<_> = matches.iter().map(|m| m.offset).collect();
        assert_eq!(offsets, vec![0, 2, 5]);
    }

    #[test]
    fn test_captures_in_declaration_order() {
        let p = pattern("pair", r"(\w+)=(\d+)?", "");
        let matches = detect_pattern("key=", &p);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].captures, vec![Some("key".to_string()), None]);
    }

    #[test]
    fn test_no_implicit_case_folding() {
        let strict = pattern("wip", "WIP", "");
        assert!(detect_pattern("wip: draft", &strict).is_empty());

        let folded = pattern("wip", "WIP", "i");
        let matches = detect_pattern("wip: draft", &folded);
        assert_eq!(matches.len(), 1);
        assert!(matches[0].matched_text.eq_ignore_ascii_case("WIP"));
    }

    #[test]
    fn test_match_snapshots_pattern_metadata() {
        let p = PatternDefinition::new("wip", "Work In Progress", "WIP")
            .with_severity(Severity::Error)
            .with_category(Category::Workflow)
            .with_suggestion("finish it")
            .compile()
            .unwrap();
        let m = &detect_pattern("WIP", &p)[0];
        assert_eq!(m.pattern_id, "wip");
        assert_eq!(m.severity, Severity::Error);
        assert_eq!(m.category, Category::Workflow);
        assert_eq!(m.suggestion.as_deref(), Some("finish it"));
        assert_eq!(m.end(), 3);
    }
}
