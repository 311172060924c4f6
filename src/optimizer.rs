// Copyright (c) 2025 Chetan Conikee <conikee@gmail.com>
// Licensed under the MIT License

//! Cheap pre-filtering and evaluation ordering for patterns.
//!
//! Each pattern gets a set of quick-reject terms (lowercase literals that
//! should appear in any text the pattern matches) and a priority. Lower
//! priority runs first: severe, short and simple expressions come before
//! long, branchy ones. Priorities are kept in tenths of a point so the
//! length component is not rounded away.

use crate::detector;
use crate::pattern::{Pattern, Severity};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

const MIN_TERM_LENGTH: usize = 3;

/// Priority units per point.
const SCALE: u32 = 10;

const GROUPING_BONUS: u32 = 5 * SCALE;
const ALTERNATION_BONUS: u32 = 3 * SCALE;
const OPEN_REPETITION_BONUS: u32 = 2 * SCALE;
const BOUNDED_REPETITION_BONUS: u32 = 2 * SCALE;

static OPEN_ENDED_BRACES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\d+,\}").expect("static regex"));
static BOUNDED_BRACES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\d+(?:,\d+)?\}").expect("static regex"));

/// A pattern annotated with its pre-filter terms and evaluation priority.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizedPattern {
    /// The underlying pattern.
    pub pattern: Pattern,
    /// Lowercase literals; at least one should occur in any matching text.
    /// Empty means the pattern must always be evaluated in full.
    pub quick_reject_terms: Vec<String>,
    /// Whether the terms are literals of the expression itself rather than
    /// keywords from the id and name. Only source literals are guaranteed to
    /// occur in a match.
    pub terms_from_source: bool,
    /// Evaluation priority in tenths, lower first.
    pub priority: u32,
}

impl OptimizedPattern {
    /// Builds the optimized form of a single pattern.
    #[must_use]
    pub fn new(pattern: Pattern) -> Self {
        let (quick_reject_terms, terms_from_source) = derive_terms(&pattern);
        let priority = priority(&pattern);
        Self {
            pattern,
            quick_reject_terms,
            terms_from_source,
            priority,
        }
    }

    /// Whether the cheap test allows skipping this pattern for `lowered_text`.
    #[must_use]
    pub fn can_skip(&self, lowered_text: &str) -> bool {
        !self.quick_reject_terms.is_empty()
            && !self
                .quick_reject_terms
                .iter()
                .any(|term| lowered_text.contains(term.as_str()))
    }

    /// Like [`can_skip`](Self::can_skip), but never trusts keyword terms.
    #[must_use]
    pub fn can_skip_strict(&self, lowered_text: &str) -> bool {
        self.terms_from_source && self.can_skip(lowered_text)
    }
}

/// Annotates patterns and sorts them by ascending priority.
///
/// The sort is stable, so equal priorities keep their input order.
#[must_use]
pub fn optimize(patterns: &[Pattern]) -> Vec<OptimizedPattern> {
    let mut optimized: Vec<_> = patterns.iter().cloned().map(OptimizedPattern::new).collect();
    optimized.sort_by_key(|p| p.priority);
    optimized
}

/// Presence check: does any pattern match `text`?
///
/// The text is lowered once. Patterns whose quick-reject terms are all absent
/// are skipped without running their expression.
#[must_use]
pub fn quick_any_match(text: &str, optimized: &[OptimizedPattern]) -> bool {
    let lowered = text.to_lowercase();
    optimized
        .iter()
        .filter(|p| !p.can_skip(&lowered))
        .any(|p| detector::is_match(text, &p.pattern))
}

/// Presence check that agrees with a full detection pass.
///
/// Only literal terms taken from the expression source are used to skip a
/// pattern; patterns with keyword terms always run their expression.
#[must_use]
pub fn strict_any_match(text: &str, optimized: &[OptimizedPattern]) -> bool {
    let lowered = text.to_lowercase();
    optimized
        .iter()
        .filter(|p| !p.can_skip_strict(&lowered))
        .any(|p| detector::is_match(text, &p.pattern))
}

/// Derives quick-reject terms for a pattern.
///
/// Literal runs from the expression source are preferred. When the source
/// has none, keywords from the id (split on `-`) and name (split on
/// whitespace) are used instead.
#[must_use]
pub fn quick_reject_terms(pattern: &Pattern) -> Vec<String> {
    derive_terms(pattern).0
}

fn derive_terms(pattern: &Pattern) -> (Vec<String>, bool) {
    let literals = literal_runs(pattern.source());
    if !literals.is_empty() {
        return (literals, true);
    }

    let keywords = pattern
        .id()
        .split('-')
        .chain(pattern.name().split_whitespace())
        .map(str::to_string);
    (dedup_terms(keywords), false)
}

/// Computes the evaluation priority of a pattern, in tenths.
///
/// One point per ten characters of source becomes one unit per character.
#[must_use]
pub fn priority(pattern: &Pattern) -> u32 {
    let source = pattern.source();
    let length = u32::try_from(source.chars().count()).unwrap_or(u32::MAX);

    let mut score = severity_base(pattern.severity()).saturating_add(length);
    if has_grouping(source) {
        score += GROUPING_BONUS;
    }
    if has_unescaped(source, '|') {
        score += ALTERNATION_BONUS;
    }
    if has_unescaped(source, '*') || has_unescaped(source, '+') || OPEN_ENDED_BRACES.is_match(source) {
        score += OPEN_REPETITION_BONUS;
    }
    if BOUNDED_BRACES.is_match(source) {
        score += BOUNDED_REPETITION_BONUS;
    }
    score
}

fn severity_base(severity: Severity) -> u32 {
    match severity {
        Severity::Error => 0,
        Severity::Warning => 10 * SCALE,
        Severity::Info => 20 * SCALE,
    }
}

/// Groups and look-around both open with an unescaped parenthesis.
fn has_grouping(source: &str) -> bool {
    has_unescaped(source, '(')
}

fn has_unescaped(source: &str, needle: char) -> bool {
    let mut escaped = false;
    for c in source.chars() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == needle {
            return true;
        }
    }
    false
}

fn dedup_terms(terms: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    terms
        .filter(|term| term.chars().count() >= MIN_TERM_LENGTH)
        .map(|term| term.to_lowercase())
        .filter(|term| seen.insert(term.clone()))
        .collect()
}

/// Scans expression source for literal runs of at least three characters.
///
/// Escapes, character classes, counted repetition and group prefixes break a
/// run without contributing to it. A run directly followed by `?`, `*` or a
/// counted repetition loses its last character, which may be absent from a
/// match. Quoted substrings are taken whole when they contain no
/// metacharacters.
fn literal_runs(source: &str) -> Vec<String> {
    let chars: Vec<char> = source.chars().collect();
    let mut runs = Vec::new();
    let mut run = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\\' => {
                flush(&mut run, &mut runs);
                i += 2;
            }
            '[' => {
                flush(&mut run, &mut runs);
                i = skip_class(&chars, i);
            }
            '{' | '?' | '*' => {
                run.pop();
                flush(&mut run, &mut runs);
                i = if c == '{' { skip_past(&chars, i, '}') } else { i + 1 };
            }
            '(' => {
                flush(&mut run, &mut runs);
                i = skip_group_prefix(&chars, i);
            }
            '"' | '\'' => {
                flush(&mut run, &mut runs);
                match quoted_literal(&chars, i) {
                    Some((literal, next)) => {
                        runs.push(literal);
                        i = next;
                    }
                    None => i += 1,
                }
            }
            c if c.is_alphanumeric() || c == '_' => {
                run.push(c);
                i += 1;
            }
            _ => {
                flush(&mut run, &mut runs);
                i += 1;
            }
        }
    }
    flush(&mut run, &mut runs);

    dedup_terms(runs.into_iter())
}

fn flush(run: &mut String, runs: &mut Vec<String>) {
    if run.chars().count() >= MIN_TERM_LENGTH {
        runs.push(run.clone());
    }
    run.clear();
}

/// Returns the index just past the character class starting at `start`.
fn skip_class(chars: &[char], start: usize) -> usize {
    let mut i = start + 1;
    if chars.get(i) == Some(&'^') {
        i += 1;
    }
    if chars.get(i) == Some(&']') {
        i += 1;
    }
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            ']' => return i + 1,
            _ => i += 1,
        }
    }
    chars.len()
}

fn skip_past(chars: &[char], start: usize, close: char) -> usize {
    chars[start..]
        .iter()
        .position(|&c| c == close)
        .map_or(chars.len(), |offset| start + offset + 1)
}

/// Skips `(` plus any `?...` prefix such as `(?:`, `(?i)`, `(?P<name>`.
fn skip_group_prefix(chars: &[char], start: usize) -> usize {
    if chars.get(start + 1) != Some(&'?') {
        return start + 1;
    }
    let mut i = start + 2;
    while i < chars.len() {
        match chars[i] {
            ':' | ')' | '>' | '=' | '!' => return i + 1,
            '<' if matches!(chars.get(i + 1).copied(), Some('=' | '!')) => return i + 2,
            _ => i += 1,
        }
    }
    chars.len()
}

fn quoted_literal(chars: &[char], start: usize) -> Option<(String, usize)> {
    let quote = chars[start];
    let close = chars[start + 1..].iter().position(|&c| c == quote)? + start + 1;
    let inner: String = chars[start + 1..close].iter().collect();
    let is_plain = !inner.chars().any(|c| r"\[](){}|?*+^$.".contains(c));
    if is_plain && inner.chars().count() >= MIN_TERM_LENGTH {
        Some((inner, close + 1))
    } else {
        None
    }
}
