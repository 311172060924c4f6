// Copyright (c) 2025 Chetan Conikee <conikee@gmail.com>
// Licensed under the MIT License

//! End-to-end tests for analysis, optimization and caching.

use commit_lint::{
    detect, optimize, quick_any_match, AnalyzeOptions, Analyzer, AnalyzerConfig, Category,
    ExpressionFlags, Pattern, PatternDefinition, Severity,
};
use std::io::Write;
use tempfile::NamedTempFile;

fn flags(spec: &str) -> ExpressionFlags {
    ExpressionFlags::parse(spec).unwrap()
}

fn empty_analyzer() -> Analyzer {
    Analyzer::with_config(AnalyzerConfig {
        include_builtin: false,
        ..Default::default()
    })
    .unwrap()
}

#[test]
fn test_case_insensitive_wip_detected_once() {
    let mut analyzer = empty_analyzer();
    analyzer
        .add_or_replace(
            PatternDefinition::new("wip", "WIP", "WIP")
                .with_flags(flags("i"))
                .with_severity(Severity::Warning),
        )
        .unwrap();

    let result = analyzer.analyze("WIP: draft", &AnalyzeOptions::default());
    assert_eq!(result.matches.len(), 1);
    assert!(result.matches[0].matched_text.eq_ignore_ascii_case("wip"));
    assert_eq!(result.matches[0].offset, 0);
}

#[test]
fn test_min_severity_keeps_only_errors() {
    let mut analyzer = empty_analyzer();
    analyzer
        .add_or_replace(PatternDefinition::new("loud", "Loud", "broken").with_severity(Severity::Error))
        .unwrap();
    analyzer
        .add_or_replace(PatternDefinition::new("soft", "Soft", "build").with_severity(Severity::Info))
        .unwrap();

    let text = "broken build";
    let all = analyzer.analyze(text, &AnalyzeOptions::default());
    assert_eq!(all.matches.len(), 2);

    let filtered = analyzer.analyze(text, &AnalyzeOptions::min_severity(Severity::Warning));
    assert_eq!(filtered.matches.len(), 1);
    assert_eq!(filtered.matches[0].pattern_id, "loud");
    assert_eq!(filtered.by_severity[&Severity::Info].len(), 0);
}

#[test]
fn test_error_pattern_ordered_before_info() {
    let error = PatternDefinition::new("short", "Short", "abc")
        .with_severity(Severity::Error)
        .compile()
        .unwrap();
    let info = PatternDefinition::new(
        "long",
        "Long",
        "(first|second|third|fourth|fifth|sixth|seventh)+ alternatives",
    )
    .with_severity(Severity::Info)
    .compile()
    .unwrap();

    let ordered = optimize(&[info, error]);
    assert_eq!(ordered[0].pattern.id(), "short");
    assert!(ordered[0].priority < ordered[1].priority);
}

#[test]
fn test_optimize_is_stable_on_ties() {
    let patterns: Vec<Pattern> = ["aaa", "bbb", "ccc"]
        .iter()
        .map(|id| PatternDefinition::new(*id, *id, *id).compile().unwrap())
        .collect();

    let ids: Vec<_> = optimize(&patterns)
        .into_iter()
        .map(|p| p.pattern.id().to_string())
        .collect();
    assert_eq!(ids, vec!["aaa", "bbb", "ccc"]);
}

#[test]
fn test_quick_match_agrees_with_detect_for_literal_patterns() {
    let patterns: Vec<Pattern> = vec![
        PatternDefinition::new("fixme", "Fixme", "FIXME").compile().unwrap(),
        PatternDefinition::new("hack", "Hack", r"\bhack\b")
            .with_flags(flags("i"))
            .compile()
            .unwrap(),
    ];
    let optimized = optimize(&patterns);

    for text in ["FIXME later", "quick Hack here", "nothing to see", ""] {
        let detected = !detect(text, &patterns).is_empty();
        assert_eq!(quick_any_match(text, &optimized), detected, "text: {text:?}");
    }
}

#[test]
fn test_multi_match_repeatable() {
    let pattern = PatternDefinition::new("todo", "Todo", "TODO")
        .with_flags(flags("g"))
        .compile()
        .unwrap();
    let text = "TODO one\nTODO two\nTODO three";

    let first = detect(text, std::slice::from_ref(&pattern));
    let second = detect(text, std::slice::from_ref(&pattern));
    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
}

#[test]
fn test_repeated_analysis_returns_equal_owned_results() {
    let mut analyzer = Analyzer::new();
    let options = AnalyzeOptions::default();

    let mut first = analyzer.analyze("WIP: parser", &options);
    let second = analyzer.analyze("WIP: parser", &options);
    assert_eq!(first, second);
    assert_eq!(analyzer.cache_stats().hits, 1);

    first.matches.clear();
    let third = analyzer.analyze("WIP: parser", &options);
    assert_eq!(third, second);
}

#[test]
fn test_disable_and_enable() {
    let mut analyzer = Analyzer::new();
    let options = AnalyzeOptions::default();
    let has_wip = |result: &commit_lint::AnalysisResult| {
        result.matches.iter().any(|m| m.pattern_id == "wip")
    };

    assert!(has_wip(&analyzer.analyze("WIP: parser", &options)));

    analyzer.disable("wip");
    assert!(!has_wip(&analyzer.analyze("WIP: parser", &options)));

    let including = AnalyzeOptions {
        include_disabled: true,
        ..Default::default()
    };
    assert!(has_wip(&analyzer.analyze("WIP: parser", &including)));

    analyzer.enable("wip");
    assert!(has_wip(&analyzer.analyze("WIP: parser", &options)));
}

#[test]
fn test_category_filter() {
    let mut analyzer = Analyzer::new();
    let options = AnalyzeOptions {
        categories: Some(vec![Category::Content]),
        ..Default::default()
    };

    let result = analyzer.analyze("WIP: parser\n\nTODO: tests", &options);
    assert!(result.has_issues);
    assert!(result.matches.iter().all(|m| m.category == Category::Content));
    assert_eq!(result.by_category.len(), 5);
}

#[test]
fn test_explicit_patterns_used_verbatim() {
    let mut analyzer = Analyzer::new();
    analyzer.disable("only");
    let explicit = PatternDefinition::new("only", "Only", "parser").compile().unwrap();
    let options = AnalyzeOptions {
        patterns: Some(vec![explicit]),
        ..Default::default()
    };

    let result = analyzer.analyze("WIP: parser", &options);
    let ids: Vec<_> = result.matches.iter().map(|m| m.pattern_id.as_str()).collect();
    assert_eq!(ids, vec!["only"]);
}

#[test]
fn test_rule_file_patterns_are_analyzed() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
version: "1.0"
description: team rules
patterns:
  - id: no-jira
    name: Missing Ticket
    expression: '\A[^\n]*\z'
    severity: error
    category: workflow
"#
    )
    .unwrap();

    let mut analyzer = Analyzer::new();
    assert_eq!(analyzer.load_patterns_from_file(file.path()).unwrap(), 1);

    let result = analyzer.analyze("single line", &AnalyzeOptions::default());
    assert!(result.with_severity(Severity::Error).iter().any(|m| m.pattern_id == "no-jira"));
}

#[test]
fn test_long_input_truncated_by_characters() {
    let mut analyzer = Analyzer::with_config(AnalyzerConfig {
        max_text_length: 4,
        ..Default::default()
    })
    .unwrap();

    let result = analyzer.analyze("ééééé WIP", &AnalyzeOptions::default());
    assert!(result.truncated);
    assert!(result.matches.iter().all(|m| m.pattern_id != "wip"));
}
