// Copyright (c) 2025 Chetan Conikee <conikee@gmail.com>
// Licensed under the MIT License

//! Built-in commit message patterns.
//!
//! The set is versioned with [`BUILTIN_PATTERNS_VERSION`]; bump it whenever a
//! definition changes so rule files and overrides can be audited against it.

use crate::pattern::{Category, ExpressionFlags, Pattern, PatternDefinition, Severity};
use once_cell::sync::Lazy;
use tracing::warn;

/// Version of the built-in pattern set.
pub const BUILTIN_PATTERNS_VERSION: &str = "1.2.0";

static BUILTIN_PATTERNS: Lazy<Vec<Pattern>> = Lazy::new(|| {
    builtin_definitions()
        .into_iter()
        .filter_map(|definition| {
            let id = definition.id.clone();
            match definition.compile() {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    warn!("Skipping built-in pattern '{}': {}", id, e);
                    None
                }
            }
        })
        .collect()
});

/// Returns the compiled built-in patterns.
#[must_use]
pub fn builtin_patterns() -> &'static [Pattern] {
    &BUILTIN_PATTERNS
}

fn flags(spec: &str) -> ExpressionFlags {
    ExpressionFlags::parse(spec).unwrap_or_default()
}

/// Returns the raw built-in definitions, in registry order.
#[must_use]
pub fn builtin_definitions() -> Vec<PatternDefinition> {
    vec![
        PatternDefinition::new("empty-message", "Empty Message", r"\A\s*\z")
            .with_description("The commit message has no content")
            .with_severity(Severity::Error)
            .with_category(Category::Content)
            .with_suggestion("Describe what the change does and why"),
        PatternDefinition::new("subject-too-long", "Subject Too Long", r"\A[^\n]{73,}")
            .with_description("The subject line is longer than 72 characters")
            .with_severity(Severity::Error)
            .with_category(Category::Formatting)
            .with_suggestion("Keep the subject under 72 characters and move detail into the body"),
        PatternDefinition::new(
            "subject-over-recommended",
            "Subject Over 50 Characters",
            r"\A[^\n]{51,72}(?:\n|\z)",
        )
        .with_description("The subject line is longer than the recommended 50 characters")
        .with_severity(Severity::Info)
        .with_category(Category::Style),
        PatternDefinition::new(
            "missing-blank-line",
            "Missing Blank Line",
            r"\A[^\n]+\n[^\n]",
        )
        .with_description("The subject is not separated from the body by a blank line")
        .with_severity(Severity::Warning)
        .with_category(Category::Formatting)
        .with_suggestion("Insert an empty line after the subject"),
        PatternDefinition::new(
            "subject-trailing-period",
            "Subject Ends With Period",
            r"\A[^\n]*[^.\n]\.[ \t]*(?:\n|\z)",
        )
        .with_description("The subject line ends with a period")
        .with_severity(Severity::Info)
        .with_category(Category::Style)
        .with_suggestion("Drop the trailing period from the subject"),
        PatternDefinition::new("wip", "Work In Progress", r"\bWIP\b")
            .with_flags(flags("i"))
            .with_description("The message marks the commit as unfinished work")
            .with_severity(Severity::Warning)
            .with_category(Category::Workflow)
            .with_suggestion("Finish the change or squash it before pushing"),
        PatternDefinition::new(
            "fixup-marker",
            "Fixup Or Squash Marker",
            r"\A(?:fixup|squash|amend)!",
        )
        .with_description("Autosquash marker left in the subject")
        .with_severity(Severity::Warning)
        .with_category(Category::Workflow)
        .with_suggestion("Run an interactive rebase with --autosquash before pushing"),
        PatternDefinition::new(
            "do-not-merge",
            "Do Not Merge",
            r"\b(?:do not merge|don'?t merge|dnm)\b",
        )
        .with_flags(flags("i"))
        .with_description("The message says the change must not be merged")
        .with_severity(Severity::Error)
        .with_category(Category::Workflow),
        PatternDefinition::new(
            "todo-marker",
            "Unfinished Work Marker",
            r"\b(TODO|FIXME|XXX|HACK)\b",
        )
        .with_flags(flags("g"))
        .with_description("TODO, FIXME, XXX or HACK marker in the message")
        .with_severity(Severity::Warning)
        .with_category(Category::Content)
        .with_suggestion("Track follow-up work in an issue instead of the commit message"),
        PatternDefinition::new(
            "vague-subject",
            "Vague Subject",
            r"\A\s*(?:fix(?:ed|es)?|updates?|updated|changes?|changed|misc|stuff|minor|tweaks?|wip|cleanup)(?:\s+(?:stuff|things|bugs?|it|code|changes|files))?[\s.!]*$",
        )
        .with_flags(flags("im"))
        .with_description("The subject does not say what changed")
        .with_severity(Severity::Warning)
        .with_category(Category::Content)
        .with_suggestion("Name the component and the behavior that changed"),
        PatternDefinition::new(
            "past-tense-subject",
            "Past Tense Subject",
            r"\A\s*(added|fixed|changed|removed|updated|implemented|refactored|renamed)\b",
        )
        .with_flags(flags("i"))
        .with_description("The subject is written in the past tense")
        .with_severity(Severity::Info)
        .with_category(Category::Style)
        .with_suggestion("Use the imperative mood: 'Add', 'Fix', 'Remove'"),
        PatternDefinition::new(
            "shouting-subject",
            "All Caps Subject",
            r"\A[^a-z\n]*[A-Z]{4,}[^a-z\n]*(?:\n|\z)",
        )
        .with_description("The subject is written entirely in capital letters")
        .with_severity(Severity::Info)
        .with_category(Category::Style),
        PatternDefinition::new(
            "ticket-only-subject",
            "Ticket Reference Only",
            r"\A\s*(?:#\d+|[A-Z][A-Z0-9]+-\d+)\s*(?:\n|\z)",
        )
        .with_description("The subject is nothing but an issue reference")
        .with_severity(Severity::Warning)
        .with_category(Category::BestPractices)
        .with_suggestion("Summarize the change and move the reference to the body or a trailer"),
        PatternDefinition::new("trailing-whitespace", "Trailing Whitespace", r"[ \t]+$")
            .with_flags(flags("gm"))
            .with_description("A line ends with spaces or tabs")
            .with_severity(Severity::Info)
            .with_category(Category::Formatting),
        PatternDefinition::new(
            "merge-noise",
            "Default Merge Message",
            r"\AMerge (?:branch|remote-tracking branch|pull request) ",
        )
        .with_description("Default merge message left unedited")
        .with_severity(Severity::Info)
        .with_category(Category::Workflow)
        .with_suggestion("Prefer rebasing, or explain why the merge is needed"),
    ]
}
