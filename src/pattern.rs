// Copyright (c) 2025 Chetan Conikee <conikee@gmail.com>
// Licensed under the MIT License

//! Pattern definitions: severities, categories, expression flags and the
//! compiled [`Pattern`] type used by the detector.

use crate::error::{LintError, Result};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity level for a commit message pattern.
///
/// Variants are declared in ascending order so the derived ordering is
/// `Info < Warning < Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Stylistic hint
    Info,
    /// Likely problem worth fixing before committing
    Warning,
    /// The message should not be committed as written
    Error,
}

impl Severity {
    /// All severities, lowest first.
    pub const ALL: [Severity; 3] = [Severity::Info, Severity::Warning, Severity::Error];

    /// Gets the ordinal rank used for minimum-severity filtering.
    #[must_use]
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Info => 0,
            Severity::Warning => 1,
            Severity::Error => 2,
        }
    }

    /// Gets the emoji representation for this severity level.
    #[must_use]
    pub fn emoji(&self) -> &'static str {
        match self {
            Severity::Info => "🔵",
            Severity::Warning => "🟡",
            Severity::Error => "🔴",
        }
    }

    /// Gets the string name for this severity level.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Severity {
    type Err = LintError;

    fn from_str(s: &str) -> Result<Self> {
        Severity::ALL
            .into_iter()
            .find(|severity| severity.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                LintError::invalid_format("severity", format!("unknown severity '{s}'"))
            })
    }
}

/// Category a pattern belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// General commit hygiene
    BestPractices,
    /// Layout of subject, blank line and body
    Formatting,
    /// Wording and tone
    Style,
    /// Signals about the development workflow (WIP, fixups, do-not-merge)
    Workflow,
    /// What the message says (or fails to say)
    Content,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Category; 5] = [
        Category::BestPractices,
        Category::Formatting,
        Category::Style,
        Category::Workflow,
        Category::Content,
    ];

    /// Gets the string name for this category.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Category::BestPractices => "best-practices",
            Category::Formatting => "formatting",
            Category::Style => "style",
            Category::Workflow => "workflow",
            Category::Content => "content",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = LintError;

    fn from_str(s: &str) -> Result<Self> {
        Category::ALL
            .into_iter()
            .find(|category| category.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                LintError::invalid_format("category", format!("unknown category '{s}'"))
            })
    }
}

/// Matching flags carried by a pattern's expression.
///
/// Serialized as a compact flag string: `i` case-insensitive, `g` multiple
/// matches, `m` multi-line anchors, `s` dot matches newline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExpressionFlags {
    /// Match without regard to letter case.
    pub case_insensitive: bool,
    /// Report every non-overlapping occurrence instead of only the first.
    pub multiple: bool,
    /// `^` and `$` match at line boundaries.
    pub multi_line: bool,
    /// `.` also matches `\n`.
    pub dot_matches_new_line: bool,
}

impl ExpressionFlags {
    /// Parses a flag string such as `"gi"`.
    ///
    /// # Errors
    ///
    /// Returns an error for any character outside `i`, `g`, `m`, `s`.
    pub fn parse(flags: &str) -> Result<Self> {
        let mut parsed = Self::default();
        for flag in flags.chars() {
            match flag {
                'i' => parsed.case_insensitive = true,
                'g' => parsed.multiple = true,
                'm' => parsed.multi_line = true,
                's' => parsed.dot_matches_new_line = true,
                other => {
                    return Err(LintError::invalid_format(
                        "expression flags",
                        format!("unsupported flag '{other}' in '{flags}'"),
                    ))
                }
            }
        }
        Ok(parsed)
    }
}

impl fmt::Display for ExpressionFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.multiple {
            f.write_str("g")?;
        }
        if self.case_insensitive {
            f.write_str("i")?;
        }
        if self.multi_line {
            f.write_str("m")?;
        }
        if self.dot_matches_new_line {
            f.write_str("s")?;
        }
        Ok(())
    }
}

impl TryFrom<String> for ExpressionFlags {
    type Error = LintError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ExpressionFlags> for String {
    fn from(flags: ExpressionFlags) -> Self {
        flags.to_string()
    }
}

/// Serializable description of a pattern, as found in rule files and
/// configuration. Compile it with [`PatternDefinition::compile`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternDefinition {
    /// Unique, stable identifier (e.g. `wip`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// What the pattern detects and why it matters.
    #[serde(default)]
    pub description: String,
    /// Regular expression source.
    pub expression: String,
    /// Matching flags for the expression.
    #[serde(default)]
    pub flags: ExpressionFlags,
    /// Severity of a match.
    pub severity: Severity,
    /// Category of the pattern.
    pub category: Category,
    /// Optional advice shown alongside a match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl PatternDefinition {
    /// Creates a warning-level best-practices definition with no flags.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        expression: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            expression: expression.into(),
            flags: ExpressionFlags::default(),
            severity: Severity::Warning,
            category: Category::BestPractices,
            suggestion: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the expression flags.
    #[must_use]
    pub fn with_flags(mut self, flags: ExpressionFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Sets the severity.
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Sets the category.
    #[must_use]
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Sets the suggestion text.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Validates the definition and compiles its expression.
    ///
    /// # Errors
    ///
    /// Returns [`LintError::InvalidPattern`] if the id or name is blank, the
    /// id contains whitespace, or the expression is empty or does not compile.
    pub fn compile(self) -> Result<Pattern> {
        Pattern::compile(self)
    }
}

/// A validated pattern with its compiled expression.
///
/// The compiled [`Regex`] holds no scan position; every search passes its
/// own start offset, so a `Pattern` can be shared freely between calls.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "PatternDefinition", into = "PatternDefinition")]
pub struct Pattern {
    definition: PatternDefinition,
    regex: Regex,
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pattern")
            .field("id", &self.definition.id)
            .field("expression", &self.definition.expression)
            .field("flags", &self.definition.flags.to_string())
            .field("severity", &self.definition.severity)
            .field("category", &self.definition.category)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.definition == other.definition
    }
}

impl Eq for Pattern {}

impl Pattern {
    /// Compiles a definition into a pattern.
    ///
    /// # Errors
    ///
    /// See [`PatternDefinition::compile`].
    pub fn compile(definition: PatternDefinition) -> Result<Self> {
        if definition.id.trim().is_empty() {
            return Err(LintError::invalid_pattern(
                definition.id,
                "pattern id must not be empty",
            ));
        }
        if definition.id.chars().any(char::is_whitespace) {
            return Err(LintError::invalid_pattern(
                definition.id,
                "pattern id must not contain whitespace",
            ));
        }
        if definition.name.trim().is_empty() {
            return Err(LintError::invalid_pattern(
                definition.id,
                "pattern name must not be empty",
            ));
        }
        if definition.expression.is_empty() {
            return Err(LintError::invalid_pattern(
                definition.id,
                "expression must not be empty",
            ));
        }

        let flags = definition.flags;
        let regex = RegexBuilder::new(&definition.expression)
            .case_insensitive(flags.case_insensitive)
            .multi_line(flags.multi_line)
            .dot_matches_new_line(flags.dot_matches_new_line)
            .build()
            .map_err(|e| {
                LintError::invalid_pattern(
                    definition.id.clone(),
                    format!("failed to compile '{}': {e}", definition.expression),
                )
            })?;

        Ok(Self { definition, regex })
    }

    /// Unique identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.definition.id
    }

    /// Human-readable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Description of what the pattern flags.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.definition.description
    }

    /// The expression source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.definition.expression
    }

    /// Expression flags.
    #[must_use]
    pub fn flags(&self) -> ExpressionFlags {
        self.definition.flags
    }

    /// Whether every occurrence is reported rather than only the first.
    #[must_use]
    pub fn is_multiple(&self) -> bool {
        self.definition.flags.multiple
    }

    /// Severity of a match.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.definition.severity
    }

    /// Category of the pattern.
    #[must_use]
    pub fn category(&self) -> Category {
        self.definition.category
    }

    /// Optional suggestion text.
    #[must_use]
    pub fn suggestion(&self) -> Option<&str> {
        self.definition.suggestion.as_deref()
    }

    /// The compiled expression.
    #[must_use]
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// The definition this pattern was compiled from.
    #[must_use]
    pub fn definition(&self) -> &PatternDefinition {
        &self.definition
    }
}

impl TryFrom<PatternDefinition> for Pattern {
    type Error = LintError;

    fn try_from(definition: PatternDefinition) -> Result<Self> {
        Self::compile(definition)
    }
}

impl From<Pattern> for PatternDefinition {
    fn from(pattern: Pattern) -> Self {
        pattern.definition
    }
}
