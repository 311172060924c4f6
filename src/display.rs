// Copyright (c) 2025 Chetan Conikee <conikee@gmail.com>
// Licensed under the MIT License

//! Terminal formatting for lint warnings, patterns and overrides.

#![allow(clippy::format_push_string)]
#![allow(clippy::unused_self)]

use crate::analyzer::AnalysisResult;
use crate::detector::Match;
use crate::overrides::OverrideRecord;
use crate::pattern::{Pattern, Severity};
use colored::{Color, Colorize};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color as TableColor, ContentArrangement, Table};
use console::Term;

/// Formats analysis output for the terminal.
pub struct WarningFormatter {
    use_colors: bool,
    term: Term,
}

impl Default for WarningFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl WarningFormatter {
    /// Creates a formatter that colors output when the terminal supports it.
    #[must_use]
    pub fn new() -> Self {
        let term = Term::stdout();
        Self {
            use_colors: term.features().colors_supported(),
            term,
        }
    }

    /// Creates a formatter with colors forced on or off.
    #[must_use]
    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            use_colors,
            term: Term::stdout(),
        }
    }

    /// Formats one warning with its position and the offending line.
    #[must_use]
    pub fn format_match(&self, text: &str, m: &Match) -> String {
        let (line, column) = line_column(text, m.offset);
        let source_line = text.lines().nth(line - 1).unwrap_or_default();
        let mut output = String::new();

        if self.use_colors {
            output.push_str(&format!(
                "{}  {} {}\n",
                m.severity.emoji(),
                m.name.color(severity_color(m.severity)).bold(),
                format!("[{}]", m.pattern_id).dimmed()
            ));
            output.push_str(&format!(
                "   {} {}:{}\n",
                "at".dimmed(),
                line.to_string().yellow(),
                column.to_string().yellow()
            ));
            output.push_str(&format!("   │ {}\n", source_line.trim_end().yellow()));
        } else {
            output.push_str(&format!("{}  {} [{}]\n", m.severity.emoji(), m.name, m.pattern_id));
            output.push_str(&format!("   at {line}:{column}\n"));
            output.push_str(&format!("   │ {}\n", source_line.trim_end()));
        }

        if !m.description.is_empty() {
            output.push_str(&format!("   📝 {}\n", m.description));
        }
        if let Some(suggestion) = &m.suggestion {
            if self.use_colors {
                output.push_str(&format!("   💡 {}\n", suggestion.green()));
            } else {
                output.push_str(&format!("   💡 {suggestion}\n"));
            }
        }

        output
    }

    /// Formats every warning in `matches` followed by a summary line.
    #[must_use]
    pub fn format_warnings(&self, text: &str, matches: &[Match], result: &AnalysisResult) -> String {
        let mut output = String::new();
        for m in matches {
            output.push_str(&self.format_match(text, m));
            output.push('\n');
        }
        output.push_str(&self.format_summary(matches));

        if result.truncated {
            output.push_str("\n⚠️  Message was truncated before analysis");
        }
        if result.timed_out {
            output.push_str("\n⚠️  Analysis ran out of time; results are incomplete");
        }
        output
    }

    /// One-line summary of warning counts by severity.
    #[must_use]
    pub fn format_summary(&self, matches: &[Match]) -> String {
        if matches.is_empty() {
            return if self.use_colors {
                format!("✅ {}", "No issues found".green().bold())
            } else {
                "✅ No issues found".to_string()
            };
        }

        let counts: Vec<String> = Severity::ALL
            .iter()
            .rev()
            .map(|severity| {
                let count = matches.iter().filter(|m| m.severity == *severity).count();
                format!("{count} {severity}")
            })
            .collect();
        let summary = format!(
            "{} issue{} ({})",
            matches.len(),
            if matches.len() == 1 { "" } else { "s" },
            counts.join(", ")
        );

        if self.use_colors {
            format!("❌ {}", summary.red().bold())
        } else {
            format!("❌ {summary}")
        }
    }

    /// Table of patterns with their disabled state.
    #[must_use]
    pub fn format_pattern_table(&self, patterns: &[Pattern], is_disabled: impl Fn(&str) -> bool) -> String {
        let mut table = self.new_table(&["Id", "Severity", "Category", "Name", "Enabled"]);

        for pattern in patterns {
            let severity_cell = Cell::new(format!(
                "{} {}",
                pattern.severity().emoji(),
                pattern.severity()
            ));
            let severity_cell = if self.use_colors {
                severity_cell.fg(table_color(pattern.severity()))
            } else {
                severity_cell
            };
            let enabled = if is_disabled(pattern.id()) { "no" } else { "yes" };

            table.add_row(vec![
                Cell::new(pattern.id()),
                severity_cell,
                Cell::new(pattern.category()),
                Cell::new(pattern.name()),
                Cell::new(enabled),
            ]);
        }

        table.to_string()
    }

    /// Table of overrides.
    #[must_use]
    pub fn format_override_table(&self, records: &[OverrideRecord]) -> String {
        if records.is_empty() {
            return "No overrides".to_string();
        }

        let mut table = self.new_table(&["Pattern", "Reason", "Category", "Created"]);
        for record in records {
            table.add_row(vec![
                Cell::new(&record.pattern_id),
                Cell::new(&record.reason),
                Cell::new(record.category.as_deref().unwrap_or("-")),
                Cell::new(record.created_at.format("%Y-%m-%d %H:%M UTC")),
            ]);
        }
        table.to_string()
    }

    /// A separator sized to the terminal.
    #[must_use]
    pub fn format_separator(&self) -> String {
        let width = (self.term.size().1 as usize).saturating_sub(2).min(80);
        if self.use_colors {
            "═".repeat(width).dimmed().to_string()
        } else {
            "═".repeat(width)
        }
    }

    fn new_table(&self, headers: &[&str]) -> Table {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        if self.use_colors {
            table.load_preset(UTF8_FULL);
        }
        table.set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
                .collect::<Vec<_>>(),
        );
        table
    }
}

/// 1-based line and character column of a byte offset.
#[must_use]
pub fn line_column(text: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(text.len());
    let before = text.get(..offset).unwrap_or(text);
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Error => Color::Red,
        Severity::Warning => Color::Yellow,
        Severity::Info => Color::Blue,
    }
}

fn table_color(severity: Severity) -> TableColor {
    match severity {
        Severity::Error => TableColor::Red,
        Severity::Warning => TableColor::Yellow,
        Severity::Info => TableColor::Blue,
    }
}
