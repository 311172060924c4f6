// Copyright (c) 2025 Chetan Conikee <conikee@gmail.com>
// Licensed under the MIT License

//! commit-lint - pattern analysis and suppression for commit messages.
//!
//! The [`Analyzer`] runs a registry of regular-expression [`Pattern`]s over a
//! message and returns grouped [`Match`]es. Warnings can be hidden for one
//! session through the [`SessionWarningStore`] or overridden durably, with a
//! reason, through the [`OverrideStore`] and [`OverridePersistence`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::struct_excessive_bools)]

pub mod analyzer;
pub mod builtin;
pub mod cache;
pub mod config;
pub mod detector;
pub mod display;
pub mod error;
pub mod hash;
pub mod optimizer;
pub mod overrides;
pub mod pattern;
pub mod persistence;
pub mod registry;
pub mod session;

// Re-export commonly used types
pub use analyzer::{AnalysisResult, AnalyzeOptions, Analyzer};
pub use builtin::{builtin_patterns, BUILTIN_PATTERNS_VERSION};
pub use cache::CacheStats;
pub use config::{default_config_path, AnalyzerConfig, LintConfig};
pub use detector::{detect, Match};
pub use display::WarningFormatter;
pub use error::{LintError, Result};
pub use optimizer::{optimize, quick_any_match, strict_any_match, OptimizedPattern};
pub use overrides::{OverrideRecord, OverrideStore};
pub use pattern::{Category, ExpressionFlags, Pattern, PatternDefinition, Severity};
pub use persistence::{LoadOutcome, OverridePersistence};
pub use registry::{PatternRegistry, RuleFile};
pub use session::{suppress, SessionWarningStore, SuppressionMode};
