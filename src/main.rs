// Copyright (c) 2025 Chetan Conikee <conikee@gmail.com>
// Licensed under the MIT License

//! commit-lint CLI - lint commit messages against configurable patterns.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commit_lint::{
    default_config_path, AnalyzeOptions, Analyzer, Category, LintConfig, LoadOutcome,
    OverridePersistence, OverrideStore, Severity, WarningFormatter,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// commit-lint CLI - lint commit messages against configurable patterns.
#[derive(Parser)]
#[command(
    name = "commit-lint",
    version = env!("CARGO_PKG_VERSION"),
    author = "Chetan Conikee <conikee@gmail.com>",
    about = "Lint commit messages for common mistakes, with reasoned overrides"
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Path to the YAML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Check a commit message
    Check {
        /// Message file, or '-' for stdin
        #[arg(default_value = "-")]
        file: String,
        /// Only report matches at or above this severity
        #[arg(long)]
        min_severity: Option<Severity>,
        /// Only run patterns in these categories
        #[arg(long, value_delimiter = ',')]
        category: Vec<Category>,
        /// Print the analysis result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List registered patterns
    Patterns {
        /// Only list patterns in this category
        #[arg(long)]
        category: Option<Category>,
    },

    /// Manage pattern overrides
    Override {
        #[command(subcommand)]
        action: OverrideAction,
    },
}

/// Override management actions.
#[derive(Subcommand)]
enum OverrideAction {
    /// Override a pattern
    Add {
        /// Pattern id
        pattern_id: String,
        /// Why the pattern is overridden
        #[arg(short, long)]
        reason: String,
        /// Optional category tag
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Remove an override
    Remove {
        /// Pattern id
        pattern_id: String,
    },
    /// List overrides
    List {
        /// Only list overrides with this category tag
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Remove every override
    Clear,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    debug!("Starting commit-lint v{}", env!("CARGO_PKG_VERSION"));

    let config_path = cli.config.unwrap_or_else(default_config_path);
    let config = LintConfig::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    match cli.command {
        Commands::Check {
            file,
            min_severity,
            category,
            json,
        } => handle_check_command(&config, &file, min_severity, category, json).await,
        Commands::Patterns { category } => {
            handle_patterns_command(&config, category).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Override { action } => {
            handle_override_command(&config, action).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Builds an analyzer from the config, its rule files and saved overrides.
async fn build_analyzer(config: &LintConfig) -> Result<Analyzer> {
    let mut analyzer =
        Analyzer::with_config(config.analyzer.clone()).context("Invalid analyzer configuration")?;

    for rule_file in &config.rule_files {
        analyzer
            .load_patterns_from_file(rule_file)
            .with_context(|| format!("Failed to load rules from {}", rule_file.display()))?;
    }

    let store = OverridePersistence::from_config(config).load_store().await;
    let disabled = store.apply_to(&mut analyzer);
    if disabled > 0 {
        debug!("{} pattern(s) disabled by overrides", disabled);
    }

    Ok(analyzer)
}

/// Loads the stored overrides for editing. A broken file is an error here so
/// that saving does not overwrite it.
async fn load_store_for_edit(persistence: &OverridePersistence) -> Result<OverrideStore> {
    let records = match persistence.load_outcome().await {
        LoadOutcome::Failed(e) => {
            return Err(e).with_context(|| {
                format!("Invalid override file {}", persistence.path().display())
            })
        }
        outcome => outcome.into_records(),
    };

    let mut store = OverrideStore::new();
    store.import_all(records)?;
    Ok(store)
}

/// Handles the check command.
async fn handle_check_command(
    config: &LintConfig,
    file: &str,
    min_severity: Option<Severity>,
    categories: Vec<Category>,
    json: bool,
) -> Result<ExitCode> {
    let message = read_message(file).await?;
    let mut analyzer = build_analyzer(config).await?;

    let options = AnalyzeOptions {
        categories: (!categories.is_empty()).then_some(categories),
        min_severity,
        ..Default::default()
    };
    let result = analyzer.analyze(&message, &options);

    if result.timed_out {
        warn!("Analysis timed out; reporting partial results");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        let formatter = WarningFormatter::new();
        println!("{}", formatter.format_separator());
        println!(
            "{}",
            formatter.format_warnings(&message, &result.matches, &result)
        );
    }

    if result.with_severity(Severity::Error).is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Handles the patterns command.
async fn handle_patterns_command(config: &LintConfig, category: Option<Category>) -> Result<()> {
    let analyzer = build_analyzer(config).await?;
    let patterns = analyzer.list_patterns(category);

    if patterns.is_empty() {
        println!("No patterns registered");
        return Ok(());
    }

    let formatter = WarningFormatter::new();
    println!(
        "{}",
        formatter.format_pattern_table(&patterns, |id| analyzer.is_disabled(id))
    );
    println!("{} pattern(s)", patterns.len());
    Ok(())
}

/// Handles the override subcommands.
async fn handle_override_command(config: &LintConfig, action: OverrideAction) -> Result<()> {
    let persistence = OverridePersistence::from_config(config);
    let mut store = load_store_for_edit(&persistence).await?;
    let formatter = WarningFormatter::new();

    match action {
        OverrideAction::Add {
            pattern_id,
            reason,
            category,
        } => {
            let analyzer = build_analyzer(config).await?;
            if analyzer.pattern(&pattern_id).is_none() {
                warn!("No registered pattern '{}'; saving override anyway", pattern_id);
            }
            store.override_pattern(&pattern_id, &reason, category.as_deref())?;
            persistence.save_store(&store).await?;
            println!("Overrode '{pattern_id}'");
        }
        OverrideAction::Remove { pattern_id } => {
            if store.remove(&pattern_id) {
                persistence.save_store(&store).await?;
                println!("Removed override for '{pattern_id}'");
            } else {
                println!("No override for '{pattern_id}'");
            }
        }
        OverrideAction::List { category } => {
            let records = match category {
                Some(category) => store.list_by_category(&category),
                None => store.list(),
            };
            println!("{}", formatter.format_override_table(&records));
        }
        OverrideAction::Clear => {
            let count = store.len();
            store.clear_all();
            persistence.save_store(&store).await?;
            info!("Cleared {} override(s)", count);
            println!("Cleared {count} override(s)");
        }
    }

    Ok(())
}

/// Reads the message from a file, or stdin for '-'.
async fn read_message(file: &str) -> Result<String> {
    if file == "-" {
        let mut message = String::new();
        tokio::io::stdin()
            .read_to_string(&mut message)
            .await
            .context("Failed to read message from stdin")?;
        return Ok(message);
    }

    let path = Path::new(file);
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}
