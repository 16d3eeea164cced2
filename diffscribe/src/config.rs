//! CLI surface and the optional config-file defaults layer.
//!
//! Resolution order for every setting: command-line flag, then
//! `$XDG_CONFIG_HOME/diffscribe/config.toml`, then the built-in default.
//! Config-file problems are soft failures: a missing file means defaults,
//! a parse error is noted on stderr and otherwise ignored.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use serde::Deserialize;

use crate::git::DiffDirection;
use crate::report::ReportStyle;

/// Segment token budget applied at the orchestration layer when nothing
/// overrides it. Deliberately far above the chunker's own default: most
/// file diffs should stay single-segment.
pub const DEFAULT_MAX_SEGMENT_TOKENS: usize = 25_000;

/// Maximum number of files reviewed before the run truncates.
pub const DEFAULT_MAX_FILES: usize = 100;

/// Extension suffixes skipped by default: lockfiles, build artifacts and
/// other generated content a reviewer gains nothing from.
pub const DEFAULT_IGNORE_EXTENSIONS: &[&str] =
    &[".lock", ".lock.json", ".sum", ".bak", ".bin", ".exe", ".min.js"];

#[derive(Parser, Debug)]
#[command(name = "diffscribe", about = "Model-assisted code review for branch diffs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Review the changes between two branches and write a report.
    ReviewChanges(ReviewArgs),
}

#[derive(Args, Debug)]
pub struct ReviewArgs {
    /// API key for the completion service.
    #[arg(short = 'k', long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Base URL of the OpenAI-compatible endpoint.
    #[arg(short = 'a', long)]
    pub api_endpoint: Option<String>,

    /// Model to use for completion calls.
    #[arg(short, long)]
    pub model: Option<String>,

    /// Path to the git repository.
    #[arg(short, long)]
    pub repo: String,

    /// Name of the base branch.
    #[arg(short, long)]
    pub base: String,

    /// Name of the branch to compare against the base.
    #[arg(short, long)]
    pub target: String,

    /// Maximum token budget per diff segment sent to the model.
    #[arg(long)]
    pub max_tokens: Option<usize>,

    /// Maximum number of files to review before truncating the run.
    #[arg(long)]
    pub max_files: Option<usize>,

    /// Extension suffixes to skip (repeatable).
    #[arg(long = "ignore-extension")]
    pub ignore_extensions: Vec<String>,

    /// Which side of the branch comparison supplies the old tree.
    #[arg(long, value_enum, default_value_t = DiffDirection::BaseToTarget)]
    pub direction: DiffDirection,

    /// Report layout.
    #[arg(long, value_enum, default_value_t = ReportStyle::PerFileSections)]
    pub report_style: ReportStyle,

    /// Write the report to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Defaults loadable from the config file. Every field is optional; CLI
/// flags win over file values.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub model: Option<String>,
    pub api_endpoint: Option<String>,
    pub max_tokens: Option<usize>,
    pub max_files: Option<usize>,
    pub ignore_extensions: Option<Vec<String>>,
}

/// Returns the path to the diffscribe config file.
///
/// Prefers `$XDG_CONFIG_HOME/diffscribe/config.toml`; falls back to
/// `~/.config/diffscribe/config.toml` when the env var is absent.
pub fn config_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| std::env::var("HOME").ok().map(|home| PathBuf::from(home).join(".config")))
        .unwrap_or_else(|| PathBuf::from(".config"));
    base.join("diffscribe").join("config.toml")
}

/// Loads config-file defaults, tolerating absence and parse errors.
pub fn load_file_config() -> FileConfig {
    let path = config_path();
    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(_) => return FileConfig::default(),
    };
    match toml::from_str(&raw) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("diffscribe: config parse error in {path:?}: {error}");
            FileConfig::default()
        }
    }
}

/// Fully resolved settings for one review run.
#[derive(Debug)]
pub struct ReviewConfig {
    pub model: String,
    pub max_segment_tokens: usize,
    pub max_files: usize,
    pub ignore_extensions: Vec<String>,
    pub direction: DiffDirection,
    pub report_style: ReportStyle,
}

impl ReviewConfig {
    /// Merges CLI flags over file defaults over built-ins, then validates.
    ///
    /// Validation failures here are configuration errors: they abort the
    /// run before any repository or network interaction.
    pub fn resolve(args: &ReviewArgs, file: &FileConfig) -> Result<Self> {
        if args.api_key.trim().is_empty() {
            bail!("api key must not be empty");
        }
        if args.repo.trim().is_empty() {
            bail!("repository path must not be empty");
        }
        if args.base.trim().is_empty() || args.target.trim().is_empty() {
            bail!("base and target branch names must not be empty");
        }

        let model = args
            .model
            .clone()
            .or_else(|| file.model.clone())
            .unwrap_or_else(|| diffscribe_openai::DEFAULT_MODEL.to_owned());
        if model.trim().is_empty() {
            bail!("model name must not be empty");
        }

        let max_segment_tokens =
            args.max_tokens.or(file.max_tokens).unwrap_or(DEFAULT_MAX_SEGMENT_TOKENS);
        if max_segment_tokens == 0 {
            bail!("max-tokens must be positive");
        }

        let max_files = args.max_files.or(file.max_files).unwrap_or(DEFAULT_MAX_FILES);
        if max_files == 0 {
            bail!("max-files must be positive");
        }

        let ignore_extensions = if !args.ignore_extensions.is_empty() {
            args.ignore_extensions.clone()
        } else {
            file.ignore_extensions.clone().unwrap_or_else(|| {
                DEFAULT_IGNORE_EXTENSIONS.iter().map(|ext| (*ext).to_owned()).collect()
            })
        };

        Ok(Self {
            model,
            max_segment_tokens,
            max_files,
            ignore_extensions,
            direction: args.direction,
            report_style: args.report_style,
        })
    }
}

/// Endpoint resolution follows the same flag-file-default order as the
/// rest of the settings but stays out of [`ReviewConfig`]; it belongs to
/// gateway construction, not to the pipeline.
pub fn resolve_endpoint(args: &ReviewArgs, file: &FileConfig) -> String {
    args.api_endpoint
        .clone()
        .or_else(|| file.api_endpoint.clone())
        .unwrap_or_else(|| diffscribe_openai::DEFAULT_API_ENDPOINT.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> ReviewArgs {
        ReviewArgs {
            api_key: "key".to_owned(),
            api_endpoint: None,
            model: None,
            repo: "/tmp/repo".to_owned(),
            base: "main".to_owned(),
            target: "feature".to_owned(),
            max_tokens: None,
            max_files: None,
            ignore_extensions: Vec::new(),
            direction: DiffDirection::BaseToTarget,
            report_style: ReportStyle::PerFileSections,
            output: None,
        }
    }

    #[test]
    fn built_in_defaults_apply_when_nothing_is_set() {
        let config = ReviewConfig::resolve(&args(), &FileConfig::default()).unwrap();
        assert_eq!(config.model, diffscribe_openai::DEFAULT_MODEL);
        assert_eq!(config.max_segment_tokens, DEFAULT_MAX_SEGMENT_TOKENS);
        assert_eq!(config.max_files, DEFAULT_MAX_FILES);
        assert!(config.ignore_extensions.iter().any(|ext| ext == ".lock"));
    }

    #[test]
    fn cli_flags_override_file_defaults() {
        let mut cli = args();
        cli.model = Some("cli-model".to_owned());
        cli.max_files = Some(5);
        let file = FileConfig {
            model: Some("file-model".to_owned()),
            max_files: Some(50),
            max_tokens: Some(1234),
            ..FileConfig::default()
        };
        let config = ReviewConfig::resolve(&cli, &file).unwrap();
        assert_eq!(config.model, "cli-model");
        assert_eq!(config.max_files, 5);
        assert_eq!(config.max_segment_tokens, 1234);
    }

    #[test]
    fn empty_required_values_are_configuration_errors() {
        let mut empty_key = args();
        empty_key.api_key = "  ".to_owned();
        assert!(ReviewConfig::resolve(&empty_key, &FileConfig::default()).is_err());

        let mut empty_branch = args();
        empty_branch.target = String::new();
        assert!(ReviewConfig::resolve(&empty_branch, &FileConfig::default()).is_err());

        let mut zero_cap = args();
        zero_cap.max_files = Some(0);
        assert!(ReviewConfig::resolve(&zero_cap, &FileConfig::default()).is_err());
    }

    #[test]
    fn file_config_tolerates_unknown_keys() {
        let parsed: FileConfig =
            toml::from_str("model = \"m\"\nsomething_new = 3\n").unwrap_or_default();
        assert_eq!(parsed.model.as_deref(), Some("m"));
    }
}
