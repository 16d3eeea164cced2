//! Pipeline orchestrator: walk the change set, review each eligible file,
//! summarize the run.
//!
//! Model calls are strictly sequential: one per diff segment, an optional
//! reconciliation call per multi-segment file, and exactly one PR-level
//! summary call at the end. Nothing is flushed to the sink on abort; the
//! report is written only when the run reaches a terminal state.

use std::io::Write;

use anyhow::Result;
use diffscribe_core::{prompts, review_file, ChatMessage, CompletionGateway, FileReviewResult};

use crate::config::ReviewConfig;
use crate::git::{DiffSource, GitError};
use crate::report;

/// How a review run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// A branch could not be resolved. Reported on the sink; no model
    /// calls were made.
    BranchNotFound(String),
    /// The comparison produced no changes. Reported as a warning.
    NoChanges,
    /// Every eligible file was reviewed.
    Completed { reviewed: usize },
    /// The max-files cap stopped the run early.
    Truncated { reviewed: usize, total_changes: usize },
}

/// Runs one full review of `base` against `target` and writes the report
/// to `out`.
///
/// Skipping rules, in order, for each changed file: unmodified entries,
/// entries with no non-empty patch text, and files whose base name ends
/// with a configured ignore suffix. Once `max_files` results have been
/// collected the remaining files are not processed; a truncation notice
/// precedes the report.
pub async fn run_review<G>(
    git: &DiffSource,
    gateway: &G,
    config: &ReviewConfig,
    base: &str,
    target: &str,
    out: &mut dyn Write,
) -> Result<RunOutcome>
where
    G: CompletionGateway + ?Sized,
{
    let files = match git.changed_files(base, target, config.direction).await {
        Ok(files) => files,
        Err(GitError::BranchNotFound(name)) => {
            writeln!(out, "Error!: could not find branch {name}")?;
            return Ok(RunOutcome::BranchNotFound(name));
        }
        Err(other) => return Err(other.into()),
    };

    if files.is_empty() {
        writeln!(out, "Warning: no changes found between {base} and {target}")?;
        return Ok(RunOutcome::NoChanges);
    }

    let mut results: Vec<FileReviewResult> = Vec::new();
    let mut truncated = false;

    for file in &files {
        if file.status.is_unmodified() {
            continue;
        }
        let Some(patch) = git.file_patch(&file.path).await? else {
            tracing::debug!(file = %file.path, "no patch text, skipping");
            continue;
        };
        if is_ignored(&file.path, &config.ignore_extensions) {
            tracing::debug!(file = %file.path, "ignored extension, skipping");
            continue;
        }

        tracing::info!(file = %file.path, "reviewing");
        let result = review_file(gateway, &file.path, &patch, config.max_segment_tokens).await?;
        results.push(result);

        if results.len() >= config.max_files {
            truncated = true;
            break;
        }
    }

    if truncated {
        writeln!(
            out,
            "Note: reviewed {} of {} changed files; the max-files cap ({}) stopped the run.",
            results.len(),
            files.len(),
            config.max_files,
        )?;
    }

    let payload = serde_json::to_string(&results)?;
    let summary = gateway
        .complete(&[
            ChatMessage::system(prompts::SYSTEM_PERSONA),
            ChatMessage::system(prompts::SUMMARIZE_PR),
            ChatMessage::user(payload),
        ])
        .await?;

    report::write_report(out, summary.trim(), &results, config.report_style)?;

    Ok(if truncated {
        RunOutcome::Truncated { reviewed: results.len(), total_changes: files.len() }
    } else {
        RunOutcome::Completed { reviewed: results.len() }
    })
}

/// True when the file's base name ends with any configured suffix.
fn is_ignored(path: &str, ignore_extensions: &[String]) -> bool {
    let name = path.rsplit('/').next().unwrap_or(path);
    ignore_extensions.iter().any(|ext| name.ends_with(ext.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignore_matches_suffixes_of_the_base_name() {
        let ignore = vec![".lock".to_owned(), ".min.js".to_owned()];
        assert!(is_ignored("Cargo.lock", &ignore));
        assert!(is_ignored("vendor/dist/app.min.js", &ignore));
        assert!(!is_ignored("src/locker.rs", &ignore));
        // The suffix must match the file name, not a directory name.
        assert!(!is_ignored("deps.lock/readme.txt", &ignore));
    }

    #[test]
    fn empty_ignore_list_reviews_everything() {
        assert!(!is_ignored("Cargo.lock", &[]));
    }
}
