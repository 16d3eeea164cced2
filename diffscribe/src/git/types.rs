//! Owned data types for the git background thread.
//!
//! Everything crossing the thread boundary here is fully owned and `Send`;
//! `git2` handles never leave the worker.

use tokio::sync::oneshot;

/// Which tree pair the branch comparison diffs.
///
/// Both orientations compare the base branch tip with the merge base of
/// the two branches; the direction only decides which side is "old".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum DiffDirection {
    /// Old side: base branch tip. New side: merge base.
    #[default]
    BaseToTarget,
    /// Old side: merge base. New side: base branch tip.
    TargetToBase,
}

/// Change status of one entry in the tree-to-tree comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeStatus {
    Added,
    Deleted,
    Modified,
    Renamed,
    Copied,
    Unmodified,
    Other,
}

impl ChangeStatus {
    /// Entries reported by the comparison but carrying no change; the
    /// pipeline never reviews these.
    pub fn is_unmodified(self) -> bool {
        matches!(self, ChangeStatus::Unmodified)
    }
}

impl From<git2::Delta> for ChangeStatus {
    fn from(delta: git2::Delta) -> Self {
        match delta {
            git2::Delta::Added => ChangeStatus::Added,
            git2::Delta::Deleted => ChangeStatus::Deleted,
            git2::Delta::Modified => ChangeStatus::Modified,
            git2::Delta::Renamed => ChangeStatus::Renamed,
            git2::Delta::Copied => ChangeStatus::Copied,
            git2::Delta::Unmodified => ChangeStatus::Unmodified,
            _ => ChangeStatus::Other,
        }
    }
}

/// One entry of the change set between the compared trees.
#[derive(Debug, Clone)]
pub struct ChangedFile {
    /// Repository-relative path.
    pub path: String,
    pub status: ChangeStatus,
}

/// Commands sent from the pipeline to the git worker thread.
#[derive(Debug)]
pub enum GitRequest {
    /// Resolve branches and merge base, list the changed files.
    Resolve {
        base: String,
        target: String,
        direction: DiffDirection,
        reply: oneshot::Sender<Result<Vec<ChangedFile>, GitError>>,
    },
    /// Unified diff text for one path between the resolved trees.
    Patch {
        path: String,
        reply: oneshot::Sender<Result<Option<String>, GitError>>,
    },
}

/// Failures surfaced by the git worker.
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    /// A named branch has no local tip to resolve.
    #[error("could not find branch {0}")]
    BranchNotFound(String),

    /// The repository path could not be opened.
    #[error("could not open repository at {path}: {message}")]
    Open { path: String, message: String },

    /// A patch was requested before any comparison was resolved.
    #[error("no branch comparison has been resolved")]
    NotResolved,

    /// Any other libgit2 failure.
    #[error(transparent)]
    Git(#[from] git2::Error),

    /// The worker thread is no longer running.
    #[error("git worker thread terminated")]
    WorkerGone,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_mapping_flags_unmodified_entries() {
        assert!(ChangeStatus::from(git2::Delta::Unmodified).is_unmodified());
        assert!(!ChangeStatus::from(git2::Delta::Modified).is_unmodified());
        assert!(!ChangeStatus::from(git2::Delta::Added).is_unmodified());
        assert!(!ChangeStatus::from(git2::Delta::Renamed).is_unmodified());
    }
}
