//! Git collaborator for diffscribe.
//!
//! `git2::Repository` is !Send, so the repository is opened inside a
//! dedicated background thread and owned there for its lifetime. All
//! communication is via channels: `GitRequest` in over a crossbeam
//! channel, replies out over a per-request oneshot. [`DiffSource`] is the
//! async facade the pipeline talks to; the worker thread exits when the
//! facade is dropped and the request channel closes.

pub mod types;
pub mod worker;

use tokio::sync::oneshot;

pub use types::{ChangeStatus, ChangedFile, DiffDirection, GitError};

use types::GitRequest;

/// Async facade over the background thread that owns the repository.
pub struct DiffSource {
    tx: crossbeam_channel::Sender<GitRequest>,
}

impl DiffSource {
    /// Spawns the worker thread for the repository at `path`.
    ///
    /// Opening happens inside the thread; an unopenable path surfaces as
    /// [`GitError::Open`] on the first request rather than here.
    pub fn open(path: impl Into<String>) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        let path = path.into();
        std::thread::spawn(move || worker::git_worker_loop(path, rx));
        Self { tx }
    }

    /// Resolves both branch tips and their merge base, orients the
    /// comparison per `direction`, and returns the tree-level change set.
    ///
    /// Must be called before [`DiffSource::file_patch`]; the worker keeps
    /// the resolved tree pair for subsequent patch requests.
    pub async fn changed_files(
        &self,
        base: &str,
        target: &str,
        direction: DiffDirection,
    ) -> Result<Vec<ChangedFile>, GitError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(GitRequest::Resolve {
                base: base.to_owned(),
                target: target.to_owned(),
                direction,
                reply,
            })
            .map_err(|_| GitError::WorkerGone)?;
        rx.await.map_err(|_| GitError::WorkerGone)?
    }

    /// Unified diff text for one path between the resolved trees.
    ///
    /// Returns `Ok(None)` when the comparison produces no patch text for
    /// the path (e.g. a pure mode change).
    pub async fn file_patch(&self, path: &str) -> Result<Option<String>, GitError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(GitRequest::Patch { path: path.to_owned(), reply })
            .map_err(|_| GitError::WorkerGone)?;
        rx.await.map_err(|_| GitError::WorkerGone)?
    }
}
