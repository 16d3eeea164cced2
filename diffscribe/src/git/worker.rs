//! Background thread that owns git2::Repository for its lifetime.
//!
//! The repository is opened inside the thread, never passed in. Requests
//! arrive over a crossbeam channel; each carries its own oneshot reply
//! sender, so a dropped pipeline simply closes the channel and ends the
//! loop.

use crossbeam_channel::Receiver;
use git2::{BranchType, DiffFormat, DiffOptions, Oid, Repository};

use crate::git::types::{ChangedFile, DiffDirection, GitError, GitRequest};

/// Entry point for the git worker thread.
///
/// Opens the repository at `path` and serves requests until the channel
/// closes. If the path cannot be opened, every request is answered with
/// [`GitError::Open`] instead of tearing the thread down silently.
pub fn git_worker_loop(path: String, rx: Receiver<GitRequest>) {
    let repo = match Repository::open(&path) {
        Ok(repo) => repo,
        Err(error) => {
            let message = error.message().to_owned();
            for request in rx {
                let open_error = GitError::Open { path: path.clone(), message: message.clone() };
                match request {
                    GitRequest::Resolve { reply, .. } => {
                        let _ = reply.send(Err(open_error));
                    }
                    GitRequest::Patch { reply, .. } => {
                        let _ = reply.send(Err(open_error));
                    }
                }
            }
            return;
        }
    };

    // Tree pair of the most recent successful Resolve, kept as OIDs so the
    // worker holds no borrowed git2 state between requests.
    let mut resolved: Option<(Oid, Oid)> = None;

    for request in rx {
        match request {
            GitRequest::Resolve { base, target, direction, reply } => {
                let result = resolve(&repo, &base, &target, direction);
                let _ = reply.send(match result {
                    Ok((old_tree, new_tree, files)) => {
                        resolved = Some((old_tree, new_tree));
                        Ok(files)
                    }
                    Err(error) => Err(error),
                });
            }
            GitRequest::Patch { path, reply } => {
                let result = match resolved {
                    Some(trees) => patch_for(&repo, trees, &path),
                    None => Err(GitError::NotResolved),
                };
                let _ = reply.send(result);
            }
        }
    }
}

/// Resolves both branch tips, computes their merge base, orients the tree
/// pair per `direction`, and lists the changed files.
///
/// The comparison is always base-tip versus merge-base: the merge base
/// stands in for the target branch so commits the target gained after
/// diverging do not show up as phantom changes on the base side.
fn resolve(
    repo: &Repository,
    base: &str,
    target: &str,
    direction: DiffDirection,
) -> Result<(Oid, Oid, Vec<ChangedFile>), GitError> {
    let base_commit = repo
        .find_branch(base, BranchType::Local)
        .map_err(|_| GitError::BranchNotFound(base.to_owned()))?
        .get()
        .peel_to_commit()?;
    let target_commit = repo
        .find_branch(target, BranchType::Local)
        .map_err(|_| GitError::BranchNotFound(target.to_owned()))?
        .get()
        .peel_to_commit()?;

    let merge_base = repo.merge_base(base_commit.id(), target_commit.id())?;
    let merge_commit = repo.find_commit(merge_base)?;

    let base_tree = base_commit.tree()?;
    let merge_tree = merge_commit.tree()?;
    let (old_tree, new_tree) = match direction {
        DiffDirection::BaseToTarget => (base_tree, merge_tree),
        DiffDirection::TargetToBase => (merge_tree, base_tree),
    };

    let mut opts = DiffOptions::new();
    let diff = repo.diff_tree_to_tree(Some(&old_tree), Some(&new_tree), Some(&mut opts))?;

    let files = diff
        .deltas()
        .map(|delta| {
            let path = delta
                .new_file()
                .path()
                .or_else(|| delta.old_file().path())
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_else(|| "unknown".to_owned());
            ChangedFile { path, status: delta.status().into() }
        })
        .collect();

    Ok((old_tree.id(), new_tree.id(), files))
}

/// Unified diff text for a single path between the resolved trees.
///
/// Prefixes content lines with their origin character (`+`/`-`/` `) the way
/// `git diff` prints them; file and hunk header lines arrive complete from
/// libgit2 and are appended as-is.
fn patch_for(
    repo: &Repository,
    (old_tree, new_tree): (Oid, Oid),
    path: &str,
) -> Result<Option<String>, GitError> {
    let old_tree = repo.find_tree(old_tree)?;
    let new_tree = repo.find_tree(new_tree)?;

    let mut opts = DiffOptions::new();
    opts.pathspec(path);
    let diff = repo.diff_tree_to_tree(Some(&old_tree), Some(&new_tree), Some(&mut opts))?;

    let mut text = String::new();
    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        if matches!(line.origin(), '+' | '-' | ' ') {
            text.push(line.origin());
        }
        text.push_str(&String::from_utf8_lossy(line.content()));
        true
    })?;

    if text.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(text))
    }
}
