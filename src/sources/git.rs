//! Git checkouts of package repositories.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use git2::build::CheckoutBuilder;

use crate::core::matrix::{Repository, Revision};
use crate::sources::github::repository_slug;

/// A local clone of a package repository.
pub struct GitCheckout {
    path: PathBuf,
    repo: git2::Repository,
}

impl GitCheckout {
    /// Clone `repository` into `repo_dir/<stem>`, or fetch if the clone
    /// already exists.
    pub fn clone_or_fetch(repo_dir: &Path, repository: &Repository) -> Result<Self> {
        let path = repo_dir.join(repository.stem());

        let repo = if path.join(".git").is_dir() {
            tracing::info!("Fetching {}", repository);
            let repo = git2::Repository::open(&path)
                .with_context(|| format!("failed to open git repository: {}", path.display()))?;
            fetch(&repo).with_context(|| format!("failed to fetch {}", repository))?;
            repo
        } else {
            tracing::info!("Cloning {}", repository);
            git2::Repository::clone(repository.as_str(), &path)
                .with_context(|| format!("failed to clone {}", repository))?
        };

        Ok(GitCheckout { path, repo })
    }

    /// Open an existing clone.
    pub fn open(path: &Path) -> Result<Self> {
        let repo = git2::Repository::open(path)
            .with_context(|| format!("failed to open git repository: {}", path.display()))?;
        Ok(GitCheckout {
            path: path.to_path_buf(),
            repo,
        })
    }

    /// Working tree path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Detach HEAD at `revision`, discarding local changes.
    pub fn checkout(&self, revision: &Revision) -> Result<()> {
        tracing::debug!("checking out {} in {}", revision, self.path.display());

        let object = self
            .repo
            .revparse_single(revision.as_str())
            .with_context(|| format!("revision {} not found in {}", revision, self.path.display()))?;
        let commit = object
            .peel_to_commit()
            .with_context(|| format!("{} is not a commit", revision))?;

        self.repo
            .checkout_tree(commit.as_object(), Some(CheckoutBuilder::new().force()))
            .with_context(|| format!("failed to check out {}", revision))?;
        self.repo.set_head_detached(commit.id())?;

        Ok(())
    }
}

fn fetch(repo: &git2::Repository) -> Result<()> {
    let mut remote = repo.find_remote("origin")?;
    remote.fetch(&[] as &[&str], None, None)?;
    Ok(())
}

/// GitHub `owner/name` of the remote the current branch tracks.
///
/// Falls back to `origin` when the branch has no upstream.
pub fn infer_repository(cwd: &Path) -> Result<String> {
    let repo = git2::Repository::discover(cwd)
        .with_context(|| format!("{} is not inside a git repository", cwd.display()))?;

    let head = repo.head().context("failed to read HEAD")?;
    let remote_name = head
        .name()
        .and_then(|name| repo.branch_upstream_remote(name).ok())
        .and_then(|buf| buf.as_str().map(str::to_string))
        .unwrap_or_else(|| "origin".to_string());

    let remote = repo
        .find_remote(&remote_name)
        .with_context(|| format!("remote `{}` not found", remote_name))?;
    let url = remote
        .url()
        .ok_or_else(|| anyhow!("remote `{}` has no url", remote_name))?;

    repository_slug(url)
        .ok_or_else(|| anyhow!("remote `{}` ({}) is not a GitHub repository", remote_name, url))
}
