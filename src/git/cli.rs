//! [`VcsBackend`] implementation driving the `git` binary

use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use tokio::process::Command;

use super::backend::{BranchDivergence, Head, RepoHandle, TrackingDelta, VcsBackend};
use super::porcelain::{
    parse_branch_tracking, parse_left_right_count, parse_path_list_z, parse_status_z,
    WorkingTreeChanges,
};
use crate::core::config::GIT_OPERATION_TIMEOUT_SECS;

// Git command arguments
const GIT_IS_BARE_ARGS: &[&str] = &["rev-parse", "--is-bare-repository"];
const GIT_TOPLEVEL_ARGS: &[&str] = &["rev-parse", "--show-toplevel"];
const GIT_ABSOLUTE_GIT_DIR_ARGS: &[&str] = &["rev-parse", "--absolute-git-dir"];
const GIT_SYMBOLIC_REF_ARGS: &[&str] = &["symbolic-ref", "--quiet", "--short", "HEAD"];
const GIT_STATUS_PORCELAIN_ARGS: &[&str] =
    &["status", "--porcelain=v1", "-z", "--untracked-files=no"];
const GIT_UNTRACKED_ARGS: &[&str] = &["ls-files", "--others", "--exclude-standard", "-z"];
const GIT_BRANCH_TRACKING_ARGS: &[&str] = &[
    "for-each-ref",
    "--format=%(refname:short)%09%(upstream:short)%09%(upstream:track,nobracket)",
    "refs/heads",
];
const GIT_STASH_REF_ARGS: &[&str] = &["rev-parse", "--verify", "--quiet", "refs/stash"];

// Variables from the user's shell that would redirect git to another repository
const GIT_REDIRECT_VARS: &[&str] = &["GIT_DIR", "GIT_WORK_TREE", "GIT_INDEX_FILE", "GIT_COMMON_DIR"];

/// Runs git as an external process
#[derive(Debug, Clone)]
pub struct GitCli {
    timeout: Duration,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new(Duration::from_secs(GIT_OPERATION_TIMEOUT_SECS))
    }
}

impl GitCli {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn output(&self, path: &Path, args: &[&str]) -> Result<Output> {
        let mut command = Command::new("git");
        command
            .args(args)
            .current_dir(path)
            .env("GIT_OPTIONAL_LOCKS", "0")
            .env("LC_ALL", "C")
            .kill_on_drop(true);
        // A terminal Ctrl-C goes to the foreground process group only; the
        // scan decides what to do with children that are still running
        #[cfg(unix)]
        command.process_group(0);
        for var in GIT_REDIRECT_VARS {
            command.env_remove(var);
        }
        // Keep git from walking up into an enclosing repository
        if let Some(parent) = std::fs::canonicalize(path)
            .ok()
            .and_then(|p| p.parent().map(Path::to_path_buf))
        {
            command.env("GIT_CEILING_DIRECTORIES", parent);
        }

        match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(anyhow!(e).context("failed to run git")),
            Err(_) => Err(anyhow!(
                "Git operation timed out after {} seconds",
                self.timeout.as_secs()
            )),
        }
    }

    /// Runs a git command in the specified directory with a timeout
    /// Returns (success, stdout, stderr), both trimmed
    pub async fn run_git(&self, path: &Path, args: &[&str]) -> Result<(bool, String, String)> {
        let output = self.output(path, args).await?;
        Ok((
            output.status.success(),
            String::from_utf8_lossy(&output.stdout).trim().to_string(),
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ))
    }

    /// Like [`GitCli::run_git`] but fails on a non-zero exit and keeps stdout
    /// untouched, for NUL-separated output where leading spaces matter
    async fn run_git_raw(&self, path: &Path, args: &[&str]) -> Result<String> {
        let output = self.output(path, args).await?;
        if !output.status.success() {
            bail!(
                "git {} failed: {}",
                args.first().unwrap_or(&""),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn same_location(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[async_trait]
impl VcsBackend for GitCli {
    fn name(&self) -> &str {
        "git"
    }

    async fn open(&self, path: &Path) -> Result<RepoHandle> {
        let (success, is_bare, stderr) = self.run_git(path, GIT_IS_BARE_ARGS).await?;
        if !success {
            bail!("{stderr}");
        }
        let is_bare = is_bare == "true";

        let location_args = if is_bare {
            GIT_ABSOLUTE_GIT_DIR_ARGS
        } else {
            GIT_TOPLEVEL_ARGS
        };
        let (success, location, stderr) = self.run_git(path, location_args).await?;
        if !success {
            bail!("{stderr}");
        }
        if !same_location(Path::new(&location), path) {
            bail!("not a repository root (belongs to {location})");
        }

        Ok(RepoHandle {
            root: path.to_path_buf(),
            is_bare,
        })
    }

    async fn current_branch(&self, repo: &RepoHandle) -> Result<Head> {
        let output = self.output(&repo.root, GIT_SYMBOLIC_REF_ARGS).await?;
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        match output.status.code() {
            Some(0) if !stdout.is_empty() => Ok(Head::Branch(stdout)),
            // --quiet exits 1 without a message when HEAD is not symbolic
            Some(1) if stderr.is_empty() => Ok(Head::Detached),
            _ => Err(anyhow!("cannot read HEAD: {stderr}")),
        }
    }

    async fn tracking_delta(
        &self,
        repo: &RepoHandle,
        branch: &str,
    ) -> Result<Option<TrackingDelta>> {
        let upstream_spec = format!("{branch}@{{upstream}}");
        let (success, upstream, _) = self
            .run_git(
                &repo.root,
                &["rev-parse", "--abbrev-ref", "--symbolic-full-name", &upstream_spec],
            )
            .await?;
        if !success || upstream.is_empty() {
            return Ok(None);
        }

        let range = format!("refs/heads/{branch}...{upstream_spec}");
        let (success, counts, stderr) = self
            .run_git(&repo.root, &["rev-list", "--left-right", "--count", &range])
            .await?;
        if !success {
            bail!("cannot compare {branch} with {upstream}: {stderr}");
        }

        let (ahead, behind) = parse_left_right_count(&counts)
            .with_context(|| format!("unexpected rev-list output for {range}"))?;
        Ok(Some(TrackingDelta {
            upstream,
            ahead,
            behind,
        }))
    }

    async fn diverged_branches(&self, repo: &RepoHandle) -> Result<Vec<BranchDivergence>> {
        let (success, output, stderr) = self.run_git(&repo.root, GIT_BRANCH_TRACKING_ARGS).await?;
        if !success {
            bail!("cannot list branches: {stderr}");
        }
        parse_branch_tracking(&output)
    }

    async fn working_tree_changes(&self, repo: &RepoHandle) -> Result<WorkingTreeChanges> {
        let output = self.run_git_raw(&repo.root, GIT_STATUS_PORCELAIN_ARGS).await?;
        parse_status_z(&output)
    }

    async fn untracked_files(&self, repo: &RepoHandle) -> Result<Vec<PathBuf>> {
        let output = self.run_git_raw(&repo.root, GIT_UNTRACKED_ARGS).await?;
        Ok(parse_path_list_z(&output)
            .into_iter()
            .map(PathBuf::from)
            .collect())
    }

    async fn has_stash(&self, repo: &RepoHandle) -> Result<bool> {
        let (success, _, _) = self.run_git(&repo.root, GIT_STASH_REF_ARGS).await?;
        Ok(success)
    }
}

/// Checks if git is available in the system
pub async fn is_git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}
