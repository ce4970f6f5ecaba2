//! Git testing utilities

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Runs a git command in `path` and fails when git reports an error
pub fn git(path: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git").args(args).current_dir(path).output()?;

    if !output.status.success() {
        anyhow::bail!(
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr)
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn configure_user(path: &Path) -> Result<()> {
    git(path, &["config", "user.name", "Test User"])?;
    git(path, &["config", "user.email", "test@example.com"])?;
    // Disable commit signing for tests
    git(path, &["config", "commit.gpgsign", "false"])?;
    Ok(())
}

/// Sets up a git repository on branch `main` with user config
pub fn setup_git_repo(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)?;

    let init_result = Command::new("git")
        .args(["init", "--quiet"])
        .current_dir(path)
        .output()?;

    if !init_result.status.success() {
        anyhow::bail!("Git not available - skipping test");
    }

    // Independent of init.defaultBranch in the user's config
    git(path, &["symbolic-ref", "HEAD", "refs/heads/main"])?;
    configure_user(path)
}

/// Creates a test commit in the repository
pub fn create_test_commit(
    path: &Path,
    file_name: &str,
    content: &str,
    message: &str,
) -> Result<()> {
    std::fs::write(path.join(file_name), content)?;
    git(path, &["add", file_name])?;
    git(path, &["commit", "--quiet", "-m", message])?;
    Ok(())
}

/// Initializes a repository at `path` with a single commit
pub fn init_repo_with_commit(path: &Path) -> Result<()> {
    setup_git_repo(path)?;
    create_test_commit(path, "README.md", "# Test Repo\n", "Initial commit")
}

/// Creates `count` sibling repositories in a parent directory
pub fn create_multiple_repos(parent_dir: &Path, count: usize) -> Result<Vec<PathBuf>> {
    let mut repos = Vec::new();

    for i in 0..count {
        let repo_path = parent_dir.join(format!("test-repo-{}", i + 1));
        init_repo_with_commit(&repo_path)?;
        repos.push(repo_path);
    }

    Ok(repos)
}

/// Clones `source` into `target`; the clone tracks `origin/main`
pub fn clone_repo(source: &Path, target: &Path) -> Result<()> {
    let parent = target.parent().unwrap_or(Path::new("."));
    git(
        parent,
        &[
            "clone",
            "--quiet",
            &source.to_string_lossy(),
            &target.to_string_lossy(),
        ],
    )?;
    configure_user(target)
}

/// Creates a bare repository at `path`
pub fn init_bare_repo(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)?;
    git(path, &["init", "--quiet", "--bare"])?;
    git(path, &["symbolic-ref", "HEAD", "refs/heads/main"])?;
    Ok(())
}

/// Checks if git is available in the system
pub fn is_git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}
