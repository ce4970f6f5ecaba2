//! Test fixtures and builders

use anyhow::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::git::{init_bare_repo, init_repo_with_commit};

/// A directory tree of repositories with automatic cleanup
pub struct TestTree {
    pub temp_dir: TempDir,
}

impl TestTree {
    /// Root of the tree, canonicalized so it compares equal to scan output
    pub fn root(&self) -> PathBuf {
        self.temp_dir
            .path()
            .canonicalize()
            .unwrap_or_else(|_| self.temp_dir.path().to_path_buf())
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        if relative.is_empty() {
            self.root()
        } else {
            self.root().join(relative)
        }
    }

    /// Create a new file, creating parent directories as needed
    pub fn create_file(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let file_path = self.path(relative);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&file_path, content)?;
        Ok(file_path)
    }
}

/// Builder for trees of test repositories
pub struct TestTreeBuilder {
    repos: Vec<String>,
    bare_repos: Vec<String>,
    dirs: Vec<String>,
    files: Vec<(String, String)>,
}

impl TestTreeBuilder {
    pub fn new() -> Self {
        Self {
            repos: Vec::new(),
            bare_repos: Vec::new(),
            dirs: Vec::new(),
            files: Vec::new(),
        }
    }

    /// A repository with one commit at `relative` ("" for the root itself)
    pub fn with_repo(mut self, relative: impl Into<String>) -> Self {
        self.repos.push(relative.into());
        self
    }

    pub fn with_bare_repo(mut self, relative: impl Into<String>) -> Self {
        self.bare_repos.push(relative.into());
        self
    }

    pub fn with_dir(mut self, relative: impl Into<String>) -> Self {
        self.dirs.push(relative.into());
        self
    }

    pub fn with_file(mut self, relative: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.push((relative.into(), content.into()));
        self
    }

    pub fn build(self) -> Result<TestTree> {
        let tree = TestTree {
            temp_dir: TempDir::new()?,
        };

        for dir in &self.dirs {
            std::fs::create_dir_all(tree.path(dir))?;
        }
        // Outer repositories first so nested ones are created inside them
        let mut repos = self.repos;
        repos.sort_by_key(|r| Path::new(r).components().count());
        for repo in &repos {
            init_repo_with_commit(&tree.path(repo))?;
        }
        for bare in &self.bare_repos {
            init_bare_repo(&tree.path(bare))?;
        }
        for (file, content) in &self.files {
            tree.create_file(file, content)?;
        }

        Ok(tree)
    }
}

impl Default for TestTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
