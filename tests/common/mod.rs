//! Common test utilities and helpers
#![allow(dead_code, unused_imports)]

pub mod fixtures;
pub mod git;

pub use self::fixtures::{TestTree, TestTreeBuilder};
pub use self::git::{
    clone_repo, create_multiple_repos, create_test_commit, git, init_bare_repo,
    init_repo_with_commit, is_git_available, setup_git_repo,
};

use std::sync::{Mutex, MutexGuard};
use std::sync::OnceLock;

static TEST_MUTEX: OnceLock<Mutex<()>> = OnceLock::new();

/// Acquires a global lock for tests that modify process-wide state (like env vars)
pub fn lock_test() -> MutexGuard<'static, ()> {
    TEST_MUTEX
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
