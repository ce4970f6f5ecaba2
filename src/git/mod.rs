pub mod backend;
pub mod cli;
pub mod porcelain;
pub mod status;

// Re-export commonly used items
pub use backend::{BranchDivergence, Head, RepoHandle, TrackingDelta, VcsBackend};
pub use cli::{is_git_available, GitCli};
pub use porcelain::WorkingTreeChanges;
pub use status::RepoState;
