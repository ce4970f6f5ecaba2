//! # repostat
//!
//! `repostat` finds every git repository below one or more root directories
//! and reports the state of each one: current branch, distance from its
//! upstream, uncommitted changes, untracked files and stashes. It powers the
//! `repostat` CLI tool.
//!
//! ## Core Features
//!
//! - **Discovery**: Recursive walk that reports each repository exactly once,
//!   including repositories nested inside a repository's ignored directories
//!   only when they are not inside another repository's work tree.
//! - **Status Aggregation**: Per-repository summaries through a swappable
//!   [`git::VcsBackend`], optionally queried concurrently.
//! - **Reporting**: Aligned table for humans, JSON for scripts.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use repostat::core::{Aggregator, ScanConfiguration};
//! use repostat::git::GitCli;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ScanConfiguration::new(vec![".".into()]);
//!     let report = Aggregator::new(Arc::new(GitCli::default())).scan(&config).await;
//!     for summary in &report.summaries {
//!         println!("{}: {:?}", summary.path.display(), summary.state());
//!     }
//! }
//! ```

pub mod commands;
pub mod core;
pub mod error;
pub mod git;
pub mod report;
pub mod utils;
