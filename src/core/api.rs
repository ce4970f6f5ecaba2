//! Public API for the core module.
//!
//! This module provides the stable public API for core functionality including:
//! - Scan configuration
//! - Repository discovery
//! - Status aggregation and reports
//!
//! Internal implementation details are not exposed through this API.

// Configuration
pub use super::config::{
    default_config_path, ConfigOverrides, FileConfig, ScanConfiguration, SortOrder, StatusFilter,
};

// Discovery
pub use super::discovery::{
    find_repos_from_path, repository_layout, Discovery, RepoLayout, SkipReason, SkippedPath,
};

// Aggregation
pub use super::aggregator::{summarize, Aggregator, ScanInterrupt, ScanReport};
pub use super::summary::RepositorySummary;

// Statistics and progress
pub use super::progress::ScanProgress;
pub use super::stats::{clean_error_message, ScanStatistics};

// User-facing messages
pub use super::config::NO_REPOS_MESSAGE;
