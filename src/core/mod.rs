//! Core infrastructure for repository scanning
//!
//! This module provides:
//! - Scan configuration loading
//! - Repository discovery
//! - Status aggregation into repository summaries
//! - Statistics and progress display

pub mod aggregator;
pub mod config;
pub mod discovery;
pub mod summary;

// Internal modules - not part of public API
pub(crate) mod progress;
pub(crate) mod stats;

// Public API - curated exports only
pub mod api;

// Re-export key items at module level for convenience
pub use api::*;
