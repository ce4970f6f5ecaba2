//! Statistics tracking for scan results

use std::time::Duration;

use super::config::{ERROR_MESSAGE_MAX_LENGTH, ERROR_MESSAGE_TRUNCATE_LENGTH};
use super::summary::RepositorySummary;
use crate::git::RepoState;

/// Totals over the summaries of one scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStatistics {
    pub total_repos: usize,
    pub clean_repos: usize,
    pub dirty_repos: usize,
    pub out_of_sync_repos: usize,
    pub bare_repos: usize,
    pub error_repos: usize,
    pub detached_repos: usize,
    pub stashed_repos: usize,
    pub untracked_files: usize,
}

impl ScanStatistics {
    /// Creates a new statistics tracker with all counters initialized to zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_summaries<'a>(summaries: impl IntoIterator<Item = &'a RepositorySummary>) -> Self {
        let mut stats = Self::new();
        for summary in summaries {
            stats.update(summary);
        }
        stats
    }

    /// Updates statistics with one repository summary
    pub fn update(&mut self, summary: &RepositorySummary) {
        self.total_repos += 1;
        match summary.state() {
            RepoState::Clean => self.clean_repos += 1,
            RepoState::Dirty => self.dirty_repos += 1,
            RepoState::OutOfSync => self.out_of_sync_repos += 1,
            RepoState::DirtyOutOfSync => {
                self.dirty_repos += 1;
                self.out_of_sync_repos += 1;
            }
            RepoState::Bare => self.bare_repos += 1,
            RepoState::Errored => self.error_repos += 1,
        }
        if summary.is_detached() && !summary.bare {
            self.detached_repos += 1;
        }
        if summary.stashed {
            self.stashed_repos += 1;
        }
        self.untracked_files += summary.untracked;
    }

    /// Generates the one-line footer of a scan
    pub fn generate_summary(&self, duration: Duration) -> String {
        let repo_word = if self.total_repos == 1 {
            "repository"
        } else {
            "repositories"
        };
        let mut summary = format!(
            "✅ Scanned {} {} in {:.1}s • {} clean • {} dirty • {} out of sync",
            self.total_repos,
            repo_word,
            duration.as_secs_f64(),
            self.clean_repos,
            self.dirty_repos,
            self.out_of_sync_repos
        );
        if self.bare_repos > 0 {
            summary.push_str(&format!(" • {} bare", self.bare_repos));
        }
        if self.error_repos > 0 {
            summary.push_str(&format!(" • {} failed", self.error_repos));
        }
        if self.detached_repos > 0 {
            summary.push_str(&format!(" • {} detached", self.detached_repos));
        }
        if self.stashed_repos > 0 {
            summary.push_str(&format!(" • {} stashed", self.stashed_repos));
        }
        if self.untracked_files > 0 {
            let file_word = if self.untracked_files == 1 { "file" } else { "files" };
            summary.push_str(&format!(" • {} untracked {file_word}", self.untracked_files));
        }
        summary
    }
}

/// Cleans and formats error messages for display
pub fn clean_error_message(error: &str) -> String {
    // Replace newlines/tabs with spaces and collapse whitespace
    let cleaned = error
        .replace('\n', " ")
        .replace('\r', "")
        .replace('\t', " ");
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    let cleaned = cleaned.strip_prefix("fatal: ").unwrap_or(&cleaned).to_string();

    // Extract key error patterns
    if cleaned.contains("dubious ownership") {
        "unsafe repository (owned by another user)".to_string()
    } else if cleaned.contains("not a git repository") {
        "not a git repository".to_string()
    } else if cleaned.contains("timed out") {
        "timeout".to_string()
    } else if cleaned.contains("Permission denied") {
        "permission denied".to_string()
    } else if cleaned.chars().count() > ERROR_MESSAGE_MAX_LENGTH {
        // Truncate long messages
        let truncated: String = cleaned.chars().take(ERROR_MESSAGE_TRUNCATE_LENGTH).collect();
        format!("{truncated}...")
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::WorkingTreeChanges;
    use std::path::PathBuf;

    fn repo(name: &str) -> RepositorySummary {
        RepositorySummary {
            branch: Some("main".into()),
            ..RepositorySummary::empty(PathBuf::from(name))
        }
    }

    #[test]
    fn test_counts_each_state() {
        let summaries = vec![
            repo("clean"),
            repo("dirty").with_changes(WorkingTreeChanges {
                staged: 1,
                unstaged: 0,
                conflicted: 0,
            }),
            RepositorySummary {
                ahead: 1,
                untracked: 2,
                ..repo("ahead")
            },
            RepositorySummary {
                branch: None,
                stashed: true,
                ..repo("detached")
            },
            RepositorySummary::bare(PathBuf::from("bare"), Some("main".into()), false),
            RepositorySummary::errored(PathBuf::from("broken"), "corrupt"),
        ];

        let stats = ScanStatistics::from_summaries(&summaries);
        assert_eq!(stats.total_repos, 6);
        assert_eq!(stats.clean_repos, 2);
        assert_eq!(stats.dirty_repos, 1);
        assert_eq!(stats.out_of_sync_repos, 1);
        assert_eq!(stats.bare_repos, 1);
        assert_eq!(stats.error_repos, 1);
        assert_eq!(stats.detached_repos, 1);
        assert_eq!(stats.stashed_repos, 1);
        assert_eq!(stats.untracked_files, 2);
    }

    #[test]
    fn test_summary_line() {
        let stats = ScanStatistics {
            total_repos: 1,
            clean_repos: 1,
            ..Default::default()
        };
        assert_eq!(
            stats.generate_summary(Duration::from_millis(1500)),
            "✅ Scanned 1 repository in 1.5s • 1 clean • 0 dirty • 0 out of sync"
        );

        let stats = ScanStatistics {
            total_repos: 3,
            error_repos: 1,
            bare_repos: 1,
            clean_repos: 1,
            ..Default::default()
        };
        let line = stats.generate_summary(Duration::from_secs(2));
        assert!(line.starts_with("✅ Scanned 3 repositories in 2.0s"));
        assert!(line.ends_with("• 1 bare • 1 failed"));
    }

    #[test]
    fn test_summary_line_mentions_detached_stashed_and_untracked() {
        let summaries = vec![
            RepositorySummary {
                untracked: 1,
                ..repo("one")
            },
            RepositorySummary {
                branch: None,
                stashed: true,
                untracked: 4,
                ..repo("two")
            },
        ];
        let line = ScanStatistics::from_summaries(&summaries).generate_summary(Duration::ZERO);
        assert!(line.ends_with("• 1 detached • 1 stashed • 5 untracked files"));

        let single = ScanStatistics {
            total_repos: 1,
            clean_repos: 1,
            untracked_files: 1,
            ..Default::default()
        };
        assert!(single
            .generate_summary(Duration::ZERO)
            .ends_with("• 0 out of sync • 1 untracked file"));
    }

    #[test]
    fn test_clean_error_message_patterns() {
        assert_eq!(
            clean_error_message("fatal: not a git repository (or any parent up to mount point /)"),
            "not a git repository"
        );
        assert_eq!(
            clean_error_message("fatal: detected dubious ownership in repository at '/srv/x'"),
            "unsafe repository (owned by another user)"
        );
        assert_eq!(
            clean_error_message("Git operation timed out after 30 seconds"),
            "timeout"
        );
        assert_eq!(clean_error_message("fatal:   bad\n\tobject"), "bad object");
    }

    #[test]
    fn test_clean_error_message_truncates() {
        let long = "x".repeat(100);
        let cleaned = clean_error_message(&long);
        assert_eq!(cleaned.chars().count(), ERROR_MESSAGE_TRUNCATE_LENGTH + 3);
        assert!(cleaned.ends_with("..."));
    }
}
