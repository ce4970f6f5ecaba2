//! Status aggregation over discovered repositories
//!
//! Discovery runs on a blocking thread and streams repository roots through
//! a channel. Each root is summarized through the [`VcsBackend`]; with
//! `jobs > 1` several summaries are computed at once, and results are put
//! back into discovery order before they are returned.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::{mpsc, Notify};
use tracing::{debug, info, warn};

use super::config::{ScanConfiguration, SortOrder, StatusFilter};
use super::discovery::{Discovery, SkippedPath};
use super::progress::ScanProgress;
use super::stats::clean_error_message;
use super::summary::RepositorySummary;
use crate::error::ScanError;
use crate::git::VcsBackend;

// Discovered paths buffered ahead of status queries
const DISCOVERY_CHANNEL_CAPACITY: usize = 64;

/// Result of one scan
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// Summaries in discovery order, or sorted by path when configured
    pub summaries: Vec<RepositorySummary>,
    /// Directories discovery could not read
    pub skipped: Vec<SkippedPath>,
    pub duration: Duration,
    /// The scan was stopped before every repository was summarized
    pub interrupted: bool,
}

impl ScanReport {
    /// Summaries passing `filter`, in report order
    pub fn filtered(&self, filter: StatusFilter) -> Vec<&RepositorySummary> {
        self.summaries.iter().filter(|s| s.matches(filter)).collect()
    }
}

async fn query(backend: &dyn VcsBackend, path: &Path) -> Result<RepositorySummary> {
    let repo = backend.open(path).await?;
    let head = backend.current_branch(&repo).await?;
    let branch = head.branch_name().map(str::to_string);
    let stashed = backend.has_stash(&repo).await?;

    if repo.is_bare {
        return Ok(RepositorySummary::bare(path.to_path_buf(), branch, stashed));
    }

    let tracking = match &branch {
        Some(name) => backend.tracking_delta(&repo, name).await?,
        None => None,
    };
    let mut diverged = backend.diverged_branches(&repo).await?;
    if let Some(current) = &branch {
        diverged.retain(|d| &d.branch != current);
    }
    let changes = backend.working_tree_changes(&repo).await?;
    let untracked = backend.untracked_files(&repo).await?.len();

    let mut summary = RepositorySummary::empty(path.to_path_buf()).with_changes(changes);
    summary.branch = branch;
    summary.stashed = stashed;
    summary.untracked = untracked;
    summary.diverged_branches = diverged;
    if let Some(delta) = tracking {
        summary.upstream = Some(delta.upstream);
        summary.ahead = delta.ahead;
        summary.behind = delta.behind;
    }
    Ok(summary)
}

/// Summarizes one repository. Failures produce an errored summary.
pub async fn summarize(backend: &dyn VcsBackend, path: &Path) -> RepositorySummary {
    debug!(path = %path.display(), backend = backend.name(), "querying repository");
    match query(backend, path).await {
        Ok(summary) => {
            debug!(path = %path.display(), state = summary.state().text(), "repository summarized");
            summary
        }
        Err(e) => {
            let reason = clean_error_message(&format!("{e:#}"));
            let err = ScanError::RepositoryOpen {
                path: path.to_path_buf(),
                reason: reason.clone(),
            };
            warn!("{err}");
            RepositorySummary::errored(path.to_path_buf(), reason)
        }
    }
}

/// Stop request shared between a running scan and whoever cancels it
///
/// The flag stays set once triggered, so completions that race with the
/// wake-up can still tell the scan was cancelled.
#[derive(Debug, Default)]
pub struct ScanInterrupt {
    triggered: AtomicBool,
    notify: Notify,
}

impl ScanInterrupt {
    pub fn trigger(&self) {
        self.triggered.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }
}

/// Runs discovery and status aggregation for a configuration
pub struct Aggregator {
    backend: Arc<dyn VcsBackend>,
    progress: ScanProgress,
    interrupt: Arc<ScanInterrupt>,
}

impl Aggregator {
    pub fn new(backend: Arc<dyn VcsBackend>) -> Self {
        Self {
            backend,
            progress: ScanProgress::hidden(),
            interrupt: Arc::new(ScanInterrupt::default()),
        }
    }

    pub fn with_progress(mut self, progress: ScanProgress) -> Self {
        self.progress = progress;
        self
    }

    /// Handle that stops a running scan when triggered
    ///
    /// Summaries completed before the trigger are kept. Failures that finish
    /// after it are dropped, since the signal may have killed their git
    /// process.
    pub fn interrupt_handle(&self) -> Arc<ScanInterrupt> {
        Arc::clone(&self.interrupt)
    }

    /// Discovers and summarizes every repository under the configured roots
    pub async fn scan(&self, config: &ScanConfiguration) -> ScanReport {
        let start_time = Instant::now();
        let jobs = config.effective_jobs().max(1);
        info!(roots = ?config.roots, jobs, "starting scan");

        let (tx, mut rx) = mpsc::channel::<PathBuf>(DISCOVERY_CHANNEL_CAPACITY);
        let walk_config = config.clone();
        let walker = tokio::task::spawn_blocking(move || {
            let mut discovery = Discovery::new(&walk_config);
            for path in discovery.by_ref() {
                // The receiver is gone once the scan was interrupted
                if tx.blocking_send(path).is_err() {
                    break;
                }
            }
            discovery.into_skipped()
        });

        let mut completed: Vec<(usize, RepositorySummary)> = Vec::new();
        let mut pending = FuturesUnordered::new();
        let mut next_index = 0usize;
        let mut discovery_done = false;
        let mut interrupted = false;

        loop {
            if discovery_done && pending.is_empty() {
                break;
            }

            tokio::select! {
                biased;

                _ = self.interrupt.notify.notified() => {
                    interrupted = true;
                    break;
                }

                Some::<(usize, RepositorySummary)>((index, summary)) = pending.next(), if !pending.is_empty() => {
                    // A failure seen after the trigger may come from a killed git child
                    if summary.is_errored() && self.interrupt.is_triggered() {
                        interrupted = true;
                        break;
                    }
                    completed.push((index, summary));
                }

                received = rx.recv(), if !discovery_done && pending.len() < jobs => {
                    match received {
                        Some(path) => {
                            self.progress.on_repository(&path);
                            let backend = Arc::clone(&self.backend);
                            let index = next_index;
                            next_index += 1;
                            pending.push(async move {
                                (index, summarize(backend.as_ref(), &path).await)
                            });
                        }
                        None => discovery_done = true,
                    }
                }
            }
        }

        let skipped = if interrupted {
            // The walker may still be inside a large tree; leave it behind
            drop(rx);
            warn!(
                completed = completed.len(),
                "scan interrupted, reporting partial results"
            );
            Vec::new()
        } else {
            walker.await.unwrap_or_else(|e| {
                warn!("repository discovery failed: {e}");
                Vec::new()
            })
        };
        self.progress.finish();

        completed.sort_by_key(|(index, _)| *index);
        let mut summaries: Vec<RepositorySummary> =
            completed.into_iter().map(|(_, summary)| summary).collect();
        if config.sort == SortOrder::Path {
            summaries.sort_by(|a, b| a.path.cmp(&b.path));
        }

        let duration = start_time.elapsed();
        info!(
            repositories = summaries.len(),
            skipped = skipped.len(),
            elapsed_ms = duration.as_millis() as u64,
            "scan finished"
        );

        ScanReport {
            summaries,
            skipped,
            duration,
            interrupted,
        }
    }
}
