//! Repository status command implementation
//!
//! This module handles the single `repostat` command: load configuration,
//! scan every root, and print the report.

use std::sync::Arc;

use anyhow::Result;
use tracing::warn;

use crate::core::{
    Aggregator, ConfigOverrides, ScanConfiguration, ScanProgress, ScanReport, ScanStatistics,
    StatusFilter, NO_REPOS_MESSAGE,
};
use crate::git::{is_git_available, GitCli, VcsBackend};
use crate::report::{render_json, render_skipped, render_table};
use crate::utils::{set_terminal_title, set_terminal_title_and_flush, stderr_is_terminal};

/// How much the command prints besides the table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Verbosity {
    /// Table only
    Quiet,
    /// Table and footer
    #[default]
    Normal,
    /// Extra columns and the list of skipped directories
    Verbose,
}

/// Options of the status command
#[derive(Debug, Clone, Default)]
pub struct StatusArgs {
    pub overrides: ConfigOverrides,
    pub verbosity: Verbosity,
    pub json: bool,
}

/// How the scan ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    Completed,
    Interrupted,
}

/// Formats a finished scan for standard output
pub fn render_report(
    report: &ScanReport,
    filter: StatusFilter,
    verbosity: Verbosity,
    json: bool,
) -> Result<String> {
    let visible = report.filtered(filter);

    if json {
        return render_json(report, &visible);
    }

    let mut sections = Vec::new();

    if report.summaries.is_empty() {
        sections.push(NO_REPOS_MESSAGE.to_string());
    } else if !visible.is_empty() {
        sections.push(render_table(&visible, verbosity == Verbosity::Verbose));
    }

    if verbosity == Verbosity::Verbose && !report.skipped.is_empty() {
        sections.push(render_skipped(&report.skipped));
    }

    if report.interrupted {
        sections.push(format!(
            "⚠️  Scan interrupted, showing {} repositories scanned so far",
            report.summaries.len()
        ));
    }

    if verbosity != Verbosity::Quiet && !report.summaries.is_empty() {
        let stats = ScanStatistics::from_summaries(&report.summaries);
        sections.push(stats.generate_summary(report.duration));
    }

    Ok(sections.join("\n\n"))
}

/// Handles the repository status command
pub async fn handle_status_command(args: StatusArgs) -> Result<ScanOutcome> {
    let config = ScanConfiguration::load(&args.overrides)?;

    if !is_git_available().await {
        warn!("git executable not found, every repository will be reported as errored");
    }

    // Set terminal title to indicate repostat is running
    set_terminal_title("🚀 repostat");

    let progress = if !args.json && args.verbosity != Verbosity::Quiet && stderr_is_terminal() {
        ScanProgress::visible()?
    } else {
        ScanProgress::hidden()
    };

    let backend: Arc<dyn VcsBackend> = Arc::new(GitCli::default());
    let aggregator = Aggregator::new(backend).with_progress(progress);

    let interrupt = aggregator.interrupt_handle();
    let signal_listener = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.trigger();
        }
    });

    let report = aggregator.scan(&config).await;
    signal_listener.abort();

    let output = render_report(&report, config.filter, args.verbosity, args.json)?;
    if !output.is_empty() {
        println!("{output}");
    }

    // Set terminal title to green checkbox to indicate completion
    set_terminal_title_and_flush("✅ repostat");

    Ok(if report.interrupted {
        ScanOutcome::Interrupted
    } else {
        ScanOutcome::Completed
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RepositorySummary;
    use std::path::PathBuf;
    use std::time::Duration;

    fn report() -> ScanReport {
        let clean = RepositorySummary {
            branch: Some("main".into()),
            ..RepositorySummary::empty(PathBuf::from("/clean"))
        };
        let dirty = RepositorySummary {
            path: PathBuf::from("/dirty"),
            is_dirty: true,
            unstaged: 2,
            ..clean.clone()
        };
        ScanReport {
            summaries: vec![clean, dirty],
            skipped: Vec::new(),
            duration: Duration::from_millis(250),
            interrupted: false,
        }
    }

    #[test]
    fn test_normal_output_has_table_and_footer() {
        let out = render_report(&report(), StatusFilter::All, Verbosity::Normal, false).unwrap();
        assert!(out.contains("/clean"));
        assert!(out.contains("/dirty"));
        assert!(out.contains("✅ Scanned 2 repositories"));
    }

    #[test]
    fn test_quiet_output_has_no_footer() {
        let out = render_report(&report(), StatusFilter::All, Verbosity::Quiet, false).unwrap();
        assert!(!out.contains("Scanned"));
        assert_eq!(out.lines().count(), 3);
    }

    #[test]
    fn test_filter_hides_rows_but_footer_counts_all() {
        let out = render_report(&report(), StatusFilter::Ko, Verbosity::Normal, false).unwrap();
        assert!(!out.contains("/clean"));
        assert!(out.contains("/dirty"));
        assert!(out.contains("Scanned 2 repositories"));
    }

    #[test]
    fn test_empty_scan_message() {
        let empty = ScanReport::default();
        let out = render_report(&empty, StatusFilter::All, Verbosity::Normal, false).unwrap();
        assert_eq!(out, NO_REPOS_MESSAGE);
    }

    #[test]
    fn test_interrupted_note() {
        let mut partial = report();
        partial.interrupted = true;
        let out = render_report(&partial, StatusFilter::All, Verbosity::Normal, false).unwrap();
        assert!(out.contains("Scan interrupted, showing 2 repositories scanned so far"));
    }

    #[test]
    fn test_json_output_is_parseable() {
        let out = render_report(&report(), StatusFilter::All, Verbosity::Normal, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["repositories"].as_array().unwrap().len(), 2);
        assert_eq!(value["repositories"][1]["state"], "dirty");
    }
}
