//! JSON output for scripting

use anyhow::Result;
use serde::Serialize;

use crate::core::{RepositorySummary, ScanReport};
use crate::git::RepoState;

#[derive(Serialize)]
struct JsonSummary<'a> {
    #[serde(flatten)]
    summary: &'a RepositorySummary,
    state: RepoState,
}

#[derive(Serialize)]
struct JsonSkipped {
    path: Option<String>,
    reason: String,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    repositories: Vec<JsonSummary<'a>>,
    skipped: Vec<JsonSkipped>,
    interrupted: bool,
    elapsed_ms: u64,
}

/// Renders the selected summaries and scan metadata as pretty-printed JSON
pub fn render_json(report: &ScanReport, summaries: &[&RepositorySummary]) -> Result<String> {
    let output = JsonReport {
        repositories: summaries
            .iter()
            .map(|summary| JsonSummary {
                summary,
                state: summary.state(),
            })
            .collect(),
        skipped: report
            .skipped
            .iter()
            .map(|s| JsonSkipped {
                path: s.path.as_ref().map(|p| p.to_string_lossy().into_owned()),
                reason: s.reason.to_string(),
            })
            .collect(),
        interrupted: report.interrupted,
        elapsed_ms: report.duration.as_millis() as u64,
    };
    Ok(serde_json::to_string_pretty(&output)?)
}
