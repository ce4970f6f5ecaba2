//! Human-readable table output

use crate::core::config::{BRANCH_DISPLAY_WIDTH, DETACHED_HEAD_LABEL, PATH_DISPLAY_WIDTH};
use crate::core::{RepositorySummary, SkippedPath};
use crate::utils::{display_path, shorten_path};

const COLUMN_GAP: &str = "  ";
const NO_VALUE: &str = "-";

fn sync_cell(summary: &RepositorySummary) -> String {
    if summary.bare || summary.upstream.is_none() {
        return NO_VALUE.to_string();
    }
    match (summary.ahead, summary.behind) {
        (0, 0) => "=".to_string(),
        (ahead, 0) => format!("↑{ahead}"),
        (0, behind) => format!("↓{behind}"),
        (ahead, behind) => format!("↑{ahead} ↓{behind}"),
    }
}

fn diverged_cell(summary: &RepositorySummary) -> String {
    if summary.diverged_branches.is_empty() {
        return NO_VALUE.to_string();
    }
    summary
        .diverged_branches
        .iter()
        .map(|d| match (d.ahead, d.behind) {
            (ahead, 0) => format!("{} ↑{ahead}", d.branch),
            (0, behind) => format!("{} ↓{behind}", d.branch),
            (ahead, behind) => format!("{} ↑{ahead} ↓{behind}", d.branch),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn branch_cell(summary: &RepositorySummary) -> String {
    let branch = summary.branch.as_deref().unwrap_or(DETACHED_HEAD_LABEL);
    shorten_branch(branch, BRANCH_DISPLAY_WIDTH)
}

fn shorten_branch(branch: &str, max_length: usize) -> String {
    if branch.chars().count() <= max_length {
        return branch.to_string();
    }
    let kept: String = branch.chars().take(max_length.saturating_sub(1)).collect();
    format!("{kept}…")
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

/// One rendered line, split into cells
struct Row {
    symbol: String,
    cells: Vec<String>,
}

fn summary_row(summary: &RepositorySummary, path_width: usize, verbose: bool) -> Row {
    let path = shorten_path(&display_path(&summary.path), path_width);
    let symbol = summary.state().symbol().to_string();

    if let Some(error) = &summary.error {
        return Row {
            symbol,
            cells: vec![path, format!("error: {error}")],
        };
    }

    let mut cells = vec![path, branch_cell(summary), sync_cell(summary)];
    if summary.bare {
        cells.extend([NO_VALUE.to_string(), NO_VALUE.to_string()]);
    } else {
        cells.push(yes_no(summary.is_dirty).to_string());
        cells.push(summary.untracked.to_string());
    }
    cells.push(if summary.stashed { "yes" } else { "" }.to_string());

    if verbose {
        cells.push(summary.upstream.clone().unwrap_or_else(|| NO_VALUE.to_string()));
        if summary.bare {
            cells.extend(std::iter::repeat(NO_VALUE.to_string()).take(3));
            cells.push(NO_VALUE.to_string());
            return Row { symbol, cells };
        } else {
            cells.push(summary.staged.to_string());
            cells.push(summary.unstaged.to_string());
            cells.push(summary.conflicted.to_string());
        }
        cells.push(diverged_cell(summary));
    }

    Row { symbol, cells }
}

fn header(verbose: bool) -> Vec<String> {
    let mut header = vec!["PATH", "BRANCH", "SYNC", "DIRTY", "UNTRACKED", "STASH"];
    if verbose {
        header.extend(["UPSTREAM", "STAGED", "UNSTAGED", "CONFLICTS", "DIVERGED"]);
    }
    header.into_iter().map(str::to_string).collect()
}

fn pad(cell: &str, width: usize) -> String {
    let len = cell.chars().count();
    format!("{cell}{}", " ".repeat(width.saturating_sub(len)))
}

/// Renders summaries as an aligned table, one row per repository
pub fn render_table(summaries: &[&RepositorySummary], verbose: bool) -> String {
    let path_width = summaries
        .iter()
        .map(|s| display_path(&s.path).chars().count())
        .max()
        .unwrap_or(0)
        .clamp("PATH".len(), PATH_DISPLAY_WIDTH);

    let header = Row {
        symbol: String::new(),
        cells: header(verbose),
    };
    let rows: Vec<Row> = summaries
        .iter()
        .map(|s| summary_row(s, path_width, verbose))
        .collect();

    // Error rows span the columns after PATH, so only the path column of
    // those rows takes part in width calculation
    let columns = header.cells.len();
    let mut widths: Vec<usize> = header.cells.iter().map(|c| c.chars().count()).collect();
    for row in &rows {
        let spans = row.cells.len() < columns;
        for (i, cell) in row.cells.iter().enumerate() {
            if spans && i > 0 {
                break;
            }
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    for row in std::iter::once(&header).chain(rows.iter()) {
        let last = row.cells.len().saturating_sub(1);
        let cells: Vec<String> = row
            .cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                if i == last {
                    cell.clone()
                } else {
                    pad(cell, widths[i])
                }
            })
            .collect();
        // Symbols render two columns wide
        let symbol = if row.symbol.is_empty() {
            "  ".to_string()
        } else {
            row.symbol.clone()
        };
        lines.push(format!("{symbol} {}", cells.join(COLUMN_GAP)).trim_end().to_string());
    }

    lines.join("\n")
}

/// Lists directories discovery had to skip
pub fn render_skipped(skipped: &[SkippedPath]) -> String {
    if skipped.is_empty() {
        return String::new();
    }

    let mut lines = vec![format!("⚠️  SKIPPED DIRECTORIES ({})", skipped.len())];
    for (i, entry) in skipped.iter().enumerate() {
        let tree_char = if i == skipped.len() - 1 { "└─" } else { "├─" };
        let path = entry
            .path
            .as_deref()
            .map(display_path)
            .unwrap_or_else(|| "<unknown>".to_string());
        lines.push(format!(
            "   {} {:30} # {}",
            tree_char,
            shorten_path(&path, PATH_DISPLAY_WIDTH),
            entry.reason
        ));
    }
    lines.join("\n")
}
