//! Parsers for the machine-readable output of git plumbing commands

use anyhow::{anyhow, Result};

use super::backend::BranchDivergence;

/// Counts of tracked-file modifications in a working tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkingTreeChanges {
    /// Entries with changes in the index
    pub staged: usize,
    /// Entries with changes in the working tree not yet staged
    pub unstaged: usize,
    /// Entries with unresolved merge conflicts
    pub conflicted: usize,
}

impl WorkingTreeChanges {
    pub fn is_dirty(&self) -> bool {
        self.staged > 0 || self.unstaged > 0 || self.conflicted > 0
    }
}

// XY pairs git reports for unmerged paths
const CONFLICT_CODES: &[&str] = &["DD", "AU", "UD", "UA", "DU", "AA", "UU"];

/// Parses `git status --porcelain=v1 -z` output
///
/// Each record is `XY<space>path`. Renames and copies are followed by an
/// extra record holding the source path, which is skipped. Untracked (`??`)
/// and ignored (`!!`) records are not counted as changes.
pub fn parse_status_z(output: &str) -> Result<WorkingTreeChanges> {
    let mut changes = WorkingTreeChanges::default();
    let mut records = output.split('\0').filter(|r| !r.is_empty());

    while let Some(record) = records.next() {
        let code = record
            .get(..2)
            .ok_or_else(|| anyhow!("malformed status record: {record:?}"))?;

        if code == "??" || code == "!!" {
            continue;
        }

        if CONFLICT_CODES.contains(&code) {
            changes.conflicted += 1;
            continue;
        }

        let mut chars = code.chars();
        let index = chars.next().unwrap_or(' ');
        let worktree = chars.next().unwrap_or(' ');

        if index != ' ' {
            changes.staged += 1;
        }
        if worktree != ' ' {
            changes.unstaged += 1;
        }

        if matches!(index, 'R' | 'C') {
            // Source path of the rename/copy
            records.next();
        }
    }

    Ok(changes)
}

/// Splits NUL-terminated path output such as `git ls-files -z`
pub fn parse_path_list_z(output: &str) -> Vec<String> {
    output
        .split('\0')
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses `git rev-list --left-right --count A...B` into (left, right)
pub fn parse_left_right_count(output: &str) -> Result<(u32, u32)> {
    let mut fields = output.split_whitespace();
    let left = fields
        .next()
        .ok_or_else(|| anyhow!("empty rev-list output"))?
        .parse::<u32>()?;
    let right = fields
        .next()
        .ok_or_else(|| anyhow!("missing right count in {output:?}"))?
        .parse::<u32>()?;
    Ok((left, right))
}

/// Parses `git for-each-ref` lines of the form
/// `branch<TAB>upstream<TAB>track` where `track` is the `nobracket` form of
/// `%(upstream:track)`: empty, `gone`, `ahead N`, `behind N` or both.
///
/// Only branches that differ from an existing upstream are returned.
pub fn parse_branch_tracking(output: &str) -> Result<Vec<BranchDivergence>> {
    let mut diverged = Vec::new();

    for line in output.lines().filter(|l| !l.trim().is_empty()) {
        let mut fields = line.splitn(3, '\t');
        let branch = fields.next().unwrap_or_default();
        let upstream = fields.next().unwrap_or_default();
        let track = fields.next().unwrap_or_default().trim();

        if upstream.is_empty() || track.is_empty() || track == "gone" {
            continue;
        }

        let (mut ahead, mut behind) = (0, 0);
        for part in track.split(',') {
            let mut words = part.split_whitespace();
            let count = |word: Option<&str>| -> Result<u32> {
                word.ok_or_else(|| anyhow!("missing count in {track:?}"))?
                    .parse::<u32>()
                    .map_err(|e| anyhow!("bad count in {track:?}: {e}"))
            };
            match words.next() {
                Some("ahead") => ahead = count(words.next())?,
                Some("behind") => behind = count(words.next())?,
                _ => return Err(anyhow!("unexpected tracking info {track:?} for {branch}")),
            }
        }

        if ahead > 0 || behind > 0 {
            diverged.push(BranchDivergence {
                branch: branch.to_string(),
                upstream: upstream.to_string(),
                ahead,
                behind,
            });
        }
    }

    Ok(diverged)
}
