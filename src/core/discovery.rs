//! Repository discovery
//!
//! [`Discovery`] walks the configured roots one after another and lazily
//! yields every repository root it finds. Walking never descends into a
//! repository that has already been found, so submodules and nested
//! checkouts are managed by the enclosing repository and reported once.

use std::collections::{HashSet, VecDeque};
use std::fs;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::{DirEntry, Walk, WalkBuilder};
use tracing::{debug, warn};

use super::config::{is_glob_pattern, ScanConfiguration};

/// How a directory holds its repository metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoLayout {
    /// Working tree with a `.git` directory
    WorkTree,
    /// Working tree with a `.git` file pointing elsewhere (worktrees, submodules)
    Linked,
    /// Bare repository without a working tree
    Bare,
}

/// A path discovery could not read, and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPath {
    pub path: Option<PathBuf>,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    PermissionDenied,
    SymlinkLoop,
    Other(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::PermissionDenied => write!(f, "permission denied"),
            SkipReason::SymlinkLoop => write!(f, "symbolic link cycle"),
            SkipReason::Other(reason) => write!(f, "{reason}"),
        }
    }
}

/// Check if a .git file (for submodules/worktrees) contains gitdir reference
/// Only reads the first 5 lines for efficiency
fn is_git_file(path: &Path) -> bool {
    match fs::File::open(path) {
        Ok(file) => {
            let reader = BufReader::new(file);
            // Only read first few lines - gitdir is typically in the first line
            reader
                .lines()
                .take(5)
                .map_while(Result::ok)
                .any(|line| line.trim_start().starts_with("gitdir:"))
        }
        Err(_) => false,
    }
}

/// Bare repositories keep HEAD, objects and refs at the top level
fn is_bare_repo(dir: &Path) -> bool {
    dir.join("HEAD").is_file() && dir.join("objects").is_dir() && dir.join("refs").is_dir()
}

/// Detects whether `dir` is a repository root
pub fn repository_layout(dir: &Path) -> Option<RepoLayout> {
    let dot_git = dir.join(".git");
    match fs::metadata(&dot_git) {
        Ok(meta) if meta.is_dir() => return Some(RepoLayout::WorkTree),
        Ok(meta) if meta.is_file() && is_git_file(&dot_git) => return Some(RepoLayout::Linked),
        _ => {}
    }
    is_bare_repo(dir).then_some(RepoLayout::Bare)
}

fn classify_error(err: &ignore::Error) -> SkippedPath {
    fn path_of(err: &ignore::Error) -> Option<PathBuf> {
        match err {
            ignore::Error::WithPath { path, .. } => Some(path.clone()),
            ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
                path_of(err)
            }
            ignore::Error::Loop { child, .. } => Some(child.clone()),
            _ => None,
        }
    }

    fn is_loop(err: &ignore::Error) -> bool {
        match err {
            ignore::Error::Loop { .. } => true,
            ignore::Error::WithPath { err, .. }
            | ignore::Error::WithDepth { err, .. }
            | ignore::Error::WithLineNumber { err, .. } => is_loop(err),
            _ => false,
        }
    }

    let reason = if is_loop(err) {
        SkipReason::SymlinkLoop
    } else if err
        .io_error()
        .is_some_and(|e| e.kind() == ErrorKind::PermissionDenied)
    {
        SkipReason::PermissionDenied
    } else {
        SkipReason::Other(err.to_string())
    };

    SkippedPath {
        path: path_of(err),
        reason,
    }
}

/// Directory pruning rules shared by every walk
#[derive(Clone)]
struct EntryFilter {
    skip_dirs: Vec<String>,
    ignore: Vec<PathBuf>,
    ignore_globs: GlobSet,
    hidden: bool,
}

fn build_ignore_globs(patterns: &[&PathBuf]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        match Glob::new(&pattern.to_string_lossy()) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(e) => warn!(pattern = %pattern.display(), "invalid ignore pattern: {e}"),
        }
    }
    builder.build().unwrap_or_else(|e| {
        warn!("ignore patterns disabled: {e}");
        GlobSet::empty()
    })
}

impl EntryFilter {
    fn new(config: &ScanConfiguration) -> Self {
        let (patterns, paths): (Vec<&PathBuf>, Vec<&PathBuf>) =
            config.ignore.iter().partition(|p| is_glob_pattern(p));
        Self {
            skip_dirs: config.skip_dirs.clone(),
            ignore: paths
                .into_iter()
                .map(|p| fs::canonicalize(p).unwrap_or_else(|_| p.clone()))
                .collect(),
            ignore_globs: build_ignore_globs(&patterns),
            hidden: config.hidden,
        }
    }

    fn is_ignored(&self, path: &Path) -> bool {
        if !self.ignore_globs.is_empty()
            && (self.ignore_globs.is_match(path)
                || fs::canonicalize(path).is_ok_and(|p| self.ignore_globs.is_match(p)))
        {
            return true;
        }
        // Only canonicalize when the name could possibly match
        let name = path.file_name();
        self.ignore.iter().any(|ignored| {
            ignored == path
                || (ignored.file_name() == name
                    && fs::canonicalize(path).is_ok_and(|p| &p == ignored))
        })
    }

    fn keep(&self, entry: &DirEntry) -> bool {
        // Roots are always walked
        if entry.depth() == 0 {
            return true;
        }

        if !entry.file_type().is_some_and(|ft| ft.is_dir()) {
            return false;
        }

        let file_name = entry.file_name().to_str().unwrap_or("");

        if file_name == ".git" {
            return false;
        }

        if self.is_ignored(entry.path()) {
            debug!(path = %entry.path().display(), "ignored by configuration");
            return false;
        }

        // Don't descend into a repository that has already been found
        if entry
            .path()
            .parent()
            .is_some_and(|parent| repository_layout(parent).is_some())
        {
            return false;
        }

        // Name-based pruning never hides a repository root
        if repository_layout(entry.path()).is_some() {
            return true;
        }

        if self.skip_dirs.iter().any(|d| d == file_name) {
            return false;
        }

        self.hidden || !file_name.starts_with('.')
    }
}

/// Lazy sequence of repository roots under the configured roots
pub struct Discovery {
    roots: VecDeque<PathBuf>,
    current: Option<Walk>,
    filter: EntryFilter,
    max_depth: Option<usize>,
    follow_links: bool,
    seen: HashSet<PathBuf>,
    skipped: Vec<SkippedPath>,
}

impl Discovery {
    /// Starts discovery over every root of `config`, in order
    pub fn new(config: &ScanConfiguration) -> Self {
        Self {
            roots: config.roots.iter().cloned().collect(),
            current: None,
            filter: EntryFilter::new(config),
            max_depth: config.max_depth,
            follow_links: config.follow_links,
            seen: HashSet::new(),
            skipped: Vec::new(),
        }
    }

    /// Starts discovery under a single root, with the other settings of `config`
    pub fn from_root(root: impl AsRef<Path>, config: &ScanConfiguration) -> Self {
        let mut discovery = Self::new(config);
        discovery.roots = VecDeque::from([root.as_ref().to_path_buf()]);
        discovery
    }

    /// Paths that could not be read so far
    pub fn skipped(&self) -> &[SkippedPath] {
        &self.skipped
    }

    pub fn into_skipped(self) -> Vec<SkippedPath> {
        self.skipped
    }

    fn build_walk(&self, root: &Path) -> Walk {
        let filter = self.filter.clone();
        WalkBuilder::new(root)
            .standard_filters(false) // pruning rules are ours, not .gitignore's
            .follow_links(self.follow_links)
            .max_depth(self.max_depth)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| filter.keep(entry))
            .build()
    }

    /// Records a repository once, keyed by its canonical location
    fn first_sighting(&mut self, path: &Path) -> bool {
        let key = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        self.seen.insert(key)
    }
}

impl Iterator for Discovery {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            if self.current.is_none() {
                let root = self.roots.pop_front()?;
                debug!(root = %root.display(), "walking root");
                self.current = Some(self.build_walk(&root));
            }

            let next = self.current.as_mut().and_then(Iterator::next);
            match next {
                None => self.current = None,
                Some(Err(err)) => {
                    let skipped = classify_error(&err);
                    match &skipped.path {
                        Some(path) => {
                            warn!(path = %path.display(), reason = %skipped.reason, "skipping directory")
                        }
                        None => warn!(reason = %skipped.reason, "skipping directory"),
                    }
                    self.skipped.push(skipped);
                }
                Some(Ok(entry)) => {
                    if !entry.file_type().is_some_and(|ft| ft.is_dir()) {
                        continue;
                    }
                    let path = entry.into_path();
                    if repository_layout(&path).is_some() && self.first_sighting(&path) {
                        debug!(path = %path.display(), "found repository");
                        return Some(path);
                    }
                }
            }
        }
    }
}

/// Recursively searches for git repositories from a specific path
/// using default settings. Returns repository roots in walk order.
pub fn find_repos_from_path(search_path: impl AsRef<Path>) -> Vec<PathBuf> {
    let config = ScanConfiguration::new(vec![search_path.as_ref().to_path_buf()]);
    Discovery::new(&config).collect()
}
