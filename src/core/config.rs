//! Configuration constants and scan settings
//!
//! A [`ScanConfiguration`] is built once at startup from, in increasing
//! priority: built-in defaults, the TOML config file, the `REPOSTAT_ROOTS`
//! environment variable and command line flags. It is then passed by
//! reference into discovery and aggregation and never changes.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use globset::Glob;
use serde::{Deserialize, Serialize};

use crate::error::{ScanError, ScanResult};
use crate::utils::expand_tilde;

// Environment
pub const CONFIG_ENV_VAR: &str = "REPOSTAT_CONFIG";
pub const ROOTS_ENV_VAR: &str = "REPOSTAT_ROOTS";
pub const CONFIG_DIR_NAME: &str = "repostat";
pub const CONFIG_FILE_NAME: &str = "config.toml";

// Git process limits
pub const GIT_OPERATION_TIMEOUT_SECS: u64 = 30; // local metadata reads only

// UI Constants
pub const SCANNING_MESSAGE: &str = "🔍 Scanning for git repositories...";
pub const NO_REPOS_MESSAGE: &str = "No git repositories found.";
pub const PROGRESS_TEMPLATE: &str = "{spinner} {prefix:.bold} {wide_msg}";
pub const PROGRESS_TICK_INTERVAL_MS: u64 = 120;

// Display formatting constants
pub const PATH_DISPLAY_WIDTH: usize = 50;
pub const BRANCH_DISPLAY_WIDTH: usize = 24;
pub const ERROR_MESSAGE_MAX_LENGTH: usize = 60;
pub const ERROR_MESSAGE_TRUNCATE_LENGTH: usize = 57;
pub const DETACHED_HEAD_LABEL: &str = "(detached)";

// Build and dependency directories pruned with `skip_build_dirs`
pub const SKIP_DIRECTORIES: &[&str] = &[
    "node_modules",
    "vendor",
    "target",
    "build",
    ".next",
    "dist",
    "__pycache__",
    ".venv",
    "venv",
];

/// Order in which summaries are reported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Order in which repositories were discovered
    #[default]
    Discovery,
    /// Alphabetical by path
    Path,
}

/// Which repositories make it into the report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    /// Every repository
    #[default]
    All,
    /// Clean working tree
    Ok,
    /// Staged or unstaged modifications
    Ko,
    /// Ahead of or behind the upstream branch
    Remote,
    /// Dirty or out of sync
    Nok,
    /// Could not be opened
    Unknown,
}

/// Settings read from the TOML configuration file
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub roots: Vec<String>,
    pub max_depth: Option<usize>,
    pub ignore: Vec<String>,
    pub skip_dirs: Option<Vec<String>>,
    pub skip_build_dirs: Option<bool>,
    pub hidden: Option<bool>,
    pub follow_links: Option<bool>,
    pub sort: Option<SortOrder>,
    pub filter: Option<StatusFilter>,
    pub jobs: Option<usize>,
}

impl FileConfig {
    /// Parses TOML content; `path` is only used for error messages
    pub fn from_toml(content: &str, path: &Path) -> ScanResult<Self> {
        toml::from_str(content).map_err(|e| ScanError::Config {
            path: path.to_path_buf(),
            reason: e.message().to_string(),
        })
    }

    /// Reads and parses a configuration file that must exist
    pub fn load(path: &Path) -> ScanResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ScanError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&content, path)
    }
}

/// Whether an ignore entry holds glob metacharacters
pub fn is_glob_pattern(entry: &Path) -> bool {
    entry
        .to_string_lossy()
        .contains(|c| matches!(c, '*' | '?' | '['))
}

/// Location of the per-user configuration file
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Settings given on the command line. Each one overrides the file.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub roots: Vec<PathBuf>,
    pub max_depth: Option<usize>,
    pub skip_hidden: bool,
    pub skip_build_dirs: bool,
    pub no_follow_links: bool,
    pub sort: Option<SortOrder>,
    pub filter: Option<StatusFilter>,
    pub jobs: Option<usize>,
}

/// Immutable settings for one scan
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfiguration {
    pub roots: Vec<PathBuf>,
    pub max_depth: Option<usize>,
    /// Paths or glob patterns never descended into
    pub ignore: Vec<PathBuf>,
    /// Directory names never descended into unless they are repositories
    pub skip_dirs: Vec<String>,
    /// Descend into hidden directories
    pub hidden: bool,
    pub follow_links: bool,
    pub sort: SortOrder,
    pub filter: StatusFilter,
    /// Concurrent status queries; 1 is sequential, 0 is one per CPU core
    pub jobs: usize,
}

impl Default for ScanConfiguration {
    fn default() -> Self {
        Self::new(vec![PathBuf::from(".")])
    }
}

impl ScanConfiguration {
    /// Creates a configuration with default settings for the given roots
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            max_depth: None,
            ignore: Vec::new(),
            skip_dirs: Vec::new(),
            hidden: true,
            follow_links: true,
            sort: SortOrder::Discovery,
            filter: StatusFilter::All,
            jobs: 1,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_ignore(mut self, ignore: Vec<PathBuf>) -> Self {
        self.ignore = ignore;
        self
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn with_skip_dirs(mut self, skip_dirs: Vec<String>) -> Self {
        self.skip_dirs = skip_dirs;
        self
    }

    /// Adds the common build and dependency directory names to `skip_dirs`
    pub fn with_build_dirs_skipped(mut self) -> Self {
        for name in SKIP_DIRECTORIES {
            if !self.skip_dirs.iter().any(|d| d == name) {
                self.skip_dirs.push(name.to_string());
            }
        }
        self
    }

    /// Loads the configuration file (if any) and the environment, then applies
    /// the command line overrides
    pub fn load(overrides: &ConfigOverrides) -> ScanResult<Self> {
        let explicit = overrides
            .config_path
            .clone()
            .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));

        let file = match explicit {
            // An explicitly requested file must exist
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading configuration");
                FileConfig::load(&path)?
            }
            None => match default_config_path() {
                Some(path) if path.is_file() => {
                    tracing::debug!(path = %path.display(), "loading configuration");
                    FileConfig::load(&path)?
                }
                _ => FileConfig::default(),
            },
        };

        let config = Self::resolve(file, std::env::var_os(ROOTS_ENV_VAR), overrides);
        config.validate()?;
        Ok(config)
    }

    /// Merges the configuration sources without touching the filesystem
    pub fn resolve(
        file: FileConfig,
        env_roots: Option<OsString>,
        overrides: &ConfigOverrides,
    ) -> Self {
        let roots = if !overrides.roots.is_empty() {
            overrides.roots.clone()
        } else if let Some(paths) = env_roots.filter(|v| !v.is_empty()) {
            std::env::split_paths(&paths)
                .filter(|p| !p.as_os_str().is_empty())
                .map(|p| expand_tilde(&p.to_string_lossy()))
                .collect()
        } else if !file.roots.is_empty() {
            file.roots.iter().map(|r| expand_tilde(r)).collect()
        } else {
            vec![PathBuf::from(".")]
        };

        let mut config = Self::new(roots);
        config.max_depth = overrides.max_depth.or(file.max_depth);
        config.ignore = file.ignore.iter().map(|p| expand_tilde(p)).collect();
        config.skip_dirs = file.skip_dirs.unwrap_or_default();
        if overrides.skip_build_dirs || file.skip_build_dirs.unwrap_or(false) {
            config = config.with_build_dirs_skipped();
        }
        config.hidden = !overrides.skip_hidden && file.hidden.unwrap_or(true);
        config.follow_links = !overrides.no_follow_links && file.follow_links.unwrap_or(true);
        config.sort = overrides.sort.or(file.sort).unwrap_or_default();
        config.filter = overrides.filter.or(file.filter).unwrap_or_default();
        config.jobs = overrides.jobs.or(file.jobs).unwrap_or(1);
        config
    }

    /// Every root must be an existing directory and every ignore pattern
    /// must be a valid glob
    pub fn validate(&self) -> ScanResult<()> {
        for root in &self.roots {
            if !root.exists() {
                return Err(ScanError::PathNotFound(root.clone()));
            }
            if !root.is_dir() {
                return Err(ScanError::NotADirectory(root.clone()));
            }
        }
        for pattern in self.ignore.iter().filter(|p| is_glob_pattern(p)) {
            Glob::new(&pattern.to_string_lossy()).map_err(|e| ScanError::InvalidPattern {
                pattern: pattern.to_string_lossy().into_owned(),
                reason: e.kind().to_string(),
            })?;
        }
        Ok(())
    }

    /// Number of concurrent status queries to run
    pub fn effective_jobs(&self) -> usize {
        match self.jobs {
            0 => num_cpus::get(),
            n => n,
        }
    }
}
