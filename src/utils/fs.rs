//! File system utilities

use std::path::{Path, PathBuf};

/// Shortens long paths for display, keeping the trailing characters
pub fn shorten_path(path: &str, max_length: usize) -> String {
    let count = path.chars().count();
    if count <= max_length {
        return path.to_string();
    }

    let components: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if components.len() <= 2 {
        // Too few components to shorten meaningfully
        return path.to_string();
    }

    // Keep as many trailing characters as fit behind the ellipsis
    let keep = max_length.saturating_sub(3);
    let tail: String = path.chars().skip(count - keep).collect();
    format!("...{tail}")
}

/// Expands a leading `~` to the home directory
pub fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Renders a path the way the user is used to reading it
pub fn display_path(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_path_unchanged() {
        assert_eq!(shorten_path("./src/repo", 30), "./src/repo");
    }

    #[test]
    fn test_long_path_keeps_tail() {
        let long = "/home/user/projects/clients/acme/backend-service";
        let short = shorten_path(long, 20);
        assert!(short.starts_with("..."));
        assert_eq!(short.chars().count(), 20);
        assert!(short.ends_with("backend-service"));
    }

    #[test]
    fn test_two_component_path_unchanged() {
        let path = "/a-very-long-directory-name/another-very-long-name";
        assert_eq!(shorten_path(path, 10), path);
    }

    #[test]
    fn test_expand_tilde() {
        let home = dirs::home_dir().expect("home directory");
        assert_eq!(expand_tilde("~"), home);
        assert_eq!(expand_tilde("~/src"), home.join("src"));
        assert_eq!(expand_tilde("/abs/~/x"), PathBuf::from("/abs/~/x"));
        assert_eq!(expand_tilde("~other"), PathBuf::from("~other"));
    }
}
