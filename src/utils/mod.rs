pub(crate) mod fs;
pub(crate) mod terminal;

// Public API - utilities used by commands
pub use fs::{display_path, expand_tilde, shorten_path};
pub use terminal::{set_terminal_title, set_terminal_title_and_flush, stderr_is_terminal};
