//! Terminal utilities for title setting and output management

use std::io::{IsTerminal, Write};

/// Sets the terminal title to the specified text when stdout is a terminal
pub fn set_terminal_title(title: &str) {
    if std::io::stdout().is_terminal() {
        // ANSI escape sequence to set terminal title
        print!("\x1b]0;{title}\x07");
    }
}

/// Sets the terminal title and ensures it's flushed to the terminal
pub fn set_terminal_title_and_flush(title: &str) {
    set_terminal_title(title);
    // Cosmetic only
    let _ = std::io::stdout().flush();
}

/// Whether progress output on stderr would reach a person
pub fn stderr_is_terminal() -> bool {
    std::io::stderr().is_terminal()
}
