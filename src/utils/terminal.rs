//! Terminal utilities for title setting and output management

use std::io::{IsTerminal, Write};

/// Sets the terminal title to the specified text
pub fn set_terminal_title(title: &str) {
    // Escape sequences would end up in redirected output
    if std::io::stdout().is_terminal() {
        print!("\x1b]0;{title}\x07");
    }
}

/// Sets the terminal title and ensures it's flushed to the terminal
pub fn set_terminal_title_and_flush(title: &str) {
    set_terminal_title(title);
    let _ = std::io::stdout().flush();
}
