pub(crate) mod fs;
pub(crate) mod terminal;

// Public API - utilities used by the binary and the loader
pub use fs::{absolute_path, normalize_path, real_path, shorten_path};
pub use terminal::{set_terminal_title, set_terminal_title_and_flush};
