pub mod operations;
pub mod runner;
pub mod status;

// Public API - curated exports
pub mod api;

pub use api::*;
