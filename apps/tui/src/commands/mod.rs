//! Headless subcommands. They print to stdout and never touch the terminal UI.

mod cache;
mod recommend;

pub use cache::{cache_get, cache_install, cache_status};
pub use recommend::{format_report, recommend};
