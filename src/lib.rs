/// The current version of Makoto, sourced from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod bookmarks;
pub mod commands;
pub mod comment_text;
pub mod config;
pub mod format;
pub mod outbound;
pub mod query_params;
pub mod schema;
pub mod sort;
pub mod webui;
