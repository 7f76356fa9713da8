pub mod completions;
pub mod config;
pub mod init;
pub mod inlet;
pub mod list;
pub mod outlet;
pub mod validate;
