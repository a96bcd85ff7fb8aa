//! Kopia console library
//!
//! Configuration layering and the web server that embeds the console UI.

pub mod config;
pub mod server;

pub use config::{ConfigError, ConsoleConfig};
pub use server::{create_router, ServerState};
