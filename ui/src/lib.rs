//! Kopia Console UI Library
//!
//! Browser console for a backup repository server: connect or create a
//! repository, then browse snapshots, policies, tasks and preferences.
//!
//! # Modules
//!
//! - [`app`]: Root application component and routing
//! - [`client`]: HTTP client for the backend REST API
//! - [`components`]: Pages and reusable widgets
//! - [`state`]: Global state shared through context

pub mod app;
pub mod client;
pub mod components;
pub mod state;

pub use app::App;
