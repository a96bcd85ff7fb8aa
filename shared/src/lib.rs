//! Shared types and logic for the Kopia console
//!
//! This crate contains everything the console needs that does not touch a
//! browser or a socket:
//! - API request/response types for the `/api/v1` backend
//! - Formatting helpers (sizes, durations, timestamps)
//! - Query-string parsing and policy-path classification
//! - Storage provider schemas and validation
//! - The repository setup wizard state machine
//! - The sortable/paginated table model

pub mod format;
pub mod messages;
pub mod paths;
pub mod providers;
pub mod table;
pub mod wizard;

pub use format::*;
pub use messages::*;
pub use paths::*;
pub use providers::*;
pub use table::*;
pub use wizard::*;
