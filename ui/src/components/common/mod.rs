//! Common/Shared UI Components
//!
//! Reusable components used throughout the application.

mod data_table;
mod form;
mod page;

pub use data_table::{DataTable, TableColumn};
pub use form::*;
pub use page::PageHeader;
