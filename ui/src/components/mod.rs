//! UI Components
//!
//! This module contains all UI components organized by feature:
//! - `layout`: App shell and navigation tabs
//! - `common`: Data table, form fields and banners
//! - `setup`: Repository setup wizard
//! - one module per page

pub mod common;
pub mod layout;
pub mod notifications;
pub mod policies;
pub mod preferences;
pub mod repository;
pub mod setup;
pub mod snapshots;
pub mod tasks;
