//! Layout Components
//!
//! - `AppShell` - Main layout container: tabs, content, theme, polling
//! - `MainTabs` - Top-level horizontal tab navigation

mod app_shell;
mod main_tabs;

pub use app_shell::AppShell;
pub use main_tabs::MainTabs;
