//! Global State Management
//!
//! This module manages the state every page shares:
//! - Repository connection status
//! - UI preferences (theme, page size, size units)
//! - Task summary for the navigation badge

use gloo_storage::{LocalStorage, Storage};
use leptos::*;
use kopia_console_shared::{RepoStatus, RequestError, TasksSummary, UiPreferences};

use crate::client::{ConsoleClient, HttpClient};

const PREFERENCES_KEY: &str = "kopia-console.preferences";

/// Global application state
#[derive(Clone, Copy)]
pub struct AppState {
    /// Last known repository status; `None` until the first answer
    pub repo_status: RwSignal<Option<RepoStatus>>,

    /// Error from the last status refresh
    pub status_error: RwSignal<Option<RequestError>>,

    pub preferences: RwSignal<UiPreferences>,

    pub tasks_summary: RwSignal<TasksSummary>,

    client: StoredValue<HttpClient>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            repo_status: create_rw_signal(None),
            status_error: create_rw_signal(None),
            preferences: create_rw_signal(cached_preferences()),
            tasks_summary: create_rw_signal(TasksSummary::default()),
            client: store_value(HttpClient::from_page()),
        }
    }

    pub fn client(&self) -> HttpClient {
        self.client.get_value()
    }

    /// Whether the repository is known to be connected
    pub fn connected(&self) -> bool {
        self.repo_status
            .with(|s| s.as_ref().is_some_and(|s| s.connected))
    }

    /// Whether the repository is known to be disconnected
    pub fn disconnected(&self) -> bool {
        self.repo_status
            .with(|s| s.as_ref().is_some_and(|s| !s.connected))
    }

    pub async fn refresh_status(self) {
        match self.client().repo_status().await {
            Ok(status) => {
                self.repo_status.set(Some(status));
                self.status_error.set(None);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to refresh repository status");
                self.status_error.set(Some(e));
            }
        }
    }

    pub async fn refresh_tasks_summary(self) {
        match self.client().tasks_summary().await {
            Ok(summary) => self.tasks_summary.set(summary),
            Err(e) => tracing::debug!(error = %e, "Failed to fetch task summary"),
        }
    }

    /// Load preferences from the backend, keeping the cached copy on failure
    pub async fn load_preferences(self) {
        match self.client().ui_preferences().await {
            Ok(prefs) => {
                cache_preferences(&prefs);
                self.preferences.set(prefs);
            }
            Err(e) => tracing::warn!(error = %e, "Failed to load UI preferences"),
        }
    }

    /// Change the page size every table uses and persist it
    pub fn set_page_size(self, size: usize) {
        let Some(prefs) = self.preferences.with_untracked(|p| p.with_page_size(size)) else {
            return;
        };
        spawn_local(async move {
            if let Err(e) = self.save_preferences(prefs).await {
                tracing::warn!(error = %e, "Failed to save page size");
            }
        });
    }

    /// Apply locally, then persist to the backend
    pub async fn save_preferences(self, prefs: UiPreferences) -> Result<(), RequestError> {
        cache_preferences(&prefs);
        self.preferences.set(prefs.clone());
        self.client().save_ui_preferences(&prefs).await
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

fn cached_preferences() -> UiPreferences {
    LocalStorage::get(PREFERENCES_KEY).unwrap_or_default()
}

fn cache_preferences(prefs: &UiPreferences) {
    if let Err(e) = LocalStorage::set(PREFERENCES_KEY, prefs) {
        tracing::debug!(error = %e, "Failed to cache UI preferences");
    }
}
