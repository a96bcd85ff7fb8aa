//! App Shell Component
//!
//! Main layout container that combines:
//! - Top navigation tabs
//! - Main content area
//! - Theme class on the `<html>` element
//! - Task summary polling for the navigation badge

use gloo_timers::callback::Interval;
use leptos::*;
use kopia_console_shared::Theme;

use super::MainTabs;
use crate::state::AppState;

const TASK_SUMMARY_INTERVAL_MS: u32 = 5_000;

/// Main application shell layout
#[component]
pub fn AppShell(
    /// Main content (routes)
    children: Children,
) -> impl IntoView {
    let app_state = expect_context::<AppState>();

    // Apply theme class to html element
    create_effect(move |_| {
        let theme = app_state.preferences.with(|p| p.theme);
        if let Some(html) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.document_element())
        {
            for other in Theme::ALL {
                let _ = html.class_list().remove_1(&other.css_class());
            }
            let _ = html.class_list().add_1(&theme.css_class());
        }
    });

    spawn_local(app_state.refresh_tasks_summary());
    let poll = Interval::new(TASK_SUMMARY_INTERVAL_MS, move || {
        spawn_local(app_state.refresh_tasks_summary());
    });
    on_cleanup(move || drop(poll));

    view! {
        <div class="h-screen flex flex-col bg-theme-bg text-theme overflow-hidden">
            <MainTabs />

            <main class="flex-1 overflow-auto min-w-0">
                {children()}
            </main>
        </div>
    }
}
