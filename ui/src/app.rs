//! Root Application Component
//!
//! This module contains the main App component that sets up:
//! - Routing
//! - Global state providers
//! - Layout structure with AppShell

use leptos::*;
use leptos_meta::{provide_meta_context, Title};
use leptos_router::*;

use crate::components::layout::AppShell;
use crate::components::notifications::NotificationProfiles;
use crate::components::policies::PoliciesPage;
use crate::components::preferences::PreferencesPage;
use crate::components::repository::RepositoryPage;
use crate::components::snapshots::{SnapshotHistory, SourcesList};
use crate::components::tasks::TasksPage;
use crate::state::AppState;

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let app_state = AppState::new();
    provide_context(app_state);

    // Initial status and preferences, once
    create_effect(move |prev_run: Option<()>| {
        if prev_run.is_some() {
            return;
        }
        spawn_local(app_state.refresh_status());
        spawn_local(app_state.load_preferences());
    });

    view! {
        <Title formatter=|page: String| if page.is_empty() { "KopiaUI".to_string() } else { format!("{} - KopiaUI", page) } />
        <Router>
            <AppShell>
                <Routes>
                    <Route path="/" view=|| view! { <Redirect path="/snapshots" /> } />
                    <Route path="/snapshots" view=|| view! { <RequireRepo><SourcesList /></RequireRepo> } />
                    <Route path="/snapshots/single-source" view=|| view! { <RequireRepo><SnapshotHistory /></RequireRepo> } />
                    <Route path="/policies" view=|| view! { <RequireRepo><PoliciesPage /></RequireRepo> } />
                    <Route path="/tasks" view=|| view! { <RequireRepo><TasksPage /></RequireRepo> } />
                    <Route path="/notifications" view=|| view! { <RequireRepo><NotificationProfiles /></RequireRepo> } />
                    <Route path="/repo" view=RepositoryPage />
                    <Route path="/preferences" view=PreferencesPage />
                    <Route path="/*" view=NotFoundPage />
                </Routes>
            </AppShell>
        </Router>
    }
}

/// Pages that need a connected repository send the user to `/repo` otherwise
#[component]
fn RequireRepo(children: ChildrenFn) -> impl IntoView {
    let app_state = expect_context::<AppState>();

    view! {
        <Show
            when=move || !app_state.disconnected()
            fallback=|| view! { <Redirect path="/repo" /> }
        >
            {children()}
        </Show>
    }
}

/// 404 Not Found page
#[component]
fn NotFoundPage() -> impl IntoView {
    view! {
        <div class="flex-1 flex items-center justify-center p-6">
            <div class="text-center">
                <h1 class="text-6xl font-bold text-theme-muted mb-4">"404"</h1>
                <p class="text-xl text-theme-secondary mb-6">"Page not found"</p>
                <a href="/snapshots" class="btn-primary">"Go to Snapshots"</a>
            </div>
        </div>
    }
}
