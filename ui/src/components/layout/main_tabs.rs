//! Main Navigation Tabs Component
//!
//! Horizontal tabs for top-level navigation, with a badge counting running
//! tasks and the repository connection status on the right.

use leptos::*;
use leptos_router::*;

use crate::state::AppState;

/// Main navigation tabs at the top of the app
#[component]
pub fn MainTabs() -> impl IntoView {
    let app_state = expect_context::<AppState>();
    let running = move || app_state.tasks_summary.with(|s| s.running());

    view! {
        <header class="bg-theme-surface border-b border-theme-border flex-shrink-0">
            <div class="h-14 flex items-center px-4 gap-4">
                <A href="/snapshots" class="flex items-center gap-2 text-theme flex-shrink-0">
                    <div class="w-8 h-8 bg-gradient-to-br from-blue-500 to-purple-600 rounded-lg flex items-center justify-center">
                        <span class="text-white text-sm font-bold">"K"</span>
                    </div>
                    <span class="text-lg font-bold">"Kopia"</span>
                </A>

                <nav class="flex items-center gap-1 ml-6">
                    <MainTab href="/snapshots" label="Snapshots" requires_repo=true />
                    <MainTab href="/policies" label="Policies" requires_repo=true />
                    <MainTab href="/tasks" label="Tasks" requires_repo=true>
                        {move || {
                            let n = running();
                            (n > 0).then(|| view! {
                                <span class="ml-2 px-1.5 py-0.5 rounded-full bg-white/20 text-xs">
                                    {format!("{} running", n)}
                                </span>
                            })
                        }}
                    </MainTab>
                    <MainTab href="/repo" label="Repository" />
                    <MainTab href="/notifications" label="Notifications" requires_repo=true />
                    <MainTab href="/preferences" label="Preferences" />
                </nav>

                <div class="flex items-center gap-3 ml-auto">
                    <ConnectionBadge />
                </div>
            </div>
        </header>
    }
}

/// Individual main tab
#[component]
fn MainTab(
    href: &'static str,
    label: &'static str,
    /// Greyed out while no repository is connected
    #[prop(default = false)]
    requires_repo: bool,
    #[prop(optional)] children: Option<Children>,
) -> impl IntoView {
    let app_state = expect_context::<AppState>();
    let location = use_location();

    view! {
        <A
            href=href
            class=move || {
                let pathname = location.pathname.get();
                let is_active = pathname == href || pathname.starts_with(&format!("{}/", href));

                let base = "px-4 py-2 rounded-lg text-sm font-medium transition-colors flex items-center";
                if is_active {
                    format!("{} bg-accent text-white", base)
                } else if requires_repo && !app_state.connected() {
                    format!("{} text-theme-muted pointer-events-none opacity-50", base)
                } else {
                    format!("{} text-theme-secondary hover:text-theme hover:bg-theme-surface-hover", base)
                }
            }
        >
            {label}
            {children.map(|c| c())}
        </A>
    }
}

/// Connection status badge
#[component]
fn ConnectionBadge() -> impl IntoView {
    let app_state = expect_context::<AppState>();

    let label = move || {
        app_state.repo_status.with(|status| match status {
            None => "Checking...".to_string(),
            Some(s) if s.is_initializing() => "Opening repository...".to_string(),
            Some(s) if s.connected => s.client_identity(),
            Some(_) => "Not connected".to_string(),
        })
    };

    view! {
        <div class=move || {
            let base = "flex items-center gap-2 px-3 py-1.5 rounded-full text-xs font-medium";
            if app_state.connected() {
                format!("{} bg-success/10 text-success", base)
            } else {
                format!("{} bg-theme-surface text-theme-muted", base)
            }
        }>
            <div class=move || {
                let base = "w-2 h-2 rounded-full";
                if app_state.connected() {
                    format!("{} bg-success", base)
                } else {
                    format!("{} bg-theme-muted", base)
                }
            } />
            <span>{label}</span>
            {move || app_state.status_error.get().map(|e| view! {
                <span class="text-error" title=e.to_string()>"!"</span>
            })}
        </div>
    }
}
