//! Repository status, or the setup wizard when nothing is connected

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Interval;
use kopia_console_shared::{size_display_name, RepoStatus, RequestError};
use leptos::*;

use crate::client::ConsoleClient;
use crate::components::common::{ErrorBanner, PageHeader, Spinner};
use crate::components::setup::SetupWizard;
use crate::state::AppState;

const INIT_POLL_INTERVAL_MS: u32 = 1_000;

#[component]
pub fn RepositoryPage() -> impl IntoView {
    let app_state = expect_context::<AppState>();

    // Poll while the backend is still opening the repository
    let poll: Rc<RefCell<Option<Interval>>> = Rc::new(RefCell::new(None));
    let poll_effect = Rc::clone(&poll);
    create_effect(move |_| {
        let initializing = app_state
            .repo_status
            .with(|s| s.as_ref().is_some_and(RepoStatus::is_initializing));
        let mut slot = poll_effect.borrow_mut();
        match (initializing, slot.is_some()) {
            (true, false) => {
                tracing::debug!("Repository initializing, polling status");
                *slot = Some(Interval::new(INIT_POLL_INTERVAL_MS, move || {
                    spawn_local(app_state.refresh_status());
                }));
            }
            (false, true) => *slot = None,
            _ => {}
        }
    });
    on_cleanup(move || {
        poll.borrow_mut().take();
    });

    move || match app_state.repo_status.get() {
        None => match app_state.status_error.get() {
            Some(_) => view! {
                <div class="p-6 max-w-3xl mx-auto">
                    <ErrorBanner error=app_state.status_error />
                </div>
            }
            .into_view(),
            None => view! { <Spinner label="Loading..." /> }.into_view(),
        },
        Some(status) if status.is_initializing() => view! {
            <Spinner label="Initializing repository, please wait..." />
        }
        .into_view(),
        Some(status) if status.connected => view! { <RepositoryStatus status=status /> }.into_view(),
        Some(_) => view! { <SetupWizard /> }.into_view(),
    }
}

#[component]
fn RepositoryStatus(status: RepoStatus) -> impl IntoView {
    let app_state = expect_context::<AppState>();
    let (disconnecting, set_disconnecting) = create_signal(false);
    let disconnect_error = create_rw_signal(Option::<RequestError>::None);

    let on_disconnect = move |_| {
        set_disconnecting.set(true);
        spawn_local(async move {
            match app_state.client().disconnect_repo().await {
                Ok(()) => {
                    tracing::info!("Repository disconnected");
                    disconnect_error.set(None);
                    app_state.refresh_status().await;
                }
                Err(e) => disconnect_error.set(Some(e)),
            }
            set_disconnecting.set(false);
        });
    };

    let base2 = app_state.preferences.with_untracked(|p| p.bytes_string_base2);
    let description = if status.description.is_empty() {
        "Repository".to_string()
    } else {
        status.description.clone()
    };

    let rows: Vec<(&'static str, String)> = if status.api_server_url.is_empty() {
        vec![
            ("Config File", status.config_file.clone()),
            ("Storage Type", status.storage.clone()),
            ("Hash Algorithm", status.hash.clone()),
            ("Encryption Algorithm", status.encryption.clone()),
            ("Splitter Algorithm", status.splitter.clone()),
            ("Repository Format", status.format_version.to_string()),
            (
                "Error Correction",
                if status.ecc.is_empty() {
                    "None".to_string()
                } else {
                    format!("{} ({}% overhead)", status.ecc, status.ecc_overhead_percent)
                },
            ),
            ("Max Pack Size", size_display_name(Some(status.max_pack_size), base2)),
            ("Connected As", status.client_identity()),
            ("Read Only", if status.readonly { "Yes" } else { "No" }.to_string()),
        ]
    } else {
        vec![
            ("Config File", status.config_file.clone()),
            ("Server URL", status.api_server_url.clone()),
            ("Connected As", status.client_identity()),
        ]
    };

    view! {
        <div class="p-6 max-w-3xl mx-auto">
            <PageHeader title="Repository">
                <button class="btn-danger" disabled=disconnecting on:click=on_disconnect>
                    {move || if disconnecting.get() { "Disconnecting..." } else { "Disconnect" }}
                </button>
            </PageHeader>

            <ErrorBanner error=disconnect_error />

            <div class="bg-theme-surface rounded-xl border border-theme-border p-6">
                <h2 class="text-lg font-semibold text-theme mb-4">{description}</h2>
                <dl class="grid grid-cols-3 gap-x-4 gap-y-2 text-sm">
                    {rows
                        .into_iter()
                        .map(|(label, value)| view! {
                            <dt class="text-theme-secondary">{label}</dt>
                            <dd class="col-span-2 text-theme font-mono">{value}</dd>
                        })
                        .collect_view()}
                </dl>
            </div>
        </div>
    }
}
