//! Repository setup wizard
//!
//! Renders the [`Wizard`] state machine and executes the commands it returns.
//! Results are fed back as messages; the reducer drops any that belong to a
//! request the user has since abandoned.

mod provider_form;
mod repo_forms;

use kopia_console_shared::{ConnectionState, Wizard, WizardCommand, WizardMsg};
use leptos::*;

use crate::client::{ConsoleClient, HttpClient};
use crate::components::common::{ErrorBanner, Spinner};
use crate::state::AppState;

use provider_form::{ProviderFields, ProviderPicker};
use repo_forms::{ConnectRepoForm, CreateRepoForm};

/// Apply a message and run whatever side effect it asks for
fn dispatch(wizard: RwSignal<Wizard>, app_state: AppState, msg: WizardMsg) {
    let mut command = None;
    wizard.update(|w| {
        command = w.update(msg);
        tracing::debug!(state = ?w.state(), "wizard transition");
    });

    if let Some(command) = command {
        spawn_local(async move {
            if let Some(msg) = execute(app_state, command).await {
                dispatch(wizard, app_state, msg);
            }
        });
    }
}

async fn execute(app_state: AppState, command: WizardCommand) -> Option<WizardMsg> {
    let client: HttpClient = app_state.client();

    let msg = match command {
        WizardCommand::LoadAlgorithms { ticket } => WizardMsg::AlgorithmsLoaded {
            ticket,
            result: client.algorithms().await,
        },
        WizardCommand::Probe { ticket, request } => WizardMsg::ProbeFinished {
            ticket,
            result: client.repo_exists(&request).await,
        },
        WizardCommand::Create { ticket, request } => WizardMsg::CreateFinished {
            ticket,
            result: client.create_repo(&request).await,
        },
        WizardCommand::Connect { ticket, request } => WizardMsg::ConnectFinished {
            ticket,
            result: client.connect_repo(&request).await,
        },
        WizardCommand::NotifyConnected => {
            tracing::info!("Repository connected");
            app_state.refresh_status().await;
            return None;
        }
    };
    Some(msg)
}

/// Setup wizard component
#[component]
pub fn SetupWizard() -> impl IntoView {
    let app_state = expect_context::<AppState>();
    let wizard = create_rw_signal(Wizard::new());
    let send = Callback::new(move |msg: WizardMsg| dispatch(wizard, app_state, msg));

    // Only re-render the step when the step itself changes, not on every keystroke
    let state = create_memo(move |_| wizard.with(|w| w.state().clone()));
    let busy = create_memo(move |_| wizard.with(Wizard::is_busy));
    let can_go_back = create_memo(move |_| wizard.with(Wizard::can_go_back));
    let error = Signal::derive(move || wizard.with(|w| w.error().cloned()));

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        send.call(WizardMsg::Submit);
    };

    view! {
        <div class="max-w-3xl mx-auto p-6">
            <div class="bg-theme-surface rounded-xl border border-theme-border p-6 shadow-lg">
                <h2 class="text-xl font-semibold text-theme mb-6">{move || state.get().title()}</h2>

                <ErrorBanner error=error />

                <form on:submit=on_submit class="space-y-4">
                    {move || match state.get() {
                        ConnectionState::SelectingProvider => {
                            view! { <ProviderPicker wizard=wizard send=send /> }.into_view()
                        }
                        ConnectionState::ConfiguringProvider => {
                            view! { <ProviderFields wizard=wizard send=send /> }.into_view()
                        }
                        ConnectionState::ProbingExistence => {
                            view! { <Spinner label="Checking if repository exists..." /> }.into_view()
                        }
                        ConnectionState::ConfirmingCreate => {
                            view! { <CreateRepoForm wizard=wizard send=send /> }.into_view()
                        }
                        ConnectionState::ConfirmingConnect => {
                            view! { <ConnectRepoForm wizard=wizard send=send /> }.into_view()
                        }
                        ConnectionState::Connected => view! {
                            <p class="text-success">"Repository connected."</p>
                        }
                        .into_view(),
                        ConnectionState::Failed(reason) => view! {
                            <p class="text-error">{format!("Unable to prepare repository creation: {}", reason)}</p>
                        }
                        .into_view(),
                    }}

                    <div class="flex items-center justify-between pt-4">
                        <Show when=move || can_go_back.get()>
                            <button
                                type="button"
                                class="btn-secondary"
                                on:click=move |_| send.call(WizardMsg::Back)
                            >
                                "Back"
                            </button>
                        </Show>
                        <Show when=move || {
                            matches!(
                                state.get(),
                                ConnectionState::ConfiguringProvider
                                    | ConnectionState::ConfirmingCreate
                                    | ConnectionState::ConfirmingConnect
                            )
                        }>
                            <button type="submit" class="btn-primary ml-auto" disabled=move || busy.get()>
                                {move || submit_label(&state.get(), busy.get())}
                            </button>
                        </Show>
                    </div>
                </form>
            </div>
        </div>
    }
}

fn submit_label(state: &ConnectionState, busy: bool) -> &'static str {
    match (state, busy) {
        (ConnectionState::ConfirmingCreate, true) => "Creating...",
        (ConnectionState::ConfirmingCreate, false) => "Create Repository",
        (ConnectionState::ConfirmingConnect, true) => "Connecting...",
        (ConnectionState::ConfirmingConnect, false) => "Connect To Repository",
        _ => "Next",
    }
}
