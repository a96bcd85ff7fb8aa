//! Policy listing and new-policy target check

use kopia_console_shared::{check_policy_path, Column, PolicyEntry, PolicyTarget, SnapshotSource};
use leptos::*;

use crate::client::ConsoleClient;
use crate::components::common::{DataTable, ErrorBanner, PageHeader, TableColumn, TextInput};
use crate::state::AppState;

/// Backend source triple for a checked policy target
fn target_source(target: &PolicyTarget, local_user: &str, local_host: &str) -> SnapshotSource {
    match target {
        PolicyTarget::Path(path) => SnapshotSource {
            host: local_host.to_string(),
            user_name: local_user.to_string(),
            path: path.clone(),
        },
        PolicyTarget::Host { host } => SnapshotSource {
            host: host.clone(),
            ..Default::default()
        },
        PolicyTarget::User { user, host } => SnapshotSource {
            host: host.clone(),
            user_name: user.clone(),
            ..Default::default()
        },
        PolicyTarget::UserPath { user, host, path } => SnapshotSource {
            host: host.clone(),
            user_name: user.clone(),
            path: path.clone(),
        },
    }
}

#[component]
pub fn PoliciesPage() -> impl IntoView {
    let app_state = expect_context::<AppState>();
    let policies = create_resource(|| (), move |_| async move { app_state.client().policies().await });

    let rows = Signal::derive(move || match policies.get() {
        Some(Ok(resp)) => resp.policies,
        _ => Vec::new(),
    });
    let error = Signal::derive(move || match policies.get() {
        Some(Err(e)) => Some(e),
        _ => None,
    });

    let (new_target, set_new_target) = create_signal(String::new());
    let (selected, set_selected) = create_signal(Option::<SnapshotSource>::None);
    let (target_error, set_target_error) = create_signal(Option::<String>::None);

    let on_check = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        match check_policy_path(new_target.get().trim()) {
            Ok(target) => {
                let identity = app_state.repo_status.with(|s| {
                    s.as_ref()
                        .map(|s| (s.username.clone(), s.hostname.clone()))
                        .unwrap_or_default()
                });
                set_target_error.set(None);
                set_selected.set(Some(target_source(&target, &identity.0, &identity.1)));
            }
            Err(e) => {
                set_target_error.set(Some(e.to_string()));
                set_selected.set(None);
            }
        }
    };

    let columns = vec![
        TableColumn::new(
            Column::new("target", "Target", |p: &PolicyEntry| p.target.display_target().into()),
            move |p: &PolicyEntry| {
                let target = p.target.clone();
                view! {
                    <button
                        class="text-accent hover:underline"
                        on:click=move |_| set_selected.set(Some(target.clone()))
                    >
                        {p.target.display_target()}
                    </button>
                }
            },
        ),
        TableColumn::new(
            Column::new("sections", "Defined Settings", |p: &PolicyEntry| {
                (p.defined_sections() as u64).into()
            }),
            |p: &PolicyEntry| p.defined_sections().to_string(),
        ),
    ];

    let details = move || {
        let source = selected.get()?;
        let policy = rows.with(|rows| rows.iter().find(|p| p.target == source).map(|p| p.policy.clone()));
        let body = match policy {
            Some(policy) => serde_json::to_string_pretty(&policy).unwrap_or_default(),
            None => "No policy defined yet. Settings are inherited from the parent policies.".to_string(),
        };
        Some(view! {
            <div class="mt-6 bg-theme-surface rounded-xl border border-theme-border p-4">
                <h3 class="font-medium text-theme mb-2">{source.display_target()}</h3>
                <pre class="text-xs font-mono text-theme-secondary whitespace-pre-wrap">{body}</pre>
            </div>
        })
    };

    view! {
        <div class="p-6 max-w-7xl mx-auto">
            <PageHeader title="Policies" description="Snapshot policies defined in this repository">
                <button class="btn-secondary" on:click=move |_| policies.refetch()>"Refresh"</button>
            </PageHeader>

            <form on:submit=on_check class="flex items-start gap-2 mb-4">
                <div class="flex-1">
                    <TextInput
                        value=new_target
                        on_change=Callback::new(move |v: String| set_new_target.set(v))
                        placeholder="enter directory, @host, user@host or user@host:/path"
                    />
                    {move || target_error.get().map(|e| view! { <p class="text-xs text-error mt-1">{e}</p> })}
                </div>
                <button type="submit" class="btn-primary">"Set Policy"</button>
            </form>

            <ErrorBanner error=error />

            <DataTable rows=rows columns=columns />

            {details}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_path_uses_connected_identity() {
        let target = check_policy_path("/home/alice").unwrap();
        let source = target_source(&target, "alice", "laptop");
        assert_eq!(source.display_target(), "alice@laptop:/home/alice");
    }

    #[test]
    fn test_host_target() {
        let target = check_policy_path("@server").unwrap();
        assert_eq!(target_source(&target, "alice", "laptop").display_target(), "@server");
    }
}
