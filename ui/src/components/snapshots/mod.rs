//! Snapshot sources and per-source history

mod history;

pub use history::SnapshotHistory;

use kopia_console_shared::{
    rfc3339_timestamp_for_display, size_display_name, Column, SortDirection, SourceStatus,
    SourcesResponse,
};
use leptos::*;
use leptos_router::A;

use crate::client::ConsoleClient;
use crate::components::common::{DataTable, ErrorBanner, PageHeader, TableColumn};
use crate::state::AppState;

fn source_label(status: &str) -> &'static str {
    match status {
        "IDLE" => "Idle",
        "PENDING" => "Pending",
        "UPLOADING" => "Snapshotting",
        "REMOTE" => "Remote",
        _ => "Unknown",
    }
}

/// Sources visible with the current owner filter
fn visible_sources(resp: &SourcesResponse, show_all: bool) -> Vec<SourceStatus> {
    let local = format!("{}@{}", resp.local_username, resp.local_host);
    resp.sources
        .iter()
        .filter(|s| show_all || !resp.multi_user || s.source.owner_name() == local)
        .cloned()
        .collect()
}

#[component]
pub fn SourcesList() -> impl IntoView {
    let app_state = expect_context::<AppState>();
    let show_all = create_rw_signal(
        app_state
            .preferences
            .with_untracked(|p| p.default_snapshot_view_all),
    );

    let sources = create_resource(|| (), move |_| async move { app_state.client().sources().await });

    let rows = Signal::derive(move || match sources.get() {
        Some(Ok(resp)) => visible_sources(&resp, show_all.get()),
        _ => Vec::new(),
    });
    let error = Signal::derive(move || match sources.get() {
        Some(Err(e)) => Some(e),
        _ => None,
    });
    let multi_user = move || matches!(sources.get(), Some(Ok(r)) if r.multi_user);

    let base2 = move || app_state.preferences.with(|p| p.bytes_string_base2);

    let columns = vec![
        TableColumn::new(
            Column::new("path", "Path", |s: &SourceStatus| s.source.path.as_str().into()),
            |s: &SourceStatus| {
                let href = format!("/snapshots/single-source?{}", s.source.query_string());
                view! { <A href=href class="text-accent hover:underline">{s.source.path.clone()}</A> }
            },
        ),
        TableColumn::new(
            Column::new("owner", "Owner", |s: &SourceStatus| s.source.owner_name().into()),
            |s: &SourceStatus| s.source.owner_name(),
        ),
        TableColumn::new(
            Column::new("lastSnapshot", "Last Snapshot", |s: &SourceStatus| {
                s.last_snapshot.as_ref().and_then(|l| l.start_time).into()
            }),
            |s: &SourceStatus| {
                rfc3339_timestamp_for_display(s.last_snapshot.as_ref().and_then(|l| l.start_time))
            },
        ),
        TableColumn::new(
            Column::new("size", "Size", |s: &SourceStatus| {
                s.last_snapshot.as_ref().map_or(0, |l| l.stats.total_size).into()
            }),
            move |s: &SourceStatus| {
                let size = s.last_snapshot.as_ref().map(|l| l.stats.total_size);
                move || size_display_name(size, base2())
            },
        ),
        TableColumn::new(
            Column::new("nextSnapshot", "Next Snapshot", |s: &SourceStatus| s.next_snapshot_time.into()),
            |s: &SourceStatus| rfc3339_timestamp_for_display(s.next_snapshot_time),
        ),
        TableColumn::new(
            Column::new("status", "Status", |s: &SourceStatus| s.status.as_str().into()),
            |s: &SourceStatus| source_label(&s.status),
        ),
    ];

    view! {
        <div class="p-6 max-w-7xl mx-auto">
            <PageHeader title="Snapshots" description="Sources backed up to this repository">
                <Show when=multi_user>
                    <select
                        class="input-field"
                        on:change=move |ev| show_all.set(event_target_value(&ev) == "all")
                    >
                        <option value="local" selected=move || !show_all.get()>"Local Snapshots"</option>
                        <option value="all" selected=move || show_all.get()>"All Snapshots"</option>
                    </select>
                </Show>
                <button class="btn-secondary" on:click=move |_| sources.refetch()>"Refresh"</button>
            </PageHeader>

            <ErrorBanner error=error />

            <DataTable rows=rows columns=columns initial_sort=("path", SortDirection::Ascending) />
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kopia_console_shared::SnapshotSource;

    fn source(user: &str, host: &str) -> SourceStatus {
        SourceStatus {
            source: SnapshotSource {
                host: host.to_string(),
                user_name: user.to_string(),
                path: "/data".to_string(),
            },
            status: "IDLE".to_string(),
            last_snapshot: None,
            next_snapshot_time: None,
        }
    }

    #[test]
    fn test_visible_sources_filters_other_owners() {
        let resp = SourcesResponse {
            local_username: "alice".into(),
            local_host: "laptop".into(),
            multi_user: true,
            sources: vec![source("alice", "laptop"), source("bob", "server")],
        };
        assert_eq!(visible_sources(&resp, false).len(), 1);
        assert_eq!(visible_sources(&resp, true).len(), 2);
    }
}
