//! Snapshot history of one source

use chrono::Utc;
use kopia_console_shared::{
    format_optional_duration, parse_query, rfc3339_timestamp_for_display, size_display_name,
    Column, SnapshotInfo, SnapshotSource, SortDirection, SortValue,
};
use leptos::*;
use leptos_router::use_location;

use crate::client::ConsoleClient;
use crate::components::common::{Checkbox, DataTable, ErrorBanner, PageHeader, TableColumn};
use crate::state::AppState;

/// Source selected by the `userName`, `host` and `path` query parameters
fn source_from_query(search: &str) -> SnapshotSource {
    let mut query = parse_query(search);
    SnapshotSource {
        user_name: query.remove("userName").unwrap_or_default(),
        host: query.remove("host").unwrap_or_default(),
        path: query.remove("path").unwrap_or_default(),
    }
}

#[component]
pub fn SnapshotHistory() -> impl IntoView {
    let app_state = expect_context::<AppState>();
    let location = use_location();
    let source = create_memo(move |_| source_from_query(&location.search.get()));
    let (show_all, set_show_all) = create_signal(false);

    let snapshots = create_resource(
        move || (source.get(), show_all.get()),
        move |(source, all)| async move { app_state.client().snapshots(&source, all).await },
    );

    let rows = Signal::derive(move || match snapshots.get() {
        Some(Ok(resp)) => resp.snapshots,
        _ => Vec::new(),
    });
    let error = Signal::derive(move || match snapshots.get() {
        Some(Err(e)) => Some(e),
        _ => None,
    });
    let counts = move || match snapshots.get() {
        Some(Ok(resp)) if !show_all.get() && resp.unfiltered_count > resp.unique_count => Some(format!(
            "Displaying {} of {} snapshots",
            resp.unique_count, resp.unfiltered_count
        )),
        _ => None,
    };

    let base2 = move || app_state.preferences.with(|p| p.bytes_string_base2);

    let columns = vec![
        TableColumn::new(
            Column::new("startTime", "Start Time", |s: &SnapshotInfo| s.start_time.into()),
            |s: &SnapshotInfo| rfc3339_timestamp_for_display(s.start_time),
        ),
        TableColumn::new(
            Column::new("description", "Description", |s: &SnapshotInfo| s.description.as_str().into()),
            |s: &SnapshotInfo| s.description.clone(),
        ),
        TableColumn::new(
            Column::new("rootID", "Root", |s: &SnapshotInfo| s.root_id.as_str().into()),
            |s: &SnapshotInfo| {
                view! { <span class="font-mono text-xs">{s.root_id.clone()}</span> }
            },
        ),
        TableColumn::new(
            Column::new("retention", "Retention", |s: &SnapshotInfo| s.retention.join(", ").into()),
            |s: &SnapshotInfo| {
                let mut tags = s.retention.clone();
                tags.extend(s.pins.iter().map(|p| format!("pin: {}", p)));
                tags.join(", ")
            },
        ),
        TableColumn::new(
            Column::new("size", "Size", |s: &SnapshotInfo| s.summary.size.into()),
            move |s: &SnapshotInfo| {
                let size = s.summary.size;
                move || size_display_name(Some(size), base2())
            },
        ),
        TableColumn::new(
            Column::new("files", "Files", |s: &SnapshotInfo| s.summary.files.into()),
            |s: &SnapshotInfo| s.summary.files.to_string(),
        ),
        TableColumn::new(
            Column::new("duration", "Duration", |s: &SnapshotInfo| match (s.start_time, s.end_time) {
                (Some(start), Some(end)) => (end - start).num_milliseconds().into(),
                _ => SortValue::Empty,
            }),
            |s: &SnapshotInfo| {
                let text = format_optional_duration(s.start_time, s.end_time, Utc::now());
                if s.incomplete.is_empty() {
                    text
                } else {
                    format!("{} (incomplete: {})", text, s.incomplete)
                }
            },
        ),
    ];

    view! {
        <div class="p-6 max-w-7xl mx-auto">
            <PageHeader title="Snapshot History">
                <Checkbox
                    label="Show all"
                    checked=show_all
                    on_change=Callback::new(move |on: bool| set_show_all.set(on))
                />
                <button class="btn-secondary" on:click=move |_| snapshots.refetch()>"Refresh"</button>
            </PageHeader>

            <div class="mb-4 text-sm text-theme-secondary">
                {move || source.get().display_target()}
                {move || counts().map(|c| view! { <span class="ml-4 text-theme-muted">{c}</span> })}
            </div>

            <ErrorBanner error=error />

            <DataTable rows=rows columns=columns initial_sort=("startTime", SortDirection::Descending) />
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_from_query() {
        let source = source_from_query("?userName=alice&host=laptop&path=%2Fhome%2Falice");
        assert_eq!(source.owner_name(), "alice@laptop");
        assert_eq!(source.path, "/home/alice");
        assert_eq!(source_from_query(&source.query_string()), source);
    }
}
