//! Task list

use chrono::Utc;
use kopia_console_shared::{
    format_optional_duration, rfc3339_timestamp_for_display, Column, SortDirection, TaskInfo,
    TaskStatus,
};
use leptos::*;

use crate::client::ConsoleClient;
use crate::components::common::{DataTable, ErrorBanner, PageHeader, TableColumn};
use crate::state::AppState;

fn status_class(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Running | TaskStatus::Canceling => "text-accent",
        TaskStatus::Success => "text-success",
        TaskStatus::Failed => "text-error",
        TaskStatus::Canceled => "text-theme-muted",
    }
}

#[component]
pub fn TasksPage() -> impl IntoView {
    let app_state = expect_context::<AppState>();
    let tasks = create_resource(|| (), move |_| async move { app_state.client().tasks().await });

    // Refetch whenever the polled summary changes.
    create_effect(move |prev: Option<u64>| {
        let running = app_state.tasks_summary.with(|s| s.running());
        if prev.is_some_and(|p| p != running) {
            tasks.refetch();
        }
        running
    });

    let rows = Signal::derive(move || match tasks.get() {
        Some(Ok(resp)) => resp.tasks,
        _ => Vec::new(),
    });
    let error = Signal::derive(move || match tasks.get() {
        Some(Err(e)) => Some(e),
        _ => None,
    });

    let columns = vec![
        TableColumn::new(
            Column::new("startTime", "Start Time", |t: &TaskInfo| t.start_time.into()),
            |t: &TaskInfo| rfc3339_timestamp_for_display(t.start_time),
        ),
        TableColumn::new(
            Column::new("status", "Status", |t: &TaskInfo| t.status.label().into()),
            |t: &TaskInfo| {
                let title = t.error_message.clone().unwrap_or_default();
                view! { <span class=status_class(t.status) title=title>{t.status.label()}</span> }
            },
        ),
        TableColumn::new(
            Column::new("kind", "Kind", |t: &TaskInfo| t.kind.as_str().into()),
            |t: &TaskInfo| t.kind.clone(),
        ),
        TableColumn::new(
            Column::new("description", "Description", |t: &TaskInfo| t.description.as_str().into()),
            |t: &TaskInfo| t.description.clone(),
        ),
        TableColumn::new(
            Column::new("duration", "Duration", |t: &TaskInfo| t.end_time.into()).unsortable(),
            |t: &TaskInfo| format_optional_duration(t.start_time, t.end_time, Utc::now()),
        ),
    ];

    view! {
        <div class="p-6 max-w-7xl mx-auto">
            <PageHeader title="Tasks" description="Recent and running repository tasks">
                <button class="btn-secondary" on:click=move |_| tasks.refetch()>"Refresh"</button>
            </PageHeader>

            <ErrorBanner error=error />

            <DataTable rows=rows columns=columns initial_sort=("startTime", SortDirection::Descending) />
        </div>
    }
}
