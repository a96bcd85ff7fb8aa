//! Notification profiles

use kopia_console_shared::{severity_label, Column, NotificationProfile};
use leptos::*;

use crate::client::ConsoleClient;
use crate::components::common::{DataTable, ErrorBanner, PageHeader, TableColumn};
use crate::state::AppState;

fn method_label(kind: &str) -> &str {
    match kind {
        "email" => "E-mail",
        "pushover" => "Pushover",
        "webhook" => "Webhook",
        other => other,
    }
}

#[component]
pub fn NotificationProfiles() -> impl IntoView {
    let app_state = expect_context::<AppState>();
    let profiles = create_resource(|| (), move |_| async move {
        app_state.client().notification_profiles().await
    });

    let rows = Signal::derive(move || profiles.get().and_then(Result::ok).unwrap_or_default());
    let error = Signal::derive(move || profiles.get().and_then(Result::err));

    let columns = vec![
        TableColumn::new(
            Column::new("profile", "Profile", |p: &NotificationProfile| p.profile.as_str().into()),
            |p: &NotificationProfile| p.profile.clone(),
        ),
        TableColumn::new(
            Column::new("method", "Method", |p: &NotificationProfile| p.method.kind.as_str().into()),
            |p: &NotificationProfile| method_label(&p.method.kind).to_string(),
        ),
        TableColumn::new(
            Column::new("minSeverity", "Minimum Severity", |p: &NotificationProfile| {
                i64::from(p.min_severity).into()
            }),
            |p: &NotificationProfile| severity_label(p.min_severity),
        ),
    ];

    view! {
        <div class="p-6 max-w-7xl mx-auto">
            <PageHeader title="Notifications" description="Where repository events are reported">
                <button class="btn-secondary" on:click=move |_| profiles.refetch()>"Refresh"</button>
            </PageHeader>

            <ErrorBanner error=error />

            <DataTable rows=rows columns=columns />
        </div>
    }
}
