//! UI preferences

use kopia_console_shared::{RequestError, Theme, UiPreferences, PAGE_SIZES};
use leptos::*;

use crate::components::common::{Checkbox, ErrorBanner, FormField, PageHeader};
use crate::state::AppState;

#[component]
pub fn PreferencesPage() -> impl IntoView {
    let app_state = expect_context::<AppState>();

    // Edit a draft, apply on save
    let draft = create_rw_signal(app_state.preferences.get_untracked());
    create_effect(move |_| draft.set(app_state.preferences.get()));

    let (saving, set_saving) = create_signal(false);
    let (saved, set_saved) = create_signal(false);
    let save_error = create_rw_signal(Option::<RequestError>::None);

    let update = move |f: fn(&mut UiPreferences, String), value: String| {
        set_saved.set(false);
        draft.update(|d| f(d, value));
    };

    let on_save = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        set_saving.set(true);
        let prefs = draft.get_untracked();
        spawn_local(async move {
            match app_state.save_preferences(prefs).await {
                Ok(()) => {
                    save_error.set(None);
                    set_saved.set(true);
                }
                Err(e) => save_error.set(Some(e)),
            }
            set_saving.set(false);
        });
    };

    view! {
        <div class="p-6 max-w-3xl mx-auto">
            <PageHeader title="Preferences" />

            <ErrorBanner error=save_error />

            <form on:submit=on_save class="bg-theme-surface rounded-xl border border-theme-border p-6 space-y-4">
                <FormField label="Theme">
                    <select
                        class="input-field w-full"
                        on:change=move |ev| update(
                            |d, v| d.theme = Theme::from_id(&v).unwrap_or_default(),
                            event_target_value(&ev),
                        )
                    >
                        {Theme::ALL
                            .into_iter()
                            .map(|theme| view! {
                                <option value=theme.id() selected=move || draft.with(|d| d.theme == theme)>
                                    {theme.label()}
                                </option>
                            })
                            .collect_view()}
                    </select>
                </FormField>

                <FormField label="Rows Per Page" description="Default page size for tables">
                    <select
                        class="input-field w-full"
                        on:change=move |ev| update(
                            |d, v| d.page_size = v.parse().unwrap_or(d.page_size),
                            event_target_value(&ev),
                        )
                    >
                        {PAGE_SIZES
                            .into_iter()
                            .map(|size| view! {
                                <option
                                    value=size.to_string()
                                    selected=move || draft.with(|d| d.effective_page_size() == size)
                                >
                                    {size}
                                </option>
                            })
                            .collect_view()}
                    </select>
                </FormField>

                <Checkbox
                    label="Show sizes in binary units (KiB, MiB)"
                    checked=Signal::derive(move || draft.with(|d| d.bytes_string_base2))
                    on_change=Callback::new(move |on: bool| update(|d, v| d.bytes_string_base2 = v == "true", on.to_string()))
                />
                <Checkbox
                    label="Show all snapshots by default"
                    checked=Signal::derive(move || draft.with(|d| d.default_snapshot_view_all))
                    on_change=Callback::new(move |on: bool| update(|d, v| d.default_snapshot_view_all = v == "true", on.to_string()))
                />

                <div class="flex items-center gap-3 pt-2">
                    <button type="submit" class="btn-primary" disabled=saving>
                        {move || if saving.get() { "Saving..." } else { "Save" }}
                    </button>
                    <Show when=move || saved.get()>
                        <span class="text-success text-sm">"Saved"</span>
                    </Show>
                </div>
            </form>
        </div>
    }
}
