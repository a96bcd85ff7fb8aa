//! Create and connect confirmation steps

use kopia_console_shared::{
    AlgorithmInfo, AlgorithmsResponse, ConnectField, ConnectForm, CreateField, CreateForm,
    ProviderKind, Wizard, WizardMsg, FORMAT_VERSIONS,
};
use leptos::*;

use crate::components::common::{Checkbox, FormField, TextInput};

fn create_value(form: &CreateForm, field: CreateField) -> &str {
    match field {
        CreateField::Password => &form.password,
        CreateField::ConfirmPassword => &form.confirm_password,
        CreateField::Hash => &form.hash,
        CreateField::Encryption => &form.encryption,
        CreateField::Splitter => &form.splitter,
        CreateField::Ecc => &form.ecc,
        CreateField::EccOverheadPercent => &form.ecc_overhead_percent,
        CreateField::FormatVersion => &form.format_version,
    }
}

fn connect_value(form: &ConnectForm, field: ConnectField) -> String {
    match field {
        ConnectField::Password => form.password.clone(),
        ConnectField::Description => form.description.clone(),
        ConnectField::Username => form.username.clone(),
        ConnectField::Hostname => form.hostname.clone(),
        ConnectField::Readonly => form.readonly.to_string(),
    }
}

#[component]
pub fn CreateRepoForm(wizard: RwSignal<Wizard>, send: Callback<WizardMsg>) -> impl IntoView {
    let (show_advanced, set_show_advanced) = create_signal(false);
    let algorithms = create_memo(move |_| wizard.with(|w| w.algorithms().cloned()));

    let value = move |field: CreateField| {
        Signal::derive(move || wizard.with(|w| create_value(w.create_form(), field).to_string()))
    };
    let setter = move |field: CreateField| {
        Callback::new(move |v: String| send.call(WizardMsg::SetCreate(field, v)))
    };
    let error = move |name: &'static str| {
        Signal::derive(move || wizard.with(|w| w.field_error(name).map(str::to_string)))
    };
    let options = move |pick: fn(&AlgorithmsResponse) -> &Vec<AlgorithmInfo>| {
        Signal::derive(move || algorithms.with(|a| a.as_ref().map(|a| pick(a).clone()).unwrap_or_default()))
    };

    view! {
        <div class="space-y-4">
            <p class="text-sm text-theme-secondary">
                "No repository was found in this storage. Enter a password to create one."
            </p>

            <FormField label="Repository Password" error=error("password")>
                <TextInput
                    value=value(CreateField::Password)
                    on_change=setter(CreateField::Password)
                    input_type="password"
                    placeholder="enter repository password"
                />
            </FormField>
            <FormField label="Confirm Repository Password" error=error("confirmPassword")>
                <TextInput
                    value=value(CreateField::ConfirmPassword)
                    on_change=setter(CreateField::ConfirmPassword)
                    input_type="password"
                    placeholder="enter repository password again"
                />
            </FormField>

            <button
                type="button"
                class="text-accent text-sm"
                on:click=move |_| set_show_advanced.update(|v| *v = !*v)
            >
                {move || if show_advanced.get() { "Hide Advanced Options" } else { "Show Advanced Options" }}
            </button>

            <Show when=move || show_advanced.get()>
                <div class="grid grid-cols-2 gap-4">
                    <AlgorithmSelect
                        label="Encryption"
                        value=value(CreateField::Encryption)
                        options=options(|a| &a.encryption)
                        on_change=setter(CreateField::Encryption)
                    />
                    <AlgorithmSelect
                        label="Hash Algorithm"
                        value=value(CreateField::Hash)
                        options=options(|a| &a.hash)
                        on_change=setter(CreateField::Hash)
                    />
                    <AlgorithmSelect
                        label="Splitter"
                        value=value(CreateField::Splitter)
                        options=options(|a| &a.splitter)
                        on_change=setter(CreateField::Splitter)
                    />
                    <AlgorithmSelect
                        label="Error Correction"
                        value=value(CreateField::Ecc)
                        options=options(|a| &a.ecc)
                        on_change=setter(CreateField::Ecc)
                        allow_none=true
                    />
                    <FormField label="Error Correction Overhead (%)" error=error("eccOverheadPercent")>
                        <TextInput
                            value=value(CreateField::EccOverheadPercent)
                            on_change=setter(CreateField::EccOverheadPercent)
                            input_type="number"
                        />
                    </FormField>
                    <FormField label="Repository Format" error=error("formatVersion")>
                        <select
                            class="input-field w-full"
                            on:change=move |ev| setter(CreateField::FormatVersion).call(event_target_value(&ev))
                        >
                            {FORMAT_VERSIONS
                                .into_iter()
                                .map(|v| {
                                    let current = value(CreateField::FormatVersion);
                                    view! {
                                        <option value=v selected=move || current.get() == v>
                                            {format!("Version {}", v)}
                                        </option>
                                    }
                                })
                                .collect_view()}
                        </select>
                    </FormField>
                </div>
            </Show>
        </div>
    }
}

#[component]
fn AlgorithmSelect(
    label: &'static str,
    value: Signal<String>,
    options: Signal<Vec<AlgorithmInfo>>,
    on_change: Callback<String>,
    #[prop(default = false)] allow_none: bool,
) -> impl IntoView {
    let entries = move || {
        let mut ids: Vec<(String, bool)> = options
            .get()
            .into_iter()
            .map(|a| (a.id, a.deprecated))
            .collect();
        let current = value.get();
        // Keep the current choice visible before the lists have loaded.
        if !current.is_empty() && !ids.iter().any(|(id, _)| *id == current) {
            ids.insert(0, (current, false));
        }
        ids
    };

    view! {
        <FormField label=label>
            <select
                class="input-field w-full"
                on:change=move |ev| on_change.call(event_target_value(&ev))
            >
                {allow_none.then(|| view! {
                    <option value="" selected=move || value.get().is_empty()>"None"</option>
                })}
                {move || {
                    entries()
                        .into_iter()
                        .map(|(id, deprecated)| {
                            let text = if deprecated { format!("{} (deprecated)", id) } else { id.clone() };
                            let selected = id.clone();
                            view! {
                                <option value=id selected=move || value.get() == selected>{text}</option>
                            }
                        })
                        .collect_view()
                }}
            </select>
        </FormField>
    }
}

#[component]
pub fn ConnectRepoForm(wizard: RwSignal<Wizard>, send: Callback<WizardMsg>) -> impl IntoView {
    let (show_advanced, set_show_advanced) = create_signal(false);
    let needs_password = create_memo(move |_| wizard.with(|w| w.provider() != Some(ProviderKind::Token)));

    let value = move |field: ConnectField| {
        Signal::derive(move || wizard.with(|w| connect_value(w.connect_form(), field)))
    };
    let setter = move |field: ConnectField| {
        Callback::new(move |v: String| send.call(WizardMsg::SetConnect(field, v)))
    };
    let password_error = Signal::derive(move || wizard.with(|w| w.field_error("password").map(str::to_string)));

    view! {
        <div class="space-y-4">
            <Show when=move || needs_password.get()>
                <FormField label="Repository Password" error=password_error>
                    <TextInput
                        value=value(ConnectField::Password)
                        on_change=setter(ConnectField::Password)
                        input_type="password"
                        placeholder="enter repository password"
                    />
                </FormField>
            </Show>

            <FormField label="Repository Description" description="Helps to distinguish between multiple connected repositories">
                <TextInput
                    value=value(ConnectField::Description)
                    on_change=setter(ConnectField::Description)
                    placeholder="enter repository description"
                />
            </FormField>

            <button
                type="button"
                class="text-accent text-sm"
                on:click=move |_| set_show_advanced.update(|v| *v = !*v)
            >
                {move || if show_advanced.get() { "Hide Advanced Options" } else { "Show Advanced Options" }}
            </button>

            <Show when=move || show_advanced.get()>
                <Checkbox
                    label="Connect in read-only mode"
                    checked=Signal::derive(move || wizard.with(|w| w.connect_form().readonly))
                    on_change=Callback::new(move |on: bool| setter(ConnectField::Readonly).call(on.to_string()))
                />
                <div class="grid grid-cols-2 gap-4">
                    <FormField label="Username" description="Override the user name this console connects as">
                        <TextInput value=value(ConnectField::Username) on_change=setter(ConnectField::Username) />
                    </FormField>
                    <FormField label="Hostname" description="Override the host name this console connects as">
                        <TextInput value=value(ConnectField::Hostname) on_change=setter(ConnectField::Hostname) />
                    </FormField>
                </div>
            </Show>
        </div>
    }
}
