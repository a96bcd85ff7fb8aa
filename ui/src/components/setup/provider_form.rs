//! Provider selection and storage configuration steps

use kopia_console_shared::{FieldKind, FieldSpec, ProviderKind, Wizard, WizardMsg};
use leptos::*;

use crate::components::common::{Checkbox, FormField, TextArea, TextInput};

#[component]
pub fn ProviderPicker(wizard: RwSignal<Wizard>, send: Callback<WizardMsg>) -> impl IntoView {
    let selected = move || wizard.with(Wizard::provider);

    let storage: Vec<_> = ProviderKind::ALL.into_iter().filter(|k| !k.is_internal()).collect();
    let internal: Vec<_> = ProviderKind::ALL.into_iter().filter(|k| k.is_internal()).collect();

    let button = move |kind: ProviderKind| {
        view! {
            <button
                type="button"
                class=move || {
                    let base = "p-4 rounded-lg border text-left text-sm transition-colors";
                    if selected() == Some(kind) {
                        format!("{} border-accent bg-accent/10 text-theme", base)
                    } else {
                        format!("{} border-theme-border text-theme-secondary hover:border-accent/50", base)
                    }
                }
                on:click=move |_| send.call(WizardMsg::SelectProvider(kind))
            >
                {kind.description()}
            </button>
        }
    };

    view! {
        <div class="space-y-4">
            <p class="text-theme-secondary text-sm">
                "Select the storage type where your repository is or will be located."
            </p>
            <div class="grid grid-cols-2 gap-3">
                {storage.into_iter().map(button).collect_view()}
            </div>
            <p class="text-theme-secondary text-sm pt-2">"Or connect through another Kopia instance:"</p>
            <div class="grid grid-cols-2 gap-3">
                {internal.into_iter().map(button).collect_view()}
            </div>
        </div>
    }
}

#[component]
pub fn ProviderFields(wizard: RwSignal<Wizard>, send: Callback<WizardMsg>) -> impl IntoView {
    let provider = create_memo(move |_| wizard.with(Wizard::provider));

    move || {
        provider.get().map(|kind| {
            view! {
                <div class="space-y-4">
                    <p class="text-sm text-theme-muted">{kind.description()}</p>
                    {kind
                        .fields()
                        .iter()
                        .map(|field| view! { <ProviderField field=*field wizard=wizard send=send /> })
                        .collect_view()}
                </div>
            }
        })
    }
}

#[component]
fn ProviderField(field: FieldSpec, wizard: RwSignal<Wizard>, send: Callback<WizardMsg>) -> impl IntoView {
    let name = field.name;
    let value = Signal::derive(move || {
        wizard.with(|w| w.form().map(|f| f.config.get(name).to_string()).unwrap_or_default())
    });
    let error = Signal::derive(move || wizard.with(|w| w.field_error(name).map(str::to_string)));
    let set = Callback::new(move |value: String| {
        send.call(WizardMsg::SetField { name: name.to_string(), value })
    });

    let input = match field.kind {
        FieldKind::Text => view! {
            <TextInput value=value on_change=set placeholder=field.placeholder />
        }
        .into_view(),
        FieldKind::Password => view! {
            <TextInput value=value on_change=set placeholder=field.placeholder input_type="password" />
        }
        .into_view(),
        FieldKind::Number => view! {
            <TextInput value=value on_change=set placeholder=field.placeholder input_type="number" />
        }
        .into_view(),
        FieldKind::Multiline => view! {
            <TextArea value=value on_change=set placeholder=field.placeholder />
        }
        .into_view(),
        FieldKind::Bool => {
            let checked = Signal::derive(move || value.get() == "true");
            let toggle = Callback::new(move |on: bool| set.call(on.to_string()));
            return view! {
                <FormField label="" error=error>
                    <Checkbox label=field.label checked=checked on_change=toggle />
                </FormField>
            }
            .into_view();
        }
    };

    view! {
        <FormField label=field.label description=if field.required { "" } else { "(optional)" } error=error>
            {input}
        </FormField>
    }
    .into_view()
}
