//! Form building blocks shared by the wizard and the preferences page

use kopia_console_shared::RequestError;
use leptos::*;

#[component]
pub fn FormField(
    label: &'static str,
    #[prop(optional)] description: &'static str,
    /// Inline validation message
    #[prop(optional, into)]
    error: Option<Signal<Option<String>>>,
    children: Children,
) -> impl IntoView {
    view! {
        <div class="space-y-1">
            <label class="text-xs font-medium text-theme-secondary">{label}</label>
            {children()}
            {(!description.is_empty()).then(|| view! {
                <p class="text-xs text-theme-muted">{description}</p>
            })}
            {move || error.and_then(|e| e.get()).map(|msg| view! {
                <p class="text-xs text-error">{msg}</p>
            })}
        </div>
    }
}

/// Single-line input bound to a getter and a setter
#[component]
pub fn TextInput(
    #[prop(into)] value: Signal<String>,
    #[prop(into)] on_change: Callback<String>,
    #[prop(default = "text")] input_type: &'static str,
    #[prop(optional)] placeholder: &'static str,
    #[prop(optional, into)] disabled: MaybeSignal<bool>,
) -> impl IntoView {
    view! {
        <input
            type=input_type
            class="input-field w-full"
            placeholder=placeholder
            prop:value=move || value.get()
            disabled=move || disabled.get()
            on:input=move |ev| on_change.call(event_target_value(&ev))
        />
    }
}

#[component]
pub fn TextArea(
    #[prop(into)] value: Signal<String>,
    #[prop(into)] on_change: Callback<String>,
    #[prop(optional)] placeholder: &'static str,
) -> impl IntoView {
    view! {
        <textarea
            class="input-field w-full font-mono text-xs"
            rows="5"
            placeholder=placeholder
            prop:value=move || value.get()
            on:input=move |ev| on_change.call(event_target_value(&ev))
        />
    }
}

#[component]
pub fn Checkbox(
    label: &'static str,
    #[prop(into)] checked: Signal<bool>,
    #[prop(into)] on_change: Callback<bool>,
) -> impl IntoView {
    view! {
        <label class="flex items-center gap-2 text-sm text-theme">
            <input
                type="checkbox"
                prop:checked=move || checked.get()
                on:change=move |ev| on_change.call(event_target_checked(&ev))
            />
            {label}
        </label>
    }
}

/// Banner for a failed backend request
#[component]
pub fn ErrorBanner(#[prop(into)] error: Signal<Option<RequestError>>) -> impl IntoView {
    move || {
        error.get().map(|e| view! {
            <div class="bg-error/10 border border-error text-error px-4 py-2 rounded mb-4 text-sm">
                {e.to_string()}
            </div>
        })
    }
}

#[component]
pub fn Spinner(#[prop(optional)] label: &'static str) -> impl IntoView {
    view! {
        <div class="flex items-center justify-center p-6">
            <div class="animate-spin rounded-full h-8 w-8 border-b-2 border-accent"></div>
            {(!label.is_empty()).then(|| view! { <span class="ml-3 text-theme-secondary">{label}</span> })}
        </div>
    }
}
