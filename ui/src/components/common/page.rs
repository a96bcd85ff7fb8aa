//! Page chrome

use leptos::*;
use leptos_meta::Title;

/// Title row with optional actions on the right
#[component]
pub fn PageHeader(
    title: &'static str,
    #[prop(optional)] description: &'static str,
    #[prop(optional)] children: Option<Children>,
) -> impl IntoView {
    view! {
        <Title text=title />
        <div class="flex items-center justify-between mb-6">
            <div>
                <h1 class="text-2xl font-bold text-theme">{title}</h1>
                {(!description.is_empty()).then(|| view! {
                    <p class="text-theme-secondary mt-1">{description}</p>
                })}
            </div>
            <div class="flex items-center gap-2">
                {children.map(|c| c())}
            </div>
        </div>
    }
}
