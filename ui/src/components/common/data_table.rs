//! Sortable, paginated data table
//!
//! Sorting and paging live in [`TableState`]; this component only renders the
//! current page and turns header clicks and footer controls into state
//! updates. The page size belongs to the shared UI preferences, so every
//! table follows the same setting.

use std::rc::Rc;

use kopia_console_shared::{Column, SortDirection, TableState, PAGE_SIZES};
use leptos::*;

use crate::state::AppState;

/// A column definition plus how to render its cells
pub struct TableColumn<R> {
    pub column: Column<R>,
    render: Rc<dyn Fn(&R) -> View>,
}

impl<R> Clone for TableColumn<R> {
    fn clone(&self) -> Self {
        Self {
            column: self.column,
            render: Rc::clone(&self.render),
        }
    }
}

impl<R> TableColumn<R> {
    pub fn new<V: IntoView>(column: Column<R>, render: impl Fn(&R) -> V + 'static) -> Self {
        Self {
            column,
            render: Rc::new(move |row| render(row).into_view()),
        }
    }
}

#[component]
pub fn DataTable<R>(
    #[prop(into)] rows: Signal<Vec<R>>,
    columns: Vec<TableColumn<R>>,
    /// Column and direction the table starts sorted by
    #[prop(optional)]
    initial_sort: Option<(&'static str, SortDirection)>,
) -> impl IntoView
where
    R: Clone + 'static,
{
    let app_state = expect_context::<AppState>();
    let page_size = create_memo(move |_| app_state.preferences.with(|p| p.effective_page_size()));

    let table = create_rw_signal(match initial_sort {
        Some((column, direction)) => TableState::sorted_by(column, direction, page_size.get_untracked()),
        None => TableState::new(page_size.get_untracked()),
    });

    let defs: Vec<Column<R>> = columns.iter().map(|c| c.column).collect();
    let headers = defs.clone();
    let defs = store_value(defs);
    let columns = store_value(columns);

    let page = Signal::derive(move || {
        let state = table.get();
        rows.with(|rows| defs.with_value(|defs| state.view(rows, defs)))
    });
    let total = move || rows.with(Vec::len);

    // Follow the shared page size
    create_effect(move |_| {
        let size = page_size.get();
        let n = rows.with_untracked(Vec::len);
        if table.with_untracked(|t| t.page_size != size) {
            table.update(|t| t.set_page_size(size, n));
        }
    });

    // A refetch may leave fewer pages than before
    create_effect(move |_| {
        let n = total();
        if table.with_untracked(|t| t.current_page(n) != t.page_index) {
            table.update(|t| t.clamp_page(n));
        }
    });

    view! {
        <div class="bg-theme-surface rounded-xl border border-theme-border overflow-hidden">
            <table class="w-full text-sm">
                <thead class="bg-theme-surface-hover text-theme-secondary text-left">
                    <tr>
                        {headers
                            .into_iter()
                            .map(|col| {
                                let id = col.id;
                                view! {
                                    <th
                                        class=if col.sortable { "px-4 py-2 font-medium cursor-pointer select-none" } else { "px-4 py-2 font-medium" }
                                        on:click=move |_| {
                                            if col.sortable {
                                                table.update(|t| t.sort_by(id));
                                            }
                                        }
                                    >
                                        {col.header}
                                        <span class="ml-1 text-xs">
                                            {move || table.with(|t| t.direction_of(id)).map(SortDirection::arrow)}
                                        </span>
                                    </th>
                                }
                            })
                            .collect_view()}
                    </tr>
                </thead>
                <tbody>
                    {move || {
                        let current = page.get();
                        if current.rows.is_empty() {
                            let span = columns.with_value(Vec::len).to_string();
                            return view! {
                                <tr>
                                    <td colspan=span class="px-4 py-6 text-center text-theme-muted">"No data"</td>
                                </tr>
                            }
                            .into_view();
                        }

                        columns.with_value(|cols| {
                            current
                                .rows
                                .iter()
                                .map(|row| view! {
                                    <tr class="border-t border-theme-border hover:bg-theme-surface-hover">
                                        {cols
                                            .iter()
                                            .map(|c| view! { <td class="px-4 py-2">{(c.render)(row)}</td> })
                                            .collect_view()}
                                    </tr>
                                })
                                .collect_view()
                        })
                    }}
                </tbody>
            </table>

            <div class="flex items-center justify-between px-4 py-2 border-t border-theme-border text-xs text-theme-secondary">
                <div class="flex items-center gap-2">
                    <button
                        class="btn-secondary"
                        disabled=move || !table.with(|t| t.can_prev(total()))
                        on:click=move |_| {
                            let n = total();
                            table.update(|t| t.prev_page(n));
                        }
                    >
                        "Previous"
                    </button>
                    <span>
                        {move || {
                            let current = page.get();
                            format!("Page {} of {}", current.page_index + 1, current.page_count)
                        }}
                    </span>
                    <button
                        class="btn-secondary"
                        disabled=move || !table.with(|t| t.can_next(total()))
                        on:click=move |_| {
                            let n = total();
                            table.update(|t| t.next_page(n));
                        }
                    >
                        "Next"
                    </button>
                </div>
                <label class="flex items-center gap-2">
                    "Show"
                    <select
                        class="input-field py-1"
                        on:change=move |ev| {
                            if let Ok(size) = event_target_value(&ev).parse() {
                                app_state.set_page_size(size);
                            }
                        }
                    >
                        {PAGE_SIZES
                            .into_iter()
                            .map(|size| view! {
                                <option
                                    value=size.to_string()
                                    selected=move || page_size.get() == size
                                >
                                    {size}
                                </option>
                            })
                            .collect_view()}
                    </select>
                    {move || format!("of {} rows", total())}
                </label>
            </div>
        </div>
    }
}
