//! Sortable, paginated table model
//!
//! The UI's data table renders whatever [`TableState::view`] returns. Sorting
//! is stable so rows with equal keys keep the order the backend sent them in.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;

use crate::messages::{DEFAULT_PAGE_SIZE, PAGE_SIZES};

/// Comparable cell value produced by a column accessor
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    /// Missing values sort before everything else
    Empty,
    Number(f64),
    Text(String),
    Time(DateTime<Utc>),
}

impl SortValue {
    fn rank(&self) -> u8 {
        match self {
            SortValue::Empty => 0,
            SortValue::Number(_) => 1,
            SortValue::Text(_) => 2,
            SortValue::Time(_) => 3,
        }
    }

    /// Total order: values of different kinds order by kind
    pub fn compare(&self, other: &SortValue) -> Ordering {
        match (self, other) {
            (SortValue::Number(a), SortValue::Number(b)) => a.total_cmp(b),
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            (SortValue::Time(a), SortValue::Time(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl From<u64> for SortValue {
    fn from(v: u64) -> Self {
        SortValue::Number(v as f64)
    }
}

impl From<i64> for SortValue {
    fn from(v: i64) -> Self {
        SortValue::Number(v as f64)
    }
}

impl From<&str> for SortValue {
    fn from(v: &str) -> Self {
        SortValue::Text(v.to_string())
    }
}

impl From<String> for SortValue {
    fn from(v: String) -> Self {
        SortValue::Text(v)
    }
}

impl From<Option<DateTime<Utc>>> for SortValue {
    fn from(v: Option<DateTime<Utc>>) -> Self {
        v.map(SortValue::Time).unwrap_or(SortValue::Empty)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    /// Header indicator
    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

/// Column definition for rows of type `R`
pub struct Column<R> {
    pub id: &'static str,
    pub header: &'static str,
    pub accessor: fn(&R) -> SortValue,
    pub sortable: bool,
}

impl<R> Clone for Column<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for Column<R> {}

impl<R> std::fmt::Debug for Column<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Column")
            .field("id", &self.id)
            .field("header", &self.header)
            .field("sortable", &self.sortable)
            .finish()
    }
}

impl<R> Column<R> {
    pub const fn new(id: &'static str, header: &'static str, accessor: fn(&R) -> SortValue) -> Self {
        Self { id, header, accessor, sortable: true }
    }

    pub const fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub column: &'static str,
    pub direction: SortDirection,
}

/// Sort and pagination state of one table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableState {
    pub sort: Option<SortSpec>,
    pub page_index: usize,
    pub page_size: usize,
}

impl Default for TableState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

/// One page worth of rows plus the footer numbers
#[derive(Debug, Clone, PartialEq)]
pub struct PageView<R> {
    pub rows: Vec<R>,
    pub page_index: usize,
    pub page_count: usize,
    pub total_rows: usize,
}

impl TableState {
    pub fn new(page_size: usize) -> Self {
        let mut state = Self { sort: None, page_index: 0, page_size: DEFAULT_PAGE_SIZE };
        state.set_page_size(page_size, 0);
        state
    }

    /// Table sorted by `column` from the start
    pub fn sorted_by(column: &'static str, direction: SortDirection, page_size: usize) -> Self {
        Self { sort: Some(SortSpec { column, direction }), ..Self::new(page_size) }
    }

    /// Header click: a new column sorts ascending from the first page, the
    /// active column flips direction and stays on the current page
    pub fn sort_by(&mut self, column: &'static str) {
        match self.sort.as_mut() {
            Some(spec) if spec.column == column => spec.direction = spec.direction.toggled(),
            _ => {
                self.sort = Some(SortSpec { column, direction: SortDirection::Ascending });
                self.page_index = 0;
            }
        }
    }

    /// Unknown sizes fall back to the default. The current page is kept when
    /// it still exists under the new size, otherwise the last page is shown.
    pub fn set_page_size(&mut self, size: usize, total_rows: usize) {
        self.page_size = if PAGE_SIZES.contains(&size) { size } else { DEFAULT_PAGE_SIZE };
        self.clamp_page(total_rows);
    }

    /// At least one page, even for an empty table
    pub fn page_count(&self, total_rows: usize) -> usize {
        total_rows.div_ceil(self.page_size).max(1)
    }

    /// Page actually shown for `total_rows`
    pub fn current_page(&self, total_rows: usize) -> usize {
        self.page_index.min(self.page_count(total_rows) - 1)
    }

    /// Pull the stored page back into range after the row count shrank
    pub fn clamp_page(&mut self, total_rows: usize) {
        self.page_index = self.current_page(total_rows);
    }

    pub fn go_to(&mut self, page: usize, total_rows: usize) {
        self.page_index = page.min(self.page_count(total_rows) - 1);
    }

    pub fn next_page(&mut self, total_rows: usize) {
        self.go_to(self.current_page(total_rows) + 1, total_rows);
    }

    pub fn prev_page(&mut self, total_rows: usize) {
        self.page_index = self.current_page(total_rows).saturating_sub(1);
    }

    pub fn can_next(&self, total_rows: usize) -> bool {
        self.current_page(total_rows) + 1 < self.page_count(total_rows)
    }

    pub fn can_prev(&self, total_rows: usize) -> bool {
        self.current_page(total_rows) > 0
    }

    pub fn direction_of(&self, column: &str) -> Option<SortDirection> {
        self.sort.filter(|s| s.column == column).map(|s| s.direction)
    }

    /// Sort `rows` per the current state and cut out the current page
    pub fn view<R: Clone>(&self, rows: &[R], columns: &[Column<R>]) -> PageView<R> {
        let mut sorted: Vec<R> = rows.to_vec();
        if let Some(spec) = self.sort {
            if let Some(column) = columns.iter().find(|c| c.id == spec.column && c.sortable) {
                sort_rows(&mut sorted, column.accessor, spec.direction);
            }
        }

        let total_rows = sorted.len();
        let page_count = self.page_count(total_rows);
        let page_index = self.current_page(total_rows);
        let rows = sorted
            .into_iter()
            .skip(page_index * self.page_size)
            .take(self.page_size)
            .collect();

        PageView { rows, page_index, page_count, total_rows }
    }
}

/// Stable sort by a column accessor
pub fn sort_rows<R>(rows: &mut [R], accessor: fn(&R) -> SortValue, direction: SortDirection) {
    rows.sort_by(|a, b| {
        let ord = accessor(a).compare(&accessor(b));
        match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        size: u64,
        name: &'static str,
    }

    fn columns() -> Vec<Column<Row>> {
        vec![
            Column::new("size", "Size", |r: &Row| r.size.into()),
            Column::new("name", "Name", |r: &Row| r.name.into()),
            Column::new("actions", "", |_: &Row| SortValue::Empty).unsortable(),
        ]
    }

    fn rows(sizes: &[u64]) -> Vec<Row> {
        sizes.iter().map(|&size| Row { size, name: "x" }).collect()
    }

    fn sizes(view: &PageView<Row>) -> Vec<u64> {
        view.rows.iter().map(|r| r.size).collect()
    }

    #[test]
    fn test_header_clicks_toggle_direction() {
        let data = rows(&[3, 1, 2]);
        let mut state = TableState::default();

        state.sort_by("size");
        assert_eq!(sizes(&state.view(&data, &columns())), vec![1, 2, 3]);

        state.sort_by("size");
        assert_eq!(sizes(&state.view(&data, &columns())), vec![3, 2, 1]);
    }

    #[test]
    fn test_unsorted_keeps_input_order() {
        let data = rows(&[3, 1, 2]);
        let state = TableState::default();
        assert_eq!(sizes(&state.view(&data, &columns())), vec![3, 1, 2]);
    }

    #[test]
    fn test_unsortable_column_is_ignored() {
        let data = rows(&[3, 1, 2]);
        let mut state = TableState::default();
        state.sort_by("actions");
        assert_eq!(sizes(&state.view(&data, &columns())), vec![3, 1, 2]);
    }

    #[test]
    fn test_sort_is_stable() {
        let data = vec![
            Row { size: 1, name: "b" },
            Row { size: 0, name: "a" },
            Row { size: 1, name: "a" },
        ];
        let mut state = TableState::default();
        state.sort_by("size");
        let view = state.view(&data, &columns());
        let names: Vec<_> = view.rows.iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["a", "b", "a"]);
    }

    #[test]
    fn test_pagination() {
        let data = rows(&(0..25).collect::<Vec<_>>());
        let mut state = TableState::new(10);
        assert_eq!(state.page_count(data.len()), 3);

        state.next_page(data.len());
        state.next_page(data.len());
        state.next_page(data.len());
        let view = state.view(&data, &columns());
        assert_eq!(view.page_index, 2);
        assert_eq!(sizes(&view), (20..25).collect::<Vec<_>>());
        assert!(!state.can_next(data.len()));

        state.prev_page(data.len());
        assert!(state.can_prev(data.len()));
        assert_eq!(state.page_index, 1);
    }

    #[test]
    fn test_new_column_resets_page_but_toggle_keeps_it() {
        let data = rows(&(0..25).collect::<Vec<_>>());
        let mut state = TableState::new(10);
        state.sort_by("size");
        state.go_to(2, data.len());

        state.sort_by("size");
        assert_eq!(state.page_index, 2);
        assert_eq!(state.direction_of("size"), Some(SortDirection::Descending));

        state.sort_by("name");
        assert_eq!(state.page_index, 0);
        assert_eq!(state.direction_of("name"), Some(SortDirection::Ascending));
        assert_eq!(state.direction_of("size"), None);
    }

    #[test]
    fn test_page_size_is_clamped_to_offered_sizes() {
        let mut state = TableState::new(20);
        assert_eq!(state.page_size, 20);
        state.set_page_size(7, 0);
        assert_eq!(state.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_page_size_change_keeps_sort_and_page() {
        let data = rows(&(0..25).collect::<Vec<_>>());
        let mut state = TableState::sorted_by("size", SortDirection::Descending, 10);
        state.next_page(data.len());

        state.set_page_size(20, data.len());
        let view = state.view(&data, &columns());
        assert_eq!(view.page_index, 1);
        assert_eq!(view.page_count, 2);
        assert_eq!(sizes(&view), (0..5).rev().collect::<Vec<_>>());
        assert_eq!(state.direction_of("size"), Some(SortDirection::Descending));

        // Page 2 no longer exists once everything fits on one page
        state.set_page_size(50, data.len());
        assert_eq!(state.page_index, 0);
        let view = state.view(&data, &columns());
        assert_eq!(view.rows.first().map(|r| r.size), Some(24));
        assert_eq!(view.rows.len(), 25);
        assert_eq!(state.direction_of("size"), Some(SortDirection::Descending));
    }

    #[test]
    fn test_shrinking_rows_pulls_page_back() {
        let mut state = TableState::new(10);
        state.go_to(2, 25);
        assert!(state.can_prev(25));

        // A refetch left a single page
        assert_eq!(state.current_page(8), 0);
        assert!(!state.can_prev(8));
        assert!(!state.can_next(8));

        state.prev_page(8);
        assert_eq!(state.page_index, 0);

        state.go_to(2, 25);
        state.clamp_page(12);
        assert_eq!(state.page_index, 1);
    }

    #[test]
    fn test_empty_table_has_one_page() {
        let state = TableState::default();
        let view = state.view(&Vec::<Row>::new(), &columns());
        assert_eq!(view.page_count, 1);
        assert!(view.rows.is_empty());
    }

    #[test]
    fn test_mixed_values_order_by_kind() {
        let t = Utc::now();
        assert_eq!(SortValue::Empty.compare(&SortValue::Number(0.0)), Ordering::Less);
        assert_eq!(SortValue::from(None).compare(&SortValue::Time(t)), Ordering::Less);
        assert_eq!(SortValue::from("a").compare(&SortValue::from("b")), Ordering::Less);
    }
}
