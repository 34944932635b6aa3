/// Headless data table controller
///
/// [`DataTable`] holds what a server-driven table owns locally (column
/// visibility, row selection, header sort state) and mirrors the data-fetching
/// state the server owns (page, page size, search, sort). User actions return
/// [`TableEvent`]s instead of invoking callbacks; the owner turns an event into
/// the next request with [`DataTable::apply`] and feeds the response back with
/// [`DataTable::load`].
///
/// # Example
///
/// ```
/// use backoffice_shared::listing::{ListParams, Page, SortSpec};
/// use backoffice_shared::table::{Column, DataTable, TableEvent, TableRow};
/// use uuid::Uuid;
///
/// struct Row(Uuid);
/// impl TableRow for Row {
///     fn row_id(&self) -> Uuid { self.0 }
/// }
///
/// let mut table = DataTable::new(vec![Column::new("email", "Email").sortable()]);
/// table.load(Page::new(vec![Row(Uuid::new_v4())], 1, &ListParams::default()));
///
/// let event = table.click_header("email", false).unwrap();
/// assert_eq!(event, TableEvent::SortChanged(vec![SortSpec::asc("email")]));
///
/// let next = table.apply(&event);
/// assert_eq!(next.sort, vec![SortSpec::asc("email")]);
/// ```

use uuid::Uuid;

use crate::listing::{ListParams, Page, SortDirection, SortSpec};

pub mod columns;
pub mod debounce;
pub mod pagination;
pub mod selection;
pub mod sorting;

pub use columns::{Column, ColumnSet};
pub use debounce::{SearchDebouncer, SEARCH_DEBOUNCE};
pub use selection::Selection;
pub use sorting::SortState;

/// A row with a stable identity
pub trait TableRow {
    fn row_id(&self) -> Uuid;
}

/// Something the owner must send to the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEvent {
    /// 1-based page requested
    PageChanged(i64),
    PageSizeChanged(i64),
    /// Full ordered sort list after a header click
    SortChanged(Vec<SortSpec>),
    SearchChanged(String),
    /// Selected ids, in page order
    BulkDelete(Vec<Uuid>),
}

pub struct DataTable<R: TableRow> {
    columns: ColumnSet,
    rows: Vec<R>,
    selection: Selection,
    sorting: SortState,
    params: ListParams,
    total: i64,
    last_page: i64,
}

impl<R: TableRow> DataTable<R> {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns: ColumnSet::new(columns),
            rows: Vec::new(),
            selection: Selection::default(),
            sorting: SortState::default(),
            params: ListParams::default(),
            total: 0,
            last_page: 1,
        }
    }

    /// Starts from explicit parameters, e.g. restored from a URL
    pub fn with_params(columns: Vec<Column>, params: ListParams) -> Self {
        let mut table = Self::new(columns);
        table.sorting = SortState::new(params.sort.clone());
        table.params = params.normalized();
        table
    }

    /// Replaces the rows with a server response
    ///
    /// Server state is taken from the envelope and the selection is cleared.
    pub fn load(&mut self, page: Page<R>) {
        self.params = ListParams {
            page: page.current_page,
            page_size: page.page_size,
            search: page.search,
            sort: page.sort,
        };
        self.sorting = SortState::new(self.params.sort.clone());
        self.total = page.total;
        self.last_page = page.last_page;
        self.rows = page.items;
        self.selection.clear();
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    pub fn total(&self) -> i64 {
        self.total
    }

    pub fn last_page(&self) -> i64 {
        self.last_page
    }

    /// Parameters describing what is currently shown
    pub fn params(&self) -> ListParams {
        self.params.clone()
    }

    /// Records an event in the server-side state and returns the next request
    ///
    /// Changing page size, sort or search goes back to page 1. A bulk delete
    /// reloads the current page.
    pub fn apply(&mut self, event: &TableEvent) -> ListParams {
        match event {
            TableEvent::PageChanged(page) => self.params.page = *page,
            TableEvent::PageSizeChanged(size) => {
                self.params.page = 1;
                self.params.page_size = *size;
            }
            TableEvent::SortChanged(sort) => {
                self.params.page = 1;
                self.params.sort = sort.clone();
            }
            TableEvent::SearchChanged(search) => {
                self.params.page = 1;
                self.params.search = search.clone();
            }
            TableEvent::BulkDelete(_) => {}
        }
        self.params = self.params.clone().normalized();
        self.params.clone()
    }

    // Pagination

    pub fn current_page(&self) -> i64 {
        self.params.page
    }

    pub fn can_previous(&self) -> bool {
        self.params.page > 1
    }

    pub fn can_next(&self) -> bool {
        self.params.page < self.last_page
    }

    pub fn go_to_page(&self, page: i64) -> Option<TableEvent> {
        if page < 1 || page > self.last_page || page == self.params.page {
            return None;
        }
        Some(TableEvent::PageChanged(page))
    }

    pub fn previous_page(&self) -> Option<TableEvent> {
        self.can_previous()
            .then(|| TableEvent::PageChanged(self.params.page - 1))
    }

    pub fn next_page(&self) -> Option<TableEvent> {
        self.can_next()
            .then(|| TableEvent::PageChanged(self.params.page + 1))
    }

    pub fn set_page_size(&self, size: i64) -> Option<TableEvent> {
        (size >= 1 && size != self.params.page_size).then_some(TableEvent::PageSizeChanged(size))
    }

    pub fn page_window(&self) -> Vec<i64> {
        pagination::page_window(self.params.page, self.last_page, pagination::VISIBLE_PAGES)
    }

    /// Page-size choices for the size selector, including "all" for small totals
    pub fn page_size_options(&self) -> Vec<i64> {
        pagination::page_size_options(self.total)
    }

    pub fn showing_range(&self) -> (i64, i64) {
        pagination::showing_range(self.params.page, self.params.page_size, self.total)
    }

    // Sorting

    /// Header click; ignored for columns that are not sortable
    pub fn click_header(&mut self, column: &str, multi: bool) -> Option<TableEvent> {
        if !self.columns.get(column)?.sortable {
            return None;
        }
        Some(TableEvent::SortChanged(self.sorting.click(column, multi)))
    }

    pub fn sort_direction(&self, column: &str) -> Option<SortDirection> {
        self.sorting.direction_of(column)
    }

    // Selection

    pub fn toggle_row(&mut self, id: Uuid) -> bool {
        if !self.rows.iter().any(|r| r.row_id() == id) {
            return false;
        }
        self.selection.toggle(id)
    }

    pub fn toggle_all(&mut self) {
        self.selection.toggle_all(&self.rows);
    }

    pub fn is_selected(&self, id: Uuid) -> bool {
        self.selection.is_selected(id)
    }

    pub fn all_selected(&self) -> bool {
        self.selection.all_selected(&self.rows)
    }

    pub fn selected_ids(&self) -> Vec<Uuid> {
        self.selection.ids_in_order(&self.rows)
    }

    pub fn can_bulk_delete(&self) -> bool {
        !self.selected_ids().is_empty()
    }

    /// "Delete Selected"; clears the selection
    pub fn bulk_delete(&mut self) -> Option<TableEvent> {
        let ids = self.selected_ids();
        if ids.is_empty() {
            return None;
        }
        self.selection.clear();
        Some(TableEvent::BulkDelete(ids))
    }

    // Columns

    pub fn toggle_column(&mut self, id: &str) -> Option<bool> {
        self.columns.toggle(id)
    }

    pub fn visible_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.visible()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Row(Uuid);

    impl TableRow for Row {
        fn row_id(&self) -> Uuid {
            self.0
        }
    }

    fn columns() -> Vec<Column> {
        vec![
            Column::new("username", "Username").sortable(),
            Column::new("email", "Email").sortable().toggleable(),
            Column::new("avatar", "Avatar"),
            Column::actions(),
        ]
    }

    fn page_of(n: usize, page: i64, total: i64) -> Page<Row> {
        let params = ListParams {
            page,
            page_size: 10,
            ..Default::default()
        };
        Page::new((0..n).map(|_| Row(Uuid::new_v4())).collect(), total, &params)
    }

    fn loaded(n: usize, page: i64, total: i64) -> DataTable<Row> {
        let mut table = DataTable::new(columns());
        table.load(page_of(n, page, total));
        table
    }

    #[test]
    fn test_header_cycle_through_events() {
        let mut table = loaded(3, 1, 3);

        let events: Vec<TableEvent> = (0..3)
            .filter_map(|_| table.click_header("username", false))
            .collect();
        assert_eq!(
            events,
            vec![
                TableEvent::SortChanged(vec![SortSpec::asc("username")]),
                TableEvent::SortChanged(vec![SortSpec::desc("username")]),
                TableEvent::SortChanged(vec![]),
            ]
        );
    }

    #[test]
    fn test_unsortable_header_is_ignored() {
        let mut table = loaded(1, 1, 1);
        assert_eq!(table.click_header("avatar", false), None);
        assert_eq!(table.click_header("select", false), None);
        assert_eq!(table.click_header("nope", false), None);
    }

    #[test]
    fn test_selection_clears_on_new_data() {
        let mut table = loaded(3, 1, 30);
        let id = table.rows()[0].row_id();
        assert!(table.toggle_row(id));
        assert!(table.is_selected(id));

        table.load(page_of(3, 2, 30));
        assert!(table.selected_ids().is_empty());
        assert!(!table.can_bulk_delete());
    }

    #[test]
    fn test_bulk_delete_yields_ids_and_clears() {
        let mut table = loaded(4, 1, 4);
        let ids: Vec<Uuid> = table.rows().iter().map(|r| r.row_id()).collect();

        assert_eq!(table.bulk_delete(), None);

        table.toggle_row(ids[2]);
        table.toggle_row(ids[0]);
        assert!(table.can_bulk_delete());

        assert_eq!(
            table.bulk_delete(),
            Some(TableEvent::BulkDelete(vec![ids[0], ids[2]]))
        );
        assert!(table.selected_ids().is_empty());
    }

    #[test]
    fn test_select_all_covers_visible_page() {
        let mut table = loaded(3, 1, 3);
        table.toggle_all();
        assert!(table.all_selected());
        assert_eq!(table.selected_ids().len(), 3);

        table.toggle_all();
        assert!(table.selected_ids().is_empty());
    }

    #[test]
    fn test_rows_not_on_page_cannot_be_selected() {
        let mut table = loaded(2, 1, 2);
        assert!(!table.toggle_row(Uuid::new_v4()));
    }

    #[test]
    fn test_pagination_bounds() {
        let first = loaded(10, 1, 25);
        assert!(!first.can_previous());
        assert_eq!(first.previous_page(), None);
        assert_eq!(first.next_page(), Some(TableEvent::PageChanged(2)));
        assert_eq!(first.showing_range(), (1, 10));

        let last = loaded(5, 3, 25);
        assert!(!last.can_next());
        assert_eq!(last.next_page(), None);
        assert_eq!(last.showing_range(), (21, 25));
        assert_eq!(last.page_window(), vec![1, 2, 3]);
        assert_eq!(last.go_to_page(4), None);
        assert_eq!(last.go_to_page(1), Some(TableEvent::PageChanged(1)));
    }

    #[test]
    fn test_apply_resets_page_for_new_queries() {
        let mut table = loaded(10, 3, 50);

        let next = table.apply(&TableEvent::PageChanged(4));
        assert_eq!(next.page, 4);

        let next = table.apply(&TableEvent::SearchChanged("smith".to_string()));
        assert_eq!((next.page, next.search.as_str()), (1, "smith"));

        table.apply(&TableEvent::PageChanged(2));
        let next = table.apply(&TableEvent::PageSizeChanged(20));
        assert_eq!((next.page, next.page_size), (1, 20));

        table.apply(&TableEvent::PageChanged(2));
        let next = table.apply(&TableEvent::SortChanged(vec![SortSpec::desc("email")]));
        assert_eq!(next.page, 1);
        assert_eq!(next.sort, vec![SortSpec::desc("email")]);
        assert_eq!(table.params(), next);
    }

    #[test]
    fn test_page_size_options_offer_all_rows() {
        assert_eq!(loaded(10, 1, 25).page_size_options(), vec![10, 20, 30, 40, 50, 25]);
        assert_eq!(loaded(10, 1, 30).page_size_options(), vec![10, 20, 30, 40, 50]);
        assert_eq!(loaded(10, 1, 500).page_size_options(), vec![10, 20, 30, 40, 50]);
        assert_eq!(DataTable::<Row>::new(columns()).page_size_options(), vec![10, 20, 30, 40, 50]);
    }

    #[test]
    fn test_page_size_event() {
        let table = loaded(10, 1, 50);
        assert_eq!(table.set_page_size(10), None);
        assert_eq!(table.set_page_size(0), None);
        assert_eq!(table.set_page_size(25), Some(TableEvent::PageSizeChanged(25)));
    }

    #[test]
    fn test_column_visibility() {
        let mut table = loaded(1, 1, 1);
        assert_eq!(table.toggle_column("email"), Some(false));
        assert_eq!(table.toggle_column("actions"), None);

        let visible: Vec<&str> = table.visible_columns().map(|c| c.id.as_str()).collect();
        assert_eq!(visible, vec!["select", "username", "avatar", "actions"]);
    }

    #[test]
    fn test_loaded_sort_drives_header_state() {
        let mut table = DataTable::<Row>::new(columns());
        let params = ListParams {
            sort: vec![SortSpec::desc("email")],
            ..Default::default()
        };
        table.load(Page::new(vec![], 0, &params));

        assert_eq!(table.sort_direction("email"), Some(SortDirection::Desc));
        assert_eq!(
            table.click_header("email", false),
            Some(TableEvent::SortChanged(vec![]))
        );
    }
}
