/// Pager arithmetic: button window, result range, page-size menu

use crate::listing::MAX_PAGE_SIZE;

/// Number of numbered buttons shown in the pager
pub const VISIBLE_PAGES: i64 = 5;

/// Page sizes offered in the page-size menu
pub const PAGE_SIZE_OPTIONS: &[i64] = &[10, 20, 30, 40, 50];

/// 1-based page numbers for the pager, centred on `current` where possible
///
/// The window slides to stay inside `1..=last_page` and always holds
/// `min(visible, last_page)` pages.
pub fn page_window(current: i64, last_page: i64, visible: i64) -> Vec<i64> {
    let last_page = last_page.max(1);
    let visible = visible.max(1);
    let current = current.clamp(1, last_page);
    let half = visible / 2;

    let mut start = (current - half).max(1);
    let end = (start + visible - 1).min(last_page);
    if end - start + 1 < visible {
        start = (end - visible + 1).max(1);
    }

    (start..=end).collect()
}

/// `(from, to)` for "showing X to Y of N results", 1-based and inclusive
///
/// Both are 0 when the page holds nothing.
pub fn showing_range(page: i64, page_size: i64, total: i64) -> (i64, i64) {
    let from = (page.max(1) - 1) * page_size + 1;
    if total <= 0 || from > total {
        return (0, 0);
    }
    (from, (page.max(1) * page_size).min(total))
}

/// Page-size menu entries; `total` is offered as "show all" when it fits
pub fn page_size_options(total: i64) -> Vec<i64> {
    let mut options = PAGE_SIZE_OPTIONS.to_vec();
    if total > 0 && total <= MAX_PAGE_SIZE && !options.contains(&total) {
        options.push(total);
    }
    options
}
