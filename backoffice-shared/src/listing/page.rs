/// Page envelope returned by list endpoints

use serde::{Deserialize, Serialize};

use super::params::{ListParams, SortSpec};

/// One page of results plus the request that produced it
///
/// Serialized as `{ items, total, currentPage, lastPage, pageSize, search, sort }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,

    /// Number of rows matching the filter, across all pages
    pub total: i64,

    /// Requested page, echoed even when it lies past the end
    pub current_page: i64,

    pub last_page: i64,
    pub page_size: i64,
    pub search: String,
    pub sort: Vec<SortSpec>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, params: &ListParams) -> Self {
        Self {
            items,
            total,
            current_page: params.page,
            last_page: Self::last_page_for(total, params.page_size),
            page_size: params.page_size,
            search: params.search.clone(),
            sort: params.sort.clone(),
        }
    }

    /// `max(1, ceil(total / page_size))`
    pub fn last_page_for(total: i64, page_size: i64) -> i64 {
        if total <= 0 || page_size <= 0 {
            return 1;
        }
        ((total + page_size - 1) / page_size).max(1)
    }

    /// Transforms every item, keeping the bookkeeping
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            current_page: self.current_page,
            last_page: self.last_page,
            page_size: self.page_size,
            search: self.search,
            sort: self.sort,
        }
    }

    /// Moves the first item matching `pred` to the front of the page
    ///
    /// The relative order of the remaining items is kept. Does nothing when no
    /// item on this page matches.
    pub fn pin_first<P>(&mut self, pred: P)
    where
        P: Fn(&T) -> bool,
    {
        if let Some(pos) = self.items.iter().position(pred) {
            if pos > 0 {
                let item = self.items.remove(pos);
                self.items.insert(0, item);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
