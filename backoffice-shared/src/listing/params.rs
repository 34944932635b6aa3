/// List request parameters
///
/// [`ListParams`] is the normalized form every list query runs against.
/// [`ListQuery`] is the raw query-string shape (`?page=3&pageSize=10&search=x&sort=[...]`)
/// where `sort` travels as a JSON-encoded string.

use serde::{Deserialize, Serialize};

use super::ListError;

/// Page size used when the request does not name one
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Largest page size a single request may ask for
pub const MAX_PAGE_SIZE: i64 = 100;

/// Sort direction for one column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// SQL keyword for this direction
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// One entry of the ordered sort list: `{ "id": column, "desc": bool }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    /// Column identifier
    pub id: String,

    /// Descending when true
    #[serde(default)]
    pub desc: bool,
}

impl SortSpec {
    pub fn asc(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            desc: false,
        }
    }

    pub fn desc(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            desc: true,
        }
    }

    pub fn direction(&self) -> SortDirection {
        if self.desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }
}

/// Normalized list request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    /// 1-based page number
    pub page: i64,

    /// Rows per page
    pub page_size: i64,

    /// Case-insensitive substring filter; empty means no filter
    pub search: String,

    /// Ordered sort list; empty means the table's default order
    pub sort: Vec<SortSpec>,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            search: String::new(),
            sort: Vec::new(),
        }
    }
}

impl ListParams {
    /// Clamps page to at least 1 and page size to `1..=MAX_PAGE_SIZE`
    pub fn normalized(mut self) -> Self {
        self.page = self.page.max(1);
        self.page_size = self.page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Row offset of the first item on the requested page
    ///
    /// Saturates at `i64::MAX` for absurd page numbers.
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1).saturating_mul(self.page_size.max(1))
    }

    /// Encodes these parameters into the raw query-string shape
    pub fn to_query(&self) -> ListQuery {
        ListQuery {
            page: Some(self.page),
            page_size: Some(self.page_size),
            search: if self.search.is_empty() {
                None
            } else {
                Some(self.search.clone())
            },
            sort: if self.sort.is_empty() {
                None
            } else {
                serde_json::to_string(&self.sort).ok()
            },
        }
    }
}

/// Raw list query string as received over HTTP
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,

    /// JSON-encoded `[{"id": "...", "desc": bool}, ...]`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

impl TryFrom<ListQuery> for ListParams {
    type Error = ListError;

    fn try_from(query: ListQuery) -> Result<Self, Self::Error> {
        let sort = match query.sort.as_deref().map(str::trim) {
            None | Some("") | Some("null") => Vec::new(),
            Some(raw) => serde_json::from_str::<Vec<SortSpec>>(raw)
                .map_err(|e| ListError::MalformedSort(e.to_string()))?,
        };

        Ok(ListParams {
            page: query.page.unwrap_or(1),
            page_size: query.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            search: query.search.unwrap_or_default(),
            sort,
        }
        .normalized())
    }
}
