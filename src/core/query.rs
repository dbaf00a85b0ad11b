//! Query parameters and pagination utilities

use serde::{Deserialize, Serialize, Serializer};

/// Rows per page on the invoices table
pub const ITEMS_PER_PAGE: usize = 6;

/// Query parameters for searchable, paginated list views
///
/// # Example
/// ```rust,ignore
/// pub async fn list_invoices(Query(params): Query<ListParams>) -> ... {
///     // params.query defaults to ""
///     // params.page() is never below 1
/// }
///
/// // Usage:
/// GET /dashboard/invoices?query=lee&page=2
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListParams {
    /// Free-text search term (empty matches everything)
    pub query: String,

    /// Page number (starts at 1)
    pub page: usize,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            query: String::new(),
            page: 1,
        }
    }
}

impl ListParams {
    /// Get page number, ensuring minimum of 1
    pub fn page(&self) -> usize {
        self.page.max(1)
    }

    /// Row offset for the current page
    pub fn offset(&self) -> usize {
        (self.page() - 1) * ITEMS_PER_PAGE
    }

    /// Search term with surrounding whitespace removed
    pub fn term(&self) -> &str {
        self.query.trim()
    }

    /// Cache key for the view of these params under `path`
    ///
    /// Built only from the trimmed term and clamped page, so unknown query
    /// parameters and equivalent spellings share one entry.
    pub fn cache_key(&self, path: &str) -> String {
        format!(
            "{}?query={}&page={}",
            path,
            encode_query_component(self.term()),
            self.page()
        )
    }
}

/// Percent-encode everything outside the unreserved URI characters
pub(crate) fn encode_query_component(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            other => encoded.push_str(&format!("%{:02X}", other)),
        }
    }
    encoded
}

/// Number of pages needed for `total` rows
pub fn total_pages(total: usize) -> usize {
    total.div_ceil(ITEMS_PER_PAGE)
}

/// One slot in the page-number strip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(usize),
    Ellipsis,
}

impl Serialize for PageItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PageItem::Page(n) => serializer.serialize_u64(*n as u64),
            PageItem::Ellipsis => serializer.serialize_str("..."),
        }
    }
}

/// Lay out the page-number strip around the current page
///
/// - up to 7 pages: every page
/// - current page among the first 3: `1 2 3 ... n-1 n`
/// - current page among the last 3: `1 2 ... n-2 n-1 n`
/// - otherwise: `1 ... c-1 c c+1 ... n`
pub fn generate_pagination(current_page: usize, total_pages: usize) -> Vec<PageItem> {
    use PageItem::{Ellipsis, Page};

    if total_pages <= 7 {
        return (1..=total_pages).map(Page).collect();
    }

    if current_page <= 3 {
        return vec![
            Page(1),
            Page(2),
            Page(3),
            Ellipsis,
            Page(total_pages - 1),
            Page(total_pages),
        ];
    }

    if current_page >= total_pages - 2 {
        return vec![
            Page(1),
            Page(2),
            Ellipsis,
            Page(total_pages - 2),
            Page(total_pages - 1),
            Page(total_pages),
        ];
    }

    vec![
        Page(1),
        Ellipsis,
        Page(current_page - 1),
        Page(current_page),
        Page(current_page + 1),
        Ellipsis,
        Page(total_pages),
    ]
}

/// Pagination metadata returned alongside a list view
#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    /// Current page number (starts at 1)
    pub page: usize,

    /// Total number of pages
    pub total_pages: usize,

    /// Page-number strip for navigation
    pub items: Vec<PageItem>,

    /// Whether there is a next page
    pub has_next: bool,

    /// Whether there is a previous page
    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(page: usize, total_pages: usize) -> Self {
        let page = page.max(1);
        Self {
            page,
            total_pages,
            items: generate_pagination(page, total_pages),
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}
