//! Page math for the gallery view.
//!
//! [`paginate`] turns an untrusted 1-based page number into a [`PageView`]:
//! the clamped current page, its neighbours, the window of page links around it,
//! and the slice of entries to render. Every input is accepted; nothing here can
//! index out of bounds.
//!
//! ```text
//! page_count = 9, page = 5, window = 1
//!
//!   [1] …  4  (5)  6  … [9]
//!    ^     \_______/     ^
//!    |   pages_in_range  |
//!  show_first_page    show_last_page
//! ```

use crate::bounds;
use crate::scan::ImageEntry;

/// One rendered page of the gallery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView<'a> {
    /// Current page after clamping, always at least 1.
    pub page: usize,
    pub first_page: usize,
    /// Equal to `page_count`; 0 for an empty index.
    pub last_page: usize,
    pub page_count: usize,
    pub prev_page: usize,
    pub next_page: usize,
    /// Page numbers within `window` of the current page.
    pub pages_in_range: Vec<usize>,
    /// A gap separates page 1 from the window.
    pub show_first_page: bool,
    /// A gap separates the window from the last page.
    pub show_last_page: bool,
    /// Index of the first displayed entry.
    pub start: usize,
    /// One past the last displayed entry.
    pub end: usize,
    pub entries: &'a [ImageEntry],
}

/// Number of pages needed for `len` entries, 0 when there are none.
pub fn page_count(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1))
}

/// Compute the view for `page` over `entries`.
///
/// A `page_size` of 0 is treated as 1.
pub fn paginate(
    entries: &[ImageEntry],
    page: i64,
    page_size: usize,
    window: usize,
) -> PageView<'_> {
    let page_size = page_size.max(1);
    let page_count = page_count(entries.len(), page_size);

    if page_count == 0 {
        return PageView {
            page: 1,
            first_page: 1,
            last_page: 0,
            page_count: 0,
            prev_page: 1,
            next_page: 1,
            pages_in_range: Vec::new(),
            show_first_page: false,
            show_last_page: false,
            start: 0,
            end: 0,
            entries: &entries[..0],
        };
    }

    // Only the page number is signed; everything after clamping is usize
    let page = bounds::clamp(page, 1, page_count as i64) as usize;
    let prev_page = bounds::max(page - 1, 1);
    let next_page = bounds::min(page + 1, page_count);

    let lo = page.saturating_sub(window);
    let hi = page.saturating_add(window);
    let pages_in_range = (bounds::max(lo, 1)..=bounds::min(hi, page_count)).collect();

    let start = (page - 1) * page_size;
    let end = bounds::min(start + page_size, entries.len());

    PageView {
        page,
        first_page: 1,
        last_page: page_count,
        page_count,
        prev_page,
        next_page,
        pages_in_range,
        show_first_page: lo > 1,
        show_last_page: hi < page_count,
        start,
        end,
        entries: &entries[start..end],
    }
}
