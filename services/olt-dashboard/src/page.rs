//! Fixed-size pagination with clamped page numbers

use serde::Serialize;

/// Rows per page unless a view configures otherwise
pub const DEFAULT_PAGE_SIZE: usize = 15;

/// One page of a filtered sequence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// The page actually returned, after clamping
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub page_size: usize,
}

/// Number of pages needed for `len` items; never less than one
pub fn total_pages(len: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    len.div_ceil(page_size).max(1)
}

/// Clamp `requested` into `1..=total_pages`
pub fn clamp_page(requested: usize, len: usize, page_size: usize) -> usize {
    requested.clamp(1, total_pages(len, page_size))
}

/// Slice out the requested page, clamping out-of-range requests
pub fn paginate<T: Clone>(items: &[T], page_size: usize, requested: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let page = clamp_page(requested, items.len(), page_size);
    let start = (page - 1) * page_size;
    let end = (start + page_size).min(items.len());

    Page {
        items: items[start.min(end)..end].to_vec(),
        page,
        total_pages: total_pages(items.len(), page_size),
        total_items: items.len(),
        page_size,
    }
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            total_pages: self.total_pages,
            total_items: self.total_items,
            page_size: self.page_size,
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}
