//! Pagination of ordered listings
//!
//! [`paginate`] slices an ordered sequence into fixed-size pages. Every page
//! but the last holds exactly `per_page` items, the last holds between one
//! and `per_page`, and reading the pages in order gives back the input with
//! nothing dropped or repeated. An empty input has no pages at all.

use serde::Serialize;
use thiserror::Error;

/// Errors raised when a listing cannot be paginated as requested
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginateError {
    #[error("page size must be greater than zero")]
    ZeroPageSize,
    #[error("page {page} is out of range, the listing has {total_pages} page(s)")]
    OutOfRange { page: usize, total_pages: usize },
}

/// One page of a listing
#[derive(Debug, Clone, PartialEq)]
pub struct Pager<'a, T> {
    /// 1-based page number
    pub page_number: usize,
    /// Configured page size
    pub per_page: usize,
    /// Number of pages in the listing
    pub total_pages: usize,
    /// Number of items in the whole listing
    pub total_items: usize,
    /// Items on this page, in listing order
    pub items: &'a [T],
}

impl<'a, T> Pager<'a, T> {
    pub fn has_previous(&self) -> bool {
        self.page_number > 1
    }

    pub fn has_next(&self) -> bool {
        self.page_number < self.total_pages
    }

    pub fn previous_page(&self) -> Option<usize> {
        self.has_previous().then(|| self.page_number - 1)
    }

    pub fn next_page(&self) -> Option<usize> {
        self.has_next().then(|| self.page_number + 1)
    }

    /// Index of this page's first item within the whole listing
    pub fn offset(&self) -> usize {
        (self.page_number - 1) * self.per_page
    }

    /// Whether navigation controls are worth rendering
    pub fn needs_controls(&self) -> bool {
        self.total_pages > 1
    }

    /// Page number links for this page, see [`page_links`]
    pub fn links(&self, mid_size: usize) -> Vec<PageLink> {
        page_links(self.page_number, self.total_pages, mid_size)
    }
}

/// `ceil(count / per_page)`, which is 0 for an empty listing
pub fn total_pages(count: usize, per_page: usize) -> Result<usize, PaginateError> {
    if per_page == 0 {
        return Err(PaginateError::ZeroPageSize);
    }
    Ok(count.div_ceil(per_page))
}

/// Split `items` into pages of `per_page`
pub fn paginate<T>(items: &[T], per_page: usize) -> Result<Vec<Pager<'_, T>>, PaginateError> {
    let total = total_pages(items.len(), per_page)?;

    Ok(items
        .chunks(per_page)
        .enumerate()
        .map(|(i, chunk)| Pager {
            page_number: i + 1,
            per_page,
            total_pages: total,
            total_items: items.len(),
            items: chunk,
        })
        .collect())
}

/// The single page `page_number` of `items`
pub fn page<T>(
    items: &[T],
    per_page: usize,
    page_number: usize,
) -> Result<Pager<'_, T>, PaginateError> {
    let total = total_pages(items.len(), per_page)?;
    if page_number == 0 || page_number > total {
        return Err(PaginateError::OutOfRange {
            page: page_number,
            total_pages: total,
        });
    }

    let start = (page_number - 1) * per_page;
    let end = (start + per_page).min(items.len());
    Ok(Pager {
        page_number,
        per_page,
        total_pages: total,
        total_items: items.len(),
        items: &items[start..end],
    })
}

/// An entry in the row of page number links
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageLink {
    /// A page number; `current` marks the page being viewed
    Page { number: usize, current: bool },
    /// Stands in for a run of hidden page numbers
    Gap,
}

/// Compact row of page numbers around `current`
///
/// The first and last page are always listed, plus every page within
/// `mid_size` of the current one. A [`PageLink::Gap`] replaces the hidden run
/// whenever the window does not reach the first or last page directly. With
/// `mid_size = 0` page 6 of 9 renders as `1 … 6 … 9`, and page 2 as
/// `1 2 … 9`. Listings with at most one page get no links.
pub fn page_links(current: usize, total: usize, mid_size: usize) -> Vec<PageLink> {
    if total <= 1 {
        return Vec::new();
    }
    let current = current.clamp(1, total);
    let start = current.saturating_sub(mid_size).max(1);
    let end = current.saturating_add(mid_size).min(total);

    let page = |number: usize| PageLink::Page {
        number,
        current: number == current,
    };

    let mut links = Vec::with_capacity(end - start + 5);
    if start > 1 {
        links.push(page(1));
        if start > 2 {
            links.push(PageLink::Gap);
        }
    }
    links.extend((start..=end).map(page));
    if end < total {
        if end + 1 < total {
            links.push(PageLink::Gap);
        }
        links.push(page(total));
    }
    links
}
