use serde::{Serialize, Serializer};
use std::ops::Range;

/// Cards per page on both list views
pub const PAGE_SIZE: usize = 12;

/// Pages shown without collapsing into ellipses
const MAX_VISIBLE_PAGES: usize = 7;

/// Number of pages needed for `total` rows; zero rows means zero pages
pub fn total_pages(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1))
}

/// Index range of `page` (1-based) clamped to a sequence of `len` items
pub fn page_range(page: usize, page_size: usize, len: usize) -> Range<usize> {
    let start = page.saturating_sub(1).saturating_mul(page_size).min(len);
    let end = start.saturating_add(page_size).min(len);
    start..end
}

/// Copy out one page of `items`
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Vec<T> {
    items[page_range(page, page_size, items.len())].to_vec()
}

/// Entry of the pagination bar
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageMarker {
    Page(usize),
    Ellipsis,
}

// JS side renders numbers as buttons and the string as a gap
impl Serialize for PageMarker {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            PageMarker::Page(page) => serializer.serialize_u64(*page as u64),
            PageMarker::Ellipsis => serializer.serialize_str("..."),
        }
    }
}

/// Page numbers of the pagination bar with ellipses between gaps.
///
/// Up to seven pages are listed in full. Past that the first and last page are
/// always present and the current page is shown with its neighbours, or the
/// first/last five pages when the current page is close to either end.
pub fn pagination_numbers(current_page: usize, total_pages: usize) -> Vec<PageMarker> {
    use PageMarker::{Ellipsis, Page};

    if total_pages <= MAX_VISIBLE_PAGES {
        return (1..=total_pages).map(Page).collect();
    }

    let last = total_pages;
    let mut pages = vec![Page(1)];
    if current_page <= 4 {
        pages.extend((2..=5).map(Page));
        pages.push(Ellipsis);
        pages.push(Page(last));
    } else if current_page >= last - 3 {
        pages.push(Ellipsis);
        pages.extend((last - 4..=last).map(Page));
    } else {
        pages.push(Ellipsis);
        pages.extend((current_page - 1..=current_page + 1).map(Page));
        pages.push(Ellipsis);
        pages.push(Page(last));
    }
    pages
}
