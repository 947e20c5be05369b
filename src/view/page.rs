use serde::Serialize;

/// One page of an already filtered and sorted list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSlice<'a, T> {
    pub items: &'a [T],
    pub total_pages: usize,
    pub start_index: usize,
    pub end_index: usize,
}

pub fn total_pages(len: usize, page_size: usize) -> usize {
    let size = page_size.max(1);
    len.div_ceil(size).max(1)
}

pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

/// Slice out `page` (1-based). Does not clamp: a page past the end yields no
/// items, and callers are expected to run `clamp_page` first.
pub fn paginate<T>(list: &[T], page: usize, page_size: usize) -> PageSlice<'_, T> {
    let size = page_size.max(1);
    let start_index = page.saturating_sub(1).saturating_mul(size);
    let end_index = start_index.saturating_add(size).min(list.len());
    let items = if start_index < end_index {
        &list[start_index..end_index]
    } else {
        &list[0..0]
    };
    PageSlice {
        items,
        total_pages: total_pages(list.len(), size),
        start_index,
        end_index,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    First,
    Prev,
    Next,
    Last,
}

impl PageAction {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "first" => Some(PageAction::First),
            "prev" | "previous" => Some(PageAction::Prev),
            "next" => Some(PageAction::Next),
            "last" => Some(PageAction::Last),
            _ => None,
        }
    }

    /// Target page; stepping past either end leaves the page where it is.
    pub fn apply(self, page: usize, total_pages: usize) -> usize {
        let page = clamp_page(page, total_pages);
        match self {
            PageAction::First => 1,
            PageAction::Prev => {
                if page > 1 {
                    page - 1
                } else {
                    page
                }
            }
            PageAction::Next => {
                if page < total_pages {
                    page + 1
                } else {
                    page
                }
            }
            PageAction::Last => total_pages.max(1),
        }
    }
}

/// Pager footer for a list of `total_items`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub start_index: usize,
    pub end_index: usize,
    pub has_prev: bool,
    pub has_next: bool,
    pub label: String,
}

impl PageInfo {
    pub fn for_total(total_items: usize, page: usize, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        let total_pages = total_pages(total_items, page_size);
        let page = clamp_page(page, total_pages);
        let start_index = (page - 1) * page_size;
        let end_index = (start_index + page_size).min(total_items);
        Self::build(page, page_size, total_items, total_pages, start_index, end_index)
    }

    /// Footer for a slice `paginate` cut from an already clamped page.
    pub fn from_slice<T>(
        slice: &PageSlice<'_, T>,
        page: usize,
        page_size: usize,
        total_items: usize,
    ) -> Self {
        Self::build(
            page,
            page_size.max(1),
            total_items,
            slice.total_pages,
            slice.start_index,
            slice.end_index,
        )
    }

    fn build(
        page: usize,
        page_size: usize,
        total_items: usize,
        total_pages: usize,
        start_index: usize,
        end_index: usize,
    ) -> Self {
        let label = if total_items == 0 {
            "No results".to_string()
        } else {
            format!("Showing {}-{} of {}", start_index + 1, end_index, total_items)
        };
        Self {
            page,
            page_size,
            total_items,
            total_pages,
            start_index,
            end_index,
            has_prev: page > 1,
            has_next: page < total_pages,
            label,
        }
    }
}
