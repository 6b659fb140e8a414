//! Fixed-size, 1-based pages over ordered result sets.

/// A 1-based page index together with the page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    index: usize,
    size: usize,
}

impl Page {
    /// Returns `None` when either the index or the size is zero.
    pub fn new(index: usize, size: usize) -> Option<Self> {
        if index == 0 || size == 0 {
            return None;
        }
        Some(Self { index, size })
    }

    pub fn first(size: usize) -> Option<Self> {
        Self::new(1, size)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn start(&self) -> usize {
        (self.index - 1).saturating_mul(self.size)
    }

    pub fn end(&self) -> usize {
        self.start().saturating_add(self.size)
    }
}

/// The `page` slice of `items`, clamped to its bounds. Pages past the end are empty.
pub fn paginate<T>(items: &[T], page: Page) -> &[T] {
    let start = page.start().min(items.len());
    let end = page.end().min(items.len());
    &items[start..end]
}

pub fn total_pages(len: usize, size: usize) -> usize {
    if size == 0 {
        return 0;
    }
    len.div_ceil(size)
}
