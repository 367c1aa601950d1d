//! Page merging.
//!
//! A `PagedList` accumulates fetched pages in server order. Resets replace
//! the whole list; everything else appends. Duplicates that the server sends
//! across page boundaries are kept as-is.

use serde::{Deserialize, Serialize};

/// An entity that can serve as a pagination cursor.
pub trait Identified {
    fn id(&self) -> i64;
}

/// One fetch's worth of entities, in server-provided order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Page<T> {
    items: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn empty() -> Self {
        Self { items: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

impl<T: Identified> Page<T> {
    /// Id of the last item, the next cursor value.
    pub fn last_id(&self) -> Option<i64> {
        self.items.last().map(Identified::id)
    }
}

impl<T> From<Vec<T>> for Page<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

/// What `PagedList::apply` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Items appended or installed by this merge.
    pub added: usize,
    /// Length of the accumulated list afterwards.
    pub len: usize,
    /// The merge was a non-reset fetch that returned nothing.
    pub end_of_data: bool,
}

impl MergeOutcome {
    pub fn is_now_empty(&self) -> bool {
        self.len == 0
    }
}

/// Ordered accumulation of pages for one (list, owner) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct PagedList<T> {
    accumulated: Vec<T>,
}

impl<T> PagedList<T> {
    pub fn new() -> Self {
        Self {
            accumulated: Vec::new(),
        }
    }

    /// Merge a freshly fetched page.
    ///
    /// With `is_reset` the page replaces everything, even when empty.
    /// Otherwise a non-empty page is appended and an empty one leaves the
    /// list untouched and reports end-of-data.
    pub fn apply(&mut self, page: Page<T>, is_reset: bool) -> MergeOutcome {
        let added = page.len();

        if is_reset {
            self.accumulated = page.into_items();
            return MergeOutcome {
                added,
                len: self.accumulated.len(),
                end_of_data: false,
            };
        }

        if page.is_empty() {
            return MergeOutcome {
                added: 0,
                len: self.accumulated.len(),
                end_of_data: true,
            };
        }

        self.accumulated.extend(page.into_items());
        MergeOutcome {
            added,
            len: self.accumulated.len(),
            end_of_data: false,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.accumulated
    }

    pub fn len(&self) -> usize {
        self.accumulated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accumulated.is_empty()
    }

}

impl<T: Identified> PagedList<T> {
    /// Position of the first item with the given id.
    pub fn position_of(&self, id: i64) -> Option<usize> {
        self.accumulated.iter().position(|item| item.id() == id)
    }

    /// Apply `patch` to every item with the given id.
    ///
    /// Returns how many items were patched; overlapping pages can hold the
    /// same id more than once.
    pub fn update(&mut self, id: i64, mut patch: impl FnMut(&mut T)) -> usize {
        let mut patched = 0;
        for item in self.accumulated.iter_mut().filter(|item| item.id() == id) {
            patch(item);
            patched += 1;
        }
        patched
    }

    /// Id of the last accumulated item.
    pub fn last_id(&self) -> Option<i64> {
        self.accumulated.last().map(Identified::id)
    }
}

impl<T> Default for PagedList<T> {
    fn default() -> Self {
        Self::new()
    }
}
