//! Offset/limit paging over a [`ListItemStore`].

use tracing::debug;

use crate::metrics::PAGES_FETCHED;
use crate::store::{DeletionFilter, ListItemRef, ListItemStore, StoreError};

/// Walks the store page by page until a page comes back empty.
pub struct PageFetcher<'a> {
    store: &'a dyn ListItemStore,
    filter: &'a DeletionFilter,
    page_size: usize,
    offset: usize,
    pages_fetched: usize,
    exhausted: bool,
}

impl<'a> PageFetcher<'a> {
    pub fn new(store: &'a dyn ListItemStore, filter: &'a DeletionFilter, page_size: usize) -> Self {
        Self {
            store,
            filter,
            page_size,
            offset: 0,
            pages_fetched: 0,
            exhausted: false,
        }
    }

    /// Fetch the next page.
    ///
    /// Returns `Ok(None)` once the store returns an empty page, and on every
    /// call after that. Store errors are returned as-is, without retry.
    pub fn next_page(&mut self) -> Result<Option<Vec<ListItemRef>>, StoreError> {
        if self.exhausted {
            return Ok(None);
        }

        let page = self
            .store
            .find_page(self.filter, self.offset, self.page_size)?;

        debug!(
            user_id = %self.filter.user_id,
            offset = self.offset,
            rows = page.len(),
            "Fetched list item page"
        );

        if page.is_empty() {
            self.exhausted = true;
            return Ok(None);
        }

        PAGES_FETCHED.inc();
        self.pages_fetched += 1;
        self.offset += self.page_size;
        Ok(Some(page))
    }

    /// Offset the next request will use.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of non-empty pages returned so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockListItemStore;

    fn filter() -> DeletionFilter {
        DeletionFilter::new("u1", "https://example.com")
    }

    #[test]
    fn test_pages_advance_by_page_size_until_empty() {
        let store = MockListItemStore::with_matches(&filter(), &["a", "b", "c", "d", "e"]);
        let filter = filter();
        let mut fetcher = PageFetcher::new(&store, &filter, 2);

        let mut pages = Vec::new();
        while let Some(page) = fetcher.next_page().unwrap() {
            pages.push(
                page.into_iter()
                    .map(|r| r.external_id)
                    .collect::<Vec<_>>(),
            );
        }

        assert_eq!(pages, vec![vec!["a", "b"], vec!["c", "d"], vec!["e"]]);
        assert_eq!(fetcher.pages_fetched(), 3);
        assert_eq!(fetcher.offset(), 6);
        assert_eq!(store.requested_offsets(), vec![0, 2, 4, 6]);
    }

    #[test]
    fn test_exhausted_fetcher_stops_querying() {
        let store = MockListItemStore::new();
        let filter = filter();
        let mut fetcher = PageFetcher::new(&store, &filter, 10);

        assert!(fetcher.next_page().unwrap().is_none());
        assert!(fetcher.next_page().unwrap().is_none());
        assert_eq!(store.requested_offsets(), vec![0]);
    }

    #[test]
    fn test_store_error_propagates() {
        let store = MockListItemStore::with_matches(&filter(), &["a", "b", "c"]);
        store.fail_at_offset(1);
        let filter = filter();
        let mut fetcher = PageFetcher::new(&store, &filter, 1);

        assert!(fetcher.next_page().unwrap().is_some());
        let err = fetcher.next_page().unwrap_err();
        assert!(matches!(err, StoreError::Database(_)));
        assert_eq!(fetcher.offset(), 1);
    }
}
