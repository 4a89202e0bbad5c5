//! Mock list item store for testing.

use chrono::Utc;
use std::collections::HashSet;
use std::sync::Mutex;

use crate::store::{DeletionFilter, ListItem, ListItemRef, ListItemStore, NewListItem, StoreError};

/// In-memory [`ListItemStore`] that records the offsets it is asked for.
///
/// Rows are kept in insertion order, which stands in for row id order.
#[derive(Debug, Default)]
pub struct MockListItemStore {
    items: Mutex<Vec<ListItem>>,
    requested_offsets: Mutex<Vec<usize>>,
    failing_offsets: Mutex<HashSet<usize>>,
}

impl MockListItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with one item per id, all matching `filter`.
    pub fn with_matches(filter: &DeletionFilter, external_ids: &[&str]) -> Self {
        let store = Self::new();
        for (i, id) in external_ids.iter().enumerate() {
            store
                .insert(
                    NewListItem::new(*id, "list-1", filter.user_id.clone(), filter.url.clone())
                        .with_sort_order(i as i64),
                )
                .expect("mock insert");
        }
        store
    }

    /// Make `find_page` fail whenever it is called with `offset`.
    pub fn fail_at_offset(&self, offset: usize) {
        self.failing_offsets.lock().unwrap().insert(offset);
    }

    /// Offsets passed to `find_page`, in call order.
    pub fn requested_offsets(&self) -> Vec<usize> {
        self.requested_offsets.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn matches(item: &ListItem, filter: &DeletionFilter) -> bool {
    item.user_id == filter.user_id && item.url == filter.url
}

impl ListItemStore for MockListItemStore {
    fn find_page(
        &self,
        filter: &DeletionFilter,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<ListItemRef>, StoreError> {
        self.requested_offsets.lock().unwrap().push(offset);

        if limit == 0 {
            return Err(StoreError::InvalidPagination { offset, limit });
        }
        if self.failing_offsets.lock().unwrap().contains(&offset) {
            return Err(StoreError::Database(format!(
                "mock store failure at offset {offset}"
            )));
        }

        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|item| matches(item, filter))
            .skip(offset)
            .take(limit)
            .map(|item| ListItemRef {
                external_id: item.external_id.clone(),
                url: item.url.clone(),
            })
            .collect())
    }

    fn insert(&self, item: NewListItem) -> Result<ListItem, StoreError> {
        let mut items = self.items.lock().unwrap();
        if items.iter().any(|i| i.external_id == item.external_id) {
            return Err(StoreError::Duplicate(item.external_id));
        }

        let stored = ListItem {
            id: items.len() as i64 + 1,
            external_id: item.external_id,
            list_external_id: item.list_external_id,
            user_id: item.user_id,
            url: item.url,
            title: item.title,
            sort_order: item.sort_order,
            created_at: Utc::now(),
        };
        items.push(stored.clone());
        Ok(stored)
    }

    fn count_matching(&self, filter: &DeletionFilter) -> Result<i64, StoreError> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|item| matches(item, filter))
            .count() as i64)
    }
}
