//! Testing utilities and mock implementations.
//!
//! Mocks cover every seam the pipeline talks through, so runs can be driven
//! end to end without a database or a queue endpoint.
//!
//! # Example
//!
//! ```rust,ignore
//! use shareable_lists_core::testing::{MockListItemStore, MockQueueClient, fixtures};
//!
//! let filter = fixtures::filter("u1");
//! let store = MockListItemStore::with_matches(&filter, &["a", "b", "c"]);
//! let queue = MockQueueClient::new();
//! queue.fail_attempts(&[2]);
//! ```

mod mock_queue;
mod mock_store;
mod mock_tracker;

pub use mock_queue::MockQueueClient;
pub use mock_store::MockListItemStore;
pub use mock_tracker::RecordingErrorTracker;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::store::{DeletionFilter, NewListItem};

    pub const URL: &str = "https://example.com/shared-article";

    /// Filter for `user_id` against [`URL`].
    pub fn filter(user_id: &str) -> DeletionFilter {
        DeletionFilter::new(user_id, URL)
    }

    /// `count` list items for `user_id` pointing at [`URL`], spread over two lists.
    pub fn list_items(user_id: &str, count: usize) -> Vec<NewListItem> {
        (0..count)
            .map(|i| {
                NewListItem::new(
                    format!("{user_id}-item-{i:04}"),
                    format!("{user_id}-list-{}", i % 2),
                    user_id,
                    URL,
                )
                .with_sort_order(i as i64)
            })
            .collect()
    }

    /// External ids [`list_items`] generates, in insertion order.
    pub fn external_ids(user_id: &str, count: usize) -> Vec<String> {
        list_items(user_id, count)
            .into_iter()
            .map(|item| item.external_id)
            .collect()
    }
}
