//! List item storage.
//!
//! The pipeline only reads through [`ListItemStore::find_page`]; `insert` and
//! `count_matching` exist for seeding and for sizing a deletion up front.

mod sqlite;

pub use sqlite::SqliteListItemStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid pagination: offset {offset}, limit {limit}")]
    InvalidPagination { offset: usize, limit: usize },

    #[error("List item already exists: {0}")]
    Duplicate(String),
}

/// Selects the list items of one user that point at one URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionFilter {
    /// Owner key
    pub user_id: String,
    /// Match value
    pub url: String,
}

impl DeletionFilter {
    pub fn new(user_id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            url: url.into(),
        }
    }

    /// Both the owner key and the match value must be non-blank.
    pub fn is_complete(&self) -> bool {
        !self.user_id.trim().is_empty() && !self.url.trim().is_empty()
    }
}

/// One row of a page: the external identifier plus the attribute it matched on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItemRef {
    pub external_id: String,
    pub url: String,
}

/// A stored list item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListItem {
    pub id: i64,
    pub external_id: String,
    pub list_external_id: String,
    pub user_id: String,
    pub url: String,
    pub title: Option<String>,
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
}

/// Input for inserting a list item.
#[derive(Debug, Clone)]
pub struct NewListItem {
    pub external_id: String,
    pub list_external_id: String,
    pub user_id: String,
    pub url: String,
    pub title: Option<String>,
    pub sort_order: i64,
}

impl NewListItem {
    pub fn new(
        external_id: impl Into<String>,
        list_external_id: impl Into<String>,
        user_id: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            external_id: external_id.into(),
            list_external_id: list_external_id.into(),
            user_id: user_id.into(),
            url: url.into(),
            title: None,
            sort_order: 0,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_sort_order(mut self, sort_order: i64) -> Self {
        self.sort_order = sort_order;
        self
    }
}

/// Trait for list item storage
pub trait ListItemStore: Send + Sync {
    /// Return up to `limit` matching items starting at `offset`, in the
    /// store's natural order. Consecutive pages neither repeat nor skip rows.
    fn find_page(
        &self,
        filter: &DeletionFilter,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<ListItemRef>, StoreError>;

    /// Insert a list item, returns the stored row
    fn insert(&self, item: NewListItem) -> Result<ListItem, StoreError>;

    /// Count all items matching the filter
    fn count_matching(&self, filter: &DeletionFilter) -> Result<i64, StoreError>;
}
