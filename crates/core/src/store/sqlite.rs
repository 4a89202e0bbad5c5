use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode};

use super::{DeletionFilter, ListItem, ListItemRef, ListItemStore, NewListItem, StoreError};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS list_items (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        external_id TEXT NOT NULL UNIQUE,
        list_external_id TEXT NOT NULL,
        user_id TEXT NOT NULL,
        url TEXT NOT NULL,
        title TEXT,
        sort_order INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_list_items_user_url ON list_items(user_id, url);
    CREATE INDEX IF NOT EXISTS idx_list_items_list ON list_items(list_external_id);
"#;

/// SQLite-backed list item store
pub struct SqliteListItemStore {
    conn: Mutex<Connection>,
}

impl SqliteListItemStore {
    /// Open (or create) the database file and ensure the schema exists
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(db_err)?;
        Self::with_connection(conn)
    }

    /// Create an in-memory store (useful for testing)
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA).map_err(db_err)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Database("connection mutex poisoned".to_string()))
    }
}

fn db_err(e: rusqlite::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

fn to_sql_int(offset: usize, limit: usize) -> Result<(i64, i64), StoreError> {
    match (i64::try_from(offset), i64::try_from(limit)) {
        (Ok(o), Ok(l)) if l > 0 => Ok((o, l)),
        _ => Err(StoreError::InvalidPagination { offset, limit }),
    }
}

impl ListItemStore for SqliteListItemStore {
    fn find_page(
        &self,
        filter: &DeletionFilter,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<ListItemRef>, StoreError> {
        let (offset, limit) = to_sql_int(offset, limit)?;
        let conn = self.conn()?;

        // Row id order keeps consecutive pages stable under a fixed snapshot
        let mut stmt = conn
            .prepare_cached(
                "SELECT external_id, url FROM list_items \
                 WHERE user_id = ?1 AND url = ?2 \
                 ORDER BY id LIMIT ?3 OFFSET ?4",
            )
            .map_err(db_err)?;

        let rows = stmt
            .query_map(params![filter.user_id, filter.url, limit, offset], |row| {
                Ok(ListItemRef {
                    external_id: row.get(0)?,
                    url: row.get(1)?,
                })
            })
            .map_err(db_err)?;

        let items = rows.collect::<Result<Vec<_>, _>>().map_err(db_err)?;
        Ok(items)
    }

    fn insert(&self, item: NewListItem) -> Result<ListItem, StoreError> {
        let conn = self.conn()?;
        let created_at = Utc::now();

        conn.execute(
            "INSERT INTO list_items \
             (external_id, list_external_id, user_id, url, title, sort_order, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                item.external_id,
                item.list_external_id,
                item.user_id,
                item.url,
                item.title,
                item.sort_order,
                created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| match e.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) => StoreError::Duplicate(item.external_id.clone()),
            _ => db_err(e),
        })?;

        Ok(ListItem {
            id: conn.last_insert_rowid(),
            external_id: item.external_id,
            list_external_id: item.list_external_id,
            user_id: item.user_id,
            url: item.url,
            title: item.title,
            sort_order: item.sort_order,
            created_at,
        })
    }

    fn count_matching(&self, filter: &DeletionFilter) -> Result<i64, StoreError> {
        let conn = self.conn()?;
        let count = conn
            .query_row(
                "SELECT COUNT(*) FROM list_items WHERE user_id = ?1 AND url = ?2",
                params![filter.user_id, filter.url],
                |row| row.get(0),
            )
            .map_err(db_err)?;
        Ok(count)
    }
}
