use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ToSql};

use super::{AuditError, AuditEvent, AuditFilter, AuditRecord, AuditStore};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS audit_events (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp TEXT NOT NULL,
        event_type TEXT NOT NULL,
        user_id TEXT,
        run_id TEXT,
        data TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_audit_events_timestamp ON audit_events(timestamp);
    CREATE INDEX IF NOT EXISTS idx_audit_events_event_type ON audit_events(event_type);
    CREATE INDEX IF NOT EXISTS idx_audit_events_user_id ON audit_events(user_id);
    CREATE INDEX IF NOT EXISTS idx_audit_events_run_id ON audit_events(run_id);
"#;

/// SQLite-backed audit store
pub struct SqliteAuditStore {
    conn: Mutex<Connection>,
}

impl SqliteAuditStore {
    pub fn new(path: &Path) -> Result<Self, AuditError> {
        let conn = Connection::open(path).map_err(db_err)?;
        Self::with_connection(conn)
    }

    /// In-memory store (useful for testing)
    pub fn in_memory() -> Result<Self, AuditError> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, AuditError> {
        conn.execute_batch(SCHEMA).map_err(db_err)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, AuditError> {
        self.conn
            .lock()
            .map_err(|_| AuditError::Database("connection mutex poisoned".to_string()))
    }

    fn where_clause(filter: &AuditFilter) -> (String, Vec<Box<dyn ToSql>>) {
        let mut conditions = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        let columns = [
            ("event_type = ?", &filter.event_type),
            ("user_id = ?", &filter.user_id),
            ("run_id = ?", &filter.run_id),
        ];
        for (condition, value) in columns {
            if let Some(value) = value {
                conditions.push(condition);
                values.push(Box::new(value.clone()));
            }
        }
        if let Some(from) = filter.from {
            conditions.push("timestamp >= ?");
            values.push(Box::new(from.to_rfc3339()));
        }
        if let Some(to) = filter.to {
            conditions.push("timestamp <= ?");
            values.push(Box::new(to.to_rfc3339()));
        }

        if conditions.is_empty() {
            (String::new(), values)
        } else {
            (format!("WHERE {}", conditions.join(" AND ")), values)
        }
    }
}

fn db_err(e: rusqlite::Error) -> AuditError {
    AuditError::Database(e.to_string())
}

type RawRow = (i64, String, String, Option<String>, Option<String>, String);

fn decode(raw: RawRow) -> Result<AuditRecord, AuditError> {
    let (id, timestamp, event_type, user_id, run_id, data) = raw;

    let timestamp: DateTime<Utc> = DateTime::parse_from_rfc3339(&timestamp)
        .map_err(|e| AuditError::Database(format!("Invalid timestamp: {}", e)))?
        .into();
    let data: AuditEvent =
        serde_json::from_str(&data).map_err(|e| AuditError::Serialization(e.to_string()))?;

    Ok(AuditRecord {
        id,
        timestamp,
        event_type,
        user_id,
        run_id,
        data,
    })
}

impl AuditStore for SqliteAuditStore {
    fn insert(&self, record: &AuditRecord) -> Result<i64, AuditError> {
        let data = serde_json::to_string(&record.data)
            .map_err(|e| AuditError::Serialization(e.to_string()))?;
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO audit_events (timestamp, event_type, user_id, run_id, data) VALUES (?, ?, ?, ?, ?)",
            params![
                record.timestamp.to_rfc3339(),
                record.event_type,
                record.user_id,
                record.run_id,
                data,
            ],
        )
        .map_err(db_err)?;

        Ok(conn.last_insert_rowid())
    }

    fn query(&self, filter: &AuditFilter) -> Result<Vec<AuditRecord>, AuditError> {
        let (where_clause, mut values) = Self::where_clause(filter);
        values.push(Box::new(filter.limit));
        values.push(Box::new(filter.offset));
        let refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();

        let sql = format!(
            "SELECT id, timestamp, event_type, user_id, run_id, data FROM audit_events {} ORDER BY timestamp DESC, id DESC LIMIT ? OFFSET ?",
            where_clause
        );

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql).map_err(db_err)?;
        let raw = stmt
            .query_map(refs.as_slice(), |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                ))
            })
            .map_err(db_err)?
            .collect::<Result<Vec<RawRow>, _>>()
            .map_err(db_err)?;

        raw.into_iter().map(decode).collect()
    }

    fn count(&self, filter: &AuditFilter) -> Result<i64, AuditError> {
        let (where_clause, values) = Self::where_clause(filter);
        let refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
        let sql = format!("SELECT COUNT(*) FROM audit_events {}", where_clause);

        let conn = self.conn()?;
        let count = conn
            .query_row(&sql, refs.as_slice(), |row| row.get(0))
            .map_err(db_err)?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    fn record(event: AuditEvent, timestamp: DateTime<Utc>) -> AuditRecord {
        AuditRecord {
            id: 0,
            timestamp,
            event_type: event.event_type().to_string(),
            user_id: event.user_id().map(String::from),
            run_id: event.run_id().map(String::from),
            data: event,
        }
    }

    fn requested(user_id: &str) -> AuditEvent {
        AuditEvent::DeletionRequested {
            requested_by: "svc".to_string(),
            user_id: user_id.to_string(),
            url: "https://example.com".to_string(),
        }
    }

    fn completed(user_id: &str, run_id: &str) -> AuditEvent {
        AuditEvent::DeletionCompleted {
            run_id: run_id.to_string(),
            requested_by: "svc".to_string(),
            user_id: user_id.to_string(),
            url: "https://example.com".to_string(),
            identifiers_matched: 3,
            batches_sent: 1,
            batches_failed: 0,
        }
    }

    #[test]
    fn test_insert_and_query_newest_first() {
        let store = SqliteAuditStore::in_memory().unwrap();
        let now = Utc::now();

        let first = store.insert(&record(requested("u1"), now - Duration::seconds(5))).unwrap();
        let second = store.insert(&record(completed("u1", "run-1"), now)).unwrap();
        assert!(second > first);

        let records = store.query(&AuditFilter::new()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, second);
        assert_eq!(records[0].data, completed("u1", "run-1"));
        assert_eq!(records[1].event_type, "deletion_requested");
    }

    #[test]
    fn test_filters() {
        let store = SqliteAuditStore::in_memory().unwrap();
        let now = Utc::now();
        store.insert(&record(requested("u1"), now)).unwrap();
        store.insert(&record(completed("u1", "run-1"), now)).unwrap();
        store.insert(&record(completed("u2", "run-2"), now)).unwrap();

        let by_user = AuditFilter::new().with_user_id("u1");
        assert_eq!(store.count(&by_user).unwrap(), 2);

        let by_type = AuditFilter::new().with_event_type("deletion_completed");
        assert_eq!(store.count(&by_type).unwrap(), 2);

        let by_run = AuditFilter::new().with_run_id("run-2");
        let records = store.query(&by_run).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].user_id.as_deref(), Some("u2"));

        let future = AuditFilter::new().with_time_range(Some(now + Duration::hours(1)), None);
        assert_eq!(store.count(&future).unwrap(), 0);
    }

    #[test]
    fn test_limit_and_offset() {
        let store = SqliteAuditStore::in_memory().unwrap();
        let now = Utc::now();
        for i in 0..5 {
            store
                .insert(&record(requested(&format!("u{i}")), now + Duration::seconds(i)))
                .unwrap();
        }

        let page = store
            .query(&AuditFilter::new().with_limit(2).with_offset(1))
            .unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].user_id.as_deref(), Some("u3"));
        assert_eq!(page[1].user_id.as_deref(), Some("u2"));

        // count ignores pagination
        assert_eq!(
            store
                .count(&AuditFilter::new().with_limit(2).with_offset(1))
                .unwrap(),
            5
        );
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("audit.db");

        {
            let store = SqliteAuditStore::new(&path).unwrap();
            store.insert(&record(requested("u1"), Utc::now())).unwrap();
        }

        let store = SqliteAuditStore::new(&path).unwrap();
        assert_eq!(store.count(&AuditFilter::new()).unwrap(), 1);
    }
}
