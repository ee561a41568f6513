use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use rusqlite::{Connection, params};

/// String key-value storage holding the persisted document.
///
/// The SQLite-backed [`Database`] is the only production implementation; the
/// trait exists so tests can inject stores that fail on read or write.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    /// Returns whether a value was present.
    fn remove(&self, key: &str) -> Result<bool>;
}

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS kv (
                    key TEXT PRIMARY KEY NOT NULL,
                    value TEXT NOT NULL,
                    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
                );

                PRAGMA user_version = 1;",
            )?;
        }

        Ok(())
    }
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let mut rows = stmt.query(params![key])?;
        if let Some(row) = rows.next()? {
            Ok(Some(row.get(0)?))
        } else {
            Ok(None)
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let now = Local::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO kv (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, now],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kv_set_get() {
        let db = Database::open_in_memory().unwrap();
        db.set("test_key", "test_value").unwrap();
        let val = db.get("test_key").unwrap();
        assert_eq!(val.as_deref(), Some("test_value"));
    }

    #[test]
    fn test_kv_get_nonexistent() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get("nonexistent").unwrap().is_none());
    }

    #[test]
    fn test_kv_upsert() {
        let db = Database::open_in_memory().unwrap();
        db.set("key", "value1").unwrap();
        db.set("key", "value2").unwrap();
        assert_eq!(db.get("key").unwrap().as_deref(), Some("value2"));
        let count: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM kv", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_kv_remove() {
        let db = Database::open_in_memory().unwrap();
        db.set("key", "value").unwrap();
        assert!(db.remove("key").unwrap());
        assert!(db.get("key").unwrap().is_none());
        // Removing again returns false
        assert!(!db.remove("key").unwrap());
    }

    #[test]
    fn test_migration_sets_user_version() {
        let db = Database::open_in_memory().unwrap();
        let version: i64 = db
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert_eq!(version, 1);
        let count: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM kv", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_open_on_disk_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("heft.db");
        {
            let db = Database::open(&path).unwrap();
            db.set("k", "v").unwrap();
        }
        let db = Database::open(&path).unwrap();
        assert_eq!(db.get("k").unwrap().as_deref(), Some("v"));
    }
}
