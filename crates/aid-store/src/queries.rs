use crate::KvStore;
use anyhow::Result;
use rusqlite::Connection;

impl KvStore {
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        self.with_conn(|conn| query_value(conn, key))
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.set_many(&[(key, value)])
    }

    /// Write several entries in one transaction so readers never observe a
    /// half-written session.
    pub fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            for (key, value) in entries {
                tx.execute(
                    "INSERT INTO kv (key, value) VALUES (?1, ?2)
                     ON CONFLICT(key) DO UPDATE
                     SET value = excluded.value, updated_at = datetime('now')",
                    (key, value),
                )?;
            }
            tx.commit()?;
            Ok(())
        })
    }

    /// Remove keys. Returns how many entries existed.
    pub fn remove_many(&self, keys: &[&str]) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let mut removed = 0;
            for key in keys {
                removed += tx.execute("DELETE FROM kv WHERE key = ?1", [key])?;
            }
            tx.commit()?;
            Ok(removed)
        })
    }
}

fn query_value(conn: &Connection, key: &str) -> Result<Option<String>> {
    let mut stmt = conn.prepare("SELECT value FROM kv WHERE key = ?1")?;

    let value = stmt.query_row([key], |row| row.get(0)).optional()?;

    Ok(value)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_overwrite() {
        let db = KvStore::open_in_memory().unwrap();
        assert_eq!(db.get("token").unwrap(), None);

        db.set("token", "abc").unwrap();
        assert_eq!(db.get("token").unwrap().as_deref(), Some("abc"));

        db.set("token", "def").unwrap();
        assert_eq!(db.get("token").unwrap().as_deref(), Some("def"));
    }

    #[test]
    fn remove_many_counts_existing_keys() {
        let db = KvStore::open_in_memory().unwrap();
        db.set_many(&[("token", "t"), ("user_id", "4")]).unwrap();

        let removed = db.remove_many(&["token", "user", "user_id"]).unwrap();
        assert_eq!(removed, 2);
        assert_eq!(db.get("user_id").unwrap(), None);
    }

    #[test]
    fn survives_reopen() {
        let dir = std::env::temp_dir().join(format!("aid-store-test-{}", std::process::id()));
        let path = dir.join("nested").join("session.db");

        {
            let db = KvStore::open(&path).unwrap();
            db.set("user_id", "12").unwrap();
        }

        let db = KvStore::open(&path).unwrap();
        assert_eq!(db.get("user_id").unwrap().as_deref(), Some("12"));

        drop(db);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
