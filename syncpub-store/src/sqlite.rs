//! SQLite-backed content store.

use crate::{ContentListener, ContentStore, Hooks, StoreError, StoreResult, TransitionValidator};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use syncpub_types::{ContentItem, ItemId, ItemStatus, NewItem, StatusTransition};
use tracing::debug;

const ITEM_COLUMNS: &str = "id, item_type, title, status, created_at, modified_at";

/// Content store backed by a single SQLite connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    hooks: Hooks,
}

impl SqliteStore {
    /// Opens (or creates) a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        Self::with_connection(conn)
    }

    /// Opens an in-memory store (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        let store = Self {
            conn: Mutex::new(conn),
            hooks: Hooks::new(),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS items (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                item_type TEXT NOT NULL,
                title TEXT NOT NULL,
                status TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                modified_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_items_type ON items (item_type);

            CREATE TABLE IF NOT EXISTS item_meta (
                item_id TEXT NOT NULL,
                meta_key TEXT NOT NULL,
                meta_value TEXT NOT NULL,
                PRIMARY KEY (item_id, meta_key)
            );

            CREATE INDEX IF NOT EXISTS idx_item_meta_lookup ON item_meta (meta_key, meta_value);
            ",
        )?;
        Ok(())
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

// ── Row decoding ─────────────────────────────────────────────────

struct ItemRow {
    id: String,
    item_type: String,
    title: String,
    status: String,
    created_at: i64,
    modified_at: i64,
}

impl ItemRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            item_type: row.get(1)?,
            title: row.get(2)?,
            status: row.get(3)?,
            created_at: row.get(4)?,
            modified_at: row.get(5)?,
        })
    }

    fn into_item(self, meta: BTreeMap<String, String>) -> StoreResult<ContentItem> {
        Ok(ContentItem {
            id: parse_id(&self.id)?,
            item_type: self.item_type,
            title: self.title,
            status: self
                .status
                .parse()
                .map_err(|e| StoreError::InvalidData(format!("item {}: {e}", self.id)))?,
            meta,
            created_at: self.created_at,
            modified_at: self.modified_at,
        })
    }
}

fn parse_id(s: &str) -> StoreResult<ItemId> {
    ItemId::parse(s).map_err(|e| StoreError::InvalidData(format!("bad item id {s:?}: {e}")))
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn load_meta(conn: &Connection, id: &str) -> StoreResult<BTreeMap<String, String>> {
    let mut stmt =
        conn.prepare_cached("SELECT meta_key, meta_value FROM item_meta WHERE item_id = ?1")?;
    let rows = stmt.query_map(params![id], |row| Ok((row.get(0)?, row.get(1)?)))?;
    let mut meta = BTreeMap::new();
    for row in rows {
        let (key, value): (String, String) = row?;
        meta.insert(key, value);
    }
    Ok(meta)
}

fn load_item(conn: &Connection, id: ItemId) -> StoreResult<Option<ContentItem>> {
    let id_str = id.to_string();
    let row = conn
        .query_row(
            &format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1"),
            params![id_str],
            ItemRow::from_row,
        )
        .optional()?;
    match row {
        Some(row) => {
            let meta = load_meta(conn, &id_str)?;
            Ok(Some(row.into_item(meta)?))
        }
        None => Ok(None),
    }
}

fn item_exists(conn: &Connection, id: ItemId) -> StoreResult<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM items WHERE id = ?1",
            params![id.to_string()],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

// ── ContentStore ─────────────────────────────────────────────────

impl ContentStore for SqliteStore {
    fn create(&self, item: NewItem) -> StoreResult<ContentItem> {
        let id = ItemId::new();
        let now = now_millis();
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO items (id, item_type, title, status, created_at, modified_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![id.to_string(), item.item_type, item.title, item.status.as_str(), now, now],
        )?;
        debug!("Created item {} (type={}, status={})", id, item.item_type, item.status);
        Ok(ContentItem {
            id,
            item_type: item.item_type,
            title: item.title,
            status: item.status,
            meta: BTreeMap::new(),
            created_at: now,
            modified_at: now,
        })
    }

    fn read(&self, id: ItemId) -> StoreResult<ContentItem> {
        let conn = self.conn()?;
        load_item(&conn, id)?.ok_or(StoreError::NotFound(id))
    }

    fn update_status(&self, id: ItemId, status: ItemStatus) -> StoreResult<()> {
        let before = self.read(id)?;
        self.hooks
            .validate(&before, &status)
            .map_err(|reason| StoreError::Rejected { id, reason })?;

        let after = {
            let conn = self.conn()?;
            if before.status != status {
                conn.execute(
                    "UPDATE items SET status = ?1, modified_at = ?2 WHERE id = ?3",
                    params![status.as_str(), now_millis(), id.to_string()],
                )?;
            }
            load_item(&conn, id)?.ok_or(StoreError::NotFound(id))?
        };
        debug!("Status of {} changed: {} -> {}", id, before.status, status);

        let transition = StatusTransition {
            item: after,
            old_status: before.status,
            new_status: status,
        };
        self.hooks.notify_transition(self, &transition);
        Ok(())
    }

    fn delete(&self, id: ItemId, hard: bool) -> StoreResult<()> {
        if !hard {
            return self.update_status(id, ItemStatus::Trash);
        }

        let removed = {
            let conn = self.conn()?;
            let item = load_item(&conn, id)?.ok_or(StoreError::NotFound(id))?;
            let id_str = id.to_string();
            conn.execute("DELETE FROM item_meta WHERE item_id = ?1", params![id_str])?;
            conn.execute("DELETE FROM items WHERE id = ?1", params![id_str])?;
            item
        };
        debug!("Deleted item {} (type={})", id, removed.item_type);

        self.hooks.notify_deleted(self, &removed);
        Ok(())
    }

    fn get_meta(&self, id: ItemId, key: &str) -> StoreResult<Option<String>> {
        let conn = self.conn()?;
        let value = conn
            .query_row(
                "SELECT meta_value FROM item_meta WHERE item_id = ?1 AND meta_key = ?2",
                params![id.to_string(), key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_meta(&self, id: ItemId, key: &str, value: &str) -> StoreResult<()> {
        let conn = self.conn()?;
        if !item_exists(&conn, id)? {
            return Err(StoreError::NotFound(id));
        }
        conn.execute(
            "INSERT OR REPLACE INTO item_meta (item_id, meta_key, meta_value) VALUES (?1, ?2, ?3)",
            params![id.to_string(), key, value],
        )?;
        Ok(())
    }

    fn delete_meta(&self, id: ItemId, key: &str) -> StoreResult<bool> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "DELETE FROM item_meta WHERE item_id = ?1 AND meta_key = ?2",
            params![id.to_string(), key],
        )?;
        Ok(changed > 0)
    }

    fn query_by_meta(&self, key: &str, value: &str) -> StoreResult<Vec<ItemId>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(
            "SELECT m.item_id FROM item_meta m
             JOIN items i ON i.id = m.item_id
             WHERE m.meta_key = ?1 AND m.meta_value = ?2
             ORDER BY i.seq",
        )?;
        let rows = stmt.query_map(params![key, value], |row| row.get::<_, String>(0))?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(parse_id(&row?)?);
        }
        Ok(ids)
    }

    fn delete_meta_by_value(&self, key: &str, value: &str) -> StoreResult<usize> {
        let conn = self.conn()?;
        let removed = conn.execute(
            "DELETE FROM item_meta WHERE meta_key = ?1 AND meta_value = ?2",
            params![key, value],
        )?;
        Ok(removed)
    }

    fn list_by_type(&self, item_type: &str) -> StoreResult<Vec<ContentItem>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE item_type = ?1 ORDER BY seq"
        ))?;
        let rows = stmt
            .query_map(params![item_type], ItemRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let meta = load_meta(&conn, &row.id)?;
            items.push(row.into_item(meta)?);
        }
        Ok(items)
    }

    fn subscribe(&self, listener: Arc<dyn ContentListener>) {
        self.hooks.subscribe(listener);
    }

    fn add_validator(&self, validator: Arc<dyn TransitionValidator>) {
        self.hooks.add_validator(validator);
    }
}
