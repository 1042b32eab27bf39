//! SQLite storage: user settings (config) and the single cached rate table.
//! One connection for the process; flutter_rust_bridge calls in from both the
//! Dart thread (sync functions) and its worker pool.

use crate::conversion::RateTable;
use crate::rust_log;
use once_cell::sync::Lazy;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

pub const DB_FILE: &str = "quanto.db";

static DB: Lazy<Mutex<Option<Connection>>> = Lazy::new(|| Mutex::new(None));

fn db() -> MutexGuard<'static, Option<Connection>> {
    DB.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// True once init() has succeeded.
pub fn is_ready() -> bool {
    db().is_some()
}

pub fn init(path: &str) -> Result<(), String> {
    let path_obj = Path::new(path);
    std::fs::create_dir_all(path_obj).map_err(|e| e.to_string())?;
    let db_path = path_obj.join(DB_FILE);
    rust_log!("[quanto_rs] storage::init path={:?} db={:?}", path, db_path);
    let conn = Connection::open(&db_path).map_err(|e| e.to_string())?;
    create_tables(&conn)?;
    *db() = Some(conn);
    Ok(())
}

/// Drop the connection; `is_ready` is false afterwards.
#[cfg(test)]
pub(crate) fn close() {
    *db() = None;
}

fn create_tables(conn: &Connection) -> Result<(), String> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS config (key TEXT PRIMARY KEY, value TEXT);
        CREATE TABLE IF NOT EXISTS rates_cache (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            base TEXT NOT NULL,
            timestamp INTEGER NOT NULL,
            rates_json TEXT NOT NULL,
            fetched_at TEXT NOT NULL
        );
        "#,
    )
    .map_err(|e| e.to_string())?;
    Ok(())
}

fn with_db<F, T>(f: F) -> Result<T, String>
where
    F: FnOnce(&Connection) -> Result<T, rusqlite::Error>,
{
    let guard = db();
    let conn = guard.as_ref().ok_or("Storage not initialized")?;
    f(conn).map_err(|e| e.to_string())
}

// Config
pub fn config_get(key: &str) -> Result<Option<String>, String> {
    with_db(|conn| {
        conn.query_row("SELECT value FROM config WHERE key = ?1", params![key], |row| row.get(0))
            .optional()
    })
}

pub fn config_set(key: &str, value: &str) -> Result<(), String> {
    with_db(|conn| {
        conn.execute(
            "INSERT INTO config (key, value) VALUES (?1, ?2) ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    })
}

pub fn config_remove(key: &str) -> Result<(), String> {
    with_db(|conn| {
        conn.execute("DELETE FROM config WHERE key = ?1", params![key])?;
        Ok(())
    })
}

pub fn clear_all() -> Result<(), String> {
    with_db(|conn| {
        conn.execute_batch(
            r#"
            DELETE FROM rates_cache;
            DELETE FROM config;
            "#,
        )?;
        Ok(())
    })
}

// Rates cache (at most one row)
#[derive(Clone, Debug, PartialEq)]
pub struct CachedRates {
    pub base: String,
    /// Provider timestamp, seconds since the epoch.
    pub timestamp: i64,
    pub rates: RateTable,
    /// RFC 3339 time the table was received.
    pub fetched_at: String,
}

pub fn rates_cache_save(cached: &CachedRates) -> Result<(), String> {
    let rates_json = serde_json::to_string(&cached.rates).map_err(|e| e.to_string())?;
    rust_log!(
        "[quanto_rs] storage::rates_cache_save base={} entries={} timestamp={}",
        cached.base,
        cached.rates.len(),
        cached.timestamp
    );
    with_db(|conn| {
        conn.execute(
            r#"
            INSERT INTO rates_cache (id, base, timestamp, rates_json, fetched_at) VALUES (1, ?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET base = ?1, timestamp = ?2, rates_json = ?3, fetched_at = ?4
            "#,
            params![cached.base, cached.timestamp, rates_json, cached.fetched_at],
        )?;
        Ok(())
    })
}

pub fn rates_cache_load() -> Result<Option<CachedRates>, String> {
    let row = with_db(|conn| {
        conn.query_row(
            "SELECT base, timestamp, rates_json, fetched_at FROM rates_cache WHERE id = 1",
            [],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            },
        )
        .optional()
    })?;
    match row {
        Some((base, timestamp, rates_json, fetched_at)) => {
            let rates: RateTable = serde_json::from_str(&rates_json).map_err(|e| e.to_string())?;
            Ok(Some(CachedRates {
                base,
                timestamp,
                rates,
                fetched_at,
            }))
        }
        None => Ok(None),
    }
}
