//! High-level store interface.

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection};
use tracing::info;

use crate::error::{Result, StorageError};
use crate::models::{
    GenerationMetrics, MetricsEntry, MetricsSummary, NewRecipient, SavedRecipient,
};

/// Maximum entries kept in the rolling metrics log; oldest evicted first.
pub const METRICS_LOG_CAPACITY: i64 = 100;

/// Local key-value and metrics store for Cardsmith.
///
/// Appends to the metrics log are serialized through the connection mutex, so
/// the store is safe to share across threads.
pub struct CardStore {
    conn: Mutex<Connection>,
}

impl CardStore {
    /// Opens the store in the default app data directory.
    pub fn new() -> Result<Self> {
        let path = Self::default_db_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        info!("Opening card store at: {:?}", path);
        Self::open(Connection::open(path)?)
    }

    /// Opens the store at a specific path.
    pub fn with_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        info!("Opening card store at: {:?}", path);
        Self::open(Connection::open(path)?)
    }

    /// Opens an in-memory store (for testing).
    pub fn in_memory() -> Result<Self> {
        Self::open(Connection::open_in_memory()?)
    }

    /// Returns the default database path.
    pub fn default_db_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "cardsmith", "cardsmith")
            .ok_or_else(|| StorageError::Config("Could not determine app data directory".into()))?;
        Ok(proj_dirs.data_dir().join("cardsmith.db"))
    }

    fn open(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS config (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS recipients (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                relationship TEXT NOT NULL,
                payload TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS generation_metrics (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                first_gen_passed INTEGER NOT NULL,
                regeneration_count INTEGER NOT NULL,
                user_prompt_needed INTEGER NOT NULL,
                created_at TEXT NOT NULL
            );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        // A poisoned mutex means another thread panicked mid-write; the
        // connection itself is still usable.
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    // === Config key-value ===

    /// Sets a config value, overwriting any existing value for the key.
    pub fn set_config(&self, key: &str, value: &str) -> Result<()> {
        self.lock().execute(
            "INSERT INTO config (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    /// Gets a config value, if present.
    pub fn get_config(&self, key: &str) -> Result<Option<String>> {
        let conn = self.lock();
        let mut stmt = conn.prepare("SELECT value FROM config WHERE key = ?1")?;
        let mut rows = stmt.query(params![key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    // === Saved recipients ===

    /// Saves a recipient record.
    pub fn save_recipient(&self, recipient: NewRecipient) -> Result<i64> {
        let payload = serde_json::to_string(&recipient.payload)?;
        let conn = self.lock();
        conn.execute(
            "INSERT INTO recipients (name, relationship, payload, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                recipient.name,
                recipient.relationship,
                payload,
                Utc::now().to_rfc3339()
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Lists saved recipients, newest first.
    pub fn list_recipients(&self) -> Result<Vec<SavedRecipient>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, name, relationship, payload, created_at
             FROM recipients ORDER BY id DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut recipients = Vec::new();
        for row in rows {
            let (id, name, relationship, payload, created_at) = row?;
            recipients.push(SavedRecipient {
                id,
                name,
                relationship,
                payload: serde_json::from_str(&payload)?,
                created_at: parse_timestamp(&created_at)?,
            });
        }
        Ok(recipients)
    }

    /// Deletes a saved recipient by id.
    pub fn delete_recipient(&self, id: i64) -> Result<()> {
        let deleted = self
            .lock()
            .execute("DELETE FROM recipients WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(StorageError::NotFound(format!("recipient {id}")));
        }
        Ok(())
    }

    // === Rolling metrics log ===

    /// Appends a metrics entry, evicting the oldest beyond capacity.
    pub fn append_metrics(&self, metrics: GenerationMetrics) -> Result<i64> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO generation_metrics
             (first_gen_passed, regeneration_count, user_prompt_needed, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                metrics.first_gen_passed,
                metrics.regeneration_count,
                metrics.user_prompt_needed,
                Utc::now().to_rfc3339()
            ],
        )?;
        let id = conn.last_insert_rowid();
        conn.execute(
            "DELETE FROM generation_metrics WHERE id NOT IN (
                SELECT id FROM generation_metrics ORDER BY id DESC LIMIT ?1
             )",
            params![METRICS_LOG_CAPACITY],
        )?;
        Ok(id)
    }

    /// Returns the most recent metrics entries, newest first.
    pub fn recent_metrics(&self, limit: i64) -> Result<Vec<MetricsEntry>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, first_gen_passed, regeneration_count, user_prompt_needed, created_at
             FROM generation_metrics ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, bool>(1)?,
                row.get::<_, u32>(2)?,
                row.get::<_, bool>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, first_gen_passed, regeneration_count, user_prompt_needed, created_at) = row?;
            entries.push(MetricsEntry {
                id,
                created_at: parse_timestamp(&created_at)?,
                metrics: GenerationMetrics {
                    first_gen_passed,
                    regeneration_count,
                    user_prompt_needed,
                },
            });
        }
        Ok(entries)
    }

    /// Aggregates the rolling log into pass/regeneration/user-prompt rates.
    pub fn metrics_summary(&self) -> Result<MetricsSummary> {
        let conn = self.lock();
        let (total, passed, regenerated, prompted): (u32, u32, u32, u32) = conn.query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(first_gen_passed), 0),
                    COALESCE(SUM(regeneration_count > 0), 0),
                    COALESCE(SUM(user_prompt_needed), 0)
             FROM generation_metrics",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?;

        if total == 0 {
            return Ok(MetricsSummary::empty());
        }
        let total_f = f64::from(total);
        Ok(MetricsSummary {
            total,
            first_gen_pass_rate: f64::from(passed) / total_f,
            regeneration_rate: f64::from(regenerated) / total_f,
            user_prompt_rate: f64::from(prompted) / total_f,
        })
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::Config(format!("bad timestamp '{raw}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> CardStore {
        CardStore::in_memory().unwrap()
    }

    #[test]
    fn config_set_and_get() {
        let store = store();
        assert_eq!(store.get_config("theme").unwrap(), None);
        store.set_config("theme", "dark").unwrap();
        assert_eq!(store.get_config("theme").unwrap(), Some("dark".to_string()));
        store.set_config("theme", "light").unwrap();
        assert_eq!(store.get_config("theme").unwrap(), Some("light".to_string()));
    }

    #[test]
    fn recipients_roundtrip() {
        let store = store();
        let id = store
            .save_recipient(NewRecipient {
                name: "Ada".to_string(),
                relationship: "sister".to_string(),
                payload: json!({"template": "floral_whisper"}),
            })
            .unwrap();

        let listed = store.list_recipients().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, id);
        assert_eq!(listed[0].name, "Ada");
        assert_eq!(listed[0].payload["template"], "floral_whisper");

        store.delete_recipient(id).unwrap();
        assert!(store.list_recipients().unwrap().is_empty());
    }

    #[test]
    fn delete_missing_recipient_is_not_found() {
        let store = store();
        let err = store.delete_recipient(42).unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[test]
    fn metrics_append_and_read_back() {
        let store = store();
        store
            .append_metrics(GenerationMetrics {
                first_gen_passed: true,
                regeneration_count: 0,
                user_prompt_needed: false,
            })
            .unwrap();

        let entries = store.recent_metrics(10).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].metrics.first_gen_passed);
    }

    #[test]
    fn metrics_log_is_bounded_at_capacity() {
        let store = store();
        for i in 0..(METRICS_LOG_CAPACITY + 20) {
            store
                .append_metrics(GenerationMetrics {
                    first_gen_passed: i % 2 == 0,
                    regeneration_count: 0,
                    user_prompt_needed: false,
                })
                .unwrap();
        }
        let entries = store.recent_metrics(200).unwrap();
        assert_eq!(entries.len(), METRICS_LOG_CAPACITY as usize);
        // Oldest evicted first: the earliest surviving id is 21.
        let min_id = entries.iter().map(|e| e.id).min().unwrap();
        assert_eq!(min_id, 21);
    }

    #[test]
    fn summary_rates() {
        let store = store();
        store
            .append_metrics(GenerationMetrics {
                first_gen_passed: true,
                regeneration_count: 0,
                user_prompt_needed: false,
            })
            .unwrap();
        store
            .append_metrics(GenerationMetrics {
                first_gen_passed: false,
                regeneration_count: 1,
                user_prompt_needed: true,
            })
            .unwrap();

        let summary = store.metrics_summary().unwrap();
        assert_eq!(summary.total, 2);
        assert!((summary.first_gen_pass_rate - 0.5).abs() < f64::EPSILON);
        assert!((summary.regeneration_rate - 0.5).abs() < f64::EPSILON);
        assert!((summary.user_prompt_rate - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_summary_is_zeroed() {
        let store = store();
        let summary = store.metrics_summary().unwrap();
        assert_eq!(summary.total, 0);
        assert_eq!(summary.first_gen_pass_rate, 0.0);
    }

    #[test]
    fn store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cards.db");
        {
            let store = CardStore::with_path(&path).unwrap();
            store.set_config("last_template", "cozy_knit").unwrap();
        }
        let store = CardStore::with_path(&path).unwrap();
        assert_eq!(
            store.get_config("last_template").unwrap(),
            Some("cozy_knit".to_string())
        );
    }
}
