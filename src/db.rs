use crate::domain::{Budget, Category, Transaction, default_categories};
use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

pub const TRANSACTIONS_KEY: &str = "expenses";
pub const CATEGORIES_KEY: &str = "categories";
pub const BUDGETS_KEY: &str = "budgets";

/// Durable key-value store. Each entity collection lives under one key as a
/// JSON array and is rewritten in full on every save.
pub struct Db {
    conn: Connection,
}

impl Db {
    pub fn open(path: &Path) -> Result<Self> {
        ensure_parent_dir(path)?;
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open DB {}", path.display()))?;

        let db = Self { conn };
        db.migrate()?;
        tracing::debug!(path = %path.display(), "opened store");
        Ok(db)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let db = Self {
            conn: Connection::open_in_memory()?,
        };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO kv (key, value)
            VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    pub fn load_transactions(&self) -> Result<Vec<Transaction>> {
        Ok(self.load_collection(TRANSACTIONS_KEY)?.unwrap_or_default())
    }

    pub fn load_categories(&self) -> Result<Vec<Category>> {
        Ok(self
            .load_collection(CATEGORIES_KEY)?
            .unwrap_or_else(default_categories))
    }

    pub fn load_budgets(&self) -> Result<Vec<Budget>> {
        Ok(self.load_collection(BUDGETS_KEY)?.unwrap_or_default())
    }

    pub fn save_transactions(&self, items: &[Transaction]) -> Result<()> {
        self.save_collection(TRANSACTIONS_KEY, items)
    }

    pub fn save_categories(&self, items: &[Category]) -> Result<()> {
        self.save_collection(CATEGORIES_KEY, items)
    }

    pub fn save_budgets(&self, items: &[Budget]) -> Result<()> {
        self.save_collection(BUDGETS_KEY, items)
    }

    /// `None` when the key was never written. A value that is not a JSON
    /// array, or any record in it that fails to decode, is an error naming
    /// the key; a later full rewrite must never drop stored records.
    fn load_collection<T: DeserializeOwned>(&self, key: &str) -> Result<Option<Vec<T>>> {
        let Some(raw) = self.get(key)? else {
            return Ok(None);
        };
        let values: Vec<serde_json::Value> = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid JSON stored under '{key}'"))?;
        let out = values
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                serde_json::from_value::<T>(value)
                    .with_context(|| format!("Unreadable record {index} stored under '{key}'"))
            })
            .collect::<Result<Vec<T>>>()?;
        tracing::debug!(key, count = out.len(), "loaded collection");
        Ok(Some(out))
    }

    fn save_collection<T: Serialize>(&self, key: &str, items: &[T]) -> Result<()> {
        let json = serde_json::to_string(items)?;
        self.set(key, &json)
            .with_context(|| format!("Failed to write '{key}'"))?;
        tracing::debug!(key, count = items.len(), "saved collection");
        Ok(())
    }
}

pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create dir {}", parent.display()))?;
    }
    Ok(())
}
