// src/services/store.rs
//! Relational store for simulation bots, their posts, and their memories.
//!
//! - Owns a single SQLite connection; callers pass `&Store` around instead of
//!   reaching for a global session.
//! - `bots` owns `posts` and `memories` via `ON DELETE CASCADE`.
//! - No business logic beyond field assignment. The analyzer never reads it.

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::Serialize;
use std::path::Path;

use crate::config::AnalyzerConfig;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bot {
    pub id: i64,
    pub name: String,
    pub persona: String,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    pub id: i64,
    pub content: String,
    pub bot_id: Option<i64>,
    pub sender: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BotMemory {
    pub id: i64,
    pub key: String,
    pub value: String,
    pub bot_id: i64,
}

pub struct Store {
    pub(crate) db: Connection,
}

const SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS bots (
  id       INTEGER PRIMARY KEY,
  name     TEXT NOT NULL UNIQUE,
  persona  TEXT NOT NULL,
  model    TEXT NOT NULL DEFAULT 'gemini-1.5-flash'
);

CREATE TABLE IF NOT EXISTS posts (
  id       INTEGER PRIMARY KEY,
  content  TEXT NOT NULL,
  bot_id   INTEGER REFERENCES bots(id) ON DELETE CASCADE,   -- NULL for system posts
  sender   TEXT                                             -- display name at post time
);

CREATE TABLE IF NOT EXISTS memories (
  id       INTEGER PRIMARY KEY,
  key      TEXT NOT NULL,
  value    TEXT NOT NULL,
  bot_id   INTEGER NOT NULL REFERENCES bots(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_posts_bot ON posts(bot_id);
CREATE INDEX IF NOT EXISTS idx_memories_bot ON memories(bot_id);
"#;

impl Store {
    /// Open/create the database file and ensure schema.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let db = Connection::open(path).with_context(|| format!("open sqlite at {:?}", path))?;
        Self::init(db)
    }

    /// Open the database named by `[database] path` in the config.
    pub fn open_default(cfg: &AnalyzerConfig) -> Result<Self> {
        Self::open(&cfg.database.path)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(db: Connection) -> Result<Self> {
        db.execute_batch(SCHEMA)?;
        Ok(Self { db })
    }

    /// Close the connection, surfacing any error SQLite reports on shutdown.
    pub fn close(self) -> Result<()> {
        self.db.close().map_err(|(_, e)| e)?;
        Ok(())
    }

    // ---------- bots ----------

    /// Insert a bot; `model` falls back to [`DEFAULT_MODEL`]. Names are unique.
    pub fn create_bot(&self, name: &str, persona: &str, model: Option<&str>) -> Result<i64> {
        self.db
            .execute(
                "INSERT INTO bots(name, persona, model) VALUES (?1, ?2, ?3)",
                params![name, persona, model.unwrap_or(DEFAULT_MODEL)],
            )
            .with_context(|| format!("create bot {name:?}"))?;
        Ok(self.db.last_insert_rowid())
    }

    pub fn get_bot(&self, id: i64) -> Result<Option<Bot>> {
        let bot = self
            .db
            .query_row(
                "SELECT id, name, persona, model FROM bots WHERE id=?1",
                [id],
                bot_from_row,
            )
            .optional()?;
        Ok(bot)
    }

    pub fn find_bot_by_name(&self, name: &str) -> Result<Option<Bot>> {
        let bot = self
            .db
            .query_row(
                "SELECT id, name, persona, model FROM bots WHERE name=?1",
                [name],
                bot_from_row,
            )
            .optional()?;
        Ok(bot)
    }

    pub fn list_bots(&self) -> Result<Vec<Bot>> {
        let mut stmt = self
            .db
            .prepare("SELECT id, name, persona, model FROM bots ORDER BY id")?;
        let rows = stmt.query_map([], bot_from_row)?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    /// Overwrite name/persona/model. Returns false if the bot does not exist.
    pub fn update_bot(&self, id: i64, name: &str, persona: &str, model: &str) -> Result<bool> {
        let n = self.db.execute(
            "UPDATE bots SET name=?1, persona=?2, model=?3 WHERE id=?4",
            params![name, persona, model, id],
        )?;
        Ok(n > 0)
    }

    /// Delete a bot together with its posts and memories.
    pub fn delete_bot(&self, id: i64) -> Result<bool> {
        let n = self.db.execute("DELETE FROM bots WHERE id=?1", [id])?;
        Ok(n > 0)
    }

    // ---------- posts ----------

    pub fn add_post(&self, bot_id: Option<i64>, sender: Option<&str>, content: &str) -> Result<i64> {
        self.db.execute(
            "INSERT INTO posts(content, bot_id, sender) VALUES (?1, ?2, ?3)",
            params![content, bot_id, sender],
        )?;
        Ok(self.db.last_insert_rowid())
    }

    pub fn posts_for_bot(&self, bot_id: i64) -> Result<Vec<Post>> {
        let mut stmt = self.db.prepare(
            "SELECT id, content, bot_id, sender FROM posts WHERE bot_id=?1 ORDER BY id",
        )?;
        let rows = stmt.query_map([bot_id], post_from_row)?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    /// Newest first.
    pub fn recent_posts(&self, limit: usize) -> Result<Vec<Post>> {
        let limit_i64 = i64::try_from(limit)
            .map_err(|_| anyhow::anyhow!("limit out of range for i64: {limit}"))?;
        let mut stmt = self.db.prepare(
            "SELECT id, content, bot_id, sender FROM posts ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map([limit_i64], post_from_row)?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    pub fn count_posts(&self) -> Result<u64> {
        let cnt: i64 = self.db.query_row("SELECT COUNT(*) FROM posts", [], |r| r.get(0))?;
        Ok(cnt as u64)
    }

    /// Remove every post; bots and memories stay. Returns rows deleted.
    pub fn clear_posts(&self) -> Result<usize> {
        let n = self.db.execute("DELETE FROM posts", [])?;
        tracing::info!(deleted = n, "posts table cleared");
        Ok(n)
    }

    // ---------- memories ----------

    pub fn add_memory(&self, bot_id: i64, key: &str, value: &str) -> Result<i64> {
        self.db
            .execute(
                "INSERT INTO memories(key, value, bot_id) VALUES (?1, ?2, ?3)",
                params![key, value, bot_id],
            )
            .with_context(|| format!("add memory {key:?} for bot {bot_id}"))?;
        Ok(self.db.last_insert_rowid())
    }

    pub fn memories_for_bot(&self, bot_id: i64) -> Result<Vec<BotMemory>> {
        let mut stmt = self
            .db
            .prepare("SELECT id, key, value, bot_id FROM memories WHERE bot_id=?1 ORDER BY id")?;
        let rows = stmt.query_map([bot_id], |r| {
            Ok(BotMemory {
                id: r.get(0)?,
                key: r.get(1)?,
                value: r.get(2)?,
                bot_id: r.get(3)?,
            })
        })?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    pub fn count_memories(&self) -> Result<u64> {
        let cnt: i64 = self
            .db
            .query_row("SELECT COUNT(*) FROM memories", [], |r| r.get(0))?;
        Ok(cnt as u64)
    }
}

fn bot_from_row(r: &Row<'_>) -> rusqlite::Result<Bot> {
    Ok(Bot {
        id: r.get(0)?,
        name: r.get(1)?,
        persona: r.get(2)?,
        model: r.get(3)?,
    })
}

fn post_from_row(r: &Row<'_>) -> rusqlite::Result<Post> {
    Ok(Post {
        id: r.get(0)?,
        content: r.get(1)?,
        bot_id: r.get(2)?,
        sender: r.get(3)?,
    })
}
