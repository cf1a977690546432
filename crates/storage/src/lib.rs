use anyhow::{Context, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use shared::domain::{Level, LevelIndex};

/// Durable mapping from level index to stored credential. All operations
/// complete fully before returning; no partial write is observable.
#[derive(Clone)]
pub struct LevelStore {
    pool: Pool<Sqlite>,
}

impl LevelStore {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // Single connection: one logical session accesses the store, and
        // in-memory databases exist per connection.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(connect_options)
            .await?;
        Ok(Self { pool })
    }

    /// Ensures the schema exists and seeds level 0 on first use.
    /// Idempotent; called once per process before any other operation.
    pub async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS levels (
                lvl        INTEGER PRIMARY KEY,
                credential TEXT NOT NULL DEFAULT ''
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("failed to ensure levels table exists")?;

        let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM levels")
            .fetch_one(&self.pool)
            .await
            .context("failed to count stored levels")?;
        if stored == 0 {
            self.upsert_level(&Level::origin())
                .await
                .context("failed to seed level 0")?;
        }
        Ok(())
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    /// Saving an index that already exists overwrites its credential;
    /// that is the intended "save progress" semantics.
    pub async fn upsert_level(&self, level: &Level) -> Result<()> {
        sqlx::query(
            "INSERT INTO levels (lvl, credential) VALUES (?, ?)
             ON CONFLICT(lvl) DO UPDATE SET credential = excluded.credential",
        )
        .bind(level.index.0)
        .bind(&level.credential)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Reports whether a row was actually removed. Level 0 is refused
    /// without touching the table.
    pub async fn delete_level(&self, index: LevelIndex) -> Result<bool> {
        if index.is_origin() {
            return Ok(false);
        }
        let deleted = sqlx::query("DELETE FROM levels WHERE lvl = ?")
            .bind(index.0)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted > 0)
    }

    pub async fn level(&self, index: LevelIndex) -> Result<Option<Level>> {
        let row = sqlx::query("SELECT lvl, credential FROM levels WHERE lvl = ?")
            .bind(index.0)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(level_from_row))
    }

    pub async fn list_levels(&self) -> Result<Vec<Level>> {
        let rows = sqlx::query("SELECT lvl, credential FROM levels ORDER BY lvl ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(level_from_row).collect())
    }
}

fn level_from_row(row: sqlx::sqlite::SqliteRow) -> Level {
    Level {
        index: LevelIndex(row.get::<i64, _>(0)),
        credential: row.get::<String, _>(1),
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
