//! SQLite topic store
//!
//! One row per topic; the aggregate is kept as a JSON document so writes
//! stay whole-aggregate just like the file store.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::path::Path;
use tracing::{debug, info};

use super::{new_topic_record, TopicRepository};
use crate::models::{NewTopic, Topic, TopicDetail};
use crate::Result;

/// SQLite-backed [`TopicRepository`]
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open or create the database file at `db_path`
    pub async fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // mode=rwc: read, write, create
        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
        debug!("Connecting to database: {}", db_url);

        let pool = SqlitePool::connect(&db_url).await?;
        Self::from_pool(pool).await
    }

    /// Wrap an existing pool, creating the table if missing
    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS topics (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                detail TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        info!("Database tables initialized (topics)");
        Ok(Self { pool })
    }
}

fn decode(row: &sqlx::sqlite::SqliteRow) -> Result<TopicDetail> {
    let detail: String = row.get("detail");
    Ok(serde_json::from_str(&detail)?)
}

#[async_trait]
impl TopicRepository for SqliteStore {
    async fn list(&self) -> Result<Vec<Topic>> {
        let rows = sqlx::query("SELECT detail FROM topics ORDER BY rowid DESC")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| decode(row).map(|d| d.summary()))
            .collect()
    }

    async fn get(&self, id: &str) -> Result<Option<TopicDetail>> {
        let row = sqlx::query("SELECT detail FROM topics WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(decode).transpose()
    }

    async fn create(&self, new_topic: NewTopic) -> Result<Topic> {
        let topic = new_topic_record(new_topic);
        let detail = serde_json::to_string(&TopicDetail::from_topic(&topic))?;

        sqlx::query("INSERT INTO topics (id, name, detail, created_at) VALUES (?, ?, ?, ?)")
            .bind(&topic.id)
            .bind(&topic.name)
            .bind(&detail)
            .bind(chrono::Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await?;

        debug!(topic_id = %topic.id, "Topic created");
        Ok(topic)
    }

    async fn replace(&self, detail: TopicDetail) -> Result<Option<TopicDetail>> {
        let document = serde_json::to_string(&detail)?;

        let result = sqlx::query("UPDATE topics SET name = ?, detail = ? WHERE id = ?")
            .bind(&detail.name)
            .bind(&document)
            .bind(&detail.id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(detail))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM topics WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
