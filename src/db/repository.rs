use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tokio_rusqlite::Connection;

use crate::error::Result;
use crate::models::{StoredSummary, SummaryRecord, Tool, ToolRecord};

use super::schema::SCHEMA;

pub struct Repository {
    conn: Connection,
}

impl Repository {
    /// Opens the database and creates any missing tables. Safe to call on
    /// every start.
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).await?;

        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    // Summary operations

    /// Inserts a summary unless one with the same id already exists. The first
    /// write wins. Returns whether a row was written.
    pub async fn upsert_summary(&self, record: SummaryRecord) -> Result<bool> {
        let inserted = self
            .conn
            .call(move |conn| {
                let changed = conn.execute(
                    "INSERT OR IGNORE INTO summaries (id, title, summary, url) VALUES (?1, ?2, ?3, ?4)",
                    params![record.id, record.title, record.summary, record.url],
                )?;
                Ok(changed > 0)
            })
            .await?;
        Ok(inserted)
    }

    #[allow(dead_code)]
    pub async fn get_summary(&self, id: &str) -> Result<Option<StoredSummary>> {
        let id = id.to_string();
        let summary = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, title, summary, url, created_at FROM summaries WHERE id = ?1",
                )?;
                let summary = stmt.query_row(params![id], summary_from_row).optional()?;
                Ok(summary)
            })
            .await?;
        Ok(summary)
    }

    pub async fn count_summaries(&self) -> Result<i64> {
        let count = self
            .conn
            .call(|conn| {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM summaries", [], |row| row.get(0))?;
                Ok(count)
            })
            .await?;
        Ok(count)
    }

    // Tool operations

    /// Inserts each tool not already stored under `summary_id`. Brand and type
    /// are compared with `IS` so absent values still match. Returns the number
    /// of rows written.
    pub async fn upsert_tools(&self, summary_id: &str, tools: &[Tool]) -> Result<usize> {
        let key = summary_id.to_string();
        let tools = tools.to_vec();

        let inserted = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                let mut inserted = 0usize;
                {
                    let mut exists = tx.prepare(
                        "SELECT COUNT(*) FROM tools WHERE summary_id = ?1 AND name = ?2 AND brand IS ?3 AND type IS ?4",
                    )?;
                    let mut insert = tx.prepare(
                        "INSERT INTO tools (summary_id, brand, name, type) VALUES (?1, ?2, ?3, ?4)",
                    )?;

                    for tool in &tools {
                        let category = tool.category.map(|c| c.as_str());
                        let count: i64 = exists.query_row(
                            params![key, tool.name, tool.brand, category],
                            |row| row.get(0),
                        )?;
                        if count == 0 {
                            insert.execute(params![key, tool.brand, tool.name, category])?;
                            inserted += 1;
                        }
                    }
                }
                tx.commit()?;
                Ok(inserted)
            })
            .await?;

        tracing::debug!("Stored {} new tools for {}", inserted, summary_id);
        Ok(inserted)
    }

    #[allow(dead_code)]
    pub async fn get_tools(&self, summary_id: &str) -> Result<Vec<ToolRecord>> {
        let summary_id = summary_id.to_string();
        let tools = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, summary_id, brand, name, type FROM tools WHERE summary_id = ?1 ORDER BY id",
                )?;
                let tools = stmt
                    .query_map(params![summary_id], tool_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(tools)
            })
            .await?;
        Ok(tools)
    }
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // SQLite datetime('now') format
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    None
}

fn summary_from_row(row: &Row) -> rusqlite::Result<StoredSummary> {
    Ok(StoredSummary {
        id: row.get(0)?,
        title: row.get(1)?,
        summary: row.get(2)?,
        url: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        created_at: row
            .get::<_, String>(4)
            .ok()
            .and_then(|s| parse_datetime(&s))
            .unwrap_or_else(Utc::now),
    })
}

fn tool_from_row(row: &Row) -> rusqlite::Result<ToolRecord> {
    Ok(ToolRecord {
        id: row.get(0)?,
        summary_id: row.get(1)?,
        brand: row.get(2)?,
        name: row.get(3)?,
        category: row
            .get::<_, Option<String>>(4)?
            .and_then(|s| s.parse().ok()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProductCategory;
    use tempfile::TempDir;
    use tokio_test::assert_ok;

    async fn open_temp() -> (TempDir, Repository, String) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.db").to_string_lossy().to_string();
        let repo = Repository::new(&path).await.unwrap();
        (dir, repo, path)
    }

    fn record(id: &str, summary: &str) -> SummaryRecord {
        SummaryRecord {
            id: id.to_string(),
            title: format!("title {}", id),
            summary: summary.to_string(),
            url: format!("https://x/{}", id),
        }
    }

    #[tokio::test]
    async fn initialize_is_idempotent() {
        let (_dir, repo, path) = open_temp().await;
        repo.upsert_summary(record("p1", "first")).await.unwrap();
        drop(repo);

        let reopened = assert_ok!(Repository::new(&path).await);
        assert_eq!(reopened.count_summaries().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn first_summary_write_wins() {
        let (_dir, repo, _path) = open_temp().await;

        assert!(repo.upsert_summary(record("p1", "first")).await.unwrap());
        let mut second = record("p1", "second");
        second.title = "changed".to_string();
        assert!(!repo.upsert_summary(second).await.unwrap());

        let stored = repo.get_summary("p1").await.unwrap().unwrap();
        assert_eq!(stored.summary, "first");
        assert_eq!(stored.title, "title p1");
        assert_eq!(stored.url, "https://x/p1");
        assert_eq!(repo.count_summaries().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn missing_summary_is_none() {
        let (_dir, repo, _path) = open_temp().await;
        assert!(repo.get_summary("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn repeated_tool_lists_do_not_duplicate() {
        let (_dir, repo, _path) = open_temp().await;
        repo.upsert_summary(record("p1", "s")).await.unwrap();

        let tools = vec![
            Tool::new(Some("Zpacks"), "Duplex", Some(ProductCategory::Tent)),
            Tool::new(None, "Titanium mug", Some(ProductCategory::Cooker)),
            Tool::new(None, "Buff", None),
        ];

        assert_eq!(repo.upsert_tools("p1", &tools).await.unwrap(), 3);
        assert_eq!(repo.upsert_tools("p1", &tools).await.unwrap(), 0);
        assert_eq!(repo.get_tools("p1").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn tools_differing_in_one_key_column_are_distinct() {
        let (_dir, repo, _path) = open_temp().await;
        repo.upsert_summary(record("p1", "s")).await.unwrap();

        let tools = vec![
            Tool::new(Some("Zpacks"), "Duplex", Some(ProductCategory::Tent)),
            Tool::new(Some("Zpacks"), "Duplex", None),
            Tool::new(None, "Duplex", Some(ProductCategory::Tent)),
        ];

        assert_eq!(repo.upsert_tools("p1", &tools).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn stored_tools_read_back_with_category() {
        let (_dir, repo, _path) = open_temp().await;
        repo.upsert_summary(record("p1", "s")).await.unwrap();
        repo.upsert_tools(
            "p1",
            &[Tool::new(Some("Zpacks"), "Duplex", Some(ProductCategory::Tent))],
        )
        .await
        .unwrap();

        let stored = repo.get_tools("p1").await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].summary_id, "p1");
        assert_eq!(stored[0].brand.as_deref(), Some("Zpacks"));
        assert_eq!(stored[0].name, "Duplex");
        assert_eq!(stored[0].category, Some(ProductCategory::Tent));
    }

    #[tokio::test]
    async fn tools_for_unknown_summary_are_rejected() {
        let (_dir, repo, _path) = open_temp().await;
        let result = repo
            .upsert_tools("ghost", &[Tool::new(None, "Stakes", None)])
            .await;
        assert!(result.is_err());
    }
}
