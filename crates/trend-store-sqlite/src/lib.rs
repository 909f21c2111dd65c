use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, DatabaseName, OpenFlags};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use trend_core::VideoRecord;

const LATEST_SCHEMA_VERSION: i64 = 2;

pub const VIDEOS_TABLE: &str = "trending_videos";
const SUMMARY_COLUMN: &str = "ai_summary";

const CREATE_SCHEMA_MIGRATIONS_SQL: &str = r"
CREATE TABLE IF NOT EXISTS schema_migrations (
  version INTEGER PRIMARY KEY,
  applied_at TEXT NOT NULL
);
";

const MIGRATION_001_SQL: &str = r"
CREATE TABLE IF NOT EXISTS trending_videos (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  title TEXT,
  channel TEXT,
  view_count INTEGER,
  like_count INTEGER,
  comment_count INTEGER,
  publish_date TEXT,
  tags TEXT,
  thumbnail_url TEXT,
  video_url TEXT,
  scrapped_date TEXT
);
";

const MIGRATION_002_SQL: &str = r"
ALTER TABLE trending_videos ADD COLUMN ai_summary TEXT;
";

const CREATE_STAGING_SQL: &str = r"
DROP TABLE IF EXISTS trending_videos_staging;

CREATE TABLE trending_videos_staging (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  title TEXT,
  channel TEXT,
  view_count INTEGER,
  like_count INTEGER,
  comment_count INTEGER,
  publish_date TEXT,
  tags TEXT,
  thumbnail_url TEXT,
  video_url TEXT,
  scrapped_date TEXT,
  ai_summary TEXT
);
";

const SWAP_STAGING_SQL: &str = r"
DROP TABLE IF EXISTS trending_videos;
ALTER TABLE trending_videos_staging RENAME TO trending_videos;
CREATE INDEX IF NOT EXISTS idx_trending_videos_view_count ON trending_videos(view_count);
";

pub struct SqliteStore {
    conn: Connection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchemaStatus {
    pub current_version: i64,
    pub target_version: i64,
    pub pending_versions: Vec<i64>,
    pub inferred_from_legacy: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IntegrityReport {
    pub quick_check_ok: bool,
    pub quick_check_message: String,
    pub video_count: usize,
    pub schema_status: SchemaStatus,
}

impl SqliteStore {
    /// Open (creating if needed) the video table database for reading and writing.
    ///
    /// # Errors
    /// Returns an error when the database cannot be opened or pragmas cannot be applied.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open sqlite database at {}", path.display()))?;

        conn.execute_batch("PRAGMA busy_timeout = 5000;")
            .context("failed to configure sqlite pragmas")?;

        Ok(Self { conn })
    }

    /// Open an existing database without ever creating or mutating it.
    ///
    /// # Errors
    /// Returns an error when the file does not exist or cannot be opened read-only.
    pub fn open_read_only(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(anyhow!("database file not found: {}", path.display()));
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("failed to open sqlite database read-only at {}", path.display()))?;

        conn.execute_batch("PRAGMA busy_timeout = 5000;")
            .context("failed to configure sqlite pragmas")?;

        Ok(Self { conn })
    }

    /// Report current and target schema versions plus pending migrations.
    ///
    /// Never writes, so it is safe on read-only connections.
    ///
    /// # Errors
    /// Returns an error when schema metadata cannot be read or the table shape is unknown.
    pub fn schema_status(&self) -> Result<SchemaStatus> {
        let (current_version, inferred_from_legacy) = detect_effective_schema_version(&self.conn)?;
        let pending_versions = if current_version < LATEST_SCHEMA_VERSION {
            ((current_version + 1)..=LATEST_SCHEMA_VERSION).collect::<Vec<_>>()
        } else {
            Vec::new()
        };

        Ok(SchemaStatus {
            current_version,
            target_version: LATEST_SCHEMA_VERSION,
            pending_versions,
            inferred_from_legacy,
        })
    }

    /// Apply all forward migrations up to the latest supported schema version.
    ///
    /// # Errors
    /// Returns an error when migration bootstrapping or any migration step fails.
    pub fn migrate(&mut self) -> Result<()> {
        self.conn
            .execute_batch(CREATE_SCHEMA_MIGRATIONS_SQL)
            .context("failed to apply schema_migrations table")?;

        let mut version = current_schema_version(&self.conn)?;

        if version == 0 {
            version = self.bootstrap_schema_version()?;
        }

        if version < 2 {
            self.apply_migration_2()?;
            version = current_schema_version(&self.conn)?;
        }

        if version != LATEST_SCHEMA_VERSION {
            return Err(anyhow!(
                "unsupported schema version {version}; expected {LATEST_SCHEMA_VERSION}"
            ));
        }

        Ok(())
    }

    fn bootstrap_schema_version(&self) -> Result<i64> {
        if !table_exists(&self.conn, VIDEOS_TABLE)? {
            apply_migration_1(&self.conn)?;
            return Ok(1);
        }

        if table_has_column(&self.conn, VIDEOS_TABLE, SUMMARY_COLUMN)? {
            // Written by a summarizing ingester that never recorded its migrations.
            record_schema_version(&self.conn, 1)?;
            record_schema_version(&self.conn, 2)?;
            return Ok(2);
        }

        if table_has_column(&self.conn, VIDEOS_TABLE, "video_url")? {
            record_schema_version(&self.conn, 1)?;
            return Ok(1);
        }

        Err(anyhow!("database schema is invalid: {VIDEOS_TABLE} has no video_url column"))
    }

    fn apply_migration_2(&mut self) -> Result<()> {
        if table_has_column(&self.conn, VIDEOS_TABLE, SUMMARY_COLUMN)? {
            record_schema_version(&self.conn, 2)?;
            return Ok(());
        }

        let tx = self.conn.transaction().context("failed to start migration v2 transaction")?;
        tx.execute_batch(MIGRATION_002_SQL).context("failed to add ai_summary column")?;
        tx.execute(
            "INSERT OR IGNORE INTO schema_migrations(version, applied_at) VALUES (?1, ?2)",
            params![2_i64, now_rfc3339()?],
        )
        .context("failed to record migration version 2")?;
        tx.commit().context("failed to commit migration v2")?;
        Ok(())
    }

    /// Whether the table carries the optional summary column.
    ///
    /// # Errors
    /// Returns an error when table metadata cannot be read.
    pub fn summary_column_present(&self) -> Result<bool> {
        table_has_column(&self.conn, VIDEOS_TABLE, SUMMARY_COLUMN)
    }

    /// Atomically replace every stored video with `records`, keeping their order.
    ///
    /// Rows are written to a staging table and swapped in within one transaction, so a
    /// failure at any point leaves the previous snapshot untouched.
    ///
    /// # Errors
    /// Returns an error when migration, any insert, or the swap fails.
    pub fn replace_videos(&mut self, records: &[VideoRecord]) -> Result<usize> {
        self.migrate()?;

        let tx = self.conn.transaction().context("failed to start replace transaction")?;
        tx.execute_batch(CREATE_STAGING_SQL).context("failed to create staging table")?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO trending_videos_staging(
                    title, channel, view_count, like_count, comment_count,
                    publish_date, tags, thumbnail_url, video_url, scrapped_date, ai_summary
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )?;

            for record in records {
                stmt.execute(params![
                    record.title,
                    record.channel,
                    sql_count(record.view_count, "view_count")?,
                    sql_count(record.like_count, "like_count")?,
                    sql_count(record.comment_count, "comment_count")?,
                    record.publish_date,
                    record.tags,
                    record.thumbnail_url,
                    record.video_url,
                    record.scrapped_date,
                    record.ai_summary,
                ])
                .with_context(|| format!("failed to stage video {}", record.video_url))?;
            }
        }

        tx.execute_batch(SWAP_STAGING_SQL).context("failed to swap staging table into place")?;
        tx.commit().context("failed to commit replace transaction")?;

        tracing::debug!(rows = records.len(), "replaced trending_videos snapshot");
        Ok(records.len())
    }

    /// Load every stored video ordered by view count, highest first.
    ///
    /// Tables without the summary column load with `ai_summary = None`.
    ///
    /// # Errors
    /// Returns an error when the table is missing or rows cannot be read.
    pub fn list_videos(&self) -> Result<Vec<VideoRecord>> {
        if !table_exists(&self.conn, VIDEOS_TABLE)? {
            return Err(anyhow!("table {VIDEOS_TABLE} does not exist; run an ingestion first"));
        }

        let summary_select =
            if self.summary_column_present()? { SUMMARY_COLUMN } else { "NULL AS ai_summary" };
        let query = format!(
            "SELECT
                title, channel, view_count, like_count, comment_count,
                publish_date, tags, thumbnail_url, video_url, scrapped_date, {summary_select}
             FROM {VIDEOS_TABLE}
             ORDER BY view_count DESC"
        );

        let mut stmt = self.conn.prepare(&query)?;
        let rows = stmt.query_map([], |row| {
            Ok(VideoRecord {
                title: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                channel: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                view_count: stored_count(row.get(2)?),
                like_count: stored_count(row.get(3)?),
                comment_count: stored_count(row.get(4)?),
                publish_date: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
                tags: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
                thumbnail_url: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
                video_url: row.get::<_, Option<String>>(8)?.unwrap_or_default(),
                scrapped_date: row.get::<_, Option<String>>(9)?.unwrap_or_default(),
                ai_summary: row.get(10)?,
            })
        })?;

        let mut videos = Vec::new();
        for row in rows {
            videos.push(row.context("failed to decode trending_videos row")?);
        }

        Ok(videos)
    }

    /// Number of stored videos; zero when the table has not been created yet.
    ///
    /// # Errors
    /// Returns an error when the count query fails.
    pub fn video_count(&self) -> Result<usize> {
        if !table_exists(&self.conn, VIDEOS_TABLE)? {
            return Ok(0);
        }
        let count = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {VIDEOS_TABLE}"), [], |row| {
                row.get::<_, i64>(0)
            })
            .context("failed to count stored videos")?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Create a `SQLite` backup file of the current main database.
    ///
    /// # Errors
    /// Returns an error when backup directories cannot be created or backup fails.
    pub fn backup_database(&self, out_file: &Path) -> Result<()> {
        if let Some(parent) = out_file.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create parent directory for backup file {}", out_file.display())
            })?;
        }

        self.conn
            .backup(DatabaseName::Main, out_file, None)
            .with_context(|| format!("failed to create sqlite backup at {}", out_file.display()))
    }

    /// Run quick-check plus schema status health probes.
    ///
    /// # Errors
    /// Returns an error when any integrity probe query fails.
    pub fn integrity_check(&self) -> Result<IntegrityReport> {
        let quick_check_message: String = self
            .conn
            .query_row("PRAGMA quick_check", [], |row| row.get::<_, String>(0))
            .context("failed to run PRAGMA quick_check")?;

        Ok(IntegrityReport {
            quick_check_ok: quick_check_message == "ok",
            quick_check_message,
            video_count: self.video_count()?,
            schema_status: self.schema_status()?,
        })
    }
}

fn apply_migration_1(conn: &Connection) -> Result<()> {
    conn.execute_batch(MIGRATION_001_SQL).context("failed to apply migration v1")?;
    record_schema_version(conn, 1)?;
    Ok(())
}

fn sql_count(value: u64, column: &str) -> Result<i64> {
    i64::try_from(value).with_context(|| format!("{column} {value} does not fit in an INTEGER"))
}

fn stored_count(value: Option<i64>) -> u64 {
    value.and_then(|raw| u64::try_from(raw).ok()).unwrap_or(0)
}

fn table_exists(conn: &Connection, table_name: &str) -> Result<bool> {
    let exists = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
            params![table_name],
            |row| row.get::<_, i64>(0),
        )
        .with_context(|| format!("failed to check if table exists: {table_name}"))?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    if !table_exists(conn, table)? {
        return Ok(false);
    }

    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table})"))
        .with_context(|| format!("failed to inspect table_info for {table}"))?;
    let mut rows = stmt.query([])?;

    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }

    Ok(false)
}

fn current_schema_version(conn: &Connection) -> Result<i64> {
    if !table_exists(conn, "schema_migrations")? {
        return Ok(0);
    }

    let version = conn
        .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_migrations", [], |row| {
            row.get::<_, i64>(0)
        })
        .context("failed to read current schema version")?;
    Ok(version)
}

fn detect_effective_schema_version(conn: &Connection) -> Result<(i64, bool)> {
    let recorded = current_schema_version(conn)?;
    if recorded > 0 {
        return Ok((recorded, false));
    }

    if !table_exists(conn, VIDEOS_TABLE)? {
        return Ok((0, false));
    }

    if table_has_column(conn, VIDEOS_TABLE, SUMMARY_COLUMN)? {
        return Ok((2, true));
    }

    if table_has_column(conn, VIDEOS_TABLE, "video_url")? {
        return Ok((1, true));
    }

    Err(anyhow!("database schema is invalid: {VIDEOS_TABLE} has no video_url column"))
}

fn record_schema_version(conn: &Connection, version: i64) -> Result<()> {
    let now = now_rfc3339()?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_migrations(version, applied_at) VALUES (?1, ?2)",
        params![version, now],
    )
    .with_context(|| format!("failed to record migration version {version}"))?;
    Ok(())
}

fn now_rfc3339() -> Result<String> {
    OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .context("failed to format RFC3339 timestamp")
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use trend_core::permalink;

    const LEGACY_TABLE_SQL: &str = r"
        CREATE TABLE trending_videos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT,
            channel TEXT,
            view_count INTEGER,
            like_count INTEGER,
            comment_count INTEGER,
            publish_date TEXT,
            tags TEXT,
            thumbnail_url TEXT,
            video_url TEXT,
            scrapped_date TEXT
        )";

    fn unique_temp_db_path(prefix: &str) -> PathBuf {
        std::env::temp_dir().join(format!("{prefix}-{}.sqlite3", ulid::Ulid::new()))
    }

    fn mk_video(id: &str, views: u64, summary: Option<&str>) -> VideoRecord {
        VideoRecord {
            title: format!("Title {id}"),
            channel: "Golf Channel".to_string(),
            view_count: views,
            like_count: views / 20,
            comment_count: views / 200,
            publish_date: "2024-05-01T09:30:00Z".to_string(),
            tags: "golf,pga".to_string(),
            thumbnail_url: format!("https://i.ytimg.com/vi/{id}/mqdefault.jpg"),
            video_url: permalink(id),
            scrapped_date: "2024-05-02".to_string(),
            ai_summary: summary.map(str::to_string),
        }
    }

    fn insert_legacy_row(conn: &Connection, id: &str, views: i64) -> Result<()> {
        conn.execute(
            "INSERT INTO trending_videos
                (title, channel, view_count, like_count, comment_count, publish_date,
                 tags, thumbnail_url, video_url, scrapped_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                format!("Legacy {id}"),
                "Old Channel",
                views,
                7_i64,
                1_i64,
                "2024-01-01T00:00:00Z",
                "",
                "",
                permalink(id),
                "2024-01-02",
            ],
        )?;
        Ok(())
    }

    #[test]
    fn migrate_fresh_database_reaches_latest_version() -> Result<()> {
        let mut store = SqliteStore::open(Path::new(":memory:"))?;
        let before = store.schema_status()?;
        assert_eq!(before.current_version, 0);
        assert_eq!(before.pending_versions, vec![1, 2]);

        store.migrate()?;
        let after = store.schema_status()?;
        assert_eq!(after.current_version, LATEST_SCHEMA_VERSION);
        assert!(after.pending_versions.is_empty());
        assert!(!after.inferred_from_legacy);
        assert!(store.summary_column_present()?);
        Ok(())
    }

    #[test]
    fn replace_and_list_round_trip_every_field() -> Result<()> {
        let mut store = SqliteStore::open(Path::new(":memory:"))?;
        let low = mk_video("low", 10, None);
        let high = mk_video("high", 5_000, Some("- Hook: a\n- Audience: b\n- Momentum: c"));

        let inserted = store.replace_videos(&[low.clone(), high.clone()])?;
        assert_eq!(inserted, 2);

        let listed = store.list_videos()?;
        assert_eq!(listed, vec![high, low]);
        Ok(())
    }

    #[test]
    fn replace_discards_previous_snapshot() -> Result<()> {
        let mut store = SqliteStore::open(Path::new(":memory:"))?;
        store.replace_videos(&[mk_video("a", 1, None), mk_video("b", 2, None)])?;
        store.replace_videos(&[mk_video("c", 3, None)])?;

        let listed = store.list_videos()?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].video_url, permalink("c"));
        assert_eq!(store.video_count()?, 1);
        Ok(())
    }

    #[test]
    fn failed_replace_keeps_previous_snapshot() -> Result<()> {
        let mut store = SqliteStore::open(Path::new(":memory:"))?;
        store.replace_videos(&[mk_video("keep", 42, None)])?;

        let overflowing = mk_video("overflow", u64::MAX, None);
        let result = store.replace_videos(&[mk_video("new", 1, None), overflowing]);
        assert!(result.is_err());

        let listed = store.list_videos()?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].video_url, permalink("keep"));
        Ok(())
    }

    #[test]
    fn legacy_table_without_summary_column_reads_as_none() -> Result<()> {
        let store = SqliteStore::open(Path::new(":memory:"))?;
        store.conn.execute_batch(LEGACY_TABLE_SQL)?;
        insert_legacy_row(&store.conn, "old1", 100)?;
        insert_legacy_row(&store.conn, "old2", 900)?;

        let status = store.schema_status()?;
        assert_eq!(status.current_version, 1);
        assert!(status.inferred_from_legacy);
        assert_eq!(status.pending_versions, vec![2]);
        assert!(!store.summary_column_present()?);

        let listed = store.list_videos()?;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].title, "Legacy old2");
        assert!(listed.iter().all(|video| video.ai_summary.is_none()));
        Ok(())
    }

    #[test]
    fn migrate_legacy_table_adds_summary_column_and_keeps_rows() -> Result<()> {
        let mut store = SqliteStore::open(Path::new(":memory:"))?;
        store.conn.execute_batch(LEGACY_TABLE_SQL)?;
        insert_legacy_row(&store.conn, "old1", 100)?;

        store.migrate()?;
        let status = store.schema_status()?;
        assert_eq!(status.current_version, 2);
        assert!(!status.inferred_from_legacy);
        assert!(store.summary_column_present()?);

        let listed = store.list_videos()?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].view_count, 100);
        assert_eq!(listed[0].ai_summary, None);
        Ok(())
    }

    #[test]
    fn migrate_rejects_unrecognized_table_shape() -> Result<()> {
        let mut store = SqliteStore::open(Path::new(":memory:"))?;
        store.conn.execute_batch("CREATE TABLE trending_videos (id INTEGER PRIMARY KEY)")?;

        let err = match store.migrate() {
            Ok(()) => panic!("migration should reject a table without video_url"),
            Err(err) => err,
        };
        assert!(err.to_string().contains("schema is invalid"));
        Ok(())
    }

    #[test]
    fn list_videos_reports_missing_table() -> Result<()> {
        let store = SqliteStore::open(Path::new(":memory:"))?;
        let err = match store.list_videos() {
            Ok(videos) => panic!("expected missing-table error, got {} rows", videos.len()),
            Err(err) => err,
        };
        assert!(err.to_string().contains("does not exist"));
        Ok(())
    }

    #[test]
    fn null_and_negative_legacy_values_fall_back_to_defaults() -> Result<()> {
        let store = SqliteStore::open(Path::new(":memory:"))?;
        store.conn.execute_batch(LEGACY_TABLE_SQL)?;
        store.conn.execute(
            "INSERT INTO trending_videos (title, view_count, like_count) VALUES ('sparse', -5, NULL)",
            [],
        )?;

        let listed = store.list_videos()?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "sparse");
        assert_eq!(listed[0].channel, "");
        assert_eq!(listed[0].view_count, 0);
        assert_eq!(listed[0].like_count, 0);
        assert_eq!(listed[0].tags, "");
        Ok(())
    }

    #[test]
    fn open_read_only_rejects_missing_file() {
        let path = unique_temp_db_path("trend-missing");
        let err = match SqliteStore::open_read_only(&path) {
            Ok(_) => panic!("opening a missing file read-only should fail"),
            Err(err) => err,
        };
        assert!(err.to_string().contains("database file not found"));
        assert!(!path.exists());
    }

    #[test]
    fn read_only_connection_lists_without_mutating_legacy_schema() -> Result<()> {
        let path = unique_temp_db_path("trend-readonly");
        {
            let conn = Connection::open(&path)?;
            conn.execute_batch(LEGACY_TABLE_SQL)?;
            insert_legacy_row(&conn, "ro", 12)?;
        }

        let store = SqliteStore::open_read_only(&path)?;
        assert_eq!(store.list_videos()?.len(), 1);
        assert_eq!(store.schema_status()?.current_version, 1);
        assert!(!table_exists(&store.conn, "schema_migrations")?);

        drop(store);
        let _ = fs::remove_file(&path);
        Ok(())
    }

    #[test]
    fn backup_copies_current_snapshot() -> Result<()> {
        let db_path = unique_temp_db_path("trend-backup-src");
        let backup_path = unique_temp_db_path("trend-backup-dst");

        let mut store = SqliteStore::open(&db_path)?;
        store.replace_videos(&[mk_video("b1", 10, Some("summary"))])?;
        store.backup_database(&backup_path)?;

        let restored = SqliteStore::open_read_only(&backup_path)?;
        assert_eq!(restored.list_videos()?, store.list_videos()?);

        drop(restored);
        drop(store);
        let _ = fs::remove_file(&db_path);
        let _ = fs::remove_file(&backup_path);
        Ok(())
    }

    #[test]
    fn integrity_check_reports_clean_database() -> Result<()> {
        let mut store = SqliteStore::open(Path::new(":memory:"))?;
        store.replace_videos(&[mk_video("i1", 1, None), mk_video("i2", 2, None)])?;

        let report = store.integrity_check()?;
        assert!(report.quick_check_ok);
        assert_eq!(report.video_count, 2);
        assert!(report.schema_status.pending_versions.is_empty());
        Ok(())
    }
}
