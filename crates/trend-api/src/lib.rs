use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use trend_core::{
    derive_metrics, filter_by_search, top_by_firepower, top_tags, FirepowerEntry, RankedVideo,
    TagCount, DEFAULT_CHART_SIZE, DEFAULT_TOP_TAGS,
};
use trend_ingest::{
    run_ingest, Credentials, GeminiClient, IngestConfig, IngestContext, IngestReport, Summarizer,
    SummaryGenerator, YouTubeClient,
};
use trend_store_sqlite::{IntegrityReport, SchemaStatus, SqliteStore};

pub const API_CONTRACT_VERSION: &str = "api.v1";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MigrateResult {
    pub dry_run: bool,
    pub current_version: i64,
    pub target_version: i64,
    pub would_apply_versions: Vec<i64>,
    pub inferred_from_legacy: bool,
    pub after_version: Option<i64>,
    pub up_to_date: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardQuery {
    #[serde(default)]
    pub search: Option<String>,
}

impl DashboardQuery {
    fn term(&self) -> &str {
        self.search.as_deref().unwrap_or_default().trim()
    }
}

/// Everything the dashboard page shows for one request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardView {
    pub search: String,
    pub total: usize,
    pub videos: Vec<RankedVideo>,
    pub top_tags: Vec<TagCount>,
    pub firepower_chart: Vec<FirepowerEntry>,
    pub summaries_available: bool,
    pub error: Option<String>,
}

impl DashboardView {
    fn failed(search: String, message: String) -> Self {
        Self {
            search,
            total: 0,
            videos: Vec::new(),
            top_tags: Vec::new(),
            firepower_chart: Vec::new(),
            summaries_available: false,
            error: Some(message),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrendApi {
    db_path: PathBuf,
}

impl TrendApi {
    #[must_use]
    pub fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }

    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn open_store(&self) -> Result<SqliteStore> {
        SqliteStore::open(&self.db_path)
    }

    fn open_reader(&self) -> Result<SqliteStore> {
        SqliteStore::open_read_only(&self.db_path)
    }

    /// Inspect schema status without mutating data.
    ///
    /// # Errors
    /// Returns an error when the database file is missing or cannot be queried.
    pub fn schema_status(&self) -> Result<SchemaStatus> {
        let store = self.open_reader()?;
        store.schema_status()
    }

    /// Apply pending migrations, or return planned versions for dry-run mode.
    ///
    /// # Errors
    /// Returns an error when migration planning or execution fails.
    pub fn migrate(&self, dry_run: bool) -> Result<MigrateResult> {
        let mut store = self.open_store()?;
        let before = store.schema_status()?;
        if dry_run {
            return Ok(MigrateResult {
                dry_run: true,
                current_version: before.current_version,
                target_version: before.target_version,
                would_apply_versions: before.pending_versions,
                inferred_from_legacy: before.inferred_from_legacy,
                after_version: None,
                up_to_date: None,
            });
        }

        let planned_versions = before.pending_versions;
        store.migrate()?;
        let after = store.schema_status()?;
        Ok(MigrateResult {
            dry_run: false,
            current_version: before.current_version,
            target_version: before.target_version,
            would_apply_versions: planned_versions,
            inferred_from_legacy: before.inferred_from_legacy,
            after_version: Some(after.current_version),
            up_to_date: Some(after.pending_versions.is_empty()),
        })
    }

    /// Run an ingestion with caller-supplied clients.
    ///
    /// # Errors
    /// Returns an error when the store cannot be opened or the run fails.
    pub fn ingest(&self, ctx: &IngestContext<'_>, today: Date) -> Result<IngestReport> {
        let mut store = self.open_store()?;
        run_ingest(ctx, &mut store, today)
    }

    /// Resolve credentials from the environment and run a live ingestion.
    ///
    /// Credentials are checked before the database is opened.
    ///
    /// # Errors
    /// Returns an error when a key is missing, the fetch fails, or the snapshot cannot be
    /// stored.
    pub fn ingest_from_env(
        &self,
        ai_enabled: bool,
        config: IngestConfig,
        today: Date,
    ) -> Result<IngestReport> {
        let credentials = Credentials::from_env(ai_enabled)?;
        let catalog = YouTubeClient::new(credentials.catalog_key.clone(), &config);
        let generator = credentials
            .generation_key
            .as_ref()
            .map(|key| GeminiClient::new(key.clone(), &config));

        let ctx = IngestContext {
            summarizer: generator
                .as_ref()
                .map(|generator| Summarizer::discover(generator as &dyn SummaryGenerator)),
            catalog: &catalog,
            config,
        };
        self.ingest(&ctx, today)
    }

    /// Stored videos with derived metrics, filtered by `search`.
    ///
    /// # Errors
    /// Returns an error when the database or table is missing or rows cannot be read.
    pub fn ranked_videos(&self, search: &str, now: OffsetDateTime) -> Result<Vec<RankedVideo>> {
        let store = self.open_reader()?;
        let records = store.list_videos()?;
        Ok(filter_by_search(derive_metrics(records, now), search))
    }

    /// Most frequent tags across the filtered videos.
    ///
    /// # Errors
    /// Returns an error when videos cannot be loaded.
    pub fn top_tags(
        &self,
        search: &str,
        limit: usize,
        now: OffsetDateTime,
    ) -> Result<Vec<TagCount>> {
        Ok(top_tags(&self.ranked_videos(search, now)?, limit))
    }

    /// Highest-firepower videos across the filtered set.
    ///
    /// # Errors
    /// Returns an error when videos cannot be loaded.
    pub fn firepower_chart(
        &self,
        search: &str,
        limit: usize,
        now: OffsetDateTime,
    ) -> Result<Vec<FirepowerEntry>> {
        Ok(top_by_firepower(&self.ranked_videos(search, now)?, limit))
    }

    /// Assemble the dashboard view. Load failures are reported inline on an empty view.
    #[must_use]
    pub fn dashboard(&self, query: &DashboardQuery, now: OffsetDateTime) -> DashboardView {
        let search = query.term().to_string();
        match self.load_dashboard(&search, now) {
            Ok(view) => view,
            Err(err) => {
                let message = format!("{err:#}");
                tracing::warn!(
                    error = %message,
                    db = %self.db_path.display(),
                    "dashboard load failed"
                );
                DashboardView::failed(search, message)
            }
        }
    }

    fn load_dashboard(&self, search: &str, now: OffsetDateTime) -> Result<DashboardView> {
        let store = self.open_reader()?;
        let summaries_available = store.summary_column_present()?;
        let records = store.list_videos().context("failed to load stored videos")?;
        let videos = filter_by_search(derive_metrics(records, now), search);

        Ok(DashboardView {
            search: search.to_string(),
            total: videos.len(),
            top_tags: top_tags(&videos, DEFAULT_TOP_TAGS),
            firepower_chart: top_by_firepower(&videos, DEFAULT_CHART_SIZE),
            videos,
            summaries_available,
            error: None,
        })
    }

    /// Write a `SQLite` backup of the database to `out`.
    ///
    /// # Errors
    /// Returns an error when the database is missing or the backup fails.
    pub fn backup(&self, out: &Path) -> Result<()> {
        let store = self.open_reader()?;
        store.backup_database(out)
    }

    /// Run database health probes.
    ///
    /// # Errors
    /// Returns an error when the database is missing or a probe fails.
    pub fn integrity_check(&self) -> Result<IntegrityReport> {
        let store = self.open_reader()?;
        store.integrity_check()
    }
}
