//! Ingestion job: fetch the most-popular catalog page, optionally annotate each video
//! with a generated popularity note, and swap the result into the store.

pub mod catalog;
pub mod generation;

use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::Date;
use trend_core::{scrapped_date_string, summary_failure_text};
use trend_store_sqlite::SqliteStore;

pub use catalog::{map_catalog_item, CatalogError, CatalogSource, YouTubeClient};
pub use generation::{
    discover_model, GeminiClient, GenerationError, Summarizer, SummaryGenerator,
};

pub const CATALOG_KEY_VAR: &str = "YOUTUBE_API_KEY";
pub const GENERATION_KEY_VAR: &str = "GEMINI_API_KEY";

const ERROR_BODY_LIMIT: usize = 300;
const UNREADABLE_BODY: &str = "<unreadable body>";
const EMPTY_BODY: &str = "<empty body>";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("required environment variable {variable} is not set")]
    Missing { variable: &'static str },
}

/// Fixed parameters of an ingestion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    pub catalog_base_url: String,
    pub generation_base_url: String,
    /// Catalog category (default: "17", sports)
    pub category_id: String,
    /// Region code (default: "KR")
    pub region_code: String,
    /// Items per run (default: 10)
    pub max_results: u32,
    /// HTTP timeout in seconds (default: 30)
    pub timeout_secs: u64,
    /// Pause after every generation request (default: 4s)
    pub summary_delay: Duration,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            catalog_base_url: "https://www.googleapis.com".to_string(),
            generation_base_url: "https://generativelanguage.googleapis.com".to_string(),
            category_id: "17".to_string(),
            region_code: "KR".to_string(),
            max_results: 10,
            timeout_secs: 30,
            summary_delay: Duration::from_secs(4),
        }
    }
}

/// API keys resolved at startup.
#[derive(Clone)]
pub struct Credentials {
    pub catalog_key: String,
    pub generation_key: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("catalog_key", &"<redacted>")
            .field("generation_key", &self.generation_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Credentials {
    /// Resolve keys from the process environment.
    ///
    /// # Errors
    /// Returns an error naming the first missing or blank variable.
    pub fn from_env(ai_enabled: bool) -> Result<Self, CredentialError> {
        Self::resolve(ai_enabled, |name| std::env::var(name).ok())
    }

    /// Resolve keys through `lookup`.
    ///
    /// # Errors
    /// Returns an error naming the first missing or blank variable.
    pub fn resolve(
        ai_enabled: bool,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, CredentialError> {
        let required = |variable: &'static str| {
            lookup(variable)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or(CredentialError::Missing { variable })
        };

        let catalog_key = required(CATALOG_KEY_VAR)?;
        let generation_key = if ai_enabled { Some(required(GENERATION_KEY_VAR)?) } else { None };

        Ok(Self { catalog_key, generation_key })
    }
}

/// Everything a run needs besides the store.
pub struct IngestContext<'a> {
    pub config: IngestConfig,
    pub catalog: &'a dyn CatalogSource,
    pub summarizer: Option<Summarizer<'a>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestReport {
    pub run_id: String,
    pub scrapped_date: String,
    pub fetched: usize,
    pub inserted: usize,
    pub summarized: usize,
    pub summary_failures: usize,
    pub model: Option<String>,
}

/// Run one ingestion and replace the stored snapshot.
///
/// # Errors
/// Returns an error when the catalog fetch fails or the snapshot cannot be written. In
/// both cases the previously stored rows are left as they were.
pub fn run_ingest(
    ctx: &IngestContext<'_>,
    store: &mut SqliteStore,
    today: Date,
) -> Result<IngestReport> {
    let run_id = ulid::Ulid::new().to_string();
    let scrapped_date = scrapped_date_string(today);
    tracing::info!(
        run_id = %run_id,
        category = %ctx.config.category_id,
        region = %ctx.config.region_code,
        max_results = ctx.config.max_results,
        "starting ingestion"
    );

    let items = ctx
        .catalog
        .fetch_most_popular(&ctx.config)
        .context("failed to fetch most-popular videos")?;

    let mut records =
        items.iter().map(|item| map_catalog_item(item, &scrapped_date)).collect::<Vec<_>>();

    let mut summarized = 0;
    let mut summary_failures = 0;
    if let Some(summarizer) = &ctx.summarizer {
        for (index, record) in records.iter_mut().enumerate() {
            let text = match summarizer.summarize(record) {
                Ok(text) => {
                    summarized += 1;
                    text
                }
                Err(err) => {
                    summary_failures += 1;
                    tracing::warn!(index, title = %record.title, error = %err, "summary failed");
                    summary_failure_text(&err)
                }
            };
            record.ai_summary = Some(text);
            std::thread::sleep(ctx.config.summary_delay);
        }
    }

    let inserted = store.replace_videos(&records).context("failed to store ingested videos")?;

    let report = IngestReport {
        run_id,
        scrapped_date,
        fetched: items.len(),
        inserted,
        summarized,
        summary_failures,
        model: ctx.summarizer.as_ref().map(|summarizer| summarizer.model.clone()),
    };
    tracing::info!(
        run_id = %report.run_id,
        fetched = report.fetched,
        inserted = report.inserted,
        summary_failures = report.summary_failures,
        "ingestion complete"
    );
    Ok(report)
}

fn agent_for(config: &IngestConfig) -> ureq::Agent {
    ureq::AgentBuilder::new().timeout(Duration::from_secs(config.timeout_secs)).build()
}

fn truncated_body(response: ureq::Response) -> String {
    bounded_error_body(response.into_string())
}

fn bounded_error_body(read: std::io::Result<String>) -> String {
    match read {
        Ok(body) if body.trim().is_empty() => EMPTY_BODY.to_string(),
        Ok(body) => body.chars().take(ERROR_BODY_LIMIT).collect(),
        Err(err) => {
            tracing::debug!(error = %err, "failed to read error response body");
            UNREADABLE_BODY.to_string()
        }
    }
}

// Transport errors render the request URL, which carries the API key; only kind and message
// are kept.
fn describe_transport(transport: &ureq::Transport) -> String {
    match transport.message() {
        Some(message) => format!("{}: {message}", transport.kind()),
        None => transport.kind().to_string(),
    }
}
