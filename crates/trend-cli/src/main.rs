use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;
use trend_api::TrendApi;
use trend_core::{run_date, DEFAULT_CHART_SIZE, DEFAULT_TOP_TAGS};
use trend_ingest::IngestConfig;

const CLI_CONTRACT_VERSION: &str = "cli.v1";

#[derive(Debug, Parser)]
#[command(name = "trend")]
#[command(about = "Trending video ingestion and query CLI")]
struct Cli {
    #[arg(long, default_value = "./trending_videos.sqlite3")]
    db: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch the current most-popular videos and replace the stored snapshot.
    Ingest(IngestArgs),
    Videos {
        #[command(subcommand)]
        command: Box<VideosCommand>,
    },
    Db {
        #[command(subcommand)]
        command: Box<DbCommand>,
    },
}

#[derive(Debug, Args)]
struct IngestArgs {
    /// Skip generated popularity notes.
    #[arg(long, default_value_t = false)]
    no_ai: bool,
}

#[derive(Debug, Subcommand)]
enum VideosCommand {
    List(VideosListArgs),
    Tags(VideosTagsArgs),
    Chart(VideosChartArgs),
}

#[derive(Debug, Args)]
struct VideosListArgs {
    #[arg(long)]
    search: Option<String>,
}

#[derive(Debug, Args)]
struct VideosTagsArgs {
    #[arg(long)]
    search: Option<String>,
    #[arg(long, default_value_t = DEFAULT_TOP_TAGS)]
    limit: usize,
}

#[derive(Debug, Args)]
struct VideosChartArgs {
    #[arg(long)]
    search: Option<String>,
    #[arg(long, default_value_t = DEFAULT_CHART_SIZE)]
    limit: usize,
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    SchemaVersion,
    Migrate(DbMigrateArgs),
    Backup(DbBackupArgs),
    IntegrityCheck,
}

#[derive(Debug, Args)]
struct DbMigrateArgs {
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

#[derive(Debug, Args)]
struct DbBackupArgs {
    #[arg(long)]
    out: PathBuf,
}

fn with_contract_version(value: Value) -> Value {
    match value {
        Value::Object(mut object) => {
            object.insert(
                "contract_version".to_string(),
                Value::String(CLI_CONTRACT_VERSION.to_string()),
            );
            Value::Object(object)
        }
        other => serde_json::json!({
            "contract_version": CLI_CONTRACT_VERSION,
            "payload": other
        }),
    }
}

fn emit_json(value: Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&with_contract_version(value))?);
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let api = TrendApi::new(cli.db);
    match cli.command {
        Command::Ingest(args) => run_ingest(&args, &api),
        Command::Videos { command } => run_videos(*command, &api),
        Command::Db { command } => run_db(*command, &api),
    }
}

fn run_ingest(args: &IngestArgs, api: &TrendApi) -> Result<()> {
    let today = run_date(OffsetDateTime::now_local(), OffsetDateTime::now_utc());
    tracing::info!(ai_enabled = !args.no_ai, db = %api.db_path().display(), "running ingestion");
    let report = api.ingest_from_env(!args.no_ai, IngestConfig::default(), today)?;
    emit_json(serde_json::to_value(&report).context("failed to serialize ingest report")?)
}

fn run_videos(command: VideosCommand, api: &TrendApi) -> Result<()> {
    let now = OffsetDateTime::now_utc();
    match command {
        VideosCommand::List(args) => {
            let search = args.search.unwrap_or_default();
            let videos = api.ranked_videos(&search, now)?;
            emit_json(serde_json::json!({
                "search": search.trim(),
                "count": videos.len(),
                "videos": videos
            }))
        }
        VideosCommand::Tags(args) => {
            let search = args.search.unwrap_or_default();
            let tags = api.top_tags(&search, args.limit, now)?;
            emit_json(serde_json::json!({
                "search": search.trim(),
                "limit": args.limit,
                "tags": tags
            }))
        }
        VideosCommand::Chart(args) => {
            let search = args.search.unwrap_or_default();
            let chart = api.firepower_chart(&search, args.limit, now)?;
            emit_json(serde_json::json!({
                "search": search.trim(),
                "limit": args.limit,
                "chart": chart
            }))
        }
    }
}

fn run_db(command: DbCommand, api: &TrendApi) -> Result<()> {
    match command {
        DbCommand::SchemaVersion => run_db_schema_version(api),
        DbCommand::Migrate(args) => run_db_migrate(&args, api),
        DbCommand::Backup(args) => run_db_backup(&args, api),
        DbCommand::IntegrityCheck => run_db_integrity_check(api),
    }
}

fn run_db_schema_version(api: &TrendApi) -> Result<()> {
    let status = api.schema_status()?;
    emit_json(serde_json::json!({
        "current_version": status.current_version,
        "target_version": status.target_version,
        "pending_versions": status.pending_versions,
        "up_to_date": status.pending_versions.is_empty(),
        "inferred_from_legacy": status.inferred_from_legacy
    }))
}

fn run_db_migrate(args: &DbMigrateArgs, api: &TrendApi) -> Result<()> {
    let result = api.migrate(args.dry_run)?;
    emit_json(serde_json::to_value(&result).context("failed to serialize migrate result")?)
}

fn run_db_backup(args: &DbBackupArgs, api: &TrendApi) -> Result<()> {
    api.backup(&args.out)?;
    emit_json(serde_json::json!({
        "backup_path": args.out,
        "status": "ok"
    }))
}

fn run_db_integrity_check(api: &TrendApi) -> Result<()> {
    let report = api.integrity_check()?;
    emit_json(serde_json::to_value(&report).context("failed to serialize integrity report")?)
}
