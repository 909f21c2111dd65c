mod render;

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use clap::Parser;
use serde::Serialize;
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;
use trend_api::{DashboardQuery, DashboardView, TrendApi, API_CONTRACT_VERSION};
use trend_store_sqlite::SchemaStatus;

const SERVICE_CONTRACT_VERSION: &str = "service.v1";

#[derive(Debug, Clone)]
struct ServiceState {
    api: TrendApi,
}

#[derive(Debug, Clone, Serialize)]
struct ServiceEnvelope<T>
where
    T: Serialize,
{
    service_contract_version: &'static str,
    api_contract_version: &'static str,
    data: T,
}

#[derive(Debug, Clone, Serialize)]
struct ServiceError {
    service_contract_version: &'static str,
    error: String,
}

#[derive(Debug, Clone, Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Parser)]
#[command(name = "trend-dashboard")]
#[command(about = "Local HTTP dashboard for trending videos")]
struct Args {
    #[arg(long, default_value = "./trending_videos.sqlite3")]
    db: PathBuf,
    #[arg(long, default_value = "127.0.0.1:4010")]
    bind: SocketAddr,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = StatusCode::BAD_REQUEST;
        (status, Json(self)).into_response()
    }
}

impl ServiceState {
    fn error(message: impl Into<String>) -> ServiceError {
        ServiceError { service_contract_version: SERVICE_CONTRACT_VERSION, error: message.into() }
    }
}

fn envelope<T>(data: T) -> ServiceEnvelope<T>
where
    T: Serialize,
{
    ServiceEnvelope {
        service_contract_version: SERVICE_CONTRACT_VERSION,
        api_contract_version: API_CONTRACT_VERSION,
        data,
    }
}

fn app(state: ServiceState) -> Router {
    Router::new()
        .route("/", get(dashboard_page))
        .route("/v1/health", get(health))
        .route("/v1/dashboard", get(dashboard_json))
        .route("/v1/db/schema-version", get(db_schema_version))
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();
    let state = ServiceState { api: TrendApi::new(args.db) };
    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    tracing::info!(bind = %args.bind, "serving trend dashboard");
    axum::serve(listener, app(state)).await?;
    Ok(())
}

async fn dashboard_page(
    State(state): State<ServiceState>,
    Query(query): Query<DashboardQuery>,
) -> Html<String> {
    let view = state.api.dashboard(&query, OffsetDateTime::now_utc());
    Html(render::render_dashboard(&view))
}

async fn health() -> Json<ServiceEnvelope<HealthResponse>> {
    Json(envelope(HealthResponse { status: "ok" }))
}

async fn dashboard_json(
    State(state): State<ServiceState>,
    Query(query): Query<DashboardQuery>,
) -> Json<ServiceEnvelope<DashboardView>> {
    Json(envelope(state.api.dashboard(&query, OffsetDateTime::now_utc())))
}

async fn db_schema_version(
    State(state): State<ServiceState>,
) -> Result<Json<ServiceEnvelope<SchemaStatus>>, ServiceError> {
    let status = state.api.schema_status().map_err(|err| ServiceState::error(err.to_string()))?;
    Ok(Json(envelope(status)))
}
