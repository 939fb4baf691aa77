//! HTTP request handlers for the chunking service.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::benchmark::{BenchmarkCase, BenchmarkHarness, BenchmarkReport};
use crate::error::ChunkerError;
use crate::router::{ChunkingOutcome, ChunkingRouter};
use crate::types::{ChunkerConfig, ServiceConfig, SourceDocument, Strategy};

/// Target sizes benchmarked when a request names none.
const DEFAULT_BENCHMARK_SIZES: [usize; 3] = [500, 1000, 1500];

/// Application state shared across handlers.
pub struct AppState {
    pub router: ChunkingRouter,
    pub config: ServiceConfig,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            router: ChunkingRouter::new(&config),
            config,
        }
    }
}

/// Build the service routes.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/strategies", get(list_strategies))
        .route("/chunk", post(chunk_document))
        .route("/benchmark", post(run_benchmark))
        .with_state(state)
}

/// Configuration errors rendered as `422 Unprocessable Entity`.
#[derive(Debug)]
pub struct ApiError(ChunkerError);

impl From<ChunkerError> for ApiError {
    fn from(err: ChunkerError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!(error = %self.0, "Rejected request");
        let body = Json(json!({ "error": self.0.to_string() }));
        (StatusCode::UNPROCESSABLE_ENTITY, body).into_response()
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
}

/// Health check endpoint.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Strategy listing entry.
#[derive(Debug, Serialize)]
pub struct StrategyInfo {
    name: String,
    description: String,
}

pub async fn list_strategies(State(state): State<Arc<AppState>>) -> Json<Vec<StrategyInfo>> {
    let strategies = state
        .router
        .list_strategies()
        .into_iter()
        .map(|(name, desc)| StrategyInfo {
            name: name.to_string(),
            description: desc.to_string(),
        })
        .collect();

    Json(strategies)
}

/// Chunk request.
#[derive(Debug, Deserialize)]
pub struct ChunkRequest {
    pub document: SourceDocument,
    /// Strategy name; picked from the document when absent
    #[serde(default)]
    pub strategy: Option<String>,
    /// Per-call configuration; service defaults when absent
    #[serde(default)]
    pub config: Option<ChunkerConfig>,
}

/// Chunk a single document.
pub async fn chunk_document(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChunkRequest>,
) -> Result<Json<ChunkingOutcome>, ApiError> {
    let strategy = request
        .strategy
        .as_deref()
        .map(str::parse::<Strategy>)
        .transpose()?;

    info!(
        kind = %request.document.kind,
        chars = request.document.content_len(),
        strategy = ?strategy,
        "Received chunk request"
    );

    let outcome = state.router.chunk(&request.document, strategy, request.config)?;
    Ok(Json(outcome))
}

/// Benchmark request.
///
/// Either explicit `cases`, or the cross product of `strategies` and `sizes`
/// (all strategies and a default size ladder when omitted).
#[derive(Debug, Deserialize)]
pub struct BenchmarkRequest {
    pub document: SourceDocument,
    #[serde(default)]
    pub cases: Option<Vec<BenchmarkCase>>,
    #[serde(default)]
    pub strategies: Option<Vec<String>>,
    #[serde(default)]
    pub sizes: Option<Vec<usize>>,
    /// Flags shared by every cell
    #[serde(default)]
    pub config: Option<ChunkerConfig>,
}

impl BenchmarkRequest {
    fn cases(&self) -> Result<Vec<BenchmarkCase>, ChunkerError> {
        if let Some(cases) = &self.cases {
            return Ok(cases.clone());
        }

        let strategies = match &self.strategies {
            Some(names) => names
                .iter()
                .map(|name| name.parse::<Strategy>())
                .collect::<Result<Vec<_>, _>>()?,
            None => Strategy::ALL.to_vec(),
        };
        let sizes = self
            .sizes
            .clone()
            .unwrap_or_else(|| DEFAULT_BENCHMARK_SIZES.to_vec());

        Ok(BenchmarkCase::grid(&strategies, &sizes))
    }
}

/// Benchmark strategies and sizes on one document.
pub async fn run_benchmark(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BenchmarkRequest>,
) -> Result<Json<BenchmarkReport>, ApiError> {
    let cases = request.cases()?;
    let base = request
        .config
        .clone()
        .unwrap_or_else(|| state.router.default_config().clone());

    info!(cells = cases.len(), "Received benchmark request");

    let harness = BenchmarkHarness::new(base).with_concurrency(state.config.max_concurrent_benchmarks);
    let report = harness.run_parallel(Arc::new(request.document), cases).await;
    Ok(Json(report))
}
