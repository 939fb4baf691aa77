//! Benchmark harness comparing strategies and target sizes on one document.

use std::fmt::Write as _;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::chunkers::ChunkAdapter;
use crate::quality::{quality_score, ChunkStats};
use crate::router::Adapter;
use crate::types::{ChunkerConfig, SourceDocument, Strategy};

/// Weight of the speed term in the composite score.
pub const SPEED_WEIGHT: f64 = 0.3;

/// Weight of the quality term in the composite score.
pub const QUALITY_WEIGHT: f64 = 0.7;

/// Floor applied to measured latency before computing speed.
const MIN_LATENCY_MS: f64 = 0.001;

/// One (strategy, target size) cell of a benchmark grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkCase {
    pub strategy: Strategy,
    pub target_size: usize,
    /// Defaults to 20% of `target_size`
    #[serde(default)]
    pub overlap: Option<usize>,
}

impl BenchmarkCase {
    pub fn new(strategy: Strategy, target_size: usize) -> Self {
        Self {
            strategy,
            target_size,
            overlap: None,
        }
    }

    pub fn with_overlap(mut self, overlap: usize) -> Self {
        self.overlap = Some(overlap);
        self
    }

    /// Cross product of strategies and sizes.
    pub fn grid(strategies: &[Strategy], sizes: &[usize]) -> Vec<Self> {
        strategies
            .iter()
            .flat_map(|&strategy| sizes.iter().map(move |&size| Self::new(strategy, size)))
            .collect()
    }

    pub fn overlap(&self) -> usize {
        self.overlap.unwrap_or(self.target_size / 5)
    }

    /// The configuration this cell runs with, on top of `base` flags.
    pub fn config(&self, base: &ChunkerConfig) -> ChunkerConfig {
        ChunkerConfig {
            target_size: self.target_size,
            overlap: self.overlap(),
            ..base.clone()
        }
    }
}

/// Measurements of one cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub strategy: Strategy,
    pub config: ChunkerConfig,
    pub latency_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<ChunkStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composite: Option<f64>,
    /// Set when the cell failed; no measurements are recorded then
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BenchmarkResult {
    fn failed(strategy: Strategy, config: ChunkerConfig, error: String) -> Self {
        Self {
            strategy,
            config,
            latency_ms: 0.0,
            stats: None,
            quality: None,
            composite: None,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// The best cell of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub strategy: Strategy,
    pub config: ChunkerConfig,
    pub composite: f64,
    pub justification: String,
}

/// Full benchmark output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub results: Vec<BenchmarkResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<Recommendation>,
}

impl BenchmarkReport {
    fn new(results: Vec<BenchmarkResult>) -> Self {
        let recommendation = recommend(&results);
        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            results,
            recommendation,
        }
    }

    /// Render a fixed-width comparison table.
    pub fn to_table(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:<10} {:>6} {:>7} {:>11} {:>7} {:>9} {:>7} {:>7} {:>8} {:>10}",
            "strategy", "target", "overlap", "latency_ms", "chunks", "mean", "min", "max", "quality", "composite"
        );

        for result in &self.results {
            let _ = write!(
                out,
                "{:<10} {:>6} {:>7} ",
                result.strategy.as_str(),
                result.config.target_size,
                result.config.overlap
            );
            match (&result.stats, result.quality, result.composite, &result.error) {
                (Some(stats), Some(quality), Some(composite), None) => {
                    let _ = writeln!(
                        out,
                        "{:>11.3} {:>7} {:>9.1} {:>7} {:>7} {:>8.3} {:>10.3}",
                        result.latency_ms, stats.count, stats.mean, stats.min, stats.max, quality, composite
                    );
                }
                (_, _, _, error) => {
                    let _ = writeln!(out, "error: {}", error.as_deref().unwrap_or("no measurements"));
                }
            }
        }

        if let Some(recommendation) = &self.recommendation {
            let _ = writeln!(out, "\nrecommended: {}", recommendation.justification);
        }
        out
    }
}

/// `0.3 × speed + 0.7 × quality`, with speed = `100 / latency_ms`.
pub fn composite_score(latency_ms: f64, quality: f64) -> f64 {
    let speed = 100.0 / latency_ms.max(MIN_LATENCY_MS);
    SPEED_WEIGHT * speed + QUALITY_WEIGHT * quality
}

fn recommend(results: &[BenchmarkResult]) -> Option<Recommendation> {
    let best = results
        .iter()
        .filter_map(|r| r.composite.map(|c| (r, c)))
        .max_by(|(_, a), (_, b)| a.total_cmp(b))?;

    let (result, composite) = best;
    let quality = result.quality.unwrap_or_default();
    let chunks = result.stats.as_ref().map(|s| s.count).unwrap_or_default();

    Some(Recommendation {
        strategy: result.strategy,
        config: result.config.clone(),
        composite,
        justification: format!(
            "{} at target_size {} (overlap {}) has the highest composite score {:.3}: quality {:.3}, latency {:.3} ms, {} chunks",
            result.strategy,
            result.config.target_size,
            result.config.overlap,
            composite,
            quality,
            result.latency_ms,
            chunks
        ),
    })
}

/// Run one cell; failures become error cells.
fn run_cell(doc: &SourceDocument, strategy: Strategy, config: ChunkerConfig) -> BenchmarkResult {
    let adapter = match Adapter::build(strategy, config.clone(), doc) {
        Ok(adapter) => adapter,
        Err(err) => {
            warn!(%strategy, target_size = config.target_size, error = %err, "Benchmark cell rejected");
            return BenchmarkResult::failed(strategy, config, err.to_string());
        }
    };

    let started = Instant::now();
    let chunks = match catch_unwind(AssertUnwindSafe(|| adapter.chunk(doc))) {
        Ok(chunks) => chunks,
        Err(_) => {
            warn!(%strategy, target_size = config.target_size, "Benchmark cell panicked");
            return BenchmarkResult::failed(strategy, config, "adapter panicked".to_string());
        }
    };
    let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

    let quality = quality_score(&chunks);
    let composite = composite_score(latency_ms, quality);

    debug!(
        %strategy,
        target_size = config.target_size,
        latency_ms,
        chunks = chunks.len(),
        quality,
        "Benchmark cell done"
    );

    BenchmarkResult {
        strategy,
        stats: Some(ChunkStats::from_chunks(&chunks)),
        quality: Some(quality),
        composite: Some(composite),
        latency_ms,
        config,
        error: None,
    }
}

/// Runs benchmark grids against a document.
#[derive(Debug, Clone)]
pub struct BenchmarkHarness {
    /// Flags shared by every cell; size and overlap come from the case
    base_config: ChunkerConfig,
    /// Maximum cells in flight for [`BenchmarkHarness::run_parallel`]
    max_concurrent: usize,
}

impl BenchmarkHarness {
    pub fn new(base_config: ChunkerConfig) -> Self {
        Self {
            base_config,
            max_concurrent: 4,
        }
    }

    pub fn with_concurrency(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// Run every case in order on the calling thread.
    pub fn run(&self, doc: &SourceDocument, cases: &[BenchmarkCase]) -> BenchmarkReport {
        info!(cases = cases.len(), "Starting benchmark");

        let results = cases
            .iter()
            .map(|case| run_cell(doc, case.strategy, case.config(&self.base_config)))
            .collect();

        self.finish(results)
    }

    /// Run cases on the blocking pool, at most `max_concurrent` at a time.
    ///
    /// Results keep the order of `cases`.
    pub async fn run_parallel(&self, doc: Arc<SourceDocument>, cases: Vec<BenchmarkCase>) -> BenchmarkReport {
        info!(cases = cases.len(), max_concurrent = self.max_concurrent, "Starting parallel benchmark");
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));

        let tasks = cases.into_iter().map(|case| {
            let semaphore = Arc::clone(&semaphore);
            let doc = Arc::clone(&doc);
            let strategy = case.strategy;
            let config = case.config(&self.base_config);

            async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let cell_config = config.clone();
                let handle = tokio::task::spawn_blocking(move || run_cell(&doc, strategy, cell_config));

                match handle.await {
                    Ok(result) => result,
                    Err(err) => BenchmarkResult::failed(strategy, config, err.to_string()),
                }
            }
        });

        let results = join_all(tasks).await;
        self.finish(results)
    }

    fn finish(&self, results: Vec<BenchmarkResult>) -> BenchmarkReport {
        let report = BenchmarkReport::new(results);
        let failed = report.results.iter().filter(|r| !r.is_ok()).count();

        info!(
            run_id = %report.run_id,
            cells = report.results.len(),
            failed,
            recommended = report.recommendation.as_ref().map(|r| r.strategy.as_str()).unwrap_or("none"),
            "Benchmark complete"
        );
        report
    }
}

impl Default for BenchmarkHarness {
    fn default() -> Self {
        Self::new(ChunkerConfig::default())
    }
}
