use crate::accumulator::{Accumulator, AccumulatorState};
use crate::chart::{ChartBackend, ChartRenderer};
use crate::client::{AnalysisClient, ChunkSource};
use crate::config::{FetchMode, PipelineConfig};
use crate::errors::PipelineError;
use crate::models::{ChartSeries, Query, ResultPayload};
use crate::renderer::Renderer;
use crate::transform::transform;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

pub const FAILURE_NOTICE: &str =
    "An error occurred while processing your request. Please try again.";
pub const EMPTY_QUERY_NOTICE: &str = "Please enter a query";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub renders: usize,
}

pub struct QueryResultPipeline<R: Renderer, C: ChartBackend> {
    client: AnalysisClient,
    config: PipelineConfig,
    renderer: R,
    charts: Mutex<ChartRenderer<C>>,
    in_flight: AtomicBool,
}

struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Emits `loading_ended` however the submission finishes, cancellation included.
struct Loading<'a, R: Renderer>(&'a R);

impl<'a, R: Renderer> Loading<'a, R> {
    fn start(renderer: &'a R) -> Self {
        renderer.loading_started();
        Self(renderer)
    }
}

impl<R: Renderer> Drop for Loading<'_, R> {
    fn drop(&mut self) {
        self.0.loading_ended();
    }
}

impl<R: Renderer, C: ChartBackend> QueryResultPipeline<R, C> {
    pub fn new(config: PipelineConfig, renderer: R, backend: C) -> Result<Self, PipelineError> {
        Ok(Self {
            client: AnalysisClient::new(&config)?,
            config,
            renderer,
            charts: Mutex::new(ChartRenderer::new(backend)),
            in_flight: AtomicBool::new(false),
        })
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub async fn with_charts<T>(&self, f: impl FnOnce(&ChartRenderer<C>) -> T) -> T {
        let charts = self.charts.lock().await;
        f(&charts)
    }

    /// Failures are logged and shown as a notice before being returned.
    pub async fn submit(&self, raw: &str) -> Result<SubmitOutcome, PipelineError> {
        let query = match Query::parse(raw) {
            Ok(query) => query,
            Err(err) => {
                self.renderer.render_notice(EMPTY_QUERY_NOTICE);
                return Err(err);
            }
        };
        let Some(_in_flight) = InFlight::acquire(&self.in_flight) else {
            warn!(query = query.as_str(), "submission ignored while another is in flight");
            return Err(PipelineError::Busy);
        };

        let _loading = Loading::start(&self.renderer);
        self.renderer.query_accepted(query.as_str());
        self.charts.lock().await.clear();
        info!(query = query.as_str(), mode = ?self.config.mode, "submitting query");

        let result = match self.config.mode {
            FetchMode::Atomic => self.run_atomic(&query).await,
            FetchMode::Incremental => self.run_incremental(&query).await,
        };

        match result {
            Ok(outcome) => {
                info!(renders = outcome.renders, "query completed");
                Ok(outcome)
            }
            Err(err) => {
                error!("query failed: {err}");
                self.renderer.render_notice(FAILURE_NOTICE);
                Err(err)
            }
        }
    }

    pub async fn select_chart_type(&self, chart_type: &str) -> Result<(), PipelineError> {
        let result = self.charts.lock().await.switch_type(chart_type);
        if let Err(err) = &result {
            error!(chart_type, "chart switch failed: {err}");
            self.renderer.render_notice(FAILURE_NOTICE);
        }
        result
    }

    async fn run_atomic(&self, query: &Query) -> Result<SubmitOutcome, PipelineError> {
        let payload = self.client.fetch_atomic(query).await?;
        self.apply(&payload).await?;
        Ok(SubmitOutcome { renders: 1 })
    }

    async fn run_incremental(&self, query: &Query) -> Result<SubmitOutcome, PipelineError> {
        let mut response = self.client.send_query(query).await?;
        self.consume(&mut response).await
    }

    pub(crate) async fn consume<S: ChunkSource>(
        &self,
        source: &mut S,
    ) -> Result<SubmitOutcome, PipelineError> {
        let mut acc = Accumulator::new();
        loop {
            let chunk = match source.next_chunk().await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(err) => {
                    acc.fail();
                    return Err(err);
                }
            };
            if let Some(payload) = acc.push(&chunk) {
                self.apply(&payload).await?;
            }
        }
        acc.finish();
        debug_assert_eq!(acc.state(), AccumulatorState::Done);

        if acc.emitted() == 0 {
            warn!(
                bytes = acc.buffered_len(),
                "stream ended without a complete payload"
            );
        }
        Ok(SubmitOutcome {
            renders: acc.emitted(),
        })
    }

    async fn apply(&self, payload: &ResultPayload) -> Result<(), PipelineError> {
        let (analysis, data) = transform(payload);
        self.renderer.render_analysis(&analysis);

        let data = match data {
            Ok(data) => data,
            Err(err) => {
                self.charts.lock().await.clear();
                return Err(err);
            }
        };
        self.renderer.render_data(&data);

        let series = match (self.config.remote_visualize, payload.datasets.first()) {
            (true, Some(dataset)) => self.client.visualize(dataset).await?,
            _ => ChartSeries::from(&data),
        };
        self.charts
            .lock()
            .await
            .show(series, &self.config.default_chart_type)?;
        Ok(())
    }
}
