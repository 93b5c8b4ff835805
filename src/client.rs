use crate::config::PipelineConfig;
use crate::errors::PipelineError;
use crate::models::{
    AtomicPayload, ChartSeries, Dataset, Query, QueryRequest, ResultPayload, VisualizeRequest,
};
use bytes::Bytes;
use reqwest::{Client, Response};
use tracing::debug;

pub(crate) trait ChunkSource {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, PipelineError>;
}

impl ChunkSource for Response {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, PipelineError> {
        self.chunk().await.map_err(PipelineError::request)
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisClient {
    http: Client,
    fetch_url: String,
    visualize_url: String,
}

impl AnalysisClient {
    pub fn new(config: &PipelineConfig) -> Result<Self, PipelineError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(PipelineError::request)?;
        Ok(Self {
            http,
            fetch_url: config.fetch_url(),
            visualize_url: config.visualize_url(),
        })
    }

    pub async fn send_query(&self, query: &Query) -> Result<Response, PipelineError> {
        debug!(url = %self.fetch_url, "posting query");
        let response = self
            .http
            .post(&self.fetch_url)
            .json(&QueryRequest {
                query: query.as_str(),
            })
            .send()
            .await
            .map_err(PipelineError::request)?;
        ensure_success(response)
    }

    pub async fn fetch_atomic(&self, query: &Query) -> Result<ResultPayload, PipelineError> {
        let response = self.send_query(query).await?;
        let body = response.bytes().await.map_err(PipelineError::request)?;
        decode_atomic(&body)
    }

    pub async fn visualize(&self, dataset: &Dataset) -> Result<ChartSeries, PipelineError> {
        debug!(url = %self.visualize_url, "requesting chart series");
        let response = self
            .http
            .post(&self.visualize_url)
            .json(&VisualizeRequest {
                merged_data: dataset,
            })
            .send()
            .await
            .map_err(PipelineError::request)?;
        let body = ensure_success(response)?
            .bytes()
            .await
            .map_err(PipelineError::request)?;
        serde_json::from_slice(&body).map_err(PipelineError::Decode)
    }
}

pub fn decode_atomic(body: &[u8]) -> Result<ResultPayload, PipelineError> {
    serde_json::from_slice::<AtomicPayload>(body)
        .map(ResultPayload::from)
        .map_err(PipelineError::Decode)
}

fn ensure_success(response: Response) -> Result<Response, PipelineError> {
    let status = response.status();
    if !status.is_success() {
        return Err(PipelineError::status(status));
    }
    Ok(response)
}
