use crate::errors::PipelineError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query(String);

impl Query {
    pub fn parse(raw: &str) -> Result<Self, PipelineError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PipelineError::Validation);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Serialize)]
pub struct QueryRequest<'a> {
    pub query: &'a str,
}

#[derive(Debug, Serialize)]
pub struct VisualizeRequest<'a> {
    pub merged_data: &'a Dataset,
}

// Strict shape: a streamed buffer only counts as a payload once `datasets` has arrived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultPayload {
    pub analyses: Analyses,
    pub datasets: Vec<Dataset>,
}

/// Whole-body response; a missing `datasets` key is left for `transform` to report.
#[derive(Debug, Deserialize)]
pub struct AtomicPayload {
    pub analyses: Analyses,
    #[serde(default)]
    pub datasets: Vec<Dataset>,
}

impl From<AtomicPayload> for ResultPayload {
    fn from(body: AtomicPayload) -> Self {
        Self {
            analyses: body.analyses,
            datasets: body.datasets,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analyses {
    pub merged: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<DataPoint>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub year: i32,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub years: Vec<i32>,
    pub values: Vec<Option<f64>>,
}

impl ChartSeries {
    pub fn points(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.years
            .iter()
            .zip(&self.values)
            .filter_map(|(year, value)| value.map(|value| (*year, value)))
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnalysisFragment {
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataRow {
    pub year: i32,
    pub value: Option<f64>,
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataFragment {
    pub rows: Vec<DataRow>,
}

impl From<&DataFragment> for ChartSeries {
    fn from(fragment: &DataFragment) -> Self {
        Self {
            years: fragment.rows.iter().map(|row| row.year).collect(),
            values: fragment.rows.iter().map(|row| row.value).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct ChartTypeRequest {
    pub chart_type: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewSnapshot {
    pub loading: bool,
    pub query: Option<String>,
    pub notice: Option<String>,
    pub analysis: Vec<String>,
    pub rows: Vec<SnapshotRow>,
    pub chart_type: Option<String>,
    pub chart_svg: Option<String>,
    pub updated_at: Option<String>,
    pub renders: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRow {
    pub year: i32,
    pub value: String,
}
