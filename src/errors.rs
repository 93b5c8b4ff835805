use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("query must not be empty")]
    Validation,
    #[error("a submission is already in flight")]
    Busy,
    #[error("request failed: {message}")]
    RequestFailed {
        status: Option<u16>,
        message: String,
    },
    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
    #[error("no dataset has been fetched yet")]
    NoDataset,
    #[error(transparent)]
    Chart(#[from] ChartError),
}

impl PipelineError {
    pub fn request(err: reqwest::Error) -> Self {
        Self::RequestFailed {
            status: err.status().map(|status| status.as_u16()),
            message: err.to_string(),
        }
    }

    pub fn status(status: reqwest::StatusCode) -> Self {
        Self::RequestFailed {
            status: Some(status.as_u16()),
            message: format!("server responded with {status}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChartError {
    #[error("unsupported chart type: {0}")]
    UnsupportedType(String),
    #[error("dataset has no plottable values")]
    EmptySeries,
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        let status = match &err {
            PipelineError::Validation => StatusCode::BAD_REQUEST,
            PipelineError::Busy | PipelineError::NoDataset => StatusCode::CONFLICT,
            PipelineError::Chart(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PipelineError::RequestFailed { .. }
            | PipelineError::Decode(_)
            | PipelineError::MalformedPayload(_) => StatusCode::BAD_GATEWAY,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
