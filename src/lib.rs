pub mod accumulator;
pub mod app;
pub mod chart;
pub mod client;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod pipeline;
pub mod renderer;
pub mod state;
pub mod transform;
pub mod ui;

pub use app::router;
pub use config::{FetchMode, PipelineConfig, Settings};
pub use errors::PipelineError;
pub use pipeline::QueryResultPipeline;
pub use state::AppState;
