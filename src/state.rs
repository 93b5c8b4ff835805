use crate::chart::SvgCanvas;
use crate::config::PipelineConfig;
use crate::errors::PipelineError;
use crate::models::ViewSnapshot;
use crate::pipeline::QueryResultPipeline;
use crate::renderer::ViewRenderer;
use std::sync::Arc;

pub type DashboardPipeline = QueryResultPipeline<ViewRenderer, SvgCanvas>;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<DashboardPipeline>,
}

impl AppState {
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        let pipeline = QueryResultPipeline::new(config, ViewRenderer::new(), SvgCanvas::new())?;
        Ok(Self {
            pipeline: Arc::new(pipeline),
        })
    }

    pub async fn snapshot(&self) -> ViewSnapshot {
        let mut view = self.pipeline.renderer().snapshot();
        let (chart_type, chart_svg) = self
            .pipeline
            .with_charts(|charts| {
                (
                    charts.chart_type().map(str::to_string),
                    charts.backend().current().map(|chart| chart.markup.clone()),
                )
            })
            .await;
        view.chart_type = chart_type;
        view.chart_svg = chart_svg;
        view
    }
}
