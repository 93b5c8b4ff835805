use crate::errors::{ChartError, PipelineError};
use crate::models::ChartSeries;
use crate::transform::format_grouped;
use std::collections::BTreeMap;
use tracing::debug;

/// The chart type is passed through untouched; unknown types fail in the backend.
pub trait ChartBackend: Send {
    type Handle: Send;

    fn create(&mut self, chart_type: &str, series: &ChartSeries)
    -> Result<Self::Handle, ChartError>;

    fn destroy(&mut self, handle: Self::Handle);
}

struct LiveChart<H> {
    chart_type: String,
    handle: H,
}

pub struct ChartRenderer<C: ChartBackend> {
    backend: C,
    live: Option<LiveChart<C::Handle>>,
    cached: Option<ChartSeries>,
}

impl<C: ChartBackend> ChartRenderer<C> {
    pub fn new(backend: C) -> Self {
        Self {
            backend,
            live: None,
            cached: None,
        }
    }

    pub fn backend(&self) -> &C {
        &self.backend
    }

    pub fn chart_type(&self) -> Option<&str> {
        self.live.as_ref().map(|live| live.chart_type.as_str())
    }

    pub fn cached(&self) -> Option<&ChartSeries> {
        self.cached.as_ref()
    }

    pub fn render(&mut self, series: &ChartSeries, chart_type: &str) -> Result<(), ChartError> {
        self.release();
        let handle = self.backend.create(chart_type, series)?;
        debug!(chart_type, points = series.years.len(), "chart created");
        self.live = Some(LiveChart {
            chart_type: chart_type.to_string(),
            handle,
        });
        Ok(())
    }

    pub fn show(&mut self, series: ChartSeries, chart_type: &str) -> Result<(), ChartError> {
        let result = self.render(&series, chart_type);
        self.cached = Some(series);
        result
    }

    pub fn switch_type(&mut self, chart_type: &str) -> Result<(), PipelineError> {
        let series = self.cached.take().ok_or(PipelineError::NoDataset)?;
        let result = self.render(&series, chart_type);
        self.cached = Some(series);
        result.map_err(PipelineError::from)
    }

    pub fn clear(&mut self) {
        self.release();
        self.cached = None;
    }

    fn release(&mut self) {
        if let Some(live) = self.live.take() {
            self.backend.destroy(live.handle);
            debug!(chart_type = %live.chart_type, "chart destroyed");
        }
    }
}

impl<C: ChartBackend> Drop for ChartRenderer<C> {
    fn drop(&mut self) {
        self.release();
    }
}

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 320.0;
const PAD: f64 = 40.0;

#[derive(Debug, Clone, PartialEq)]
pub struct SvgChart {
    pub chart_type: String,
    pub markup: String,
}

#[derive(Debug, Default)]
pub struct SvgCanvas {
    next_id: u64,
    live: BTreeMap<u64, SvgChart>,
}

impl SvgCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn current(&self) -> Option<&SvgChart> {
        self.live.values().next_back()
    }
}

impl ChartBackend for SvgCanvas {
    type Handle = u64;

    fn create(&mut self, chart_type: &str, series: &ChartSeries) -> Result<u64, ChartError> {
        let markup = match chart_type {
            "line" => line_svg(series)?,
            "bar" => bar_svg(series)?,
            other => return Err(ChartError::UnsupportedType(other.to_string())),
        };
        self.next_id += 1;
        self.live.insert(
            self.next_id,
            SvgChart {
                chart_type: chart_type.to_string(),
                markup,
            },
        );
        Ok(self.next_id)
    }

    fn destroy(&mut self, handle: u64) {
        self.live.remove(&handle);
    }
}

struct Frame {
    count: usize,
    min: f64,
    max: f64,
}

impl Frame {
    fn new(series: &ChartSeries, include_zero: bool) -> Result<Self, ChartError> {
        let mut values = series.points().map(|(_, value)| value).peekable();
        if values.peek().is_none() {
            return Err(ChartError::EmptySeries);
        }
        let (mut min, mut max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        if include_zero {
            min = min.min(0.0);
            max = max.max(0.0);
        }
        if (max - min).abs() < f64::EPSILON {
            max = min + 1.0;
        }
        Ok(Self {
            count: series.years.len(),
            min,
            max,
        })
    }

    fn slot_width(&self) -> f64 {
        (WIDTH - 2.0 * PAD) / self.count.max(1) as f64
    }

    fn x(&self, index: usize) -> f64 {
        PAD + self.slot_width() * (index as f64 + 0.5)
    }

    fn y(&self, value: f64) -> f64 {
        HEIGHT - PAD - (value - self.min) / (self.max - self.min) * (HEIGHT - 2.0 * PAD)
    }
}

fn open_svg(chart_type: &str, frame: &Frame, series: &ChartSeries) -> String {
    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" class="chart chart-{chart_type}" viewBox="0 0 {WIDTH} {HEIGHT}" role="img">"#
    );
    svg.push_str(&format!(
        r#"<line class="axis" x1="{PAD}" y1="{bottom}" x2="{right}" y2="{bottom}"/><line class="axis" x1="{PAD}" y1="{PAD}" x2="{PAD}" y2="{bottom}"/>"#,
        bottom = HEIGHT - PAD,
        right = WIDTH - PAD,
    ));
    svg.push_str(&format!(
        r#"<text class="tick" x="{x}" y="{y:.1}" text-anchor="end">{label}</text>"#,
        x = PAD - 4.0,
        y = frame.y(frame.max) + 4.0,
        label = format_grouped(frame.max),
    ));
    svg.push_str(&format!(
        r#"<text class="tick" x="{x}" y="{y:.1}" text-anchor="end">{label}</text>"#,
        x = PAD - 4.0,
        y = frame.y(frame.min) + 4.0,
        label = format_grouped(frame.min),
    ));
    for (index, year) in series.years.iter().enumerate() {
        svg.push_str(&format!(
            r#"<text class="tick" x="{x:.1}" y="{y}" text-anchor="middle">{year}</text>"#,
            x = frame.x(index),
            y = HEIGHT - PAD + 16.0,
        ));
    }
    svg
}

fn line_svg(series: &ChartSeries) -> Result<String, ChartError> {
    let frame = Frame::new(series, false)?;
    let mut svg = open_svg("line", &frame, series);

    // Gaps split the line into separate segments.
    let mut segments: Vec<Vec<(f64, f64)>> = vec![Vec::new()];
    for (index, value) in series.values.iter().enumerate() {
        match value {
            Some(value) => {
                if let Some(segment) = segments.last_mut() {
                    segment.push((frame.x(index), frame.y(*value)));
                }
            }
            None => segments.push(Vec::new()),
        }
    }
    for segment in segments.iter().filter(|segment| segment.len() > 1) {
        let points: Vec<String> = segment
            .iter()
            .map(|(x, y)| format!("{x:.1},{y:.1}"))
            .collect();
        svg.push_str(&format!(
            r#"<polyline class="series" fill="none" points="{}"/>"#,
            points.join(" ")
        ));
    }
    for (index, (year, value)) in series.years.iter().zip(&series.values).enumerate() {
        if let Some(value) = value {
            svg.push_str(&format!(
                r#"<circle class="point" cx="{x:.1}" cy="{y:.1}" r="3"><title>{year}: {label}</title></circle>"#,
                x = frame.x(index),
                y = frame.y(*value),
                label = format_grouped(*value),
            ));
        }
    }
    svg.push_str("</svg>");
    Ok(svg)
}

fn bar_svg(series: &ChartSeries) -> Result<String, ChartError> {
    let frame = Frame::new(series, true)?;
    let mut svg = open_svg("bar", &frame, series);
    let bar_width = frame.slot_width() * 0.7;
    let baseline = frame.y(0.0);

    for (index, (year, value)) in series.years.iter().zip(&series.values).enumerate() {
        let Some(value) = value else { continue };
        let top = frame.y(*value);
        svg.push_str(&format!(
            r#"<rect class="bar" x="{x:.1}" y="{y:.1}" width="{w:.1}" height="{h:.1}"><title>{year}: {label}</title></rect>"#,
            x = frame.x(index) - bar_width / 2.0,
            y = top.min(baseline),
            w = bar_width,
            h = (baseline - top).abs(),
            label = format_grouped(*value),
        ));
    }
    svg.push_str("</svg>");
    Ok(svg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> ChartSeries {
        ChartSeries {
            years: vec![2020, 2021, 2022],
            values: vec![Some(1000.0), None, Some(2500.0)],
        }
    }

    #[test]
    fn render_destroys_previous_instance_first() {
        let mut charts = ChartRenderer::new(SvgCanvas::new());
        charts.show(series(), "line").unwrap();
        assert_eq!(charts.backend().live_count(), 1);
        charts.switch_type("bar").unwrap();
        assert_eq!(charts.backend().live_count(), 1);
        assert_eq!(charts.chart_type(), Some("bar"));
        assert_eq!(charts.backend().current().unwrap().chart_type, "bar");
    }

    #[test]
    fn switch_without_dataset_is_rejected() {
        let mut charts = ChartRenderer::new(SvgCanvas::new());
        assert!(matches!(charts.switch_type("bar"), Err(PipelineError::NoDataset)));
    }

    #[test]
    fn unknown_type_fails_in_backend_and_keeps_cache() {
        let mut charts = ChartRenderer::new(SvgCanvas::new());
        charts.show(series(), "line").unwrap();
        let err = charts.switch_type("radar").unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Chart(ChartError::UnsupportedType(ref kind)) if kind == "radar"
        ));
        assert_eq!(charts.backend().live_count(), 0);
        assert!(charts.cached().is_some());
        charts.switch_type("line").unwrap();
        assert_eq!(charts.backend().live_count(), 1);
    }

    #[test]
    fn clear_releases_chart_and_cache() {
        let mut charts = ChartRenderer::new(SvgCanvas::new());
        charts.show(series(), "bar").unwrap();
        charts.clear();
        assert_eq!(charts.backend().live_count(), 0);
        assert!(charts.cached().is_none());
        assert!(charts.chart_type().is_none());
    }

    #[test]
    fn line_markup_skips_gaps() {
        let mut canvas = SvgCanvas::new();
        canvas.create("line", &series()).unwrap();
        let markup = &canvas.current().unwrap().markup;
        assert!(markup.starts_with("<svg"));
        assert_eq!(markup.matches("<circle").count(), 2);
        assert!(markup.contains("2020: 1,000"));
        assert!(!markup.contains("<polyline"));
    }

    #[test]
    fn bar_markup_has_one_rect_per_value() {
        let mut canvas = SvgCanvas::new();
        canvas.create("bar", &series()).unwrap();
        let markup = &canvas.current().unwrap().markup;
        assert_eq!(markup.matches("<rect").count(), 2);
        assert!(markup.contains("2022: 2,500"));
    }

    #[test]
    fn empty_series_is_an_error() {
        let mut canvas = SvgCanvas::new();
        let empty = ChartSeries {
            years: vec![2020],
            values: vec![None],
        };
        assert_eq!(canvas.create("line", &empty), Err(ChartError::EmptySeries));
    }
}
