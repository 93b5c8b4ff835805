use crate::errors::PipelineError;
use crate::models::{AnalysisFragment, DataFragment, DataRow, ResultPayload};

/// Splits a payload into its analysis and data fragments.
///
/// The analysis fragment is always produced. The data fragment fails with
/// `MalformedPayload` when the first dataset or its points are missing, so a
/// caller can still render the analysis on its own.
pub fn transform(
    payload: &ResultPayload,
) -> (AnalysisFragment, Result<DataFragment, PipelineError>) {
    (analysis_fragment(&payload.analyses.merged), data_fragment(payload))
}

pub fn analysis_fragment(merged: &str) -> AnalysisFragment {
    let lines = merged
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    AnalysisFragment { lines }
}

fn data_fragment(payload: &ResultPayload) -> Result<DataFragment, PipelineError> {
    let dataset = payload
        .datasets
        .first()
        .ok_or_else(|| PipelineError::MalformedPayload("datasets is empty".to_string()))?;
    let points = dataset.data.as_ref().ok_or_else(|| {
        PipelineError::MalformedPayload("datasets[0].data is missing".to_string())
    })?;

    let rows = points
        .iter()
        .map(|point| DataRow {
            year: point.year,
            value: point.value,
            display: point
                .value
                .map(format_grouped)
                .unwrap_or_else(|| "n/a".to_string()),
        })
        .collect();
    Ok(DataFragment { rows })
}

pub fn format_grouped(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        let symbol = if value > 0.0 { "∞" } else { "-∞" };
        return symbol.to_string();
    }

    let fixed = format!("{:.3}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, digit) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let negative = value < 0.0 && (int_part != "0" || !frac_part.is_empty());
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Analyses, DataPoint, Dataset};

    fn payload(merged: &str, datasets: Vec<Dataset>) -> ResultPayload {
        ResultPayload {
            analyses: Analyses {
                merged: merged.to_string(),
            },
            datasets,
        }
    }

    #[test]
    fn blank_lines_are_dropped_in_order() {
        let fragment = analysis_fragment("a\n\nb\n  \nc");
        assert_eq!(fragment.lines, vec!["a", "b", "c"]);
    }

    #[test]
    fn crlf_lines_are_trimmed() {
        let fragment = analysis_fragment("1. Growth\r\n  steady rise \r\n\r\n");
        assert_eq!(fragment.lines, vec!["1. Growth", "steady rise"]);
    }

    #[test]
    fn display_is_grouped_but_values_stay_numeric() {
        let payload = payload(
            "x",
            vec![Dataset {
                data: Some(vec![
                    DataPoint { year: 2020, value: Some(1000.0) },
                    DataPoint { year: 2021, value: Some(2000.0) },
                ]),
            }],
        );
        let (_, data) = transform(&payload);
        let data = data.unwrap();
        let displayed: Vec<_> = data.rows.iter().map(|row| row.display.as_str()).collect();
        assert_eq!(displayed, vec!["1,000", "2,000"]);
        let values: Vec<_> = data.rows.iter().map(|row| row.value).collect();
        assert_eq!(values, vec![Some(1000.0), Some(2000.0)]);
    }

    #[test]
    fn missing_dataset_still_yields_analysis() {
        let (analysis, data) = transform(&payload("first\nsecond", vec![]));
        assert_eq!(analysis.lines, vec!["first", "second"]);
        assert!(matches!(data, Err(PipelineError::MalformedPayload(_))));

        let (_, data) = transform(&payload("x", vec![Dataset { data: None }]));
        assert!(matches!(data, Err(PipelineError::MalformedPayload(_))));
    }

    #[test]
    fn null_values_render_as_not_available() {
        let payload = payload(
            "x",
            vec![Dataset {
                data: Some(vec![DataPoint { year: 1999, value: None }]),
            }],
        );
        let (_, data) = transform(&payload);
        let data = data.unwrap();
        let row = &data.rows[0];
        assert_eq!(row.display, "n/a");
        assert_eq!(row.value, None);
    }

    #[test]
    fn grouping_matches_en_us_locale() {
        assert_eq!(format_grouped(0.0), "0");
        assert_eq!(format_grouped(999.0), "999");
        assert_eq!(format_grouped(1000.0), "1,000");
        assert_eq!(format_grouped(1234567.0), "1,234,567");
        assert_eq!(format_grouped(-1234.5), "-1,234.5");
        assert_eq!(format_grouped(1.23456), "1.235");
        assert_eq!(format_grouped(0.1), "0.1");
        assert_eq!(format_grouped(-0.0001), "0");
        assert_eq!(format_grouped(f64::NAN), "NaN");
        assert_eq!(format_grouped(f64::NEG_INFINITY), "-∞");
    }
}
