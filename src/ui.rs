use crate::models::{SnapshotRow, ViewSnapshot};

const CHART_TYPES: [&str; 2] = ["line", "bar"];

const EXAMPLE_QUERIES: [&str; 3] = [
    "GDP growth of Kenya since 2010",
    "Compare inflation in Brazil and Argentina",
    "Population of Japan over the last 20 years",
];

pub fn render_index(view: &ViewSnapshot) -> String {
    let refresh = if view.loading {
        r#"<meta http-equiv="refresh" content="1" />"#
    } else {
        ""
    };
    let notice = view
        .notice
        .as_deref()
        .map(|message| format!(r#"<p class="notice">{}</p>"#, escape_html(message)))
        .unwrap_or_default();
    let updated = view
        .updated_at
        .as_deref()
        .map(|at| format!("Last updated {}", escape_html(at)))
        .unwrap_or_default();
    let chart = view.chart_svg.as_deref().unwrap_or(
        r#"<p class="placeholder">Submit a query to draw a chart.</p>"#,
    );

    INDEX_HTML
        .replace("{{REFRESH}}", refresh)
        .replace("{{QUERY}}", &escape_html(view.query.as_deref().unwrap_or("")))
        .replace("{{LOADING}}", if view.loading { "loading" } else { "" })
        .replace("{{EXAMPLES}}", &example_list())
        .replace("{{NOTICE}}", &notice)
        .replace("{{ANALYSIS}}", &analysis_html(&view.analysis))
        .replace("{{DATA}}", &data_html(&view.rows))
        .replace("{{CHART_BUTTONS}}", &chart_buttons(view.chart_type.as_deref()))
        .replace("{{CHART}}", chart)
        .replace("{{UPDATED}}", &updated)
}

pub fn analysis_html(lines: &[String]) -> String {
    if lines.is_empty() {
        return String::new();
    }
    let mut html = String::from("<h3>Analysis Summary</h3><ul>");
    for line in lines {
        if is_numbered_heading(line) {
            html.push_str(r#"<li class="analysis-header">"#);
        } else {
            html.push_str("<li>");
        }
        html.push_str(&escape_html(line));
        html.push_str("</li>");
    }
    html.push_str("</ul>");
    html
}

pub fn data_html(rows: &[SnapshotRow]) -> String {
    if rows.is_empty() {
        return String::new();
    }
    let mut html =
        String::from("<h3>Data Points</h3><table><tr><th>Year</th><th>Value</th></tr>");
    for row in rows {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>",
            row.year,
            escape_html(&row.value)
        ));
    }
    html.push_str("</table>");
    html
}

fn chart_buttons(active: Option<&str>) -> String {
    CHART_TYPES
        .iter()
        .map(|kind| {
            let class = if Some(*kind) == active { " active" } else { "" };
            format!(
                r#"<form method="post" action="/chart/{kind}"><button class="chart-btn{class}" type="submit">{kind}</button></form>"#
            )
        })
        .collect()
}

fn example_list() -> String {
    let items: String = EXAMPLE_QUERIES
        .iter()
        .map(|query| {
            let query = escape_html(query);
            format!(
                r#"<li><form method="post" action="/query"><input type="hidden" name="query" value="{query}" /><button class="example" type="submit">{query}</button></form></li>"#
            )
        })
        .collect();
    format!(r#"<ul class="examples">{items}</ul>"#)
}

fn is_numbered_heading(line: &str) -> bool {
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    digits > 0 && line[digits..].starts_with('.')
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  {{REFRESH}}
  <title>Economic Data Analysis</title>
  <style>
    :root {
      --bg: #f4f6f8;
      --ink: #1f2a36;
      --muted: #6b7785;
      --accent: #2563eb;
      --card: #ffffff;
      --shadow: 0 18px 40px rgba(31, 42, 54, 0.12);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Inter", "Segoe UI", sans-serif;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(1080px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 24px;
    }

    h1 {
      margin: 0;
      font-size: clamp(1.8rem, 3.5vw, 2.4rem);
    }

    .card {
      background: var(--card);
      border-radius: 18px;
      box-shadow: var(--shadow);
      padding: 24px;
    }

    #query-form {
      display: flex;
      gap: 12px;
    }

    #query {
      flex: 1;
      padding: 14px 16px;
      border-radius: 12px;
      border: 1px solid #d5dbe1;
      font-size: 1rem;
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 12px 20px;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent);
      color: white;
    }

    .spinner {
      display: none;
      width: 28px;
      height: 28px;
      border: 3px solid #d5dbe1;
      border-top-color: var(--accent);
      border-radius: 50%;
      animation: spin 900ms linear infinite;
    }

    .loading .spinner {
      display: block;
    }

    .notice {
      margin: 0;
      padding: 12px 16px;
      border-radius: 12px;
      background: #fdecec;
      color: #9b1c1c;
    }

    .results {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(320px, 1fr));
      gap: 24px;
    }

    .analysis-header {
      list-style: none;
      font-weight: 600;
      margin-top: 12px;
    }

    table {
      width: 100%;
      border-collapse: collapse;
    }

    th,
    td {
      text-align: left;
      padding: 6px 8px;
      border-bottom: 1px solid #edf0f3;
    }

    .examples {
      display: flex;
      flex-wrap: wrap;
      gap: 8px;
      margin: 14px 0 0;
      padding: 0;
      list-style: none;
    }

    .examples .example {
      padding: 8px 14px;
      font-weight: 500;
      background: #e5ebf5;
      color: var(--ink);
    }

    .chart-buttons {
      display: flex;
      gap: 8px;
      margin-bottom: 12px;
    }

    .chart-btn {
      background: #e5ebf5;
      color: var(--ink);
    }

    .chart-btn.active {
      background: var(--accent);
      color: white;
    }

    .chart .axis {
      stroke: #9aa5b1;
    }

    .chart .series {
      stroke: var(--accent);
      stroke-width: 2;
    }

    .chart .point,
    .chart .bar {
      fill: var(--accent);
    }

    .chart .tick {
      font-size: 11px;
      fill: var(--muted);
    }

    .placeholder,
    .updated {
      color: var(--muted);
    }

    @keyframes spin {
      to {
        transform: rotate(360deg);
      }
    }
  </style>
</head>
<body>
  <main class="app {{LOADING}}">
    <header>
      <h1>Economic Data Analysis</h1>
      <p class="updated">{{UPDATED}}</p>
    </header>

    <section class="card">
      <form id="query-form" method="post" action="/query">
        <input id="query" name="query" type="text" value="{{QUERY}}" placeholder="e.g. GDP growth of Kenya since 2010" />
        <button id="submitQuery" type="submit">Analyze</button>
        <div class="spinner" id="loadingIndicator"></div>
      </form>
      {{EXAMPLES}}
    </section>

    {{NOTICE}}

    <section class="results">
      <div class="card" id="aiAnalysis">{{ANALYSIS}}</div>
      <div class="card" id="rawData">{{DATA}}</div>
    </section>

    <section class="card">
      <div class="chart-buttons">{{CHART_BUTTONS}}</div>
      <div id="chartContainer">{{CHART}}</div>
    </section>
  </main>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_escapes_and_marks_headings() {
        let html = analysis_html(&[
            "1. Growth".to_string(),
            "GDP <rose> & fell".to_string(),
            "2021 was flat".to_string(),
        ]);
        assert!(html.contains(r#"<li class="analysis-header">1. Growth</li>"#));
        assert!(html.contains("<li>GDP &lt;rose&gt; &amp; fell</li>"));
        assert!(html.contains("<li>2021 was flat</li>"));
    }

    #[test]
    fn data_table_uses_display_values() {
        let html = data_html(&[SnapshotRow {
            year: 2020,
            value: "1,000".to_string(),
        }]);
        assert!(html.contains("<tr><td>2020</td><td>1,000</td></tr>"));
    }

    #[test]
    fn index_marks_active_chart_and_loading() {
        let view = ViewSnapshot {
            loading: true,
            query: Some("\"gdp\"".to_string()),
            chart_type: Some("bar".to_string()),
            chart_svg: Some("<svg></svg>".to_string()),
            ..ViewSnapshot::default()
        };
        let html = render_index(&view);
        assert!(html.contains(r#"class="chart-btn active" type="submit">bar"#));
        assert!(html.contains(r#"class="chart-btn" type="submit">line"#));
        assert!(html.contains(r#"<main class="app loading">"#));
        assert!(html.contains(r#"http-equiv="refresh""#));
        assert!(html.contains(r#"value="&quot;gdp&quot;""#));
        assert!(html.contains("<svg></svg>"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn example_queries_post_to_the_query_route() {
        let html = render_index(&ViewSnapshot::default());
        assert!(html.contains(r#"<ul class="examples">"#));
        assert_eq!(
            html.matches(r#"<input type="hidden" name="query""#).count(),
            EXAMPLE_QUERIES.len()
        );
        assert!(html.contains(
            r#"value="GDP growth of Kenya since 2010" /><button class="example" type="submit">GDP growth of Kenya since 2010</button>"#
        ));
    }
}
