/// Inline SVG line charts, one per denomination, three per row.

use chrono::{DateTime, Utc};
use std::fmt::Write;

use super::html_escape;
use crate::series::{CumulativeSeries, PRIMARY_DENOM};

pub const CHARTS_PER_ROW: usize = 3;

const WIDTH: f64 = 280.0;
const HEIGHT: f64 = 220.0;
const MARGIN_LEFT: f64 = 52.0;
const MARGIN_RIGHT: f64 = 12.0;
const MARGIN_TOP: f64 = 34.0;
const MARGIN_BOTTOM: f64 = 40.0;

pub fn line_color(denom: &str) -> &'static str {
    if denom == PRIMARY_DENOM {
        "orange"
    } else {
        "steelblue"
    }
}

/// Charts for every displayable denomination of `series`, or `None` when
/// there is nothing to draw.
pub fn render_chart_grid(series: &CumulativeSeries) -> Option<String> {
    let charts: Vec<String> = series
        .display_denoms()
        .iter()
        .filter_map(|denom| render_line_chart(denom, &series.denom_series(denom)))
        .collect();

    if charts.is_empty() {
        return None;
    }

    let mut html = String::from(r#"<div class="chart-grid">"#);
    for row in charts.chunks(CHARTS_PER_ROW) {
        html.push_str(r#"<div class="chart-row">"#);
        for chart in row {
            html.push_str(chart);
        }
        html.push_str("</div>");
    }
    html.push_str("</div>");
    Some(html)
}

/// One `<svg>` chart of `points`; `None` for an empty series.
pub fn render_line_chart(denom: &str, points: &[(DateTime<Utc>, f64)]) -> Option<String> {
    let first = points.first()?;
    let last = points.last()?;

    let t_min = first.0.timestamp() as f64;
    let t_span = (last.0.timestamp() as f64 - t_min).max(0.0);
    let y_max = points.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    let y_span = if y_max > 0.0 { y_max } else { 1.0 };

    let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;

    let x_of = |ts: &DateTime<Utc>| {
        if t_span == 0.0 {
            MARGIN_LEFT + plot_w / 2.0
        } else {
            MARGIN_LEFT + (ts.timestamp() as f64 - t_min) / t_span * plot_w
        }
    };
    let y_of = |v: f64| MARGIN_TOP + plot_h - v / y_span * plot_h;

    let mut polyline = String::new();
    for (ts, value) in points {
        let _ = write!(polyline, "{:.1},{:.1} ", x_of(ts), y_of(*value));
    }

    let title = html_escape(&format!("{} (summed)", denom));
    let color = line_color(denom);
    let axis_bottom = MARGIN_TOP + plot_h;

    Some(format!(
        r##"<svg class="chart" xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" role="img" aria-label="{title}">
<title>{title}</title>
<text x="{cx}" y="20" text-anchor="middle" font-size="16">{title}</text>
<line x1="{l}" y1="{t}" x2="{l}" y2="{b}" stroke="#999"/>
<line x1="{l}" y1="{b}" x2="{r}" y2="{b}" stroke="#999"/>
<text x="{yl}" y="{t}" text-anchor="end" font-size="10">{y_label}</text>
<text x="{yl}" y="{b}" text-anchor="end" font-size="10">0</text>
<text x="{l}" y="{xl}" font-size="10">{start}</text>
<text x="{r}" y="{xl}" text-anchor="end" font-size="10">{end}</text>
<polyline fill="none" stroke="{color}" stroke-width="2" points="{points}"/>
</svg>"##,
        w = WIDTH,
        h = HEIGHT,
        title = title,
        cx = WIDTH / 2.0,
        l = MARGIN_LEFT,
        r = WIDTH - MARGIN_RIGHT,
        t = MARGIN_TOP,
        b = axis_bottom,
        yl = MARGIN_LEFT - 4.0,
        xl = axis_bottom + 16.0,
        y_label = format_axis_value(y_max),
        start = first.0.format("%Y-%m-%d"),
        end = last.0.format("%Y-%m-%d"),
        color = color,
        points = polyline.trim_end(),
    ))
}

fn format_axis_value(value: f64) -> String {
    if value >= 1000.0 {
        format!("{:.0}", value)
    } else if value >= 1.0 {
        format!("{:.2}", value)
    } else {
        format!("{:.4}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::ClaimBuckets;

    fn ts(day: u32) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(&format!("2023-03-{:02}T00:00:00Z", day))
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_empty_series_has_no_chart() {
        assert!(render_chart_grid(&CumulativeSeries::default()).is_none());
        assert!(render_line_chart("har", &[]).is_none());
    }

    #[test]
    fn test_dust_only_series_has_no_chart() {
        let mut buckets = ClaimBuckets::new();
        buckets.add(ts(1), "har", 0.0001);
        assert!(render_chart_grid(&CumulativeSeries::from_buckets(&buckets)).is_none());
    }

    #[test]
    fn test_grid_rows_and_colors() {
        let mut buckets = ClaimBuckets::new();
        for (i, denom) in ["luna", "har", "sCOR", "ord"].iter().enumerate() {
            buckets.add(ts(i as u32 + 1), denom, 1.5);
        }
        let html = render_chart_grid(&CumulativeSeries::from_buckets(&buckets)).unwrap();

        assert_eq!(html.matches("<svg").count(), 4);
        assert_eq!(html.matches(r#"class="chart-row""#).count(), 2);
        assert!(html.contains("luna (summed)"));
        assert_eq!(html.matches(r#"stroke="orange""#).count(), 1);
        assert_eq!(html.matches(r#"stroke="steelblue""#).count(), 3);
        // luna is charted first
        assert!(html.find("luna (summed)").unwrap() < html.find("har (summed)").unwrap());
    }

    #[test]
    fn test_single_point_chart_is_centered() {
        let svg = render_line_chart("har", &[(ts(1), 2.0)]).unwrap();
        assert!(svg.contains("points=\"160.0,34.0\""));
        assert!(svg.contains("2023-03-01"));
    }
}
