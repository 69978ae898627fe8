//! HTML Chart Renderer
//! Draws the bundle as an SVG line chart with plotters and wraps it in a
//! standalone HTML page.
//!
//! Layout:
//! 1. Title
//! 2. Legend: one clickable entry per region, toggles that region's line
//! 3. Chart: shared date axis, one line per region, hover tooltip with
//!    date, region and value at the nearest point

use crate::charts::bundle::ChartBundle;
use crate::charts::palette::{hex, ColorAssignment};
use chrono::NaiveDate;
use plotters::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("{0}")]
    Plot(String),
    #[error("no colour assigned to region '{0}'")]
    MissingColor(String),
    #[error("Failed to serialize chart data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to write page: {0}")]
    Io(#[from] std::io::Error),
}

/// Page title, figure size and axis captions.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub y_label: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            title: "Daily Cases in Switzerland".to_string(),
            width: 1000,
            height: 800,
            y_label: "Daily new cases".to_string(),
        }
    }
}

/// Pixel geometry of the drawn plot, used by the page script to map the
/// pointer back onto data points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotGeometry {
    pub width: u32,
    pub height: u32,
    /// x pixel of each date on the axis.
    pub xs: Vec<i32>,
    /// y pixels of `y_min` and `y_max`.
    pub y_bottom: i32,
    pub y_top: i32,
    pub y_min: f64,
    pub y_max: f64,
}

pub struct HtmlRenderer;

impl HtmlRenderer {
    /// Render the full page and write it to `path`.
    pub fn write(
        bundle: &ChartBundle,
        colors: &ColorAssignment,
        options: &RenderOptions,
        path: &Path,
    ) -> Result<PathBuf, RenderError> {
        let html = Self::render(bundle, colors, options)?;
        fs::write(path, html)?;
        info!(path = %path.display(), "wrote chart");
        Ok(path.to_path_buf())
    }

    /// Render the full page as a string.
    pub fn render(
        bundle: &ChartBundle,
        colors: &ColorAssignment,
        options: &RenderOptions,
    ) -> Result<String, RenderError> {
        let (svg, geometry) = Self::draw_svg(bundle, colors, options)?;
        Self::wrap_html(&options.title, &svg, bundle, colors, &geometry)
    }

    /// Draw one line per region onto an SVG canvas.
    ///
    /// Caption and axis labels need a system font. When none can be loaded
    /// the chart is drawn again with lines only; the page still carries the
    /// title, legend and tooltip.
    pub fn draw_svg(
        bundle: &ChartBundle,
        colors: &ColorAssignment,
        options: &RenderOptions,
    ) -> Result<(String, PlotGeometry), RenderError> {
        if bundle.is_empty() {
            return Err(RenderError::Plot("no dates to plot".to_string()));
        }
        match Self::draw_chart(bundle, colors, options, true) {
            Err(RenderError::Plot(e)) => {
                warn!(error = %e, "chart text unavailable, drawing lines only");
                Self::draw_chart(bundle, colors, options, false)
            }
            drawn => drawn,
        }
    }

    fn draw_chart(
        bundle: &ChartBundle,
        colors: &ColorAssignment,
        options: &RenderOptions,
        with_text: bool,
    ) -> Result<(String, PlotGeometry), RenderError> {
        let (first, last) = match (bundle.dates().first(), bundle.dates().last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return Err(RenderError::Plot("no dates to plot".to_string())),
        };
        // plotters needs a non-empty range
        let last = if last > first {
            last
        } else {
            first + chrono::Duration::days(1)
        };
        let (y_min, y_max) = Self::y_range(bundle);

        let mut svg = String::new();
        let geometry = {
            let root = SVGBackend::with_string(&mut svg, (options.width, options.height))
                .into_drawing_area();
            root.fill(&WHITE).map_err(plot_err)?;

            let mut builder = ChartBuilder::on(&root);
            builder
                .margin(20)
                .x_label_area_size(50)
                .y_label_area_size(60);
            if with_text {
                builder.caption(&options.title, ("sans-serif", 24));
            }
            let mut chart = builder
                .build_cartesian_2d(first..last, y_min..y_max)
                .map_err(plot_err)?;

            if with_text {
                chart
                    .configure_mesh()
                    .x_labels(12)
                    .y_labels(10)
                    .x_label_formatter(&|d: &NaiveDate| d.format("%Y-%m-%d").to_string())
                    .x_desc("Date")
                    .y_desc(options.y_label.as_str())
                    .draw()
                    .map_err(plot_err)?;
            }

            for (region, values) in bundle.iter() {
                let color = colors
                    .color_of(region)
                    .ok_or_else(|| RenderError::MissingColor(region.to_string()))?;
                let points = bundle.dates().iter().copied().zip(values.iter().copied());
                chart
                    .draw_series(LineSeries::new(points, color.stroke_width(2)))
                    .map_err(plot_err)?;
            }

            let xs = bundle
                .dates()
                .iter()
                .map(|d| chart.backend_coord(&(*d, y_min)).0)
                .collect();
            let geometry = PlotGeometry {
                width: options.width,
                height: options.height,
                xs,
                y_bottom: chart.backend_coord(&(first, y_min)).1,
                y_top: chart.backend_coord(&(first, y_max)).1,
                y_min,
                y_max,
            };

            root.present().map_err(plot_err)?;
            geometry
        };

        Ok((svg, geometry))
    }

    /// Value range with a little headroom; always includes zero.
    fn y_range(bundle: &ChartBundle) -> (f64, f64) {
        let min = bundle.min_value();
        let max = bundle.max_value();
        let pad = ((max - min) * 0.05).max(1.0);
        let y_min = if min < 0.0 { min - pad } else { 0.0 };
        (y_min, max + pad)
    }

    /// Embed an SVG chart, the data and the interaction script in one page.
    pub fn wrap_html(
        title: &str,
        svg: &str,
        bundle: &ChartBundle,
        colors: &ColorAssignment,
        geometry: &PlotGeometry,
    ) -> Result<String, RenderError> {
        let color_map: serde_json::Map<String, serde_json::Value> = colors
            .iter()
            .map(|(region, color)| (region.to_string(), hex(color).into()))
            .collect();
        let meta = serde_json::json!({
            "geometry": geometry,
            "colors": color_map,
        });
        let meta = serde_json::to_string(&meta)?;

        let legend: String = bundle
            .regions()
            .map(|region| {
                let color = colors.color_of(region).map(hex).unwrap_or_default();
                format!(
                    r#"<li class="item" data-region="{name}"><span class="swatch" style="background:{color}"></span>{name}</li>"#,
                    name = escape_html(region),
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        Ok(PAGE_TEMPLATE
            .replace("{{TITLE}}", &escape_html(title))
            .replace("{{LEGEND}}", &legend)
            .replace("{{SVG}}", svg)
            .replace("{{DATA}}", &script_safe(&bundle.to_json()?))
            .replace("{{META}}", &script_safe(&meta)))
    }
}

fn plot_err<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Plot(e.to_string())
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// JSON inside a `<script>` block must not close the block early.
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{{TITLE}}</title>
<style>
  html, body { margin: 0; height: 100%; font-family: sans-serif; }
  #wrap { display: flex; height: 100%; }
  #legend { list-style: none; margin: 0; padding: 12px; overflow-y: auto; min-width: 90px; }
  #legend .item { cursor: pointer; padding: 2px 4px; user-select: none; }
  #legend .item.off { opacity: 0.35; }
  #legend .swatch { display: inline-block; width: 12px; height: 12px; margin-right: 6px; }
  #chart { flex: 1; position: relative; }
  #chart svg { width: 100%; height: 100%; }
  #tooltip { position: absolute; display: none; pointer-events: none; background: #fff;
             border: 1px solid #999; padding: 4px 8px; font-size: 12px; white-space: nowrap; }
</style>
</head>
<body>
<div id="wrap">
<ul id="legend">
{{LEGEND}}
</ul>
<div id="chart">
{{SVG}}
<div id="tooltip"></div>
</div>
</div>
<script type="application/json" id="chart-data">{{DATA}}</script>
<script type="application/json" id="chart-meta">{{META}}</script>
<script>
(function () {
  var data = JSON.parse(document.getElementById('chart-data').textContent);
  var meta = JSON.parse(document.getElementById('chart-meta').textContent);
  var g = meta.geometry;
  var chart = document.getElementById('chart');
  var svg = chart.querySelector('svg');
  var tooltip = document.getElementById('tooltip');
  var hidden = {};

  svg.setAttribute('viewBox', '0 0 ' + g.width + ' ' + g.height);
  svg.setAttribute('preserveAspectRatio', 'none');

  function linesOf(region) {
    var want = meta.colors[region];
    return Array.prototype.filter.call(svg.querySelectorAll('polyline, path'), function (el) {
      return (el.getAttribute('stroke') || '').toUpperCase() === want;
    });
  }

  Array.prototype.forEach.call(document.querySelectorAll('#legend .item'), function (item) {
    item.addEventListener('click', function () {
      var region = item.getAttribute('data-region');
      hidden[region] = !hidden[region];
      item.classList.toggle('off', hidden[region]);
      linesOf(region).forEach(function (el) {
        el.style.display = hidden[region] ? 'none' : '';
      });
    });
  });

  function yPixel(v) {
    return g.y_bottom - (v - g.y_min) / (g.y_max - g.y_min) * (g.y_bottom - g.y_top);
  }

  svg.addEventListener('mousemove', function (ev) {
    var box = svg.getBoundingClientRect();
    var x = (ev.clientX - box.left) * g.width / box.width;
    var y = (ev.clientY - box.top) * g.height / box.height;
    var best = 0;
    for (var i = 1; i < g.xs.length; i++) {
      if (Math.abs(g.xs[i] - x) < Math.abs(g.xs[best] - x)) best = i;
    }
    var region = null, dist = Infinity;
    Object.keys(meta.colors).forEach(function (name) {
      if (hidden[name] || !data[name]) return;
      var d = Math.abs(yPixel(data[name][best]) - y);
      if (d < dist) { dist = d; region = name; }
    });
    if (region === null || Math.abs(g.xs[best] - x) > 20 || dist > 20) {
      tooltip.style.display = 'none';
      return;
    }
    tooltip.textContent = '';
    [['date', data.date[best]], ['region', region], ['cases', data[region][best].toFixed(2)]]
      .forEach(function (row) {
        var line = document.createElement('div');
        line.textContent = row[0] + ': ' + row[1];
        tooltip.appendChild(line);
      });
    tooltip.style.left = (ev.clientX - chart.getBoundingClientRect().left + 12) + 'px';
    tooltip.style.top = (ev.clientY - chart.getBoundingClientRect().top + 12) + 'px';
    tooltip.style.display = 'block';
  });

  svg.addEventListener('mouseleave', function () {
    tooltip.style.display = 'none';
  });
})();
</script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::palette::PALETTE;
    use indexmap::IndexMap;

    fn bundle() -> ChartBundle {
        let dates = (1..=3)
            .map(|d| NaiveDate::from_ymd_opt(2020, 3, d).unwrap())
            .collect();
        let mut series = IndexMap::new();
        series.insert("AG".to_string(), vec![1.0, 2.0, 3.0]);
        series.insert("Z<H>".to_string(), vec![0.5, 0.0, 4.0]);
        ChartBundle::new(dates, series).unwrap()
    }

    fn geometry() -> PlotGeometry {
        PlotGeometry {
            width: 1000,
            height: 800,
            xs: vec![80, 500, 960],
            y_bottom: 730,
            y_top: 60,
            y_min: 0.0,
            y_max: 5.0,
        }
    }

    #[test]
    fn page_embeds_svg_data_and_legend() {
        let bundle = bundle();
        let regions: Vec<&str> = bundle.regions().collect();
        let colors = ColorAssignment::new(&regions, &PALETTE).unwrap();

        let html =
            HtmlRenderer::wrap_html("Cases & more", "<svg></svg>", &bundle, &colors, &geometry())
                .unwrap();

        assert!(html.contains("<title>Cases &amp; more</title>"));
        assert!(html.contains("<svg></svg>"));
        assert!(html.contains(r#""date":["2020-03-01","2020-03-02","2020-03-03"]"#));
        assert!(html.contains(r#"data-region="AG""#));
        assert!(html.contains(r#"data-region="Z&lt;H&gt;""#));
        assert!(html.contains("#1F77B4"));
        assert!(html.contains(r#""xs":[80,500,960]"#));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn script_blocks_cannot_be_closed_by_data() {
        assert_eq!(script_safe(r#"{"a":"</script>"}"#), r#"{"a":"<\/script>"}"#);
    }

    #[test]
    fn y_range_includes_zero_and_negative_corrections() {
        let (lo, hi) = HtmlRenderer::y_range(&bundle());
        assert_eq!(lo, 0.0);
        assert!(hi > 4.0);

        let mut series = IndexMap::new();
        series.insert("AG".to_string(), vec![-2.0]);
        let dates = vec![NaiveDate::from_ymd_opt(2020, 3, 1).unwrap()];
        let (lo, _) = HtmlRenderer::y_range(&ChartBundle::new(dates, series).unwrap());
        assert!(lo < -2.0);
    }

    #[test]
    fn empty_bundle_cannot_be_drawn() {
        let bundle = ChartBundle::new(Vec::new(), IndexMap::new()).unwrap();
        let colors = ColorAssignment::new::<&str>(&[], &PALETTE).unwrap();
        let err = HtmlRenderer::draw_svg(&bundle, &colors, &RenderOptions::default()).unwrap_err();
        assert!(matches!(err, RenderError::Plot(_)));
    }

    /// Upper-cased `stroke` of every `<polyline>` in the document.
    fn polyline_strokes(svg: &str) -> Vec<String> {
        svg.split("<polyline")
            .skip(1)
            .filter_map(|tag| {
                let tag = &tag[..tag.find("/>").unwrap_or(tag.len())];
                let start = tag.find("stroke=\"")? + "stroke=\"".len();
                let end = start + tag[start..].find('"')?;
                Some(tag[start..end].to_uppercase())
            })
            .collect()
    }

    fn assert_one_line_per_region(svg: &str, bundle: &ChartBundle, colors: &ColorAssignment) {
        let strokes = polyline_strokes(svg);
        for region in bundle.regions() {
            let want = hex(colors.color_of(region).unwrap());
            assert_eq!(
                strokes.iter().filter(|s| **s == want).count(),
                1,
                "region {region} should have exactly one {want} line"
            );
        }
    }

    #[test]
    fn draws_one_line_per_region() {
        let bundle = bundle();
        let regions: Vec<&str> = bundle.regions().collect();
        let colors = ColorAssignment::new(&regions, &PALETTE).unwrap();

        let (svg, geometry) =
            HtmlRenderer::draw_svg(&bundle, &colors, &RenderOptions::default()).unwrap();

        assert!(svg.contains("<svg"));
        assert_one_line_per_region(&svg, &bundle, &colors);
        assert_eq!(geometry.xs.len(), bundle.len());
        assert!(geometry.xs.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(geometry.y_bottom > geometry.y_top);
    }

    #[test]
    fn lines_only_chart_needs_no_text() {
        let bundle = bundle();
        let regions: Vec<&str> = bundle.regions().collect();
        let colors = ColorAssignment::new(&regions, &PALETTE).unwrap();

        let (svg, geometry) =
            HtmlRenderer::draw_chart(&bundle, &colors, &RenderOptions::default(), false).unwrap();

        assert!(!svg.contains("<text"));
        assert_one_line_per_region(&svg, &bundle, &colors);
        assert_eq!(geometry.xs.len(), bundle.len());
    }

    #[test]
    fn region_without_colour_is_reported() {
        let bundle = bundle();
        let colors = ColorAssignment::new::<&str>(&["AG"], &PALETTE).unwrap();

        let err =
            HtmlRenderer::draw_chart(&bundle, &colors, &RenderOptions::default(), false).unwrap_err();
        assert!(matches!(err, RenderError::MissingColor(ref region) if region == "Z<H>"));
    }
}
