use chrono::Local;
use serde::Serialize;
use serde_json::{json, Value};
use crate::errors::DashboardError;
use crate::manager_data::Table;
use crate::maps::MAP_TILES;
use crate::models::chart_spec::{BarChartSpec, HeatmapSpec};
use crate::models::map_spec::{MarkerMap, TimeSeriesHeatMap};
use crate::models::prediction_input::{PredictionInput, PREDICTION_COLUMNS};
use crate::models::weather_record::MapFeature;
use crate::prediction::PredictionOutcome;
use crate::shell::{Page, Section, SectionBody, SIDEBAR_LAYOUT};

const CARTO_POSITRON_URL: &str = "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png";
const CARTO_ATTRIBUTION: &str = "&copy; OpenStreetMap contributors &copy; CARTO";

const MARKER_MAP_JS: &str = r#"(function () {
    var spec = __SPEC__;
    var map = L.map('__ID__').setView(spec.center, spec.zoom);
    L.tileLayer('__TILES_URL__', { attribution: '__ATTRIBUTION__' }).addTo(map);
    if (spec.control_scale) { L.control.scale().addTo(map); }
    spec.markers.forEach(function (m) {
        var icon = L.AwesomeMarkers.icon({ icon: m.icon.icon, prefix: m.icon.prefix, markerColor: m.icon.color });
        L.marker([m.lat, m.lng], { icon: icon }).bindTooltip(m.tooltip).addTo(map);
    });
})();"#;

const HEAT_MAP_JS: &str = r#"(function () {
    var spec = __SPEC__;
    var map = L.map('__ID__').setView(spec.center, spec.zoom);
    L.tileLayer('__TILES_URL__', { attribution: '__ATTRIBUTION__' }).addTo(map);
    var gradient = {};
    spec.gradient.forEach(function (g) { gradient[g[0]] = g[1]; });
    var layer = new HeatmapOverlay({
        radius: spec.radius, minOpacity: spec.min_opacity, maxOpacity: spec.max_opacity,
        scaleRadius: false, useLocalExtrema: spec.use_local_extrema, gradient: gradient,
        latField: 'lat', lngField: 'lng', valueField: 'weight'
    }).addTo(map);
    var slider = document.getElementById('__ID__-slider');
    var label = document.getElementById('__ID__-label');
    var play = document.getElementById('__ID__-play');
    function show(i) {
        var f = spec.frames[i];
        if (!f) { label.textContent = ''; return; }
        label.textContent = f.date;
        layer.setData({ min: f.min === null ? 0 : f.min, max: f.max === null ? 1 : f.max, data: f.points });
    }
    slider.max = Math.max(spec.frames.length - 1, 0);
    slider.addEventListener('input', function () { show(+slider.value); });
    var timer = null;
    play.addEventListener('click', function () {
        if (timer) { clearInterval(timer); timer = null; play.textContent = 'Play'; return; }
        play.textContent = 'Pause';
        timer = setInterval(function () {
            slider.value = (+slider.value + 1) % Math.max(spec.frames.length, 1);
            show(+slider.value);
        }, 1000);
    });
    show(0);
    if (spec.auto_play) { play.click(); }
})();"#;

const CSS: &str = r#"
body { margin: 0; font-family: -apple-system, "Segoe UI", Roboto, sans-serif; color: #262730; }
.layout { display: flex; min-height: 100vh; }
.sidebar { width: 260px; padding: 24px; background: #f0f2f6; }
.sidebar h3 { margin: 20px 0 8px; font-size: 15px; }
.sidebar label { display: block; margin: 4px 0; font-size: 14px; }
.main { flex: 1; padding: 24px 48px; max-width: 1100px; }
.placeholder { max-width: 100%; }
.chart, .map { width: 100%; height: 520px; }
table { border-collapse: collapse; font-size: 13px; margin: 12px 0; }
th, td { border: 1px solid #e6e9ef; padding: 4px 8px; text-align: right; }
th { background: #f8f9fb; }
.controls { margin: 8px 0; display: flex; gap: 12px; align-items: center; flex-wrap: wrap; }
.inputs { display: grid; grid-template-columns: repeat(3, 1fr); gap: 8px; }
.inputs label { font-size: 13px; }
footer { margin-top: 40px; font-size: 12px; color: #808495; }
"#;

/// Renders a page as a self contained HTML document
///
/// # Arguments
///
/// * 'page' - the page produced by a dashboard interaction
pub fn render_page(page: &Page) -> Result<String, DashboardError> {
    let placeholder = page.placeholder
        .as_ref()
        .map(|p| format!(r#"<img class="placeholder" src="{}" alt="Australian climate">"#, html_escape(&p.display().to_string())))
        .unwrap_or_default();

    let sections = page.sections
        .iter()
        .enumerate()
        .map(|(i, s)| render_section(&format!("section-{}", i), s))
        .collect::<Result<Vec<String>, DashboardError>>()?
        .join("\n");

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
    <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/Leaflet.awesome-markers/2.0.2/leaflet.awesome-markers.css">
    <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/font-awesome/4.7.0/css/font-awesome.min.css">
    <script src="https://cdn.plot.ly/plotly-2.35.2.min.js"></script>
    <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
    <script src="https://cdnjs.cloudflare.com/ajax/libs/Leaflet.awesome-markers/2.0.2/leaflet.awesome-markers.min.js"></script>
    <script src="https://cdn.jsdelivr.net/npm/heatmap.js@2.0.5/build/heatmap.min.js"></script>
    <script src="https://cdn.jsdelivr.net/npm/leaflet-heatmap@1.0.0/leaflet-heatmap.js"></script>
    <style>{css}</style>
</head>
<body>
<div class="layout">
    {sidebar}
    <main class="main">
        <h1>{title}</h1>
        {placeholder}
        {sections}
        <footer>Rendered {rendered} by rainview {version}</footer>
    </main>
</div>
</body>
</html>"#,
        title = html_escape(page.title),
        css = CSS,
        sidebar = render_sidebar(&page.sidebar.toggles()),
        placeholder = placeholder,
        sections = sections,
        rendered = Local::now().format("%Y-%m-%d %H:%M:%S"),
        version = env!("CARGO_PKG_VERSION"),
    ))
}

fn render_sidebar(toggles: &[bool; 8]) -> String {
    let mut t = toggles.iter();
    let groups: String = SIDEBAR_LAYOUT
        .iter()
        .map(|(header, labels)| {
            let boxes: String = labels
                .iter()
                .map(|l| {
                    let checked = if t.next().copied().unwrap_or(false) { " checked" } else { "" };
                    format!(r#"<label><input type="checkbox" disabled{}> {}</label>"#, checked, html_escape(l))
                })
                .collect();
            format!("<h3>{}:</h3>{}", html_escape(header), boxes)
        })
        .collect();

    format!(r#"<aside class="sidebar">{}</aside>"#, groups)
}

fn render_section(id: &str, section: &Section) -> Result<String, DashboardError> {
    let body = match &section.body {
        SectionBody::Table(table) => render_table(table),
        SectionBody::Correlation(heatmap) => plotly_div(id, &heatmap_figure(heatmap))?,
        SectionBody::Bar(chart) => plotly_div(id, &bar_figure(chart))?,
        SectionBody::Markers { date_options, date, features, map } =>
            render_marker_map(id, date_options, date, features, map)?,
        SectionBody::Timeseries(map) => render_heat_map(id, map)?,
        SectionBody::Prediction { input, outcome } => render_prediction(input, outcome),
    };

    Ok(format!(
        r#"<section id="{id}">
    <h2>{heading}</h2>
    {body}
</section>"#,
        id = id,
        heading = html_escape(&section.heading()),
        body = body,
    ))
}

fn render_table(table: &Table) -> String {
    let header: String = table.headers().iter().map(|h| format!("<th>{}</th>", html_escape(h))).collect();
    let rows: String = table.rows()
        .iter()
        .map(|r| {
            let cells: String = r.iter().map(|c| format!("<td>{}</td>", html_escape(c))).collect();
            format!("<tr>{}</tr>", cells)
        })
        .collect();

    format!("<table><thead><tr>{}</tr></thead><tbody>{}</tbody></table>", header, rows)
}

/// Returns a Plotly figure for a bar chart
pub fn bar_figure(chart: &BarChartSpec) -> Value {
    json!({
        "data": [{
            "type": "bar",
            "x": chart.categories,
            "y": chart.values,
            "marker": { "color": chart.color },
        }],
        "layout": {
            "xaxis": { "title": { "text": chart.category_label } },
            "yaxis": { "title": { "text": chart.value_label } },
            "showlegend": false,
        },
    })
}

/// Returns a Plotly figure for a masked correlation heatmap, masked cells are null
pub fn heatmap_figure(heatmap: &HeatmapSpec) -> Value {
    json!({
        "data": [{
            "type": "heatmap",
            "x": heatmap.columns,
            "y": heatmap.columns,
            "z": heatmap.masked_matrix(),
            "colorscale": heatmap.color_scale,
            "zmin": heatmap.vmin,
            "zmax": heatmap.vmax,
            "xgap": heatmap.line_width,
            "ygap": heatmap.line_width,
            "colorbar": { "len": heatmap.colorbar_shrink },
            "hoverongaps": false,
        }],
        "layout": {
            "width": 880,
            "height": 720,
            "xaxis": { "showgrid": false },
            "yaxis": { "autorange": "reversed", "showgrid": false, "scaleanchor": if heatmap.square { json!("x") } else { Value::Null } },
        },
    })
}

fn plotly_div(id: &str, figure: &Value) -> Result<String, DashboardError> {
    Ok(format!(
        r#"<div id="{id}-chart" class="chart"></div>
<script>(function () {{ var fig = {fig}; Plotly.newPlot('{id}-chart', fig.data, fig.layout); }})();</script>"#,
        id = id,
        fig = script_json(figure)?,
    ))
}

fn render_marker_map(id: &str, date_options: &[String], date: &Option<String>, features: &[MapFeature], map: &MarkerMap)
                     -> Result<String, DashboardError> {
    let dates: String = date_options
        .iter()
        .map(|d| {
            let selected = if Some(d) == date.as_ref() { " selected" } else { "" };
            format!(r#"<option{}>{}</option>"#, selected, html_escape(d))
        })
        .collect();
    let feature_options: String = MapFeature::ALL
        .iter()
        .map(|f| {
            let selected = if features.contains(f) { " selected" } else { "" };
            format!(r#"<option{}>{}</option>"#, selected, f)
        })
        .collect();

    let map_id = format!("{}-map", id);
    let script = fill_map_script(MARKER_MAP_JS, &map_id, &script_json(map)?, &map.tiles);

    Ok(format!(
        r#"<div class="controls">
    <label>Select date: <select disabled>{dates}</select></label>
    <label>Select Features: <select multiple disabled>{features}</select></label>
</div>
<div id="{map_id}" class="map"></div>
<script>{script}</script>"#,
        dates = dates,
        features = feature_options,
        map_id = map_id,
        script = script,
    ))
}

fn render_heat_map(id: &str, map: &TimeSeriesHeatMap) -> Result<String, DashboardError> {
    let map_id = format!("{}-map", id);
    let script = fill_map_script(HEAT_MAP_JS, &map_id, &script_json(map)?, &map.tiles);

    Ok(format!(
        r#"<div class="controls">
    <button id="{map_id}-play" type="button">Play</button>
    <input id="{map_id}-slider" type="range" min="0" max="0" value="0">
    <span id="{map_id}-label"></span>
</div>
<div id="{map_id}" class="map"></div>
<script>{script}</script>"#,
        map_id = map_id,
        script = script,
    ))
}

fn render_prediction(input: &PredictionInput, outcome: &PredictionOutcome) -> String {
    let inputs: String = input.fields()
        .iter()
        .map(|(c, v)| format!(r#"<label>{}<br><input type="text" value="{}" disabled></label>"#, c, html_escape(v)))
        .collect();
    let header: String = PREDICTION_COLUMNS.iter().map(|c| format!("<th>{}</th>", c)).collect();
    let values: String = outcome.row.features().iter().map(|v| format!("<td>{}</td>", v)).collect();

    format!(
        r#"<p>Predictions Based on Trained Random Forest Classifier Model</p>
<div class="inputs">{inputs}</div>
<table><thead><tr>{header}</tr></thead><tbody><tr>{values}</tr></tbody></table>
<h2>{headline}</h2>"#,
        inputs = inputs,
        header = header,
        values = values,
        headline = outcome.rain_tomorrow.headline(),
    )
}

fn fill_map_script(template: &str, map_id: &str, spec: &str, tiles: &str) -> String {
    let tiles_url = if tiles == MAP_TILES { CARTO_POSITRON_URL } else { "https://tile.openstreetmap.org/{z}/{x}/{y}.png" };
    template
        .replace("__SPEC__", spec)
        .replace("__ID__", map_id)
        .replace("__TILES_URL__", tiles_url)
        .replace("__ATTRIBUTION__", CARTO_ATTRIBUTION)
}

/// Serializes a value to JSON that is safe to embed in a script element
fn script_json<T: Serialize>(value: &T) -> Result<String, DashboardError> {
    let json = serde_json::to_string(value)?;
    Ok(json.replace("</", "<\\/"))
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
