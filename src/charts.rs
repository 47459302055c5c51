use std::collections::BTreeMap;
use log::debug;
use crate::errors::ChartError;
use crate::manager_data::{parse_number, Table};
use crate::models::chart_spec::{BarChartSpec, HeatmapCell, HeatmapSpec};
use crate::models::weather_record::{LOCATION, MAX_TEMP, MIN_TEMP, RAINFALL};

const CATEGORY_LABEL: &str = "Location Names";

/// Diverging blue to red scale, symmetric around its midpoint
const DIVERGING_SCALE: [(f64, [u8; 3]); 5] = [
    (0.0, [0x3f, 0x7f, 0x9e]),
    (0.25, [0x9d, 0xbc, 0xcf]),
    (0.5, [0xf2, 0xf2, 0xf2]),
    (0.75, [0xe0, 0xa3, 0x8f]),
    (1.0, [0xc4, 0x51, 0x3a]),
];

/// Color scale upper bound, correlations above are saturated
const CORR_VMAX: f64 = 0.3;

/// Returns a bar chart of mean max temperature per location, ascending
///
/// # Arguments
///
/// * 'table' - the weather dataset
pub fn get_max_temp_bar_chart(table: &Table) -> Result<BarChartSpec, ChartError> {
    grouped_mean_chart(table, MAX_TEMP, "Maximum Temperature °C", "lightcoral")
}

/// Returns a bar chart of mean min temperature per location, ascending
///
/// # Arguments
///
/// * 'table' - the weather dataset
pub fn get_min_temp_bar_chart(table: &Table) -> Result<BarChartSpec, ChartError> {
    grouped_mean_chart(table, MIN_TEMP, "Minimum Temperature °C", "lightslategray")
}

/// Returns a bar chart of mean rainfall per location, ascending
///
/// # Arguments
///
/// * 'table' - the weather dataset
pub fn get_rain_bar_chart(table: &Table) -> Result<BarChartSpec, ChartError> {
    grouped_mean_chart(table, RAINFALL, "Amount of Rainfall", "skyblue")
}

fn grouped_mean_chart(table: &Table, column: &str, value_label: &str, color: &str) -> Result<BarChartSpec, ChartError> {
    let means = grouped_mean(table, LOCATION, column)?;
    debug!("Grouped mean of {} over {} locations", column, means.len());

    let (categories, values): (Vec<String>, Vec<f64>) = means.into_iter().unzip();

    Ok(BarChartSpec {
        categories,
        values,
        category_label: CATEGORY_LABEL.to_string(),
        value_label: value_label.to_string(),
        color: color.to_string(),
    })
}

/// Groups rows by one column and returns the arithmetic mean of another column per group,
/// sorted ascending by mean. Missing values are skipped and groups without any value
/// are left out. Equal means keep group name order.
///
/// # Arguments
///
/// * 'table' - the table to aggregate
/// * 'group_column' - name of the column to group by
/// * 'value_column' - name of the column to average
pub fn grouped_mean(table: &Table, group_column: &str, value_column: &str) -> Result<Vec<(String, f64)>, ChartError> {
    let group_idx = table.column_index(group_column)
        .ok_or_else(|| ChartError::MissingColumn(group_column.to_string()))?;
    let value_idx = table.column_index(value_column)
        .ok_or_else(|| ChartError::MissingColumn(value_column.to_string()))?;

    let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for row in table.rows() {
        if let Some(v) = parse_number(&row[value_idx]) {
            let entry = groups.entry(row[group_idx].as_str()).or_insert((0.0, 0));
            entry.0 += v;
            entry.1 += 1;
        }
    }

    let mut means = groups
        .into_iter()
        .map(|(g, (sum, count))| (g.to_string(), sum / count as f64))
        .collect::<Vec<(String, f64)>>();
    means.sort_by(|a, b| a.1.total_cmp(&b.1));

    Ok(means)
}

/// Returns a correlation heatmap over all numeric columns of the table with the upper
/// triangle, diagonal included, masked out.
///
/// The color range runs from the lowest drawn correlation up to a fixed upper bound.
/// Colors are taken from the diverging scale spread symmetrically around zero, so zero
/// keeps the scale's midpoint color whatever the range.
///
/// # Arguments
///
/// * 'table' - the weather dataset
pub fn get_corr_heatmap(table: &Table) -> Result<HeatmapSpec, ChartError> {
    let (columns, matrix) = correlation_matrix(table);
    debug!("Correlation matrix over {} numeric columns", columns.len());

    let mut cells: Vec<HeatmapCell> = Vec::new();
    for (row, values) in matrix.iter().enumerate() {
        for (col, value) in values.iter().enumerate().take(row) {
            cells.push(HeatmapCell { row, col, value: *value });
        }
    }

    let vmin = cells
        .iter()
        .filter_map(|c| c.value)
        .fold(None, |min: Option<f64>, v| Some(min.map_or(v, |m| m.min(v))))
        .filter(|v| *v < CORR_VMAX)
        .unwrap_or(-CORR_VMAX);

    Ok(HeatmapSpec {
        columns,
        matrix,
        cells,
        color_scale: centered_scale(vmin, CORR_VMAX, 0.0),
        center: 0.0,
        vmin,
        vmax: CORR_VMAX,
        square: true,
        line_width: 0.5,
        colorbar_shrink: 0.5,
    })
}

/// Returns the diverging scale cut to the range vmin to vmax, where the full scale spans
/// the symmetric range around center that covers both bounds
///
/// # Arguments
///
/// * 'vmin' - lower bound of the color range
/// * 'vmax' - upper bound of the color range
/// * 'center' - value that maps to the scale's midpoint
fn centered_scale(vmin: f64, vmax: f64, center: f64) -> Vec<(f64, String)> {
    let half = (center - vmin).max(vmax - center);
    let lo = (vmin - (center - half)) / (2.0 * half);
    let hi = (vmax - (center - half)) / (2.0 * half);

    let mut scale = vec![(0.0, color_at(lo))];
    for (s, rgb) in DIVERGING_SCALE.iter().filter(|(s, _)| *s > lo && *s < hi) {
        scale.push(((s - lo) / (hi - lo), hex(*rgb)));
    }
    scale.push((1.0, color_at(hi)));

    scale
}

/// Interpolates the diverging scale at a position between 0 and 1
fn color_at(position: f64) -> String {
    let position = position.clamp(0.0, 1.0);
    for pair in DIVERGING_SCALE.windows(2) {
        let ((s0, c0), (s1, c1)) = (pair[0], pair[1]);
        if position <= s1 {
            let t = (position - s0) / (s1 - s0);
            let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
            return hex([mix(c0[0], c1[0]), mix(c0[1], c1[1]), mix(c0[2], c1[2])]);
        }
    }

    hex(DIVERGING_SCALE[DIVERGING_SCALE.len() - 1].1)
}

fn hex(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

/// Computes the pairwise Pearson correlation matrix of the numeric columns.
///
/// Each pair uses the rows where both values are present. Undefined correlations are None.
///
/// # Arguments
///
/// * 'table' - the table to correlate
pub fn correlation_matrix(table: &Table) -> (Vec<String>, Vec<Vec<Option<f64>>>) {
    let indices = table.numeric_columns();
    let columns = indices.iter().map(|&i| table.headers()[i].clone()).collect::<Vec<String>>();
    let values = indices.iter().map(|&i| table.numeric_column(i)).collect::<Vec<Vec<Option<f64>>>>();

    let n = indices.len();
    let mut matrix: Vec<Vec<Option<f64>>> = vec![vec![None; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let r = if i == j {
                pearson(&values[i], &values[i]).map(|_| 1.0)
            } else {
                pearson(&values[i], &values[j])
            };
            matrix[i][j] = r;
            matrix[j][i] = r;
        }
    }

    (columns, matrix)
}

/// Pearson correlation over pairwise complete observations
fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let pairs = xs.iter().zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect::<Vec<(f64, f64)>>();

    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        None
    } else {
        Some((cov / (var_x * var_y).sqrt()).clamp(-1.0, 1.0))
    }
}
