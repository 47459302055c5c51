use std::collections::{BTreeMap, HashSet};
use chrono::NaiveDate;
use log::{debug, warn};
use crate::errors::MapError;
use crate::manager_data::{parse_number, Table};
use crate::models::map_spec::{HeatFrame, HeatPoint, Marker, MarkerIcon, MarkerMap, TimeSeriesHeatMap};
use crate::models::weather_record::{MapFeature, DATE, LAT, LNG, RAINFALL};

/// Continental centroid of Australia
pub const MAP_CENTER: [f64; 2] = [-28.0, 135.0];
pub const MAP_ZOOM: f64 = 4.3;
pub const MAP_TILES: &str = "CartoDB positron";

const HEAT_RADIUS: f64 = 10.0;
const HEAT_MIN_OPACITY: f64 = 0.5;
const HEAT_MAX_OPACITY: f64 = 0.8;
const HEAT_GRADIENT: [(f64, &str); 4] = [
    (0.2, "lightskyblue"),
    (0.4, "skyblue"),
    (0.6, "steelblue"),
    (1.0, "darkcyan"),
];

/// Returns the distinct dates of the map data in first seen order
///
/// # Arguments
///
/// * 'table' - the map dataset
pub fn date_options(table: &Table) -> Result<Vec<String>, MapError> {
    let date_idx = column(table, DATE)?;

    let mut seen: HashSet<&str> = HashSet::new();
    let mut dates: Vec<String> = Vec::new();
    for row in table.rows() {
        if seen.insert(row[date_idx].as_str()) {
            dates.push(row[date_idx].clone());
        }
    }

    Ok(dates)
}

/// Returns a snapshot map with one marker per row of the map data for the given date.
/// Each marker carries a tooltip listing the selected features in canonical order.
/// Without a date, i.e. when the map data has no dates to choose from, the map is empty.
///
/// # Arguments
///
/// * 'table' - the map dataset
/// * 'date' - the date to show, must exist in the map data when given
/// * 'features' - features to include in the marker tooltips
pub fn get_weather_map(table: &Table, date: Option<&str>, features: &[MapFeature]) -> Result<MarkerMap, MapError> {
    let date_idx = column(table, DATE)?;
    let lat_idx = column(table, LAT)?;
    let lng_idx = column(table, LNG)?;
    let feature_idx = MapFeature::ALL
        .iter()
        .filter(|f| features.contains(*f))
        .map(|f| column(table, f.column()).map(|idx| (*f, idx, column_format(table, idx))))
        .collect::<Result<Vec<(MapFeature, usize, ValueFormat)>, MapError>>()?;

    let Some(date) = date else {
        debug!("Snapshot map without date");
        return Ok(weather_map(Vec::new()));
    };

    let mut markers: Vec<Marker> = Vec::new();
    let mut date_found = false;
    for (i, row) in table.rows().iter().enumerate() {
        if row[date_idx] != date {
            continue;
        }
        date_found = true;

        markers.push(Marker {
            lat: coordinate(i, &row[lat_idx])?,
            lng: coordinate(i, &row[lng_idx])?,
            tooltip: build_tooltip(row, &feature_idx),
            icon: cloud_icon(),
        });
    }

    if !date_found {
        return Err(MapError::UnknownDate(date.to_string()));
    }
    debug!("Snapshot map for {} with {} markers", date, markers.len());

    Ok(weather_map(markers))
}

fn weather_map(markers: Vec<Marker>) -> MarkerMap {
    MarkerMap {
        center: MAP_CENTER,
        zoom: MAP_ZOOM,
        tiles: MAP_TILES.to_string(),
        control_scale: true,
        markers,
    }
}

/// How the values of a column print in a tooltip
#[derive(Clone, Copy, Debug, PartialEq)]
enum ValueFormat {
    Integer,
    Float,
}

/// Columns where every cell is an integer print as integers, all others as floats,
/// the way the dataset's column types print
fn column_format(table: &Table, index: usize) -> ValueFormat {
    if table.rows().iter().all(|r| r[index].trim().parse::<i64>().is_ok()) {
        ValueFormat::Integer
    } else {
        ValueFormat::Float
    }
}

/// Builds a marker tooltip, one "Field: value<br/>" line per feature
///
/// # Arguments
///
/// * 'row' - the map data row
/// * 'features' - features with their column index and format, in canonical order
fn build_tooltip(row: &[String], features: &[(MapFeature, usize, ValueFormat)]) -> String {
    features
        .iter()
        .map(|(f, idx, format)| format!("{}: {}<br/>", f, format_value(&row[*idx], *format)))
        .collect()
}

/// Formats a cell of a column. Integer columns print their values as is, float columns
/// print whole numbers with one decimal and missing values as nan. Non-numeric text is
/// kept as is.
fn format_value(cell: &str, format: ValueFormat) -> String {
    let trimmed = cell.trim();
    if format == ValueFormat::Integer {
        return trimmed.parse::<i64>().map(|v| v.to_string()).unwrap_or_else(|_| trimmed.to_string());
    }
    if trimmed.is_empty() {
        return "nan".to_string();
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_nan() => "nan".to_string(),
        Ok(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 => format!("{:.1}", v),
        Ok(v) => format!("{}", v),
        Err(_) => trimmed.to_string(),
    }
}

fn cloud_icon() -> MarkerIcon {
    MarkerIcon {
        color: "blue".to_string(),
        prefix: "fa".to_string(),
        icon: "cloud".to_string(),
    }
}

/// Returns a heatmap of rainfall animated over all dates of the map data.
///
/// Rainfall is summed per date and coordinate. Every date gets a frame, a date where
/// no row has a rainfall value gets an empty one.
///
/// # Arguments
///
/// * 'table' - the map dataset
/// * 'use_local_extrema' - scale each frame by its own extrema instead of those of all frames
pub fn get_rainfall_timeseries_map(table: &Table, use_local_extrema: bool) -> Result<TimeSeriesHeatMap, MapError> {
    let date_idx = column(table, DATE)?;
    let lat_idx = column(table, LAT)?;
    let lng_idx = column(table, LNG)?;
    let rain_idx = column(table, RAINFALL)?;

    let mut days: BTreeMap<NaiveDate, (String, Vec<HeatPoint>)> = BTreeMap::new();
    let mut skipped = 0;
    for (i, row) in table.rows().iter().enumerate() {
        let date = NaiveDate::parse_from_str(row[date_idx].trim(), "%Y-%m-%d")
            .map_err(|_| MapError::Date { row: i, value: row[date_idx].clone() })?;
        let lat = coordinate(i, &row[lat_idx])?;
        let lng = coordinate(i, &row[lng_idx])?;

        let day = days.entry(date).or_insert_with(|| (row[date_idx].trim().to_string(), Vec::new()));
        if let Some(weight) = parse_number(&row[rain_idx]) {
            day.1.push(HeatPoint { lat, lng, weight });
        } else {
            skipped += 1;
        }
    }
    if skipped > 0 {
        warn!("Skipped {} map rows without rainfall", skipped);
    }

    let mut frames = days
        .into_values()
        .map(|(date, points)| {
            let points = sum_by_coordinate(points);
            let (min, max) = extrema(&points);
            HeatFrame { date, points, min, max }
        })
        .collect::<Vec<HeatFrame>>();

    if !use_local_extrema {
        let all = frames.iter().flat_map(|f| f.points.iter().copied()).collect::<Vec<HeatPoint>>();
        let (min, max) = extrema(&all);
        for frame in frames.iter_mut() {
            frame.min = min;
            frame.max = max;
        }
    }
    debug!("Rainfall timeseries with {} frames", frames.len());

    Ok(TimeSeriesHeatMap {
        center: MAP_CENTER,
        zoom: MAP_ZOOM,
        tiles: MAP_TILES.to_string(),
        index: frames.iter().map(|f| f.date.clone()).collect(),
        frames,
        auto_play: false,
        radius: HEAT_RADIUS,
        gradient: HEAT_GRADIENT.iter().map(|(s, c)| (*s, c.to_string())).collect(),
        min_opacity: HEAT_MIN_OPACITY,
        max_opacity: HEAT_MAX_OPACITY,
        use_local_extrema,
    })
}

/// Sums the weights of points sharing a coordinate, result ordered by (lat, lng)
fn sum_by_coordinate(mut points: Vec<HeatPoint>) -> Vec<HeatPoint> {
    points.sort_by(|a, b| a.lat.total_cmp(&b.lat).then(a.lng.total_cmp(&b.lng)));

    let mut summed: Vec<HeatPoint> = Vec::with_capacity(points.len());
    for p in points {
        match summed.last_mut() {
            Some(last) if last.lat == p.lat && last.lng == p.lng => last.weight += p.weight,
            _ => summed.push(p),
        }
    }

    summed
}

fn extrema(points: &[HeatPoint]) -> (Option<f64>, Option<f64>) {
    points.iter().fold((None, None), |(min, max): (Option<f64>, Option<f64>), p| {
        (
            Some(min.map_or(p.weight, |m| m.min(p.weight))),
            Some(max.map_or(p.weight, |m| m.max(p.weight))),
        )
    })
}

fn column(table: &Table, name: &str) -> Result<usize, MapError> {
    table.column_index(name).ok_or_else(|| MapError::MissingColumn(name.to_string()))
}

fn coordinate(row: usize, cell: &str) -> Result<f64, MapError> {
    parse_number(cell)
        .filter(|v| v.is_finite())
        .ok_or_else(|| MapError::Coordinate { row, value: cell.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager_data::table_from;

    const MAP_CSV: &str = "\
Date,Location,MinTemp,MaxTemp,Rainfall,Evaporation,Sunshine,WindGustSpeed,WindSpeed9am,Humidity9am,Pressure9am,Cloud9am,Temp9am,lat,lng
2017-06-02,Albury,3,12.5,0.2,,,30,6,90,1020.4,8,5.1,-36.08,146.91
2017-06-01,Albury,4,13,0,1.2,,35,9,85,1018,7,6.5,-36.08,146.91
2017-06-01,Darwin,22.1,31.4,,6.8,10.2,41,13,62,1011.1,1,25.3,-12.46,130.84
2017-06-03,Darwin,21,30,,6,10,40,11,60,1011,2,24,-12.46,130.84
";

    #[test]
    fn date_options_are_distinct_in_first_seen_order() {
        let table = table_from(MAP_CSV);
        assert_eq!(date_options(&table).unwrap(), vec!["2017-06-02", "2017-06-01", "2017-06-03"]);
    }

    #[test]
    fn filters_markers_by_date() {
        let table = table_from(MAP_CSV);
        let map = get_weather_map(&table, Some("2017-06-01"), &[MapFeature::MinTemp]).unwrap();
        assert_eq!(map.markers.len(), 2);
        assert_eq!((map.markers[1].lat, map.markers[1].lng), (-12.46, 130.84));
        assert_eq!(map.center, [-28.0, 135.0]);
        assert_eq!(map.zoom, 4.3);
        assert!(map.markers.iter().all(|m| m.icon.color == "blue" && m.icon.icon == "cloud"));
    }

    #[test]
    fn tooltip_follows_canonical_order() {
        let table = table_from(MAP_CSV);
        let selected = [MapFeature::Temp9am, MapFeature::Rainfall, MapFeature::MinTemp];
        let map = get_weather_map(&table, Some("2017-06-01"), &selected).unwrap();
        assert_eq!(map.markers[0].tooltip, "MinTemp: 4.0<br/>Rainfall: 0.0<br/>Temp9am: 6.5<br/>");
        assert_eq!(map.markers[1].tooltip, "MinTemp: 22.1<br/>Rainfall: nan<br/>Temp9am: 25.3<br/>");
    }

    #[test]
    fn tooltip_has_one_line_per_feature_for_every_row() {
        let table = table_from(MAP_CSV);
        let mut selected = MapFeature::ALL.to_vec();
        selected.reverse();
        for date in date_options(&table).unwrap() {
            let map = get_weather_map(&table, Some(date.as_str()), &selected).unwrap();
            for marker in &map.markers {
                let lines = marker.tooltip.split("<br/>").filter(|l| !l.is_empty()).collect::<Vec<&str>>();
                assert_eq!(lines.len(), MapFeature::ALL.len());
                for (line, feature) in lines.iter().zip(MapFeature::ALL.iter()) {
                    assert!(line.starts_with(&format!("{}: ", feature)));
                }
            }
        }
    }

    #[test]
    fn empty_selection_gives_empty_tooltip() {
        let table = table_from(MAP_CSV);
        let map = get_weather_map(&table, Some("2017-06-03"), &[]).unwrap();
        assert_eq!(map.markers[0].tooltip, "");
    }

    #[test]
    fn unknown_date_is_error() {
        let table = table_from(MAP_CSV);
        assert!(matches!(get_weather_map(&table, Some("2018-01-01"), &[]), Err(MapError::UnknownDate(_))));
    }

    #[test]
    fn one_frame_per_date_in_chronological_order() {
        let table = table_from(MAP_CSV);
        let map = get_rainfall_timeseries_map(&table, true).unwrap();
        assert_eq!(map.index, vec!["2017-06-01", "2017-06-02", "2017-06-03"]);
        assert_eq!(map.frames.len(), 3);
        assert!(map.frames[2].points.is_empty());
        assert_eq!(map.frames[2].max, None);
        assert!(!map.auto_play);
        assert_eq!(map.radius, 10.0);
    }

    #[test]
    fn sums_duplicate_coordinates_per_date() {
        let table = table_from("Date,lat,lng,Rainfall\n2017-06-01,-30,150,1.5\n2017-06-01,-20,140,4\n2017-06-01,-30,150,2\n");
        let map = get_rainfall_timeseries_map(&table, true).unwrap();
        assert_eq!(
            map.frames[0].points,
            vec![
                HeatPoint { lat: -30.0, lng: 150.0, weight: 3.5 },
                HeatPoint { lat: -20.0, lng: 140.0, weight: 4.0 },
            ]
        );
    }

    #[test]
    fn extrema_are_local_per_frame() {
        let table = table_from("Date,lat,lng,Rainfall\n2017-06-01,-30,150,1\n2017-06-01,-20,140,4\n2017-06-02,-30,150,10\n");
        let local = get_rainfall_timeseries_map(&table, true).unwrap();
        assert_eq!((local.frames[0].min, local.frames[0].max), (Some(1.0), Some(4.0)));
        assert_eq!((local.frames[1].min, local.frames[1].max), (Some(10.0), Some(10.0)));

        let global = get_rainfall_timeseries_map(&table, false).unwrap();
        assert_eq!((global.frames[0].min, global.frames[0].max), (Some(1.0), Some(10.0)));
    }

    #[test]
    fn bad_coordinate_is_error() {
        let table = table_from("Date,lat,lng,Rainfall\n2017-06-01,north,150,1\n");
        assert!(matches!(get_rainfall_timeseries_map(&table, true), Err(MapError::Coordinate { row: 0, .. })));
    }

    #[test]
    fn formats_values_like_float_columns() {
        assert_eq!(format_value("13", ValueFormat::Float), "13.0");
        assert_eq!(format_value("0.6", ValueFormat::Float), "0.6");
        assert_eq!(format_value("", ValueFormat::Float), "nan");
        assert_eq!(format_value("-4", ValueFormat::Float), "-4.0");
        assert_eq!(format_value("-4", ValueFormat::Integer), "-4");
    }

    #[test]
    fn integer_column_prints_without_decimal() {
        let table = table_from("Date,WindGustSpeed,MinTemp,lat,lng\n2017-06-01,35,4,-30,150\n2017-06-02,41,,-30,150\n");
        let map = get_weather_map(&table, Some("2017-06-01"), &[MapFeature::WindGustSpeed, MapFeature::MinTemp]).unwrap();
        assert_eq!(map.markers[0].tooltip, "MinTemp: 4.0<br/>WindGustSpeed: 35<br/>");
    }

    #[test]
    fn no_date_gives_empty_map() {
        let table = table_from("Date,MinTemp,lat,lng\n");
        assert!(date_options(&table).unwrap().is_empty());
        let map = get_weather_map(&table, None, &[MapFeature::MinTemp]).unwrap();
        assert!(map.markers.is_empty());
        assert_eq!(map.zoom, 4.3);
        assert!(map.control_scale);
    }

    #[test]
    fn empty_date_selection_still_checks_columns() {
        let table = table_from("Date,lat,lng\n");
        assert!(matches!(get_weather_map(&table, None, &[MapFeature::Sunshine]), Err(MapError::MissingColumn(_))));
    }
}
