use serde::Serialize;

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct MarkerIcon {
    pub color: String,
    pub prefix: String,
    pub icon: String,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Marker {
    pub lat: f64,
    pub lng: f64,
    pub tooltip: String,
    pub icon: MarkerIcon,
}

/// Snapshot map with one marker per location for a single date
#[derive(Serialize, Clone, Debug)]
pub struct MarkerMap {
    pub center: [f64; 2],
    pub zoom: f64,
    pub tiles: String,
    pub control_scale: bool,
    pub markers: Vec<Marker>,
}

/// Weighted point of a heatmap frame
#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
pub struct HeatPoint {
    pub lat: f64,
    pub lng: f64,
    pub weight: f64,
}

/// One time step of the rainfall heatmap
#[derive(Serialize, Clone, Debug)]
pub struct HeatFrame {
    pub date: String,
    pub points: Vec<HeatPoint>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Heatmap animated over time, one frame per date in chronological order
#[derive(Serialize, Clone, Debug)]
pub struct TimeSeriesHeatMap {
    pub center: [f64; 2],
    pub zoom: f64,
    pub tiles: String,
    pub index: Vec<String>,
    pub frames: Vec<HeatFrame>,
    pub auto_play: bool,
    pub radius: f64,
    pub gradient: Vec<(f64, String)>,
    pub min_opacity: f64,
    pub max_opacity: f64,
    pub use_local_extrema: bool,
}
