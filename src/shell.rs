use std::path::PathBuf;
use log::info;
use crate::charts::{get_corr_heatmap, get_max_temp_bar_chart, get_min_temp_bar_chart, get_rain_bar_chart};
use crate::config::{Config, Files, HeatmapParameters, Sidebar, SnapshotMap};
use crate::errors::DashboardError;
use crate::manager_data::{Table, TableCache};
use crate::manager_model::{ModelFile, ModelSource};
use crate::maps::{date_options, get_rainfall_timeseries_map, get_weather_map};
use crate::models::chart_spec::{BarChartSpec, HeatmapSpec};
use crate::models::map_spec::{MarkerMap, TimeSeriesHeatMap};
use crate::models::prediction_input::PredictionInput;
use crate::models::weather_record::MapFeature;
use crate::prediction::{get_prediction, PredictionOutcome};

pub const PAGE_TITLE: &str = "Australia Rain Prediction";

/// Number of rows shown by the dataset section
const HEAD_ROWS: usize = 5;

/// Sidebar headers with the label of each toggle under them
pub const SIDEBAR_LAYOUT: [(&str, &[&str]); 4] = [
    ("Dataset", &["Show Data", "Show Feature Correlations"]),
    ("Features", &["Show Max Temperature", "Show Min Temperature", "Show Rainfall"]),
    ("Maps", &["Show Temp Map", "Show Rainfall Timeseries Map"]),
    ("Rainfall Prediction", &["Predict"]),
];

impl Sidebar {
    /// Returns the toggle states in sidebar layout order
    pub fn toggles(&self) -> [bool; 8] {
        [
            self.show_data,
            self.show_correlations,
            self.show_max_temp,
            self.show_min_temp,
            self.show_rainfall,
            self.show_temp_map,
            self.show_rainfall_timeseries_map,
            self.predict,
        ]
    }
}

/// Everything the user has entered for one interaction with the dashboard
#[derive(Clone, Debug, Default)]
pub struct Interaction {
    pub sidebar: Sidebar,
    pub snapshot_map: SnapshotMap,
    pub heatmap: HeatmapParameters,
    pub prediction: PredictionInput,
}

impl Interaction {
    /// Returns the interaction described by the configuration
    ///
    /// # Arguments
    ///
    /// * 'config' - the loaded configuration
    pub fn from_config(config: &Config) -> Interaction {
        Interaction {
            sidebar: config.sidebar.clone(),
            snapshot_map: config.snapshot_map.clone(),
            heatmap: config.heatmap.clone(),
            prediction: config.prediction.clone(),
        }
    }
}

#[derive(Debug)]
pub enum SectionBody {
    Table(Table),
    Correlation(HeatmapSpec),
    Bar(BarChartSpec),
    Markers {
        date_options: Vec<String>,
        date: Option<String>,
        features: Vec<MapFeature>,
        map: MarkerMap,
    },
    Timeseries(TimeSeriesHeatMap),
    Prediction {
        input: PredictionInput,
        outcome: PredictionOutcome,
    },
}

#[derive(Debug)]
pub struct Section {
    pub title: &'static str,
    pub body: SectionBody,
}

impl Section {
    /// Returns the heading of the section, all but the prediction heading end with a colon
    pub fn heading(&self) -> String {
        match self.body {
            SectionBody::Prediction { .. } => self.title.to_string(),
            _ => format!("{}:", self.title),
        }
    }
}

/// The rendered result of one interaction
#[derive(Debug)]
pub struct Page {
    pub title: &'static str,
    pub sidebar: Sidebar,
    pub placeholder: Option<PathBuf>,
    pub sections: Vec<Section>,
}

/// The dashboard, holding the table caches across interactions
pub struct Dashboard {
    data: TableCache,
    map_data: TableCache,
    image: PathBuf,
    model_source: Box<dyn ModelSource>,
    placeholder_cleared: bool,
}

impl Dashboard {
    /// Returns a new Dashboard reading the configured files and model artifact
    ///
    /// # Arguments
    ///
    /// * 'files' - file configuration
    pub fn new(files: &Files) -> Dashboard {
        Dashboard::with_model_source(files, Box::new(ModelFile::new(files)))
    }

    /// Returns a new Dashboard using the given source for its classifier
    ///
    /// # Arguments
    ///
    /// * 'files' - file configuration
    /// * 'model_source' - where to load the classifier from on each prediction
    pub fn with_model_source(files: &Files, model_source: Box<dyn ModelSource>) -> Dashboard {
        Dashboard {
            data: TableCache::new(&files.data_file),
            map_data: TableCache::new(&files.map_data_file),
            image: PathBuf::from(&files.image_file),
            model_source,
            placeholder_cleared: false,
        }
    }

    /// Renders every section toggled on in the sidebar, in sidebar order.
    ///
    /// Tables are loaded only when a toggled section needs them. Any failure stops the
    /// interaction and no page is returned. The placeholder image is shown until the first
    /// interaction that renders a section.
    ///
    /// # Arguments
    ///
    /// * 'interaction' - sidebar state and user inputs
    pub fn interact(&mut self, interaction: &Interaction) -> Result<Page, DashboardError> {
        let sidebar = &interaction.sidebar;
        let mut sections: Vec<Section> = Vec::new();

        if sidebar.show_data {
            let data = self.data.load()?;
            sections.push(section("Dataset", SectionBody::Table(data.head(HEAD_ROWS))));
        }
        if sidebar.show_correlations {
            let data = self.data.load()?;
            sections.push(section("Features Correlation", SectionBody::Correlation(get_corr_heatmap(&data)?)));
        }
        if sidebar.show_max_temp {
            let data = self.data.load()?;
            sections.push(section("Cities with High Temperature", SectionBody::Bar(get_max_temp_bar_chart(&data)?)));
        }
        if sidebar.show_min_temp {
            let data = self.data.load()?;
            sections.push(section("Cities with Minimum Temperature", SectionBody::Bar(get_min_temp_bar_chart(&data)?)));
        }
        if sidebar.show_rainfall {
            let data = self.data.load()?;
            sections.push(section("Cities with Rainfall", SectionBody::Bar(get_rain_bar_chart(&data)?)));
        }
        if sidebar.show_temp_map {
            let map_data = self.map_data.load()?;
            let options = date_options(&map_data)?;
            let date = interaction.snapshot_map.date.clone().or_else(|| options.first().cloned());
            let map = get_weather_map(&map_data, date.as_deref(), &interaction.snapshot_map.features)?;
            sections.push(section("Cities Map with Weather Markers", SectionBody::Markers {
                date_options: options,
                date,
                features: interaction.snapshot_map.features.clone(),
                map,
            }));
        }
        if sidebar.show_rainfall_timeseries_map {
            let map_data = self.map_data.load()?;
            let map = get_rainfall_timeseries_map(&map_data, interaction.heatmap.use_local_extrema)?;
            sections.push(section("Rainfall Timeseries", SectionBody::Timeseries(map)));
        }
        if sidebar.predict {
            let model = self.model_source.load_model()?;
            let outcome = get_prediction(&interaction.prediction, &*model)?;
            sections.push(section("Predict Rainfall", SectionBody::Prediction {
                input: interaction.prediction.clone(),
                outcome,
            }));
        }

        if !sections.is_empty() {
            self.placeholder_cleared = true;
        }
        let placeholder = if self.placeholder_cleared {
            None
        } else if self.image.exists() {
            Some(self.image.clone())
        } else {
            return Err(DashboardError::Image(format!("placeholder image not found: {}", self.image.display())));
        };

        Ok(Page { title: PAGE_TITLE, sidebar: sidebar.clone(), placeholder, sections })
    }

    /// Empties both table caches so the next interaction reads the files again
    pub fn invalidate(&mut self) {
        self.data.invalidate();
        self.map_data.invalidate();
    }

    /// Returns the number of disk reads of the main and the map table
    pub fn reads(&self) -> (usize, usize) {
        (self.data.reads(), self.map_data.reads())
    }
}

fn section(title: &'static str, body: SectionBody) -> Section {
    info!("Rendering section {}", title);
    Section { title, body }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::fs;
    use tempfile::TempDir;
    use super::*;
    use crate::manager_model::Classifier;
    use crate::manager_model::errors::ModelError;
    use crate::models::prediction_input::PredictionRow;
    use crate::prediction::RainTomorrow;

    pub(crate) const DATA_CSV: &str = "\
Date,Location,MinTemp,MaxTemp,Rainfall,Humidity3pm,RainTomorrow
2008-12-01,Albury,13.4,22.9,0.6,22,0
2008-12-02,Albury,7.4,25.1,0,25,0
2008-12-01,Darwin,24.1,33.2,12.4,70,1
2008-12-02,Darwin,25.0,34.0,3.2,66,1
2008-12-01,Hobart,8.2,17.5,1.0,55,0
2008-12-02,Hobart,6.1,15.0,2.4,60,1
";

    pub(crate) const MAP_CSV: &str = "\
Date,Location,MinTemp,MaxTemp,Rainfall,Evaporation,Sunshine,WindGustSpeed,WindSpeed9am,Humidity9am,Pressure9am,Cloud9am,Temp9am,lat,lng
2017-06-01,Albury,4,13,0,1.2,,35,9,85,1018,7,6.5,-36.08,146.91
2017-06-01,Darwin,22.1,31.4,0.4,6.8,10.2,41,13,62,1011.1,1,25.3,-12.46,130.84
2017-06-02,Albury,3,12.5,0.2,,,30,6,90,1020.4,8,5.1,-36.08,146.91
";

    pub(crate) struct StubSource(pub &'static str);

    struct StubClassifier(&'static str);

    impl Classifier for StubClassifier {
        fn predict(&self, _: &PredictionRow) -> Result<String, ModelError> {
            Ok(self.0.to_string())
        }
    }

    impl ModelSource for StubSource {
        fn load_model(&self) -> Result<Box<dyn Classifier>, ModelError> {
            Ok(Box::new(StubClassifier(self.0)))
        }
    }

    /// Writes data, map data and image files to a fresh temp directory, removed when
    /// the returned guard drops
    pub(crate) fn fixture_files() -> (TempDir, Files) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("data.csv"), DATA_CSV).unwrap();
        fs::write(dir.path().join("map.csv"), MAP_CSV).unwrap();
        fs::write(dir.path().join("climate.jpg"), [0xFFu8, 0xD8, 0xFF]).unwrap();

        let path = |f: &str| dir.path().join(f).display().to_string();
        let files = Files {
            data_file: path("data.csv"),
            map_data_file: path("map.csv"),
            image_file: path("climate.jpg"),
            model_file: path("rf_model.json"),
        };

        (dir, files)
    }

    fn all_on() -> Sidebar {
        Sidebar {
            show_data: true,
            show_correlations: true,
            show_max_temp: true,
            show_min_temp: true,
            show_rainfall: true,
            show_temp_map: true,
            show_rainfall_timeseries_map: true,
            predict: true,
        }
    }

    #[test]
    fn renders_sections_in_sidebar_order() {
        let (_dir, files) = fixture_files();
        let mut dashboard = Dashboard::with_model_source(&files, Box::new(StubSource("1")));
        let page = dashboard.interact(&Interaction { sidebar: all_on(), ..Default::default() }).unwrap();

        let titles: Vec<&str> = page.sections.iter().map(|s| s.title).collect();
        assert_eq!(titles, vec![
            "Dataset",
            "Features Correlation",
            "Cities with High Temperature",
            "Cities with Minimum Temperature",
            "Cities with Rainfall",
            "Cities Map with Weather Markers",
            "Rainfall Timeseries",
            "Predict Rainfall",
        ]);
        assert_eq!(page.title, "Australia Rain Prediction");
        match &page.sections[7].body {
            SectionBody::Prediction { outcome, .. } => assert_eq!(outcome.rain_tomorrow, RainTomorrow::Rain),
            other => panic!("unexpected section {:?}", other),
        }
    }

    #[test]
    fn loads_each_table_once_across_interactions() {
        let (_dir, files) = fixture_files();
        let mut dashboard = Dashboard::with_model_source(&files, Box::new(StubSource("0")));
        let interaction = Interaction { sidebar: all_on(), ..Default::default() };

        dashboard.interact(&interaction).unwrap();
        dashboard.interact(&interaction).unwrap();
        assert_eq!(dashboard.reads(), (1, 1));

        dashboard.invalidate();
        dashboard.interact(&interaction).unwrap();
        assert_eq!(dashboard.reads(), (2, 2));
    }

    #[test]
    fn placeholder_cleared_after_first_rendered_interaction() {
        let (_dir, files) = fixture_files();
        let mut dashboard = Dashboard::with_model_source(&files, Box::new(StubSource("0")));

        let page = dashboard.interact(&Interaction::default()).unwrap();
        assert!(page.placeholder.is_some());
        assert!(page.sections.is_empty());
        assert_eq!(dashboard.reads(), (0, 0));

        let show_data = Interaction { sidebar: Sidebar { show_data: true, ..Default::default() }, ..Default::default() };
        let page = dashboard.interact(&show_data).unwrap();
        assert!(page.placeholder.is_none());
        match &page.sections[0].body {
            SectionBody::Table(head) => assert_eq!(head.len(), 5),
            other => panic!("unexpected section {:?}", other),
        }

        let page = dashboard.interact(&Interaction::default()).unwrap();
        assert!(page.placeholder.is_none());
    }

    #[test]
    fn snapshot_map_defaults_to_first_date() {
        let (_dir, files) = fixture_files();
        let mut dashboard = Dashboard::with_model_source(&files, Box::new(StubSource("0")));
        let interaction = Interaction {
            sidebar: Sidebar { show_temp_map: true, ..Default::default() },
            ..Default::default()
        };
        let page = dashboard.interact(&interaction).unwrap();
        match &page.sections[0].body {
            SectionBody::Markers { date_options, date, features, map } => {
                assert_eq!(date_options, &vec!["2017-06-01".to_string(), "2017-06-02".to_string()]);
                assert_eq!(date.as_deref(), Some("2017-06-01"));
                assert_eq!(features, &vec![MapFeature::MinTemp]);
                assert_eq!(map.markers.len(), 2);
                assert_eq!(map.markers[0].tooltip, "MinTemp: 4.0<br/>");
            }
            other => panic!("unexpected section {:?}", other),
        }
    }

    #[test]
    fn empty_map_table_renders_empty_map() {
        let (dir, mut files) = fixture_files();
        let header_only = dir.path().join("header_only.csv");
        fs::write(&header_only, MAP_CSV.lines().next().unwrap()).unwrap();
        files.map_data_file = header_only.display().to_string();

        let mut dashboard = Dashboard::with_model_source(&files, Box::new(StubSource("0")));
        let interaction = Interaction {
            sidebar: Sidebar { show_temp_map: true, ..Default::default() },
            ..Default::default()
        };
        let page = dashboard.interact(&interaction).unwrap();
        match &page.sections[0].body {
            SectionBody::Markers { date_options, date, map, .. } => {
                assert!(date_options.is_empty());
                assert_eq!(date, &None);
                assert!(map.markers.is_empty());
                assert_eq!(map.center, [-28.0, 135.0]);
            }
            other => panic!("unexpected section {:?}", other),
        }
    }

    #[test]
    fn prediction_heading_has_no_colon() {
        let (_dir, files) = fixture_files();
        let mut dashboard = Dashboard::with_model_source(&files, Box::new(StubSource("0")));
        let interaction = Interaction {
            sidebar: Sidebar { show_rainfall: true, predict: true, ..Default::default() },
            ..Default::default()
        };
        let page = dashboard.interact(&interaction).unwrap();
        let headings: Vec<String> = page.sections.iter().map(|s| s.heading()).collect();
        assert_eq!(headings, vec!["Cities with Rainfall:", "Predict Rainfall"]);
    }

    #[test]
    fn missing_map_file_aborts_interaction() {
        let (_dir, mut files) = fixture_files();
        files.map_data_file = format!("{}.gone", files.map_data_file);
        let mut dashboard = Dashboard::with_model_source(&files, Box::new(StubSource("0")));

        let map_on = Interaction { sidebar: Sidebar { show_data: true, show_temp_map: true, ..Default::default() }, ..Default::default() };
        assert!(matches!(dashboard.interact(&map_on), Err(DashboardError::Load(_))));

        let data_only = Interaction { sidebar: Sidebar { show_data: true, ..Default::default() }, ..Default::default() };
        assert!(dashboard.interact(&data_only).is_ok());
    }

    #[test]
    fn invalid_prediction_input_aborts_interaction() {
        let (_dir, files) = fixture_files();
        let mut dashboard = Dashboard::with_model_source(&files, Box::new(StubSource("0")));
        let interaction = Interaction {
            sidebar: Sidebar { predict: true, ..Default::default() },
            prediction: PredictionInput { temp_3pm: "warm".to_string(), ..Default::default() },
            ..Default::default()
        };
        assert!(matches!(dashboard.interact(&interaction), Err(DashboardError::Prediction(_))));
    }

    #[test]
    fn missing_model_artifact_aborts_prediction() {
        let (_dir, files) = fixture_files();
        let mut dashboard = Dashboard::new(&files);
        let interaction = Interaction { sidebar: Sidebar { predict: true, ..Default::default() }, ..Default::default() };
        assert!(matches!(dashboard.interact(&interaction), Err(DashboardError::Model(_))));
    }

    #[test]
    fn toggles_follow_layout() {
        let labels = SIDEBAR_LAYOUT.iter().map(|(_, l)| l.len()).sum::<usize>();
        assert_eq!(labels, Sidebar::default().toggles().len());
    }
}
