pub mod errors;

use std::fs;
use std::path::{Path, PathBuf};
use log::{debug, info};
use crate::config::Files;
use crate::manager_model::errors::ModelError;
use crate::models::forest::{ForestArtifact, Node, Tree};
use crate::models::prediction_input::{PredictionRow, PREDICTION_COLUMNS};

/// Capability of a pre-trained classifier: predict the label for one input row
pub trait Classifier {
    fn predict(&self, row: &PredictionRow) -> Result<String, ModelError>;
}

/// Source of a classifier, invoked once per prediction
pub trait ModelSource {
    fn load_model(&self) -> Result<Box<dyn Classifier>, ModelError>;
}

/// Loads the random forest artifact from the configured model file
pub struct ModelFile {
    path: PathBuf,
}

impl ModelFile {
    /// Returns a new instance of the ModelFile struct
    ///
    /// # Arguments
    ///
    /// * 'config' - file configuration holding the model artifact path
    pub fn new(config: &Files) -> Self {
        Self { path: PathBuf::from(&config.model_file) }
    }
}

impl ModelSource for ModelFile {
    fn load_model(&self) -> Result<Box<dyn Classifier>, ModelError> {
        Ok(Box::new(ForestModel::load(&self.path)?))
    }
}

/// Random forest classifier evaluated from its serialized form
#[derive(Debug)]
pub struct ForestModel {
    classes: Vec<String>,
    trees: Vec<Tree>,
}

impl ForestModel {
    /// Loads and validates a random forest artifact
    ///
    /// # Arguments
    ///
    /// * 'path' - path to the JSON model artifact
    pub fn load(path: &Path) -> Result<ForestModel, ModelError> {
        if !path.exists() {
            return Err(ModelError(format!("model artifact not found: {}", path.display())));
        }
        let json = fs::read_to_string(path)?;
        let artifact: ForestArtifact = serde_json::from_str(&json)?;
        let model = ForestModel::from_artifact(artifact)?;
        info!("Loaded rain model with {} trees from {}", model.trees.len(), path.display());

        Ok(model)
    }

    /// Validates an artifact and returns it as a model.
    ///
    /// The artifact's feature names must equal the prediction column order, and every
    /// node reference and leaf must be consistent with the tree and class list.
    ///
    /// # Arguments
    ///
    /// * 'artifact' - the deserialized artifact
    pub fn from_artifact(artifact: ForestArtifact) -> Result<ForestModel, ModelError> {
        if artifact.feature_names != PREDICTION_COLUMNS {
            return Err(ModelError(format!(
                "feature names {:?} do not match input columns {:?}", artifact.feature_names, PREDICTION_COLUMNS
            )));
        }
        if artifact.classes.is_empty() {
            Err("model has no classes")?
        }
        if artifact.trees.is_empty() {
            Err("model has no trees")?
        }

        for (t, tree) in artifact.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(ModelError(format!("tree {} has no nodes", t)));
            }
            for node in &tree.nodes {
                match node {
                    Node::Split { feature, left, right, .. } => {
                        if *feature >= PREDICTION_COLUMNS.len() || *left >= tree.nodes.len() || *right >= tree.nodes.len() {
                            return Err(ModelError(format!("tree {} has a split out of range", t)));
                        }
                    }
                    Node::Leaf { value } => {
                        if value.len() != artifact.classes.len() {
                            return Err(ModelError(format!("tree {} has a leaf not matching the classes", t)));
                        }
                    }
                }
            }
        }

        Ok(ForestModel { classes: artifact.classes, trees: artifact.trees })
    }
}

impl Classifier for ForestModel {
    /// Averages the class distributions of all trees' leaves and returns the label
    /// of the most probable class, the first class wins a tie
    fn predict(&self, row: &PredictionRow) -> Result<String, ModelError> {
        let features = row.features();
        let mut proba = vec![0.0; self.classes.len()];

        for tree in &self.trees {
            let leaf = walk(tree, &features)?;
            let total = leaf.iter().sum::<f64>();
            if total > 0.0 {
                for (p, v) in proba.iter_mut().zip(leaf) {
                    *p += v / total;
                }
            }
        }

        let best = proba
            .iter()
            .enumerate()
            .fold(0, |best, (i, p)| if *p > proba[best] { i } else { best });
        debug!("Class probabilities {:?}", proba);

        Ok(self.classes[best].clone())
    }
}

/// Walks a tree from its root to a leaf and returns the leaf's class values
fn walk<'a>(tree: &'a Tree, features: &[f64]) -> Result<&'a [f64], ModelError> {
    let mut index = 0;
    for _ in 0..tree.nodes.len() {
        match &tree.nodes[index] {
            Node::Leaf { value } => return Ok(value.as_slice()),
            Node::Split { feature, threshold, left, right } => {
                index = if features[*feature] <= *threshold { *left } else { *right };
            }
        }
    }

    Err(ModelError::from("tree walk did not reach a leaf"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::prediction_input::PredictionInput;

    fn artifact(trees: &str) -> ForestArtifact {
        let json = format!(
            r#"{{"feature_names": {}, "classes": ["0", "1"], "trees": {}}}"#,
            serde_json::to_string(&PREDICTION_COLUMNS).unwrap(),
            trees
        );
        serde_json::from_str(&json).unwrap()
    }

    // Splits on Humidity3pm (feature 9) at 50, rainy above
    const HUMIDITY_TREE: &str = r#"{"nodes": [
        {"feature": 9, "threshold": 50.0, "left": 1, "right": 2},
        {"value": [8.0, 2.0]},
        {"value": [1.0, 9.0]}
    ]}"#;

    #[test]
    fn predicts_through_splits() {
        let model = ForestModel::from_artifact(artifact(&format!("[{}]", HUMIDITY_TREE))).unwrap();

        let dry = PredictionInput::default().validate().unwrap();
        assert_eq!(model.predict(&dry).unwrap(), "0");

        let humid = PredictionInput { humidity_3pm: "85".to_string(), ..Default::default() }.validate().unwrap();
        assert_eq!(model.predict(&humid).unwrap(), "1");
    }

    #[test]
    fn averages_trees() {
        let always_rain = r#"{"nodes": [{"value": [0.0, 5.0]}]}"#;
        let leaning_dry = r#"{"nodes": [{"value": [6.0, 4.0]}]}"#;
        let model = ForestModel::from_artifact(artifact(&format!("[{}, {}, {}]", always_rain, leaning_dry, leaning_dry))).unwrap();
        let row = PredictionInput::default().validate().unwrap();
        // (0 + 0.6 + 0.6) / 3 = 0.4 dry, 0.6 rain
        assert_eq!(model.predict(&row).unwrap(), "1");
    }

    #[test]
    fn rejects_mismatched_features() {
        let mut a = artifact(&format!("[{}]", HUMIDITY_TREE));
        a.feature_names.swap(0, 1);
        assert!(ForestModel::from_artifact(a).is_err());
    }

    #[test]
    fn rejects_dangling_node() {
        let tree = r#"{"nodes": [{"feature": 0, "threshold": 1.0, "left": 1, "right": 7}, {"value": [1.0, 0.0]}]}"#;
        assert!(ForestModel::from_artifact(artifact(&format!("[{}]", tree))).is_err());
    }

    #[test]
    fn cyclic_tree_fails_prediction() {
        let tree = r#"{"nodes": [{"feature": 0, "threshold": 100.0, "left": 0, "right": 0}]}"#;
        let model = ForestModel::from_artifact(artifact(&format!("[{}]", tree))).unwrap();
        let row = PredictionInput::default().validate().unwrap();
        assert!(model.predict(&row).is_err());
    }

    #[test]
    fn missing_artifact_is_error() {
        assert!(ForestModel::load(Path::new("/nonexistent/rainview/rf_model.json")).is_err());
    }
}
