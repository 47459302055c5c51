use serde::{Deserialize, Serialize};

/// Serialized random forest classifier as exported by the training pipeline
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ForestArtifact {
    pub feature_names: Vec<String>,
    pub classes: Vec<String>,
    pub trees: Vec<Tree>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

/// Tree node, the root is the first node of a tree.
///
/// A split sends samples with `feature <= threshold` to `left`, others to `right`.
/// A leaf holds per class sample counts (or weights) in class order.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(untagged)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f64>,
    },
}
