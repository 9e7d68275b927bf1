//! Classifier collaborator interface.
//!
//! The trained model is an external collaborator; this module only fixes
//! the seam: a classifier consumes a feature vector in its own trained
//! name order and returns a label, optionally with a malware probability.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::features::{extract_file, vectorize, FeatureMap};

/// Classification verdict for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Safe,
    Malware,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Safe => write!(f, "safe"),
            Label::Malware => write!(f, "malware"),
        }
    }
}

/// Outcome of scanning one file: verdict plus the features it was based on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    pub filename: String,
    pub label: Label,
    /// Probability of the malware class, when the model supports it.
    pub malware_probability: Option<f64>,
    pub features: FeatureMap,
}

/// A trained binary classifier over fixed-order feature vectors.
pub trait Classifier {
    /// Feature names in the order the model was trained on.
    fn feature_order(&self) -> &[String];

    /// Discrete verdict for one vector.
    fn predict(&self, vector: &[f64]) -> Label;

    /// Malware-class probability in `[0, 1]`; `None` when the underlying
    /// model has no probability support (a valid, non-error outcome).
    fn predict_probability(&self, _vector: &[f64]) -> Option<f64> {
        None
    }
}

/// Extract features from `path` and run them through `classifier`.
pub fn scan<C: Classifier, P: AsRef<Path>>(classifier: &C, path: P) -> Result<ScanResult> {
    let path = path.as_ref();
    let features = extract_file(path)?;
    let vector = vectorize(&features, classifier.feature_order());

    Ok(ScanResult {
        filename: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string()),
        label: classifier.predict(&vector),
        malware_probability: classifier.predict_probability(&vector),
        features,
    })
}
