/// Model Bundle Module
///
/// Holds the trained ranking model together with the feature contract it
/// was trained against: the ordered feature column list, the categorical
/// subset, and the per-column category encoders. Loaded once at startup
/// and shared read-only across all ranking calls.
pub mod model;

pub use model::ScoringModel;

use super::{EngineError, Result};
use ndarray::{Array1, Array2};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::info;

/// On-disk bundle manifest, stored next to the exported model file.
/// Mirrors the training-side artifact layout.
#[derive(Debug, Clone, Deserialize)]
struct BundleManifest {
    feature_cols: Vec<String>,
    categorical_cols: Vec<String>,
    encoders: HashMap<String, Vec<String>>,
    model_file: String,
}

/// Training-time label encoder for one categorical column.
///
/// Values keep the index they had in the persisted ordered class list.
/// A value unseen at training time silently encodes to 0; index 0 only
/// changes meaning when the model is retrained.
#[derive(Debug, Clone)]
pub struct CategoryEncoder {
    index: HashMap<String, usize>,
}

impl CategoryEncoder {
    pub fn new(classes: &[String]) -> Self {
        let index = classes
            .iter()
            .enumerate()
            .map(|(i, class)| (class.clone(), i))
            .collect();
        Self { index }
    }

    pub fn encode(&self, value: &str) -> usize {
        self.index.get(value).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Immutable model + feature contract, shared as `Arc<ModelBundle>`.
pub struct ModelBundle {
    model: ScoringModel,
    feature_cols: Vec<String>,
    categorical_cols: HashSet<String>,
    encoders: HashMap<String, CategoryEncoder>,
}

impl ModelBundle {
    /// Load the bundle from its JSON manifest. The model file is resolved
    /// relative to the manifest location.
    ///
    /// A missing or corrupt artifact is a fatal startup condition: there is
    /// no fallback scorer, and the engine must not serve without one.
    pub fn load<P: AsRef<Path>>(manifest_path: P) -> Result<Self> {
        let path = manifest_path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| {
            EngineError::BundleLoad(format!("cannot read manifest {}: {}", path.display(), e))
        })?;
        let manifest: BundleManifest = serde_json::from_str(&raw).map_err(|e| {
            EngineError::BundleLoad(format!("corrupt manifest {}: {}", path.display(), e))
        })?;

        let model_path = path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(&manifest.model_file);
        let model = ScoringModel::load_onnx(&model_path, manifest.feature_cols.len())?;

        info!(
            features = manifest.feature_cols.len(),
            categorical = manifest.categorical_cols.len(),
            model = %model_path.display(),
            "Loaded ranking model bundle"
        );

        Ok(Self::assemble(manifest, model))
    }

    /// Build a bundle around an already-constructed scoring model.
    ///
    /// Entry point for tests and local development; production loading goes
    /// through [`ModelBundle::load`].
    pub fn with_model(
        model: ScoringModel,
        feature_cols: Vec<String>,
        categorical_cols: Vec<String>,
        encoders: HashMap<String, Vec<String>>,
    ) -> Self {
        Self::assemble(
            BundleManifest {
                feature_cols,
                categorical_cols,
                encoders,
                model_file: String::new(),
            },
            model,
        )
    }

    fn assemble(manifest: BundleManifest, model: ScoringModel) -> Self {
        let encoders = manifest
            .encoders
            .iter()
            .map(|(col, classes)| (col.clone(), CategoryEncoder::new(classes)))
            .collect();
        Self {
            model,
            feature_cols: manifest.feature_cols,
            categorical_cols: manifest.categorical_cols.into_iter().collect(),
            encoders,
        }
    }

    /// Score a feature matrix whose columns follow [`Self::feature_cols`].
    pub fn score(&self, features: Array2<f32>) -> Result<Array1<f32>> {
        self.model.predict(features)
    }

    /// Required feature set, in the exact column order the model expects.
    pub fn feature_cols(&self) -> &[String] {
        &self.feature_cols
    }

    pub fn n_features(&self) -> usize {
        self.feature_cols.len()
    }

    pub fn is_categorical(&self, col: &str) -> bool {
        self.categorical_cols.contains(col)
    }

    pub fn encoder(&self, col: &str) -> Option<&CategoryEncoder> {
        self.encoders.get(col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn test_bundle() -> ModelBundle {
        ModelBundle::with_model(
            ScoringModel::linear(vec![1.0, 2.0], 0.5),
            vec!["reported_loss_amount".to_string(), "fraud_type".to_string()],
            vec!["fraud_type".to_string()],
            HashMap::from([(
                "fraud_type".to_string(),
                vec![
                    "Card Skimming".to_string(),
                    "OTP Fraud".to_string(),
                    "Phishing".to_string(),
                ],
            )]),
        )
    }

    #[test]
    fn encoder_maps_known_values_to_training_indices() {
        let encoder = CategoryEncoder::new(&[
            "Card Skimming".to_string(),
            "OTP Fraud".to_string(),
            "Phishing".to_string(),
        ]);
        assert_eq!(encoder.encode("Card Skimming"), 0);
        assert_eq!(encoder.encode("OTP Fraud"), 1);
        assert_eq!(encoder.encode("Phishing"), 2);
    }

    #[test]
    fn encoder_maps_unknown_value_to_zero() {
        let encoder = CategoryEncoder::new(&["A".to_string(), "B".to_string()]);
        assert_eq!(encoder.encode("QR Scam"), 0);
    }

    #[test]
    fn bundle_exposes_contract() {
        let bundle = test_bundle();
        assert_eq!(bundle.n_features(), 2);
        assert_eq!(bundle.feature_cols()[0], "reported_loss_amount");
        assert!(bundle.is_categorical("fraud_type"));
        assert!(!bundle.is_categorical("reported_loss_amount"));
        assert_eq!(bundle.encoder("fraud_type").unwrap().len(), 3);
        assert!(bundle.encoder("reported_loss_amount").is_none());
    }

    #[test]
    fn load_fails_on_missing_manifest() {
        let result = ModelBundle::load("/nonexistent/ranker_bundle.json");
        assert!(matches!(result, Err(EngineError::BundleLoad(_))));
    }

    #[test]
    fn load_fails_on_corrupt_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let manifest_path = dir.path().join("bundle.json");
        let mut file = fs::File::create(&manifest_path).unwrap();
        file.write_all(b"{ not json").unwrap();

        let result = ModelBundle::load(&manifest_path);
        assert!(matches!(result, Err(EngineError::BundleLoad(_))));
    }

    #[test]
    fn load_fails_on_missing_model_file() {
        let dir = tempfile::tempdir().unwrap();
        let manifest_path = dir.path().join("bundle.json");
        let manifest = serde_json::json!({
            "feature_cols": ["reported_loss_amount"],
            "categorical_cols": [],
            "encoders": {},
            "model_file": "ranker.onnx"
        });
        fs::write(&manifest_path, manifest.to_string()).unwrap();

        let result = ModelBundle::load(&manifest_path);
        assert!(matches!(result, Err(EngineError::BundleLoad(_))));
    }
}
