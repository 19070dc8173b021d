/// Scoring model behind the bundle.
///
/// Runs the ONNX-exported gradient-boosted ranker with tract-onnx. A plain
/// linear backend is available for tests and local development; it is only
/// reachable by explicit construction, never as a load-failure fallback.
use crate::services::{EngineError, Result};
use ndarray::{Array1, Array2};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;
use tract_onnx::prelude::{tvec, Framework, InferenceModelExt, Tensor};

type OnnxPlan = tract_onnx::prelude::SimplePlan<
    tract_onnx::prelude::TypedFact,
    Box<dyn tract_onnx::prelude::TypedOp>,
    tract_onnx::prelude::Graph<
        tract_onnx::prelude::TypedFact,
        Box<dyn tract_onnx::prelude::TypedOp>,
    >,
>;

pub struct ScoringModel {
    backend: Backend,
    n_features: usize,
}

enum Backend {
    Onnx(Arc<OnnxPlan>),
    Linear { weights: Vec<f32>, bias: f32 },
}

impl ScoringModel {
    /// Load an ONNX model from disk. The expected feature width comes from
    /// the bundle contract and is enforced on every predict call.
    pub fn load_onnx<P: AsRef<Path>>(path: P, n_features: usize) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(EngineError::BundleLoad(format!(
                "model file not found: {}",
                path.display()
            )));
        }

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|m| m.into_optimized())
            .and_then(|m| m.into_runnable())
            .map_err(|e| {
                EngineError::BundleLoad(format!(
                    "failed to load ONNX model {}: {}",
                    path.display(),
                    e
                ))
            })?;

        debug!(path = %path.display(), n_features, "Loaded ONNX ranking model");

        Ok(Self {
            backend: Backend::Onnx(Arc::new(plan)),
            n_features,
        })
    }

    /// Linear scorer over the feature columns. Test/development backend.
    pub fn linear(weights: Vec<f32>, bias: f32) -> Self {
        let n_features = weights.len();
        Self {
            backend: Backend::Linear { weights, bias },
            n_features,
        }
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Predict raw risk scores for a batch of feature vectors.
    ///
    /// Higher means riskier; values are unbounded. A shape mismatch fails
    /// the request: inference is deterministic, so a retry cannot help.
    pub fn predict(&self, features: Array2<f32>) -> Result<Array1<f32>> {
        if features.shape()[1] != self.n_features {
            return Err(EngineError::InvalidInput(format!(
                "expected {} feature columns, got {}",
                self.n_features,
                features.shape()[1]
            )));
        }

        match &self.backend {
            Backend::Onnx(plan) => self.predict_onnx(plan, features),
            Backend::Linear { weights, bias } => Ok(Self::predict_linear(weights, *bias, &features)),
        }
    }

    fn predict_onnx(&self, plan: &OnnxPlan, features: Array2<f32>) -> Result<Array1<f32>> {
        let batch_size = features.shape()[0];

        // Convert ndarray to tract tensor
        let input_tensor = tract_onnx::prelude::tract_ndarray::Array2::from_shape_fn(
            (batch_size, self.n_features),
            |(i, j)| features[[i, j]],
        );

        let input = tvec![Tensor::from(input_tensor.into_dyn()).into()];
        let output = plan
            .run(input)
            .map_err(|e| EngineError::Inference(format!("ONNX inference failed: {e}")))?;

        // Output may be shaped (N,) or (N, 1); flatten either way.
        let scores_tensor = output[0]
            .to_array_view::<f32>()
            .map_err(|e| EngineError::Inference(format!("output extraction failed: {e}")))?;

        Ok(Array1::from_iter(scores_tensor.iter().copied()))
    }

    fn predict_linear(weights: &[f32], bias: f32, features: &Array2<f32>) -> Array1<f32> {
        let mut scores = Array1::zeros(features.shape()[0]);
        for (i, row) in features.rows().into_iter().enumerate() {
            scores[i] = bias + row.iter().zip(weights).map(|(x, w)| x * w).sum::<f32>();
        }
        scores
    }
}
