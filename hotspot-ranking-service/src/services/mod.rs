pub mod atm_master;
pub mod bundle;
pub mod candidates;
pub mod engine;
pub mod features;
pub mod selection;
pub mod tiering;

pub use bundle::{CategoryEncoder, ModelBundle, ScoringModel};
pub use candidates::build_candidates;
pub use engine::{EngineOptions, HotspotEngine};
pub use features::FeatureAssembler;
pub use selection::TopKSelector;
pub use tiering::{TierClassifier, TieringMode};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Model bundle loading failed: {0}")]
    BundleLoad(String),

    #[error("ATM master snapshot unavailable: {0}")]
    AtmMaster(String),

    #[error("Feature assembly failed: {0}")]
    FeatureAssembly(String),

    #[error("Model inference failed: {0}")]
    Inference(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
