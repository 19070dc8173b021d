use crate::services::tiering::TieringMode;
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub engine: EngineSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub service_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineSettings {
    pub bundle_manifest_path: String,
    pub atm_master_path: String,
    pub top_k: usize,
    pub tiering_mode: TieringMode,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Config {
            service: ServiceConfig {
                service_name: env::var("SERVICE_NAME")
                    .unwrap_or_else(|_| "hotspot-ranking-service".to_string()),
            },
            engine: EngineSettings {
                bundle_manifest_path: env::var("BUNDLE_MANIFEST_PATH")
                    .unwrap_or_else(|_| "artifacts/ranker_bundle.json".to_string()),
                atm_master_path: env::var("ATM_MASTER_PATH")
                    .unwrap_or_else(|_| "data/atm_master.csv".to_string()),
                top_k: env::var("TOP_K")
                    .unwrap_or_else(|_| "25".to_string())
                    .parse()
                    .expect("TOP_K must be a valid usize"),
                tiering_mode: env::var("TIERING_MODE")
                    .unwrap_or_else(|_| "rank_banded".to_string())
                    .parse()
                    .expect("TIERING_MODE must be rank_banded or min_max"),
            },
        }
    }
}
