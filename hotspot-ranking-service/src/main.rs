use anyhow::Context;
use hotspot_ranking_service::models::Complaint;
use hotspot_ranking_service::services::atm_master;
use hotspot_ranking_service::services::engine::EngineOptions;
use hotspot_ranking_service::{Config, HotspotEngine, ModelBundle};
use std::fs;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    // Load config
    let config = Config::from_env();
    info!(
        service = %config.service.service_name,
        top_k = config.engine.top_k,
        "Starting hotspot ranking run"
    );

    let complaint_path = std::env::args()
        .nth(1)
        .context("usage: hotspot-ranking-service <complaint.json>")?;

    // Both inputs are fatal when unavailable: the engine must not serve
    // unscored results.
    let bundle = ModelBundle::load(&config.engine.bundle_manifest_path)
        .context("model bundle is required at startup")?;
    let atms = atm_master::load_atm_master(&config.engine.atm_master_path)
        .context("ATM master snapshot is required at startup")?;

    let raw = fs::read_to_string(&complaint_path)
        .with_context(|| format!("cannot read complaint file {complaint_path}"))?;
    let complaint: Complaint =
        serde_json::from_str(&raw).context("malformed complaint payload")?;

    let engine = HotspotEngine::new(
        Arc::new(bundle),
        EngineOptions {
            top_k: config.engine.top_k,
            tiering_mode: config.engine.tiering_mode,
        },
    );

    let ranked = engine.rank_hotspots(&complaint, &atms)?;
    if !ranked.missing_features.is_empty() {
        info!(
            columns = ?ranked.missing_features,
            "Contract features were zero-filled for this run"
        );
    }

    println!("{}", serde_json::to_string_pretty(&ranked.into_keyed_map())?);

    Ok(())
}
