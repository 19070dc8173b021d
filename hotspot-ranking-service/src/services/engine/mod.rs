/// Engine Orchestration Module
///
/// Wires the ranking stages into one synchronous call:
/// candidate build -> feature reconstruction -> scoring -> tier
/// classification -> top-K selection. The model bundle is shared
/// read-only; each call works on its own local data, so arbitrarily many
/// calls may run concurrently with no coordination.
use crate::models::{AtmRecord, Complaint, RankedHotspots};
use crate::services::bundle::ModelBundle;
use crate::services::candidates::build_candidates;
use crate::services::features::FeatureAssembler;
use crate::services::selection::TopKSelector;
use crate::services::tiering::{TierClassifier, TieringMode};
use crate::services::Result;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub top_k: usize,
    pub tiering_mode: TieringMode,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            top_k: 25,
            tiering_mode: TieringMode::RankBanded,
        }
    }
}

pub struct HotspotEngine {
    bundle: Arc<ModelBundle>,
    assembler: FeatureAssembler,
    classifier: TierClassifier,
    selector: TopKSelector,
}

impl HotspotEngine {
    pub fn new(bundle: Arc<ModelBundle>, options: EngineOptions) -> Self {
        let assembler = FeatureAssembler::new(Arc::clone(&bundle));
        Self {
            bundle,
            assembler,
            classifier: TierClassifier::new(options.tiering_mode),
            selector: TopKSelector::new(options.top_k),
        }
    }

    /// Rank every ATM in the snapshot against one complaint and return the
    /// top-K hotspots.
    pub fn rank_hotspots(
        &self,
        complaint: &Complaint,
        atms: &[AtmRecord],
    ) -> Result<RankedHotspots> {
        if atms.is_empty() {
            debug!(
                complaint_id = %complaint.complaint_id,
                "Empty ATM master, returning no hotspots"
            );
            return Ok(RankedHotspots {
                complaint_id: complaint.complaint_id.clone(),
                hotspots: Vec::new(),
                missing_features: Vec::new(),
            });
        }

        let candidates = build_candidates(complaint, atms);
        debug!(
            complaint_id = %complaint.complaint_id,
            candidate_count = candidates.len(),
            "Candidate set built"
        );

        let features = self.assembler.assemble(&candidates)?;
        let raw_scores = self.bundle.score(features.matrix)?;

        let classified = self.classifier.classify(complaint, &candidates, &raw_scores);
        let hotspots = self.selector.select(classified);

        info!(
            complaint_id = %complaint.complaint_id,
            candidates = candidates.len(),
            returned = hotspots.len(),
            top_score = hotspots.first().map(|h| h.risk_score),
            "Hotspot ranking complete"
        );

        Ok(RankedHotspots {
            complaint_id: complaint.complaint_id.clone(),
            hotspots,
            missing_features: features.missing_cols,
        })
    }
}
