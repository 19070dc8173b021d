// Top-K projection of classified results to the external shape.

use crate::models::RiskResult;
use crate::utils::{sanitize_f32, sanitize_f64};

/// Truncates the rank-ordered result list and sanitizes the output fields.
/// K is caller-supplied configuration (20/25/50 in known deployments).
pub struct TopKSelector {
    k: usize,
}

impl TopKSelector {
    pub fn new(k: usize) -> Self {
        Self { k }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Keep the first K results by ascending rank; K clamps to the result
    /// count, never padding. Every numeric field is forced finite before
    /// it reaches a caller.
    pub fn select(&self, mut results: Vec<RiskResult>) -> Vec<RiskResult> {
        results.truncate(self.k);
        for result in &mut results {
            result.risk_score = sanitize_f32(result.risk_score);
            result.risk_score_norm = sanitize_f32(result.risk_score_norm);
            result.lat = sanitize_f64(result.lat);
            result.lon = sanitize_f64(result.lon);
            result.estimated_loss = sanitize_f64(result.estimated_loss);
        }
        results
    }
}
