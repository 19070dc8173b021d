/// Tier Classification Module
///
/// Turns raw model scores into a dense rank, a discrete risk tier, and a
/// display score. Two stages, both explicit: a stable descending sort for
/// rank assignment, then a pure banding function of the rank.
use crate::models::{Candidate, Complaint, RiskResult, RiskTier};
use crate::utils::normalize_score;
use ndarray::Array1;
use serde::Deserialize;
use std::cmp::Ordering;

/// How the surfaced 0-1 risk score is derived from the raw model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieringMode {
    /// Score follows the rank band table, independent of raw-score gaps.
    /// Guarantees visible tier diversity in any top-K slice.
    RankBanded,
    /// Plain min-max normalization of the raw scores.
    MinMax,
}

impl Default for TieringMode {
    fn default() -> Self {
        TieringMode::RankBanded
    }
}

impl std::str::FromStr for TieringMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rank_banded" => Ok(TieringMode::RankBanded),
            "min_max" => Ok(TieringMode::MinMax),
            other => Err(format!("unknown tiering mode: {other}")),
        }
    }
}

/// Rank bands: (first rank, last rank, low score, high score, tier).
const RANK_BANDS: [(usize, usize, f32, f32, RiskTier); 5] = [
    (1, 5, 0.90, 0.99, RiskTier::VeryCritical),
    (6, 10, 0.80, 0.89, RiskTier::Critical),
    (11, 15, 0.70, 0.79, RiskTier::High),
    (16, 20, 0.60, 0.69, RiskTier::Medium),
    (21, 25, 0.50, 0.59, RiskTier::Low),
];

/// Every rank past the last band.
const FALLBACK_SCORE: f32 = 0.40;

/// Tier and display score for a dense rank.
///
/// Inside a band the score is linear in position: the band's first rank
/// takes the top of the score range, its last rank the bottom. Two ATMs
/// with near-identical raw scores can land in adjacent tiers purely by
/// rank; that is the intended product behavior, not an artifact.
pub fn band_for_rank(rank: usize) -> (RiskTier, f32) {
    for &(lo, hi, score_lo, score_hi, tier) in &RANK_BANDS {
        if rank <= hi {
            let t = (hi - rank) as f32 / (hi - lo) as f32;
            return (tier, score_lo + t * (score_hi - score_lo));
        }
    }
    (RiskTier::Low, FALLBACK_SCORE)
}

pub struct TierClassifier {
    mode: TieringMode,
}

impl TierClassifier {
    pub fn new(mode: TieringMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> TieringMode {
        self.mode
    }

    /// Rank candidates by raw score and attach tier + display score.
    ///
    /// The sort is stable and descending, so equal raw scores keep their
    /// original candidate order and the whole transform is deterministic
    /// for identical input order. NaN raw scores sort below every finite
    /// score and never disturb the ranking of the rest.
    pub fn classify(
        &self,
        complaint: &Complaint,
        candidates: &[Candidate<'_>],
        raw_scores: &Array1<f32>,
    ) -> Vec<RiskResult> {
        let n = candidates.len();
        debug_assert_eq!(n, raw_scores.len());

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| {
            sort_key(raw_scores[b])
                .partial_cmp(&sort_key(raw_scores[a]))
                .unwrap_or(Ordering::Equal)
        });

        let (min, max) = finite_bounds(raw_scores);

        order
            .iter()
            .enumerate()
            .map(|(position, &idx)| {
                let rank = position + 1;
                let raw = raw_scores[idx];
                let (tier, banded) = band_for_rank(rank);
                let norm = match self.mode {
                    TieringMode::RankBanded => banded,
                    TieringMode::MinMax => normalize_score(raw, min, max),
                };

                let atm = candidates[idx].atm;
                RiskResult {
                    atm_id: atm.atm_id,
                    atm_name: atm.name.clone(),
                    lat: atm.lat,
                    lon: atm.lon,
                    risk_score: raw,
                    risk_score_norm: norm,
                    risk_class: tier,
                    rank,
                    fraud_type: complaint.fraud_type.clone(),
                    suspected_atm_place: atm.place.clone(),
                    total_complaints: atm.total_complaints,
                    bank_name: complaint.bank_name.clone(),
                    estimated_loss: atm.avg_loss,
                    complaint_id: complaint.complaint_id.clone(),
                    time_of_complaint: complaint.time_of_complaint,
                }
            })
            .collect()
    }
}

fn sort_key(score: f32) -> f32 {
    if score.is_nan() {
        f32::NEG_INFINITY
    } else {
        score
    }
}

fn finite_bounds(scores: &Array1<f32>) -> (f32, f32) {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &score in scores.iter() {
        if score.is_finite() {
            min = min.min(score);
            max = max.max(score);
        }
    }
    (min, max)
}
