// ============================================
// Feature Reconstruction Module
// ============================================
// Rebuilds, for every candidate row, exactly the feature vector the model
// saw at training time: derived distance, training-time categorical
// encoding, zero-fill for contract columns the schema cannot supply.

use crate::models::Candidate;
use crate::services::bundle::ModelBundle;
use crate::services::Result;
use ndarray::Array2;
use std::sync::Arc;
use tracing::warn;

/// Kilometers per degree, the planar approximation fixed at training time.
/// Changing it without retraining silently mis-calibrates the model.
pub const KM_PER_DEGREE: f64 = 111.0;

/// Name of the derived victim-to-ATM distance feature.
pub const DISTANCE_COL: &str = "victim_atm_distance_km";

/// Assembled feature matrix plus the contract columns that had to be
/// zero-filled (surfaced to the caller as a non-fatal warning).
pub struct FeatureMatrix {
    pub matrix: Array2<f32>,
    pub missing_cols: Vec<String>,
}

/// Feature reconstructor. Shares the read-only model bundle with the
/// scorer so encoding and column order always match the trained contract.
pub struct FeatureAssembler {
    bundle: Arc<ModelBundle>,
}

impl FeatureAssembler {
    pub fn new(bundle: Arc<ModelBundle>) -> Self {
        Self { bundle }
    }

    /// Build the N × feature_cols matrix, columns in contract order.
    ///
    /// A contract column no candidate row can supply is zero-filled and
    /// reported in `missing_cols`; inference continues. This keeps the
    /// engine serving across schema drift between the ATM master and the
    /// trained contract.
    pub fn assemble(&self, candidates: &[Candidate<'_>]) -> Result<FeatureMatrix> {
        let n = candidates.len();
        let cols = self.bundle.feature_cols();
        let mut matrix = Array2::<f32>::zeros((n, cols.len()));
        let mut missing_cols = Vec::new();

        for (j, col) in cols.iter().enumerate() {
            let mut any_value = false;
            let mut column = matrix.column_mut(j);
            for (i, candidate) in candidates.iter().enumerate() {
                if let Some(value) = self.cell_value(col, candidate) {
                    column[i] = value;
                    any_value = true;
                }
            }
            if n > 0 && !any_value {
                missing_cols.push(col.clone());
            }
        }

        if !missing_cols.is_empty() {
            warn!(
                columns = ?missing_cols,
                "Contract feature columns absent from candidate rows, filled with 0.0"
            );
        }

        Ok(FeatureMatrix {
            matrix,
            missing_cols,
        })
    }

    fn cell_value(&self, col: &str, candidate: &Candidate<'_>) -> Option<f32> {
        if col == DISTANCE_COL {
            return Some(victim_atm_distance_km(candidate) as f32);
        }
        if let Some(encoder) = self.bundle.encoder(col) {
            return text_value(candidate, col).map(|v| encoder.encode(v) as f32);
        }
        numeric_value(candidate, col).map(|v| v as f32)
    }
}

/// Planar victim-to-ATM distance in kilometers. Deliberately not geodesic:
/// the model was trained against this approximation.
pub fn victim_atm_distance_km(candidate: &Candidate<'_>) -> f64 {
    let dlat = candidate.complaint.victim_lat - candidate.atm.lat;
    let dlon = candidate.complaint.victim_lon - candidate.atm.lon;
    (dlat * dlat + dlon * dlon).sqrt() * KM_PER_DEGREE
}

fn numeric_value(candidate: &Candidate<'_>, col: &str) -> Option<f64> {
    let complaint = candidate.complaint;
    let atm = candidate.atm;
    match col {
        "victim_pincode" => Some(complaint.victim_pincode as f64),
        "victim_lat" => Some(complaint.victim_lat),
        "victim_lon" => Some(complaint.victim_lon),
        "reported_loss_amount" => Some(complaint.reported_loss_amount),
        "num_transactions" => Some(complaint.num_transactions as f64),
        "is_otp_shared" => Some(complaint.is_otp_shared as f64),
        "clicked_malicious_link" => Some(complaint.clicked_malicious_link as f64),
        "urgency_score" => Some(complaint.urgency_score),
        "account_age_months" => Some(complaint.account_age_months as f64),
        "prior_complaints_same_upi" => Some(complaint.prior_complaints_same_upi as f64),
        "atm_id" => Some(atm.atm_id as f64),
        "atm_lat" => Some(atm.lat),
        "atm_lon" => Some(atm.lon),
        "atm_total_complaints" => Some(atm.total_complaints as f64),
        "atm_avg_loss" => Some(atm.avg_loss),
        "atm_cashout_rate" => atm.cashout_rate,
        _ => None,
    }
}

fn text_value<'a>(candidate: &'a Candidate<'_>, col: &str) -> Option<&'a str> {
    let complaint = candidate.complaint;
    let atm = candidate.atm;
    match col {
        "victim_state" => Some(complaint.victim_state.as_str()),
        "victim_district" => Some(complaint.victim_district.as_str()),
        "victim_taluka" => Some(complaint.victim_taluka.as_str()),
        "victim_village" => Some(complaint.victim_village.as_str()),
        "victim_rural_urban" => Some(complaint.victim_rural_urban.as_str()),
        "channel" => Some(complaint.channel.as_str()),
        "fraud_type" => Some(complaint.fraud_type.as_str()),
        "bank_name" => Some(complaint.bank_name.as_str()),
        "device_type" => Some(complaint.device_type.as_str()),
        "linked_fraud_ring" => Some(complaint.linked_fraud_ring.as_str()),
        "suspected_atm_name" => Some(atm.name.as_str()),
        "suspected_atm_place" => Some(atm.place.as_str()),
        "atm_bank_name" => atm.bank_name.as_deref(),
        _ => None,
    }
}
