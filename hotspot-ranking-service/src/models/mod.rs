// Domain models for hotspot-ranking-service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// One reported fraud complaint, as handed over by the intake collaborator.
///
/// Numeric fields tolerate the loose shapes seen at the boundary: JSON
/// numbers, numeric-looking strings ("28450.00", "4.0"), empty strings and
/// nulls (both coerce to zero). A string that cannot be parsed as a number
/// is a decode error and never reaches the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Complaint {
    pub complaint_id: String,
    pub victim_state: String,
    pub victim_district: String,
    pub victim_taluka: String,
    pub victim_village: String,
    #[serde(deserialize_with = "coerce_i64")]
    pub victim_pincode: i64,
    pub victim_rural_urban: String,
    #[serde(deserialize_with = "coerce_f64")]
    pub victim_lat: f64,
    #[serde(deserialize_with = "coerce_f64")]
    pub victim_lon: f64,
    #[serde(default = "default_unknown")]
    pub channel: String,
    #[serde(default = "default_unknown")]
    pub fraud_type: String,
    #[serde(default = "default_unknown")]
    pub bank_name: String,
    #[serde(deserialize_with = "coerce_f64")]
    pub reported_loss_amount: f64,
    #[serde(deserialize_with = "coerce_i64")]
    pub num_transactions: i64,
    #[serde(default = "default_unknown")]
    pub device_type: String,
    #[serde(deserialize_with = "coerce_i64")]
    pub is_otp_shared: i64,
    #[serde(deserialize_with = "coerce_i64")]
    pub clicked_malicious_link: i64,
    #[serde(default = "default_urgency", deserialize_with = "coerce_f64")]
    pub urgency_score: f64,
    #[serde(deserialize_with = "coerce_i64")]
    pub account_age_months: i64,
    #[serde(default = "default_prior_complaints", deserialize_with = "coerce_i64")]
    pub prior_complaints_same_upi: i64,
    #[serde(default = "default_none_label")]
    pub linked_fraud_ring: String,
    #[serde(default)]
    pub time_of_complaint: Option<DateTime<Utc>>,
}

fn default_unknown() -> String {
    "Unknown".to_string()
}

fn default_none_label() -> String {
    "None".to_string()
}

fn default_urgency() -> f64 {
    3.4
}

fn default_prior_complaints() -> i64 {
    2
}

/// One candidate ATM from the master snapshot, in canonical naming.
///
/// `bank_name` and `cashout_rate` existed in training-era snapshots but are
/// absent from newer ones; they stay optional so their absence flows through
/// the missing-feature fill instead of failing ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtmRecord {
    pub atm_id: i64,
    pub lat: f64,
    pub lon: f64,
    pub name: String,
    pub place: String,
    pub total_complaints: i64,
    pub avg_loss: f64,
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub cashout_rate: Option<f64>,
}

/// One (complaint, ATM) pairing under consideration. Lives only for the
/// duration of a single ranking call.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub complaint: &'a Complaint,
    pub atm: &'a AtmRecord,
}

/// Discrete risk tier assigned by rank band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskTier {
    #[serde(rename = "Very Critical")]
    VeryCritical,
    Critical,
    High,
    Medium,
    Low,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::VeryCritical => "Very Critical",
            RiskTier::Critical => "Critical",
            RiskTier::High => "High",
            RiskTier::Medium => "Medium",
            RiskTier::Low => "Low",
        }
    }

    /// Numeric severity, higher = riskier. Used to check tier ordering.
    pub fn severity(&self) -> u8 {
        match self {
            RiskTier::VeryCritical => 4,
            RiskTier::Critical => 3,
            RiskTier::High => 2,
            RiskTier::Medium => 1,
            RiskTier::Low => 0,
        }
    }
}

/// One ranked hotspot in the external result shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskResult {
    pub atm_id: i64,
    pub atm_name: String,
    pub lat: f64,
    pub lon: f64,
    pub risk_score: f32,
    pub risk_score_norm: f32,
    pub risk_class: RiskTier,
    pub rank: usize,
    pub fraud_type: String,
    pub suspected_atm_place: String,
    pub total_complaints: i64,
    pub bank_name: String,
    pub estimated_loss: f64,
    pub complaint_id: String,
    pub time_of_complaint: Option<DateTime<Utc>>,
}

/// Engine output for one complaint: the top-K hotspots in rank order plus
/// the contract columns that had to be zero-filled during feature
/// reconstruction (non-fatal, surfaced for the caller to log or alert on).
#[derive(Debug, Clone, Serialize)]
pub struct RankedHotspots {
    pub complaint_id: String,
    pub hotspots: Vec<RiskResult>,
    pub missing_features: Vec<String>,
}

impl RankedHotspots {
    /// Project into the single-key mapping `{complaint_id: [hotspots]}`
    /// used by downstream consumers.
    pub fn into_keyed_map(self) -> BTreeMap<String, Vec<RiskResult>> {
        let mut map = BTreeMap::new();
        map.insert(self.complaint_id, self.hotspots);
        map
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Int(i64),
    Float(f64),
    Text(String),
    Null(()),
}

fn coerce_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match RawNumber::deserialize(deserializer)? {
        RawNumber::Int(v) => Ok(v as f64),
        RawNumber::Float(v) => Ok(v),
        RawNumber::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                Ok(0.0)
            } else {
                s.parse::<f64>()
                    .map_err(|_| serde::de::Error::custom(format!("not a numeric value: {s:?}")))
            }
        }
        RawNumber::Null(()) => Ok(0.0),
    }
}

// Accepts "12.0"-style strings for integer fields, truncating the fraction.
fn coerce_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match RawNumber::deserialize(deserializer)? {
        RawNumber::Int(v) => Ok(v),
        RawNumber::Float(v) => Ok(v as i64),
        RawNumber::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                Ok(0)
            } else {
                s.parse::<f64>()
                    .map(|v| v as i64)
                    .map_err(|_| serde::de::Error::custom(format!("not a numeric value: {s:?}")))
            }
        }
        RawNumber::Null(()) => Ok(0),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complaint_coerces_numeric_strings_and_nulls() {
        let raw = r#"{
            "complaint_id": "CMP-1001",
            "victim_state": "Maharashtra",
            "victim_district": "Aurangabad",
            "victim_taluka": "Khuldabad",
            "victim_village": "Bajarwadi",
            "victim_pincode": "431101",
            "victim_rural_urban": "Rural",
            "victim_lat": "20.0085",
            "victim_lon": null,
            "fraud_type": "OTP Fraud",
            "reported_loss_amount": "28450.00",
            "num_transactions": "4.0",
            "is_otp_shared": 1,
            "clicked_malicious_link": "",
            "account_age_months": 18
        }"#;

        let c: Complaint = serde_json::from_str(raw).unwrap();
        assert_eq!(c.victim_pincode, 431101);
        assert!((c.victim_lat - 20.0085).abs() < 1e-9);
        assert_eq!(c.victim_lon, 0.0);
        assert!((c.reported_loss_amount - 28450.0).abs() < 1e-9);
        assert_eq!(c.num_transactions, 4);
        assert_eq!(c.clicked_malicious_link, 0);
        assert!(c.time_of_complaint.is_none());
    }

    #[test]
    fn complaint_applies_boundary_defaults() {
        let raw = r#"{
            "complaint_id": "CMP-2",
            "victim_state": "Maharashtra",
            "victim_district": "Pune",
            "victim_taluka": "Haveli",
            "victim_village": "Wagholi",
            "victim_pincode": 412207,
            "victim_rural_urban": "Urban",
            "victim_lat": 18.58,
            "victim_lon": 73.98,
            "reported_loss_amount": 5000,
            "num_transactions": 1,
            "is_otp_shared": 0,
            "clicked_malicious_link": 0,
            "account_age_months": 6
        }"#;

        let c: Complaint = serde_json::from_str(raw).unwrap();
        assert_eq!(c.channel, "Unknown");
        assert_eq!(c.fraud_type, "Unknown");
        assert_eq!(c.bank_name, "Unknown");
        assert_eq!(c.device_type, "Unknown");
        assert_eq!(c.linked_fraud_ring, "None");
        assert!((c.urgency_score - 3.4).abs() < 1e-9);
        assert_eq!(c.prior_complaints_same_upi, 2);
    }

    #[test]
    fn complaint_rejects_uncoercible_numeric_string() {
        let raw = r#"{
            "complaint_id": "CMP-3",
            "victim_state": "S",
            "victim_district": "D",
            "victim_taluka": "T",
            "victim_village": "V",
            "victim_pincode": "not-a-number",
            "victim_rural_urban": "Rural",
            "victim_lat": 0,
            "victim_lon": 0,
            "reported_loss_amount": 0,
            "num_transactions": 0,
            "is_otp_shared": 0,
            "clicked_malicious_link": 0,
            "account_age_months": 0
        }"#;

        assert!(serde_json::from_str::<Complaint>(raw).is_err());
    }

    #[test]
    fn tier_labels_and_severity_order() {
        assert_eq!(RiskTier::VeryCritical.as_str(), "Very Critical");
        assert_eq!(
            serde_json::to_string(&RiskTier::VeryCritical).unwrap(),
            "\"Very Critical\""
        );
        assert!(RiskTier::VeryCritical.severity() > RiskTier::Critical.severity());
        assert!(RiskTier::Medium.severity() > RiskTier::Low.severity());
    }

    #[test]
    fn keyed_map_wraps_under_complaint_id() {
        let ranked = RankedHotspots {
            complaint_id: "CMP-9".to_string(),
            hotspots: Vec::new(),
            missing_features: Vec::new(),
        };
        let map = ranked.into_keyed_map();
        assert_eq!(map.len(), 1);
        assert!(map.contains_key("CMP-9"));
    }
}
