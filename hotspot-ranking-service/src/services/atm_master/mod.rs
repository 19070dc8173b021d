//! ATM master snapshot ingestion.
//!
//! Column names vary across snapshot sources (`atm_id` vs
//! `suspected_atm_index`, `atm_lat` vs `suspected_atm_lat`, ...); rows are
//! normalized to the canonical [`AtmRecord`] naming on the way in. An
//! unreadable snapshot is a fatal startup condition.

use crate::models::AtmRecord;
use crate::services::{EngineError, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

#[derive(Debug, Deserialize)]
struct AtmMasterRow {
    #[serde(alias = "suspected_atm_index")]
    atm_id: i64,
    #[serde(alias = "suspected_atm_lat")]
    atm_lat: f64,
    #[serde(alias = "suspected_atm_lon")]
    atm_lon: f64,
    #[serde(alias = "atm_name")]
    suspected_atm_name: String,
    #[serde(alias = "atm_place")]
    suspected_atm_place: String,
    atm_total_complaints: i64,
    atm_avg_loss: f64,
    #[serde(default)]
    atm_bank_name: Option<String>,
    #[serde(default)]
    atm_cashout_rate: Option<f64>,
}

impl From<AtmMasterRow> for AtmRecord {
    fn from(row: AtmMasterRow) -> Self {
        AtmRecord {
            atm_id: row.atm_id,
            lat: row.atm_lat,
            lon: row.atm_lon,
            name: row.suspected_atm_name,
            place: row.suspected_atm_place,
            total_complaints: row.atm_total_complaints,
            avg_loss: row.atm_avg_loss,
            bank_name: row.atm_bank_name,
            cashout_rate: row.atm_cashout_rate,
        }
    }
}

pub fn parse_atm_master<R: Read>(reader: R) -> Result<Vec<AtmRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for row in csv_reader.deserialize::<AtmMasterRow>() {
        let row = row
            .map_err(|e| EngineError::AtmMaster(format!("malformed snapshot row: {e}")))?;
        records.push(row.into());
    }

    Ok(records)
}

pub fn load_atm_master<P: AsRef<Path>>(path: P) -> Result<Vec<AtmRecord>> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| EngineError::AtmMaster(format!("cannot open {}: {}", path.display(), e)))?;
    let records = parse_atm_master(file)?;

    info!(rows = records.len(), path = %path.display(), "Loaded ATM master snapshot");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_headers() {
        let csv_data = "\
atm_id,atm_lat,atm_lon,suspected_atm_name,suspected_atm_place,atm_total_complaints,atm_avg_loss
1,20.01,75.18,SBI Kiosk,Khuldabad Rd,14,18250.5
2,19.95,75.31,Axis Mall Branch,Cidco Sq,3,5200.0
";
        let records = parse_atm_master(csv_data.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].atm_id, 1);
        assert_eq!(records[0].name, "SBI Kiosk");
        assert_eq!(records[0].total_complaints, 14);
        assert!((records[1].avg_loss - 5200.0).abs() < 1e-9);
        assert!(records[0].bank_name.is_none());
        assert!(records[0].cashout_rate.is_none());
    }

    #[test]
    fn parses_legacy_suspected_headers() {
        let csv_data = "\
suspected_atm_index,suspected_atm_lat,suspected_atm_lon,atm_name,atm_place,atm_total_complaints,atm_avg_loss,atm_bank_name,atm_cashout_rate
7,20.5,75.5,BoB Highway,Waluj,9,12000.0,BoB,0.42
";
        let records = parse_atm_master(csv_data.as_bytes()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].atm_id, 7);
        assert_eq!(records[0].place, "Waluj");
        assert_eq!(records[0].bank_name.as_deref(), Some("BoB"));
        assert!((records[0].cashout_rate.unwrap() - 0.42).abs() < 1e-9);
    }

    #[test]
    fn empty_optional_cells_become_none() {
        let csv_data = "\
atm_id,atm_lat,atm_lon,suspected_atm_name,suspected_atm_place,atm_total_complaints,atm_avg_loss,atm_bank_name,atm_cashout_rate
1,20.0,75.0,ATM,Somewhere,0,0.0,,
";
        let records = parse_atm_master(csv_data.as_bytes()).unwrap();
        assert!(records[0].bank_name.is_none());
        assert!(records[0].cashout_rate.is_none());
    }

    #[test]
    fn malformed_row_is_an_error() {
        let csv_data = "\
atm_id,atm_lat,atm_lon,suspected_atm_name,suspected_atm_place,atm_total_complaints,atm_avg_loss
not-a-number,20.0,75.0,ATM,Somewhere,0,0.0
";
        let result = parse_atm_master(csv_data.as_bytes());
        assert!(matches!(result, Err(EngineError::AtmMaster(_))));
    }

    #[test]
    fn missing_snapshot_file_is_fatal() {
        let result = load_atm_master("/nonexistent/atm_master.csv");
        assert!(matches!(result, Err(EngineError::AtmMaster(_))));
    }
}
