// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Loading CEMS readings and the EPA/EIA crosswalk from disk.
//!
//! CEMS data is expected as one CSV file per (year, state) partition named
//! `epacems-<year>-<state>.csv` under a data directory, mirroring the
//! upstream dataset's partitioning.  Partitions that are absent on disk are
//! skipped, since not every state reports in every year.

use std::path::Path;

use serde::Deserialize;

use crate::{CrosswalkRow, Error, LoadReading};

/// Environment variable pointing at the CEMS data directory.
pub const EPA_CEMS_DATA_PATH_ENV: &str = "EPA_CEMS_DATA_PATH";

/// All US state and territory abbreviations appearing in CEMS partitions.
pub const ALL_STATES: [&str; 57] = [
    "AK", "AL", "AR", "AS", "AZ", "CA", "CO", "CT", "DC", "DE", "FL", "GA", "GU", "HI", "IA",
    "ID", "IL", "IN", "KS", "KY", "LA", "MA", "MD", "ME", "MI", "MN", "MO", "MP", "MS", "MT",
    "NA", "NC", "ND", "NE", "NH", "NJ", "NM", "NV", "NY", "OH", "OK", "OR", "PA", "PR", "RI",
    "SC", "SD", "TN", "TX", "UT", "VA", "VI", "VT", "WA", "WI", "WV", "WY",
];

#[derive(Debug, Deserialize)]
struct CemsRecord {
    plant_id_eia: u32,
    unitid: String,
    unit_id_epa: u32,
    operating_datetime_utc: chrono::DateTime<chrono::Utc>,
    gross_load_mw: Option<f64>,
}

/// Loads the CEMS readings for the given states and years.
///
/// Missing partition files are skipped; unreadable or malformed ones are an
/// error.
pub fn load_epacems(
    data_dir: &Path,
    states: &[String],
    years: &[i32],
) -> Result<Vec<LoadReading>, Error> {
    let mut readings = Vec::new();
    for year in years {
        for state in states {
            let path = data_dir.join(format!("epacems-{year}-{state}.csv"));
            if !path.exists() {
                tracing::debug!("No CEMS partition at {}; skipping.", path.display());
                continue;
            }
            let mut reader = csv::Reader::from_path(&path).map_err(|e| {
                Error::io(format!("Can't open CEMS partition {}: {e}", path.display()))
            })?;
            for record in reader.deserialize() {
                let record: CemsRecord = record.map_err(|e| {
                    Error::io(format!(
                        "Malformed CEMS record in {}: {e}",
                        path.display()
                    ))
                })?;
                readings.push(LoadReading {
                    plant_id_eia: record.plant_id_eia,
                    unitid: record.unitid,
                    unit_id_epa: record.unit_id_epa,
                    operating_datetime_utc: record.operating_datetime_utc,
                    gross_load_mw: record.gross_load_mw,
                });
            }
        }
    }
    tracing::info!(
        "Loaded {} CEMS readings for {} states x {} years.",
        readings.len(),
        states.len(),
        years.len()
    );
    Ok(readings)
}

/// Loads the EPA/EIA crosswalk from a CSV file.
pub fn load_epa_crosswalk(path: &Path) -> Result<Vec<CrosswalkRow>, Error> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| Error::io(format!("Can't open crosswalk {}: {e}", path.display())))?;
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let row: CrosswalkRow = record.map_err(|e| {
            Error::io(format!("Malformed crosswalk row in {}: {e}", path.display()))
        })?;
        rows.push(row);
    }
    tracing::info!("Loaded {} crosswalk rows from {}.", rows.len(), path.display());
    Ok(rows)
}
