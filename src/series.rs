// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Types for per-unit hourly load timeseries.
//!
//! The event detection and distance scans in this crate are only defined
//! within one unit's own series, so the flat reading table loaded from disk
//! must be grouped into [`UnitSeries`] values before any of them can run.
//! [`group_readings`] is the single entry point for that grouping; it fails
//! loudly on duplicate (unit, timestamp) pairs instead of producing a series
//! that would silently corrupt edge detection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

/// One hourly reading of one monitored combustion unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoadReading {
    /// EIA plant id (the crosswalk's CAMD plant id refers to the same plant).
    pub plant_id_eia: u32,
    /// CAMD unit id within the plant.
    pub unitid: String,
    /// Surrogate key for the (plant, unit) pair, unique across the dataset.
    pub unit_id_epa: u32,
    /// Hour start, UTC.
    pub operating_datetime_utc: DateTime<Utc>,
    /// Gross electrical output in MW; `None` when the monitor reported
    /// nothing for the hour.
    pub gross_load_mw: Option<f64>,
}

/// One sample of a [`UnitSeries`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub gross_load_mw: Option<f64>,
}

/// The chronologically ordered load series of one monitored unit.
///
/// Construction validates the series invariants: non-empty, strictly
/// increasing timestamps.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitSeries {
    /// EIA plant id of the unit.
    pub plant_id_eia: u32,
    /// CAMD unit id within the plant.
    pub unitid: String,
    /// Surrogate key for the (plant, unit) pair.
    pub unit_id_epa: u32,
    samples: Vec<Sample>,
}

impl UnitSeries {
    /// Creates a new [`UnitSeries`] from the given samples.
    ///
    /// Returns an error if the samples are empty or their timestamps are not
    /// strictly increasing.
    pub fn try_new(
        plant_id_eia: u32,
        unitid: impl Into<String>,
        unit_id_epa: u32,
        samples: Vec<Sample>,
    ) -> Result<Self, Error> {
        if samples.is_empty() {
            return Err(Error::invalid_series(format!(
                "Unit {unit_id_epa} has an empty load series."
            )));
        }
        for pair in samples.windows(2) {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(Error::invalid_series(format!(
                    "Unit {unit_id_epa} has non-increasing timestamps: {} then {}.",
                    pair[0].timestamp, pair[1].timestamp
                )));
            }
        }
        Ok(Self {
            plant_id_eia,
            unitid: unitid.into(),
            unit_id_epa,
            samples,
        })
    }

    /// Returns the samples of the series.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Returns the first observed timestamp.
    pub fn first_timestamp(&self) -> DateTime<Utc> {
        self.samples[0].timestamp
    }

    /// Returns the last observed timestamp.
    pub fn last_timestamp(&self) -> DateTime<Utc> {
        self.samples[self.samples.len() - 1].timestamp
    }

    /// Binarizes the series as "generating" (`load > 0`).
    ///
    /// A missing interior value binarizes to off.  Missing *boundary* values
    /// are rejected up front by [`ensure_known_boundaries`][crate::events];
    /// they would make the edge and distance math undefined.
    pub(crate) fn binarized(&self) -> Vec<bool> {
        self.samples
            .iter()
            .map(|s| s.gross_load_mw.is_some_and(|v| v > 0.0))
            .collect()
    }
}

/// Groups a flat reading table into one [`UnitSeries`] per unit.
///
/// Readings are sorted by (unit, timestamp); a duplicate (unit, timestamp)
/// pair is an error.  This is the grouped counterpart of the per-series
/// operations in [`events`][crate::events]: running them on readings that
/// were never grouped by unit would diff across unit boundaries.
pub fn group_readings(mut readings: Vec<LoadReading>) -> Result<Vec<UnitSeries>, Error> {
    readings.sort_by(|a, b| {
        (a.unit_id_epa, a.operating_datetime_utc).cmp(&(b.unit_id_epa, b.operating_datetime_utc))
    });

    let mut units = Vec::new();
    let mut iter = readings.into_iter().peekable();
    while let Some(first) = iter.next() {
        let unit_id_epa = first.unit_id_epa;
        let plant_id_eia = first.plant_id_eia;
        let unitid = first.unitid.clone();
        let mut samples = vec![Sample {
            timestamp: first.operating_datetime_utc,
            gross_load_mw: first.gross_load_mw,
        }];
        while let Some(next) = iter.next_if(|r| r.unit_id_epa == unit_id_epa) {
            if next.operating_datetime_utc == samples[samples.len() - 1].timestamp {
                return Err(Error::invalid_series(format!(
                    "Unit {unit_id_epa} has duplicate readings at {}.",
                    next.operating_datetime_utc
                )));
            }
            samples.push(Sample {
                timestamp: next.operating_datetime_utc,
                gross_load_mw: next.gross_load_mw,
            });
        }
        units.push(UnitSeries::try_new(
            plant_id_eia,
            unitid,
            unit_id_epa,
            samples,
        )?);
    }
    Ok(units)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, hour, 0, 0).unwrap()
    }

    fn reading(unit: u32, hour: u32, load: Option<f64>) -> LoadReading {
        LoadReading {
            plant_id_eia: 3,
            unitid: format!("U{unit}"),
            unit_id_epa: unit,
            operating_datetime_utc: ts(hour),
            gross_load_mw: load,
        }
    }

    #[test]
    fn test_series_validation() {
        assert!(UnitSeries::try_new(3, "U1", 1, vec![])
            .is_err_and(|e| e == Error::invalid_series("Unit 1 has an empty load series.")));

        let out_of_order = vec![
            Sample {
                timestamp: ts(1),
                gross_load_mw: Some(1.0),
            },
            Sample {
                timestamp: ts(1),
                gross_load_mw: Some(2.0),
            },
        ];
        assert!(UnitSeries::try_new(3, "U1", 1, out_of_order).is_err());
    }

    #[test]
    fn test_group_readings_sorts_and_splits() {
        let readings = vec![
            reading(2, 1, Some(4.0)),
            reading(1, 0, Some(1.0)),
            reading(2, 0, Some(3.0)),
            reading(1, 1, None),
        ];
        let units = group_readings(readings).unwrap();
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].unit_id_epa, 1);
        assert_eq!(units[0].samples().len(), 2);
        assert_eq!(units[0].samples()[1].gross_load_mw, None);
        assert_eq!(units[1].unit_id_epa, 2);
        assert_eq!(units[1].first_timestamp(), ts(0));
        assert_eq!(units[1].last_timestamp(), ts(1));
    }

    #[test]
    fn test_group_readings_rejects_duplicates() {
        let readings = vec![reading(1, 0, Some(1.0)), reading(1, 0, Some(2.0))];
        assert!(group_readings(readings)
            .is_err_and(|e| e
                == Error::invalid_series(
                    "Unit 1 has duplicate readings at 2020-01-01 00:00:00 UTC."
                )));
    }

    #[test]
    fn test_binarized_treats_missing_as_off() {
        let units = group_readings(vec![
            reading(1, 0, Some(2.0)),
            reading(1, 1, None),
            reading(1, 2, Some(0.0)),
            reading(1, 3, Some(0.5)),
        ])
        .unwrap();
        assert_eq!(units[0].binarized(), vec![true, false, false, true]);
    }
}
