// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The EPA/EIA crosswalk: the many-to-many linking table between monitored
//! combustion units (CAMD side) and generator records (EIA side), and its
//! partition into connected components.
//!
//! Ramp-rate limits are a property of the combined combustor+generator
//! train, not of a single monitored unit, so units that share a fuel or
//! exhaust path must be analyzed together.  Each crosswalk row is an edge
//! between one combustor and one generator; the connected components of
//! that graph are the analysis units of this crate.

mod components;
mod filtering;
mod surrogates;

pub use components::{assign_components, make_component_ids, AssignedRow};
pub use filtering::{filter_retirements, remove_unmatched};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of the EPA/EIA crosswalk.
///
/// Field names follow the upstream release columns (serde renames map the
/// CSV headers); capacities are nameplate MW.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CrosswalkRow {
    #[serde(rename = "CAMD_PLANT_ID")]
    pub camd_plant_id: u32,
    #[serde(rename = "CAMD_UNIT_ID")]
    pub camd_unit_id: String,
    #[serde(rename = "EIA_PLANT_ID")]
    pub eia_plant_id: Option<u32>,
    #[serde(rename = "EIA_GENERATOR_ID")]
    pub eia_generator_id: String,
    #[serde(rename = "CAMD_NAMEPLATE_CAPACITY")]
    pub camd_nameplate_capacity: Option<f64>,
    #[serde(rename = "EIA_NAMEPLATE_CAPACITY")]
    pub eia_nameplate_capacity: Option<f64>,
    #[serde(rename = "CAMD_FUEL_TYPE")]
    pub camd_fuel_type: Option<String>,
    #[serde(rename = "EIA_FUEL_TYPE")]
    pub eia_fuel_type: Option<String>,
    #[serde(rename = "EIA_UNIT_TYPE")]
    pub eia_unit_type: Option<String>,
    /// Match-quality classification of the generator match.
    #[serde(rename = "MATCH_TYPE_GEN")]
    pub match_type_gen: String,
    /// Retirement year; 0 means not retired.
    #[serde(rename = "CAMD_RETIRE_YEAR")]
    pub camd_retire_year: i32,
    #[serde(rename = "CAMD_STATUS")]
    pub camd_status: String,
    #[serde(rename = "CAMD_STATUS_DATE")]
    pub camd_status_date: Option<NaiveDate>,
}
