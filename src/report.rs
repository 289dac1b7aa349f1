// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! CSV export of the component aggregates and the component membership
//! table.
//!
//! Timestamps are written as ISO-8601 UTC; the unit-type set is serialized
//! as an ordered tuple-like string such as `('CA', 'CT')`.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::crosswalk::AssignedRow;
use crate::{ComponentAggregate, ComponentProfile, Error};

fn field<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(T::to_string).unwrap_or_default()
}

fn timestamp_field(value: &Option<DateTime<Utc>>) -> String {
    value.map(|ts| ts.to_rfc3339()).unwrap_or_default()
}

/// Serializes a unit-type set as an ordered tuple-like string.
fn unit_type_tuple(types: &std::collections::BTreeSet<String>) -> String {
    let quoted: Vec<String> = types.iter().map(|t| format!("'{t}'")).collect();
    if quoted.len() == 1 {
        format!("({},)", quoted[0])
    } else {
        format!("({})", quoted.join(", "))
    }
}

/// Writes the component-aggregate table, one row per component, joining
/// each component's profile to its ramp statistics.
pub fn write_component_aggs(
    path: &Path,
    profiles: &[ComponentProfile],
    aggs: &[ComponentAggregate],
) -> Result<(), Error> {
    let profiles_by_id: BTreeMap<u32, &ComponentProfile> =
        profiles.iter().map(|p| (p.component_id, p)).collect();

    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| Error::io(format!("Can't create {}: {e}", path.display())))?;
    writer
        .write_record([
            "component_id",
            "EIA_UNIT_TYPE",
            "simple_EIA_UNIT_TYPE",
            "capacity_CAMD",
            "capacity_EIA",
            "simple_CAMD_FUEL_TYPE_via_capacity",
            "simple_EIA_FUEL_TYPE_via_capacity",
            "sum_of_max_gross_load_mw",
            "max_of_sum_gross_load_mw",
            "max_ramp",
            "min_ramp",
            "idxmax_ramp",
            "idxmin_ramp",
            "max_abs_ramp",
            "idxmax_abs_ramp",
            "ramp_factor_CAMD",
            "ramp_factor_EIA",
            "ramp_factor_sum_max",
            "ramp_factor_max_sum",
        ])
        .map_err(|e| Error::io(format!("Can't write to {}: {e}", path.display())))?;

    for agg in aggs {
        let profile = profiles_by_id.get(&agg.component_id);
        let record = [
            agg.component_id.to_string(),
            profile.map_or_else(String::new, |p| unit_type_tuple(&p.eia_unit_types)),
            profile.map_or_else(String::new, |p| field(&p.tech_type)),
            profile.map_or_else(String::new, |p| field(&p.capacity_camd)),
            profile.map_or_else(String::new, |p| field(&p.capacity_eia)),
            profile.map_or_else(String::new, |p| field(&p.camd_fuel)),
            profile.map_or_else(String::new, |p| field(&p.eia_fuel)),
            field(&agg.sum_of_max_gross_load_mw),
            field(&agg.max_of_sum_gross_load_mw),
            field(&agg.max_ramp),
            field(&agg.min_ramp),
            timestamp_field(&agg.idxmax_ramp),
            timestamp_field(&agg.idxmin_ramp),
            field(&agg.max_abs_ramp),
            timestamp_field(&agg.idxmax_abs_ramp),
            field(&agg.ramp_factor_camd),
            field(&agg.ramp_factor_eia),
            field(&agg.ramp_factor_sum_max),
            field(&agg.ramp_factor_max_sum),
        ];
        writer
            .write_record(&record)
            .map_err(|e| Error::io(format!("Can't write to {}: {e}", path.display())))?;
    }
    writer
        .flush()
        .map_err(|e| Error::io(format!("Can't flush {}: {e}", path.display())))?;
    Ok(())
}

/// Writes the component membership table: every joined crosswalk row with
/// its component id prepended, for auditing which physical units formed
/// each component.
pub fn write_key_map(path: &Path, key_map: &[AssignedRow]) -> Result<(), Error> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| Error::io(format!("Can't create {}: {e}", path.display())))?;
    writer
        .write_record([
            "component_id",
            "unit_id_epa",
            "CAMD_PLANT_ID",
            "CAMD_UNIT_ID",
            "EIA_PLANT_ID",
            "EIA_GENERATOR_ID",
            "CAMD_NAMEPLATE_CAPACITY",
            "EIA_NAMEPLATE_CAPACITY",
            "CAMD_FUEL_TYPE",
            "EIA_FUEL_TYPE",
            "EIA_UNIT_TYPE",
            "MATCH_TYPE_GEN",
            "CAMD_RETIRE_YEAR",
            "CAMD_STATUS",
            "CAMD_STATUS_DATE",
        ])
        .map_err(|e| Error::io(format!("Can't write to {}: {e}", path.display())))?;

    for assigned in key_map {
        let row = &assigned.row;
        let record = [
            assigned.component_id.to_string(),
            assigned.unit_id_epa.to_string(),
            row.camd_plant_id.to_string(),
            row.camd_unit_id.clone(),
            field(&row.eia_plant_id),
            row.eia_generator_id.clone(),
            field(&row.camd_nameplate_capacity),
            field(&row.eia_nameplate_capacity),
            field(&row.camd_fuel_type),
            field(&row.eia_fuel_type),
            field(&row.eia_unit_type),
            row.match_type_gen.clone(),
            row.camd_retire_year.to_string(),
            row.camd_status.clone(),
            field(&row.camd_status_date),
        ];
        writer
            .write_record(&record)
            .map_err(|e| Error::io(format!("Can't write to {}: {e}", path.display())))?;
    }
    writer
        .flush()
        .map_err(|e| Error::io(format!("Can't flush {}: {e}", path.display())))?;
    Ok(())
}
