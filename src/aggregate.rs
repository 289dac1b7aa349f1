// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Rolling crosswalk rows up to per-component profiles.
//!
//! A component's constituents can disagree about fuel and technology, and a
//! physical unit can appear in several crosswalk rows.  The rollup therefore
//! deduplicates to one row per (component, physical unit) before summing
//! capacity, and picks disputed labels by total installed capacity.

use std::collections::{BTreeMap, BTreeSet};

use crate::classification::{
    camd_fuel_category, eia_fuel_category, tech_type_for_unit_types, FuelCategory, TechType,
};
use crate::crosswalk::AssignedRow;
use crate::Error;

/// Derived attributes of one component.
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentProfile {
    pub component_id: u32,
    /// Distinct EIA unit-type codes observed across the component.
    pub eia_unit_types: BTreeSet<String>,
    /// Simplified technology label for the unit-type set, when the set has
    /// an entry in the lookup table.
    pub tech_type: Option<TechType>,
    /// Summed CAMD nameplate capacity, one row per physical combustor; a
    /// zero sum is reported as missing.
    pub capacity_camd: Option<f64>,
    /// Summed EIA nameplate capacity, one row per physical generator; a
    /// zero sum is reported as missing.
    pub capacity_eia: Option<f64>,
    /// Simplified CAMD fuel category with the largest installed capacity.
    pub camd_fuel: Option<FuelCategory>,
    /// Simplified EIA fuel category with the largest installed capacity.
    pub eia_fuel: Option<FuelCategory>,
}

/// Which side of the crosswalk a rollup reads its unit key, capacity and
/// fuel code from.
#[derive(Clone, Copy)]
enum Agency {
    Camd,
    Eia,
}

impl Agency {
    fn unit_key<'a>(&self, row: &'a AssignedRow) -> (u32, &'a str) {
        match self {
            Agency::Camd => (row.row.camd_plant_id, row.row.camd_unit_id.as_str()),
            Agency::Eia => (row.row.camd_plant_id, row.row.eia_generator_id.as_str()),
        }
    }

    fn capacity(&self, row: &AssignedRow) -> Option<f64> {
        match self {
            Agency::Camd => row.row.camd_nameplate_capacity,
            Agency::Eia => row.row.eia_nameplate_capacity,
        }
    }

    fn fuel_code<'a>(&self, row: &'a AssignedRow) -> Option<&'a str> {
        match self {
            Agency::Camd => row.row.camd_fuel_type.as_deref(),
            Agency::Eia => row.row.eia_fuel_type.as_deref(),
        }
    }

    fn fuel_category(&self, code: &str) -> Result<FuelCategory, Error> {
        let category = match self {
            Agency::Camd => camd_fuel_category(code),
            Agency::Eia => eia_fuel_category(code),
        };
        category.ok_or_else(|| {
            let table = match self {
                Agency::Camd => "CAMD",
                Agency::Eia => "EIA",
            };
            Error::unmapped_code(format!(
                "Fuel code {code:?} is not present in the {table} fuel mapping."
            ))
        })
    }
}

/// Computes one [`ComponentProfile`] per component id found in the rows.
///
/// Returns an error if any non-missing fuel code is absent from its mapping
/// table.
pub fn aggregate_components(rows: &[AssignedRow]) -> Result<Vec<ComponentProfile>, Error> {
    let mut by_component: BTreeMap<u32, Vec<&AssignedRow>> = BTreeMap::new();
    for row in rows {
        by_component.entry(row.component_id).or_default().push(row);
    }

    let mut profiles = Vec::with_capacity(by_component.len());
    for (component_id, rows) in by_component {
        let eia_unit_types: BTreeSet<String> = rows
            .iter()
            .filter_map(|r| r.row.eia_unit_type.clone())
            .collect();
        let tech_type = tech_type_for_unit_types(&eia_unit_types);

        profiles.push(ComponentProfile {
            component_id,
            tech_type,
            capacity_camd: summed_capacity(&rows, Agency::Camd),
            capacity_eia: summed_capacity(&rows, Agency::Eia),
            camd_fuel: fuel_by_capacity(&rows, Agency::Camd)?,
            eia_fuel: fuel_by_capacity(&rows, Agency::Eia)?,
            eia_unit_types,
        });
    }
    Ok(profiles)
}

/// One row per physical unit, first occurrence wins.
fn dedup_by_unit<'a>(rows: &[&'a AssignedRow], agency: Agency) -> Vec<&'a AssignedRow> {
    let mut seen = BTreeSet::new();
    let mut deduped = Vec::new();
    for row in rows {
        let (plant, unit) = agency.unit_key(row);
        if seen.insert((plant, unit.to_string())) {
            deduped.push(*row);
        }
    }
    deduped
}

/// Sums one agency's nameplate capacity over the deduplicated units.
///
/// A sum of exactly zero means no unit carried a reading; it is reported as
/// missing rather than as a spurious zero denominator.
fn summed_capacity(rows: &[&AssignedRow], agency: Agency) -> Option<f64> {
    let total: f64 = dedup_by_unit(rows, agency)
        .iter()
        .filter_map(|row| agency.capacity(row))
        .sum();
    (total != 0.0).then_some(total)
}

/// Picks the simplified fuel category with the largest capacity across the
/// deduplicated units; ties go to the alphabetically-first category.
fn fuel_by_capacity(rows: &[&AssignedRow], agency: Agency) -> Result<Option<FuelCategory>, Error> {
    let mut capacity_by_category: BTreeMap<FuelCategory, f64> = BTreeMap::new();
    for row in dedup_by_unit(rows, agency) {
        let Some(code) = agency.fuel_code(row) else {
            continue;
        };
        let category = agency.fuel_category(code)?;
        if let Some(capacity) = agency.capacity(row) {
            *capacity_by_category.entry(category).or_insert(0.0) += capacity;
        }
    }

    let mut winner: Option<(FuelCategory, f64)> = None;
    for (category, total) in capacity_by_category {
        if total == 0.0 {
            continue;
        }
        // strictly-greater keeps the alphabetically-first category on ties,
        // because BTreeMap iterates categories in sorted order
        if winner.is_none_or(|(_, best)| total > best) {
            winner = Some((category, total));
        }
    }
    Ok(winner.map(|(category, _)| category))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crosswalk::test_rows::row;

    fn assigned(component_id: u32, unit_id_epa: u32, row: crate::CrosswalkRow) -> AssignedRow {
        AssignedRow {
            component_id,
            unit_id_epa,
            row,
        }
    }

    #[test]
    fn test_unit_type_set_and_tech_label() {
        let mut a = row(1, "A", "G1");
        a.eia_unit_type = Some("CT".to_string());
        let mut b = row(1, "B", "G2");
        b.eia_unit_type = Some("CA".to_string());
        let rows = vec![assigned(0, 1, a), assigned(0, 2, b)];

        let profiles = aggregate_components(&rows).unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(
            profiles[0].eia_unit_types,
            BTreeSet::from(["CA".to_string(), "CT".to_string()])
        );
        assert_eq!(profiles[0].tech_type, Some(TechType::CombinedCycle));
    }

    #[test]
    fn test_unknown_unit_type_set_maps_to_missing() {
        let mut a = row(1, "A", "G1");
        a.eia_unit_type = Some("ST".to_string());
        let mut b = row(1, "B", "G2");
        b.eia_unit_type = Some("IC".to_string());
        let profiles =
            aggregate_components(&[assigned(0, 1, a), assigned(0, 2, b)]).unwrap();
        assert_eq!(profiles[0].tech_type, None);
    }

    #[test]
    fn test_capacity_deduplicates_physical_units() {
        // combustor A is linked to two generators; its 100 MW must count once
        let mut a1 = row(1, "A", "G1");
        a1.camd_nameplate_capacity = Some(100.0);
        a1.eia_nameplate_capacity = Some(60.0);
        let mut a2 = row(1, "A", "G2");
        a2.camd_nameplate_capacity = Some(100.0);
        a2.eia_nameplate_capacity = Some(40.0);

        let profiles =
            aggregate_components(&[assigned(0, 1, a1), assigned(0, 1, a2)]).unwrap();
        assert_eq!(profiles[0].capacity_camd, Some(100.0));
        assert_eq!(profiles[0].capacity_eia, Some(100.0));
    }

    #[test]
    fn test_zero_capacity_is_missing() {
        let mut a = row(1, "A", "G1");
        a.camd_nameplate_capacity = Some(0.0);
        a.eia_nameplate_capacity = None;
        let profiles = aggregate_components(&[assigned(0, 1, a)]).unwrap();
        assert_eq!(profiles[0].capacity_camd, None);
        assert_eq!(profiles[0].capacity_eia, None);
    }

    #[test]
    fn test_fuel_by_capacity_picks_largest() {
        let mut coal = row(1, "A", "G1");
        coal.camd_fuel_type = Some("Coal".to_string());
        coal.camd_nameplate_capacity = Some(300.0);
        let mut gas = row(1, "B", "G2");
        gas.camd_fuel_type = Some("Natural Gas".to_string());
        gas.camd_nameplate_capacity = Some(120.0);

        let profiles =
            aggregate_components(&[assigned(0, 1, coal), assigned(0, 2, gas)]).unwrap();
        assert_eq!(profiles[0].camd_fuel, Some(FuelCategory::Coal));
    }

    #[test]
    fn test_fuel_tie_breaks_alphabetically() {
        let mut oil = row(1, "A", "G1");
        oil.camd_fuel_type = Some("Diesel Oil".to_string());
        oil.camd_nameplate_capacity = Some(50.0);
        let mut coal = row(1, "B", "G2");
        coal.camd_fuel_type = Some("Coal".to_string());
        coal.camd_nameplate_capacity = Some(50.0);

        let profiles =
            aggregate_components(&[assigned(0, 1, oil), assigned(0, 2, coal)]).unwrap();
        assert_eq!(profiles[0].camd_fuel, Some(FuelCategory::Coal));
    }

    #[test]
    fn test_unmapped_fuel_code_is_an_error() {
        let mut bad = row(1, "A", "G1");
        bad.eia_fuel_type = Some("PLUTONIUM".to_string());
        assert!(aggregate_components(&[assigned(0, 1, bad)]).is_err_and(|e| e
            == Error::unmapped_code(
                "Fuel code \"PLUTONIUM\" is not present in the EIA fuel mapping."
            )));
    }

    #[test]
    fn test_fuel_with_no_usable_capacity_is_missing() {
        let mut a = row(1, "A", "G1");
        a.camd_fuel_type = Some("Coal".to_string());
        a.camd_nameplate_capacity = Some(0.0);
        let mut b = row(1, "B", "G2");
        b.camd_fuel_type = Some("Natural Gas".to_string());
        b.camd_nameplate_capacity = None;

        let profiles =
            aggregate_components(&[assigned(0, 1, a), assigned(0, 2, b)]).unwrap();
        assert_eq!(profiles[0].camd_fuel, None);
    }
}
