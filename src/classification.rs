// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module defines the simplified fuel and technology classifications
//! used to roll crosswalk rows up to the component level.
//!
//! The mapping tables are exhaustive literal enumerations.  A fuel code that
//! is missing from its table is a data-integrity fault and must surface as an
//! [`UnmappedCode`][crate::Error] error at the call site; it must never be
//! silently coalesced to "missing", because that would be indistinguishable
//! from a genuinely absent reading.

use std::collections::BTreeSet;
use std::fmt::Display;

/// A simplified fuel category, condensed from the dozens of raw CAMD and EIA
/// fuel codes.
///
/// The variants are declared in alphabetical order of their display names, so
/// the derived `Ord` breaks capacity ties the same way a sorted group-by
/// would: alphabetically-first category wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum FuelCategory {
    Coal,
    Gas,
    Oil,
    Other,
}

impl Display for FuelCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FuelCategory::Coal => write!(f, "coal"),
            FuelCategory::Gas => write!(f, "gas"),
            FuelCategory::Oil => write!(f, "oil"),
            FuelCategory::Other => write!(f, "other"),
        }
    }
}

/// The simplified technology type of a component, derived from the exact set
/// of EIA unit-type codes observed across its generators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TechType {
    SteamTurbine,
    GasTurbine,
    CombinedCycle,
    InternalCombustion,
}

impl TechType {
    /// The exclusion radius around a startup or shutdown, in hours.
    ///
    /// Samples within this distance of a transient are unreliable for ramp
    /// extrema.  Gas turbines and internal combustion engines ramp fast
    /// enough that no exclusion is applied.
    pub fn exclusion_radius_hours(&self) -> Option<f64> {
        match self {
            TechType::SteamTurbine => Some(5.0),
            TechType::CombinedCycle => Some(7.0),
            TechType::GasTurbine | TechType::InternalCombustion => None,
        }
    }
}

impl Display for TechType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TechType::SteamTurbine => write!(f, "steam_turbine"),
            TechType::GasTurbine => write!(f, "gas_turbine"),
            TechType::CombinedCycle => write!(f, "combined_cycle"),
            TechType::InternalCombustion => write!(f, "internal_combustion"),
        }
    }
}

/// Maps a raw CAMD fuel-type name to its simplified category.
///
/// Returns `None` for names absent from the table; the caller decides whether
/// that is an error.
pub fn camd_fuel_category(code: &str) -> Option<FuelCategory> {
    match code {
        "Pipeline Natural Gas" | "Natural Gas" | "Process Gas" | "Other Gas" => {
            Some(FuelCategory::Gas)
        }
        "Coal" | "Coal Refuse" => Some(FuelCategory::Coal),
        "Diesel Oil" | "Residual Oil" | "Other Oil" | "Petroleum Coke" => Some(FuelCategory::Oil),
        "Wood" | "Tire Derived Fuel" | "Other Solid Fuel" => Some(FuelCategory::Other),
        _ => None,
    }
}

/// Maps a raw EIA energy-source code to its simplified category.
///
/// Returns `None` for codes absent from the table; the caller decides whether
/// that is an error.
pub fn eia_fuel_category(code: &str) -> Option<FuelCategory> {
    match code {
        "ANT" | "BIT" | "CBL" | "LIG" | "RC" | "SC" | "SUB" | "WC" => Some(FuelCategory::Coal),
        // SUN: gas plants with 'solar' in the name, mis-categorized upstream
        "BFG" | "LFG" | "NG" | "OBG" | "OG" | "PG" | "SGC" | "SGP" | "SUN" => {
            Some(FuelCategory::Gas)
        }
        "DFO" | "JF" | "KER" | "PC" | "RFO" | "WO" => Some(FuelCategory::Oil),
        "AB" | "BLQ" | "MSB" | "MSN" | "MSW" | "MWH" | "OBL" | "OBS" | "OTH" | "PUR" | "SLW"
        | "TDF" | "WDL" | "WDS" | "WH" => Some(FuelCategory::Other),
        _ => None,
    }
}

/// Maps the exact set of EIA unit-type codes in a component to a simplified
/// technology type.
///
/// The table is keyed on the whole set, not per code: a lone CT behaves like
/// a combined cycle, and the multi-code entries cover crosswalk rows that
/// look mislabeled or are industrial cogeneration.  A set with no entry maps
/// to `None`.
pub fn tech_type_for_unit_types(codes: &BTreeSet<String>) -> Option<TechType> {
    let key: Vec<&str> = codes.iter().map(String::as_str).collect();
    match key.as_slice() {
        ["ST"] => Some(TechType::SteamTurbine),
        ["GT"] => Some(TechType::GasTurbine),
        // around half of solo CTs may really be GTs, but there are too few
        // to be worth classifying by operational characteristics
        ["CT"] => Some(TechType::CombinedCycle),
        ["CA"] => Some(TechType::CombinedCycle),
        ["CS"] => Some(TechType::CombinedCycle),
        ["IC"] => Some(TechType::InternalCombustion),
        ["CA", "CT"] => Some(TechType::CombinedCycle),
        ["GT", "ST"] => Some(TechType::CombinedCycle),
        ["CA", "GT"] => Some(TechType::CombinedCycle),
        ["CA", "CT", "ST"] => Some(TechType::CombinedCycle),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(codes: &[&str]) -> BTreeSet<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_tech_type_lookup() {
        assert_eq!(
            tech_type_for_unit_types(&set(&["ST"])),
            Some(TechType::SteamTurbine)
        );
        assert_eq!(
            tech_type_for_unit_types(&set(&["CT", "CA"])),
            Some(TechType::CombinedCycle)
        );
        // insertion order must not matter; the key is the sorted set
        assert_eq!(
            tech_type_for_unit_types(&set(&["ST", "CT", "CA"])),
            Some(TechType::CombinedCycle)
        );
        assert_eq!(tech_type_for_unit_types(&set(&["ST", "IC"])), None);
        assert_eq!(tech_type_for_unit_types(&set(&[])), None);
    }

    #[test]
    fn test_fuel_maps() {
        assert_eq!(camd_fuel_category("Pipeline Natural Gas"), Some(FuelCategory::Gas));
        assert_eq!(camd_fuel_category("Tire Derived Fuel"), Some(FuelCategory::Other));
        assert_eq!(camd_fuel_category("Antimatter"), None);
        assert_eq!(eia_fuel_category("SUN"), Some(FuelCategory::Gas));
        assert_eq!(eia_fuel_category("CBL"), Some(FuelCategory::Coal));
        assert_eq!(eia_fuel_category("XYZ"), None);
    }

    #[test]
    fn test_fuel_category_tie_break_order() {
        // alphabetical by display name, so min() picks the tie winner
        let mut cats = vec![
            FuelCategory::Other,
            FuelCategory::Gas,
            FuelCategory::Oil,
            FuelCategory::Coal,
        ];
        cats.sort();
        assert_eq!(
            cats,
            vec![
                FuelCategory::Coal,
                FuelCategory::Gas,
                FuelCategory::Oil,
                FuelCategory::Other,
            ]
        );
    }

    #[test]
    fn test_exclusion_radii() {
        assert_eq!(TechType::SteamTurbine.exclusion_radius_hours(), Some(5.0));
        assert_eq!(TechType::CombinedCycle.exclusion_radius_hours(), Some(7.0));
        assert_eq!(TechType::GasTurbine.exclusion_radius_hours(), None);
        assert_eq!(TechType::InternalCombustion.exclusion_radius_hours(), None);
    }
}
