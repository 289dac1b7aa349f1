// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Flagging samples too close to a startup or shutdown for ramp analysis.
//!
//! Load swings during a startup or shutdown transient reflect the transient
//! itself, not the dispatchable ramping capability of the component, so
//! samples within a technology-specific radius of the nearest transient are
//! excluded from the ramp extrema.

use crate::events::distance::distance_from_downtime;
use crate::{Error, TechType, UnitSeries};

/// Computes the per-sample exclusion mask for one unit.
///
/// A sample is excluded when its distance to the nearest transient is within
/// the exclusion radius of the component's technology type.  Units whose
/// component has no technology label, or whose technology has no exclusion
/// radius, get an all-false mask.
pub fn flag_exclusions(
    series: &UnitSeries,
    tech_type: Option<TechType>,
    boundary_offset_hours: i64,
) -> Result<Vec<bool>, Error> {
    let Some(radius) = tech_type.and_then(|tech| tech.exclusion_radius_hours()) else {
        return Ok(vec![false; series.samples().len()]);
    };
    let distances = distance_from_downtime(series, boundary_offset_hours)?;
    Ok(distances
        .hours_distance
        .into_iter()
        .map(|hours| hours <= radius)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::tests::{loads, series};

    #[test]
    fn test_steam_turbine_radius() {
        // shutdown mark at hour 8, so hours 3..=8 are within 5h of it; the
        // idle samples after it face no upcoming shutdown and stay included
        let values: Vec<f64> = vec![vec![2.0; 8], vec![0.0; 4]].concat();
        let s = series(&loads(&values));
        let mask = flag_exclusions(&s, Some(TechType::SteamTurbine), 24).unwrap();

        let expected: Vec<bool> = (0..12).map(|h| (3..=8).contains(&h)).collect();
        assert_eq!(mask, expected);
    }

    #[test]
    fn test_gas_turbine_has_no_exclusions() {
        let s = series(&loads(&[2.0, 0.0, 2.0, 0.0]));
        let mask = flag_exclusions(&s, Some(TechType::GasTurbine), 24).unwrap();
        assert_eq!(mask, vec![false; 4]);
    }

    #[test]
    fn test_unlabeled_component_has_no_exclusions() {
        let s = series(&loads(&[2.0, 0.0, 2.0, 0.0]));
        let mask = flag_exclusions(&s, None, 24).unwrap();
        assert_eq!(mask, vec![false; 4]);
    }

    #[test]
    fn test_fully_excluded_series() {
        // every sample within 7h of the startup at hour 1 or shutdown at hour 3
        let s = series(&loads(&[0.0, 2.0, 2.0, 0.0]));
        let mask = flag_exclusions(&s, Some(TechType::CombinedCycle), 24).unwrap();
        assert_eq!(mask, vec![true; 4]);
    }
}
