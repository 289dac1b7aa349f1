// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Component-level timeseries aggregation and ramp extrema.
//!
//! Constituent units' series are merged into one series per component by
//! summing load and OR-ing the exclusion flags per timestamp.  The ramp is
//! the hour-over-hour first difference of the summed load; its extrema are
//! taken over the non-excluded samples only.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::{ComponentProfile, UnitSeries};

/// One unit's series together with its component assignment and exclusion
/// mask, ready for merging.
#[derive(Clone, Debug)]
pub struct FlaggedSeries<'a> {
    pub component_id: u32,
    pub series: &'a UnitSeries,
    /// Per-sample exclusion flags, index-aligned with the series.
    pub excluded: Vec<bool>,
}

/// One sample of a component-level timeseries.
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentSample {
    pub component_id: u32,
    pub timestamp: DateTime<Utc>,
    /// Sum of constituent loads; missing constituent values contribute
    /// nothing.
    pub gross_load_mw: f64,
    /// True if any constituent's sample at this timestamp is excluded.
    pub exclude_ramp: bool,
    /// First difference of the summed load; `None` at each component's
    /// first timestamp.
    pub ramp: Option<f64>,
}

/// Ramp statistics and capacity proxies for one component.
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentAggregate {
    pub component_id: u32,
    /// Sum over units of each unit's maximum observed load; a capacity
    /// proxy robust to units that never run simultaneously.
    pub sum_of_max_gross_load_mw: Option<f64>,
    /// Maximum of the summed component load; a throughput proxy.
    pub max_of_sum_gross_load_mw: Option<f64>,
    pub max_ramp: Option<f64>,
    pub min_ramp: Option<f64>,
    /// Timestamp of the maximum ramp (first occurrence on ties).
    pub idxmax_ramp: Option<DateTime<Utc>>,
    /// Timestamp of the minimum ramp (first occurrence on ties).
    pub idxmin_ramp: Option<DateTime<Utc>>,
    pub max_abs_ramp: Option<f64>,
    /// Timestamp of the maximum absolute ramp; ties go to the positive
    /// side.
    pub idxmax_abs_ramp: Option<DateTime<Utc>>,
    /// `max_abs_ramp` normalized by CAMD capacity.
    pub ramp_factor_camd: Option<f64>,
    /// `max_abs_ramp` normalized by EIA capacity.
    pub ramp_factor_eia: Option<f64>,
    /// `max_abs_ramp` normalized by `sum_of_max_gross_load_mw`.
    pub ramp_factor_sum_max: Option<f64>,
    /// `max_abs_ramp` normalized by `max_of_sum_gross_load_mw`.
    pub ramp_factor_max_sum: Option<f64>,
}

/// Merges unit-level series into component-level series.
///
/// Returns samples ordered by (component, timestamp), with the ramp column
/// already computed per component.
pub fn merge_component_timeseries(units: &[FlaggedSeries<'_>]) -> Vec<ComponentSample> {
    let mut merged: BTreeMap<(u32, DateTime<Utc>), (f64, bool)> = BTreeMap::new();
    for unit in units {
        for (sample, excluded) in unit.series.samples().iter().zip(&unit.excluded) {
            let entry = merged
                .entry((unit.component_id, sample.timestamp))
                .or_insert((0.0, false));
            entry.0 += sample.gross_load_mw.unwrap_or(0.0);
            entry.1 |= *excluded;
        }
    }

    let mut samples: Vec<ComponentSample> = Vec::with_capacity(merged.len());
    let mut previous: Option<(u32, f64)> = None;
    for ((component_id, timestamp), (load, excluded)) in merged {
        let ramp = match previous {
            Some((prev_component, prev_load)) if prev_component == component_id => {
                Some(load - prev_load)
            }
            _ => None,
        };
        previous = Some((component_id, load));
        samples.push(ComponentSample {
            component_id,
            timestamp,
            gross_load_mw: load,
            exclude_ramp: excluded,
            ramp,
        });
    }
    samples
}

/// Computes the per-component aggregates over the merged timeseries.
///
/// A component with no qualifying (non-excluded, non-missing) ramp samples
/// gets missing extrema; that is an expected condition, not an error.
pub fn component_aggregates(
    units: &[FlaggedSeries<'_>],
    timeseries: &[ComponentSample],
    profiles: &[ComponentProfile],
) -> Vec<ComponentAggregate> {
    // per-unit maxima, summed per component
    let mut unit_max: BTreeMap<(u32, u32), Option<f64>> = BTreeMap::new();
    for unit in units {
        let max = unit
            .series
            .samples()
            .iter()
            .filter_map(|s| s.gross_load_mw)
            .fold(None, |best: Option<f64>, v| {
                Some(best.map_or(v, |b| b.max(v)))
            });
        let entry = unit_max
            .entry((unit.component_id, unit.series.unit_id_epa))
            .or_insert(None);
        *entry = match (*entry, max) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
    }
    let mut sum_of_max: BTreeMap<u32, Option<f64>> = BTreeMap::new();
    for ((component_id, _), max) in unit_max {
        let entry = sum_of_max.entry(component_id).or_insert(None);
        if let Some(max) = max {
            *entry = Some(entry.unwrap_or(0.0) + max);
        }
    }

    let mut max_of_sum: BTreeMap<u32, f64> = BTreeMap::new();
    for sample in timeseries {
        max_of_sum
            .entry(sample.component_id)
            .and_modify(|best| *best = best.max(sample.gross_load_mw))
            .or_insert(sample.gross_load_mw);
    }

    let capacities: BTreeMap<u32, (Option<f64>, Option<f64>)> = profiles
        .iter()
        .map(|p| (p.component_id, (p.capacity_camd, p.capacity_eia)))
        .collect();

    let extrema = ramp_extrema(timeseries);

    let mut component_ids: Vec<u32> = timeseries.iter().map(|s| s.component_id).collect();
    component_ids.dedup();

    component_ids
        .into_iter()
        .map(|component_id| {
            let extrema = extrema.get(&component_id).cloned().unwrap_or_default();
            let sum_of_max = sum_of_max.get(&component_id).copied().flatten();
            let max_of_sum = max_of_sum.get(&component_id).copied();
            let (capacity_camd, capacity_eia) = capacities
                .get(&component_id)
                .copied()
                .unwrap_or((None, None));

            let normalize = |denominator: Option<f64>| {
                match (extrema.max_abs_ramp, denominator) {
                    (Some(ramp), Some(denominator)) => Some(ramp / denominator),
                    _ => None,
                }
            };
            ComponentAggregate {
                component_id,
                ramp_factor_camd: normalize(capacity_camd),
                ramp_factor_eia: normalize(capacity_eia),
                ramp_factor_sum_max: normalize(sum_of_max),
                ramp_factor_max_sum: normalize(max_of_sum),
                sum_of_max_gross_load_mw: sum_of_max,
                max_of_sum_gross_load_mw: max_of_sum,
                max_ramp: extrema.max_ramp,
                min_ramp: extrema.min_ramp,
                idxmax_ramp: extrema.idxmax_ramp,
                idxmin_ramp: extrema.idxmin_ramp,
                max_abs_ramp: extrema.max_abs_ramp,
                idxmax_abs_ramp: extrema.idxmax_abs_ramp,
            }
        })
        .collect()
}

/// Signed ramp extrema of one component, with timestamp attribution.
#[derive(Clone, Debug, Default, PartialEq)]
struct RampExtrema {
    max_ramp: Option<f64>,
    min_ramp: Option<f64>,
    idxmax_ramp: Option<DateTime<Utc>>,
    idxmin_ramp: Option<DateTime<Utc>>,
    max_abs_ramp: Option<f64>,
    idxmax_abs_ramp: Option<DateTime<Utc>>,
}

fn ramp_extrema(timeseries: &[ComponentSample]) -> BTreeMap<u32, RampExtrema> {
    let mut extrema: BTreeMap<u32, RampExtrema> = BTreeMap::new();
    for sample in timeseries {
        let entry = extrema.entry(sample.component_id).or_default();
        if sample.exclude_ramp {
            continue;
        }
        let Some(ramp) = sample.ramp else {
            continue;
        };
        // strict comparisons keep the first occurrence on ties
        if entry.max_ramp.is_none_or(|best| ramp > best) {
            entry.max_ramp = Some(ramp);
            entry.idxmax_ramp = Some(sample.timestamp);
        }
        if entry.min_ramp.is_none_or(|best| ramp < best) {
            entry.min_ramp = Some(ramp);
            entry.idxmin_ramp = Some(sample.timestamp);
        }
    }

    for entry in extrema.values_mut() {
        resolve_max_abs(entry);
    }
    extrema
}

/// Fills in the max-absolute-ramp fields of an extrema entry.
///
/// Ties go to the positive side; a missing min with a defined max also
/// resolves to the max's timestamp.
fn resolve_max_abs(entry: &mut RampExtrema) {
    match (entry.max_ramp, entry.min_ramp) {
        (Some(max), Some(min)) => {
            entry.max_abs_ramp = Some(max.abs().max(min.abs()));
            entry.idxmax_abs_ramp = if max >= min.abs() {
                entry.idxmax_ramp
            } else {
                entry.idxmin_ramp
            };
        }
        (Some(max), None) => {
            entry.max_abs_ramp = Some(max.abs());
            entry.idxmax_abs_ramp = entry.idxmax_ramp;
        }
        (None, Some(min)) => {
            entry.max_abs_ramp = Some(min.abs());
            entry.idxmax_abs_ramp = entry.idxmin_ramp;
        }
        (None, None) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::tests::ts;
    use crate::series::Sample;

    fn unit(unit_id_epa: u32, values: &[f64]) -> UnitSeries {
        let samples = values
            .iter()
            .enumerate()
            .map(|(i, v)| Sample {
                timestamp: ts(i as u32),
                gross_load_mw: Some(*v),
            })
            .collect();
        UnitSeries::try_new(3, format!("U{unit_id_epa}"), unit_id_epa, samples).unwrap()
    }

    #[test]
    fn test_merge_sums_loads_and_ors_exclusions() {
        let a = unit(1, &[1.0, 2.0, 3.0]);
        let b = unit(2, &[10.0, 10.0, 10.0]);
        let flagged = vec![
            FlaggedSeries {
                component_id: 0,
                series: &a,
                excluded: vec![false, true, false],
            },
            FlaggedSeries {
                component_id: 0,
                series: &b,
                excluded: vec![false, false, false],
            },
        ];

        let merged = merge_component_timeseries(&flagged);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].gross_load_mw, 11.0);
        assert_eq!(merged[0].ramp, None);
        assert!(!merged[0].exclude_ramp);
        assert_eq!(merged[1].gross_load_mw, 12.0);
        assert_eq!(merged[1].ramp, Some(1.0));
        assert!(merged[1].exclude_ramp);
        assert_eq!(merged[2].ramp, Some(1.0));
    }

    #[test]
    fn test_ramp_resets_between_components() {
        let a = unit(1, &[5.0, 6.0]);
        let b = unit(2, &[100.0, 90.0]);
        let flagged = vec![
            FlaggedSeries {
                component_id: 0,
                series: &a,
                excluded: vec![false; 2],
            },
            FlaggedSeries {
                component_id: 1,
                series: &b,
                excluded: vec![false; 2],
            },
        ];

        let merged = merge_component_timeseries(&flagged);
        // first sample of component 1 must not diff against component 0
        assert_eq!(merged[2].component_id, 1);
        assert_eq!(merged[2].ramp, None);
        assert_eq!(merged[3].ramp, Some(-10.0));
    }

    #[test]
    fn test_extrema_and_attribution() {
        let a = unit(1, &[0.0, 5.0, 3.0, 10.0, 4.0]);
        let flagged = vec![FlaggedSeries {
            component_id: 0,
            series: &a,
            excluded: vec![false; 5],
        }];
        let merged = merge_component_timeseries(&flagged);
        let aggs = component_aggregates(&flagged, &merged, &[]);

        assert_eq!(aggs.len(), 1);
        let agg = &aggs[0];
        assert_eq!(agg.max_ramp, Some(7.0));
        assert_eq!(agg.idxmax_ramp, Some(ts(3)));
        assert_eq!(agg.min_ramp, Some(-6.0));
        assert_eq!(agg.idxmin_ramp, Some(ts(4)));
        // |max| > |min|: attribution goes to the max side
        assert_eq!(agg.max_abs_ramp, Some(7.0));
        assert_eq!(agg.idxmax_abs_ramp, Some(ts(3)));
        assert_eq!(agg.sum_of_max_gross_load_mw, Some(10.0));
        assert_eq!(agg.max_of_sum_gross_load_mw, Some(10.0));
    }

    #[test]
    fn test_abs_tie_goes_to_positive_side() {
        let a = unit(1, &[0.0, 5.0, 0.0]);
        let flagged = vec![FlaggedSeries {
            component_id: 0,
            series: &a,
            excluded: vec![false; 3],
        }];
        let merged = merge_component_timeseries(&flagged);
        let aggs = component_aggregates(&flagged, &merged, &[]);

        assert_eq!(aggs[0].max_ramp, Some(5.0));
        assert_eq!(aggs[0].min_ramp, Some(-5.0));
        assert_eq!(aggs[0].max_abs_ramp, Some(5.0));
        assert_eq!(aggs[0].idxmax_abs_ramp, Some(ts(1)));
    }

    #[test]
    fn test_larger_downward_ramp_attributes_to_min_side() {
        let a = unit(1, &[0.0, 5.0, 8.0, 0.0]);
        let flagged = vec![FlaggedSeries {
            component_id: 0,
            series: &a,
            excluded: vec![false; 4],
        }];
        let merged = merge_component_timeseries(&flagged);
        let aggs = component_aggregates(&flagged, &merged, &[]);

        assert_eq!(aggs[0].max_abs_ramp, Some(8.0));
        assert_eq!(aggs[0].idxmax_abs_ramp, Some(ts(3)));
    }

    #[test]
    fn test_fully_excluded_component_degrades_to_missing() {
        let a = unit(1, &[0.0, 5.0, 5.0, 0.0]);
        let flagged = vec![FlaggedSeries {
            component_id: 0,
            series: &a,
            excluded: vec![true; 4],
        }];
        let merged = merge_component_timeseries(&flagged);
        let aggs = component_aggregates(&flagged, &merged, &[]);

        assert_eq!(aggs.len(), 1);
        assert_eq!(aggs[0].max_ramp, None);
        assert_eq!(aggs[0].min_ramp, None);
        assert_eq!(aggs[0].max_abs_ramp, None);
        assert_eq!(aggs[0].idxmax_abs_ramp, None);
        assert_eq!(aggs[0].ramp_factor_max_sum, None);
        // the capacity proxies are unaffected by exclusion
        assert_eq!(aggs[0].max_of_sum_gross_load_mw, Some(5.0));
    }

    #[test]
    fn test_missing_min_resolves_to_max_side() {
        let mut entry = RampExtrema {
            max_ramp: Some(3.0),
            idxmax_ramp: Some(ts(1)),
            ..Default::default()
        };
        resolve_max_abs(&mut entry);
        assert_eq!(entry.max_abs_ramp, Some(3.0));
        assert_eq!(entry.idxmax_abs_ramp, Some(ts(1)));

        // and symmetrically for a missing max with a defined min
        let mut entry = RampExtrema {
            min_ramp: Some(-4.0),
            idxmin_ramp: Some(ts(2)),
            ..Default::default()
        };
        resolve_max_abs(&mut entry);
        assert_eq!(entry.max_abs_ramp, Some(4.0));
        assert_eq!(entry.idxmax_abs_ramp, Some(ts(2)));
    }

    #[test]
    fn test_ramp_factors() {
        let a = unit(1, &[0.0, 10.0]);
        let flagged = vec![FlaggedSeries {
            component_id: 0,
            series: &a,
            excluded: vec![false; 2],
        }];
        let merged = merge_component_timeseries(&flagged);
        let profile = ComponentProfile {
            component_id: 0,
            eia_unit_types: Default::default(),
            tech_type: None,
            capacity_camd: Some(20.0),
            capacity_eia: None,
            camd_fuel: None,
            eia_fuel: None,
        };
        let aggs = component_aggregates(&flagged, &merged, &[profile]);

        assert_eq!(aggs[0].max_abs_ramp, Some(10.0));
        assert_eq!(aggs[0].ramp_factor_camd, Some(0.5));
        assert_eq!(aggs[0].ramp_factor_eia, None);
        assert_eq!(aggs[0].ramp_factor_sum_max, Some(1.0));
        assert_eq!(aggs[0].ramp_factor_max_sum, Some(1.0));
    }
}
