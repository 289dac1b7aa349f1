// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The top-level per-partition analysis: from unit load series and a
//! crosswalk to component-level ramp aggregates.

use std::collections::BTreeMap;

use crate::crosswalk::{make_component_ids, AssignedRow};
use crate::events::distance::DEFAULT_BOUNDARY_OFFSET_HOURS;
use crate::exclusion::flag_exclusions;
use crate::ramp::{component_aggregates, merge_component_timeseries, FlaggedSeries};
use crate::{
    aggregate_components, ComponentAggregate, ComponentProfile, ComponentSample, Error, TechType,
    UnitSeries,
};

/// Options for [`process_partition`].
#[derive(Clone, Debug)]
pub struct PartitionOptions {
    /// Fallback distance beyond the observed window for transient edges
    /// that were never observed, in hours.
    pub boundary_offset_hours: i64,
    /// Added to every component id, so that callers processing data in
    /// chunks can keep ids globally unique.
    pub component_id_offset: u32,
}

impl Default for PartitionOptions {
    fn default() -> Self {
        Self {
            boundary_offset_hours: DEFAULT_BOUNDARY_OFFSET_HOURS,
            component_id_offset: 0,
        }
    }
}

/// Everything [`process_partition`] derives from one partition.
#[derive(Clone, Debug)]
pub struct PartitionOutputs {
    /// One row of ramp statistics and capacity proxies per component.
    pub component_aggs: Vec<ComponentAggregate>,
    /// One profile per component: unit types, tech label, capacities, fuels.
    pub profiles: Vec<ComponentProfile>,
    /// The crosswalk rows that joined, annotated with component ids; the
    /// audit trail of which physical units formed each component.
    pub key_map: Vec<AssignedRow>,
    /// The merged component-level timeseries.
    pub component_timeseries: Vec<ComponentSample>,
}

/// Analyzes one partition of CEMS data for component-level ramp rates.
///
/// Units without a crosswalk match are dropped (inner join).  Component ids
/// are unique within the partition; chunked callers must pass a
/// `component_id_offset` to keep them unique across partitions.
pub fn process_partition(
    units: &[UnitSeries],
    crosswalk: &[crate::CrosswalkRow],
    options: &PartitionOptions,
) -> Result<PartitionOutputs, Error> {
    let mut key_map = make_component_ids(crosswalk, units)?;
    for row in &mut key_map {
        row.component_id += options.component_id_offset;
    }
    tracing::info!(
        "Assigned {} crosswalk rows to components.",
        key_map.len(),
    );

    let profiles = aggregate_components(&key_map)?;

    // first crosswalk match wins when a unit joins several rows; they all
    // share a component by construction
    let mut component_of_unit: BTreeMap<u32, u32> = BTreeMap::new();
    for row in &key_map {
        component_of_unit.entry(row.unit_id_epa).or_insert(row.component_id);
    }
    let tech_of_component: BTreeMap<u32, Option<TechType>> = profiles
        .iter()
        .map(|p| (p.component_id, p.tech_type))
        .collect();

    let mut flagged = Vec::new();
    for unit in units {
        let Some(&component_id) = component_of_unit.get(&unit.unit_id_epa) else {
            continue;
        };
        let tech_type = tech_of_component.get(&component_id).copied().flatten();
        let excluded = flag_exclusions(unit, tech_type, options.boundary_offset_hours)?;
        flagged.push(FlaggedSeries {
            component_id,
            series: unit,
            excluded,
        });
    }

    let component_timeseries = merge_component_timeseries(&flagged);
    let component_aggs = component_aggregates(&flagged, &component_timeseries, &profiles);
    tracing::info!(
        "Computed ramp aggregates for {} components from {} units.",
        component_aggs.len(),
        flagged.len(),
    );

    Ok(PartitionOutputs {
        component_aggs,
        profiles,
        key_map,
        component_timeseries,
    })
}
