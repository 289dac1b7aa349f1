// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Surrogate integer ids for the composite keys on each side of the
//! crosswalk.
//!
//! The connectivity primitive works on dense integer node ids, not composite
//! (plant, unit) keys.  Every distinct (plant, combustor-unit) pair gets one
//! id and every distinct (plant, generator-unit) pair another, with the
//! generator id space offset past the combustor maximum so the two can never
//! collide.  Ids are dense and assigned in sorted key order.

use std::collections::BTreeMap;

use super::CrosswalkRow;

/// Per-row surrogate node ids plus the size of the two id spaces.
#[derive(Debug)]
pub(super) struct SurrogateIds {
    /// Combustor-side node id of each row, index-aligned with the input.
    pub(super) combustor_ids: Vec<u32>,
    /// Generator-side node id of each row, index-aligned with the input.
    pub(super) generator_ids: Vec<u32>,
    /// Ids below this bound are combustor-side; at or above, generator-side.
    pub(super) combustor_count: u32,
    /// Total number of distinct nodes across both sides.
    pub(super) node_count: u32,
}

impl SurrogateIds {
    /// True if the given node id lies in the combustor id space.
    pub(super) fn is_combustor(&self, node: u32) -> bool {
        node < self.combustor_count
    }
}

/// Assigns surrogate node ids for the given rows.
pub(super) fn make_surrogate_ids(rows: &[&CrosswalkRow]) -> SurrogateIds {
    let mut combustor_keys = BTreeMap::new();
    let mut generator_keys = BTreeMap::new();
    for row in rows {
        combustor_keys.insert((row.camd_plant_id, row.camd_unit_id.as_str()), 0u32);
        generator_keys.insert((row.camd_plant_id, row.eia_generator_id.as_str()), 0u32);
    }
    for (i, id) in combustor_keys.values_mut().enumerate() {
        *id = i as u32;
    }
    let combustor_count = combustor_keys.len() as u32;
    for (i, id) in generator_keys.values_mut().enumerate() {
        *id = combustor_count + i as u32;
    }

    let combustor_ids = rows
        .iter()
        .map(|row| combustor_keys[&(row.camd_plant_id, row.camd_unit_id.as_str())])
        .collect();
    let generator_ids = rows
        .iter()
        .map(|row| generator_keys[&(row.camd_plant_id, row.eia_generator_id.as_str())])
        .collect();

    SurrogateIds {
        combustor_ids,
        generator_ids,
        combustor_count,
        node_count: combustor_count + generator_keys.len() as u32,
    }
}
