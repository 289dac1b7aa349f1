// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Partitioning the crosswalk into connected components.
//!
//! Every crosswalk row is an undirected edge between a combustor-side and a
//! generator-side surrogate node.  Connected components over those edges are
//! computed with a union-find structure, then each component is checked to
//! be bipartite between the two id spaces.  A non-bipartite component means
//! the crosswalk data itself is corrupt; it aborts the run with the
//! offending node set rather than being silently repaired.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use petgraph::unionfind::UnionFind;

use crate::{Error, UnitSeries};

use super::surrogates::{make_surrogate_ids, SurrogateIds};
use super::CrosswalkRow;

/// One crosswalk row annotated with its component assignment and, when
/// joined against the CEMS readings, the monitored unit's surrogate key.
#[derive(Clone, Debug, PartialEq)]
pub struct AssignedRow {
    /// Zero-based component id, sequential in order of first row appearance.
    pub component_id: u32,
    /// CEMS surrogate key of the combustor's monitored unit.
    pub unit_id_epa: u32,
    pub row: CrosswalkRow,
}

/// Assigns a component id to every crosswalk row.
///
/// Rows arrive paired with the monitored unit key they were joined to.
/// Returns the rows in their original order with component ids prepended,
/// or an error if any component fails the bipartiteness check.
pub fn assign_components(rows: Vec<(u32, CrosswalkRow)>) -> Result<Vec<AssignedRow>, Error> {
    let bare: Vec<&CrosswalkRow> = rows.iter().map(|(_, row)| row).collect();
    let ids = make_surrogate_ids(&bare);

    let mut forest = UnionFind::<u32>::new(ids.node_count as usize);
    for (combustor, generator) in ids.combustor_ids.iter().zip(&ids.generator_ids) {
        forest.union(*combustor, *generator);
    }

    validate_bipartite(&ids)?;

    // Zero-based sequential component ids, numbered in order of first
    // appearance over the row list.
    let mut component_of_root: HashMap<u32, u32> = HashMap::new();
    let mut assigned = Vec::with_capacity(rows.len());
    for (i, (unit_id_epa, row)) in rows.into_iter().enumerate() {
        let root = forest.find(ids.combustor_ids[i]);
        let next_id = component_of_root.len() as u32;
        let component_id = *component_of_root.entry(root).or_insert(next_id);
        assigned.push(AssignedRow {
            component_id,
            unit_id_epa,
            row,
        });
    }
    Ok(assigned)
}

/// Checks that every component is two-colorable with the combustor and
/// generator id spaces as the two color classes.
///
/// The id offsetting makes this hold by construction for well-formed input,
/// which is exactly why a failure is a hard data-integrity fault: it means
/// one physical unit ended up on both sides of the graph.
fn validate_bipartite(ids: &SurrogateIds) -> Result<(), Error> {
    // adjacency over the edge list
    let mut adjacency: BTreeMap<u32, Vec<u32>> = BTreeMap::new();
    for (combustor, generator) in ids.combustor_ids.iter().zip(&ids.generator_ids) {
        adjacency.entry(*combustor).or_default().push(*generator);
        adjacency.entry(*generator).or_default().push(*combustor);
    }

    let mut color: HashMap<u32, bool> = HashMap::new();
    for &start in adjacency.keys() {
        if color.contains_key(&start) {
            continue;
        }
        color.insert(start, ids.is_combustor(start));
        let mut queue = vec![start];
        let mut node_set = BTreeSet::from([start]);
        while let Some(node) = queue.pop() {
            let node_color = color[&node];
            for &neighbor in &adjacency[&node] {
                node_set.insert(neighbor);
                match color.get(&neighbor) {
                    None => {
                        color.insert(neighbor, !node_color);
                        queue.push(neighbor);
                    }
                    Some(&neighbor_color) if neighbor_color == node_color => {
                        return Err(Error::non_bipartite_component(format!(
                            "Component containing nodes {:?} is not bipartite.",
                            node_set
                        )));
                    }
                    Some(_) => {}
                }
            }
        }
    }
    Ok(())
}

/// Joins the crosswalk against the CEMS unit keys and assigns component ids.
///
/// The join is an inner join on (plant id, combustor unit id): units with no
/// crosswalk match, and crosswalk rows for units outside the readings, are
/// dropped from the analysis.
pub fn make_component_ids(
    crosswalk: &[CrosswalkRow],
    units: &[UnitSeries],
) -> Result<Vec<AssignedRow>, Error> {
    let mut rows_by_key: BTreeMap<(u32, &str), Vec<&CrosswalkRow>> = BTreeMap::new();
    for row in crosswalk {
        rows_by_key
            .entry((row.camd_plant_id, row.camd_unit_id.as_str()))
            .or_default()
            .push(row);
    }

    // one key row per unit, in unit-key order
    let mut units_sorted: Vec<&UnitSeries> = units.iter().collect();
    units_sorted.sort_by_key(|unit| unit.unit_id_epa);

    let mut joined = Vec::new();
    let mut unmatched_units = 0usize;
    for unit in units_sorted {
        match rows_by_key.get(&(unit.plant_id_eia, unit.unitid.as_str())) {
            Some(rows) => {
                for row in rows {
                    joined.push((unit.unit_id_epa, (*row).clone()));
                }
            }
            None => unmatched_units += 1,
        }
    }
    if unmatched_units > 0 {
        tracing::warn!(
            "{} of {} units have no crosswalk match and are dropped from the analysis.",
            unmatched_units,
            units.len()
        );
    }

    assign_components(joined)
}
