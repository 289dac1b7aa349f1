// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

/*!
# EPA CEMS Ramp Rates

This is a library for characterizing power-plant ramp rates (the
hour-over-hour change of electrical output) from hourly smokestack
emissions monitoring data.

Ramp-rate limits are a property of the combined combustor+generator train,
not of a single monitored unit, so the analysis works on *components*:
connected clusters of monitored combustion units (CAMD side) and generator
records (EIA side) linked by the EPA/EIA crosswalk.

## Pipeline

The top-level entry point is [`process_partition`], which wires together:

- [`events`]: run-length extraction of uptime/downtime events from each
  unit's load series, and the per-sample distance to the nearest startup or
  shutdown transient.
- [`crosswalk`]: partitioning the crosswalk into connected components via
  union-find over surrogate node ids, with a bipartiteness assertion per
  component.
- [`aggregate_components`]: rolling capacity, fuel and technology labels
  up to the component level.
- [`flag_exclusions`]: flagging samples within a technology-specific
  radius of a transient as unreliable for ramp analysis.
- [`ramp`]: merging constituent series into component timeseries and
  computing the signed ramp extrema over the non-excluded samples.

## Naming convention

The domain vocabulary around startups and shutdowns is asymmetric: each
term names the far boundary of the *complementary* state.  See the
[`events`] module documentation for the convention table.

## Validation

Malformed input fails loudly rather than being silently repaired:

- A load series whose first or last value is missing is rejected before
  event detection.
- A non-bipartite component indicates crosswalk corruption and aborts the
  run, naming the offending node set.
- A fuel code absent from its mapping table is an error; extending the
  table is the only sanctioned recovery.

A component that merely has no qualifying ramp samples, on the other hand,
degrades to missing extrema.
*/

mod aggregate;
pub use aggregate::{aggregate_components, ComponentProfile};

mod classification;
pub use classification::{
    camd_fuel_category, eia_fuel_category, tech_type_for_unit_types, FuelCategory, TechType,
};

pub mod crosswalk;
pub use crosswalk::{
    assign_components, filter_retirements, make_component_ids, remove_unmatched, AssignedRow,
    CrosswalkRow,
};

mod error;
pub use error::Error;

pub mod events;
pub use events::{find_runs, uptime_events, RunEvent, RunKind, UnitEvent};

mod exclusion;
pub use exclusion::flag_exclusions;

pub mod loader;

mod pipeline;
pub use pipeline::{process_partition, PartitionOptions, PartitionOutputs};

pub mod ramp;
pub use ramp::{ComponentAggregate, ComponentSample};

pub mod report;

mod series;
pub use series::{group_readings, LoadReading, Sample, UnitSeries};
