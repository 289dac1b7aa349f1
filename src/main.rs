// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Command-line entry point: calculates max ramp rates for each plant
//! component in the EPA CEMS dataset.
//!
//! Outputs:
//!
//! - `<out_path>`: component-level aggregates, one row per component.
//! - `<out_path stem>_crosswalk_with_ids.csv`: the joined crosswalk rows
//!   annotated with component ids, for auditing which EPA/EIA units formed
//!   each component and which units failed to join.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;

use epacems_ramp_rates::loader::{
    load_epa_crosswalk, load_epacems, ALL_STATES, EPA_CEMS_DATA_PATH_ENV,
};
use epacems_ramp_rates::report::{write_component_aggs, write_key_map};
use epacems_ramp_rates::{
    filter_retirements, group_readings, process_partition, remove_unmatched, PartitionOptions,
};

/// Territories are not in EPA CEMS.  District of Columbia is.
const TERRITORIES: [&str; 6] = ["MP", "PR", "AS", "GU", "NA", "VI"];

#[derive(Debug, Parser)]
#[command(about, version)]
struct Cli {
    /// Output path of the component-aggregates csv file.
    out_path: PathBuf,

    /// Number of states per processing chunk.  With 10+ GB of memory per
    /// year of data analyzed, chunking is unnecessary; set to 55.
    #[arg(long, default_value_t = 5)]
    chunk_size: usize,

    /// First year of CEMS data to include, inclusive.
    #[arg(long, default_value_t = 2015)]
    start_year: i32,

    /// Last year of CEMS data to include, inclusive.
    #[arg(long, default_value_t = 2019)]
    end_year: i32,

    /// Optional list of state abbreviations to include.  Defaults to all
    /// states.
    #[arg(long, num_args = 1..)]
    state_subset: Option<Vec<String>>,

    /// Directory holding the partitioned CEMS csv files.
    #[arg(long, env = EPA_CEMS_DATA_PATH_ENV)]
    cems_dir: PathBuf,

    /// Path to the EPA/EIA crosswalk csv.
    #[arg(long)]
    crosswalk: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let parent = cli.out_path.parent().unwrap_or(Path::new(""));
    if !parent.as_os_str().is_empty() && !parent.exists() {
        bail!("Parent directory does not exist: {}", parent.display());
    }
    if cli.chunk_size == 0 {
        bail!("--chunk-size must be at least 1.");
    }

    let territories: HashSet<&str> = TERRITORIES.into();
    let states: Vec<String> = cli
        .state_subset
        .clone()
        .unwrap_or_else(|| ALL_STATES.iter().map(|s| s.to_string()).collect())
        .into_iter()
        .map(|s| s.to_uppercase())
        .filter(|s| !territories.contains(s.as_str()))
        .collect();
    let years: Vec<i32> = (cli.start_year..=cli.end_year).collect();

    let crosswalk = load_epa_crosswalk(&cli.crosswalk).context("loading crosswalk")?;
    let crosswalk = remove_unmatched(crosswalk);
    let crosswalk = filter_retirements(crosswalk, (cli.start_year, cli.end_year));
    tracing::info!("{} crosswalk rows after filtering.", crosswalk.len());

    // Process in chunks of states due to memory constraints; component ids
    // are offset per chunk to keep them globally unique.
    let mut aggregates = Vec::new();
    let mut profiles = Vec::new();
    let mut key_map = Vec::new();
    let mut offset = 0u32;
    for (i, chunk) in states.chunks(cli.chunk_size).enumerate() {
        tracing::info!(
            "Processing chunk {}/{}: {:?}",
            i + 1,
            states.len().div_ceil(cli.chunk_size),
            chunk
        );
        let readings = load_epacems(&cli.cems_dir, chunk, &years)
            .with_context(|| format!("loading CEMS data for {chunk:?}"))?;
        if readings.is_empty() {
            continue;
        }
        let units = group_readings(readings).context("grouping readings by unit")?;

        let options = PartitionOptions {
            component_id_offset: offset,
            ..Default::default()
        };
        let outputs = process_partition(&units, &crosswalk, &options)
            .with_context(|| format!("processing chunk {chunk:?}"))?;

        if let Some(max_id) = outputs.component_aggs.iter().map(|a| a.component_id).max() {
            offset = max_id + 1;
        }
        aggregates.extend(outputs.component_aggs);
        profiles.extend(outputs.profiles);
        key_map.extend(outputs.key_map);
    }

    if aggregates.is_empty() {
        bail!(
            "No components found; is {} the right CEMS data directory?",
            cli.cems_dir.display()
        );
    }

    write_component_aggs(&cli.out_path, &profiles, &aggregates)
        .context("writing component aggregates")?;
    let stem = cli
        .out_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "ramp_rates".to_string());
    let key_map_path = parent.join(format!("{stem}_crosswalk_with_ids.csv"));
    write_key_map(&key_map_path, &key_map).context("writing crosswalk with ids")?;

    tracing::info!(
        "Wrote {} components to {} and {} crosswalk rows to {}.",
        aggregates.len(),
        cli.out_path.display(),
        key_map.len(),
        key_map_path.display()
    );
    Ok(())
}
