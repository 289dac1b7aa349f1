// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Run-length extraction of uptime and downtime events from a unit's load
//! series.
//!
//! A series is binarized as `load > 0` and split into maximal runs of
//! generating ("uptime") and idle ("downtime") samples.  The timestamp
//! vocabulary is inherited from the emissions-monitoring domain and is
//! intentionally asymmetric: each term names the far boundary of the
//! *complementary* state:
//!
//! | term       | sample it refers to                                      |
//! |------------|----------------------------------------------------------|
//! | `startup`  | the last zero-load sample before generation begins       |
//! | `shutdown` | the first zero-load sample after generation ends         |
//!
//! So a downtime event runs from its `shutdown` (block start) to its
//! `startup` (block end), while an uptime event runs from its `startup`
//! (block start) to its `shutdown` (block end), and a single-sample downtime
//! block has `shutdown == startup`.  A boundary that falls outside the
//! observed window is `None`.
//!
//! The edge marks used for distance-to-transient math use a different
//! convention (the first *non-zero* sample counts as the startup); see
//! [`distance`].

pub mod distance;

use chrono::{DateTime, Utc};

use crate::{Error, UnitSeries};

/// Which state's runs an event table describes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RunKind {
    /// Maximal runs of non-zero load.
    Uptime,
    /// Maximal runs of zero load.
    Downtime,
}

/// One contiguous run of uptime or downtime.
///
/// Either boundary is `None` when the run abuts the start or end of the
/// observed series.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunEvent {
    /// Last zero-load sample before generation begins.  The *end* of a
    /// downtime event, the *start* of an uptime event.
    pub startup: Option<DateTime<Utc>>,
    /// First zero-load sample after generation ends.  The *start* of a
    /// downtime event, the *end* of an uptime event.
    pub shutdown: Option<DateTime<Utc>>,
}

/// One uptime event of one unit, with boundary inference applied.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitEvent {
    /// Surrogate key of the unit the event belongs to.
    pub unit_id_epa: u32,
    /// Zero-based ordinal of the event within its unit.
    pub event: usize,
    pub startup: Option<DateTime<Utc>>,
    pub shutdown: Option<DateTime<Utc>>,
    /// Hours from startup to shutdown; `None` unless both ends are known.
    pub duration_hours: Option<f64>,
}

/// Rejects a series whose first or last load value is missing.
///
/// Edge and distance computations on an unknown boundary state are
/// undefined, so such input fails here instead of propagating garbage.
pub(crate) fn ensure_known_boundaries(series: &UnitSeries) -> Result<(), Error> {
    let samples = series.samples();
    if samples[0].gross_load_mw.is_none() {
        return Err(Error::invalid_series(format!(
            "Unit {} starts with a missing load value.",
            series.unit_id_epa
        )));
    }
    if samples[samples.len() - 1].gross_load_mw.is_none() {
        return Err(Error::invalid_series(format!(
            "Unit {} ends with a missing load value.",
            series.unit_id_epa
        )));
    }
    Ok(())
}

/// Summarizes the contiguous runs of one unit's load series as a table of
/// events.
///
/// Returns one [`RunEvent`] per maximal zero run (`RunKind::Downtime`) or
/// non-zero run (`RunKind::Uptime`).  An all-zero series yields exactly one
/// downtime event with both boundaries unknown and no uptime events; an
/// all-non-zero series yields the reverse.
pub fn find_runs(series: &UnitSeries, kind: RunKind) -> Result<Vec<RunEvent>, Error> {
    ensure_known_boundaries(series)?;

    let samples = series.samples();
    let on = series.binarized();

    // Transition samples, in the event-table convention: the startup mark is
    // the last zero of a block (the sample *before* the off->on edge), the
    // shutdown mark is the first zero of a block (the on->off edge itself).
    let mut startups = Vec::new();
    let mut shutdowns = Vec::new();
    for i in 1..on.len() {
        if on[i] && !on[i - 1] {
            startups.push(samples[i - 1].timestamp);
        } else if !on[i] && on[i - 1] {
            shutdowns.push(samples[i].timestamp);
        }
    }

    let starts_with_zero = !on[0];
    let ends_with_zero = !on[on.len() - 1];

    // Each side of the event table is the corresponding transition list,
    // padded with None where the first or last run extends past the observed
    // window.  The two sides always end up the same length.
    let (starts, ends): (Vec<Option<_>>, Vec<Option<_>>) = match kind {
        RunKind::Downtime => {
            let mut starts: Vec<Option<DateTime<Utc>>> = Vec::new();
            if starts_with_zero {
                starts.push(None);
            }
            starts.extend(shutdowns.iter().copied().map(Some));

            let mut ends: Vec<Option<DateTime<Utc>>> =
                startups.iter().copied().map(Some).collect();
            if ends_with_zero {
                ends.push(None);
            }
            (starts, ends)
        }
        RunKind::Uptime => {
            let mut starts: Vec<Option<DateTime<Utc>>> = Vec::new();
            if !starts_with_zero {
                starts.push(None);
            }
            starts.extend(startups.iter().copied().map(Some));

            let mut ends: Vec<Option<DateTime<Utc>>> =
                shutdowns.iter().copied().map(Some).collect();
            if !ends_with_zero {
                ends.push(None);
            }
            (starts, ends)
        }
    };

    if starts.len() != ends.len() {
        return Err(Error::internal(format!(
            "Event boundary lists diverged for unit {}: {} starts, {} ends.",
            series.unit_id_epa,
            starts.len(),
            ends.len()
        )));
    }

    Ok(starts
        .into_iter()
        .zip(ends)
        .map(|(start, end)| match kind {
            RunKind::Downtime => RunEvent {
                shutdown: start,
                startup: end,
            },
            RunKind::Uptime => RunEvent {
                startup: start,
                shutdown: end,
            },
        })
        .collect())
}

/// Converts a set of unit load series into a table of uptime events.
///
/// With `infer_boundaries`, an event boundary that lies outside the observed
/// window is approximated by the unit's first (startup side) or last
/// (shutdown side) observed timestamp, a lower bound on the true run
/// length, so that every event gets a duration.
pub fn uptime_events(units: &[UnitSeries], infer_boundaries: bool) -> Result<Vec<UnitEvent>, Error> {
    let mut events = Vec::new();
    for unit in units {
        for (ordinal, run) in find_runs(unit, RunKind::Uptime)?.into_iter().enumerate() {
            let mut startup = run.startup;
            let mut shutdown = run.shutdown;
            if infer_boundaries {
                startup = startup.or_else(|| Some(unit.first_timestamp()));
                shutdown = shutdown.or_else(|| Some(unit.last_timestamp()));
            }
            let duration_hours = match (startup, shutdown) {
                (Some(up), Some(down)) => Some((down - up).num_seconds() as f64 / 3600.0),
                _ => None,
            };
            events.push(UnitEvent {
                unit_id_epa: unit.unit_id_epa,
                event: ordinal,
                startup,
                shutdown,
                duration_hours,
            });
        }
    }
    Ok(events)
}
