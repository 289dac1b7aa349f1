// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Per-sample distance to the nearest startup or shutdown transient.
//!
//! Unlike the event tables in the parent module, the edge marks here sit on
//! the *generating* side of an off->on transition: the startup mark is the
//! first non-zero sample of a block, and the shutdown mark is the first zero
//! sample after it.  Startup marks are filled forward and shutdown marks
//! backward, within one unit's series only, and the elapsed time to each is
//! converted to fractional hours.
//!
//! A series that begins generating (or ends generating) has no startup (or
//! shutdown) mark to fill from; the true transition lies outside the
//! observed window.  Those samples fall back to a boundary placed
//! `boundary_offset_hours` beyond the window edge, a conservative "assume
//! far from a transition" placeholder.

use chrono::Duration;

use crate::{Error, UnitSeries};

use super::ensure_known_boundaries;

/// Fallback distance beyond the observed window for unresolved boundary
/// edges, in hours.
pub const DEFAULT_BOUNDARY_OFFSET_HOURS: i64 = 24;

/// Distance-to-transient columns for one unit's series, index-aligned with
/// its samples.
#[derive(Clone, Debug, PartialEq)]
pub struct TransientDistances {
    /// Hours since the most recent startup.
    pub hours_from_startup: Vec<f64>,
    /// Hours until the next shutdown.
    pub hours_to_shutdown: Vec<f64>,
    /// Minimum of the two, the distance to the nearest transient.
    pub hours_distance: Vec<f64>,
}

/// Computes the distance-to-transient columns for one unit's series.
///
/// Returns an error if the series starts or ends on a missing load value.
pub fn distance_from_downtime(
    series: &UnitSeries,
    boundary_offset_hours: i64,
) -> Result<TransientDistances, Error> {
    ensure_known_boundaries(series)?;

    let samples = series.samples();
    let on = series.binarized();
    let n = samples.len();

    // first non-zero sample of each generating block, filled forward
    let mut last_startup = Vec::with_capacity(n);
    let mut fill = None;
    for i in 0..n {
        if i > 0 && on[i] && !on[i - 1] {
            fill = Some(samples[i].timestamp);
        }
        last_startup.push(fill);
    }

    // first zero sample of each idle block, filled backward
    let mut next_shutdown = vec![None; n];
    let mut fill = None;
    for i in (0..n).rev() {
        if i > 0 && !on[i] && on[i - 1] {
            fill = Some(samples[i].timestamp);
        }
        next_shutdown[i] = fill;
    }

    let before_window = series.first_timestamp() - Duration::hours(boundary_offset_hours);
    let after_window = series.last_timestamp() + Duration::hours(boundary_offset_hours);

    let hours_from_startup: Vec<f64> = samples
        .iter()
        .zip(&last_startup)
        .map(|(sample, startup)| {
            let startup = startup.unwrap_or(before_window);
            (sample.timestamp - startup).num_seconds() as f64 / 3600.0
        })
        .collect();
    let hours_to_shutdown: Vec<f64> = samples
        .iter()
        .zip(&next_shutdown)
        .map(|(sample, shutdown)| {
            let shutdown = shutdown.unwrap_or(after_window);
            (shutdown - sample.timestamp).num_seconds() as f64 / 3600.0
        })
        .collect();
    let hours_distance = hours_from_startup
        .iter()
        .zip(&hours_to_shutdown)
        .map(|(a, b)| a.min(*b))
        .collect();

    Ok(TransientDistances {
        hours_from_startup,
        hours_to_shutdown,
        hours_distance,
    })
}
