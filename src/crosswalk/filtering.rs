// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Caller-controlled pre-filters that drop crosswalk rows before graph
//! construction.

use chrono::Datelike;

use super::CrosswalkRow;

/// Match types whose rows carry no usable combustor/generator link.
const UNMATCHED_TYPES: [&str; 2] = ["CAMD Unmatched", "Manual CAMD Excluded"];

/// Removes rows whose generator match is unmatched or manually excluded
/// (non-exporting units).
pub fn remove_unmatched(rows: Vec<CrosswalkRow>) -> Vec<CrosswalkRow> {
    rows.into_iter()
        .filter(|row| !UNMATCHED_TYPES.contains(&row.match_type_gen.as_str()))
        .collect()
}

/// Removes rows whose unit's active years have no overlap with the given
/// inclusive year range.
///
/// A unit retired before the range starts, or whose status date shows it was
/// not yet built by the range end, contributes no edges.  A missing status
/// date is treated as not-yet-built.
pub fn filter_retirements(rows: Vec<CrosswalkRow>, year_range: (i32, i32)) -> Vec<CrosswalkRow> {
    let (min_year, max_year) = year_range;
    rows.into_iter()
        .filter(|row| {
            let not_retired_before_start =
                row.camd_retire_year == 0 || row.camd_retire_year >= min_year;
            let built_by_end = row
                .camd_status_date
                .is_some_and(|date| date.year() <= max_year);
            not_retired_before_start && built_by_end
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crosswalk::test_rows::row;
    use chrono::NaiveDate;

    #[test]
    fn test_remove_unmatched() {
        let mut unmatched = row(1, "1", "G1");
        unmatched.match_type_gen = "CAMD Unmatched".to_string();
        let mut excluded = row(1, "2", "G2");
        excluded.match_type_gen = "Manual CAMD Excluded".to_string();
        let kept = row(1, "3", "G3");

        let filtered = remove_unmatched(vec![unmatched, excluded, kept.clone()]);
        assert_eq!(filtered, vec![kept]);
    }

    #[test]
    fn test_filter_retirements() {
        // retired before the window start
        let mut early_retiree = row(1, "1", "G1");
        early_retiree.camd_retire_year = 2010;
        // retired inside the window
        let mut late_retiree = row(1, "2", "G2");
        late_retiree.camd_retire_year = 2017;
        // not built until after the window end
        let mut unbuilt = row(1, "3", "G3");
        unbuilt.camd_status_date = NaiveDate::from_ymd_opt(2021, 3, 1);
        // unknown build date
        let mut undated = row(1, "4", "G4");
        undated.camd_status_date = None;
        let active = row(1, "5", "G5");

        let filtered = filter_retirements(
            vec![
                early_retiree,
                late_retiree.clone(),
                unbuilt,
                undated,
                active.clone(),
            ],
            (2015, 2019),
        );
        assert_eq!(filtered, vec![late_retiree, active]);
    }
}
