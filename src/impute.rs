//! Missing-value policy for the flight dataset.
//!
//! The policy is fixed per column:
//! - rows missing an essential, unfillable field are dropped,
//! - a missing delay is a zero delay,
//! - the remaining operational timings are filled from the column's own
//!   mean (median for air time), computed on post-drop data.
//!
//! Columns absent from the schema are skipped without error; the whole pass
//! never fails.

use crate::types::{Column, Dataset, FlightRecord};
use crate::util::{mean, median};

/// Fields whose absence makes a row unusable: there is no sensible fill for
/// an unknown origin airport or an unknown leg distance.
const ESSENTIAL_UNFILLABLE: [Column; 2] = [Column::Origin, Column::Distance];

/// A missing delay means the flight simply had none.
const DELAY_COLUMNS: [Column; 2] = [Column::WeatherDelay, Column::LateAircraftDelay];

/// Operational timings recovered from the column mean.
const MEAN_FILLED: [Column; 5] = [
    Column::DepTime,
    Column::TaxiOut,
    Column::WheelsOff,
    Column::WheelsOn,
    Column::TaxiIn,
];

/// Air time is skewed by long-haul legs; the median is the safer center.
const MEDIAN_FILLED: [Column; 1] = [Column::AirTime];

/// Produce a cleaned copy of `input`. The input dataset is never mutated.
///
/// Step order matters: fills are computed on post-drop data, and all fill
/// values are computed before any is applied, so filling one column can
/// never see another column's fill.
pub fn impute(input: &Dataset) -> Dataset {
    let mut schema = input.schema.clone();

    // 1. Drop rows missing an essential field, checked only for columns the
    //    file actually has.
    let mut records: Vec<_> = input
        .records
        .iter()
        .filter(|r| {
            ESSENTIAL_UNFILLABLE.iter().all(|c| match c {
                Column::Origin => !schema.has(Column::Origin) || r.origin.is_some(),
                _ => !schema.has(*c) || r.value(*c).is_some(),
            })
        })
        .cloned()
        .collect();

    // 2. Delay columns: null becomes zero; a column the file never carried is
    //    materialized as all-zero and added to the schema.
    for col in DELAY_COLUMNS {
        if schema.has(col) {
            for r in &mut records {
                if r.value(col).is_none() {
                    r.set_value(col, Some(0.0));
                }
            }
        } else {
            for r in &mut records {
                r.set_value(col, Some(0.0));
            }
            schema.insert(col);
        }
    }

    // 3. Compute every fill value up front, on post-drop data.
    let mut fills: Vec<(Column, f64)> = Vec::new();
    for col in MEAN_FILLED {
        if schema.has(col) {
            fills.push((col, column_fill(&records, col, mean)));
        }
    }
    for col in MEDIAN_FILLED {
        if schema.has(col) {
            fills.push((col, column_fill(&records, col, median)));
        }
    }

    // 4. Apply simultaneously. A non-finite fill value (a column with no
    //    present values at all) leaves the nulls in place, the same way a
    //    NaN fill would.
    for (col, fill) in fills {
        if !fill.is_finite() {
            continue;
        }
        for r in &mut records {
            if r.value(col).is_none() {
                r.set_value(col, Some(fill));
            }
        }
    }

    Dataset { records, schema }
}

fn column_fill<F>(records: &[FlightRecord], col: Column, stat: F) -> f64
where
    F: Fn(&[f64]) -> f64,
{
    let present: Vec<f64> = records.iter().filter_map(|r| r.value(col)).collect();
    stat(&present)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FlightRecord, Schema};

    fn blank_record() -> FlightRecord {
        FlightRecord {
            fl_date: None,
            origin: Some("JFK".to_string()),
            dep_time: None,
            taxi_out: None,
            wheels_off: None,
            wheels_on: None,
            taxi_in: None,
            air_time: None,
            distance: Some(500.0),
            cancelled: Some(0.0),
            weather_delay: None,
            late_aircraft_delay: None,
            month: Some(1),
            day_of_week: Some(1),
            day_name: "Monday".to_string(),
        }
    }

    fn dataset(headers: &str, records: Vec<FlightRecord>) -> Dataset {
        Dataset {
            records,
            schema: Schema::from_headers(headers.split(',')),
        }
    }

    fn full_headers() -> &'static str {
        "origin,dep_time,taxi_out,wheels_off,wheels_on,taxi_in,air_time,distance,\
         cancelled,weather_delay,late_aircraft_delay"
    }

    #[test]
    fn drops_rows_missing_essential_fields() {
        let mut no_origin = blank_record();
        no_origin.origin = None;
        let mut no_distance = blank_record();
        no_distance.distance = None;
        let input = dataset(full_headers(), vec![blank_record(), no_origin, no_distance]);

        let cleaned = impute(&input);
        assert_eq!(cleaned.len(), 1);
        assert!(cleaned.len() <= input.len());
    }

    #[test]
    fn essential_check_skipped_when_column_absent() {
        let mut r = blank_record();
        r.origin = None;
        // No origin column in the schema, so the missing origin is ignored.
        let input = dataset("distance,air_time", vec![r]);
        assert_eq!(impute(&input).len(), 1);
    }

    #[test]
    fn missing_delays_become_zero_and_absent_delay_columns_are_created() {
        let mut with_delay = blank_record();
        with_delay.weather_delay = Some(12.0);
        let input = dataset(
            "origin,distance,weather_delay",
            vec![with_delay, blank_record()],
        );

        let cleaned = impute(&input);
        assert_eq!(cleaned.records[0].weather_delay, Some(12.0));
        assert_eq!(cleaned.records[1].weather_delay, Some(0.0));
        // late_aircraft_delay was not in the file at all.
        assert!(cleaned.schema.has(Column::LateAircraftDelay));
        assert!(cleaned
            .records
            .iter()
            .all(|r| r.late_aircraft_delay == Some(0.0)));
    }

    #[test]
    fn air_time_is_filled_with_the_column_median() {
        let mut a = blank_record();
        a.air_time = Some(100.0);
        let mut b = blank_record();
        b.air_time = Some(200.0);
        let mut c = blank_record();
        c.air_time = Some(400.0);
        let missing = blank_record();
        let input = dataset(full_headers(), vec![a, b, c, missing]);

        let cleaned = impute(&input);
        assert_eq!(cleaned.records[3].air_time, Some(200.0));
    }

    #[test]
    fn timing_columns_are_filled_with_the_column_mean() {
        let mut a = blank_record();
        a.dep_time = Some(600.0);
        let mut b = blank_record();
        b.dep_time = Some(800.0);
        let missing = blank_record();
        let input = dataset(full_headers(), vec![a, b, missing]);

        let cleaned = impute(&input);
        assert_eq!(cleaned.records[2].dep_time, Some(700.0));
    }

    #[test]
    fn fill_values_are_independent_across_columns() {
        // dep_time and taxi_out both have holes; each fill must come from its
        // own column's present values only.
        let mut a = blank_record();
        a.dep_time = Some(600.0);
        a.taxi_out = None;
        let mut b = blank_record();
        b.dep_time = None;
        b.taxi_out = Some(30.0);
        let mut c = blank_record();
        c.dep_time = Some(1000.0);
        c.taxi_out = Some(10.0);
        let input = dataset(full_headers(), vec![a, b, c]);

        let cleaned = impute(&input);
        assert_eq!(cleaned.records[1].dep_time, Some(800.0));
        assert_eq!(cleaned.records[0].taxi_out, Some(20.0));
    }

    #[test]
    fn imputation_is_idempotent() {
        let mut a = blank_record();
        a.air_time = Some(120.0);
        a.dep_time = Some(700.0);
        a.taxi_out = Some(18.0);
        a.wheels_off = Some(718.0);
        a.wheels_on = Some(910.0);
        a.taxi_in = Some(6.0);
        let missing = blank_record();
        let input = dataset(full_headers(), vec![a, missing]);

        let once = impute(&input);
        // Columns the policy covers have no nulls left after one pass.
        for (name, count) in once.missing_counts() {
            assert_eq!(count, 0, "column {} still has nulls", name);
        }
        let twice = impute(&once);
        assert_eq!(once.records, twice.records);
    }

    #[test]
    fn input_dataset_is_not_mutated() {
        let mut a = blank_record();
        a.air_time = Some(90.0);
        let missing = blank_record();
        let input = dataset(full_headers(), vec![a, missing]);
        let before = input.records.clone();
        let before_missing = input.missing_counts();

        let _ = impute(&input);
        assert_eq!(input.records, before);
        assert_eq!(input.missing_counts(), before_missing);
    }

    #[test]
    fn all_missing_column_stays_missing() {
        // Nothing to average: the fill is NaN, which is a no-op.
        let input = dataset(full_headers(), vec![blank_record(), blank_record()]);
        let cleaned = impute(&input);
        assert!(cleaned.records.iter().all(|r| r.air_time.is_none()));
    }
}
