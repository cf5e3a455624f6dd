//! Daily aggregation of the cleaned dataset.
//!
//! One `DailyAggregate` per distinct flight date, ascending; dates with no
//! flights are never invented, so `flight_count >= 1` holds for every row.
//! Derived ratios are computed after aggregation and may divide by zero;
//! the non-finite result is kept as-is and treated as "undefined" downstream.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::types::{DailyAggregate, Dataset, DowStatsRow, FlightRecord, InsightSummary};
use crate::util::{day_name_for, mean, round2, round3, sample_std, DAY_NAMES};

/// Daily metrics analyzed by the seasonal decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DailyMetric {
    FlightCount,
    CancellationRate,
    AvgAirTime,
    DelayIntensity,
}

impl DailyMetric {
    pub const ALL: [DailyMetric; 4] = [
        DailyMetric::FlightCount,
        DailyMetric::CancellationRate,
        DailyMetric::AvgAirTime,
        DailyMetric::DelayIntensity,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DailyMetric::FlightCount => "flight_count",
            DailyMetric::CancellationRate => "cancellation_rate",
            DailyMetric::AvgAirTime => "avg_air_time",
            DailyMetric::DelayIntensity => "delay_intensity",
        }
    }

    pub fn value(self, day: &DailyAggregate) -> f64 {
        match self {
            DailyMetric::FlightCount => day.flight_count as f64,
            DailyMetric::CancellationRate => day.cancellation_rate,
            DailyMetric::AvgAirTime => day.avg_air_time,
            DailyMetric::DelayIntensity => day.delay_intensity,
        }
    }
}

/// Aggregate the cleaned records to one row per calendar date, ascending.
/// Records with a null date are left out.
pub fn build_daily_series(data: &Dataset) -> Vec<DailyAggregate> {
    let mut by_date: BTreeMap<NaiveDate, Vec<&FlightRecord>> = BTreeMap::new();
    for r in &data.records {
        if let Some(date) = r.fl_date {
            by_date.entry(date).or_default().push(r);
        }
    }
    by_date
        .into_iter()
        .map(|(date, rows)| aggregate_date(date, &rows))
        .collect()
}

fn aggregate_date(date: NaiveDate, rows: &[&FlightRecord]) -> DailyAggregate {
    let collect = |f: fn(&FlightRecord) -> Option<f64>| -> Vec<f64> {
        rows.iter().filter_map(|r| f(r)).collect()
    };

    let cancelled = collect(|r| r.cancelled);
    let air_time = collect(|r| r.air_time);
    let distance = collect(|r| r.distance);
    let weather = collect(|r| r.weather_delay);
    let late = collect(|r| r.late_aircraft_delay);
    let taxi_out = collect(|r| r.taxi_out);
    let taxi_in = collect(|r| r.taxi_in);

    let flight_count = rows.len();
    let avg_air_time = round2(mean(&air_time));
    let avg_distance = round2(mean(&distance));
    let weather_delay_total = round2(weather.iter().sum());
    let late_delay_total = round2(late.iter().sum());

    // Derived ratios work off the rounded aggregates. avg_distance can be
    // zero, in which case the efficiency is non-finite and stays that way.
    let operational_efficiency = round3(avg_air_time / avg_distance * 1000.0);
    let delay_intensity = (weather_delay_total + late_delay_total) / flight_count as f64;

    let day_of_week = date.weekday().number_from_monday();

    DailyAggregate {
        date,
        flight_count,
        cancellations_total: round2(cancelled.iter().sum()),
        cancellation_rate: round2(mean(&cancelled)),
        departed_flights: rows.iter().filter(|r| r.dep_time.is_some()).count(),
        avg_air_time,
        air_time_std: round2(sample_std(&air_time)),
        avg_distance,
        total_distance: round2(distance.iter().sum()),
        weather_delay_total,
        avg_weather_delay: round2(mean(&weather)),
        late_delay_total,
        avg_late_delay: round2(mean(&late)),
        avg_taxi_out: round2(mean(&taxi_out)),
        avg_taxi_in: round2(mean(&taxi_in)),
        operational_efficiency,
        delay_intensity,
        day_of_week,
        day_name: day_name_for(Some(day_of_week)),
        is_weekend: day_of_week >= 6,
    }
}

/// Per-day-name mean/std of the key daily metrics, Monday through Sunday.
/// Days with no rows in the series are left out.
pub fn day_of_week_stats(series: &[DailyAggregate]) -> Vec<DowStatsRow> {
    DAY_NAMES
        .iter()
        .filter_map(|day| {
            let rows: Vec<&DailyAggregate> =
                series.iter().filter(|d| d.day_name == *day).collect();
            if rows.is_empty() {
                return None;
            }
            let gather = |f: fn(&DailyAggregate) -> f64| -> Vec<f64> {
                rows.iter().map(|d| f(d)).collect()
            };
            let flights = gather(|d| d.flight_count as f64);
            let cancel = gather(|d| d.cancellation_rate);
            let air = gather(|d| d.avg_air_time);
            let intensity = gather(|d| d.delay_intensity);
            let efficiency = gather(|d| d.operational_efficiency);
            Some(DowStatsRow {
                day: day.to_string(),
                mean_flight_count: round3(mean(&flights)),
                std_flight_count: round3(sample_std(&flights)),
                mean_cancellation_rate: round3(mean(&cancel)),
                std_cancellation_rate: round3(sample_std(&cancel)),
                mean_avg_air_time: round3(mean(&air)),
                std_avg_air_time: round3(sample_std(&air)),
                mean_delay_intensity: round3(mean(&intensity)),
                std_delay_intensity: round3(sample_std(&intensity)),
                mean_operational_efficiency: round3(mean(&efficiency)),
                std_operational_efficiency: round3(sample_std(&efficiency)),
            })
        })
        .collect()
}

/// Headline findings over the daily series, exported as JSON.
pub fn seasonal_insights(series: &[DailyAggregate]) -> InsightSummary {
    let diffs: Vec<f64> = series
        .windows(2)
        .map(|w| w[1].flight_count as f64 - w[0].flight_count as f64)
        .collect();
    let flight_volume_trend = if mean(&diffs) > 0.0 {
        "Increasing".to_string()
    } else {
        "Decreasing".to_string()
    };

    let dow = day_of_week_stats(series);
    let pick = |cmp: fn(f64, f64) -> bool, f: fn(&DowStatsRow) -> f64| -> String {
        let mut best: Option<&DowStatsRow> = None;
        for row in &dow {
            if best.map_or(true, |b| cmp(f(row), f(b))) {
                best = Some(row);
            }
        }
        best.map(|r| r.day.clone()).unwrap_or_default()
    };
    let busiest_day = pick(|a, b| a > b, |r| r.mean_flight_count);
    let quietest_day = pick(|a, b| a < b, |r| r.mean_flight_count);
    let highest_cancellation_day = pick(|a, b| a > b, |r| r.mean_cancellation_rate);

    let weekend: Vec<f64> = series
        .iter()
        .filter(|d| d.is_weekend)
        .map(|d| d.flight_count as f64)
        .collect();
    let weekday: Vec<f64> = series
        .iter()
        .filter(|d| !d.is_weekend)
        .map(|d| d.flight_count as f64)
        .collect();
    let rates: Vec<f64> = series.iter().map(|d| d.cancellation_rate).collect();

    InsightSummary {
        flight_volume_trend,
        busiest_day,
        quietest_day,
        weekend_avg_flights: mean(&weekend),
        weekday_avg_flights: mean(&weekday),
        highest_cancellation_day,
        overall_cancellation_rate: mean(&rates),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Schema;

    fn record(date: NaiveDate, cancelled: f64, air_time: f64, distance: f64) -> FlightRecord {
        FlightRecord {
            fl_date: Some(date),
            origin: Some("JFK".to_string()),
            dep_time: Some(900.0),
            taxi_out: Some(15.0),
            wheels_off: Some(915.0),
            wheels_on: Some(1100.0),
            taxi_in: Some(8.0),
            air_time: Some(air_time),
            distance: Some(distance),
            cancelled: Some(cancelled),
            weather_delay: Some(10.0),
            late_aircraft_delay: Some(20.0),
            month: Some(date.month()),
            day_of_week: Some(date.weekday().number_from_monday()),
            day_name: day_name_for(Some(date.weekday().number_from_monday())),
        }
    }

    fn dataset(records: Vec<FlightRecord>) -> Dataset {
        Dataset {
            records,
            schema: Schema::default(),
        }
    }

    fn two_per_day_for_a_week() -> Dataset {
        let start = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let mut records = Vec::new();
        for day in 0..7 {
            let date = start + chrono::Days::new(day);
            records.push(record(date, (day % 2 == 0) as u8 as f64, 100.0, 500.0));
            records.push(record(date, (day % 2 != 0) as u8 as f64, 120.0, 500.0));
        }
        dataset(records)
    }

    #[test]
    fn one_row_per_distinct_date_ascending() {
        let data = two_per_day_for_a_week();
        let series = build_daily_series(&data);
        assert_eq!(series.len(), 7);
        let mut distinct: Vec<NaiveDate> =
            data.records.iter().filter_map(|r| r.fl_date).collect();
        distinct.sort();
        distinct.dedup();
        assert_eq!(series.len(), distinct.len());
        assert!(series.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn every_daily_row_has_at_least_one_flight() {
        let series = build_daily_series(&two_per_day_for_a_week());
        assert!(series.iter().all(|d| d.flight_count >= 1));
    }

    #[test]
    fn null_dates_are_excluded() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let mut dateless = record(date, 0.0, 100.0, 500.0);
        dateless.fl_date = None;
        let data = dataset(vec![record(date, 0.0, 100.0, 500.0), dateless]);
        let series = build_daily_series(&data);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].flight_count, 1);
    }

    #[test]
    fn per_date_aggregates_and_derived_metrics() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(); // a Monday
        let data = dataset(vec![
            record(date, 1.0, 100.0, 500.0),
            record(date, 0.0, 120.0, 500.0),
        ]);
        let day = &build_daily_series(&data)[0];

        assert_eq!(day.flight_count, 2);
        assert_eq!(day.cancellations_total, 1.0);
        assert_eq!(day.cancellation_rate, 0.5);
        assert_eq!(day.departed_flights, 2);
        assert_eq!(day.avg_air_time, 110.0);
        assert_eq!(day.total_distance, 1000.0);
        assert_eq!(day.weather_delay_total, 20.0);
        assert_eq!(day.late_delay_total, 40.0);
        // 110 minutes per 500 miles -> 220 per 1000 miles.
        assert_eq!(day.operational_efficiency, 220.0);
        // (20 + 40) / 2 flights.
        assert_eq!(day.delay_intensity, 30.0);
        assert_eq!(day.day_of_week, 1);
        assert_eq!(day.day_name, "Monday");
        assert!(!day.is_weekend);
    }

    #[test]
    fn weekend_flag_follows_the_calendar() {
        let saturday = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let data = dataset(vec![record(saturday, 0.0, 90.0, 400.0)]);
        let day = &build_daily_series(&data)[0];
        assert_eq!(day.day_name, "Saturday");
        assert!(day.is_weekend);
    }

    #[test]
    fn zero_distance_makes_efficiency_non_finite() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let data = dataset(vec![record(date, 0.0, 90.0, 0.0)]);
        let day = &build_daily_series(&data)[0];
        assert!(!day.operational_efficiency.is_finite());
    }

    #[test]
    fn single_flight_day_has_undefined_air_time_spread() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let data = dataset(vec![record(date, 0.0, 90.0, 400.0)]);
        let day = &build_daily_series(&data)[0];
        assert!(day.air_time_std.is_nan());
    }

    #[test]
    fn day_of_week_stats_ordered_monday_first() {
        let series = build_daily_series(&two_per_day_for_a_week());
        let stats = day_of_week_stats(&series);
        assert_eq!(stats.len(), 7);
        assert_eq!(stats[0].day, "Monday");
        assert_eq!(stats[6].day, "Sunday");
        assert_eq!(stats[0].mean_flight_count, 2.0);
    }

    #[test]
    fn insights_identify_busiest_and_quietest_days() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let mut records = vec![record(start, 0.0, 100.0, 500.0)];
        // Tuesday gets three flights, the rest one each.
        let tuesday = start + chrono::Days::new(1);
        for _ in 0..3 {
            records.push(record(tuesday, 0.0, 100.0, 500.0));
        }
        for day in 2..7 {
            records.push(record(start + chrono::Days::new(day), 0.0, 100.0, 500.0));
        }
        let insights = seasonal_insights(&build_daily_series(&dataset(records)));
        assert_eq!(insights.busiest_day, "Tuesday");
        assert_ne!(insights.quietest_day, "Tuesday");
        assert!(insights.weekday_avg_flights > insights.weekend_avg_flights);
    }
}
