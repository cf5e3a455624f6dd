//! Grouped descriptive summaries of the cleaned dataset.
//!
//! Every function here is a pure function of the dataset; none of them share
//! state, so callers may run them in any order. Rows with a null grouping key
//! stay out of that grouping. Display-bound values are rounded to two
//! decimals at the point of computation.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use crate::types::{
    AirportCountRow, AirportPerformanceRow, BasicStats, CancellationSummary,
    CancellationsByMonthRow, CancellationsByOriginRow, Column, ColumnStatsRow, Dataset,
    DelaySummary, DelayTotalRow, FlightsByDayRow, FlightsByMonthRow, MonthlyDelayRow,
};
use crate::util::{day_name_for, mean, percentile, round2, sample_std};

const DURATION_DISTANCE_COLUMNS: [Column; 4] = [
    Column::AirTime,
    Column::TaxiOut,
    Column::TaxiIn,
    Column::Distance,
];

const DELAY_COLUMNS: [Column; 2] = [Column::WeatherDelay, Column::LateAircraftDelay];

fn cancelled(flag: Option<f64>) -> bool {
    flag.is_some_and(|c| c != 0.0)
}

fn present_values(data: &Dataset, col: Column) -> Vec<f64> {
    data.records.iter().filter_map(|r| r.value(col)).collect()
}

pub fn basic_stats(data: &Dataset) -> BasicStats {
    let average_distance = if data.schema.has(Column::Distance) {
        round2(mean(&present_values(data, Column::Distance)))
    } else {
        0.0
    };
    BasicStats {
        total_flights: data.len(),
        cancelled_flights: data.records.iter().filter(|r| cancelled(r.cancelled)).count(),
        average_distance,
    }
}

pub fn flights_by_day_of_week(data: &Dataset) -> Vec<FlightsByDayRow> {
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for r in &data.records {
        if let Some(dow) = r.day_of_week {
            *counts.entry(dow).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .map(|(day_of_week, flights)| FlightsByDayRow {
            day_of_week,
            day_name: day_name_for(Some(day_of_week)),
            flights,
        })
        .collect()
}

pub fn flights_by_month(data: &Dataset) -> Vec<FlightsByMonthRow> {
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for r in &data.records {
        if let Some(month) = r.month {
            *counts.entry(month).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .map(|(month, flights)| FlightsByMonthRow { month, flights })
        .collect()
}

/// Flight counts per origin, busiest first (ties broken by airport code).
pub fn flights_by_airport(data: &Dataset) -> Vec<AirportCountRow> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for r in &data.records {
        if let Some(origin) = r.origin.as_deref() {
            *counts.entry(origin).or_default() += 1;
        }
    }
    let mut rows: Vec<AirportCountRow> = counts
        .into_iter()
        .map(|(origin, flights)| AirportCountRow {
            origin: origin.to_string(),
            flights,
        })
        .collect();
    rows.sort_by(|a, b| b.flights.cmp(&a.flights).then_with(|| a.origin.cmp(&b.origin)));
    rows
}

pub fn cancellation_summary(data: &Dataset) -> CancellationSummary {
    let flags = present_values(data, Column::Cancelled);
    // Full precision here; the console rounds to two decimals.
    let rate_pct = mean(&flags) * 100.0;

    let mut by_month: BTreeMap<u32, usize> = BTreeMap::new();
    let mut by_origin: BTreeMap<String, usize> = BTreeMap::new();
    for r in data.records.iter().filter(|r| cancelled(r.cancelled)) {
        if let Some(month) = r.month {
            *by_month.entry(month).or_default() += 1;
        }
        if let Some(origin) = r.origin.as_deref() {
            *by_origin.entry(origin.to_string()).or_default() += 1;
        }
    }

    CancellationSummary {
        rate_pct,
        by_month: by_month
            .into_iter()
            .map(|(month, cancellations)| CancellationsByMonthRow {
                month,
                cancellations,
            })
            .collect(),
        by_origin: by_origin
            .into_iter()
            .map(|(origin, cancellations)| CancellationsByOriginRow {
                origin,
                cancellations,
            })
            .collect(),
    }
}

fn describe_column(data: &Dataset, col: Column) -> Option<ColumnStatsRow> {
    if !data.schema.has(col) {
        return None;
    }
    let values = present_values(data, col);
    Some(ColumnStatsRow {
        column: col.name().to_string(),
        count: values.len(),
        mean: round2(mean(&values)),
        std: round2(sample_std(&values)),
        min: round2(percentile(&values, 0.0)),
        q25: round2(percentile(&values, 25.0)),
        median: round2(percentile(&values, 50.0)),
        q75: round2(percentile(&values, 75.0)),
        max: round2(percentile(&values, 100.0)),
    })
}

/// Describe-style statistics over the duration and distance columns. Columns
/// the file does not carry are simply left out.
pub fn duration_distance_stats(data: &Dataset) -> Vec<ColumnStatsRow> {
    DURATION_DISTANCE_COLUMNS
        .iter()
        .filter_map(|c| describe_column(data, *c))
        .collect()
}

/// Delay statistics plus the column-wise totals.
pub fn delay_stats(data: &Dataset) -> DelaySummary {
    let stats = DELAY_COLUMNS
        .iter()
        .filter_map(|c| describe_column(data, *c))
        .collect();
    let totals = DELAY_COLUMNS
        .iter()
        .filter(|c| data.schema.has(**c))
        .map(|c| DelayTotalRow {
            column: c.name().to_string(),
            total: round2(present_values(data, *c).iter().sum()),
        })
        .collect();
    DelaySummary { stats, totals }
}

/// Per-origin operational means, worst weather-delay airports first.
pub fn airport_performance(data: &Dataset) -> Vec<AirportPerformanceRow> {
    #[derive(Default)]
    struct Acc {
        air_time: Vec<f64>,
        taxi_out: Vec<f64>,
        weather: Vec<f64>,
        late: Vec<f64>,
    }

    let mut map: HashMap<String, Acc> = HashMap::new();
    for r in &data.records {
        let Some(origin) = r.origin.as_deref() else {
            continue;
        };
        let acc = map.entry(origin.to_string()).or_default();
        acc.air_time.extend(r.air_time);
        acc.taxi_out.extend(r.taxi_out);
        acc.weather.extend(r.weather_delay);
        acc.late.extend(r.late_aircraft_delay);
    }

    let mut rows: Vec<AirportPerformanceRow> = map
        .into_iter()
        .map(|(origin, acc)| AirportPerformanceRow {
            origin,
            avg_air_time: round2(mean(&acc.air_time)),
            avg_taxi_out: round2(mean(&acc.taxi_out)),
            avg_weather_delay: round2(mean(&acc.weather)),
            avg_late_delay: round2(mean(&acc.late)),
        })
        .collect();
    rows.sort_by(|a, b| {
        b.avg_weather_delay
            .partial_cmp(&a.avg_weather_delay)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.origin.cmp(&b.origin))
    });
    rows
}

/// Mean delay minutes per month for both delay columns.
pub fn monthly_delays(data: &Dataset) -> Vec<MonthlyDelayRow> {
    #[derive(Default)]
    struct Acc {
        weather: Vec<f64>,
        late: Vec<f64>,
    }

    let mut map: BTreeMap<u32, Acc> = BTreeMap::new();
    for r in &data.records {
        let Some(month) = r.month else { continue };
        let acc = map.entry(month).or_default();
        acc.weather.extend(r.weather_delay);
        acc.late.extend(r.late_aircraft_delay);
    }

    map.into_iter()
        .map(|(month, acc)| MonthlyDelayRow {
            month,
            avg_weather_delay: round2(mean(&acc.weather)),
            avg_late_delay: round2(mean(&acc.late)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FlightRecord, Schema};
    use chrono::{Datelike, NaiveDate};

    fn record(date: NaiveDate, origin: &str, cancelled: f64) -> FlightRecord {
        FlightRecord {
            fl_date: Some(date),
            origin: Some(origin.to_string()),
            dep_time: Some(900.0),
            taxi_out: Some(15.0),
            wheels_off: Some(915.0),
            wheels_on: Some(1100.0),
            taxi_in: Some(8.0),
            air_time: Some(105.0),
            distance: Some(740.0),
            cancelled: Some(cancelled),
            weather_delay: Some(0.0),
            late_aircraft_delay: Some(5.0),
            month: Some(date.month()),
            day_of_week: Some(date.weekday().number_from_monday()),
            day_name: crate::util::day_name_for(Some(date.weekday().number_from_monday())),
        }
    }

    /// 14 flights over 7 consecutive dates, 2 per day, cancelled flag
    /// alternating true/false.
    fn two_weeks() -> Dataset {
        let start = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let mut records = Vec::new();
        for day in 0..7 {
            let date = start + chrono::Days::new(day);
            records.push(record(date, "JFK", (day % 2 == 0) as u8 as f64));
            records.push(record(date, "LAX", (day % 2 != 0) as u8 as f64));
        }
        Dataset {
            records,
            schema: Schema::from_headers(
                "fl_date,origin,dep_time,taxi_out,wheels_off,wheels_on,taxi_in,air_time,\
                 distance,cancelled,weather_delay,late_aircraft_delay,month,day_of_week"
                    .split(','),
            ),
        }
    }

    #[test]
    fn alternating_cancellations_give_a_50_percent_rate() {
        let summary = cancellation_summary(&two_weeks());
        assert!((summary.rate_pct - 50.0).abs() < 1e-9);
        assert_eq!(summary.by_month.len(), 1);
        assert_eq!(summary.by_month[0].cancellations, 7);
    }

    #[test]
    fn day_of_week_counts_cover_all_flights() {
        let rows = flights_by_day_of_week(&two_weeks());
        assert!(rows.len() <= 7);
        let total: usize = rows.iter().map(|r| r.flights).sum();
        assert_eq!(total, 14);
        // Two flights on each of the seven days.
        assert!(rows.iter().all(|r| r.flights == 2));
    }

    #[test]
    fn airports_are_ranked_by_flight_count_descending() {
        let mut data = two_weeks();
        data.records.remove(1); // one fewer LAX departure
        let rows = flights_by_airport(&data);
        assert_eq!(rows[0].origin, "JFK");
        assert_eq!(rows[0].flights, 7);
        assert_eq!(rows[1].origin, "LAX");
        assert_eq!(rows[1].flights, 6);
    }

    #[test]
    fn describe_skips_columns_the_file_does_not_carry() {
        let mut data = two_weeks();
        data.schema = Schema::from_headers("origin,air_time".split(','));
        let rows = duration_distance_stats(&data);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].column, "air_time");
        assert_eq!(rows[0].count, 14);
    }

    #[test]
    fn delay_totals_sum_the_columns() {
        let summary = delay_stats(&two_weeks());
        let late = summary
            .totals
            .iter()
            .find(|t| t.column == "late_aircraft_delay")
            .unwrap();
        assert!((late.total - 70.0).abs() < 1e-9);
    }

    #[test]
    fn airport_performance_sorts_by_weather_delay() {
        let mut data = two_weeks();
        for r in data.records.iter_mut().filter(|r| r.origin.as_deref() == Some("LAX")) {
            r.weather_delay = Some(30.0);
        }
        let rows = airport_performance(&data);
        assert_eq!(rows[0].origin, "LAX");
        assert!((rows[0].avg_weather_delay - 30.0).abs() < 1e-9);
        assert_eq!(rows[1].origin, "JFK");
    }

    #[test]
    fn monthly_delays_average_per_month() {
        let rows = monthly_delays(&two_weeks());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].month, 3);
        assert!((rows[0].avg_late_delay - 5.0).abs() < 1e-9);
        assert!((rows[0].avg_weather_delay - 0.0).abs() < 1e-9);
    }

    #[test]
    fn basic_stats_headline_figures() {
        let stats = basic_stats(&two_weeks());
        assert_eq!(stats.total_flights, 14);
        assert_eq!(stats.cancelled_flights, 7);
        assert!((stats.average_distance - 740.0).abs() < 1e-9);
    }
}
