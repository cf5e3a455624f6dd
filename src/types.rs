use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Recognized columns of the flight dataset.
///
/// Anything outside this set is ignored by the loader. The `Schema` records
/// which of these were actually present in the input file, so downstream
/// stages branch on an explicit capability set instead of re-probing rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    FlDate,
    Origin,
    DepTime,
    TaxiOut,
    WheelsOff,
    WheelsOn,
    TaxiIn,
    AirTime,
    Distance,
    Cancelled,
    WeatherDelay,
    LateAircraftDelay,
    Month,
    DayOfWeek,
}

impl Column {
    pub const ALL: [Column; 14] = [
        Column::FlDate,
        Column::Origin,
        Column::DepTime,
        Column::TaxiOut,
        Column::WheelsOff,
        Column::WheelsOn,
        Column::TaxiIn,
        Column::AirTime,
        Column::Distance,
        Column::Cancelled,
        Column::WeatherDelay,
        Column::LateAircraftDelay,
        Column::Month,
        Column::DayOfWeek,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Column::FlDate => "fl_date",
            Column::Origin => "origin",
            Column::DepTime => "dep_time",
            Column::TaxiOut => "taxi_out",
            Column::WheelsOff => "wheels_off",
            Column::WheelsOn => "wheels_on",
            Column::TaxiIn => "taxi_in",
            Column::AirTime => "air_time",
            Column::Distance => "distance",
            Column::Cancelled => "cancelled",
            Column::WeatherDelay => "weather_delay",
            Column::LateAircraftDelay => "late_aircraft_delay",
            Column::Month => "month",
            Column::DayOfWeek => "day_of_week",
        }
    }
}

static COLUMNS_BY_NAME: Lazy<HashMap<&'static str, Column>> =
    Lazy::new(|| Column::ALL.iter().map(|c| (c.name(), *c)).collect());

/// The set of recognized columns present in a dataset.
///
/// Built once by the loader from the CSV headers; the imputation engine adds
/// the delay columns it materializes. Components must consult this set before
/// touching a column and silently skip absent ones.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    present: HashSet<Column>,
}

impl Schema {
    pub fn from_headers<'a, I: IntoIterator<Item = &'a str>>(headers: I) -> Self {
        let present = headers
            .into_iter()
            .filter_map(|h| {
                // Excel-style exports sometimes prefix the first header with a
                // UTF-8 BOM; strip it or the column is reported missing.
                let name = h.trim().trim_start_matches('\u{feff}').to_ascii_lowercase();
                COLUMNS_BY_NAME.get(name.as_str()).copied()
            })
            .collect();
        Self { present }
    }

    pub fn has(&self, column: Column) -> bool {
        self.present.contains(&column)
    }

    pub fn insert(&mut self, column: Column) {
        self.present.insert(column);
    }

    /// Present columns in canonical order.
    pub fn columns(&self) -> Vec<Column> {
        Column::ALL.iter().copied().filter(|c| self.has(*c)).collect()
    }
}

/// Raw CSV row as serde sees it. Every field is optional; columns the file
/// does not carry simply deserialize to `None`.
#[derive(Debug, Deserialize)]
pub struct RawFlightRow {
    pub fl_date: Option<String>,
    pub origin: Option<String>,
    pub dep_time: Option<String>,
    pub taxi_out: Option<String>,
    pub wheels_off: Option<String>,
    pub wheels_on: Option<String>,
    pub taxi_in: Option<String>,
    pub air_time: Option<String>,
    pub distance: Option<String>,
    pub cancelled: Option<String>,
    pub weather_delay: Option<String>,
    pub late_aircraft_delay: Option<String>,
    pub month: Option<String>,
    pub day_of_week: Option<String>,
}

/// One scheduled flight leg, typed and normalized.
///
/// `day_of_week` is numbered 1 (Monday) through 7 (Sunday). `day_name` is
/// always present and falls back to `"Unknown"` when the day-of-week could
/// not be determined.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightRecord {
    pub fl_date: Option<NaiveDate>,
    pub origin: Option<String>,
    pub dep_time: Option<f64>,
    pub taxi_out: Option<f64>,
    pub wheels_off: Option<f64>,
    pub wheels_on: Option<f64>,
    pub taxi_in: Option<f64>,
    pub air_time: Option<f64>,
    pub distance: Option<f64>,
    pub cancelled: Option<f64>,
    pub weather_delay: Option<f64>,
    pub late_aircraft_delay: Option<f64>,
    pub month: Option<u32>,
    pub day_of_week: Option<u32>,
    pub day_name: String,
}

impl FlightRecord {
    /// Read a numeric column. Panics on non-numeric columns, which never
    /// appear in the imputation/statistics column sets.
    pub fn value(&self, column: Column) -> Option<f64> {
        match column {
            Column::DepTime => self.dep_time,
            Column::TaxiOut => self.taxi_out,
            Column::WheelsOff => self.wheels_off,
            Column::WheelsOn => self.wheels_on,
            Column::TaxiIn => self.taxi_in,
            Column::AirTime => self.air_time,
            Column::Distance => self.distance,
            Column::Cancelled => self.cancelled,
            Column::WeatherDelay => self.weather_delay,
            Column::LateAircraftDelay => self.late_aircraft_delay,
            _ => panic!("{} is not a numeric column", column.name()),
        }
    }

    pub fn set_value(&mut self, column: Column, value: Option<f64>) {
        match column {
            Column::DepTime => self.dep_time = value,
            Column::TaxiOut => self.taxi_out = value,
            Column::WheelsOff => self.wheels_off = value,
            Column::WheelsOn => self.wheels_on = value,
            Column::TaxiIn => self.taxi_in = value,
            Column::AirTime => self.air_time = value,
            Column::Distance => self.distance = value,
            Column::Cancelled => self.cancelled = value,
            Column::WeatherDelay => self.weather_delay = value,
            Column::LateAircraftDelay => self.late_aircraft_delay = value,
            _ => panic!("{} is not a numeric column", column.name()),
        }
    }

    fn is_missing(&self, column: Column) -> bool {
        match column {
            Column::FlDate => self.fl_date.is_none(),
            Column::Origin => self.origin.is_none(),
            Column::Month => self.month.is_none(),
            Column::DayOfWeek => self.day_of_week.is_none(),
            numeric => self.value(numeric).is_none(),
        }
    }
}

/// The loaded dataset: records plus the schema they were read under.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub records: Vec<FlightRecord>,
    pub schema: Schema,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Missing-value count per present column, in canonical column order.
    pub fn missing_counts(&self) -> Vec<(&'static str, usize)> {
        self.schema
            .columns()
            .into_iter()
            .map(|c| {
                let missing = self.records.iter().filter(|r| r.is_missing(c)).count();
                (c.name(), missing)
            })
            .collect()
    }
}

/// One calendar date of aggregated operations.
///
/// Exactly one row exists per distinct flight date in the cleaned data; dates
/// with no flights are not invented. Aggregates with no defined value (e.g.
/// the standard deviation of a single flight) are `NaN`.
#[derive(Debug, Clone, Serialize)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    pub flight_count: usize,
    pub cancellations_total: f64,
    pub cancellation_rate: f64,
    pub departed_flights: usize,
    pub avg_air_time: f64,
    pub air_time_std: f64,
    pub avg_distance: f64,
    pub total_distance: f64,
    pub weather_delay_total: f64,
    pub avg_weather_delay: f64,
    pub late_delay_total: f64,
    pub avg_late_delay: f64,
    pub avg_taxi_out: f64,
    pub avg_taxi_in: f64,
    pub operational_efficiency: f64,
    pub delay_intensity: f64,
    pub day_of_week: u32,
    pub day_name: String,
    pub is_weekend: bool,
}

#[derive(Debug, Clone, Tabled)]
pub struct FlightsByDayRow {
    #[tabled(rename = "DayOfWeek")]
    pub day_of_week: u32,
    #[tabled(rename = "DayName")]
    pub day_name: String,
    #[tabled(rename = "Flights")]
    pub flights: usize,
}

#[derive(Debug, Clone, Tabled)]
pub struct FlightsByMonthRow {
    #[tabled(rename = "Month")]
    pub month: u32,
    #[tabled(rename = "Flights")]
    pub flights: usize,
}

#[derive(Debug, Clone, Tabled)]
pub struct AirportCountRow {
    #[tabled(rename = "Origin")]
    pub origin: String,
    #[tabled(rename = "Flights")]
    pub flights: usize,
}

#[derive(Debug, Clone, Tabled)]
pub struct CancellationsByMonthRow {
    #[tabled(rename = "Month")]
    pub month: u32,
    #[tabled(rename = "Cancellations")]
    pub cancellations: usize,
}

#[derive(Debug, Clone, Tabled)]
pub struct CancellationsByOriginRow {
    #[tabled(rename = "Origin")]
    pub origin: String,
    #[tabled(rename = "Cancellations")]
    pub cancellations: usize,
}

/// Cancellation overview. `rate_pct` is kept at full precision here; rounding
/// to two decimals happens at the console.
#[derive(Debug, Clone)]
pub struct CancellationSummary {
    pub rate_pct: f64,
    pub by_month: Vec<CancellationsByMonthRow>,
    pub by_origin: Vec<CancellationsByOriginRow>,
}

/// Describe-style statistics for one numeric column.
#[derive(Debug, Clone, Tabled)]
pub struct ColumnStatsRow {
    #[tabled(rename = "Column")]
    pub column: String,
    #[tabled(rename = "Count")]
    pub count: usize,
    #[tabled(rename = "Mean")]
    pub mean: f64,
    #[tabled(rename = "Std")]
    pub std: f64,
    #[tabled(rename = "Min")]
    pub min: f64,
    #[tabled(rename = "25%")]
    pub q25: f64,
    #[tabled(rename = "50%")]
    pub median: f64,
    #[tabled(rename = "75%")]
    pub q75: f64,
    #[tabled(rename = "Max")]
    pub max: f64,
}

#[derive(Debug, Clone, Tabled)]
pub struct DelayTotalRow {
    #[tabled(rename = "Column")]
    pub column: String,
    #[tabled(rename = "TotalMinutes")]
    pub total: f64,
}

#[derive(Debug, Clone)]
pub struct DelaySummary {
    pub stats: Vec<ColumnStatsRow>,
    pub totals: Vec<DelayTotalRow>,
}

#[derive(Debug, Clone, Tabled)]
pub struct AirportPerformanceRow {
    #[tabled(rename = "Origin")]
    pub origin: String,
    #[tabled(rename = "AvgAirTime")]
    pub avg_air_time: f64,
    #[tabled(rename = "AvgTaxiOut")]
    pub avg_taxi_out: f64,
    #[tabled(rename = "AvgWeatherDelay")]
    pub avg_weather_delay: f64,
    #[tabled(rename = "AvgLateAircraftDelay")]
    pub avg_late_delay: f64,
}

#[derive(Debug, Clone, Tabled)]
pub struct MonthlyDelayRow {
    #[tabled(rename = "Month")]
    pub month: u32,
    #[tabled(rename = "AvgWeatherDelay")]
    pub avg_weather_delay: f64,
    #[tabled(rename = "AvgLateAircraftDelay")]
    pub avg_late_delay: f64,
}

/// Headline dataset figures.
#[derive(Debug, Clone)]
pub struct BasicStats {
    pub total_flights: usize,
    pub cancelled_flights: usize,
    pub average_distance: f64,
}

/// Per-day-name statistics of the daily series, Monday through Sunday.
#[derive(Debug, Clone, Tabled)]
pub struct DowStatsRow {
    #[tabled(rename = "Day")]
    pub day: String,
    #[tabled(rename = "MeanFlights")]
    pub mean_flight_count: f64,
    #[tabled(rename = "StdFlights")]
    pub std_flight_count: f64,
    #[tabled(rename = "MeanCancelRate")]
    pub mean_cancellation_rate: f64,
    #[tabled(rename = "StdCancelRate")]
    pub std_cancellation_rate: f64,
    #[tabled(rename = "MeanAirTime")]
    pub mean_avg_air_time: f64,
    #[tabled(rename = "StdAirTime")]
    pub std_avg_air_time: f64,
    #[tabled(rename = "MeanDelayIntensity")]
    pub mean_delay_intensity: f64,
    #[tabled(rename = "StdDelayIntensity")]
    pub std_delay_intensity: f64,
    #[tabled(rename = "MeanOpEfficiency")]
    pub mean_operational_efficiency: f64,
    #[tabled(rename = "StdOpEfficiency")]
    pub std_operational_efficiency: f64,
}

/// High-level findings exported as JSON alongside the charts.
#[derive(Debug, Clone, Serialize)]
pub struct InsightSummary {
    pub flight_volume_trend: String,
    pub busiest_day: String,
    pub quietest_day: String,
    pub weekend_avg_flights: f64,
    pub weekday_avg_flights: f64,
    pub highest_cancellation_day: String,
    pub overall_cancellation_rate: f64,
}
