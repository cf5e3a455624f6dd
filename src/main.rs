// Entry point: one batch run over the flight dataset.
//
// The pipeline is strictly forward: load -> impute -> descriptive summaries
// and the daily time series -> seasonal decomposition -> console/chart/file
// output. Only a dataset that cannot be found aborts the run; every other
// anomaly degrades in place and is reported as a diagnostic.
mod charts;
mod decompose;
mod error;
mod impute;
mod loader;
mod output;
mod reports;
mod timeseries;
mod types;
mod util;

use std::path::{Path, PathBuf};

use decompose::{seasonal_strength, trend_direction, DecompositionModel};
use error::AppError;
use timeseries::DailyMetric;
use types::{DailyAggregate, Dataset};
use util::{format_int, format_number};

const DEFAULT_DATASET: &str = "data/flight_data_2024.csv";
const OUTPUT_DIR: &str = "outputs";

/// Weekly pattern over a daily series.
const SEASONAL_PERIOD: usize = 7;

fn main() {
    env_logger::init();
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_DATASET.to_string());
    if let Err(e) = run(Path::new(&path)) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(path: &Path) -> Result<(), AppError> {
    let (raw, load_report) = loader::load(path)?;

    println!("Dataset Information:");
    println!("  File: {}", load_report.resolved_path.display());
    println!(
        "  Rows read: {}, kept: {} ({} skipped by the CSV parser, {} unparseable dates)",
        format_int(load_report.rows_read),
        format_int(load_report.rows_kept),
        format_int(load_report.parse_errors),
        format_int(load_report.unparsed_dates)
    );
    let columns: Vec<&str> = raw.schema.columns().iter().map(|c| c.name()).collect();
    println!("  Recognized columns: {}\n", columns.join(", "));
    print_missing("Missing Values in Each Column", &raw);

    let cleaned = impute::impute(&raw);
    println!(
        "Cleaned dataset: {} rows ({} dropped for missing essential fields)",
        format_int(cleaned.len()),
        format_int(raw.len() - cleaned.len())
    );
    print_missing("Missing Values After Imputation", &cleaned);

    if cleaned.is_empty() {
        println!("No usable rows after cleaning; nothing to analyze.");
        return Ok(());
    }

    let divider = "=".repeat(50);
    println!("{}", divider);
    println!("DESCRIPTIVE ANALYSIS");
    println!("{}\n", divider);

    let basic = reports::basic_stats(&cleaned);
    println!("Total flights: {}", format_int(basic.total_flights));
    println!("Cancelled flights: {}", format_int(basic.cancelled_flights));
    println!(
        "Average distance: {} miles\n",
        format_number(basic.average_distance, 2)
    );

    let by_dow = reports::flights_by_day_of_week(&cleaned);
    output::print_table("Flights per Day of Week", &by_dow);
    let by_month = reports::flights_by_month(&cleaned);
    output::print_table("Flights per Month", &by_month);
    let by_airport = reports::flights_by_airport(&cleaned);
    let top_airports = &by_airport[..by_airport.len().min(10)];
    output::print_table("Flights per Airport (top 10)", top_airports);

    let cancellations = reports::cancellation_summary(&cleaned);
    println!(
        "Cancellation Rate: {}%\n",
        format_number(cancellations.rate_pct, 2)
    );
    output::print_table("Cancellations by Month", &cancellations.by_month);
    output::print_table("Cancellations by Origin", &cancellations.by_origin);

    output::print_table(
        "Flight Duration & Distance Distribution",
        &reports::duration_distance_stats(&cleaned),
    );
    let delays = reports::delay_stats(&cleaned);
    output::print_table("Delay Descriptive Statistics", &delays.stats);
    output::print_table("Total Delays", &delays.totals);
    output::print_table(
        "Airport Performance Summary",
        &reports::airport_performance(&cleaned),
    );
    output::print_table("Monthly Delay Analysis", &reports::monthly_delays(&cleaned));

    println!("{}", divider);
    println!("TIME SERIES ANALYSIS");
    println!("{}\n", divider);

    let series = timeseries::build_daily_series(&cleaned);
    if series.is_empty() {
        println!("No dated rows in the dataset; skipping time-series analysis.");
        return Ok(());
    }
    println!(
        "Daily series: {} days from {} to {}\n",
        format_int(series.len()),
        series[0].date,
        series[series.len() - 1].date
    );

    output::print_table(
        "Day of Week Statistics",
        &timeseries::day_of_week_stats(&series),
    );

    let out_dir = PathBuf::from(OUTPUT_DIR);
    std::fs::create_dir_all(&out_dir)?;

    for metric in DailyMetric::ALL {
        let values: Vec<f64> = series.iter().map(|d| metric.value(d)).collect();
        let decomp = decompose::decompose(&values, DecompositionModel::Additive, SEASONAL_PERIOD);
        println!(
            "Seasonal decomposition: {} (weekly, period {})",
            metric.label(),
            decomp.period
        );
        println!(
            "  Seasonal strength: {}",
            format_number(seasonal_strength(&decomp), 3)
        );
        println!("  Trend direction: {}", trend_direction(&decomp));

        let chart_path = out_dir.join(format!("seasonal_decomp_{}_weekly.png", metric.label()));
        let title = metric.label().replace('_', " ");
        if let Err(e) = charts::decomposition_chart(&chart_path, &title, &decomp) {
            eprintln!("Chart error: {}", e);
        }
    }
    println!();

    render_summary_charts(&out_dir, &cleaned, &series);

    let insights = timeseries::seasonal_insights(&series);
    println!("Key Findings:");
    println!("  Flight volume trend: {}", insights.flight_volume_trend);
    println!("  Busiest day: {}", insights.busiest_day);
    println!("  Quietest day: {}", insights.quietest_day);
    println!(
        "  Weekend vs weekday flights: {} vs {}",
        format_number(insights.weekend_avg_flights, 2),
        format_number(insights.weekday_avg_flights, 2)
    );
    println!(
        "  Highest cancellation day: {}",
        insights.highest_cancellation_day
    );
    println!();

    let series_path = out_dir.join("daily_series.csv");
    if let Err(e) = output::write_csv(&series_path, &series) {
        eprintln!("Write error: {}", e);
    }
    let insights_path = out_dir.join("insights.json");
    if let Err(e) = output::write_json(&insights_path, &insights) {
        eprintln!("Write error: {}", e);
    }
    println!(
        "Outputs saved to '{}' (daily series, insights, charts).",
        out_dir.display()
    );
    Ok(())
}

fn print_missing(title: &str, data: &Dataset) {
    println!("{}:", title);
    for (column, missing) in data.missing_counts() {
        println!("  {:<22} {}", column, format_int(missing));
    }
    println!();
}

/// Bar and line charts for the descriptive summaries. A failed chart is
/// reported and skipped; it never aborts the run.
fn render_summary_charts(out_dir: &Path, cleaned: &Dataset, series: &[DailyAggregate]) {
    let bar = |file: &str, title: &str, labels: Vec<String>, values: Vec<f64>| {
        if let Err(e) = charts::bar_chart(&out_dir.join(file), title, &labels, &values) {
            eprintln!("Chart error: {}", e);
        }
    };

    let by_dow = reports::flights_by_day_of_week(cleaned);
    bar(
        "flights_by_dow.png",
        "Flights by Day of Week",
        by_dow.iter().map(|r| r.day_name.clone()).collect(),
        by_dow.iter().map(|r| r.flights as f64).collect(),
    );

    let by_month = reports::flights_by_month(cleaned);
    bar(
        "flights_by_month.png",
        "Flights by Month",
        by_month.iter().map(|r| r.month.to_string()).collect(),
        by_month.iter().map(|r| r.flights as f64).collect(),
    );

    let by_airport = reports::flights_by_airport(cleaned);
    let top = &by_airport[..by_airport.len().min(10)];
    bar(
        "flights_by_airport.png",
        "Top 10 Origin Airports by Flight Count",
        top.iter().map(|r| r.origin.clone()).collect(),
        top.iter().map(|r| r.flights as f64).collect(),
    );

    let cancellations = reports::cancellation_summary(cleaned);
    bar(
        "cancellations_by_month.png",
        "Cancellations by Month",
        cancellations.by_month.iter().map(|r| r.month.to_string()).collect(),
        cancellations.by_month.iter().map(|r| r.cancellations as f64).collect(),
    );

    let dates: Vec<String> = series
        .iter()
        .map(|d| d.date.format("%m-%d").to_string())
        .collect();
    let counts: Vec<f64> = series.iter().map(|d| d.flight_count as f64).collect();
    let path = out_dir.join("daily_flight_count.png");
    if let Err(e) = charts::line_chart(&path, "Daily Flight Count", &dates, &counts) {
        eprintln!("Chart error: {}", e);
    }
}
