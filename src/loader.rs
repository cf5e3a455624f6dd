use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::Datelike;
use csv::ReaderBuilder;
use walkdir::WalkDir;

use crate::error::AppError;
use crate::types::{Column, Dataset, FlightRecord, RawFlightRow, Schema};
use crate::util::{day_name_for, parse_date_safe, parse_f64_safe, parse_u32_safe};

/// Conventional mount point for hosted notebook datasets. When it exists, the
/// loader looks for the requested file name anywhere under it before falling
/// back to the literal path.
const INPUT_MOUNT: &str = "/kaggle/input";

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub resolved_path: PathBuf,
    pub rows_read: usize,
    pub rows_kept: usize,
    pub parse_errors: usize,
    pub unparsed_dates: usize,
}

/// Load the flight dataset from `path`.
///
/// Row-level anomalies never fail the load: undeserializable records are
/// counted and skipped, unparseable dates become null dates. The only fatal
/// outcome is a path that resolves to no readable file.
pub fn load(path: &Path) -> Result<(Dataset, LoadReport), AppError> {
    let resolved = resolve_path(path).ok_or_else(|| AppError::NotFound(path.to_path_buf()))?;
    let file = std::fs::File::open(&resolved)?;
    let (dataset, mut report) = read_dataset(file)?;
    report.resolved_path = resolved;
    Ok((dataset, report))
}

/// Find the dataset file: the input mount is searched first (matching on the
/// base file name, first hit in lexical order wins), then the literal path.
fn resolve_path(path: &Path) -> Option<PathBuf> {
    if let Some(base) = path.file_name() {
        let mount = Path::new(INPUT_MOUNT);
        if mount.is_dir() {
            let hit = WalkDir::new(mount)
                .sort_by_file_name()
                .into_iter()
                .filter_map(Result::ok)
                .find(|e| e.file_type().is_file() && e.file_name() == base);
            if let Some(entry) = hit {
                return Some(entry.into_path());
            }
        }
    }
    if path.is_file() {
        return Some(path.to_path_buf());
    }
    None
}

/// Parse CSV content into a typed dataset plus load diagnostics.
fn read_dataset<R: Read>(reader: R) -> Result<(Dataset, LoadReport), AppError> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let mut schema = Schema::from_headers(rdr.headers()?.iter());

    let mut records = Vec::new();
    let mut rows_read = 0usize;
    let mut parse_errors = 0usize;
    let mut unparsed_dates = 0usize;

    for result in rdr.deserialize::<RawFlightRow>() {
        rows_read += 1;
        let raw = match result {
            Ok(r) => r,
            Err(_) => {
                parse_errors += 1;
                continue;
            }
        };

        let fl_date = parse_date_safe(raw.fl_date.as_deref());
        if fl_date.is_none() && raw.fl_date.as_deref().is_some_and(|s| !s.trim().is_empty()) {
            unparsed_dates += 1;
        }

        // Calendar fields come from the file when it carries them, otherwise
        // they are derived from the parsed date. Day-of-week is numbered
        // 1 (Monday) through 7 (Sunday).
        let month = if schema.has(Column::Month) {
            parse_u32_safe(raw.month.as_deref())
        } else {
            fl_date.map(|d| d.month())
        };
        let day_of_week = if schema.has(Column::DayOfWeek) {
            parse_u32_safe(raw.day_of_week.as_deref())
        } else {
            fl_date.map(|d| d.weekday().number_from_monday())
        };
        let day_name = day_name_for(day_of_week);

        let origin = raw
            .origin
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        records.push(FlightRecord {
            fl_date,
            origin,
            dep_time: parse_f64_safe(raw.dep_time.as_deref()),
            taxi_out: parse_f64_safe(raw.taxi_out.as_deref()),
            wheels_off: parse_f64_safe(raw.wheels_off.as_deref()),
            wheels_on: parse_f64_safe(raw.wheels_on.as_deref()),
            taxi_in: parse_f64_safe(raw.taxi_in.as_deref()),
            air_time: parse_f64_safe(raw.air_time.as_deref()),
            distance: parse_f64_safe(raw.distance.as_deref()),
            cancelled: parse_f64_safe(raw.cancelled.as_deref()),
            weather_delay: parse_f64_safe(raw.weather_delay.as_deref()),
            late_aircraft_delay: parse_f64_safe(raw.late_aircraft_delay.as_deref()),
            month,
            day_of_week,
            day_name,
        });
    }

    // A parseable date column makes the derived calendar fields available to
    // downstream grouping even when the file never carried them.
    if schema.has(Column::FlDate) {
        schema.insert(Column::Month);
        schema.insert(Column::DayOfWeek);
    }

    let report = LoadReport {
        resolved_path: PathBuf::new(),
        rows_read,
        rows_kept: records.len(),
        parse_errors,
        unparsed_dates,
    };
    Ok((Dataset { records, schema }, report))
}
