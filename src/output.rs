// File and console output for the presentation layer. The core hands over
// plain structures; everything about how they are shown or saved lives here.
use std::error::Error;
use std::path::Path;

use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Print a titled markdown table to the console.
pub fn print_table<T>(title: &str, rows: &[T])
where
    T: Tabled + Clone,
{
    println!("{}:", title);
    if rows.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table = Table::new(rows.iter().cloned()).with(Style::markdown()).to_string();
    println!("{}\n", table);
}
