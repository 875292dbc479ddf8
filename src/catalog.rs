//! The activity catalog: a CSV export with one row per activity.
//!
//! Columns are `id, startTime, name, totalMeters, totalSeconds`. The first row
//! is a header. Blank cells leave the field unset.

use crate::activity::Activity;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub fn load_catalog(path: &Path) -> Result<Vec<Activity>, CatalogError> {
    let file = std::fs::File::open(path)?;
    read_catalog(file)
}

pub fn read_catalog<R: Read>(reader: R) -> Result<Vec<Activity>, CatalogError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut activities = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        debug!("catalog row {}: {:?}", row, record);
        activities.push(activity_from_record(row, &record));
    }

    Ok(activities)
}

fn activity_from_record(row: usize, record: &StringRecord) -> Activity {
    let mut activity = Activity::new();
    activity.activity_id = parse_cell(row, record, 0, "id");
    activity.start_time = text_cell(record, 1);
    activity.name = text_cell(record, 2);
    activity.total_meters = parse_cell(row, record, 3, "totalMeters");
    activity.total_seconds = parse_cell(row, record, 4, "totalSeconds");
    activity
}

fn text_cell(record: &StringRecord, index: usize) -> Option<String> {
    record
        .get(index)
        .filter(|cell| !cell.is_empty())
        .map(str::to_owned)
}

fn parse_cell<T: FromStr>(row: usize, record: &StringRecord, index: usize, column: &str) -> Option<T> {
    let cell = record.get(index).filter(|cell| !cell.is_empty())?;
    match cell.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("catalog row {}: ignoring invalid {} {:?}", row, column, cell);
            None
        }
    }
}
