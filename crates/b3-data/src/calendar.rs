//! Auxiliary inputs of the heat demand preparation: holiday tables and
//! single numeric columns of weather files.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use b3_core::{CoreError, Real, parse_value};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{DataError, DataResult};

/// One row of the holiday table (`year, month, day, holiday, region`).
///
/// `region` lists every region the holiday applies to, e.g. `BB,BE,SN`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HolidayRow {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub holiday: String,
    pub region: String,
}

pub fn load_holidays(
    path: &Path,
    year: i32,
    region: &str,
) -> DataResult<BTreeMap<NaiveDate, String>> {
    let file = File::open(path)?;
    read_holidays(io::BufReader::new(file), year, region)
}

/// Holidays of `year` whose region list contains `region`, keyed by date.
pub fn read_holidays(
    reader: impl Read,
    year: i32,
    region: &str,
) -> DataResult<BTreeMap<NaiveDate, String>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut holidays = BTreeMap::new();
    for (i, row) in rdr.deserialize::<HolidayRow>().enumerate() {
        let row = row?;
        if row.year != year || !row.region.contains(region) {
            continue;
        }
        let date = NaiveDate::from_ymd_opt(row.year, row.month, row.day).ok_or_else(|| {
            DataError::field(
                i + 1,
                "day",
                CoreError::InvalidTimestamp {
                    text: format!("{}-{}-{}", row.year, row.month, row.day),
                },
            )
        })?;
        holidays.insert(date, row.holiday);
    }
    Ok(holidays)
}

pub fn load_numeric_column(path: &Path, column: &str) -> DataResult<Vec<Real>> {
    let file = File::open(path)?;
    read_numeric_column(io::BufReader::new(file), column)
}

/// Values of one named column; every cell must hold a finite number.
pub fn read_numeric_column(reader: impl Read, column: &str) -> DataResult<Vec<Real>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let position = rdr
        .headers()?
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| DataError::MissingColumn {
            column: column.to_string(),
        })?;

    let mut values = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let cell = record.get(position).unwrap_or("");
        let value = parse_value(cell)
            .and_then(|v| {
                v.ok_or_else(|| CoreError::InvalidNumber {
                    text: cell.to_string(),
                })
            })
            .map_err(|source| DataError::field(i + 1, column, source))?;
        values.push(value);
    }
    Ok(values)
}
