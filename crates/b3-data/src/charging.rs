//! Vehicle charging demand exports of simBEV.
//!
//! ```text
//! ;timestamp;sum CS power;sum UC home;sum UC work;sum UC public
//! 0;2019-01-01 00:00:00;1.234,5;1.000,0;0,0;234,5
//! ```
//!
//! Fields are separated by `;`, numbers use a decimal comma and `.` as the
//! thousands separator. The first column is a row number and is dropped; the
//! second holds the timestamps.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use b3_core::{CoreResult, Value, parse_timestamp, parse_value};
use b3_timeseries::{Column, WideTable};
use chrono::Datelike;
use tracing::debug;

use crate::{DataError, DataResult};

pub const CHARGING_DELIMITER: u8 = b';';

/// Position of the timestamp column.
const TIME_COLUMN: usize = 1;

pub fn load_charging_csv(path: &Path, year: i32) -> DataResult<WideTable> {
    let file = File::open(path)?;
    read_charging_csv(io::BufReader::new(file), year)
}

/// Read the rows of `year` into a wide table with one column per value
/// column of the export. Rows of other years are skipped.
pub fn read_charging_csv(reader: impl Read, year: i32) -> DataResult<WideTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(CHARGING_DELIMITER)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let Some(time_column) = headers.get(TIME_COLUMN) else {
        return Err(DataError::MissingColumn {
            column: "timestamp".to_string(),
        });
    };
    let names: Vec<&str> = headers.iter().skip(TIME_COLUMN + 1).collect();

    let mut timestamps = Vec::new();
    let mut values: Vec<Vec<Value>> = vec![Vec::new(); names.len()];
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let row = i + 1;

        let ts = parse_timestamp(record.get(TIME_COLUMN).unwrap_or(""))
            .map_err(|source| DataError::field(row, time_column, source))?;
        if ts.year() != year {
            continue;
        }
        timestamps.push(ts);

        for (k, column) in values.iter_mut().enumerate() {
            let cell = record.get(TIME_COLUMN + 1 + k).unwrap_or("");
            let value =
                parse_decimal_comma(cell).map_err(|source| DataError::field(row, names[k], source))?;
            column.push(value);
        }
    }

    let columns = names
        .iter()
        .zip(values)
        .map(|(name, values)| Column::new(*name, values))
        .collect();
    let table = WideTable::from_timestamps(&timestamps, columns)?;
    debug!(
        year,
        columns = table.width(),
        len = table.len(),
        "read charging csv"
    );
    Ok(table)
}

/// Parse `1.234,5` as 1234.5; empty cells and missing-value tokens are `None`.
pub fn parse_decimal_comma(text: &str) -> CoreResult<Value> {
    let token = text.trim();
    if token.is_empty() {
        return Ok(None);
    }
    parse_value(&token.replace('.', "").replace(',', "."))
}
