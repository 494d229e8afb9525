//! Stacked CSV: a row id column followed by the stacked columns.
//!
//! ```text
//! id_ts,var_name,timeindex_start,timeindex_stop,timeindex_resolution,series
//! 0,A,2021-01-01T00:00:00,2021-01-01T02:00:00,H,"[1,2,3]"
//! ```

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use b3_core::{Resolution, Timestamp};
use b3_timeseries::{STACKED_COLUMNS, StackedRow, StackedTable};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{DataError, DataResult};

/// Header of the leading row id column.
pub const ROW_ID_COLUMN: &str = "id_ts";

#[derive(Debug, Serialize, Deserialize)]
struct StackedRecord {
    #[serde(default)]
    id_ts: Option<usize>,
    var_name: String,
    #[serde(with = "b3_core::timestamp::serde_text")]
    timeindex_start: Timestamp,
    #[serde(with = "b3_core::timestamp::serde_text")]
    timeindex_stop: Timestamp,
    timeindex_resolution: Resolution,
    series: String,
}

impl StackedRecord {
    fn new(id_ts: usize, row: &StackedRow) -> Self {
        Self {
            id_ts: Some(id_ts),
            var_name: row.var_name.clone(),
            timeindex_start: row.timeindex_start,
            timeindex_stop: row.timeindex_stop,
            timeindex_resolution: row.timeindex_resolution,
            series: row.series.clone(),
        }
    }
}

impl From<StackedRecord> for StackedRow {
    fn from(record: StackedRecord) -> Self {
        StackedRow {
            var_name: record.var_name,
            timeindex_start: record.timeindex_start,
            timeindex_stop: record.timeindex_stop,
            timeindex_resolution: record.timeindex_resolution,
            series: record.series,
        }
    }
}

/// Check that `headers` hold every `required` column, any of `optional`, and
/// nothing else. A leading column named `id_ts` or left unnamed is always
/// accepted as the row id.
pub(crate) fn validate_header(
    headers: &csv::StringRecord,
    required: &[&str],
    optional: &[&str],
) -> DataResult<()> {
    for (position, name) in headers.iter().enumerate() {
        let is_row_id = position == 0 && (name == ROW_ID_COLUMN || name.is_empty());
        if !is_row_id && !required.contains(&name) && !optional.contains(&name) {
            return Err(DataError::UnexpectedColumn {
                column: name.to_string(),
            });
        }
    }
    match required.iter().find(|name| !headers.iter().any(|h| h == **name)) {
        Some(missing) => Err(DataError::MissingColumn {
            column: missing.to_string(),
        }),
        None => Ok(()),
    }
}

pub fn load_stacked_csv(path: &Path) -> DataResult<StackedTable> {
    let file = File::open(path)?;
    read_stacked_csv(io::BufReader::new(file))
}

/// Read a stacked table. The row id column is optional and ignored; rows
/// keep file order. Fields are not trimmed, so series names keep any
/// surrounding whitespace; timestamps, resolutions and values tolerate it.
pub fn read_stacked_csv(reader: impl Read) -> DataResult<StackedTable> {
    let mut rdr = csv::ReaderBuilder::new().from_reader(reader);
    let headers = rdr.headers()?.clone();
    validate_header(&headers, &STACKED_COLUMNS, &[])?;

    let table = rdr
        .deserialize::<StackedRecord>()
        .map(|record| record.map(StackedRow::from))
        .collect::<Result<StackedTable, csv::Error>>()?;
    debug!(rows = table.len(), "read stacked csv");
    Ok(table)
}

pub fn save_stacked_csv(table: &StackedTable, path: &Path) -> DataResult<()> {
    let file = File::create(path)?;
    write_stacked_csv(table, io::BufWriter::new(file))
}

/// Write `table` with sequential row ids starting at 0.
pub fn write_stacked_csv(table: &StackedTable, writer: impl Write) -> DataResult<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);

    let mut header = vec![ROW_ID_COLUMN];
    header.extend(STACKED_COLUMNS);
    wtr.write_record(&header)?;

    for (id_ts, row) in table.iter().enumerate() {
        wtr.serialize(StackedRecord::new(id_ts, row))?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use b3_timeseries::{Column, WideTable, stack, unstack};
    use chrono::NaiveDate;

    fn ts(h: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(2021, 1, 1)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn sample() -> StackedTable {
        let table = WideTable::from_timestamps(
            &[ts(0), ts(1), ts(2)],
            vec![
                Column::from_reals("A", [1.0, 2.0, 3.0]),
                Column::new("B", vec![Some(4.0), None, Some(6.25)]),
            ],
        )
        .unwrap();
        stack(&table)
    }

    #[test]
    fn writes_row_ids_and_quoted_series() {
        let mut buf = Vec::new();
        write_stacked_csv(&sample(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "id_ts,var_name,timeindex_start,timeindex_stop,timeindex_resolution,series",
                "0,A,2021-01-01T00:00:00,2021-01-01T02:00:00,H,\"[1,2,3]\"",
                "1,B,2021-01-01T00:00:00,2021-01-01T02:00:00,H,\"[4,null,6.25]\"",
            ]
        );
    }

    #[test]
    fn file_round_trip_restores_wide_table() {
        let stacked = sample();
        let mut buf = Vec::new();
        write_stacked_csv(&stacked, &mut buf).unwrap();
        let read = read_stacked_csv(buf.as_slice()).unwrap();
        assert_eq!(read, stacked);
        assert_eq!(unstack(&read).unwrap(), unstack(&stacked).unwrap());
    }

    #[test]
    fn padded_names_stay_distinct() {
        let table = WideTable::from_timestamps(
            &[ts(0), ts(1)],
            vec![
                Column::from_reals(" A", [1.0, 2.0]),
                Column::from_reals("A", [3.0, 4.0]),
                Column::from_reals("B ", [5.0, 6.0]),
            ],
        )
        .unwrap();
        let stacked = stack(&table);
        let mut buf = Vec::new();
        write_stacked_csv(&stacked, &mut buf).unwrap();

        let read = read_stacked_csv(buf.as_slice()).unwrap();
        let names: Vec<&str> = read.iter().map(|row| row.var_name.as_str()).collect();
        assert_eq!(names, vec![" A", "A", "B "]);
        assert_eq!(read, stacked);
        assert_eq!(unstack(&read).unwrap(), table);
    }

    #[test]
    fn accepts_pandas_layout() {
        let text = "\
,var_name,timeindex_start,timeindex_stop,timeindex_resolution,series
0,A,2021-01-01 00:00:00,2021-01-01 02:00:00,H,\"[1.0, 2.0, 3.0]\"
";
        let read = read_stacked_csv(text.as_bytes()).unwrap();
        assert_eq!(read.len(), 1);
        assert_eq!(read.rows()[0].timeindex_stop, ts(2));
        assert_eq!(unstack(&read).unwrap().len(), 3);
    }

    #[test]
    fn header_is_validated() {
        let missing = "id_ts,var_name,timeindex_start,timeindex_stop,series\n";
        assert!(matches!(
            read_stacked_csv(missing.as_bytes()).unwrap_err(),
            DataError::MissingColumn { column } if column == "timeindex_resolution"
        ));

        let extra = "id_ts,var_name,timeindex_start,timeindex_stop,timeindex_resolution,series,unit\n";
        assert!(matches!(
            read_stacked_csv(extra.as_bytes()).unwrap_err(),
            DataError::UnexpectedColumn { column } if column == "unit"
        ));
    }

    #[test]
    fn bad_resolution_is_reported_with_position() {
        let text = "\
id_ts,var_name,timeindex_start,timeindex_stop,timeindex_resolution,series
0,A,2021-01-01T00:00:00,2021-01-01T02:00:00,fortnight,\"[1,2,3]\"
";
        let err = read_stacked_csv(text.as_bytes()).unwrap_err();
        let msg = err.to_string();
        assert!(matches!(err, DataError::Csv(_)));
        assert!(msg.contains("fortnight"), "{msg}");
        assert!(msg.contains("line: 2"), "{msg}");
    }
}
