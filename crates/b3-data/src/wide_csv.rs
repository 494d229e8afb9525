//! Wide CSV: a timestamp column followed by one column per series.
//!
//! The first column is always the time index whatever its header; pandas
//! writes an unnamed index as an empty header. Empty cells and the usual
//! missing-value tokens (`nan`, `None`, ...) read as missing values.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use b3_core::{Value, format_timestamp, format_value, parse_timestamp, parse_value};
use b3_timeseries::{Column, WideTable};
use tracing::debug;

use crate::{DataError, DataResult};

/// Header written for the time index column.
pub const WIDE_INDEX_COLUMN: &str = "timestamp";

pub fn load_wide_csv(path: &Path) -> DataResult<WideTable> {
    let file = File::open(path)?;
    read_wide_csv(io::BufReader::new(file))
}

pub fn read_wide_csv(reader: impl Read) -> DataResult<WideTable> {
    // Untrimmed: column names are series names and must survive verbatim.
    let mut rdr = csv::ReaderBuilder::new().from_reader(reader);

    let headers = rdr.headers()?.clone();
    let Some(index_column) = headers.get(0) else {
        return Err(DataError::MissingColumn {
            column: WIDE_INDEX_COLUMN.to_string(),
        });
    };
    let names: Vec<&str> = headers.iter().skip(1).collect();

    let mut timestamps = Vec::new();
    let mut values: Vec<Vec<Value>> = vec![Vec::new(); names.len()];
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let row = i + 1;

        let ts = parse_timestamp(record.get(0).unwrap_or(""))
            .map_err(|source| DataError::field(row, index_column, source))?;
        timestamps.push(ts);

        for (k, column) in values.iter_mut().enumerate() {
            let cell = record.get(k + 1).unwrap_or("");
            let value = if cell.trim().is_empty() {
                None
            } else {
                parse_value(cell).map_err(|source| DataError::field(row, names[k], source))?
            };
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
        columns = table.width(),
        len = table.len(),
        "read wide csv"
    );
    Ok(table)
}

pub fn save_wide_csv(table: &WideTable, path: &Path) -> DataResult<()> {
    let file = File::create(path)?;
    write_wide_csv(table, io::BufWriter::new(file))
}

/// Write `table` with canonical timestamps; missing values become empty cells.
pub fn write_wide_csv(table: &WideTable, writer: impl Write) -> DataResult<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    let mut header = vec![WIDE_INDEX_COLUMN];
    header.extend(table.column_names());
    wtr.write_record(&header)?;

    for (i, ts) in table.index().iter().enumerate() {
        let mut record = Vec::with_capacity(table.width() + 1);
        record.push(format_timestamp(&ts));
        for column in table.columns() {
            record.push(column.values()[i].map(format_value).unwrap_or_default());
        }
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use b3_core::{CoreError, Resolution};

    const PANDAS_WIDE: &str = "\
,A,B
2021-01-01 00:00:00,1.0,4.0
2021-01-01 01:00:00,2.0,
2021-01-01 02:00:00,3.0,6.5
";

    #[test]
    fn reads_pandas_output() {
        let table = read_wide_csv(PANDAS_WIDE.as_bytes()).unwrap();
        assert_eq!(table.column_names(), vec!["A", "B"]);
        assert_eq!(table.index().resolution(), Resolution::HOUR);
        assert_eq!(table.len(), 3);
        assert_eq!(
            table.column("B").unwrap().values(),
            &[Some(4.0), None, Some(6.5)]
        );
    }

    #[test]
    fn writes_canonical_layout() {
        let table = read_wide_csv(PANDAS_WIDE.as_bytes()).unwrap();
        let mut buf = Vec::new();
        write_wide_csv(&table, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "timestamp,A,B");
        assert_eq!(lines[1], "2021-01-01T00:00:00,1,4");
        assert_eq!(lines[2], "2021-01-01T01:00:00,2,");
        assert_eq!(lines[3], "2021-01-01T02:00:00,3,6.5");
        assert_eq!(read_wide_csv(text.as_bytes()).unwrap(), table);
    }

    #[test]
    fn column_names_are_not_trimmed() {
        let text = "t, A,A\n2021-01-01 00:00, 1 ,2\n2021-01-01 01:00,  ,4\n";
        let table = read_wide_csv(text.as_bytes()).unwrap();
        assert_eq!(table.column_names(), vec![" A", "A"]);
        assert_eq!(table.column(" A").unwrap().values(), &[Some(1.0), None]);

        let mut buf = Vec::new();
        write_wide_csv(&table, &mut buf).unwrap();
        assert_eq!(read_wide_csv(buf.as_slice()).unwrap(), table);
    }

    #[test]
    fn bad_cell_names_row_and_column() {
        let text = "t,A\n2021-01-01 00:00,1\n2021-01-01 01:00,x\n";
        let err = read_wide_csv(text.as_bytes()).unwrap_err();
        match err {
            DataError::InvalidField {
                row,
                column,
                source,
            } => {
                assert_eq!(row, 2);
                assert_eq!(column, "A");
                assert!(matches!(source, CoreError::InvalidNumber { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let text = "t,A,B\n2021-01-01 00:00,1,2\n2021-01-01 01:00,3\n";
        assert!(matches!(
            read_wide_csv(text.as_bytes()).unwrap_err(),
            DataError::Csv(_)
        ));
    }

    #[test]
    fn uneven_index_is_a_shape_error() {
        let text = "t,A\n2021-01-01 00:00,1\n2021-01-01 01:00,2\n2021-01-01 03:00,3\n";
        assert!(matches!(
            read_wide_csv(text.as_bytes()).unwrap_err(),
            DataError::Timeseries(_)
        ));
    }
}
