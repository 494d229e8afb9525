//! The b3 timeseries schema: stacked rows plus scenario metadata.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use b3_core::{Resolution, Timestamp};
use b3_timeseries::{STACKED_COLUMNS, StackedRow};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::DataResult;
use crate::stacked_csv::validate_header;

/// Column order of b3 timeseries files.
pub const B3_TIMESERIES_COLUMNS: [&str; 11] = [
    "id_ts",
    "region",
    "scenario_key",
    "var_name",
    "timeindex_start",
    "timeindex_stop",
    "timeindex_resolution",
    "series",
    "var_unit",
    "source",
    "comment",
];

const METADATA_COLUMNS: [&str; 6] = [
    "id_ts",
    "region",
    "scenario_key",
    "var_unit",
    "source",
    "comment",
];

/// One row of a b3 timeseries file. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct B3TimeseriesRow {
    #[serde(default)]
    pub id_ts: usize,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub scenario_key: String,
    pub var_name: String,
    #[serde(with = "b3_core::timestamp::serde_text")]
    pub timeindex_start: Timestamp,
    #[serde(with = "b3_core::timestamp::serde_text")]
    pub timeindex_stop: Timestamp,
    pub timeindex_resolution: Resolution,
    pub series: String,
    #[serde(default)]
    pub var_unit: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub comment: String,
}

impl B3TimeseriesRow {
    /// Row with empty metadata; fill the public fields as needed.
    pub fn from_stacked(row: StackedRow) -> Self {
        Self {
            id_ts: 0,
            region: String::new(),
            scenario_key: String::new(),
            var_name: row.var_name,
            timeindex_start: row.timeindex_start,
            timeindex_stop: row.timeindex_stop,
            timeindex_resolution: row.timeindex_resolution,
            series: row.series,
            var_unit: String::new(),
            source: String::new(),
            comment: String::new(),
        }
    }

    /// Drop the metadata, keeping what the codec needs.
    pub fn into_stacked(self) -> StackedRow {
        StackedRow {
            var_name: self.var_name,
            timeindex_start: self.timeindex_start,
            timeindex_stop: self.timeindex_stop,
            timeindex_resolution: self.timeindex_resolution,
            series: self.series,
        }
    }
}

/// Number rows sequentially from 0 in the given order.
pub fn format_header(rows: impl IntoIterator<Item = B3TimeseriesRow>) -> Vec<B3TimeseriesRow> {
    rows.into_iter()
        .enumerate()
        .map(|(id_ts, row)| B3TimeseriesRow { id_ts, ..row })
        .collect()
}

pub fn load_b3_timeseries(path: &Path) -> DataResult<Vec<B3TimeseriesRow>> {
    let file = File::open(path)?;
    read_b3_timeseries(io::BufReader::new(file))
}

/// Read b3 timeseries rows. Metadata columns may be absent and read as empty.
/// Text fields are kept verbatim.
pub fn read_b3_timeseries(reader: impl Read) -> DataResult<Vec<B3TimeseriesRow>> {
    let mut rdr = csv::ReaderBuilder::new().from_reader(reader);
    let headers = rdr.headers()?.clone();
    validate_header(&headers, &STACKED_COLUMNS, &METADATA_COLUMNS)?;

    let rows = rdr
        .deserialize()
        .collect::<Result<Vec<B3TimeseriesRow>, csv::Error>>()?;
    debug!(rows = rows.len(), "read b3 timeseries");
    Ok(rows)
}

pub fn save_b3_timeseries(rows: &[B3TimeseriesRow], path: &Path) -> DataResult<()> {
    let file = File::create(path)?;
    write_b3_timeseries(rows, io::BufWriter::new(file))
}

/// Write rows in [`B3_TIMESERIES_COLUMNS`] order. Ids are written as given;
/// run the rows through [`format_header`] first to renumber them.
pub fn write_b3_timeseries(rows: &[B3TimeseriesRow], writer: impl Write) -> DataResult<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(B3_TIMESERIES_COLUMNS)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}
