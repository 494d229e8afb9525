//! b3 scalar files: one parameter value per row with descriptive metadata.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use b3_core::{CoreResult, Value, parse_value};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{DataError, DataResult};

/// Columns that [`ScalarRow::field`] and [`filter_scalars`] can select on.
const FILTER_FIELDS: [&str; 10] = [
    "scenario_key",
    "name",
    "var_name",
    "carrier",
    "region",
    "tech",
    "type",
    "var_unit",
    "source",
    "comment",
];

/// One scalar row. Every metadata column is optional and reads as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScalarRow {
    pub id_scal: Option<u64>,
    #[serde(alias = "scenario")]
    pub scenario_key: String,
    pub name: String,
    pub var_name: String,
    pub carrier: String,
    pub region: String,
    pub tech: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Raw cell text; see [`ScalarRow::value`].
    pub var_value: String,
    pub var_unit: String,
    pub source: String,
    pub comment: String,
}

impl ScalarRow {
    /// The numeric value; an empty cell or a missing-value token gives `None`.
    pub fn value(&self) -> CoreResult<Value> {
        if self.var_value.trim().is_empty() {
            return Ok(None);
        }
        parse_value(&self.var_value)
    }

    /// Text of a metadata column by its file header name.
    pub fn field(&self, column: &str) -> Option<&str> {
        let text = match column {
            "scenario_key" => &self.scenario_key,
            "name" => &self.name,
            "var_name" => &self.var_name,
            "carrier" => &self.carrier,
            "region" => &self.region,
            "tech" => &self.tech,
            "type" => &self.kind,
            "var_unit" => &self.var_unit,
            "source" => &self.source,
            "comment" => &self.comment,
            _ => return None,
        };
        Some(text.as_str())
    }
}

pub fn load_b3_scalars(path: &Path) -> DataResult<Vec<ScalarRow>> {
    let file = File::open(path)?;
    read_b3_scalars(io::BufReader::new(file))
}

pub fn read_b3_scalars(reader: impl Read) -> DataResult<Vec<ScalarRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let rows = rdr
        .deserialize()
        .collect::<Result<Vec<ScalarRow>, csv::Error>>()?;
    debug!(rows = rows.len(), "read b3 scalars");
    Ok(rows)
}

/// Rows whose `column` equals `value` exactly.
///
/// Takes any iterator of row references so filters chain:
/// `filter_scalars(filter_scalars(&rows, "tech", "demand")?, "region", "BB")`.
pub fn filter_scalars<'a>(
    rows: impl IntoIterator<Item = &'a ScalarRow>,
    column: &str,
    value: &str,
) -> DataResult<Vec<&'a ScalarRow>> {
    if !FILTER_FIELDS.contains(&column) {
        return Err(DataError::UnknownField(column.to_string()));
    }
    Ok(rows
        .into_iter()
        .filter(|row| row.field(column) == Some(value))
        .collect())
}
