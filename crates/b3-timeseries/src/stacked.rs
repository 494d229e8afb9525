//! Stacked (row-per-series) timeseries tables.

use b3_core::{CoreResult, Resolution, TimeIndex, Timestamp};

/// Column set and order of every stacked table.
pub const STACKED_COLUMNS: [&str; 5] = [
    "var_name",
    "timeindex_start",
    "timeindex_stop",
    "timeindex_resolution",
    "series",
];

/// One stacked series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackedRow {
    pub var_name: String,
    pub timeindex_start: Timestamp,
    pub timeindex_stop: Timestamp,
    pub timeindex_resolution: Resolution,
    /// Encoded value sequence, see [`crate::series`].
    pub series: String,
}

impl StackedRow {
    /// The triple that identifies which time index this row belongs to.
    pub fn index_key(&self) -> (Timestamp, Timestamp, Resolution) {
        (
            self.timeindex_start,
            self.timeindex_stop,
            self.timeindex_resolution,
        )
    }

    pub fn time_index(&self) -> CoreResult<TimeIndex> {
        TimeIndex::from_bounds(
            self.timeindex_start,
            self.timeindex_stop,
            self.timeindex_resolution,
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackedTable {
    rows: Vec<StackedRow>,
}

impl StackedTable {
    pub fn new(rows: Vec<StackedRow>) -> Self {
        Self { rows }
    }

    /// Column names of the stacked layout; independent of the row count.
    pub fn columns(&self) -> [&'static str; 5] {
        STACKED_COLUMNS
    }

    pub fn rows(&self) -> &[StackedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StackedRow> {
        self.rows.iter()
    }
}

impl FromIterator<StackedRow> for StackedTable {
    fn from_iter<I: IntoIterator<Item = StackedRow>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for StackedTable {
    type Item = StackedRow;
    type IntoIter = std::vec::IntoIter<StackedRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a StackedTable {
    type Item = &'a StackedRow;
    type IntoIter = std::slice::Iter<'a, StackedRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
