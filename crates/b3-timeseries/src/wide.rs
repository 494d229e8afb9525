//! Wide (column-per-series) timeseries tables.

use std::collections::HashSet;

use b3_core::{CoreError, Real, Resolution, TimeIndex, Timestamp, Value, ensure_finite, sum_present};
use chrono::DateTime;

use crate::{TimeseriesError, TimeseriesResult};

/// One named column of a wide table.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Column without missing values.
    pub fn from_reals(name: impl Into<String>, values: impl IntoIterator<Item = Real>) -> Self {
        Self::new(name, values.into_iter().map(Some).collect())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

/// A named series that carries its own timestamps, before alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub index: Vec<Timestamp>,
    pub values: Vec<Value>,
}

/// Columns over one shared, evenly spaced time index.
///
/// Invariants (checked on construction):
/// - every column has exactly `index.len()` values
/// - column names are unique
/// - present values are finite
#[derive(Debug, Clone, PartialEq)]
pub struct WideTable {
    index: TimeIndex,
    columns: Vec<Column>,
}

impl WideTable {
    pub fn new(index: TimeIndex, columns: Vec<Column>) -> TimeseriesResult<Self> {
        let mut names = HashSet::with_capacity(columns.len());
        for column in &columns {
            check_column(&index, column)?;
            if !names.insert(column.name.as_str()) {
                return Err(TimeseriesError::DuplicateName {
                    name: column.name.clone(),
                });
            }
        }
        Ok(Self { index, columns })
    }

    /// Table with no columns over `index`.
    pub fn empty(index: TimeIndex) -> Self {
        Self {
            index,
            columns: Vec::new(),
        }
    }

    /// Build a table from explicit timestamps, inferring the resolution from
    /// the first step.
    pub fn from_timestamps(timestamps: &[Timestamp], columns: Vec<Column>) -> TimeseriesResult<Self> {
        let index = TimeIndex::from_timestamps(timestamps)?;
        Self::new(index, columns)
    }

    /// Align independently indexed series into one table.
    ///
    /// The first series defines the index; every other series must carry
    /// exactly the same timestamps.
    pub fn from_series(series: Vec<Series>) -> TimeseriesResult<Self> {
        let Some(first) = series.first() else {
            return Err(b3_core::CoreError::IndexTooShort { needed: 2, len: 0 }.into());
        };
        let index = TimeIndex::from_timestamps(&first.index)?;
        let reference = first.name.clone();

        let mut columns = Vec::with_capacity(series.len());
        for s in series {
            if s.values.len() != s.index.len() {
                return Err(TimeseriesError::LengthMismatch {
                    column: s.name,
                    expected: s.index.len(),
                    found: s.values.len(),
                });
            }
            if s.index.len() != index.len() || !s.index.iter().copied().eq(index.iter()) {
                return Err(TimeseriesError::IndexMismatch {
                    column: s.name,
                    reference,
                });
            }
            columns.push(Column::new(s.name, s.values));
        }
        Self::new(index, columns)
    }

    pub fn index(&self) -> &TimeIndex {
        &self.index
    }

    pub fn timestamps(&self) -> Vec<Timestamp> {
        self.index.to_vec()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Number of rows (index entries).
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Copy of the table where every column is divided by its own sum.
    pub fn normalized(&self) -> TimeseriesResult<Self> {
        let columns = self
            .columns
            .iter()
            .map(|c| {
                let total = sum_present(&c.values)
                    .filter(|t| *t != 0.0)
                    .ok_or_else(|| TimeseriesError::ZeroSum {
                        column: c.name.clone(),
                    })?;
                let values = c.values.iter().map(|v| v.map(|x| x / total)).collect();
                Ok(Column::new(c.name.clone(), values))
            })
            .collect::<TimeseriesResult<Vec<_>>>()?;
        Self::new(self.index, columns)
    }

    /// Downsample to `resolution`, averaging the present values that fall
    /// into each bucket. A bucket without present values is missing.
    ///
    /// Buckets are counted from the Unix epoch, so hourly buckets start on
    /// the full hour and daily buckets at midnight. `resolution` must be a
    /// whole multiple of the current resolution.
    pub fn resample_mean(&self, resolution: Resolution) -> TimeseriesResult<Self> {
        let from = self.index.resolution();
        if resolution.seconds() % from.seconds() != 0 {
            return Err(TimeseriesError::IncompatibleResolution {
                from,
                to: resolution,
            });
        }

        let width = i64::from(resolution.seconds());
        let bucket = |ts: Timestamp| ts.and_utc().timestamp().div_euclid(width);
        let first = bucket(self.index.start());
        let len = usize::try_from(bucket(self.index.stop()) - first + 1)
            .map_err(|_| CoreError::IndexOverflow)?;
        let start = first
            .checked_mul(width)
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|utc| utc.naive_utc())
            .ok_or(CoreError::IndexOverflow)?;
        let index = TimeIndex::new(start, len, resolution)?;

        // Entries are increasing, so every slot is in 0..len.
        let slots: Vec<usize> = self
            .index
            .iter()
            .map(|ts| (bucket(ts) - first) as usize)
            .collect();

        let columns = self
            .columns
            .iter()
            .map(|c| {
                let mut sums = vec![0.0; len];
                let mut counts = vec![0_usize; len];
                for (slot, value) in slots.iter().zip(&c.values) {
                    if let Some(v) = value {
                        sums[*slot] += v;
                        counts[*slot] += 1;
                    }
                }
                let values = sums
                    .into_iter()
                    .zip(counts)
                    .map(|(sum, n)| (n > 0).then(|| sum / n as Real))
                    .collect();
                Column::new(c.name.clone(), values)
            })
            .collect();
        Self::new(index, columns)
    }
}

fn check_column(index: &TimeIndex, column: &Column) -> TimeseriesResult<()> {
    if column.values.len() != index.len() {
        return Err(TimeseriesError::LengthMismatch {
            column: column.name.clone(),
            expected: index.len(),
            found: column.values.len(),
        });
    }
    for v in column.values.iter().flatten() {
        ensure_finite(*v, "series value")?;
    }
    Ok(())
}
