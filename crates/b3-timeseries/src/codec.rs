//! `stack` / `unstack` between wide and stacked layouts.

use std::collections::{HashMap, HashSet};

use b3_core::{Resolution, Timestamp};
use tracing::debug;

use crate::series::{decode_series, encode_series};
use crate::stacked::{StackedRow, StackedTable};
use crate::wide::{Column, Series, WideTable};
use crate::{TimeseriesError, TimeseriesResult};

type IndexKey = (Timestamp, Timestamp, Resolution);

/// Stack a wide table: one row per column, in column order.
///
/// Cannot fail: a `WideTable` already guarantees a shared, evenly spaced
/// index and unique column names.
pub fn stack(table: &WideTable) -> StackedTable {
    let index = table.index();
    let rows: StackedTable = table
        .columns()
        .iter()
        .map(|column| StackedRow {
            var_name: column.name().to_string(),
            timeindex_start: index.start(),
            timeindex_stop: index.stop(),
            timeindex_resolution: index.resolution(),
            series: encode_series(column.values()),
        })
        .collect();

    debug!(
        columns = table.width(),
        len = index.len(),
        resolution = %index.resolution(),
        "stacked wide table"
    );
    rows
}

/// Align independently indexed series and stack them. No series stack to
/// an empty table, like a wide table without columns.
pub fn stack_series(series: Vec<Series>) -> TimeseriesResult<StackedTable> {
    if series.is_empty() {
        return Ok(StackedTable::default());
    }
    let table = WideTable::from_series(series)?;
    Ok(stack(&table))
}

/// Unstack rows that all share one time index into a single wide table.
pub fn unstack(table: &StackedTable) -> TimeseriesResult<WideTable> {
    if table.is_empty() {
        return Err(TimeseriesError::EmptyStackedTable);
    }

    let groups = group_rows(table);
    if groups.len() > 1 {
        return Err(TimeseriesError::InconsistentIndex {
            groups: groups.len(),
        });
    }

    let mut tables = groups
        .into_iter()
        .map(|rows| unstack_group(&rows))
        .collect::<TimeseriesResult<Vec<_>>>()?;
    tables.pop().ok_or(TimeseriesError::EmptyStackedTable)
}

/// Unstack rows into one wide table per distinct
/// `(timeindex_start, timeindex_stop, timeindex_resolution)`, in order of
/// first appearance.
pub fn unstack_grouped(table: &StackedTable) -> TimeseriesResult<Vec<WideTable>> {
    group_rows(table)
        .into_iter()
        .map(|rows| unstack_group(&rows))
        .collect()
}

fn group_rows(table: &StackedTable) -> Vec<Vec<&StackedRow>> {
    let mut positions: HashMap<IndexKey, usize> = HashMap::new();
    let mut groups: Vec<Vec<&StackedRow>> = Vec::new();
    for row in table {
        let slot = *positions.entry(row.index_key()).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(row);
    }
    groups
}

fn unstack_group(rows: &[&StackedRow]) -> TimeseriesResult<WideTable> {
    let Some(first) = rows.first() else {
        return Err(TimeseriesError::EmptyStackedTable);
    };
    let index = first
        .time_index()
        .map_err(|source| TimeseriesError::UnreconstructableIndex {
            var_name: first.var_name.clone(),
            source,
        })?;

    let mut seen = HashSet::with_capacity(rows.len());
    let mut columns = Vec::with_capacity(rows.len());
    for row in rows {
        if !seen.insert(row.var_name.as_str()) {
            return Err(TimeseriesError::DuplicateName {
                name: row.var_name.clone(),
            });
        }

        let values =
            decode_series(&row.series).map_err(|source| TimeseriesError::InvalidSeries {
                var_name: row.var_name.clone(),
                source,
            })?;
        if values.len() != index.len() {
            return Err(TimeseriesError::LengthMismatch {
                column: row.var_name.clone(),
                expected: index.len(),
                found: values.len(),
            });
        }
        columns.push(Column::new(row.var_name.clone(), values));
    }

    debug!(
        columns = columns.len(),
        len = index.len(),
        "unstacked row group"
    );
    WideTable::new(index, columns)
}
