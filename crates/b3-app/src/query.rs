//! Inspection helpers for stacked tables.

use b3_core::{Resolution, Timestamp};
use b3_timeseries::{StackedTable, unstack_grouped};
use serde::Serialize;

use crate::error::AppResult;

/// Rows sharing one `(start, stop, resolution)` triple.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexGroupSummary {
    #[serde(with = "b3_core::timestamp::serde_text")]
    pub start: Timestamp,
    #[serde(with = "b3_core::timestamp::serde_text")]
    pub stop: Timestamp,
    pub resolution: Resolution,
    /// Number of index entries, `None` when the bounds do not align with the
    /// resolution.
    pub len: Option<usize>,
    pub rows: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackedSummary {
    pub row_count: usize,
    pub var_names: Vec<String>,
    /// Groups in order of first appearance.
    pub groups: Vec<IndexGroupSummary>,
}

impl StackedSummary {
    pub fn to_json_pretty(&self) -> AppResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Describe a stacked table without decoding any series.
pub fn summarize(stacked: &StackedTable) -> StackedSummary {
    let mut groups: Vec<IndexGroupSummary> = Vec::new();
    for row in stacked {
        let found = groups.iter_mut().find(|g| {
            (g.start, g.stop, g.resolution) == row.index_key()
        });
        match found {
            Some(group) => group.rows += 1,
            None => groups.push(IndexGroupSummary {
                start: row.timeindex_start,
                stop: row.timeindex_stop,
                resolution: row.timeindex_resolution,
                len: row.time_index().ok().map(|index| index.len()),
                rows: 1,
            }),
        }
    }

    StackedSummary {
        row_count: stacked.len(),
        var_names: stacked.iter().map(|r| r.var_name.clone()).collect(),
        groups,
    }
}

/// Decode every row group; returns the number of groups or the first error.
pub fn check(stacked: &StackedTable) -> AppResult<usize> {
    let tables = unstack_grouped(stacked)?;
    Ok(tables.len())
}
