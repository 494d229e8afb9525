//! File conversions between the wide and stacked layouts.

use std::io::Write;
use std::path::Path;

use b3_data::{load_stacked_csv, load_wide_csv, save_stacked_csv, save_wide_csv};
use b3_timeseries::{StackedTable, WideTable, stack, unstack};
use tracing::info;

use crate::error::AppResult;

/// Read a wide CSV and stack it.
pub fn stack_path(input: &Path) -> AppResult<StackedTable> {
    let table = load_wide_csv(input)?;
    let stacked = stack(&table);
    info!(
        input = %input.display(),
        columns = table.width(),
        len = table.len(),
        "stacked wide file"
    );
    Ok(stacked)
}

/// Read a stacked CSV whose rows share one time index and unstack it.
pub fn unstack_path(input: &Path) -> AppResult<WideTable> {
    let stacked = load_stacked_csv(input)?;
    let table = unstack(&stacked)?;
    info!(
        input = %input.display(),
        rows = stacked.len(),
        len = table.len(),
        "unstacked file"
    );
    Ok(table)
}

pub fn stack_file(input: &Path, output: &Path) -> AppResult<StackedTable> {
    let stacked = stack_path(input)?;
    save_stacked_csv(&stacked, output)?;
    Ok(stacked)
}

pub fn unstack_file(input: &Path, output: &Path) -> AppResult<WideTable> {
    let table = unstack_path(input)?;
    save_wide_csv(&table, output)?;
    Ok(table)
}

/// Like [`stack_file`] but writes to any writer, e.g. stdout.
pub fn stack_to_writer(input: &Path, writer: impl Write) -> AppResult<StackedTable> {
    let stacked = stack_path(input)?;
    b3_data::write_stacked_csv(&stacked, writer)?;
    Ok(stacked)
}

/// Like [`unstack_file`] but writes to any writer, e.g. stdout.
pub fn unstack_to_writer(input: &Path, writer: impl Write) -> AppResult<WideTable> {
    let table = unstack_path(input)?;
    b3_data::write_wide_csv(&table, writer)?;
    Ok(table)
}
