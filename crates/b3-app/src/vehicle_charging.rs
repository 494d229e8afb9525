//! Electric vehicle charging demand profiles in the b3 timeseries schema.
//!
//! simBEV exports hold 15-minute charging power per use case. They are
//! averaged to hourly values; with the balanced strategy, home and work
//! charging inside fixed daily windows is spread evenly over each window.
//! The total charging power is normalized to 1 and stacked per region and
//! year.

use std::collections::BTreeMap;
use std::path::Path;

use b3_core::{Real, Resolution, Timestamp, Value};
use b3_data::{B3TimeseriesRow, DataError, format_header, load_charging_csv, save_b3_timeseries};
use b3_timeseries::{Column, WideTable, stack};
use chrono::{Duration, NaiveDate, Timelike};
use tracing::{error, info};

use crate::config::VehicleChargingConfig;
use crate::error::{AppError, AppResult};
use crate::heat_demand::create_parent_dir;

/// Charging power of all stations.
pub const TOTAL_COLUMN: &str = "sum CS power";
pub const HOME_COLUMN: &str = "sum UC home";
pub const WORK_COLUMN: &str = "sum UC work";

pub const PROFILE_NAME: &str = "electricity-bev_charging-profile";
/// Scenario key of profiles shared by every scenario.
pub const ALL_SCENARIOS: &str = "ALL";

const VAR_UNIT: &str = "None";
const SOURCE: &str = "created with simBEV";
const COMMENT: &str = "https://github.com/rl-institut/simbev";

const SECONDS_PER_HOUR: u32 = 3600;

/// Daily time window between two full hours, both ends included. A window
/// that starts later than it ends spans midnight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChargingWindow {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl ChargingWindow {
    pub fn contains(&self, ts: Timestamp) -> bool {
        let secs = ts.num_seconds_from_midnight();
        let start = self.start_hour * SECONDS_PER_HOUR;
        let end = self.end_hour * SECONDS_PER_HOUR;
        if start <= end {
            start <= secs && secs <= end
        } else {
            secs >= start || secs <= end
        }
    }
}

/// Evening and night at home; the night belongs to the previous evening.
pub const HOME_WINDOW: ChargingWindow = ChargingWindow {
    start_hour: 15,
    end_hour: 5,
};

pub const WORK_WINDOW: ChargingWindow = ChargingWindow {
    start_hour: 6,
    end_hour: 14,
};

/// Calendar day of `ts`.
fn same_day(ts: Timestamp) -> NaiveDate {
    ts.date()
}

/// Day of `ts` with days split at noon, so an evening and the following
/// morning share one key.
fn noon_to_noon(ts: Timestamp) -> NaiveDate {
    (ts + Duration::hours(12)).date()
}

/// Replace the values inside `window` by their mean per `day`. Values outside
/// the window are kept; a window without present values becomes missing.
fn balance(
    timestamps: &[Timestamp],
    values: &[Value],
    window: ChargingWindow,
    day: fn(Timestamp) -> NaiveDate,
) -> Vec<Value> {
    let mut totals: BTreeMap<NaiveDate, (Real, usize)> = BTreeMap::new();
    for (ts, value) in timestamps.iter().zip(values) {
        if window.contains(*ts)
            && let Some(v) = value
        {
            let total = totals.entry(day(*ts)).or_insert((0.0, 0));
            total.0 += v;
            total.1 += 1;
        }
    }

    timestamps
        .iter()
        .zip(values)
        .map(|(ts, value)| {
            if window.contains(*ts) {
                totals.get(&day(*ts)).map(|(sum, n)| sum / *n as Real)
            } else {
                *value
            }
        })
        .collect()
}

fn require_column<'a>(table: &'a WideTable, name: &str) -> AppResult<&'a Column> {
    table.column(name).ok_or_else(|| {
        DataError::MissingColumn {
            column: name.to_string(),
        }
        .into()
    })
}

/// Balanced charging: smooth the home and work columns over their windows
/// and recompute the total as the sum of every other column.
pub fn smooth_profiles(table: &WideTable) -> AppResult<WideTable> {
    require_column(table, TOTAL_COLUMN)?;
    require_column(table, HOME_COLUMN)?;
    require_column(table, WORK_COLUMN)?;

    let timestamps = table.timestamps();
    let mut columns: Vec<Column> = table
        .columns()
        .iter()
        .map(|c| match c.name() {
            HOME_COLUMN => Column::new(
                c.name(),
                balance(&timestamps, c.values(), HOME_WINDOW, noon_to_noon),
            ),
            WORK_COLUMN => Column::new(
                c.name(),
                balance(&timestamps, c.values(), WORK_WINDOW, same_day),
            ),
            _ => c.clone(),
        })
        .collect();

    let mut total = vec![0.0; table.len()];
    for column in columns.iter().filter(|c| c.name() != TOTAL_COLUMN) {
        for (acc, value) in total.iter_mut().zip(column.values()) {
            *acc += value.unwrap_or(0.0);
        }
    }
    for column in columns.iter_mut().filter(|c| c.name() == TOTAL_COLUMN) {
        *column = Column::from_reals(TOTAL_COLUMN, total.iter().copied());
    }

    Ok(WideTable::new(*table.index(), columns)?)
}

/// Hourly charging profile of one simBEV export, normalized to a total of 1.
///
/// The result has the single column [`PROFILE_NAME`].
pub fn charging_profile(table: &WideTable, balanced: bool) -> AppResult<WideTable> {
    let mut hourly = table.resample_mean(Resolution::HOUR)?;
    if balanced {
        hourly = smooth_profiles(&hourly)?;
    }
    let total = require_column(&hourly, TOTAL_COLUMN)?;
    let column = Column::new(PROFILE_NAME, total.values().to_vec());
    Ok(WideTable::new(*hourly.index(), vec![column])?.normalized()?)
}

/// Region code and year of an export named `<prefix>_<kind>_<Region>_<year>.csv`.
pub fn region_and_year(
    name: &str,
    region_codes: &BTreeMap<String, String>,
) -> AppResult<(String, i32)> {
    let stem = Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    let parts: Vec<&str> = stem.split('_').collect();
    let bad_name = || AppError::ChargingFileName {
        name: name.to_string(),
    };

    let region = parts.get(2).ok_or_else(bad_name)?;
    let year = parts
        .get(3)
        .and_then(|y| y.parse::<i32>().ok())
        .ok_or_else(bad_name)?;
    let code = region_codes
        .get(*region)
        .ok_or_else(|| AppError::UnknownRegion {
            name: name.to_string(),
            region: region.to_string(),
        })?;
    Ok((code.clone(), year))
}

/// Stack `profile` as b3 rows of `region`, valid in every scenario.
pub fn stack_charging_profile(profile: &WideTable, region: &str) -> Vec<B3TimeseriesRow> {
    stack(profile)
        .into_iter()
        .map(|row| B3TimeseriesRow {
            region: region.to_string(),
            scenario_key: ALL_SCENARIOS.to_string(),
            var_unit: VAR_UNIT.to_string(),
            source: SOURCE.to_string(),
            comment: COMMENT.to_string(),
            ..B3TimeseriesRow::from_stacked(row)
        })
        .collect()
}

fn input_files(dir: &Path) -> AppResult<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.path().is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();

    if names.is_empty() {
        return Err(AppError::NoInputFiles {
            dir: dir.to_path_buf(),
        });
    }
    Ok(names)
}

fn prepare_file(config: &VehicleChargingConfig, name: &str) -> AppResult<Vec<B3TimeseriesRow>> {
    let (region, year) = region_and_year(name, &config.region_codes)?;
    let table = load_charging_csv(&config.input_dir.join(name), year)?;
    let profile = charging_profile(&table, config.balanced)?;
    info!(region = %region, year, file = name, "prepared vehicle charging profile");
    Ok(stack_charging_profile(&profile, &region))
}

/// Prepare every export in the input directory and return numbered b3
/// timeseries rows, ordered by file name.
pub fn prepare_vehicle_charging(config: &VehicleChargingConfig) -> AppResult<Vec<B3TimeseriesRow>> {
    config.validate()?;

    let mut rows = Vec::new();
    for name in input_files(&config.input_dir)? {
        let file_rows = prepare_file(config, &name).inspect_err(|err| {
            error!(file = %name, "vehicle charging preparation failed: {err}");
        })?;
        rows.extend(file_rows);
    }
    Ok(format_header(rows))
}

/// [`prepare_vehicle_charging`] and write the rows to the configured output path.
pub fn write_vehicle_charging(config: &VehicleChargingConfig) -> AppResult<usize> {
    let rows = prepare_vehicle_charging(config)?;
    create_parent_dir(&config.output_path)?;
    save_b3_timeseries(&rows, &config.output_path)?;
    info!(
        rows = rows.len(),
        output = %config.output_path.display(),
        "wrote vehicle charging profiles"
    );
    Ok(rows.len())
}
