//! Heat demand load profiles in the b3 timeseries schema.
//!
//! For every region, weather file of the region and heat carrier the yearly
//! demands of single-family houses, multi-family houses and the commercial
//! sector are turned into hourly profiles by a [`HeatLoadModel`], summed,
//! normalized and stacked with region, scenario and unit attached.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use b3_core::{Real, Resolution, TimeIndex};
use b3_data::{
    B3TimeseriesRow, ScalarRow, filter_scalars, format_header, load_b3_scalars, load_holidays,
    load_numeric_column, save_b3_timeseries,
};
use b3_timeseries::{Column, WideTable, stack};
use chrono::NaiveDate;
use tracing::{error, info, warn};

use crate::config::HeatDemandConfig;
use crate::error::{AppError, AppResult};

/// Years searched for in weather file names.
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1990..=2050;

/// Weather file column holding the air temperature.
const TEMPERATURE_COLUMN: &str = "temp_air";

/// Consumer groups with their own standard load profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Consumer {
    /// Commercial, trade and services.
    Ghd,
    /// Single-family houses.
    Efh,
    /// Multi-family houses.
    Mfh,
}

impl Consumer {
    pub const ALL: [Consumer; 3] = [Consumer::Ghd, Consumer::Efh, Consumer::Mfh];

    /// Code used in scalar names, e.g. `BB-heat_central-demand-efh`.
    pub fn code(self) -> &'static str {
        match self {
            Consumer::Ghd => "ghd",
            Consumer::Efh => "efh",
            Consumer::Mfh => "mfh",
        }
    }

    /// Standard load profile type passed to the model.
    pub fn profile_type(self) -> &'static str {
        match self {
            Consumer::Ghd => "ghd",
            Consumer::Efh => "EFH",
            Consumer::Mfh => "MFH",
        }
    }

    /// Building class of residential profiles; the commercial profile has none.
    pub fn building_class(self) -> Option<u8> {
        match self {
            Consumer::Ghd => None,
            Consumer::Efh => Some(6),
            Consumer::Mfh => Some(2),
        }
    }
}

impl fmt::Display for Consumer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Inputs of one profile computation.
#[derive(Debug, Clone)]
pub struct ProfileRequest<'a> {
    pub index: &'a TimeIndex,
    pub consumer: Consumer,
    /// Standard load profile type of `consumer`.
    pub profile_type: &'static str,
    pub building_class: Option<u8>,
    pub holidays: &'a BTreeMap<NaiveDate, String>,
    /// One temperature per index entry.
    pub temperature: &'a [Real],
    pub annual_demand: Real,
    pub wind_class: u8,
    /// Whether hot water is included in the profile.
    pub hot_water: bool,
}

/// Building heat load model producing one value per index entry.
///
/// Implementations wrap a standard load profile library; the preparation
/// only sums and normalizes what they return.
pub trait HeatLoadModel {
    fn profile(&self, request: &ProfileRequest<'_>) -> AppResult<Vec<Real>>;
}

/// Yearly demand per consumer of one carrier, region and scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct YearlyDemand {
    pub unit: String,
    demands: BTreeMap<Consumer, Real>,
}

impl YearlyDemand {
    pub fn new(unit: impl Into<String>, demands: impl IntoIterator<Item = (Consumer, Real)>) -> Self {
        Self {
            unit: unit.into(),
            demands: demands.into_iter().collect(),
        }
    }

    pub fn get(&self, consumer: Consumer) -> Option<Real> {
        self.demands.get(&consumer).copied()
    }
}

/// One cell of the preparation grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeatRunContext {
    pub region: String,
    pub scenario: String,
    pub carrier: String,
    pub weather_file: PathBuf,
    pub year: i32,
}

/// Sorted names of the entries in `dir` whose name contains `region`.
pub fn find_regional_files(dir: &Path, region: &str) -> AppResult<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        // Follows symlinks.
        if !entry.path().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.contains(region) {
            names.push(name);
        }
    }
    names.sort();

    if names.is_empty() {
        return Err(AppError::NoRegionalFiles {
            region: region.to_string(),
            dir: dir.to_path_buf(),
        });
    }
    Ok(names)
}

/// The single year between 1990 and 2050 written in `name`.
pub fn year_from_file_name(name: &str) -> AppResult<i32> {
    let years: Vec<i32> = YEAR_RANGE
        .filter(|year| name.contains(&year.to_string()))
        .collect();
    match years.as_slice() {
        [year] => Ok(*year),
        _ => Err(AppError::AmbiguousYear {
            name: name.to_string(),
            found: years.len(),
        }),
    }
}

/// Yearly demands of `carrier` in `region` under `scenario`.
///
/// Selects scalar rows with `tech == "demand"` and assigns them to consumers
/// by the consumer code in their name. Several rows of one consumer are
/// summed with a warning. All selected rows must share one unit.
pub fn yearly_heat_demand(
    scalars: &[ScalarRow],
    scenario: &str,
    carrier: &str,
    region: &str,
) -> AppResult<YearlyDemand> {
    let rows = filter_scalars(scalars, "tech", "demand")?;
    let rows = filter_scalars(rows, "carrier", carrier)?;
    let rows = filter_scalars(rows, "region", region)?;
    let rows = filter_scalars(rows, "scenario_key", scenario)?;

    let missing = |consumer: &str| AppError::MissingDemand {
        consumer: consumer.to_string(),
        carrier: carrier.to_string(),
        region: region.to_string(),
        scenario: scenario.to_string(),
    };

    let Some(unit) = rows.first().map(|r| r.var_unit.clone()) else {
        return Err(missing("any"));
    };
    if rows.iter().any(|r| r.var_unit != unit) {
        let mut units: Vec<String> = rows.iter().map(|r| r.var_unit.clone()).collect();
        units.sort();
        units.dedup();
        return Err(AppError::UnitMismatch {
            carrier: carrier.to_string(),
            region: region.to_string(),
            units,
        });
    }

    let mut demands = Vec::with_capacity(Consumer::ALL.len());
    for consumer in Consumer::ALL {
        let matching: Vec<&ScalarRow> = rows
            .iter()
            .copied()
            .filter(|r| r.name.contains(consumer.code()))
            .collect();
        if matching.len() > 1 {
            warn!(
                carrier,
                consumer = consumer.code(),
                region,
                scenario,
                rows = matching.len(),
                "duplicate heat demand, summing"
            );
        }

        let mut total: Option<Real> = None;
        for row in matching {
            if let Some(value) = row.value()? {
                total = Some(total.unwrap_or(0.0) + value);
            }
        }
        let total = total.ok_or_else(|| missing(consumer.code()))?;
        demands.push((consumer, total));
    }

    Ok(YearlyDemand::new(unit, demands))
}

/// Normalized heat load profile of `ctx.carrier`.
///
/// The result has the single column `{carrier}-load-profile`, the sum of the
/// consumer profiles scaled to a total of 1.
pub fn calculate_heat_load(
    model: &dyn HeatLoadModel,
    index: &TimeIndex,
    ctx: &HeatRunContext,
    holidays: &BTreeMap<NaiveDate, String>,
    temperature: &[Real],
    demands: &YearlyDemand,
) -> AppResult<WideTable> {
    if temperature.len() != index.len() {
        return Err(AppError::Model(format!(
            "{} temperatures for a time index of {} entries",
            temperature.len(),
            index.len()
        )));
    }

    let mut total = vec![0.0; index.len()];
    for consumer in Consumer::ALL {
        let annual_demand = demands.get(consumer).ok_or_else(|| AppError::MissingDemand {
            consumer: consumer.code().to_string(),
            carrier: ctx.carrier.clone(),
            region: ctx.region.clone(),
            scenario: ctx.scenario.clone(),
        })?;
        let request = ProfileRequest {
            index,
            consumer,
            profile_type: consumer.profile_type(),
            building_class: consumer.building_class(),
            holidays,
            temperature,
            annual_demand,
            wind_class: 0,
            hot_water: true,
        };
        let profile = model.profile(&request)?;
        if profile.len() != index.len() {
            return Err(AppError::Model(format!(
                "{consumer} profile has {} values, expected {}",
                profile.len(),
                index.len()
            )));
        }
        for (acc, value) in total.iter_mut().zip(profile) {
            *acc += value;
        }
    }

    let column = Column::from_reals(format!("{}-load-profile", ctx.carrier), total);
    let table = WideTable::new(*index, vec![column])?.normalized()?;
    Ok(table)
}

/// Stack `table` and attach region, scenario and unit to every row.
pub fn stack_heat_load(
    table: &WideTable,
    region: &str,
    scenario: &str,
    unit: &str,
) -> Vec<B3TimeseriesRow> {
    stack(table)
        .into_iter()
        .map(|row| B3TimeseriesRow {
            region: region.to_string(),
            scenario_key: scenario.to_string(),
            var_unit: unit.to_string(),
            ..B3TimeseriesRow::from_stacked(row)
        })
        .collect()
}

/// Hourly index of `len` entries starting at the beginning of `year`.
fn year_index(year: i32, len: usize) -> AppResult<TimeIndex> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or(AppError::YearOutOfRange { year })?;
    Ok(TimeIndex::new(start, len, Resolution::HOUR)?)
}

fn prepare_case(
    config: &HeatDemandConfig,
    model: &dyn HeatLoadModel,
    scalars: &[ScalarRow],
    ctx: &HeatRunContext,
) -> AppResult<Vec<B3TimeseriesRow>> {
    let holidays = load_holidays(&config.holidays_path, ctx.year, &ctx.region)?;
    let temperature = load_numeric_column(&ctx.weather_file, TEMPERATURE_COLUMN)?;
    let demands = yearly_heat_demand(scalars, &ctx.scenario, &ctx.carrier, &ctx.region)?;
    let index = year_index(ctx.year, temperature.len())?;

    let table = calculate_heat_load(model, &index, ctx, &holidays, &temperature, &demands)?;
    Ok(stack_heat_load(
        &table,
        &ctx.region,
        &ctx.scenario,
        &demands.unit,
    ))
}

/// Run the whole preparation grid and return numbered b3 timeseries rows.
///
/// Rows are ordered by region, weather file and carrier as configured.
pub fn prepare_heat_demand(
    config: &HeatDemandConfig,
    model: &dyn HeatLoadModel,
) -> AppResult<Vec<B3TimeseriesRow>> {
    config.validate()?;
    let scalars = load_b3_scalars(&config.scalars_path)?;

    let mut rows = Vec::new();
    for region in &config.regions {
        let files = find_regional_files(&config.weather_dir, region)?;
        for file in &files {
            let year = year_from_file_name(file)?;
            for carrier in &config.carriers {
                let ctx = HeatRunContext {
                    region: region.clone(),
                    scenario: config.scenario.clone(),
                    carrier: carrier.clone(),
                    weather_file: config.weather_dir.join(file),
                    year,
                };
                let case_rows = prepare_case(config, model, &scalars, &ctx).inspect_err(|err| {
                    error!(
                        region = %ctx.region,
                        carrier = %ctx.carrier,
                        year = ctx.year,
                        file = %ctx.weather_file.display(),
                        "heat demand preparation failed: {err}"
                    );
                })?;
                info!(
                    region = %ctx.region,
                    carrier = %ctx.carrier,
                    year = ctx.year,
                    "prepared heat load profile"
                );
                rows.extend(case_rows);
            }
        }
    }

    Ok(format_header(rows))
}

pub(crate) fn create_parent_dir(path: &Path) -> AppResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// [`prepare_heat_demand`] and write the rows to the configured output path.
pub fn write_heat_demand(
    config: &HeatDemandConfig,
    model: &dyn HeatLoadModel,
) -> AppResult<usize> {
    let rows = prepare_heat_demand(config, model)?;
    create_parent_dir(&config.output_path)?;
    save_b3_timeseries(&rows, &config.output_path)?;
    info!(
        rows = rows.len(),
        output = %config.output_path.display(),
        "wrote heat load profiles"
    );
    Ok(rows.len())
}
