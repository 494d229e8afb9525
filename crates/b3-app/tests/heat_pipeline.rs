//! End-to-end heat demand preparation over a temporary input tree.

use std::path::{Path, PathBuf};

use b3_app::*;
use b3_core::Real;
use b3_data::load_b3_timeseries;
use b3_timeseries::{StackedTable, unstack_grouped};

/// Profile proportional to heating degrees below 15 °C plus a hot water base.
struct DegreeHourModel;

impl HeatLoadModel for DegreeHourModel {
    fn profile(&self, request: &ProfileRequest<'_>) -> AppResult<Vec<Real>> {
        let weights: Vec<Real> = request
            .temperature
            .iter()
            .map(|t| (15.0 - t).max(0.0) + if request.hot_water { 1.0 } else { 0.0 })
            .collect();
        let sum: Real = weights.iter().sum();
        if sum <= 0.0 {
            return Err(AppError::Model("no heating hours".to_string()));
        }
        Ok(weights
            .into_iter()
            .map(|w| w / sum * request.annual_demand)
            .collect())
    }
}

const SCALARS: &str = "\
id_scal,scenario_key,name,var_name,carrier,region,tech,type,var_value,var_unit,source,comment
0,base,BB-heat_central-demand-ghd,demand,heat_central,BB,demand,load,10,GWh,,
1,base,BB-heat_central-demand-efh,demand,heat_central,BB,demand,load,20,GWh,,
2,base,BB-heat_central-demand-mfh,demand,heat_central,BB,demand,load,30,GWh,,
3,base,BB-heat_decentral-demand-ghd,demand,heat_decentral,BB,demand,load,1,GWh,,
4,base,BB-heat_decentral-demand-efh,demand,heat_decentral,BB,demand,load,2,GWh,,
5,base,BB-heat_decentral-demand-mfh,demand,heat_decentral,BB,demand,load,3,GWh,,
";

const HOLIDAYS: &str = "\
year,month,day,holiday,region
2019,1,1,Neujahr,\"BB,BE\"
";

fn setup(name: &str) -> (PathBuf, HeatDemandConfig) {
    let root = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&root);
    let weather_dir = root.join("weatherdata");
    std::fs::create_dir_all(&weather_dir).unwrap();

    let mut weather = String::from("time,temp_air\n");
    for h in 0..48 {
        weather.push_str(&format!("{h},{}\n", -3.0 + (h % 24) as f64 * 0.75));
    }
    std::fs::write(weather_dir.join("weather_BB_2019.csv"), &weather).unwrap();
    std::fs::write(weather_dir.join("weather_BE_2019.csv"), &weather).unwrap();
    std::fs::write(root.join("holidays.csv"), HOLIDAYS).unwrap();
    std::fs::write(root.join("scalars.csv"), SCALARS).unwrap();

    let config = HeatDemandConfig {
        weather_dir,
        holidays_path: root.join("holidays.csv"),
        scalars_path: root.join("scalars.csv"),
        output_path: root.join("results").join("load_profile_heat.csv"),
        regions: vec!["BB".to_string()],
        scenario: "base".to_string(),
        carriers: vec!["heat_central".to_string(), "heat_decentral".to_string()],
    };
    (root, config)
}

fn profile_sums(path: &Path) -> Vec<Real> {
    let rows = load_b3_timeseries(path).unwrap();
    let stacked: StackedTable = rows.into_iter().map(|r| r.into_stacked()).collect();
    unstack_grouped(&stacked)
        .unwrap()
        .iter()
        .flat_map(|t| t.columns().iter())
        .map(|c| c.values().iter().flatten().sum::<Real>())
        .collect()
}

#[test]
fn prepares_one_profile_per_carrier() {
    let (_root, config) = setup("b3_app_heat_pipeline");

    let written = write_heat_demand(&config, &DegreeHourModel).unwrap();
    assert_eq!(written, 2);

    let rows = load_b3_timeseries(&config.output_path).unwrap();
    let names: Vec<&str> = rows.iter().map(|r| r.var_name.as_str()).collect();
    assert_eq!(
        names,
        vec!["heat_central-load-profile", "heat_decentral-load-profile"]
    );
    assert!(rows.iter().all(|r| r.region == "BB" && r.scenario_key == "base"));
    assert!(rows.iter().all(|r| r.var_unit == "GWh"));
    assert_eq!(rows.iter().map(|r| r.id_ts).collect::<Vec<_>>(), vec![0, 1]);
    assert_eq!(rows[0].timeindex_resolution.to_string(), "H");
    assert_eq!(
        b3_core::format_timestamp(&rows[0].timeindex_stop),
        "2019-01-02T23:00:00"
    );

    for sum in profile_sums(&config.output_path) {
        assert!((sum - 1.0).abs() < 1e-9, "profile sums to {sum}");
    }
}

#[test]
fn region_without_demand_fails_with_context() {
    let (_root, mut config) = setup("b3_app_heat_pipeline_be");
    config.regions = vec!["BE".to_string()];

    let err = prepare_heat_demand(&config, &DegreeHourModel).unwrap_err();
    assert!(matches!(err, AppError::MissingDemand { ref region, .. } if region == "BE"));
}

#[test]
fn region_without_weather_files_fails() {
    let (_root, mut config) = setup("b3_app_heat_pipeline_sn");
    config.regions = vec!["SN".to_string()];

    assert!(matches!(
        prepare_heat_demand(&config, &DegreeHourModel),
        Err(AppError::NoRegionalFiles { .. })
    ));
}

#[test]
fn config_file_drives_the_run() {
    let (root, config) = setup("b3_app_heat_pipeline_yaml");
    let yaml = format!(
        "weather_dir: {}\nholidays_path: {}\nscalars_path: {}\noutput_path: {}\nregions: [BB]\ncarriers: [heat_decentral]\n",
        config.weather_dir.display(),
        config.holidays_path.display(),
        config.scalars_path.display(),
        config.output_path.display(),
    );
    let config_path = root.join("heat.yaml");
    std::fs::write(&config_path, yaml).unwrap();

    let loaded = load_config(&config_path).unwrap();
    assert_eq!(loaded.scenario, "base");
    let rows = prepare_heat_demand(&loaded, &DegreeHourModel).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].var_name, "heat_decentral-load-profile");
}
