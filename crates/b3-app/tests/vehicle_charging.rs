//! Vehicle charging preparation over a temporary directory of simBEV exports.

use std::path::PathBuf;

use b3_app::*;
use b3_core::Real;
use b3_data::load_b3_timeseries;
use b3_timeseries::decode_series;
use chrono::NaiveDate;

fn comma(v: Real) -> String {
    format!("{v:.2}").replace('.', ",")
}

/// Two days of 15-minute charging power, preceded by the last step of the
/// previous year.
fn export(scale: Real) -> String {
    let mut text = String::from(";timestamp;sum CS power;sum UC home;sum UC work;sum UC public\n");
    let start = NaiveDate::from_ymd_opt(2018, 12, 31)
        .unwrap()
        .and_hms_opt(23, 45, 0)
        .unwrap();
    for i in 0..=192_i64 {
        let ts = start + chrono::Duration::minutes(15 * i);
        let home = if i % 96 < 24 { 1_100.0 * scale } else { 0.0 };
        let work = if (i % 96) / 4 == 8 { 40.0 * scale } else { 0.0 };
        let public = (i % 5) as Real * scale;
        text.push_str(&format!(
            "{i};{};{};{};{};{}\n",
            ts.format("%Y-%m-%d %H:%M:%S"),
            comma(home + work + public),
            comma(home),
            comma(work),
            comma(public),
        ));
    }
    text
}

fn setup(name: &str) -> VehicleChargingConfig {
    let root = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&root);
    let input_dir = root.join("vehicle_charging");
    std::fs::create_dir_all(&input_dir).unwrap();
    std::fs::write(input_dir.join("simbev_run_Brandenburg_2019.csv"), export(2.0)).unwrap();
    std::fs::write(input_dir.join("simbev_run_Berlin_2019.csv"), export(1.0)).unwrap();
    VehicleChargingConfig::new(
        input_dir,
        root.join("results").join("ts_load_electricity_vehicles.csv"),
    )
}

fn series_sum(series: &str) -> Real {
    decode_series(series).unwrap().iter().flatten().sum()
}

#[test]
fn profiles_are_written_per_region() {
    let config = setup("b3_app_test_vehicle_charging");
    assert_eq!(write_vehicle_charging(&config).unwrap(), 2);

    let rows = load_b3_timeseries(&config.output_path).unwrap();
    let ids: Vec<usize> = rows.iter().map(|r| r.id_ts).collect();
    assert_eq!(ids, vec![0, 1]);
    let regions: Vec<&str> = rows.iter().map(|r| r.region.as_str()).collect();
    assert_eq!(regions, vec!["B", "BB"]);

    for row in &rows {
        assert_eq!(row.var_name, "electricity-bev_charging-profile");
        assert_eq!(row.scenario_key, "ALL");
        assert_eq!(row.var_unit, "None");
        assert_eq!(row.timeindex_resolution.to_string(), "H");
        assert_eq!(row.timeindex_start.to_string(), "2019-01-01 00:00:00");
        assert_eq!(row.timeindex_stop.to_string(), "2019-01-02 23:00:00");
        let sum = series_sum(&row.series);
        assert!((sum - 1.0).abs() < 1e-9, "{sum}");
    }
    // Shares do not depend on the absolute charging power.
    assert_eq!(rows[0].series, rows[1].series);
}

#[test]
fn balancing_changes_the_profile() {
    let balanced = setup("b3_app_test_vehicle_balanced");
    let greedy = VehicleChargingConfig {
        balanced: false,
        ..balanced.clone()
    };

    let balanced_rows = prepare_vehicle_charging(&balanced).unwrap();
    let greedy_rows = prepare_vehicle_charging(&greedy).unwrap();
    assert_ne!(balanced_rows[0].series, greedy_rows[0].series);
    assert!((series_sum(&greedy_rows[0].series) - 1.0).abs() < 1e-9);
}

#[test]
fn empty_input_directory_is_an_error() {
    let root = std::env::temp_dir().join("b3_app_test_vehicle_empty");
    let _ = std::fs::remove_dir_all(&root);
    std::fs::create_dir_all(&root).unwrap();
    let config = VehicleChargingConfig::new(&root, root.join("out.csv"));
    assert!(matches!(
        prepare_vehicle_charging(&config),
        Err(AppError::NoInputFiles { .. })
    ));
}

#[test]
fn unknown_region_names_the_file() {
    let config = setup("b3_app_test_vehicle_unknown_region");
    let stray: PathBuf = config.input_dir.join("simbev_run_Sachsen_2019.csv");
    std::fs::write(&stray, export(1.0)).unwrap();
    assert!(matches!(
        prepare_vehicle_charging(&config),
        Err(AppError::UnknownRegion { ref name, .. }) if name == "simbev_run_Sachsen_2019.csv"
    ));
}
