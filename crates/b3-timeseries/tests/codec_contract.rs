use b3_core::format_timestamp;
use b3_timeseries::*;
use chrono::NaiveDate;

fn ts(day: u32, h: u32) -> Timestamp {
    NaiveDate::from_ymd_opt(2021, 1, day)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

fn hourly_ab() -> WideTable {
    WideTable::from_timestamps(
        &[ts(1, 0), ts(1, 1), ts(1, 2)],
        vec![
            Column::from_reals("A", [1.0, 2.0, 3.0]),
            Column::from_reals("B", [4.0, 5.0, 6.0]),
        ],
    )
    .unwrap()
}

#[test]
fn hourly_two_column_example() {
    let stacked = stack(&hourly_ab());
    assert_eq!(stacked.columns(), STACKED_COLUMNS);

    let fields: Vec<[String; 5]> = stacked
        .iter()
        .map(|r| {
            [
                r.var_name.clone(),
                format_timestamp(&r.timeindex_start),
                format_timestamp(&r.timeindex_stop),
                r.timeindex_resolution.to_string(),
                r.series.clone(),
            ]
        })
        .collect();

    assert_eq!(
        fields,
        vec![
            [
                "A".to_string(),
                "2021-01-01T00:00:00".to_string(),
                "2021-01-01T02:00:00".to_string(),
                "H".to_string(),
                "[1,2,3]".to_string(),
            ],
            [
                "B".to_string(),
                "2021-01-01T00:00:00".to_string(),
                "2021-01-01T02:00:00".to_string(),
                "H".to_string(),
                "[4,5,6]".to_string(),
            ],
        ]
    );

    let restored = unstack(&stacked).unwrap();
    assert_eq!(restored, hourly_ab());
    assert_eq!(restored.timestamps(), vec![ts(1, 0), ts(1, 1), ts(1, 2)]);
}

#[test]
fn full_day_round_trip_keeps_column_order() {
    let timestamps: Vec<Timestamp> = (0..24).map(|h| ts(1, h)).chain([ts(2, 0)]).collect();
    let columns = ["C", "A", "B"]
        .iter()
        .enumerate()
        .map(|(k, name)| {
            Column::from_reals(*name, (0..25).map(move |i| ((i * 7 + k * 3) % 10) as f64))
        })
        .collect();
    let table = WideTable::from_timestamps(&timestamps, columns).unwrap();

    let stacked = stack(&table);
    assert_eq!(stacked.len(), 3);
    let names: Vec<&str> = stacked.iter().map(|r| r.var_name.as_str()).collect();
    assert_eq!(names, vec!["C", "A", "B"]);

    let restored = unstack(&stacked).unwrap();
    assert_eq!(restored, table);
    assert_eq!(restored.index().stop(), ts(2, 0));
}

#[test]
fn restacking_different_values_is_detectable() {
    let table = hourly_ab();
    let other = WideTable::new(
        *table.index(),
        vec![
            Column::from_reals("A", [1.0, 2.0, 3.0]),
            Column::from_reals("B", [4.0, 5.0, 7.0]),
        ],
    )
    .unwrap();
    assert_ne!(unstack(&stack(&other)).unwrap(), table);
}

#[test]
fn uneven_timestamps_are_an_input_shape_error() {
    let err = WideTable::from_timestamps(
        &[ts(1, 0), ts(1, 1), ts(1, 3)],
        vec![Column::from_reals("A", [1.0, 2.0, 3.0])],
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InputShape);
}

#[test]
fn quarter_hourly_resolution_is_preserved() {
    let res: Resolution = "15min".parse().unwrap();
    let index = TimeIndex::new(ts(1, 0), 96, res).unwrap();
    let table = WideTable::new(
        index,
        vec![Column::from_reals("load", (0..96).map(|i| i as f64 / 96.0))],
    )
    .unwrap();

    let stacked = stack(&table);
    assert_eq!(stacked.rows()[0].timeindex_resolution.to_string(), "15min");
    assert_eq!(unstack(&stacked).unwrap(), table);
}
