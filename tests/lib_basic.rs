#![forbid(unsafe_code)]
use garde::{
    aggregate, parse_rows, suggest_swaps, validate, ErrorKind, RosterTime, ShiftInterval,
    ShiftKind, SwapOptions, SwapQuery,
};

fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|r| r.iter().map(|c| c.to_string()).collect())
        .collect()
}

#[test]
fn split_and_full_scenario() {
    let rows = grid(&[&["March"], &["1", "ahmet/mehmet"], &["2", "ahmet24"]]);
    let data = parse_rows(&rows);

    let day1: Vec<_> = data.shifts_on_day(1);
    assert_eq!(day1.len(), 2);
    assert_eq!(
        (day1[0].doctor_name.as_str(), day1[0].shift_type),
        ("ahmet", ShiftKind::Morning)
    );
    assert_eq!(day1[0].start_date_time, RosterTime::at(1, 8));
    assert_eq!(day1[0].end_date_time, RosterTime::at(1, 20));
    assert_eq!(
        (day1[1].doctor_name.as_str(), day1[1].shift_type),
        ("mehmet", ShiftKind::Evening)
    );
    assert_eq!(day1[1].start_date_time, RosterTime::at(1, 20));
    assert_eq!(day1[1].end_date_time, RosterTime::at(2, 8));

    let day2 = data.shifts_on_day(2);
    assert_eq!(day2.len(), 1);
    assert_eq!(day2[0].shift_type, ShiftKind::Full);
    assert_eq!(day2[0].doctor_name, "ahmet");

    assert!(validate(&data.all_shifts).is_empty());

    let stats = aggregate(&data.all_shifts);
    let ahmet = stats.iter().find(|s| s.name == "ahmet").unwrap();
    let mehmet = stats.iter().find(|s| s.name == "mehmet").unwrap();
    assert_eq!(ahmet.total_hours, 36);
    assert_eq!(mehmet.total_hours, 12);
}

#[test]
fn header_and_cell_override() {
    let rows = grid(&[&["Nisan", "yeşil24"], &["1", "ahmet16"], &["2", "mehmet"]]);
    let data = parse_rows(&rows);
    assert_eq!(data.all_shifts[0].shift_type, ShiftKind::Long);
    assert_eq!(data.all_shifts[0].doctor_name, "ahmet");
    assert_eq!(data.all_shifts[0].region, "yeşil24");
    assert_eq!(data.all_shifts[1].shift_type, ShiftKind::Full);
}

#[test]
fn rest_after_full_shift_scenario() {
    let shifts = vec![
        ShiftInterval::new("ayşe", 5, ShiftKind::Full, 1, ""),
        ShiftInterval::new("ayşe", 6, ShiftKind::Day, 2, ""),
    ];
    let errors = validate(&shifts);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::Overlap);
    assert!(errors[0].message.contains("day 5"));
    assert!(errors[0].message.contains("day 6"));
    assert!(errors[0].message.contains("0.0 hours"));
}

#[test]
fn doctor_listed_twice_in_unknown_columns() {
    let rows = grid(&[&["Mayıs", "st", "acil"], &["3", "Ali", "ali"]]);
    let data = parse_rows(&rows);
    assert_eq!(data.all_shifts.len(), 2);
    assert_ne!(data.all_shifts[0].column, data.all_shifts[1].column);
    let errors = validate(&data.all_shifts);
    assert!(errors
        .iter()
        .any(|e| e.kind == ErrorKind::Duplicate && e.day == Some(3)));
}

#[test]
fn no_matching_hours_means_no_swap() {
    let rows = grid(&[
        &["Haziran", "Yeşil 24", "Gündüz"],
        &["1", "ali", "veli"],
        &["2", "can 16", "ece"],
    ]);
    let data = parse_rows(&rows);
    let found = suggest_swaps(&data.all_shifts, "ali", 1, &SwapQuery::new(), SwapOptions::default());
    assert!(found.is_empty());
}
