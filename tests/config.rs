#![forbid(unsafe_code)]
mod common;

use common::{config, small_ward};
use roulement::{ConfigError, FailureKind, RosterConfig, RosterError, Scheduler, ShiftLabel};
use serde_json::json;
use tempfile::tempdir;

fn validate(value: serde_json::Value) -> Result<roulement::RosterProblem, ConfigError> {
    config(value).validate()
}

#[test]
fn small_ward_lowers_into_indexed_problem() {
    let problem = validate(small_ward()).unwrap();
    assert_eq!(problem.staff.len(), 5);
    assert_eq!(problem.roles.len(), 1);
    assert_eq!(problem.rest_label, "X");
    assert_eq!(problem.patterns[1].labels[0], ShiftLabel::Work(problem.find_shift("N").unwrap()));
    assert_eq!(problem.undesirable, vec![problem.find_shift("N").unwrap()]);
    assert_eq!(problem.skill_mix.len(), 2);
    assert_eq!(problem.history.len(), 5);
}

#[test]
fn period_must_be_whole_weeks() {
    let mut value = small_ward();
    value["num_days"] = json!(10);
    for staff in ["S1", "S2", "S3", "S4", "S5"] {
        value["history"][staff] = json!(vec!["X"; 10]);
    }
    assert_eq!(validate(value).unwrap_err(), ConfigError::PeriodNotWeekAligned(10));
}

#[test]
fn partial_length_must_fit_the_period() {
    let mut value = small_ward();
    value["partial_days"] = json!(8);
    assert!(matches!(
        validate(value).unwrap_err(),
        ConfigError::PartialDaysOutOfRange { partial: 8, .. }
    ));
}

#[test]
fn start_date_must_be_a_monday() {
    let mut value = small_ward();
    value["start_date"] = json!("2024-01-02");
    assert!(matches!(validate(value).unwrap_err(), ConfigError::AnchorNotMonday(_)));

    let mut value = small_ward();
    value["start_date"] = json!("2024-01-01");
    let problem = validate(value).unwrap();
    assert!(problem.calendar.anchor().is_some());
}

#[test]
fn unknown_label_in_pattern_is_reported() {
    let mut value = small_ward();
    value["patterns"][0] = json!(["D", "Q"]);
    match validate(value).unwrap_err() {
        ConfigError::UnknownShiftLabel { label, context } => {
            assert_eq!(label, "Q");
            assert!(context.contains("pattern"));
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn every_member_needs_a_full_history() {
    let mut value = small_ward();
    value["history"].as_object_mut().unwrap().remove("S4");
    assert_eq!(validate(value).unwrap_err(), ConfigError::MissingHistory("S4".into()));

    let mut value = small_ward();
    value["history"]["S2"] = json!(["X", "D"]);
    assert!(matches!(
        validate(value).unwrap_err(),
        ConfigError::HistoryLength { expected: 7, found: 2, .. }
    ));

    let mut value = small_ward();
    value["history"]["S9"] = json!(vec!["X"; 7]);
    assert_eq!(validate(value).unwrap_err(), ConfigError::UnknownStaff("S9".into()));
}

#[test]
fn staff_roles_are_checked() {
    let mut value = small_ward();
    value["staff"][0]["roles"] = json!([]);
    assert_eq!(validate(value).unwrap_err(), ConfigError::NoRoles("S1".into()));

    let mut value = small_ward();
    value["staff"][2]["roles"] = json!(["R", "CN"]);
    assert_eq!(validate(value).unwrap_err(), ConfigError::MultiRoleStaff("S3".into()));

    let mut value = small_ward();
    value["skill_mix"]["N"] = json!([{ "CN": 1 }]);
    assert!(matches!(validate(value).unwrap_err(), ConfigError::UnknownRole { .. }));
}

#[test]
fn history_cannot_use_a_closed_shift() {
    let mut value = small_ward();
    value["shifts"][1]["days"] = json!("weekdays");
    // S3 a travaillé N le jour 0, un dimanche
    match validate(value).unwrap_err() {
        ConfigError::HistoryShiftNotOffered { staff, shift, day } => {
            assert_eq!((staff.as_str(), shift.as_str(), day), ("S3", "N", 0));
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn duplicates_and_clashes_are_rejected() {
    let mut value = small_ward();
    value["shifts"][1]["id"] = json!("D");
    assert_eq!(validate(value).unwrap_err(), ConfigError::DuplicateShift("D".into()));

    let mut value = small_ward();
    value["rest_label"] = json!("N");
    assert_eq!(validate(value).unwrap_err(), ConfigError::RestLabelClash("N".into()));

    let mut value = small_ward();
    value["patterns"] = json!([]);
    assert_eq!(validate(value).unwrap_err(), ConfigError::NoPatterns);
}

#[test]
fn config_round_trips_through_a_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ward.json");
    let original = config(small_ward());
    original.save(&path).unwrap();

    let loaded = RosterConfig::load(&path).unwrap();
    assert_eq!(loaded.num_days, 7);
    assert_eq!(loaded.rest_label, "X");
    assert_eq!(loaded.patterns, original.patterns);

    let scheduler = Scheduler::from_config_file(&path).unwrap();
    assert_eq!(scheduler.problem().staff.len(), 5);
}

#[test]
fn unreadable_config_is_a_configuration_failure() {
    let dir = tempdir().unwrap();
    let err = Scheduler::from_config_file(dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, RosterError::Other(_)));
    assert_eq!(err.kind(), FailureKind::Configuration);
}

#[test]
fn solver_settings_become_options() {
    let mut value = small_ward();
    value["solver"] = json!({ "time_limit_secs": 30 });
    let scheduler = Scheduler::from_config(&config(value)).unwrap();
    assert_eq!(
        scheduler.options().time_limit,
        Some(std::time::Duration::from_secs(30))
    );
}

#[test]
fn hand_built_problem_with_stray_indices_is_rejected() {
    use roulement::model::{RoleIdx, ShiftIdx};

    let base = validate(small_ward()).unwrap();

    let mut problem = base.clone();
    problem.skill_mix[0].shift = ShiftIdx(9);
    let err = Scheduler::new(problem).build().unwrap_err();
    assert!(matches!(
        err,
        RosterError::Config(ConfigError::ShiftIndexOutOfRange { index: 9, count: 2, .. })
    ));

    let mut problem = base.clone();
    problem.undesirable.push(ShiftIdx(2));
    assert!(matches!(
        Scheduler::new(problem).build().unwrap_err(),
        RosterError::Config(ConfigError::ShiftIndexOutOfRange { index: 2, .. })
    ));

    let mut problem = base.clone();
    problem.patterns[0].labels[0] = ShiftLabel::Work(ShiftIdx(5));
    assert!(matches!(
        Scheduler::new(problem).build().unwrap_err(),
        RosterError::Config(ConfigError::ShiftIndexOutOfRange { index: 5, .. })
    ));

    let mut problem = base;
    problem.skill_mix[1].alternatives[0][0].0 = RoleIdx(3);
    let err = Scheduler::new(problem).build().unwrap_err();
    assert_eq!(err.kind(), FailureKind::Configuration);
    assert!(err.to_string().contains("role #3"));
}
