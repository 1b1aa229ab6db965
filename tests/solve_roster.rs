#![forbid(unsafe_code)]
mod common;

use common::{config, labels, small_ward};
use roulement::cp::LpSolver;
use roulement::{
    FailureKind, PatternLibrary, RosterView, Scheduler, ShiftLabel, SolveOptions,
};
use serde_json::json;
use std::collections::HashSet;

#[test]
fn solved_roster_honours_every_hard_rule() {
    let scheduler = Scheduler::from_config(&config(small_ward())).unwrap();
    let solution = scheduler.solve().unwrap();
    let problem = scheduler.problem();
    let view = RosterView::project(problem, &solution);

    // historique inchangé
    let raw = small_ward();
    for (staff, history) in raw["history"].as_object().unwrap() {
        for (offset, label) in history.as_array().unwrap().iter().enumerate() {
            let day = offset as i32 - 6;
            assert_eq!(view.label(staff, day), label.as_str(), "{staff} day {day}");
        }
    }

    // au plus un poste par membre et par jour
    let mut seen = HashSet::new();
    for key in solution.assignments() {
        assert!(seen.insert((key.staff, key.day)), "two shifts for {key:?}");
    }

    // skill-mix : exactement un D et un N chaque jour courant
    for day in 1..=7 {
        assert_eq!(view.on_shift(day, "D").len(), 1, "day {day}");
        assert_eq!(view.on_shift(day, "N").len(), 1, "day {day}");
    }

    // chaque ligne courante est une séquence légale
    let legal = PatternLibrary::from_problem(problem).expand(7).unwrap();
    for staff in problem.staff_indices() {
        assert!(
            legal.iter().any(|seq| seq.as_slice() == solution.current_labels(staff)),
            "illegal sequence for {}",
            problem.member(staff).id.as_str()
        );
    }
}

#[test]
fn fairness_bound_is_the_worst_unpleasant_count() {
    let scheduler = Scheduler::from_config(&config(small_ward())).unwrap();
    let solution = scheduler.solve().unwrap();
    let problem = scheduler.problem();
    let night = problem.find_shift("N").unwrap();

    let mut worst = 0;
    for staff in problem.staff_indices() {
        let nights = solution
            .labels_of(staff)
            .iter()
            .filter(|label| **label == ShiftLabel::Work(night))
            .count() as u32;
        assert_eq!(solution.unpleasant_count(staff), nights);
        worst = worst.max(nights);
    }
    // S3 a déjà fait 3 nuits la semaine précédente
    assert!(worst >= 3);
    assert_eq!(solution.fairness_bound(), Some(worst));
}

#[test]
fn pattern_started_last_week_is_completed() {
    let scheduler = Scheduler::from_config(&config(small_ward())).unwrap();
    let model = scheduler.build().unwrap();
    assert_eq!(model.stats().carried_over_staff, 1);

    let solution = model.solve(&LpSolver, &SolveOptions::default()).unwrap();
    let view = RosterView::project(scheduler.problem(), &solution);
    // S5 termine N X X : repos les jours 1 et 2
    assert_eq!(view.label("S5", 1), Some("X"));
    assert_eq!(view.label("S5", 2), Some("X"));
}

#[test]
fn several_continuations_leave_the_choice_to_the_solver() {
    let value = json!({
        "num_days": 7,
        "partial_days": 2,
        "shifts": [ { "id": "D", "days": "every_day" } ],
        "staff": [
            { "id": "A", "roles": ["R"] },
            { "id": "B", "roles": ["R"] }
        ],
        "skill_mix": { "D": [ { "R": 1 } ] },
        "patterns": [
            ["D", "D", "D", "X"],
            ["D", "D", "X", "X"],
            ["X"]
        ],
        "history": {
            "A": ["X", "X", "X", "X", "X", "D", "D"],
            "B": ["X", "X", "X", "X", "X", "X", "X"]
        }
    });
    let scheduler = Scheduler::from_config(&config(value)).unwrap();
    let model = scheduler.build().unwrap();
    assert_eq!(model.stats().carried_over_staff, 1);
    assert!(!model.stats().has_objective);

    let solution = model.solve(&LpSolver, &SolveOptions::default()).unwrap();
    let view = RosterView::project(scheduler.problem(), &solution);
    let first = view.label("A", 1).unwrap();
    assert!(first == "D" || first == "X");
    assert_eq!(view.label("A", 2), Some("X"));
    assert_eq!(solution.fairness_bound(), None);
}

#[test]
fn unreachable_staffing_level_is_infeasible() {
    let mut value = small_ward();
    value["skill_mix"]["D"] = json!([{ "R": 6 }]);
    let scheduler = Scheduler::from_config(&config(value)).unwrap();
    let err = scheduler.solve().unwrap_err();
    assert_eq!(err.kind(), FailureKind::Infeasible);
}

#[test]
fn alternative_staffing_levels_pick_exactly_one() {
    let mut value = small_ward();
    value["skill_mix"]["D"] = json!([{ "R": 6 }, { "R": 1 }]);
    let scheduler = Scheduler::from_config(&config(value)).unwrap();
    let solution = scheduler.solve().unwrap();
    let view = RosterView::project(scheduler.problem(), &solution);
    for day in 1..=7 {
        assert_eq!(view.on_shift(day, "D").len(), 1);
    }
}

#[test]
fn history_contradiction_makes_the_model_infeasible() {
    let scheduler = Scheduler::from_config(&config(small_ward())).unwrap();
    let mut model = scheduler.build().unwrap();
    let problem = scheduler.problem();
    let s1 = problem.find_staff("S1").unwrap();

    // La table des séquences légales ne couvre que la période courante et la
    // validation refuse un historique incohérent : un conflit avec les jours
    // figés ne peut donc être posé qu'à la main, sur le modèle construit.
    // S1 était au repos le jour -5 : le forcer au travail contredit l'historique
    let rested: Vec<_> = model
        .space()
        .for_staff(s1)
        .filter(|(key, _)| key.day == -5)
        .map(|(_, var)| var)
        .collect();
    assert_eq!(rested.len(), 2);
    model.cp_mut().fix(rested[0], 1);

    let err = model.solve(&LpSolver, &SolveOptions::default()).unwrap_err();
    assert_eq!(err.kind(), FailureKind::Infeasible);
}

#[test]
fn continuation_on_a_closed_day_fails_before_solving() {
    let value = json!({
        "num_days": 7,
        "partial_days": 7,
        "shifts": [ { "id": "D", "days": "weekdays" } ],
        "staff": [ { "id": "A", "roles": ["R"] } ],
        "patterns": [
            ["D", "D", "D", "D", "D", "X", "X", "D"],
            ["X"]
        ],
        "history": { "A": ["D", "D", "D", "D", "D", "X", "X"] }
    });
    let scheduler = Scheduler::from_config(&config(value)).unwrap();
    let err = scheduler.build().unwrap_err();
    assert_eq!(err.kind(), FailureKind::Infeasible);
    assert!(err.to_string().contains('A'));
}

#[test]
fn view_round_trips_through_storage() {
    use roulement::{JsonStorage, Storage};

    let scheduler = Scheduler::from_config(&config(small_ward())).unwrap();
    let solution = scheduler.solve().unwrap();
    let view = RosterView::project(scheduler.problem(), &solution);

    let dir = tempfile::tempdir().unwrap();
    let storage = JsonStorage::open(dir.path().join("roster.json")).unwrap();
    storage.save(&view).unwrap();
    let loaded = storage.load().unwrap();
    assert_eq!(loaded, view);
    assert_eq!(loaded.current_labels("S5").unwrap()[..2], labels("X X"));
}
