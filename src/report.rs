//! Projection en lecture seule d'un roulement résolu, et rendus texte.

use crate::calendar::Day;
use crate::model::RosterProblem;
use crate::scheduler::RosterSolution;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::ops::RangeInclusive;

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Ligne d'un membre : 2N libellés, du jour 1-N au jour N.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffRow {
    pub staff: String,
    pub role: String,
    pub labels: Vec<String>,
    pub unpleasant: u32,
}

/// Vue sérialisable d'un roulement, découplée du modèle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterView {
    pub run_id: String,
    pub status: String,
    pub num_days: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    pub rest_label: String,
    /// Catalogue des postes, dans l'ordre de déclaration.
    pub shifts: Vec<String>,
    pub staff: Vec<StaffRow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fairness_bound: Option<u32>,
}

impl RosterView {
    pub fn project(problem: &RosterProblem, solution: &RosterSolution) -> Self {
        let staff = problem
            .staff_indices()
            .map(|idx| {
                let member = problem.member(idx);
                StaffRow {
                    staff: member.id.as_str().to_string(),
                    role: problem.role(member.primary_role()).as_str().to_string(),
                    labels: solution
                        .labels_of(idx)
                        .iter()
                        .map(|label| problem.label_name(*label).to_string())
                        .collect(),
                    unpleasant: solution.unpleasant_count(idx),
                }
            })
            .collect();
        Self {
            run_id: solution.run_id().to_string(),
            status: solution.status().to_string(),
            num_days: problem.calendar.num_days(),
            start_date: problem.calendar.anchor(),
            rest_label: problem.rest_label.clone(),
            shifts: problem
                .shifts
                .iter()
                .map(|s| s.id.as_str().to_string())
                .collect(),
            staff,
            fairness_bound: solution.fairness_bound(),
        }
    }

    pub fn first_day(&self) -> Day {
        1 - self.num_days as Day
    }

    pub fn days(&self) -> RangeInclusive<Day> {
        self.first_day()..=self.num_days as Day
    }

    pub fn current_days(&self) -> RangeInclusive<Day> {
        1..=self.num_days as Day
    }

    pub fn row(&self, staff: &str) -> Option<&StaffRow> {
        self.staff.iter().find(|row| row.staff == staff)
    }

    pub fn label(&self, staff: &str, day: Day) -> Option<&str> {
        let offset = usize::try_from(day - self.first_day()).ok()?;
        self.row(staff)?.labels.get(offset).map(String::as_str)
    }

    /// Libellés des jours 1..=N.
    pub fn current_labels(&self, staff: &str) -> Option<&[String]> {
        let labels = &self.row(staff)?.labels;
        Some(&labels[labels.len() / 2..])
    }

    /// Membres tenant `shift` le jour `day`, dans l'ordre du personnel.
    pub fn on_shift(&self, day: Day, shift: &str) -> Vec<&str> {
        self.staff
            .iter()
            .filter(|row| self.label(&row.staff, day) == Some(shift))
            .map(|row| row.staff.as_str())
            .collect()
    }

    /// Date réelle d'un jour quand la période est ancrée.
    pub fn date_of(&self, day: Day) -> Option<NaiveDate> {
        let offset = chrono::Duration::days(i64::from(day - 1));
        self.start_date.map(|d| d + offset)
    }

    fn day_heading(&self, day: Day) -> String {
        let weekday = WEEKDAYS[day.rem_euclid(7) as usize];
        match self.date_of(day) {
            Some(date) => format!("Day {day} ({weekday} {date})"),
            None => format!("Day {day} ({weekday})"),
        }
    }
}

/// Permet de customiser le rendu d'un roulement (texte, mail, ...).
pub trait ReportRenderer {
    fn render(&self, view: &RosterView) -> String;
}

/// Une ligne par membre, un libellé par jour.
#[derive(Debug, Default, Clone, Copy)]
pub struct ByStaffText {
    /// Affiche aussi la période précédente.
    pub include_history: bool,
}

impl ReportRenderer for ByStaffText {
    fn render(&self, view: &RosterView) -> String {
        let width = view
            .staff
            .iter()
            .map(|row| row.staff.len())
            .max()
            .unwrap_or(0);
        let mut out = String::new();
        let _ = writeln!(out, "Roster {} ({})", view.run_id, view.status);
        for row in &view.staff {
            let labels = if self.include_history {
                &row.labels[..]
            } else {
                &row.labels[row.labels.len() / 2..]
            };
            let _ = write!(out, "{:<width$} |", row.staff);
            for label in labels {
                let _ = write!(out, " {label:>2}");
            }
            let _ = writeln!(out, " | unpleasant: {}", row.unpleasant);
        }
        if let Some(bound) = view.fairness_bound {
            let _ = writeln!(out, "Max unpleasant shifts per staff: {bound}");
        }
        out
    }
}

/// Pour chaque jour courant, les membres de chaque poste.
#[derive(Debug, Default, Clone, Copy)]
pub struct ByDayText;

impl ReportRenderer for ByDayText {
    fn render(&self, view: &RosterView) -> String {
        let mut out = String::new();
        for day in view.current_days() {
            let _ = writeln!(out, "{}", view.day_heading(day));
            for shift in &view.shifts {
                let staff = view.on_shift(day, shift);
                if !staff.is_empty() {
                    let _ = writeln!(out, "  {shift}: {}", staff.join(", "));
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> RosterView {
        let row = |staff: &str, labels: &[&str], unpleasant| StaffRow {
            staff: staff.to_string(),
            role: "R".to_string(),
            labels: labels.iter().map(|s| s.to_string()).collect(),
            unpleasant,
        };
        RosterView {
            run_id: "run-1".to_string(),
            status: "OPTIMAL".to_string(),
            num_days: 2,
            start_date: None,
            rest_label: "X".to_string(),
            shifts: vec!["D".to_string(), "N".to_string()],
            staff: vec![
                row("S1", &["D", "X", "N", "X"], 1),
                row("S22", &["X", "N", "D", "N"], 2),
            ],
            fairness_bound: Some(2),
        }
    }

    #[test]
    fn labels_are_addressed_by_day() {
        let view = view();
        assert_eq!(view.first_day(), -1);
        assert_eq!(view.label("S1", -1), Some("D"));
        assert_eq!(view.label("S22", 2), Some("N"));
        assert_eq!(view.label("S22", 3), None);
        assert_eq!(view.label("nobody", 1), None);
        assert_eq!(view.current_labels("S1").unwrap(), ["N", "X"]);
        assert_eq!(view.on_shift(1, "D"), vec!["S22"]);
        assert!(view.on_shift(2, "D").is_empty());
    }

    #[test]
    fn dates_follow_the_anchor() {
        let mut view = view();
        assert_eq!(view.date_of(1), None);
        view.start_date = NaiveDate::from_ymd_opt(2024, 1, 1);
        assert_eq!(view.date_of(2), NaiveDate::from_ymd_opt(2024, 1, 2));
        assert_eq!(view.date_of(0), NaiveDate::from_ymd_opt(2023, 12, 31));
    }

    #[test]
    fn by_staff_text() {
        let text = ByStaffText::default().render(&view());
        insta::assert_snapshot!(text, @r###"
        Roster run-1 (OPTIMAL)
        S1  |  N  X | unpleasant: 1
        S22 |  D  N | unpleasant: 2
        Max unpleasant shifts per staff: 2
        "###);
    }

    #[test]
    fn by_staff_text_with_history() {
        let mut view = view();
        view.fairness_bound = None;
        let text = ByStaffText {
            include_history: true,
        }
        .render(&view);
        insta::assert_snapshot!(text, @r###"
        Roster run-1 (OPTIMAL)
        S1  |  D  X  N  X | unpleasant: 1
        S22 |  X  N  D  N | unpleasant: 2
        "###);
    }

    #[test]
    fn by_day_text() {
        let mut view = view();
        view.start_date = NaiveDate::from_ymd_opt(2024, 1, 1);
        let text = ByDayText.render(&view);
        insta::assert_snapshot!(text, @r###"
        Day 1 (Mon 2024-01-01)
          D: S22
          N: S1
        Day 2 (Tue 2024-01-02)
          N: S22
        "###);
    }
}
