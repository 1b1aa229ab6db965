use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Index de jour. `1..=N` pour la période courante, `(1-N)..=0` pour la
/// période précédente.
pub type Day = i32;

/// Nature d'un jour (le jour 1 est toujours un lundi).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayKind {
    Weekday,
    Weekend,
}

/// Calendrier d'une période de roulement de `num_days` jours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    num_days: u32,
    anchor: Option<NaiveDate>,
}

impl Calendar {
    pub fn new(num_days: u32) -> Self {
        Self {
            num_days,
            anchor: None,
        }
    }

    /// Associe une date réelle au jour 1 (affichage uniquement).
    pub fn with_anchor(mut self, monday: NaiveDate) -> Self {
        self.anchor = Some(monday);
        self
    }

    pub fn num_days(&self) -> u32 {
        self.num_days
    }

    pub fn anchor(&self) -> Option<NaiveDate> {
        self.anchor
    }

    /// `day mod 7` : 6 = samedi, 0 = dimanche, y compris pour les jours négatifs.
    pub fn kind(&self, day: Day) -> DayKind {
        match day.rem_euclid(7) {
            0 | 6 => DayKind::Weekend,
            _ => DayKind::Weekday,
        }
    }

    pub fn is_weekend(&self, day: Day) -> bool {
        self.kind(day) == DayKind::Weekend
    }

    pub fn current_days(&self) -> RangeInclusive<Day> {
        1..=self.len()
    }

    pub fn previous_days(&self) -> RangeInclusive<Day> {
        (1 - self.len())..=0
    }

    /// Période précédente puis période courante, dans l'ordre.
    pub fn all_days(&self) -> RangeInclusive<Day> {
        (1 - self.len())..=self.len()
    }

    /// Position (0-based) d'un jour de la période précédente dans l'historique.
    pub fn history_offset(&self, day: Day) -> Option<usize> {
        if self.previous_days().contains(&day) {
            usize::try_from(day + self.len() - 1).ok()
        } else {
            None
        }
    }

    /// Jour de la période précédente correspondant à la position `offset` de l'historique.
    pub fn history_day(&self, offset: usize) -> Day {
        offset as Day + 1 - self.len()
    }

    pub fn is_week_aligned(&self) -> bool {
        self.num_days > 0 && self.num_days % 7 == 0
    }

    pub fn date_of(&self, day: Day) -> Option<NaiveDate> {
        self.anchor
            .and_then(|monday| monday.checked_add_signed(Duration::days(i64::from(day - 1))))
    }

    fn len(&self) -> Day {
        self.num_days as Day
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturday_and_sunday_are_weekend() {
        let cal = Calendar::new(28);
        let weekend: Vec<Day> = cal.current_days().filter(|d| cal.is_weekend(*d)).collect();
        assert_eq!(weekend, vec![6, 7, 13, 14, 20, 21, 27, 28]);
    }

    #[test]
    fn previous_period_matches_current_classification() {
        let cal = Calendar::new(28);
        for day in cal.current_days() {
            assert_eq!(cal.kind(day), cal.kind(day - 28), "day {day}");
        }
        assert_eq!(cal.kind(0), DayKind::Weekend);
        assert_eq!(cal.kind(-1), DayKind::Weekend);
        assert_eq!(cal.kind(-2), DayKind::Weekday);
    }

    #[test]
    fn history_offsets_cover_previous_period() {
        let cal = Calendar::new(7);
        assert_eq!(cal.previous_days(), -6..=0);
        assert_eq!(cal.history_offset(-6), Some(0));
        assert_eq!(cal.history_offset(0), Some(6));
        assert_eq!(cal.history_offset(1), None);
        assert_eq!(cal.history_day(6), 0);
        assert_eq!(cal.all_days().count(), 14);
    }

    #[test]
    fn anchored_dates_follow_day_index() {
        let monday = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let cal = Calendar::new(14).with_anchor(monday);
        assert_eq!(cal.date_of(1), Some(monday));
        assert_eq!(cal.date_of(0), NaiveDate::from_ymd_opt(2023, 12, 31));
        assert!(!Calendar::new(10).is_week_aligned());
        assert!(cal.is_week_aligned());
    }
}
