use super::variables::AssignmentKey;
use crate::calendar::Day;
use crate::cp::SolveStatus;
use crate::model::{ShiftIdx, ShiftLabel, StaffIdx};
use std::collections::BTreeSet;
use std::time::Duration;
use uuid::Uuid;

/// Roulement résolu : affectations à 1 et décomptes dérivés.
#[derive(Debug, Clone)]
pub struct RosterSolution {
    pub(super) run_id: Uuid,
    pub(super) status: SolveStatus,
    pub(super) first_day: Day,
    /// membre -> un libellé par jour, de `first_day` à N.
    pub(super) labels: Vec<Vec<ShiftLabel>>,
    pub(super) assigned: BTreeSet<AssignmentKey>,
    pub(super) unpleasant: Vec<u32>,
    pub(super) peak: Option<u32>,
    pub(super) wall_time: Duration,
}

impl RosterSolution {
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// `Optimal` ou `Feasible`.
    pub fn status(&self) -> SolveStatus {
        self.status
    }

    pub fn wall_time(&self) -> Duration {
        self.wall_time
    }

    pub fn shift_worked(&self, key: &AssignmentKey) -> bool {
        self.assigned.contains(key)
    }

    pub fn assignments(&self) -> impl Iterator<Item = &AssignmentKey> + '_ {
        self.assigned.iter()
    }

    /// Libellé d'un membre un jour donné ; `None` hors fenêtre.
    pub fn label(&self, staff: StaffIdx, day: Day) -> Option<ShiftLabel> {
        let offset = usize::try_from(day - self.first_day).ok()?;
        self.labels.get(staff.0)?.get(offset).copied()
    }

    /// Les 2N libellés d'un membre, période précédente incluse.
    pub fn labels_of(&self, staff: StaffIdx) -> &[ShiftLabel] {
        self.labels.get(staff.0).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Libellés des jours 1..=N.
    pub fn current_labels(&self, staff: StaffIdx) -> &[ShiftLabel] {
        let labels = self.labels_of(staff);
        &labels[labels.len() / 2..]
    }

    /// Membres affectés à `shift` le jour `day`.
    pub fn staffed(&self, shift: ShiftIdx, day: Day) -> Vec<StaffIdx> {
        self.assigned
            .iter()
            .filter(|k| k.day == day && k.shift == shift)
            .map(|k| k.staff)
            .collect()
    }

    pub fn unpleasant_count(&self, staff: StaffIdx) -> u32 {
        self.unpleasant.get(staff.0).copied().unwrap_or(0)
    }

    /// Valeur de la borne min-max ; `None` sans poste pénible déclaré.
    pub fn fairness_bound(&self) -> Option<u32> {
        self.peak
    }
}
