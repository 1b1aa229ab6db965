use crate::calendar::{Calendar, Day, DayKind};
use serde::{Deserialize, Serialize};

/// Identifiant fort pour un membre du personnel
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StaffId(String);

impl StaffId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Rôle (qualification) sous lequel un membre peut être planifié
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Role(String);

impl Role {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifiant fort pour un type de poste ("L", "N", ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShiftId(String);

impl ShiftId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StaffIdx(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoleIdx(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShiftIdx(pub usize);

/// Jours sur lesquels un poste peut exister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftDays {
    Weekdays,
    Weekends,
    EveryDay,
}

impl ShiftDays {
    pub fn admits(self, kind: DayKind) -> bool {
        match self {
            ShiftDays::Weekdays => kind == DayKind::Weekday,
            ShiftDays::Weekends => kind == DayKind::Weekend,
            ShiftDays::EveryDay => true,
        }
    }
}

/// Type de poste
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shift {
    pub id: ShiftId,
    pub name: String,
    pub days: ShiftDays,
}

/// Membre du personnel ; le premier rôle est le rôle principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffMember {
    pub id: StaffId,
    pub roles: Vec<RoleIdx>,
}

impl StaffMember {
    /// Rôle canonique utilisé pour l'historique et la continuité.
    pub fn primary_role(&self) -> RoleIdx {
        self.roles[0]
    }

    pub fn holds(&self, role: RoleIdx) -> bool {
        self.roles.contains(&role)
    }
}

/// Contenu d'une journée : repos ou poste travaillé.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShiftLabel {
    Rest,
    Work(ShiftIdx),
}

impl ShiftLabel {
    pub fn shift(self) -> Option<ShiftIdx> {
        match self {
            ShiftLabel::Rest => None,
            ShiftLabel::Work(shift) => Some(shift),
        }
    }

    pub fn is_rest(self) -> bool {
        self == ShiftLabel::Rest
    }
}

/// Séquence légale de jours (postes et repos) pour un membre.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftPattern {
    pub labels: Vec<ShiftLabel>,
}

impl ShiftPattern {
    pub fn new(labels: Vec<ShiftLabel>) -> Self {
        Self { labels }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Postes observés sur les N jours de la période précédente.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRecord {
    pub labels: Vec<ShiftLabel>,
}

impl HistoryRecord {
    /// Les `len` derniers jours de la période précédente.
    pub fn tail(&self, len: usize) -> &[ShiftLabel] {
        &self.labels[self.labels.len().saturating_sub(len)..]
    }
}

/// Effectif exigé par rôle pour une alternative de skill-mix.
pub type RoleCounts = Vec<(RoleIdx, u32)>;

/// Alternatives d'effectif pour un poste ; exactement une doit tenir par jour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillMixRule {
    pub shift: ShiftIdx,
    pub alternatives: Vec<RoleCounts>,
}

/// Problème validé, indexé, prêt à être modélisé.
#[derive(Debug, Clone)]
pub struct RosterProblem {
    pub calendar: Calendar,
    pub partial_days: usize,
    pub rest_label: String,
    pub roles: Vec<Role>,
    pub shifts: Vec<Shift>,
    pub staff: Vec<StaffMember>,
    /// Indexé comme `staff`.
    pub history: Vec<HistoryRecord>,
    pub patterns: Vec<ShiftPattern>,
    pub skill_mix: Vec<SkillMixRule>,
    pub undesirable: Vec<ShiftIdx>,
}

impl RosterProblem {
    pub fn num_days(&self) -> usize {
        self.calendar.num_days() as usize
    }

    pub fn shift(&self, idx: ShiftIdx) -> &Shift {
        &self.shifts[idx.0]
    }

    pub fn member(&self, idx: StaffIdx) -> &StaffMember {
        &self.staff[idx.0]
    }

    pub fn role(&self, idx: RoleIdx) -> &Role {
        &self.roles[idx.0]
    }

    pub fn history_of(&self, idx: StaffIdx) -> &HistoryRecord {
        &self.history[idx.0]
    }

    pub fn staff_indices(&self) -> impl Iterator<Item = StaffIdx> {
        (0..self.staff.len()).map(StaffIdx)
    }

    pub fn shift_indices(&self) -> impl Iterator<Item = ShiftIdx> {
        (0..self.shifts.len()).map(ShiftIdx)
    }

    pub fn is_offered(&self, shift: ShiftIdx, day: Day) -> bool {
        self.shift(shift).days.admits(self.calendar.kind(day))
    }

    /// Postes proposés un jour donné, dans l'ordre du catalogue.
    pub fn shifts_on(&self, day: Day) -> impl Iterator<Item = ShiftIdx> + '_ {
        self.shift_indices().filter(move |s| self.is_offered(*s, day))
    }

    pub fn is_undesirable(&self, shift: ShiftIdx) -> bool {
        self.undesirable.contains(&shift)
    }

    pub fn label_name(&self, label: ShiftLabel) -> &str {
        match label {
            ShiftLabel::Rest => &self.rest_label,
            ShiftLabel::Work(shift) => self.shift(shift).id.as_str(),
        }
    }

    pub fn find_staff(&self, id: &str) -> Option<StaffIdx> {
        self.staff.iter().position(|m| m.id.as_str() == id).map(StaffIdx)
    }

    pub fn find_shift(&self, id: &str) -> Option<ShiftIdx> {
        self.shifts.iter().position(|s| s.id.as_str() == id).map(ShiftIdx)
    }

    /// Traduit un libellé brut ("X", "N", ...) ; `None` si inconnu.
    pub fn parse_label(&self, raw: &str) -> Option<ShiftLabel> {
        if raw == self.rest_label {
            return Some(ShiftLabel::Rest);
        }
        self.find_shift(raw).map(ShiftLabel::Work)
    }
}
