use crate::calendar::Calendar;
use crate::model::{
    HistoryRecord, Role, RoleCounts, RoleIdx, RosterProblem, Shift, ShiftDays, ShiftId, ShiftIdx,
    ShiftLabel, ShiftPattern, SkillMixRule, StaffId, StaffMember,
};
use crate::pattern::PatternError;
use anyhow::Context;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("roster period must contain at least one day")]
    EmptyPeriod,
    #[error("roster period of {0} days is not a whole number of weeks")]
    PeriodNotWeekAligned(u32),
    #[error("partial segment length {partial} must be within 1..={num_days}")]
    PartialDaysOutOfRange { partial: usize, num_days: u32 },
    #[error("start date {0} is not a Monday")]
    AnchorNotMonday(NaiveDate),
    #[error("identifier cannot be empty ({0})")]
    EmptyIdentifier(&'static str),
    #[error("shift {0} is declared twice")]
    DuplicateShift(String),
    #[error("staff member {0} is declared twice")]
    DuplicateStaff(String),
    #[error("rest label {0} is also a shift identifier")]
    RestLabelClash(String),
    #[error("staff member {0} has no role")]
    NoRoles(String),
    #[error("staff member {0} holds several roles, which legal-sequence rules do not support")]
    MultiRoleStaff(String),
    #[error("no shift pattern defined")]
    NoPatterns,
    #[error("shift pattern #{0} is empty")]
    EmptyPattern(usize),
    #[error("unknown shift label {label} in {context}")]
    UnknownShiftLabel { context: String, label: String },
    #[error("unknown shift {0}")]
    UnknownShift(String),
    #[error("skill-mix rule for shift {shift} references role {role} held by nobody")]
    UnknownRole { shift: String, role: String },
    #[error("history given for unknown staff member {0}")]
    UnknownStaff(String),
    #[error("no history for staff member {0}")]
    MissingHistory(String),
    #[error("history of {staff} has {found} days, expected {expected}")]
    HistoryLength {
        staff: String,
        expected: usize,
        found: usize,
    },
    #[error("history of {staff} puts shift {shift} on day {day} where it is not offered")]
    HistoryShiftNotOffered {
        staff: String,
        shift: String,
        day: i32,
    },
    #[error("{context} refers to shift #{index}, but only {count} shift(s) are declared")]
    ShiftIndexOutOfRange {
        context: String,
        index: usize,
        count: usize,
    },
    #[error("{context} refers to role #{index}, but only {count} role(s) are declared")]
    RoleIndexOutOfRange {
        context: String,
        index: usize,
        count: usize,
    },
    #[error(transparent)]
    Patterns(#[from] PatternError),
}

fn default_rest_label() -> String {
    "X".to_string()
}

/// Document de configuration complet d'un roulement (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterConfig {
    pub num_days: u32,
    pub partial_days: usize,
    /// Date réelle du jour 1 (doit être un lundi).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default = "default_rest_label")]
    pub rest_label: String,
    pub shifts: Vec<ShiftConfig>,
    pub staff: Vec<StaffConfig>,
    /// Poste -> alternatives (rôle -> effectif exact).
    #[serde(default)]
    pub skill_mix: BTreeMap<String, Vec<BTreeMap<String, u32>>>,
    pub patterns: Vec<Vec<String>>,
    /// Membre -> N libellés de la période précédente.
    #[serde(default)]
    pub history: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub undesirable_shifts: Vec<String>,
    #[serde(default)]
    pub solver: SolverSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftConfig {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub days: ShiftDays,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffConfig {
    pub id: String,
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolverSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit_secs: Option<u64>,
}

impl SolverSettings {
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_secs.map(Duration::from_secs)
    }
}

impl RosterConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path).with_context(|| format!("reading config {}", path.display()))?;
        let config: RosterConfig = serde_json::from_slice(&data)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("writing config {}", path.display()))?;
        Ok(())
    }

    /// Valide le document et le traduit en problème indexé.
    pub fn validate(&self) -> Result<RosterProblem, ConfigError> {
        if self.num_days == 0 {
            return Err(ConfigError::EmptyPeriod);
        }
        let mut calendar = Calendar::new(self.num_days);
        if let Some(date) = self.start_date {
            if date.weekday() != Weekday::Mon {
                return Err(ConfigError::AnchorNotMonday(date));
            }
            calendar = calendar.with_anchor(date);
        }
        if self.rest_label.trim().is_empty() {
            return Err(ConfigError::EmptyIdentifier("rest label"));
        }

        let mut shifts = Vec::with_capacity(self.shifts.len());
        for raw in &self.shifts {
            if raw.id.trim().is_empty() {
                return Err(ConfigError::EmptyIdentifier("shift"));
            }
            if raw.id == self.rest_label {
                return Err(ConfigError::RestLabelClash(raw.id.clone()));
            }
            if shifts.iter().any(|s: &Shift| s.id.as_str() == raw.id) {
                return Err(ConfigError::DuplicateShift(raw.id.clone()));
            }
            shifts.push(Shift {
                id: ShiftId::new(&raw.id),
                name: raw.name.clone().unwrap_or_else(|| raw.id.clone()),
                days: raw.days,
            });
        }

        let mut roles: Vec<Role> = Vec::new();
        let mut staff = Vec::with_capacity(self.staff.len());
        let mut seen = HashSet::new();
        for raw in &self.staff {
            if raw.id.trim().is_empty() {
                return Err(ConfigError::EmptyIdentifier("staff member"));
            }
            if !seen.insert(raw.id.as_str()) {
                return Err(ConfigError::DuplicateStaff(raw.id.clone()));
            }
            let member_roles = raw
                .roles
                .iter()
                .map(|name| intern_role(&mut roles, name))
                .collect();
            staff.push(StaffMember {
                id: StaffId::new(&raw.id),
                roles: member_roles,
            });
        }

        let mut problem = RosterProblem {
            calendar,
            partial_days: self.partial_days,
            rest_label: self.rest_label.clone(),
            roles,
            shifts,
            staff,
            history: Vec::new(),
            patterns: Vec::new(),
            skill_mix: Vec::new(),
            undesirable: Vec::new(),
        };

        for (idx, raw) in self.patterns.iter().enumerate() {
            let labels = parse_labels(&problem, raw, || format!("pattern #{idx}"))?;
            problem.patterns.push(ShiftPattern::new(labels));
        }

        for (shift_id, alternatives) in &self.skill_mix {
            let shift = problem
                .find_shift(shift_id)
                .ok_or_else(|| ConfigError::UnknownShift(shift_id.clone()))?;
            let mut rule = SkillMixRule {
                shift,
                alternatives: Vec::with_capacity(alternatives.len()),
            };
            for alternative in alternatives {
                let mut counts: RoleCounts = Vec::with_capacity(alternative.len());
                for (role, count) in alternative {
                    let role_idx = find_role(&problem, role).ok_or_else(|| ConfigError::UnknownRole {
                        shift: shift_id.clone(),
                        role: role.clone(),
                    })?;
                    counts.push((role_idx, *count));
                }
                rule.alternatives.push(counts);
            }
            problem.skill_mix.push(rule);
        }
        problem.skill_mix.sort_by_key(|rule| rule.shift);

        for shift_id in &self.undesirable_shifts {
            let shift = problem
                .find_shift(shift_id)
                .ok_or_else(|| ConfigError::UnknownShift(shift_id.clone()))?;
            if !problem.undesirable.contains(&shift) {
                problem.undesirable.push(shift);
            }
        }

        if let Some(unknown) = self
            .history
            .keys()
            .find(|id| problem.find_staff(id.as_str()).is_none())
        {
            return Err(ConfigError::UnknownStaff(unknown.clone()));
        }
        for member in &self.staff {
            let raw = self
                .history
                .get(&member.id)
                .ok_or_else(|| ConfigError::MissingHistory(member.id.clone()))?;
            let labels = parse_labels(&problem, raw, || format!("history of {}", member.id))?;
            problem.history.push(HistoryRecord { labels });
        }

        check_problem(&problem)?;
        Ok(problem)
    }
}

/// Invariants structurels exigés par le constructeur de modèle.
pub fn check_problem(problem: &RosterProblem) -> Result<(), ConfigError> {
    let calendar = &problem.calendar;
    if calendar.num_days() == 0 {
        return Err(ConfigError::EmptyPeriod);
    }
    if !calendar.is_week_aligned() {
        return Err(ConfigError::PeriodNotWeekAligned(calendar.num_days()));
    }
    if problem.partial_days == 0 || problem.partial_days > problem.num_days() {
        return Err(ConfigError::PartialDaysOutOfRange {
            partial: problem.partial_days,
            num_days: calendar.num_days(),
        });
    }
    for member in &problem.staff {
        match member.roles.len() {
            0 => return Err(ConfigError::NoRoles(member.id.as_str().to_string())),
            1 => {}
            _ => return Err(ConfigError::MultiRoleStaff(member.id.as_str().to_string())),
        }
        for role in &member.roles {
            role_in_range(problem, *role, || format!("staff member {}", member.id.as_str()))?;
        }
    }
    check_indices(problem)?;
    if problem.patterns.is_empty() {
        return Err(ConfigError::NoPatterns);
    }
    if let Some(idx) = problem.patterns.iter().position(ShiftPattern::is_empty) {
        return Err(ConfigError::EmptyPattern(idx));
    }
    for (idx, member) in problem.staff.iter().enumerate() {
        let record = problem
            .history
            .get(idx)
            .ok_or_else(|| ConfigError::MissingHistory(member.id.as_str().to_string()))?;
        if record.labels.len() != problem.num_days() {
            return Err(ConfigError::HistoryLength {
                staff: member.id.as_str().to_string(),
                expected: problem.num_days(),
                found: record.labels.len(),
            });
        }
        for (offset, label) in record.labels.iter().enumerate() {
            if let ShiftLabel::Work(shift) = label {
                let day = calendar.history_day(offset);
                if !problem.is_offered(*shift, day) {
                    return Err(ConfigError::HistoryShiftNotOffered {
                        staff: member.id.as_str().to_string(),
                        shift: problem.shift(*shift).id.as_str().to_string(),
                        day,
                    });
                }
            }
        }
    }
    Ok(())
}

/// Les index portés par un problème construit à la main doivent désigner des
/// postes et rôles déclarés.
fn check_indices(problem: &RosterProblem) -> Result<(), ConfigError> {
    for (idx, pattern) in problem.patterns.iter().enumerate() {
        for shift in pattern.labels.iter().filter_map(|label| label.shift()) {
            shift_in_range(problem, shift, || format!("shift pattern #{idx}"))?;
        }
    }
    for rule in &problem.skill_mix {
        shift_in_range(problem, rule.shift, || "skill-mix rule".to_string())?;
        for (role, _) in rule.alternatives.iter().flatten() {
            role_in_range(problem, *role, || format!("skill-mix rule for shift #{}", rule.shift.0))?;
        }
    }
    for shift in &problem.undesirable {
        shift_in_range(problem, *shift, || "undesirable shift list".to_string())?;
    }
    for (idx, record) in problem.history.iter().enumerate() {
        for shift in record.labels.iter().filter_map(|label| label.shift()) {
            shift_in_range(problem, shift, || format!("history #{idx}"))?;
        }
    }
    Ok(())
}

fn shift_in_range(
    problem: &RosterProblem,
    shift: ShiftIdx,
    context: impl FnOnce() -> String,
) -> Result<(), ConfigError> {
    if shift.0 < problem.shifts.len() {
        return Ok(());
    }
    Err(ConfigError::ShiftIndexOutOfRange {
        context: context(),
        index: shift.0,
        count: problem.shifts.len(),
    })
}

fn role_in_range(
    problem: &RosterProblem,
    role: RoleIdx,
    context: impl FnOnce() -> String,
) -> Result<(), ConfigError> {
    if role.0 < problem.roles.len() {
        return Ok(());
    }
    Err(ConfigError::RoleIndexOutOfRange {
        context: context(),
        index: role.0,
        count: problem.roles.len(),
    })
}

fn intern_role(roles: &mut Vec<Role>, name: &str) -> RoleIdx {
    if let Some(pos) = roles.iter().position(|r| r.as_str() == name) {
        return RoleIdx(pos);
    }
    roles.push(Role::new(name));
    RoleIdx(roles.len() - 1)
}

fn find_role(problem: &RosterProblem, name: &str) -> Option<RoleIdx> {
    problem
        .roles
        .iter()
        .position(|r| r.as_str() == name)
        .map(RoleIdx)
}

fn parse_labels<F: Fn() -> String>(
    problem: &RosterProblem,
    raw: &[String],
    context: F,
) -> Result<Vec<ShiftLabel>, ConfigError> {
    raw.iter()
        .map(|label| {
            problem
                .parse_label(label.trim())
                .ok_or_else(|| ConfigError::UnknownShiftLabel {
                    context: context(),
                    label: label.clone(),
                })
        })
        .collect()
}
