use crate::calendar::Day;
use crate::cp::{CpModel, LinearExpr, Relation, VarId};
use crate::model::{RoleIdx, RosterProblem, ShiftIdx, StaffIdx};
use std::collections::BTreeMap;

/// Clé d'une variable d'affectation : (membre, rôle, jour, poste).
///
/// L'ordre dérivé (membre, rôle, jour, poste) est celui de la contrainte de
/// séquence : jours croissants puis postes dans l'ordre du catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssignmentKey {
    pub staff: StaffIdx,
    pub role: RoleIdx,
    pub day: Day,
    pub shift: ShiftIdx,
}

impl AssignmentKey {
    pub fn new(staff: StaffIdx, role: RoleIdx, day: Day, shift: ShiftIdx) -> Self {
        Self {
            staff,
            role,
            day,
            shift,
        }
    }
}

/// Table typée clé -> variable booléenne du modèle.
///
/// Une clé n'existe que si le membre détient le rôle et si le poste est
/// proposé ce jour-là, sur les 2N jours (précédente + courante).
#[derive(Debug, Clone, Default)]
pub struct VariableSpace {
    vars: BTreeMap<AssignmentKey, VarId>,
}

impl VariableSpace {
    pub(super) fn allocate(problem: &RosterProblem, cp: &mut CpModel) -> Self {
        let mut vars = BTreeMap::new();
        for staff in problem.staff_indices() {
            let member = problem.member(staff);
            for &role in &member.roles {
                for day in problem.calendar.all_days() {
                    for shift in problem.shifts_on(day) {
                        let name = format!(
                            "staff:{}_role:{}_day:{}_shift:{}",
                            member.id.as_str(),
                            problem.role(role).as_str(),
                            day,
                            problem.shift(shift).id.as_str()
                        );
                        let var = cp.new_bool_var(name);
                        vars.insert(AssignmentKey::new(staff, role, day, shift), var);
                    }
                }
            }
        }
        Self { vars }
    }

    pub fn get(&self, key: &AssignmentKey) -> Option<VarId> {
        self.vars.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AssignmentKey, VarId)> + '_ {
        self.vars.iter().map(|(k, v)| (k, *v))
    }

    pub fn for_staff(&self, staff: StaffIdx) -> impl Iterator<Item = (&AssignmentKey, VarId)> + '_ {
        let from = AssignmentKey::new(staff, RoleIdx(0), Day::MIN, ShiftIdx(0));
        self.vars
            .range(from..)
            .take_while(move |(k, _)| k.staff == staff)
            .map(|(k, v)| (k, *v))
    }

    /// Toutes les variables d'un membre un jour donné, tous rôles confondus.
    pub fn on_day(&self, staff: StaffIdx, day: Day) -> Vec<VarId> {
        self.for_staff(staff)
            .filter(|(k, _)| k.day == day)
            .map(|(_, v)| v)
            .collect()
    }

    /// Variables des membres tenant `role` sur (`shift`, `day`).
    pub fn filling(&self, role: RoleIdx, day: Day, shift: ShiftIdx) -> Vec<VarId> {
        self.vars
            .iter()
            .filter(|(k, _)| k.role == role && k.day == day && k.shift == shift)
            .map(|(_, v)| *v)
            .collect()
    }
}

/// Au plus un poste par membre et par jour, sur les deux périodes.
pub(super) fn enforce_one_shift_per_day(
    problem: &RosterProblem,
    cp: &mut CpModel,
    space: &VariableSpace,
) -> usize {
    let mut added = 0;
    for staff in problem.staff_indices() {
        for day in problem.calendar.all_days() {
            let vars = space.on_day(staff, day);
            if vars.len() > 1 {
                cp.add_linear(LinearExpr::sum(vars), Relation::Le, 1);
                added += 1;
            }
        }
    }
    added
}
