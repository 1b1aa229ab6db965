use super::types::RosterError;
use super::variables::{AssignmentKey, VariableSpace};
use crate::config::ConfigError;
use crate::cp::{AllowedTuples, CpModel};
use crate::model::RosterProblem;

/// Une contrainte de table par membre sur la période courante.
///
/// Les variables sont rangées jour par jour, postes dans l'ordre du
/// catalogue, exactement comme les colonnes de `DayLayout`. Toutes les
/// contraintes partagent le même ensemble de tuples.
pub(super) fn enforce_shift_sequences(
    problem: &RosterProblem,
    cp: &mut CpModel,
    space: &VariableSpace,
    tuples: &AllowedTuples,
) -> Result<(), RosterError> {
    if tuples.is_empty() {
        return Err(RosterError::infeasible(format!(
            "no legal shift sequence fits the {}-day period",
            problem.num_days()
        )));
    }
    for staff in problem.staff_indices() {
        let member = problem.member(staff);
        if member.roles.len() != 1 {
            return Err(ConfigError::MultiRoleStaff(member.id.as_str().to_string()).into());
        }
        let role = member.primary_role();
        let mut vars = Vec::new();
        for day in problem.calendar.current_days() {
            for shift in problem.shifts_on(day) {
                if let Some(var) = space.get(&AssignmentKey::new(staff, role, day, shift)) {
                    vars.push(var);
                }
            }
        }
        cp.add_table(vars, tuples.clone());
    }
    Ok(())
}
