use super::types::RosterError;
use super::variables::{AssignmentKey, VariableSpace};
use crate::config::ConfigError;
use crate::cp::CpModel;
use crate::model::{RosterProblem, ShiftLabel};

/// Fige la période précédente sur l'historique observé.
///
/// Un jour de repos met à 0 toutes les variables du membre ce jour-là ; un
/// poste travaillé met à 1 la variable (rôle principal, jour, poste). Les
/// autres postes du jour tombent à 0 via « au plus un poste par jour ».
pub(super) fn enforce_shifts_already_worked(
    problem: &RosterProblem,
    cp: &mut CpModel,
    space: &VariableSpace,
) -> Result<usize, RosterError> {
    let mut fixed = 0;
    for staff in problem.staff_indices() {
        let member = problem.member(staff);
        let role = member.primary_role();
        for (offset, label) in problem.history_of(staff).labels.iter().enumerate() {
            let day = problem.calendar.history_day(offset);
            match *label {
                ShiftLabel::Rest => {
                    for var in space.on_day(staff, day) {
                        cp.fix(var, 0);
                        fixed += 1;
                    }
                }
                ShiftLabel::Work(shift) => {
                    let var = space
                        .get(&AssignmentKey::new(staff, role, day, shift))
                        .ok_or_else(|| ConfigError::HistoryShiftNotOffered {
                            staff: member.id.as_str().to_string(),
                            shift: problem.shift(shift).id.as_str().to_string(),
                            day,
                        })?;
                    cp.fix(var, 1);
                    fixed += 1;
                }
            }
        }
    }
    Ok(fixed)
}
