use super::variables::VariableSpace;
use crate::cp::{CpModel, LinearExpr, Relation, VarId};
use crate::model::RosterProblem;

/// Min-max des postes pénibles : une borne entière au-dessus du décompte de
/// chaque membre (deux périodes confondues), que l'on minimise.
pub(super) fn minimize_unpleasant_peak(
    problem: &RosterProblem,
    cp: &mut CpModel,
    space: &VariableSpace,
) -> Option<VarId> {
    if problem.undesirable.is_empty() {
        return None;
    }
    let ceiling = 2 * i64::from(problem.calendar.num_days());
    let peak = cp.new_int_var(0, ceiling, "max_unpleasant_shifts");
    for staff in problem.staff_indices() {
        let mut count = LinearExpr::sum(
            space
                .for_staff(staff)
                .filter(|(key, _)| problem.is_undesirable(key.shift))
                .map(|(_, var)| var),
        );
        count.push(peak, -1);
        cp.add_linear(count, Relation::Le, 0);
    }
    cp.minimize(LinearExpr::from(peak));
    Some(peak)
}
