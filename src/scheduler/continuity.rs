use super::types::RosterError;
use super::variables::{AssignmentKey, VariableSpace};
use crate::cp::{CpModel, LinearConstraint, LinearExpr, Relation};
use crate::model::{RosterProblem, ShiftLabel, StaffIdx};
use crate::pattern::PatternLibrary;
use tracing::debug;

/// Complète les motifs entamés en fin de période précédente.
///
/// Si les `partial_days` derniers jours d'historique d'un membre forment le
/// préfixe d'un motif plus long, les premiers jours de la période courante
/// doivent reprendre le suffixe correspondant. Plusieurs suffixes possibles
/// donnent une disjonction : un sélecteur booléen par suffixe, exactement un
/// actif. Renvoie le nombre de membres contraints.
pub(super) fn enforce_completion_of_shift_segments(
    problem: &RosterProblem,
    library: &PatternLibrary,
    cp: &mut CpModel,
    space: &VariableSpace,
) -> Result<usize, RosterError> {
    let mut bound = 0;
    for staff in problem.staff_indices() {
        let tail = problem.history_of(staff).tail(library.partial_days());
        let suffixes = library.continuations(tail);
        if suffixes.is_empty() {
            continue;
        }
        let member = problem.member(staff);

        let feasible: Vec<Vec<LinearConstraint>> = suffixes
            .iter()
            .filter_map(|suffix| requirements(problem, space, staff, suffix))
            .collect();

        match feasible.len() {
            0 => {
                return Err(RosterError::infeasible(format!(
                    "history of {} starts a shift pattern that cannot be completed",
                    member.id.as_str()
                )))
            }
            1 => {
                for row in feasible.into_iter().flatten() {
                    cp.add_linear(row.expr, row.relation, row.bound);
                }
            }
            _ => {
                let mut selectors = Vec::with_capacity(feasible.len());
                for (n, rows) in feasible.into_iter().enumerate() {
                    let selector =
                        cp.new_bool_var(format!("staff:{}_continuation:{}", member.id.as_str(), n));
                    for row in rows {
                        cp.add_conditional(row, selector);
                    }
                    selectors.push(selector);
                }
                cp.add_linear(LinearExpr::sum(selectors), Relation::Eq, 1);
            }
        }
        debug!(
            staff = member.id.as_str(),
            continuations = suffixes.len(),
            "pattern carried over from previous period"
        );
        bound += 1;
    }
    Ok(bound)
}

/// Contraintes qui imposent `suffix` à partir du jour 1 ; `None` si un poste
/// du suffixe n'est pas proposé le jour voulu.
fn requirements(
    problem: &RosterProblem,
    space: &VariableSpace,
    staff: StaffIdx,
    suffix: &[ShiftLabel],
) -> Option<Vec<LinearConstraint>> {
    let role = problem.member(staff).primary_role();
    let mut rows = Vec::with_capacity(suffix.len());
    for (day, label) in (1..).zip(suffix) {
        match *label {
            ShiftLabel::Rest => {
                let vars = space.on_day(staff, day);
                if !vars.is_empty() {
                    rows.push(LinearConstraint::new(LinearExpr::sum(vars), Relation::Eq, 0));
                }
            }
            ShiftLabel::Work(shift) => {
                let var = space.get(&AssignmentKey::new(staff, role, day, shift))?;
                rows.push(LinearConstraint::new(LinearExpr::from(var), Relation::Eq, 1));
            }
        }
    }
    Some(rows)
}
