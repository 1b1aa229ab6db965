use super::variables::VariableSpace;
use crate::cp::{CpModel, LinearConstraint, LinearExpr, Relation};
use crate::model::RosterProblem;

/// Pour chaque (poste, jour courant) soumis à une règle : un sélecteur par
/// alternative, exactement un actif, et l'alternative active fixe l'effectif
/// exact de chaque rôle qu'elle nomme. Renvoie le nombre de sélecteurs créés.
pub(super) fn enforce_skill_mix_rules(
    problem: &RosterProblem,
    cp: &mut CpModel,
    space: &VariableSpace,
) -> usize {
    let mut selectors_created = 0;
    for rule in &problem.skill_mix {
        if rule.alternatives.is_empty() {
            continue;
        }
        let shift_id = problem.shift(rule.shift).id.as_str();
        for day in problem.calendar.current_days() {
            if !problem.is_offered(rule.shift, day) {
                continue;
            }
            let mut selectors = Vec::with_capacity(rule.alternatives.len());
            for (n, alternative) in rule.alternatives.iter().enumerate() {
                let selector = cp.new_bool_var(format!("day:{day}_shift:{shift_id}_mix:{n}"));
                for &(role, count) in alternative {
                    let filled = LinearExpr::sum(space.filling(role, day, rule.shift));
                    cp.add_conditional(
                        LinearConstraint::new(filled, Relation::Eq, i64::from(count)),
                        selector,
                    );
                }
                selectors.push(selector);
            }
            selectors_created += selectors.len();
            cp.add_linear(LinearExpr::sum(selectors), Relation::Eq, 1);
        }
    }
    selectors_created
}
