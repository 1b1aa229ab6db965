use super::solution::RosterSolution;
use super::types::{RosterError, SolveOptions};
use super::RosterModel;
use crate::cp::{CpSolver, SolveStatus, SolverResponse};
use crate::model::ShiftLabel;
use std::collections::BTreeSet;
use tracing::{error, info, info_span, warn};
use uuid::Uuid;

/// Lance le solveur et classe son verdict : `Optimal`/`Feasible` donnent un
/// roulement, tout le reste une erreur typée.
pub(super) fn run<S: CpSolver + ?Sized>(
    model: &RosterModel<'_>,
    solver: &S,
    options: &SolveOptions,
) -> Result<RosterSolution, RosterError> {
    let run_id = Uuid::new_v4();
    let span = info_span!("solve", run = %run_id, solver = solver.name());
    let _enter = span.enter();

    info!(
        variables = model.cp.num_vars(),
        constraints = model.cp.num_constraints(),
        time_limit_secs = options.time_limit.map(|d| d.as_secs()),
        "solving roster model"
    );
    let response = solver.solve(&model.cp, &options.params());
    info!(
        status = %response.status,
        wall_ms = response.wall_time.as_millis() as u64,
        "solver finished"
    );

    match response.status {
        SolveStatus::Optimal | SolveStatus::Feasible => extract(model, run_id, response),
        SolveStatus::Infeasible => {
            warn!(detail = %response.detail, "no roster satisfies the constraints");
            Err(RosterError::Infeasible {
                reason: detail_or(&response, "solver proved the model infeasible"),
            })
        }
        SolveStatus::Unknown => {
            warn!(detail = %response.detail, "solver gave up before concluding");
            Err(RosterError::Indeterminate {
                reason: detail_or(&response, "no solution found within the limits"),
            })
        }
        SolveStatus::ModelInvalid => {
            error!(detail = %response.detail, "solver rejected the model");
            Err(RosterError::InvalidModel {
                reason: detail_or(&response, "model is structurally invalid"),
            })
        }
    }
}

fn detail_or(response: &SolverResponse, fallback: &str) -> String {
    if response.detail.is_empty() {
        fallback.to_string()
    } else {
        response.detail.clone()
    }
}

fn extract(
    model: &RosterModel<'_>,
    run_id: Uuid,
    response: SolverResponse,
) -> Result<RosterSolution, RosterError> {
    let problem = model.problem;
    let status = response.status;
    let wall_time = response.wall_time;
    let values = response
        .into_values()
        .ok_or_else(|| RosterError::InvalidModel {
            reason: format!("solver reported {status} without values"),
        })?;
    if values.len() != model.cp.num_vars() {
        return Err(RosterError::InvalidModel {
            reason: format!(
                "solver returned {} values for {} variables",
                values.len(),
                model.cp.num_vars()
            ),
        });
    }

    let first_day = *problem.calendar.all_days().start();
    let width = 2 * problem.num_days();
    let mut labels = vec![vec![ShiftLabel::Rest; width]; problem.staff.len()];
    let mut assigned = BTreeSet::new();
    for (key, var) in model.space.iter() {
        if values[var.index()] == 1 {
            // key.day >= first_day
            let offset = (key.day - first_day) as usize;
            labels[key.staff.0][offset] = ShiftLabel::Work(key.shift);
            assigned.insert(*key);
        }
    }

    let unpleasant = labels
        .iter()
        .map(|row| {
            row.iter()
                .filter_map(|label| label.shift())
                .filter(|shift| problem.is_undesirable(*shift))
                .count() as u32
        })
        .collect();
    let peak = model
        .peak
        .and_then(|var| u32::try_from(values[var.index()]).ok());

    info!(assignments = assigned.len(), fairness_bound = peak, "roster extracted");
    Ok(RosterSolution {
        run_id,
        status,
        first_day,
        labels,
        assigned,
        unpleasant,
        peak,
        wall_time,
    })
}
