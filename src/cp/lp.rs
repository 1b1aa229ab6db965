use super::model::{Constraint, CpModel, LinearConstraint, LinearExpr, Relation};
use super::solver::{CpSolver, SolveParams, SolveStatus, SolverResponse};
use good_lp::{
    constraint, microlp, variable, Expression, ProblemVariables, ResolutionError, Solution,
    SolutionStatus, SolverModel, Variable, WithTimeLimit,
};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Solveur par défaut : modèle abaissé en MILP et résolu par `microlp`.
///
/// - table : un binaire de sélection par tuple autorisé, somme = 1 ;
/// - conditionnelle : ligne big-M calculée à partir des domaines.
///
/// La limite de temps est transmise à `microlp`, qui l'observe pendant la
/// recherche : au retour de `solve`, plus aucun calcul ne tourne.
#[derive(Debug, Clone, Copy, Default)]
pub struct LpSolver;

struct Found {
    values: Vec<i64>,
    proven: bool,
}

enum Failure {
    Infeasible,
    Unbounded,
    TimedOut(Duration),
    Other(String),
}

impl CpSolver for LpSolver {
    fn name(&self) -> &str {
        "good_lp/microlp"
    }

    fn solve(&self, model: &CpModel, params: &SolveParams) -> SolverResponse {
        let started = Instant::now();
        if let Err(defect) = model.validate() {
            return SolverResponse::unsolved(
                SolveStatus::ModelInvalid,
                defect.to_string(),
                started.elapsed(),
            );
        }
        if let Some(idx) = empty_table(model) {
            return SolverResponse::unsolved(
                SolveStatus::Infeasible,
                format!("table constraint #{idx} allows no tuple"),
                started.elapsed(),
            );
        }

        match solve_milp(model, params.time_limit) {
            Ok(Found { values, proven }) => match model.check(&values) {
                Ok(()) => {
                    let status = if proven {
                        SolveStatus::Optimal
                    } else {
                        SolveStatus::Feasible
                    };
                    SolverResponse::solved(status, values, started.elapsed())
                }
                Err(idx) => {
                    warn!(constraint = idx, "solver returned an assignment violating the model");
                    SolverResponse::unsolved(
                        SolveStatus::Unknown,
                        format!("returned assignment violates constraint #{idx}"),
                        started.elapsed(),
                    )
                }
            },
            Err(Failure::Infeasible) => SolverResponse::unsolved(
                SolveStatus::Infeasible,
                "no assignment satisfies every constraint",
                started.elapsed(),
            ),
            Err(Failure::Unbounded) => SolverResponse::unsolved(
                SolveStatus::ModelInvalid,
                "objective is unbounded",
                started.elapsed(),
            ),
            Err(Failure::TimedOut(limit)) => SolverResponse::unsolved(
                SolveStatus::Unknown,
                format!(
                    "time limit of {}s reached before any solution was found",
                    limit.as_secs_f64()
                ),
                started.elapsed(),
            ),
            Err(Failure::Other(msg)) => {
                SolverResponse::unsolved(SolveStatus::Unknown, msg, started.elapsed())
            }
        }
    }
}

fn empty_table(model: &CpModel) -> Option<usize> {
    model.constraints().iter().position(|c| match c {
        Constraint::Table { tuples, .. } => tuples.is_empty(),
        _ => false,
    })
}

fn solve_milp(model: &CpModel, time_limit: Option<Duration>) -> Result<Found, Failure> {
    let mut problem_vars = ProblemVariables::new();
    let mut vars: Vec<Variable> = Vec::with_capacity(model.num_vars());
    for decl in model.vars() {
        let def = if decl.is_boolean() {
            variable().binary()
        } else {
            variable()
                .integer()
                .min(decl.lower as f64)
                .max(decl.upper as f64)
        };
        vars.push(problem_vars.add(def.name(decl.name.clone())));
    }

    let mut rows = Vec::new();
    let mut selectors = 0usize;
    for c in model.constraints() {
        match c {
            Constraint::Linear(c) => push_linear(&mut rows, lower(&c.expr, &vars), c.relation, c.bound),
            Constraint::Conditional {
                constraint,
                literal,
            } => push_big_m(&mut rows, model, constraint, vars[literal.index()], &vars),
            Constraint::Table { vars: scope, tuples } => {
                let picks: Vec<Variable> = tuples
                    .iter()
                    .map(|_| problem_vars.add(variable().binary()))
                    .collect();
                selectors += picks.len();

                let mut one = Expression::from(0.0);
                for pick in &picks {
                    one.add_mul(1.0, *pick);
                }
                rows.push(constraint::eq(one, Expression::from(1.0)));

                for (pos, var) in scope.iter().enumerate() {
                    let mut chosen = Expression::from(0.0);
                    for (tuple, pick) in tuples.iter().zip(&picks) {
                        if tuple[pos] != 0 {
                            chosen.add_mul(tuple[pos] as f64, *pick);
                        }
                    }
                    let mut value = Expression::from(0.0);
                    value.add_mul(1.0, vars[var.index()]);
                    rows.push(constraint::eq(value, chosen));
                }
            }
        }
    }
    debug!(
        vars = vars.len(),
        selectors,
        rows = rows.len(),
        "lowered model to MILP"
    );

    let objective = model
        .objective()
        .map(|expr| lower(expr, &vars))
        .unwrap_or_else(|| Expression::from(0.0));
    let mut problem = problem_vars.minimise(objective).using(microlp);
    for row in rows {
        problem = problem.with(row);
    }
    if let Some(limit) = time_limit {
        problem = problem.with_time_limit(limit.as_secs_f64());
    }

    let solution = problem.solve().map_err(|err| match (err, time_limit) {
        (ResolutionError::Infeasible, _) => Failure::Infeasible,
        (ResolutionError::Unbounded, _) => Failure::Unbounded,
        // interrompu avant toute solution
        (ResolutionError::Other(_), Some(limit)) => Failure::TimedOut(limit),
        (other, _) => Failure::Other(other.to_string()),
    })?;
    let proven = matches!(solution.status(), SolutionStatus::Optimal);
    if !proven {
        debug!("search stopped by its limit with an incumbent");
    }
    Ok(Found {
        values: vars
            .iter()
            .map(|var| solution.value(*var).round() as i64)
            .collect(),
        proven,
    })
}

fn lower(expr: &LinearExpr, vars: &[Variable]) -> Expression {
    let mut out = Expression::from(expr.constant as f64);
    for (var, coef) in &expr.terms {
        out.add_mul(*coef as f64, vars[var.index()]);
    }
    out
}

fn push_linear(rows: &mut Vec<good_lp::Constraint>, lhs: Expression, relation: Relation, bound: i64) {
    let rhs = Expression::from(bound as f64);
    rows.push(match relation {
        Relation::Eq => constraint::eq(lhs, rhs),
        Relation::Le => constraint::leq(lhs, rhs),
        Relation::Ge => constraint::geq(lhs, rhs),
    });
}

/// `expr R k` si `literal` = 1, relâchée jusqu'aux bornes de `expr` sinon.
fn push_big_m(
    rows: &mut Vec<good_lp::Constraint>,
    model: &CpModel,
    c: &LinearConstraint,
    literal: Variable,
    vars: &[Variable],
) {
    let (lo, hi) = model.expr_bounds(&c.expr);
    let k = c.bound;
    if matches!(c.relation, Relation::Le | Relation::Eq) && hi > k {
        // expr + (hi - k) * lit <= hi
        let mut lhs = lower(&c.expr, vars);
        lhs.add_mul((hi - k) as f64, literal);
        push_linear(rows, lhs, Relation::Le, hi);
    }
    if matches!(c.relation, Relation::Ge | Relation::Eq) && lo < k {
        // expr + (lo - k) * lit >= lo
        let mut lhs = lower(&c.expr, vars);
        lhs.add_mul((lo - k) as f64, literal);
        push_linear(rows, lhs, Relation::Ge, lo);
    }
}
