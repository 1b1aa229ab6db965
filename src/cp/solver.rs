use super::model::{CpModel, VarId};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolveStatus {
    /// Solution trouvée et optimalité prouvée.
    Optimal,
    /// Solution trouvée, optimalité non prouvée.
    Feasible,
    /// Aucune affectation ne satisfait le modèle.
    Infeasible,
    /// Modèle structurellement incorrect.
    ModelInvalid,
    /// Arrêt sans solution ni preuve d'infaisabilité (limite atteinte...).
    Unknown,
}

impl SolveStatus {
    pub fn has_solution(self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SolveStatus::Optimal => "OPTIMAL",
            SolveStatus::Feasible => "FEASIBLE",
            SolveStatus::Infeasible => "INFEASIBLE",
            SolveStatus::ModelInvalid => "MODEL_INVALID",
            SolveStatus::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// Paramètres d'une résolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolveParams {
    /// Pas de limite par défaut. Le solveur doit arrêter sa propre recherche
    /// à l'échéance : rien ne continue de tourner après le retour de `solve`.
    pub time_limit: Option<Duration>,
}

impl SolveParams {
    pub fn with_time_limit(time_limit: Duration) -> Self {
        Self {
            time_limit: Some(time_limit),
        }
    }
}

/// Réponse du solveur : statut, valeurs éventuelles et diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverResponse {
    pub status: SolveStatus,
    values: Option<Vec<i64>>,
    pub detail: String,
    pub wall_time: Duration,
}

impl SolverResponse {
    pub fn solved(status: SolveStatus, values: Vec<i64>, wall_time: Duration) -> Self {
        Self {
            status,
            values: Some(values),
            detail: String::new(),
            wall_time,
        }
    }

    pub fn unsolved<S: Into<String>>(status: SolveStatus, detail: S, wall_time: Duration) -> Self {
        Self {
            status,
            values: None,
            detail: detail.into(),
            wall_time,
        }
    }

    pub fn value(&self, var: VarId) -> Option<i64> {
        self.values.as_ref().map(|v| v[var.index()])
    }

    pub fn values(&self) -> Option<&[i64]> {
        self.values.as_deref()
    }

    pub fn into_values(self) -> Option<Vec<i64>> {
        self.values
    }
}

/// Solveur externe consommé comme une boîte noire.
pub trait CpSolver {
    fn name(&self) -> &str;

    fn solve(&self, model: &CpModel, params: &SolveParams) -> SolverResponse;
}
