mod continuity;
mod driver;
mod history;
mod objective;
mod sequence;
mod skill_mix;
mod solution;
mod types;
mod variables;

pub use solution::RosterSolution;
pub use types::{FailureKind, RosterError, SolveOptions};
pub use variables::{AssignmentKey, VariableSpace};

use crate::config::{check_problem, ConfigError, RosterConfig};
use crate::cp::{AllowedTuples, CpModel, CpSolver, LpSolver, VarId};
use crate::model::RosterProblem;
use crate::pattern::{DayLayout, PatternLibrary};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Tailles du modèle construit, pour le diagnostic et la commande `check`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ModelStats {
    pub assignment_vars: usize,
    pub total_vars: usize,
    pub constraints: usize,
    pub admissible_sequences: usize,
    pub discarded_sequences: usize,
    pub one_shift_per_day: usize,
    pub history_fixations: usize,
    pub skill_mix_selectors: usize,
    pub carried_over_staff: usize,
    pub has_objective: bool,
}

/// Modèle prêt à résoudre ; emprunte le problème qui l'a produit.
#[derive(Debug, Clone)]
pub struct RosterModel<'p> {
    problem: &'p RosterProblem,
    cp: CpModel,
    space: VariableSpace,
    peak: Option<VarId>,
    stats: ModelStats,
}

impl<'p> RosterModel<'p> {
    pub fn problem(&self) -> &'p RosterProblem {
        self.problem
    }

    pub fn cp(&self) -> &CpModel {
        &self.cp
    }

    /// Accès brut pour ajouter des contraintes avant résolution.
    pub fn cp_mut(&mut self) -> &mut CpModel {
        &mut self.cp
    }

    pub fn space(&self) -> &VariableSpace {
        &self.space
    }

    pub fn peak(&self) -> Option<VarId> {
        self.peak
    }

    pub fn stats(&self) -> ModelStats {
        self.stats
    }

    pub fn solve<S: CpSolver + ?Sized>(
        &self,
        solver: &S,
        options: &SolveOptions,
    ) -> Result<RosterSolution, RosterError> {
        driver::run(self, solver, options)
    }
}

/// Scheduler : encapsule un problème validé et ses options de résolution
#[derive(Debug, Clone)]
pub struct Scheduler {
    problem: RosterProblem,
    options: SolveOptions,
}

impl Scheduler {
    pub fn new(problem: RosterProblem) -> Self {
        Self {
            problem,
            options: SolveOptions::default(),
        }
    }

    pub fn from_config(config: &RosterConfig) -> Result<Self, RosterError> {
        let problem = config.validate()?;
        Ok(Self::new(problem).with_options(SolveOptions::from_settings(&config.solver)))
    }

    /// Charge un document JSON puis le valide.
    pub fn from_config_file<P: AsRef<Path>>(path: P) -> Result<Self, RosterError> {
        let config = RosterConfig::load(path)?;
        Self::from_config(&config)
    }

    pub fn with_options(mut self, options: SolveOptions) -> Self {
        self.options = options;
        self
    }

    pub fn problem(&self) -> &RosterProblem {
        &self.problem
    }

    pub fn options(&self) -> SolveOptions {
        self.options
    }

    /// Construit le modèle : variables, au plus un poste par jour,
    /// historique, séquences légales, skill-mix, continuité, objectif.
    pub fn build(&self) -> Result<RosterModel<'_>, RosterError> {
        let problem = &self.problem;
        check_problem(problem)?;

        let library = PatternLibrary::from_problem(problem);
        let layout = DayLayout::for_current_period(problem);
        let admissible = library.admissible(&layout).map_err(ConfigError::from)?;
        let discarded = admissible.discarded();
        let tuples: AllowedTuples = Arc::new(
            admissible
                .into_tuples()
                .into_iter()
                .map(|tuple| tuple.into_iter().map(i64::from).collect())
                .collect(),
        );

        let mut cp = CpModel::new();
        let space = VariableSpace::allocate(problem, &mut cp);
        let one_shift_per_day = variables::enforce_one_shift_per_day(problem, &mut cp, &space);
        let history_fixations = history::enforce_shifts_already_worked(problem, &mut cp, &space)?;
        sequence::enforce_shift_sequences(problem, &mut cp, &space, &tuples)?;
        let skill_mix_selectors = skill_mix::enforce_skill_mix_rules(problem, &mut cp, &space);
        let carried_over_staff =
            continuity::enforce_completion_of_shift_segments(problem, &library, &mut cp, &space)?;
        let peak = objective::minimize_unpleasant_peak(problem, &mut cp, &space);

        let stats = ModelStats {
            assignment_vars: space.len(),
            total_vars: cp.num_vars(),
            constraints: cp.num_constraints(),
            admissible_sequences: tuples.len(),
            discarded_sequences: discarded,
            one_shift_per_day,
            history_fixations,
            skill_mix_selectors,
            carried_over_staff,
            has_objective: peak.is_some(),
        };
        info!(
            staff = problem.staff.len(),
            days = problem.num_days(),
            variables = stats.total_vars,
            constraints = stats.constraints,
            sequences = stats.admissible_sequences,
            "roster model built"
        );

        Ok(RosterModel {
            problem,
            cp,
            space,
            peak,
            stats,
        })
    }

    /// Construit puis résout avec le solveur MILP embarqué.
    pub fn solve(&self) -> Result<RosterSolution, RosterError> {
        self.solve_with(&LpSolver)
    }

    pub fn solve_with<S: CpSolver + ?Sized>(&self, solver: &S) -> Result<RosterSolution, RosterError> {
        let model = self.build()?;
        model.solve(solver, &self.options)
    }
}
