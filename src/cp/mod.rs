//! Contrat minimal avec le solveur : déclaration de variables, contraintes
//! linéaires, conditionnelles et de table, objectif à minimiser.

mod lp;
mod model;
mod solver;

pub use lp::LpSolver;
pub use model::{
    AllowedTuples, Constraint, CpModel, LinearConstraint, LinearExpr, ModelDefect, Relation,
    VarDecl, VarId,
};
pub use solver::{CpSolver, SolveParams, SolveStatus, SolverResponse};
