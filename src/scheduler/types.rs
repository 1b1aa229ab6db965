use crate::config::{ConfigError, SolverSettings};
use crate::cp::SolveParams;
use std::time::Duration;
use thiserror::Error;

/// Options de résolution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolveOptions {
    /// `None` : le solveur tourne jusqu'à conclure.
    pub time_limit: Option<Duration>,
}

impl SolveOptions {
    pub fn from_settings(settings: &SolverSettings) -> Self {
        Self {
            time_limit: settings.time_limit(),
        }
    }

    pub fn params(&self) -> SolveParams {
        SolveParams {
            time_limit: self.time_limit,
        }
    }
}

/// Famille d'échec, stable pour l'appelant (code retour, rapport).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Configuration,
    Infeasible,
    Indeterminate,
    InvalidModel,
}

#[derive(Error, Debug)]
pub enum RosterError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("roster is infeasible: {reason}")]
    Infeasible { reason: String },
    #[error("solver stopped without a verdict: {reason}")]
    Indeterminate { reason: String },
    #[error("solver rejected the model: {reason}")]
    InvalidModel { reason: String },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RosterError {
    pub fn kind(&self) -> FailureKind {
        match self {
            RosterError::Config(_) | RosterError::Other(_) => FailureKind::Configuration,
            RosterError::Infeasible { .. } => FailureKind::Infeasible,
            RosterError::Indeterminate { .. } => FailureKind::Indeterminate,
            RosterError::InvalidModel { .. } => FailureKind::InvalidModel,
        }
    }

    pub(super) fn infeasible<S: Into<String>>(reason: S) -> Self {
        RosterError::Infeasible {
            reason: reason.into(),
        }
    }
}
