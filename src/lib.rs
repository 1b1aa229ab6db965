#![forbid(unsafe_code)]
//! Roulement — construction de plannings de personnel soignant par
//! programmation par contraintes (sans BD).
//!
//! - Calendrier relatif : période précédente (jours 1-N..=0) + courante (1..=N).
//! - Motifs légaux étendus en contrainte de table, continuité des motifs entamés.
//! - Skill-mix par alternatives, équité min-max des postes pénibles.
//! - Solveur MILP embarqué (`good_lp` + `microlp`) derrière le trait [`cp::CpSolver`].
//! - Configuration JSON, historique CSV, export JSON/CSV.

pub mod calendar;
pub mod config;
pub mod cp;
pub mod io;
pub mod model;
pub mod pattern;
pub mod report;
pub mod scheduler;
pub mod storage;

pub use calendar::{Calendar, Day, DayKind};
pub use config::{ConfigError, RosterConfig};
pub use model::{
    HistoryRecord, Role, RosterProblem, Shift, ShiftDays, ShiftId, ShiftLabel, ShiftPattern,
    SkillMixRule, StaffId, StaffMember,
};
pub use pattern::{AdmissibleSet, DayLayout, PatternLibrary};
pub use report::{ByDayText, ByStaffText, ReportRenderer, RosterView};
pub use scheduler::{
    AssignmentKey, FailureKind, ModelStats, RosterError, RosterModel, RosterSolution, Scheduler,
    SolveOptions,
};
pub use storage::{JsonStorage, Storage};
