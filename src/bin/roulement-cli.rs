#![forbid(unsafe_code)]
use anyhow::Result;
use clap::{Parser, Subcommand};
use roulement::{
    io,
    pattern::{DayLayout, PatternLibrary},
    report::{ByDayText, ByStaffText, ReportRenderer, RosterView},
    scheduler::{FailureKind, RosterError, Scheduler},
    storage::{JsonStorage, Storage},
    RosterConfig,
};
use std::path::PathBuf;
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de construction de roulements (sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(clap::Args, Debug)]
struct Input {
    /// Document JSON du roulement
    #[arg(long)]
    config: PathBuf,
    /// Historique CSV `staff,d1,..,dN` (remplace celui du JSON)
    #[arg(long)]
    history: Option<PathBuf>,
}

impl Input {
    fn load(&self) -> Result<RosterConfig> {
        let mut config = RosterConfig::load(&self.config)?;
        if let Some(path) = &self.history {
            config.history = io::import_history_csv(path)?;
        }
        Ok(config)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Valider la configuration et afficher la taille du modèle
    Check {
        #[command(flatten)]
        input: Input,
    },

    /// Afficher les séquences légales de la période courante
    Patterns {
        #[command(flatten)]
        input: Input,
        /// Nombre maximum de séquences affichées
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Résoudre et afficher le roulement
    Solve {
        #[command(flatten)]
        input: Input,
        /// Limite de temps du solveur (remplace celle du JSON)
        #[arg(long)]
        time_limit_secs: Option<u64>,
        /// Rendu jour par jour au lieu de membre par membre
        #[arg(long)]
        by_day: bool,
        /// Inclure la période précédente dans les rendus et le CSV
        #[arg(long)]
        with_history: bool,
        #[arg(long)]
        out_json: Option<PathBuf>,
        #[arg(long)]
        out_csv: Option<PathBuf>,
    },

    /// Réafficher un roulement sauvegardé en JSON
    Show {
        #[arg(long)]
        roster: PathBuf,
        #[arg(long)]
        by_day: bool,
    },
}

fn renderer(by_day: bool, with_history: bool) -> Box<dyn ReportRenderer> {
    if by_day {
        Box::new(ByDayText)
    } else {
        Box::new(ByStaffText {
            include_history: with_history,
        })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let code = match cli.cmd {
        Commands::Check { input } => {
            let config = input.load()?;
            let scheduler = Scheduler::from_config(&config)?;
            let model = scheduler.build()?;
            println!("{}", serde_json::to_string_pretty(&model.stats())?);
            0
        }
        Commands::Patterns { input, limit } => {
            let config = input.load()?;
            let problem = config.validate()?;
            let layout = DayLayout::for_current_period(&problem);
            let admissible = PatternLibrary::from_problem(&problem).admissible(&layout)?;
            println!(
                "{} admissible sequence(s), {} discarded",
                admissible.len(),
                admissible.discarded()
            );
            for tuple in admissible.tuples().iter().take(limit) {
                let labels = layout.decode(tuple)?;
                let line: Vec<&str> = labels.iter().map(|l| problem.label_name(*l)).collect();
                println!("{}", line.join(" "));
            }
            0
        }
        Commands::Solve {
            input,
            time_limit_secs,
            by_day,
            with_history,
            out_json,
            out_csv,
        } => {
            let mut config = input.load()?;
            if time_limit_secs.is_some() {
                config.solver.time_limit_secs = time_limit_secs;
            }
            let scheduler = Scheduler::from_config(&config)?;
            match scheduler.solve() {
                Ok(solution) => {
                    let view = RosterView::project(scheduler.problem(), &solution);
                    if let Some(path) = out_json {
                        JsonStorage::open(path)?.save(&view)?;
                    }
                    if let Some(path) = out_csv {
                        io::export_roster_csv(path, &view, with_history)?;
                    }
                    print!("{}", renderer(by_day, with_history).render(&view));
                    0
                }
                Err(err @ RosterError::Config(_)) | Err(err @ RosterError::Other(_)) => {
                    return Err(err.into())
                }
                Err(err) => {
                    eprintln!("{err}");
                    // Code 2 = roulement non résolu
                    match err.kind() {
                        FailureKind::Infeasible => eprintln!("hint: relax skill-mix rules or add patterns"),
                        FailureKind::Indeterminate => eprintln!("hint: raise --time-limit-secs"),
                        _ => {}
                    }
                    2
                }
            }
        }
        Commands::Show { roster, by_day } => {
            let view = JsonStorage::open(roster)?.load()?;
            print!("{}", renderer(by_day, false).render(&view));
            0
        }
    };

    std::process::exit(code);
}
