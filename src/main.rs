use autopilot::{
    Config, EvolutionTarget, Identity, Network, Perceptron, Trainer, TrafficPlan, Vehicle,
};
use clap::{Parser, Subcommand};
use core::{error::Error, ops::ControlFlow};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "autopilot")]
#[command(version)]
#[command(about = "Evolve perceptron drivers that overtake traffic without crashing")]
struct Cli {
    /// JSON configuration file, defaults are used for anything it leaves out
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Random seed for reproducible runs
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Cap on ticks per generation, on top of the stall rules
    #[arg(long, global = true)]
    max_ticks: Option<u64>,

    /// Place traffic at random instead of the fixed layout
    #[arg(long, global = true)]
    random_traffic: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a lineage of brains
    Train {
        /// Trainees per generation
        #[arg(short, long)]
        population: Option<usize>,

        /// Stop after this many generations instead of the next multiple of 25
        #[arg(short, long)]
        generations: Option<usize>,

        /// Generation index to start counting from
        #[arg(long, default_value_t = 0)]
        start: usize,

        /// Brain to continue the lineage from
        #[arg(short, long)]
        brain: Option<PathBuf>,

        /// Where to write the best brain
        #[arg(short, long, default_value = "best.json")]
        out: PathBuf,
    },

    /// Drive a saved brain against fresh traffic and report how it did
    Replay {
        #[arg(short, long)]
        brain: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if cli.seed.is_some() {
        config.training.seed = cli.seed;
    }
    if cli.max_ticks.is_some() {
        config.training.max_ticks = cli.max_ticks;
    }
    if cli.random_traffic {
        config.traffic_plan = TrafficPlan::random();
    }

    match cli.command {
        Commands::Train {
            population,
            generations,
            start,
            brain,
            out,
        } => {
            if let Some(population) = population {
                config.training.population = population;
            }
            let target = generations.map_or_else(EvolutionTarget::default, EvolutionTarget::Generations);

            let mut trainer = Trainer::new(config)?.starting_at(start);
            if let Some(path) = brain {
                trainer = trainer.with_seed_brain(Perceptron::from_file(path)?)?;
            }

            let training = trainer.train(target, |_| ControlFlow::Continue(()))?;
            if let Some(best) = &training.best.brain {
                best.to_file(&out)?;
            }
            info!(
                generation = training.generation,
                score = training.best.score,
                out = %out.display(),
                "saved best brain"
            );
        }
        Commands::Replay { brain } => {
            let brain = Perceptron::from_file(brain)?;
            let mut trainer = Trainer::new(config)?;
            brain.ensure_topology(trainer.topology())?;

            let (kinematics, capacity) = (trainer.config().trainee, trainer.config().training.credit_capacity);
            let driver = Vehicle::agent(
                Identity::Trainee {
                    generation: trainer.generation(),
                    index: 0,
                },
                0.,
                0.,
                kinematics,
                brain,
            )
            .with_credit_capacity(capacity);
            let result = trainer.replay(vec![driver])?;
            info!(
                score = result.score,
                damaged = result.damaged,
                y = result.y,
                ticks = trainer.state().ticks,
                "replay finished"
            );
        }
    }

    Ok(())
}
