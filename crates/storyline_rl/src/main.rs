//! storyline-trainer CLI
//!
//! Trains the storyline sequencer and rolls out a few greedy episodes.
//!
//! ## Usage
//!
//! ```bash
//! # Defaults (2000 episodes, unseeded)
//! storyline-trainer
//!
//! # Reproducible run with JSON report
//! storyline-trainer --episodes 500 --seed 7 --json
//!
//! # Per-step training logs
//! RUST_LOG=debug storyline-trainer --episodes 10
//! ```

use clap::Parser;
use storyline_rl::{Config, Result, Trainer};

#[derive(Debug, Parser)]
#[command(name = "storyline-trainer", version, about = "Train the storyline Q-learning sequencer")]
struct Args {
    /// Number of training episodes.
    #[arg(long)]
    episodes: Option<usize>,

    /// Seed for reproducible runs.
    #[arg(long)]
    seed: Option<u64>,

    /// Greedy episodes to roll out after training.
    #[arg(long)]
    demo_runs: Option<usize>,

    /// Learning rate (alpha).
    #[arg(long)]
    alpha: Option<f64>,

    /// Discount factor (gamma).
    #[arg(long)]
    gamma: Option<f64>,

    /// Initial exploration rate (epsilon).
    #[arg(long)]
    epsilon: Option<f64>,

    /// Print the training report as JSON.
    #[arg(long)]
    json: bool,

    /// Print the effective configuration and exit.
    #[arg(long)]
    print_config: bool,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        if let Some(episodes) = self.episodes {
            config.training.episodes = episodes;
        }
        if let Some(seed) = self.seed {
            config.training.seed = Some(seed);
        }
        if let Some(runs) = self.demo_runs {
            config.training.demo_runs = runs;
        }
        if let Some(alpha) = self.alpha {
            config.learning.learning_rate = alpha;
        }
        if let Some(gamma) = self.gamma {
            config.learning.discount_factor = gamma;
        }
        if let Some(epsilon) = self.epsilon {
            config.learning.epsilon = epsilon;
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args = Args::parse();
    let mut config = Config::from_env();
    args.apply(&mut config);
    config.validate()?;

    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    log::info!(
        "storyline-trainer {}: {} episodes, alpha={}, gamma={}, epsilon={}",
        storyline_rl::VERSION,
        config.training.episodes,
        config.learning.learning_rate,
        config.learning.discount_factor,
        config.learning.epsilon
    );

    let mut trainer = Trainer::from_config(&config)?;
    let report = trainer.train()?;

    log::info!(
        "Training finished: avg reward {:.2}, avg steps {:.1}, epsilon {:.4}, {} updates",
        report.average_reward(),
        report.average_steps(),
        report.final_epsilon,
        report.total_updates
    );

    if args.json {
        println!("{}", report.to_json()?);
    }

    log::info!("----- DEMO RUN -----");
    trainer.demo(config.training.demo_runs)?;

    Ok(())
}
