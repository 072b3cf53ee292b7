//! Greedy Rollout Example
//!
//! Trains a learner with a recording storyline hook, then prints the greedy
//! action sequence for each role and the storyline events collected on the way.
//!
//! # Running
//! ```bash
//! cargo run --release -p storyline_rl --example greedy_rollout
//! ```

use storyline_rl::{
    Config, GameEnvironment, GameState, QLearner, RecordingStoryline, StateEncoder,
    StorylineEvent, Trainer, NUM_ACTIONS,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut config = Config::default();
    config.training.episodes = 3000;
    config.training.seed = Some(2024);
    config.training.max_demo_steps = 40;

    let recorder = RecordingStoryline::new();
    let env = GameEnvironment::seeded(config.environment.clone(), 2024)
        .with_storyline(recorder.clone());
    let encoder = StateEncoder::new(config.environment.bounds);
    let learner = QLearner::seeded(
        encoder.num_states(),
        NUM_ACTIONS,
        config.learning.clone(),
        4202,
    )?;

    let mut trainer = Trainer::new(env, learner, config.training.clone())?;
    let report = trainer.train()?;
    println!(
        "Trained {} episodes: avg reward {:.2}, {} Q-cells visited",
        report.episodes,
        report.average_reward(),
        trainer.learner().q_table().count_visited(0.0)
    );

    for role in 0..config.environment.bounds.role_count {
        let trace = trainer.run_greedy_from(GameState::initial(role))?;
        let actions: Vec<String> = trace.actions().iter().map(|a| a.to_string()).collect();
        println!(
            "role {}: {} (reward {:.1}{})",
            role,
            actions.join(" -> "),
            trace.total_reward,
            if trace.truncated { ", truncated" } else { "" }
        );
    }

    let events = recorder.events();
    let practice = events
        .iter()
        .filter(|e| matches!(e, StorylineEvent::PracticeArc { .. }))
        .count();
    println!(
        "Storyline: {} practice arcs, {} big events",
        practice,
        events.len() - practice
    );

    Ok(())
}
