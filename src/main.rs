use anyhow::Result;
use clap::Parser;
use snake_trainer::checkpoint::{CheckpointCoordinator, SaveReason};
use snake_trainer::logging;
use snake_trainer::modes::{self, TrainConfig, TrainMode};
use snake_trainer::rl::{DqnTrainer, TrainingBackend, default_device};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "snake_trainer")]
#[command(version, about = "Train a DQN agent to play snake, checkpointing on every exit path")]
struct Cli {
    /// Total environment steps to train for
    #[arg(long, default_value = "200000")]
    steps: usize,

    /// Show the game and reward curve in the terminal
    #[arg(long, default_value = "true", action = clap::ArgAction::Set)]
    render: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = TrainConfig::new(cli.steps, cli.render);
    modes::train::validate(&config)?;

    // The dashboard owns the terminal while rendering
    let run_log = logging::init(&config.logs_dir, !config.render)?;
    log::info!("run log: {}", run_log.display());

    let coordinator = Arc::new(CheckpointCoordinator::new(
        &config.models_dir,
        config.model_base_name.as_str(),
    ));
    let learner = Arc::new(DqnTrainer::<TrainingBackend>::new(
        config.dqn_config.clone(),
        default_device(),
    )?);

    let render = config.render;
    let mode = TrainMode::new(config, learner, coordinator);
    let _exit_guard = mode.install_hooks()?;

    // Training blocks this thread; the signal listeners need the
    // multi-threaded runtime's worker threads to keep running
    let outcome = match mode.run() {
        Ok(outcome) => outcome,
        Err(e) => {
            log::error!("training failed: {:#}", e);
            return Err(e.context(format!("model saved [{}]", SaveReason::Error)));
        }
    };

    log::info!("{}", outcome);
    // The dashboard has released the terminal by now; headless runs already
    // echo the log line
    if render {
        println!("{}", outcome);
    }

    Ok(())
}
