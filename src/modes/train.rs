//! Training supervisor
//!
//! Wires the environment, learner, checkpoint coordinator and monitor
//! together and makes sure a checkpoint is written however training ends:
//!
//! | learn result             | checkpoint         | returns            |
//! |--------------------------|--------------------|--------------------|
//! | completed / stopped      | `final`            | `Ok`               |
//! | interrupted by the user  | `interrupt`        | `Ok`               |
//! | any other error or panic | `error`            | error / re-panics  |
//!
//! In every case a `final_attempt` checkpoint follows and the environment is
//! closed.
//!
//! # Example
//!
//! ```rust,ignore
//! use snake_trainer::checkpoint::CheckpointCoordinator;
//! use snake_trainer::modes::{TrainConfig, TrainMode};
//! use snake_trainer::rl::{DqnTrainer, TrainingBackend, default_device};
//! use std::sync::Arc;
//!
//! let config = TrainConfig::new(200_000, false);
//! let coordinator = Arc::new(CheckpointCoordinator::new(&config.models_dir, &config.model_base_name));
//! let learner = Arc::new(DqnTrainer::<TrainingBackend>::new(config.dqn_config.clone(), default_device())?);
//!
//! let mode = TrainMode::new(config, learner, coordinator);
//! let _exit_guard = mode.install_hooks()?;
//! mode.run()?;
//! ```

use anyhow::{Context, Result};
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind, resume_unwind};
use std::path::PathBuf;
use std::sync::Arc;

use super::monitor::{DEFAULT_CHECK_FREQ, DEFAULT_PLOT_WINDOW, TrainingMonitor};
use crate::checkpoint::{CheckpointCoordinator, ExitGuard, SaveReason, SignalHandler};
use crate::game::{GameConfig, SnakeGame};
use crate::input::TerminalEvents;
use crate::render::{Dashboard, DashboardSurface, LogSurface, PlotSurface};
use crate::rl::{
    DqnConfig, Environment, EpisodeLogger, LearnOutcome, Learner, SnakeEnvironment, StepHook,
    TrainError, Trainable,
};

/// Configuration for a training run
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Environment steps to train for
    pub total_steps: usize,

    /// Draw the game and the reward curve in the terminal
    pub render: bool,

    /// Directory checkpoints are written to
    pub models_dir: PathBuf,

    /// Checkpoint file name prefix
    pub model_base_name: String,

    /// Directory for the episode log and the run log
    pub logs_dir: PathBuf,

    /// Episode log file name inside `logs_dir`
    pub monitor_file: String,

    /// Refresh the reward plot every N steps
    pub check_freq: usize,

    /// Episodes in the plotted rolling mean
    pub plot_window: usize,

    /// Game configuration (grid size, rewards)
    pub game_config: GameConfig,

    /// DQN hyperparameters
    pub dqn_config: DqnConfig,
}

impl TrainConfig {
    /// Create a training configuration with defaults
    ///
    /// # Example
    ///
    /// ```rust
    /// use snake_trainer::modes::TrainConfig;
    ///
    /// let config = TrainConfig::new(200_000, true);
    /// assert!(config.episode_log_path().ends_with("logs/monitor.csv"));
    /// ```
    pub fn new(total_steps: usize, render: bool) -> Self {
        Self {
            total_steps,
            render,
            models_dir: PathBuf::from("models"),
            model_base_name: "snake_dqn_model".to_string(),
            logs_dir: PathBuf::from("logs"),
            monitor_file: "monitor.csv".to_string(),
            check_freq: DEFAULT_CHECK_FREQ,
            plot_window: DEFAULT_PLOT_WINDOW,
            game_config: GameConfig::default(),
            dqn_config: DqnConfig::default(),
        }
    }

    pub fn episode_log_path(&self) -> PathBuf {
        self.logs_dir.join(&self.monitor_file)
    }
}

/// How a supervised run ended without an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed { steps: usize },
    /// The monitor asked to stop (display closed)
    Stopped { steps: usize },
    Interrupted,
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Completed { steps } => write!(
                f,
                "training completed after {} steps, model saved [{}]",
                steps,
                SaveReason::Final
            ),
            RunOutcome::Stopped { steps } => write!(
                f,
                "training stopped from the display after {} steps, model saved [{}, {}]",
                steps,
                SaveReason::WindowClose,
                SaveReason::Final
            ),
            RunOutcome::Interrupted => write!(
                f,
                "training interrupted, model saved [{}]",
                SaveReason::Interrupt
            ),
        }
    }
}

impl From<LearnOutcome> for RunOutcome {
    fn from(outcome: LearnOutcome) -> Self {
        match outcome {
            LearnOutcome::Completed { steps } => RunOutcome::Completed { steps },
            LearnOutcome::Stopped { steps } => RunOutcome::Stopped { steps },
        }
    }
}

/// Closes the environment when dropped, including during unwinding
struct EnvGuard<'a>(&'a mut dyn Environment);

impl Drop for EnvGuard<'_> {
    fn drop(&mut self) {
        self.0.close();
        log::debug!("environment closed");
    }
}

/// Supervises one training run
pub struct TrainMode<L: Learner + 'static> {
    config: TrainConfig,
    learner: Arc<L>,
    coordinator: Arc<CheckpointCoordinator>,
}

impl<L: Learner + 'static> TrainMode<L> {
    /// Create the supervisor and register `learner` for checkpointing
    pub fn new(config: TrainConfig, learner: Arc<L>, coordinator: Arc<CheckpointCoordinator>) -> Self {
        let model: Arc<dyn Trainable> = learner.clone();
        coordinator.register(model);

        Self {
            config,
            learner,
            coordinator,
        }
    }

    /// Install SIGINT/SIGTERM handlers and return the exit guard
    ///
    /// The guard writes an `atexit` checkpoint when dropped; keep it alive
    /// until the process is about to end.
    pub fn install_hooks(&self) -> Result<ExitGuard> {
        SignalHandler::with_exit(self.coordinator.clone(), Box::new(restore_terminal_and_exit))
            .install()?;
        Ok(ExitGuard::new(self.coordinator.clone()))
    }

    /// Build the environment and monitor from the configuration, then train
    pub fn run(&self) -> Result<RunOutcome> {
        let log_path = self.config.episode_log_path();

        if self.config.render {
            let dashboard = Dashboard::shared();
            let game = SnakeGame::with_display(self.config.game_config.clone(), dashboard.clone());
            let mut env = EpisodeLogger::create(SnakeEnvironment::new(game), &log_path)?;
            let mut monitor = self
                .monitor(Box::new(DashboardSurface::new(dashboard)))
                .with_events(Box::new(TerminalEvents::new()));
            self.supervise(&mut env, &mut monitor)
        } else {
            let game = SnakeGame::new(self.config.game_config.clone());
            let mut env = EpisodeLogger::create(SnakeEnvironment::new(game), &log_path)?;
            let mut monitor = self.monitor(Box::new(LogSurface));
            self.supervise(&mut env, &mut monitor)
        }
    }

    fn monitor(&self, surface: Box<dyn PlotSurface>) -> TrainingMonitor {
        TrainingMonitor::new(
            self.config.episode_log_path(),
            self.coordinator.clone(),
            surface,
        )
        .with_check_freq(self.config.check_freq)
        .with_window(self.config.plot_window)
    }

    /// Run the learner against `env` with the failure policy described in
    /// the module docs
    pub fn supervise(&self, env: &mut dyn Environment, hook: &mut dyn StepHook) -> Result<RunOutcome> {
        let total_steps = self.config.total_steps;
        log::info!(
            "training for {} steps, checkpoints in {}",
            total_steps,
            self.coordinator.dir().display()
        );

        let mut guard = EnvGuard(env);
        let result = catch_unwind(AssertUnwindSafe(|| {
            self.learner.learn(&mut *guard.0, total_steps, hook)
        }));

        let outcome = match result {
            Ok(Ok(outcome)) => {
                log::info!("training finished: {:?}", outcome);
                self.coordinator.save(SaveReason::Final);
                Ok(Ok(RunOutcome::from(outcome)))
            }
            Ok(Err(TrainError::Interrupted)) => {
                log::warn!("training interrupted by user, saving current model");
                self.coordinator.save(SaveReason::Interrupt);
                Ok(Ok(RunOutcome::Interrupted))
            }
            Ok(Err(e)) => {
                log::error!("exception during training: {}", e);
                self.coordinator.save(SaveReason::Error);
                Ok(Err(anyhow::Error::new(e).context("training failed")))
            }
            Err(panic) => {
                log::error!("training panicked, saving current model");
                self.coordinator.save(SaveReason::Error);
                Err(panic)
            }
        };

        self.coordinator.save(SaveReason::FinalAttempt);
        drop(guard);

        match outcome {
            Ok(result) => result,
            Err(panic) => resume_unwind(panic),
        }
    }
}

/// Production exit for the signal handler: put the terminal back first
fn restore_terminal_and_exit(code: i32) {
    if crossterm::terminal::is_raw_mode_enabled().unwrap_or(false) {
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = crossterm::execute!(
            std::io::stderr(),
            crossterm::terminal::LeaveAlternateScreen
        );
    }
    eprintln!("{}", signal_exit_message());
    std::process::exit(code);
}

fn signal_exit_message() -> String {
    format!(
        "termination signal received, model saved [{}], exiting",
        SaveReason::Signal
    )
}

/// Reject configurations that cannot train
pub fn validate(config: &TrainConfig) -> Result<()> {
    if config.total_steps == 0 {
        anyhow::bail!("total_steps must be at least 1");
    }
    config
        .game_config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("invalid game configuration")?;
    config
        .dqn_config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("invalid DQN configuration")
}
