//! Interface between the supervisor and a learning algorithm

use super::environment::{EnvError, Environment};
use std::path::Path;
use thiserror::Error;

/// A model that can persist itself.
///
/// `save` takes `&self` so a checkpoint can be written from another thread
/// (a signal listener) while training is in progress.
pub trait Trainable: Send + Sync {
    fn save(&self, path: &Path) -> anyhow::Result<()>;
}

/// What the per-step hook asks the training loop to do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookSignal {
    Continue,
    /// Stop training and return normally
    Stop,
    /// The user asked to interrupt training
    Interrupt,
}

/// Callback invoked by the learner after every environment step
pub trait StepHook {
    /// `timestep` counts environment steps since `learn` started, from 1
    fn on_step(&mut self, timestep: usize) -> HookSignal;
}

/// How a `learn` call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LearnOutcome {
    /// Ran for the requested number of steps
    Completed { steps: usize },
    /// The hook requested an early stop
    Stopped { steps: usize },
}

#[derive(Debug, Error)]
pub enum TrainError {
    #[error("training interrupted by user")]
    Interrupted,
    #[error(transparent)]
    Env(#[from] EnvError),
    #[error("model update failed: {0}")]
    Model(#[source] anyhow::Error),
}

/// A learning algorithm that trains against an [`Environment`]
pub trait Learner: Trainable {
    fn learn(
        &self,
        env: &mut dyn Environment,
        total_steps: usize,
        hook: &mut dyn StepHook,
    ) -> Result<LearnOutcome, TrainError>;
}
