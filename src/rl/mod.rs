//! Reinforcement learning side of the snake trainer
//!
//! Provides:
//! - 11-feature observation encoding and relative action mapping
//! - An episode-level environment over any [`crate::game::Simulation`]
//! - A CSV episode logger wrapper
//! - The learner contract and a DQN implementation of it

pub mod action;
pub mod backend;
pub mod buffer;
pub mod config;
pub mod dqn;
pub mod environment;
pub mod episode_log;
pub mod learner;
pub mod network;
pub mod observation;
pub mod persistence;

pub use action::{ACTION_COUNT, InvalidActionKind, RelativeAction, to_move};
pub use backend::{InferenceBackend, TrainingBackend, default_device};
pub use buffer::ReplayBuffer;
pub use config::DqnConfig;
pub use dqn::{DqnAgent, DqnTrainer};
pub use environment::{EnvError, Environment, EpisodeResult, SnakeEnvironment, StepInfo};
pub use episode_log::{EpisodeLogger, EpisodeRow, read_episode_rewards};
pub use learner::{HookSignal, LearnOutcome, Learner, StepHook, TrainError, Trainable};
pub use network::{QNetwork, QNetworkConfig};
pub use observation::{OBSERVATION_SIZE, Observation, encode};
pub use persistence::{ModelMetadata, load_network, save_model};
