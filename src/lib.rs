//! Snake Trainer - crash-resilient DQN training for a grid snake game
//!
//! This library provides:
//! - Core game logic and the simulation contract (game module)
//! - Observation encoding, the episode environment and a DQN learner (rl module)
//! - Checkpointing from signals, exit guards and error paths (checkpoint module)
//! - Terminal dashboard and plot surfaces (render and input modules)
//! - The training monitor and supervisor (modes module)

pub mod checkpoint;
pub mod game;
pub mod input;
pub mod logging;
pub mod metrics;
pub mod modes;
pub mod render;
pub mod rl;
