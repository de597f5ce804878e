//! Snake simulation
//!
//! The training side only talks to a game through the traits in [`contract`];
//! [`SnakeGame`] is the grid implementation used by the binary.

pub mod action;
pub mod config;
pub mod contract;
pub mod engine;
pub mod state;

pub use action::Direction;
pub use config::{GameConfig, RewardScheme};
pub use contract::{GameView, Renderable, Simulation, StepOutcome};
pub use engine::SnakeGame;
pub use state::{GameState, Point, Snake};
