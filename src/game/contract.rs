//! Contracts the training side consumes from a snake simulation.
//!
//! The adapter only needs a read view of the game ([`GameView`]) and the
//! reset/step pair of [`Simulation`]. Rendering is an optional capability: a
//! simulation without a display simply returns `None` from
//! [`Simulation::renderer`].

use super::{Direction, Point};
use anyhow::Result;

/// Read-only view of the game needed to build an observation
pub trait GameView {
    /// Head of the snake
    fn head(&self) -> Point;

    /// Current facing
    fn direction(&self) -> Direction;

    /// Food location
    fn food(&self) -> Point;

    /// Distance between neighbouring tiles in the game's coordinate system
    fn block_size(&self) -> i32 {
        1
    }

    /// Whether the snake's head would die at `point`
    fn is_collision(&self, point: Point) -> bool;
}

/// Result of one simulation tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub game_over: bool,
    pub score: u32,
    pub reward: f32,
}

/// A steppable snake game
pub trait Simulation: GameView {
    /// Start a fresh episode
    fn reset(&mut self);

    /// Advance one tick with a one-hot `[straight, right, left]` move
    fn play_step(&mut self, relative_move: [u8; 3]) -> StepOutcome;

    /// Display capability, if this simulation has one
    fn renderer(&mut self) -> Option<&mut dyn Renderable> {
        None
    }
}

/// Optional display capability of a simulation
pub trait Renderable {
    /// Draw the current frame
    fn render(&mut self) -> Result<()>;

    /// Release the display
    fn close(&mut self) -> Result<()>;
}
