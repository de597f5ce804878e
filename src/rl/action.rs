//! Discrete policy output to game move conversion

use thiserror::Error;

/// Number of discrete actions the policy chooses between
pub const ACTION_COUNT: usize = 3;

/// The policy produced an action index outside `0..ACTION_COUNT`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid action {0}: expected 0 (straight), 1 (right) or 2 (left)")]
pub struct InvalidActionKind(pub usize);

/// Move relative to the snake's current facing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeAction {
    Straight,
    TurnRight,
    TurnLeft,
}

impl RelativeAction {
    /// One-hot `[straight, right, left]` move understood by the simulation
    pub fn one_hot(&self) -> [u8; ACTION_COUNT] {
        match self {
            RelativeAction::Straight => [1, 0, 0],
            RelativeAction::TurnRight => [0, 1, 0],
            RelativeAction::TurnLeft => [0, 0, 1],
        }
    }
}

impl TryFrom<usize> for RelativeAction {
    type Error = InvalidActionKind;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        match index {
            0 => Ok(RelativeAction::Straight),
            1 => Ok(RelativeAction::TurnRight),
            2 => Ok(RelativeAction::TurnLeft),
            other => Err(InvalidActionKind(other)),
        }
    }
}

/// Convert a discrete action index into a one-hot relative move
pub fn to_move(action: usize) -> Result<[u8; ACTION_COUNT], InvalidActionKind> {
    RelativeAction::try_from(action).map(|a| a.one_hot())
}
