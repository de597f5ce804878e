/// Direction the snake is facing, in screen coordinates (`Up` decreases `y`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// Returns the delta (dx, dy) for one tile in this direction
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
        }
    }

    /// The direction after a 90-degree clockwise turn
    pub fn clockwise(&self) -> Direction {
        match self {
            Direction::Right => Direction::Down,
            Direction::Down => Direction::Left,
            Direction::Left => Direction::Up,
            Direction::Up => Direction::Right,
        }
    }

    /// The direction after a 90-degree counter-clockwise turn
    pub fn counter_clockwise(&self) -> Direction {
        match self {
            Direction::Right => Direction::Up,
            Direction::Up => Direction::Left,
            Direction::Left => Direction::Down,
            Direction::Down => Direction::Right,
        }
    }

    /// Apply a one-hot relative move `[straight, right, left]`.
    ///
    /// Anything that is not exactly one of the three one-hot vectors keeps the
    /// current heading.
    pub fn steer(&self, relative_move: [u8; 3]) -> Direction {
        match relative_move {
            [0, 1, 0] => self.clockwise(),
            [0, 0, 1] => self.counter_clockwise(),
            _ => *self,
        }
    }
}
