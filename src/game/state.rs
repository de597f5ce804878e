use super::action::Direction;

/// A tile coordinate on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move point by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move point `distance` units in a direction
    pub fn moved_in_direction(&self, direction: Direction, distance: i32) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx * distance, dy * distance)
    }
}

/// The snake in the game
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at index 0
    pub body: Vec<Point>,
    /// Current direction of movement
    pub direction: Direction,
}

impl Snake {
    /// Create a new snake with given starting position and direction
    pub fn new(head: Point, direction: Direction, length: usize) -> Self {
        let mut body = vec![head];

        // Initial segments trail behind the head
        let (dx, dy) = direction.delta();
        for i in 1..length.max(1) {
            let prev = body[i - 1];
            body.push(prev.moved_by(-dx, -dy));
        }

        Self { body, direction }
    }

    /// Get the head position
    pub fn head(&self) -> Point {
        self.body[0]
    }

    /// Get body segments (excluding head)
    pub fn body_segments(&self) -> &[Point] {
        &self.body[1..]
    }

    /// Check if point collides with snake body (excluding head)
    pub fn collides_with_body(&self, point: Point) -> bool {
        self.body_segments().contains(&point)
    }

    /// Move snake one tile in current direction, growing if should_grow is true
    pub fn move_snake(&mut self, should_grow: bool) {
        let new_head = self.head().moved_in_direction(self.direction, 1);
        self.body.insert(0, new_head);

        if !should_grow {
            self.body.pop();
        }
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Complete game state
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub snake: Snake,
    pub food: Point,
    pub grid_width: usize,
    pub grid_height: usize,
    pub score: u32,
    pub steps: u32,
    /// Steps since the last food was eaten
    pub steps_since_food: u32,
    pub is_alive: bool,
}

impl GameState {
    pub fn new(snake: Snake, food: Point, grid_width: usize, grid_height: usize) -> Self {
        Self {
            snake,
            food,
            grid_width,
            grid_height,
            score: 0,
            steps: 0,
            steps_since_food: 0,
            is_alive: true,
        }
    }

    /// Check if a point is within the grid bounds
    pub fn is_in_bounds(&self, point: Point) -> bool {
        point.x >= 0
            && point.x < self.grid_width as i32
            && point.y >= 0
            && point.y < self.grid_height as i32
    }

    /// A point is a collision if it is off the grid or on the snake's body
    pub fn is_collision(&self, point: Point) -> bool {
        !self.is_in_bounds(point) || self.snake.collides_with_body(point)
    }
}
