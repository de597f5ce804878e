use super::{
    action::Direction,
    config::GameConfig,
    contract::{GameView, Renderable, Simulation, StepOutcome},
    state::{GameState, Point, Snake},
};
use crate::render::SharedDashboard;
use anyhow::Result;
use rand::Rng;

/// Grid snake game driven by relative one-hot moves
pub struct SnakeGame {
    config: GameConfig,
    state: GameState,
    rng: rand::rngs::ThreadRng,
    /// Terminal display when running with rendering enabled
    display: Option<SharedDashboard>,
}

impl SnakeGame {
    /// Create a headless game
    pub fn new(config: GameConfig) -> Self {
        let mut game = Self {
            state: GameState::new(
                Snake::new(Point::new(0, 0), Direction::Right, 1),
                Point::new(0, 0),
                config.grid_width,
                config.grid_height,
            ),
            config,
            rng: rand::thread_rng(),
            display: None,
        };
        game.reset();
        game
    }

    /// Create a game that draws itself onto the shared dashboard
    pub fn with_display(config: GameConfig, display: SharedDashboard) -> Self {
        let mut game = Self::new(config);
        game.display = Some(display);
        game
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    /// Spawn food at a random empty tile
    fn spawn_food_avoid_snake(&mut self, snake: &Snake) -> Point {
        // No empty tile left
        if snake.len() >= self.config.grid_width * self.config.grid_height {
            return snake.head();
        }
        loop {
            let x = self.rng.gen_range(0..self.config.grid_width) as i32;
            let y = self.rng.gen_range(0..self.config.grid_height) as i32;
            let point = Point::new(x, y);

            if !snake.body.contains(&point) {
                return point;
            }
        }
    }

    fn stalled(&self) -> bool {
        self.state.steps_since_food > self.config.stall_factor * self.state.snake.len() as u32
    }
}

impl GameView for SnakeGame {
    fn head(&self) -> Point {
        self.state.snake.head()
    }

    fn direction(&self) -> Direction {
        self.state.snake.direction
    }

    fn food(&self) -> Point {
        self.state.food
    }

    fn is_collision(&self, point: Point) -> bool {
        self.state.is_collision(point)
    }
}

impl Simulation for SnakeGame {
    fn reset(&mut self) {
        let center_x = (self.config.grid_width / 2) as i32;
        let center_y = (self.config.grid_height / 2) as i32;

        let snake = Snake::new(
            Point::new(center_x, center_y),
            Direction::Right,
            self.config.initial_length,
        );
        let food = self.spawn_food_avoid_snake(&snake);

        self.state = GameState::new(snake, food, self.config.grid_width, self.config.grid_height);
    }

    fn play_step(&mut self, relative_move: [u8; 3]) -> StepOutcome {
        if !self.state.is_alive {
            return StepOutcome {
                game_over: true,
                score: self.state.score,
                reward: 0.0,
            };
        }

        self.state.snake.direction = self.state.snake.direction.steer(relative_move);
        let new_head = self.state.snake.head().moved_in_direction(self.state.snake.direction, 1);

        self.state.steps += 1;
        self.state.steps_since_food += 1;

        if self.state.is_collision(new_head) || self.stalled() {
            self.state.is_alive = false;
            return StepOutcome {
                game_over: true,
                score: self.state.score,
                reward: self.config.rewards.death,
            };
        }

        let ate_food = new_head == self.state.food;
        self.state.snake.move_snake(ate_food);

        let mut reward = self.config.rewards.step;
        if ate_food {
            self.state.score += 1;
            self.state.steps_since_food = 0;
            let snake = self.state.snake.clone();
            self.state.food = self.spawn_food_avoid_snake(&snake);
            reward = self.config.rewards.food;
        }

        StepOutcome {
            game_over: false,
            score: self.state.score,
            reward,
        }
    }

    fn renderer(&mut self) -> Option<&mut dyn Renderable> {
        if self.display.is_some() {
            Some(self)
        } else {
            None
        }
    }
}

impl Renderable for SnakeGame {
    fn render(&mut self) -> Result<()> {
        if let Some(display) = &self.display {
            display.borrow_mut().show_game(&self.state)?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(display) = self.display.take() {
            display.borrow_mut().close()?;
        }
        Ok(())
    }
}
