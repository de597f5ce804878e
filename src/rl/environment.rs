use super::action::{ACTION_COUNT, InvalidActionKind, to_move};
use super::observation::{OBSERVATION_SIZE, Observation, encode};
use crate::game::Simulation;
use thiserror::Error;

/// Extra information returned with every step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepInfo {
    /// Food eaten so far this episode
    pub score: u32,
}

/// Result of one environment step
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeResult {
    pub observation: Observation,
    pub reward: f32,
    /// The game reported game over
    pub terminated: bool,
    /// Always false: episodes only end through the game's own game-over signal
    pub truncated: bool,
    pub info: StepInfo,
}

impl EpisodeResult {
    pub fn done(&self) -> bool {
        self.terminated || self.truncated
    }
}

#[derive(Debug, Error)]
pub enum EnvError {
    #[error(transparent)]
    InvalidAction(#[from] InvalidActionKind),
    #[error("failed to write episode log: {0}")]
    EpisodeLog(#[source] anyhow::Error),
}

/// Fixed-shape environment interface consumed by a learner
pub trait Environment {
    fn observation_size(&self) -> usize {
        OBSERVATION_SIZE
    }

    fn action_count(&self) -> usize {
        ACTION_COUNT
    }

    /// Start a new episode and return its first observation
    fn reset(&mut self, seed: Option<u64>) -> Result<Observation, EnvError>;

    /// Apply a discrete action
    fn step(&mut self, action: usize) -> Result<EpisodeResult, EnvError>;

    /// Draw the current frame if the environment can
    fn render(&mut self) {}

    /// Release any resources held by the environment
    fn close(&mut self) {}
}

/// Snake environment for reinforcement learning
///
/// Wraps one simulation and exposes it through the [`Environment`] contract:
/// - 11-value binary observations
/// - 3 relative actions (straight, right, left)
///
/// The simulation is not seedable, so seeds passed to `reset` are dropped.
pub struct SnakeEnvironment<S: Simulation> {
    sim: S,
}

impl<S: Simulation> SnakeEnvironment<S> {
    pub fn new(sim: S) -> Self {
        Self { sim }
    }

    /// Get current observation without stepping
    pub fn observation(&self) -> Observation {
        encode(&self.sim)
    }

    /// Access the wrapped simulation (for testing/debugging)
    pub fn simulation(&self) -> &S {
        &self.sim
    }
}

impl<S: Simulation> Environment for SnakeEnvironment<S> {
    fn reset(&mut self, seed: Option<u64>) -> Result<Observation, EnvError> {
        if let Some(seed) = seed {
            log::debug!("simulation is not seedable, ignoring seed {}", seed);
        }
        self.sim.reset();
        Ok(encode(&self.sim))
    }

    fn step(&mut self, action: usize) -> Result<EpisodeResult, EnvError> {
        let relative_move = to_move(action)?;
        let outcome = self.sim.play_step(relative_move);

        Ok(EpisodeResult {
            observation: encode(&self.sim),
            reward: outcome.reward,
            terminated: outcome.game_over,
            truncated: false,
            info: StepInfo {
                score: outcome.score,
            },
        })
    }

    fn render(&mut self) {
        let Some(renderer) = self.sim.renderer() else {
            return;
        };
        if let Err(e) = renderer.render() {
            log::debug!("render failed: {:#}", e);
        }
    }

    fn close(&mut self) {
        let Some(renderer) = self.sim.renderer() else {
            return;
        };
        if let Err(e) = renderer.close() {
            log::debug!("close failed: {:#}", e);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::game::{
        Direction, GameConfig, GameView, Point, Renderable, SnakeGame, StepOutcome,
    };
    use anyhow::anyhow;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Simulation that ends every step and counts calls
    #[derive(Default)]
    pub(crate) struct DoomedSim {
        pub resets: Rc<Cell<usize>>,
        pub last_move: Option<[u8; 3]>,
    }

    impl GameView for DoomedSim {
        fn head(&self) -> Point {
            Point::new(5, 5)
        }

        fn direction(&self) -> Direction {
            Direction::Up
        }

        fn food(&self) -> Point {
            Point::new(7, 2)
        }

        fn is_collision(&self, _point: Point) -> bool {
            true
        }
    }

    impl Simulation for DoomedSim {
        fn reset(&mut self) {
            self.resets.set(self.resets.get() + 1);
        }

        fn play_step(&mut self, relative_move: [u8; 3]) -> StepOutcome {
            self.last_move = Some(relative_move);
            StepOutcome {
                game_over: true,
                score: 0,
                reward: -1.0,
            }
        }
    }

    /// Simulation whose display always fails
    struct BrokenDisplaySim {
        inner: DoomedSim,
        renders: usize,
    }

    impl GameView for BrokenDisplaySim {
        fn head(&self) -> Point {
            self.inner.head()
        }

        fn direction(&self) -> Direction {
            self.inner.direction()
        }

        fn food(&self) -> Point {
            self.inner.food()
        }

        fn is_collision(&self, point: Point) -> bool {
            self.inner.is_collision(point)
        }
    }

    impl Simulation for BrokenDisplaySim {
        fn reset(&mut self) {
            self.inner.reset()
        }

        fn play_step(&mut self, relative_move: [u8; 3]) -> StepOutcome {
            self.inner.play_step(relative_move)
        }

        fn renderer(&mut self) -> Option<&mut dyn Renderable> {
            Some(self)
        }
    }

    impl Renderable for BrokenDisplaySim {
        fn render(&mut self) -> anyhow::Result<()> {
            self.renders += 1;
            Err(anyhow!("no display"))
        }

        fn close(&mut self) -> anyhow::Result<()> {
            Err(anyhow!("no display"))
        }
    }

    #[test]
    fn test_reset_returns_encoded_observation() {
        let mut env = SnakeEnvironment::new(DoomedSim::default());

        let obs = env.reset(Some(42)).unwrap();

        assert_eq!(obs, [1.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0]);
        assert_eq!(env.simulation().resets.get(), 1);
    }

    #[test]
    fn test_step_packages_result() {
        let mut env = SnakeEnvironment::new(DoomedSim::default());

        let result = env.step(1).unwrap();

        assert_eq!(env.simulation().last_move, Some([0, 1, 0]));
        assert_eq!(result.reward, -1.0);
        assert!(result.terminated);
        assert!(!result.truncated);
        assert!(result.done());
        assert_eq!(result.info, StepInfo { score: 0 });
    }

    #[test]
    fn test_invalid_action_propagates() {
        let mut env = SnakeEnvironment::new(DoomedSim::default());

        let err = env.step(3).unwrap_err();

        assert!(matches!(err, EnvError::InvalidAction(InvalidActionKind(3))));
        assert_eq!(env.simulation().last_move, None);
    }

    #[test]
    fn test_render_errors_are_swallowed() {
        let mut env = SnakeEnvironment::new(BrokenDisplaySim {
            inner: DoomedSim::default(),
            renders: 0,
        });

        env.render();
        env.close();

        assert_eq!(env.simulation().renders, 1);
    }

    #[test]
    fn test_headless_render_is_noop() {
        let mut env = SnakeEnvironment::new(SnakeGame::new(GameConfig::small()));
        env.render();
        env.close();
    }

    #[test]
    fn test_multiple_episodes() {
        let mut env = SnakeEnvironment::new(SnakeGame::new(GameConfig::small()));

        for _ in 0..2 {
            env.reset(None).unwrap();
            let mut steps = 0;
            let mut done = false;

            // Going straight from the center always hits a wall
            while !done && steps < 100 {
                done = env.step(0).unwrap().done();
                steps += 1;
            }

            assert!(done);
            assert!(steps <= 10);
        }
    }

    #[test]
    fn test_observation_changes_after_step() {
        let mut env = SnakeEnvironment::new(SnakeGame::new(GameConfig::small()));
        env.reset(None).unwrap();

        let before = env.observation();
        env.step(1).unwrap(); // turn right: now facing down
        let after = env.observation();

        assert_ne!(before, after);
        assert_eq!(after[6], 1.0);
    }
}
