use serde::{Deserialize, Serialize};

/// Per-step rewards handed back by the simulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardScheme {
    pub food: f32,
    /// A step that neither eats nor dies
    pub step: f32,
    /// Wall, body or stall
    pub death: f32,
}

impl Default for RewardScheme {
    fn default() -> Self {
        Self {
            food: 10.0,
            step: 0.0,
            death: -10.0,
        }
    }
}

/// Grid and episode settings for [`SnakeGame`](super::SnakeGame)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub grid_width: usize,
    pub grid_height: usize,
    pub initial_length: usize,
    pub rewards: RewardScheme,

    /// The episode ends once the snake has gone `stall_factor * length` steps
    /// without eating
    pub stall_factor: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 32,
            grid_height: 24,
            initial_length: 3,
            rewards: RewardScheme::default(),
            stall_factor: 100,
        }
    }
}

impl GameConfig {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    /// 10x10 grid for tests
    pub fn small() -> Self {
        Self::new(10, 10)
    }

    /// The snake must fit on one row of the grid when it spawns at the center
    pub fn validate(&self) -> Result<(), String> {
        if self.initial_length == 0 {
            return Err("initial_length must be at least 1".to_string());
        }
        if self.grid_height == 0 || self.grid_width / 2 + 1 < self.initial_length {
            return Err(format!(
                "a {}x{} grid cannot hold a snake of length {}",
                self.grid_width, self.grid_height, self.initial_length
            ));
        }
        if self.stall_factor == 0 {
            return Err("stall_factor must be at least 1".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = GameConfig::default();
        assert_eq!(config.rewards.food, 10.0);
        assert_eq!(config.rewards.death, -10.0);
        assert_eq!(config.stall_factor, 100);
        assert!(config.validate().is_ok());
        assert!(GameConfig::small().validate().is_ok());
    }

    #[test]
    fn test_snake_must_fit() {
        let mut config = GameConfig::new(4, 4);
        config.initial_length = 4;
        assert!(config.validate().is_err());

        config.initial_length = 3;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_stall_factor_rejected() {
        let config = GameConfig {
            stall_factor: 0,
            ..GameConfig::small()
        };
        assert!(config.validate().is_err());
    }
}
