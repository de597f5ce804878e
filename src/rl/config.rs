//! DQN hyperparameter configuration

use serde::{Deserialize, Serialize};

/// Configuration for the DQN (Deep Q-Network) learner
///
/// Defaults follow the classic DQN recipe with a small replay buffer and an
/// MLP sized for the 11-feature snake observation.
///
/// # Example
///
/// ```rust
/// use snake_trainer::rl::DqnConfig;
///
/// let config = DqnConfig {
///     learning_rate: 5e-4,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DqnConfig {
    /// Learning rate for the Adam optimizer
    ///
    /// Default: 1e-3
    pub learning_rate: f64,

    /// Discount factor for future rewards (gamma)
    ///
    /// Default: 0.99
    pub gamma: f32,

    /// Replay buffer capacity in transitions
    ///
    /// Default: 100_000
    pub buffer_size: usize,

    /// Minibatch size sampled from the replay buffer
    ///
    /// Default: 64
    pub batch_size: usize,

    /// Environment steps collected before the first gradient update
    ///
    /// Default: 100
    pub learning_starts: usize,

    /// Perform a gradient update every N environment steps
    ///
    /// Default: 4
    pub train_freq: usize,

    /// Copy the online network into the target network every N environment steps
    ///
    /// Default: 10_000
    pub target_update_interval: usize,

    /// Fraction of training over which epsilon decays linearly
    ///
    /// Default: 0.1
    pub exploration_fraction: f32,

    /// Epsilon at the start of training
    ///
    /// Default: 1.0
    pub exploration_initial_eps: f32,

    /// Epsilon after the decay period
    ///
    /// Default: 0.05
    pub exploration_final_eps: f32,

    /// Global gradient norm clip
    ///
    /// Default: 10.0
    pub max_grad_norm: f32,

    /// Width of both hidden layers
    ///
    /// Default: 64
    pub hidden_dim: usize,

    /// Log a progress line every N finished episodes
    ///
    /// Default: 4
    pub log_interval: usize,
}

impl DqnConfig {
    /// Validate configuration parameters
    ///
    /// # Returns
    ///
    /// `Ok(())` if all parameters are valid, `Err(String)` with an error message otherwise.
    pub fn validate(&self) -> Result<(), String> {
        if self.learning_rate <= 0.0 {
            return Err(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            ));
        }

        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(format!("gamma must be in [0, 1], got {}", self.gamma));
        }

        if self.batch_size == 0 {
            return Err("batch_size must be at least 1".to_string());
        }

        if self.buffer_size < self.batch_size {
            return Err(format!(
                "buffer_size ({}) cannot be smaller than batch_size ({})",
                self.buffer_size, self.batch_size
            ));
        }

        if self.train_freq == 0 {
            return Err("train_freq must be at least 1".to_string());
        }

        if self.target_update_interval == 0 {
            return Err("target_update_interval must be at least 1".to_string());
        }

        if !(0.0..=1.0).contains(&self.exploration_fraction) {
            return Err(format!(
                "exploration_fraction must be in [0, 1], got {}",
                self.exploration_fraction
            ));
        }

        for (name, eps) in [
            ("exploration_initial_eps", self.exploration_initial_eps),
            ("exploration_final_eps", self.exploration_final_eps),
        ] {
            if !(0.0..=1.0).contains(&eps) {
                return Err(format!("{} must be in [0, 1], got {}", name, eps));
            }
        }

        if self.max_grad_norm <= 0.0 {
            return Err(format!(
                "max_grad_norm must be positive, got {}",
                self.max_grad_norm
            ));
        }

        if self.hidden_dim == 0 {
            return Err("hidden_dim must be at least 1".to_string());
        }

        if self.log_interval == 0 {
            return Err("log_interval must be at least 1".to_string());
        }

        Ok(())
    }

    /// Epsilon for the given progress through training, in `[0, 1]`
    pub fn epsilon(&self, progress: f32) -> f32 {
        if self.exploration_fraction <= 0.0 || progress >= self.exploration_fraction {
            return self.exploration_final_eps;
        }
        let t = progress / self.exploration_fraction;
        self.exploration_initial_eps
            + t * (self.exploration_final_eps - self.exploration_initial_eps)
    }
}

impl Default for DqnConfig {
    fn default() -> Self {
        Self {
            learning_rate: 1e-3,
            gamma: 0.99,
            buffer_size: 100_000,
            batch_size: 64,
            learning_starts: 100,
            train_freq: 4,
            target_update_interval: 10_000,
            exploration_fraction: 0.1,
            exploration_initial_eps: 1.0,
            exploration_final_eps: 0.05,
            max_grad_norm: 10.0,
            hidden_dim: 64,
            log_interval: 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DqnConfig::default();
        assert_eq!(config.learning_rate, 1e-3);
        assert_eq!(config.gamma, 0.99);
        assert_eq!(config.buffer_size, 100_000);
        assert_eq!(config.batch_size, 64);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_negative_learning_rate() {
        let mut config = DqnConfig::default();
        config.learning_rate = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_gamma_out_of_range() {
        let mut config = DqnConfig::default();
        config.gamma = 1.5;
        assert!(config.validate().is_err());

        config.gamma = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_buffer_smaller_than_batch() {
        let mut config = DqnConfig::default();
        config.buffer_size = 32;
        assert!(config.validate().is_err());

        config.buffer_size = 64;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_zero_frequencies() {
        let mut config = DqnConfig::default();
        config.train_freq = 0;
        assert!(config.validate().is_err());

        let mut config = DqnConfig::default();
        config.target_update_interval = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_epsilon_range() {
        let mut config = DqnConfig::default();
        config.exploration_final_eps = 1.2;
        let err = config.validate().unwrap_err();
        assert!(err.contains("exploration_final_eps"));
    }

    #[test]
    fn test_epsilon_schedule() {
        let config = DqnConfig::default();
        assert!((config.epsilon(0.0) - 1.0).abs() < 1e-6);
        assert!((config.epsilon(0.05) - 0.525).abs() < 1e-6);
        assert!((config.epsilon(0.1) - 0.05).abs() < 1e-6);
        assert!((config.epsilon(0.7) - 0.05).abs() < 1e-6);
    }
}
