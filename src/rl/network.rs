//! Q-network for the snake DQN learner
//!
//! # Architecture
//!
//! ```text
//! Input: [batch, 11]
//!   ↓ Linear(11 → hidden) + ReLU
//!   ↓ Linear(hidden → hidden) + ReLU
//!   ↓ Linear(hidden → 3) → Q-value per action
//! ```
//!
//! # Example
//!
//! ```rust
//! use snake_trainer::rl::QNetworkConfig;
//! use burn::backend::ndarray::NdArrayDevice;
//! use burn::backend::NdArray;
//! use burn::tensor::Tensor;
//!
//! let device = NdArrayDevice::default();
//! let network = QNetworkConfig::new(64).init::<NdArray<f32>>(&device);
//!
//! let q_values = network.forward(Tensor::zeros([4, 11], &device));
//! assert_eq!(q_values.dims(), [4, 3]);
//! ```

use super::action::ACTION_COUNT;
use super::observation::OBSERVATION_SIZE;
use burn::{
    module::Module,
    nn::{Linear, LinearConfig},
    tensor::{Tensor, activation::relu, backend::Backend},
};

/// Configuration for the Q-network
#[derive(Debug, Clone)]
pub struct QNetworkConfig {
    /// Observation length (11 for the snake features)
    pub input_dim: usize,

    /// Width of the two hidden layers
    pub hidden_dim: usize,

    /// Number of discrete actions (3: straight, right, left)
    pub num_actions: usize,
}

impl QNetworkConfig {
    pub fn new(hidden_dim: usize) -> Self {
        Self {
            input_dim: OBSERVATION_SIZE,
            hidden_dim,
            num_actions: ACTION_COUNT,
        }
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> QNetwork<B> {
        QNetwork {
            fc1: LinearConfig::new(self.input_dim, self.hidden_dim).init(device),
            fc2: LinearConfig::new(self.hidden_dim, self.hidden_dim).init(device),
            q_head: LinearConfig::new(self.hidden_dim, self.num_actions).init(device),
        }
    }
}

/// Fully connected Q-value estimator
#[derive(Module, Debug)]
pub struct QNetwork<B: Backend> {
    fc1: Linear<B>,
    fc2: Linear<B>,
    q_head: Linear<B>,
}

impl<B: Backend> QNetwork<B> {
    /// Map a batch of observations `[batch, 11]` to Q-values `[batch, 3]`
    pub fn forward(&self, observation: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = relu(self.fc1.forward(observation));
        let x = relu(self.fc2.forward(x));
        self.q_head.forward(x)
    }
}
