//! Backend type aliases and device management
//!
//! The snake observation is 11 floats and the Q-network is a small MLP, so
//! the CPU NdArray backend is all training needs.

use burn::backend::{
    Autodiff,
    ndarray::{NdArray, NdArrayDevice},
};

/// Autodiff-enabled backend used by the DQN learner
pub type TrainingBackend = Autodiff<NdArray<f32>>;

/// Plain backend for loading and evaluating saved networks
pub type InferenceBackend = NdArray<f32>;

/// Get the default device for computation (CPU)
///
/// # Example
///
/// ```rust
/// use snake_trainer::rl::default_device;
///
/// let device = default_device();
/// ```
pub fn default_device() -> NdArrayDevice {
    NdArrayDevice::default()
}
