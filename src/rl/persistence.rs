//! Model persistence for saving and loading trained agents
//!
//! Network weights go through Burn's record system; training metadata is
//! stored next to them as JSON.

use super::{DqnAgent, DqnConfig, QNetwork, QNetworkConfig};
use anyhow::{Context, Result};
use burn::{
    module::Module,
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder},
    tensor::backend::{AutodiffBackend, Backend},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Metadata saved with the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// DQN configuration used during training
    pub dqn_config: DqnConfig,

    /// Environment steps taken when the model was saved
    pub training_steps: usize,

    /// Gradient updates performed
    pub updates: usize,

    /// Episodes finished
    pub episodes: usize,

    /// Version identifier for compatibility checking
    pub version: String,
}

impl ModelMetadata {
    pub fn new(dqn_config: DqnConfig, training_steps: usize, updates: usize, episodes: usize) -> Self {
        Self {
            dqn_config,
            training_steps,
            updates,
            episodes,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Save an agent's online network and metadata
///
/// The model is saved in two files:
/// - `<path>.mpk` - Network weights (Burn record format)
/// - `<path>.meta.json` - Metadata as JSON
///
/// Parent directories are created if missing.
pub fn save_model<B: AutodiffBackend>(agent: &DqnAgent<B>, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    let record = agent.network().clone().into_record();
    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    recorder
        .record(record, path.to_path_buf())
        .context("Failed to save network weights")?;

    let metadata = ModelMetadata::new(
        agent.config().clone(),
        agent.timesteps(),
        agent.updates(),
        agent.episodes(),
    );

    let meta_path = path.with_extension("meta.json");
    let meta_json =
        serde_json::to_string_pretty(&metadata).context("Failed to serialize metadata")?;
    std::fs::write(&meta_path, meta_json)
        .with_context(|| format!("Failed to write metadata to {:?}", meta_path))?;

    Ok(())
}

/// Load a saved network and its metadata
///
/// `path` is the same path given to [`save_model`], without extension.
pub fn load_network<B: Backend>(
    path: &Path,
    device: &B::Device,
) -> Result<(QNetwork<B>, ModelMetadata)> {
    let meta_path = path.with_extension("meta.json");
    let meta_json = std::fs::read_to_string(&meta_path)
        .with_context(|| format!("Failed to read metadata from {:?}", meta_path))?;
    let metadata: ModelMetadata =
        serde_json::from_str(&meta_json).context("Failed to deserialize metadata")?;

    let network = QNetworkConfig::new(metadata.dqn_config.hidden_dim).init::<B>(device);

    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    let record = recorder
        .load(path.to_path_buf(), device)
        .with_context(|| format!("Failed to load network weights from {:?}", path))?;

    Ok((network.load_record(record), metadata))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rl::observation::OBSERVATION_SIZE;
    use crate::rl::{InferenceBackend, TrainingBackend, default_device};
    use burn::module::AutodiffModule;
    use burn::tensor::Tensor;
    use tempfile::TempDir;

    #[test]
    fn test_metadata_serialization() {
        let metadata = ModelMetadata::new(DqnConfig::default(), 1000, 225, 40);

        let json = serde_json::to_string(&metadata).unwrap();
        let deserialized: ModelMetadata = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.training_steps, 1000);
        assert_eq!(deserialized.updates, 225);
        assert_eq!(deserialized.episodes, 40);
        assert_eq!(deserialized.dqn_config.batch_size, 64);
    }

    #[test]
    fn test_save_and_load_preserves_outputs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/snake_dqn_model_final");
        let device = default_device();

        let config = DqnConfig {
            hidden_dim: 8,
            ..DqnConfig::default()
        };
        let agent = DqnAgent::<TrainingBackend>::new(config, device.clone()).unwrap();
        save_model(&agent, &path).unwrap();

        let (restored, metadata) = load_network::<InferenceBackend>(&path, &device).unwrap();
        assert_eq!(metadata.dqn_config.hidden_dim, 8);
        assert_eq!(metadata.training_steps, 0);

        let input = Tensor::<InferenceBackend, 2>::ones([2, OBSERVATION_SIZE], &device);
        let expected: Vec<f32> = agent
            .network()
            .valid()
            .forward(input.clone())
            .into_data()
            .to_vec()
            .unwrap();
        let actual: Vec<f32> = restored.forward(input).into_data().to_vec().unwrap();
        assert_eq!(expected, actual);
    }

    #[test]
    fn test_load_missing_model_fails() {
        let dir = TempDir::new().unwrap();
        let result = load_network::<InferenceBackend>(&dir.path().join("absent"), &default_device());
        assert!(result.is_err());
    }
}
