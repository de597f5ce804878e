pub mod monitor;
pub mod train;

pub use monitor::TrainingMonitor;
pub use train::{RunOutcome, TrainConfig, TrainMode};
