pub mod curve;
pub mod training_stats;

pub use curve::{RewardCurve, rolling_mean};
pub use training_stats::TrainingStats;
