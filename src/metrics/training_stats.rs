//! Training statistics tracking for the DQN learner
//!
//! Tracks episode rewards, lengths, scores and TD losses over a rolling
//! window for progress logging.

use std::collections::VecDeque;

/// Fixed-capacity series that drops its oldest value when full
#[derive(Debug, Clone)]
struct Rolling<T> {
    values: VecDeque<T>,
    capacity: usize,
}

impl<T: Copy + Into<f64>> Rolling<T> {
    fn new(capacity: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    fn push(&mut self, value: T) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    /// 0.0 when empty
    fn mean(&self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.values.iter().map(|&v| v.into()).sum();
        (sum / self.values.len() as f64) as f32
    }
}

/// Training statistics tracker with rolling averages
///
/// # Example
///
/// ```rust
/// use snake_trainer::metrics::TrainingStats;
///
/// let mut stats = TrainingStats::new(100);
///
/// stats.record_episode(15.5, 150, 5);
/// stats.record_update(0.02);
///
/// assert_eq!(stats.total_episodes(), 1);
/// assert!(stats.format_summary().starts_with("Episodes: 1"));
/// ```
#[derive(Debug, Clone)]
pub struct TrainingStats {
    rewards: Rolling<f32>,
    lengths: Rolling<u32>,
    scores: Rolling<u32>,
    td_losses: Rolling<f32>,
    total_episodes: usize,
    /// Steps in completed episodes only
    total_steps: usize,
    total_updates: usize,
    window_size: usize,
}

impl TrainingStats {
    pub fn new(window_size: usize) -> Self {
        Self {
            rewards: Rolling::new(window_size),
            lengths: Rolling::new(window_size),
            scores: Rolling::new(window_size),
            td_losses: Rolling::new(window_size),
            total_episodes: 0,
            total_steps: 0,
            total_updates: 0,
            window_size,
        }
    }

    /// Record a finished episode
    pub fn record_episode(&mut self, reward: f32, length: usize, score: u32) {
        self.rewards.push(reward);
        self.lengths.push(u32::try_from(length).unwrap_or(u32::MAX));
        self.scores.push(score);
        self.total_episodes += 1;
        self.total_steps += length;
    }

    /// Record the loss of one gradient update
    pub fn record_update(&mut self, td_loss: f32) {
        self.td_losses.push(td_loss);
        self.total_updates += 1;
    }

    pub fn mean_episode_reward(&self) -> f32 {
        self.rewards.mean()
    }

    pub fn mean_episode_length(&self) -> f32 {
        self.lengths.mean()
    }

    pub fn mean_episode_score(&self) -> f32 {
        self.scores.mean()
    }

    /// Best score in the current window
    pub fn max_episode_score(&self) -> u32 {
        self.scores.values.iter().copied().max().unwrap_or(0)
    }

    pub fn mean_td_loss(&self) -> f32 {
        self.td_losses.mean()
    }

    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn total_updates(&self) -> usize {
        self.total_updates
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// One-line progress summary
    ///
    /// ```text
    /// Episodes: 1 | Steps: 150 | Reward: 15.50 | Score: 5.00 (max 5) | Len: 150.0 | Loss: 0.0200
    /// ```
    pub fn format_summary(&self) -> String {
        format!(
            "Episodes: {} | Steps: {} | Reward: {:.2} | Score: {:.2} (max {}) | Len: {:.1} | Loss: {:.4}",
            self.total_episodes,
            self.total_steps,
            self.mean_episode_reward(),
            self.mean_episode_score(),
            self.max_episode_score(),
            self.mean_episode_length(),
            self.mean_td_loss(),
        )
    }
}
