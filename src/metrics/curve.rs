//! Reward curve for the live training plot

/// Trailing rolling mean with a minimum of one observation
///
/// Element `i` is the mean of `values[i + 1 - window ..= i]`, using fewer
/// values at the start of the series.
///
/// # Example
///
/// ```rust
/// use snake_trainer::metrics::rolling_mean;
///
/// assert_eq!(rolling_mean(&[2.0, 4.0, 6.0], 2), vec![2.0, 3.0, 5.0]);
/// ```
pub fn rolling_mean(values: &[f32], window: usize) -> Vec<f32> {
    let window = window.max(1);
    let mut means = Vec::with_capacity(values.len());
    let mut sum = 0.0f64;

    for (i, &value) in values.iter().enumerate() {
        sum += value as f64;
        if i >= window {
            sum -= values[i - window] as f64;
        }
        let count = (i + 1).min(window);
        means.push((sum / count as f64) as f32);
    }

    means
}

/// Episode rewards and their rolling mean, ready to draw
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RewardCurve {
    pub rewards: Vec<f32>,
    pub mean: Vec<f32>,
    pub window: usize,
}

impl RewardCurve {
    pub fn from_rewards(rewards: Vec<f32>, window: usize) -> Self {
        let mean = rolling_mean(&rewards, window);
        Self {
            rewards,
            mean,
            window,
        }
    }

    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    /// Most recent rolling mean, if any episode has finished
    pub fn latest_mean(&self) -> Option<f32> {
        self.mean.last().copied()
    }

    /// Smallest and largest value across both series
    pub fn bounds(&self) -> Option<(f32, f32)> {
        self.rewards
            .iter()
            .chain(self.mean.iter())
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}
