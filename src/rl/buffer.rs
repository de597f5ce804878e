//! Replay buffer for off-policy DQN updates
//!
//! Transitions are kept in a fixed-capacity ring; once full, the oldest
//! transition is overwritten. Minibatches are sampled uniformly with
//! replacement.

use super::observation::{OBSERVATION_SIZE, Observation};
use rand::Rng;

/// A minibatch of transitions, flattened for tensor construction
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// Row-major `[len, OBSERVATION_SIZE]`
    pub observations: Vec<f32>,
    pub actions: Vec<i32>,
    pub rewards: Vec<f32>,
    /// Row-major `[len, OBSERVATION_SIZE]`
    pub next_observations: Vec<f32>,
    /// 1.0 where the episode ended on this transition
    pub dones: Vec<f32>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
struct Transition {
    observation: Observation,
    action: usize,
    reward: f32,
    next_observation: Observation,
    done: bool,
}

/// Experience replay buffer
///
/// # Example
///
/// ```rust
/// use snake_trainer::rl::ReplayBuffer;
///
/// let mut buffer = ReplayBuffer::new(128);
/// buffer.push([0.0; 11], 0, -1.0, [0.0; 11], true);
///
/// assert_eq!(buffer.len(), 1);
/// assert_eq!(buffer.sample(4).len(), 4);
/// ```
pub struct ReplayBuffer {
    transitions: Vec<Transition>,
    /// Next slot to overwrite once the buffer is full
    pos: usize,
    capacity: usize,
}

impl ReplayBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            transitions: Vec::with_capacity(capacity.min(4096)),
            pos: 0,
            capacity,
        }
    }

    /// Add a transition, evicting the oldest one when full
    pub fn push(
        &mut self,
        observation: Observation,
        action: usize,
        reward: f32,
        next_observation: Observation,
        done: bool,
    ) {
        let transition = Transition {
            observation,
            action,
            reward,
            next_observation,
            done,
        };

        if self.transitions.len() < self.capacity {
            self.transitions.push(transition);
        } else {
            self.transitions[self.pos] = transition;
        }
        self.pos = (self.pos + 1) % self.capacity;
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Sample `batch_size` transitions uniformly with replacement.
    ///
    /// Returns an empty batch if the buffer is empty.
    pub fn sample(&self, batch_size: usize) -> Batch {
        let mut rng = rand::thread_rng();
        let indices: Vec<usize> = if self.is_empty() {
            Vec::new()
        } else {
            (0..batch_size)
                .map(|_| rng.gen_range(0..self.transitions.len()))
                .collect()
        };
        self.gather(&indices)
    }

    fn gather(&self, indices: &[usize]) -> Batch {
        let n = indices.len();
        let mut batch = Batch {
            observations: Vec::with_capacity(n * OBSERVATION_SIZE),
            actions: Vec::with_capacity(n),
            rewards: Vec::with_capacity(n),
            next_observations: Vec::with_capacity(n * OBSERVATION_SIZE),
            dones: Vec::with_capacity(n),
        };

        for &i in indices {
            let t = &self.transitions[i];
            batch.observations.extend_from_slice(&t.observation);
            batch.actions.push(t.action as i32);
            batch.rewards.push(t.reward);
            batch.next_observations.extend_from_slice(&t.next_observation);
            batch.dones.push(if t.done { 1.0 } else { 0.0 });
        }

        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(value: f32) -> Observation {
        [value; OBSERVATION_SIZE]
    }

    #[test]
    fn test_new_buffer_is_empty() {
        let buffer = ReplayBuffer::new(10);
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 10);
        assert!(buffer.sample(8).is_empty());
    }

    #[test]
    fn test_push_until_full_then_wraps() {
        let mut buffer = ReplayBuffer::new(3);

        for i in 0..5 {
            buffer.push(obs(i as f32), 0, i as f32, obs(0.0), false);
        }

        assert_eq!(buffer.len(), 3);
        // Rewards 0 and 1 were evicted by 3 and 4
        let mut rewards: Vec<f32> = buffer.transitions.iter().map(|t| t.reward).collect();
        rewards.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(rewards, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_gather_layout() {
        let mut buffer = ReplayBuffer::new(4);
        buffer.push(obs(0.0), 1, 0.5, obs(1.0), false);
        buffer.push(obs(1.0), 2, -10.0, obs(0.0), true);

        let batch = buffer.gather(&[1, 0]);

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.observations.len(), 2 * OBSERVATION_SIZE);
        assert_eq!(batch.observations[0], 1.0);
        assert_eq!(batch.observations[OBSERVATION_SIZE], 0.0);
        assert_eq!(batch.actions, vec![2, 1]);
        assert_eq!(batch.rewards, vec![-10.0, 0.5]);
        assert_eq!(batch.dones, vec![1.0, 0.0]);
        assert_eq!(batch.next_observations[0], 0.0);
    }

    #[test]
    fn test_sample_size() {
        let mut buffer = ReplayBuffer::new(100);
        for _ in 0..10 {
            buffer.push(obs(0.0), 0, 0.0, obs(0.0), false);
        }

        let batch = buffer.sample(64);
        assert_eq!(batch.len(), 64);
        assert_eq!(batch.next_observations.len(), 64 * OBSERVATION_SIZE);
    }
}
