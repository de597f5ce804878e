//! DQN (Deep Q-Network) learner
//!
//! [`DqnAgent`] owns the online and target networks, the optimizer and the
//! replay buffer. [`DqnTrainer`] drives it against an [`Environment`] and is
//! the model handle registered for checkpointing.

use super::action::ACTION_COUNT;
use super::buffer::ReplayBuffer;
use super::config::DqnConfig;
use super::environment::Environment;
use super::learner::{HookSignal, LearnOutcome, Learner, StepHook, TrainError, Trainable};
use super::network::{QNetwork, QNetworkConfig};
use super::observation::{OBSERVATION_SIZE, Observation};
use super::persistence::save_model;
use crate::metrics::TrainingStats;
use anyhow::anyhow;
use burn::{
    grad_clipping::GradientClippingConfig,
    module::AutodiffModule,
    optim::{Adam, AdamConfig, GradientsParams, Optimizer, adaptor::OptimizerAdaptor},
    tensor::{ElementConversion, Int, Tensor, backend::AutodiffBackend},
};
use rand::Rng;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// DQN agent with experience replay and a periodically synced target network
///
/// # Example
///
/// ```rust
/// use snake_trainer::rl::{DqnAgent, DqnConfig, TrainingBackend, default_device};
///
/// let agent = DqnAgent::<TrainingBackend>::new(DqnConfig::default(), default_device()).unwrap();
/// let action = agent.select_action(&[0.0; 11], 0.0);
/// assert!(action < 3);
/// ```
pub struct DqnAgent<B: AutodiffBackend> {
    /// Online Q-network, updated every training step
    network: QNetwork<B>,

    /// Frozen copy used for bootstrapped targets
    target: QNetwork<B::InnerBackend>,

    optim: OptimizerAdaptor<Adam, QNetwork<B>, B>,

    config: DqnConfig,

    buffer: ReplayBuffer,

    /// Environment steps taken across all `learn` calls
    timesteps: usize,

    /// Gradient updates performed
    updates: usize,

    /// Episodes finished
    episodes: usize,

    device: B::Device,
}

impl<B: AutodiffBackend> DqnAgent<B> {
    /// Create an agent with freshly initialized networks
    pub fn new(config: DqnConfig, device: B::Device) -> anyhow::Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow!("Invalid DQN configuration: {}", e))?;

        let network = QNetworkConfig::new(config.hidden_dim).init::<B>(&device);
        Ok(Self::from_network(network, config, device))
    }

    /// Wrap an existing network, for example one restored from disk
    pub fn from_network(network: QNetwork<B>, config: DqnConfig, device: B::Device) -> Self {
        let optim = AdamConfig::new()
            .with_grad_clipping(Some(GradientClippingConfig::Norm(config.max_grad_norm)))
            .init();
        let target = network.valid();
        let buffer = ReplayBuffer::new(config.buffer_size);

        Self {
            network,
            target,
            optim,
            config,
            buffer,
            timesteps: 0,
            updates: 0,
            episodes: 0,
            device,
        }
    }

    /// Epsilon-greedy action selection
    pub fn select_action(&self, observation: &Observation, epsilon: f32) -> usize {
        let mut rng = rand::thread_rng();
        if rng.r#gen::<f32>() < epsilon {
            return rng.gen_range(0..ACTION_COUNT);
        }
        self.greedy_action(observation)
    }

    /// Action with the highest Q-value
    pub fn greedy_action(&self, observation: &Observation) -> usize {
        let network = self.network.valid();
        let input = Tensor::<B::InnerBackend, 1>::from_floats(observation.as_slice(), &self.device)
            .reshape([1, OBSERVATION_SIZE]);

        let best = network.forward(input).argmax(1);
        best.into_scalar().elem::<i64>() as usize
    }

    /// Store a transition in the replay buffer
    pub fn remember(
        &mut self,
        observation: Observation,
        action: usize,
        reward: f32,
        next_observation: Observation,
        terminated: bool,
    ) {
        self.buffer
            .push(observation, action, reward, next_observation, terminated);
    }

    /// One gradient step on a sampled minibatch
    ///
    /// Returns the TD loss, or `None` while the buffer holds fewer transitions
    /// than one batch.
    pub fn train_step(&mut self) -> Option<f32> {
        if self.buffer.len() < self.config.batch_size {
            return None;
        }

        let batch = self.buffer.sample(self.config.batch_size);
        let n = batch.len();

        let observations = Tensor::<B, 1>::from_floats(batch.observations.as_slice(), &self.device)
            .reshape([n, OBSERVATION_SIZE]);
        let actions = Tensor::<B, 1, Int>::from_ints(batch.actions.as_slice(), &self.device);
        let next_observations = Tensor::<B::InnerBackend, 1>::from_floats(
            batch.next_observations.as_slice(),
            &self.device,
        )
        .reshape([n, OBSERVATION_SIZE]);
        let rewards = Tensor::<B::InnerBackend, 1>::from_floats(batch.rewards.as_slice(), &self.device);
        let dones = Tensor::<B::InnerBackend, 1>::from_floats(batch.dones.as_slice(), &self.device);

        // r + gamma * max_a' Q_target(s', a') * (1 - done)
        let next_q = self
            .target
            .forward(next_observations)
            .max_dim(1)
            .squeeze::<1>(1);
        let targets = rewards + next_q * dones.neg().add_scalar(1.0) * self.config.gamma;

        let q_values = self.network.forward(observations);
        let loss = self.compute_td_loss(&q_values, &actions, Tensor::from_inner(targets));

        let grads = GradientsParams::from_grads(loss.backward(), &self.network);
        self.network = self
            .optim
            .step(self.config.learning_rate, self.network.clone(), grads);
        self.updates += 1;

        Some(loss.into_scalar().elem::<f32>())
    }

    /// Mean squared error between the Q-values of the taken actions and the targets
    fn compute_td_loss(
        &self,
        q_values: &Tensor<B, 2>,
        actions: &Tensor<B, 1, Int>,
        targets: Tensor<B, 1>,
    ) -> Tensor<B, 1> {
        let taken = q_values
            .clone()
            .gather(1, actions.clone().unsqueeze_dim(1))
            .squeeze::<1>(1);
        let diff = taken - targets;
        (diff.clone() * diff).mean()
    }

    /// Copy the online network weights into the target network
    pub fn sync_target(&mut self) {
        self.target = self.network.valid();
    }

    pub fn network(&self) -> &QNetwork<B> {
        &self.network
    }

    pub fn config(&self) -> &DqnConfig {
        &self.config
    }

    pub fn timesteps(&self) -> usize {
        self.timesteps
    }

    pub fn updates(&self) -> usize {
        self.updates
    }

    pub fn episodes(&self) -> usize {
        self.episodes
    }

    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }
}

/// Thread-safe DQN learner
///
/// The agent sits behind a mutex that the training loop takes once per
/// environment step, so a checkpoint requested from a signal listener waits
/// for at most one step.
pub struct DqnTrainer<B: AutodiffBackend> {
    agent: Mutex<DqnAgent<B>>,
}

impl<B: AutodiffBackend> DqnTrainer<B> {
    pub fn new(config: DqnConfig, device: B::Device) -> anyhow::Result<Self> {
        Ok(Self::from_agent(DqnAgent::new(config, device)?))
    }

    pub fn from_agent(agent: DqnAgent<B>) -> Self {
        Self {
            agent: Mutex::new(agent),
        }
    }

    /// Lock the agent, recovering it if a previous holder panicked
    pub fn agent(&self) -> MutexGuard<'_, DqnAgent<B>> {
        self.agent.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<B: AutodiffBackend> Trainable for DqnTrainer<B> {
    fn save(&self, path: &Path) -> anyhow::Result<()> {
        save_model(&*self.agent(), path)
    }
}

impl<B: AutodiffBackend> Learner for DqnTrainer<B> {
    fn learn(
        &self,
        env: &mut dyn Environment,
        total_steps: usize,
        hook: &mut dyn StepHook,
    ) -> Result<LearnOutcome, TrainError> {
        let log_interval = self.agent().config.log_interval;
        let mut stats = TrainingStats::new(100);
        let mut observation = env.reset(None)?;
        let mut episode_reward = 0.0;
        let mut episode_length = 0;

        log::info!("training DQN for {} steps", total_steps);

        for step in 1..=total_steps {
            let progress = step as f32 / total_steps as f32;

            let result = {
                let mut agent = self.agent();
                let config = agent.config.clone();

                let action = agent.select_action(&observation, config.epsilon(progress));
                let result = env.step(action)?;
                agent.remember(
                    observation,
                    action,
                    result.reward,
                    result.observation,
                    result.terminated,
                );
                agent.timesteps += 1;

                if step > config.learning_starts && step % config.train_freq == 0 {
                    if let Some(loss) = agent.train_step() {
                        if !loss.is_finite() {
                            return Err(TrainError::Model(anyhow!(
                                "TD loss diverged at step {}: {}",
                                step,
                                loss
                            )));
                        }
                        stats.record_update(loss);
                    }
                }

                if step % config.target_update_interval == 0 {
                    agent.sync_target();
                    log::debug!("target network synced at step {}", step);
                }

                if result.done() {
                    agent.episodes += 1;
                }
                result
            };

            env.render();
            episode_reward += result.reward;
            episode_length += 1;

            if result.done() {
                stats.record_episode(episode_reward, episode_length, result.info.score);
                if stats.total_episodes() % log_interval == 0 {
                    log::info!(
                        "[step {}/{}] eps {:.3} | {}",
                        step,
                        total_steps,
                        self.agent().config.epsilon(progress),
                        stats.format_summary()
                    );
                }
                episode_reward = 0.0;
                episode_length = 0;
                observation = env.reset(None)?;
            } else {
                observation = result.observation;
            }

            match hook.on_step(step) {
                HookSignal::Continue => {}
                HookSignal::Stop => {
                    log::info!("training stopped by monitor at step {}", step);
                    return Ok(LearnOutcome::Stopped { steps: step });
                }
                HookSignal::Interrupt => return Err(TrainError::Interrupted),
            }
        }

        log::info!("training finished: {}", stats.format_summary());
        Ok(LearnOutcome::Completed { steps: total_steps })
    }
}
