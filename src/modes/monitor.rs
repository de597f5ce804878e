//! Per-step training hook: live reward plot and user stop requests

use std::path::PathBuf;
use std::sync::Arc;

use crate::checkpoint::{CheckpointCoordinator, SaveReason};
use crate::input::{EventSource, UiEvent};
use crate::metrics::RewardCurve;
use crate::render::PlotSurface;
use crate::rl::{HookSignal, StepHook, read_episode_rewards};

/// Refresh the plot every N timesteps
pub const DEFAULT_CHECK_FREQ: usize = 2000;

/// Episodes in the rolling mean
pub const DEFAULT_PLOT_WINDOW: usize = 100;

/// Watches training from inside the learner's step loop
///
/// - Initializes the plot surface on the first step
/// - Every `check_freq` steps, re-reads the episode log and redraws the
///   reward curve with its rolling mean
/// - Every step, polls the event source: closing the display saves a
///   `window_close` checkpoint and stops training, Ctrl-C interrupts it
///
/// I/O problems never stop training; they are logged at debug level.
pub struct TrainingMonitor {
    episode_log: PathBuf,
    coordinator: Arc<CheckpointCoordinator>,
    surface: Box<dyn PlotSurface>,
    events: Option<Box<dyn EventSource>>,
    check_freq: usize,
    window: usize,
    initialized: bool,
}

impl TrainingMonitor {
    pub fn new(
        episode_log: impl Into<PathBuf>,
        coordinator: Arc<CheckpointCoordinator>,
        surface: Box<dyn PlotSurface>,
    ) -> Self {
        Self {
            episode_log: episode_log.into(),
            coordinator,
            surface,
            events: None,
            check_freq: DEFAULT_CHECK_FREQ,
            window: DEFAULT_PLOT_WINDOW,
            initialized: false,
        }
    }

    pub fn with_events(mut self, events: Box<dyn EventSource>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn with_check_freq(mut self, check_freq: usize) -> Self {
        self.check_freq = check_freq.max(1);
        self
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window.max(1);
        self
    }

    fn refresh_plot(&mut self) {
        let rewards = match read_episode_rewards(&self.episode_log) {
            Ok(rewards) => rewards,
            Err(e) => {
                log::debug!("episode log not readable: {:#}", e);
                return;
            }
        };
        if rewards.is_empty() {
            return;
        }

        let curve = RewardCurve::from_rewards(rewards, self.window);
        if let Err(e) = self.surface.draw(&curve) {
            log::debug!("failed to draw reward curve: {:#}", e);
        }
    }

    fn poll_event(&mut self) -> Option<UiEvent> {
        let events = self.events.as_mut()?;
        match events.poll() {
            Ok(event) => event,
            Err(e) => {
                log::debug!("event polling failed: {:#}", e);
                None
            }
        }
    }
}

impl StepHook for TrainingMonitor {
    fn on_step(&mut self, timestep: usize) -> HookSignal {
        if !self.initialized {
            self.initialized = true;
            if let Err(e) = self.surface.init() {
                log::warn!("plot surface unavailable: {:#}", e);
            }
        }

        if timestep % self.check_freq == 0 {
            self.refresh_plot();
        }

        match self.poll_event() {
            Some(UiEvent::Close) => {
                log::info!("display closed by user, saving model and stopping training");
                self.coordinator.save(SaveReason::WindowClose);
                HookSignal::Stop
            }
            Some(UiEvent::Interrupt) => {
                log::warn!("interrupt requested from the terminal");
                HookSignal::Interrupt
            }
            None => HookSignal::Continue,
        }
    }
}
