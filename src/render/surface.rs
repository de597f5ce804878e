//! Targets for the live reward plot

use anyhow::Result;

use super::SharedDashboard;
use crate::metrics::RewardCurve;

/// Somewhere the training monitor can draw the reward curve
pub trait PlotSurface {
    /// Prepare the surface. Called once, before the first draw.
    fn init(&mut self) -> Result<()>;

    /// Replace the displayed curve
    fn draw(&mut self, curve: &RewardCurve) -> Result<()>;
}

/// Headless surface that logs a one-line summary of each refresh
#[derive(Debug, Default)]
pub struct LogSurface;

impl PlotSurface for LogSurface {
    fn init(&mut self) -> Result<()> {
        log::debug!("no display, reward curve goes to the log");
        Ok(())
    }

    fn draw(&mut self, curve: &RewardCurve) -> Result<()> {
        match (curve.rewards.last(), curve.latest_mean()) {
            (Some(last), Some(mean)) => log::info!(
                "episodes: {} | last reward: {:.2} | mean({}): {:.2}",
                curve.len(),
                last,
                curve.window,
                mean
            ),
            _ => log::debug!("no finished episodes yet"),
        }
        Ok(())
    }
}

/// Draws the curve into the reward panel of the terminal dashboard
pub struct DashboardSurface {
    dashboard: SharedDashboard,
}

impl DashboardSurface {
    pub fn new(dashboard: SharedDashboard) -> Self {
        Self { dashboard }
    }
}

impl PlotSurface for DashboardSurface {
    fn init(&mut self) -> Result<()> {
        self.dashboard.borrow_mut().open()
    }

    fn draw(&mut self, curve: &RewardCurve) -> Result<()> {
        self.dashboard.borrow_mut().show_curve(curve.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_surface_accepts_any_curve() {
        let mut surface = LogSurface;
        surface.init().unwrap();
        surface.draw(&RewardCurve::default()).unwrap();
        surface
            .draw(&RewardCurve::from_rewards(vec![1.0, -10.0], 100))
            .unwrap();
    }
}
