//! Terminal dashboard shared by the game display and the live reward plot

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::cell::RefCell;
use std::io::{Stderr, stderr};
use std::rc::Rc;

use super::Renderer;
use crate::game::GameState;
use crate::metrics::RewardCurve;

/// Single-threaded handle to the dashboard
pub type SharedDashboard = Rc<RefCell<Dashboard>>;

/// Full-screen terminal UI
///
/// The terminal is taken over lazily on the first draw and restored on
/// [`Dashboard::close`] or drop.
pub struct Dashboard {
    terminal: Option<Terminal<CrosstermBackend<Stderr>>>,
    renderer: Renderer,
    game: Option<GameState>,
    curve: RewardCurve,
}

impl Dashboard {
    pub fn new() -> Self {
        Self {
            terminal: None,
            renderer: Renderer::new(),
            game: None,
            curve: RewardCurve::default(),
        }
    }

    pub fn shared() -> SharedDashboard {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn is_open(&self) -> bool {
        self.terminal.is_some()
    }

    /// Enter raw mode and the alternate screen. No-op if already open.
    pub fn open(&mut self) -> Result<()> {
        if self.terminal.is_some() {
            return Ok(());
        }

        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        self.terminal = Some(terminal);
        Ok(())
    }

    /// Update the game panel and redraw
    pub fn show_game(&mut self, state: &GameState) -> Result<()> {
        self.game = Some(state.clone());
        self.draw()
    }

    /// Update the reward chart and redraw
    pub fn show_curve(&mut self, curve: RewardCurve) -> Result<()> {
        self.curve = curve;
        self.draw()
    }

    fn draw(&mut self) -> Result<()> {
        self.open()?;

        let Self {
            terminal,
            renderer,
            game,
            curve,
        } = self;
        if let Some(terminal) = terminal {
            terminal
                .draw(|frame| renderer.render(frame, game.as_ref(), curve))
                .context("Failed to draw frame")?;
        }
        Ok(())
    }

    /// Restore the terminal. Safe to call more than once.
    pub fn close(&mut self) -> Result<()> {
        let Some(mut terminal) = self.terminal.take() else {
            return Ok(());
        };

        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::debug!("failed to restore terminal: {:#}", e);
        }
    }
}
