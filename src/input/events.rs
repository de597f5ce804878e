use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use std::time::Duration;

use super::{InputHandler, UiEvent};

/// Non-blocking source of user events
pub trait EventSource {
    /// Return the first pending event, if any, without waiting
    fn poll(&mut self) -> Result<Option<UiEvent>>;
}

/// Reads key presses from the terminal with a zero timeout
#[derive(Default)]
pub struct TerminalEvents {
    handler: InputHandler,
}

impl TerminalEvents {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSource for TerminalEvents {
    fn poll(&mut self) -> Result<Option<UiEvent>> {
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                // Only process key press events, not release
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if let Some(ui_event) = self.handler.handle_key_event(key) {
                    return Ok(Some(ui_event));
                }
            }
        }
        Ok(None)
    }
}
