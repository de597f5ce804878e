pub mod events;
pub mod handler;

pub use events::{EventSource, TerminalEvents};
pub use handler::{InputHandler, UiEvent};
