//! Checkpointing the model from anywhere in the process
//!
//! A single [`CheckpointCoordinator`] is shared by the supervisor, the
//! training monitor, the signal listeners and the exit guard.

pub mod coordinator;
pub mod signals;

pub use coordinator::{CheckpointCoordinator, ExitGuard, SaveReason};
pub use signals::{ExitFn, SignalHandler};
