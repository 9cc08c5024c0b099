//! Snapshot producers and the runtime that drives them.

pub mod config_watch;
pub mod poll;
pub mod push;
pub mod runtime;

pub use poll::{FilePoller, PollResult};
pub use push::router;
pub use runtime::{build_runtime, shutdown_signal, Agent};
