//! Error types for the rigging runtime.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur anywhere in the lifecycle fabric.
///
/// Driver implementations construct these at the I/O boundary; processor
/// combinators propagate them, and the first unrecovered error terminates
/// the owning [`Circuit`](crate::Circuit).
#[derive(Debug, Error)]
pub enum Error {
    /// The outer browser process failed to start.
    #[error("failed to launch browser process: {0}")]
    Launch(String),

    /// A page handle could not be created or attached.
    #[error("failed to acquire page handle: {0}")]
    HandleAcquisition(String),

    /// A configuration step (user agent, viewport, navigation) was rejected.
    #[error("page configuration rejected at {step}: {message}")]
    Configuration {
        /// Which step failed ("set_user_agent", "set_viewport", "goto").
        step: &'static str,
        message: String,
    },

    /// A close operation was rejected by the driver.
    #[error("close rejected: {0}")]
    Termination(String),

    /// A close operation did not complete within the configured bound.
    #[error("close did not complete within {timeout:?}")]
    CloseTimeout { timeout: Duration },

    /// A wiring task panicked or was lost by the supervisor.
    #[error("wiring task failed: {0}")]
    Wiring(String),
}

impl Error {
    /// Returns true if this error is the bounded-close timeout.
    pub fn is_close_timeout(&self) -> bool {
        matches!(self, Error::CloseTimeout { .. })
    }

    /// Returns true if this error came from a close operation,
    /// bounded or not.
    pub fn is_termination(&self) -> bool {
        matches!(self, Error::Termination(_) | Error::CloseTimeout { .. })
    }
}
