//! Lifecycle and run channel bundles.
//!
//! A port is a plain struct of named sockets representing one resource's
//! externally observable lifecycle. State sequencing (Uninitialized →
//! Initializing → Ready → Terminating → Terminated) is enforced by the
//! wiring between the sockets, not by a state field: `ready` can only be
//! produced by the completion of the `init`-triggered construction, and
//! `terminated` only by the native close/disconnect bridge.

use rigging_runtime::Socket;

use crate::driver::CloseResult;
use crate::params::RunParams;

/// Diagnostic emissions carried on a port's `info` channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InfoEvent {
    /// Outcome of closing the controlling process.
    BrowserClosed(CloseResult),
    /// Outcome of closing the page handle.
    PageClosed(CloseResult),
}

/// One step of the page configuration sequence, in applied order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigStep {
    /// The handle resolved; `created` distinguishes a fresh page from an
    /// attached one.
    Acquired { created: bool },
    UserAgent,
    Viewport,
    Navigated(String),
}

/// The standard lifecycle channel bundle.
///
/// `P` is the init parameter snapshot; `R` the payload of `ready`
/// (unit for most ports, the ordered configuration diagnostics for the
/// page port).
pub struct LifecyclePort<P, R = ()> {
    /// Input: begin asynchronous construction of the resource.
    pub init: Socket<P>,
    /// Output: construction (and any configuration) completed.
    pub ready: Socket<R>,
    /// Input: begin asynchronous teardown.
    pub terminate: Socket<()>,
    /// Output: the resource is gone, solicited or not.
    pub terminated: Socket<()>,
    /// Output: teardown and diagnostic reports.
    pub info: Socket<InfoEvent>,
}

impl<P, R> LifecyclePort<P, R>
where
    P: Clone + Send + 'static,
    R: Clone + Send + 'static,
{
    pub fn new() -> Self {
        Self {
            init: Socket::default(),
            ready: Socket::default(),
            terminate: Socket::default(),
            terminated: Socket::default(),
            info: Socket::default(),
        }
    }
}

impl<P, R> Default for LifecyclePort<P, R>
where
    P: Clone + Send + 'static,
    R: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// The secondary run bundle: begin/stop a unit of work on an already-ready
/// resource, repeatably, without re-running `init`.
///
/// Pure relay - the orchestrator routes `start`/`stop` into the page port
/// and derives `started`/`stopped` from it; no I/O happens here.
pub struct RunPort {
    pub start: Socket<RunParams>,
    pub started: Socket<()>,
    pub stop: Socket<()>,
    pub stopped: Socket<()>,
}

impl RunPort {
    pub fn new() -> Self {
        Self {
            start: Socket::default(),
            started: Socket::default(),
            stop: Socket::default(),
            stopped: Socket::default(),
        }
    }
}

impl Default for RunPort {
    fn default() -> Self {
        Self::new()
    }
}
