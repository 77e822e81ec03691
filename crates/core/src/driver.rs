//! Driver capability boundary.
//!
//! The orchestration core never talks to a browser directly; it consumes an
//! opaque driver capability that can launch a controlling process and hand
//! out page handles. Concrete drivers (CDP, Playwright server, the scripted
//! fake in [`crate::scripted`]) implement these traits at the I/O boundary
//! and construct the [`Error`](rigging_runtime::Error) taxonomy there.
//!
//! Native lifecycle events are emitted on plain broadcast channels; the port
//! circuits bridge them into sockets with `from_event`.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use rigging_runtime::Result;

use crate::params::{Goto, LaunchParams, Viewport};

/// Outcome of closing a process or page handle.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseResult {
    /// Whether the handle shut down cleanly.
    pub clean: bool,
    /// Driver-specific detail (exit status, close reason).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Descriptor of a newly created target within the process.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetInfo {
    /// Target kind as reported by the driver ("page", "worker", ...).
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A network request observed on a page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestInfo {
    pub method: String,
    pub url: String,
}

/// A network response observed on a page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseInfo {
    pub url: String,
    pub status: u16,
}

/// A JavaScript dialog raised by a page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogInfo {
    /// Dialog kind ("alert", "confirm", "prompt", "beforeunload").
    pub kind: String,
    pub message: String,
}

/// Native events emitted by a controlling process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProcessEvent {
    TargetCreated(TargetInfo),
    /// The process ended, whether by a solicited close or out-of-band.
    Disconnected,
}

/// Native events emitted by a page handle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PageEvent {
    Load,
    /// The page ended, whether by a solicited close or a user closing the tab.
    Close,
    Request(RequestInfo),
    Response(ResponseInfo),
    Dialog(DialogInfo),
}

/// Capability to launch a controlling browser process.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Launches the process. May fail with [`Error::Launch`](rigging_runtime::Error::Launch).
    async fn launch(&self, params: &LaunchParams) -> Result<Arc<dyn ProcessHandle>>;
}

/// A running controlling process.
///
/// Contract: the driver must emit [`ProcessEvent::Disconnected`] whenever
/// the process ends, including after a solicited [`close`](Self::close) -
/// the browser port derives its `terminated` from that event alone.
#[async_trait]
pub trait ProcessHandle: Send + Sync {
    /// Opens a new page within the process.
    async fn new_page(&self) -> Result<Arc<dyn PageHandle>>;

    /// Returns the pages currently open, oldest first.
    async fn pages(&self) -> Result<Vec<Arc<dyn PageHandle>>>;

    /// Closes the process.
    async fn close(&self) -> Result<CloseResult>;

    /// Subscribes to native process events. Events emitted before the
    /// subscription are not replayed.
    fn events(&self) -> broadcast::Receiver<ProcessEvent>;
}

/// An operational page handle within a process.
///
/// Contract: the driver must emit [`PageEvent::Close`] whenever the page
/// ends, including after a solicited [`close`](Self::close).
#[async_trait]
pub trait PageHandle: Send + Sync {
    async fn set_user_agent(&self, user_agent: &str) -> Result<()>;

    async fn set_viewport(&self, viewport: &Viewport) -> Result<()>;

    async fn goto(&self, goto: &Goto) -> Result<()>;

    /// Closes the page.
    async fn close(&self) -> Result<CloseResult>;

    /// Subscribes to native page events.
    fn events(&self) -> broadcast::Receiver<PageEvent>;
}
