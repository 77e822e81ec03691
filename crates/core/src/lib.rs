//! rigging: reactive lifecycle orchestration for a two-tier browser
//! resource.
//!
//! An outer controlling process (the browser) owns zero or more inner
//! operational handles (pages). This crate exposes that lifecycle as a
//! fabric of typed event channels - lifecycle ports wired together by the
//! combinators in [`rigging_runtime`] - instead of imperative start/stop
//! calls. The concrete browser driver is an injected capability
//! ([`BrowserDriver`]); a deterministic [`scripted`] driver is included for
//! tests and demos.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use rigging::{RiggingParams, RiggingPort, RunParams, Goto, LaunchParams};
//! use rigging::scripted::ScriptedDriver;
//!
//! #[tokio::main]
//! async fn main() -> rigging::Result<()> {
//!     let rig = RiggingPort::new();
//!     let circuit = rig.circuit(Arc::new(ScriptedDriver::new()));
//!
//!     let mut ready = rig.port.ready.subscribe();
//!     let mut started = rig.run.started.subscribe();
//!     let mut terminated = rig.port.terminated.subscribe();
//!     let driver = tokio::spawn(circuit.run());
//!
//!     rig.port.init.emit(RiggingParams {
//!         launch: Some(LaunchParams::default()),
//!         ..Default::default()
//!     });
//!     ready.recv().await;
//!
//!     rig.run.start.emit(RunParams {
//!         goto: Some(Goto::new("https://example.com")),
//!         ..Default::default()
//!     });
//!     started.recv().await;
//!
//!     rig.run.stop.emit(());
//!     terminated.recv().await;
//!     drop(driver);
//!     Ok(())
//! }
//! ```

pub mod browser;
pub mod driver;
pub mod orchestrator;
pub mod page;
pub mod params;
pub mod port;
pub mod scripted;

pub use browser::{BrowserEvents, BrowserPort};
pub use driver::{
    BrowserDriver, CloseResult, DialogInfo, PageEvent, PageHandle, ProcessEvent, ProcessHandle,
    RequestInfo, ResponseInfo, TargetInfo,
};
pub use orchestrator::RiggingPort;
pub use page::{PageEvents, PagePort};
pub use params::{
    BrowserParams, Goto, LaunchParams, PageParams, RiggingParams, RunParams, Viewport, WaitUntil,
};
pub use port::{ConfigStep, InfoEvent, LifecyclePort, RunPort};

// Re-export the runtime fabric
pub use rigging_runtime;
pub use rigging_runtime::{Circuit, Error, Result, Socket, SocketRx};
