//! Top-level orchestrator port.
//!
//! Composes the browser port, the page port, and the run bundle into one
//! causally ordered startup/shutdown protocol:
//!
//! ```text
//! init ──────────▶ browser.init ─▶ browser.ready ─▶ ready
//! run.start ─┬───▶ page.init ────▶ page.ready ────▶ run.started
//!            └ (combined with remembered init params + process handle)
//! run.stop ──────▶ page.terminate ─▶ page.terminated ─▶ run.stopped
//! run.stopped / terminate ─▶ browser.terminate ─▶ browser.terminated ─▶ terminated
//! ```
//!
//! The inner-before-outer teardown order is enforced by this wiring alone:
//! nothing tears the page down before `run.stop`/`terminate`, and the
//! browser teardown is only reachable from `run.stopped` (which requires
//! the page to be Terminated) or from an explicit `terminate`.

use std::sync::Arc;

use rigging_runtime::{Circuit, direct, latest_map, map_to};

use crate::browser::BrowserPort;
use crate::driver::BrowserDriver;
use crate::page::PagePort;
use crate::params::{RiggingParams, RunParams};
use crate::port::{LifecyclePort, RunPort};

/// The orchestrator: one lifecycle bundle over the whole two-tier resource.
pub struct RiggingPort {
    pub port: LifecyclePort<RiggingParams>,
    pub run: RunPort,
    pub browser: BrowserPort,
    pub page: PagePort,
}

impl RiggingPort {
    pub fn new() -> Self {
        Self {
            port: LifecyclePort::new(),
            run: RunPort::new(),
            browser: BrowserPort::new(),
            page: PagePort::new(),
        }
    }

    /// Builds the complete circuit for this port tree.
    ///
    /// The returned [`Circuit`] must be driven (`run().await`) for any
    /// channel to move; dropping it tears all wiring down.
    pub fn circuit(&self, driver: Arc<dyn BrowserDriver>) -> Circuit {
        let mut circuit = Circuit::new();
        self.browser.circuit(driver, &mut circuit);
        self.page.circuit(&mut circuit);

        map_to(&mut circuit, &self.port.init, &self.browser.port.init, |params: RiggingParams| {
            params.browser()
        });
        map_to(&mut circuit, &self.browser.port.ready, &self.port.ready, |_| {
            tracing::debug!("orchestrator ready");
        });

        // run.start is combined with the remembered init params and the
        // process handle captured at launch time. Before both exist the
        // combinator does not fire: a premature start is dropped, never
        // buffered.
        latest_map(
            &mut circuit,
            &self.run.start,
            (self.port.init.clone(), self.browser.process.clone()),
            &self.page.port.init,
            |overrides: RunParams, (params, process)| params.page(&overrides, process),
        );
        map_to(&mut circuit, &self.page.port.ready, &self.run.started, |_| ());

        direct(&mut circuit, &self.run.stop, &self.page.port.terminate);
        map_to(&mut circuit, &self.page.port.terminated, &self.run.stopped, |_| ());

        map_to(&mut circuit, &self.run.stopped, &self.browser.port.terminate, |_| ());
        direct(&mut circuit, &self.port.terminate, &self.browser.port.terminate);
        direct(&mut circuit, &self.browser.port.terminated, &self.port.terminated);

        // Both tiers' close reports surface on the top-level info channel.
        direct(&mut circuit, &self.browser.port.info, &self.port.info);
        direct(&mut circuit, &self.page.port.info, &self.port.info);

        circuit
    }
}

impl Default for RiggingPort {
    fn default() -> Self {
        Self::new()
    }
}
