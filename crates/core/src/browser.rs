//! Outer resource port: the controlling browser process.

use std::sync::Arc;

use rigging_runtime::{Circuit, Socket, filter_map, from_event, latest_merge_map, map_to, merge_map};

use crate::driver::{BrowserDriver, ProcessEvent, ProcessHandle, TargetInfo};
use crate::params::{BrowserParams, LaunchParams};
use crate::port::{InfoEvent, LifecyclePort};

/// Native events forwarded from the process.
pub struct BrowserEvents {
    pub targetcreated: Socket<TargetInfo>,
    pub disconnected: Socket<()>,
}

/// Lifecycle port wrapping the controlling process.
///
/// `init` launches, `ready` fires once the launch resolves, `terminate`
/// closes the process and reports the outcome on `info`. A native
/// disconnect - solicited or not - is this port's `terminated`.
pub struct BrowserPort {
    pub port: LifecyclePort<BrowserParams>,
    /// The process handle, emitted once construction resolves. Remembered,
    /// so dependent wirings can capture it with a latest-value read.
    pub process: Socket<Arc<dyn ProcessHandle>>,
    pub event: BrowserEvents,
}

impl BrowserPort {
    pub fn new() -> Self {
        Self {
            port: LifecyclePort::new(),
            process: Socket::default(),
            event: BrowserEvents {
                targetcreated: Socket::default(),
                disconnected: Socket::default(),
            },
        }
    }

    /// Registers this port's wirings on `circuit`.
    pub fn circuit(&self, driver: Arc<dyn BrowserDriver>, circuit: &mut Circuit) {
        // Init params without a launch section are dropped entirely.
        let launch_req: Socket<LaunchParams> = Socket::default();
        filter_map(circuit, &self.port.init, &launch_req, |params: BrowserParams| {
            params.launch
        });

        merge_map(circuit, &launch_req, &self.process, move |launch| {
            let driver = Arc::clone(&driver);
            async move {
                tracing::debug!(headless = launch.headless, "launching browser process");
                driver.launch(&launch).await
            }
        });

        // Deferred one tick: every observer of `ready` must see the
        // populated process cell, even one that reads it synchronously.
        merge_map(circuit, &self.process, &self.port.ready, |_process| async {
            tokio::task::yield_now().await;
            tracing::debug!("browser process ready");
            Ok(())
        });

        latest_merge_map(
            circuit,
            &self.port.terminate,
            (self.process.clone(),),
            &self.port.info,
            |_, (process,)| async move {
                let close = process.close().await?;
                Ok(InfoEvent::BrowserClosed(close))
            },
        );

        from_event(
            circuit,
            &self.process,
            &self.event.targetcreated,
            |p: &Arc<dyn ProcessHandle>| p.events(),
            |event| match event {
                ProcessEvent::TargetCreated(info) => Some(info),
                _ => None,
            },
        );
        from_event(
            circuit,
            &self.process,
            &self.event.disconnected,
            |p: &Arc<dyn ProcessHandle>| p.events(),
            |event| matches!(event, ProcessEvent::Disconnected).then_some(()),
        );

        // Unsolicited termination rule: a native disconnect is this port's
        // terminated, whether or not terminate was ever received.
        map_to(circuit, &self.event.disconnected, &self.port.terminated, |_| ());
    }
}

impl Default for BrowserPort {
    fn default() -> Self {
        Self::new()
    }
}
