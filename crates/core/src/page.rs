//! Inner resource port: a page within the controlling process.

use std::sync::Arc;

use rigging_runtime::{
    Circuit, Error, Result, Socket, from_event, latest_merge_map, map_to, merge_map,
};

use crate::driver::{DialogInfo, PageEvent, PageHandle, RequestInfo, ResponseInfo};
use crate::params::PageParams;
use crate::port::{ConfigStep, InfoEvent, LifecyclePort};

/// Native events forwarded from the page.
pub struct PageEvents {
    pub load: Socket<()>,
    pub close: Socket<()>,
    pub request: Socket<RequestInfo>,
    pub response: Socket<ResponseInfo>,
    pub dialog: Socket<DialogInfo>,
}

/// Lifecycle port wrapping one page handle.
///
/// `init` acquires the handle (fresh or attached) and runs the optional
/// configuration sequence in strict order; `ready` carries the ordered list
/// of applied steps. A native close - solicited or a user closing the tab -
/// is this port's `terminated`.
pub struct PagePort {
    pub port: LifecyclePort<PageParams, Vec<ConfigStep>>,
    /// The page handle, emitted once acquisition resolves.
    pub page: Socket<Arc<dyn PageHandle>>,
    pub event: PageEvents,
}

impl PagePort {
    pub fn new() -> Self {
        Self {
            port: LifecyclePort::new(),
            page: Socket::default(),
            event: PageEvents {
                load: Socket::default(),
                close: Socket::default(),
                request: Socket::default(),
                response: Socket::default(),
                dialog: Socket::default(),
            },
        }
    }

    /// Registers this port's wirings on `circuit`.
    pub fn circuit(&self, circuit: &mut Circuit) {
        merge_map(circuit, &self.port.init, &self.page, |params: PageParams| async move {
            if params.create_new_page {
                params.process.new_page().await
            } else {
                params
                    .process
                    .pages()
                    .await?
                    .into_iter()
                    .next()
                    .ok_or_else(|| Error::HandleAcquisition("no open page to attach to".into()))
            }
        });

        // Ready fires only after the whole configuration sequence resolved,
        // in the fixed order user agent -> viewport -> navigation.
        latest_merge_map(
            circuit,
            &self.page,
            (self.port.init.clone(),),
            &self.port.ready,
            |page, (params,)| configure(page, params),
        );

        from_event(
            circuit,
            &self.page,
            &self.event.load,
            |p: &Arc<dyn PageHandle>| p.events(),
            |event| matches!(event, PageEvent::Load).then_some(()),
        );
        from_event(
            circuit,
            &self.page,
            &self.event.close,
            |p: &Arc<dyn PageHandle>| p.events(),
            |event| matches!(event, PageEvent::Close).then_some(()),
        );
        from_event(
            circuit,
            &self.page,
            &self.event.request,
            |p: &Arc<dyn PageHandle>| p.events(),
            |event| match event {
                PageEvent::Request(request) => Some(request),
                _ => None,
            },
        );
        from_event(
            circuit,
            &self.page,
            &self.event.response,
            |p: &Arc<dyn PageHandle>| p.events(),
            |event| match event {
                PageEvent::Response(response) => Some(response),
                _ => None,
            },
        );
        from_event(
            circuit,
            &self.page,
            &self.event.dialog,
            |p: &Arc<dyn PageHandle>| p.events(),
            |event| match event {
                PageEvent::Dialog(dialog) => Some(dialog),
                _ => None,
            },
        );

        latest_merge_map(
            circuit,
            &self.port.terminate,
            (self.page.clone(), self.port.init.clone()),
            &self.port.info,
            |_, (page, params)| async move {
                let close = match params.close_timeout {
                    // Bounded close: page.close is known to hang in some
                    // drivers, so surface that instead of blocking forever.
                    Some(bound) => tokio::time::timeout(bound, page.close())
                        .await
                        .map_err(|_| Error::CloseTimeout { timeout: bound })??,
                    None => page.close().await?,
                };
                Ok(InfoEvent::PageClosed(close))
            },
        );

        map_to(circuit, &self.event.close, &self.port.terminated, |_| ());
    }
}

impl Default for PagePort {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs the optional configuration sequence and collects the applied steps
/// in order. Any rejection aborts the sequence and propagates.
async fn configure(page: Arc<dyn PageHandle>, params: PageParams) -> Result<Vec<ConfigStep>> {
    let mut steps = vec![ConfigStep::Acquired {
        created: params.create_new_page,
    }];
    if let Some(user_agent) = &params.user_agent {
        page.set_user_agent(user_agent).await?;
        steps.push(ConfigStep::UserAgent);
    }
    if let Some(viewport) = &params.viewport {
        page.set_viewport(viewport).await?;
        steps.push(ConfigStep::Viewport);
    }
    if let Some(goto) = &params.goto {
        page.goto(goto).await?;
        steps.push(ConfigStep::Navigated(goto.url.clone()));
    }
    tracing::debug!(steps = steps.len(), "page configured");
    Ok(steps)
}
