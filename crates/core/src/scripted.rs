//! Scripted in-memory driver.
//!
//! A deterministic [`BrowserDriver`] used by the test suites and demos: it
//! records every operation in invocation order, supports failure and latency
//! injection, and emits the same native events a real driver would
//! (`Disconnected` after a process close, `Close` after a page close).

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::broadcast;

use rigging_runtime::{Error, Result};

use crate::driver::{
    BrowserDriver, CloseResult, PageEvent, PageHandle, ProcessEvent, ProcessHandle, TargetInfo,
};
use crate::params::{Goto, LaunchParams, Viewport};

const EVENT_CAPACITY: usize = 32;

/// Shared recording of driver operations, in invocation order.
#[derive(Clone, Default)]
pub struct OpLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl OpLog {
    pub fn record(&self, entry: impl Into<String>) {
        self.entries.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.entries.lock().iter().any(|e| e.contains(needle))
    }

    pub fn count(&self, needle: &str) -> usize {
        self.entries.lock().iter().filter(|e| e.contains(needle)).count()
    }
}

/// Failure and latency injection knobs.
#[derive(Clone, Debug)]
pub struct ScriptedBehavior {
    pub fail_launch: bool,
    pub launch_delay: Option<Duration>,
    pub fail_new_page: bool,
    pub fail_goto: bool,
    /// Page close is rejected outright.
    pub fail_close: bool,
    /// Page close never resolves - reproduces the acknowledged upstream bug
    /// where closing a non-headless page can hang indefinitely.
    pub hang_on_close: bool,
    /// Pages already open right after launch. A real launch leaves one
    /// initial tab, so this defaults to 1.
    pub initial_pages: usize,
}

impl Default for ScriptedBehavior {
    fn default() -> Self {
        Self {
            fail_launch: false,
            launch_delay: None,
            fail_new_page: false,
            fail_goto: false,
            fail_close: false,
            hang_on_close: false,
            initial_pages: 1,
        }
    }
}

/// Deterministic in-memory driver.
pub struct ScriptedDriver {
    behavior: ScriptedBehavior,
    log: OpLog,
    last_process: Mutex<Option<Arc<ScriptedProcess>>>,
}

impl ScriptedDriver {
    pub fn new() -> Self {
        Self::with_behavior(ScriptedBehavior::default())
    }

    pub fn with_behavior(behavior: ScriptedBehavior) -> Self {
        Self {
            behavior,
            log: OpLog::default(),
            last_process: Mutex::new(None),
        }
    }

    /// The shared operation log.
    pub fn log(&self) -> OpLog {
        self.log.clone()
    }

    /// The most recently launched process, for poking at native events.
    pub fn last_process(&self) -> Option<Arc<ScriptedProcess>> {
        self.last_process.lock().clone()
    }
}

impl Default for ScriptedDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BrowserDriver for ScriptedDriver {
    async fn launch(&self, params: &LaunchParams) -> Result<Arc<dyn ProcessHandle>> {
        if let Some(delay) = self.behavior.launch_delay {
            tokio::time::sleep(delay).await;
        }
        if self.behavior.fail_launch {
            return Err(Error::Launch("injected launch failure".into()));
        }

        self.log.record(format!("launch headless={}", params.headless));
        let process = Arc::new(ScriptedProcess::new(
            self.behavior.clone(),
            self.log.clone(),
        ));
        for _ in 0..self.behavior.initial_pages {
            process.add_page();
        }
        *self.last_process.lock() = Some(Arc::clone(&process));
        Ok(process)
    }
}

/// The scripted controlling process.
pub struct ScriptedProcess {
    behavior: ScriptedBehavior,
    log: OpLog,
    pages: Mutex<Vec<Arc<ScriptedPage>>>,
    next_page_id: AtomicUsize,
    events: broadcast::Sender<ProcessEvent>,
}

impl ScriptedProcess {
    pub fn new(behavior: ScriptedBehavior, log: OpLog) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            behavior,
            log,
            pages: Mutex::new(Vec::new()),
            next_page_id: AtomicUsize::new(0),
            events,
        }
    }

    fn add_page(&self) -> Arc<ScriptedPage> {
        let id = self.next_page_id.fetch_add(1, Ordering::Relaxed);
        let page = Arc::new(ScriptedPage::new(id, self.behavior.clone(), self.log.clone()));
        self.pages.lock().push(Arc::clone(&page));
        page
    }

    /// The page at `index`, oldest first.
    pub fn page(&self, index: usize) -> Option<Arc<ScriptedPage>> {
        self.pages.lock().get(index).cloned()
    }

    /// Simulates the process dying out-of-band (crash, external close).
    pub fn emit_disconnected(&self) {
        let _ = self.events.send(ProcessEvent::Disconnected);
    }
}

#[async_trait]
impl ProcessHandle for ScriptedProcess {
    async fn new_page(&self) -> Result<Arc<dyn PageHandle>> {
        if self.behavior.fail_new_page {
            return Err(Error::HandleAcquisition("injected new_page failure".into()));
        }
        let page = self.add_page();
        self.log.record(format!("new_page -> page{}", page.id()));
        let _ = self.events.send(ProcessEvent::TargetCreated(TargetInfo {
            kind: "page".into(),
            url: None,
        }));
        Ok(page)
    }

    async fn pages(&self) -> Result<Vec<Arc<dyn PageHandle>>> {
        self.log.record("pages");
        Ok(self
            .pages
            .lock()
            .iter()
            .map(|p| Arc::clone(p) as Arc<dyn PageHandle>)
            .collect())
    }

    async fn close(&self) -> Result<CloseResult> {
        self.log.record("browser.close");
        self.emit_disconnected();
        Ok(CloseResult {
            clean: true,
            detail: None,
        })
    }

    fn events(&self) -> broadcast::Receiver<ProcessEvent> {
        self.events.subscribe()
    }
}

/// A scripted page handle.
pub struct ScriptedPage {
    id: usize,
    behavior: ScriptedBehavior,
    log: OpLog,
    events: broadcast::Sender<PageEvent>,
}

impl ScriptedPage {
    fn new(id: usize, behavior: ScriptedBehavior, log: OpLog) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            id,
            behavior,
            log,
            events,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Injects a native page event, e.g. a user closing the tab.
    pub fn emit(&self, event: PageEvent) {
        let _ = self.events.send(event);
    }
}

#[async_trait]
impl PageHandle for ScriptedPage {
    async fn set_user_agent(&self, user_agent: &str) -> Result<()> {
        self.log
            .record(format!("page{}.set_user_agent {user_agent}", self.id));
        Ok(())
    }

    async fn set_viewport(&self, viewport: &Viewport) -> Result<()> {
        self.log.record(format!(
            "page{}.set_viewport {}x{}",
            self.id, viewport.width, viewport.height
        ));
        Ok(())
    }

    async fn goto(&self, goto: &Goto) -> Result<()> {
        if self.behavior.fail_goto {
            return Err(Error::Configuration {
                step: "goto",
                message: "injected navigation failure".into(),
            });
        }
        self.log.record(format!("page{}.goto {}", self.id, goto.url));
        let _ = self.events.send(PageEvent::Load);
        Ok(())
    }

    async fn close(&self) -> Result<CloseResult> {
        self.log.record(format!("page{}.close", self.id));
        if self.behavior.fail_close {
            return Err(Error::Termination("injected close rejection".into()));
        }
        if self.behavior.hang_on_close {
            std::future::pending::<()>().await;
        }
        let _ = self.events.send(PageEvent::Close);
        Ok(CloseResult {
            clean: true,
            detail: None,
        })
    }

    fn events(&self) -> broadcast::Receiver<PageEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn launch_opens_the_initial_tab() {
        let driver = ScriptedDriver::new();
        let process = driver.launch(&LaunchParams::default()).await.unwrap();

        let pages = process.pages().await.unwrap();
        assert_eq!(pages.len(), 1);
        assert!(driver.log().contains("launch headless=true"));
    }

    #[tokio::test]
    async fn close_emits_disconnected() {
        let driver = ScriptedDriver::new();
        let process = driver.launch(&LaunchParams::default()).await.unwrap();
        let mut events = process.events();

        process.close().await.unwrap();

        assert_eq!(events.recv().await.unwrap(), ProcessEvent::Disconnected);
    }

    #[tokio::test]
    async fn operations_are_recorded_in_order() {
        let driver = ScriptedDriver::new();
        let process = driver.launch(&LaunchParams::default()).await.unwrap();
        let page = process.new_page().await.unwrap();

        page.set_user_agent("agent").await.unwrap();
        page.goto(&Goto::new("https://example.com")).await.unwrap();

        assert_eq!(
            driver.log().entries(),
            vec![
                "launch headless=true",
                "new_page -> page1",
                "page1.set_user_agent agent",
                "page1.goto https://example.com",
            ]
        );
    }
}
