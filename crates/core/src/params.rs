//! Immutable configuration snapshots delivered on `init` and `run.start`.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::driver::ProcessHandle;

/// Options for launching the controlling browser process.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchParams {
    pub headless: bool,
    /// Extra command-line arguments passed to the process.
    pub args: Vec<String>,
    /// Artificial delay applied by the driver to each operation.
    pub slow_mo_ms: Option<u64>,
}

impl Default for LaunchParams {
    fn default() -> Self {
        Self {
            headless: true,
            args: Vec::new(),
            slow_mo_ms: None,
        }
    }
}

/// Page viewport dimensions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_scale_factor: Option<f64>,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            device_scale_factor: None,
        }
    }
}

/// When a navigation is considered settled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaitUntil {
    #[serde(rename = "load")]
    Load,
    #[serde(rename = "domcontentloaded")]
    DomContentLoaded,
    #[serde(rename = "networkidle")]
    NetworkIdle,
}

/// A navigation target.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Goto {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_until: Option<WaitUntil>,
}

impl Goto {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            wait_until: None,
        }
    }
}

/// Init parameters of the outer (browser) port.
///
/// With no `launch` section the port never launches anything; its circuit
/// drops the init occurrence entirely.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserParams {
    pub launch: Option<LaunchParams>,
}

/// Init parameters of the inner (page) port.
///
/// Carries the process handle by value: it is captured once, at the moment
/// the orchestrator routes `run.start` into the page port's `init`, and the
/// page port owns it until Terminated.
#[derive(Clone)]
pub struct PageParams {
    pub process: Arc<dyn ProcessHandle>,
    pub user_agent: Option<String>,
    pub viewport: Option<Viewport>,
    pub goto: Option<Goto>,
    /// `true` opens a fresh page; `false` attaches to the first page already
    /// open on the process.
    pub create_new_page: bool,
    /// Upper bound on the page close operation. Unbounded when `None`.
    pub close_timeout: Option<Duration>,
}

impl std::fmt::Debug for PageParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageParams")
            .field("user_agent", &self.user_agent)
            .field("viewport", &self.viewport)
            .field("goto", &self.goto)
            .field("create_new_page", &self.create_new_page)
            .field("close_timeout", &self.close_timeout)
            .finish_non_exhaustive()
    }
}

/// Per-run overrides delivered on `run.start`.
///
/// Every field is optional; anything absent falls back to the orchestrator's
/// remembered init parameters.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunParams {
    pub user_agent: Option<String>,
    pub viewport: Option<Viewport>,
    pub goto: Option<Goto>,
    pub create_new_page: Option<bool>,
}

/// Init parameters of the orchestrator port.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiggingParams {
    pub launch: Option<LaunchParams>,
    pub user_agent: Option<String>,
    pub viewport: Option<Viewport>,
    pub goto: Option<Goto>,
    /// Bound on page close, see [`PageParams::close_timeout`].
    pub close_timeout_ms: Option<u64>,
}

impl RiggingParams {
    /// Projects the outer port's slice of these parameters.
    pub fn browser(&self) -> BrowserParams {
        BrowserParams {
            launch: self.launch.clone(),
        }
    }

    /// Builds the page init snapshot for one run.
    ///
    /// Per-run overrides win over the init-time values. `create_new_page`
    /// defaults to attaching to the process's first open page - a launch
    /// leaves one initial tab, and cycling runs should reuse it rather than
    /// leak a window per run.
    pub fn page(&self, overrides: &RunParams, process: Arc<dyn ProcessHandle>) -> PageParams {
        PageParams {
            process,
            user_agent: overrides
                .user_agent
                .clone()
                .or_else(|| self.user_agent.clone()),
            viewport: overrides.viewport.clone().or_else(|| self.viewport.clone()),
            goto: overrides.goto.clone().or_else(|| self.goto.clone()),
            create_new_page: overrides.create_new_page.unwrap_or(false),
            close_timeout: self.close_timeout_ms.map(Duration::from_millis),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::BrowserDriver;
    use crate::scripted::ScriptedDriver;

    #[test]
    fn launch_params_default_to_headless() {
        let params: LaunchParams = serde_json::from_str("{}").unwrap();
        assert!(params.headless);
        assert!(params.args.is_empty());
    }

    #[test]
    fn rigging_params_deserialize_partial_snapshot() {
        let params: RiggingParams = serde_json::from_str(
            r#"{
                "launch": {"headless": false, "args": ["--no-sandbox"]},
                "goto": {"url": "https://example.com", "wait_until": "networkidle"}
            }"#,
        )
        .unwrap();

        let launch = params.launch.as_ref().unwrap();
        assert!(!launch.headless);
        assert_eq!(launch.args, vec!["--no-sandbox".to_string()]);
        assert_eq!(
            params.goto.as_ref().unwrap().wait_until,
            Some(WaitUntil::NetworkIdle)
        );
        assert_eq!(params.user_agent, None);
    }

    #[tokio::test]
    async fn run_overrides_win_over_init_snapshot() {
        let driver = ScriptedDriver::new();
        let process = driver.launch(&LaunchParams::default()).await.unwrap();

        let init = RiggingParams {
            user_agent: Some("init-agent".into()),
            goto: Some(Goto::new("https://init.example")),
            viewport: Some(Viewport::new(800, 600)),
            close_timeout_ms: Some(250),
            ..Default::default()
        };
        let overrides = RunParams {
            goto: Some(Goto::new("https://run.example")),
            ..Default::default()
        };

        let page = init.page(&overrides, process);
        assert_eq!(page.user_agent.as_deref(), Some("init-agent"));
        assert_eq!(page.goto.unwrap().url, "https://run.example");
        assert_eq!(page.viewport, Some(Viewport::new(800, 600)));
        assert!(!page.create_new_page, "defaults to attaching");
        assert_eq!(page.close_timeout, Some(Duration::from_millis(250)));
    }

    #[tokio::test]
    async fn run_can_request_a_fresh_page() {
        let driver = ScriptedDriver::new();
        let process = driver.launch(&LaunchParams::default()).await.unwrap();

        let overrides = RunParams {
            create_new_page: Some(true),
            ..Default::default()
        };
        let page = RiggingParams::default().page(&overrides, process);
        assert!(page.create_new_page);
    }
}
