//! Headless Chromium over the DevTools protocol.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::{
    SetDeviceMetricsOverrideParams, SetTouchEmulationEnabledParams,
};
use chromiumoxide::cdp::browser_protocol::page::EventLifecycleEvent;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::listeners::EventStream;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;

use super::{BrowserLauncher, BrowserSession, PageHandle, PageQuery, Viewport};
use crate::config::AuditConfig;

/// Flags of the containerised deployment: no sandbox, no GPU, no background throttling.
const CHROME_ARGS: &[&str] = &[
    "--no-sandbox",
    "--disable-setuid-sandbox",
    "--disable-dev-shm-usage",
    "--disable-accelerated-2d-canvas",
    "--no-first-run",
    "--no-zygote",
    "--disable-gpu",
    "--disable-background-timer-throttling",
    "--disable-backgrounding-occluded-windows",
    "--disable-renderer-backgrounding",
];

/// Launches one isolated Chromium per audit.
pub struct ChromeLauncher {
    executable: Option<PathBuf>,
    headless: bool,
    request_timeout: Duration,
}

impl ChromeLauncher {
    pub fn new(config: &AuditConfig) -> Self {
        Self {
            executable: config.chrome_path.clone(),
            headless: config.headless,
            request_timeout: config.navigation_timeout,
        }
    }

    fn browser_config(&self) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .request_timeout(self.request_timeout)
            .args(CHROME_ARGS.iter().copied());
        if !self.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &self.executable {
            builder = builder.chrome_executable(path);
        }
        builder.build().map_err(|e| anyhow!("invalid browser config: {e}"))
    }
}

#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>> {
        let (browser, mut handler) = Browser::launch(self.browser_config()?)
            .await
            .context("Failed to launch Chromium")?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler stopped: {}", e);
                    break;
                }
            }
        });

        let debugging_port = url::Url::parse(browser.websocket_address())
            .ok()
            .and_then(|u| u.port());
        tracing::debug!(?debugging_port, "Chromium launched");

        Ok(Box::new(ChromeSession {
            browser,
            handler_task,
            debugging_port,
            idle_timeout: self.request_timeout,
        }))
    }
}

struct ChromeSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    debugging_port: Option<u16>,
    idle_timeout: Duration,
}

#[async_trait]
impl BrowserSession for ChromeSession {
    async fn new_page(&mut self) -> Result<Box<dyn PageHandle>> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .context("Failed to open page")?;
        Ok(Box::new(ChromePage {
            page: Some(page),
            viewport: Viewport::desktop(),
            user_agent: None,
            idle_timeout: self.idle_timeout,
        }))
    }

    fn debugging_port(&self) -> Option<u16> {
        self.debugging_port
    }

    async fn close(&mut self) -> Result<()> {
        let closed = self.browser.close().await.context("Failed to close browser");
        if let Err(e) = self.browser.wait().await {
            tracing::debug!("Waiting for browser exit failed: {}", e);
        }
        self.handler_task.abort();
        closed.map(|_| ())
    }
}

struct ChromePage {
    page: Option<Page>,
    viewport: Viewport,
    user_agent: Option<String>,
    idle_timeout: Duration,
}

impl ChromePage {
    fn page(&self) -> Result<&Page> {
        self.page.as_ref().ok_or_else(|| anyhow!("page already closed"))
    }

    /// Subscribe before navigating so no lifecycle event of the new document is missed.
    async fn lifecycle_events(&self) -> Result<EventStream<EventLifecycleEvent>> {
        self.page()?
            .event_listener::<EventLifecycleEvent>()
            .await
            .context("Failed to subscribe to lifecycle events")
    }

    /// Wait for `networkIdle` of the main frame's new document: no request in flight for
    /// 500ms. Events from before the navigation's `init` belong to the previous document.
    async fn wait_for_network_idle(
        &self,
        events: &mut EventStream<EventLifecycleEvent>,
    ) -> Result<()> {
        let main_frame = self.page()?.mainframe().await.ok().flatten();
        let idle = async {
            let mut tracker = IdleTracker::default();
            while let Some(event) = events.next().await {
                if main_frame.as_ref().is_some_and(|id| *id != event.frame_id) {
                    continue;
                }
                if tracker.observe(&event.name) {
                    return true;
                }
            }
            false
        };
        match tokio::time::timeout(self.idle_timeout, idle).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(anyhow!("lifecycle event stream closed before network idle")),
            Err(_) => Err(anyhow!(
                "Navigation timeout: network not idle after {:?}",
                self.idle_timeout
            )),
        }
    }
}

/// Main-frame lifecycle state of one navigation.
#[derive(Debug, Default)]
struct IdleTracker {
    committed: bool,
}

impl IdleTracker {
    /// True once `networkIdle` arrives after the new document's `init`.
    fn observe(&mut self, name: &str) -> bool {
        match name {
            "init" => {
                self.committed = true;
                false
            }
            "networkIdle" => self.committed,
            _ => false,
        }
    }
}

#[async_trait]
impl PageHandle for ChromePage {
    async fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        let page = self.page()?;
        page.execute(SetDeviceMetricsOverrideParams::new(
            viewport.width as i64,
            viewport.height as i64,
            viewport.device_scale_factor,
            viewport.is_mobile,
        ))
        .await
        .context("Failed to set device metrics")?;
        page.execute(SetTouchEmulationEnabledParams::new(viewport.has_touch))
            .await
            .context("Failed to set touch emulation")?;
        self.viewport = viewport;
        Ok(())
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    async fn set_user_agent(&mut self, user_agent: &str) -> Result<()> {
        self.page()?
            .set_user_agent(user_agent)
            .await
            .context("Failed to set user agent")?;
        self.user_agent = Some(user_agent.to_string());
        Ok(())
    }

    fn user_agent(&self) -> Option<String> {
        self.user_agent.clone()
    }

    async fn goto(&mut self, url: &str) -> Result<()> {
        let mut events = self.lifecycle_events().await?;
        // Error text (e.g. net::ERR_NAME_NOT_RESOLVED) is kept verbatim for classification.
        self.page()?.goto(url).await.map_err(|e| anyhow!("{e}"))?;
        self.wait_for_network_idle(&mut events).await
    }

    async fn reload(&mut self) -> Result<()> {
        let mut events = self.lifecycle_events().await?;
        self.page()?.reload().await.context("Failed to reload page")?;
        self.wait_for_network_idle(&mut events).await
    }

    async fn query(&mut self, query: PageQuery) -> Result<serde_json::Value> {
        let params = EvaluateParams::builder()
            .expression(query.script())
            .await_promise(true)
            .return_by_value(true)
            .build()
            .map_err(|e| anyhow!("invalid evaluate params: {e}"))?;
        let result = self
            .page()?
            .evaluate_expression(params)
            .await
            .with_context(|| format!("{} query failed", query.name()))?;
        result
            .into_value::<serde_json::Value>()
            .with_context(|| format!("{} query returned no value", query.name()))
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(page) = self.page.take() {
            page.close().await.context("Failed to close page")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settles(events: &[&str]) -> bool {
        let mut tracker = IdleTracker::default();
        events.iter().any(|name| tracker.observe(name))
    }

    #[test]
    fn idle_only_after_new_document_commits() {
        assert!(settles(&["init", "DOMContentLoaded", "load", "networkAlmostIdle", "networkIdle"]));
        // Leftover idle from the previous document
        assert!(!settles(&["networkIdle", "load"]));
        assert!(!settles(&["init", "load", "networkAlmostIdle"]));
    }

    #[test]
    fn redirect_waits_for_final_document() {
        let mut tracker = IdleTracker::default();
        assert!(!tracker.observe("networkIdle"));
        assert!(!tracker.observe("init"));
        assert!(!tracker.observe("init"));
        assert!(tracker.observe("networkIdle"));
    }
}
