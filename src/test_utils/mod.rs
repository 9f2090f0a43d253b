//! Scripted browser and external analyzer for tests.
//!
//! `FakeBrowser` serves canned `FakeSite`s by URL and answers the closed set of
//! `PageQuery` reads from them, so the whole pipeline runs without Chromium.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::browser::{
    BrowserLauncher, BrowserSession, PageHandle, PageQuery, PerformanceSnapshot, TechnologyGlobals,
    Viewport,
};
use crate::domain::ScoreCard;
use crate::service::ExternalAnalyzer;

pub const FAKE_DEBUGGING_PORT: u16 = 9222;

// ====== Sites ======

/// One canned page.
#[derive(Debug, Clone)]
pub struct FakeSite {
    html: String,
    snapshot: PerformanceSnapshot,
    globals: TechnologyGlobals,
    mobile_body_width: Option<f64>,
    failing_probe: bool,
    failing_queries: Vec<&'static str>,
    navigation_error: Option<String>,
    navigation_delay: Option<Duration>,
}

/// A well-formed page: title and description within the recommended lengths, one h1,
/// viewport and canonical present, every image described.
pub const HEALTHY_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Acme Plumbing Seattle - Emergency Repairs, Free Quotes</title>
  <meta name="description" content="Licensed plumbers in Seattle available around the clock. Fast emergency repairs, leak detection and drain cleaning with free written quotes today.">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <link rel="canonical" href="https://acme.test/">
</head>
<body>
  <h1>Emergency plumbing in Seattle</h1>
  <h2>Our services</h2>
  <img src="/van.jpg" alt="Acme service van">
  <img src="/team.jpg" alt="The Acme plumbing team">
</body>
</html>"#;

impl FakeSite {
    pub fn healthy() -> Self {
        Self::from_html(HEALTHY_HTML)
    }

    /// Site serving `html`, with fast timings.
    pub fn from_html(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            snapshot: PerformanceSnapshot {
                load_time: 850.0,
                dom_content_loaded: 420.0,
                first_contentful_paint: 600.0,
                largest_contentful_paint: 1100.0,
                cumulative_layout_shift: 0.02,
                first_input_delay: 0.0,
            },
            globals: TechnologyGlobals::default(),
            mobile_body_width: None,
            failing_probe: false,
            failing_queries: Vec::new(),
            navigation_error: None,
            navigation_delay: None,
        }
    }

    pub fn with_snapshot(mut self, snapshot: PerformanceSnapshot) -> Self {
        self.snapshot = snapshot;
        self
    }

    pub fn with_globals(mut self, globals: TechnologyGlobals) -> Self {
        self.globals = globals;
        self
    }

    /// Body scroll width reported under mobile emulation.
    pub fn with_mobile_body_width(mut self, width: f64) -> Self {
        self.mobile_body_width = Some(width);
        self
    }

    /// Responsive probe reads fail.
    pub fn failing_probe(mut self) -> Self {
        self.failing_probe = true;
        self
    }

    /// Queries named `name` (see `PageQuery::name`) fail.
    pub fn failing_query(mut self, name: &'static str) -> Self {
        self.failing_queries.push(name);
        self
    }

    /// Navigation to this site fails with `message`.
    pub fn unreachable(mut self, message: impl Into<String>) -> Self {
        self.navigation_error = Some(message.into());
        self
    }

    pub fn with_navigation_delay(mut self, delay: Duration) -> Self {
        self.navigation_delay = Some(delay);
        self
    }

    fn title(&self) -> String {
        let document = scraper::Html::parse_document(&self.html);
        crate::extractor::PageExtractor::extract_title(&document).unwrap_or_default()
    }

    fn answer(&self, query: PageQuery, viewport: Viewport) -> Result<Value> {
        if self.failing_queries.contains(&query.name()) {
            bail!("Evaluation failed: {} threw", query.name());
        }
        match query {
            PageQuery::Title => Ok(json!(self.title())),
            PageQuery::DocumentHtml => Ok(json!(self.html)),
            PageQuery::PerformanceSnapshot { .. } => Ok(serde_json::to_value(self.snapshot)?),
            PageQuery::TechnologyGlobals => Ok(serde_json::to_value(self.globals)?),
            PageQuery::ResponsiveProbe => {
                if self.failing_probe {
                    bail!("Execution context was destroyed");
                }
                let window = viewport.width as f64;
                let body = if viewport.is_mobile {
                    self.mobile_body_width.unwrap_or(window)
                } else {
                    window
                };
                Ok(json!({
                    "hasViewport": self.html.contains("name=\"viewport\""),
                    "bodyWidth": body,
                    "windowWidth": window,
                }))
            }
        }
    }
}

// ====== Browser ======

#[derive(Debug, Default)]
struct FakeStats {
    launches: AtomicUsize,
    sessions_closed: AtomicUsize,
    pages_opened: AtomicUsize,
    pages_closed: AtomicUsize,
}

/// Launcher serving canned sites. Clones share their counters.
#[derive(Debug, Clone, Default)]
pub struct FakeBrowser {
    sites: HashMap<String, FakeSite>,
    launch_error: Option<String>,
    launch_delay: Option<Duration>,
    failing_close: bool,
    failing_emulation: bool,
    stats: Arc<FakeStats>,
}

impl FakeBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_site(mut self, url: impl Into<String>, site: FakeSite) -> Self {
        self.sites.insert(url.into(), site);
        self
    }

    pub fn with_launch_error(mut self, message: impl Into<String>) -> Self {
        self.launch_error = Some(message.into());
        self
    }

    pub fn with_launch_delay(mut self, delay: Duration) -> Self {
        self.launch_delay = Some(delay);
        self
    }

    /// Viewport and user-agent overrides fail.
    pub fn with_failing_emulation(mut self) -> Self {
        self.failing_emulation = true;
        self
    }

    /// Page and session close calls are counted, then fail.
    pub fn with_failing_close(mut self) -> Self {
        self.failing_close = true;
        self
    }

    pub fn launches(&self) -> usize {
        self.stats.launches.load(Ordering::SeqCst)
    }

    pub fn sessions_closed(&self) -> usize {
        self.stats.sessions_closed.load(Ordering::SeqCst)
    }

    pub fn pages_opened(&self) -> usize {
        self.stats.pages_opened.load(Ordering::SeqCst)
    }

    pub fn pages_closed(&self) -> usize {
        self.stats.pages_closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BrowserLauncher for FakeBrowser {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>> {
        if let Some(delay) = self.launch_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = &self.launch_error {
            bail!("{message}");
        }
        self.stats.launches.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            sites: Arc::new(self.sites.clone()),
            stats: self.stats.clone(),
            failing_close: self.failing_close,
            failing_emulation: self.failing_emulation,
            closed: false,
        }))
    }
}

struct FakeSession {
    sites: Arc<HashMap<String, FakeSite>>,
    stats: Arc<FakeStats>,
    failing_close: bool,
    failing_emulation: bool,
    closed: bool,
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn new_page(&mut self) -> Result<Box<dyn PageHandle>> {
        if self.closed {
            bail!("browser session is closed");
        }
        self.stats.pages_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakePage {
            sites: self.sites.clone(),
            stats: self.stats.clone(),
            current: None,
            viewport: Viewport::desktop(),
            user_agent: None,
            failing_close: self.failing_close,
            failing_emulation: self.failing_emulation,
            closed: false,
        }))
    }

    fn debugging_port(&self) -> Option<u16> {
        Some(FAKE_DEBUGGING_PORT)
    }

    async fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            self.stats.sessions_closed.fetch_add(1, Ordering::SeqCst);
        }
        if self.failing_close {
            bail!("Browser process exited unexpectedly");
        }
        Ok(())
    }
}

struct FakePage {
    sites: Arc<HashMap<String, FakeSite>>,
    stats: Arc<FakeStats>,
    current: Option<FakeSite>,
    viewport: Viewport,
    user_agent: Option<String>,
    failing_close: bool,
    failing_emulation: bool,
    closed: bool,
}

impl FakePage {
    fn lookup(&self, url: &str) -> Option<&FakeSite> {
        self.sites.get(url).or_else(|| match url.strip_suffix('/') {
            Some(trimmed) => self.sites.get(trimmed),
            None => self.sites.get(&format!("{url}/")),
        })
    }

    fn loaded(&self) -> Result<&FakeSite> {
        if self.closed {
            bail!("page is closed");
        }
        self.current.as_ref().ok_or_else(|| anyhow!("no document loaded"))
    }
}

#[async_trait]
impl PageHandle for FakePage {
    async fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        if self.failing_emulation {
            bail!("Emulation.setDeviceMetricsOverride failed");
        }
        self.viewport = viewport;
        Ok(())
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    async fn set_user_agent(&mut self, user_agent: &str) -> Result<()> {
        if self.failing_emulation {
            bail!("Network.setUserAgentOverride failed");
        }
        self.user_agent = Some(user_agent.to_string());
        Ok(())
    }

    fn user_agent(&self) -> Option<String> {
        self.user_agent.clone()
    }

    async fn goto(&mut self, url: &str) -> Result<()> {
        let site = self
            .lookup(url)
            .cloned()
            .ok_or_else(|| anyhow!("net::ERR_NAME_NOT_RESOLVED at {url}"))?;
        if let Some(delay) = site.navigation_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = &site.navigation_error {
            bail!("{message}");
        }
        self.current = Some(site);
        Ok(())
    }

    async fn reload(&mut self) -> Result<()> {
        self.loaded().map(|_| ())
    }

    async fn query(&mut self, query: PageQuery) -> Result<Value> {
        self.loaded()?.answer(query, self.viewport)
    }

    async fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            self.stats.pages_closed.fetch_add(1, Ordering::SeqCst);
        }
        if self.failing_close {
            bail!("Target closed");
        }
        Ok(())
    }
}

// ====== External analyzer ======

/// External analyzer returning a fixed outcome and recording each call.
#[derive(Debug)]
pub struct FakeAnalyzer {
    outcome: std::result::Result<ScoreCard, String>,
    calls: Mutex<Vec<(String, Option<u16>)>>,
}

impl FakeAnalyzer {
    pub fn scoring(card: ScoreCard) -> Self {
        Self { outcome: Ok(card), calls: Mutex::new(Vec::new()) }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self { outcome: Err(message.into()), calls: Mutex::new(Vec::new()) }
    }

    /// `(url, debugging_port)` of every call so far.
    pub fn calls(&self) -> Vec<(String, Option<u16>)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ExternalAnalyzer for FakeAnalyzer {
    async fn score_categories(&self, url: &str, debugging_port: Option<u16>) -> Result<ScoreCard> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((url.to_string(), debugging_port));
        }
        self.outcome.clone().map_err(|message| anyhow!(message))
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}
