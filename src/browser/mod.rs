//! Browser-automation boundary.
//!
//! The audit core only talks to a browser through these traits:
//! - `BrowserLauncher`: starts an isolated session
//! - `BrowserSession`: owns the browser process, hands out pages
//! - `PageHandle`: one tab; navigation, emulation and the closed set of `PageQuery` reads
//!
//! `ChromeLauncher` is the DevTools-protocol implementation used in production.

mod chromium;
pub mod scripts;

pub use chromium::ChromeLauncher;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Device emulation settings for a page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub device_scale_factor: f64,
    pub is_mobile: bool,
    pub has_touch: bool,
}

impl Viewport {
    pub fn desktop() -> Self {
        Self {
            width: 1920,
            height: 1080,
            device_scale_factor: 1.0,
            is_mobile: false,
            has_touch: false,
        }
    }

    pub fn mobile() -> Self {
        Self {
            width: 375,
            height: 667,
            device_scale_factor: 2.0,
            is_mobile: true,
            has_touch: true,
        }
    }
}

/// The read-only in-page queries the audit needs. Each maps to one script in [`scripts`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageQuery {
    /// `document.title`
    Title,
    /// Serialized DOM of the loaded page
    DocumentHtml,
    /// Navigation/paint timings, plus layout shift observed over `settle_ms`
    PerformanceSnapshot { settle_ms: u64 },
    /// Viewport meta presence and content vs. window width
    ResponsiveProbe,
    /// Framework and analytics globals on `window`
    TechnologyGlobals,
}

impl PageQuery {
    pub fn name(&self) -> &'static str {
        match self {
            PageQuery::Title => "title",
            PageQuery::DocumentHtml => "document_html",
            PageQuery::PerformanceSnapshot { .. } => "performance_snapshot",
            PageQuery::ResponsiveProbe => "responsive_probe",
            PageQuery::TechnologyGlobals => "technology_globals",
        }
    }

    pub fn script(&self) -> String {
        match self {
            PageQuery::Title => scripts::TITLE.to_string(),
            PageQuery::DocumentHtml => scripts::DOCUMENT_HTML.to_string(),
            PageQuery::PerformanceSnapshot { settle_ms } => {
                scripts::performance_snapshot(*settle_ms)
            }
            PageQuery::ResponsiveProbe => scripts::RESPONSIVE_PROBE.to_string(),
            PageQuery::TechnologyGlobals => scripts::TECHNOLOGY_GLOBALS.to_string(),
        }
    }
}

/// Raw timings returned by [`PageQuery::PerformanceSnapshot`], in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PerformanceSnapshot {
    pub load_time: f64,
    pub dom_content_loaded: f64,
    pub first_contentful_paint: f64,
    pub largest_contentful_paint: f64,
    pub cumulative_layout_shift: f64,
    pub first_input_delay: f64,
}

/// Result of [`PageQuery::ResponsiveProbe`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResponsiveProbe {
    pub has_viewport: bool,
    pub body_width: f64,
    pub window_width: f64,
}

/// Result of [`PageQuery::TechnologyGlobals`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TechnologyGlobals {
    pub react: bool,
    pub vue: bool,
    pub angular: bool,
    pub next: bool,
    pub jquery: bool,
    pub analytics: bool,
}

#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// Start a fresh, isolated browser session.
    async fn launch(&self) -> Result<Box<dyn BrowserSession>>;
}

#[async_trait]
pub trait BrowserSession: Send {
    async fn new_page(&mut self) -> Result<Box<dyn PageHandle>>;

    /// Remote debugging port, for tools that attach to the same browser.
    fn debugging_port(&self) -> Option<u16>;

    async fn close(&mut self) -> Result<()>;
}

#[async_trait]
pub trait PageHandle: Send {
    async fn set_viewport(&mut self, viewport: Viewport) -> Result<()>;

    /// Viewport currently applied to the page.
    fn viewport(&self) -> Viewport;

    async fn set_user_agent(&mut self, user_agent: &str) -> Result<()>;

    /// User agent currently applied, if one was set.
    fn user_agent(&self) -> Option<String>;

    /// Navigate and wait until the network is idle.
    async fn goto(&mut self, url: &str) -> Result<()>;

    /// Reload and wait until the network is idle.
    async fn reload(&mut self) -> Result<()>;

    async fn query(&mut self, query: PageQuery) -> Result<serde_json::Value>;

    async fn close(&mut self) -> Result<()>;
}

/// Run `query` and deserialize its result.
pub async fn query_as<T: DeserializeOwned>(
    page: &mut dyn PageHandle,
    query: PageQuery,
) -> Result<T> {
    let value = page.query(query).await?;
    serde_json::from_value(value)
        .with_context(|| format!("unexpected result for {} query", query.name()))
}
