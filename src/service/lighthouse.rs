//! External analyzer adapter backed by the Lighthouse CLI.
//!
//! Lighthouse attaches to the audit's own browser through its remote debugging port
//! and reports four category scores. A category it cannot score comes back as
//! `Score::Unavailable`, never as 0.

use std::process::Stdio;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

use crate::config::AuditConfig;
use crate::domain::{Score, ScoreCard};

/// Opaque page-quality scorer.
#[async_trait]
pub trait ExternalAnalyzer: Send + Sync {
    /// Score the live page at `url`. `debugging_port` is the port of the browser that
    /// already has the page loaded, when there is one.
    async fn score_categories(&self, url: &str, debugging_port: Option<u16>) -> Result<ScoreCard>;

    fn name(&self) -> &'static str;
}

pub struct LighthouseAnalyzer {
    binary: String,
    timeout: Duration,
}

impl LighthouseAnalyzer {
    pub fn new(config: &AuditConfig) -> Self {
        Self {
            binary: config.lighthouse_bin.clone(),
            timeout: config.external_timeout,
        }
    }

    /// Check that the CLI can be spawned.
    pub async fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn args(url: &str, debugging_port: Option<u16>) -> Vec<String> {
        let mut args = vec![
            url.to_string(),
            "--output=json".to_string(),
            "--output-path=stdout".to_string(),
            "--quiet".to_string(),
            "--only-categories=performance,seo,accessibility,best-practices".to_string(),
            "--disable-storage-reset".to_string(),
            "--screenEmulation.disabled".to_string(),
        ];
        match debugging_port {
            Some(port) => args.push(format!("--port={port}")),
            None => args.push("--chrome-flags=--headless --no-sandbox --disable-gpu".to_string()),
        }
        args
    }

    /// Convert the JSON report into a score card.
    pub fn parse_report(stdout: &str) -> Result<ScoreCard> {
        let report: LighthouseReport =
            serde_json::from_str(stdout).context("Failed to parse lighthouse output")?;

        if let Some(err) = report.runtime_error {
            anyhow::bail!("Lighthouse runtime error: {}", err.message.unwrap_or(err.code));
        }

        let categories = report.categories;
        let score = |c: Option<LighthouseCategory>| Score::from_fraction(c.and_then(|c| c.score));
        Ok(ScoreCard {
            performance: score(categories.performance),
            seo: score(categories.seo),
            accessibility: score(categories.accessibility),
            best_practices: score(categories.best_practices),
        })
    }
}

#[async_trait]
impl ExternalAnalyzer for LighthouseAnalyzer {
    async fn score_categories(&self, url: &str, debugging_port: Option<u16>) -> Result<ScoreCard> {
        if !self.is_available().await {
            anyhow::bail!("Lighthouse CLI not found: {}", self.binary);
        }

        tracing::info!(url, ?debugging_port, "Running Lighthouse");
        let start = Instant::now();

        let child = Command::new(&self.binary)
            .args(Self::args(url, debugging_port))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .context("Failed to spawn lighthouse")?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| anyhow::anyhow!("Lighthouse timeout after {:?}", self.timeout))?
            .context("Failed to collect lighthouse output")?;

        tracing::debug!(elapsed_ms = start.elapsed().as_millis() as u64, "Lighthouse finished");

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            tracing::debug!("lighthouse stderr: {}", stderr.trim());
        }
        if !output.status.success() {
            anyhow::bail!(
                "Lighthouse failed: {}",
                if stderr.trim().is_empty() { "Unknown error" } else { stderr.trim() }
            );
        }

        Self::parse_report(&String::from_utf8_lossy(&output.stdout))
    }

    fn name(&self) -> &'static str {
        "lighthouse"
    }
}

// ====== Lighthouse JSON report (subset) ======

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LighthouseReport {
    #[serde(default)]
    categories: LighthouseCategories,
    runtime_error: Option<LighthouseRuntimeError>,
}

#[derive(Debug, Default, Deserialize)]
struct LighthouseCategories {
    performance: Option<LighthouseCategory>,
    seo: Option<LighthouseCategory>,
    accessibility: Option<LighthouseCategory>,
    #[serde(rename = "best-practices")]
    best_practices: Option<LighthouseCategory>,
}

#[derive(Debug, Deserialize)]
struct LighthouseCategory {
    score: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct LighthouseRuntimeError {
    code: String,
    message: Option<String>,
}
