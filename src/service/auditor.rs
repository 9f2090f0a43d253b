//! Audit orchestrator.
//!
//! One audit owns one browser session and one page from launch to cleanup:
//! launch -> emulate desktop -> navigate -> page identity -> technology detection ->
//! structural analysis -> performance collection -> external analyzer -> reconcile ->
//! recommendations. Only launch and navigation failures turn into an error report;
//! every other step degrades its own output and the audit carries on.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use scraper::Html;

use super::lighthouse::ExternalAnalyzer;
use super::performance::PerformanceCollector;
use super::recommendations::RecommendationEngine;
use super::reconciler::{LocalFindings, Reconciled, Reconciler};
use super::structure::StructuralAnalyzer;
use super::technology::TechnologyDetector;
use crate::browser::{
    query_as, BrowserLauncher, BrowserSession, PageHandle, PageQuery, TechnologyGlobals,
};
use crate::config::AuditConfig;
use crate::domain::{
    AuditInsights, AuditIssue, AuditOptions, AuditReport, AuditStatus, CategoryScores, PageInfo,
    Score, ScoreCard, TechnologyDetection,
};
use crate::error::{AuditError, Result};
use crate::extractor::PageExtractor;

const CLEANUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Something that turns a URL into an audit report.
#[async_trait]
pub trait Auditor: Send + Sync {
    /// Audit one site. Never fails: problems end up in an error-status report.
    async fn audit(&self, url: &str, options: &AuditOptions) -> AuditReport;

    /// Audit several sites one after the other, preserving input order.
    async fn audit_batch(&self, sites: &[(String, AuditOptions)]) -> Vec<AuditReport> {
        tracing::info!(auditor = self.name(), count = sites.len(), "Starting batch audit");
        let mut reports = Vec::with_capacity(sites.len());
        for (url, options) in sites {
            reports.push(self.audit(url, options).await);
        }
        reports
    }

    fn name(&self) -> &'static str;
}

/// Prefix `https://` unless the input already carries an http(s) scheme.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

pub struct SiteAuditor {
    launcher: Arc<dyn BrowserLauncher>,
    external: Option<Arc<dyn ExternalAnalyzer>>,
    performance: PerformanceCollector,
    config: AuditConfig,
}

impl SiteAuditor {
    pub fn new(
        launcher: Arc<dyn BrowserLauncher>,
        external: Option<Arc<dyn ExternalAnalyzer>>,
        config: AuditConfig,
    ) -> Self {
        Self {
            launcher,
            external,
            performance: PerformanceCollector::new(&config),
            config,
        }
    }

    /// Run the full pipeline for `url`.
    pub async fn run_audit(&self, url: &str, options: &AuditOptions) -> AuditReport {
        let url = normalize_url(url);
        let start = Instant::now();
        tracing::info!(url = %url, external = options.run_external_analyzer, "Starting audit");

        let report = match self.audit_in_session(&url, options).await {
            Ok(report) => report,
            Err(err) => {
                tracing::error!(url = %url, error = %err, "Audit aborted");
                AuditReport::failure(&url, err.classify(), options)
            }
        };

        tracing::info!(
            url = %url,
            status = ?report.status,
            score = report.score,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Audit finished"
        );
        report
    }

    async fn audit_in_session(&self, url: &str, options: &AuditOptions) -> Result<AuditReport> {
        let launch = tokio::time::timeout(self.config.launch_timeout, self.launcher.launch());
        let mut session = match launch.await {
            Err(_) => return Err(AuditError::LaunchTimeout),
            Ok(Err(e)) => return Err(AuditError::launch(format!("{e:#}"))),
            Ok(Ok(session)) => session,
        };
        tracing::debug!(url, "Browser session ready");

        let mut page = None;
        let outcome = tokio::time::timeout(
            self.config.audit_timeout,
            self.analyze(session.as_mut(), &mut page, url, options),
        )
        .await
        .unwrap_or(Err(AuditError::DeadlineExceeded));

        Self::cleanup(session, page).await;
        outcome
    }

    async fn cleanup(mut session: Box<dyn BrowserSession>, page: Option<Box<dyn PageHandle>>) {
        if let Some(mut page) = page {
            match tokio::time::timeout(CLEANUP_TIMEOUT, page.close()).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::warn!("Failed to close page: {:#}", e),
                Err(_) => tracing::warn!("Timed out closing page"),
            }
        }
        match tokio::time::timeout(CLEANUP_TIMEOUT, session.close()).await {
            Ok(Ok(())) => tracing::debug!("Browser session closed"),
            Ok(Err(e)) => tracing::warn!("Failed to close browser session: {:#}", e),
            Err(_) => tracing::warn!("Timed out closing browser session"),
        }
    }

    /// Everything between launch and cleanup. The opened page is parked in `slot` so
    /// cleanup can reach it even when this future is dropped by the deadline.
    async fn analyze(
        &self,
        session: &mut dyn BrowserSession,
        slot: &mut Option<Box<dyn PageHandle>>,
        url: &str,
        options: &AuditOptions,
    ) -> Result<AuditReport> {
        let debugging_port = session.debugging_port();
        let page = slot.insert(
            session
                .new_page()
                .await
                .map_err(|e| AuditError::launch(format!("{e:#}")))?,
        );

        // Emulation failures leave the browser defaults in place.
        if let Err(e) = page.set_viewport(self.config.desktop_viewport).await {
            tracing::warn!(url, "Failed to emulate desktop viewport: {:#}", e);
        }
        if let Err(e) = page.set_user_agent(&self.config.desktop_user_agent).await {
            tracing::warn!(url, "Failed to set desktop user agent: {:#}", e);
        }

        match tokio::time::timeout(self.config.navigation_timeout, page.goto(url)).await {
            Err(_) => return Err(AuditError::NavigationTimeout),
            Ok(Err(e)) => return Err(AuditError::navigation(e)),
            Ok(Ok(())) => {}
        }
        tracing::debug!(url, "Page loaded");

        let html = match query_as::<String>(page.as_mut(), PageQuery::DocumentHtml).await {
            Ok(html) => Some(html),
            Err(e) => {
                tracing::warn!(url, "Failed to read document: {:#}", e);
                None
            }
        };

        let title = query_as::<String>(page.as_mut(), PageQuery::Title)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(url, "Failed to read title: {:#}", e);
                String::new()
            });
        let page_info = Self::page_info(title, html.as_deref());

        let detection = self.detect_technologies(page.as_mut(), html.as_deref()).await;
        tracing::debug!(
            url,
            site_type = ?detection.site_type,
            cms = ?detection.cms,
            "Technology detection done"
        );

        let structural = html.as_deref().map(StructuralAnalyzer::analyze_html);
        if structural.is_none() {
            tracing::warn!(url, "Structural analysis unavailable");
        }

        let performance = match self.performance.collect(page.as_mut()).await {
            Ok(findings) => Some(findings),
            Err(e) => {
                tracing::warn!(url, "Performance collection failed: {:#}", e);
                None
            }
        };

        let external = if options.run_external_analyzer {
            self.run_external(url, debugging_port).await
        } else {
            None
        };

        let local = LocalFindings {
            seo: structural.as_ref().map(|s| s.score).unwrap_or(Score::Unavailable),
            structural_issues: structural.map(|s| s.issues).unwrap_or_default(),
            performance: performance.as_ref().map(|p| p.score).unwrap_or(Score::Unavailable),
            performance_issues: performance.map(|p| p.issues).unwrap_or_default(),
        };
        let reconciled = Reconciler::reconcile(local, external);

        Ok(Self::build_report(url, options, reconciled, page_info, detection))
    }

    fn page_info(title: String, html: Option<&str>) -> PageInfo {
        let first_heading = html
            .map(|raw| PageExtractor::extract_first_heading(&Html::parse_document(raw)))
            .unwrap_or_default();
        PageInfo {
            title: title.trim().to_string(),
            first_heading,
        }
    }

    async fn detect_technologies(
        &self,
        page: &mut dyn PageHandle,
        html: Option<&str>,
    ) -> TechnologyDetection {
        let Some(html) = html else {
            return TechnologyDetection::default();
        };
        let globals = query_as::<TechnologyGlobals>(page, PageQuery::TechnologyGlobals)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to read technology globals: {:#}", e);
                TechnologyGlobals::default()
            });
        TechnologyDetector::detect(html, globals)
    }

    async fn run_external(&self, url: &str, debugging_port: Option<u16>) -> Option<ScoreCard> {
        let Some(analyzer) = &self.external else {
            tracing::debug!(url, "No external analyzer configured");
            return None;
        };
        let start = Instant::now();
        match analyzer.score_categories(url, debugging_port).await {
            Ok(card) => {
                tracing::debug!(
                    url,
                    analyzer = analyzer.name(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "External analyzer done"
                );
                Some(card)
            }
            Err(e) => {
                let err = AuditError::ExternalAnalyzer(format!("{e:#}"));
                tracing::warn!(url, analyzer = analyzer.name(), "{}", err);
                None
            }
        }
    }

    /// Assemble a success report from reconciled findings.
    pub fn build_report(
        url: &str,
        options: &AuditOptions,
        reconciled: Reconciled,
        page_info: PageInfo,
        detection: TechnologyDetection,
    ) -> AuditReport {
        let issues = &reconciled.issues;
        let site_type = detection.site_type;

        let insights = AuditInsights {
            site_type,
            site_type_label: site_type.label().to_string(),
            contextual_recommendations: RecommendationEngine::contextual_recommendations(
                issues,
                site_type,
                detection.cms.as_deref(),
            ),
            quick_wins: RecommendationEngine::quick_wins(issues),
            site_type_advice: RecommendationEngine::site_type_advice(site_type, issues),
            cms: detection.cms,
            framework: detection.framework,
            technologies: detection.technologies,
        };

        AuditReport {
            status: AuditStatus::Success,
            url: url.to_string(),
            score: reconciled.overall,
            categories: CategoryScores::from(reconciled.scores),
            issues: issues.iter().map(AuditIssue::summary).collect(),
            short_summary: RecommendationEngine::short_summary(issues, reconciled.overall),
            recommendations: RecommendationEngine::recommendations(issues),
            message: None,
            page_info: Some(page_info),
            insights: Some(insights),
            row_id: options.row_id.clone(),
            contact_email: options.contact_email.clone(),
        }
    }
}

#[async_trait]
impl Auditor for SiteAuditor {
    async fn audit(&self, url: &str, options: &AuditOptions) -> AuditReport {
        self.run_audit(url, options).await
    }

    fn name(&self) -> &'static str {
        "site"
    }
}
