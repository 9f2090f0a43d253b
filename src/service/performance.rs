//! Performance collector: timing metrics and the two-viewport responsive probe.

use anyhow::Result;

use crate::browser::{
    query_as, PageHandle, PageQuery, PerformanceSnapshot, ResponsiveProbe, Viewport,
};
use crate::config::AuditConfig;
use crate::domain::{AuditIssue, IssueCategory, PerformanceMetrics, Score, Severity};

const MOBILE_OVERFLOW_TOLERANCE: f64 = 1.10;
const DESKTOP_OVERFLOW_TOLERANCE: f64 = 1.05;

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceFindings {
    pub metrics: PerformanceMetrics,
    pub issues: Vec<AuditIssue>,
    pub score: Score,
}

/// Device profiles used by the responsive probe.
#[derive(Debug, Clone)]
pub struct ProbeProfiles {
    pub mobile_viewport: Viewport,
    pub mobile_user_agent: String,
    pub desktop_viewport: Viewport,
    pub desktop_user_agent: String,
}

pub struct PerformanceCollector {
    layout_shift_window_ms: u64,
    profiles: ProbeProfiles,
}

impl PerformanceCollector {
    pub fn new(config: &AuditConfig) -> Self {
        Self {
            layout_shift_window_ms: config.layout_shift_window.as_millis() as u64,
            profiles: ProbeProfiles {
                mobile_viewport: config.mobile_viewport,
                mobile_user_agent: config.mobile_user_agent.clone(),
                desktop_viewport: config.desktop_viewport,
                desktop_user_agent: config.desktop_user_agent.clone(),
            },
        }
    }

    /// Read timings, then run the responsive probe. The page's viewport and user agent
    /// are restored before returning, whatever the probe outcome.
    pub async fn collect(&self, page: &mut dyn PageHandle) -> Result<PerformanceFindings> {
        let snapshot: PerformanceSnapshot = query_as(
            page,
            PageQuery::PerformanceSnapshot { settle_ms: self.layout_shift_window_ms },
        )
        .await?;

        let (mobile, desktop) = self.responsive_probe(page).await;

        let metrics = PerformanceMetrics {
            load_time: snapshot.load_time,
            dom_content_loaded: snapshot.dom_content_loaded,
            first_contentful_paint: snapshot.first_contentful_paint,
            largest_contentful_paint: snapshot.largest_contentful_paint,
            cumulative_layout_shift: snapshot.cumulative_layout_shift,
            first_input_delay: snapshot.first_input_delay,
            is_mobile_responsive: mobile,
            is_desktop_responsive: desktop,
        };
        Ok(Self::from_metrics(metrics))
    }

    pub fn from_metrics(metrics: PerformanceMetrics) -> PerformanceFindings {
        PerformanceFindings {
            issues: Self::generate_issues(&metrics),
            score: Score::from(Self::calculate_performance_score(&metrics)),
            metrics,
        }
    }

    async fn responsive_probe(&self, page: &mut dyn PageHandle) -> (bool, bool) {
        let original_viewport = page.viewport();
        let original_user_agent = page
            .user_agent()
            .unwrap_or_else(|| self.profiles.desktop_user_agent.clone());

        let mut verdict = (false, false);
        if let Err(e) = self.run_probe(page, &mut verdict).await {
            tracing::warn!("Responsive probe failed: {:#}", e);
        }

        if let Err(e) = page.set_viewport(original_viewport).await {
            tracing::warn!("Failed to restore viewport: {:#}", e);
        }
        if let Err(e) = page.set_user_agent(&original_user_agent).await {
            tracing::warn!("Failed to restore user agent: {:#}", e);
        }
        verdict
    }

    async fn run_probe(&self, page: &mut dyn PageHandle, verdict: &mut (bool, bool)) -> Result<()> {
        page.set_viewport(self.profiles.mobile_viewport).await?;
        page.set_user_agent(&self.profiles.mobile_user_agent).await?;
        page.reload().await?;
        let mobile: ResponsiveProbe = query_as(page, PageQuery::ResponsiveProbe).await?;
        verdict.0 = mobile.has_viewport
            && mobile.body_width <= mobile.window_width * MOBILE_OVERFLOW_TOLERANCE;

        page.set_viewport(self.profiles.desktop_viewport).await?;
        page.set_user_agent(&self.profiles.desktop_user_agent).await?;
        page.reload().await?;
        let desktop: ResponsiveProbe = query_as(page, PageQuery::ResponsiveProbe).await?;
        verdict.1 = desktop.body_width <= desktop.window_width * DESKTOP_OVERFLOW_TOLERANCE;

        tracing::debug!(mobile = verdict.0, desktop = verdict.1, "Responsive probe done");
        Ok(())
    }

    pub fn generate_issues(metrics: &PerformanceMetrics) -> Vec<AuditIssue> {
        let mut issues = Vec::new();

        let tiered = |value: f64, medium: f64, high: f64| -> Option<Severity> {
            if value > high {
                Some(Severity::High)
            } else if value > medium {
                Some(Severity::Medium)
            } else {
                None
            }
        };

        if let Some(severity) = tiered(metrics.load_time, 3000.0, 5000.0) {
            issues.push(AuditIssue::keyed(
                IssueCategory::Performance,
                "slow_load_time",
                format!("Slow load time: {}ms", metrics.load_time.round()),
                severity,
            ));
        }
        if let Some(severity) = tiered(metrics.first_contentful_paint, 1800.0, 3000.0) {
            issues.push(AuditIssue::keyed(
                IssueCategory::Performance,
                "slow_fcp",
                format!(
                    "High First Contentful Paint: {}ms",
                    metrics.first_contentful_paint.round()
                ),
                severity,
            ));
        }
        if let Some(severity) = tiered(metrics.largest_contentful_paint, 2500.0, 4000.0) {
            issues.push(AuditIssue::keyed(
                IssueCategory::Performance,
                "slow_lcp",
                format!(
                    "High Largest Contentful Paint: {}ms",
                    metrics.largest_contentful_paint.round()
                ),
                severity,
            ));
        }
        if let Some(severity) = tiered(metrics.cumulative_layout_shift, 0.1, 0.25) {
            issues.push(AuditIssue::keyed(
                IssueCategory::Performance,
                "high_cls",
                format!("High Cumulative Layout Shift: {:.3}", metrics.cumulative_layout_shift),
                severity,
            ));
        }
        if let Some(severity) = tiered(metrics.first_input_delay, 100.0, 300.0) {
            issues.push(AuditIssue::keyed(
                IssueCategory::Performance,
                "high_fid",
                format!("High First Input Delay: {}ms", metrics.first_input_delay.round()),
                severity,
            ));
        }

        if !metrics.is_mobile_responsive {
            issues.push(AuditIssue::keyed(
                IssueCategory::BestPractices,
                "not_mobile_responsive",
                "Site not optimized for mobile",
                Severity::High,
            ));
        }
        if !metrics.is_desktop_responsive {
            issues.push(AuditIssue::keyed(
                IssueCategory::BestPractices,
                "desktop_responsive_issues",
                "Display problems on desktop",
                Severity::Medium,
            ));
        }

        issues
    }

    /// Tiered deductions; only the highest tier of each metric applies.
    pub fn calculate_performance_score(metrics: &PerformanceMetrics) -> u8 {
        let tier = |value: f64, steps: [(f64, i64); 3]| -> i64 {
            steps
                .iter()
                .find(|(threshold, _)| value > *threshold)
                .map(|(_, penalty)| *penalty)
                .unwrap_or(0)
        };

        let mut score: i64 = 100;
        score -= tier(metrics.load_time, [(5000.0, 30), (3000.0, 20), (2000.0, 10)]);
        score -= tier(metrics.first_contentful_paint, [(3000.0, 25), (2000.0, 15), (1500.0, 5)]);
        score -= tier(metrics.largest_contentful_paint, [(4000.0, 25), (2500.0, 15), (2000.0, 5)]);
        if !metrics.is_mobile_responsive {
            score -= 20;
        }
        if !metrics.is_desktop_responsive {
            score -= 10;
        }

        score.clamp(0, 100) as u8
    }
}
