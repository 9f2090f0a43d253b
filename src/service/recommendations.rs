//! Recommendation engine: summary, ranked recommendations, contextual advice and quick wins.

use std::collections::HashSet;

use crate::catalog;
use crate::domain::{
    AuditIssue, ContextualRecommendation, IssueCategory, PriorityTier, Severity, SiteType,
};

pub const MAX_RECOMMENDATIONS: usize = 7;
pub const MAX_QUICK_WINS: usize = 3;

const QUICK_WIN_KEYS: &[&str] = &[
    "missing_meta_description",
    "missing_viewport_meta",
    "missing_canonical_link",
    "missing_h1",
    "images_without_alt",
    "title_too_short",
    "title_too_long",
    "meta_description_too_short",
    "meta_description_too_long",
];

const GENERIC_RECOMMENDATIONS: &[&str] = &[
    "Keep monitoring performance and Core Web Vitals regularly",
    "Keep titles, meta descriptions and headings in line with your content",
    "Check accessibility after each significant design change",
    "Re-run this audit after every major release",
];

pub struct RecommendationEngine;

impl RecommendationEngine {
    /// High-severity issues by catalog tier (stable), then medium-severity ones in discovery order.
    pub fn priority_ordered(issues: &[AuditIssue]) -> Vec<&AuditIssue> {
        let mut high: Vec<&AuditIssue> =
            issues.iter().filter(|i| i.severity == Severity::High).collect();
        high.sort_by_key(|i| i.rank_tier());
        high.extend(issues.iter().filter(|i| i.severity == Severity::Medium));
        high
    }

    pub fn short_summary(issues: &[AuditIssue], score: u8) -> String {
        let high = issues.iter().filter(|i| i.severity == Severity::High).count();
        let medium = issues.iter().filter(|i| i.severity == Severity::Medium).count();

        if score >= 90 {
            format!(
                "Excellent site with very good overall quality. {high} critical issue(s) and \
                 {medium} minor improvement(s) detected."
            )
        } else if score >= 75 {
            format!(
                "Good site with some room for improvement: {high} critical issue(s) and \
                 {medium} moderate issue(s) to address."
            )
        } else if score >= 50 {
            format!(
                "Acceptable site that needs significant optimization: {high} critical issue(s) \
                 and {medium} moderate issue(s) detected."
            )
        } else {
            let effort = match high {
                n if n > 5 => "2-5 days",
                n if n > 2 => "1-2 days",
                _ => "a few hours",
            };
            format!(
                "Site needs major improvements: {high} critical issue(s) and {medium} moderate \
                 issue(s) detected. Estimated remediation effort: {effort}."
            )
        }
    }

    pub fn recommendations(issues: &[AuditIssue]) -> Vec<String> {
        let ranked = Self::priority_ordered(issues);
        if ranked.is_empty() {
            return GENERIC_RECOMMENDATIONS.iter().map(|s| s.to_string()).collect();
        }
        ranked
            .into_iter()
            .take(MAX_RECOMMENDATIONS)
            .map(|i| i.action.clone().unwrap_or_else(|| i.message.clone()))
            .collect()
    }

    pub fn contextual_recommendations(
        issues: &[AuditIssue],
        site_type: SiteType,
        cms: Option<&str>,
    ) -> Vec<ContextualRecommendation> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();

        for issue in Self::priority_ordered(issues) {
            if out.len() >= MAX_RECOMMENDATIONS {
                break;
            }
            let Some(key) = issue.key else { continue };
            if seen.contains(key) {
                continue;
            }
            let Some(entry) = catalog::get(key) else { continue };
            seen.insert(key);

            let mut description = entry.description.to_string();
            if cms == Some("WordPress") && key.contains("seo") {
                description.push_str(
                    " With WordPress, plugins such as Yoast SEO or Rank Math make these fixes \
                     easy.",
                );
            }
            if cms == Some("Shopify") && site_type == SiteType::Ecommerce {
                description.push_str(
                    " For your Shopify store, these optimizations can directly lift sales by \
                     15 to 30%.",
                );
            }

            out.push(ContextualRecommendation {
                title: entry.short.to_string(),
                description: format!("{description}\n\n{}", entry.action),
                priority: entry.priority,
                estimated_time: Self::estimate_time(key).to_string(),
                impact: entry.impact.to_string(),
            });
        }

        if out.is_empty() {
            out.push(ContextualRecommendation {
                title: "Site is well optimized overall".to_string(),
                description: "The site follows most web best practices. Keep monitoring \
                              performance and SEO regularly to maintain this level of quality."
                    .to_string(),
                priority: PriorityTier::Enhancement,
                estimated_time: "Ongoing maintenance".to_string(),
                impact: "Keeps current quality and performance".to_string(),
            });
        }
        out
    }

    /// Coarse effort estimate from the catalog key.
    pub fn estimate_time(key: &str) -> &'static str {
        if key.contains("low_") || key.contains("score") {
            "1-3 days"
        } else if key.contains("mobile")
            || key.contains("performance")
            || key.contains("accessibility")
        {
            "2-4 hours"
        } else {
            "15-30 minutes"
        }
    }

    pub fn quick_wins(issues: &[AuditIssue]) -> Vec<String> {
        issues
            .iter()
            .filter_map(|i| i.key)
            .filter(|key| QUICK_WIN_KEYS.contains(key))
            .filter_map(catalog::get)
            .take(MAX_QUICK_WINS)
            .map(|entry| match entry.code_sample {
                Some(code) => {
                    format!("{}: {}\n\nCode example:\n{}", entry.short, entry.action, code)
                }
                None => format!("{}: {}", entry.short, entry.action),
            })
            .collect()
    }

    pub fn site_type_advice(site_type: SiteType, issues: &[AuditIssue]) -> String {
        let high_in = |category: IssueCategory| {
            issues
                .iter()
                .any(|i| i.category == category && i.severity == Severity::High)
        };
        let perf = high_in(IssueCategory::Performance);
        let seo = high_in(IssueCategory::Seo);
        let a11y = high_in(IssueCategory::Accessibility);

        let pick = |cond: bool, yes: &'static str, no: &'static str| if cond { yes } else { no };

        let parts: Vec<&str> = match site_type {
            SiteType::Ecommerce => vec![
                "For an e-commerce site, performance is critical: every extra second of load \
                 time can cut sales by 7%.",
                pick(
                    perf,
                    "Your current performance problems directly affect revenue.",
                    "Keep performance high to maximize conversions.",
                ),
                pick(seo, "SEO is also crucial to attract qualified traffic for free.", ""),
            ],
            SiteType::Blog => vec![
                "For a blog, SEO is your main growth lever.",
                pick(
                    seo,
                    "Fixing your SEO problems can multiply organic traffic by 2 to 5.",
                    "Keep optimizing SEO to attract more readers.",
                ),
                "Load speed also affects your Google ranking.",
            ],
            SiteType::Corporate => vec![
                "For a corporate site, professional image and credibility are essential.",
                pick(
                    a11y,
                    "Accessibility problems can expose you to legal risk and hurt your image.",
                    "",
                ),
                pick(
                    seo,
                    "Good SEO lets prospects find you when they search for your services.",
                    "",
                ),
            ],
            SiteType::Landing => vec![
                "For a landing page, the goal is conversion.",
                pick(
                    perf,
                    "Your performance problems drive visitors away before they even see your \
                     offer.",
                    "Keep load times optimal to maximize conversions.",
                ),
                "Every second counts when turning a visitor into a customer.",
            ],
            SiteType::Portfolio => vec![
                "For a portfolio, aesthetics and visual performance are key.",
                pick(
                    perf,
                    "Heavy images slow the site down and leave a poor impression.",
                    "Keep optimizing images for fast, professional rendering.",
                ),
                pick(seo, "Good SEO will help potential clients find you.", ""),
            ],
            SiteType::Application => vec![
                "For a web application, performance and accessibility come first.",
                pick(
                    perf,
                    "Slowdowns frustrate users and push them toward competitors.",
                    "",
                ),
                pick(
                    a11y,
                    "Accessibility is not optional: it guarantees every user can use your \
                     application.",
                    "",
                ),
            ],
            SiteType::Unknown => vec![
                "Focus on the critical issues first before moving on to less urgent optimizations.",
            ],
        };

        parts.into_iter().filter(|p| !p.is_empty()).collect::<Vec<_>>().join(" ")
    }
}
