//! Structural analyzer: SEO and accessibility signals from the loaded DOM.
//!
//! Works on a serialized DOM snapshot, so the same snapshot always yields the same
//! findings.

use scraper::Html;

use crate::domain::{AuditIssue, HtmlAnalysis, IssueCategory, Score, Severity};
use crate::extractor::PageExtractor;

const TITLE_MIN: usize = 30;
const TITLE_MAX: usize = 60;
const DESCRIPTION_MIN: usize = 120;
const DESCRIPTION_MAX: usize = 160;
const ALT_ESCALATION: u32 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct StructuralFindings {
    pub analysis: HtmlAnalysis,
    pub issues: Vec<AuditIssue>,
    pub score: Score,
}

pub struct StructuralAnalyzer;

impl StructuralAnalyzer {
    /// Analyze a serialized document.
    pub fn analyze_html(raw: &str) -> StructuralFindings {
        let document = Html::parse_document(raw);
        let analysis = PageExtractor::analyze(&document);
        Self::from_analysis(analysis)
    }

    pub fn from_analysis(analysis: HtmlAnalysis) -> StructuralFindings {
        let issues = Self::generate_issues(&analysis);
        let score = Score::from(Self::calculate_seo_score(&analysis));
        StructuralFindings { analysis, issues, score }
    }

    pub fn generate_issues(analysis: &HtmlAnalysis) -> Vec<AuditIssue> {
        let mut issues = Vec::new();

        if !analysis.has_title {
            issues.push(AuditIssue::keyed(
                IssueCategory::Seo,
                "missing_title",
                "Missing page title",
                Severity::High,
            ));
        } else if analysis.title_length < TITLE_MIN {
            issues.push(AuditIssue::keyed(
                IssueCategory::Seo,
                "title_too_short",
                format!(
                    "Page title too short ({} characters, recommended 50-60)",
                    analysis.title_length
                ),
                Severity::Medium,
            ));
        } else if analysis.title_length > TITLE_MAX {
            issues.push(AuditIssue::keyed(
                IssueCategory::Seo,
                "title_too_long",
                format!(
                    "Page title too long ({} characters, recommended 50-60)",
                    analysis.title_length
                ),
                Severity::Medium,
            ));
        }

        if !analysis.has_meta_description {
            issues.push(AuditIssue::keyed(
                IssueCategory::Seo,
                "missing_meta_description",
                "Missing meta description",
                Severity::High,
            ));
        } else if analysis.meta_description_length < DESCRIPTION_MIN {
            issues.push(AuditIssue::keyed(
                IssueCategory::Seo,
                "meta_description_too_short",
                format!(
                    "Meta description too short ({} characters, recommended 150-160)",
                    analysis.meta_description_length
                ),
                Severity::Medium,
            ));
        } else if analysis.meta_description_length > DESCRIPTION_MAX {
            issues.push(AuditIssue::keyed(
                IssueCategory::Seo,
                "meta_description_too_long",
                format!(
                    "Meta description too long ({} characters, recommended 150-160)",
                    analysis.meta_description_length
                ),
                Severity::Medium,
            ));
        }

        if !analysis.has_viewport_meta {
            issues.push(AuditIssue::keyed(
                IssueCategory::BestPractices,
                "missing_viewport_meta",
                "Missing viewport meta tag for responsive design",
                Severity::High,
            ));
        }

        if !analysis.has_canonical_link {
            issues.push(AuditIssue::keyed(
                IssueCategory::Seo,
                "missing_canonical_link",
                "Missing canonical link",
                Severity::Medium,
            ));
        }

        let headings = &analysis.heading_structure;
        if headings.h1 == 0 {
            issues.push(AuditIssue::keyed(
                IssueCategory::HtmlStructure,
                "missing_h1",
                "No H1 heading found",
                Severity::High,
            ));
        } else if headings.h1 > 1 {
            issues.push(AuditIssue::keyed(
                IssueCategory::HtmlStructure,
                "multiple_h1",
                format!("Multiple H1 headings found ({}, recommended: one)", headings.h1),
                Severity::Medium,
            ));
        }

        if analysis.images_without_alt > 0 {
            let severity = if analysis.images_without_alt > ALT_ESCALATION {
                Severity::High
            } else {
                Severity::Medium
            };
            issues.push(AuditIssue::keyed(
                IssueCategory::Accessibility,
                "images_without_alt",
                format!("{} image(s) without alt attribute", analysis.images_without_alt),
                severity,
            ));
        }

        if headings.h2 > 0 && headings.h1 == 0 {
            issues.push(AuditIssue::keyed(
                IssueCategory::HtmlStructure,
                "h2_without_h1",
                "H2 headings present without an H1",
                Severity::Medium,
            ));
        }

        issues
    }

    /// Presence-based SEO score. Length problems do not cost points.
    pub fn calculate_seo_score(analysis: &HtmlAnalysis) -> u8 {
        let mut score: i64 = 100;

        if !analysis.has_title {
            score -= 30;
        }
        if !analysis.has_meta_description {
            score -= 25;
        }
        if !analysis.has_viewport_meta {
            score -= 20;
        }
        if !analysis.has_canonical_link {
            score -= 10;
        }
        if analysis.heading_structure.h1 == 0 {
            score -= 15;
        }
        score -= (2 * analysis.images_without_alt as i64).min(20);

        score.clamp(0, 100) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::HeadingCounts;

    fn healthy() -> HtmlAnalysis {
        HtmlAnalysis {
            has_title: true,
            title_length: 55,
            has_meta_description: true,
            meta_description_length: 155,
            has_meta_keywords: false,
            heading_structure: HeadingCounts { h1: 1, h2: 2, ..Default::default() },
            images_without_alt: 0,
            total_images: 4,
            has_viewport_meta: true,
            has_canonical_link: true,
        }
    }

    fn keys(issues: &[AuditIssue]) -> Vec<(&'static str, Severity)> {
        issues.iter().map(|i| (i.key.unwrap_or(""), i.severity)).collect()
    }

    #[test]
    fn healthy_page_scores_full_marks() {
        let findings = StructuralAnalyzer::from_analysis(healthy());
        assert!(findings.issues.is_empty());
        assert_eq!(findings.score, Score::Valid(100));
    }

    #[test]
    fn bare_page_clamps_to_zero() {
        let analysis = HtmlAnalysis {
            has_title: false,
            title_length: 0,
            has_meta_description: false,
            meta_description_length: 0,
            has_meta_keywords: false,
            heading_structure: HeadingCounts::default(),
            images_without_alt: 3,
            total_images: 3,
            has_viewport_meta: false,
            has_canonical_link: false,
        };

        assert_eq!(StructuralAnalyzer::calculate_seo_score(&analysis), 0);

        let issues = StructuralAnalyzer::generate_issues(&analysis);
        assert_eq!(
            keys(&issues),
            vec![
                ("missing_title", Severity::High),
                ("missing_meta_description", Severity::High),
                ("missing_viewport_meta", Severity::High),
                ("missing_canonical_link", Severity::Medium),
                ("missing_h1", Severity::High),
                ("images_without_alt", Severity::Medium),
            ]
        );
    }

    #[test]
    fn length_issues_do_not_cost_points() {
        let analysis = HtmlAnalysis { title_length: 12, meta_description_length: 300, ..healthy() };
        let findings = StructuralAnalyzer::from_analysis(analysis);
        assert_eq!(findings.score, Score::Valid(100));
        assert_eq!(
            keys(&findings.issues),
            vec![
                ("title_too_short", Severity::Medium),
                ("meta_description_too_long", Severity::Medium),
            ]
        );
    }

    #[test]
    fn heading_rules() {
        let multiple = HtmlAnalysis {
            heading_structure: HeadingCounts { h1: 3, ..Default::default() },
            ..healthy()
        };
        assert_eq!(
            keys(&StructuralAnalyzer::generate_issues(&multiple)),
            vec![("multiple_h1", Severity::Medium)]
        );

        let orphan_h2 = HtmlAnalysis {
            heading_structure: HeadingCounts { h1: 0, h2: 2, ..Default::default() },
            ..healthy()
        };
        assert_eq!(
            keys(&StructuralAnalyzer::generate_issues(&orphan_h2)),
            vec![("missing_h1", Severity::High), ("h2_without_h1", Severity::Medium)]
        );
    }

    #[test]
    fn many_missing_alts_escalate_and_cap_penalty() {
        let analysis = HtmlAnalysis { images_without_alt: 14, ..healthy() };
        let findings = StructuralAnalyzer::from_analysis(analysis);
        assert_eq!(keys(&findings.issues), vec![("images_without_alt", Severity::High)]);
        assert_eq!(findings.score, Score::Valid(80));
    }

    #[test]
    fn score_never_increases_with_more_deficiencies() {
        let mut analysis = healthy();
        let mut previous = StructuralAnalyzer::calculate_seo_score(&analysis);
        let steps: Vec<Box<dyn Fn(&mut HtmlAnalysis)>> = vec![
            Box::new(|a| a.has_canonical_link = false),
            Box::new(|a| a.images_without_alt = 4),
            Box::new(|a| a.heading_structure.h1 = 0),
            Box::new(|a| a.has_viewport_meta = false),
            Box::new(|a| a.images_without_alt = 30),
            Box::new(|a| a.has_meta_description = false),
            Box::new(|a| a.has_title = false),
        ];
        for step in steps {
            step(&mut analysis);
            let score = StructuralAnalyzer::calculate_seo_score(&analysis);
            assert!(score <= previous);
            previous = score;
        }
    }

    #[test]
    fn same_snapshot_same_findings() {
        let raw =
            r#"<html><head><title>Short</title></head><body><h2>x</h2><img src="a"></body></html>"#;
        assert_eq!(StructuralAnalyzer::analyze_html(raw), StructuralAnalyzer::analyze_html(raw));
    }
}
