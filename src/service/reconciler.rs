//! Score & issue reconciliation across the local analyzers and the external analyzer.

use crate::domain::{AuditIssue, CategoryScores, IssueCategory, Score, ScoreCard, Severity};

// Weights in percent: seo 0.25, performance 0.35, accessibility 0.25, best practices 0.15.
const WEIGHT_SEO: u32 = 25;
const WEIGHT_PERFORMANCE: u32 = 35;
const WEIGHT_ACCESSIBILITY: u32 = 25;
const WEIGHT_BEST_PRACTICES: u32 = 15;

const VERY_LOW: u8 = 50;
const LOW: u8 = 75;

/// Outputs of the local analyzers.
#[derive(Debug, Clone, Default)]
pub struct LocalFindings {
    pub seo: Score,
    pub structural_issues: Vec<AuditIssue>,
    pub performance: Score,
    pub performance_issues: Vec<AuditIssue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub scores: ScoreCard,
    pub issues: Vec<AuditIssue>,
    pub overall: u8,
}

pub struct Reconciler;

impl Reconciler {
    /// Merge local findings with the external card (`None` when it was not run or failed).
    pub fn reconcile(local: LocalFindings, external: Option<ScoreCard>) -> Reconciled {
        let scores = Self::merge_scores(local.seo, local.performance, external.as_ref());

        let mut issues = local.structural_issues;
        issues.extend(local.performance_issues);
        if let Some(card) = &external {
            issues.extend(Self::external_issues(card));
        }

        let overall = Self::overall_score(&CategoryScores::from(scores));
        Reconciled { scores, issues, overall }
    }

    pub fn merge_scores(seo: Score, performance: Score, external: Option<&ScoreCard>) -> ScoreCard {
        match external {
            None => ScoreCard {
                seo,
                performance,
                accessibility: Score::Unavailable,
                best_practices: Score::Unavailable,
            },
            Some(card) if card.is_complete() => ScoreCard {
                seo: seo.best_of(card.seo),
                performance: performance.best_of(card.performance),
                accessibility: card.accessibility,
                best_practices: card.best_practices,
            },
            // Partial card: local values win, the external one only fills a gap.
            Some(card) => ScoreCard {
                seo: seo.or(card.seo),
                performance: performance.or(card.performance),
                accessibility: card.accessibility,
                best_practices: card.best_practices,
            },
        }
    }

    /// Low-score issues for each category the external analyzer actually scored.
    pub fn external_issues(card: &ScoreCard) -> Vec<AuditIssue> {
        let categories = [
            (
                card.performance,
                IssueCategory::Performance,
                "low_performance_score",
                "performance",
            ),
            (card.seo, IssueCategory::Seo, "low_seo_score", "SEO"),
            (
                card.accessibility,
                IssueCategory::Accessibility,
                "low_accessibility_score",
                "accessibility",
            ),
            (
                card.best_practices,
                IssueCategory::BestPractices,
                "low_best_practices_score",
                "best practices",
            ),
        ];

        categories
            .into_iter()
            .filter_map(|(score, category, key, label)| {
                let value = score.value()?;
                if value < VERY_LOW {
                    Some(AuditIssue::keyed(
                        category,
                        key,
                        format!("Very low {label} score: {value}/100"),
                        Severity::High,
                    ))
                } else if value < LOW {
                    Some(AuditIssue::keyed(
                        category,
                        key,
                        format!("Low {label} score: {value}/100"),
                        Severity::Medium,
                    ))
                } else {
                    None
                }
            })
            .collect()
    }

    /// Weighted overall score over normalized category values, rounded half up.
    pub fn overall_score(scores: &CategoryScores) -> u8 {
        let weighted = scores.seo as u32 * WEIGHT_SEO
            + scores.performance as u32 * WEIGHT_PERFORMANCE
            + scores.accessibility as u32 * WEIGHT_ACCESSIBILITY
            + scores.best_practices as u32 * WEIGHT_BEST_PRACTICES;
        ((weighted + 50) / 100).min(100) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(p: u8, s: u8, a: u8, b: u8) -> ScoreCard {
        ScoreCard {
            performance: Score::Valid(p),
            seo: Score::Valid(s),
            accessibility: Score::Valid(a),
            best_practices: Score::Valid(b),
        }
    }

    fn local(seo: u8, perf: u8) -> LocalFindings {
        LocalFindings {
            seo: Score::Valid(seo),
            performance: Score::Valid(perf),
            ..Default::default()
        }
    }

    #[test]
    fn complete_card_takes_max_for_local_categories() {
        let r = Reconciler::reconcile(local(60, 90), Some(card(70, 55, 88, 92)));
        assert_eq!(r.scores.seo, Score::Valid(60));
        assert_eq!(r.scores.performance, Score::Valid(90));
        assert_eq!(r.scores.accessibility, Score::Valid(88));
        assert_eq!(r.scores.best_practices, Score::Valid(92));
    }

    #[test]
    fn failed_external_keeps_local_and_fabricates_nothing() {
        let r = Reconciler::reconcile(local(60, 70), None);
        assert_eq!(r.scores.seo, Score::Valid(60));
        assert_eq!(r.scores.performance, Score::Valid(70));
        assert_eq!(r.scores.accessibility, Score::Unavailable);
        assert_eq!(r.scores.best_practices, Score::Unavailable);
        assert!(r.issues.is_empty());

        let normalized = CategoryScores::from(r.scores);
        assert_eq!((normalized.accessibility, normalized.best_practices), (0, 0));
        // 60*.25 + 70*.35 = 39.5
        assert_eq!(r.overall, 40);
    }

    #[test]
    fn partial_card_fills_gaps_only() {
        let partial = ScoreCard {
            performance: Score::Valid(95),
            seo: Score::Unavailable,
            accessibility: Score::Valid(40),
            best_practices: Score::Unavailable,
        };
        let mut findings = local(60, 70);
        findings.seo = Score::Unavailable;
        let r = Reconciler::reconcile(findings, Some(partial));

        assert_eq!(r.scores.seo, Score::Unavailable);
        assert_eq!(r.scores.performance, Score::Valid(70));
        assert_eq!(r.scores.accessibility, Score::Valid(40));
        assert_eq!(r.scores.best_practices, Score::Unavailable);

        let keys: Vec<_> = r.issues.iter().map(|i| i.key.unwrap()).collect();
        assert_eq!(keys, vec!["low_accessibility_score"]);
    }

    #[test]
    fn unavailable_external_never_beats_local_zero() {
        let merged = Reconciler::merge_scores(
            Score::Valid(0),
            Score::Valid(0),
            Some(&ScoreCard::unavailable()),
        );
        assert_eq!(merged.seo, Score::Valid(0));
        assert_eq!(merged.performance, Score::Valid(0));
    }

    #[test]
    fn external_issue_thresholds() {
        let issues = Reconciler::external_issues(&card(49, 50, 74, 75));
        let got: Vec<_> = issues.iter().map(|i| (i.key.unwrap(), i.severity, i.category)).collect();
        assert_eq!(
            got,
            vec![
                ("low_performance_score", Severity::High, IssueCategory::Performance),
                ("low_seo_score", Severity::Medium, IssueCategory::Seo),
                ("low_accessibility_score", Severity::Medium, IssueCategory::Accessibility),
            ]
        );
        assert_eq!(issues[0].message, "Very low performance score: 49/100");
    }

    #[test]
    fn merge_preserves_discovery_order_without_dedup() {
        let mut findings = local(80, 80);
        findings.structural_issues =
            vec![AuditIssue::keyed(IssueCategory::Seo, "missing_title", "t", Severity::High)];
        findings.performance_issues = vec![
            AuditIssue::keyed(IssueCategory::Performance, "slow_lcp", "l", Severity::Medium),
            AuditIssue::keyed(IssueCategory::Performance, "slow_lcp", "l", Severity::Medium),
        ];
        let r = Reconciler::reconcile(findings, Some(card(30, 90, 90, 90)));
        let keys: Vec<_> = r.issues.iter().map(|i| i.key.unwrap()).collect();
        assert_eq!(keys, vec!["missing_title", "slow_lcp", "slow_lcp", "low_performance_score"]);
    }

    #[test]
    fn overall_score_bounds_and_weights() {
        let split = |a, b| CategoryScores {
            seo: a,
            performance: b,
            accessibility: a,
            best_practices: b,
        };
        let all = |v| split(v, v);
        assert_eq!(Reconciler::overall_score(&all(0)), 0);
        assert_eq!(Reconciler::overall_score(&all(100)), 100);
        let mixed = CategoryScores {
            seo: 80,
            performance: 60,
            accessibility: 90,
            best_practices: 70,
        };
        // 20 + 21 + 22.5 + 10.5 = 74
        assert_eq!(Reconciler::overall_score(&mixed), 74);
        for v in (0..=100).step_by(7) {
            assert!(Reconciler::overall_score(&split(v, 100 - v)) <= 100);
        }
    }
}
