//! Audit entities - report, issues and the measurements analyzers produce.

use serde::{Deserialize, Serialize};

use super::score::ScoreCard;
use crate::catalog;

// ====== Enums ======

/// Fixed issue categories. Serialized with the labels callers already consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueCategory {
    #[serde(rename = "SEO")]
    Seo,
    Performance,
    Accessibility,
    #[serde(rename = "Best Practices")]
    BestPractices,
    #[serde(rename = "HTML Structure")]
    HtmlStructure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Catalog priority tier. Ordering is critical < important < enhancement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityTier {
    Critical,
    Important,
    Enhancement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditStatus {
    Success,
    Error,
}

// ====== Issues ======

/// One detected problem, enriched from the message catalog when it carries a key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditIssue {
    pub category: IssueCategory,
    pub message: String,
    pub severity: Severity,
    pub key: Option<&'static str>,
    pub priority: Option<PriorityTier>,
    pub description: Option<String>,
    pub impact: Option<String>,
    pub action: Option<String>,
    pub code_sample: Option<String>,
}

impl AuditIssue {
    /// Issue with only the fixed fields.
    pub fn new(category: IssueCategory, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            category,
            message: message.into(),
            severity,
            key: None,
            priority: None,
            description: None,
            impact: None,
            action: None,
            code_sample: None,
        }
    }

    /// Issue linked to a catalog key. The enriched fields are copied now and never
    /// recomputed; an unknown key leaves them empty.
    pub fn keyed(
        category: IssueCategory,
        key: &'static str,
        message: impl Into<String>,
        severity: Severity,
    ) -> Self {
        let mut issue = Self::new(category, message, severity);
        issue.key = Some(key);
        if let Some(entry) = catalog::get(key) {
            issue.priority = Some(entry.priority);
            issue.description = Some(entry.description.to_string());
            issue.impact = Some(entry.impact.to_string());
            issue.action = Some(entry.action.to_string());
            issue.code_sample = entry.code_sample.map(str::to_string);
        }
        issue
    }

    /// Tier used for ranking; issues without one rank last.
    pub fn rank_tier(&self) -> PriorityTier {
        self.priority.unwrap_or(PriorityTier::Enhancement)
    }

    pub fn summary(&self) -> IssueSummary {
        IssueSummary {
            category: self.category,
            message: self.message.clone(),
            severity: self.severity,
        }
    }
}

/// Caller-facing projection of an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueSummary {
    #[serde(rename = "type")]
    pub category: IssueCategory,
    pub message: String,
    pub severity: Severity,
}

// ====== Measurements ======

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingCounts {
    pub h1: u32,
    pub h2: u32,
    pub h3: u32,
    pub h4: u32,
    pub h5: u32,
    pub h6: u32,
}

/// Structural signals read from the loaded DOM.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HtmlAnalysis {
    pub has_title: bool,
    pub title_length: usize,
    pub has_meta_description: bool,
    pub meta_description_length: usize,
    pub has_meta_keywords: bool,
    pub heading_structure: HeadingCounts,
    pub images_without_alt: u32,
    pub total_images: u32,
    pub has_viewport_meta: bool,
    pub has_canonical_link: bool,
}

/// Timing, paint and layout metrics plus the responsive probe verdicts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub load_time: f64,
    pub dom_content_loaded: f64,
    pub first_contentful_paint: f64,
    pub largest_contentful_paint: f64,
    pub cumulative_layout_shift: f64,
    pub first_input_delay: f64,
    pub is_mobile_responsive: bool,
    pub is_desktop_responsive: bool,
}

impl PerformanceMetrics {
    /// Metrics of a fast, responsive page. Handy as a baseline in tests.
    pub fn healthy() -> Self {
        Self {
            is_mobile_responsive: true,
            is_desktop_responsive: true,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub title: String,
    #[serde(rename = "firstH1")]
    pub first_heading: String,
}

// ====== Technology detection ======

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteType {
    Ecommerce,
    Blog,
    Corporate,
    Portfolio,
    Landing,
    Application,
    #[default]
    Unknown,
}

impl SiteType {
    pub fn label(&self) -> &'static str {
        match self {
            SiteType::Ecommerce => "E-commerce site",
            SiteType::Blog => "Blog or news site",
            SiteType::Corporate => "Corporate / showcase site",
            SiteType::Portfolio => "Portfolio",
            SiteType::Landing => "Landing page",
            SiteType::Application => "Web application",
            SiteType::Unknown => "Undetermined site type",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TechnologyCategory {
    Framework,
    Cms,
    Analytics,
    Library,
    Hosting,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedTechnology {
    pub name: String,
    pub category: TechnologyCategory,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnologyDetection {
    pub technologies: Vec<DetectedTechnology>,
    pub site_type: SiteType,
    pub cms: Option<String>,
    pub framework: Option<String>,
}

// ====== Report ======

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScores {
    pub seo: u8,
    pub performance: u8,
    pub accessibility: u8,
    pub best_practices: u8,
}

impl From<ScoreCard> for CategoryScores {
    fn from(card: ScoreCard) -> Self {
        Self {
            seo: card.seo.or_zero(),
            performance: card.performance.or_zero(),
            accessibility: card.accessibility.or_zero(),
            best_practices: card.best_practices.or_zero(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextualRecommendation {
    pub title: String,
    pub description: String,
    pub priority: PriorityTier,
    pub estimated_time: String,
    pub impact: String,
}

/// Site-aware narrative attached to successful reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditInsights {
    pub site_type: SiteType,
    pub site_type_label: String,
    pub cms: Option<String>,
    pub framework: Option<String>,
    pub technologies: Vec<DetectedTechnology>,
    pub contextual_recommendations: Vec<ContextualRecommendation>,
    pub quick_wins: Vec<String>,
    pub site_type_advice: String,
}

/// Per-audit options supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditOptions {
    #[serde(rename = "lighthouse", alias = "runExternalAnalyzer", default = "default_true")]
    pub run_external_analyzer: bool,
    #[serde(rename = "rowId", default, skip_serializing_if = "Option::is_none")]
    pub row_id: Option<String>,
    #[serde(rename = "company_email", default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            run_external_analyzer: true,
            row_id: None,
            contact_email: None,
        }
    }
}

/// Result of one audit. Built once, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub status: AuditStatus,
    pub url: String,
    pub score: u8,
    pub categories: CategoryScores,
    pub issues: Vec<IssueSummary>,
    pub short_summary: String,
    pub recommendations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_info: Option<PageInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insights: Option<AuditInsights>,
    #[serde(rename = "rowId", skip_serializing_if = "Option::is_none")]
    pub row_id: Option<String>,
    #[serde(rename = "company_email", skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
}

impl AuditReport {
    /// Error report: zero scores, no issues or recommendations, identifiers echoed back.
    pub fn failure(
        url: impl Into<String>,
        message: impl Into<String>,
        options: &AuditOptions,
    ) -> Self {
        Self {
            status: AuditStatus::Error,
            url: url.into(),
            score: 0,
            categories: CategoryScores::default(),
            issues: Vec::new(),
            short_summary: String::new(),
            recommendations: Vec::new(),
            message: Some(message.into()),
            page_info: None,
            insights: None,
            row_id: options.row_id.clone(),
            contact_email: options.contact_email.clone(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == AuditStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::score::Score;

    #[test]
    fn keyed_issue_copies_catalog_fields() {
        let issue = AuditIssue::keyed(
            IssueCategory::Seo,
            "missing_title",
            "Missing page title",
            Severity::High,
        );
        let entry = catalog::get("missing_title").unwrap();

        assert_eq!(issue.priority, Some(PriorityTier::Critical));
        assert_eq!(issue.description.as_deref(), Some(entry.description));
        assert_eq!(issue.impact.as_deref(), Some(entry.impact));
        assert_eq!(issue.action.as_deref(), Some(entry.action));
        assert_eq!(issue.code_sample.as_deref(), entry.code_sample);
    }

    #[test]
    fn unknown_key_keeps_only_fixed_fields() {
        let issue = AuditIssue::keyed(IssueCategory::Seo, "no_such_key", "x", Severity::Low);
        assert_eq!(issue.key, Some("no_such_key"));
        assert!(issue.priority.is_none());
        assert!(issue.description.is_none());
        assert!(issue.action.is_none());
        assert_eq!(issue.rank_tier(), PriorityTier::Enhancement);
    }

    #[test]
    fn failure_report_zeroes_everything_and_echoes_ids() {
        let options = AuditOptions {
            run_external_analyzer: true,
            row_id: Some("row-7".into()),
            contact_email: Some("ops@example.com".into()),
        };
        let report = AuditReport::failure("https://example.com", "boom", &options);

        assert_eq!(report.status, AuditStatus::Error);
        assert_eq!(report.score, 0);
        assert_eq!(report.categories, CategoryScores::default());
        assert!(report.issues.is_empty());
        assert!(report.recommendations.is_empty());
        assert_eq!(report.row_id.as_deref(), Some("row-7"));
        assert_eq!(report.contact_email.as_deref(), Some("ops@example.com"));
    }

    #[test]
    fn category_scores_collapse_unavailable_to_zero() {
        let card = ScoreCard {
            seo: Score::Valid(60),
            performance: Score::Valid(70),
            accessibility: Score::Unavailable,
            best_practices: Score::Unavailable,
        };
        let scores = CategoryScores::from(card);
        assert_eq!(scores.seo, 60);
        assert_eq!(scores.performance, 70);
        assert_eq!(scores.accessibility, 0);
        assert_eq!(scores.best_practices, 0);
    }

    #[test]
    fn report_uses_wire_field_names() {
        let options = AuditOptions {
            run_external_analyzer: false,
            row_id: Some("r1".into()),
            contact_email: Some("a@b.c".into()),
        };
        let report = AuditReport::failure("https://x.io", "m", &options);
        let json = serde_json::to_value(report).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["rowId"], "r1");
        assert_eq!(json["company_email"], "a@b.c");
        assert!(json["categories"].get("bestPractices").is_some());
        assert!(json.get("shortSummary").is_some());
        assert!(json.get("insights").is_none());
    }

    #[test]
    fn options_default_to_running_the_external_analyzer() {
        let options: AuditOptions = serde_json::from_str("{}").unwrap();
        assert!(options.run_external_analyzer);

        let options: AuditOptions =
            serde_json::from_str(r#"{"runExternalAnalyzer": false}"#).unwrap();
        assert!(!options.run_external_analyzer);
    }
}
