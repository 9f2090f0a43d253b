//! End-to-end audit pipeline tests against the scripted browser.

use std::sync::Arc;
use std::time::Duration;

use pageaudit::browser::{PerformanceSnapshot, TechnologyGlobals};
use pageaudit::config::AuditConfig;
use pageaudit::domain::{AuditOptions, AuditStatus, Score, ScoreCard, Severity, SiteType};
use pageaudit::service::{Auditor, ExternalAnalyzer, SiteAuditor};
use pageaudit::test_utils::{FakeAnalyzer, FakeBrowser, FakeSite};

const BARE_PAGE: &str = r#"<html><head></head><body>
  <h2>Latest news</h2>
  <img src="a.png"><img src="b.png"><img src="c.png" alt="">
  <div class="content">Hello</div>
</body></html>"#;

fn auditor(browser: &FakeBrowser, external: Option<Arc<FakeAnalyzer>>) -> SiteAuditor {
    SiteAuditor::new(
        Arc::new(browser.clone()),
        external.map(|a| a as Arc<dyn ExternalAnalyzer>),
        AuditConfig::default(),
    )
}

fn options(row_id: &str) -> AuditOptions {
    AuditOptions {
        run_external_analyzer: true,
        row_id: Some(row_id.to_string()),
        contact_email: Some("owner@acme.test".to_string()),
    }
}

#[tokio::test]
async fn bare_page_produces_ranked_findings() {
    let slow = PerformanceSnapshot {
        load_time: 6200.0,
        dom_content_loaded: 2500.0,
        first_contentful_paint: 3400.0,
        largest_contentful_paint: 4800.0,
        cumulative_layout_shift: 0.05,
        first_input_delay: 0.0,
    };
    let site = FakeSite::from_html(BARE_PAGE).with_snapshot(slow).with_mobile_body_width(1200.0);
    let browser = FakeBrowser::new().with_site("https://bare.test/", site);
    let analyzer = Arc::new(FakeAnalyzer::scoring(ScoreCard {
        seo: Score::Valid(45),
        performance: Score::Valid(20),
        accessibility: Score::Valid(62),
        best_practices: Score::Valid(80),
    }));

    let report = auditor(&browser, Some(analyzer))
        .run_audit("bare.test/", &options("row-1"))
        .await;

    assert_eq!(report.status, AuditStatus::Success);
    assert_eq!(report.url, "https://bare.test/");
    // Local seo and performance both bottom out at 0, so the external values win.
    assert_eq!(report.categories.seo, 45);
    assert_eq!(report.categories.performance, 20);
    assert_eq!(report.categories.accessibility, 62);
    assert_eq!(report.categories.best_practices, 80);
    // 45*.25 + 20*.35 + 62*.25 + 80*.15 = 45.75
    assert_eq!(report.score, 46);

    let high = report.issues.iter().filter(|i| i.severity == Severity::High).count();
    assert!(high >= 5);
    assert!(report.short_summary.starts_with("Site needs major improvements"));
    assert!(report.recommendations.len() <= 7);
    assert!(!report.recommendations.is_empty());

    let insights = report.insights.expect("insights on success");
    assert!(insights.contextual_recommendations.len() <= 7);
    assert_eq!(insights.quick_wins.len(), 3);
    assert!(insights.quick_wins[0].starts_with("Missing meta description:"));
    assert!(!insights.site_type_advice.is_empty());

    assert_eq!(report.row_id.as_deref(), Some("row-1"));
    assert_eq!(report.contact_email.as_deref(), Some("owner@acme.test"));
}

#[tokio::test]
async fn dns_failure_becomes_error_report() {
    let browser = FakeBrowser::new();
    let report = auditor(&browser, None)
        .run_audit("https://nowhere.invalid", &options("row-9"))
        .await;

    assert_eq!(report.status, AuditStatus::Error);
    assert_eq!(report.message.as_deref(), Some("Site inaccessible: domain not found"));
    assert_eq!(report.score, 0);
    assert_eq!(report.categories.seo, 0);
    assert!(report.issues.is_empty());
    assert!(report.recommendations.is_empty());
    assert!(report.insights.is_none());
    assert_eq!(report.row_id.as_deref(), Some("row-9"));
    assert_eq!(report.contact_email.as_deref(), Some("owner@acme.test"));
    assert_eq!(browser.sessions_closed(), 1);
}

#[tokio::test]
async fn refused_connection_is_classified() {
    let site = FakeSite::healthy().unreachable("net::ERR_CONNECTION_REFUSED at https://down.test");
    let browser = FakeBrowser::new().with_site("https://down.test", site);
    let report = auditor(&browser, None)
        .run_audit("down.test", &AuditOptions::default())
        .await;
    assert_eq!(report.message.as_deref(), Some("Site inaccessible: connection refused"));
}

#[tokio::test]
async fn batch_keeps_order_and_isolates_failures() {
    let browser = FakeBrowser::new()
        .with_site("https://one.test", FakeSite::healthy())
        .with_site("https://three.test", FakeSite::healthy());
    let sites = vec![
        ("one.test".to_string(), options("1")),
        ("two.test".to_string(), options("2")),
        ("three.test".to_string(), options("3")),
    ];

    let reports = auditor(&browser, None).audit_batch(&sites).await;

    assert_eq!(reports.len(), 3);
    let urls: Vec<_> = reports.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(urls, vec!["https://one.test", "https://two.test", "https://three.test"]);
    assert!(reports[0].is_success());
    assert_eq!(reports[1].status, AuditStatus::Error);
    assert_eq!(reports[1].message.as_deref(), Some("Site inaccessible: domain not found"));
    assert_eq!(reports[1].row_id.as_deref(), Some("2"));
    assert!(reports[2].is_success());

    assert_eq!(browser.launches(), 3);
    assert_eq!(browser.sessions_closed(), 3);
    assert_eq!(browser.pages_closed(), 3);
}

#[tokio::test]
async fn close_failures_leave_reports_untouched() {
    let browser = FakeBrowser::new()
        .with_site("https://acme.test", FakeSite::healthy())
        .with_failing_close();
    let audit = auditor(&browser, None);

    let report = audit.run_audit("acme.test", &AuditOptions::default()).await;
    assert_eq!(report.status, AuditStatus::Success);
    assert!(report.message.is_none());
    assert_eq!(report.categories.seo, 100);

    let report = audit.run_audit("gone.test", &AuditOptions::default()).await;
    assert_eq!(report.status, AuditStatus::Error);
    assert_eq!(report.message.as_deref(), Some("Site inaccessible: domain not found"));

    assert_eq!(browser.pages_opened(), 2);
    assert_eq!(browser.pages_closed(), 2);
    assert_eq!(browser.sessions_closed(), 2);
}

#[tokio::test]
async fn launch_failure_and_timeout() {
    let browser = FakeBrowser::new().with_launch_error("Could not find Chrome executable");
    let report = auditor(&browser, None).run_audit("acme.test", &AuditOptions::default()).await;
    assert_eq!(report.status, AuditStatus::Error);
    assert_eq!(
        report.message.as_deref(),
        Some("Error: browser launch failed: Could not find Chrome executable")
    );

    let browser = FakeBrowser::new().with_launch_delay(Duration::from_secs(5));
    let config = AuditConfig {
        launch_timeout: Duration::from_millis(50),
        ..AuditConfig::default()
    };
    let report = SiteAuditor::new(Arc::new(browser.clone()), None, config)
        .run_audit("acme.test", &AuditOptions::default())
        .await;
    assert_eq!(report.message.as_deref(), Some("Timeout: unable to launch the browser"));
    assert_eq!(browser.launches(), 0);
}

#[tokio::test]
async fn failed_external_analyzer_keeps_local_scores() {
    // Missing canonical (-10), missing h1 (-15), 5 unlabelled images (-10): 65 seo.
    let html = r#"<html><head>
        <title>Acme Plumbing Seattle - Emergency Repairs, Free Quotes</title>
        <meta name="description" content="Licensed plumbers in Seattle available around the clock. Fast emergency repairs, leak detection and drain cleaning with free written quotes today.">
        <meta name="viewport" content="width=device-width, initial-scale=1.0">
        </head><body>
        <img src="1.jpg"><img src="2.jpg"><img src="3.jpg"><img src="4.jpg"><img src="5.jpg">
        </body></html>"#;
    let snapshot = PerformanceSnapshot {
        load_time: 3500.0,
        dom_content_loaded: 1200.0,
        first_contentful_paint: 1700.0,
        largest_contentful_paint: 2200.0,
        cumulative_layout_shift: 0.0,
        first_input_delay: 0.0,
    };
    let site = FakeSite::from_html(html).with_snapshot(snapshot);
    let browser = FakeBrowser::new().with_site("https://acme.test", site);
    let analyzer = Arc::new(FakeAnalyzer::failing("Lighthouse timeout after 90s"));

    let report = auditor(&browser, Some(analyzer.clone()))
        .run_audit("https://acme.test", &AuditOptions::default())
        .await;

    assert_eq!(analyzer.calls().len(), 1);
    assert!(report.is_success());
    assert_eq!(report.categories.seo, 65);
    // load 20 + fcp 5 + lcp 5
    assert_eq!(report.categories.performance, 70);
    assert_eq!(report.categories.accessibility, 0);
    assert_eq!(report.categories.best_practices, 0);
    assert!(report.issues.iter().all(|i| !i.message.contains("score")));
    assert_eq!(browser.sessions_closed(), 1);
}

#[tokio::test]
async fn technology_detection_feeds_insights() {
    let html = r#"<html><head>
        <meta name="generator" content="WordPress 6.4">
        <title>Short</title>
        </head><body><h1>Blog</h1></body></html>"#;
    let globals = TechnologyGlobals { jquery: true, ..Default::default() };
    let site = FakeSite::from_html(html).with_globals(globals);
    let browser = FakeBrowser::new().with_site("https://blog.test", site);

    let report = auditor(&browser, None)
        .run_audit(
            "blog.test",
            &AuditOptions { run_external_analyzer: false, ..Default::default() },
        )
        .await;

    let insights = report.insights.expect("insights");
    assert_eq!(insights.site_type, SiteType::Blog);
    assert_eq!(insights.site_type_label, "Blog or news site");
    assert_eq!(insights.cms.as_deref(), Some("WordPress"));
    let names: Vec<_> = insights.technologies.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["jQuery", "WordPress"]);
    assert!(insights.site_type_advice.starts_with("For a blog, SEO is your main growth lever."));
    assert!(insights.site_type_advice.contains("multiply organic traffic"));
}
