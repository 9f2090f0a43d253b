//! Technology and site-type detection. Only feeds recommendation wording, never scores.

use scraper::Html;

use crate::browser::TechnologyGlobals;
use crate::domain::{
    Confidence, DetectedTechnology, SiteType, TechnologyCategory, TechnologyDetection,
};
use crate::extractor::{MarkupSignals, PageExtractor};

const CTA_PHRASES: &[&str] = &["sign up", "subscribe", "register", "inscription"];

pub struct TechnologyDetector;

impl TechnologyDetector {
    /// Detect from a DOM snapshot plus the window globals read from the live page.
    pub fn detect(raw_html: &str, globals: TechnologyGlobals) -> TechnologyDetection {
        let signals = {
            let document = Html::parse_document(raw_html);
            PageExtractor::markup_signals(&document, raw_html)
        };
        Self::from_signals(&signals, globals)
    }

    pub fn from_signals(
        signals: &MarkupSignals,
        globals: TechnologyGlobals,
    ) -> TechnologyDetection {
        let mut technologies = Vec::new();
        let mut site_type = SiteType::Unknown;

        // Window globals and framework roots
        if globals.react {
            push(&mut technologies, "React", TechnologyCategory::Framework, Confidence::High);
        }
        if globals.vue {
            push(&mut technologies, "Vue.js", TechnologyCategory::Framework, Confidence::High);
        }
        if globals.angular || signals.angular_root {
            push(&mut technologies, "Angular", TechnologyCategory::Framework, Confidence::High);
        }
        if globals.next || signals.next_root {
            push(&mut technologies, "Next.js", TechnologyCategory::Framework, Confidence::High);
        }
        if globals.jquery {
            push(&mut technologies, "jQuery", TechnologyCategory::Library, Confidence::High);
        }
        if globals.analytics {
            push(
                &mut technologies,
                "Google Analytics",
                TechnologyCategory::Analytics,
                Confidence::High,
            );
        }

        // Generator meta
        if let Some(generator) = signals.generator.as_deref() {
            let cms = [
                ("wordpress", "WordPress", Some(SiteType::Blog)),
                ("shopify", "Shopify", Some(SiteType::Ecommerce)),
                ("wix", "Wix", None),
                ("drupal", "Drupal", None),
                ("joomla", "Joomla", None),
            ];
            let found = cms.iter().find(|(needle, _, _)| generator.contains(needle));
            if let Some((_, name, implied)) = found {
                push(&mut technologies, name, TechnologyCategory::Cms, Confidence::High);
                if let Some(implied) = implied {
                    site_type = *implied;
                }
            }
        }

        // Markup markers
        let html = signals.html_lower.as_str();
        if signals.body_classes.contains("wordpress")
            || html.contains("wp-content")
            || html.contains("wp-includes")
        {
            push(&mut technologies, "WordPress", TechnologyCategory::Cms, Confidence::Medium);
            site_type = SiteType::Blog;
        }
        if html.contains("shopify") || html.contains("cdn.shopify") {
            push(&mut technologies, "Shopify", TechnologyCategory::Cms, Confidence::Medium);
            site_type = SiteType::Ecommerce;
        }
        if html.contains("woocommerce")
            || html.contains("add-to-cart")
            || html.contains("shopping-cart")
        {
            site_type = SiteType::Ecommerce;
        }

        // Content heuristics, only while the type is still open
        let has_any = |needles: &[&str]| needles.iter().any(|n| html.contains(n));

        if site_type == SiteType::Unknown
            && signals.article_count > 3
            && has_any(&["blog", "article", "post"])
        {
            site_type = SiteType::Blog;
        }
        if site_type == SiteType::Unknown
            && has_any(&["service", "solution"])
            && has_any(&["about", "à propos"])
            && has_any(&["contact", "contactez"])
        {
            site_type = SiteType::Corporate;
        }
        if site_type == SiteType::Unknown
            && (has_any(&["portfolio", "projets", "réalisations"]) || signals.gallery_count > 0)
        {
            site_type = SiteType::Portfolio;
        }
        if site_type == SiteType::Unknown {
            let cta_mentions: usize = CTA_PHRASES.iter().map(|p| html.matches(p).count()).sum();
            if cta_mentions > 2 && signals.hero_count > 0 && signals.submit_count <= 3 {
                site_type = SiteType::Landing;
            }
        }

        let cms = technologies
            .iter()
            .find(|t| t.category == TechnologyCategory::Cms)
            .map(|t| t.name.clone());
        let framework = technologies
            .iter()
            .find(|t| t.category == TechnologyCategory::Framework)
            .map(|t| t.name.clone());

        TechnologyDetection { technologies, site_type, cms, framework }
    }
}

fn push(
    technologies: &mut Vec<DetectedTechnology>,
    name: &str,
    category: TechnologyCategory,
    confidence: Confidence,
) {
    if !technologies.iter().any(|t| t.name == name) {
        technologies.push(DetectedTechnology { name: name.to_string(), category, confidence });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(html: &str) -> TechnologyDetection {
        TechnologyDetector::detect(html, TechnologyGlobals::default())
    }

    #[test]
    fn wordpress_generator_means_blog() {
        let d = detect(
            r#"<html><head><meta name="generator" content="WordPress 6.5"></head></html>"#,
        );
        assert_eq!(d.cms.as_deref(), Some("WordPress"));
        assert_eq!(d.site_type, SiteType::Blog);
        assert_eq!(d.technologies.len(), 1);
        assert_eq!(d.technologies[0].confidence, Confidence::High);
    }

    #[test]
    fn shopify_cdn_means_ecommerce() {
        let d = detect(
            r#"<html><body><script src="https://cdn.shopify.com/s/app.js"></script></body></html>"#,
        );
        assert_eq!(d.cms.as_deref(), Some("Shopify"));
        assert_eq!(d.site_type, SiteType::Ecommerce);
    }

    #[test]
    fn cart_markers_override_blog() {
        let d =
            detect(r#"<html><body class="wordpress"><a class="add-to-cart">Buy</a></body></html>"#);
        assert_eq!(d.cms.as_deref(), Some("WordPress"));
        assert_eq!(d.site_type, SiteType::Ecommerce);
    }

    #[test]
    fn corporate_keywords() {
        let d =
            detect("<html><body><a>Our services</a><a>About us</a><a>Contact</a></body></html>");
        assert_eq!(d.site_type, SiteType::Corporate);
        assert!(d.cms.is_none());
    }

    #[test]
    fn landing_page_heuristic() {
        let d = detect(
            r#"<html><body><div class="hero">Sign up now</div><p>Subscribe</p><p>Register today</p>
               <button type="submit">Go</button></body></html>"#,
        );
        assert_eq!(d.site_type, SiteType::Landing);
    }

    #[test]
    fn globals_and_framework_roots() {
        let globals = TechnologyGlobals { react: true, analytics: true, ..Default::default() };
        let html = r#"<html><body><div id="__next"></div></body></html>"#;
        let d = TechnologyDetector::detect(html, globals);
        let names: Vec<_> = d.technologies.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["React", "Next.js", "Google Analytics"]);
        assert_eq!(d.framework.as_deref(), Some("React"));
        assert_eq!(d.site_type, SiteType::Unknown);
    }
}
