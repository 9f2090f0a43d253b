use scraper::{Html, Selector};
use std::sync::OnceLock;

use crate::domain::{HeadingCounts, HtmlAnalysis};

/// Markup-level signals used by technology and site-type detection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkupSignals {
    /// Lowercased `<meta name="generator">` content
    pub generator: Option<String>,
    pub body_classes: String,
    /// Lowercased serialized document
    pub html_lower: String,
    pub article_count: usize,
    pub gallery_count: usize,
    pub hero_count: usize,
    pub submit_count: usize,
    pub angular_root: bool,
    pub next_root: bool,
}

pub struct PageExtractor;

impl PageExtractor {
    pub fn extract_title(html: &Html) -> Option<String> {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector = SELECTOR.get_or_init(|| Selector::parse("title").unwrap());
        html.select(selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty())
    }

    pub fn extract_meta_description(html: &Html) -> Option<String> {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector =
            SELECTOR.get_or_init(|| Selector::parse("meta[name='description']").unwrap());
        html.select(selector)
            .next()
            .and_then(|el| el.value().attr("content"))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    pub fn has_meta_keywords(html: &Html) -> bool {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector = SELECTOR.get_or_init(|| Selector::parse("meta[name='keywords']").unwrap());
        html.select(selector)
            .next()
            .and_then(|el| el.value().attr("content"))
            .is_some_and(|s| !s.trim().is_empty())
    }

    pub fn has_viewport_meta(html: &Html) -> bool {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector = SELECTOR.get_or_init(|| Selector::parse("meta[name='viewport']").unwrap());
        html.select(selector).next().is_some()
    }

    pub fn has_canonical_link(html: &Html) -> bool {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector = SELECTOR.get_or_init(|| Selector::parse("link[rel='canonical']").unwrap());
        html.select(selector).next().is_some()
    }

    pub fn heading_counts(html: &Html) -> HeadingCounts {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector = SELECTOR.get_or_init(|| Selector::parse("h1, h2, h3, h4, h5, h6").unwrap());

        let mut counts = HeadingCounts::default();
        for element in html.select(selector) {
            match element.value().name() {
                "h1" => counts.h1 += 1,
                "h2" => counts.h2 += 1,
                "h3" => counts.h3 += 1,
                "h4" => counts.h4 += 1,
                "h5" => counts.h5 += 1,
                "h6" => counts.h6 += 1,
                _ => {}
            }
        }
        counts
    }

    /// `(images without a non-empty alt, total images)`
    pub fn image_alt_audit(html: &Html) -> (u32, u32) {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector = SELECTOR.get_or_init(|| Selector::parse("img").unwrap());

        let mut missing = 0;
        let mut total = 0;
        for element in html.select(selector) {
            total += 1;
            let has_alt = element
                .value()
                .attr("alt")
                .is_some_and(|a| !a.trim().is_empty());
            if !has_alt {
                missing += 1;
            }
        }
        (missing, total)
    }

    /// Text of the first `<h1>`, trimmed. Empty when there is none.
    pub fn extract_first_heading(html: &Html) -> String {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector = SELECTOR.get_or_init(|| Selector::parse("h1").unwrap());
        html.select(selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default()
    }

    /// All structural signals in one pass over the parsed document.
    pub fn analyze(html: &Html) -> HtmlAnalysis {
        let title = Self::extract_title(html);
        let description = Self::extract_meta_description(html);
        let (images_without_alt, total_images) = Self::image_alt_audit(html);

        HtmlAnalysis {
            has_title: title.is_some(),
            title_length: title.as_deref().map_or(0, |t| t.chars().count()),
            has_meta_description: description.is_some(),
            meta_description_length: description.as_deref().map_or(0, |d| d.chars().count()),
            has_meta_keywords: Self::has_meta_keywords(html),
            heading_structure: Self::heading_counts(html),
            images_without_alt,
            total_images,
            has_viewport_meta: Self::has_viewport_meta(html),
            has_canonical_link: Self::has_canonical_link(html),
        }
    }

    pub fn markup_signals(html: &Html, raw: &str) -> MarkupSignals {
        static GENERATOR: OnceLock<Selector> = OnceLock::new();
        static BODY: OnceLock<Selector> = OnceLock::new();
        static ARTICLE: OnceLock<Selector> = OnceLock::new();
        static GALLERY: OnceLock<Selector> = OnceLock::new();
        static HERO: OnceLock<Selector> = OnceLock::new();
        static SUBMIT: OnceLock<Selector> = OnceLock::new();
        static ANGULAR: OnceLock<Selector> = OnceLock::new();
        static NEXT_ROOT: OnceLock<Selector> = OnceLock::new();

        let generator =
            GENERATOR.get_or_init(|| Selector::parse("meta[name='generator']").unwrap());
        let body = BODY.get_or_init(|| Selector::parse("body").unwrap());
        let article = ARTICLE.get_or_init(|| Selector::parse("article").unwrap());
        let gallery =
            GALLERY.get_or_init(|| Selector::parse(".gallery, .portfolio, .projects").unwrap());
        let hero = HERO.get_or_init(|| Selector::parse(".hero, .banner, .jumbotron").unwrap());
        let submit = SUBMIT.get_or_init(|| {
            Selector::parse("button[type='submit'], input[type='submit'], .cta").unwrap()
        });
        let angular = ANGULAR.get_or_init(|| Selector::parse("[ng-app], [ng-version]").unwrap());
        let next_root = NEXT_ROOT.get_or_init(|| Selector::parse("#__next").unwrap());

        MarkupSignals {
            generator: html
                .select(generator)
                .next()
                .and_then(|el| el.value().attr("content"))
                .map(|c| c.to_lowercase()),
            body_classes: html
                .select(body)
                .next()
                .and_then(|el| el.value().attr("class"))
                .unwrap_or_default()
                .to_lowercase(),
            html_lower: raw.to_lowercase(),
            article_count: html.select(article).count(),
            gallery_count: html.select(gallery).count(),
            hero_count: html.select(hero).count(),
            submit_count: html.select(submit).count(),
            angular_root: html.select(angular).next().is_some(),
            next_root: html.select(next_root).next().is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!doctype html><html><head>
        <title>  A reasonably descriptive page title for tests  </title>
        <meta name="description" content="short">
        <meta name="viewport" content="width=device-width">
        <meta name="generator" content="WordPress 6.4">
        </head><body class="home Blog">
        <h1> Welcome </h1><h2>a</h2><h2>b</h2><h3>c</h3>
        <img src="a.png" alt="A"><img src="b.png" alt="  "><img src="c.png">
        </body></html>"#;

    #[test]
    fn analyze_reads_structure() {
        let html = Html::parse_document(PAGE);
        let analysis = PageExtractor::analyze(&html);

        assert!(analysis.has_title);
        assert_eq!(analysis.title_length, "A reasonably descriptive page title for tests".len());
        assert!(analysis.has_meta_description);
        assert_eq!(analysis.meta_description_length, 5);
        assert!(!analysis.has_meta_keywords);
        assert!(analysis.has_viewport_meta);
        assert!(!analysis.has_canonical_link);
        assert_eq!(analysis.heading_structure.h1, 1);
        assert_eq!(analysis.heading_structure.h2, 2);
        assert_eq!(analysis.heading_structure.h3, 1);
        assert_eq!((analysis.images_without_alt, analysis.total_images), (2, 3));
    }

    #[test]
    fn empty_title_counts_as_missing() {
        let html =
            Html::parse_document("<html><head><title>   </title></head><body></body></html>");
        let analysis = PageExtractor::analyze(&html);
        assert!(!analysis.has_title);
        assert_eq!(analysis.title_length, 0);
    }

    #[test]
    fn first_heading_and_markers() {
        let html = Html::parse_document(PAGE);
        assert_eq!(PageExtractor::extract_first_heading(&html), "Welcome");

        let signals = PageExtractor::markup_signals(&html, PAGE);
        assert_eq!(signals.generator.as_deref(), Some("wordpress 6.4"));
        assert_eq!(signals.body_classes, "home blog");
        assert!(!signals.next_root);
    }
}
