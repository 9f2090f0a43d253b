//! Message catalog: the static knowledge base behind every keyed issue.
//!
//! Entries are compiled in and indexed once on first lookup. There is no mutation API.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::domain::models::PriorityTier;

/// Fallback short text for keys the catalog does not know.
pub const UNKNOWN_SHORT: &str = "Issue detected";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub key: &'static str,
    pub short: &'static str,
    pub description: &'static str,
    pub impact: &'static str,
    pub action: &'static str,
    pub priority: PriorityTier,
    pub code_sample: Option<&'static str>,
}

/// Entry for `key`, if the catalog has one.
pub fn get(key: &str) -> Option<&'static CatalogEntry> {
    index().get(key).copied()
}

/// Short text for `key`, or a generic label.
pub fn short_or_default(key: &str) -> &'static str {
    get(key).map(|e| e.short).unwrap_or(UNKNOWN_SHORT)
}

/// Every entry, in declaration order.
pub fn all() -> &'static [CatalogEntry] {
    ENTRIES
}

fn index() -> &'static HashMap<&'static str, &'static CatalogEntry> {
    static INDEX: OnceLock<HashMap<&'static str, &'static CatalogEntry>> = OnceLock::new();
    INDEX.get_or_init(|| ENTRIES.iter().map(|e| (e.key, e)).collect())
}

use PriorityTier::{Critical, Enhancement, Important};

static ENTRIES: &[CatalogEntry] = &[
    // ====== Structure / SEO ======
    CatalogEntry {
        key: "missing_title",
        short: "Missing page title",
        description: "The page title (the <title> tag) is the single most important on-page element for search. It is the blue link shown in Google results and the text in the browser tab. Without it the page is practically invisible to search engines and visitors cannot tell what the site is about.",
        impact: "Critical SEO impact: 40 to 60% loss of organic visibility on Google. Very low click-through rate from search results.",
        action: "Add a <title> tag inside the <head> of the page. Keep it between 50 and 60 characters, describe the page content precisely and include your main keywords.",
        priority: Critical,
        code_sample: Some("<head>\n  <title>Company name - Main service | City</title>\n</head>"),
    },
    CatalogEntry {
        key: "title_too_short",
        short: "Page title too short",
        description: "The page title is shorter than 30 characters. A short title cannot describe the content properly and limits ranking potential. Google and visitors need more information to understand what the page is about.",
        impact: "Moderate SEO impact: missed opportunity to include important keywords. Click-through rate 20 to 30% lower.",
        action: "Expand the title to 50 to 60 characters. Add details about your business, location or main services. Think about what prospective customers would type into Google.",
        priority: Important,
        code_sample: Some("<title>Plumber Seattle - 24/7 Emergency Repairs | Free Quote</title>"),
    },
    CatalogEntry {
        key: "title_too_long",
        short: "Page title too long",
        description: "The page title exceeds 60 characters. Google truncates it in search results with an ellipsis (...), which weakens the message and can discourage visitors from clicking.",
        impact: "UX impact: truncated message in Google. Potential loss of 10 to 15% of clicks.",
        action: "Shorten the title to 50-60 characters at most. Keep only the essentials: company name or main service, and perhaps your location. Be concise and punchy.",
        priority: Important,
        code_sample: Some("<title>Organic Hair Salon Boston - Natural Cuts & Colors</title>"),
    },
    CatalogEntry {
        key: "missing_meta_description",
        short: "Missing meta description",
        description: "The meta description is the text shown under the title in Google results. It is your chance to convince searchers to click your site rather than a competitor's. Without one, Google shows an arbitrary excerpt of the page, usually not very engaging.",
        impact: "Significant SEO impact: 15 to 25% drop in click-through rate from Google. Fewer visitors even when the page ranks well.",
        action: "Add a <meta name='description'> tag in the <head> of the page. Write 150 to 160 characters that present your offer attractively and invite the click. Include your main keywords and a call to action.",
        priority: Critical,
        code_sample: Some("<meta name=\"description\" content=\"Certified plumber in Seattle. On site within 30 minutes, free quote. Boiler repair, leaks, drain cleaning. Call (206) XXX-XXXX\">"),
    },
    CatalogEntry {
        key: "meta_description_too_short",
        short: "Meta description too short",
        description: "The meta description is shorter than 120 characters. You are not using all the space Google gives you to convince searchers to visit. It is a missed chance to stand out from competitors.",
        impact: "Marketing impact: competitors with complete descriptions take the advantage. Loss of 10 to 15% of potential clicks.",
        action: "Expand the description to 150 to 160 characters. Add details about your services, what sets you apart, or a clear call to action. Think about what would convince a hesitant customer.",
        priority: Important,
        code_sample: Some("<meta name=\"description\" content=\"Authentic Italian restaurant in downtown Chicago. Fresh homemade pasta, wood-fired pizza, organic produce. Patio open. Book online or call (312) XXX-XXXX\">"),
    },
    CatalogEntry {
        key: "meta_description_too_long",
        short: "Meta description too long",
        description: "The meta description exceeds 160 characters. Google cuts it in search results and the message ends with an ellipsis (...). Important information at the end is never seen by searchers.",
        impact: "UX impact: incomplete message in Google results. Less clarity and weaker marketing.",
        action: "Reduce the description to 150-160 characters. Put the most important information first. Be concise: lead with your main advantage, your location if relevant, and possibly a short call to action.",
        priority: Important,
        code_sample: Some("<meta name=\"description\" content=\"Chartered accountant in Denver. Full bookkeeping: year-end accounts, tax returns, advice. First meeting free. Call (303) XXX-XXXX\">"),
    },
    CatalogEntry {
        key: "missing_viewport_meta",
        short: "Missing viewport meta tag",
        description: "The viewport tag is required for the site to render properly on phones and tablets. Without it the page is shown as on a desktop, with tiny unreadable text and buttons too small to tap. More than 60% of visitors browse from a mobile device.",
        impact: "Critical impact: site unreadable on mobile. 50 to 70% of mobile visitors leave immediately. Ranking penalty in Google mobile results.",
        action: "Add the <meta name='viewport'> tag to the <head> of every page. It lets the browser adapt the layout to the screen size. It is the first required step of responsive design.",
        priority: Critical,
        code_sample: Some("<head>\n  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n</head>"),
    },
    CatalogEntry {
        key: "missing_canonical_link",
        short: "Missing canonical link",
        description: "The canonical link tells Google which version of a page is the main one when it is reachable at several addresses (with or without www, with different parameters, and so on). Without it Google may see duplicate content, which dilutes ranking and can lead to penalties.",
        impact: "Moderate SEO impact: duplicate content risk in Google's eyes. Ranking diluted across several versions of the same page. 10 to 20% loss of SEO effectiveness.",
        action: "Add a <link rel='canonical'> tag in the <head> pointing to the main URL of the page. Always use the full URL with the https:// scheme. Make sure every version of the page points to the same canonical URL.",
        priority: Important,
        code_sample: Some("<head>\n  <link rel=\"canonical\" href=\"https://www.yoursite.com/your-page\">\n</head>"),
    },
    CatalogEntry {
        key: "missing_h1",
        short: "No H1 heading found",
        description: "The H1 heading is the main title of the page, summarising its subject in a few words. It is a key landmark for Google and for visitors. Without an H1, Google struggles to understand the page and visitors lose their bearings.",
        impact: "Significant SEO impact: Google cannot clearly identify the page topic. 20 to 30% less effective on your main keyword. Poor user experience.",
        action: "Add a visible H1 heading at the start of the main content. It should summarise the page topic in a few words and include your main keyword. Use only one H1 per page (use H2, H3 and so on for subheadings).",
        priority: Critical,
        code_sample: Some("<h1>Yoga classes in Austin - Beginners and advanced</h1>"),
    },
    CatalogEntry {
        key: "multiple_h1",
        short: "Multiple H1 headings found",
        description: "The page has several H1 tags. The H1 should be unique since it is the main title identifying the page topic. Several H1s confuse Google and dilute the weight of your keywords, like a book with several cover titles.",
        impact: "Moderate SEO impact: Google is unsure of the page's main topic. 15 to 25% dilution of your main keywords.",
        action: "Keep a single H1 per page for the main title. Turn the others into H2, H3 and so on according to their importance. Recommended structure: one H1, several H2 sections, H3 under H2 where needed.",
        priority: Important,
        code_sample: Some("<h1>Main page title</h1>\n<h2>First section</h2>\n<h3>Subsection</h3>\n<h2>Second section</h2>"),
    },
    CatalogEntry {
        key: "images_without_alt",
        short: "Images without alternative text",
        description: "Some images have no 'alt' attribute describing their content. Visually impaired visitors using a screen reader cannot understand them, Google cannot index them properly, and nothing tells the visitor what a broken image should show.",
        impact: "Accessibility and SEO impact: excludes visually impaired visitors. Images invisible to Google image search. Non-compliance with accessibility standards.",
        action: "Add an 'alt' attribute to every image. Describe precisely what the image shows in a short sentence. Use alt=\"\" for purely decorative images. Include keywords naturally where relevant.",
        priority: Critical,
        code_sample: Some("<img src=\"barber-cut.jpg\" alt=\"Barber giving a modern men's haircut\">\n<img src=\"decoration.svg\" alt=\"\">"),
    },
    CatalogEntry {
        key: "h2_without_h1",
        short: "H2 headings without an H1",
        description: "The page has subheadings (H2) but no main heading (H1), like chapters in a book with no book title. This illogical structure confuses Google and makes reading less fluid. Heading hierarchy should go H1, then H2, then H3.",
        impact: "SEO and UX impact: incoherent structure for Google. The main topic is hard to grasp. Roughly 15% loss of SEO effectiveness.",
        action: "Add an H1 at the start of the main content, before the H2s. The H1 is the most important heading, followed by H2 for main sections and H3 for subsections. Always keep that hierarchy.",
        priority: Important,
        code_sample: Some("<article>\n  <h1>Main article title</h1>\n  <h2>First section</h2>\n  <p>Content...</p>\n  <h2>Second section</h2>\n</article>"),
    },
    // ====== Performance / responsive ======
    CatalogEntry {
        key: "slow_load_time",
        short: "Slow page load",
        description: "The site takes too long to load completely. Past 3 seconds visitors start leaving: 40% give up after 3 seconds, 60% after 5 seconds. Google also ranks slow sites lower. A slow site costs customers and revenue.",
        impact: "Critical business impact: 20 to 40% of visitors lost before they even see the site. Lower Google ranking. Direct loss of revenue.",
        action: "Optimise images (compression, WebP), enable caching, use fast hosting, minify CSS/JS. Measure speed regularly with PageSpeed Insights. Target: under 2 seconds.",
        priority: Critical,
        code_sample: None,
    },
    CatalogEntry {
        key: "slow_fcp",
        short: "Slow First Contentful Paint",
        description: "First Contentful Paint (FCP) measures the time until the first element of the page appears on screen. A high FCP means visitors stare at a blank screen for seconds and assume the site is broken. Many leave before seeing anything.",
        impact: "UX and conversion impact: frustration with the blank screen. High bounce rate (40% leave before anything renders). The site feels broken or slow.",
        action: "Optimise critical resource loading: inline critical CSS in the <head>, preload fonts, tune the server. Reduce the initial HTML size. Remove render-blocking resources. Target FCP: under 1.8 seconds.",
        priority: Critical,
        code_sample: None,
    },
    CatalogEntry {
        key: "slow_lcp",
        short: "Slow Largest Contentful Paint",
        description: "Largest Contentful Paint (LCP) measures the time until the main element of the page is visible, often a large image or a prominent text block. A high LCP means visitors wait a long time for the main content. It is a major Google ranking signal.",
        impact: "Major SEO and UX impact: official Google ranking criterion. Poor user experience. 30 to 50% of visitors lost. Fewer conversions.",
        action: "Optimise the main element: compress the hero image, use a CDN, preload key resources. Make the server respond quickly. Remove render-blocking JavaScript. Target LCP: under 2.5 seconds.",
        priority: Critical,
        code_sample: None,
    },
    CatalogEntry {
        key: "high_cls",
        short: "Unexpected layout shifts",
        description: "The page has a high Cumulative Layout Shift (CLS): elements move while it loads. You go to tap a button, it jumps, and you tap the wrong thing. It is very frustrating and Google penalises it heavily.",
        impact: "Major UX impact: extreme user frustration. Accidental clicks on the wrong buttons. Loss of trust. Google penalty for poor user experience.",
        action: "Reserve space for images (width and height attributes), avoid inserting content above existing content, preload fonts. Check with PageSpeed Insights. Target CLS: under 0.1.",
        priority: Important,
        code_sample: None,
    },
    CatalogEntry {
        key: "high_fid",
        short: "Slow response to interactions",
        description: "The site is slow to respond when someone clicks a button or fills a form. First Input Delay (FID) measures that latency. A high FID makes the site feel frozen, which drives visitors away.",
        impact: "UX impact: the site feels unresponsive. Frustrating to use. Abandoned forms and actions. Lost conversions.",
        action: "Reduce and optimise JavaScript. Split long tasks into smaller ones. Defer non-critical JS. Remove blocking third-party scripts. Target FID: under 100 milliseconds.",
        priority: Important,
        code_sample: None,
    },
    CatalogEntry {
        key: "not_mobile_responsive",
        short: "Site not optimised for mobile",
        description: "The site does not render properly on mobile phones. More than 60% of visitors browse on a smartphone, so a non-responsive site loses most of its potential audience. Google has also penalised non-mobile sites heavily since 2018.",
        impact: "Severe business impact: 60 to 80% of mobile visitors lost. Major Google penalty (mobile-first index). Bounce rate above 90% on mobile. Massive revenue loss.",
        action: "Rework the layout to be responsive: use CSS media queries, test several screen sizes, rely on a modern CSS framework (Bootstrap, Tailwind). Test regularly on real phones. Estimated effort: 2 to 5 days of development.",
        priority: Critical,
        code_sample: None,
    },
    CatalogEntry {
        key: "desktop_responsive_issues",
        short: "Desktop display problems",
        description: "The site has display problems on desktop screens: horizontal scrolling, overflowing elements, broken layout. Less critical than mobile problems, it still hurts desktop visitors, who can be 30 to 40% of the audience.",
        impact: "Moderate UX impact: degraded experience for 30-40% of visitors. Unprofessional look. Harder to navigate and read.",
        action: "Test the site at several desktop resolutions (1366px, 1920px, 2560px). Use max-width on containers. Avoid fixed pixel widths. Make sure no element overflows its container.",
        priority: Important,
        code_sample: None,
    },
    // ====== External analyzer scores ======
    CatalogEntry {
        key: "low_performance_score",
        short: "Low overall performance score",
        description: "Lighthouse gives the site a low overall performance score. The score combines several metrics: load speed, interactivity and visual stability. A low score points to multiple problems that seriously hurt the visitor experience and ranking.",
        impact: "Overall impact: all performance problems combined. Heavy loss of traffic and conversions. Google penalty on several factors.",
        action: "A full audit is needed: image optimisation, file minification, caching, CDN, server tuning. Use PageSpeed Insights for a detailed diagnosis. Effort: 3 to 10 days depending on the extent of the problems.",
        priority: Critical,
        code_sample: None,
    },
    CatalogEntry {
        key: "low_seo_score",
        short: "Low overall SEO score",
        description: "The site has a low SEO score, meaning it is not optimised to rank well on Google. Several problems add up: missing tags, wrong structure, unoptimised content. The result is invisibility in search results while competitors capture the traffic.",
        impact: "Major business impact: invisible on Google. Very few organic visitors. Full dependence on paid advertising. 70 to 90% of potential traffic lost.",
        action: "A full SEO audit is needed: fix every meta tag, optimise titles and H1s, improve the HTML structure, produce quality content. An SEO consultant is recommended. Effort: 5 to 15 days of work.",
        priority: Critical,
        code_sample: None,
    },
    CatalogEntry {
        key: "low_accessibility_score",
        short: "Low accessibility score",
        description: "The site has many accessibility problems that prevent people with disabilities from using it properly. Beyond being exclusionary, it is unlawful for public sites and large companies in many jurisdictions. Around 15% of the population is left out.",
        impact: "Legal and ethical impact: risk of legal action for public sites. 15% of potential customers excluded. Damaged brand image. Possible Google penalty.",
        action: "Run a full accessibility audit: alt text on every image, better contrast, keyboard navigation, form labels, ARIA structure. Aim for WCAG level AA at least. Effort: 5 to 20 days depending on site size.",
        priority: Critical,
        code_sample: None,
    },
    CatalogEntry {
        key: "low_best_practices_score",
        short: "Low best practices score",
        description: "The site does not follow modern web best practices: security problems (HTTPS, outdated libraries), console errors, browser compatibility issues. These technical problems make the site look amateurish and unreliable and can be security risks.",
        impact: "Security and credibility impact: risk of compromise. Loss of visitor trust. Browser security warnings. Possible malfunctions.",
        action: "Run a full technical audit: move to HTTPS, update libraries, fix console errors, test across browsers. Follow modern web standards. Effort: 2 to 8 days of development.",
        priority: Important,
        code_sample: None,
    },
    // ====== Display-only ======
    CatalogEntry {
        key: "lighthouse_failed",
        short: "Lighthouse analysis unavailable",
        description: "Google's Lighthouse analyzer could not audit the site. The site may be unreachable, too slow, or have technical problems. Accessibility and best practices scores are therefore unavailable and only the basic analysis was performed.",
        impact: "Impact: incomplete analysis. Some important criteria could not be evaluated. Check the availability and stability of the site.",
        action: "Check that the site is publicly reachable, improve its load speed and run the analysis again. If the problem persists, contact your host or developer to find the underlying technical problem.",
        priority: Important,
        code_sample: None,
    },
    CatalogEntry {
        key: "missing_open_graph",
        short: "Missing Open Graph tags",
        description: "Open Graph tags control how the site looks when shared on social networks (Facebook, LinkedIn and others). Without them, shares often show an unappealing preview with no image and poorly formatted text. Many potential clicks from social networks are lost.",
        impact: "Marketing impact: unattractive social shares. 50 to 70% fewer clicks from social networks. Very low social visibility.",
        action: "Add the essential Open Graph tags: og:title, og:description, og:image, og:url. The image should be at least 1200x630 pixels. Check with the Facebook and LinkedIn debuggers.",
        priority: Enhancement,
        code_sample: Some("<meta property=\"og:title\" content=\"Your title\">\n<meta property=\"og:description\" content=\"Your description\">\n<meta property=\"og:image\" content=\"https://yoursite.com/image.jpg\">\n<meta property=\"og:url\" content=\"https://yoursite.com/page\">"),
    },
    CatalogEntry {
        key: "missing_structured_data",
        short: "Missing structured data",
        description: "Structured data (Schema.org) helps Google understand the content and show rich results: review stars, prices, availability, FAQs and more. Without it you miss better visibility and a higher click-through rate.",
        impact: "SEO impact: no rich snippets. Click-through rate 20 to 30% lower. Less visible than competitors.",
        action: "Add JSON-LD structured data suited to your business: Organization, LocalBusiness, Product, Article, FAQ and so on. Validate with Google's Rich Results Test.",
        priority: Enhancement,
        code_sample: None,
    },
];
