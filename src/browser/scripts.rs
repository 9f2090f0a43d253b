//! In-page scripts behind each `PageQuery`. All of them are read-only.

pub const TITLE: &str = "document.title || ''";

pub const DOCUMENT_HTML: &str =
    "document.documentElement ? document.documentElement.outerHTML : ''";

pub const RESPONSIVE_PROBE: &str = r#"(() => ({
  hasViewport: !!document.querySelector('meta[name="viewport"]'),
  bodyWidth: document.body ? document.body.scrollWidth : 0,
  windowWidth: window.innerWidth
}))()"#;

pub const TECHNOLOGY_GLOBALS: &str = r#"(() => ({
  react: !!(window.React || window.__REACT_DEVTOOLS_GLOBAL_HOOK__),
  vue: !!(window.Vue || window.__VUE__),
  angular: !!window.angular,
  next: !!(window.next || window.__NEXT_DATA__),
  jquery: !!(window.jQuery || window.$),
  analytics: !!(window.ga || window.gtag || window.dataLayer)
}))()"#;

/// Timing snapshot. Layout shift is accumulated from buffered entries plus whatever
/// arrives during `settle_ms`; first-input delay is 0 unless an input was recorded.
pub fn performance_snapshot(settle_ms: u64) -> String {
    format!(
        r#"(async () => {{
  let cls = 0;
  let fid = 0;
  let lcp = 0;
  const observers = [];
  const observe = (type, onEntry) => {{
    try {{
      const po = new PerformanceObserver((list) => list.getEntries().forEach(onEntry));
      po.observe({{ type, buffered: true }});
      observers.push(po);
    }} catch (_) {{}}
  }};
  observe('layout-shift', (e) => {{ if (!e.hadRecentInput) cls += e.value; }});
  observe('largest-contentful-paint', (e) => {{ lcp = e.startTime; }});
  observe('first-input', (e) => {{ if (!fid) fid = e.processingStart - e.startTime; }});
  await new Promise((resolve) => setTimeout(resolve, {settle_ms}));
  observers.forEach((po) => po.disconnect());

  const nav = performance.getEntriesByType('navigation')[0];
  const fcp = performance.getEntriesByType('paint').find((e) => e.name === 'first-contentful-paint');
  return {{
    loadTime: nav ? nav.loadEventEnd - nav.loadEventStart : 0,
    domContentLoaded: nav ? nav.domContentLoadedEventEnd - nav.domContentLoadedEventStart : 0,
    firstContentfulPaint: fcp ? fcp.startTime : 0,
    largestContentfulPaint: lcp,
    cumulativeLayoutShift: cls,
    firstInputDelay: fid
  }};
}})()"#
    )
}
