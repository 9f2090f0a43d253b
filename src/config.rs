use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::browser::Viewport;

pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
pub const MOBILE_USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 14_0 like Mac OS X) \
    AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.0 Mobile/15E148 Safari/604.1";

/// Audit pipeline configuration. Defaults are the production values; every field can be
/// overridden from `PAGEAUDIT_*` environment variables.
#[derive(Debug, Clone)]
pub struct AuditConfig {
    // Timeouts
    pub launch_timeout: Duration,
    pub navigation_timeout: Duration,
    pub audit_timeout: Duration,
    pub external_timeout: Duration,
    /// How long layout shifts are observed before the performance snapshot is taken
    pub layout_shift_window: Duration,

    // Browser
    pub chrome_path: Option<PathBuf>,
    pub headless: bool,
    pub desktop_viewport: Viewport,
    pub mobile_viewport: Viewport,
    pub desktop_user_agent: String,
    pub mobile_user_agent: String,

    // Lighthouse
    pub lighthouse_bin: String,

    // HTTP
    pub bind_addr: SocketAddr,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            launch_timeout: Duration::from_secs(30),
            navigation_timeout: Duration::from_secs(30),
            audit_timeout: Duration::from_secs(120),
            external_timeout: Duration::from_secs(90),
            layout_shift_window: Duration::from_millis(1500),
            chrome_path: None,
            headless: true,
            desktop_viewport: Viewport::desktop(),
            mobile_viewport: Viewport::mobile(),
            desktop_user_agent: DESKTOP_USER_AGENT.to_string(),
            mobile_user_agent: MOBILE_USER_AGENT.to_string(),
            lighthouse_bin: "lighthouse".to_string(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
        }
    }
}

impl AuditConfig {
    /// Load from the process environment, after merging a `.env` file if one exists.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let config = Self::from_lookup(|key| std::env::var(key).ok());
        config.log_summary();
        config
    }

    /// Build from an arbitrary key lookup. Unparseable values keep the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let ms = |key: &str, default: Duration| -> Duration {
            parse_or(&lookup, key, default.as_millis() as u64)
                .map(Duration::from_millis)
                .unwrap_or(default)
        };

        Self {
            launch_timeout: ms("PAGEAUDIT_LAUNCH_TIMEOUT_MS", defaults.launch_timeout),
            navigation_timeout: ms("PAGEAUDIT_NAVIGATION_TIMEOUT_MS", defaults.navigation_timeout),
            audit_timeout: ms("PAGEAUDIT_AUDIT_TIMEOUT_MS", defaults.audit_timeout),
            external_timeout: ms("PAGEAUDIT_LIGHTHOUSE_TIMEOUT_MS", defaults.external_timeout),
            layout_shift_window: ms(
                "PAGEAUDIT_LAYOUT_SHIFT_WINDOW_MS",
                defaults.layout_shift_window,
            ),
            chrome_path: lookup("PAGEAUDIT_CHROME_PATH")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            headless: parse_or(&lookup, "PAGEAUDIT_HEADLESS", defaults.headless)
                .unwrap_or(defaults.headless),
            lighthouse_bin: lookup("PAGEAUDIT_LIGHTHOUSE_BIN")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.lighthouse_bin),
            bind_addr: parse_or(&lookup, "PAGEAUDIT_BIND", defaults.bind_addr)
                .unwrap_or(defaults.bind_addr),
            ..defaults
        }
    }

    fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  launch timeout: {:?}", self.launch_timeout);
        tracing::info!("  navigation timeout: {:?}", self.navigation_timeout);
        tracing::info!("  audit timeout: {:?}", self.audit_timeout);
        tracing::info!(
            "  lighthouse: {} (timeout {:?})",
            self.lighthouse_bin,
            self.external_timeout
        );
        tracing::info!(
            "  chrome: {} (headless={})",
            self.chrome_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<auto-detect>".to_string()),
            self.headless
        );
        tracing::info!("  bind: {}", self.bind_addr);
    }
}

/// `Some(parsed)` when the key is set and parses, `Some(default)` when unset,
/// `None` (after a warning) when set to garbage.
fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Option<T> {
    match lookup(key) {
        None => Some(default),
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(key, value = %raw, "invalid config value, using default");
                None
            }
        },
    }
}
