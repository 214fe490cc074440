use std::path::PathBuf;
use std::time::Duration;

use crate::fetch::PLATFORM_HOSTS;

// ── Defaults ─────────────────────────────────────────────────────────────────

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const DEFAULT_ACCEPT_LANGUAGE: &str = "ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7";
const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8000";

/// Content shorter than this (in chars) makes the chain move on.
pub const MIN_VIABLE_CONTENT: usize = 50;
pub const BODY_FALLBACK_MAX_CHARS: usize = 2000;
pub const FRAME_ID: &str = "mainFrame";

/// Runtime settings for fetching, rendering and batching.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub user_agent: String,
    pub accept_language: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub insecure_ssl: bool,
    pub render_enabled: bool,
    /// Hosts whose pages go through the rendered-DOM stage; everything else
    /// starts at the static fetch.
    pub render_hosts: Vec<String>,
    pub chrome_executable: Option<PathBuf>,
    pub navigation_timeout: Duration,
    pub settle_delay: Duration,
    pub frame_id: String,
    pub min_content_chars: usize,
    pub body_fallback_max_chars: usize,
    pub batch_delay: Duration,
    pub listen_addr: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(15),
            insecure_ssl: false,
            render_enabled: cfg!(feature = "render"),
            render_hosts: PLATFORM_HOSTS.iter().map(|h| h.to_string()).collect(),
            chrome_executable: None,
            navigation_timeout: Duration::from_secs(20),
            settle_delay: Duration::from_secs(5),
            frame_id: FRAME_ID.to_string(),
            min_content_chars: MIN_VIABLE_CONTENT,
            body_fallback_max_chars: BODY_FALLBACK_MAX_CHARS,
            batch_delay: Duration::from_millis(1000),
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
        }
    }
}

impl ExtractorConfig {
    /// Defaults overlaid with `BLOG_EXTRACT_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(v) = lookup("BLOG_EXTRACT_USER_AGENT") {
            config.user_agent = v;
        }
        if let Some(v) = lookup("BLOG_EXTRACT_ACCEPT_LANGUAGE") {
            config.accept_language = v;
        }
        if let Some(v) = lookup("BLOG_EXTRACT_INSECURE_SSL") {
            config.insecure_ssl = v == "1";
        }
        if let Some(v) = lookup("BLOG_EXTRACT_RENDER") {
            config.render_enabled = v == "1";
        }
        if let Some(v) = lookup("BLOG_EXTRACT_RENDER_HOSTS") {
            config.render_hosts = v
                .split(',')
                .map(str::trim)
                .filter(|h| !h.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(v) = lookup("BLOG_EXTRACT_CHROME") {
            config.chrome_executable = Some(PathBuf::from(v));
        }
        if let Some(d) = lookup_millis(&lookup, "BLOG_EXTRACT_REQUEST_TIMEOUT_MS") {
            config.request_timeout = d;
        }
        if let Some(d) = lookup_millis(&lookup, "BLOG_EXTRACT_SETTLE_MS") {
            config.settle_delay = d;
        }
        if let Some(d) = lookup_millis(&lookup, "BLOG_EXTRACT_BATCH_DELAY_MS") {
            config.batch_delay = d;
        }
        if let Some(v) = lookup("BLOG_EXTRACT_ADDR") {
            config.listen_addr = v;
        }

        config
    }
}

fn lookup_millis(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<Duration> {
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(ms) => Some(Duration::from_millis(ms)),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring non-numeric duration");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn env_overrides_defaults() {
        let vars: HashMap<&str, &str> = [
            ("BLOG_EXTRACT_INSECURE_SSL", "1"),
            ("BLOG_EXTRACT_SETTLE_MS", "250"),
            ("BLOG_EXTRACT_BATCH_DELAY_MS", "oops"),
            ("BLOG_EXTRACT_RENDER", "0"),
            ("BLOG_EXTRACT_RENDER_HOSTS", "blog.naver.com, , localhost"),
        ]
        .into_iter()
        .collect();

        let config = ExtractorConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert!(config.insecure_ssl);
        assert!(!config.render_enabled);
        assert_eq!(config.render_hosts, vec!["blog.naver.com", "localhost"]);
        assert_eq!(config.settle_delay, Duration::from_millis(250));
        assert_eq!(config.batch_delay, Duration::from_millis(1000));
        assert_eq!(config.min_content_chars, MIN_VIABLE_CONTENT);
    }
}
