use url::Url;

use crate::config::ExtractorConfig;
use crate::error::{HardError, SoftError};

pub const PLATFORM_HOSTS: &[&str] = &["blog.naver.com", "m.blog.naver.com"];
const POST_VIEW_BASE: &str = "https://blog.naver.com/PostView.naver";

// ── URL handling ─────────────────────────────────────────────────────────────

pub fn validate_url(url: &str) -> Result<Url, HardError> {
    let parsed = Url::parse(url.trim()).map_err(|e| HardError::InvalidUrl(format!("{url}: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(HardError::InvalidUrl(format!(
            "{url}: only http and https URLs are allowed"
        )));
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(HardError::InvalidUrl(format!("{url}: missing host")));
    }
    Ok(parsed)
}

pub fn is_platform_url(url: &Url) -> bool {
    host_in(url, PLATFORM_HOSTS)
}

/// Case-insensitive exact host match against `hosts`.
pub fn host_in<S: AsRef<str>>(url: &Url, hosts: &[S]) -> bool {
    url.host_str().is_some_and(|h| {
        hosts
            .iter()
            .any(|candidate| candidate.as_ref().eq_ignore_ascii_case(h))
    })
}

/// Post identifier: the `logNo` query value, else a numeric last path
/// segment.
pub fn post_id_from_url(url: &Url) -> Option<String> {
    if let Some((_, v)) = url.query_pairs().find(|(k, _)| k == "logNo") {
        if !v.is_empty() {
            return Some(v.into_owned());
        }
    }
    url.path_segments()?
        .filter(|s| !s.is_empty())
        .last()
        .filter(|s| s.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_string)
}

/// `blog.naver.com/{blog}/{post}` rewritten to the frame-less PostView
/// address. `None` for anything else, including URLs already in that form.
pub fn direct_post_url(url: &Url) -> Option<String> {
    if !is_platform_url(url) || url.path().contains("PostView") {
        return None;
    }
    let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        [blog_id, post_id] if post_id.chars().all(|c| c.is_ascii_digit()) => {
            let mut direct = Url::parse(POST_VIEW_BASE).ok()?;
            direct
                .query_pairs_mut()
                .append_pair("blogId", blog_id)
                .append_pair("logNo", post_id);
            Some(direct.to_string())
        }
        _ => None,
    }
}

// ── HTTP fetch ───────────────────────────────────────────────────────────────

/// Plain HTTP GET without script execution.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    pub fn new(config: &ExtractorConfig) -> Result<Self, HardError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        let language = reqwest::header::HeaderValue::from_str(&config.accept_language)
            .map_err(|e| HardError::Internal(format!("accept-language header: {e}")))?;
        headers.insert(reqwest::header::ACCEPT_LANGUAGE, language);

        let mut builder = reqwest::ClientBuilder::new()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(config.user_agent.as_str())
            .default_headers(headers);

        if config.insecure_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder
            .build()
            .map_err(|e| HardError::Internal(format!("http client: {e}")))?;
        Ok(Self { client })
    }

    pub async fn fetch_html(&self, url: &str) -> Result<String, SoftError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                SoftError::Network(format!("timeout: {e}"))
            } else if e.is_connect() {
                SoftError::Network(format!("connect: {e}"))
            } else {
                SoftError::Network(format!("request: {e}"))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SoftError::Network(format!("upstream returned {status}")));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_lowercase();

        if !content_type.is_empty() && !content_type.contains("html") && !content_type.contains("xml")
        {
            return Err(SoftError::Network(format!("not html: {content_type}")));
        }

        response
            .text()
            .await
            .map_err(|e| SoftError::Network(format!("body: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn rejects_non_http_schemes() {
        assert!(validate_url("ftp://example.com/a").is_err());
        assert!(validate_url("not a url").is_err());
        assert!(validate_url("https://example.com/post").is_ok());
    }

    #[test]
    fn post_id_from_path_or_query() {
        assert_eq!(post_id_from_url(&url("https://blog.naver.com/someone/223344")).as_deref(), Some("223344"));
        assert_eq!(
            post_id_from_url(&url("https://blog.naver.com/PostView.naver?blogId=a&logNo=99")).as_deref(),
            Some("99")
        );
        assert_eq!(post_id_from_url(&url("https://example.com/posts/hello")), None);
    }

    #[test]
    fn platform_urls_rewrite_to_post_view() {
        assert_eq!(
            direct_post_url(&url("https://m.blog.naver.com/someone/223344")).as_deref(),
            Some("https://blog.naver.com/PostView.naver?blogId=someone&logNo=223344")
        );
        assert_eq!(direct_post_url(&url("https://blog.naver.com/PostView.naver?blogId=a&logNo=1")), None);
        assert_eq!(direct_post_url(&url("https://example.com/someone/223344")), None);
    }
}
