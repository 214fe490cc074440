use async_trait::async_trait;

use crate::config::ExtractorConfig;
use crate::error::SoftError;

/// Produces the HTML of an embedded frame after client-side rendering.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Loads `url` with script execution, waits for the page to settle and
    /// returns the document of the frame whose id is `frame_id`.
    async fn render_frame(&self, url: &str, frame_id: &str) -> Result<String, SoftError>;
}

/// Stand-in used when rendering is switched off or not compiled in.
#[derive(Debug, Clone, Default)]
pub struct DisabledRenderer;

#[async_trait]
impl Renderer for DisabledRenderer {
    async fn render_frame(&self, _url: &str, _frame_id: &str) -> Result<String, SoftError> {
        Err(SoftError::RenderUnavailable("rendering disabled".to_string()))
    }
}

/// Headless Chromium when enabled and available, otherwise [`DisabledRenderer`].
pub fn default_renderer(config: &ExtractorConfig) -> Box<dyn Renderer> {
    #[cfg(feature = "render")]
    if config.render_enabled {
        return Box::new(ChromeRenderer::new(config));
    }
    #[cfg(not(feature = "render"))]
    if config.render_enabled {
        tracing::warn!("rendering requested but the `render` feature is not compiled in");
    }
    Box::new(DisabledRenderer)
}

#[cfg(feature = "render")]
pub use chrome::ChromeRenderer;

#[cfg(feature = "render")]
mod chrome {
    use std::path::PathBuf;
    use std::time::Duration;

    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser, BrowserConfig};
    use chromiumoxide::Page;
    use futures::StreamExt;
    use tokio::task::JoinHandle;
    use url::Url;

    use super::Renderer;
    use crate::config::ExtractorConfig;
    use crate::error::SoftError;

    /// One browser process per render; torn down on every exit path.
    #[derive(Debug, Clone)]
    pub struct ChromeRenderer {
        executable: Option<PathBuf>,
        user_agent: String,
        navigation_timeout: Duration,
        settle_delay: Duration,
    }

    impl ChromeRenderer {
        pub fn new(config: &ExtractorConfig) -> Self {
            Self {
                executable: config.chrome_executable.clone(),
                user_agent: config.user_agent.clone(),
                navigation_timeout: config.navigation_timeout,
                settle_delay: config.settle_delay,
            }
        }

        fn browser_config(&self) -> Result<BrowserConfig, SoftError> {
            let mut builder = BrowserConfig::builder()
                .request_timeout(self.navigation_timeout)
                .arg("--no-sandbox")
                .arg("--disable-dev-shm-usage")
                .arg("--disable-gpu")
                .arg(format!("--user-agent={}", self.user_agent));
            if let Some(path) = &self.executable {
                builder = builder.chrome_executable(path);
            }
            builder.build().map_err(SoftError::RenderUnavailable)
        }
    }

    #[async_trait]
    impl Renderer for ChromeRenderer {
        async fn render_frame(&self, url: &str, frame_id: &str) -> Result<String, SoftError> {
            let session = RenderSession::launch(self.browser_config()?).await?;
            let budget = self.navigation_timeout + self.settle_delay;
            let result =
                match tokio::time::timeout(budget, session.frame_html(url, frame_id, self.settle_delay))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(SoftError::RenderTimeout {
                        frame_id: frame_id.to_string(),
                    }),
                };
            session.close().await;
            result
        }
    }

    struct RenderSession {
        browser: Browser,
        handler: JoinHandle<()>,
    }

    impl RenderSession {
        async fn launch(config: BrowserConfig) -> Result<Self, SoftError> {
            let (browser, mut handler) = Browser::launch(config)
                .await
                .map_err(|e| SoftError::RenderUnavailable(e.to_string()))?;
            let handler = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if let Err(e) = event {
                        tracing::debug!(error = %e, "browser handler stopped");
                        break;
                    }
                }
            });
            Ok(Self { browser, handler })
        }

        async fn frame_html(
            &self,
            url: &str,
            frame_id: &str,
            settle: Duration,
        ) -> Result<String, SoftError> {
            let missing = || SoftError::RenderTimeout {
                frame_id: frame_id.to_string(),
            };

            let page = self
                .browser
                .new_page(url)
                .await
                .map_err(|e| SoftError::Network(format!("render navigation: {e}")))?;
            tokio::time::sleep(settle).await;

            let src = frame_src(&page, frame_id).await.ok_or_else(missing)?;
            let base = page
                .url()
                .await
                .ok()
                .flatten()
                .unwrap_or_else(|| url.to_string());
            let target = Url::parse(&base)
                .and_then(|b| b.join(&src))
                .map_err(|_| missing())?;
            tracing::debug!(frame = %target, "following embedded frame");

            page.goto(target.as_str())
                .await
                .map_err(|e| SoftError::Network(format!("frame navigation: {e}")))?;
            let html = page
                .content()
                .await
                .map_err(|e| SoftError::Network(format!("frame content: {e}")))?;
            if let Err(e) = page.close().await {
                tracing::debug!(error = %e, "page close failed");
            }
            Ok(html)
        }

        async fn close(mut self) {
            if let Err(e) = self.browser.close().await {
                tracing::debug!(error = %e, "browser close failed");
            }
            if let Err(e) = self.browser.wait().await {
                tracing::debug!(error = %e, "browser wait failed");
            }
            self.handler.abort();
        }
    }

    impl Drop for RenderSession {
        fn drop(&mut self) {
            self.handler.abort();
        }
    }

    async fn frame_src(page: &Page, frame_id: &str) -> Option<String> {
        let frame = page.find_element(format!("#{frame_id}")).await.ok()?;
        frame
            .attribute("src")
            .await
            .ok()
            .flatten()
            .filter(|s| !s.trim().is_empty())
    }
}
