use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use scraper::Html;

use crate::config::ExtractorConfig;
use crate::error::{HardError, SoftError, StrategyError};
use crate::fetch::{direct_post_url, host_in, post_id_from_url, validate_url, Fetcher};
use crate::models::{AnalyzedArticle, ExtractionMethod, ExtractionResult, SectionsResponse};
use crate::normalize::Normalizer;
use crate::render::{default_renderer, Renderer};
use crate::scoring::{Role, RoleScorer};
use crate::selectors::{body_text, densest_block, paragraph_texts, Resolved, SelectorResolver};

// ── Stages ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    RenderedDom,
    StaticFetch,
    AlternativeSelector,
    BodyFallback,
    Done,
}

impl Stage {
    pub const FIRST: Stage = Stage::RenderedDom;

    pub fn next(self) -> Stage {
        match self {
            Stage::RenderedDom => Stage::StaticFetch,
            Stage::StaticFetch => Stage::AlternativeSelector,
            Stage::AlternativeSelector => Stage::BodyFallback,
            Stage::BodyFallback | Stage::Done => Stage::Done,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::RenderedDom => "rendered_dom",
            Stage::StaticFetch => "static_fetch",
            Stage::AlternativeSelector => "alternative_selector",
            Stage::BodyFallback => "body_fallback",
            Stage::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the chain goes after `stage` produced `outcome`.
///
/// Viable content and hard errors stop the chain; soft errors and short
/// content move on. The last stage always stops.
pub fn transition(
    stage: Stage,
    outcome: &Result<ExtractionResult, StrategyError>,
    min_chars: usize,
) -> Stage {
    match outcome {
        Err(StrategyError::Hard(_)) => Stage::Done,
        Ok(result) if result.content_chars() >= min_chars => Stage::Done,
        _ => stage.next(),
    }
}

// ── Strategy port ────────────────────────────────────────────────────────────

#[async_trait]
pub trait Strategy: Send + Sync {
    fn stage(&self) -> Stage;

    async fn attempt(&self, ctx: &mut ChainContext) -> Result<ExtractionResult, StrategyError>;
}

/// Per-URL state shared by the strategies of one chain run.
#[derive(Debug)]
pub struct ChainContext {
    pub url: String,
    pub post_id: Option<String>,
    /// Whether the rendered-DOM stage applies to this URL.
    pub renderable: bool,
    static_url: String,
    static_page: Option<Result<String, SoftError>>,
}

impl ChainContext {
    pub fn new(url: &str, post_id: Option<String>, static_url: String) -> Self {
        Self {
            url: url.to_string(),
            post_id,
            renderable: false,
            static_url,
            static_page: None,
        }
    }

    pub fn with_rendering(mut self, renderable: bool) -> Self {
        self.renderable = renderable;
        self
    }

    /// Fetches the static page once per run; later stages reuse the outcome.
    pub async fn static_html(&mut self, fetcher: &Fetcher) -> Result<String, SoftError> {
        if self.static_page.is_none() {
            tracing::debug!(url = %self.url, fetch = %self.static_url, "fetching static html");
            self.static_page = Some(fetcher.fetch_html(&self.static_url).await);
        }
        match &self.static_page {
            Some(page) => page.clone(),
            None => Err(SoftError::Network("static page unavailable".to_string())),
        }
    }
}

fn from_resolved(
    url: &str,
    method: ExtractionMethod,
    title: Option<String>,
    resolved: Resolved,
) -> ExtractionResult {
    ExtractionResult::extracted(
        url,
        method,
        title,
        resolved.text,
        resolved.selector_used,
        resolved.elements_found,
    )
}

// ── Strategies ───────────────────────────────────────────────────────────────

pub struct RenderedDom {
    renderer: Arc<dyn Renderer>,
    resolver: Arc<SelectorResolver>,
    frame_id: String,
}

impl RenderedDom {
    pub fn new(renderer: Arc<dyn Renderer>, resolver: Arc<SelectorResolver>, frame_id: &str) -> Self {
        Self {
            renderer,
            resolver,
            frame_id: frame_id.to_string(),
        }
    }
}

#[async_trait]
impl Strategy for RenderedDom {
    fn stage(&self) -> Stage {
        Stage::RenderedDom
    }

    async fn attempt(&self, ctx: &mut ChainContext) -> Result<ExtractionResult, StrategyError> {
        if !ctx.renderable {
            return Err(SoftError::RenderUnavailable(format!("{} is not a rendered host", ctx.url)).into());
        }
        let html = self.renderer.render_frame(&ctx.url, &self.frame_id).await?;
        let document = Html::parse_document(&html);
        let title = self.resolver.extract_title(&document);
        let resolved = self
            .resolver
            .resolve(&document, ctx.post_id.as_deref())
            .ok_or(SoftError::SelectorNotFound)?;
        Ok(from_resolved(&ctx.url, ExtractionMethod::RenderedDom, title, resolved))
    }
}

pub struct StaticFetch {
    fetcher: Arc<Fetcher>,
    resolver: Arc<SelectorResolver>,
}

impl StaticFetch {
    pub fn new(fetcher: Arc<Fetcher>, resolver: Arc<SelectorResolver>) -> Self {
        Self { fetcher, resolver }
    }
}

#[async_trait]
impl Strategy for StaticFetch {
    fn stage(&self) -> Stage {
        Stage::StaticFetch
    }

    async fn attempt(&self, ctx: &mut ChainContext) -> Result<ExtractionResult, StrategyError> {
        let html = ctx.static_html(&self.fetcher).await?;
        let document = Html::parse_document(&html);
        let title = self.resolver.extract_title(&document);
        let resolved = self
            .resolver
            .resolve(&document, ctx.post_id.as_deref())
            .ok_or(SoftError::SelectorNotFound)?;
        Ok(from_resolved(&ctx.url, ExtractionMethod::StaticFetch, title, resolved))
    }
}

/// Broader selectors, then the densest paragraph block, then every
/// paragraph on the page.
pub struct AlternativeSelector {
    fetcher: Arc<Fetcher>,
    resolver: Arc<SelectorResolver>,
    min_chars: usize,
}

impl AlternativeSelector {
    pub fn new(fetcher: Arc<Fetcher>, resolver: Arc<SelectorResolver>, min_chars: usize) -> Self {
        Self {
            fetcher,
            resolver,
            min_chars,
        }
    }

    fn search(&self, url: &str, html: &str) -> Result<ExtractionResult, SoftError> {
        let document = Html::parse_document(html);
        let title = self.resolver.extract_title(&document);

        let mut candidates = Vec::new();
        if let Some(r) = self.resolver.resolve_alternative(&document) {
            candidates.push(from_resolved(url, ExtractionMethod::AlternativeSelector, title.clone(), r));
        }
        if let Some(r) = densest_block(&document) {
            candidates.push(from_resolved(url, ExtractionMethod::AlternativeSelector, title.clone(), r));
        }
        let paragraphs = paragraph_texts(&document);
        if !paragraphs.is_empty() {
            candidates.push(ExtractionResult::extracted(
                url,
                ExtractionMethod::ParagraphFallback,
                title,
                paragraphs.join("\n\n"),
                "p",
                paragraphs.len(),
            ));
        }

        if let Some(pos) = candidates.iter().position(|c| c.content_chars() >= self.min_chars) {
            return Ok(candidates.swap_remove(pos));
        }
        candidates
            .into_iter()
            .max_by_key(ExtractionResult::content_chars)
            .ok_or(SoftError::SelectorNotFound)
    }
}

#[async_trait]
impl Strategy for AlternativeSelector {
    fn stage(&self) -> Stage {
        Stage::AlternativeSelector
    }

    async fn attempt(&self, ctx: &mut ChainContext) -> Result<ExtractionResult, StrategyError> {
        let html = ctx.static_html(&self.fetcher).await?;
        Ok(self.search(&ctx.url, &html)?)
    }
}

pub struct BodyFallback {
    fetcher: Arc<Fetcher>,
    resolver: Arc<SelectorResolver>,
    max_chars: usize,
}

impl BodyFallback {
    pub fn new(fetcher: Arc<Fetcher>, resolver: Arc<SelectorResolver>, max_chars: usize) -> Self {
        Self {
            fetcher,
            resolver,
            max_chars,
        }
    }

    fn read_body(&self, url: &str, html: &str) -> Result<ExtractionResult, SoftError> {
        let document = Html::parse_document(html);
        let content = body_text(&document, self.max_chars);
        if content.is_empty() {
            return Err(SoftError::ExtractionEmpty {
                selector: "body".to_string(),
                chars: 0,
            });
        }
        Ok(ExtractionResult::extracted(
            url,
            ExtractionMethod::BodyFallback,
            self.resolver.extract_title(&document),
            content,
            "body",
            1,
        ))
    }
}

#[async_trait]
impl Strategy for BodyFallback {
    fn stage(&self) -> Stage {
        Stage::BodyFallback
    }

    async fn attempt(&self, ctx: &mut ChainContext) -> Result<ExtractionResult, StrategyError> {
        let html = ctx.static_html(&self.fetcher).await?;
        Ok(self.read_body(&ctx.url, &html)?)
    }
}

// ── Extractor ────────────────────────────────────────────────────────────────

/// Runs the strategy chain and the text pipeline behind it.
pub struct BlogExtractor {
    config: ExtractorConfig,
    strategies: Vec<Box<dyn Strategy>>,
    normalizer: Normalizer,
    scorer: RoleScorer,
}

impl BlogExtractor {
    pub fn new(config: ExtractorConfig) -> Result<Self, HardError> {
        let renderer: Arc<dyn Renderer> = Arc::from(default_renderer(&config));
        Self::with_renderer(config, renderer)
    }

    /// Standard four-stage chain with the given renderer.
    pub fn with_renderer(
        config: ExtractorConfig,
        renderer: Arc<dyn Renderer>,
    ) -> Result<Self, HardError> {
        let fetcher = Arc::new(Fetcher::new(&config)?);
        let resolver = Arc::new(SelectorResolver::default());
        let strategies: Vec<Box<dyn Strategy>> = vec![
            Box::new(RenderedDom::new(renderer, resolver.clone(), &config.frame_id)),
            Box::new(StaticFetch::new(fetcher.clone(), resolver.clone())),
            Box::new(AlternativeSelector::new(
                fetcher.clone(),
                resolver.clone(),
                config.min_content_chars,
            )),
            Box::new(BodyFallback::new(fetcher, resolver, config.body_fallback_max_chars)),
        ];
        Ok(Self::with_strategies(config, strategies))
    }

    pub fn with_strategies(config: ExtractorConfig, strategies: Vec<Box<dyn Strategy>>) -> Self {
        Self {
            config,
            strategies,
            normalizer: Normalizer::default(),
            scorer: RoleScorer::default(),
        }
    }

    pub fn with_text_pipeline(mut self, normalizer: Normalizer, scorer: RoleScorer) -> Self {
        self.normalizer = normalizer;
        self.scorer = scorer;
        self
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub async fn extract(&self, url: &str) -> ExtractionResult {
        self.extract_with_hint(url, None).await
    }

    /// Runs the chain for `url`. `post_id` overrides the identifier derived
    /// from the URL. Never fails: errors end up in `ExtractionResult.error`.
    pub async fn extract_with_hint(&self, url: &str, post_id: Option<&str>) -> ExtractionResult {
        let parsed = match validate_url(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::error!(url, error = %e, "rejected url");
                return ExtractionResult::failed(url, e.to_string());
            }
        };

        let post_id = post_id
            .map(str::to_string)
            .or_else(|| post_id_from_url(&parsed));
        let static_url = direct_post_url(&parsed).unwrap_or_else(|| parsed.to_string());
        let renderable = host_in(&parsed, &self.config.render_hosts);
        let mut ctx = ChainContext::new(url, post_id, static_url).with_rendering(renderable);

        self.run(&mut ctx).await
    }

    async fn run(&self, ctx: &mut ChainContext) -> ExtractionResult {
        let mut stage = Stage::FIRST;
        let mut failures: Vec<String> = Vec::new();
        let mut last_short: Option<ExtractionResult> = None;

        while stage != Stage::Done {
            let Some(strategy) = self.strategies.iter().find(|s| s.stage() == stage) else {
                stage = stage.next();
                continue;
            };

            let outcome = strategy.attempt(ctx).await;
            let next = transition(stage, &outcome, self.config.min_content_chars);

            match outcome {
                Ok(result) if next == Stage::Done && !result.content.trim().is_empty() => {
                    tracing::info!(
                        url = %ctx.url,
                        stage = stage.as_str(),
                        selector = %result.selector_used,
                        chars = result.content_chars(),
                        "extracted"
                    );
                    return result;
                }
                Ok(result) => {
                    tracing::warn!(
                        url = %ctx.url,
                        stage = stage.as_str(),
                        chars = result.content_chars(),
                        "content below minimum, advancing"
                    );
                    failures.push(format!("{stage}: {} chars", result.content_chars()));
                    if !result.content.trim().is_empty() {
                        last_short = Some(result);
                    }
                }
                Err(StrategyError::Soft(e)) => {
                    tracing::warn!(url = %ctx.url, stage = stage.as_str(), error = %e, "strategy failed, advancing");
                    failures.push(format!("{stage}: {e}"));
                }
                Err(StrategyError::Hard(e)) => {
                    tracing::error!(url = %ctx.url, stage = stage.as_str(), error = %e, "strategy aborted chain");
                    return ExtractionResult::failed(&ctx.url, format!("{stage}: {e}"));
                }
            }
            stage = next;
        }

        if let Some(short) = last_short {
            tracing::info!(url = %ctx.url, chars = short.content_chars(), "only short content found");
            return short;
        }

        tracing::error!(url = %ctx.url, "all strategies failed");
        ExtractionResult::failed(
            &ctx.url,
            format!("all extraction strategies failed ({})", failures.join("; ")),
        )
    }

    /// Extraction followed by normalization, segmentation and role scoring.
    pub async fn analyze(&self, url: &str) -> AnalyzedArticle {
        self.analyze_with_hint(url, None).await
    }

    pub async fn analyze_with_hint(&self, url: &str, post_id: Option<&str>) -> AnalyzedArticle {
        let extraction = self.extract_with_hint(url, post_id).await;
        let normalized_content = self.normalizer.normalize(&extraction.content);
        let sections = self.scorer.structured_sections(&normalized_content);
        let extended_first = self.scorer.extend_section(&sections, Role::Intro);
        let extended_closing = self.scorer.extend_section(&sections, Role::Closing);

        AnalyzedArticle {
            extraction,
            normalized_content,
            sections,
            extended_first,
            extended_closing,
        }
    }

    /// Sections of already-extracted text, optionally normalized first.
    pub fn sections(&self, text: &str, normalize: bool) -> SectionsResponse {
        let text = if normalize {
            self.normalizer.normalize(text)
        } else {
            text.to_string()
        };
        let sections = self.scorer.structured_sections(&text);
        SectionsResponse {
            extended_first: self.scorer.extend_section(&sections, Role::Intro),
            extended_closing: self.scorer.extend_section(&sections, Role::Closing),
            sections,
        }
    }

    /// One URL at a time with the configured delay in between; every URL
    /// yields a result in input order.
    pub async fn extract_batch(&self, urls: &[String]) -> Vec<ExtractionResult> {
        let mut results = Vec::with_capacity(urls.len());
        for (i, url) in urls.iter().enumerate() {
            if i > 0 && !self.config.batch_delay.is_zero() {
                tokio::time::sleep(self.config.batch_delay).await;
            }
            tracing::info!(url, position = i + 1, total = urls.len(), "batch item");
            results.push(self.extract(url).await);
        }
        results
    }
}
