use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use blog_extract::render::Renderer;
use blog_extract::{BlogExtractor, ExtractionMethod, ExtractorConfig, SoftError};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

struct FakeRenderer {
    frame: Option<String>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Renderer for FakeRenderer {
    async fn render_frame(&self, _url: &str, frame_id: &str) -> Result<String, SoftError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.frame.clone().ok_or(SoftError::RenderTimeout {
            frame_id: frame_id.to_string(),
        })
    }
}

fn extractor(frame: Option<&str>) -> (BlogExtractor, Arc<AtomicUsize>) {
    extractor_rendering(frame, &[])
}

fn extractor_rendering(frame: Option<&str>, hosts: &[&str]) -> (BlogExtractor, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let renderer = FakeRenderer {
        frame: frame.map(str::to_string),
        calls: calls.clone(),
    };
    let config = ExtractorConfig {
        batch_delay: Duration::ZERO,
        render_hosts: hosts.iter().map(|h| h.to_string()).collect(),
        ..ExtractorConfig::default()
    };
    let extractor = BlogExtractor::with_renderer(config, Arc::new(renderer)).unwrap();
    (extractor, calls)
}

async fn serve(server: &MockServer, route: &str, body: &str, hits: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html; charset=utf-8"))
        .expect(hits)
        .mount(server)
        .await;
}

const ARTICLE: &str = r#"<html><head><title>주말 산책 기록 : 네이버 블로그</title></head><body>
<nav>메뉴</nav>
<div class="se-main-container">
  <p>안녕하세요, 오늘은 주말에 다녀온 공원 산책 이야기를 나누려고 합니다.</p>
  <p>날씨가 맑아서 오래 걸었고, 돌아오는 길에 작은 카페에도 들렀습니다.</p>
  <p>끝까지 읽어주셔서 감사합니다. 다음 글에서 또 만나요.</p>
</div>
</body></html>"#;

#[tokio::test]
async fn static_fetch_short_circuits_after_render_failure() {
    let server = MockServer::start().await;
    serve(&server, "/walker/1001", ARTICLE, 1).await;

    let (extractor, render_calls) = extractor_rendering(None, &["127.0.0.1"]);
    let url = format!("{}/walker/1001", server.uri());
    let result = extractor.extract(&url).await;

    assert_eq!(render_calls.load(Ordering::SeqCst), 1);
    assert_eq!(result.method, Some(ExtractionMethod::StaticFetch));
    assert_eq!(result.selector_used, "div.se-main-container");
    assert_eq!(result.title.as_deref(), Some("주말 산책 기록"));
    assert_eq!(result.elements_found, 3);
    assert!(result.content.starts_with("안녕하세요"));
    assert!(!result.content.contains("메뉴"));
    assert!(result.error.is_none());
}

#[tokio::test]
async fn rendered_frame_wins_without_static_fetch() {
    let server = MockServer::start().await;
    serve(&server, "/walker/1002", ARTICLE, 0).await;

    let (extractor, render_calls) = extractor_rendering(Some(ARTICLE), &["127.0.0.1"]);
    let result = extractor.extract(&format!("{}/walker/1002", server.uri())).await;

    assert_eq!(render_calls.load(Ordering::SeqCst), 1);
    assert_eq!(result.method, Some(ExtractionMethod::RenderedDom));
}

#[tokio::test]
async fn other_hosts_skip_rendering() {
    let server = MockServer::start().await;
    serve(&server, "/walker/1003", ARTICLE, 1).await;

    let (extractor, render_calls) = extractor(Some(ARTICLE));
    let result = extractor.extract(&format!("{}/walker/1003", server.uri())).await;

    assert_eq!(render_calls.load(Ordering::SeqCst), 0);
    assert_eq!(result.method, Some(ExtractionMethod::StaticFetch));
}

#[tokio::test]
async fn density_search_recovers_unknown_layout() {
    let server = MockServer::start().await;
    let sentence = "레이아웃이 달라도 본문 단락은 충분한 길이를 가지고 있습니다. ";
    let page = format!(
        "<html><body><div class=\"layout\"><p>{}</p><p>{}</p></div></body></html>",
        sentence.repeat(4),
        sentence.repeat(4)
    );
    serve(&server, "/custom", &page, 1).await;

    let (extractor, _) = extractor(None);
    let result = extractor.extract(&format!("{}/custom", server.uri())).await;

    assert_eq!(result.method, Some(ExtractionMethod::AlternativeSelector));
    assert_eq!(result.selector_used, "density:div.layout");
}

#[tokio::test]
async fn loose_paragraphs_are_aggregated() {
    let server = MockServer::start().await;
    let page = "<html><body><p>첫 번째로 흩어진 문단이 여기에 하나 있습니다.</p>\
                <span>x</span><p>두 번째로 흩어진 문단도 여기에 하나 더 있습니다.</p></body></html>";
    serve(&server, "/loose", page, 1).await;

    let (extractor, _) = extractor(None);
    let result = extractor.extract(&format!("{}/loose", server.uri())).await;

    assert_eq!(result.method, Some(ExtractionMethod::ParagraphFallback));
    assert_eq!(result.elements_found, 2);
    assert!(result.content.contains("\n\n"));
}

#[tokio::test]
async fn body_text_is_the_last_resort() {
    let server = MockServer::start().await;
    let page = "<html><body><span>본문 컨테이너 없이 span 안에만 텍스트가 들어 있는 아주 단순한 페이지입니다.</span></body></html>";
    serve(&server, "/bare", page, 1).await;

    let (extractor, _) = extractor(None);
    let result = extractor.extract(&format!("{}/bare", server.uri())).await;

    assert_eq!(result.method, Some(ExtractionMethod::BodyFallback));
    assert_eq!(result.selector_used, "body");
}

#[tokio::test]
async fn empty_page_ends_in_terminal_error() {
    let server = MockServer::start().await;
    serve(&server, "/empty", "<html><head></head><body></body></html>", 1).await;

    let (extractor, _) = extractor(None);
    let result = extractor.extract(&format!("{}/empty", server.uri())).await;

    assert!(result.content.is_empty());
    assert!(result.method.is_none());
    assert!(result.error.is_some());
}

#[tokio::test]
async fn upstream_errors_are_soft_and_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let (extractor, _) = extractor(None);
    let result = extractor.extract(&format!("{}/down", server.uri())).await;

    assert!(result.content.is_empty());
    let error = result.error.unwrap();
    assert!(error.contains("503"), "{error}");
}

#[tokio::test]
async fn analyze_cleans_and_splits_the_article() {
    let server = MockServer::start().await;
    let page = r#"<html><head><title>상담 후기</title></head><body><div class="se-main-container">
        <p>안녕하세요 여러분, 오늘은 최근에 진행한 상담 과정을 차근차근 소개해 드리려고 합니다.</p>
        <p>처음 방문하신 분들은 어떤 순서로 진행되는지 궁금해하시는 경우가 많아서 정리해 보았습니다.</p>
        <p>예약 문의는 010-1234-5678 로 연락 주시면 친절하게 안내해 드리겠습니다. 감사합니다.</p>
    </div></body></html>"#;
    serve(&server, "/counsel/2001", page, 1).await;

    let (extractor, _) = extractor(None);
    let article = extractor.analyze(&format!("{}/counsel/2001", server.uri())).await;

    assert!(!article.normalized_content.contains("010-1234-5678"));
    assert_eq!(article.sections.total_paragraphs, 3);
    let first = article.sections.first_paragraph.unwrap();
    let closing = article.sections.closing_paragraph.unwrap();
    assert!(first.text.starts_with("안녕하세요"));
    assert!(closing.text.contains("감사합니다"));
    assert!(article.extended_first.unwrap().starts_with(&first.text));
}

#[tokio::test]
async fn batch_runs_every_url_in_order() {
    let server = MockServer::start().await;
    serve(&server, "/walker/1", ARTICLE, 1).await;
    serve(&server, "/walker/2", ARTICLE, 1).await;

    let (extractor, _) = extractor(None);
    let urls = vec![
        format!("{}/walker/1", server.uri()),
        "ftp://nowhere".to_string(),
        format!("{}/walker/2", server.uri()),
    ];
    let results = extractor.extract_batch(&urls).await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].url, urls[0]);
    assert!(results[1].error.is_some());
    assert_eq!(results[2].method, Some(ExtractionMethod::StaticFetch));
}

#[tokio::test]
async fn empty_input_is_an_error_result_and_no_paragraphs() {
    let (extractor, render_calls) = extractor(None);
    let result = extractor.extract("").await;

    assert!(result.content.is_empty());
    assert!(result.error.is_some());
    assert_eq!(render_calls.load(Ordering::SeqCst), 0);
    assert!(blog_extract::segment::Segmenter::default().segment("").is_empty());
}
