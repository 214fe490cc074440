use serde::{Deserialize, Serialize};

// ── Extraction output ────────────────────────────────────────────────────────

/// Which strategy produced the content of an [`ExtractionResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    RenderedDom,
    StaticFetch,
    AlternativeSelector,
    BodyFallback,
    ParagraphFallback,
}

/// Outcome of one extraction call.
///
/// An empty `content` always comes with an `error`; a non-empty one always
/// names its `method`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionResult {
    pub title: Option<String>,
    pub content: String,
    pub url: String,
    pub method: Option<ExtractionMethod>,
    pub selector_used: String,
    pub elements_found: usize,
    pub error: Option<String>,
}

impl ExtractionResult {
    pub fn extracted(
        url: &str,
        method: ExtractionMethod,
        title: Option<String>,
        content: String,
        selector_used: impl Into<String>,
        elements_found: usize,
    ) -> Self {
        Self {
            title,
            content,
            url: url.to_string(),
            method: Some(method),
            selector_used: selector_used.into(),
            elements_found,
            error: None,
        }
    }

    pub fn failed(url: &str, error: impl Into<String>) -> Self {
        Self {
            title: None,
            content: String::new(),
            url: url.to_string(),
            method: None,
            selector_used: String::new(),
            elements_found: 0,
            error: Some(error.into()),
        }
    }

    pub fn content_chars(&self) -> usize {
        self.content.trim().chars().count()
    }
}

// ── Segmentation output ──────────────────────────────────────────────────────

/// One segmented unit of article text. `length` is counted in characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paragraph {
    pub text: String,
    pub index: usize,
    pub length: usize,
}

impl Paragraph {
    pub fn new(text: impl Into<String>, index: usize) -> Self {
        let text = text.into();
        let length = text.chars().count();
        Self { text, index, length }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredSections {
    pub all_paragraphs: Vec<Paragraph>,
    pub first_paragraph: Option<Paragraph>,
    pub closing_paragraph: Option<Paragraph>,
    pub total_paragraphs: usize,
    pub total_length: usize,
}

/// Full result of [`crate::chain::BlogExtractor::analyze`].
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzedArticle {
    pub extraction: ExtractionResult,
    pub normalized_content: String,
    pub sections: StructuredSections,
    pub extended_first: Option<String>,
    pub extended_closing: Option<String>,
}

// ── HTTP DTOs ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub url: String,
    #[serde(default)]
    pub post_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub urls: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SectionsRequest {
    pub text: String,
    #[serde(default)]
    pub normalize: bool,
}

#[derive(Debug, Serialize)]
pub struct SectionsResponse {
    pub sections: StructuredSections,
    pub extended_first: Option<String>,
    pub extended_closing: Option<String>,
}
