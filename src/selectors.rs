use once_cell::sync::Lazy;
use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

use crate::normalize::strings;

const DENSITY_MIN_CHARS: usize = 200;
const PARAGRAPH_MIN_CHARS: usize = 10;

static HSPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static MULTI_NEWLINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

static DENSITY_CANDIDATES: Lazy<Selector> =
    Lazy::new(|| Selector::parse("article, main, section, div, td").unwrap());

static PARAGRAPH_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());

static BODY_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("body").unwrap());

// ── Selector table ───────────────────────────────────────────────────────────

/// Ordered selector lists. Post-scoped entries carry a `{post_id}`
/// placeholder and are only tried when a post identifier is known.
#[derive(Debug, Clone)]
pub struct SelectorTable {
    pub post_scoped: Vec<String>,
    pub platform: Vec<String>,
    pub generic: Vec<String>,
    /// Broader list for the alternative-selector stage.
    pub alternative: Vec<String>,
    /// `meta` entries are read from their `content` attribute.
    pub title: Vec<String>,
    /// Site names stripped from the end of a title after `:`, `|` or `-`.
    pub title_suffixes: Vec<String>,
}

impl Default for SelectorTable {
    fn default() -> Self {
        Self::naver_blog()
    }
}

impl SelectorTable {
    pub fn naver_blog() -> Self {
        Self {
            post_scoped: strings(&[
                "#post-view{post_id} > div > div > div.se-main-container",
                "#post-view{post_id} > div > div.se-main-container",
                "#post-view{post_id} .se-main-container",
            ]),
            platform: strings(&[
                "#post-view .se-main-container",
                "div.se-main-container",
                ".se-main-container",
                "#postViewArea",
                ".post_ct",
            ]),
            generic: strings(&[
                ".post-view",
                "#post-view",
                ".blog-content",
                "article",
                "main",
                ".entry-content",
                ".post-content",
            ]),
            alternative: strings(&[
                ".se-main-container",
                ".post-view",
                ".blog-content",
                ".entry-content",
                "#postViewArea",
                ".se-component",
                "main",
                "article",
                "[role=main]",
                ".content",
                "#content",
            ]),
            title: strings(&[
                "title",
                r#"meta[property="og:title"]"#,
                r#"meta[name="title"]"#,
                ".se-title-text",
                ".se-title",
                ".post_tit",
                ".post-title",
                ".entry-title",
                "h1",
                "[data-post-title]",
            ]),
            title_suffixes: strings(&["네이버 블로그", "NAVER Blog", "티스토리", "Tistory"]),
        }
    }
}

// ── Resolver ─────────────────────────────────────────────────────────────────

/// Rendered text of a container located by a selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub selector_used: String,
    pub text: String,
    pub elements_found: usize,
}

#[derive(Debug, Clone)]
pub struct SelectorResolver {
    table: SelectorTable,
    suffix: Option<Regex>,
}

impl Default for SelectorResolver {
    fn default() -> Self {
        Self::new(SelectorTable::default())
    }
}

impl SelectorResolver {
    pub fn new(table: SelectorTable) -> Self {
        let names: Vec<String> = table
            .title_suffixes
            .iter()
            .filter(|s| !s.trim().is_empty())
            .map(|s| regex::escape(s.trim()))
            .collect();
        let suffix = if names.is_empty() {
            None
        } else {
            Regex::new(&format!(r"\s*[:|\-]\s*(?:{})\s*$", names.join("|"))).ok()
        };
        Self { table, suffix }
    }

    /// Priority list for [`resolve`](Self::resolve): post-scoped entries
    /// first when `post_id` is known, then platform, then generic.
    pub fn priority(&self, post_id: Option<&str>) -> Vec<String> {
        let mut list = Vec::new();
        if let Some(id) = post_id.filter(|id| is_post_id(id)) {
            list.extend(self.table.post_scoped.iter().map(|t| t.replace("{post_id}", id)));
        }
        list.extend(self.table.platform.iter().cloned());
        list.extend(self.table.generic.iter().cloned());
        list
    }

    /// First selector in priority order that matches a node with text.
    pub fn resolve(&self, document: &Html, post_id: Option<&str>) -> Option<Resolved> {
        first_match(document, &self.priority(post_id))
    }

    pub fn resolve_alternative(&self, document: &Html) -> Option<Resolved> {
        first_match(document, &self.table.alternative)
    }

    pub fn extract_title(&self, document: &Html) -> Option<String> {
        for raw in &self.table.title {
            let Some(selector) = parse_selector(raw) else {
                continue;
            };
            for el in document.select(&selector) {
                let text = if el.value().name() == "meta" {
                    el.value().attr("content").map(collapse).unwrap_or_default()
                } else {
                    collapse(&collect_text(el))
                };
                let title = self.strip_suffix(&text);
                if !title.is_empty() {
                    return Some(title);
                }
            }
        }
        None
    }

    /// Removes one trailing site-name suffix.
    pub fn strip_suffix(&self, title: &str) -> String {
        let title = title.trim();
        match &self.suffix {
            Some(re) => re.replace(title, "").trim().to_string(),
            None => title.to_string(),
        }
    }
}

fn is_post_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn parse_selector(raw: &str) -> Option<Selector> {
    match Selector::parse(raw) {
        Ok(s) => Some(s),
        Err(e) => {
            tracing::debug!(selector = raw, error = %e, "skipping unparsable selector");
            None
        }
    }
}

fn first_match(document: &Html, selectors: &[String]) -> Option<Resolved> {
    for raw in selectors {
        let Some(selector) = parse_selector(raw) else {
            continue;
        };
        for el in document.select(&selector) {
            let text = render_text(el);
            if text.is_empty() {
                continue;
            }
            tracing::debug!(selector = raw.as_str(), chars = text.chars().count(), "selector matched");
            return Some(Resolved {
                selector_used: raw.clone(),
                elements_found: count_blocks(&text),
                text,
            });
        }
    }
    None
}

// ── Density search ───────────────────────────────────────────────────────────

/// Container whose direct paragraph children carry the most text, when that
/// exceeds 200 chars.
pub fn densest_block(document: &Html) -> Option<Resolved> {
    let mut best: Option<(usize, ElementRef<'_>)> = None;
    for el in document.select(&DENSITY_CANDIDATES) {
        let density = direct_paragraph_chars(el);
        if best.map_or(true, |(b, _)| density > b) {
            best = Some((density, el));
        }
    }

    let (density, el) = best?;
    if density <= DENSITY_MIN_CHARS {
        return None;
    }
    let text = render_text(el);
    Some(Resolved {
        selector_used: format!("density:{}", describe(el)),
        elements_found: count_blocks(&text),
        text,
    })
}

fn direct_paragraph_chars(el: ElementRef<'_>) -> usize {
    el.children()
        .filter_map(ElementRef::wrap)
        .filter(|c| c.value().name() == "p")
        .map(|p| collapse(&collect_text(p)).chars().count())
        .sum()
}

fn describe(el: ElementRef<'_>) -> String {
    let mut out = el.value().name().to_string();
    if let Some(id) = el.value().id() {
        out.push('#');
        out.push_str(id);
    }
    for class in el.value().classes() {
        out.push('.');
        out.push_str(class);
    }
    out
}

/// Texts of all `<p>` elements longer than 10 chars, in document order.
pub fn paragraph_texts(document: &Html) -> Vec<String> {
    document
        .select(&PARAGRAPH_SEL)
        .map(|p| collapse(&collect_text(p)))
        .filter(|t| t.chars().count() > PARAGRAPH_MIN_CHARS)
        .collect()
}

/// Block-rendered text of `<body>` (or the whole document without one),
/// cut to `max_chars`.
pub fn body_text(document: &Html, max_chars: usize) -> String {
    let text = match document.select(&BODY_SEL).next() {
        Some(body) => render_text(body),
        None => render_text(document.root_element()),
    };
    truncate_chars(&text, max_chars)
}

pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => text[..cut].trim_end().to_string(),
        None => text.to_string(),
    }
}

// ── Block-aware text rendering ───────────────────────────────────────────────

/// Plain text of `el`: paragraphs, headings and list items end with a blank
/// line, divisions with a line break. Scripts and page chrome are skipped.
pub fn render_text(el: ElementRef<'_>) -> String {
    let mut raw = String::new();
    walk_element(el, &mut raw);

    let lines: Vec<String> = raw.lines().map(collapse).collect();
    let joined = lines.join("\n");
    MULTI_NEWLINE_RE.replace_all(&joined, "\n\n").trim().to_string()
}

fn walk_element(el: ElementRef<'_>, out: &mut String) {
    let name = el.value().name();

    if matches!(
        name,
        "script"
            | "style"
            | "noscript"
            | "template"
            | "svg"
            | "form"
            | "button"
            | "iframe"
            | "nav"
            | "footer"
            | "aside"
    ) {
        return;
    }

    match name {
        "br" => out.push('\n'),
        "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "li" | "blockquote" | "pre" => {
            out.push('\n');
            walk_children(el, out);
            out.push_str("\n\n");
        }
        "div" | "section" | "article" | "main" | "header" | "ul" | "ol" | "table" | "tr"
        | "figure" | "figcaption" => {
            out.push('\n');
            walk_children(el, out);
            out.push('\n');
        }
        "td" | "th" => {
            walk_children(el, out);
            out.push(' ');
        }
        _ => walk_children(el, out),
    }
}

fn walk_children(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(&HSPACE_RE.replace_all(&text.text, " ")),
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    walk_element(child_el, out);
                }
            }
            _ => {}
        }
    }
}

/// Recursively collect all text from an element and its descendants.
fn collect_text(el: ElementRef<'_>) -> String {
    let mut parts = Vec::new();
    for child in el.children() {
        match child.value() {
            Node::Text(text) => parts.push(text.text.to_string()),
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    if !matches!(child_el.value().name(), "script" | "style") {
                        parts.push(collect_text(child_el));
                    }
                }
            }
            _ => {}
        }
    }
    parts.join("")
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn count_blocks(text: &str) -> usize {
    text.split("\n\n").filter(|b| !b.trim().is_empty()).count()
}
